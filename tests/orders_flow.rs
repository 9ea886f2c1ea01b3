use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use gocart_api::{
    audit::AuditLog,
    checkout::PaymentMethod,
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    dto::{
        address::CreateAddressRequest,
        cart::AddToCartRequest,
        orders::{OrderLineRequest, PlaceOrderRequest, UpdateOrderStatusRequest},
    },
    entity::{
        coupons::ActiveModel as CouponActive,
        Orders, Products,
        orders::OrderStatus,
        products::ActiveModel as ProductActive,
        stores::{ActiveModel as StoreActive, StoreStatus},
        users::ActiveModel as UserActive,
    },
    error::AppError,
    middleware::auth::AuthUser,
    payments::{CheckoutGateway, HostedCheckoutRequest, HostedCheckoutSession, PaymentError},
    routes::params::{OrderListQuery, Pagination},
    services::{
        address_service, cart_service, coupon_service, order_service, payment_service,
        store_service,
    },
    state::AppState,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait, Set,
    Statement,
};
use uuid::Uuid;

/// Hands out a fixed session and remembers what it was asked for.
#[derive(Default)]
struct RecordingGateway {
    requests: Mutex<Vec<HostedCheckoutRequest>>,
}

#[async_trait]
impl CheckoutGateway for RecordingGateway {
    async fn create_session(
        &self,
        request: &HostedCheckoutRequest,
    ) -> Result<HostedCheckoutSession, PaymentError> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(HostedCheckoutSession {
            id: "cs_test_123".into(),
            url: Some("https://checkout.stripe.test/cs_test_123".into()),
            expires_at: request.expires_at.timestamp(),
        })
    }
}

struct DownGateway;

#[async_trait]
impl CheckoutGateway for DownGateway {
    async fn create_session(
        &self,
        _request: &HostedCheckoutRequest,
    ) -> Result<HostedCheckoutSession, PaymentError> {
        Err(PaymentError::Provider {
            status: 503,
            message: "unavailable".into(),
        })
    }
}

// Customer checks out across two stores with cash, then again through the
// hosted checkout; the seller advances one of the orders.
#[tokio::test]
async fn multi_store_checkout_flow() -> anyhow::Result<()> {
    // Allow skipping when no DB is configured in the environment.
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            return Ok(());
        }
    };

    let gateway = Arc::new(RecordingGateway::default());
    let state = setup_state(&database_url, gateway.clone()).await?;

    let buyer_id = create_user(&state.orm, "buyer@example.com", "free").await?;
    let seller_a_id = create_user(&state.orm, "seller-a@example.com", "free").await?;
    let seller_b_id = create_user(&state.orm, "seller-b@example.com", "free").await?;
    let store_a = create_store(&state.orm, seller_a_id, "store-a").await?;
    let store_b = create_store(&state.orm, seller_b_id, "store-b").await?;
    let earbuds = create_product(&state.orm, store_a, "Earbuds", 1000, 10).await?;
    let stand = create_product(&state.orm, store_b, "Phone Stand", 500, 10).await?;
    create_coupon(&state.orm, "WELCOME10", 10, true, Duration::days(1)).await?;
    create_coupon(&state.orm, "SUMMER5", 5, false, Duration::days(-1)).await?;

    let buyer = AuthUser {
        user_id: buyer_id,
        role: "user".into(),
        plan: "free".into(),
    };
    let seller_a = AuthUser {
        user_id: seller_a_id,
        role: "user".into(),
        plan: "free".into(),
    };

    let address = address_service::add_address(
        &state,
        &buyer,
        CreateAddressRequest {
            name: "Buyer".into(),
            email: "buyer@example.com".into(),
            street: "1 Main St".into(),
            city: "Springfield".into(),
            state: "IL".into(),
            zip: "62701".into(),
            country: "US".into(),
            phone: "5550100".into(),
        },
    )
    .await?
    .data
    .unwrap();

    cart_service::add_to_cart(
        &state,
        &buyer,
        AddToCartRequest {
            product_id: earbuds,
            quantity: 2,
        },
    )
    .await?;

    // Empty checkouts never reach the database.
    let err = order_service::place_order(
        &state,
        &buyer,
        "https://shop.test",
        PlaceOrderRequest {
            address_id: address.id,
            items: vec![],
            coupon_code: None,
            payment_method: PaymentMethod::Cod,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(
        err,
        AppError::Checkout(gocart_api::checkout::CheckoutError::EmptyOrder)
    ));
    assert_eq!(Orders::find().count(&state.orm).await?, 0);

    // A stored but expired coupon reads as missing.
    let err = coupon_service::validate_coupon(&state.orm, "summer5", buyer_id, false, Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Coupon(_)));
    assert_eq!(err.status().as_u16(), 404);

    // Cash on delivery, lower-case coupon code.
    let placed = order_service::place_order(
        &state,
        &buyer,
        "https://shop.test",
        PlaceOrderRequest {
            address_id: address.id,
            items: vec![
                OrderLineRequest {
                    product_id: earbuds,
                    quantity: 1,
                },
                OrderLineRequest {
                    product_id: stand,
                    quantity: 1,
                },
                OrderLineRequest {
                    product_id: earbuds,
                    quantity: 1,
                },
            ],
            coupon_code: Some("welcome10".into()),
            payment_method: PaymentMethod::Cod,
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(placed.order_ids.len(), 2);
    assert_eq!(placed.amount, 2750);
    assert!(placed.session.is_none());
    assert_eq!(stock_of(&state.orm, earbuds).await?, 8);
    assert_eq!(stock_of(&state.orm, stand).await?, 9);

    let cart = cart_service::list_cart(&state, &buyer, Pagination::default())
        .await?
        .data
        .unwrap();
    assert!(cart.items.is_empty(), "cash on delivery empties the cart");

    let orders = order_service::list_orders(&state, &buyer, OrderListQuery::default())
        .await?
        .data
        .unwrap();
    assert_eq!(orders.items.len(), 2);
    let first = orders
        .items
        .iter()
        .find(|o| o.order.store_id == store_a)
        .unwrap();
    assert_eq!(first.order.total, 2300);
    assert_eq!(first.items.len(), 1);
    assert_eq!(first.items[0].quantity, 2);
    assert!(first.order.is_coupon_used);

    // The new-user coupon is spent once the buyer has an order.
    let err = order_service::place_order(
        &state,
        &buyer,
        "https://shop.test",
        PlaceOrderRequest {
            address_id: address.id,
            items: vec![OrderLineRequest {
                product_id: stand,
                quantity: 1,
            }],
            coupon_code: Some("WELCOME10".into()),
            payment_method: PaymentMethod::Cod,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Coupon(_)));
    assert_eq!(err.status().as_u16(), 400);

    // Hosted checkout: cart stays until the provider confirms.
    cart_service::add_to_cart(
        &state,
        &buyer,
        AddToCartRequest {
            product_id: stand,
            quantity: 3,
        },
    )
    .await?;
    // A provider failure after commit keeps the stock untouched.
    let down = AppState {
        gateway: Some(Arc::new(DownGateway)),
        ..state.clone()
    };
    let err = order_service::place_order(
        &down,
        &buyer,
        "https://shop.test",
        PlaceOrderRequest {
            address_id: address.id,
            items: vec![OrderLineRequest {
                product_id: stand,
                quantity: 2,
            }],
            coupon_code: None,
            payment_method: PaymentMethod::Stripe,
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.status().as_u16(), 502);
    assert_eq!(stock_of(&state.orm, stand).await?, 9);

    let hosted = order_service::place_order(
        &state,
        &buyer,
        "https://shop.test/",
        PlaceOrderRequest {
            address_id: address.id,
            items: vec![OrderLineRequest {
                product_id: stand,
                quantity: 3,
            }],
            coupon_code: None,
            payment_method: PaymentMethod::Stripe,
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(hosted.amount, 2000);
    assert_eq!(stock_of(&state.orm, stand).await?, 9, "hosted orders wait for payment");
    assert_eq!(hosted.session.as_ref().unwrap().id, "cs_test_123");
    {
        let requests = gateway.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].amount_cents, 2000);
        assert_eq!(requests[0].order_ids, hosted.order_ids);
        assert_eq!(requests[0].cancel_url, "https://shop.test/cart");
    }

    let visible = order_service::list_orders(&state, &buyer, OrderListQuery::default())
        .await?
        .data
        .unwrap();
    assert_eq!(visible.items.len(), 2, "unpaid hosted orders stay hidden");
    let cart = cart_service::list_cart(&state, &buyer, Pagination::default())
        .await?
        .data
        .unwrap();
    assert_eq!(cart.items.len(), 1);

    let updated = payment_service::confirm_payment(&state.orm, buyer_id, &hosted.order_ids).await?;
    assert_eq!(updated, 1);
    assert_eq!(stock_of(&state.orm, stand).await?, 6);
    let visible = order_service::list_orders(&state, &buyer, OrderListQuery::default())
        .await?
        .data
        .unwrap();
    assert_eq!(visible.items.len(), 3);
    let cart = cart_service::list_cart(&state, &buyer, Pagination::default())
        .await?
        .data
        .unwrap();
    assert!(cart.items.is_empty());

    // A redelivered confirmation neither takes stock twice nor touches a new cart.
    cart_service::add_to_cart(
        &state,
        &buyer,
        AddToCartRequest {
            product_id: earbuds,
            quantity: 1,
        },
    )
    .await?;
    let updated = payment_service::confirm_payment(&state.orm, buyer_id, &hosted.order_ids).await?;
    assert_eq!(updated, 0);
    assert_eq!(stock_of(&state.orm, stand).await?, 6);
    let cart = cart_service::list_cart(&state, &buyer, Pagination::default())
        .await?
        .data
        .unwrap();
    assert_eq!(cart.items.len(), 1);

    // Seller fulfilment only moves forward.
    let store_orders = store_service::list_store_orders(&state, &seller_a, OrderListQuery::default())
        .await?
        .data
        .unwrap();
    assert_eq!(store_orders.items.len(), 1);
    let order_id = store_orders.items[0].order.id;

    let shipped = store_service::update_order_status(
        &state,
        &seller_a,
        order_id,
        UpdateOrderStatusRequest {
            status: OrderStatus::Shipped,
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(shipped.order.status, OrderStatus::Shipped);

    let err = store_service::update_order_status(
        &state,
        &seller_a,
        order_id,
        UpdateOrderStatusRequest {
            status: OrderStatus::Processing,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    Ok(())
}

async fn setup_state(
    database_url: &str,
    gateway: Arc<RecordingGateway>,
) -> anyhow::Result<AppState> {
    let orm = create_orm_conn(database_url).await?;
    run_migrations(&orm).await?;

    // Clean tables between runs
    let backend = orm.get_database_backend();
    orm.execute(Statement::from_string(
        backend,
        "TRUNCATE TABLE order_items, orders, cart_items, coupons, products, stores, addresses, audit_logs, users CASCADE",
    ))
    .await?;

    let config = AppConfig {
        database_url: database_url.to_string(),
        host: "127.0.0.1".into(),
        port: 0,
        jwt_secret: "test-secret".into(),
        shipping_fee_cents: 500,
        stripe_secret_key: None,
        stripe_webhook_secret: None,
        app_origin: "http://localhost:3000".into(),
    };

    Ok(AppState {
        orm,
        config: Arc::new(config),
        gateway: Some(gateway),
        audit: AuditLog::disabled(),
    })
}

async fn create_user(orm: &DatabaseConnection, email: &str, plan: &str) -> anyhow::Result<Uuid> {
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        email: Set(email.into()),
        password_hash: Set("not-used".into()),
        name: Set(email.into()),
        role: Set("user".into()),
        plan: Set(plan.into()),
        created_at: NotSet,
    }
    .insert(orm)
    .await?;
    Ok(user.id)
}

async fn create_store(orm: &DatabaseConnection, owner: Uuid, username: &str) -> anyhow::Result<Uuid> {
    let store = StoreActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(owner),
        name: Set(username.into()),
        username: Set(username.into()),
        description: Set("test store".into()),
        email: Set(format!("{username}@example.com")),
        contact: Set("5550100".into()),
        address: Set("somewhere".into()),
        logo: Set("logo.png".into()),
        status: Set(StoreStatus::Approved),
        is_active: Set(true),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(orm)
    .await?;
    Ok(store.id)
}

async fn create_product(
    orm: &DatabaseConnection,
    store_id: Uuid,
    name: &str,
    price: i64,
    stock: i32,
) -> anyhow::Result<Uuid> {
    let product = ProductActive {
        id: Set(Uuid::new_v4()),
        store_id: Set(store_id),
        name: Set(name.into()),
        description: Set("for testing".into()),
        mrp: Set(price * 2),
        price: Set(price),
        category: Set("Test".into()),
        images: Set(serde_json::json!(["img.png"])),
        in_stock: Set(true),
        stock: Set(stock),
        created_at: NotSet,
    }
    .insert(orm)
    .await?;
    Ok(product.id)
}

async fn stock_of(orm: &DatabaseConnection, product_id: Uuid) -> anyhow::Result<i32> {
    let product = Products::find_by_id(product_id)
        .one(orm)
        .await?
        .ok_or_else(|| anyhow::anyhow!("product {product_id} missing"))?;
    Ok(product.stock)
}

async fn create_coupon(
    orm: &DatabaseConnection,
    code: &str,
    percent: i32,
    for_new_user: bool,
    valid_for: Duration,
) -> anyhow::Result<()> {
    CouponActive {
        code: Set(code.into()),
        description: Set("test coupon".into()),
        discount_percent: Set(percent),
        for_new_user: Set(for_new_user),
        for_member: Set(false),
        is_public: Set(true),
        expires_at: Set((Utc::now() + valid_for).into()),
        created_at: NotSet,
    }
    .insert(orm)
    .await?;
    Ok(())
}
