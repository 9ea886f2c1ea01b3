use std::collections::HashMap;

use chrono::{Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, Condition, ConnectionTrait, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use sea_orm::sea_query::{Expr, LockType};
use uuid::Uuid;

use crate::{
    checkout::{
        CartClearing, CheckoutError, LineItem, PaymentMethod, SESSION_TTL_MINUTES, cart_clearing,
        compute_totals,
    },
    dto::orders::{OrderLineRequest, OrderList, OrderWithItems, PlaceOrderRequest, PlacedOrders},
    entity::{
        addresses::{Column as AddressCol, Entity as Addresses},
        order_items::{ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems},
        orders::{self, ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, OrderStatus},
        products::{Column as ProdCol, Entity as Products},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Coupon, Order, OrderItem},
    payments::HostedCheckoutRequest,
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    services::{cart_service::clear_cart, coupon_service::validate_coupon},
    state::AppState,
};

/// Collapses repeated products into one line, keeping first-seen order.
pub fn merge_lines(lines: &[OrderLineRequest]) -> Result<Vec<OrderLineRequest>, CheckoutError> {
    let mut merged: Vec<OrderLineRequest> = Vec::with_capacity(lines.len());
    for line in lines {
        match merged.iter_mut().find(|m| m.product_id == line.product_id) {
            Some(existing) => {
                existing.quantity = existing
                    .quantity
                    .checked_add(line.quantity)
                    .ok_or(CheckoutError::InvalidQuantity(line.product_id))?;
            }
            None => merged.push(line.clone()),
        }
    }
    Ok(merged)
}

/// Places one order per store for the submitted lines, then dispatches
/// payment. Orders are committed before a hosted checkout session is
/// requested, so a provider failure leaves unpaid orders behind. Hosted
/// orders take their stock only once the payment is confirmed.
pub async fn place_order(
    state: &AppState,
    user: &AuthUser,
    origin: &str,
    payload: PlaceOrderRequest,
) -> AppResult<ApiResponse<PlacedOrders>> {
    if payload.items.is_empty() {
        return Err(CheckoutError::EmptyOrder.into());
    }
    if let Some(line) = payload.items.iter().find(|line| line.quantity <= 0) {
        return Err(CheckoutError::InvalidQuantity(line.product_id).into());
    }
    let method = payload.payment_method;
    if method == PaymentMethod::Stripe && state.gateway.is_none() {
        return Err(AppError::BadRequest(
            "online payment is not available".into(),
        ));
    }

    let now = Utc::now();
    let txn = state.orm.begin().await?;

    let address = Addresses::find_by_id(payload.address_id)
        .filter(AddressCol::UserId.eq(user.user_id))
        .one(&txn)
        .await?;
    if address.is_none() {
        return Err(AppError::BadRequest("address not found".into()));
    }

    let coupon = match payload.coupon_code.as_deref().filter(|c| !c.trim().is_empty()) {
        Some(code) => Some(validate_coupon(&txn, code, user.user_id, user.is_member(), now).await?),
        None => None,
    };

    let mut lines = Vec::with_capacity(payload.items.len());
    for line in merge_lines(&payload.items)? {
        let product = Products::find_by_id(line.product_id)
            .lock(LockType::Update)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::BadRequest(format!("product {} not found", line.product_id)))?;
        if !product.in_stock || product.stock < line.quantity {
            return Err(AppError::BadRequest(format!(
                "Insufficient stock for product {}",
                product.id
            )));
        }
        lines.push(LineItem {
            product_id: product.id,
            store_id: product.store_id,
            quantity: line.quantity,
            unit_price: product.price,
        });
    }

    let totals = compute_totals(
        &lines,
        coupon.as_ref().map(|c| c.discount_percent),
        user.is_member(),
        state.config.shipping_fee_cents,
    )?;

    let coupon_snapshot = match &coupon {
        Some(model) => serde_json::to_value(Coupon::from(model.clone()))
            .map_err(|e| AppError::Internal(e.into()))?,
        None => serde_json::json!({}),
    };

    let settle_now = cart_clearing(method) == CartClearing::Immediate;
    let mut order_ids = Vec::with_capacity(totals.orders.len());
    for store_order in &totals.orders {
        let order = OrderActive {
            id: Set(Uuid::new_v4()),
            user_id: Set(user.user_id),
            store_id: Set(store_order.store_id),
            address_id: Set(payload.address_id),
            total: Set(store_order.total),
            status: Set(OrderStatus::OrderPlaced),
            payment_method: Set(method.to_string()),
            is_paid: Set(false),
            is_coupon_used: Set(coupon.is_some()),
            coupon: Set(coupon_snapshot.clone()),
            created_at: NotSet,
            updated_at: NotSet,
        }
        .insert(&txn)
        .await?;

        for item in &store_order.items {
            OrderItemActive {
                id: Set(Uuid::new_v4()),
                order_id: Set(order.id),
                product_id: Set(item.product_id),
                quantity: Set(item.quantity),
                price: Set(item.unit_price),
                created_at: NotSet,
            }
            .insert(&txn)
            .await?;

            if settle_now {
                take_stock(&txn, item.product_id, item.quantity).await?;
            }
        }

        order_ids.push(order.id);
    }

    if settle_now {
        clear_cart(&txn, user.user_id).await?;
    }

    txn.commit().await?;

    tracing::info!(
        user_id = %user.user_id,
        orders = order_ids.len(),
        amount = totals.amount,
        payment_method = %method,
        "orders placed"
    );
    state.audit.record(
        Some(user.user_id),
        "order_place",
        Some("orders"),
        Some(serde_json::json!({
            "order_ids": order_ids,
            "amount": totals.amount,
            "payment_method": method,
            "coupon": coupon.as_ref().map(|c| c.code.clone()),
        })),
    );

    let session = match (method, &state.gateway) {
        (PaymentMethod::Stripe, Some(gateway)) => {
            let origin = origin.trim_end_matches('/');
            let request = HostedCheckoutRequest {
                amount_cents: totals.amount,
                currency: "usd".into(),
                order_ids: order_ids.clone(),
                user_id: user.user_id,
                success_url: format!("{origin}/loading?nextUrl=orders"),
                cancel_url: format!("{origin}/cart"),
                expires_at: now + Duration::minutes(SESSION_TTL_MINUTES),
            };
            Some(gateway.create_session(&request).await?)
        }
        _ => None,
    };

    let message = match method {
        PaymentMethod::Cod => "Order placed successfully",
        PaymentMethod::Stripe => "Checkout session created",
    };
    Ok(ApiResponse::success(
        message,
        PlacedOrders {
            order_ids,
            amount: totals.amount,
            payment_method: method,
            session,
        },
        Some(Meta::empty()),
    ))
}

pub async fn take_stock<C: ConnectionTrait>(
    conn: &C,
    product_id: Uuid,
    quantity: i32,
) -> AppResult<()> {
    Products::update_many()
        .col_expr(ProdCol::Stock, Expr::col(ProdCol::Stock).sub(quantity))
        .filter(ProdCol::Id.eq(product_id))
        .exec(conn)
        .await?;
    Ok(())
}

/// Orders the customer can see: cash on delivery, or hosted checkout that
/// has been paid.
pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all()
        .add(OrderCol::UserId.eq(user.user_id))
        .add(
            Condition::any()
                .add(OrderCol::PaymentMethod.eq(PaymentMethod::Cod.as_str()))
                .add(
                    Condition::all()
                        .add(OrderCol::PaymentMethod.eq(PaymentMethod::Stripe.as_str()))
                        .add(OrderCol::IsPaid.eq(true)),
                ),
        );
    if let Some(status) = query.status {
        condition = condition.add(OrderCol::Status.eq(status));
    }

    let mut finder = Orders::find().filter(condition);
    finder = match query.sort_order.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;
    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    let items = with_items(&state.orm, orders).await?;
    Ok(ApiResponse::success(
        "Orders fetched successfully",
        OrderList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let order = Orders::find_by_id(id)
        .filter(OrderCol::UserId.eq(user.user_id))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let data = with_items(&state.orm, vec![order])
        .await?
        .pop()
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("OK", data, Some(Meta::empty())))
}

/// Loads the line items of `orders` with one query and pairs them up,
/// keeping the order of `orders`.
pub async fn with_items<C: ConnectionTrait>(
    conn: &C,
    orders: Vec<orders::Model>,
) -> AppResult<Vec<OrderWithItems>> {
    if orders.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
    let mut grouped: HashMap<Uuid, Vec<OrderItem>> = HashMap::new();
    for item in OrderItems::find()
        .filter(OrderItemCol::OrderId.is_in(ids))
        .order_by_asc(OrderItemCol::CreatedAt)
        .all(conn)
        .await?
    {
        grouped.entry(item.order_id).or_default().push(item.into());
    }

    Ok(orders
        .into_iter()
        .map(|order| {
            let items = grouped.remove(&order.id).unwrap_or_default();
            OrderWithItems {
                order: Order::from(order),
                items,
            }
        })
        .collect())
}
