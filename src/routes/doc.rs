use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    checkout::PaymentMethod,
    dto::{
        address::{AddressList, CreateAddressRequest},
        admin::{DashboardData, StoreDecisionRequest, StoreList},
        auth::{LoginRequest, LoginResponse, RegisterRequest},
        cart::{AddToCartRequest, CartLine, CartList},
        coupons::{CouponList, CreateCouponRequest, VerifyCouponRequest},
        orders::{
            OrderLineRequest, OrderList, OrderWithItems, PlaceOrderRequest, PlacedOrders,
            UpdateOrderStatusRequest,
        },
        products::{CreateProductRequest, ProductList, ShopPage},
        stores::CreateStoreRequest,
    },
    entity::{orders::OrderStatus, stores::StoreStatus},
    models::{Address, CartItem, Coupon, Order, OrderItem, Product, Store, User},
    payments::HostedCheckoutSession,
    response::{ApiResponse, Meta},
    routes::{
        address, admin, auth, cart, coupon, health, orders, params, payments, products, store,
    },
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        address::list_addresses,
        address::add_address,
        products::list_products,
        products::get_product,
        products::shop_page,
        cart::cart_list,
        cart::add_to_cart,
        cart::remove_from_cart,
        coupon::verify_coupon,
        orders::list_orders,
        orders::place_order,
        orders::get_order,
        payments::webhook,
        store::create_store,
        store::my_store,
        store::list_products,
        store::create_product,
        store::toggle_stock,
        store::list_orders,
        store::update_order_status,
        admin::dashboard,
        admin::list_stores,
        admin::decide_store,
        admin::toggle_store,
        admin::list_coupons,
        admin::create_coupon,
        admin::delete_coupon
    ),
    components(
        schemas(
            User,
            Address,
            Store,
            Product,
            CartItem,
            Coupon,
            Order,
            OrderItem,
            OrderStatus,
            StoreStatus,
            PaymentMethod,
            HostedCheckoutSession,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            CreateAddressRequest,
            AddressList,
            AddToCartRequest,
            CartLine,
            CartList,
            VerifyCouponRequest,
            CreateCouponRequest,
            CouponList,
            OrderLineRequest,
            PlaceOrderRequest,
            PlacedOrders,
            UpdateOrderStatusRequest,
            OrderWithItems,
            OrderList,
            CreateProductRequest,
            ProductList,
            ShopPage,
            CreateStoreRequest,
            StoreDecisionRequest,
            StoreList,
            DashboardData,
            params::Pagination,
            params::ProductQuery,
            params::OrderListQuery,
            params::StoreListQuery,
            Meta,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<PlacedOrders>,
            ApiResponse<OrderWithItems>,
            ApiResponse<OrderList>,
            ApiResponse<Coupon>,
            ApiResponse<Store>,
            ApiResponse<DashboardData>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Authentication endpoints"),
        (name = "Addresses", description = "Shipping address endpoints"),
        (name = "Products", description = "Catalogue and storefront endpoints"),
        (name = "Cart", description = "Cart endpoints"),
        (name = "Coupons", description = "Coupon verification"),
        (name = "Orders", description = "Checkout and order history"),
        (name = "Payments", description = "Payment provider callbacks"),
        (name = "Store", description = "Seller endpoints"),
        (name = "Admin", description = "Admin endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
