use axum::Router;

use crate::state::AppState;

pub mod address;
pub mod admin;
pub mod auth;
pub mod cart;
pub mod coupon;
pub mod doc;
pub mod health;
pub mod orders;
pub mod params;
pub mod payments;
pub mod products;
pub mod store;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/addresses", address::router())
        .nest("/products", products::router())
        .nest("/shop", products::shop_router())
        .nest("/cart", cart::router())
        .nest("/coupon", coupon::router())
        .nest("/orders", orders::router())
        .nest("/payments", payments::router())
        .nest("/store", store::router())
        .nest("/admin", admin::router())
}
