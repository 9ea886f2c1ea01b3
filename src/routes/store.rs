use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch, post},
};
use uuid::Uuid;

use crate::{
    dto::{
        orders::{OrderList, OrderWithItems, UpdateOrderStatusRequest},
        products::{CreateProductRequest, ProductList},
        stores::CreateStoreRequest,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::{Product, Store},
    response::ApiResponse,
    routes::params::OrderListQuery,
    services::store_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(my_store).post(create_store))
        .route("/products", get(list_products).post(create_product))
        .route("/products/{id}/stock-toggle", post(toggle_stock))
        .route("/orders", get(list_orders))
        .route("/orders/{id}/status", patch(update_order_status))
}

#[utoipa::path(
    post,
    path = "/api/store",
    request_body = CreateStoreRequest,
    responses(
        (status = 200, description = "Store application submitted", body = ApiResponse<Store>),
        (status = 400, description = "Invalid details, store exists or username taken")
    ),
    security(("bearer_auth" = [])),
    tag = "Store"
)]
pub async fn create_store(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateStoreRequest>,
) -> AppResult<Json<ApiResponse<Store>>> {
    let resp = store_service::create_store(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/store",
    responses(
        (status = 200, description = "The caller's store and its status", body = ApiResponse<Store>),
        (status = 404, description = "No store")
    ),
    security(("bearer_auth" = [])),
    tag = "Store"
)]
pub async fn my_store(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<Store>>> {
    let resp = store_service::my_store(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/store/products",
    responses(
        (status = 200, description = "Products of the seller's store", body = ApiResponse<ProductList>),
        (status = 403, description = "Not an active seller")
    ),
    security(("bearer_auth" = [])),
    tag = "Store"
)]
pub async fn list_products(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let resp = store_service::list_store_products(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/store/products",
    request_body = CreateProductRequest,
    responses(
        (status = 200, description = "Product created", body = ApiResponse<Product>),
        (status = 400, description = "Missing product info"),
        (status = 403, description = "Not an active seller")
    ),
    security(("bearer_auth" = [])),
    tag = "Store"
)]
pub async fn create_product(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateProductRequest>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let resp = store_service::create_product(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/store/products/{id}/stock-toggle",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Stock flag flipped", body = ApiResponse<Product>),
        (status = 403, description = "Not an active seller"),
        (status = 404, description = "Product not in this store")
    ),
    security(("bearer_auth" = [])),
    tag = "Store"
)]
pub async fn toggle_stock(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let resp = store_service::toggle_stock(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/store/orders",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("status" = Option<String>, Query, description = "Filter by status"),
        ("sort_order" = Option<String>, Query, description = "Sort order: asc, desc")
    ),
    responses(
        (status = 200, description = "Orders received by the store", body = ApiResponse<OrderList>),
        (status = 403, description = "Not an active seller")
    ),
    security(("bearer_auth" = [])),
    tag = "Store"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp = store_service::list_store_orders(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/store/orders/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Status advanced", body = ApiResponse<OrderWithItems>),
        (status = 400, description = "Status cannot move backwards"),
        (status = 403, description = "Not an active seller"),
        (status = 404, description = "Order not in this store")
    ),
    security(("bearer_auth" = [])),
    tag = "Store"
)]
pub async fn update_order_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateOrderStatusRequest>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    let resp = store_service::update_order_status(&state, &user, id, payload).await?;
    Ok(Json(resp))
}
