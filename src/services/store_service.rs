use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    dto::{
        orders::{OrderList, OrderWithItems, UpdateOrderStatusRequest},
        products::{CreateProductRequest, ProductList},
        stores::CreateStoreRequest,
    },
    entity::{
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders},
        products::{ActiveModel as ProductActive, Column as ProdCol, Entity as Products},
        stores::{self, ActiveModel as StoreActive, Column as StoreCol, Entity as Stores, StoreStatus},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Product, Store},
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    services::order_service::with_items,
    state::AppState,
};

/// Resolves the caller's store and requires it to be approved and active.
pub async fn seller_store(state: &AppState, user: &AuthUser) -> AppResult<stores::Model> {
    let store = Stores::find()
        .filter(StoreCol::UserId.eq(user.user_id))
        .one(&state.orm)
        .await?
        .ok_or(AppError::Forbidden)?;
    if !store.can_sell() {
        return Err(AppError::Forbidden);
    }
    Ok(store)
}

fn valid_username(username: &str) -> bool {
    !username.is_empty()
        && username
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
}

pub async fn create_store(
    state: &AppState,
    user: &AuthUser,
    payload: CreateStoreRequest,
) -> AppResult<ApiResponse<Store>> {
    let username = payload.username.trim().to_lowercase();
    if payload.name.trim().is_empty() || !valid_username(&username) {
        return Err(AppError::BadRequest("missing store info".into()));
    }

    let existing = Stores::find()
        .filter(StoreCol::UserId.eq(user.user_id))
        .one(&state.orm)
        .await?;
    if existing.is_some() {
        return Err(AppError::BadRequest("store already registered".into()));
    }

    let taken = Stores::find()
        .filter(StoreCol::Username.eq(username.as_str()))
        .one(&state.orm)
        .await?;
    if taken.is_some() {
        return Err(AppError::BadRequest("username already taken".into()));
    }

    let store = StoreActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        name: Set(payload.name),
        username: Set(username),
        description: Set(payload.description),
        email: Set(payload.email),
        contact: Set(payload.contact),
        address: Set(payload.address),
        logo: Set(payload.logo),
        status: Set(StoreStatus::Pending),
        is_active: Set(false),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    state.audit.record(
        Some(user.user_id),
        "store_apply",
        Some("stores"),
        Some(serde_json::json!({ "store_id": store.id })),
    );

    Ok(ApiResponse::success(
        "applied, waiting for approval",
        store.into(),
        Some(Meta::empty()),
    ))
}

/// The caller's store in any status.
pub async fn my_store(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<Store>> {
    let store = Stores::find()
        .filter(StoreCol::UserId.eq(user.user_id))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Store", store.into(), Some(Meta::empty())))
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    let store = seller_store(state, user).await?;
    if payload.name.trim().is_empty()
        || payload.description.trim().is_empty()
        || payload.category.trim().is_empty()
        || payload.mrp <= 0
        || payload.price <= 0
        || payload.stock < 0
        || payload.images.is_empty()
    {
        return Err(AppError::BadRequest("missing product info".into()));
    }

    let product = ProductActive {
        id: Set(Uuid::new_v4()),
        store_id: Set(store.id),
        name: Set(payload.name),
        description: Set(payload.description),
        mrp: Set(payload.mrp),
        price: Set(payload.price),
        category: Set(payload.category),
        images: Set(serde_json::json!(payload.images)),
        in_stock: Set(true),
        stock: Set(payload.stock),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    state.audit.record(
        Some(user.user_id),
        "product_create",
        Some("products"),
        Some(serde_json::json!({ "product_id": product.id, "store_id": store.id })),
    );

    Ok(ApiResponse::success(
        "product added successfully",
        product.into(),
        Some(Meta::empty()),
    ))
}

pub async fn list_store_products(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<ProductList>> {
    let store = seller_store(state, user).await?;
    let items: Vec<Product> = Products::find()
        .filter(ProdCol::StoreId.eq(store.id))
        .order_by_desc(ProdCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Product::from)
        .collect();
    let total = items.len() as i64;
    Ok(ApiResponse::success(
        "Products",
        ProductList { items },
        Some(Meta::new(1, total, total)),
    ))
}

pub async fn toggle_stock(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
) -> AppResult<ApiResponse<Product>> {
    let store = seller_store(state, user).await?;
    let product = Products::find_by_id(product_id)
        .filter(ProdCol::StoreId.eq(store.id))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let in_stock = !product.in_stock;
    let mut active: ProductActive = product.into();
    active.in_stock = Set(in_stock);
    let product = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "product stock updated successfully",
        product.into(),
        Some(Meta::empty()),
    ))
}

pub async fn list_store_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let store = seller_store(state, user).await?;
    let (page, limit, offset) = query.pagination().normalize();

    let mut finder = Orders::find().filter(OrderCol::StoreId.eq(store.id));
    if let Some(status) = query.status {
        finder = finder.filter(OrderCol::Status.eq(status));
    }
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
        "Orders",
        OrderList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn update_order_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateOrderStatusRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let store = seller_store(state, user).await?;
    let order = Orders::find_by_id(id)
        .filter(OrderCol::StoreId.eq(store.id))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    if !order.status.can_advance_to(payload.status) {
        return Err(AppError::BadRequest(format!(
            "cannot move order from {:?} to {:?}",
            order.status, payload.status
        )));
    }

    let mut active: OrderActive = order.into();
    active.status = Set(payload.status);
    active.updated_at = Set(Utc::now().into());
    let order = active.update(&state.orm).await?;

    state.audit.record(
        Some(user.user_id),
        "order_status_update",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id, "status": order.status })),
    );

    let data = with_items(&state.orm, vec![order])
        .await?
        .pop()
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Order updated", data, Some(Meta::empty())))
}
