use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use sea_orm::sea_query::Expr;
use uuid::Uuid;

use crate::{
    dto::admin::{DashboardData, StoreDecisionRequest, StoreList},
    entity::{
        orders::Entity as Orders,
        products::Entity as Products,
        stores::{ActiveModel as StoreActive, Column as StoreCol, Entity as Stores, StoreStatus},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Store,
    response::{ApiResponse, Meta},
    routes::params::StoreListQuery,
    state::AppState,
};

pub async fn list_stores(
    state: &AppState,
    user: &AuthUser,
    query: StoreListQuery,
) -> AppResult<ApiResponse<StoreList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = query.pagination().normalize();

    let mut finder = Stores::find().order_by_desc(StoreCol::CreatedAt);
    if let Some(status) = query.status {
        finder = finder.filter(StoreCol::Status.eq(status));
    }

    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Store::from)
        .collect();

    Ok(ApiResponse::success(
        "Stores",
        StoreList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

/// Approving a store also activates it; rejecting leaves `is_active` alone.
pub async fn decide_store(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: StoreDecisionRequest,
) -> AppResult<ApiResponse<Store>> {
    ensure_admin(user)?;
    if payload.status == StoreStatus::Pending {
        return Err(AppError::BadRequest(
            "status must be approved or rejected".into(),
        ));
    }

    let store = Stores::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: StoreActive = store.into();
    active.status = Set(payload.status);
    if payload.status == StoreStatus::Approved {
        active.is_active = Set(true);
    }
    active.updated_at = Set(Utc::now().into());
    let store = active.update(&state.orm).await?;

    state.audit.record(
        Some(user.user_id),
        "store_decision",
        Some("stores"),
        Some(serde_json::json!({ "store_id": store.id, "status": store.status })),
    );

    let message = match payload.status {
        StoreStatus::Approved => "Approved successfully",
        _ => "Rejected successfully",
    };
    Ok(ApiResponse::success(message, store.into(), Some(Meta::empty())))
}

pub async fn toggle_store(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Store>> {
    ensure_admin(user)?;
    let store = Stores::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let is_active = !store.is_active;
    let mut active: StoreActive = store.into();
    active.is_active = Set(is_active);
    active.updated_at = Set(Utc::now().into());
    let store = active.update(&state.orm).await?;

    state.audit.record(
        Some(user.user_id),
        "store_toggle",
        Some("stores"),
        Some(serde_json::json!({ "store_id": store.id, "is_active": store.is_active })),
    );

    Ok(ApiResponse::success(
        "Store updated successfully",
        store.into(),
        Some(Meta::empty()),
    ))
}

pub async fn dashboard(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<DashboardData>> {
    ensure_admin(user)?;
    let orders = Orders::find().count(&state.orm).await?;
    let stores = Stores::find().count(&state.orm).await?;
    let products = Products::find().count(&state.orm).await?;

    let revenue: Option<i64> = Orders::find()
        .select_only()
        .column_as(Expr::cust("COALESCE(SUM(orders.total), 0)::BIGINT"), "revenue")
        .into_tuple()
        .one(&state.orm)
        .await?;

    Ok(ApiResponse::success(
        "Dashboard",
        DashboardData {
            orders,
            stores,
            products,
            revenue: revenue.unwrap_or(0),
        },
        Some(Meta::empty()),
    ))
}
