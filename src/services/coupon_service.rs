use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::{
    checkout::{CouponError, check_coupon, normalize_code},
    dto::coupons::{CouponList, CreateCouponRequest, VerifyCouponRequest},
    entity::{
        coupons::{self, ActiveModel as CouponActive, Column as CouponCol, Entity as Coupons},
        orders::{Column as OrderCol, Entity as Orders},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Coupon,
    response::{ApiResponse, Meta},
    state::AppState,
};

/// Looks the coupon up by its normalized code and checks expiry and
/// eligibility for this buyer.
pub async fn validate_coupon<C: ConnectionTrait>(
    conn: &C,
    code: &str,
    user_id: Uuid,
    is_member: bool,
    now: DateTime<Utc>,
) -> AppResult<coupons::Model> {
    let coupon = Coupons::find_by_id(normalize_code(code))
        .one(conn)
        .await?
        .ok_or(CouponError::NotFound)?;

    let terms = coupon.terms();
    let prior_orders = if terms.for_new_user {
        Orders::find()
            .filter(OrderCol::UserId.eq(user_id))
            .count(conn)
            .await?
    } else {
        0
    };

    check_coupon(&terms, now, prior_orders, is_member)?;
    Ok(coupon)
}

pub async fn verify_coupon(
    state: &AppState,
    user: &AuthUser,
    payload: VerifyCouponRequest,
) -> AppResult<ApiResponse<Coupon>> {
    let coupon = validate_coupon(
        &state.orm,
        &payload.code,
        user.user_id,
        user.is_member(),
        Utc::now(),
    )
    .await?;

    Ok(ApiResponse::success(
        "coupon applied successfully",
        coupon.into(),
        Some(Meta::empty()),
    ))
}

pub async fn create_coupon(
    state: &AppState,
    user: &AuthUser,
    payload: CreateCouponRequest,
) -> AppResult<ApiResponse<Coupon>> {
    ensure_admin(user)?;
    let code = normalize_code(&payload.code);
    if code.is_empty() {
        return Err(AppError::BadRequest("coupon code is required".into()));
    }
    if !(0..=100).contains(&payload.discount_percent) {
        return Err(AppError::BadRequest(
            "discount_percent must be between 0 and 100".into(),
        ));
    }
    if Coupons::find_by_id(code.clone()).one(&state.orm).await?.is_some() {
        return Err(AppError::BadRequest("coupon code already exists".into()));
    }

    let coupon = CouponActive {
        code: Set(code),
        description: Set(payload.description),
        discount_percent: Set(payload.discount_percent),
        for_new_user: Set(payload.for_new_user),
        for_member: Set(payload.for_member),
        is_public: Set(payload.is_public),
        expires_at: Set(payload.expires_at.into()),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    state.audit.record(
        Some(user.user_id),
        "coupon_create",
        Some("coupons"),
        Some(serde_json::json!({ "code": coupon.code })),
    );

    Ok(ApiResponse::success(
        "Coupon added successfully",
        coupon.into(),
        Some(Meta::empty()),
    ))
}

pub async fn list_coupons(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<CouponList>> {
    ensure_admin(user)?;
    let items: Vec<Coupon> = Coupons::find()
        .order_by_desc(CouponCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Coupon::from)
        .collect();
    let total = items.len() as i64;
    Ok(ApiResponse::success(
        "Coupons",
        CouponList { items },
        Some(Meta::new(1, total, total)),
    ))
}

pub async fn delete_coupon(
    state: &AppState,
    user: &AuthUser,
    code: &str,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let code = normalize_code(code);
    let result = Coupons::delete_by_id(code.clone()).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    state.audit.record(
        Some(user.user_id),
        "coupon_delete",
        Some("coupons"),
        Some(serde_json::json!({ "code": code })),
    );

    Ok(ApiResponse::ack("Coupon deleted successfully"))
}
