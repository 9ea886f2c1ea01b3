use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::{
    dto::address::{AddressList, CreateAddressRequest},
    entity::addresses::{ActiveModel as AddressActive, Column as AddressCol, Entity as Addresses},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Address,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn add_address(
    state: &AppState,
    user: &AuthUser,
    payload: CreateAddressRequest,
) -> AppResult<ApiResponse<Address>> {
    let required = [
        &payload.name,
        &payload.street,
        &payload.city,
        &payload.zip,
        &payload.country,
        &payload.phone,
    ];
    if required.iter().any(|field| field.trim().is_empty()) {
        return Err(AppError::BadRequest("missing address details".into()));
    }

    let address = AddressActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        name: Set(payload.name),
        email: Set(payload.email),
        street: Set(payload.street),
        city: Set(payload.city),
        state: Set(payload.state),
        zip: Set(payload.zip),
        country: Set(payload.country),
        phone: Set(payload.phone),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(ApiResponse::success(
        "Address added successfully",
        address.into(),
        Some(Meta::empty()),
    ))
}

pub async fn list_addresses(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<AddressList>> {
    let items: Vec<Address> = Addresses::find()
        .filter(AddressCol::UserId.eq(user.user_id))
        .order_by_desc(AddressCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Address::from)
        .collect();

    let total = items.len() as i64;
    Ok(ApiResponse::success(
        "OK",
        AddressList { items },
        Some(Meta::new(1, total, total)),
    ))
}
