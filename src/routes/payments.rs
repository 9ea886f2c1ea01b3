use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::HeaderMap,
    routing::post,
};

use crate::{
    error::AppResult, response::ApiResponse, services::payment_service, state::AppState,
};

pub const SIGNATURE_HEADER: &str = "stripe-signature";

pub fn router() -> Router<AppState> {
    Router::new().route("/webhook", post(webhook))
}

#[utoipa::path(
    post,
    path = "/api/payments/webhook",
    request_body(content = String, description = "Raw Stripe event payload", content_type = "application/json"),
    responses(
        (status = 200, description = "Event received", body = ApiResponse<serde_json::Value>),
        (status = 400, description = "Unreadable event"),
        (status = 401, description = "Missing or invalid signature")
    ),
    tag = "Payments"
)]
pub async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());
    let resp = payment_service::handle_webhook(&state, signature, &body).await?;
    Ok(Json(resp))
}
