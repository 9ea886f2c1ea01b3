use chrono::Utc;
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QuerySelect, TransactionTrait,
};
use sea_orm::sea_query::{Expr, LockType};
use uuid::Uuid;

use crate::{
    checkout::PaymentMethod,
    entity::{
        order_items::{Column as OrderItemCol, Entity as OrderItems},
        orders::{Column as OrderCol, Entity as Orders},
    },
    error::{AppError, AppResult},
    payments::{SessionOutcome, WebhookEvent, webhook::verify_signature},
    response::ApiResponse,
    services::{cart_service::clear_cart, order_service::take_stock},
    state::AppState,
};

/// Marks the buyer's unpaid hosted-checkout orders paid, takes their stock
/// and empties the cart. Orders already paid are skipped, so a redelivered
/// event changes nothing. Returns the number of orders newly paid.
pub async fn confirm_payment<C: ConnectionTrait + TransactionTrait>(
    conn: &C,
    user_id: Uuid,
    order_ids: &[Uuid],
) -> AppResult<u64> {
    let txn = conn.begin().await?;
    let pending: Vec<Uuid> = Orders::find()
        .filter(OrderCol::Id.is_in(order_ids.to_vec()))
        .filter(OrderCol::UserId.eq(user_id))
        .filter(OrderCol::PaymentMethod.eq(PaymentMethod::Stripe.as_str()))
        .filter(OrderCol::IsPaid.eq(false))
        .lock(LockType::Update)
        .all(&txn)
        .await?
        .into_iter()
        .map(|order| order.id)
        .collect();
    if pending.is_empty() {
        txn.commit().await?;
        return Ok(0);
    }

    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.is_in(pending.clone()))
        .all(&txn)
        .await?;
    for item in &items {
        take_stock(&txn, item.product_id, item.quantity).await?;
    }

    Orders::update_many()
        .col_expr(OrderCol::IsPaid, Expr::value(true))
        .col_expr(OrderCol::UpdatedAt, Expr::value(Utc::now()))
        .filter(OrderCol::Id.is_in(pending.clone()))
        .exec(&txn)
        .await?;
    clear_cart(&txn, user_id).await?;
    txn.commit().await?;
    Ok(pending.len() as u64)
}

pub async fn handle_webhook(
    state: &AppState,
    signature: Option<&str>,
    body: &[u8],
) -> AppResult<ApiResponse<serde_json::Value>> {
    let secret = state
        .config
        .stripe_webhook_secret
        .as_deref()
        .ok_or(AppError::Unauthorized)?;
    let signature = signature.ok_or(AppError::Unauthorized)?;
    verify_signature(body, signature, secret, Utc::now().timestamp())?;

    let event = WebhookEvent::parse(body)?;
    match event.outcome()? {
        SessionOutcome::Completed { user_id, order_ids } => {
            let updated = confirm_payment(&state.orm, user_id, &order_ids).await?;
            tracing::info!(
                session_id = %event.data.object.id,
                %user_id,
                updated,
                "hosted checkout confirmed"
            );
            state.audit.record(
                Some(user_id),
                "order_paid",
                Some("orders"),
                Some(serde_json::json!({ "order_ids": order_ids })),
            );
        }
        SessionOutcome::Expired { order_ids } => {
            tracing::info!(
                session_id = %event.data.object.id,
                orders = order_ids.len(),
                "hosted checkout expired, orders stay unpaid and keep no stock"
            );
        }
        SessionOutcome::Ignored => {
            tracing::debug!(kind = %event.kind, "webhook event ignored");
        }
    }

    Ok(ApiResponse::ack("received"))
}
