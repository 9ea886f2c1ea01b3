//! Hosted checkout provider seam.
//!
//! Order placement only needs "create a session for this amount"; the
//! provider's confirmation arrives later through the webhook.

pub mod stripe;
pub mod webhook;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

pub use stripe::StripeGateway;
pub use webhook::{SessionOutcome, WebhookError, WebhookEvent};

/// Value of the `appId` metadata entry on sessions created by this service.
pub const APP_ID: &str = "gocart";

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("payment provider unreachable: {0}")]
    Http(#[from] reqwest::Error),

    #[error("payment provider rejected the request ({status}): {message}")]
    Provider { status: u16, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostedCheckoutRequest {
    pub amount_cents: i64,
    pub currency: String,
    pub order_ids: Vec<Uuid>,
    pub user_id: Uuid,
    pub success_url: String,
    pub cancel_url: String,
    pub expires_at: DateTime<Utc>,
}

impl HostedCheckoutRequest {
    pub fn order_ids_metadata(&self) -> String {
        self.order_ids
            .iter()
            .map(Uuid::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HostedCheckoutSession {
    pub id: String,
    pub url: Option<String>,
    /// Unix seconds.
    pub expires_at: i64,
}

#[async_trait]
pub trait CheckoutGateway: Send + Sync {
    async fn create_session(
        &self,
        request: &HostedCheckoutRequest,
    ) -> Result<HostedCheckoutSession, PaymentError>;
}
