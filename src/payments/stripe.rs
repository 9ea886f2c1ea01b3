use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{APP_ID, CheckoutGateway, HostedCheckoutRequest, HostedCheckoutSession, PaymentError};

const DEFAULT_API_BASE: &str = "https://api.stripe.com";

/// Stripe Checkout adapter. Only session creation goes through here.
pub struct StripeGateway {
    client: Client,
    api_base: String,
    secret_key: String,
}

#[derive(Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Deserialize)]
struct StripeErrorDetail {
    message: Option<String>,
}

impl StripeGateway {
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(secret_key: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        Self::with_api_base(secret_key, DEFAULT_API_BASE, timeout)
    }

    pub fn with_api_base(
        secret_key: impl Into<String>,
        api_base: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_base: api_base.into(),
            secret_key: secret_key.into(),
        })
    }
}

/// Form fields for `POST /v1/checkout/sessions`: one line item carrying the
/// full amount.
fn session_form(request: &HostedCheckoutRequest) -> Vec<(&'static str, String)> {
    vec![
        ("mode", "payment".to_string()),
        ("payment_method_types[0]", "card".to_string()),
        ("line_items[0][quantity]", "1".to_string()),
        (
            "line_items[0][price_data][currency]",
            request.currency.clone(),
        ),
        (
            "line_items[0][price_data][product_data][name]",
            "Order".to_string(),
        ),
        (
            "line_items[0][price_data][unit_amount]",
            request.amount_cents.to_string(),
        ),
        ("expires_at", request.expires_at.timestamp().to_string()),
        ("success_url", request.success_url.clone()),
        ("cancel_url", request.cancel_url.clone()),
        ("metadata[orderIds]", request.order_ids_metadata()),
        ("metadata[userId]", request.user_id.to_string()),
        ("metadata[appId]", APP_ID.to_string()),
    ]
}

#[async_trait]
impl CheckoutGateway for StripeGateway {
    async fn create_session(
        &self,
        request: &HostedCheckoutRequest,
    ) -> Result<HostedCheckoutSession, PaymentError> {
        let url = format!("{}/v1/checkout/sessions", self.api_base.trim_end_matches('/'));
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.secret_key)
            .form(&session_form(request))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<StripeErrorBody>()
                .await
                .ok()
                .and_then(|body| body.error.message)
                .unwrap_or_else(|| status.to_string());
            return Err(PaymentError::Provider {
                status: status.as_u16(),
                message,
            });
        }

        let session = response.json::<HostedCheckoutSession>().await?;
        tracing::info!(session_id = %session.id, "stripe checkout session created");
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    use super::*;

    #[test]
    fn form_carries_amount_expiry_and_metadata() {
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        let request = HostedCheckoutRequest {
            amount_cents: 2750,
            currency: "usd".into(),
            order_ids: vec![first, second],
            user_id: Uuid::nil(),
            success_url: "https://shop.test/loading?nextUrl=orders".into(),
            cancel_url: "https://shop.test/cart".into(),
            expires_at: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        };

        let form = session_form(&request);
        let get = |key: &str| {
            form.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.clone())
                .unwrap()
        };

        assert_eq!(get("line_items[0][price_data][unit_amount]"), "2750");
        assert_eq!(get("expires_at"), "1700000000");
        assert_eq!(get("metadata[orderIds]"), format!("{first},{second}"));
        assert_eq!(get("metadata[appId]"), "gocart");
    }
}
