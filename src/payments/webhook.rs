use std::collections::HashMap;

use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use thiserror::Error;
use uuid::Uuid;

use super::APP_ID;

/// Signatures older than this many seconds are refused.
pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WebhookError {
    #[error("malformed signature header")]
    MalformedHeader,

    #[error("signature mismatch")]
    SignatureMismatch,

    #[error("signature timestamp outside tolerance")]
    Stale,

    #[error("invalid payload: {0}")]
    InvalidPayload(String),
}

#[derive(Debug, Deserialize)]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub kind: String,
    pub data: EventData,
}

#[derive(Debug, Deserialize)]
pub struct EventData {
    pub object: SessionObject,
}

#[derive(Debug, Deserialize)]
pub struct SessionObject {
    pub id: String,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum SessionOutcome {
    Completed { user_id: Uuid, order_ids: Vec<Uuid> },
    Expired { order_ids: Vec<Uuid> },
    Ignored,
}

fn mac_for(secret: &str, timestamp: &str, payload: &[u8]) -> Result<HmacSha256, WebhookError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| WebhookError::SignatureMismatch)?;
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(mac)
}

/// Builds a `Stripe-Signature` header value for `payload`.
pub fn signature_header(payload: &[u8], secret: &str, timestamp: i64) -> Result<String, WebhookError> {
    let ts = timestamp.to_string();
    let digest = mac_for(secret, &ts, payload)?.finalize().into_bytes();
    Ok(format!("t={ts},v1={}", hex::encode(digest)))
}

/// Checks a `t=<unix>,v1=<hex>[,v1=...]` header against `payload`.
pub fn verify_signature(
    payload: &[u8],
    header: &str,
    secret: &str,
    now: i64,
) -> Result<(), WebhookError> {
    let mut timestamp = None;
    let mut signatures = Vec::new();
    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp = Some(value),
            Some(("v1", value)) => signatures.push(value),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or(WebhookError::MalformedHeader)?;
    if signatures.is_empty() {
        return Err(WebhookError::MalformedHeader);
    }
    let signed_at: i64 = timestamp
        .parse()
        .map_err(|_| WebhookError::MalformedHeader)?;
    if now.abs_diff(signed_at) > SIGNATURE_TOLERANCE_SECS.unsigned_abs() {
        return Err(WebhookError::Stale);
    }

    for candidate in signatures {
        let Ok(bytes) = hex::decode(candidate) else {
            continue;
        };
        if mac_for(secret, timestamp, payload)?
            .verify_slice(&bytes)
            .is_ok()
        {
            return Ok(());
        }
    }
    Err(WebhookError::SignatureMismatch)
}

fn parse_order_ids(metadata: &HashMap<String, String>) -> Result<Vec<Uuid>, WebhookError> {
    let raw = metadata
        .get("orderIds")
        .ok_or_else(|| WebhookError::InvalidPayload("missing orderIds".into()))?;
    raw.split(',')
        .filter(|id| !id.trim().is_empty())
        .map(|id| {
            Uuid::parse_str(id.trim())
                .map_err(|_| WebhookError::InvalidPayload(format!("bad order id {id}")))
        })
        .collect()
}

impl WebhookEvent {
    pub fn parse(payload: &[u8]) -> Result<Self, WebhookError> {
        serde_json::from_slice(payload).map_err(|e| WebhookError::InvalidPayload(e.to_string()))
    }

    /// Maps the event onto what the order store has to do. Sessions created
    /// by other applications on the same account are ignored.
    pub fn outcome(&self) -> Result<SessionOutcome, WebhookError> {
        let metadata = &self.data.object.metadata;
        if metadata.get("appId").map(String::as_str) != Some(APP_ID) {
            return Ok(SessionOutcome::Ignored);
        }

        match self.kind.as_str() {
            "checkout.session.completed" => {
                let user_id = metadata
                    .get("userId")
                    .and_then(|id| Uuid::parse_str(id).ok())
                    .ok_or_else(|| WebhookError::InvalidPayload("missing userId".into()))?;
                Ok(SessionOutcome::Completed {
                    user_id,
                    order_ids: parse_order_ids(metadata)?,
                })
            }
            "checkout.session.expired" => Ok(SessionOutcome::Expired {
                order_ids: parse_order_ids(metadata)?,
            }),
            _ => Ok(SessionOutcome::Ignored),
        }
    }
}
