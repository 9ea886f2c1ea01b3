//! The `{message, data, meta}` envelope every endpoint answers with.

use serde::Serialize;
use utoipa::ToSchema;

/// Paging details for list endpoints. Omitted keys mean "not paged".
#[derive(Debug, Default, Clone, Serialize, ToSchema)]
pub struct Meta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<i64>,
}

impl Meta {
    pub fn new(page: i64, per_page: i64, total: i64) -> Self {
        Self {
            page: Some(page),
            per_page: Some(per_page),
            total: Some(total),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub message: String,
    pub data: Option<T>,
    pub meta: Option<Meta>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T, meta: Option<Meta>) -> Self {
        Self {
            message: message.into(),
            data: Some(data),
            meta,
        }
    }

    /// Error envelope; `data` carries the error details.
    pub fn failure(message: impl Into<String>, details: T) -> Self {
        Self::success(message, details, Some(Meta::empty()))
    }
}

impl ApiResponse<serde_json::Value> {
    /// Acknowledgement with an empty object as payload.
    pub fn ack(message: impl Into<String>) -> Self {
        Self::success(message, serde_json::json!({}), Some(Meta::empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unpaged_meta_serializes_as_empty_object() {
        let body = serde_json::to_value(ApiResponse::ack("received")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({ "message": "received", "data": {}, "meta": {} })
        );

        let meta = serde_json::to_value(Meta::new(2, 20, 41)).unwrap();
        assert_eq!(meta, serde_json::json!({ "page": 2, "per_page": 20, "total": 41 }));
    }
}
