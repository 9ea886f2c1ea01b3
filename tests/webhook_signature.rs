use gocart_api::payments::{
    SessionOutcome, WebhookError, WebhookEvent,
    webhook::{SIGNATURE_TOLERANCE_SECS, signature_header, verify_signature},
};
use uuid::Uuid;

const SECRET: &str = "whsec_test";
const NOW: i64 = 1_700_000_000;

fn event(kind: &str, app_id: &str, user_id: Uuid, order_ids: &[Uuid]) -> Vec<u8> {
    let ids = order_ids
        .iter()
        .map(Uuid::to_string)
        .collect::<Vec<_>>()
        .join(",");
    serde_json::to_vec(&serde_json::json!({
        "id": "evt_1",
        "type": kind,
        "data": {
            "object": {
                "id": "cs_test_1",
                "metadata": { "appId": app_id, "userId": user_id.to_string(), "orderIds": ids }
            }
        }
    }))
    .unwrap()
}

#[test]
fn valid_signature_is_accepted() {
    let payload = br#"{"type":"ping"}"#;
    let header = signature_header(payload, SECRET, NOW).unwrap();

    assert_eq!(verify_signature(payload, &header, SECRET, NOW + 10), Ok(()));
}

#[test]
fn any_matching_v1_entry_is_enough() {
    let payload = br#"{"type":"ping"}"#;
    let good = signature_header(payload, SECRET, NOW).unwrap();
    let good_sig = good.split("v1=").nth(1).unwrap();
    let header = format!("t={NOW},v1={},v1={good_sig}", "00".repeat(32));

    assert_eq!(verify_signature(payload, &header, SECRET, NOW), Ok(()));
}

#[test]
fn tampered_payload_is_rejected() {
    let header = signature_header(b"{\"amount\":100}", SECRET, NOW).unwrap();

    assert_eq!(
        verify_signature(b"{\"amount\":1}", &header, SECRET, NOW),
        Err(WebhookError::SignatureMismatch)
    );
    assert_eq!(
        verify_signature(b"{\"amount\":100}", &header, "whsec_other", NOW),
        Err(WebhookError::SignatureMismatch)
    );
}

#[test]
fn stale_signature_is_rejected() {
    let payload = b"{}";
    let header = signature_header(payload, SECRET, NOW).unwrap();

    assert_eq!(
        verify_signature(payload, &header, SECRET, NOW + SIGNATURE_TOLERANCE_SECS + 1),
        Err(WebhookError::Stale)
    );
}

#[test]
fn extreme_timestamps_are_stale() {
    for ts in [i64::MIN, i64::MAX] {
        let header = format!("t={ts},v1={}", "00".repeat(32));
        assert_eq!(
            verify_signature(b"{}", &header, SECRET, NOW),
            Err(WebhookError::Stale),
            "timestamp {ts}"
        );
    }
}

#[test]
fn malformed_header_is_rejected() {
    for header in ["", "v1=abcd", "t=notanumber,v1=abcd", &format!("t={NOW}")] {
        assert_eq!(
            verify_signature(b"{}", header, SECRET, NOW),
            Err(WebhookError::MalformedHeader),
            "header {header:?}"
        );
    }
}

#[test]
fn completed_session_yields_user_and_orders() {
    let user_id = Uuid::new_v4();
    let orders = [Uuid::new_v4(), Uuid::new_v4()];
    let payload = event("checkout.session.completed", "gocart", user_id, &orders);

    let outcome = WebhookEvent::parse(&payload).unwrap().outcome().unwrap();

    assert_eq!(
        outcome,
        SessionOutcome::Completed {
            user_id,
            order_ids: orders.to_vec()
        }
    );
}

#[test]
fn expired_session_yields_orders() {
    let orders = [Uuid::new_v4()];
    let payload = event("checkout.session.expired", "gocart", Uuid::new_v4(), &orders);

    let outcome = WebhookEvent::parse(&payload).unwrap().outcome().unwrap();

    assert_eq!(
        outcome,
        SessionOutcome::Expired {
            order_ids: orders.to_vec()
        }
    );
}

#[test]
fn sessions_from_other_apps_are_ignored() {
    let payload = event(
        "checkout.session.completed",
        "quickcart",
        Uuid::new_v4(),
        &[Uuid::new_v4()],
    );

    let outcome = WebhookEvent::parse(&payload).unwrap().outcome().unwrap();
    assert_eq!(outcome, SessionOutcome::Ignored);
}

#[test]
fn bad_order_id_is_an_invalid_payload() {
    let payload = serde_json::to_vec(&serde_json::json!({
        "type": "checkout.session.completed",
        "data": { "object": { "id": "cs_1", "metadata": {
            "appId": "gocart", "userId": Uuid::new_v4().to_string(), "orderIds": "not-a-uuid"
        } } }
    }))
    .unwrap();

    let err = WebhookEvent::parse(&payload).unwrap().outcome().unwrap_err();
    assert!(matches!(err, WebhookError::InvalidPayload(_)));
}
