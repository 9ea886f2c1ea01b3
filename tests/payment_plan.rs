use gocart_api::{
    checkout::{CartClearing, PaymentMethod, cart_clearing},
    entity::orders::OrderStatus,
};

#[test]
fn cash_on_delivery_clears_cart_at_once() {
    assert_eq!(cart_clearing(PaymentMethod::Cod), CartClearing::Immediate);
}

#[test]
fn hosted_checkout_keeps_cart_until_payment_is_confirmed() {
    assert_eq!(
        cart_clearing(PaymentMethod::Stripe),
        CartClearing::OnPaymentConfirmed
    );
}

#[test]
fn payment_method_parses_case_insensitively() {
    assert_eq!("COD".parse::<PaymentMethod>(), Ok(PaymentMethod::Cod));
    assert_eq!("stripe".parse::<PaymentMethod>(), Ok(PaymentMethod::Stripe));
    assert!("paypal".parse::<PaymentMethod>().is_err());
    assert_eq!(PaymentMethod::Stripe.to_string(), "stripe");
}

#[test]
fn payment_method_uses_snake_case_on_the_wire() {
    let method: PaymentMethod = serde_json::from_str("\"cod\"").unwrap();
    assert_eq!(method, PaymentMethod::Cod);
}

#[test]
fn order_status_only_moves_forward() {
    assert!(OrderStatus::OrderPlaced.can_advance_to(OrderStatus::Processing));
    assert!(OrderStatus::OrderPlaced.can_advance_to(OrderStatus::Delivered));
    assert!(OrderStatus::Shipped.can_advance_to(OrderStatus::Delivered));
    assert!(!OrderStatus::Shipped.can_advance_to(OrderStatus::Processing));
    assert!(!OrderStatus::Delivered.can_advance_to(OrderStatus::Delivered));
}
