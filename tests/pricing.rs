use gocart_api::{
    checkout::{CheckoutError, LineItem, compute_totals},
    dto::orders::OrderLineRequest,
    services::order_service::merge_lines,
};
use uuid::Uuid;

const SHIPPING: i64 = 500;

fn line(store_id: Uuid, quantity: i32, unit_price: i64) -> LineItem {
    LineItem {
        product_id: Uuid::new_v4(),
        store_id,
        quantity,
        unit_price,
    }
}

#[test]
fn discount_is_per_store_and_shipping_is_charged_once() {
    let seller_a = Uuid::new_v4();
    let seller_b = Uuid::new_v4();
    let items = vec![line(seller_a, 2, 1000), line(seller_b, 1, 500)];

    let totals = compute_totals(&items, Some(10), false, SHIPPING).unwrap();

    assert_eq!(totals.orders.len(), 2);
    assert_eq!(totals.orders[0].store_id, seller_a);
    assert_eq!(totals.orders[0].subtotal, 1800);
    assert_eq!(totals.orders[0].shipping_fee, SHIPPING);
    assert_eq!(totals.orders[0].total, 2300);
    assert_eq!(totals.orders[1].store_id, seller_b);
    assert_eq!(totals.orders[1].shipping_fee, 0);
    assert_eq!(totals.orders[1].total, 450);
    assert_eq!(totals.amount, 2750);
}

#[test]
fn members_pay_no_shipping() {
    let store = Uuid::new_v4();
    let items = vec![line(store, 3, 999)];

    let totals = compute_totals(&items, None, true, SHIPPING).unwrap();

    assert_eq!(totals.orders[0].shipping_fee, 0);
    assert_eq!(totals.amount, 2997);
}

#[test]
fn partitions_follow_first_occurrence_of_each_store() {
    let first = Uuid::new_v4();
    let second = Uuid::new_v4();
    let items = vec![
        line(second, 1, 100),
        line(first, 1, 200),
        line(second, 2, 300),
    ];

    let totals = compute_totals(&items, None, false, SHIPPING).unwrap();

    let stores: Vec<Uuid> = totals.orders.iter().map(|o| o.store_id).collect();
    assert_eq!(stores, vec![second, first]);
    assert_eq!(totals.orders[0].items.len(), 2);
    assert_eq!(totals.orders[0].subtotal, 700);
    // The store seen first carries the fee even though it is not the largest.
    assert_eq!(totals.orders[0].total, 1200);
    assert_eq!(totals.orders[1].total, 200);
}

#[test]
fn store_totals_are_rounded_to_whole_cents() {
    let store = Uuid::new_v4();
    let items = vec![line(store, 1, 333)];

    let totals = compute_totals(&items, Some(15), true, SHIPPING).unwrap();

    assert_eq!(totals.orders[0].total, 283);
}

#[test]
fn empty_orders_are_rejected() {
    assert_eq!(
        compute_totals(&[], None, false, SHIPPING),
        Err(CheckoutError::EmptyOrder)
    );
}

#[test]
fn non_positive_quantities_are_rejected() {
    let item = line(Uuid::new_v4(), 0, 100);
    let product_id = item.product_id;

    assert_eq!(
        compute_totals(&[item], None, false, SHIPPING),
        Err(CheckoutError::InvalidQuantity(product_id))
    );
}

#[test]
fn discounts_outside_zero_to_hundred_are_rejected() {
    let items = vec![line(Uuid::new_v4(), 1, 100)];

    assert_eq!(
        compute_totals(&items, Some(101), false, SHIPPING),
        Err(CheckoutError::InvalidDiscount)
    );
}

#[test]
fn amounts_beyond_i64_are_rejected() {
    let store = Uuid::new_v4();
    let items = vec![line(store, i32::MAX, i64::MAX / 2)];
    assert_eq!(
        compute_totals(&items, None, false, SHIPPING),
        Err(CheckoutError::AmountOverflow)
    );

    let items = vec![line(store, 1, i64::MAX), line(store, 1, 1)];
    assert_eq!(
        compute_totals(&items, None, true, SHIPPING),
        Err(CheckoutError::AmountOverflow)
    );

    let items = vec![line(store, 1, i64::MAX)];
    assert_eq!(
        compute_totals(&items, None, false, SHIPPING),
        Err(CheckoutError::AmountOverflow)
    );
}

#[test]
fn repeated_products_merge_into_one_line() {
    let earbuds = Uuid::new_v4();
    let stand = Uuid::new_v4();
    let merged = merge_lines(&[
        OrderLineRequest {
            product_id: earbuds,
            quantity: 1,
        },
        OrderLineRequest {
            product_id: stand,
            quantity: 4,
        },
        OrderLineRequest {
            product_id: earbuds,
            quantity: 2,
        },
    ])
    .unwrap();

    let lines: Vec<(Uuid, i32)> = merged.iter().map(|l| (l.product_id, l.quantity)).collect();
    assert_eq!(lines, vec![(earbuds, 3), (stand, 4)]);
}

#[test]
fn merged_quantity_overflow_is_rejected() {
    let product_id = Uuid::new_v4();
    let result = merge_lines(&[
        OrderLineRequest {
            product_id,
            quantity: i32::MAX,
        },
        OrderLineRequest {
            product_id,
            quantity: 1,
        },
    ]);

    assert_eq!(
        result.map(|lines| lines.len()),
        Err(CheckoutError::InvalidQuantity(product_id))
    );
}
