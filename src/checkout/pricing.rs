use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CheckoutError {
    #[error("order has no items")]
    EmptyOrder,

    #[error("invalid quantity for product {0}")]
    InvalidQuantity(Uuid),

    #[error("discount must be between 0 and 100 percent")]
    InvalidDiscount,

    #[error("order amount out of range")]
    AmountOverflow,
}

/// A cart line with its price resolved at order time. Amounts are cents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    pub product_id: Uuid,
    pub store_id: Uuid,
    pub quantity: i32,
    pub unit_price: i64,
}

/// One sub-order per store, in the order the store first appeared in the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreOrder {
    pub store_id: Uuid,
    pub items: Vec<LineItem>,
    pub subtotal: i64,
    pub shipping_fee: i64,
    pub total: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutTotals {
    pub orders: Vec<StoreOrder>,
    pub amount: i64,
}

/// Splits `items` by store and prices every partition.
///
/// The discount is applied per store; the flat `shipping_fee` is charged once
/// for the whole checkout, on the first store partition, and only when the
/// buyer is not a member. Each store total is rounded to whole cents.
pub fn compute_totals(
    items: &[LineItem],
    discount_percent: Option<i32>,
    is_member: bool,
    shipping_fee: i64,
) -> Result<CheckoutTotals, CheckoutError> {
    if items.is_empty() {
        return Err(CheckoutError::EmptyOrder);
    }
    if let Some(pct) = discount_percent {
        if !(0..=100).contains(&pct) {
            return Err(CheckoutError::InvalidDiscount);
        }
    }

    let mut partitions: Vec<(Uuid, Vec<LineItem>)> = Vec::new();
    for item in items {
        if item.quantity <= 0 {
            return Err(CheckoutError::InvalidQuantity(item.product_id));
        }
        match partitions.iter_mut().find(|(store_id, _)| *store_id == item.store_id) {
            Some((_, lines)) => lines.push(item.clone()),
            None => partitions.push((item.store_id, vec![item.clone()])),
        }
    }

    let mut shipping_added = false;
    let mut orders = Vec::with_capacity(partitions.len());
    for (store_id, lines) in partitions {
        let gross = lines.iter().try_fold(0i64, |acc, line| {
            line.unit_price
                .checked_mul(i64::from(line.quantity))
                .and_then(|amount| acc.checked_add(amount))
                .ok_or(CheckoutError::AmountOverflow)
        })?;
        let subtotal = match discount_percent {
            Some(pct) => apply_discount(gross, pct),
            None => gross,
        };

        let fee = if !is_member && !shipping_added {
            shipping_added = true;
            shipping_fee
        } else {
            0
        };

        orders.push(StoreOrder {
            store_id,
            items: lines,
            subtotal,
            shipping_fee: fee,
            total: subtotal
                .checked_add(fee)
                .ok_or(CheckoutError::AmountOverflow)?,
        });
    }

    let amount = orders
        .iter()
        .try_fold(0i64, |acc, order| acc.checked_add(order.total))
        .ok_or(CheckoutError::AmountOverflow)?;
    Ok(CheckoutTotals { orders, amount })
}

/// `cents * (100 - pct) / 100`, rounded half away from zero.
fn apply_discount(cents: i64, pct: i32) -> i64 {
    let scaled = i128::from(cents) * i128::from(100 - pct);
    let rounded = if scaled >= 0 {
        (scaled + 50) / 100
    } else {
        (scaled - 50) / 100
    };
    rounded as i64
}

#[cfg(test)]
mod tests {
    use super::apply_discount;

    #[test]
    fn discount_rounds_half_up_to_whole_cents() {
        // 3.33 * 0.85 = 2.8305
        assert_eq!(apply_discount(333, 15), 283);
        // 0.05 * 0.5 = 0.025
        assert_eq!(apply_discount(5, 50), 3);
        assert_eq!(apply_discount(1999, 0), 1999);
        assert_eq!(apply_discount(1999, 100), 0);
    }
}
