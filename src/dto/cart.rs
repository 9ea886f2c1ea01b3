use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::Product;

/// Sets the cart quantity of one product.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AddToCartRequest {
    pub product_id: Uuid,
    pub quantity: i32,
}

/// A cart row joined with its product. `line_total` is the current price
/// times quantity in cents, before discount and shipping.
#[derive(Debug, Serialize, ToSchema)]
pub struct CartLine {
    pub id: Uuid,
    pub store_id: Uuid,
    pub product: Product,
    pub quantity: i32,
    pub line_total: i64,
}

impl CartLine {
    pub fn new(id: Uuid, product: Product, quantity: i32) -> Self {
        Self {
            id,
            store_id: product.store_id,
            line_total: product.price.saturating_mul(i64::from(quantity)),
            product,
            quantity,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartList {
    pub items: Vec<CartLine>,
}
