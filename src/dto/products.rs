use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Product, Store};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub name: String,
    pub description: String,
    pub mrp: i64,
    pub price: i64,
    pub category: String,
    pub images: Vec<String>,
    pub stock: i32,
}

#[derive(Serialize, ToSchema)]
pub struct ProductList {
    pub items: Vec<Product>,
}

#[derive(Serialize, ToSchema)]
pub struct ShopPage {
    pub store: Store,
    pub products: Vec<Product>,
}
