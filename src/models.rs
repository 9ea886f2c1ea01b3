use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::{
    addresses, cart_items, coupons, order_items, orders, products,
    orders::OrderStatus,
    stores::{self, StoreStatus},
    users,
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: String,
    pub plan: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Address {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
    pub phone: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Store {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub username: String,
    pub description: String,
    pub email: String,
    pub contact: String,
    pub address: String,
    pub logo: String,
    pub status: StoreStatus,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Prices are in cents.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub store_id: Uuid,
    pub name: String,
    pub description: String,
    pub mrp: i64,
    pub price: i64,
    pub category: String,
    pub images: Vec<String>,
    pub in_stock: bool,
    pub stock: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CartItem {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Coupon {
    pub code: String,
    pub description: String,
    pub discount_percent: i32,
    pub for_new_user: bool,
    pub for_member: bool,
    pub is_public: bool,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub store_id: Uuid,
    pub address_id: Uuid,
    pub total: i64,
    pub status: OrderStatus,
    pub payment_method: String,
    pub is_paid: bool,
    pub is_coupon_used: bool,
    #[schema(value_type = Object)]
    pub coupon: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    /// Unit price captured when the order was placed.
    pub price: i64,
    pub created_at: DateTime<Utc>,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            name: model.name,
            role: model.role,
            plan: model.plan,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<addresses::Model> for Address {
    fn from(model: addresses::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            street: model.street,
            city: model.city,
            state: model.state,
            zip: model.zip,
            country: model.country,
            phone: model.phone,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<stores::Model> for Store {
    fn from(model: stores::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            name: model.name,
            username: model.username,
            description: model.description,
            email: model.email,
            contact: model.contact,
            address: model.address,
            logo: model.logo,
            status: model.status,
            is_active: model.is_active,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<products::Model> for Product {
    fn from(model: products::Model) -> Self {
        let images = serde_json::from_value(model.images).unwrap_or_default();
        Self {
            id: model.id,
            store_id: model.store_id,
            name: model.name,
            description: model.description,
            mrp: model.mrp,
            price: model.price,
            category: model.category,
            images,
            in_stock: model.in_stock,
            stock: model.stock,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<cart_items::Model> for CartItem {
    fn from(model: cart_items::Model) -> Self {
        Self {
            id: model.id,
            product_id: model.product_id,
            quantity: model.quantity,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<coupons::Model> for Coupon {
    fn from(model: coupons::Model) -> Self {
        Self {
            code: model.code,
            description: model.description,
            discount_percent: model.discount_percent,
            for_new_user: model.for_new_user,
            for_member: model.for_member,
            is_public: model.is_public,
            expires_at: model.expires_at.with_timezone(&Utc),
        }
    }
}

impl From<orders::Model> for Order {
    fn from(model: orders::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            store_id: model.store_id,
            address_id: model.address_id,
            total: model.total,
            status: model.status,
            payment_method: model.payment_method,
            is_paid: model.is_paid,
            is_coupon_used: model.is_coupon_used,
            coupon: model.coupon,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<order_items::Model> for OrderItem {
    fn from(model: order_items::Model) -> Self {
        Self {
            id: model.id,
            order_id: model.order_id,
            product_id: model.product_id,
            quantity: model.quantity,
            price: model.price,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}
