use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    checkout::PaymentMethod,
    entity::orders::OrderStatus,
    models::{Order, OrderItem},
    payments::HostedCheckoutSession,
};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct OrderLineRequest {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PlaceOrderRequest {
    pub address_id: Uuid,
    pub items: Vec<OrderLineRequest>,
    pub coupon_code: Option<String>,
    pub payment_method: PaymentMethod,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PlacedOrders {
    pub order_ids: Vec<Uuid>,
    /// Sum of every store order, in cents.
    pub amount: i64,
    pub payment_method: PaymentMethod,
    /// Present for hosted checkout; the client redirects to `session.url`.
    pub session: Option<HostedCheckoutSession>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<OrderWithItems>,
}
