use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{entity::stores::StoreStatus, models::Store};

#[derive(Debug, Deserialize, ToSchema)]
pub struct StoreDecisionRequest {
    /// `approved` or `rejected`.
    pub status: StoreStatus,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StoreList {
    pub items: Vec<Store>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardData {
    pub orders: u64,
    pub stores: u64,
    pub products: u64,
    /// Sum of all order totals, in cents.
    pub revenue: i64,
}
