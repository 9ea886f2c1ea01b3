use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::{audit::AuditLog, config::AppConfig, payments::CheckoutGateway};

#[derive(Clone)]
pub struct AppState {
    pub orm: DatabaseConnection,
    pub config: Arc<AppConfig>,
    /// `None` when no payment provider is configured; only COD is accepted then.
    pub gateway: Option<Arc<dyn CheckoutGateway>>,
    pub audit: AuditLog,
}
