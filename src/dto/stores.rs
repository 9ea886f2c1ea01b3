use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateStoreRequest {
    pub name: String,
    pub username: String,
    pub description: String,
    pub email: String,
    pub contact: String,
    pub address: String,
    pub logo: String,
}
