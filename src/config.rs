use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    /// Flat shipping fee in cents, charged once per checkout to non-members.
    pub shipping_fee_cents: i64,
    pub stripe_secret_key: Option<String>,
    pub stripe_webhook_secret: Option<String>,
    /// Fallback for redirect URLs when a request carries no `Origin` header.
    pub app_origin: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let jwt_secret = env::var("JWT_SECRET")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let shipping_fee_cents = env::var("SHIPPING_FEE_CENTS")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(500);
        let stripe_secret_key = env::var("STRIPE_SECRET_KEY").ok().filter(|v| !v.is_empty());
        let stripe_webhook_secret = env::var("STRIPE_WEBHOOK_SECRET")
            .ok()
            .filter(|v| !v.is_empty());
        let app_origin =
            env::var("APP_ORIGIN").unwrap_or_else(|_| "http://localhost:3000".to_string());
        Ok(Self {
            port,
            database_url,
            host,
            jwt_secret,
            shipping_fee_cents,
            stripe_secret_key,
            stripe_webhook_secret,
            app_origin,
        })
    }
}
