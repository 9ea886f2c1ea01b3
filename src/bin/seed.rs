use chrono::{Duration, Utc};
use gocart_api::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    services::auth_service::hash_password,
};
use sqlx::PgPool;
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let orm = create_orm_conn(&config.database_url).await?;
    run_migrations(&orm).await?;
    let pool = orm.get_postgres_connection_pool();

    let admin_id = ensure_user(pool, "admin@example.com", "admin123", "admin", "free").await?;
    let seller_id = ensure_user(pool, "seller@example.com", "seller123", "user", "free").await?;
    let user_id = ensure_user(pool, "user@example.com", "user123", "user", "free").await?;
    let member_id = ensure_user(pool, "plus@example.com", "plus123", "user", "plus").await?;

    let store_id = ensure_store(pool, seller_id, "gocart").await?;
    seed_products(pool, store_id).await?;
    seed_coupons(pool).await?;

    println!(
        "Seed completed. Admin: {admin_id}, Seller: {seller_id}, User: {user_id}, Member: {member_id}"
    );
    Ok(())
}

async fn ensure_user(
    pool: &PgPool,
    email: &str,
    password: &str,
    role: &str,
    plan: &str,
) -> anyhow::Result<Uuid> {
    let password_hash = hash_password(password)?;
    let name = email.split('@').next().unwrap_or(email);

    let (user_id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, password_hash, name, role, plan)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role, plan = EXCLUDED.plan
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(password_hash)
    .bind(name)
    .bind(role)
    .bind(plan)
    .fetch_one(pool)
    .await?;

    println!("Ensured user {email} (role={role}, plan={plan})");
    Ok(user_id)
}

async fn ensure_store(pool: &PgPool, owner: Uuid, username: &str) -> anyhow::Result<Uuid> {
    let (store_id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO stores (id, user_id, name, username, description, email, contact, address, logo, status, is_active)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 'approved', TRUE)
        ON CONFLICT (user_id) DO UPDATE SET status = 'approved', is_active = TRUE
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(owner)
    .bind("GoCart Essentials")
    .bind(username)
    .bind("Everyday gadgets and accessories")
    .bind("store@example.com")
    .bind("+1 555 0100")
    .bind("1 Market Street, Springfield")
    .bind("https://example.com/logo.png")
    .fetch_one(pool)
    .await?;

    println!("Ensured store @{username}");
    Ok(store_id)
}

async fn seed_products(pool: &PgPool, store_id: Uuid) -> anyhow::Result<()> {
    let (existing,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products WHERE store_id = $1")
        .bind(store_id)
        .fetch_one(pool)
        .await?;
    if existing > 0 {
        println!("Products already seeded");
        return Ok(());
    }

    let products = vec![
        ("Wireless Earbuds", "Bluetooth 5.3, 24h battery", "Headphones", 4999, 2999, 40),
        ("Smart Watch", "Heart rate and sleep tracking", "Watch", 8999, 6499, 25),
        ("Desk Lamp", "Dimmable LED with USB charging", "Decoration", 2999, 2300, 60),
        ("Phone Stand", "Aluminium, adjustable angle", "Mobile", 999, 450, 150),
    ];

    for (name, desc, category, mrp, price, stock) in products {
        sqlx::query(
            r#"
            INSERT INTO products (id, store_id, name, description, mrp, price, category, stock)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(store_id)
        .bind(name)
        .bind(desc)
        .bind(mrp as i64)
        .bind(price as i64)
        .bind(category)
        .bind(stock)
        .execute(pool)
        .await?;
    }

    println!("Seeded products");
    Ok(())
}

async fn seed_coupons(pool: &PgPool) -> anyhow::Result<()> {
    let expires_at = Utc::now() + Duration::days(90);
    let coupons = vec![
        ("WELCOME10", "10% off your first order", 10, true, false),
        ("PLUS15", "15% off for Plus members", 15, false, true),
        ("SAVE5", "5% off everything", 5, false, false),
    ];

    for (code, description, percent, for_new_user, for_member) in coupons {
        sqlx::query(
            r#"
            INSERT INTO coupons (code, description, discount_percent, for_new_user, for_member, is_public, expires_at)
            VALUES ($1, $2, $3, $4, $5, TRUE, $6)
            ON CONFLICT (code) DO UPDATE SET expires_at = EXCLUDED.expires_at
            "#,
        )
        .bind(code)
        .bind(description)
        .bind(percent)
        .bind(for_new_user)
        .bind(for_member)
        .bind(expires_at)
        .execute(pool)
        .await?;
    }

    println!("Seeded coupons");
    Ok(())
}
