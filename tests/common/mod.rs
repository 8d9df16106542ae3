#![allow(dead_code)]

use std::sync::Arc;

use chrono::{Duration, Utc};
use ott_storefront_api::{
    config::{AppConfig, DEFAULT_MAX_BODY_BYTES, IdentityConfig, parse_email_list},
    entity::{
        coupons::{self, DiscountType},
        flash_sales, products,
        users::{self, UserRole},
    },
    middleware::auth::AuthUser,
    migration::Migrator,
    state::AppState,
};
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, Set};
use sea_orm_migration::MigratorTrait;
use uuid::Uuid;

pub const IDENTITY_SECRET: &str = "integration-identity-secret";
pub const ADMIN_EMAIL: &str = "owner@shop.test";

/// Fresh in-memory database with every migration applied. One pooled
/// connection so all queries see the same database.
pub async fn setup_state() -> anyhow::Result<AppState> {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let orm = Database::connect(options).await?;
    Migrator::up(&orm, None).await?;

    let config = AppConfig {
        database_url: "sqlite::memory:".into(),
        host: "127.0.0.1".into(),
        port: 0,
        max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        admin_emails: parse_email_list(ADMIN_EMAIL),
        identity: IdentityConfig::with_secret(IDENTITY_SECRET),
    };

    Ok(AppState {
        orm,
        config: Arc::new(config),
    })
}

pub fn buyer(uid: &str) -> AuthUser {
    AuthUser {
        uid: uid.into(),
        email: Some(format!("{uid}@buyers.test")),
        name: Some(format!("Buyer {uid}")),
        role: UserRole::User,
    }
}

pub fn admin() -> AuthUser {
    AuthUser {
        uid: "admin-uid".into(),
        email: Some(ADMIN_EMAIL.into()),
        name: Some("Owner".into()),
        role: UserRole::Admin,
    }
}

pub async fn insert_user(
    state: &AppState,
    uid: &str,
    role: UserRole,
) -> anyhow::Result<users::Model> {
    let user = users::ActiveModel {
        id: Set(Uuid::new_v4()),
        uid: Set(uid.into()),
        email: Set(Some(format!("{uid}@buyers.test"))),
        name: Set(uid.into()),
        role: Set(role),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;
    Ok(user)
}

pub async fn insert_product(
    state: &AppState,
    ott_name: &str,
    price: i64,
    offer_price: i64,
) -> anyhow::Result<products::Model> {
    let product = products::ActiveModel {
        id: Set(Uuid::new_v4()),
        ott_name: Set(ott_name.into()),
        package_name: Set("Premium".into()),
        duration: Set("1 Month".into()),
        price: Set(price),
        offer_price: Set(offer_price),
        description: Set(None),
        features: Set(serde_json::json!(["4K", "4 screens"])),
        image_url: Set(None),
        is_active: Set(true),
        average_rating: Set(0.0),
        review_count: Set(0),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;
    Ok(product)
}

pub async fn insert_flash_sale(
    state: &AppState,
    product_id: Uuid,
    sale_price: i64,
    ends_in: Duration,
) -> anyhow::Result<flash_sales::Model> {
    let sale = flash_sales::ActiveModel {
        id: Set(Uuid::new_v4()),
        product_id: Set(product_id),
        sale_price: Set(sale_price),
        end_time: Set((Utc::now() + ends_in).into()),
        is_active: Set(true),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;
    Ok(sale)
}

pub async fn insert_coupon(
    state: &AppState,
    code: &str,
    discount_type: DiscountType,
    discount_value: i64,
    usage_limit: Option<i32>,
) -> anyhow::Result<coupons::Model> {
    let coupon = coupons::ActiveModel {
        id: Set(Uuid::new_v4()),
        code: Set(code.into()),
        discount_type: Set(discount_type),
        discount_value: Set(discount_value),
        expiry_date: Set(None),
        usage_limit: Set(usage_limit),
        used_count: Set(0),
        is_active: Set(true),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;
    Ok(coupon)
}
