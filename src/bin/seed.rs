use chrono::{Duration, Utc};
use ott_storefront_api::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    entity::{
        Coupons, Products,
        coupons::{self, DiscountType},
        products,
    },
};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

struct DemoProduct {
    ott_name: &'static str,
    package_name: &'static str,
    duration: &'static str,
    price: i64,
    offer_price: i64,
    features: &'static [&'static str],
}

const CATALOG: &[DemoProduct] = &[
    DemoProduct {
        ott_name: "Netflix",
        package_name: "Premium 4K",
        duration: "1 Month",
        price: 500,
        offer_price: 400,
        features: &["4 screens", "Ultra HD", "Downloads"],
    },
    DemoProduct {
        ott_name: "Netflix",
        package_name: "Standard",
        duration: "1 Month",
        price: 350,
        offer_price: 300,
        features: &["2 screens", "Full HD"],
    },
    DemoProduct {
        ott_name: "Amazon Prime Video",
        package_name: "Annual",
        duration: "12 Months",
        price: 1500,
        offer_price: 1200,
        features: &["Prime Video", "Prime Music"],
    },
    DemoProduct {
        ott_name: "Hoichoi",
        package_name: "Yearly",
        duration: "12 Months",
        price: 800,
        offer_price: 650,
        features: &["Bengali originals", "2 devices"],
    },
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let orm = create_orm_conn(&config.database_url).await?;
    run_migrations(&orm).await?;

    let inserted = seed_products(&orm).await?;
    let coupon = ensure_coupon(&orm, "WELCOME10", DiscountType::Percent, 10).await?;

    println!("Seed completed. New products: {inserted}, sample coupon: {coupon}");
    Ok(())
}

async fn seed_products(orm: &DatabaseConnection) -> anyhow::Result<usize> {
    let mut inserted = 0;
    for demo in CATALOG {
        let existing = Products::find()
            .filter(products::Column::OttName.eq(demo.ott_name))
            .filter(products::Column::PackageName.eq(demo.package_name))
            .one(orm)
            .await?;
        if existing.is_some() {
            continue;
        }

        products::ActiveModel {
            id: Set(Uuid::new_v4()),
            ott_name: Set(demo.ott_name.to_string()),
            package_name: Set(demo.package_name.to_string()),
            duration: Set(demo.duration.to_string()),
            price: Set(demo.price),
            offer_price: Set(demo.offer_price),
            description: Set(Some(format!(
                "{} {} subscription, delivered by hand after payment check.",
                demo.ott_name, demo.package_name
            ))),
            features: Set(serde_json::json!(demo.features)),
            image_url: Set(None),
            is_active: Set(true),
            average_rating: Set(0.0),
            review_count: Set(0),
            created_at: Set(Utc::now().into()),
        }
        .insert(orm)
        .await?;
        inserted += 1;
        println!("Seeded {} {}", demo.ott_name, demo.package_name);
    }
    Ok(inserted)
}

async fn ensure_coupon(
    orm: &DatabaseConnection,
    code: &str,
    discount_type: DiscountType,
    discount_value: i64,
) -> anyhow::Result<String> {
    let existing = Coupons::find()
        .filter(coupons::Column::Code.eq(code))
        .one(orm)
        .await?;
    if let Some(coupon) = existing {
        return Ok(coupon.code);
    }

    let coupon = coupons::ActiveModel {
        id: Set(Uuid::new_v4()),
        code: Set(code.to_string()),
        discount_type: Set(discount_type),
        discount_value: Set(discount_value),
        expiry_date: Set(Some((Utc::now() + Duration::days(30)).into())),
        usage_limit: Set(Some(100)),
        used_count: Set(0),
        is_active: Set(true),
        created_at: Set(Utc::now().into()),
    }
    .insert(orm)
    .await?;
    Ok(coupon.code)
}
