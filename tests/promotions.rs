mod common;

use chrono::{Duration, Utc};
use common::{admin, buyer, insert_coupon, insert_flash_sale, insert_product, setup_state};
use ott_storefront_api::{
    dto::{
        orders::CreateOrderRequest,
        promotions::{CreateCouponRequest, CreateFlashSaleRequest, VerifyCouponRequest},
    },
    entity::{Coupons, FlashSales, Orders, coupons::DiscountType},
    error::AppError,
    pricing::CouponError,
    services::{order_service, promotion_service},
};
use sea_orm::{EntityTrait, PaginatorTrait};
use uuid::Uuid;

fn order_request(product_id: Uuid, coupon: Option<&str>) -> CreateOrderRequest {
    CreateOrderRequest {
        product_id,
        payment_method: "bkash".into(),
        transaction_id: "TX-1001".into(),
        phone: "01700000000".into(),
        coupon_code: coupon.map(str::to_string),
    }
}

#[tokio::test]
async fn live_flash_sale_overrides_offer_price() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let product = insert_product(&state, "Netflix", 500, 400).await?;
    insert_flash_sale(&state, product.id, 300, Duration::hours(2)).await?;

    let order = order_service::create_order(&state, &buyer("u1"), order_request(product.id, None))
        .await?
        .into_data()
        .expect("order");

    assert_eq!(order.base_price, 300);
    assert_eq!(order.discount_amount, 0);
    assert_eq!(order.final_price, 300);
    assert_eq!(order.coupon_code, None);
    Ok(())
}

#[tokio::test]
async fn ended_flash_sale_is_ignored() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let product = insert_product(&state, "Netflix", 500, 400).await?;
    insert_flash_sale(&state, product.id, 300, Duration::hours(-1)).await?;

    let order = order_service::create_order(&state, &buyer("u1"), order_request(product.id, None))
        .await?
        .into_data()
        .expect("order");

    assert_eq!(order.final_price, 400);
    Ok(())
}

#[tokio::test]
async fn fixed_coupon_discounts_offer_price() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let product = insert_product(&state, "Netflix", 500, 400).await?;
    insert_coupon(&state, "FIXED50", DiscountType::Fixed, 50, None).await?;

    let order = order_service::create_order(
        &state,
        &buyer("u1"),
        order_request(product.id, Some("fixed50")),
    )
    .await?
    .into_data()
    .expect("order");

    assert_eq!(order.base_price, 400);
    assert_eq!(order.discount_amount, 50);
    assert_eq!(order.final_price, 350);
    assert_eq!(order.coupon_code.as_deref(), Some("FIXED50"));
    Ok(())
}

#[tokio::test]
async fn percent_coupon_discounts_offer_price() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let product = insert_product(&state, "Netflix", 500, 400).await?;
    insert_coupon(&state, "PERCENT20", DiscountType::Percent, 20, None).await?;

    let order = order_service::create_order(
        &state,
        &buyer("u1"),
        order_request(product.id, Some("PERCENT20")),
    )
    .await?
    .into_data()
    .expect("order");

    assert_eq!(order.discount_amount, 80);
    assert_eq!(order.final_price, 320);
    Ok(())
}

#[tokio::test]
async fn usage_limit_stops_second_order() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let product = insert_product(&state, "Netflix", 500, 400).await?;
    let coupon = insert_coupon(&state, "ONCE", DiscountType::Fixed, 100, Some(1)).await?;

    order_service::create_order(&state, &buyer("u1"), order_request(product.id, Some("ONCE")))
        .await?;
    let second = order_service::create_order(
        &state,
        &buyer("u2"),
        order_request(product.id, Some("ONCE")),
    )
    .await;

    assert!(matches!(
        second,
        Err(AppError::Coupon(CouponError::LimitReached))
    ));
    assert_eq!(Orders::find().count(&state.orm).await?, 1);

    let stored = Coupons::find_by_id(coupon.id).one(&state.orm).await?.expect("coupon");
    assert_eq!(stored.used_count, 1);
    Ok(())
}

#[tokio::test]
async fn verification_fails_once_usage_limit_is_spent() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let product = insert_product(&state, "Netflix", 500, 400).await?;
    insert_coupon(&state, "TWICE", DiscountType::Fixed, 20, Some(2)).await?;

    let verifier = buyer("u9");
    let verify = || {
        promotion_service::verify_coupon(
            &state,
            &verifier,
            VerifyCouponRequest {
                code: "TWICE".into(),
                product_id: product.id,
            },
        )
    };

    for uid in ["u1", "u2"] {
        verify().await?;
        order_service::create_order(&state, &buyer(uid), order_request(product.id, Some("TWICE")))
            .await?;
    }

    let third = verify().await;
    assert!(matches!(
        third,
        Err(AppError::Coupon(CouponError::LimitReached))
    ));
    Ok(())
}

#[tokio::test]
async fn verify_stacks_fixed_coupon_on_flash_sale() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let product = insert_product(&state, "Netflix", 600, 500).await?;
    insert_flash_sale(&state, product.id, 400, Duration::hours(3)).await?;
    insert_coupon(&state, "FIXED10", DiscountType::Fixed, 50, None).await?;

    let quote = promotion_service::verify_coupon(
        &state,
        &buyer("u1"),
        VerifyCouponRequest {
            code: "FIXED10".into(),
            product_id: product.id,
        },
    )
    .await?
    .into_data()
    .expect("quote");

    assert_eq!(quote.base_price, 400);
    assert_eq!(quote.discount_amount, 50);
    assert_eq!(quote.final_price, 350);
    Ok(())
}

#[tokio::test]
async fn unknown_coupon_rejects_the_order() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let product = insert_product(&state, "Netflix", 500, 400).await?;

    let result = order_service::create_order(
        &state,
        &buyer("u1"),
        order_request(product.id, Some("NOPE")),
    )
    .await;

    assert!(matches!(result, Err(AppError::Coupon(CouponError::NotFound))));
    assert_eq!(Orders::find().count(&state.orm).await?, 0);
    Ok(())
}

#[tokio::test]
async fn verify_quotes_without_consuming() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let product = insert_product(&state, "Netflix", 500, 400).await?;
    let coupon = insert_coupon(&state, "FIXED50", DiscountType::Fixed, 50, Some(5)).await?;

    let payload = || VerifyCouponRequest {
        code: " fixed50 ".into(),
        product_id: product.id,
    };
    let quote = promotion_service::verify_coupon(&state, &buyer("u1"), payload())
        .await?
        .into_data()
        .expect("quote");
    promotion_service::verify_coupon(&state, &buyer("u1"), payload()).await?;

    assert!(quote.valid);
    assert_eq!(quote.code, "FIXED50");
    assert_eq!(quote.base_price, 400);
    assert_eq!(quote.final_price, 350);

    let stored = Coupons::find_by_id(coupon.id).one(&state.orm).await?.expect("coupon");
    assert_eq!(stored.used_count, 0);
    Ok(())
}

#[tokio::test]
async fn expired_coupon_fails_verification() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let product = insert_product(&state, "Netflix", 500, 400).await?;
    promotion_service::create_coupon(
        &state,
        &admin(),
        CreateCouponRequest {
            code: "OLD".into(),
            discount_type: DiscountType::Fixed,
            discount_value: 10,
            expiry_date: Some(Utc::now() - Duration::days(1)),
            usage_limit: None,
            is_active: None,
        },
    )
    .await?;

    let result = promotion_service::verify_coupon(
        &state,
        &buyer("u1"),
        VerifyCouponRequest {
            code: "OLD".into(),
            product_id: product.id,
        },
    )
    .await;

    assert!(matches!(result, Err(AppError::Coupon(CouponError::Expired))));
    Ok(())
}

#[tokio::test]
async fn coupon_codes_are_uppercased_and_unique() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let request = |code: &str, kind: DiscountType, value: i64| CreateCouponRequest {
        code: code.into(),
        discount_type: kind,
        discount_value: value,
        expiry_date: None,
        usage_limit: Some(10),
        is_active: None,
    };

    let created = promotion_service::create_coupon(
        &state,
        &admin(),
        request("summer25", DiscountType::Percent, 25),
    )
    .await?
    .into_data()
    .expect("coupon");
    assert_eq!(created.code, "SUMMER25");
    assert!(created.is_active);

    let duplicate = promotion_service::create_coupon(
        &state,
        &admin(),
        request("Summer25", DiscountType::Fixed, 5),
    )
    .await;
    assert!(matches!(duplicate, Err(AppError::Conflict(_))));

    let too_big = promotion_service::create_coupon(
        &state,
        &admin(),
        request("HUGE", DiscountType::Percent, 150),
    )
    .await;
    assert!(matches!(too_big, Err(AppError::BadRequest(_))));

    let as_buyer = promotion_service::create_coupon(
        &state,
        &buyer("u1"),
        request("MINE", DiscountType::Fixed, 5),
    )
    .await;
    assert!(matches!(as_buyer, Err(AppError::Forbidden)));
    Ok(())
}

#[tokio::test]
async fn new_flash_sale_replaces_the_active_one() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let product = insert_product(&state, "Hoichoi", 800, 650).await?;
    let request = |price: i64| CreateFlashSaleRequest {
        product_id: product.id,
        sale_price: price,
        end_time: Utc::now() + Duration::hours(6),
    };

    promotion_service::create_flash_sale(&state, &admin(), request(500)).await?;
    promotion_service::create_flash_sale(&state, &admin(), request(450)).await?;

    let listed = promotion_service::list_flash_sales(&state)
        .await?
        .into_data()
        .expect("sales");
    assert_eq!(listed.items.len(), 1);
    assert_eq!(listed.items[0].sale_price, 450);
    assert_eq!(
        listed.items[0].product.as_ref().map(|p| p.ott_name.as_str()),
        Some("Hoichoi")
    );
    assert_eq!(FlashSales::find().count(&state.orm).await?, 2);

    let past = promotion_service::create_flash_sale(
        &state,
        &admin(),
        CreateFlashSaleRequest {
            product_id: product.id,
            sale_price: 400,
            end_time: Utc::now() - Duration::minutes(1),
        },
    )
    .await;
    assert!(matches!(past, Err(AppError::BadRequest(_))));

    let unknown = promotion_service::create_flash_sale(
        &state,
        &admin(),
        CreateFlashSaleRequest {
            product_id: Uuid::new_v4(),
            sale_price: 400,
            end_time: Utc::now() + Duration::hours(1),
        },
    )
    .await;
    assert!(matches!(unknown, Err(AppError::NotFound)));
    Ok(())
}
