//! Checkout pricing: flash-sale price resolution and coupon discounts.
//!
//! Everything here is pure; the promotion service feeds it rows loaded inside
//! the order transaction so the stored price never comes from the client.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::entity::{
    coupons::{self, DiscountType},
    flash_sales, products,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CouponError {
    #[error("Invalid Coupon Code")]
    NotFound,

    #[error("Coupon Expired")]
    Expired,

    #[error("Coupon Usage Limit Reached")]
    LimitReached,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct PriceQuote {
    pub base_price: i64,
    pub discount_amount: i64,
    pub final_price: i64,
}

impl PriceQuote {
    pub fn undiscounted(base_price: i64) -> Self {
        Self::new(base_price, 0)
    }

    fn new(base_price: i64, discount_amount: i64) -> Self {
        Self {
            base_price,
            discount_amount,
            final_price: base_price - discount_amount,
        }
    }
}

pub fn flash_sale_is_live(sale: &flash_sales::Model, now: DateTime<Utc>) -> bool {
    sale.is_active && sale.end_time > now
}

/// A live flash sale overrides the product's offer price.
pub fn base_price(
    product: &products::Model,
    flash_sale: Option<&flash_sales::Model>,
    now: DateTime<Utc>,
) -> i64 {
    match flash_sale {
        Some(sale) if sale.product_id == product.id && flash_sale_is_live(sale, now) => {
            sale.sale_price
        }
        _ => product.offer_price,
    }
}

/// Checks activity, expiry and usage limit, in that order.
pub fn check_coupon(coupon: &coupons::Model, now: DateTime<Utc>) -> Result<(), CouponError> {
    if !coupon.is_active {
        return Err(CouponError::NotFound);
    }
    if let Some(expiry) = coupon.expiry_date {
        if now > expiry {
            return Err(CouponError::Expired);
        }
    }
    if let Some(limit) = coupon.usage_limit {
        if coupon.used_count >= limit {
            return Err(CouponError::LimitReached);
        }
    }
    Ok(())
}

/// Discount for `base_price`, clamped to `0..=base_price`.
pub fn discount_amount(discount_type: DiscountType, value: i64, base_price: i64) -> i64 {
    let base_price = base_price.max(0);
    let raw = match discount_type {
        // Half-up rounding on the integer amount.
        DiscountType::Percent => base_price
            .saturating_mul(value)
            .saturating_add(50)
            .div_euclid(100),
        DiscountType::Fixed => value,
    };
    raw.clamp(0, base_price)
}

pub fn quote(coupon: Option<&coupons::Model>, base_price: i64) -> PriceQuote {
    match coupon {
        Some(c) => PriceQuote::new(
            base_price,
            discount_amount(c.discount_type, c.discount_value, base_price),
        ),
        None => PriceQuote::undiscounted(base_price),
    }
}

pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Mean rating rounded to one decimal, plus the review count.
pub fn rating_summary(ratings: &[i32]) -> (f64, i32) {
    if ratings.is_empty() {
        return (0.0, 0);
    }
    let sum: i64 = ratings.iter().map(|r| *r as i64).sum();
    let mean = sum as f64 / ratings.len() as f64;
    ((mean * 10.0).round() / 10.0, ratings.len() as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use uuid::Uuid;

    fn product(offer_price: i64) -> products::Model {
        products::Model {
            id: Uuid::new_v4(),
            ott_name: "StreamBox".into(),
            package_name: "Premium".into(),
            duration: "1 Month".into(),
            price: 700,
            offer_price,
            description: None,
            features: serde_json::json!([]),
            image_url: None,
            is_active: true,
            average_rating: 0.0,
            review_count: 0,
            created_at: Utc::now().into(),
        }
    }

    fn sale(product_id: Uuid, sale_price: i64, ends_in: Duration, is_active: bool) -> flash_sales::Model {
        flash_sales::Model {
            id: Uuid::new_v4(),
            product_id,
            sale_price,
            end_time: (Utc::now() + ends_in).into(),
            is_active,
            created_at: Utc::now().into(),
        }
    }

    fn coupon(discount_type: DiscountType, value: i64) -> coupons::Model {
        coupons::Model {
            id: Uuid::new_v4(),
            code: "SAVE".into(),
            discount_type,
            discount_value: value,
            expiry_date: None,
            usage_limit: None,
            used_count: 0,
            is_active: true,
            created_at: Utc::now().into(),
        }
    }

    #[test]
    fn live_flash_sale_overrides_offer_price() {
        let p = product(500);
        let s = sale(p.id, 400, Duration::hours(2), true);
        assert_eq!(base_price(&p, Some(&s), Utc::now()), 400);
    }

    #[test]
    fn ended_or_inactive_flash_sale_is_ignored() {
        let p = product(500);
        let ended = sale(p.id, 400, Duration::hours(-1), true);
        let off = sale(p.id, 400, Duration::hours(1), false);
        assert_eq!(base_price(&p, Some(&ended), Utc::now()), 500);
        assert_eq!(base_price(&p, Some(&off), Utc::now()), 500);
        assert_eq!(base_price(&p, None, Utc::now()), 500);
    }

    #[test]
    fn fixed_coupon_on_flash_sale_price() {
        let q = quote(Some(&coupon(DiscountType::Fixed, 50)), 400);
        assert_eq!(q.discount_amount, 50);
        assert_eq!(q.final_price, 350);
    }

    #[test]
    fn percent_coupon_rounds_half_up() {
        assert_eq!(discount_amount(DiscountType::Percent, 20, 400), 80);
        // 12.5 -> 13
        assert_eq!(discount_amount(DiscountType::Percent, 5, 250), 13);
        // 12.4 -> 12
        assert_eq!(discount_amount(DiscountType::Percent, 4, 310), 12);
    }

    #[test]
    fn discount_is_clamped_to_base_price() {
        let q = quote(Some(&coupon(DiscountType::Fixed, 900)), 300);
        assert_eq!(q.discount_amount, 300);
        assert_eq!(q.final_price, 0);
        assert_eq!(discount_amount(DiscountType::Percent, 150, 300), 300);
        assert_eq!(discount_amount(DiscountType::Fixed, -20, 300), 0);
        assert_eq!(
            discount_amount(DiscountType::Percent, 100, i64::MAX),
            i64::MAX / 100
        );
    }

    #[test]
    fn coupon_checks_follow_expiry_then_limit() {
        let now = Utc::now();
        let mut c = coupon(DiscountType::Fixed, 10);
        assert_eq!(check_coupon(&c, now), Ok(()));

        c.usage_limit = Some(1);
        c.used_count = 1;
        assert_eq!(check_coupon(&c, now), Err(CouponError::LimitReached));

        c.expiry_date = Some((now - Duration::minutes(1)).into());
        assert_eq!(check_coupon(&c, now), Err(CouponError::Expired));

        c.is_active = false;
        assert_eq!(check_coupon(&c, now), Err(CouponError::NotFound));
    }

    #[test]
    fn codes_are_matched_uppercased() {
        assert_eq!(normalize_code("  fixed10 "), "FIXED10");
    }

    #[test]
    fn rating_summary_rounds_to_one_decimal() {
        assert_eq!(rating_summary(&[]), (0.0, 0));
        assert_eq!(rating_summary(&[5, 4, 4]), (4.3, 3));
        assert_eq!(rating_summary(&[1, 2]), (1.5, 2));
    }
}
