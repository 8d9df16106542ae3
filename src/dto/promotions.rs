use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    entity::coupons::DiscountType,
    models::{Coupon, FlashSale},
};

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateFlashSaleRequest {
    pub product_id: Uuid,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub sale_price: i64,
    pub end_time: DateTime<Utc>,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct FlashSaleList {
    #[schema(value_type = Vec<FlashSale>)]
    pub items: Vec<FlashSale>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateCouponRequest {
    #[validate(
        length(min = 1, max = 64, message = "must be 1-64 characters"),
        custom(function = "crate::dto::not_blank")
    )]
    pub code: String,
    pub discount_type: DiscountType,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub discount_value: i64,
    pub expiry_date: Option<DateTime<Utc>>,
    #[validate(range(min = 1, message = "must be at least 1"))]
    pub usage_limit: Option<i32>,
    pub is_active: Option<bool>,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct CouponList {
    #[schema(value_type = Vec<Coupon>)]
    pub items: Vec<Coupon>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct VerifyCouponRequest {
    #[validate(custom(function = "crate::dto::not_blank"))]
    pub code: String,
    pub product_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CouponVerification {
    pub valid: bool,
    pub code: String,
    pub base_price: i64,
    pub discount_amount: i64,
    pub final_price: i64,
}
