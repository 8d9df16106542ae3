use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::Product;

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateProductRequest {
    #[validate(custom(function = "crate::dto::not_blank"))]
    pub ott_name: String,
    #[validate(custom(function = "crate::dto::not_blank"))]
    pub package_name: String,
    #[validate(custom(function = "crate::dto::not_blank"))]
    pub duration: String,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub price: i64,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub offer_price: i64,
    pub description: Option<String>,
    #[serde(default)]
    pub features: Vec<String>,
    pub image_url: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub struct UpdateProductRequest {
    #[validate(custom(function = "crate::dto::not_blank"))]
    pub ott_name: Option<String>,
    #[validate(custom(function = "crate::dto::not_blank"))]
    pub package_name: Option<String>,
    #[validate(custom(function = "crate::dto::not_blank"))]
    pub duration: Option<String>,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub price: Option<i64>,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub offer_price: Option<i64>,
    pub description: Option<String>,
    pub features: Option<Vec<String>>,
    pub image_url: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetProductActiveRequest {
    pub is_active: bool,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct ProductList {
    #[schema(value_type = Vec<Product>)]
    pub items: Vec<Product>,
}
