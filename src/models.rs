use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::{
    coupons::{self, DiscountType},
    flash_sales, invoices, notifications,
    orders::{self, OrderStatus},
    products, reviews,
    users::{self, UserRole},
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub uid: String,
    pub email: Option<String>,
    pub name: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub ott_name: String,
    pub package_name: String,
    pub duration: String,
    pub price: i64,
    pub offer_price: i64,
    pub description: Option<String>,
    pub features: Vec<String>,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub average_rating: f64,
    pub review_count: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FlashSale {
    pub id: Uuid,
    pub product_id: Uuid,
    pub sale_price: i64,
    pub end_time: DateTime<Utc>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub product: Option<Product>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Coupon {
    pub id: Uuid,
    pub code: String,
    pub discount_type: DiscountType,
    pub discount_value: i64,
    pub expiry_date: Option<DateTime<Utc>>,
    pub usage_limit: Option<i32>,
    pub used_count: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Product fields frozen onto the order when it was placed.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductSnapshot {
    pub ott_name: String,
    pub package_name: String,
    pub duration: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeliveryDetails {
    pub ott_email_or_username: Option<String>,
    pub ott_password: Option<String>,
    /// Delivery note, or the cancellation reason.
    pub message: Option<String>,
    pub delivered_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub user_uid: String,
    pub product_id: Uuid,
    pub product_snapshot: ProductSnapshot,
    pub email: Option<String>,
    pub phone: String,
    pub payment_method: String,
    pub transaction_id: String,
    pub status: OrderStatus,
    pub coupon_code: Option<String>,
    pub base_price: i64,
    pub discount_amount: i64,
    pub final_price: i64,
    pub delivery_details: Option<DeliveryDetails>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Invoice {
    pub id: Uuid,
    pub order_id: Uuid,
    pub user_uid: String,
    pub invoice_number: String,
    pub amount: i64,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Notification {
    pub id: Uuid,
    pub user_uid: String,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WishlistItem {
    pub id: Uuid,
    pub product: Product,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Review {
    pub id: Uuid,
    pub product_id: Uuid,
    pub user_uid: String,
    pub user_name: String,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            uid: model.uid,
            email: model.email,
            name: model.name,
            role: model.role,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<products::Model> for Product {
    fn from(model: products::Model) -> Self {
        Self {
            id: model.id,
            ott_name: model.ott_name,
            package_name: model.package_name,
            duration: model.duration,
            price: model.price,
            offer_price: model.offer_price,
            description: model.description,
            features: serde_json::from_value(model.features).unwrap_or_default(),
            image_url: model.image_url,
            is_active: model.is_active,
            average_rating: model.average_rating,
            review_count: model.review_count,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl FlashSale {
    pub fn from_parts(sale: flash_sales::Model, product: Option<products::Model>) -> Self {
        Self {
            id: sale.id,
            product_id: sale.product_id,
            sale_price: sale.sale_price,
            end_time: sale.end_time.with_timezone(&Utc),
            is_active: sale.is_active,
            created_at: sale.created_at.with_timezone(&Utc),
            product: product.map(Product::from),
        }
    }
}

impl From<coupons::Model> for Coupon {
    fn from(model: coupons::Model) -> Self {
        Self {
            id: model.id,
            code: model.code,
            discount_type: model.discount_type,
            discount_value: model.discount_value,
            expiry_date: model.expiry_date.map(|dt| dt.with_timezone(&Utc)),
            usage_limit: model.usage_limit,
            used_count: model.used_count,
            is_active: model.is_active,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<orders::Model> for Order {
    fn from(model: orders::Model) -> Self {
        let has_details = model.delivery_login.is_some()
            || model.delivery_password.is_some()
            || model.delivery_message.is_some()
            || model.delivered_at.is_some();
        let delivery_details = has_details.then(|| DeliveryDetails {
            ott_email_or_username: model.delivery_login,
            ott_password: model.delivery_password,
            message: model.delivery_message,
            delivered_at: model.delivered_at.map(|dt| dt.with_timezone(&Utc)),
        });

        Self {
            id: model.id,
            user_uid: model.user_uid,
            product_id: model.product_id,
            product_snapshot: ProductSnapshot {
                ott_name: model.product_ott_name,
                package_name: model.product_package_name,
                duration: model.product_duration,
            },
            email: model.email,
            phone: model.phone,
            payment_method: model.payment_method,
            transaction_id: model.transaction_id,
            status: model.status,
            coupon_code: model.coupon_code,
            base_price: model.base_price,
            discount_amount: model.discount_amount,
            final_price: model.final_price,
            delivery_details,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<invoices::Model> for Invoice {
    fn from(model: invoices::Model) -> Self {
        Self {
            id: model.id,
            order_id: model.order_id,
            user_uid: model.user_uid,
            invoice_number: model.invoice_number,
            amount: model.amount,
            generated_at: model.generated_at.with_timezone(&Utc),
        }
    }
}

impl From<notifications::Model> for Notification {
    fn from(model: notifications::Model) -> Self {
        Self {
            id: model.id,
            user_uid: model.user_uid,
            title: model.title,
            message: model.message,
            is_read: model.is_read,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<reviews::Model> for Review {
    fn from(model: reviews::Model) -> Self {
        Self {
            id: model.id,
            product_id: model.product_id,
            user_uid: model.user_uid,
            user_name: model.user_name,
            rating: model.rating,
            comment: model.comment,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}
