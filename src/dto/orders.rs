use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::{Invoice, Order};

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateOrderRequest {
    pub product_id: Uuid,
    /// Free-form tag such as "bkash" or "nagad".
    #[validate(custom(function = "crate::dto::not_blank"))]
    pub payment_method: String,
    /// Buyer-entered payment reference; checked by hand, never by a gateway.
    #[validate(custom(function = "crate::dto::not_blank"))]
    pub transaction_id: String,
    #[validate(custom(function = "crate::dto::not_blank"))]
    pub phone: String,
    pub coupon_code: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct DeliverOrderRequest {
    #[validate(custom(function = "crate::dto::not_blank"))]
    pub ott_email_or_username: String,
    pub ott_password: Option<String>,
    pub delivery_message: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CancelOrderRequest {
    pub reason: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct OrderList {
    #[schema(value_type = Vec<Order>)]
    pub items: Vec<Order>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeliveryResult {
    pub order: Order,
    pub invoice: Invoice,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct InvoiceWithOrder {
    pub invoice: Invoice,
    pub order: Option<Order>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct InvoiceList {
    #[schema(value_type = Vec<InvoiceWithOrder>)]
    pub items: Vec<InvoiceWithOrder>,
}
