use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminStats {
    /// Sum of final prices over orders that were not cancelled.
    pub total_revenue: i64,
    /// Same as `total_revenue`, restricted to orders placed since 00:00 UTC.
    pub today_revenue: i64,
    pub total_orders: i64,
    pub pending_orders: i64,
    /// Active products only.
    pub total_products: i64,
    pub total_users: i64,
}
