pub mod audit_logs;
pub mod coupons;
pub mod flash_sales;
pub mod invoices;
pub mod notifications;
pub mod orders;
pub mod products;
pub mod reviews;
pub mod users;
pub mod wishlists;

pub use audit_logs::Entity as AuditLogs;
pub use coupons::Entity as Coupons;
pub use flash_sales::Entity as FlashSales;
pub use invoices::Entity as Invoices;
pub use notifications::Entity as Notifications;
pub use orders::Entity as Orders;
pub use products::Entity as Products;
pub use reviews::Entity as Reviews;
pub use users::Entity as Users;
pub use wishlists::Entity as Wishlists;
