pub mod admin_service;
pub mod auth_service;
pub mod notification_service;
pub mod order_service;
pub mod product_service;
pub mod promotion_service;
pub mod review_service;
pub mod wishlist_service;
