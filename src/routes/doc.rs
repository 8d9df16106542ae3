use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        admin::AdminStats,
        notifications::NotificationList,
        orders::{
            CancelOrderRequest, CreateOrderRequest, DeliverOrderRequest, DeliveryResult,
            InvoiceList, InvoiceWithOrder, OrderList,
        },
        products::{CreateProductRequest, ProductList, SetProductActiveRequest, UpdateProductRequest},
        promotions::{
            CouponList, CouponVerification, CreateCouponRequest, CreateFlashSaleRequest,
            FlashSaleList, VerifyCouponRequest,
        },
        reviews::{CreateReviewRequest, ReviewList},
        wishlist::{AddWishlistRequest, WishlistList},
    },
    entity::{coupons::DiscountType, orders::OrderStatus, users::UserRole},
    models::{
        Coupon, DeliveryDetails, FlashSale, Invoice, Notification, Order, Product,
        ProductSnapshot, Review, User, WishlistItem,
    },
    response::{ApiResponse, Meta},
    routes::{
        admin, auth, coupons, flash_sales, health, invoices, notifications, orders, params,
        products, reviews, wishlist,
    },
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::sync,
        auth::notify_login,
        products::list_products,
        products::list_all_products,
        products::get_product,
        products::create_product,
        products::update_product,
        products::set_product_active,
        products::delete_product,
        flash_sales::list_flash_sales,
        flash_sales::create_flash_sale,
        flash_sales::delete_flash_sale,
        coupons::list_coupons,
        coupons::create_coupon,
        coupons::verify_coupon,
        coupons::delete_coupon,
        orders::create_order,
        orders::list_my_orders,
        orders::list_all_orders,
        orders::deliver_order,
        orders::cancel_order,
        invoices::list_my_invoices,
        wishlist::list_wishlist,
        wishlist::add_to_wishlist,
        wishlist::remove_from_wishlist,
        notifications::list_notifications,
        notifications::mark_read,
        reviews::list_reviews,
        reviews::create_review,
        reviews::delete_review,
        admin::stats
    ),
    components(
        schemas(
            User,
            UserRole,
            Product,
            FlashSale,
            Coupon,
            DiscountType,
            Order,
            OrderStatus,
            ProductSnapshot,
            DeliveryDetails,
            Invoice,
            Notification,
            WishlistItem,
            Review,
            AdminStats,
            CreateProductRequest,
            UpdateProductRequest,
            SetProductActiveRequest,
            ProductList,
            CreateFlashSaleRequest,
            FlashSaleList,
            CreateCouponRequest,
            CouponList,
            VerifyCouponRequest,
            CouponVerification,
            CreateOrderRequest,
            DeliverOrderRequest,
            CancelOrderRequest,
            OrderList,
            DeliveryResult,
            InvoiceWithOrder,
            InvoiceList,
            AddWishlistRequest,
            WishlistList,
            NotificationList,
            CreateReviewRequest,
            ReviewList,
            health::HealthData,
            params::Pagination,
            params::ProductQuery,
            params::OrderListQuery,
            Meta,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<Order>,
            ApiResponse<OrderList>,
            ApiResponse<DeliveryResult>,
            ApiResponse<AdminStats>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Account sync for identity-provider users"),
        (name = "Products", description = "Catalog endpoints"),
        (name = "Promotions", description = "Flash sales and coupons"),
        (name = "Orders", description = "Checkout, fulfillment and invoices"),
        (name = "Wishlist", description = "Per-user saved products"),
        (name = "Notifications", description = "Per-user notification feed"),
        (name = "Reviews", description = "Product reviews and ratings"),
        (name = "Admin", description = "Back-office dashboard"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
