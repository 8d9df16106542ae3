use axum::{
    Json, Router,
    http::{StatusCode, Uri},
    routing::get,
};

use crate::{
    response::{ApiResponse, Meta},
    state::AppState,
};

pub mod admin;
pub mod auth;
pub mod coupons;
pub mod doc;
pub mod flash_sales;
pub mod health;
pub mod invoices;
pub mod notifications;
pub mod orders;
pub mod params;
pub mod products;
pub mod reviews;
pub mod wishlist;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/products", products::router())
        .nest("/flash-sales", flash_sales::router())
        .nest("/coupons", coupons::router())
        .nest("/orders", orders::router())
        .nest("/invoices", invoices::router())
        .nest("/wishlist", wishlist::router())
        .nest("/notifications", notifications::router())
        .nest("/reviews", reviews::router())
        .nest("/admin", admin::router())
}

/// Full application: health probe, `/api`, docs and the JSON 404 fallback,
/// with state bound. Transport layers are added by the binary.
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api", create_api_router())
        .merge(doc::scalar_docs())
        .fallback(not_found)
        .with_state(state)
}

async fn not_found(uri: Uri) -> (StatusCode, Json<ApiResponse<serde_json::Value>>) {
    let body = ApiResponse::success(
        "Not Found",
        serde_json::json!({ "path": uri.path() }),
        Some(Meta::empty()),
    );
    (StatusCode::NOT_FOUND, Json(body))
}
