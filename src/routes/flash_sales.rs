use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get},
};
use uuid::Uuid;

use crate::{
    dto::promotions::{CreateFlashSaleRequest, FlashSaleList},
    error::AppResult,
    middleware::auth::AuthUser,
    models::FlashSale,
    response::ApiResponse,
    services::promotion_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_flash_sales).post(create_flash_sale))
        .route("/{id}", delete(delete_flash_sale))
}

#[utoipa::path(
    get,
    path = "/api/flash-sales",
    responses(
        (status = 200, description = "Live flash sales with their products", body = ApiResponse<FlashSaleList>)
    ),
    tag = "Promotions"
)]
pub async fn list_flash_sales(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<FlashSaleList>>> {
    let resp = promotion_service::list_flash_sales(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/flash-sales",
    request_body = CreateFlashSaleRequest,
    responses(
        (status = 200, description = "Flash sale started", body = ApiResponse<FlashSale>),
        (status = 400, description = "Negative price or end time in the past"),
        (status = 404, description = "Product not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Promotions"
)]
pub async fn create_flash_sale(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateFlashSaleRequest>,
) -> AppResult<Json<ApiResponse<FlashSale>>> {
    let resp = promotion_service::create_flash_sale(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/flash-sales/{id}",
    params(
        ("id" = Uuid, Path, description = "Flash sale ID")
    ),
    responses(
        (status = 200, description = "Flash sale removed", body = ApiResponse<serde_json::Value>),
        (status = 404, description = "Flash sale not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Promotions"
)]
pub async fn delete_flash_sale(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = promotion_service::delete_flash_sale(&state, &user, id).await?;
    Ok(Json(resp))
}
