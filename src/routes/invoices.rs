use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::orders::InvoiceList,
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::order_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/my-invoices", get(list_my_invoices))
}

#[utoipa::path(
    get,
    path = "/api/invoices/my-invoices",
    responses(
        (status = 200, description = "Caller's invoices with their orders", body = ApiResponse<InvoiceList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn list_my_invoices(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<InvoiceList>>> {
    let resp = order_service::list_my_invoices(&state, &user).await?;
    Ok(Json(resp))
}
