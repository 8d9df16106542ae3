use axum::{Json, Router, extract::State, routing::post};

use crate::{
    error::AppResult,
    middleware::auth::AuthUser,
    models::{Notification, User},
    response::ApiResponse,
    services::{auth_service::sync_user, notification_service::login_notify},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sync", post(sync))
        .route("/login-notify", post(notify_login))
}

#[utoipa::path(
    post,
    path = "/api/auth/sync",
    responses(
        (status = 200, description = "Account record for the verified identity", body = ApiResponse<User>),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn sync(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<User>>> {
    let resp = sync_user(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/auth/login-notify",
    responses(
        (status = 200, description = "Login notification recorded", body = ApiResponse<Notification>),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn notify_login(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<Notification>>> {
    let resp = login_notify(&state, &user).await?;
    Ok(Json(resp))
}
