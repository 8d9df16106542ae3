use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use sea_orm::sea_query::Expr;
use uuid::Uuid;

use crate::{
    dto::notifications::NotificationList,
    entity::{
        Notifications,
        notifications::{self, ActiveModel, Column},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Notification,
    response::{ApiResponse, Meta},
    state::AppState,
};

/// Record a notification for `user_uid`. Takes any connection so lifecycle
/// events can write it inside their own transaction.
pub async fn notify<C>(
    conn: &C,
    user_uid: &str,
    title: &str,
    message: impl Into<String>,
) -> AppResult<notifications::Model>
where
    C: ConnectionTrait,
{
    let notification = ActiveModel {
        id: Set(Uuid::new_v4()),
        user_uid: Set(user_uid.to_string()),
        title: Set(title.to_string()),
        message: Set(message.into()),
        is_read: Set(false),
        created_at: Set(Utc::now().into()),
    }
    .insert(conn)
    .await?;

    Ok(notification)
}

pub async fn list_notifications(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<NotificationList>> {
    let items: Vec<Notification> = Notifications::find()
        .filter(Column::UserUid.eq(user.uid.as_str()))
        .order_by_desc(Column::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Notification::from)
        .collect();

    let meta = Meta::total(items.len());
    Ok(ApiResponse::success(
        "Notifications",
        NotificationList { items },
        Some(meta),
    ))
}

/// Only the owner can mark a notification; anyone else gets NotFound.
pub async fn mark_read(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = Notifications::update_many()
        .col_expr(Column::IsRead, Expr::value(true))
        .filter(
            Condition::all()
                .add(Column::Id.eq(id))
                .add(Column::UserUid.eq(user.uid.as_str())),
        )
        .exec(&state.orm)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    Ok(ApiResponse::success(
        "Marked as read",
        serde_json::json!({ "id": id, "is_read": true }),
        Some(Meta::empty()),
    ))
}

pub async fn login_notify(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<Notification>> {
    let today = Utc::now().format("%Y-%m-%d");
    let notification = notify(
        &state.orm,
        &user.uid,
        "Welcome Back!",
        format!("Successfully logged in to your account on {today}."),
    )
    .await?;

    Ok(ApiResponse::success(
        "Login recorded",
        Notification::from(notification),
        Some(Meta::empty()),
    ))
}
