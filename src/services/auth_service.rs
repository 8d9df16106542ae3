use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set,
    TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    entity::{
        Users,
        users::{ActiveModel, Column, UserRole},
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::User,
    response::{ApiResponse, Meta},
    state::AppState,
};

/// Create or refresh the internal account for a verified identity.
///
/// The very first account becomes admin; so does any account whose email is
/// on the configured allow-list, including existing ones.
pub async fn sync_user(state: &AppState, identity: &AuthUser) -> AppResult<ApiResponse<User>> {
    let listed = identity
        .email
        .as_deref()
        .is_some_and(|email| state.config.is_admin_email(email));

    let txn = state.orm.begin().await?;
    let existing = Users::find()
        .filter(Column::Uid.eq(identity.uid.as_str()))
        .one(&txn)
        .await?;

    let (user, created) = match existing {
        Some(user) if listed && user.role != UserRole::Admin => {
            let mut active: ActiveModel = user.into();
            active.role = Set(UserRole::Admin);
            (active.update(&txn).await?, false)
        }
        Some(user) => (user, false),
        None => {
            let is_first = Users::find().count(&txn).await? == 0;
            let role = if is_first || listed {
                UserRole::Admin
            } else {
                UserRole::User
            };
            let user = ActiveModel {
                id: Set(Uuid::new_v4()),
                uid: Set(identity.uid.clone()),
                email: Set(identity.email.clone()),
                name: Set(identity.display_name().to_string()),
                role: Set(role),
                created_at: Set(Utc::now().into()),
            }
            .insert(&txn)
            .await?;
            (user, true)
        }
    };
    txn.commit().await?;

    if created {
        tracing::info!(uid = %user.uid, role = ?user.role, "user registered");
        if let Err(err) = log_audit(
            &state.orm,
            Some(&user.uid),
            "user_register",
            Some("users"),
            Some(serde_json::json!({ "user_id": user.id })),
        )
        .await
        {
            tracing::warn!(error = %err, "audit log failed");
        }
    }

    Ok(ApiResponse::success(
        if created { "User created" } else { "User synced" },
        User::from(user),
        Some(Meta::empty()),
    ))
}
