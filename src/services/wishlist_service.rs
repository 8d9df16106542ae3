use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, Set, SqlErr,
};
use uuid::Uuid;

use crate::{
    dto::wishlist::{AddWishlistRequest, WishlistList},
    entity::{Products, Wishlists, wishlists},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Product, WishlistItem},
    response::{ApiResponse, Meta},
    state::AppState,
};

/// Newest entries first. An entry whose product is gone is left out.
pub async fn list_wishlist(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<WishlistList>> {
    let items: Vec<WishlistItem> = Wishlists::find()
        .filter(wishlists::Column::UserUid.eq(user.uid.as_str()))
        .order_by_desc(wishlists::Column::CreatedAt)
        .find_also_related(Products)
        .all(&state.orm)
        .await?
        .into_iter()
        .filter_map(|(entry, product)| {
            product.map(|product| WishlistItem {
                id: entry.id,
                product: Product::from(product),
                created_at: entry.created_at.with_timezone(&Utc),
            })
        })
        .collect();

    let meta = Meta::total(items.len());
    Ok(ApiResponse::success("Wishlist", WishlistList { items }, Some(meta)))
}

pub async fn add_to_wishlist(
    state: &AppState,
    user: &AuthUser,
    payload: AddWishlistRequest,
) -> AppResult<ApiResponse<WishlistItem>> {
    let product = Products::find_by_id(payload.product_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let existing = Wishlists::find()
        .filter(
            Condition::all()
                .add(wishlists::Column::UserUid.eq(user.uid.as_str()))
                .add(wishlists::Column::ProductId.eq(product.id)),
        )
        .one(&state.orm)
        .await?;
    if existing.is_some() {
        return Err(already_listed());
    }

    let inserted = wishlists::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_uid: Set(user.uid.clone()),
        product_id: Set(product.id),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await;

    let entry = match inserted {
        Ok(entry) => entry,
        Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            return Err(already_listed());
        }
        Err(err) => return Err(err.into()),
    };

    tracing::debug!(user_uid = %user.uid, product_id = %product.id, "wishlist add");

    Ok(ApiResponse::success(
        "Added to wishlist",
        WishlistItem {
            id: entry.id,
            product: Product::from(product),
            created_at: entry.created_at.with_timezone(&Utc),
        },
        Some(Meta::empty()),
    ))
}

pub async fn remove_from_wishlist(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = Wishlists::delete_many()
        .filter(
            Condition::all()
                .add(wishlists::Column::UserUid.eq(user.uid.as_str()))
                .add(wishlists::Column::ProductId.eq(product_id)),
        )
        .exec(&state.orm)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    Ok(ApiResponse::success(
        "Removed from wishlist",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

fn already_listed() -> AppError {
    AppError::BadRequest("Already in wishlist".into())
}
