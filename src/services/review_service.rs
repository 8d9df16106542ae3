use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use sea_orm::sea_query::Expr;
use uuid::Uuid;
use validator::Validate;

use crate::{
    audit::log_audit,
    dto::reviews::{CreateReviewRequest, ReviewList},
    entity::{Products, Reviews, products, reviews},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Review,
    pricing::rating_summary,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn list_reviews(
    state: &AppState,
    product_id: Uuid,
) -> AppResult<ApiResponse<ReviewList>> {
    let items: Vec<Review> = Reviews::find()
        .filter(reviews::Column::ProductId.eq(product_id))
        .order_by_desc(reviews::Column::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Review::from)
        .collect();

    let meta = Meta::total(items.len());
    Ok(ApiResponse::success("Reviews", ReviewList { items }, Some(meta)))
}

/// One review per user and product. The product's rating summary is
/// recomputed in the same transaction.
pub async fn create_review(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
    payload: CreateReviewRequest,
) -> AppResult<ApiResponse<Review>> {
    payload.validate()?;

    let txn = state.orm.begin().await?;
    let product = Products::find_by_id(product_id)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    let duplicate = Reviews::find()
        .filter(
            Condition::all()
                .add(reviews::Column::ProductId.eq(product.id))
                .add(reviews::Column::UserUid.eq(user.uid.as_str())),
        )
        .one(&txn)
        .await?;
    if duplicate.is_some() {
        return Err(AppError::BadRequest("You have already reviewed this product".into()));
    }

    let comment = payload
        .comment
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty());

    let review = reviews::ActiveModel {
        id: Set(Uuid::new_v4()),
        product_id: Set(product.id),
        user_uid: Set(user.uid.clone()),
        user_name: Set(user.display_name().to_string()),
        rating: Set(payload.rating),
        comment: Set(comment),
        created_at: Set(Utc::now().into()),
    }
    .insert(&txn)
    .await?;

    let (average, count) = refresh_product_rating(&txn, product.id).await?;
    txn.commit().await?;

    tracing::info!(
        product_id = %product.id,
        rating = review.rating,
        average_rating = average,
        review_count = count,
        "review added"
    );

    Ok(ApiResponse::success(
        "Review added",
        Review::from(review),
        Some(Meta::empty()),
    ))
}

pub async fn delete_review(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;

    let txn = state.orm.begin().await?;
    let review = Reviews::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;
    Reviews::delete_by_id(review.id).exec(&txn).await?;
    refresh_product_rating(&txn, review.product_id).await?;
    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.orm,
        Some(&user.uid),
        "review_delete",
        Some("reviews"),
        Some(serde_json::json!({ "review_id": id, "product_id": review.product_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Review deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Rewrite the product's `average_rating` and `review_count` from every
/// review it currently has.
pub async fn refresh_product_rating<C>(conn: &C, product_id: Uuid) -> AppResult<(f64, i32)>
where
    C: ConnectionTrait,
{
    let ratings: Vec<i32> = Reviews::find()
        .select_only()
        .column(reviews::Column::Rating)
        .filter(reviews::Column::ProductId.eq(product_id))
        .into_tuple()
        .all(conn)
        .await?;

    let (average, count) = rating_summary(&ratings);

    Products::update_many()
        .col_expr(products::Column::AverageRating, Expr::value(average))
        .col_expr(products::Column::ReviewCount, Expr::value(count))
        .filter(products::Column::Id.eq(product_id))
        .exec(conn)
        .await?;

    Ok((average, count))
}
