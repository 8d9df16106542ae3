use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Select, Set, TransactionTrait,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    audit::log_audit,
    dto::products::{CreateProductRequest, ProductList, SetProductActiveRequest, UpdateProductRequest},
    entity::{
        FlashSales, Products,
        flash_sales,
        products::{ActiveModel, Column, Entity as ProductEntity},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Product,
    response::{ApiResponse, Meta},
    routes::params::{ProductQuery, ProductSortBy, SortOrder},
    state::AppState,
};

/// Storefront listing: active products only.
pub async fn list_products(
    state: &AppState,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let finder = filtered(&query).filter(Column::IsActive.eq(true));
    paginate(state, finder, &query, "Products").await
}

/// Back-office listing: every product regardless of visibility.
pub async fn list_all_products(
    state: &AppState,
    user: &AuthUser,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    ensure_admin(user)?;
    let finder = filtered(&query);
    paginate(state, finder, &query, "All products").await
}

fn filtered(query: &ProductQuery) -> Select<ProductEntity> {
    let mut condition = Condition::all();

    if let Some(search) = query.q.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        condition = condition.add(
            Condition::any()
                .add(Column::OttName.contains(search))
                .add(Column::PackageName.contains(search)),
        );
    }

    let sort_by = query.sort_by.unwrap_or(ProductSortBy::CreatedAt);
    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    let sort_col = match sort_by {
        ProductSortBy::CreatedAt => Column::CreatedAt,
        ProductSortBy::Price => Column::OfferPrice,
        ProductSortBy::Name => Column::OttName,
    };

    let finder = Products::find().filter(condition);
    match sort_order {
        SortOrder::Asc => finder.order_by_asc(sort_col),
        SortOrder::Desc => finder.order_by_desc(sort_col),
    }
}

async fn paginate(
    state: &AppState,
    finder: Select<ProductEntity>,
    query: &ProductQuery,
    message: &str,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Product::from)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(message, ProductList { items }, Some(meta)))
}

pub async fn get_product(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Product>> {
    let product = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Product", Product::from(product), None))
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;
    payload.validate()?;

    let product = ActiveModel {
        id: Set(Uuid::new_v4()),
        ott_name: Set(payload.ott_name.trim().to_string()),
        package_name: Set(payload.package_name.trim().to_string()),
        duration: Set(payload.duration.trim().to_string()),
        price: Set(payload.price),
        offer_price: Set(payload.offer_price),
        description: Set(payload.description),
        features: Set(serde_json::Value::from(payload.features)),
        image_url: Set(payload.image_url),
        is_active: Set(payload.is_active.unwrap_or(true)),
        average_rating: Set(0.0),
        review_count: Set(0),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;

    tracing::info!(product_id = %product.id, ott = %product.ott_name, "product created");

    if let Err(err) = log_audit(
        &state.orm,
        Some(&user.uid),
        "product_create",
        Some("products"),
        Some(serde_json::json!({ "product_id": product.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Product created",
        Product::from(product),
        Some(Meta::empty()),
    ))
}

pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;
    payload.validate()?;

    let existing = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: ActiveModel = existing.into();
    if let Some(ott_name) = payload.ott_name {
        active.ott_name = Set(ott_name.trim().to_string());
    }
    if let Some(package_name) = payload.package_name {
        active.package_name = Set(package_name.trim().to_string());
    }
    if let Some(duration) = payload.duration {
        active.duration = Set(duration.trim().to_string());
    }
    if let Some(price) = payload.price {
        active.price = Set(price);
    }
    if let Some(offer_price) = payload.offer_price {
        active.offer_price = Set(offer_price);
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }
    if let Some(features) = payload.features {
        active.features = Set(serde_json::Value::from(features));
    }
    if let Some(image_url) = payload.image_url {
        active.image_url = Set(Some(image_url));
    }
    if let Some(is_active) = payload.is_active {
        active.is_active = Set(is_active);
    }

    let product = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.orm,
        Some(&user.uid),
        "product_update",
        Some("products"),
        Some(serde_json::json!({ "product_id": product.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Updated",
        Product::from(product),
        Some(Meta::empty()),
    ))
}

/// Soft visibility toggle. Hidden products leave the storefront and cannot be ordered.
pub async fn set_product_active(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: SetProductActiveRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;

    let existing = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: ActiveModel = existing.into();
    active.is_active = Set(payload.is_active);
    let product = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.orm,
        Some(&user.uid),
        "product_visibility",
        Some("products"),
        Some(serde_json::json!({ "product_id": product.id, "is_active": product.is_active })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        if product.is_active { "Product shown" } else { "Product hidden" },
        Product::from(product),
        Some(Meta::empty()),
    ))
}

/// Permanent delete. Flash sales for the product go with it; orders keep
/// their snapshot.
pub async fn delete_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;

    let txn = state.orm.begin().await?;
    let sales = FlashSales::delete_many()
        .filter(flash_sales::Column::ProductId.eq(id))
        .exec(&txn)
        .await?;
    let result = Products::delete_by_id(id).exec(&txn).await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }
    txn.commit().await?;

    tracing::info!(product_id = %id, flash_sales = sales.rows_affected, "product deleted");

    if let Err(err) = log_audit(
        &state.orm,
        Some(&user.uid),
        "product_delete",
        Some("products"),
        Some(serde_json::json!({ "product_id": id, "flash_sales_removed": sales.rows_affected })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Product deleted permanently",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}
