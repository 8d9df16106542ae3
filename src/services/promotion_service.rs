use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, Set, SqlErr, TransactionTrait,
};
use sea_orm::sea_query::Expr;
use uuid::Uuid;
use validator::Validate;

use crate::{
    audit::log_audit,
    dto::promotions::{
        CouponList, CouponVerification, CreateCouponRequest, CreateFlashSaleRequest,
        FlashSaleList, VerifyCouponRequest,
    },
    entity::{
        Coupons, FlashSales, Products,
        coupons::{self, DiscountType},
        flash_sales, products,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Coupon, FlashSale},
    pricing::{self, CouponError, PriceQuote},
    response::{ApiResponse, Meta},
    state::AppState,
};

/// The newest live flash sale for a product, if any. Expiry is judged
/// against `now`; nothing sweeps ended sales.
pub async fn active_flash_sale<C>(
    conn: &C,
    product_id: Uuid,
    now: DateTime<Utc>,
) -> AppResult<Option<flash_sales::Model>>
where
    C: ConnectionTrait,
{
    let sale = FlashSales::find()
        .filter(
            Condition::all()
                .add(flash_sales::Column::ProductId.eq(product_id))
                .add(flash_sales::Column::IsActive.eq(true))
                .add(flash_sales::Column::EndTime.gt(now)),
        )
        .order_by_desc(flash_sales::Column::CreatedAt)
        .one(conn)
        .await?;
    Ok(sale)
}

/// Base price a buyer pays for `product` before any coupon.
pub async fn resolve_base_price<C>(
    conn: &C,
    product: &products::Model,
    now: DateTime<Utc>,
) -> AppResult<i64>
where
    C: ConnectionTrait,
{
    let sale = active_flash_sale(conn, product.id, now).await?;
    Ok(pricing::base_price(product, sale.as_ref(), now))
}

async fn find_usable_coupon<C>(
    conn: &C,
    code: &str,
    now: DateTime<Utc>,
) -> AppResult<coupons::Model>
where
    C: ConnectionTrait,
{
    let coupon = Coupons::find()
        .filter(coupons::Column::Code.eq(pricing::normalize_code(code)))
        .one(conn)
        .await?
        .ok_or(CouponError::NotFound)?;
    pricing::check_coupon(&coupon, now)?;
    Ok(coupon)
}

/// Validate `code` and consume one use of it.
///
/// The increment is conditional on the limit, so two checkouts racing for
/// the last use cannot both succeed. Run it inside the order transaction.
pub async fn apply_coupon<C>(
    conn: &C,
    code: &str,
    base_price: i64,
    now: DateTime<Utc>,
) -> AppResult<(coupons::Model, PriceQuote)>
where
    C: ConnectionTrait,
{
    let coupon = find_usable_coupon(conn, code, now).await?;

    let claimed = Coupons::update_many()
        .col_expr(
            coupons::Column::UsedCount,
            Expr::col(coupons::Column::UsedCount).add(1),
        )
        .filter(
            Condition::all()
                .add(coupons::Column::Id.eq(coupon.id))
                .add(coupons::Column::IsActive.eq(true))
                .add(
                    Condition::any()
                        .add(coupons::Column::UsageLimit.is_null())
                        .add(
                            Expr::col(coupons::Column::UsedCount)
                                .lt(Expr::col(coupons::Column::UsageLimit)),
                        ),
                ),
        )
        .exec(conn)
        .await?;

    if claimed.rows_affected == 0 {
        return Err(CouponError::LimitReached.into());
    }

    let quote = pricing::quote(Some(&coupon), base_price);
    Ok((coupon, quote))
}

/// Price check for the checkout page. Never consumes a use.
pub async fn verify_coupon(
    state: &AppState,
    _user: &AuthUser,
    payload: VerifyCouponRequest,
) -> AppResult<ApiResponse<CouponVerification>> {
    payload.validate()?;
    let now = Utc::now();

    let coupon = find_usable_coupon(&state.orm, &payload.code, now).await?;
    let product = Products::find_by_id(payload.product_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let base_price = resolve_base_price(&state.orm, &product, now).await?;
    let quote = pricing::quote(Some(&coupon), base_price);

    Ok(ApiResponse::success(
        "Coupon applied",
        CouponVerification {
            valid: true,
            code: coupon.code,
            base_price: quote.base_price,
            discount_amount: quote.discount_amount,
            final_price: quote.final_price,
        },
        Some(Meta::empty()),
    ))
}

pub async fn list_flash_sales(state: &AppState) -> AppResult<ApiResponse<FlashSaleList>> {
    let items: Vec<FlashSale> = FlashSales::find()
        .filter(
            Condition::all()
                .add(flash_sales::Column::IsActive.eq(true))
                .add(flash_sales::Column::EndTime.gt(Utc::now())),
        )
        .order_by_asc(flash_sales::Column::EndTime)
        .find_also_related(Products)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|(sale, product)| FlashSale::from_parts(sale, product))
        .collect();

    let meta = Meta::total(items.len());
    Ok(ApiResponse::success(
        "Flash sales",
        FlashSaleList { items },
        Some(meta),
    ))
}

/// Start a flash sale. Any sale already active for the product is switched
/// off first, keeping at most one active per product.
pub async fn create_flash_sale(
    state: &AppState,
    user: &AuthUser,
    payload: CreateFlashSaleRequest,
) -> AppResult<ApiResponse<FlashSale>> {
    ensure_admin(user)?;
    payload.validate()?;
    let now = Utc::now();
    if payload.end_time <= now {
        return Err(AppError::BadRequest("end_time must be in the future".into()));
    }

    let txn = state.orm.begin().await?;
    let product = Products::find_by_id(payload.product_id)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    let replaced = FlashSales::update_many()
        .col_expr(flash_sales::Column::IsActive, Expr::value(false))
        .filter(
            Condition::all()
                .add(flash_sales::Column::ProductId.eq(product.id))
                .add(flash_sales::Column::IsActive.eq(true)),
        )
        .exec(&txn)
        .await?;

    let sale = flash_sales::ActiveModel {
        id: Set(Uuid::new_v4()),
        product_id: Set(product.id),
        sale_price: Set(payload.sale_price),
        end_time: Set(payload.end_time.into()),
        is_active: Set(true),
        created_at: Set(now.into()),
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    tracing::info!(
        flash_sale_id = %sale.id,
        product_id = %product.id,
        sale_price = sale.sale_price,
        replaced = replaced.rows_affected,
        "flash sale started"
    );

    if let Err(err) = log_audit(
        &state.orm,
        Some(&user.uid),
        "flash_sale_create",
        Some("flash_sales"),
        Some(serde_json::json!({ "flash_sale_id": sale.id, "product_id": product.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Flash sale created",
        FlashSale::from_parts(sale, Some(product)),
        Some(Meta::empty()),
    ))
}

pub async fn delete_flash_sale(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let result = FlashSales::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    if let Err(err) = log_audit(
        &state.orm,
        Some(&user.uid),
        "flash_sale_delete",
        Some("flash_sales"),
        Some(serde_json::json!({ "flash_sale_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Flash sale deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn create_coupon(
    state: &AppState,
    user: &AuthUser,
    payload: CreateCouponRequest,
) -> AppResult<ApiResponse<Coupon>> {
    ensure_admin(user)?;
    payload.validate()?;
    if payload.discount_type == DiscountType::Percent && payload.discount_value > 100 {
        return Err(AppError::BadRequest(
            "discount_value: percent discount cannot exceed 100".into(),
        ));
    }

    let code = pricing::normalize_code(&payload.code);
    let duplicate = Coupons::find()
        .filter(coupons::Column::Code.eq(code.as_str()))
        .one(&state.orm)
        .await?;
    if duplicate.is_some() {
        return Err(AppError::Conflict("Coupon code already exists".into()));
    }

    let inserted = coupons::ActiveModel {
        id: Set(Uuid::new_v4()),
        code: Set(code),
        discount_type: Set(payload.discount_type),
        discount_value: Set(payload.discount_value),
        expiry_date: Set(payload.expiry_date.map(Into::into)),
        usage_limit: Set(payload.usage_limit),
        used_count: Set(0),
        is_active: Set(payload.is_active.unwrap_or(true)),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await;

    let coupon = match inserted {
        Ok(coupon) => coupon,
        // Lost a race with a concurrent create of the same code.
        Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            return Err(AppError::Conflict("Coupon code already exists".into()));
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!(code = %coupon.code, kind = ?coupon.discount_type, "coupon created");

    if let Err(err) = log_audit(
        &state.orm,
        Some(&user.uid),
        "coupon_create",
        Some("coupons"),
        Some(serde_json::json!({ "coupon_id": coupon.id, "code": coupon.code })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Coupon created",
        Coupon::from(coupon),
        Some(Meta::empty()),
    ))
}

pub async fn list_coupons(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<CouponList>> {
    ensure_admin(user)?;
    let items: Vec<Coupon> = Coupons::find()
        .order_by_desc(coupons::Column::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Coupon::from)
        .collect();

    let meta = Meta::total(items.len());
    Ok(ApiResponse::success("Coupons", CouponList { items }, Some(meta)))
}

pub async fn delete_coupon(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let result = Coupons::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    if let Err(err) = log_audit(
        &state.orm,
        Some(&user.uid),
        "coupon_delete",
        Some("coupons"),
        Some(serde_json::json!({ "coupon_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Coupon deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}
