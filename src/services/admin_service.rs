use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QuerySelect};

use crate::{
    dto::admin::AdminStats,
    entity::{
        Orders, Products, Users,
        orders::{self, OrderStatus},
        products,
    },
    error::AppResult,
    middleware::auth::{AuthUser, ensure_admin},
    response::{ApiResponse, Meta},
    state::AppState,
};

type RevenueRow = (i64, DateTime<chrono::FixedOffset>);

pub async fn stats(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<AdminStats>> {
    ensure_admin(user)?;

    let total_orders = Orders::find().count(&state.orm).await? as i64;
    let pending_orders = Orders::find()
        .filter(orders::Column::Status.eq(OrderStatus::Pending))
        .count(&state.orm)
        .await? as i64;
    let total_products = Products::find()
        .filter(products::Column::IsActive.eq(true))
        .count(&state.orm)
        .await? as i64;
    let total_users = Users::find().count(&state.orm).await? as i64;

    let revenue: Vec<RevenueRow> = Orders::find()
        .select_only()
        .column(orders::Column::FinalPrice)
        .column(orders::Column::CreatedAt)
        .filter(orders::Column::Status.ne(OrderStatus::Cancelled))
        .into_tuple()
        .all(&state.orm)
        .await?;
    let (total_revenue, today_revenue) = sum_revenue(&revenue, Utc::now());

    Ok(ApiResponse::success(
        "Stats",
        AdminStats {
            total_revenue,
            today_revenue,
            total_orders,
            pending_orders,
            total_products,
            total_users,
        },
        Some(Meta::empty()),
    ))
}

/// Returns `(all time, since 00:00 UTC of now)`.
fn sum_revenue(rows: &[RevenueRow], now: DateTime<Utc>) -> (i64, i64) {
    let day_start = now.date_naive().and_hms_opt(0, 0, 0).map(|d| d.and_utc());
    rows.iter().fold((0, 0), |(total, today), (amount, placed_at)| {
        let placed_at = placed_at.with_timezone(&Utc);
        let is_today = day_start.is_some_and(|start| placed_at >= start);
        (total + amount, if is_today { today + amount } else { today })
    })
}
