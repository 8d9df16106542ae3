use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseTransaction, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait,
};
use sea_orm::sea_query::LockType;
use uuid::Uuid;
use validator::Validate;

use crate::{
    audit::log_audit,
    dto::orders::{
        CancelOrderRequest, CreateOrderRequest, DeliverOrderRequest, DeliveryResult,
        InvoiceList, InvoiceWithOrder, OrderList,
    },
    entity::{
        Invoices, Orders, Products,
        invoices,
        orders::{self, OrderStatus},
        products,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Invoice, Order},
    pricing::PriceQuote,
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    services::{notification_service::notify, promotion_service},
    state::AppState,
};

/// Place an order for one product.
///
/// Pricing, the coupon claim, the order row and the buyer's notification
/// commit together or not at all.
pub async fn create_order(
    state: &AppState,
    user: &AuthUser,
    payload: CreateOrderRequest,
) -> AppResult<ApiResponse<Order>> {
    payload.validate()?;
    let now = Utc::now();

    let txn = state.orm.begin().await?;
    let product = Products::find()
        .filter(
            Condition::all()
                .add(products::Column::Id.eq(payload.product_id))
                .add(products::Column::IsActive.eq(true)),
        )
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    let base_price = promotion_service::resolve_base_price(&txn, &product, now).await?;

    let code = payload
        .coupon_code
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());
    let (coupon_code, quote) = match code {
        Some(code) => {
            let (coupon, quote) =
                promotion_service::apply_coupon(&txn, code, base_price, now).await?;
            let applied = (quote.discount_amount > 0).then_some(coupon.code);
            (applied, quote)
        }
        None => (None, PriceQuote::undiscounted(base_price)),
    };

    let order = orders::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_uid: Set(user.uid.clone()),
        product_id: Set(product.id),
        product_ott_name: Set(product.ott_name.clone()),
        product_package_name: Set(product.package_name.clone()),
        product_duration: Set(product.duration.clone()),
        email: Set(user.email.clone()),
        phone: Set(payload.phone.trim().to_string()),
        payment_method: Set(payload.payment_method.trim().to_string()),
        transaction_id: Set(payload.transaction_id.trim().to_string()),
        status: Set(OrderStatus::Pending),
        coupon_code: Set(coupon_code),
        base_price: Set(quote.base_price),
        discount_amount: Set(quote.discount_amount),
        final_price: Set(quote.final_price),
        delivery_login: Set(None),
        delivery_password: Set(None),
        delivery_message: Set(None),
        delivered_at: Set(None),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&txn)
    .await?;

    notify(
        &txn,
        &order.user_uid,
        "Order Received",
        &format!(
            "Your order for {} {} has been placed and is awaiting delivery.",
            order.product_ott_name, order.product_package_name
        ),
    )
    .await?;

    txn.commit().await?;

    tracing::info!(
        order_id = %order.id,
        user_uid = %order.user_uid,
        product_id = %order.product_id,
        final_price = order.final_price,
        coupon = ?order.coupon_code,
        "order placed"
    );

    if let Err(err) = log_audit(
        &state.orm,
        Some(&user.uid),
        "order_create",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id, "final_price": order.final_price })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Order placed",
        Order::from(order),
        Some(Meta::empty()),
    ))
}

pub async fn list_my_orders(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<OrderList>> {
    let items: Vec<Order> = Orders::find()
        .filter(orders::Column::UserUid.eq(user.uid.as_str()))
        .order_by_desc(orders::Column::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Order::from)
        .collect();

    let meta = Meta::total(items.len());
    Ok(ApiResponse::success("My orders", OrderList { items }, Some(meta)))
}

pub async fn list_all_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = query.pagination().normalize();

    let mut condition = Condition::all();
    if let Some(status) = query.status {
        condition = condition.add(orders::Column::Status.eq(status));
    }

    let mut finder = Orders::find().filter(condition);
    finder = match query.sort_order.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => finder.order_by_asc(orders::Column::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(orders::Column::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Order::from)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Orders", OrderList { items }, Some(meta)))
}

/// Hand the buyer their credentials. Moves a pending order to delivered,
/// issues its invoice and notifies the buyer in one transaction.
pub async fn deliver_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: DeliverOrderRequest,
) -> AppResult<ApiResponse<DeliveryResult>> {
    ensure_admin(user)?;
    payload.validate()?;
    let now = Utc::now();

    let txn = state.orm.begin().await?;
    let existing = Orders::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;
    ensure_transition(&existing, OrderStatus::Delivered)?;

    let mut active: orders::ActiveModel = existing.into();
    active.status = Set(OrderStatus::Delivered);
    active.delivery_login = Set(Some(payload.ott_email_or_username.trim().to_string()));
    active.delivery_password = Set(payload.ott_password);
    active.delivery_message = Set(payload.delivery_message);
    active.delivered_at = Set(Some(now.into()));
    active.updated_at = Set(now.into());
    let order = active.update(&txn).await?;

    let invoice = issue_invoice(&txn, &order, now).await?;

    notify(
        &txn,
        &order.user_uid,
        "Order Delivered!",
        &format!(
            "Your {} {} subscription is ready. Check your order for the login details.",
            order.product_ott_name, order.product_package_name
        ),
    )
    .await?;

    txn.commit().await?;

    tracing::info!(
        order_id = %order.id,
        invoice_number = %invoice.invoice_number,
        "order delivered"
    );

    if let Err(err) = log_audit(
        &state.orm,
        Some(&user.uid),
        "order_deliver",
        Some("orders"),
        Some(serde_json::json!({
            "order_id": order.id,
            "invoice_number": invoice.invoice_number,
        })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Order delivered",
        DeliveryResult {
            order: Order::from(order),
            invoice: Invoice::from(invoice),
        },
        Some(Meta::empty()),
    ))
}

pub async fn cancel_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: CancelOrderRequest,
) -> AppResult<ApiResponse<Order>> {
    ensure_admin(user)?;
    let now = Utc::now();
    let reason = payload
        .reason
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty());

    let txn = state.orm.begin().await?;
    let existing = Orders::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;
    ensure_transition(&existing, OrderStatus::Cancelled)?;

    let mut active: orders::ActiveModel = existing.into();
    active.status = Set(OrderStatus::Cancelled);
    active.delivery_message = Set(reason.clone());
    active.updated_at = Set(now.into());
    let order = active.update(&txn).await?;

    let message = match &reason {
        Some(reason) => format!(
            "Your order for {} {} was cancelled. Reason: {reason}",
            order.product_ott_name, order.product_package_name
        ),
        None => format!(
            "Your order for {} {} was cancelled.",
            order.product_ott_name, order.product_package_name
        ),
    };
    notify(&txn, &order.user_uid, "Order Cancelled", &message).await?;

    txn.commit().await?;

    tracing::info!(order_id = %order.id, reason = ?reason, "order cancelled");

    if let Err(err) = log_audit(
        &state.orm,
        Some(&user.uid),
        "order_cancel",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id, "reason": reason })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Order cancelled",
        Order::from(order),
        Some(Meta::empty()),
    ))
}

pub async fn list_my_invoices(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<InvoiceList>> {
    let items: Vec<InvoiceWithOrder> = Invoices::find()
        .filter(invoices::Column::UserUid.eq(user.uid.as_str()))
        .order_by_desc(invoices::Column::GeneratedAt)
        .find_also_related(Orders)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|(invoice, order)| InvoiceWithOrder {
            invoice: Invoice::from(invoice),
            order: order.map(Order::from),
        })
        .collect();

    let meta = Meta::total(items.len());
    Ok(ApiResponse::success("My invoices", InvoiceList { items }, Some(meta)))
}

fn ensure_transition(order: &orders::Model, next: OrderStatus) -> AppResult<()> {
    if order.status.can_transition_to(next) {
        return Ok(());
    }
    Err(AppError::Conflict(format!(
        "Order is already {}",
        order.status
    )))
}

/// Short invoice number first; if another order already holds it, the full
/// order id is used instead. The first attempt runs in a savepoint so its
/// failure leaves the delivery transaction usable.
async fn issue_invoice(
    txn: &DatabaseTransaction,
    order: &orders::Model,
    at: DateTime<Utc>,
) -> AppResult<invoices::Model> {
    let savepoint = txn.begin().await?;
    match invoice_row(order, build_invoice_number(order.id, at), at)
        .insert(&savepoint)
        .await
    {
        Ok(invoice) => {
            savepoint.commit().await?;
            Ok(invoice)
        }
        Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            savepoint.rollback().await?;
            let number = build_full_invoice_number(order.id, at);
            tracing::warn!(
                order_id = %order.id,
                invoice_number = %number,
                "invoice number taken, using full id"
            );
            Ok(invoice_row(order, number, at).insert(txn).await?)
        }
        Err(err) => Err(err.into()),
    }
}

fn invoice_row(order: &orders::Model, number: String, at: DateTime<Utc>) -> invoices::ActiveModel {
    invoices::ActiveModel {
        id: Set(Uuid::new_v4()),
        order_id: Set(order.id),
        user_uid: Set(order.user_uid.clone()),
        invoice_number: Set(number),
        amount: Set(order.final_price),
        generated_at: Set(at.into()),
    }
}

pub fn build_invoice_number(order_id: Uuid, at: DateTime<Utc>) -> String {
    let suffix = order_id.simple().to_string().to_uppercase();
    format!("INV-{}-{}", at.format("%Y%m%d"), &suffix[..8])
}

fn build_full_invoice_number(order_id: Uuid, at: DateTime<Utc>) -> String {
    let suffix = order_id.simple().to_string().to_uppercase();
    format!("INV-{}-{}", at.format("%Y%m%d"), suffix)
}
