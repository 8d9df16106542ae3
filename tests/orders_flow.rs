mod common;

use chrono::Utc;
use common::{admin, buyer, insert_product, setup_state};
use ott_storefront_api::{
    dto::orders::{CancelOrderRequest, CreateOrderRequest, DeliverOrderRequest},
    entity::{Invoices, Notifications, Orders, invoices, orders::OrderStatus},
    error::AppError,
    routes::params::OrderListQuery,
    services::{admin_service, notification_service, order_service, product_service},
};
use sea_orm::{ActiveModelTrait, EntityTrait, PaginatorTrait, Set};
use uuid::Uuid;

fn order_request(product_id: Uuid) -> CreateOrderRequest {
    CreateOrderRequest {
        product_id,
        payment_method: "nagad".into(),
        transaction_id: "TX-778".into(),
        phone: "01800000000".into(),
        coupon_code: None,
    }
}

fn delivery() -> DeliverOrderRequest {
    DeliverOrderRequest {
        ott_email_or_username: "stream@mail.test".into(),
        ott_password: Some("s3cret".into()),
        delivery_message: Some("Profile 2 is yours".into()),
    }
}

// Buyer orders, admin delivers: invoice issued, buyer notified twice, and a
// second transition is refused.
#[tokio::test]
async fn order_delivery_issues_invoice_and_notifies() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let product = insert_product(&state, "Netflix", 500, 400).await?;
    let alice = buyer("alice");

    let order = order_service::create_order(&state, &alice, order_request(product.id))
        .await?
        .into_data()
        .expect("order");
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.email.as_deref(), Some("alice@buyers.test"));
    assert_eq!(order.product_snapshot.ott_name, "Netflix");
    assert!(order.delivery_details.is_none());

    let delivered = order_service::deliver_order(&state, &admin(), order.id, delivery())
        .await?
        .into_data()
        .expect("delivery");
    assert_eq!(delivered.order.status, OrderStatus::Delivered);
    let details = delivered.order.delivery_details.expect("details");
    assert_eq!(details.ott_email_or_username.as_deref(), Some("stream@mail.test"));
    assert!(details.delivered_at.is_some());
    assert_eq!(delivered.invoice.order_id, order.id);
    assert_eq!(delivered.invoice.amount, 400);
    assert!(delivered.invoice.invoice_number.starts_with("INV-"));
    assert_eq!(delivered.invoice.invoice_number.len(), "INV-20250101-ABCDEF12".len());

    let feed = notification_service::list_notifications(&state, &alice)
        .await?
        .into_data()
        .expect("notifications");
    let titles: Vec<&str> = feed.items.iter().map(|n| n.title.as_str()).collect();
    assert_eq!(titles.len(), 2);
    assert!(titles.contains(&"Order Received"));
    assert!(titles.contains(&"Order Delivered!"));

    let again = order_service::deliver_order(&state, &admin(), order.id, delivery()).await;
    assert!(matches!(again, Err(AppError::Conflict(_))));
    let cancel = order_service::cancel_order(
        &state,
        &admin(),
        order.id,
        CancelOrderRequest::default(),
    )
    .await;
    assert!(matches!(cancel, Err(AppError::Conflict(_))));
    assert_eq!(Invoices::find().count(&state.orm).await?, 1);

    let invoices = order_service::list_my_invoices(&state, &alice)
        .await?
        .into_data()
        .expect("invoices");
    assert_eq!(invoices.items.len(), 1);
    assert_eq!(
        invoices.items[0].order.as_ref().map(|o| o.id),
        Some(order.id)
    );
    Ok(())
}

#[tokio::test]
async fn cancel_records_reason_and_blocks_delivery() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let product = insert_product(&state, "Prime Video", 1500, 1200).await?;
    let bob = buyer("bob");

    let order = order_service::create_order(&state, &bob, order_request(product.id))
        .await?
        .into_data()
        .expect("order");

    let cancelled = order_service::cancel_order(
        &state,
        &admin(),
        order.id,
        CancelOrderRequest {
            reason: Some("Payment not received".into()),
        },
    )
    .await?
    .into_data()
    .expect("order");
    assert_eq!(cancelled.status, OrderStatus::Cancelled);
    assert_eq!(
        cancelled.delivery_details.and_then(|d| d.message).as_deref(),
        Some("Payment not received")
    );

    let deliver = order_service::deliver_order(&state, &admin(), order.id, delivery()).await;
    assert!(matches!(deliver, Err(AppError::Conflict(_))));
    assert_eq!(Invoices::find().count(&state.orm).await?, 0);

    let feed = notification_service::list_notifications(&state, &bob)
        .await?
        .into_data()
        .expect("notifications");
    let cancelled_note = feed
        .items
        .iter()
        .find(|n| n.title == "Order Cancelled")
        .expect("cancel notification");
    assert!(cancelled_note.message.contains("Payment not received"));
    Ok(())
}

#[tokio::test]
async fn whitespace_only_fields_are_rejected() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let product = insert_product(&state, "Netflix", 500, 400).await?;

    let blank_phone = CreateOrderRequest {
        phone: "   ".into(),
        ..order_request(product.id)
    };
    let result = order_service::create_order(&state, &buyer("u1"), blank_phone).await;
    assert!(matches!(&result, Err(AppError::BadRequest(msg)) if msg.contains("phone")));
    assert_eq!(Orders::find().count(&state.orm).await?, 0);

    let order = order_service::create_order(&state, &buyer("u1"), order_request(product.id))
        .await?
        .into_data()
        .expect("order");
    let blank_login = DeliverOrderRequest {
        ott_email_or_username: " \t".into(),
        ..delivery()
    };
    let result = order_service::deliver_order(&state, &admin(), order.id, blank_login).await;
    assert!(matches!(
        &result,
        Err(AppError::BadRequest(msg)) if msg.contains("ott_email_or_username")
    ));

    let stored = Orders::find_by_id(order.id).one(&state.orm).await?.expect("order");
    assert_eq!(stored.status, OrderStatus::Pending);
    Ok(())
}

#[tokio::test]
async fn taken_invoice_number_falls_back_to_full_order_id() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let product = insert_product(&state, "Netflix", 500, 400).await?;
    let first = order_service::create_order(&state, &buyer("u1"), order_request(product.id))
        .await?
        .into_data()
        .expect("order");
    let second = order_service::create_order(&state, &buyer("u2"), order_request(product.id))
        .await?
        .into_data()
        .expect("order");

    let now = Utc::now();
    let short = order_service::build_invoice_number(first.id, now);
    invoices::ActiveModel {
        id: Set(Uuid::new_v4()),
        order_id: Set(second.id),
        user_uid: Set("u2".into()),
        invoice_number: Set(short.clone()),
        amount: Set(400),
        generated_at: Set(now.into()),
    }
    .insert(&state.orm)
    .await?;

    let delivered = order_service::deliver_order(&state, &admin(), first.id, delivery())
        .await?
        .into_data()
        .expect("delivery");

    let expected = format!("{short}{}", &first.id.simple().to_string().to_uppercase()[8..]);
    assert_eq!(delivered.invoice.invoice_number, expected);
    assert_eq!(delivered.order.status, OrderStatus::Delivered);
    assert_eq!(Invoices::find().count(&state.orm).await?, 2);
    Ok(())
}

#[tokio::test]
async fn deleting_product_keeps_order_snapshot() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let product = insert_product(&state, "Hoichoi", 800, 650).await?;
    let carol = buyer("carol");

    order_service::create_order(&state, &carol, order_request(product.id)).await?;
    product_service::delete_product(&state, &admin(), product.id).await?;

    let orders = order_service::list_my_orders(&state, &carol)
        .await?
        .into_data()
        .expect("orders");
    assert_eq!(orders.items.len(), 1);
    assert_eq!(orders.items[0].product_id, product.id);
    assert_eq!(orders.items[0].product_snapshot.ott_name, "Hoichoi");
    assert_eq!(orders.items[0].final_price, 650);

    let reorder = order_service::create_order(&state, &carol, order_request(product.id)).await;
    assert!(matches!(reorder, Err(AppError::NotFound)));
    Ok(())
}

#[tokio::test]
async fn hidden_product_cannot_be_ordered() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let product = insert_product(&state, "Netflix", 500, 400).await?;
    product_service::set_product_active(
        &state,
        &admin(),
        product.id,
        ott_storefront_api::dto::products::SetProductActiveRequest { is_active: false },
    )
    .await?;

    let result = order_service::create_order(&state, &buyer("dan"), order_request(product.id)).await;
    assert!(matches!(result, Err(AppError::NotFound)));
    assert_eq!(Orders::find().count(&state.orm).await?, 0);
    assert_eq!(Notifications::find().count(&state.orm).await?, 0);
    Ok(())
}

#[tokio::test]
async fn admin_listing_filters_and_stats_add_up() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let product = insert_product(&state, "Netflix", 500, 400).await?;

    let first = order_service::create_order(&state, &buyer("a"), order_request(product.id))
        .await?
        .into_data()
        .expect("order");
    let second = order_service::create_order(&state, &buyer("b"), order_request(product.id))
        .await?
        .into_data()
        .expect("order");
    order_service::create_order(&state, &buyer("c"), order_request(product.id)).await?;

    order_service::deliver_order(&state, &admin(), first.id, delivery()).await?;
    order_service::cancel_order(&state, &admin(), second.id, CancelOrderRequest::default())
        .await?;

    let pending = order_service::list_all_orders(
        &state,
        &admin(),
        OrderListQuery {
            status: Some(OrderStatus::Pending),
            ..OrderListQuery::default()
        },
    )
    .await?;
    let meta = pending.meta.clone().expect("meta");
    assert_eq!(meta.total, Some(1));
    assert_eq!(pending.into_data().expect("orders").items.len(), 1);

    let stats = admin_service::stats(&state, &admin())
        .await?
        .into_data()
        .expect("stats");
    assert_eq!(stats.total_orders, 3);
    assert_eq!(stats.pending_orders, 1);
    assert_eq!(stats.total_revenue, 800);
    assert_eq!(stats.today_revenue, 800);
    assert_eq!(stats.total_products, 1);

    let forbidden = order_service::list_all_orders(&state, &buyer("a"), OrderListQuery::default()).await;
    assert!(matches!(forbidden, Err(AppError::Forbidden)));
    Ok(())
}
