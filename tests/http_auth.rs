mod common;

use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use common::{ADMIN_EMAIL, IDENTITY_SECRET, insert_product, setup_state};
use jsonwebtoken::{EncodingKey, Header, encode};
use ott_storefront_api::{dto::auth::Claims, routes::create_app};
use serde_json::Value;
use tower::ServiceExt;

fn token(sub: &str, email: &str) -> String {
    let claims = Claims {
        sub: sub.into(),
        email: Some(email.into()),
        name: Some("Tester".into()),
        exp: (chrono::Utc::now().timestamp() + 600) as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(IDENTITY_SECRET.as_bytes()),
    )
    .expect("token")
}

fn get(uri: &str, bearer: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(bearer) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {bearer}"));
    }
    builder.body(Body::empty()).expect("request")
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

#[tokio::test]
async fn missing_token_is_unauthorized() -> anyhow::Result<()> {
    let app = create_app(setup_state().await?);

    let response = app.oneshot(get("/api/orders/my-orders", None)).await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = json_body(response).await;
    assert!(body["message"].is_string());
    assert!(body["data"].is_object());
    Ok(())
}

#[tokio::test]
async fn forged_token_is_unauthorized() -> anyhow::Result<()> {
    let app = create_app(setup_state().await?);

    let response = app
        .oneshot(get("/api/orders/my-orders", Some("not.a.token")))
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn buyer_token_reaches_own_data_but_not_admin() -> anyhow::Result<()> {
    let app = create_app(setup_state().await?);
    let bearer = token("buyer-1", "buyer@buyers.test");

    let mine = app
        .clone()
        .oneshot(get("/api/orders/my-orders", Some(&bearer)))
        .await?;
    assert_eq!(mine.status(), StatusCode::OK);
    let body = json_body(mine).await;
    assert_eq!(body["data"], serde_json::json!([]));

    let stats = app.oneshot(get("/api/admin/stats", Some(&bearer))).await?;
    assert_eq!(stats.status(), StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn allow_listed_identity_is_admin() -> anyhow::Result<()> {
    let app = create_app(setup_state().await?);
    let bearer = token("owner-1", ADMIN_EMAIL);

    let response = app.oneshot(get("/api/admin/stats", Some(&bearer))).await?;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["data"]["total_orders"], 0);
    Ok(())
}

#[tokio::test]
async fn catalog_is_public_and_unknown_paths_are_enveloped() -> anyhow::Result<()> {
    let state = setup_state().await?;
    insert_product(&state, "Netflix", 500, 400).await?;
    let app = create_app(state);

    let products = app
        .clone()
        .oneshot(get("/api/products?page=1&per_page=5", None))
        .await?;
    assert_eq!(products.status(), StatusCode::OK);
    let body = json_body(products).await;
    assert_eq!(body["data"][0]["ott_name"], "Netflix");
    assert_eq!(body["meta"]["per_page"], 5);

    let missing = app.oneshot(get("/api/nowhere", None)).await?;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    let body = json_body(missing).await;
    assert_eq!(body["data"]["path"], "/api/nowhere");
    Ok(())
}

#[tokio::test]
async fn far_out_page_returns_empty_list() -> anyhow::Result<()> {
    let state = setup_state().await?;
    insert_product(&state, "Netflix", 500, 400).await?;
    let app = create_app(state);

    let response = app
        .oneshot(get("/api/products?page=9223372036854775807", None))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"], serde_json::json!([]));
    assert_eq!(body["meta"]["page"], 1_000_000);
    assert_eq!(body["meta"]["total"], 1);
    Ok(())
}
