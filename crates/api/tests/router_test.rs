//! Router-level tests for the HTTP API.
//!
//! Requests go through the full middleware stack against an in-memory
//! `SQLite` database.

use std::time::Duration;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use haulbook_api::{AppState, create_router, middleware::ACTOR_HEADER};
use haulbook_db::migration::{Migrator, MigratorTrait};
use haulbook_shared::EngineConfig;
use http_body_util::BodyExt;
use rstest::rstest;
use sea_orm::{ConnectOptions, Database};
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

async fn app() -> Router {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options)
        .await
        .expect("Failed to connect to database");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    create_router(
        AppState::new(db, EngineConfig::default()),
        Duration::from_secs(5),
    )
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("Failed to send request");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("Body is not JSON")
    };
    (status, body)
}

fn post_json(uri: &str, actor: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::post(uri).header(header::CONTENT_TYPE, "application/json");
    if let Some(actor) = actor {
        builder = builder.header(&ACTOR_HEADER, actor);
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("Failed to build request")
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri)
        .body(Body::empty())
        .expect("Failed to build request")
}

fn order_body(number: &str) -> Value {
    json!({
        "order_number": number,
        "customer_id": Uuid::new_v4(),
        "business_unit_id": Uuid::new_v4(),
        "lines": [
            { "product_id": Uuid::new_v4(), "quantity": "2", "unit_price": "150" }
        ]
    })
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health_is_public() {
    let app = app().await;

    let (status, body) = send(&app, get("/api/v1/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, _) = send(&app, get("/api/v1/health/ready")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let app = app().await;

    let response = app
        .clone()
        .oneshot(get("/api/v1/health"))
        .await
        .expect("Failed to send request");
    assert!(response.headers().contains_key("x-request-id"));
}

// ============================================================================
// Actor
// ============================================================================

#[rstest]
#[case::missing(None, "MISSING_ACTOR")]
#[case::malformed(Some("not-a-uuid"), "INVALID_ACTOR")]
#[case::empty(Some(""), "INVALID_ACTOR")]
#[tokio::test]
async fn test_mutation_requires_valid_actor(#[case] actor: Option<&str>, #[case] code: &str) {
    let app = app().await;

    let (status, body) = send(&app, post_json("/api/v1/orders", actor, &order_body("SO-1"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], code);
}

#[tokio::test]
async fn test_reads_do_not_require_actor() {
    let app = app().await;

    let (status, _) = send(&app, get(&format!("/api/v1/accounts/{}", Uuid::new_v4()))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ============================================================================
// Orders
// ============================================================================

#[tokio::test]
async fn test_place_and_approve_order() {
    let app = app().await;
    let actor = Uuid::new_v4().to_string();

    let (status, body) = send(
        &app,
        post_json("/api/v1/orders", Some(&actor), &order_body("SO-100")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["order"]["status"], "pending");
    assert_eq!(body["lines"].as_array().map(Vec::len), Some(1));
    let order_id = body["order"]["id"]
        .as_str()
        .expect("order id")
        .to_string();

    let uri = format!("/api/v1/orders/{order_id}/approve");
    let (status, body) = send(&app, post_json(&uri, Some(&actor), &json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "processing");

    // Replaying the same transition is rejected.
    let (status, body) = send(&app, post_json(&uri, Some(&actor), &json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_TRANSITION");

    let (status, body) = send(&app, get(&format!("/api/v1/history/orders/{order_id}"))).await;
    assert_eq!(status, StatusCode::OK);
    let statuses: Vec<&str> = body
        .as_array()
        .expect("history array")
        .iter()
        .filter_map(|r| r["new_state"].as_str())
        .collect();
    assert_eq!(statuses, vec!["pending", "processing"]);
}

#[tokio::test]
async fn test_unknown_order_returns_error_body() {
    let app = app().await;

    let (status, body) = send(&app, get(&format!("/api/v1/orders/{}", Uuid::new_v4()))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NOT_FOUND");
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_unknown_history_kind_is_bad_request() {
    let app = app().await;

    let (status, body) = send(
        &app,
        get(&format!("/api/v1/history/invoices/{}", Uuid::new_v4())),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_create_load_requires_orders() {
    let app = app().await;
    let actor = Uuid::new_v4().to_string();

    let body = json!({
        "order_ids": [],
        "vehicle_id": Uuid::new_v4(),
        "responsible_person_id": Uuid::new_v4(),
        "load_date": "2026-10-19"
    });
    let (status, body) = send(&app, post_json("/api/v1/loads", Some(&actor), &body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");
}

// ============================================================================
// Accounts
// ============================================================================

#[tokio::test]
async fn test_overdrawn_transfer_is_unprocessable() {
    let app = app().await;
    let actor = Uuid::new_v4().to_string();

    let mut ids = Vec::new();
    for (name, opening) in [("Till", "100"), ("Bank", "0")] {
        let body = json!({
            "name": name,
            "account_type": "current",
            "opening_balance": opening
        });
        let (status, body) = send(&app, post_json("/api/v1/accounts", Some(&actor), &body)).await;
        assert_eq!(status, StatusCode::CREATED);
        ids.push(body["id"].as_str().expect("account id").to_string());
    }

    let transfer = json!({
        "from_account_id": ids[0],
        "to_account_id": ids[1],
        "amount": "250",
        "date": "2026-10-19"
    });
    let (status, body) = send(
        &app,
        post_json("/api/v1/transfers", Some(&actor), &transfer),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "INSUFFICIENT_FUNDS");

    let (status, body) = send(&app, get(&format!("/api/v1/accounts/{}/entries", ids[0]))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));
}
