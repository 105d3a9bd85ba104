//--------------------------------------------------------------------------------------------------
// TEST MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// Integration tests for the HTTP surface: webhook ingestion, order queries, and the health check.
// Each test builds its own router over fresh in-memory repositories.
//--------------------------------------------------------------------------------------------------

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::Utc;
use hyper::Response;
use serde_json::{from_slice, json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use order_lifecycle::api::AppState;
use order_lifecycle::domain::services::{OrderEngine, SubscriberHub, FINALIZE_TIMEOUT};
use order_lifecycle::infrastructure::memory::new_repositories;
use order_lifecycle::usecase::{IngressUsecase, QueryUsecase};
use order_lifecycle::Api;

/// Sets up a test router over fresh in-memory repositories.
fn setup_test_router() -> Router {
    let (order_repo, event_repo) = new_repositories();
    let hub = SubscriberHub::new();
    let engine = OrderEngine::new(order_repo.clone(), event_repo, hub.clone(), FINALIZE_TIMEOUT);
    let ingress = Arc::new(IngressUsecase::new(engine));
    let query = Arc::new(QueryUsecase::new(order_repo));
    let state = Arc::new(AppState::new(ingress, query, hub));

    let addr = SocketAddr::from(([127, 0, 0, 1], 0));
    Api::new(addr, state).routes()
}

async fn parse_json_response(response: Response<Body>) -> Value {
    let body_bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    from_slice(&body_bytes).unwrap()
}

fn ingest_payload(event_id: Uuid, order_id: Uuid, user_id: Uuid, status: &str) -> Value {
    let now = Utc::now().to_rfc3339();
    json!({
        "event_id": event_id.to_string(),
        "order_id": order_id.to_string(),
        "user_id": user_id.to_string(),
        "order_status": status,
        "created_at": now,
        "updated_at": now,
    })
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = setup_test_router();

    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_ingest_event_creates_order() {
    let app = setup_test_router();
    let order_id = Uuid::new_v4();
    let user_id = Uuid::new_v4();
    let payload = ingest_payload(Uuid::new_v4(), order_id, user_id, "cool_order_created");

    let response = app
        .clone()
        .oneshot(
            Request::post("/webhooks/payments/orders")
                .header("Content-Type", "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let url = format!("/orders/{}", order_id);
    let get_response = app
        .oneshot(Request::get(&url).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(get_response.status(), StatusCode::OK);

    let body = parse_json_response(get_response).await;
    assert_eq!(body["order_id"], order_id.to_string());
    assert_eq!(body["user_id"], user_id.to_string());
    assert_eq!(body["status"], "cool_order_created");
    assert_eq!(body["is_final"], false);
}

#[tokio::test]
async fn test_ingest_event_with_unknown_status_is_bad_request() {
    let app = setup_test_router();
    let payload = ingest_payload(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), "banana");

    let response = app
        .oneshot(
            Request::post("/webhooks/payments/orders")
                .header("Content-Type", "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_ingest_duplicate_event_id_is_conflict() {
    let app = setup_test_router();
    let event_id = Uuid::new_v4();
    let payload = ingest_payload(event_id, Uuid::new_v4(), Uuid::new_v4(), "cool_order_created");

    let first = app
        .clone()
        .oneshot(
            Request::post("/webhooks/payments/orders")
                .header("Content-Type", "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let second = app
        .oneshot(
            Request::post("/webhooks/payments/orders")
                .header("Content-Type", "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_get_order_not_found() {
    let app = setup_test_router();
    let url = format!("/orders/{}", Uuid::new_v4());

    let response = app
        .oneshot(Request::get(&url).body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_event_past_a_final_order_is_gone() {
    let app = setup_test_router();
    let order_id = Uuid::new_v4();
    let user_id = Uuid::new_v4();

    for status in ["cool_order_created", "changed_my_mind"] {
        let payload = ingest_payload(Uuid::new_v4(), order_id, user_id, status);
        let response = app
            .clone()
            .oneshot(
                Request::post("/webhooks/payments/orders")
                    .header("Content-Type", "application/json")
                    .body(Body::from(payload.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let payload = ingest_payload(Uuid::new_v4(), order_id, user_id, "confirmed_by_mayor");
    let response = app
        .oneshot(
            Request::post("/webhooks/payments/orders")
                .header("Content-Type", "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::GONE);
}

#[tokio::test]
async fn test_list_orders_filters_by_user() {
    let app = setup_test_router();
    let user_a = Uuid::new_v4();
    let user_b = Uuid::new_v4();

    for user_id in [user_a, user_b] {
        let payload = ingest_payload(Uuid::new_v4(), Uuid::new_v4(), user_id, "cool_order_created");
        let response = app
            .clone()
            .oneshot(
                Request::post("/webhooks/payments/orders")
                    .header("Content-Type", "application/json")
                    .body(Body::from(payload.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let url = format!("/orders?user_id={}&is_final=false", user_a);
    let response = app
        .oneshot(Request::get(&url).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = parse_json_response(response).await;
    let orders = body.as_array().unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["user_id"], user_a.to_string());
}

#[tokio::test]
async fn test_list_orders_rejects_status_and_is_final_together() {
    let app = setup_test_router();

    let response = app
        .oneshot(
            Request::get("/orders?status=chinazes&is_final=true")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_orders_rejects_neither_status_nor_is_final() {
    let app = setup_test_router();

    let response = app
        .oneshot(Request::get("/orders").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
