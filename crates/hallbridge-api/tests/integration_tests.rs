//! # Integration Tests for hallbridge-api
//!
//! Drives the fully assembled router: health probes, authentication and
//! role scoping, rate limiting, metrics exposition, and an end-to-end
//! provisioning and allocation flow across the rooms and students routes.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use hallbridge_api::state::{AppConfig, AppState};

/// Helper: build the test app with auth disabled.
fn test_app() -> axum::Router {
    hallbridge_api::app(AppState::new())
}

fn test_app_with_config(config: AppConfig) -> axum::Router {
    hallbridge_api::app(AppState::with_config(config, None))
}

/// Helper: build the test app with auth enabled.
fn test_app_with_auth(token: &str) -> axum::Router {
    test_app_with_config(AppConfig {
        auth_token: Some(token.to_string()),
        ..AppConfig::default()
    })
}

async fn body_string(response: axum::http::Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(response: axum::http::Response<Body>) -> Value {
    serde_json::from_str(&body_string(response).await).unwrap()
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

fn send(method: &str, uri: &str, body: Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

// -- Health Probes ------------------------------------------------------------

#[tokio::test]
async fn test_liveness_probe() {
    let response = test_app().oneshot(get("/health/liveness", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "ok");
}

#[tokio::test]
async fn test_readiness_probe_without_database() {
    let response = test_app().oneshot(get("/health/readiness", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "ready");
}

#[tokio::test]
async fn test_probes_skip_auth() {
    let app = test_app_with_auth("s3cret");
    let response = app.oneshot(get("/health/liveness", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

// -- Authentication -----------------------------------------------------------

#[tokio::test]
async fn test_api_requires_token_when_configured() {
    let app = test_app_with_auth("s3cret");
    let response = app.clone().oneshot(get("/v1/rooms", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app.clone().oneshot(get("/v1/rooms", Some("wrong"))).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app.oneshot(get("/v1/rooms", Some("s3cret"))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_role_scoping_end_to_end() {
    let app = test_app_with_auth("k");

    let response = app
        .clone()
        .oneshot(send(
            "POST",
            "/v1/rooms",
            json!({"floor": 1, "room_number": "101"}),
            Some("staff::k"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(send(
            "POST",
            "/v1/students",
            json!({"name": "Asha", "student_code": "HB-100"}),
            Some("admin::k"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let asha = body_json(response).await;
    let asha_id = asha["id"].as_str().unwrap().to_string();

    let own = format!("student:{asha_id}:k");
    let response = app
        .clone()
        .oneshot(get(&format!("/v1/students/{asha_id}"), Some(&own)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let stranger = format!("student:{}:k", Uuid::new_v4());
    let response = app
        .oneshot(get(&format!("/v1/students/{asha_id}"), Some(&stranger)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// -- Rate Limiting ------------------------------------------------------------

#[tokio::test]
async fn test_rate_limit_returns_429() {
    let app = test_app_with_config(AppConfig {
        rate_limit_per_minute: 2,
        ..AppConfig::default()
    });
    for _ in 0..2 {
        let response = app.clone().oneshot(get("/v1/rooms", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
    let response = app.oneshot(get("/v1/rooms", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body_json(response).await["error"]["code"], "RATE_LIMITED");
}

// -- Metrics ------------------------------------------------------------------

#[tokio::test]
async fn test_metrics_expose_requests_and_room_gauges() {
    let app = test_app();
    let response = app
        .clone()
        .oneshot(send(
            "POST",
            "/v1/rooms/batch",
            json!({"floor": 1, "start": 1, "end": 3}),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app.oneshot(get("/metrics", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let text = body_string(response).await;
    assert!(text.contains("hallbridge_http_requests_total"));
    assert!(text.contains("path=\"/v1/rooms/batch\""));
    assert!(text.contains("hallbridge_rooms{status=\"vacant\"} 3"));
}

#[tokio::test]
async fn test_metrics_route_absent_when_disabled() {
    let app = test_app_with_config(AppConfig {
        metrics_enabled: false,
        ..AppConfig::default()
    });
    let response = app.oneshot(get("/metrics", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// -- OpenAPI ------------------------------------------------------------------

#[tokio::test]
async fn test_openapi_served() {
    let response = test_app().oneshot(get("/openapi.json", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let doc = body_json(response).await;
    assert!(doc["paths"]["/v1/rooms/{id}/beds/{bed}/allocate"].is_object());
}

// -- End-to-end occupancy flow ------------------------------------------------

#[tokio::test]
async fn test_provision_allocate_and_report() {
    let app = test_app();

    let response = app
        .clone()
        .oneshot(send(
            "POST",
            "/v1/rooms/initialize",
            json!({"floors": 2, "rooms_per_floor": 2, "beds_per_room": 2}),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let outcome = body_json(response).await;
    assert_eq!(outcome["created"], 4);
    let numbers: Vec<&str> = outcome["rooms"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["room_number"].as_str().unwrap())
        .collect();
    assert_eq!(numbers, vec!["101", "102", "201", "202"]);
    let room_201 = outcome["rooms"][2]["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(send(
            "POST",
            "/v1/students",
            json!({"name": "Kiran", "student_code": "HB-200"}),
            None,
        ))
        .await
        .unwrap();
    let kiran = body_json(response).await["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(send(
            "POST",
            &format!("/v1/rooms/{room_201}/beds/2/allocate"),
            json!({"student_id": kiran}),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "partial");

    let response = app
        .clone()
        .oneshot(get(&format!("/v1/students/{kiran}/room"), None))
        .await
        .unwrap();
    let assignment = body_json(response).await;
    assert_eq!(assignment["room_number"], "201");
    assert_eq!(assignment["floor"], 2);
    assert_eq!(assignment["bed_number"], 2);

    let response = app
        .clone()
        .oneshot(get("/v1/rooms/stats?floor=2", None))
        .await
        .unwrap();
    let report = body_json(response).await;
    assert_eq!(report["overall"]["total_rooms"], 2);
    assert_eq!(report["overall"]["occupied_beds"], 1);
    assert_eq!(report["overall"]["available_beds"], 3);

    let response = app
        .oneshot(get("/v1/rooms?search=kiran", None))
        .await
        .unwrap();
    let list = body_json(response).await;
    assert_eq!(list["rooms"].as_array().unwrap().len(), 1);
    assert_eq!(list["rooms"][0]["room_number"], "201");
}

#[tokio::test]
async fn test_malformed_json_returns_structured_error() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/rooms")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert!(response.status().is_client_error());
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}
