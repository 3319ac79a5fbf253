//! Integration tests for the HTTP API, driving the router directly
//! with an in-memory store and a stubbed upstream client.

use anyhow::{bail, Result};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use geo_cache::{ApiServer, GeoClient, GeoData, IpService, MemoryRecordStore};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

struct StubGeoClient {
    fail_with: Option<String>,
}

#[async_trait]
impl GeoClient for StubGeoClient {
    async fn fetch(&self, _ip: &str) -> Result<GeoData> {
        if let Some(message) = &self.fail_with {
            bail!(message.clone());
        }
        Ok(GeoData {
            country: Some("United States".to_string()),
            city: Some("Mountain View".to_string()),
            latitude: Some(37.386),
            longitude: Some(-122.0838),
        })
    }
}

fn test_app() -> axum::Router {
    app_with_client(StubGeoClient { fail_with: None })
}

fn app_with_client(client: StubGeoClient) -> axum::Router {
    let service = Arc::new(IpService::new(
        Arc::new(MemoryRecordStore::new()),
        Arc::new(client),
    ));
    ApiServer::router(service)
}

async fn send(app: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = test_app();
    let (status, body) = send(&app, get("/api/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_get_ip_returns_record() {
    let app = test_app();
    let (status, body) = send(&app, get("/api/ip/8.8.8.8")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ip"], "8.8.8.8");
    assert_eq!(body["country"], "United States");
    assert_eq!(body["city"], "Mountain View");
    assert_eq!(body["latitude"], 37.386);
    assert_eq!(body["longitude"], -122.0838);
    assert!(body["updatedAt"].is_string());
}

#[tokio::test]
async fn test_get_invalid_ip_is_bad_request() {
    let app = test_app();
    let (status, body) = send(&app, get("/api/ip/not-an-ip")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Invalid IP address" }));
}

#[tokio::test]
async fn test_blacklisted_ip_is_forbidden_on_get() {
    let app = test_app();

    let (status, _) = send(
        &app,
        json_request("POST", "/api/blacklist", json!({ "ip": "1.1.1.1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, get("/api/ip/1.1.1.1")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, json!({ "error": "IP is blacklisted" }));
}

#[tokio::test]
async fn test_upstream_failure_is_bad_gateway() {
    let app = app_with_client(StubGeoClient {
        fail_with: Some("ipstack error".to_string()),
    });

    let (status, body) = send(&app, get("/api/ip/8.8.8.8")).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body, json!({ "error": "ipstack error" }));
}

#[tokio::test]
async fn test_delete_cached_ip_then_get_recreates_it() {
    let app = test_app();

    let (status, _) = send(&app, get("/api/ip/8.8.4.4")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, delete("/api/ip/8.8.4.4")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "IP deleted" }));

    let (status, _) = send(&app, get("/api/ip/8.8.4.4")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_delete_unknown_ip_is_not_found() {
    let app = test_app();
    let (status, body) = send(&app, delete("/api/ip/8.8.8.8")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "IP not found" }));
}

#[tokio::test]
async fn test_bulk_lookup_mixed_results() {
    let app = test_app();
    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/ip/bulk",
            json!({ "ips": ["1.1.1.1", "bad", "8.8.8.8"] }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 3);

    assert_eq!(results[0]["ip"], "1.1.1.1");
    assert_eq!(results[0]["success"], true);
    assert_eq!(results[0]["country"], "United States");

    assert_eq!(results[1]["ip"], "bad");
    assert_eq!(results[1]["success"], false);
    assert_eq!(results[1]["error"], "Invalid IP address");

    assert_eq!(results[2]["ip"], "8.8.8.8");
    assert_eq!(results[2]["success"], true);
}

#[tokio::test]
async fn test_bulk_lookup_rejects_bad_body() {
    let app = test_app();

    for payload in [json!({}), json!({ "ips": [] }), json!({ "ips": "8.8.8.8" })] {
        let (status, body) = send(&app, json_request("POST", "/api/ip/bulk", payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({ "error": "Field \"ips\" must be a non-empty array" })
        );
    }
}

#[tokio::test]
async fn test_blacklist_add_requires_ip_field() {
    let app = test_app();
    let (status, body) = send(&app, json_request("POST", "/api/blacklist", json!({}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Missing IP" }));
}

#[tokio::test]
async fn test_blacklist_add_invalid_ip_is_bad_request() {
    let app = test_app();
    let (status, body) = send(
        &app,
        json_request("POST", "/api/blacklist", json!({ "ip": "nope" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Invalid IP address" }));
}

#[tokio::test]
async fn test_blacklist_remove_roundtrip() {
    let app = test_app();

    let (status, _) = send(
        &app,
        json_request("POST", "/api/blacklist", json!({ "ip": "1.1.1.1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, delete("/api/blacklist/1.1.1.1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "IP removed from blacklist" }));

    // A lookup now succeeds again
    let (status, _) = send(&app, get("/api/ip/1.1.1.1")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_blacklist_remove_unknown_is_not_found() {
    let app = test_app();
    let (status, body) = send(&app, delete("/api/blacklist/1.1.1.1")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "IP is not in blacklist" }));
}

#[tokio::test]
async fn test_bulk_blacklist_add_and_remove() {
    let app = test_app();

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/blacklist/bulk",
            json!({ "ips": ["1.1.1.1", "bad"] }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let results = body["results"].as_array().unwrap();
    assert_eq!(results[0], json!({ "ip": "1.1.1.1", "success": true }));
    assert_eq!(
        results[1],
        json!({ "ip": "bad", "success": false, "error": "Invalid IP address" })
    );

    let (status, body) = send(
        &app,
        json_request(
            "DELETE",
            "/api/blacklist/bulk",
            json!({ "ips": ["1.1.1.1", "2.2.2.2"] }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let results = body["results"].as_array().unwrap();
    assert_eq!(results[0], json!({ "ip": "1.1.1.1", "success": true }));
    assert_eq!(
        results[1],
        json!({ "ip": "2.2.2.2", "success": false, "error": "IP is not in blacklist" })
    );
}
