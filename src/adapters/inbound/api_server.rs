//! HTTP API Server
//!
//! REST surface over the IP lookup service. Maps the engine's error
//! kinds to status codes and serializes records for the wire; all
//! decisions live in the application layer.

use crate::application::{BulkItem, IpService};
use crate::domain::entities::IpRecord;
use crate::domain::errors::IpServiceError;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Cached record as serialized over HTTP.
#[derive(Debug, Serialize)]
pub struct RecordResponse {
    pub ip: String,
    pub country: Option<String>,
    pub city: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
}

impl From<&IpRecord> for RecordResponse {
    fn from(record: &IpRecord) -> Self {
        Self {
            ip: record.ip.clone(),
            country: record.country.clone(),
            city: record.city.clone(),
            latitude: record.latitude,
            longitude: record.longitude,
            updated_at: record.updated_at.to_rfc3339(),
        }
    }
}

/// One item of a bulk lookup response.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum BulkLookupResponse {
    Success {
        ip: String,
        country: Option<String>,
        city: Option<String>,
        latitude: Option<f64>,
        longitude: Option<f64>,
        #[serde(rename = "updatedAt")]
        updated_at: String,
        success: bool,
    },
    Failure {
        ip: String,
        success: bool,
        error: String,
    },
}

impl From<BulkItem<IpRecord>> for BulkLookupResponse {
    fn from(item: BulkItem<IpRecord>) -> Self {
        match item.result {
            Ok(record) => BulkLookupResponse::Success {
                ip: record.ip,
                country: record.country,
                city: record.city,
                latitude: record.latitude,
                longitude: record.longitude,
                updated_at: record.updated_at.to_rfc3339(),
                success: true,
            },
            Err(err) => BulkLookupResponse::Failure {
                ip: item.ip,
                success: false,
                error: error_message(&err),
            },
        }
    }
}

/// One item of a bulk blacklist add/remove response.
#[derive(Debug, Serialize)]
struct BulkOpResponse {
    ip: String,
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl From<BulkItem<()>> for BulkOpResponse {
    fn from(item: BulkItem<()>) -> Self {
        match item.result {
            Ok(()) => BulkOpResponse {
                ip: item.ip,
                success: true,
                error: None,
            },
            Err(err) => BulkOpResponse {
                ip: item.ip,
                success: false,
                error: Some(error_message(&err)),
            },
        }
    }
}

/// Map an engine error to its HTTP status.
fn error_status(err: &IpServiceError) -> StatusCode {
    match err {
        IpServiceError::InvalidAddress => StatusCode::BAD_REQUEST,
        IpServiceError::Blacklisted => StatusCode::FORBIDDEN,
        IpServiceError::NotFound | IpServiceError::NotBlacklisted => StatusCode::NOT_FOUND,
        IpServiceError::Upstream(_) => StatusCode::BAD_GATEWAY,
        IpServiceError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Message exposed to clients for an engine error.
///
/// Storage failures are not detailed to clients.
fn error_message(err: &IpServiceError) -> String {
    match err {
        IpServiceError::Store(e) => {
            tracing::error!("storage failure: {:?}", e);
            "Internal server error".to_string()
        }
        other => other.to_string(),
    }
}

fn error_response(err: IpServiceError) -> Response {
    let status = error_status(&err);
    let body = serde_json::json!({ "error": error_message(&err) });
    (status, Json(body)).into_response()
}

/// Pull `ips` out of a bulk request body: must be a non-empty array.
/// Non-string elements are stringified, as the bulk operations accept
/// anything and report per-item validation failures.
fn parse_ips(payload: Option<&Value>) -> Option<Vec<String>> {
    let ips = payload?.get("ips")?.as_array()?;
    if ips.is_empty() {
        return None;
    }

    Some(
        ips.iter()
            .map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
    )
}

fn bad_bulk_body() -> Response {
    let body = serde_json::json!({ "error": "Field \"ips\" must be a non-empty array" });
    (StatusCode::BAD_REQUEST, Json(body)).into_response()
}

async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn get_ip_handler(
    State(service): State<Arc<IpService>>,
    Path(ip): Path<String>,
) -> Response {
    match service.lookup(&ip).await {
        Ok(record) => Json(RecordResponse::from(&record)).into_response(),
        Err(err) => error_response(err),
    }
}

async fn delete_ip_handler(
    State(service): State<Arc<IpService>>,
    Path(ip): Path<String>,
) -> Response {
    match service.evict(&ip).await {
        Ok(()) => Json(serde_json::json!({ "message": "IP deleted" })).into_response(),
        Err(err) => error_response(err),
    }
}

async fn bulk_ip_handler(
    State(service): State<Arc<IpService>>,
    payload: Option<Json<Value>>,
) -> Response {
    let payload = payload.map(|Json(v)| v);
    let Some(ips) = parse_ips(payload.as_ref()) else {
        return bad_bulk_body();
    };

    let results: Vec<BulkLookupResponse> = service
        .lookup_many(&ips)
        .await
        .into_iter()
        .map(Into::into)
        .collect();

    Json(serde_json::json!({ "results": results })).into_response()
}

async fn add_blacklist_handler(
    State(service): State<Arc<IpService>>,
    payload: Option<Json<Value>>,
) -> Response {
    let payload = payload.map(|Json(v)| v);
    let ip = payload
        .as_ref()
        .and_then(|p| p.get("ip"))
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty());

    let Some(ip) = ip else {
        let body = serde_json::json!({ "error": "Missing IP" });
        return (StatusCode::BAD_REQUEST, Json(body)).into_response();
    };

    match service.block(ip).await {
        Ok(()) => Json(serde_json::json!({ "message": "IP blacklisted" })).into_response(),
        Err(err) => error_response(err),
    }
}

async fn remove_blacklist_handler(
    State(service): State<Arc<IpService>>,
    Path(ip): Path<String>,
) -> Response {
    match service.unblock(&ip).await {
        Ok(()) => {
            Json(serde_json::json!({ "message": "IP removed from blacklist" })).into_response()
        }
        Err(err) => error_response(err),
    }
}

async fn bulk_add_blacklist_handler(
    State(service): State<Arc<IpService>>,
    payload: Option<Json<Value>>,
) -> Response {
    let payload = payload.map(|Json(v)| v);
    let Some(ips) = parse_ips(payload.as_ref()) else {
        return bad_bulk_body();
    };

    let results: Vec<BulkOpResponse> = service
        .block_many(&ips)
        .await
        .into_iter()
        .map(Into::into)
        .collect();

    Json(serde_json::json!({ "results": results })).into_response()
}

async fn bulk_remove_blacklist_handler(
    State(service): State<Arc<IpService>>,
    payload: Option<Json<Value>>,
) -> Response {
    let payload = payload.map(|Json(v)| v);
    let Some(ips) = parse_ips(payload.as_ref()) else {
        return bad_bulk_body();
    };

    let results: Vec<BulkOpResponse> = service
        .unblock_many(&ips)
        .await
        .into_iter()
        .map(Into::into)
        .collect();

    Json(serde_json::json!({ "results": results })).into_response()
}

/// HTTP API server.
pub struct ApiServer {
    listen_addr: String,
    service: Arc<IpService>,
}

impl ApiServer {
    pub fn new(listen_addr: String, service: Arc<IpService>) -> Self {
        Self {
            listen_addr,
            service,
        }
    }

    /// Build the router. Exposed separately so tests can drive it
    /// without binding a socket.
    pub fn router(service: Arc<IpService>) -> Router {
        Router::new()
            .route("/api/health", get(health_handler))
            .route("/api/ip/bulk", post(bulk_ip_handler))
            .route("/api/ip/:ip", get(get_ip_handler).delete(delete_ip_handler))
            .route("/api/blacklist", post(add_blacklist_handler))
            .route(
                "/api/blacklist/bulk",
                post(bulk_add_blacklist_handler).delete(bulk_remove_blacklist_handler),
            )
            .route("/api/blacklist/:ip", delete(remove_blacklist_handler))
            .layer(TraceLayer::new_for_http())
            .with_state(service)
    }

    /// Run the API server.
    pub async fn run(&self) -> anyhow::Result<()> {
        let app = Self::router(self.service.clone());

        let listener = TcpListener::bind(&self.listen_addr).await?;
        tracing::info!("API server listening on {}", self.listen_addr);

        axum::serve(listener, app).await?;
        Ok(())
    }
}
