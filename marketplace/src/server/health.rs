//! Health check endpoints for the marketplace.
//!
//! Provides endpoints for monitoring service health and readiness.

use super::state::AppState;
use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
};
use serde::Serialize;

/// Banner response for `/`.
#[derive(Serialize)]
pub struct RootResponse {
    /// Human-readable banner
    pub message: String,
}

/// Root banner.
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "ChainGo marketplace API is running".to_string(),
    })
}

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
}

/// Health check endpoint.
///
/// Returns 200 OK if the service is running.
/// This is a simple liveness check - it doesn't verify dependencies.
///
/// # Example
///
/// ```bash
/// curl http://localhost:8080/health
/// # {"status":"ok","version":"0.1.0"}
/// ```
pub async fn health_check() -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

/// Readiness check response.
#[derive(Serialize)]
pub struct DbCheckResponse {
    /// `ok` or `error`
    pub status: String,
    /// Human-readable detail
    pub message: String,
}

/// Readiness check endpoint.
///
/// Pings the listing store; 503 when it does not answer.
///
/// # Example
///
/// ```bash
/// curl http://localhost:8080/db-check
/// # {"status":"ok","message":"Database connection successful"}
/// ```
pub async fn db_check(State(state): State<AppState>) -> (StatusCode, Json<DbCheckResponse>) {
    match state.readiness.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(DbCheckResponse {
                status: "ok".to_string(),
                message: "Database connection successful".to_string(),
            }),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(DbCheckResponse {
                    status: "error".to_string(),
                    message: "Database connection failed".to_string(),
                }),
            )
        }
    }
}

/// Prometheus exposition.
pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
