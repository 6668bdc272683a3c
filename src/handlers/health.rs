//! Health check handler

use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Public health check response
#[derive(Debug, Serialize)]
pub struct HealthCheckResponse {
    /// Always "OK"
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// GET /health
///
/// Does not require authentication and does not touch the store.
///
/// # Example
/// ```bash
/// curl http://localhost:5000/health
/// # Returns: {"status":"OK","message":"Server is healthy","timestamp":"..."}
/// ```
pub async fn health_check() -> Json<HealthCheckResponse> {
    tracing::debug!("Health check requested");
    Json(HealthCheckResponse {
        status: "OK".to_string(),
        message: "Server is healthy".to_string(),
        timestamp: Utc::now(),
    })
}
