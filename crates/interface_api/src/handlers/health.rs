//! Health check handlers

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use core_kernel::{AdapterHealth, HealthCheckable};

use crate::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Readiness check (includes the bill store)
pub async fn readiness_check(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, StatusCode> {
    let health = state.service.store().health_check().await;

    match health.status {
        AdapterHealth::Healthy | AdapterHealth::Degraded => Ok(Json(HealthResponse {
            status: "ready".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        })),
        AdapterHealth::Unhealthy | AdapterHealth::Unknown => {
            tracing::warn!(adapter = %health.adapter_id, message = ?health.message, "Store not ready");
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}
