// ABOUTME: Liveness and readiness probe endpoints
// ABOUTME: Minimal JSON responses for deployment health checks
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! Health check endpoints.

use crate::constants::service_names;
use crate::routes::ServerResources;
use axum::extract::State;
use axum::Json;
use std::sync::Arc;

/// Handle `GET /health`
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": service_names::SERVICE,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Handle `GET /ready`
///
/// The guard holds all state in memory, so readiness follows from the
/// resources existing at all; the handler still touches them so a wedged
/// lock would surface here.
pub async fn ready(State(resources): State<Arc<ServerResources>>) -> Json<serde_json::Value> {
    let tracked = resources.login_attempts.tracked_addresses().await;
    Json(serde_json::json!({
        "status": "ready",
        "tracked_addresses": tracked,
    }))
}
