//! Host health endpoint.

use axum::{extract::State, Json};

use crate::rest::dto::HealthResponse;
use crate::rest::state::HostState;

/// Health check endpoint
pub async fn health(State(state): State<HostState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        packs: state.packs.as_ref().clone(),
    })
}
