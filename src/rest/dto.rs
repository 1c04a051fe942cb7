//! Data Transfer Objects for the REST API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Response for the host health check
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Mounted pack ids
    pub packs: Vec<String>,
}

/// Liveness answer of a mounted pack
#[derive(Debug, Serialize, Deserialize)]
pub struct PingResponse {
    pub ok: bool,
    pub pack: String,
    /// Unix milliseconds
    pub ts: i64,
}

/// Upstream list with the candidate path that produced it
#[derive(Debug, Serialize, Deserialize)]
pub struct ListResponse {
    pub ok: bool,
    pub endpoint_used: String,
    pub response: Vec<Value>,
}
