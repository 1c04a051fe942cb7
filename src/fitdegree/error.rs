//! Error types for FitDegree requests

use serde_json::Value;
use thiserror::Error;

/// A single HTTP exchange failed before a body could be read
#[derive(Error, Debug, Clone)]
pub enum TransportError {
    #[error("invalid URL '{0}': {1}")]
    InvalidUrl(String, String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("failed to build HTTP client: {0}")]
    ClientBuild(String),
}

/// Endpoint resolution failed
#[derive(Error, Debug, Clone)]
pub enum FetchError {
    /// Every path variant failed at the transport level
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: TransportError,
    },

    /// The endpoint path produced no variants to try
    #[error("no endpoint variants for '{0}'")]
    NoVariants(String),

    /// Every candidate endpoint for a resource was rejected or errored
    #[error("No FitDegree endpoint candidates succeeded for {resource}.")]
    NoCandidateSucceeded { resource: String, detail: Value },
}

impl FetchError {
    /// Structured detail for error envelopes
    pub fn detail(&self) -> Value {
        match self {
            FetchError::NoCandidateSucceeded { detail, .. } => detail.clone(),
            other => serde_json::json!({ "error": other.to_string() }),
        }
    }
}
