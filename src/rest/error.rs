//! API error types and responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::fitdegree::{FetchError, Resource};

/// API error types
#[derive(Debug)]
pub enum ApiError {
    /// The upstream API gave nothing usable
    Upstream {
        error: String,
        detail: Value,
        hint: Option<String>,
    },
    /// Internal server error
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub ok: bool,
    pub error: String,
    #[serde(default)]
    pub detail: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ApiError {
    /// Map a failed resource fetch, pointing at the variable that overrides
    /// the resource's endpoint list.
    pub fn from_fetch(resource: Resource, err: FetchError) -> Self {
        match err {
            FetchError::NoVariants(path) => {
                ApiError::Internal(format!("no endpoint variants for '{}'", path))
            }
            other => ApiError::Upstream {
                detail: other.detail(),
                error: other.to_string(),
                hint: Some(format!(
                    "Set {} to the correct endpoint path(s), comma-separated, if needed.",
                    resource.override_env_var()
                )),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Upstream {
                error,
                detail,
                hint,
            } => (
                StatusCode::BAD_GATEWAY,
                ErrorResponse {
                    ok: false,
                    error,
                    detail,
                    hint,
                },
            ),
            ApiError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse {
                    ok: false,
                    error: "Server error".to_string(),
                    detail: Value::String(msg),
                    hint: None,
                },
            ),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use serde_json::json;

    #[tokio::test]
    async fn test_upstream_response() {
        let error = ApiError::from_fetch(
            Resource::Instructors,
            FetchError::NoCandidateSucceeded {
                resource: "instructors".to_string(),
                detail: json!({"auth_status": {"code": 4, "msg": "Not authorized"}}),
            },
        );
        let response = error.into_response();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert!(!json.ok);
        assert_eq!(
            json.error,
            "No FitDegree endpoint candidates succeeded for instructors."
        );
        assert_eq!(json.detail["auth_status"]["code"], 4);
        assert!(json
            .hint
            .unwrap()
            .starts_with("Set FITDEGREE_ENDPOINT_TEAM_MEMBERS to"));
    }

    #[tokio::test]
    async fn test_no_variants_is_internal() {
        let error = ApiError::from_fetch(Resource::Classes, FetchError::NoVariants(String::new()));
        let response = error.into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(json.error, "Server error");
        assert!(json.hint.is_none());
    }
}
