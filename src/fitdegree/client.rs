//! FitDegree API client with endpoint fallback.
//!
//! A request for a path walks its variants (see [`endpoint_variants`]) until
//! the body no longer carries the vendor "endpoint not found" status
//! (`auth_status.code == 19`). A resource request walks its candidate paths
//! the same way, accepting the first payload whose auth status is absent or 0.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use super::candidates::{endpoint_variants, CandidateSet, Resource};
use super::error::{FetchError, TransportError};
use super::transport::{ReqwestTransport, Transport};
use crate::config::Config;

/// Vendor status code for an unknown route
pub const ENDPOINT_NOT_FOUND_CODE: i64 = 19;

const TRIED_LIMIT_RESOLVED: usize = 25;
const TRIED_LIMIT_EXHAUSTED: usize = 50;

pub const EXHAUSTED_NOTE: &str =
    "All endpoint variants returned auth_status.code=19 (Endpoint not found).";

/// Query parameters in request order; empty values are not sent
pub type QueryParams = Vec<(String, String)>;

/// One completed request
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub url: String,
    pub status: u16,
    pub ok: bool,
    /// Parsed JSON, the raw text as a JSON string, or null for an empty body
    pub body: Value,
}

/// How a request path was resolved, attached to payloads as `_debug`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolutionTrace {
    pub requested: String,
    pub resolved: String,
    pub url: String,
    pub status: u16,
    pub tried: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Payload returned by [`FitDegreeClient::fetch_json`]
#[derive(Debug, Clone)]
pub struct ResolvedPayload {
    /// Always a JSON object
    pub payload: Value,
    pub trace: ResolutionTrace,
}

impl ResolvedPayload {
    /// True when every variant answered with the not-found status
    pub fn exhausted(&self) -> bool {
        self.trace.note.is_some()
    }

    /// The payload with the trace attached under `_debug`
    pub fn into_annotated(self) -> Value {
        let mut payload = self.payload;
        if let Value::Object(map) = &mut payload {
            let trace = serde_json::to_value(&self.trace).unwrap_or(Value::Null);
            map.insert("_debug".to_string(), trace);
        }
        payload
    }
}

/// Payload accepted for a logical resource
#[derive(Debug, Clone)]
pub struct ResourcePayload {
    /// Candidate path that produced the payload
    pub endpoint: String,
    /// Annotated payload (includes `_debug`)
    pub payload: Value,
}

/// Vendor `auth_status` block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthStatus {
    pub code: Option<i64>,
    pub msg: Option<String>,
}

impl AuthStatus {
    /// Read `auth_status` from the payload root or from `data.auth_status`
    pub fn from_payload(payload: &Value) -> Option<Self> {
        let block = payload
            .get("auth_status")
            .filter(|v| v.is_object())
            .or_else(|| {
                payload
                    .get("data")
                    .and_then(|d| d.get("auth_status"))
                    .filter(|v| v.is_object())
            })?;

        let code = block.get("code").and_then(numeric_code);
        let msg = block
            .get("msg")
            .or_else(|| block.get("message"))
            .and_then(Value::as_str)
            .map(ToString::to_string);

        Some(Self { code, msg })
    }

    pub fn to_json(&self) -> Value {
        json!({ "code": self.code, "msg": self.msg })
    }
}

/// Status codes arrive as numbers or numeric strings
fn numeric_code(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// True when the body is an object whose `auth_status.code` is 19
pub fn looks_like_endpoint_not_found(body: &Value) -> bool {
    body.get("auth_status")
        .and_then(|s| s.get("code"))
        .and_then(numeric_code)
        == Some(ENDPOINT_NOT_FOUND_CODE)
}

/// Pull the record list out of the common response shapes
pub fn extract_list(payload: &Value) -> Vec<Value> {
    let candidates = [
        payload.get("response"),
        payload.get("data").and_then(|d| d.get("response")),
        payload.get("items"),
        payload.get("data").and_then(|d| d.get("items")),
        Some(payload),
    ];

    candidates
        .into_iter()
        .flatten()
        .find_map(|v| v.as_array().cloned())
        .unwrap_or_default()
}

fn parse_body(text: &str) -> Value {
    if text.is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

fn wrap_data(body: Value) -> Value {
    json!({ "ok": true, "data": body })
}

/// HTTP client for the FitDegree API
#[derive(Clone)]
pub struct FitDegreeClient {
    transport: Arc<dyn Transport>,
    base_url: String,
    auth: Option<(String, String)>,
    candidates: CandidateSet,
}

impl FitDegreeClient {
    pub fn new(transport: Arc<dyn Transport>, base_url: &str) -> Self {
        Self {
            transport,
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            auth: None,
            candidates: CandidateSet::default(),
        }
    }

    /// Client configured from the `fitdegree` section, using reqwest
    pub fn from_config(config: &Config) -> Result<Self, TransportError> {
        let timeout = Duration::from_secs(config.fitdegree.request_timeout_secs);
        let transport = ReqwestTransport::new(timeout)?;
        Ok(Self::from_config_with_transport(config, Arc::new(transport)))
    }

    pub fn from_config_with_transport(config: &Config, transport: Arc<dyn Transport>) -> Self {
        let fd = &config.fitdegree;
        Self::new(transport, config.api_base())
            .with_auth(&fd.auth_header, &fd.auth_scheme, &fd.api_key)
            .with_candidates(CandidateSet::from_overrides(&fd.endpoints))
    }

    /// Send `<header>: <scheme> <key>` (bare key when the scheme is empty).
    /// An empty key sends no auth header.
    pub fn with_auth(mut self, header: &str, scheme: &str, key: &str) -> Self {
        let (header, scheme, key) = (header.trim(), scheme.trim(), key.trim());
        self.auth = if key.is_empty() || header.is_empty() {
            None
        } else if scheme.is_empty() {
            Some((header.to_string(), key.to_string()))
        } else {
            Some((header.to_string(), format!("{} {}", scheme, key)))
        };
        self
    }

    pub fn with_candidates(mut self, candidates: CandidateSet) -> Self {
        self.candidates = candidates;
        self
    }

    pub fn candidates(&self) -> &CandidateSet {
        &self.candidates
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn headers(&self) -> Vec<(String, String)> {
        let mut headers = vec![("Content-Type".to_string(), "application/json".to_string())];
        if let Some((name, value)) = &self.auth {
            headers.push((name.clone(), value.clone()));
        }
        headers
    }

    fn build_url(&self, path: &str, query: &[(String, String)]) -> Result<String, TransportError> {
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{}", path)
        };
        let raw = format!("{}{}", self.base_url, path);
        let mut url = reqwest::Url::parse(&raw)
            .map_err(|e| TransportError::InvalidUrl(raw.clone(), e.to_string()))?;

        let params: Vec<&(String, String)> = query.iter().filter(|(_, v)| !v.is_empty()).collect();
        if !params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in params {
                pairs.append_pair(key, value);
            }
        }

        Ok(url.to_string())
    }

    async fn fetch_once(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<FetchResult, TransportError> {
        let url = self.build_url(path, query)?;
        let response = self.transport.get(&url, &self.headers()).await?;
        Ok(FetchResult {
            ok: response.is_success(),
            status: response.status,
            body: parse_body(&response.body),
            url,
        })
    }

    /// Fetch `path`, falling back through its variants while the API
    /// answers "endpoint not found".
    ///
    /// The first body without that status is returned regardless of HTTP
    /// status. If every variant answers "not found", the last body is
    /// returned wrapped as `{ ok: true, data }` with a note in the trace. If
    /// no variant produced a body at all, the last transport error is
    /// returned.
    pub async fn fetch_json(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<ResolvedPayload, FetchError> {
        let variants = endpoint_variants(path);
        if variants.is_empty() {
            return Err(FetchError::NoVariants(path.to_string()));
        }

        let mut tried: Vec<String> = Vec::new();
        let mut last_body: Option<(String, FetchResult)> = None;
        let mut last_error: Option<FetchError> = None;

        for variant in &variants {
            tried.push(variant.clone());

            let result = match self.fetch_once(variant, query).await {
                Ok(result) => result,
                Err(e) => {
                    warn!(endpoint = %variant, error = %e, "FitDegree request failed");
                    last_error = Some(FetchError::Transport {
                        url: format!("{}{}", self.base_url, variant),
                        source: e,
                    });
                    continue;
                }
            };

            if looks_like_endpoint_not_found(&result.body) {
                debug!(endpoint = %variant, "endpoint not found, trying next variant");
                last_body = Some((variant.clone(), result));
                continue;
            }

            debug!(requested = %path, resolved = %variant, status = result.status, "endpoint resolved");
            let payload = if result.body.is_object() {
                result.body
            } else {
                wrap_data(result.body)
            };
            return Ok(ResolvedPayload {
                payload,
                trace: ResolutionTrace {
                    requested: path.to_string(),
                    resolved: variant.clone(),
                    url: result.url,
                    status: result.status,
                    tried: tried.into_iter().take(TRIED_LIMIT_RESOLVED).collect(),
                    note: None,
                },
            });
        }

        match (last_body, last_error) {
            (Some((variant, result)), _) => {
                warn!(requested = %path, tried = tried.len(), "{}", EXHAUSTED_NOTE);
                Ok(ResolvedPayload {
                    payload: wrap_data(result.body),
                    trace: ResolutionTrace {
                        requested: path.to_string(),
                        resolved: variant,
                        url: result.url,
                        status: result.status,
                        tried: tried.into_iter().take(TRIED_LIMIT_EXHAUSTED).collect(),
                        note: Some(EXHAUSTED_NOTE.to_string()),
                    },
                })
            }
            (None, Some(error)) => Err(error),
            (None, None) => Err(FetchError::NoVariants(path.to_string())),
        }
    }

    /// Fetch a logical resource, trying each candidate path in order.
    ///
    /// A payload is accepted when it has no auth status or its code is 0.
    pub async fn fetch_resource(
        &self,
        resource: Resource,
        query: &[(String, String)],
    ) -> Result<ResourcePayload, FetchError> {
        let mut last_payload: Option<Value> = None;
        let mut last_error: Option<FetchError> = None;

        for endpoint in self.candidates.for_resource(resource) {
            let resolved = match self.fetch_json(endpoint, query).await {
                Ok(resolved) => resolved.into_annotated(),
                Err(e) => {
                    warn!(%resource, %endpoint, error = %e, "endpoint error");
                    last_error = Some(e);
                    continue;
                }
            };

            match AuthStatus::from_payload(&resolved).and_then(|s| s.code) {
                None => {
                    info!(%resource, %endpoint, "endpoint ok (no auth_status)");
                    return Ok(ResourcePayload {
                        endpoint: endpoint.clone(),
                        payload: resolved,
                    });
                }
                Some(0) => {
                    info!(%resource, %endpoint, "endpoint ok");
                    return Ok(ResourcePayload {
                        endpoint: endpoint.clone(),
                        payload: resolved,
                    });
                }
                Some(code) => {
                    warn!(%resource, %endpoint, code, "endpoint rejected");
                    last_payload = Some(resolved);
                }
            }
        }

        let status = last_payload.as_ref().and_then(AuthStatus::from_payload);
        let detail = match (status, last_payload) {
            (Some(status), Some(payload)) => json!({
                "auth_status": status.to_json(),
                "lastPayload": payload,
            }),
            _ => json!({
                "error": last_error
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| "Unknown error".to_string()),
            }),
        };

        Err(FetchError::NoCandidateSucceeded {
            resource: resource.to_string(),
            detail,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EndpointOverrides;
    use crate::fitdegree::transport::MockTransport;

    fn client(mock: &MockTransport) -> FitDegreeClient {
        FitDegreeClient::new(Arc::new(mock.clone()), "https://api.test/")
    }

    #[test]
    fn test_looks_like_endpoint_not_found() {
        assert!(looks_like_endpoint_not_found(
            &json!({"auth_status": {"code": 19}})
        ));
        assert!(looks_like_endpoint_not_found(
            &json!({"auth_status": {"code": "19"}})
        ));
        assert!(!looks_like_endpoint_not_found(
            &json!({"auth_status": {"code": 0}})
        ));
        assert!(!looks_like_endpoint_not_found(&json!("19")));
        assert!(!looks_like_endpoint_not_found(&Value::Null));
    }

    #[test]
    fn test_parse_body() {
        assert_eq!(parse_body(""), Value::Null);
        assert_eq!(parse_body("{\"a\":1}"), json!({"a": 1}));
        assert_eq!(parse_body("<html>"), json!("<html>"));
    }

    #[test]
    fn test_extract_list_shapes() {
        assert_eq!(extract_list(&json!({"response": [1]})), vec![json!(1)]);
        assert_eq!(
            extract_list(&json!({"data": {"response": [2]}})),
            vec![json!(2)]
        );
        assert_eq!(extract_list(&json!({"items": [3]})), vec![json!(3)]);
        assert_eq!(
            extract_list(&json!({"data": {"items": [4]}})),
            vec![json!(4)]
        );
        assert_eq!(extract_list(&json!([5])), vec![json!(5)]);
        assert!(extract_list(&json!({"response": {"data": {}}})).is_empty());
    }

    #[test]
    fn test_auth_status_locations() {
        let root = AuthStatus::from_payload(&json!({"auth_status": {"code": 0, "msg": "ok"}}));
        assert_eq!(
            root,
            Some(AuthStatus {
                code: Some(0),
                msg: Some("ok".to_string())
            })
        );

        let nested = AuthStatus::from_payload(&json!({"data": {"auth_status": {"code": 19}}}));
        assert_eq!(nested.and_then(|s| s.code), Some(19));

        assert!(AuthStatus::from_payload(&json!({"response": []})).is_none());
    }

    #[tokio::test]
    async fn test_first_variant_success_sends_auth_and_query() {
        let mock = MockTransport::new().respond("/group-class/", 200, r#"{"response":[]}"#);
        let client = client(&mock).with_auth("Authorization", "Bearer", "k3y");

        let query = vec![
            ("page".to_string(), "1".to_string()),
            ("skip".to_string(), String::new()),
        ];
        let resolved = client.fetch_json("/group-class/", &query).await.unwrap();

        assert_eq!(resolved.trace.resolved, "/group-class/");
        assert_eq!(resolved.trace.tried, vec!["/group-class/"]);
        assert_eq!(resolved.trace.url, "https://api.test/group-class/?page=1");

        let requests = mock.requests.lock().unwrap();
        let headers = &requests[0].headers;
        assert!(headers.contains(&("Authorization".to_string(), "Bearer k3y".to_string())));
        assert!(headers.contains(&("Content-Type".to_string(), "application/json".to_string())));
    }

    #[tokio::test]
    async fn test_bare_key_and_no_key() {
        let mock = MockTransport::new().respond("/x", 200, "{}");
        let bare = client(&mock).with_auth("X-Api-Key", "", "abc");
        bare.fetch_json("/x", &[]).await.unwrap();
        let none = client(&mock).with_auth("Authorization", "Bearer", "  ");
        none.fetch_json("/x", &[]).await.unwrap();

        let requests = mock.requests.lock().unwrap();
        assert!(requests[0]
            .headers
            .contains(&("X-Api-Key".to_string(), "abc".to_string())));
        assert_eq!(requests[1].headers.len(), 1);
    }

    #[tokio::test]
    async fn test_later_variant_resolves() {
        let variants = endpoint_variants("/api/v1/TEAM_MEMBERS");
        let target = variants[3].clone();
        let mock = MockTransport::new().respond(&target, 200, r#"{"auth_status":{"code":0}}"#);

        let resolved = client(&mock)
            .fetch_json("/api/v1/TEAM_MEMBERS", &[])
            .await
            .unwrap();

        assert_eq!(resolved.trace.resolved, target);
        assert_eq!(resolved.trace.tried, variants[..4].to_vec());
        assert_eq!(mock.request_count(), 4);
    }

    #[tokio::test]
    async fn test_non_object_body_is_wrapped() {
        let mock = MockTransport::new().respond("/list", 500, "[1,2]");
        let resolved = client(&mock).fetch_json("/list", &[]).await.unwrap();

        assert_eq!(resolved.payload, json!({"ok": true, "data": [1, 2]}));
        assert_eq!(resolved.trace.status, 500);
    }

    #[tokio::test]
    async fn test_all_variants_not_found_returns_last_payload() {
        let mock = MockTransport::new();
        let resolved = client(&mock).fetch_json("/nope", &[]).await.unwrap();

        assert!(resolved.exhausted());
        assert_eq!(resolved.payload["ok"], json!(true));
        assert_eq!(resolved.payload["data"]["auth_status"]["code"], json!(19));
        assert_eq!(resolved.trace.note.as_deref(), Some(EXHAUSTED_NOTE));

        let variants = endpoint_variants("/nope");
        assert_eq!(resolved.trace.resolved, *variants.last().unwrap());
        // No extra request after exhaustion
        assert_eq!(mock.request_count(), variants.len());
    }

    #[tokio::test]
    async fn test_tried_is_capped() {
        let mock = MockTransport::new();
        let resolved = client(&mock)
            .fetch_json("/api/v1/TEAM_MEMBERS", &[])
            .await
            .unwrap();
        assert!(resolved.trace.tried.len() <= 50);

        let variants = endpoint_variants("/api/v1/TEAM_MEMBERS");
        let last = variants.last().unwrap().clone();
        let mock = MockTransport::new().respond(&last, 200, "{}");
        let resolved = client(&mock)
            .fetch_json("/api/v1/TEAM_MEMBERS", &[])
            .await
            .unwrap();
        assert_eq!(resolved.trace.tried.len(), variants.len().min(25));
    }

    #[tokio::test]
    async fn test_transport_failure_skips_variant() {
        let variants = endpoint_variants("/api/v1/TEAM_MEMBERS");
        let mock = MockTransport::new()
            .fail(&variants[0], "reset")
            .respond(&variants[1], 200, r#"{"response":[]}"#);

        let resolved = client(&mock)
            .fetch_json("/api/v1/TEAM_MEMBERS", &[])
            .await
            .unwrap();
        assert_eq!(resolved.trace.resolved, variants[1]);
    }

    #[tokio::test]
    async fn test_all_transport_failures_propagate() {
        let mock = MockTransport::new().fail_by_default("offline");
        let err = client(&mock).fetch_json("/x", &[]).await.unwrap_err();
        assert!(matches!(err, FetchError::Transport { .. }));
    }

    #[tokio::test]
    async fn test_annotated_payload_has_debug() {
        let mock = MockTransport::new().respond("/x", 200, r#"{"a":1}"#);
        let annotated = client(&mock)
            .fetch_json("/x", &[])
            .await
            .unwrap()
            .into_annotated();
        assert_eq!(annotated["a"], json!(1));
        assert_eq!(annotated["_debug"]["resolved"], json!("/x"));
        assert!(annotated["_debug"].get("note").is_none());
    }

    #[tokio::test]
    async fn test_fetch_resource_uses_next_candidate() {
        let overrides = EndpointOverrides {
            classes: Some("/missing, /classes".to_string()),
            ..Default::default()
        };
        let mock = MockTransport::new().respond(
            "/classes",
            200,
            r#"{"auth_status":{"code":0},"response":[{"id":7}]}"#,
        );
        let client = client(&mock).with_candidates(CandidateSet::from_overrides(&overrides));

        let found = client.fetch_resource(Resource::Classes, &[]).await.unwrap();
        assert_eq!(found.endpoint, "/classes");
        assert_eq!(extract_list(&found.payload), vec![json!({"id": 7})]);
    }

    #[tokio::test]
    async fn test_fetch_resource_rejects_nonzero_code() {
        let overrides = EndpointOverrides {
            services: Some("/svc".to_string()),
            ..Default::default()
        };
        let mock = MockTransport::new().respond(
            "/svc",
            200,
            r#"{"auth_status":{"code":4,"msg":"Not authorized"}}"#,
        );
        let client = client(&mock).with_candidates(CandidateSet::from_overrides(&overrides));

        let err = client
            .fetch_resource(Resource::Services, &[])
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "No FitDegree endpoint candidates succeeded for services."
        );
        assert_eq!(err.detail()["auth_status"]["code"], json!(4));
        assert_eq!(err.detail()["auth_status"]["msg"], json!("Not authorized"));
    }

    #[tokio::test]
    async fn test_fetch_resource_reports_last_error() {
        let mock = MockTransport::new().fail_by_default("offline");
        let err = client(&mock)
            .fetch_resource(Resource::Schedule, &[])
            .await
            .unwrap_err();
        let detail = err.detail();
        assert!(detail["error"].as_str().unwrap().contains("offline"));
    }
}
