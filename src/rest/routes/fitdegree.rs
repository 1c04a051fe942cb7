//! Public FitDegree routes served by the `fitdegree` pack.
//!
//! Mounted under `/api/gizmos/<id>`; each list route proxies one upstream
//! resource through the shared [`FitDegreeService`].

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};

use crate::fitdegree::{extract_list, FitDegreeService, Resource, ResourcePayload};
use crate::rest::dto::{ListResponse, PingResponse};
use crate::rest::error::ApiError;

#[derive(Clone)]
pub struct FitDegreePackState {
    /// Mounted pack id
    pub id: String,
    pub service: Arc<FitDegreeService>,
    /// Upcoming classes served by `featured-classes`
    pub featured_limit: usize,
}

pub fn router(state: FitDegreePackState) -> Router {
    Router::new()
        .route("/public/__ping", get(ping))
        .route("/public/instructors", get(instructors))
        .route("/public/classes", get(classes))
        .route("/public/featured-classes", get(featured_classes))
        .with_state(state)
}

fn list_response(fetched: ResourcePayload, limit: Option<usize>) -> ListResponse {
    let mut response = extract_list(&fetched.payload);
    if let Some(limit) = limit {
        response.truncate(limit);
    }
    ListResponse {
        ok: true,
        endpoint_used: fetched.endpoint,
        response,
    }
}

pub async fn ping(State(state): State<FitDegreePackState>) -> Json<PingResponse> {
    Json(PingResponse {
        ok: true,
        pack: state.id,
        ts: chrono::Utc::now().timestamp_millis(),
    })
}

pub async fn instructors(
    State(state): State<FitDegreePackState>,
) -> Result<Json<ListResponse>, ApiError> {
    let fetched = state
        .service
        .instructors()
        .await
        .map_err(|e| ApiError::from_fetch(Resource::Instructors, e))?;
    Ok(Json(list_response(fetched, None)))
}

pub async fn classes(
    State(state): State<FitDegreePackState>,
) -> Result<Json<ListResponse>, ApiError> {
    let fetched = state
        .service
        .upcoming_classes()
        .await
        .map_err(|e| ApiError::from_fetch(Resource::Classes, e))?;
    Ok(Json(list_response(fetched, None)))
}

pub async fn featured_classes(
    State(state): State<FitDegreePackState>,
) -> Result<Json<ListResponse>, ApiError> {
    let fetched = state
        .service
        .upcoming_classes()
        .await
        .map_err(|e| ApiError::from_fetch(Resource::Classes, e))?;
    Ok(Json(list_response(fetched, Some(state.featured_limit))))
}
