//! FitDegree API access: endpoint resolution, normalization and caching.

pub mod candidates;
pub mod client;
pub mod error;
pub mod records;
pub mod service;
pub mod transport;

pub use candidates::{endpoint_variants, resolve_candidates, CandidateSet, Resource};
pub use client::{
    extract_list, looks_like_endpoint_not_found, AuthStatus, FitDegreeClient, QueryParams,
    ResolutionTrace, ResolvedPayload, ResourcePayload,
};
pub use error::{FetchError, TransportError};
pub use service::FitDegreeService;
pub use transport::{HttpResponse, MockTransport, ReqwestTransport, Transport};
