//! Cached access to the FitDegree resources the site uses.
//!
//! Each method builds the vendor query for its resource, serves a live
//! cache entry when there is one, and otherwise resolves through
//! [`FitDegreeClient::fetch_resource`].

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;
use tokio::sync::Mutex;
use tracing::debug;

use super::candidates::Resource;
use super::client::{FitDegreeClient, QueryParams, ResourcePayload};
use super::error::{FetchError, TransportError};
use crate::cache::{cache_key, Clock, SystemClock, TtlCache};
use crate::config::{CacheConfig, Config, FitDegreeConfig};

const SCHEDULE_OBJECT_TYPES: &str = r#"["1","2","22","4"]"#;
/// Page size for group-class and service listings
pub const PAGE_SIZE: u32 = 200;

/// Account identifiers and client markers sent with every query
#[derive(Debug, Clone)]
pub struct QueryDefaults {
    pub fitspot_id: String,
    pub company_id: String,
    pub client_name: String,
    pub client_version: String,
    pub identifier: String,
}

impl QueryDefaults {
    pub fn from_config(config: &FitDegreeConfig) -> Self {
        Self {
            fitspot_id: config.fitspot_id.trim().to_string(),
            company_id: config.company_id.trim().to_string(),
            client_name: config.client_name.clone(),
            client_version: config.client_version.clone(),
            identifier: config.identifier.clone(),
        }
    }

    /// Fitspot/company filters plus client markers
    fn scoped(&self) -> QueryParams {
        vec![
            pair("fitspot_id", &self.fitspot_id),
            pair("fitspot_id__EQ", &self.fitspot_id),
            pair("company_id", &self.company_id),
            pair("company_id__EQ", &self.company_id),
            pair("__fd_client", &self.client_name),
            pair("__fd_client_version", &self.client_version),
            pair("__identifier", &self.identifier),
        ]
    }
}

fn pair(key: &str, value: impl ToString) -> (String, String) {
    (key.to_string(), value.to_string())
}

/// Resource TTLs
#[derive(Debug, Clone, Copy)]
pub struct CacheTtls {
    pub classes: Duration,
    pub instructors: Duration,
    pub services: Duration,
}

impl CacheTtls {
    pub fn from_config(config: &CacheConfig) -> Self {
        Self {
            classes: Duration::from_secs(config.classes_ttl_secs),
            instructors: Duration::from_secs(config.instructors_ttl_secs),
            services: Duration::from_secs(config.services_ttl_secs),
        }
    }

    fn for_resource(&self, resource: Resource) -> Duration {
        match resource {
            Resource::Classes | Resource::Schedule => self.classes,
            Resource::Instructors => self.instructors,
            Resource::GroupClasses | Resource::Services => self.services,
        }
    }
}

/// FitDegree client plus a response cache
pub struct FitDegreeService {
    client: FitDegreeClient,
    defaults: QueryDefaults,
    ttls: CacheTtls,
    cache: Mutex<TtlCache<ResourcePayload>>,
}

impl FitDegreeService {
    pub fn new(
        client: FitDegreeClient,
        defaults: QueryDefaults,
        ttls: CacheTtls,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            client,
            defaults,
            ttls,
            cache: Mutex::new(TtlCache::new(clock)),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, TransportError> {
        Ok(Self::with_client(config, FitDegreeClient::from_config(config)?))
    }

    /// Service over an already-built client, using the system clock
    pub fn with_client(config: &Config, client: FitDegreeClient) -> Self {
        Self::new(
            client,
            QueryDefaults::from_config(&config.fitdegree),
            CacheTtls::from_config(&config.cache),
            Arc::new(SystemClock),
        )
    }

    pub fn client(&self) -> &FitDegreeClient {
        &self.client
    }

    async fn cached(
        &self,
        resource: Resource,
        query: QueryParams,
    ) -> Result<ResourcePayload, FetchError> {
        let key = cache_key(resource.as_str(), &query);

        if let Some(hit) = self.cache.lock().await.get(&key) {
            debug!(%resource, "cache hit");
            return Ok(hit);
        }

        let fetched = self.client.fetch_resource(resource, &query).await?;

        self.cache
            .lock()
            .await
            .insert(key, fetched.clone(), self.ttls.for_resource(resource));
        Ok(fetched)
    }

    /// Team members for the configured fitspot
    pub async fn instructors(&self) -> Result<ResourcePayload, FetchError> {
        let query = vec![pair("fitspot_id", &self.defaults.fitspot_id)];
        self.cached(Resource::Instructors, query).await
    }

    /// Upcoming class occurrences for the configured fitspot
    pub async fn upcoming_classes(&self) -> Result<ResourcePayload, FetchError> {
        let query = vec![pair("fitspot_id", &self.defaults.fitspot_id)];
        self.cached(Resource::Classes, query).await
    }

    /// Non-deleted group classes ordered by title
    pub async fn group_classes(&self, limit: u32) -> Result<ResourcePayload, FetchError> {
        let mut query = vec![
            pair("is_deleted", 0),
            pair("title__ORDER", "ASC"),
            pair("page", 1),
            pair("limit", limit),
        ];
        query.extend(self.defaults.scoped());
        self.cached(Resource::GroupClasses, query).await
    }

    /// Non-deleted one-on-one services ordered by name
    pub async fn services(&self) -> Result<ResourcePayload, FetchError> {
        let mut query = vec![
            pair("is_deleted", 0),
            pair("name__ORDER", "ASC"),
            pair("page", 1),
            pair("limit", PAGE_SIZE),
        ];
        query.extend(self.defaults.scoped());
        self.cached(Resource::Services, query).await
    }

    /// Published, uncancelled schedule items between `start` and `end`
    pub async fn schedule(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<ResourcePayload, FetchError> {
        let mut query = vec![
            pair("object_type__IN", SCHEDULE_OBJECT_TYPES),
            pair("show_past", "false"),
            pair("published_status__IN", "[1]"),
            pair("show_no_instructor", "true"),
            pair("is_cancelled__IN", "[0]"),
            pair("start_datetime", start.format("%Y-%m-%d %H:%M:%S")),
            pair("end_datetime", end.format("%Y-%m-%d %H:%M:%S")),
        ];
        query.extend(self.defaults.scoped());
        self.cached(Resource::Schedule, query).await
    }
}
