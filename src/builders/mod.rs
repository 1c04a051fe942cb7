//! Static content builders.
//!
//! Each builder fetches one kind of FitDegree data, renders it, and splices
//! the HTML into placeholder tokens of a page in the publish directory. A
//! page whose placeholder is gone has already been built; building it again
//! fails without touching the file.

mod classes_services;
mod instructors;
pub mod placeholder;
mod schedule;
mod teacher_training;

pub use classes_services::ClassesServicesBuilder;
pub use instructors::InstructorsBuilder;
pub use placeholder::{splice_file, splice_placeholders};
pub use schedule::ScheduleBuilder;
pub use teacher_training::TeacherTrainingBuilder;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;
use thiserror::Error;
use tracing::info;

use crate::config::Config;
use crate::fitdegree::records::Collection;
use crate::fitdegree::{
    AuthStatus, FetchError, FitDegreeClient, FitDegreeService, ReqwestTransport, Transport,
    TransportError,
};
use crate::render::{RenderError, SiteRenderer};

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Placeholder {token} not found in {}. Add the token where the content belongs (restore it if a built page was committed).", path.display())]
    PlaceholderNotFound { token: String, path: PathBuf },

    #[error("Could not read {}: {source}", path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not write {}: {source}", path.display())]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{target}: API response not success ({message})")]
    Envelope {
        target: &'static str,
        message: String,
    },

    #[error("schedule window of {days_ahead} days is out of range")]
    Window { days_ahead: u32 },

    #[error("{target}: fetch from {url} failed: {message}")]
    Source {
        target: &'static str,
        url: String,
        message: String,
    },

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Outcome of one builder run
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub target: &'static str,
    /// Page the fragments were spliced into
    pub page: PathBuf,
    /// Records rendered
    pub rendered: usize,
    /// Records fetched before filtering
    pub fetched: usize,
    /// Additional files written (instructor detail pages)
    pub extra_files: Vec<PathBuf>,
}

/// Shared state for a build: configuration, API access and renderer.
///
/// Owns the response cache, so pages built in the same run share fetches.
pub struct BuildContext {
    pub config: Config,
    pub service: FitDegreeService,
    pub renderer: SiteRenderer,
    pub publish_dir: PathBuf,
    /// Start of the schedule window
    pub today: NaiveDate,
    transport: Arc<dyn Transport>,
}

impl BuildContext {
    pub fn from_config(config: Config) -> Result<Self, BuildError> {
        let timeout = Duration::from_secs(config.fitdegree.request_timeout_secs);
        let publish_dir = config.publish_path();
        let today = chrono::Local::now().date_naive();
        let transport = ReqwestTransport::new(timeout)?;
        Self::new(config, Arc::new(transport), publish_dir, today)
    }

    pub fn new(
        config: Config,
        transport: Arc<dyn Transport>,
        publish_dir: PathBuf,
        today: NaiveDate,
    ) -> Result<Self, BuildError> {
        let client = FitDegreeClient::from_config_with_transport(&config, transport.clone());
        let service = FitDegreeService::with_client(&config, client);
        let renderer = SiteRenderer::new(&config.site)?;
        Ok(Self {
            config,
            service,
            renderer,
            publish_dir,
            today,
            transport,
        })
    }

    pub fn page_path(&self, file: &str) -> PathBuf {
        self.publish_dir.join(file)
    }

    /// GET a JSON document outside the FitDegree API
    pub async fn fetch_external(&self, target: &'static str, url: &str) -> Result<Value, BuildError> {
        let source_error = |message: String| BuildError::Source {
            target,
            url: url.to_string(),
            message,
        };

        let response = self
            .transport
            .get(url, &[])
            .await
            .map_err(|e| source_error(e.to_string()))?;
        if !response.is_success() {
            return Err(source_error(format!("HTTP {}", response.status)));
        }
        serde_json::from_str(&response.body).map_err(|e| source_error(format!("invalid JSON: {}", e)))
    }
}

#[async_trait]
pub trait Builder: Send + Sync {
    /// Target name used on the command line
    fn name(&self) -> &'static str;

    async fn build(&self, ctx: &BuildContext) -> Result<BuildReport, BuildError>;
}

/// Pages that can be built
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildTarget {
    Instructors,
    Schedule,
    ClassesServices,
    TeacherTraining,
}

impl BuildTarget {
    /// Every target, in the order `all` runs them
    pub fn all() -> &'static [BuildTarget] {
        &[
            BuildTarget::Instructors,
            BuildTarget::Schedule,
            BuildTarget::ClassesServices,
            BuildTarget::TeacherTraining,
        ]
    }

    pub fn builder(&self) -> Box<dyn Builder> {
        match self {
            BuildTarget::Instructors => Box::new(InstructorsBuilder),
            BuildTarget::Schedule => Box::new(ScheduleBuilder),
            BuildTarget::ClassesServices => Box::new(ClassesServicesBuilder),
            BuildTarget::TeacherTraining => Box::new(TeacherTrainingBuilder),
        }
    }
}

/// Run builders in order, stopping at the first failure
pub async fn run_targets(
    ctx: &BuildContext,
    targets: &[BuildTarget],
) -> Result<Vec<BuildReport>, BuildError> {
    let mut reports = Vec::with_capacity(targets.len());
    for target in targets {
        let builder = target.builder();
        info!(builder = builder.name(), "build starting");
        let report = builder.build(ctx).await?;
        info!(
            builder = report.target,
            page = %report.page.display(),
            rendered = report.rendered,
            fetched = report.fetched,
            "build finished"
        );
        reports.push(report);
    }
    Ok(reports)
}

/// Check that a payload reports success.
///
/// The resolution trace (`_debug`) must show a 2xx status and must not carry
/// the exhausted note. After that, accepted: `response.success == true`,
/// `ok == true` wrapping a JSON document, `auth_status.code == 0`, or no auth
/// status at all with a list present.
pub fn check_envelope(target: &'static str, payload: &Value) -> Result<(), BuildError> {
    if let Some(status) = payload.pointer("/_debug/status").and_then(Value::as_u64) {
        if !(200..300).contains(&status) {
            return Err(BuildError::Envelope {
                target,
                message: format!("HTTP {}", status),
            });
        }
    }
    if let Some(note) = payload.pointer("/_debug/note").and_then(Value::as_str) {
        return Err(BuildError::Envelope {
            target,
            message: note.to_string(),
        });
    }

    // Text or empty bodies arrive wrapped as `{ ok: true, data: <string|null> }`
    let wrapped_document = !matches!(payload.get("data"), Some(Value::String(_) | Value::Null));
    if payload.pointer("/response/success") == Some(&Value::Bool(true))
        || (payload.get("ok") == Some(&Value::Bool(true)) && wrapped_document)
    {
        return Ok(());
    }

    match AuthStatus::from_payload(payload) {
        Some(status) if status.code == Some(0) => Ok(()),
        None if Collection::locate(payload).is_some() => Ok(()),
        status => {
            let message = payload
                .get("error")
                .and_then(Value::as_str)
                .map(ToString::to_string)
                .or_else(|| status.and_then(|s| s.msg))
                .unwrap_or_else(|| "Unknown error".to_string());
            Err(BuildError::Envelope { target, message })
        }
    }
}
