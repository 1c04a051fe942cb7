//! Host HTTP server.
//!
//! Serves `/api/health` and every pack mounted from the configured pack
//! directories. Packs that fail to load are reported and left out; the
//! server starts regardless.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use state::HostState;

use crate::config::Config;
use crate::fitdegree::FitDegreeService;
use crate::packs::{mount_packs, resolve_base_dirs, MountReport, PackContext, PackRegistry};

/// Build the host router: packs first, then the health route and layers
pub fn build_app(
    config: Arc<Config>,
    service: Arc<FitDegreeService>,
    registry: &PackRegistry,
    base_dirs: &[PathBuf],
) -> (Router, MountReport) {
    let ctx = PackContext { config, service };
    let (app, report) = mount_packs(Router::new(), base_dirs, registry, &ctx);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let health = Router::new()
        .route("/api/health", get(routes::health::health))
        .with_state(HostState::new(report.mounted_ids()));

    let app = app
        .merge(health)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    (app, report)
}

/// Start the host server on `port`
pub async fn serve(config: Config, port: u16) -> Result<()> {
    let cwd = std::env::current_dir().context("Failed to read working directory")?;
    let base_dirs = resolve_base_dirs(&cwd, &config.pack_dirs());
    let service =
        Arc::new(FitDegreeService::from_config(&config).context("Failed to create HTTP client")?);
    let registry = PackRegistry::with_builtin();

    let (app, report) = build_app(Arc::new(config), service, &registry, &base_dirs);
    tracing::info!(
        mounted = report.mounted.len(),
        skipped = report.skipped.len(),
        failed = report.failed.len(),
        "packs loaded"
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}
