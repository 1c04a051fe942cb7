//! Pack discovery and mounting.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use axum::Router;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::{info, warn};

use super::diagnostics::{scan_pack, Finding};
use super::manifest::{find_manifest, ContractKind, PackManifest};
use super::{PackContext, PackContract, PackError, PackRegistry, PackSpec};

/// Conventional pack locations, relative to the working directory
const CONVENTIONAL_DIRS: &[&str] = &["src/gizmos", "gizmos", "api/src/gizmos", "api/gizmos"];

/// Packs nest under this prefix when they hand over a router
pub const MOUNT_PREFIX: &str = "/api/gizmos";

/// Directories searched for packs.
///
/// Configured directories replace the conventional ones. Relative entries
/// resolve against `cwd`. Order is kept and duplicates dropped.
pub fn resolve_base_dirs(cwd: &Path, configured: &[PathBuf]) -> Vec<PathBuf> {
    let candidates: Vec<PathBuf> = if configured.is_empty() {
        CONVENTIONAL_DIRS.iter().map(|d| cwd.join(d)).collect()
    } else {
        configured
            .iter()
            .map(|d| if d.is_absolute() { d.clone() } else { cwd.join(d) })
            .collect()
    };

    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|d| seen.insert(d.clone()))
        .collect()
}

/// A pack directory found on disk
#[derive(Debug, Clone, Serialize)]
pub struct DiscoveredPack {
    /// Directory name
    pub id: String,
    pub dir: PathBuf,
    pub manifest_path: Option<PathBuf>,
}

/// Immediate subdirectories of each existing base directory, sorted by name
/// within each base.
pub fn discover_packs(base_dirs: &[PathBuf]) -> Vec<DiscoveredPack> {
    let mut found = Vec::new();
    for base in base_dirs.iter().filter(|d| d.is_dir()) {
        let Ok(entries) = std::fs::read_dir(base) else {
            warn!(base = %base.display(), "could not read pack directory");
            continue;
        };
        let mut dirs: Vec<PathBuf> = entries
            .flatten()
            .map(|e| e.path())
            .filter(|p| p.is_dir())
            .collect();
        dirs.sort();

        for dir in dirs {
            let Some(id) = dir.file_name().map(|n| n.to_string_lossy().to_string()) else {
                continue;
            };
            found.push(DiscoveredPack {
                id,
                manifest_path: find_manifest(&dir),
                dir,
            });
        }
    }
    found
}

#[derive(Debug, Clone, Serialize)]
pub struct MountedPack {
    pub id: String,
    pub kind: String,
    pub contract: ContractKind,
    pub dir: PathBuf,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedPack {
    pub id: String,
    pub dir: PathBuf,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FailedPack {
    pub id: String,
    pub dir: PathBuf,
    pub error: String,
    pub findings: Vec<Finding>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MountReport {
    pub base_dirs: Vec<PathBuf>,
    pub mounted: Vec<MountedPack>,
    pub skipped: Vec<SkippedPack>,
    pub failed: Vec<FailedPack>,
}

impl MountReport {
    pub fn mounted_ids(&self) -> Vec<String> {
        self.mounted.iter().map(|p| p.id.clone()).collect()
    }

    fn skip(&mut self, pack: &DiscoveredPack, reason: String) {
        info!(pack = %pack.id, dir = %pack.dir.display(), "{}", reason);
        self.skipped.push(SkippedPack {
            id: pack.id.clone(),
            dir: pack.dir.clone(),
            reason,
        });
    }

    fn fail(&mut self, pack: &DiscoveredPack, error: PackError) {
        warn!(pack = %pack.id, dir = %pack.dir.display(), error = %error, "pack failed to load");
        let findings = scan_pack(&pack.dir);
        for finding in &findings {
            warn!(
                pack = %pack.id,
                file = %finding.path.display(),
                line = finding.line,
                kind = ?finding.kind,
                text = %finding.text,
                "suspicious line in pack source"
            );
        }
        self.failed.push(FailedPack {
            id: pack.id.clone(),
            dir: pack.dir.clone(),
            error: error.to_string(),
            findings,
        });
    }
}

static PACK_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$").expect("valid regex"));

/// True when `id` can be mounted as a single path segment
pub fn is_valid_pack_id(id: &str) -> bool {
    PACK_ID.is_match(id)
}

/// Discover packs under `base_dirs` and attach each to `app`.
///
/// The first base directory to provide an id wins. A pack that fails to
/// load is reported with diagnostics; the rest keep mounting.
pub fn mount_packs(
    mut app: Router,
    base_dirs: &[PathBuf],
    registry: &PackRegistry,
    ctx: &PackContext,
) -> (Router, MountReport) {
    let mut report = MountReport {
        base_dirs: base_dirs.to_vec(),
        ..Default::default()
    };
    let mut mounted: HashSet<String> = HashSet::new();

    for pack in discover_packs(base_dirs) {
        if mounted.contains(&pack.id) {
            report.skip(&pack, format!("pack '{}' already mounted", pack.id));
            continue;
        }

        let Some(manifest_path) = pack.manifest_path.as_deref() else {
            report.skip(&pack, "no pack.toml found".to_string());
            continue;
        };

        let manifest = match PackManifest::load(manifest_path) {
            Ok(manifest) => manifest,
            Err(e) => {
                report.fail(&pack, e);
                continue;
            }
        };

        let id = manifest.effective_id(&pack.id);
        if !is_valid_pack_id(&id) {
            report.fail(&pack, PackError::InvalidId(id));
            continue;
        }
        if mounted.contains(&id) {
            report.skip(&pack, format!("pack '{}' already mounted", id));
            continue;
        }

        let spec = PackSpec {
            id: id.clone(),
            dir: pack.dir.clone(),
            manifest,
        };

        let contract = match registry.build(&spec, ctx) {
            Ok(contract) => contract,
            Err(e) => {
                report.fail(&pack, e);
                continue;
            }
        };

        let declared = spec.manifest.contract;
        if contract.kind() != declared {
            let mismatch = PackError::ContractMismatch {
                declared,
                provided: contract.kind(),
            };
            warn!(pack = %id, "{}", mismatch);
            report.skip(&pack, mismatch.to_string());
            continue;
        }

        app = match contract {
            PackContract::Register(pack_impl) => pack_impl.register(app),
            PackContract::Router(router) => app.nest(&format!("{}/{}", MOUNT_PREFIX, id), router),
        };

        info!(pack = %id, kind = %spec.manifest.kind, contract = %declared, "mounted pack");
        mounted.insert(id.clone());
        report.mounted.push(MountedPack {
            id,
            kind: spec.manifest.kind,
            contract: declared,
            dir: pack.dir,
        });
    }

    if report.mounted.is_empty() {
        info!("no packs mounted");
    }

    (app, report)
}
