//! Route packs discovered on disk and mounted into the host router.
//!
//! A pack is a directory holding a `pack.toml` manifest that names a
//! compiled-in `kind` and the contract it follows. The [`PackRegistry`]
//! turns a kind into a [`PackContract`]; the loader attaches it.

pub mod diagnostics;
pub mod fitdegree;
pub mod loader;
pub mod manifest;

pub use loader::{
    discover_packs, is_valid_pack_id, mount_packs, resolve_base_dirs, DiscoveredPack, MountReport,
};
pub use manifest::{ContractKind, PackManifest};

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use thiserror::Error;

use crate::config::Config;
use crate::fitdegree::FitDegreeService;

#[derive(Error, Debug)]
pub enum PackError {
    #[error("failed to read manifest {}: {source}", path.display())]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid manifest {}: {source}", path.display())]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: Box<toml::de::Error>,
    },

    #[error("unknown pack kind '{0}'")]
    UnknownKind(String),

    #[error("invalid pack id '{0}' (use letters, digits, '.', '_' or '-')")]
    InvalidId(String),

    #[error("pack declares contract '{declared}' but provides '{provided}'")]
    ContractMismatch {
        declared: ContractKind,
        provided: ContractKind,
    },

    #[error("pack factory failed: {0}")]
    Factory(String),
}

/// A pack that adds its own routes to the host router
pub trait RegisterPack: Send {
    fn register(self: Box<Self>, app: Router) -> Router;
}

/// What a pack factory hands back
pub enum PackContract {
    Register(Box<dyn RegisterPack>),
    Router(Router),
}

impl PackContract {
    pub fn kind(&self) -> ContractKind {
        match self {
            PackContract::Register(_) => ContractKind::Register,
            PackContract::Router(_) => ContractKind::Router,
        }
    }
}

/// Identity of a pack being built
#[derive(Debug, Clone)]
pub struct PackSpec {
    pub id: String,
    pub dir: PathBuf,
    pub manifest: PackManifest,
}

/// Host resources packs may use
#[derive(Clone)]
pub struct PackContext {
    pub config: Arc<Config>,
    pub service: Arc<FitDegreeService>,
}

pub type PackFactory =
    Box<dyn Fn(&PackSpec, &PackContext) -> Result<PackContract, PackError> + Send + Sync>;

/// Compiled-in pack factories keyed by manifest `kind`
#[derive(Default)]
pub struct PackRegistry {
    factories: BTreeMap<String, PackFactory>,
}

impl PackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the packs shipped in this crate
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(fitdegree::KIND, Box::new(fitdegree::factory));
        registry
    }

    pub fn register(&mut self, kind: &str, factory: PackFactory) {
        self.factories.insert(kind.to_string(), factory);
    }

    pub fn kinds(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    /// Build the contract for a pack
    pub fn build(&self, spec: &PackSpec, ctx: &PackContext) -> Result<PackContract, PackError> {
        let factory = self
            .factories
            .get(&spec.manifest.kind)
            .ok_or_else(|| PackError::UnknownKind(spec.manifest.kind.clone()))?;
        factory(spec, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_kinds() {
        assert_eq!(PackRegistry::with_builtin().kinds(), vec!["fitdegree"]);
    }

    #[test]
    fn test_contract_mismatch_message() {
        let err = PackError::ContractMismatch {
            declared: ContractKind::Register,
            provided: ContractKind::Router,
        };
        assert_eq!(
            err.to_string(),
            "pack declares contract 'register' but provides 'router'"
        );
    }
}
