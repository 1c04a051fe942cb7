//! Pack manifest (`pack.toml`).
//!
//! ```toml
//! id = "fitdegree"       # optional, defaults to the directory name
//! kind = "fitdegree"     # selects a compiled-in factory
//! contract = "router"    # "register" | "router"
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::PackError;

pub const MANIFEST_FILE: &str = "pack.toml";

/// How a pack attaches to the host router
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractKind {
    /// The pack adds its own routes to the host router
    Register,
    /// The pack hands over a router, nested at `/api/gizmos/<id>`
    Router,
}

impl fmt::Display for ContractKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContractKind::Register => f.write_str("register"),
            ContractKind::Router => f.write_str("router"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackManifest {
    #[serde(default)]
    pub id: Option<String>,
    pub kind: String,
    pub contract: ContractKind,
}

impl PackManifest {
    pub fn load(path: &Path) -> Result<Self, PackError> {
        let raw = std::fs::read_to_string(path).map_err(|source| PackError::ManifestRead {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| PackError::ManifestParse {
            path: path.to_path_buf(),
            source: Box::new(source),
        })
    }

    /// Manifest id, or `dir_name` when absent or blank
    pub fn effective_id(&self, dir_name: &str) -> String {
        self.id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .unwrap_or(dir_name)
            .to_string()
    }
}

/// Entry manifest of a pack directory: `server/pack.toml`, then `pack.toml`
pub fn find_manifest(pack_dir: &Path) -> Option<PathBuf> {
    [
        pack_dir.join("server").join(MANIFEST_FILE),
        pack_dir.join(MANIFEST_FILE),
    ]
    .into_iter()
    .find(|p| p.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_server_manifest_preferred() {
        let temp_dir = TempDir::new().unwrap();
        let pack = temp_dir.path();
        std::fs::create_dir_all(pack.join("server")).unwrap();
        std::fs::write(pack.join(MANIFEST_FILE), "").unwrap();
        std::fs::write(pack.join("server").join(MANIFEST_FILE), "").unwrap();

        assert_eq!(
            find_manifest(pack),
            Some(pack.join("server").join(MANIFEST_FILE))
        );
    }

    #[test]
    fn test_no_manifest() {
        let temp_dir = TempDir::new().unwrap();
        assert!(find_manifest(temp_dir.path()).is_none());
    }

    #[test]
    fn test_parse_manifest() {
        let manifest: PackManifest =
            toml::from_str("kind = \"fitdegree\"\ncontract = \"router\"\n").unwrap();
        assert_eq!(manifest.contract, ContractKind::Router);
        assert_eq!(manifest.effective_id("fitdegree-dir"), "fitdegree-dir");

        let manifest: PackManifest =
            toml::from_str("id = \"fd\"\nkind = \"fitdegree\"\ncontract = \"register\"\n")
                .unwrap();
        assert_eq!(manifest.effective_id("x"), "fd");
        assert_eq!(manifest.contract.to_string(), "register");
    }

    #[test]
    fn test_invalid_contract_is_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(MANIFEST_FILE);
        std::fs::write(&path, "kind = \"x\"\ncontract = \"default\"\n").unwrap();

        let err = PackManifest::load(&path).unwrap_err();
        assert!(matches!(err, PackError::ManifestParse { .. }));
    }
}
