//! Host state shared by the built-in routes.

use std::sync::Arc;

/// Shared state for the host routes
#[derive(Clone, Default)]
pub struct HostState {
    /// Ids of the packs mounted at startup, in mount order
    pub packs: Arc<Vec<String>>,
}

impl HostState {
    pub fn new(packs: Vec<String>) -> Self {
        Self {
            packs: Arc::new(packs),
        }
    }
}
