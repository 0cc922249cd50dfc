use crate::config::ServerConfig;
use crate::error::ServerResult;
use keyfind::{Kdb, KeyfindConfig};
use search::KeySearch;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Key database handle (shared across requests)
    pub kdb: Arc<Kdb>,

    /// Search options applied to every request
    pub search: KeySearch,
}

impl ServerState {
    /// Create new server state, opening the key database described by
    /// `config.mounts_file` (or an empty one when no file is set).
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let keyfind = match &config.mounts_file {
            Some(path) => KeyfindConfig::from_file(path)?,
            None => KeyfindConfig::default(),
        };
        let kdb = keyfind.open_kdb()?;

        tracing::info!(
            mounts = kdb.mount_count(),
            size_limit = keyfind.search.size_limit,
            "Key database opened"
        );

        Ok(Self::with_kdb(config, kdb, keyfind.key_search()))
    }

    /// Build state around an already opened key database.
    pub fn with_kdb(config: ServerConfig, kdb: Kdb, search: KeySearch) -> Self {
        Self {
            config: Arc::new(config),
            kdb: Arc::new(kdb),
            search,
        }
    }

    /// Owned handle for work moved off the async runtime.
    pub fn handle(&self) -> Arc<Kdb> {
        Arc::clone(&self.kdb)
    }
}
