//! Build the stores from configuration, once, at startup.

use std::sync::Arc;

use anyhow::Context;

use bloodbank_core::{Backend, LocalStore};
use bloodbank_inventory::InventoryStore;
use bloodbank_requests::RequestStore;

use crate::config::StoreConfig;
use crate::file_store::FileLocalStore;
use crate::postgres::PostgresRemoteStore;

/// The two components, sharing one resolved backend.
#[derive(Debug, Clone)]
pub struct Stores {
    pub inventory: InventoryStore,
    pub requests: RequestStore,
    /// Present only when a remote store is configured (schema management).
    pub postgres: Option<PostgresRemoteStore>,
}

impl Stores {
    pub fn from_config(config: &StoreConfig) -> anyhow::Result<Self> {
        let (backend, postgres) = match &config.remote {
            Some(remote) => {
                let store = PostgresRemoteStore::connect_lazy(remote)
                    .with_context(|| format!("failed to set up remote store ({remote:?})"))?;
                tracing::info!(max_connections = remote.max_connections, "remote store configured");
                (Backend::configured(store.clone()), Some(store))
            }
            None => {
                tracing::info!("no remote store configured; using local fallback");
                (Backend::Unconfigured, None)
            }
        };

        let local: Arc<dyn LocalStore> = Arc::new(
            FileLocalStore::open(&config.local_dir)
                .with_context(|| format!("failed to open local store at {:?}", config.local_dir))?,
        );

        Ok(Self {
            inventory: InventoryStore::new(backend.clone()),
            requests: RequestStore::new(backend).with_local(local),
            postgres,
        })
    }
}
