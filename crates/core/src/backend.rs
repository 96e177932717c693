//! Remote store availability, resolved once at startup.

use std::sync::Arc;

use crate::store::{RemoteStore, StoreError, StoreResult};

/// Whether a remote store is configured.
///
/// Built once from configuration and handed to every component, so no call
/// site has to re-check configuration on its own.
#[derive(Clone)]
pub enum Backend {
    Configured(Arc<dyn RemoteStore>),
    Unconfigured,
}

impl Backend {
    pub fn configured(store: impl RemoteStore + 'static) -> Self {
        Self::Configured(Arc::new(store))
    }

    pub fn is_configured(&self) -> bool {
        matches!(self, Backend::Configured(_))
    }

    /// The remote store, or `StoreError::NotConfigured`.
    pub fn remote(&self) -> StoreResult<&dyn RemoteStore> {
        match self {
            Backend::Configured(store) => Ok(store.as_ref()),
            Backend::Unconfigured => Err(StoreError::NotConfigured),
        }
    }
}

impl core::fmt::Debug for Backend {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Backend::Configured(_) => f.write_str("Backend::Configured"),
            Backend::Unconfigured => f.write_str("Backend::Unconfigured"),
        }
    }
}
