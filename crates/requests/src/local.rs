//! Local fallback log of requests, kept as one JSON array under a single key.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use bloodbank_core::{LocalStore, RequestId, StoreError};

use crate::request::{DonationRequest, NewDonationRequest};

/// Key the whole collection is stored under.
pub const LOCAL_REQUESTS_KEY: &str = "donation_requests";

/// Append-only request log over a [`LocalStore`].
///
/// Every append is a read-modify-write of the whole array: concurrent
/// writers in the same client get last-write-wins.
#[derive(Clone)]
pub struct LocalRequestLog {
    store: Arc<dyn LocalStore>,
}

impl LocalRequestLog {
    pub fn new(store: Arc<dyn LocalStore>) -> Self {
        Self { store }
    }

    /// All requests in insertion order (empty when nothing was stored yet).
    pub fn load(&self) -> Result<Vec<DonationRequest>, StoreError> {
        match self.store.get(LOCAL_REQUESTS_KEY)? {
            None => Ok(Vec::new()),
            Some(raw) => serde_json::from_str(&raw)
                .map_err(|e| StoreError::decode(format!("{LOCAL_REQUESTS_KEY}: {e}"))),
        }
    }

    /// Persist `input` as a new pending request.
    ///
    /// Identity is one past the highest identity in the log, so it stays
    /// unique however fast submissions arrive.
    pub fn append(
        &self,
        input: NewDonationRequest,
        created_at: DateTime<Utc>,
    ) -> Result<DonationRequest, StoreError> {
        let mut existing = self.load()?;
        let id = existing
            .iter()
            .map(|r| r.id)
            .max()
            .map(RequestId::next)
            .unwrap_or(RequestId::new(1));

        let request = DonationRequest::pending(id, input, created_at);
        existing.push(request.clone());

        let raw = serde_json::to_string(&existing)
            .map_err(|e| StoreError::decode(format!("{LOCAL_REQUESTS_KEY}: {e}")))?;
        self.store.set(LOCAL_REQUESTS_KEY, &raw)?;

        Ok(request)
    }

    /// Delete the whole collection.
    pub fn clear(&self) -> Result<(), StoreError> {
        self.store.remove(LOCAL_REQUESTS_KEY)
    }
}

impl core::fmt::Debug for LocalRequestLog {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LocalRequestLog")
            .field("key", &LOCAL_REQUESTS_KEY)
            .finish()
    }
}
