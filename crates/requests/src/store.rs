use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use serde_json::Value as JsonValue;
use thiserror::Error;

use bloodbank_core::{Backend, Filter, LocalStore, Order, StoreError};

use crate::local::LocalRequestLog;
use crate::request::{DonationRequest, NewDonationRequest, RequestKind, RequestStatus};

/// Remote table holding submitted requests.
pub const REQUESTS_TABLE: &str = "donation_requests";

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("request store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),

    /// The local fallback collection exists but cannot be parsed.
    #[error("local request log is corrupt: {0}")]
    Corrupt(String),
}

impl RequestError {
    /// Map a failure of the local fallback log; only there is a decode
    /// failure a corrupt log.
    fn from_local(err: StoreError) -> Self {
        match err {
            StoreError::Decode(msg) => RequestError::Corrupt(msg),
            other => RequestError::StoreUnavailable(other),
        }
    }
}

/// Per-kind tallies over a set of requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RequestCounts {
    pub total: usize,
    pub donate: usize,
    pub receive: usize,
}

impl RequestCounts {
    pub fn from_requests(requests: &[DonationRequest]) -> Self {
        requests.iter().fold(Self::default(), |mut c, r| {
            c.total += 1;
            match r.request_type {
                RequestKind::Donate => c.donate += 1,
                RequestKind::Receive => c.receive += 1,
            }
            c
        })
    }
}

/// Donation/receive submissions.
///
/// Writes go to the remote store when one is configured and to the local
/// fallback log otherwise.
#[derive(Debug, Clone)]
pub struct RequestStore {
    backend: Backend,
    local: Option<LocalRequestLog>,
}

impl RequestStore {
    /// A store with no local fallback (e.g. a server-side context).
    pub fn new(backend: Backend) -> Self {
        Self {
            backend,
            local: None,
        }
    }

    pub fn with_local(mut self, store: Arc<dyn LocalStore>) -> Self {
        self.local = Some(LocalRequestLog::new(store));
        self
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    /// Persist a new submission.
    ///
    /// Status is always `pending` and the creation time is assigned at
    /// persistence: by the remote store's column default, or now for the
    /// local log.
    pub async fn submit(&self, input: NewDonationRequest) -> Result<DonationRequest, RequestError> {
        let remote = match &self.backend {
            Backend::Configured(remote) => remote,
            Backend::Unconfigured => {
                let log = self.local.as_ref().ok_or(StoreError::NotConfigured)?;
                let request = log
                    .append(input, Utc::now())
                    .map_err(RequestError::from_local)?;
                tracing::info!(
                    id = %request.id,
                    kind = %request.request_type,
                    blood_type = %request.blood_type,
                    "request stored in local fallback log"
                );
                return Ok(request);
            }
        };

        let mut row = match serde_json::to_value(&input) {
            Ok(JsonValue::Object(row)) => row,
            Ok(other) => {
                return Err(StoreError::backend(format!("submission is not an object: {other}")).into());
            }
            Err(e) => return Err(StoreError::backend(format!("submission serialization failed: {e}")).into()),
        };
        row.insert("status".into(), JsonValue::from(RequestStatus::Pending.as_str()));

        let inserted = remote.insert(REQUESTS_TABLE, vec![row]).await?;
        let row = inserted
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::backend("insert returned no rows"))?;

        let request = DonationRequest::from_row(row)?;
        tracing::info!(
            id = %request.id,
            kind = %request.request_type,
            blood_type = %request.blood_type,
            "request stored"
        );
        Ok(request)
    }

    /// Every request in the local fallback log, in insertion order.
    ///
    /// Never touches the remote store. Empty without a local store.
    pub fn list_local(&self) -> Result<Vec<DonationRequest>, RequestError> {
        match &self.local {
            Some(log) => log.load().map_err(RequestError::from_local),
            None => Ok(Vec::new()),
        }
    }

    /// Local requests of one kind (all kinds for `None`).
    pub fn list_local_by_kind(
        &self,
        kind: Option<RequestKind>,
    ) -> Result<Vec<DonationRequest>, RequestError> {
        let mut requests = self.list_local()?;
        if let Some(kind) = kind {
            requests.retain(|r| r.request_type == kind);
        }
        Ok(requests)
    }

    /// Tallies over the local fallback log.
    pub fn local_counts(&self) -> Result<RequestCounts, RequestError> {
        Ok(RequestCounts::from_requests(&self.list_local()?))
    }

    /// Remote requests, most recent first, optionally of one kind.
    pub async fn list_remote(
        &self,
        kind: Option<RequestKind>,
    ) -> Result<Vec<DonationRequest>, RequestError> {
        let remote = self.backend.remote()?;
        let filter = kind.map(|k| Filter::eq("request_type", k.as_str()));

        let rows = remote
            .select(REQUESTS_TABLE, filter.as_ref(), Some(&Order::desc("created_at")))
            .await?;

        rows.into_iter()
            .map(|row| DonationRequest::from_row(row).map_err(RequestError::StoreUnavailable))
            .collect()
    }

    /// Delete the whole local fallback log. Irreversible.
    pub fn clear_local(&self) -> Result<(), RequestError> {
        if let Some(log) = &self.local {
            log.clear().map_err(RequestError::from_local)?;
            tracing::warn!("local request log cleared");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use bloodbank_core::{
        BloodType, InMemoryLocalStore, InMemoryRemoteStore, RemoteStore, RequestId, TableSpec,
    };
    use chrono::NaiveDate;

    use super::*;

    fn input(name: &str, kind: RequestKind) -> NewDonationRequest {
        NewDonationRequest {
            name: name.into(),
            email: format!("{name}@example.com"),
            phone: "555-0100".into(),
            blood_type: BloodType::BPositive,
            address: "2 Elm St".into(),
            preferred_date: NaiveDate::from_ymd_opt(2026, 12, 5).unwrap(),
            request_type: kind,
        }
    }

    fn remote() -> Arc<InMemoryRemoteStore> {
        Arc::new(InMemoryRemoteStore::new().with_table(
            REQUESTS_TABLE,
            TableSpec::new().identity("id").default_now("created_at"),
        ))
    }

    fn local_only() -> RequestStore {
        RequestStore::new(Backend::Unconfigured).with_local(Arc::new(InMemoryLocalStore::new()))
    }

    #[tokio::test]
    async fn unconfigured_submit_goes_to_local_log() {
        let store = local_only();
        let before = Utc::now();
        let r = store.submit(input("ada", RequestKind::Donate)).await.unwrap();
        let after = Utc::now();

        assert_eq!(r.id, RequestId::new(1));
        assert_eq!(r.status, RequestStatus::Pending);
        assert!(r.created_at >= before && r.created_at <= after);
        assert_eq!(store.list_local().unwrap(), vec![r]);
    }

    #[tokio::test]
    async fn unconfigured_submit_without_local_store_fails() {
        let store = RequestStore::new(Backend::Unconfigured);
        let err = store.submit(input("ada", RequestKind::Donate)).await.unwrap_err();
        assert!(matches!(err, RequestError::StoreUnavailable(StoreError::NotConfigured)));
        assert!(store.list_local().unwrap().is_empty());
    }

    #[tokio::test]
    async fn configured_submit_uses_store_identity_and_timestamp() {
        let r = remote();
        let store = RequestStore::new(Backend::Configured(r.clone()))
            .with_local(Arc::new(InMemoryLocalStore::new()));

        let before = Utc::now();
        let first = store.submit(input("ada", RequestKind::Donate)).await.unwrap();
        let second = store.submit(input("bo", RequestKind::Receive)).await.unwrap();

        assert_eq!(first.id, RequestId::new(1));
        assert_eq!(second.id, RequestId::new(2));
        assert_eq!(first.status, RequestStatus::Pending);
        assert!(first.created_at >= before - chrono::Duration::milliseconds(1));
        assert_eq!(r.row_count(REQUESTS_TABLE), 2);
        assert!(store.list_local().unwrap().is_empty());
    }

    #[tokio::test]
    async fn configured_submit_failure_propagates() {
        let r = remote();
        r.set_offline(true);
        let store = RequestStore::new(Backend::Configured(r));
        let err = store.submit(input("ada", RequestKind::Donate)).await.unwrap_err();
        assert!(matches!(err, RequestError::StoreUnavailable(StoreError::Backend(_))));
    }

    #[tokio::test]
    async fn list_remote_requires_configuration() {
        let err = local_only().list_remote(None).await.unwrap_err();
        assert!(matches!(err, RequestError::StoreUnavailable(StoreError::NotConfigured)));
    }

    #[tokio::test]
    async fn local_filters_and_counts() {
        let store = local_only();
        store.submit(input("a", RequestKind::Donate)).await.unwrap();
        store.submit(input("b", RequestKind::Receive)).await.unwrap();
        store.submit(input("c", RequestKind::Donate)).await.unwrap();

        let donors = store.list_local_by_kind(Some(RequestKind::Donate)).unwrap();
        assert_eq!(donors.iter().map(|r| r.name.as_str()).collect::<Vec<_>>(), vec!["a", "c"]);
        assert_eq!(store.list_local_by_kind(None).unwrap().len(), 3);
        assert_eq!(
            store.local_counts().unwrap(),
            RequestCounts {
                total: 3,
                donate: 2,
                receive: 1
            }
        );
    }

    #[tokio::test]
    async fn clear_local_without_local_store_is_noop() {
        let store = RequestStore::new(Backend::Unconfigured);
        assert!(store.clear_local().is_ok());
    }

    #[test]
    fn corrupt_local_log_surfaces() {
        let local = Arc::new(InMemoryLocalStore::new());
        local.set(crate::local::LOCAL_REQUESTS_KEY, "[{").unwrap();
        let store = RequestStore::new(Backend::Unconfigured).with_local(local);
        assert!(matches!(store.list_local(), Err(RequestError::Corrupt(_))));
    }

    #[tokio::test]
    async fn malformed_remote_row_is_a_store_failure_not_local_corruption() {
        let r = remote();
        let mut row = bloodbank_core::Row::new();
        row.insert("name".into(), "x".into());
        row.insert("request_type".into(), "donate".into());
        r.insert(REQUESTS_TABLE, vec![row]).await.unwrap();

        let store = RequestStore::new(Backend::Configured(r));
        let err = store.list_remote(None).await.unwrap_err();
        assert!(
            matches!(err, RequestError::StoreUnavailable(StoreError::Decode(_))),
            "{err:?}"
        );
        assert!(!err.to_string().contains("local"));
    }
}
