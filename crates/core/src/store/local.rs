use std::sync::Arc;

use super::StoreResult;

/// Client-scoped persisted string store (the local fallback).
///
/// Values survive restarts of the same client but are never shared between
/// installations. There is no locking across read-modify-write sequences:
/// concurrent writers to the same key get last-write-wins.
pub trait LocalStore: Send + Sync {
    fn get(&self, key: &str) -> StoreResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;
    /// Remove `key`. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> StoreResult<()>;
}

impl<S> LocalStore for Arc<S>
where
    S: LocalStore + ?Sized,
{
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        (**self).remove(key)
    }
}
