//! Persistence capability boundary.
//!
//! Components are written against two abstract stores:
//!
//! - [`RemoteStore`]: a relational/document store reached through
//!   `select` / `insert` / `update` on JSON rows.
//! - [`LocalStore`]: a key/value string store scoped to the running client,
//!   used as a fallback when no remote store is configured.
//!
//! Concrete backends live in `bloodbank-infra`; the in-memory versions here
//! are for tests/dev.

pub mod local;
pub mod memory;
pub mod remote;

use thiserror::Error;

pub use local::LocalStore;
pub use memory::{InMemoryLocalStore, InMemoryRemoteStore, TableSpec};
pub use remote::{Filter, Order, RemoteStore, Row};

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Store operation error.
///
/// These are infrastructure errors. Callers treat every variant as the
/// store being unavailable for the current action.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No remote store is configured (or no local store is attached).
    #[error("store not configured")]
    NotConfigured,

    /// The underlying query/insert/update failed.
    #[error("store backend failure: {0}")]
    Backend(String),

    /// A row or stored document could not be decoded.
    #[error("failed to decode stored data: {0}")]
    Decode(String),

    /// A table, column or key name was rejected before reaching the backend.
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),
}

impl StoreError {
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }
}

/// Accept only plain lowercase SQL identifiers (`[a-z_][a-z0-9_]*`).
///
/// Table and column names end up spliced into SQL text, so anything else is
/// refused up front.
pub fn validate_identifier(name: &str) -> StoreResult<&str> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(c) if c == '_' || c.is_ascii_lowercase() => {
            chars.all(|c| c == '_' || c.is_ascii_lowercase() || c.is_ascii_digit())
        }
        _ => false,
    };
    if valid {
        Ok(name)
    } else {
        Err(StoreError::InvalidIdentifier(name.to_string()))
    }
}
