//! Infrastructure layer: configuration, Postgres remote store, file-backed
//! local store, and startup wiring.

pub mod config;
pub mod file_store;
pub mod postgres;
pub mod wiring;

pub use config::{ConfigError, RemoteConfig, StoreConfig};
pub use file_store::FileLocalStore;
pub use postgres::{PostgresRemoteStore, SCHEMA_SQL};
pub use wiring::Stores;
