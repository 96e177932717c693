//! `bloodbank-core`: domain types and storage capabilities shared by every crate.
//!
//! Blood-type codes, the shared error model, and the two persistence
//! capabilities (remote store, local fallback store) every component is
//! written against.

pub mod backend;
pub mod blood_type;
pub mod error;
pub mod id;
pub mod store;

pub use backend::Backend;
pub use blood_type::BloodType;
pub use error::DomainError;
pub use id::RequestId;
pub use store::{
    Filter, InMemoryLocalStore, InMemoryRemoteStore, LocalStore, Order, RemoteStore, Row,
    StoreError, StoreResult, TableSpec,
};
