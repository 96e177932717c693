//! Donation and receive requests: submission, persistence and review.
//!
//! Submissions are persisted to the remote store when one is configured,
//! otherwise to a local fallback log scoped to the running client.

pub mod local;
pub mod request;
pub mod store;

pub use local::{LOCAL_REQUESTS_KEY, LocalRequestLog};
pub use request::{DonationRequest, NewDonationRequest, RequestKind, RequestStatus};
pub use store::{REQUESTS_TABLE, RequestCounts, RequestError, RequestStore};
