//! Blood inventory: per-type unit levels and their severity classification.
//!
//! Status is derived from the unit count only (`InventoryStatus::classify`);
//! every read and write path goes through it.

pub mod query;
pub mod record;
pub mod status;
pub mod store;

pub use query::{InventoryQuery, InventorySummary};
pub use record::{InventoryRecord, seed_inventory};
pub use status::InventoryStatus;
pub use store::{INVENTORY_TABLE, InventoryError, InventoryStore};
