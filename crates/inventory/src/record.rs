use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bloodbank_core::{BloodType, Row, StoreError};

use crate::status::InventoryStatus;

/// Current unit level for one blood type.
///
/// `status` is always `InventoryStatus::classify(units)`: there is no way to
/// construct or decode a record where the two disagree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventoryRecord {
    id: i64,
    blood_type: BloodType,
    units: u32,
    status: InventoryStatus,
    updated_at: DateTime<Utc>,
}

/// Raw `blood_inventory` row as stored.
#[derive(Debug, Deserialize)]
struct InventoryRow {
    id: i64,
    blood_type: BloodType,
    units: u32,
    #[serde(default)]
    status: Option<InventoryStatus>,
    updated_at: DateTime<Utc>,
}

impl InventoryRecord {
    pub fn new(id: i64, blood_type: BloodType, units: u32, updated_at: DateTime<Utc>) -> Self {
        Self {
            id,
            blood_type,
            units,
            status: InventoryStatus::classify(units),
            updated_at,
        }
    }

    /// Decode a `blood_inventory` row, re-deriving status from units.
    pub fn from_row(row: Row) -> Result<Self, StoreError> {
        let raw: InventoryRow = serde_json::from_value(serde_json::Value::Object(row))
            .map_err(|e| StoreError::decode(format!("blood_inventory row: {e}")))?;

        let record = Self::new(raw.id, raw.blood_type, raw.units, raw.updated_at);
        if let Some(stored) = raw.status {
            if stored != record.status {
                tracing::warn!(
                    blood_type = %record.blood_type,
                    units = record.units,
                    stored = %stored,
                    derived = %record.status,
                    "stored inventory status disagrees with unit count; using derived status"
                );
            }
        }
        Ok(record)
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn blood_type(&self) -> BloodType {
        self.blood_type
    }

    pub fn units(&self) -> u32 {
        self.units
    }

    pub fn status(&self) -> InventoryStatus {
        self.status
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

/// Built-in inventory shown when no remote store is configured.
///
/// One record per canonical blood type, all stamped `now`.
pub fn seed_inventory(now: DateTime<Utc>) -> Vec<InventoryRecord> {
    const SEED: [(BloodType, u32); 8] = [
        (BloodType::APositive, 45),
        (BloodType::ANegative, 12),
        (BloodType::BPositive, 67),
        (BloodType::BNegative, 8),
        (BloodType::AbPositive, 34),
        (BloodType::AbNegative, 5),
        (BloodType::OPositive, 78),
        (BloodType::ONegative, 15),
    ];

    SEED.iter()
        .zip(1..)
        .map(|(&(blood_type, units), id)| InventoryRecord::new(id, blood_type, units, now))
        .collect()
}
