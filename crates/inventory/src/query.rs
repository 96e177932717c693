//! Read-side helpers over an inventory listing: filtering and summaries.

use std::collections::BTreeMap;

use serde::Serialize;

use bloodbank_core::BloodType;

use crate::record::InventoryRecord;
use crate::status::InventoryStatus;

/// Filter over a listing: exact status plus case-insensitive code search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InventoryQuery {
    pub status: Option<InventoryStatus>,
    pub search: Option<String>,
}

impl InventoryQuery {
    pub fn matches(&self, record: &InventoryRecord) -> bool {
        if let Some(status) = self.status {
            if record.status() != status {
                return false;
            }
        }
        match self.search.as_deref().map(str::trim) {
            Some(q) if !q.is_empty() => record
                .blood_type()
                .code()
                .to_ascii_lowercase()
                .contains(&q.to_ascii_lowercase()),
            _ => true,
        }
    }

    pub fn apply(&self, records: &[InventoryRecord]) -> Vec<InventoryRecord> {
        records.iter().filter(|r| self.matches(r)).cloned().collect()
    }
}

/// Aggregate view of a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventorySummary {
    pub total_units: u64,
    pub by_status: BTreeMap<InventoryStatus, usize>,
    /// Blood types currently classified critical, in listing order.
    pub critical: Vec<BloodType>,
}

impl InventorySummary {
    pub fn from_records(records: &[InventoryRecord]) -> Self {
        let mut by_status: BTreeMap<InventoryStatus, usize> =
            InventoryStatus::ALL.into_iter().map(|s| (s, 0)).collect();
        let mut total_units = 0u64;
        let mut critical = Vec::new();

        for r in records {
            total_units += u64::from(r.units());
            *by_status.entry(r.status()).or_default() += 1;
            if r.status() == InventoryStatus::Critical {
                critical.push(r.blood_type());
            }
        }

        Self {
            total_units,
            by_status,
            critical,
        }
    }

    pub fn count(&self, status: InventoryStatus) -> usize {
        self.by_status.get(&status).copied().unwrap_or(0)
    }
}
