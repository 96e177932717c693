use core::str::FromStr;
use serde::{Deserialize, Serialize};

use bloodbank_core::DomainError;

/// Units below this are critical.
pub const CRITICAL_BELOW: u32 = 10;
/// Units below this (and at least `CRITICAL_BELOW`) are low.
pub const LOW_BELOW: u32 = 20;
/// Units below this (and at least `LOW_BELOW`) are adequate; anything above is high.
pub const ADEQUATE_BELOW: u32 = 50;

/// Severity classification of the units available for one blood type.
///
/// Variants are declared from most to least severe, so the derived `Ord`
/// follows the unit count.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InventoryStatus {
    Critical,
    Low,
    Adequate,
    High,
}

impl InventoryStatus {
    pub const ALL: [InventoryStatus; 4] = [
        InventoryStatus::Critical,
        InventoryStatus::Low,
        InventoryStatus::Adequate,
        InventoryStatus::High,
    ];

    /// Classify a unit count. Each band is closed on its lower bound.
    pub fn classify(units: u32) -> Self {
        if units < CRITICAL_BELOW {
            InventoryStatus::Critical
        } else if units < LOW_BELOW {
            InventoryStatus::Low
        } else if units < ADEQUATE_BELOW {
            InventoryStatus::Adequate
        } else {
            InventoryStatus::High
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            InventoryStatus::Critical => "critical",
            InventoryStatus::Low => "low",
            InventoryStatus::Adequate => "adequate",
            InventoryStatus::High => "high",
        }
    }

    /// Legend text shown next to the status.
    pub fn label(self) -> &'static str {
        match self {
            InventoryStatus::Critical => "Critical (<10 units)",
            InventoryStatus::Low => "Low (10-19 units)",
            InventoryStatus::Adequate => "Adequate (20-49 units)",
            InventoryStatus::High => "High (50+ units)",
        }
    }
}

impl core::fmt::Display for InventoryStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InventoryStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        InventoryStatus::ALL
            .into_iter()
            .find(|st| st.as_str() == s)
            .ok_or_else(|| DomainError::validation(format!("unknown inventory status '{s}'")))
    }
}
