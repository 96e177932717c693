use chrono::{SecondsFormat, Utc};
use serde_json::Value as JsonValue;
use thiserror::Error;

use bloodbank_core::{Backend, BloodType, DomainError, Filter, Order, Row, StoreError};

use crate::record::{InventoryRecord, seed_inventory};
use crate::status::InventoryStatus;

/// Remote table holding one row per blood type.
pub const INVENTORY_TABLE: &str = "blood_inventory";

#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] DomainError),

    #[error("inventory store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),

    #[error("no inventory row for blood type {0}")]
    NotFound(BloodType),
}

/// Blood-type unit levels with derived severity status.
#[derive(Debug, Clone)]
pub struct InventoryStore {
    backend: Backend,
}

impl InventoryStore {
    pub fn new(backend: Backend) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    /// List every blood type, ordered by code byte-wise (`A+` before `A-`).
    ///
    /// Without a configured remote store this is the built-in seed set. The
    /// backend's own ordering is not trusted: collations differ on `+`/`-`.
    pub async fn list_inventory(&self) -> Result<Vec<InventoryRecord>, InventoryError> {
        let remote = match &self.backend {
            Backend::Unconfigured => {
                tracing::debug!("remote store not configured; serving seed inventory");
                return Ok(seed_inventory(Utc::now()));
            }
            Backend::Configured(remote) => remote,
        };

        let rows = remote
            .select(INVENTORY_TABLE, None, Some(&Order::asc("blood_type")))
            .await?;

        let mut records = rows
            .into_iter()
            .map(InventoryRecord::from_row)
            .collect::<Result<Vec<_>, _>>()?;
        records.sort_by(|a, b| a.blood_type().cmp_code(&b.blood_type()));

        tracing::debug!(count = records.len(), "loaded inventory");
        Ok(records)
    }

    /// List inventory, substituting the seed set when the store fails.
    ///
    /// Never fails; a failure is logged and replaced by display data.
    pub async fn list_inventory_or_seed(&self) -> Vec<InventoryRecord> {
        match self.list_inventory().await {
            Ok(records) => records,
            Err(err) => {
                tracing::warn!(error = %err, "inventory unavailable; serving seed inventory");
                seed_inventory(Utc::now())
            }
        }
    }

    /// Set the unit count for one blood type, re-deriving its status.
    ///
    /// Requires a configured remote store; there is no local fallback for
    /// inventory writes. Input is validated before the store is touched.
    pub async fn update_units(
        &self,
        blood_type: BloodType,
        units: i64,
    ) -> Result<InventoryRecord, InventoryError> {
        let units = u32::try_from(units).map_err(|_| {
            DomainError::validation(format!(
                "unit count for {blood_type} must be between 0 and {}, got {units}",
                u32::MAX
            ))
        })?;

        let remote = self.backend.remote()?;

        let status = InventoryStatus::classify(units);
        let mut patch = Row::new();
        patch.insert("units".into(), JsonValue::from(units));
        patch.insert("status".into(), JsonValue::from(status.as_str()));
        patch.insert(
            "updated_at".into(),
            JsonValue::from(Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)),
        );

        let rows = remote
            .update(
                INVENTORY_TABLE,
                &Filter::eq("blood_type", blood_type.code()),
                patch,
            )
            .await?;

        let row = rows
            .into_iter()
            .next()
            .ok_or(InventoryError::NotFound(blood_type))?;
        let record = InventoryRecord::from_row(row)?;

        tracing::info!(
            blood_type = %blood_type,
            units,
            status = %record.status(),
            "inventory units updated"
        );
        Ok(record)
    }
}
