//! In-memory store implementations for tests/dev.

use std::cmp::Ordering as CmpOrdering;
use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value as JsonValue;

use super::{
    Filter, LocalStore, Order, RemoteStore, Row, StoreError, StoreResult, validate_identifier,
};

/// Column defaults applied by [`InMemoryRemoteStore`] on insert, standing in
/// for identity columns and `DEFAULT now()` in a real schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableSpec {
    identity: Option<String>,
    now_defaults: Vec<String>,
}

impl TableSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Column that receives a store-assigned, strictly increasing integer.
    pub fn identity(mut self, column: impl Into<String>) -> Self {
        self.identity = Some(column.into());
        self
    }

    /// Column that receives the current UTC instant when not supplied.
    pub fn default_now(mut self, column: impl Into<String>) -> Self {
        self.now_defaults.push(column.into());
        self
    }
}

#[derive(Debug)]
struct Table {
    spec: TableSpec,
    rows: Vec<Row>,
    next_id: i64,
}

/// In-memory remote store.
///
/// Tables must be declared up front with [`InMemoryRemoteStore::with_table`];
/// touching an undeclared table fails like a missing relation would.
#[derive(Debug, Default)]
pub struct InMemoryRemoteStore {
    tables: RwLock<HashMap<String, Table>>,
    offline: AtomicBool,
}

impl InMemoryRemoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(self, name: impl Into<String>, spec: TableSpec) -> Self {
        if let Ok(mut tables) = self.tables.write() {
            tables.insert(
                name.into(),
                Table {
                    spec,
                    rows: Vec::new(),
                    next_id: 1,
                },
            );
        }
        self
    }

    /// Make every subsequent call fail (simulates an unreachable backend).
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn is_offline(&self) -> bool {
        self.offline.load(Ordering::SeqCst)
    }

    /// Number of rows currently stored in `table` (0 for unknown tables).
    pub fn row_count(&self, table: &str) -> usize {
        self.tables
            .read()
            .ok()
            .and_then(|t| t.get(table).map(|t| t.rows.len()))
            .unwrap_or(0)
    }

    fn ensure_online(&self) -> StoreResult<()> {
        if self.is_offline() {
            Err(StoreError::backend("remote store offline"))
        } else {
            Ok(())
        }
    }
}

fn missing_relation(table: &str) -> StoreError {
    StoreError::backend(format!("relation \"{table}\" does not exist"))
}

fn lock_poisoned() -> StoreError {
    StoreError::backend("lock poisoned")
}

fn is_absent(row: &Row, column: &str) -> bool {
    matches!(row.get(column), None | Some(JsonValue::Null))
}

/// Total order over JSON scalars: numbers numerically, RFC 3339 timestamps
/// chronologically, other strings lexicographically, nulls last.
fn compare_values(a: Option<&JsonValue>, b: Option<&JsonValue>) -> CmpOrdering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    match (a, b) {
        (None, None) => CmpOrdering::Equal,
        (None, Some(_)) => CmpOrdering::Greater,
        (Some(_), None) => CmpOrdering::Less,
        (Some(JsonValue::Number(x)), Some(JsonValue::Number(y))) => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.partial_cmp(&y).unwrap_or(CmpOrdering::Equal)
        }
        (Some(JsonValue::String(x)), Some(JsonValue::String(y))) => {
            match (DateTime::parse_from_rfc3339(x), DateTime::parse_from_rfc3339(y)) {
                (Ok(x), Ok(y)) => x.cmp(&y),
                _ => x.cmp(y),
            }
        }
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
    }
}

#[async_trait::async_trait]
impl RemoteStore for InMemoryRemoteStore {
    async fn select(
        &self,
        table: &str,
        filter: Option<&Filter>,
        order: Option<&Order>,
    ) -> StoreResult<Vec<Row>> {
        self.ensure_online()?;
        validate_identifier(table)?;
        if let Some(f) = filter {
            validate_identifier(&f.column)?;
        }
        if let Some(o) = order {
            validate_identifier(&o.column)?;
        }

        let tables = self.tables.read().map_err(|_| lock_poisoned())?;
        let t = tables.get(table).ok_or_else(|| missing_relation(table))?;

        let mut rows: Vec<Row> = t
            .rows
            .iter()
            .filter(|r| filter.is_none_or(|f| f.matches(r)))
            .cloned()
            .collect();

        if let Some(o) = order {
            rows.sort_by(|a, b| {
                let ord = compare_values(a.get(&o.column), b.get(&o.column));
                if o.ascending { ord } else { ord.reverse() }
            });
        }

        Ok(rows)
    }

    async fn insert(&self, table: &str, rows: Vec<Row>) -> StoreResult<Vec<Row>> {
        self.ensure_online()?;
        validate_identifier(table)?;
        for row in &rows {
            for column in row.keys() {
                validate_identifier(column)?;
            }
        }

        let mut tables = self.tables.write().map_err(|_| lock_poisoned())?;
        let t = tables.get_mut(table).ok_or_else(|| missing_relation(table))?;

        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);
        let mut inserted = Vec::with_capacity(rows.len());
        for mut row in rows {
            if let Some(identity) = t.spec.identity.clone() {
                match row.get(&identity).and_then(JsonValue::as_i64) {
                    Some(explicit) => t.next_id = t.next_id.max(explicit + 1),
                    None => {
                        row.insert(identity, JsonValue::from(t.next_id));
                        t.next_id += 1;
                    }
                }
            }
            for column in &t.spec.now_defaults {
                if is_absent(&row, column) {
                    row.insert(column.clone(), JsonValue::from(now.clone()));
                }
            }
            t.rows.push(row.clone());
            inserted.push(row);
        }

        Ok(inserted)
    }

    async fn update(&self, table: &str, filter: &Filter, patch: Row) -> StoreResult<Vec<Row>> {
        self.ensure_online()?;
        validate_identifier(table)?;
        validate_identifier(&filter.column)?;
        for column in patch.keys() {
            validate_identifier(column)?;
        }

        let mut tables = self.tables.write().map_err(|_| lock_poisoned())?;
        let t = tables.get_mut(table).ok_or_else(|| missing_relation(table))?;

        let mut updated = Vec::new();
        for row in t.rows.iter_mut().filter(|r| filter.matches(r)) {
            for (k, v) in &patch {
                row.insert(k.clone(), v.clone());
            }
            updated.push(row.clone());
        }

        Ok(updated)
    }
}

/// In-memory local store.
#[derive(Debug, Default)]
pub struct InMemoryLocalStore {
    inner: RwLock<HashMap<String, String>>,
}

impl InMemoryLocalStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalStore for InMemoryLocalStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let map = self.inner.read().map_err(|_| lock_poisoned())?;
        Ok(map.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut map = self.inner.write().map_err(|_| lock_poisoned())?;
        map.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let mut map = self.inner.write().map_err(|_| lock_poisoned())?;
        map.remove(key);
        Ok(())
    }
}
