use std::sync::Arc;

use serde_json::Value as JsonValue;

use super::StoreResult;

/// A stored row: a JSON object keyed by column name.
pub type Row = serde_json::Map<String, JsonValue>;

/// Column equality filter (`WHERE column = value`).
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: String,
    pub value: JsonValue,
}

impl Filter {
    pub fn eq(column: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }

    /// Whether `row` satisfies the filter (used by in-memory backends).
    pub fn matches(&self, row: &Row) -> bool {
        row.get(&self.column) == Some(&self.value)
    }
}

/// Single-column ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

impl Order {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: true,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: false,
        }
    }
}

/// Remote relational/document store.
///
/// Every call is a single awaited round trip. No batching, no retries and no
/// isolation guarantees beyond what the backend provides natively.
///
/// ## Semantics
///
/// - `select` returns all rows of `table` matching `filter`, sorted by `order`
///   when given (backend-native order otherwise).
/// - `insert` persists the rows and returns them as stored, including any
///   values the store assigned (identity, defaults).
/// - `update` merges `patch` into every row matching `filter` and returns the
///   updated rows; an empty result means nothing matched.
#[async_trait::async_trait]
pub trait RemoteStore: Send + Sync {
    async fn select(
        &self,
        table: &str,
        filter: Option<&Filter>,
        order: Option<&Order>,
    ) -> StoreResult<Vec<Row>>;

    async fn insert(&self, table: &str, rows: Vec<Row>) -> StoreResult<Vec<Row>>;

    async fn update(&self, table: &str, filter: &Filter, patch: Row) -> StoreResult<Vec<Row>>;
}

#[async_trait::async_trait]
impl<S> RemoteStore for Arc<S>
where
    S: RemoteStore + ?Sized,
{
    async fn select(
        &self,
        table: &str,
        filter: Option<&Filter>,
        order: Option<&Order>,
    ) -> StoreResult<Vec<Row>> {
        (**self).select(table, filter, order).await
    }

    async fn insert(&self, table: &str, rows: Vec<Row>) -> StoreResult<Vec<Row>> {
        (**self).insert(table, rows).await
    }

    async fn update(&self, table: &str, filter: &Filter, patch: Row) -> StoreResult<Vec<Row>> {
        (**self).update(table, filter, patch).await
    }
}
