//! Postgres-backed remote store.
//!
//! Rows cross the boundary as JSON objects: reads use `to_jsonb(t.*)`, writes
//! go through `jsonb_populate_record(NULL::<table>, $1)` so every value is cast
//! to its column type by the database itself.
//!
//! ## Identifiers
//!
//! Table and column names are spliced into the SQL text and therefore must be
//! plain lowercase identifiers (`validate_identifier`). Values are always bound.
//!
//! ## Error Mapping
//!
//! | SQLx Error | StoreError |
//! |------------|------------|
//! | Database (any code) | `Backend` (message carries the code) |
//! | PoolClosed / PoolTimedOut / Io / Tls | `Backend` |
//! | Row column decode failure | `Decode` |

use std::sync::Arc;

use serde_json::Value as JsonValue;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row as _};
use tracing::instrument;

use bloodbank_core::store::validate_identifier;
use bloodbank_core::{Filter, Order, RemoteStore, Row, StoreError, StoreResult};

use crate::config::RemoteConfig;

/// Schema for `blood_inventory` and `donation_requests`.
pub const SCHEMA_SQL: &str = include_str!("../migrations/0001_init.sql");

/// Postgres-backed [`RemoteStore`].
///
/// Uses a SQLx connection pool (thread-safe, cheap to clone).
#[derive(Debug, Clone)]
pub struct PostgresRemoteStore {
    pool: Arc<PgPool>,
}

impl PostgresRemoteStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Build a lazily-connecting pool: an unreachable database surfaces on
    /// the first call, not at startup.
    pub fn connect_lazy(config: &RemoteConfig) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect_lazy(&config.database_url)
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Create the tables (idempotent) and seed one inventory row per blood type.
    #[instrument(skip(self), err)]
    pub async fn apply_schema(&self) -> StoreResult<()> {
        sqlx::raw_sql(SCHEMA_SQL)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("apply_schema", e))?;
        tracing::info!("schema applied");
        Ok(())
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let code = db_err.code().map(|c| c.to_string()).unwrap_or_default();
            StoreError::backend(format!(
                "database error in {operation} [{code}]: {}",
                db_err.message()
            ))
        }
        sqlx::Error::PoolClosed => {
            StoreError::backend(format!("connection pool closed in {operation}"))
        }
        sqlx::Error::PoolTimedOut => {
            StoreError::backend(format!("timed out acquiring a connection in {operation}"))
        }
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
            StoreError::decode(format!("decode error in {operation}: {err}"))
        }
        _ => StoreError::backend(format!("sqlx error in {operation}: {err}")),
    }
}

fn row_from_pg(operation: &str, row: &PgRow) -> StoreResult<Row> {
    let value: JsonValue = row
        .try_get("row")
        .map_err(|e| map_sqlx_error(operation, e))?;
    match value {
        JsonValue::Object(map) => Ok(map),
        other => Err(StoreError::decode(format!(
            "{operation}: expected a JSON object row, got {other}"
        ))),
    }
}

/// Build the `SELECT` statement; the filter value (if any) is bound as `$1`.
fn select_sql(table: &str, filter: Option<&Filter>, order: Option<&Order>) -> StoreResult<String> {
    let table = validate_identifier(table)?;
    let mut sql = format!("SELECT to_jsonb(t.*) AS row FROM {table} AS t");
    if let Some(f) = filter {
        let column = validate_identifier(&f.column)?;
        sql.push_str(&format!(" WHERE to_jsonb(t.{column}) = $1"));
    }
    if let Some(o) = order {
        let column = validate_identifier(&o.column)?;
        let dir = if o.ascending { "ASC" } else { "DESC" };
        sql.push_str(&format!(" ORDER BY t.{column} {dir}"));
    }
    Ok(sql)
}

/// Build the `INSERT` statement for one row with the given columns; the row
/// document is bound as `$1`.
fn insert_sql(table: &str, columns: &[&str]) -> StoreResult<String> {
    let table = validate_identifier(table)?;
    if columns.is_empty() {
        return Ok(format!(
            "INSERT INTO {table} AS t DEFAULT VALUES RETURNING to_jsonb(t.*) AS row"
        ));
    }
    for c in columns {
        validate_identifier(c)?;
    }
    let cols = columns.join(", ");
    Ok(format!(
        "INSERT INTO {table} AS t ({cols}) \
         SELECT {cols} FROM jsonb_populate_record(NULL::{table}, $1) \
         RETURNING to_jsonb(t.*) AS row"
    ))
}

/// Build the `UPDATE` statement; the patch document is `$1` and the filter
/// value is `$2`.
fn update_sql(table: &str, filter_column: &str, columns: &[&str]) -> StoreResult<String> {
    let table = validate_identifier(table)?;
    let filter_column = validate_identifier(filter_column)?;
    if columns.is_empty() {
        return Err(StoreError::backend("update with an empty patch"));
    }
    let assignments = columns
        .iter()
        .map(|c| validate_identifier(c).map(|c| format!("{c} = p.{c}")))
        .collect::<StoreResult<Vec<_>>>()?
        .join(", ");
    Ok(format!(
        "UPDATE {table} AS t SET {assignments} \
         FROM jsonb_populate_record(NULL::{table}, $1) AS p \
         WHERE to_jsonb(t.{filter_column}) = $2 \
         RETURNING to_jsonb(t.*) AS row"
    ))
}

#[async_trait::async_trait]
impl RemoteStore for PostgresRemoteStore {
    #[instrument(skip(self, filter, order), fields(table = %table), err)]
    async fn select(
        &self,
        table: &str,
        filter: Option<&Filter>,
        order: Option<&Order>,
    ) -> StoreResult<Vec<Row>> {
        let sql = select_sql(table, filter, order)?;
        let mut query = sqlx::query(&sql);
        if let Some(f) = filter {
            query = query.bind(f.value.clone());
        }

        let rows = query
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("select", e))?;

        rows.iter().map(|r| row_from_pg("select", r)).collect()
    }

    #[instrument(skip(self, rows), fields(table = %table, count = rows.len()), err)]
    async fn insert(&self, table: &str, rows: Vec<Row>) -> StoreResult<Vec<Row>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("insert", e))?;

        let mut inserted = Vec::with_capacity(rows.len());
        for row in rows {
            let columns: Vec<&str> = row.keys().map(String::as_str).collect();
            let sql = insert_sql(table, &columns)?;
            let stored = sqlx::query(&sql)
                .bind(JsonValue::Object(row.clone()))
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("insert", e))?;
            inserted.push(row_from_pg("insert", &stored)?);
        }

        tx.commit().await.map_err(|e| map_sqlx_error("insert", e))?;
        Ok(inserted)
    }

    #[instrument(skip(self, filter, patch), fields(table = %table, column = %filter.column), err)]
    async fn update(&self, table: &str, filter: &Filter, patch: Row) -> StoreResult<Vec<Row>> {
        let columns: Vec<&str> = patch.keys().map(String::as_str).collect();
        let sql = update_sql(table, &filter.column, &columns)?;

        let rows = sqlx::query(&sql)
            .bind(JsonValue::Object(patch.clone()))
            .bind(filter.value.clone())
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("update", e))?;

        rows.iter().map(|r| row_from_pg("update", r)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_statement_shapes() {
        assert_eq!(
            select_sql("blood_inventory", None, Some(&Order::asc("blood_type"))).unwrap(),
            "SELECT to_jsonb(t.*) AS row FROM blood_inventory AS t ORDER BY t.blood_type ASC"
        );
        assert_eq!(
            select_sql(
                "donation_requests",
                Some(&Filter::eq("request_type", "donate")),
                Some(&Order::desc("created_at"))
            )
            .unwrap(),
            "SELECT to_jsonb(t.*) AS row FROM donation_requests AS t \
             WHERE to_jsonb(t.request_type) = $1 ORDER BY t.created_at DESC"
        );
    }

    #[test]
    fn insert_statement_lists_only_supplied_columns() {
        let sql = insert_sql("donation_requests", &["name", "status"]).unwrap();
        assert_eq!(
            sql,
            "INSERT INTO donation_requests AS t (name, status) \
             SELECT name, status FROM jsonb_populate_record(NULL::donation_requests, $1) \
             RETURNING to_jsonb(t.*) AS row"
        );
        assert!(insert_sql("t", &[]).unwrap().contains("DEFAULT VALUES"));
    }

    #[test]
    fn update_statement_assigns_from_patch_record() {
        let sql = update_sql("blood_inventory", "blood_type", &["units", "status"]).unwrap();
        assert!(sql.contains("SET units = p.units, status = p.status"));
        assert!(sql.contains("WHERE to_jsonb(t.blood_type) = $2"));
        assert!(update_sql("blood_inventory", "blood_type", &[]).is_err());
    }

    #[test]
    fn hostile_identifiers_never_reach_sql() {
        assert!(select_sql("x; drop table y", None, None).is_err());
        assert!(insert_sql("t", &["a) values (1); --"]).is_err());
        assert!(update_sql("t", "id = id OR 1", &["a"]).is_err());
    }
}
