//! Local entity store for offline data access.
//!
//! Every entity kind gets one durable SQLite table keyed by `id`. Rows carry
//! a hidden `dirty` flag that only the reconciliation step in
//! [`reconcile`] uses; the flag never leaves this module's row types.

mod error;
pub mod reconcile;
pub mod rows;
pub mod schema;
pub mod sqlite;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::StorageResult;

pub use reconcile::ReconcileReport;
pub use rows::{EventRow, ScheduleRow};
pub use schema::TableSchema;
pub use sqlite::{Database, SqliteTable};

/// A storage-shaped row that knows its own table.
pub trait StoredRow: Clone + Send + Sync + 'static {
    const SCHEMA: &'static TableSchema;

    fn id(&self) -> i64;

    fn is_dirty(&self) -> bool;

    fn from_sql(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self>;

    /// Execute the table's upsert statement with this row's values
    fn write(&self, stmt: &mut rusqlite::Statement<'_>) -> rusqlite::Result<usize>;
}

/// Durable keyed storage for one entity kind.
///
/// Every write lands completely or not at all. Writes always store the row
/// with its reconciliation flag cleared.
#[async_trait]
pub trait EntityStore<R: StoredRow>: Send + Sync {
    /// Insert or fully replace the row sharing `row.id()`.
    async fn upsert_one(&self, row: R) -> StorageResult<()>;

    /// Batched upsert in one transaction; a later duplicate id wins.
    async fn upsert_many(&self, rows: Vec<R>) -> StorageResult<usize>;

    /// All rows, ordered by date ascending then id.
    async fn get_all(&self) -> StorageResult<Vec<R>>;

    async fn get_by_id(&self, id: i64) -> StorageResult<Option<R>>;

    /// Flag every row; returns how many were flagged.
    async fn mark_all_dirty(&self) -> StorageResult<usize>;

    /// Remove every flagged row; returns how many were removed.
    async fn delete_where_dirty(&self) -> StorageResult<usize>;

    /// Remove every row and forget the last sync time.
    async fn clear(&self) -> StorageResult<()>;

    /// Make `snapshot` the complete contents of the table (mark, replace, purge).
    async fn reconcile(&self, snapshot: Vec<R>) -> StorageResult<ReconcileReport>;

    /// When the last reconciliation committed, if ever.
    async fn last_synced(&self) -> StorageResult<Option<DateTime<Utc>>>;
}
