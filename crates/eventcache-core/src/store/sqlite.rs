//! SQLite-backed entity store.
//!
//! Uses `rusqlite` for the statements and `tokio-rusqlite` to run them on a
//! dedicated connection thread, so storage I/O never blocks the caller's task.

use std::marker::PhantomData;
use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension;
use tokio_rusqlite::Connection;
use tracing::{debug, info, warn};

use crate::error::{StorageError, StorageResult};

use super::error::{map_call_error, wrap_err};
use super::reconcile::{self, ReconcileReport};
use super::rows::millis_to_datetime;
use super::schema::{self, SCHEMA_VERSION};
use super::{EntityStore, EventRow, ScheduleRow, StoredRow};

// ============================================================================
// Statement helpers (run on the connection thread)
// ============================================================================

pub(crate) fn upsert_rows<R: StoredRow>(
    conn: &rusqlite::Connection,
    rows: &[R],
) -> rusqlite::Result<usize> {
    let mut stmt = conn.prepare_cached(R::SCHEMA.upsert)?;
    for row in rows {
        row.write(&mut stmt)?;
    }
    Ok(rows.len())
}

pub(crate) fn mark_all_dirty<R: StoredRow>(conn: &rusqlite::Connection) -> rusqlite::Result<usize> {
    conn.execute(R::SCHEMA.mark_all_dirty, [])
}

pub(crate) fn delete_where_dirty<R: StoredRow>(
    conn: &rusqlite::Connection,
) -> rusqlite::Result<usize> {
    conn.execute(R::SCHEMA.delete_dirty, [])
}

pub(crate) fn record_sync<R: StoredRow>(
    conn: &rusqlite::Connection,
    synced_at: DateTime<Utc>,
) -> rusqlite::Result<()> {
    conn.execute(
        schema::UPSERT_SYNC_STATE,
        rusqlite::params![R::SCHEMA.name, synced_at.timestamp_millis()],
    )?;
    Ok(())
}

/// Create the tables, recreating them if the file carries another schema version.
fn migrate(conn: &mut rusqlite::Connection) -> rusqlite::Result<()> {
    let version: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;

    let tx = conn.transaction()?;
    if version != 0 && version != SCHEMA_VERSION {
        warn!(found = version, expected = SCHEMA_VERSION, "Cache schema changed, recreating tables");
        tx.execute_batch(schema::DROP_TABLES)?;
    }
    for table in schema::CACHE_TABLES {
        tx.execute_batch(table.create)?;
    }
    tx.execute_batch(schema::CREATE_SYNC_STATE)?;
    tx.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    tx.commit()
}

// ============================================================================
// Database
// ============================================================================

/// Handle to the cache database. Clone is cheap - clones share the same
/// connection thread.
///
/// Created once at startup and passed to whatever needs a store; there is no
/// process-wide instance.
#[derive(Clone)]
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the database file, creating parent directories.
    pub async fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                StorageError::ConnectionFailed(format!("{}: {}", parent.display(), e))
            })?;
        }

        let conn = Connection::open(&path)
            .await
            .map_err(|e| StorageError::ConnectionFailed(e.to_string()))?;

        conn.call(|conn| {
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
                row.get::<_, String>(0)
            })
            .map_err(wrap_err)?;
            Ok(())
        })
        .await
        .map_err(|e| map_call_error(e, "pragma"))?;

        Self::init_schema(&conn).await?;
        info!(path = %path.display(), "Cache database opened");

        Ok(Self { conn })
    }

    /// Data is lost when the last handle is dropped.
    pub async fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| StorageError::ConnectionFailed(e.to_string()))?;

        Self::init_schema(&conn).await?;

        Ok(Self { conn })
    }

    async fn init_schema(conn: &Connection) -> StorageResult<()> {
        conn.call(|conn| migrate(conn).map_err(wrap_err))
            .await
            .map_err(|e| map_call_error(e, "schema"))
    }

    pub async fn schema_version(&self) -> StorageResult<i64> {
        self.conn
            .call(|conn| {
                conn.query_row("PRAGMA user_version", [], |row| row.get(0))
                    .map_err(wrap_err)
            })
            .await
            .map_err(|e| map_call_error(e, "schema"))
    }

    pub fn table<R: StoredRow>(&self) -> SqliteTable<R> {
        SqliteTable {
            conn: self.conn.clone(),
            _row: PhantomData,
        }
    }

    pub fn events(&self) -> SqliteTable<EventRow> {
        self.table()
    }

    pub fn schedule(&self) -> SqliteTable<ScheduleRow> {
        self.table()
    }

    /// Close the connection thread. Every table handed out by this database
    /// fails with `ConnectionFailed` afterwards.
    pub async fn close(self) -> StorageResult<()> {
        self.conn
            .close()
            .await
            .map_err(|e| map_call_error(e, "close"))
    }
}

// ============================================================================
// SqliteTable
// ============================================================================

/// One entity kind's table.
pub struct SqliteTable<R> {
    conn: Connection,
    _row: PhantomData<fn() -> R>,
}

impl<R> Clone for SqliteTable<R> {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
            _row: PhantomData,
        }
    }
}

impl<R: StoredRow> SqliteTable<R> {
    async fn call<T, F>(&self, f: F) -> StorageResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut rusqlite::Connection) -> rusqlite::Result<T> + Send + 'static,
    {
        self.conn
            .call(move |conn| f(conn).map_err(wrap_err))
            .await
            .map_err(|e| map_call_error(e, R::SCHEMA.name))
    }
}

#[async_trait]
impl<R: StoredRow> EntityStore<R> for SqliteTable<R> {
    async fn upsert_one(&self, row: R) -> StorageResult<()> {
        self.call(move |conn| {
            let mut stmt = conn.prepare_cached(R::SCHEMA.upsert)?;
            row.write(&mut stmt)?;
            Ok(())
        })
        .await
    }

    async fn upsert_many(&self, rows: Vec<R>) -> StorageResult<usize> {
        self.call(move |conn| {
            let tx = conn.transaction()?;
            let written = upsert_rows(&tx, &rows)?;
            tx.commit()?;
            Ok(written)
        })
        .await
    }

    async fn get_all(&self) -> StorageResult<Vec<R>> {
        self.call(|conn| {
            let mut stmt = conn.prepare_cached(R::SCHEMA.select_all)?;
            let rows = stmt.query_map([], R::from_sql)?;
            rows.collect()
        })
        .await
    }

    async fn get_by_id(&self, id: i64) -> StorageResult<Option<R>> {
        self.call(move |conn| {
            conn.query_row(R::SCHEMA.select_by_id, [id], R::from_sql)
                .optional()
        })
        .await
    }

    async fn mark_all_dirty(&self) -> StorageResult<usize> {
        self.call(|conn| mark_all_dirty::<R>(conn)).await
    }

    async fn delete_where_dirty(&self) -> StorageResult<usize> {
        self.call(|conn| delete_where_dirty::<R>(conn)).await
    }

    async fn clear(&self) -> StorageResult<()> {
        let removed = self
            .call(|conn| {
                let tx = conn.transaction()?;
                let removed = tx.execute(R::SCHEMA.clear, [])?;
                tx.execute(schema::DELETE_SYNC_STATE, [R::SCHEMA.name])?;
                tx.commit()?;
                Ok(removed)
            })
            .await?;
        debug!(table = R::SCHEMA.name, removed, "Table cleared");
        Ok(())
    }

    async fn reconcile(&self, snapshot: Vec<R>) -> StorageResult<ReconcileReport> {
        let synced_at = Utc::now();
        let report = self
            .call(move |conn| reconcile::reconcile(conn, &snapshot, synced_at))
            .await?;
        debug!(
            table = R::SCHEMA.name,
            marked = report.marked,
            written = report.written,
            purged = report.purged,
            "Snapshot reconciled"
        );
        Ok(report)
    }

    async fn last_synced(&self) -> StorageResult<Option<DateTime<Utc>>> {
        self.call(|conn| {
            let ms: Option<i64> = conn
                .query_row(schema::SELECT_SYNC_STATE, [R::SCHEMA.name], |row| row.get(0))
                .optional()?;
            ms.map(|ms| millis_to_datetime(ms, 0)).transpose()
        })
        .await
    }
}

// ============================================================================
// Tests
// ============================================================================
