//! Snapshot reconciliation: mark, replace, purge.
//!
//! The remote side only ever hands over "everything that exists right now".
//! Turning that into the new contents of a table takes three steps:
//!
//! 1. flag every stored row as dirty,
//! 2. upsert every snapshot row (an upsert always writes `dirty = 0`),
//! 3. delete whatever is still dirty.
//!
//! Rows are only removed after the new ones are in place, so readers never
//! observe an empty table mid-sync. Running the same snapshot twice leaves
//! the table unchanged. Within one snapshot, the last occurrence of a
//! duplicate `id` wins.

use chrono::{DateTime, Utc};

use super::sqlite::{delete_where_dirty, mark_all_dirty, record_sync, upsert_rows};
use super::StoredRow;

/// Row counts from one reconciliation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Rows present before the snapshot was applied
    pub marked: usize,
    /// Snapshot rows written, duplicates included
    pub written: usize,
    /// Rows absent from the snapshot and removed
    pub purged: usize,
}

impl ReconcileReport {
    /// Rows that existed before and survived the snapshot
    pub fn kept(&self) -> usize {
        self.marked - self.purged
    }
}

/// Apply `snapshot` as the complete new contents of `R`'s table.
///
/// All three steps and the sync timestamp commit in one transaction; any
/// failure rolls the table back to its previous contents.
pub(crate) fn reconcile<R: StoredRow>(
    conn: &mut rusqlite::Connection,
    snapshot: &[R],
    synced_at: DateTime<Utc>,
) -> rusqlite::Result<ReconcileReport> {
    let tx = conn.transaction()?;

    let marked = mark_all_dirty::<R>(&tx)?;
    let written = upsert_rows(&tx, snapshot)?;
    let purged = delete_where_dirty::<R>(&tx)?;
    record_sync::<R>(&tx, synced_at)?;

    tx.commit()?;

    Ok(ReconcileReport {
        marked,
        written,
        purged,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::schema;
    use crate::store::{EventRow, ScheduleRow};
    use chrono::TimeZone;

    fn open() -> rusqlite::Connection {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        for table in schema::CACHE_TABLES {
            conn.execute_batch(table.create).unwrap();
        }
        conn.execute_batch(schema::CREATE_SYNC_STATE).unwrap();
        conn
    }

    fn schedule(id: i64, title: &str) -> ScheduleRow {
        ScheduleRow {
            id,
            title: title.to_string(),
            subtitle: String::new(),
            date: Utc.with_ymd_and_hms(2026, 5, 1, 10, 0, 0).unwrap() + chrono::Duration::hours(id),
            image_url: String::new(),
            dirty: false,
        }
    }

    fn ids(conn: &rusqlite::Connection) -> Vec<(i64, String, bool)> {
        let mut stmt = conn
            .prepare("SELECT id, title, dirty FROM schedule ORDER BY id")
            .unwrap();
        stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))
            .unwrap()
            .collect::<rusqlite::Result<Vec<_>>>()
            .unwrap()
    }

    #[test]
    fn test_reconcile_report_counts() {
        let mut conn = open();
        reconcile(&mut conn, &[schedule(1, "a"), schedule(2, "b")], Utc::now()).unwrap();

        let report = reconcile(&mut conn, &[schedule(2, "b2"), schedule(3, "c")], Utc::now()).unwrap();
        assert_eq!(
            report,
            ReconcileReport {
                marked: 2,
                written: 2,
                purged: 1,
            }
        );
        assert_eq!(report.kept(), 1);
        assert_eq!(
            ids(&conn),
            vec![(2, "b2".to_string(), false), (3, "c".to_string(), false)]
        );
    }

    #[test]
    fn test_duplicate_ids_last_wins() {
        let mut conn = open();
        let report = reconcile(
            &mut conn,
            &[schedule(1, "first"), schedule(1, "second")],
            Utc::now(),
        )
        .unwrap();

        assert_eq!(report.written, 2);
        assert_eq!(ids(&conn), vec![(1, "second".to_string(), false)]);
    }

    #[test]
    fn test_failed_step_rolls_back() {
        let mut conn = open();
        reconcile(&mut conn, &[schedule(1, "kept")], Utc::now()).unwrap();

        // Mark, upsert and purge succeed; recording the sync time then fails
        conn.execute_batch("DROP TABLE sync_state").unwrap();
        let result = reconcile(&mut conn, &[schedule(2, "new")], Utc::now());

        assert!(result.is_err());
        assert_eq!(ids(&conn), vec![(1, "kept".to_string(), false)]);
    }

    #[test]
    fn test_tables_are_independent() {
        let mut conn = open();
        reconcile(&mut conn, &[schedule(1, "a")], Utc::now()).unwrap();
        reconcile::<EventRow>(&mut conn, &[], Utc::now()).unwrap();

        assert_eq!(ids(&conn).len(), 1);
    }
}
