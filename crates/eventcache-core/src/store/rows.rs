//! Storage-shaped rows. These are the only types that carry the
//! reconciliation flag.

use chrono::{DateTime, Utc};
use rusqlite::{params, Row, Statement};

use super::schema::{self, TableSchema};
use super::StoredRow;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRow {
    pub id: i64,
    pub title: String,
    pub subtitle: String,
    pub date: DateTime<Utc>,
    pub image_url: String,
    pub video_url: String,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleRow {
    pub id: i64,
    pub title: String,
    pub subtitle: String,
    pub date: DateTime<Utc>,
    pub image_url: String,
    pub dirty: bool,
}

impl StoredRow for EventRow {
    const SCHEMA: &'static TableSchema = &schema::EVENTS;

    fn id(&self) -> i64 {
        self.id
    }

    fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Expected columns: id, title, subtitle, date_secs, date_nanos, image_url, video_url, dirty
    fn from_sql(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            subtitle: row.get(2)?,
            date: timestamp_to_datetime(row.get(3)?, row.get(4)?, 3)?,
            image_url: row.get(5)?,
            video_url: row.get(6)?,
            dirty: row.get(7)?,
        })
    }

    fn write(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<usize> {
        stmt.execute(params![
            self.id,
            self.title,
            self.subtitle,
            self.date.timestamp(),
            self.date.timestamp_subsec_nanos(),
            self.image_url,
            self.video_url,
        ])
    }
}

impl StoredRow for ScheduleRow {
    const SCHEMA: &'static TableSchema = &schema::SCHEDULE;

    fn id(&self) -> i64 {
        self.id
    }

    fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Expected columns: id, title, subtitle, date_secs, date_nanos, image_url, dirty
    fn from_sql(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            subtitle: row.get(2)?,
            date: timestamp_to_datetime(row.get(3)?, row.get(4)?, 3)?,
            image_url: row.get(5)?,
            dirty: row.get(6)?,
        })
    }

    fn write(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<usize> {
        stmt.execute(params![
            self.id,
            self.title,
            self.subtitle,
            self.date.timestamp(),
            self.date.timestamp_subsec_nanos(),
            self.image_url,
        ])
    }
}

/// Dates are stored as epoch seconds plus nanoseconds so nothing is lost
/// and `ORDER BY date_secs, date_nanos` sorts chronologically.
pub(crate) fn timestamp_to_datetime(
    secs: i64,
    nanos: u32,
    column: usize,
) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::from_timestamp(secs, nanos)
        .ok_or_else(|| out_of_range(column, format!("{}s {}ns", secs, nanos)))
}

/// Sync times only need millisecond precision.
pub(crate) fn millis_to_datetime(ms: i64, column: usize) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms).ok_or_else(|| out_of_range(column, format!("{}ms", ms)))
}

fn out_of_range(column: usize, value: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        column,
        rusqlite::types::Type::Integer,
        Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("timestamp out of range: {}", value),
        )),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_millis_to_datetime() {
        let dt = millis_to_datetime(1_770_000_000_000, 0).unwrap();
        assert_eq!(dt.timestamp_millis(), 1_770_000_000_000);
    }

    #[test]
    fn test_millis_out_of_range() {
        assert!(millis_to_datetime(i64::MAX, 3).is_err());
    }

    #[test]
    fn test_timestamp_keeps_nanoseconds() {
        let date = DateTime::parse_from_rfc3339("2026-07-01T18:00:00.123456789Z")
            .unwrap()
            .with_timezone(&Utc);
        let restored =
            timestamp_to_datetime(date.timestamp(), date.timestamp_subsec_nanos(), 3).unwrap();
        assert_eq!(restored, date);
    }

    #[test]
    fn test_timestamp_out_of_range() {
        assert!(timestamp_to_datetime(i64::MAX, 0, 3).is_err());
    }
}
