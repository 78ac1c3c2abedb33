//! SQLite schema definitions and SQL query constants.
//!
//! One table per entity kind plus `sync_state`. The `dirty` column is the
//! reconciliation flag: it is `0` for every row at rest and only reaches
//! `1` between the mark and purge steps of a reconciliation.

/// Bumped whenever a table shape changes. A database created under another
/// version has its cache tables dropped and recreated.
pub const SCHEMA_VERSION: i64 = 2;

/// SQL for one cached entity table.
pub struct TableSchema {
    pub name: &'static str,
    pub create: &'static str,
    pub select_all: &'static str,
    pub select_by_id: &'static str,
    pub upsert: &'static str,
    pub mark_all_dirty: &'static str,
    pub delete_dirty: &'static str,
    pub clear: &'static str,
}

pub const EVENTS: TableSchema = TableSchema {
    name: "events",
    create: r#"
CREATE TABLE IF NOT EXISTS events (
    id INTEGER PRIMARY KEY NOT NULL,
    title TEXT NOT NULL,
    subtitle TEXT NOT NULL,
    date_secs INTEGER NOT NULL,
    date_nanos INTEGER NOT NULL,
    image_url TEXT NOT NULL,
    video_url TEXT NOT NULL,
    dirty INTEGER NOT NULL DEFAULT 0
);
CREATE INDEX IF NOT EXISTS idx_events_date ON events(date_secs, date_nanos);
"#,
    select_all: r#"
SELECT id, title, subtitle, date_secs, date_nanos, image_url, video_url, dirty
FROM events
ORDER BY date_secs ASC, date_nanos ASC, id ASC
"#,
    select_by_id: r#"
SELECT id, title, subtitle, date_secs, date_nanos, image_url, video_url, dirty
FROM events
WHERE id = ?1
"#,
    upsert: r#"
INSERT INTO events (id, title, subtitle, date_secs, date_nanos, image_url, video_url, dirty)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0)
ON CONFLICT(id) DO UPDATE SET
    title = excluded.title,
    subtitle = excluded.subtitle,
    date_secs = excluded.date_secs,
    date_nanos = excluded.date_nanos,
    image_url = excluded.image_url,
    video_url = excluded.video_url,
    dirty = 0
"#,
    mark_all_dirty: "UPDATE events SET dirty = 1",
    delete_dirty: "DELETE FROM events WHERE dirty = 1",
    clear: "DELETE FROM events",
};

pub const SCHEDULE: TableSchema = TableSchema {
    name: "schedule",
    create: r#"
CREATE TABLE IF NOT EXISTS schedule (
    id INTEGER PRIMARY KEY NOT NULL,
    title TEXT NOT NULL,
    subtitle TEXT NOT NULL,
    date_secs INTEGER NOT NULL,
    date_nanos INTEGER NOT NULL,
    image_url TEXT NOT NULL,
    dirty INTEGER NOT NULL DEFAULT 0
);
CREATE INDEX IF NOT EXISTS idx_schedule_date ON schedule(date_secs, date_nanos);
"#,
    select_all: r#"
SELECT id, title, subtitle, date_secs, date_nanos, image_url, dirty
FROM schedule
ORDER BY date_secs ASC, date_nanos ASC, id ASC
"#,
    select_by_id: r#"
SELECT id, title, subtitle, date_secs, date_nanos, image_url, dirty
FROM schedule
WHERE id = ?1
"#,
    upsert: r#"
INSERT INTO schedule (id, title, subtitle, date_secs, date_nanos, image_url, dirty)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0)
ON CONFLICT(id) DO UPDATE SET
    title = excluded.title,
    subtitle = excluded.subtitle,
    date_secs = excluded.date_secs,
    date_nanos = excluded.date_nanos,
    image_url = excluded.image_url,
    dirty = 0
"#,
    mark_all_dirty: "UPDATE schedule SET dirty = 1",
    delete_dirty: "DELETE FROM schedule WHERE dirty = 1",
    clear: "DELETE FROM schedule",
};

pub const CACHE_TABLES: &[&TableSchema] = &[&EVENTS, &SCHEDULE];

pub const CREATE_SYNC_STATE: &str = r#"
CREATE TABLE IF NOT EXISTS sync_state (
    table_name TEXT PRIMARY KEY NOT NULL,
    synced_at_ms INTEGER NOT NULL
);
"#;

pub const DROP_TABLES: &str = r#"
DROP TABLE IF EXISTS events;
DROP TABLE IF EXISTS schedule;
DROP TABLE IF EXISTS sync_state;
"#;

pub const UPSERT_SYNC_STATE: &str = r#"
INSERT INTO sync_state (table_name, synced_at_ms)
VALUES (?1, ?2)
ON CONFLICT(table_name) DO UPDATE SET synced_at_ms = excluded.synced_at_ms
"#;

pub const SELECT_SYNC_STATE: &str = "SELECT synced_at_ms FROM sync_state WHERE table_name = ?1";

pub const DELETE_SYNC_STATE: &str = "DELETE FROM sync_state WHERE table_name = ?1";
