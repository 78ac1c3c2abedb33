//! Plain-text rendering of cached rows and sync status.

use eventcache_core::utils::truncate_string;
use eventcache_core::{Event, Schedule, SyncStatus};

const TITLE_WIDTH: usize = 36;
const SUBTITLE_WIDTH: usize = 28;

fn row_line(date: &str, id: i64, title: &str, subtitle: &str, marker: &str) -> String {
    format!(
        "  {:<13} {:>6}  {:<tw$} {:<sw$}{}",
        date,
        id,
        truncate_string(title, TITLE_WIDTH),
        truncate_string(subtitle, SUBTITLE_WIDTH),
        marker,
        tw = TITLE_WIDTH,
        sw = SUBTITLE_WIDTH,
    )
    .trim_end()
    .to_string()
}

pub fn event_line(event: &Event) -> String {
    let marker = if event.has_video() { " [video]" } else { "" };
    row_line(
        &event.formatted_datetime_short(),
        event.id,
        &event.title,
        &event.subtitle,
        marker,
    )
}

pub fn schedule_line(entry: &Schedule) -> String {
    row_line(
        &entry.formatted_datetime_short(),
        entry.id,
        &entry.title,
        &entry.subtitle,
        "",
    )
}

/// Rows are already date-ordered, so a new header starts whenever the day changes.
fn grouped_by_day<T>(
    items: &[T],
    same_day: impl Fn(&T, &T) -> bool,
    header: impl Fn(&T) -> String,
    line: impl Fn(&T) -> String,
) -> Vec<String> {
    let mut lines = Vec::new();
    let mut previous: Option<&T> = None;
    for item in items {
        if !previous.is_some_and(|p| same_day(p, item)) {
            lines.push(header(item));
        }
        lines.push(line(item));
        previous = Some(item);
    }
    lines
}

pub fn event_lines(events: &[Event]) -> Vec<String> {
    grouped_by_day(events, Event::same_day_as, Event::formatted_date, event_line)
}

pub fn schedule_lines(entries: &[Schedule]) -> Vec<String> {
    grouped_by_day(
        entries,
        Schedule::same_day_as,
        Schedule::formatted_date,
        schedule_line,
    )
}

pub fn status_line(status: &SyncStatus) -> String {
    let state = if status.is_stale() { "stale" } else { "fresh" };
    format!("{:<9} {:<10} {}", status.kind, status.age_display(), state)
}

pub fn print_events(events: &[Event]) {
    if events.is_empty() {
        println!("No cached events. Run `eventcache refresh events`.");
        return;
    }
    for line in event_lines(events) {
        println!("{}", line);
    }
}

pub fn print_schedule(entries: &[Schedule]) {
    if entries.is_empty() {
        println!("No cached schedule. Run `eventcache refresh schedule`.");
        return;
    }
    for line in schedule_lines(entries) {
        println!("{}", line);
    }
}

pub fn print_status(status: &SyncStatus) {
    println!("{}", status_line(status));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use eventcache_core::EntityKind;

    fn event(title: &str, video_url: &str) -> Event {
        Event {
            id: 42,
            title: title.to_string(),
            subtitle: "Hall B".to_string(),
            date: Utc::now(),
            image_url: String::new(),
            video_url: video_url.to_string(),
        }
    }

    fn entry(id: i64, minutes: i64) -> Schedule {
        Schedule {
            id,
            title: format!("slot {id}"),
            subtitle: String::new(),
            date: Utc.with_ymd_and_hms(2026, 4, 1, 12, 0, 0).unwrap() + Duration::minutes(minutes),
            image_url: String::new(),
        }
    }

    #[test]
    fn test_event_line_marks_video() {
        assert!(event_line(&event("Keynote", "https://v.example.com/1")).ends_with("[video]"));
        assert!(!event_line(&event("Keynote", "")).contains("[video]"));
    }

    #[test]
    fn test_long_title_truncated() {
        let line = event_line(&event(&"x".repeat(100), ""));
        assert!(!line.contains(&"x".repeat(TITLE_WIDTH + 1)));
        assert!(line.contains("42"));
    }

    #[test]
    fn test_schedule_grouped_under_day_headers() {
        let entries = vec![entry(1, 0), entry(2, 1), entry(3, 48 * 60)];

        let lines = schedule_lines(&entries);

        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], entries[0].formatted_date());
        assert!(lines[1].contains("slot 1"));
        assert!(lines[2].contains("slot 2"));
        assert_eq!(lines[3], entries[2].formatted_date());
        assert!(lines[4].contains("slot 3"));
    }

    #[test]
    fn test_single_event_gets_one_header() {
        let lines = event_lines(&[event("Keynote", "")]);
        assert_eq!(lines.len(), 2);
        assert!(!lines[0].starts_with(' '));
        assert!(lines[1].starts_with("  "));
    }

    #[test]
    fn test_status_line_never_synced() {
        let status = SyncStatus {
            kind: EntityKind::Events,
            last_synced: None,
            stale_after_minutes: 60,
        };
        let line = status_line(&status);
        assert!(line.starts_with("events"));
        assert!(line.contains("never"));
        assert!(line.ends_with("stale"));
    }
}
