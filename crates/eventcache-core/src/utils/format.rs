use chrono::{DateTime, Local, Utc};

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// "Feb 06, 2026" in local time
pub fn format_date(date: &DateTime<Utc>) -> String {
    date.with_timezone(&Local).format("%b %d, %Y").to_string()
}

/// Compact date/time for list views: "Jan 26 5:00p", or "Jan 26 5p" on the hour
pub fn format_datetime_short(date: &DateTime<Utc>) -> String {
    let dt = date.with_timezone(&Local);
    let hour = dt.format("%I").to_string().trim_start_matches('0').to_string();
    let minute = dt.format("%M").to_string();
    let ampm = dt
        .format("%p")
        .to_string()
        .to_lowercase()
        .chars()
        .next()
        .unwrap_or('a');
    if minute == "00" {
        format!("{} {}{}", dt.format("%b %d"), hour, ampm)
    } else {
        format!("{} {}:{}{}", dt.format("%b %d"), hour, minute, ampm)
    }
}

/// Human readable age: "just now", "12m ago", "3h ago", "2d ago".
/// Hours and days round up past the half.
pub fn format_age_minutes(minutes: i64) -> String {
    if minutes < 1 {
        // Negative means clock skew
        "just now".to_string()
    } else if minutes < 60 {
        format!("{}m ago", minutes)
    } else if minutes < 1440 {
        let hours = minutes / 60;
        if minutes % 60 >= 30 {
            format!("{}h ago", hours + 1)
        } else {
            format!("{}h ago", hours)
        }
    } else {
        let days = minutes / 1440;
        if (minutes % 1440) / 60 >= 12 {
            format!("{}d ago", days + 1)
        } else {
            format!("{}d ago", days)
        }
    }
}
