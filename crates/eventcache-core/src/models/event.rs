use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::{format_date, format_datetime_short};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub subtitle: String,
    pub date: DateTime<Utc>,
    pub image_url: String,
    pub video_url: String,
}

impl Event {
    pub fn formatted_date(&self) -> String {
        format_date(&self.date)
    }

    /// Compact date/time for list view: "Jan 26 5:00p"
    pub fn formatted_datetime_short(&self) -> String {
        format_datetime_short(&self.date)
    }

    /// Some events are announced before a recording exists
    pub fn has_video(&self) -> bool {
        !self.video_url.trim().is_empty()
    }

    /// Whether this event falls on the same local calendar day as `other`
    pub fn same_day_as(&self, other: &Event) -> bool {
        self.formatted_date() == other.formatted_date()
    }
}
