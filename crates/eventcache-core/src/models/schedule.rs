use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::{format_date, format_datetime_short};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub id: i64,
    pub title: String,
    pub subtitle: String,
    pub date: DateTime<Utc>,
    pub image_url: String,
}

impl Schedule {
    pub fn formatted_date(&self) -> String {
        format_date(&self.date)
    }

    pub fn formatted_datetime_short(&self) -> String {
        format_datetime_short(&self.date)
    }

    /// Whether this entry falls on the same local calendar day as `other`
    pub fn same_day_as(&self, other: &Schedule) -> bool {
        self.formatted_date() == other.formatted_date()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn entry(id: i64, date: DateTime<Utc>) -> Schedule {
        Schedule {
            id,
            title: format!("slot {id}"),
            subtitle: String::new(),
            date,
            image_url: String::new(),
        }
    }

    #[test]
    fn test_same_day_as() {
        let morning = entry(1, Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap());
        let later = entry(2, morning.date + Duration::minutes(30));
        let next_week = entry(3, morning.date + Duration::days(7));

        assert!(morning.same_day_as(&later));
        assert!(!morning.same_day_as(&next_week));
    }

    #[test]
    fn test_formatted_date_includes_year() {
        let e = entry(1, Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap());
        assert!(e.formatted_date().ends_with("2026"));
    }
}
