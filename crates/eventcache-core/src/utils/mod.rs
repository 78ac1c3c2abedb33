//! Utility functions for string and date formatting.

pub mod format;

pub use format::{format_age_minutes, format_date, format_datetime_short, truncate_string};
