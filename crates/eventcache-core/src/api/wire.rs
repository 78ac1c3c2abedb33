//! JSON shapes as served by the events API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDto {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    pub date: DateTime<Utc>,
    #[serde(rename = "imageUrl", default)]
    pub image_url: String,
    #[serde(rename = "videoUrl", default)]
    pub video_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleDto {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    pub date: DateTime<Utc>,
    #[serde(rename = "imageUrl", default)]
    pub image_url: String,
}

/// Snapshot endpoints answer with a bare array or with `{"data": [...]}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum SnapshotBody<T> {
    Bare(Vec<T>),
    Wrapped { data: Vec<T> },
}

impl<T> SnapshotBody<T> {
    pub(crate) fn into_items(self) -> Vec<T> {
        match self {
            SnapshotBody::Bare(items) => items,
            SnapshotBody::Wrapped { data } => data,
        }
    }
}
