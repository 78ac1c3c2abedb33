use async_trait::async_trait;

use super::{ApiError, EventDto, ScheduleDto};

/// Supplies full snapshots of the remote lists.
///
/// Each call returns everything that currently exists for that kind, or an
/// error. Partial results are never returned.
#[async_trait]
pub trait RemoteFetcher: Send + Sync {
    async fn fetch_events(&self) -> Result<Vec<EventDto>, ApiError>;

    async fn fetch_schedule(&self) -> Result<Vec<ScheduleDto>, ApiError>;
}
