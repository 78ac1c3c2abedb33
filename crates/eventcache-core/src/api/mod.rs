//! Remote side of the cache: the fetcher contract and its HTTP implementation.
//!
//! A fetch always returns the complete current set for one entity kind.
//! There are no pages, sync tokens or ETags.

pub mod client;
pub mod error;
pub mod fetcher;
pub mod wire;

pub use client::ApiClient;
pub use error::ApiError;
pub use fetcher::RemoteFetcher;
pub use wire::{EventDto, ScheduleDto};
