//! eventcache core - offline-first cache for events and schedule.
//!
//! Reads are served from a local SQLite store. A refresh pulls a full
//! snapshot from the remote API and reconciles it into the store, so the
//! app keeps working with the last good data while offline.

pub mod api;
pub mod config;
pub mod error;
pub mod mapping;
pub mod models;
pub mod repository;
pub mod store;
pub mod utils;

pub use api::{ApiClient, ApiError, RemoteFetcher};
pub use config::Config;
pub use error::{CacheError, CacheResult, StorageError, StorageResult};
pub use models::{EntityKind, Event, Schedule};
pub use repository::{CacheRepository, CachedEntity, Stores, SyncStatus};
pub use store::{Database, EntityStore, ReconcileReport};
