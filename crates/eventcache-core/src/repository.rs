//! Cache repository - the only entry point the UI layer talks to.
//!
//! Reads always come from the local store. A refresh fetches a full snapshot
//! and reconciles it into the store; if the fetch fails the store is not
//! touched at all, so previously cached rows stay readable.
//!
//! Refreshes of the same entity kind are serialized by a per-kind guard.
//! Without it, one refresh's mark step could land after another's upsert
//! and purge rows that belong to the newer snapshot.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::{self, BoxFuture};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::api::{ApiError, EventDto, RemoteFetcher, ScheduleDto};
use crate::config::DEFAULT_STALE_AFTER_MINUTES;
use crate::error::{CacheResult, StorageError};
use crate::mapping;
use crate::models::{EntityKind, Event, Schedule};
use crate::store::{Database, EntityStore, EventRow, ReconcileReport, ScheduleRow, StoredRow};
use crate::utils::format_age_minutes;

// ============================================================================
// Entity plumbing
// ============================================================================

/// Ties a domain type to its wire shape, storage row and store.
pub trait CachedEntity: Sized + Send + 'static {
    type Wire: Send + 'static;
    type Row: StoredRow;

    const KIND: EntityKind;

    fn fetch<F: RemoteFetcher + ?Sized>(
        fetcher: &F,
    ) -> BoxFuture<'_, Result<Vec<Self::Wire>, ApiError>>;

    fn store(stores: &Stores) -> Arc<dyn EntityStore<Self::Row>>;

    fn row_from_wire(wire: Self::Wire) -> Self::Row;

    fn from_row(row: Self::Row) -> Self;
}

impl CachedEntity for Event {
    type Wire = EventDto;
    type Row = EventRow;

    const KIND: EntityKind = EntityKind::Events;

    fn fetch<F: RemoteFetcher + ?Sized>(fetcher: &F) -> BoxFuture<'_, Result<Vec<EventDto>, ApiError>> {
        fetcher.fetch_events()
    }

    fn store(stores: &Stores) -> Arc<dyn EntityStore<EventRow>> {
        Arc::clone(&stores.events)
    }

    fn row_from_wire(wire: EventDto) -> EventRow {
        mapping::event_row_from_wire(wire)
    }

    fn from_row(row: EventRow) -> Self {
        mapping::event_from_row(row)
    }
}

impl CachedEntity for Schedule {
    type Wire = ScheduleDto;
    type Row = ScheduleRow;

    const KIND: EntityKind = EntityKind::Schedule;

    fn fetch<F: RemoteFetcher + ?Sized>(
        fetcher: &F,
    ) -> BoxFuture<'_, Result<Vec<ScheduleDto>, ApiError>> {
        fetcher.fetch_schedule()
    }

    fn store(stores: &Stores) -> Arc<dyn EntityStore<ScheduleRow>> {
        Arc::clone(&stores.schedule)
    }

    fn row_from_wire(wire: ScheduleDto) -> ScheduleRow {
        mapping::schedule_row_from_wire(wire)
    }

    fn from_row(row: ScheduleRow) -> Self {
        mapping::schedule_from_row(row)
    }
}

/// The per-kind stores, injected into the repository.
#[derive(Clone)]
pub struct Stores {
    pub events: Arc<dyn EntityStore<EventRow>>,
    pub schedule: Arc<dyn EntityStore<ScheduleRow>>,
}

impl Stores {
    pub fn new(
        events: Arc<dyn EntityStore<EventRow>>,
        schedule: Arc<dyn EntityStore<ScheduleRow>>,
    ) -> Self {
        Self { events, schedule }
    }

    pub fn from_database(db: &Database) -> Self {
        Self::new(Arc::new(db.events()), Arc::new(db.schedule()))
    }
}

// ============================================================================
// Sync status
// ============================================================================

/// When a kind was last refreshed, for "updated 5m ago" style display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncStatus {
    pub kind: EntityKind,
    pub last_synced: Option<DateTime<Utc>>,
    pub stale_after_minutes: i64,
}

impl SyncStatus {
    pub fn age_minutes(&self) -> Option<i64> {
        self.last_synced
            .map(|synced| (Utc::now() - synced).num_minutes())
    }

    pub fn age_display(&self) -> String {
        match self.age_minutes() {
            Some(minutes) => format_age_minutes(minutes),
            None => "never".to_string(),
        }
    }

    /// Never synced counts as stale
    pub fn is_stale(&self) -> bool {
        match self.age_minutes() {
            Some(minutes) => minutes > self.stale_after_minutes,
            None => true,
        }
    }
}

// ============================================================================
// Repository
// ============================================================================

struct RefreshGuards {
    events: Arc<Mutex<()>>,
    schedule: Arc<Mutex<()>>,
}

impl RefreshGuards {
    fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(())),
            schedule: Arc::new(Mutex::new(())),
        }
    }

    fn for_kind(&self, kind: EntityKind) -> Arc<Mutex<()>> {
        match kind {
            EntityKind::Events => Arc::clone(&self.events),
            EntityKind::Schedule => Arc::clone(&self.schedule),
        }
    }
}

pub struct CacheRepository<F> {
    fetcher: Arc<F>,
    stores: Stores,
    guards: RefreshGuards,
    stale_after_minutes: i64,
}

impl<F: RemoteFetcher> CacheRepository<F> {
    pub fn new(fetcher: Arc<F>, stores: Stores) -> Self {
        Self {
            fetcher,
            stores,
            guards: RefreshGuards::new(),
            stale_after_minutes: DEFAULT_STALE_AFTER_MINUTES,
        }
    }

    pub fn with_stale_after(mut self, minutes: i64) -> Self {
        self.stale_after_minutes = minutes;
        self
    }

    // ===== Reads =====

    /// Cached rows of one kind, ordered by date. Never touches the network.
    pub async fn get_cached<E: CachedEntity>(&self) -> CacheResult<Vec<E>> {
        let rows = E::store(&self.stores).get_all().await?;
        Ok(rows.into_iter().map(E::from_row).collect())
    }

    pub async fn get_cached_by_id<E: CachedEntity>(&self, id: i64) -> CacheResult<Option<E>> {
        let row = E::store(&self.stores).get_by_id(id).await?;
        Ok(row.map(E::from_row))
    }

    pub async fn events(&self) -> CacheResult<Vec<Event>> {
        self.get_cached().await
    }

    pub async fn schedule(&self) -> CacheResult<Vec<Schedule>> {
        self.get_cached().await
    }

    // ===== Refresh =====

    pub async fn refresh(&self, kind: EntityKind) -> CacheResult<()> {
        match kind {
            EntityKind::Events => self.refresh_entity::<Event>().await.map(|_| ()),
            EntityKind::Schedule => self.refresh_entity::<Schedule>().await.map(|_| ()),
        }
    }

    /// Fetch a full snapshot of `E` and make it the new store contents.
    ///
    /// Dropping the returned future before the snapshot arrives abandons the
    /// refresh with the store untouched. Once reconciliation has been handed
    /// to its task it runs to completion regardless.
    pub async fn refresh_entity<E: CachedEntity>(&self) -> CacheResult<ReconcileReport> {
        let guard = self.guards.for_kind(E::KIND).lock_owned().await;

        debug!(kind = %E::KIND, "Fetching snapshot");
        let snapshot = match E::fetch(self.fetcher.as_ref()).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(kind = %E::KIND, error = %e, "Fetch failed, keeping cached rows");
                return Err(e.into());
            }
        };

        let rows: Vec<E::Row> = snapshot.into_iter().map(E::row_from_wire).collect();
        let store = E::store(&self.stores);

        // The task owns the guard so a cancelled caller cannot release it early
        let task = tokio::spawn(async move {
            let _guard = guard;
            store.reconcile(rows).await
        });
        let report = task
            .await
            .map_err(|e| StorageError::TaskFailed(e.to_string()))??;

        info!(
            kind = %E::KIND,
            written = report.written,
            purged = report.purged,
            "Cache refreshed"
        );
        Ok(report)
    }

    /// Refresh both kinds concurrently. One failing does not stop the other.
    pub async fn refresh_all(&self) -> Vec<(EntityKind, CacheResult<()>)> {
        let (events, schedule) = future::join(
            self.refresh(EntityKind::Events),
            self.refresh(EntityKind::Schedule),
        )
        .await;
        vec![(EntityKind::Events, events), (EntityKind::Schedule, schedule)]
    }

    /// Refresh only the kinds whose cache is stale or unreadable.
    pub async fn refresh_stale(&self) -> Vec<(EntityKind, CacheResult<()>)> {
        let mut stale = Vec::new();
        for kind in EntityKind::ALL {
            match self.sync_status(kind).await {
                Ok(status) if !status.is_stale() => {
                    debug!(kind = %kind, age = %status.age_display(), "Cache fresh, skipping");
                }
                Ok(_) => stale.push(kind),
                Err(e) => {
                    debug!(kind = %kind, error = %e, "Failed to read sync status, treating as stale");
                    stale.push(kind);
                }
            }
        }

        let results = future::join_all(stale.iter().map(|&kind| self.refresh(kind))).await;
        stale.into_iter().zip(results).collect()
    }

    // ===== Status / maintenance =====

    pub async fn sync_status(&self, kind: EntityKind) -> CacheResult<SyncStatus> {
        let last_synced = match kind {
            EntityKind::Events => self.stores.events.last_synced().await?,
            EntityKind::Schedule => self.stores.schedule.last_synced().await?,
        };
        Ok(SyncStatus {
            kind,
            last_synced,
            stale_after_minutes: self.stale_after_minutes,
        })
    }

    /// Wipe one kind. Waits for an in-flight refresh of that kind to finish.
    pub async fn clear(&self, kind: EntityKind) -> CacheResult<()> {
        let _guard = self.guards.for_kind(kind).lock_owned().await;
        match kind {
            EntityKind::Events => self.stores.events.clear().await?,
            EntityKind::Schedule => self.stores.schedule.clear().await?,
        }
        info!(kind = %kind, "Cache cleared");
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
