//! Read path tying the cache engine together:
//! validate → day transition → freshness gate → origin → store → shape.

use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::api::{FixtureQuery, FixtureSource, HttpFixtureSource};
use super::cache::{
    CacheEntry, DayTransitionCoordinator, Decision, EntryId, FileStore, FixtureStore,
    FreshnessGate, MemoryStore, ObjectMetadata, ObjectStore, Partition, Strategy, Stream,
    resolve_date,
};
use super::models::{Fixture, FixturesPayload, ResponseSource};
use super::processors::{parse_timezone, shape_fixtures};
use crate::clock::{Clock, SystemClock};
use crate::config::{Config, StoreBackend, StoreConfig};
use crate::error::AppError;

/// Metadata flag set when an empty origin answer left the previous list in place
pub const RETAINED_ON_EMPTY_FLAG: &str = "retainedOnEmptyOrigin";

/// Opens the object store described by the `[store]` table
pub fn open_store(config: &StoreConfig) -> FixtureStore {
    let backend: Arc<dyn ObjectStore> = match config.backend {
        StoreBackend::Memory => {
            let mut store = MemoryStore::with_capacity(config.capacity);
            if let Some(limit) = config.max_value_bytes {
                store = store.with_max_value_bytes(limit);
            }
            Arc::new(store)
        }
        StoreBackend::File => {
            let mut store = FileStore::new(config.resolved_dir());
            if let Some(limit) = config.max_value_bytes {
                store = store.with_max_value_bytes(limit);
            }
            Arc::new(store)
        }
    };
    FixtureStore::for_backend(backend, config.chunk_size)
}

#[derive(Debug)]
pub struct FixtureService {
    store: FixtureStore,
    gate: Arc<FreshnessGate>,
    coordinator: DayTransitionCoordinator,
    origin: Arc<dyn FixtureSource>,
    clock: Arc<dyn Clock>,
}

impl FixtureService {
    pub fn new(store: FixtureStore, origin: Arc<dyn FixtureSource>, clock: Arc<dyn Clock>) -> Self {
        let gate = Arc::new(FreshnessGate::new(clock.clone()));
        let coordinator = DayTransitionCoordinator::new(store.clone(), gate.clone());
        Self {
            store,
            gate,
            coordinator,
            origin,
            clock,
        }
    }

    /// Service over the configured store and the HTTP origin, on the wall clock
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let origin = HttpFixtureSource::from_config(config)?;
        Ok(Self::new(
            open_store(&config.store),
            Arc::new(origin),
            Arc::new(SystemClock),
        ))
    }

    pub fn store(&self) -> &FixtureStore {
        &self.store
    }

    pub fn gate(&self) -> &FreshnessGate {
        &self.gate
    }

    /// Returns fixtures for `date` (default: the current UTC date) shaped for `timezone`.
    ///
    /// # Arguments
    /// * `date` - Optional `YYYY-MM-DD`
    /// * `timezone` - IANA timezone for local kickoff dates and times
    /// * `live` - Only matches currently in play
    ///
    /// # Errors
    /// * Validation errors for a bad date or timezone, before any store or origin access
    /// * Origin errors when a refresh was required and the origin failed; the
    ///   stored entry is left untouched
    ///
    /// Store failures never surface: a failed read counts as a miss and a
    /// failed write is logged and the fetched data returned unpersisted.
    #[instrument(skip(self))]
    pub async fn get_fixtures(
        &self,
        date: Option<&str>,
        timezone: &str,
        live: bool,
    ) -> Result<FixturesPayload, AppError> {
        let tz = parse_timezone(timezone)?;
        let today = self.clock.today();
        let date = resolve_date(date, today)
            .ok_or_else(|| AppError::invalid_date(date.unwrap_or_default()))?;

        if let Some(report) = self.coordinator.ensure_current_day(today).await
            && !report.is_clean()
        {
            warn!(
                failures = report.failures.len(),
                "day transition left work for the next sweep"
            );
        }

        let id = EntryId::new(date, live);
        let partition = Partition::for_date(date, today);
        let strategy = Strategy::select(date, live, today);
        debug!(entry = %id, partition = %partition, strategy = %strategy, "resolved request");

        let reason = match self
            .gate
            .check(&self.store, id, partition, strategy, today)
            .await
        {
            Decision::Serve(entry) => {
                return Ok(FixturesPayload {
                    data: shape_fixtures(&entry.fixtures, tz),
                    source: ResponseSource::Cache,
                });
            }
            Decision::Refresh(reason) => reason,
        };

        let query = if live {
            FixtureQuery::Live
        } else {
            FixtureQuery::Date(date)
        };
        let fixtures = self.origin.fetch_fixtures(query).await?;
        info!(
            entry = %id,
            reason = %reason,
            fixtures = fixtures.len(),
            "refreshed from origin"
        );

        let stream = Stream::for_entry(id, today);
        if fixtures.is_empty()
            && !live
            && let Some(retained) = self.retain_on_empty(id, partition, strategy, stream).await
        {
            return Ok(FixturesPayload {
                data: shape_fixtures(&retained.fixtures, tz),
                source: ResponseSource::Cache,
            });
        }

        let metadata = ObjectMetadata::new(self.clock.now(), strategy);
        self.persist(id, partition, strategy, stream, &fixtures, metadata)
            .await;

        Ok(FixturesPayload {
            data: shape_fixtures(&fixtures, tz),
            source: ResponseSource::Origin,
        })
    }

    /// Keeps a non-empty stored list when the origin answered with nothing.
    ///
    /// The list is rewritten with a fresh timestamp so the gate does not send
    /// every following request back to the origin.
    async fn retain_on_empty(
        &self,
        id: EntryId,
        partition: Partition,
        strategy: Strategy,
        stream: Stream,
    ) -> Option<CacheEntry> {
        let existing = match self.store.read(id, partition).await {
            Ok(Some(entry)) if !entry.fixtures.is_empty() => entry,
            Ok(_) => return None,
            Err(e) => {
                warn!(entry = %id, error = %e, "could not read previous entry");
                return None;
            }
        };

        info!(
            entry = %id,
            retained = existing.fixtures.len(),
            "origin returned no fixtures, keeping stored list"
        );
        let metadata =
            ObjectMetadata::new(self.clock.now(), strategy).with_flag(RETAINED_ON_EMPTY_FLAG, "true");
        self.persist(id, partition, strategy, stream, &existing.fixtures, metadata)
            .await;
        Some(existing)
    }

    async fn persist(
        &self,
        id: EntryId,
        partition: Partition,
        strategy: Strategy,
        stream: Stream,
        fixtures: &[Fixture],
        metadata: ObjectMetadata,
    ) {
        match self.store.write(id, partition, fixtures, metadata).await {
            Ok(()) => {
                // The gate only consults write times for frequently refreshed streams
                if strategy == Strategy::FrequentRefresh {
                    self.gate.record_write(stream).await;
                }
                debug!(
                    entry = %id,
                    key = %id.key_in(partition),
                    strategy = %strategy,
                    ttl_seconds = strategy.ttl_seconds(),
                    "stored fixtures"
                );
            }
            Err(e) => {
                warn!(entry = %id, error = %e, "store write failed, returning unpersisted data");
            }
        }
    }
}
