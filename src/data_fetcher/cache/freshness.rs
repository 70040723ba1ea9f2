//! Freshness gate: decides whether a read may be served from the store or
//! must go to the origin.
//!
//! The state is per instance and never persisted. A fresh process knows of
//! no writes, so its first read of every frequently refreshed stream goes to
//! the origin.

use chrono::NaiveDate;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::fixture_store::FixtureStore;
use super::partition::{EntryId, Partition};
use super::strategy::Strategy;
use super::types::CacheEntry;
use crate::clock::Clock;
use crate::constants::cache_ttl::STALE_METADATA_MULTIPLIER;

/// Logical stream whose last write is tracked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stream {
    Live,
    Today,
    /// Another date inside the frequent-refresh window
    Date(NaiveDate),
}

impl Stream {
    pub fn for_entry(id: EntryId, today: NaiveDate) -> Self {
        if id.is_live {
            Stream::Live
        } else if id.date == today {
            Stream::Today
        } else {
            Stream::Date(id.date)
        }
    }
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stream::Live => f.write_str("live"),
            Stream::Today => f.write_str("today"),
            Stream::Date(date) => write!(f, "date:{date}"),
        }
    }
}

/// In-process freshness bookkeeping
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FreshnessState {
    last_write_at: HashMap<Stream, i64>,
    current_day: Option<NaiveDate>,
}

impl FreshnessState {
    /// Epoch milliseconds of the last successful write, 0 when none
    pub fn last_write_at(&self, stream: Stream) -> i64 {
        self.last_write_at.get(&stream).copied().unwrap_or(0)
    }

    pub fn current_day(&self) -> Option<NaiveDate> {
        self.current_day
    }

    fn reset(&mut self) {
        self.last_write_at.clear();
    }
}

/// Why a read has to go to the origin
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshReason {
    /// No write recorded in this process
    NeverWritten,
    /// Last in-process write is older than the TTL
    Expired { age_ms: i64 },
    /// Nothing stored
    Miss,
    /// Stored entry's own timestamp is too old
    MetadataStale { age_seconds: u64 },
    /// Store could not be read
    StoreError(String),
}

impl fmt::Display for RefreshReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefreshReason::NeverWritten => f.write_str("never_written"),
            RefreshReason::Expired { .. } => f.write_str("expired"),
            RefreshReason::Miss => f.write_str("miss"),
            RefreshReason::MetadataStale { .. } => f.write_str("metadata_stale"),
            RefreshReason::StoreError(_) => f.write_str("store_error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    Serve(CacheEntry),
    Refresh(RefreshReason),
}

impl Decision {
    pub fn is_refresh(&self) -> bool {
        matches!(self, Decision::Refresh(_))
    }
}

#[derive(Debug)]
pub struct FreshnessGate {
    state: RwLock<FreshnessState>,
    clock: Arc<dyn Clock>,
}

impl FreshnessGate {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: RwLock::new(FreshnessState::default()),
            clock,
        }
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub async fn snapshot(&self) -> FreshnessState {
        self.state.read().await.clone()
    }

    pub async fn current_day(&self) -> Option<NaiveDate> {
        self.state.read().await.current_day
    }

    /// Forgets every recorded write
    pub async fn reset(&self) {
        self.state.write().await.reset();
    }

    pub async fn advance_day(&self, day: NaiveDate) {
        self.state.write().await.current_day = Some(day);
    }

    pub async fn record_write(&self, stream: Stream) {
        let now = self.clock.now_millis();
        self.state.write().await.last_write_at.insert(stream, now);
        debug!(stream = %stream, last_write_at = now, "recorded write");
    }

    /// Decides between serving `id` from `partition` and refetching it.
    pub async fn check(
        &self,
        store: &FixtureStore,
        id: EntryId,
        partition: Partition,
        strategy: Strategy,
        today: NaiveDate,
    ) -> Decision {
        let ttl_seconds = strategy.ttl_seconds();
        let stream = Stream::for_entry(id, today);

        if strategy == Strategy::FrequentRefresh {
            let last = self.state.read().await.last_write_at(stream);
            let now = self.clock.now_millis();
            if last == 0 {
                return self.refresh(id, stream, RefreshReason::NeverWritten);
            }
            let age_ms = now - last;
            if age_ms > (ttl_seconds as i64) * 1000 {
                return self.refresh(id, stream, RefreshReason::Expired { age_ms });
            }
        }

        let entry = match store.read(id, partition).await {
            Ok(Some(entry)) => entry,
            Ok(None) => return self.refresh(id, stream, RefreshReason::Miss),
            Err(e) => {
                warn!(entry = %id, partition = %partition, error = %e, "store read failed");
                return self.refresh(id, stream, RefreshReason::StoreError(e.to_string()));
            }
        };

        let age_seconds = entry.metadata.age_seconds(self.clock.now());
        let max_age = match strategy {
            Strategy::FrequentRefresh => ttl_seconds * STALE_METADATA_MULTIPLIER,
            Strategy::Standard | Strategy::LongTerm => ttl_seconds,
        };
        if age_seconds > max_age {
            return self.refresh(id, stream, RefreshReason::MetadataStale { age_seconds });
        }

        debug!(
            entry = %id,
            key = %entry.key,
            strategy = %strategy,
            age_seconds,
            "serving from store"
        );
        Decision::Serve(entry)
    }

    fn refresh(&self, id: EntryId, stream: Stream, reason: RefreshReason) -> Decision {
        info!(entry = %id, stream = %stream, reason = %reason, "force refresh");
        Decision::Refresh(reason)
    }
}
