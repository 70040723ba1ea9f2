pub mod chunked;
pub mod day_transition;
pub mod file_store;
pub mod fixture_store;
pub mod freshness;
pub mod memory_store;
pub mod partition;
pub mod store;
pub mod strategy;
pub mod types;

pub use day_transition::{
    DayTransitionCoordinator, Pass, TransitionAction, TransitionFailure, TransitionReport,
};
pub use file_store::FileStore;
pub use fixture_store::{FixtureStore, Layout};
pub use freshness::{Decision, FreshnessGate, FreshnessState, RefreshReason, Stream};
pub use memory_store::MemoryStore;
pub use partition::{EntryId, Partition, build_key, parse_date, resolve_date};
pub use store::{ObjectMetadata, ObjectStore, StoredObject};
pub use strategy::Strategy;
pub use types::{CacheEntry, ChunkMeta, StoredRecord};
