//! Football fixture cache
//!
//! Caches fixture lists from a rate-limited origin API in a partitioned
//! object store (`historical/`, `today/`, `future/` relative to the current
//! UTC day), decides per request whether the stored copy is fresh enough to
//! serve, moves entries between partitions when the day rolls over, and
//! shapes the result into countries and leagues for any timezone.
//!
//! # Examples
//!
//! ```rust,no_run
//! use fixture_cache::config::Config;
//! use fixture_cache::data_fetcher::FixtureService;
//! use fixture_cache::error::AppError;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), AppError> {
//!     let config = Config::load().await?;
//!     let service = FixtureService::from_config(&config)?;
//!
//!     let payload = service
//!         .get_fixtures(Some("2024-05-02"), "Europe/London", false)
//!         .await?;
//!     println!("{} matches from {:?}", payload.match_count(), payload.source);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod clock;
pub mod commands;
pub mod config;
pub mod constants;
pub mod data_fetcher;
pub mod error;
pub mod logging;
pub mod testing_utils;

// Re-export commonly used types for convenience
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;
pub use data_fetcher::cache::{
    DayTransitionCoordinator, FileStore, FixtureStore, FreshnessGate, MemoryStore, ObjectStore,
    Partition, Strategy, TransitionReport,
};
pub use data_fetcher::{FixtureService, FixturesPayload, ResponseSource};
pub use error::AppError;

/// Current version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
