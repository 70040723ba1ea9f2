//! Application-wide constants and configuration values
//!
//! This module centralizes all magic numbers and configuration constants
//! to improve maintainability and make the codebase more configurable.

/// Default timeout for HTTP requests in seconds
pub const DEFAULT_HTTP_TIMEOUT_SECONDS: u64 = 30;

/// Maximum number of connections per host in the HTTP client pool
pub const HTTP_POOL_MAX_IDLE_PER_HOST: usize = 100;

/// Default origin API domain (API-Football v3)
pub const DEFAULT_API_DOMAIN: &str = "https://v3.football.api-sports.io";

/// Header carrying the origin API key
pub const API_KEY_HEADER: &str = "x-apisports-key";

/// Resource segment used in storage keys
pub const FIXTURES_RESOURCE: &str = "fixtures";

/// Cache TTL (Time To Live) values in seconds
pub mod cache_ttl {
    /// TTL for live data and the yesterday/today/tomorrow window
    pub const FREQUENT_REFRESH_SECONDS: u64 = 15;

    /// TTL for dates after the three-day window
    pub const STANDARD_SECONDS: u64 = 3600;

    /// TTL for dates before the three-day window. Finished matches rarely
    /// change, but postponements and score corrections still happen.
    pub const LONG_TERM_SECONDS: u64 = 3600;

    /// A stored entry older than this many TTLs is refetched even when the
    /// in-memory clock says it is fresh.
    pub const STALE_METADATA_MULTIPLIER: u64 = 3;
}

/// Chunked payload layout
pub mod chunking {
    /// Records per chunk
    pub const DEFAULT_CHUNK_SIZE: usize = 500;

    /// Suffix of the meta record key
    pub const META_SUFFIX: &str = ":meta";

    /// Prefix of a chunk key suffix, followed by the chunk index
    pub const CHUNK_SUFFIX: &str = ":chunk:";
}

/// Object store defaults
pub mod store {
    /// Entry capacity of the in-memory store before LRU eviction
    pub const MEMORY_STORE_CAPACITY: usize = 1024;

    /// File extension used by the file store for stored envelopes
    pub const FILE_STORE_EXTENSION: &str = "entry";
}

/// Names used when a fixture lacks league or country data
pub mod buckets {
    /// Country name for fixtures without a country
    pub const UNKNOWN_COUNTRY: &str = "Other";

    /// League name for fixtures without a league name
    pub const UNKNOWN_LEAGUE: &str = "Other";

    /// League id for fixtures without a league id
    pub const UNKNOWN_LEAGUE_ID: i64 = 0;
}

/// Environment variable names
pub mod env_vars {
    /// Environment variable for API domain override
    pub const API_DOMAIN: &str = "FIXTURE_CACHE_API_DOMAIN";

    /// Environment variable for API key override
    pub const API_KEY: &str = "FIXTURE_CACHE_API_KEY";

    /// Environment variable for log file path override
    pub const LOG_FILE: &str = "FIXTURE_CACHE_LOG_FILE";

    /// Environment variable for HTTP timeout override in seconds
    pub const HTTP_TIMEOUT: &str = "FIXTURE_CACHE_HTTP_TIMEOUT";

    /// Environment variable for file store directory override
    pub const STORE_DIR: &str = "FIXTURE_CACHE_STORE_DIR";
}

/// Retry configuration
pub mod retry {
    /// Maximum number of retry attempts for API calls
    pub const MAX_ATTEMPTS: u32 = 3;

    /// Base delay for exponential backoff (milliseconds)
    pub const BASE_DELAY_MS: u64 = 250;

    /// Jitter applied to each backoff delay (+/- fraction)
    pub const JITTER_FRACTION: f64 = 0.2;

    /// Upper bound on any single wait between attempts, including a
    /// server-supplied Retry-After (seconds)
    pub const MAX_DELAY_SECONDS: u64 = 60;

    /// Retry delay for rate limit errors (seconds)
    pub const RATE_LIMIT_DELAY_SECONDS: u64 = 60;

    /// Retry delay for server errors (seconds)
    pub const SERVER_ERROR_DELAY_SECONDS: u64 = 5;

    /// Retry delay for service unavailable errors (seconds)
    pub const SERVICE_UNAVAILABLE_DELAY_SECONDS: u64 = 30;

    /// Retry delay for network timeout errors (seconds)
    pub const NETWORK_TIMEOUT_DELAY_SECONDS: u64 = 2;

    /// Retry delay for network connection errors (seconds)
    pub const NETWORK_CONNECTION_DELAY_SECONDS: u64 = 10;
}
