mod fetch_utils;
pub mod fixtures_api;
pub mod http_client;
pub mod urls;

pub use fixtures_api::{FixtureQuery, FixtureSource, HttpFixtureSource};
pub use http_client::create_http_client_with_timeout;
pub use urls::{build_fixtures_url, build_live_fixtures_url};
