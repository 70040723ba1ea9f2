pub mod api;
pub mod cache;
pub mod models;
pub mod processors;
pub mod service;

pub use api::{FixtureQuery, FixtureSource, HttpFixtureSource};
pub use models::{Fixture, FixturesPayload, FormattedCountry, ResponseSource};
pub use service::{FixtureService, open_store};
