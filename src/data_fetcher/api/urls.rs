//! URL building for origin endpoints

use chrono::NaiveDate;

use crate::constants::FIXTURES_RESOURCE;

/// Builds the URL listing every fixture on one date.
///
/// # Example
/// ```
/// use chrono::NaiveDate;
/// use fixture_cache::data_fetcher::api::build_fixtures_url;
///
/// let date = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
/// let url = build_fixtures_url("https://api.example.com", date);
/// assert_eq!(url, "https://api.example.com/fixtures?date=2024-05-02");
/// ```
pub fn build_fixtures_url(api_domain: &str, date: NaiveDate) -> String {
    format!(
        "{}/{FIXTURES_RESOURCE}?date={}",
        api_domain.trim_end_matches('/'),
        date.format("%Y-%m-%d")
    )
}

/// Builds the URL listing every fixture currently in play.
///
/// # Example
/// ```
/// use fixture_cache::data_fetcher::api::build_live_fixtures_url;
///
/// let url = build_live_fixtures_url("https://api.example.com/");
/// assert_eq!(url, "https://api.example.com/fixtures?live=all");
/// ```
pub fn build_live_fixtures_url(api_domain: &str) -> String {
    format!("{}/{FIXTURES_RESOURCE}?live=all", api_domain.trim_end_matches('/'))
}
