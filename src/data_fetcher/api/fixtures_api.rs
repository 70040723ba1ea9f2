//! Origin fixtures API (API-Football v3 wire format)

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use std::fmt;
use tracing::{info, instrument};

use super::fetch_utils::fetch;
use super::http_client::create_http_client_with_timeout;
use super::urls::{build_fixtures_url, build_live_fixtures_url};
use crate::config::Config;
use crate::data_fetcher::models::{Fixture, FixturesResponse, count_live_fixtures};
use crate::error::AppError;

/// What to ask the origin for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixtureQuery {
    /// Every fixture scheduled on a date
    Date(NaiveDate),
    /// Every fixture currently in play, regardless of date
    Live,
}

impl fmt::Display for FixtureQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FixtureQuery::Date(date) => write!(f, "date={date}"),
            FixtureQuery::Live => f.write_str("live=all"),
        }
    }
}

/// Source of raw fixture lists
#[async_trait]
pub trait FixtureSource: Send + Sync + fmt::Debug {
    async fn fetch_fixtures(&self, query: FixtureQuery) -> Result<Vec<Fixture>, AppError>;
}

/// Fixture source backed by the HTTP origin
#[derive(Debug, Clone)]
pub struct HttpFixtureSource {
    client: Client,
    api_domain: String,
    api_key: Option<String>,
}

impl HttpFixtureSource {
    pub fn new(client: Client, api_domain: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client,
            api_domain: api_domain.into(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let client = create_http_client_with_timeout(config.http_timeout_seconds)?;
        Ok(Self::new(
            client,
            config.api_domain.clone(),
            config.api_key.clone(),
        ))
    }

    pub fn url_for(&self, query: FixtureQuery) -> String {
        match query {
            FixtureQuery::Date(date) => build_fixtures_url(&self.api_domain, date),
            FixtureQuery::Live => build_live_fixtures_url(&self.api_domain),
        }
    }
}

#[async_trait]
impl FixtureSource for HttpFixtureSource {
    #[instrument(skip(self), fields(query = %query))]
    async fn fetch_fixtures(&self, query: FixtureQuery) -> Result<Vec<Fixture>, AppError> {
        let url = self.url_for(query);
        let response: FixturesResponse = fetch(&self.client, &url, self.api_key.as_deref()).await?;

        // The origin answers 200 with an `errors` object for bad keys and quota exhaustion
        if let Some(message) = response.error_message() {
            return Err(AppError::api_reported_errors(message, url));
        }

        info!(
            fixtures = response.response.len(),
            live = count_live_fixtures(&response.response),
            "origin returned fixtures"
        );
        Ok(response.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::API_KEY_HEADER;
    use crate::data_fetcher::api::http_client::create_test_http_client;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fixture_json(id: i64, short: &str) -> serde_json::Value {
        json!({
            "fixture": {
                "id": id,
                "timezone": "UTC",
                "date": "2024-05-02T19:00:00+00:00",
                "timestamp": 1714676400,
                "status": {"long": "Match Finished", "short": short, "elapsed": 90}
            },
            "league": {"id": 39, "name": "Premier League", "country": "England"},
            "teams": {
                "home": {"id": 33, "name": "Manchester United", "winner": true},
                "away": {"id": 34, "name": "Newcastle", "winner": false}
            },
            "goals": {"home": 2, "away": 1},
            "score": {
                "halftime": {"home": 1, "away": 0},
                "fulltime": {"home": 2, "away": 1},
                "extratime": {"home": null, "away": null},
                "penalty": {"home": null, "away": null}
            }
        })
    }

    fn source(server: &MockServer) -> HttpFixtureSource {
        HttpFixtureSource::new(
            create_test_http_client(),
            server.uri(),
            Some("secret".to_string()),
        )
    }

    #[tokio::test]
    async fn test_fetch_by_date_sends_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/fixtures"))
            .and(query_param("date", "2024-05-02"))
            .and(header(API_KEY_HEADER, "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "errors": [],
                "results": 2,
                "response": [fixture_json(1, "FT"), fixture_json(2, "FT")]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let date = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
        let fixtures = source(&server)
            .fetch_fixtures(FixtureQuery::Date(date))
            .await
            .unwrap();
        assert_eq!(fixtures.len(), 2);
        assert_eq!(fixtures[0].id(), 1);
    }

    #[tokio::test]
    async fn test_fetch_live() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/fixtures"))
            .and(query_param("live", "all"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "errors": [],
                "results": 1,
                "response": [fixture_json(9, "2H")]
            })))
            .mount(&server)
            .await;

        let fixtures = source(&server).fetch_fixtures(FixtureQuery::Live).await.unwrap();
        assert_eq!(fixtures.len(), 1);
        assert!(fixtures[0].is_live());
    }

    #[tokio::test]
    async fn test_reported_errors_fail_the_fetch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "errors": {"token": "Error/Missing application key"},
                "results": 0,
                "response": []
            })))
            .mount(&server)
            .await;

        let err = source(&server).fetch_fixtures(FixtureQuery::Live).await.unwrap_err();
        assert!(matches!(err, AppError::ApiReportedErrors { .. }));
        assert!(err.is_origin_error());
    }

    #[tokio::test]
    async fn test_rate_limit_retries_then_surfaces() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
            .expect(u64::from(crate::constants::retry::MAX_ATTEMPTS) + 1)
            .mount(&server)
            .await;

        let err = source(&server).fetch_fixtures(FixtureQuery::Live).await.unwrap_err();
        assert!(matches!(err, AppError::ApiRateLimit { .. }));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_server_error_recovers_on_retry() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).insert_header("Retry-After", "0"))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "errors": [],
                "response": [fixture_json(3, "NS")]
            })))
            .mount(&server)
            .await;

        let fixtures = source(&server).fetch_fixtures(FixtureQuery::Live).await.unwrap();
        assert_eq!(fixtures.len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = source(&server).fetch_fixtures(FixtureQuery::Live).await.unwrap_err();
        assert!(matches!(err, AppError::ApiMalformedJson { .. }));
    }

    #[tokio::test]
    async fn test_unexpected_structure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"response": "nope"})))
            .mount(&server)
            .await;

        let err = source(&server).fetch_fixtures(FixtureQuery::Live).await.unwrap_err();
        assert!(matches!(err, AppError::ApiUnexpectedStructure { .. }));
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .expect(1)
            .mount(&server)
            .await;

        let err = source(&server).fetch_fixtures(FixtureQuery::Live).await.unwrap_err();
        assert!(matches!(err, AppError::ApiClientError { status: 403, .. }));
    }

    #[test]
    fn test_blank_api_key_is_dropped() {
        let source = HttpFixtureSource::new(
            create_test_http_client(),
            "https://api.example.com",
            Some("  ".to_string()),
        );
        assert!(source.api_key.is_none());
        assert_eq!(
            source.url_for(FixtureQuery::Live),
            "https://api.example.com/fixtures?live=all"
        );
    }
}
