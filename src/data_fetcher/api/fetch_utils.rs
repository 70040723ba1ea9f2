//! Origin HTTP fetching with retry logic and error classification

use rand::Rng;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::error::Category;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

use crate::constants::API_KEY_HEADER;
use crate::constants::retry::{
    BASE_DELAY_MS, JITTER_FRACTION, MAX_ATTEMPTS, MAX_DELAY_SECONDS,
};
use crate::error::AppError;

/// Adds up to `JITTER_FRACTION` of random slack to a backoff delay so that
/// instances failing together do not retry in lockstep.
fn with_jitter(delay: Duration) -> Duration {
    let slack = delay.as_secs_f64() * JITTER_FRACTION;
    if slack <= 0.0 {
        return delay;
    }
    delay + Duration::from_secs_f64(rand::rng().random_range(0.0..slack))
}

/// Wait before the next attempt: the server's Retry-After when given,
/// jittered backoff otherwise, never longer than `MAX_DELAY_SECONDS`.
fn retry_wait(retry_after: Option<Duration>, backoff: Duration) -> Duration {
    retry_after
        .unwrap_or_else(|| with_jitter(backoff))
        .min(Duration::from_secs(MAX_DELAY_SECONDS))
}

/// Fetches and parses JSON from the origin.
///
/// Retries 429 and 5xx responses (honouring Retry-After up to a cap) as well
/// as timeouts and connection failures, with exponential backoff. Non-success statuses
/// map onto the matching [`AppError`] variant; bodies that do not parse are
/// split into malformed JSON and unexpected structure.
///
/// # Arguments
/// * `client` - HTTP client for making requests
/// * `url` - URL to fetch data from
/// * `api_key` - Sent in the origin's key header when present
#[instrument(skip(client, api_key))]
pub(super) async fn fetch<T: DeserializeOwned>(
    client: &Client,
    url: &str,
    api_key: Option<&str>,
) -> Result<T, AppError> {
    info!(url, "origin call");

    let mut attempt = 0u32;
    let mut backoff = Duration::from_millis(BASE_DELAY_MS);
    let response = loop {
        let mut request = client.get(url);
        if let Some(key) = api_key {
            request = request.header(API_KEY_HEADER, key);
        }

        match request.send().await {
            Ok(resp) => {
                let status = resp.status();
                if (status.as_u16() == 429 || status.is_server_error()) && attempt < MAX_ATTEMPTS {
                    let retry_after = resp
                        .headers()
                        .get(reqwest::header::RETRY_AFTER)
                        .and_then(|h| h.to_str().ok())
                        .and_then(|s| s.trim().parse::<u64>().ok())
                        .map(Duration::from_secs);
                    let wait = retry_wait(retry_after, backoff);
                    warn!(
                        "Transient {} from {}. Retrying in {:?} (attempt {}/{})",
                        status,
                        url,
                        wait,
                        attempt + 1,
                        MAX_ATTEMPTS
                    );
                    tokio::time::sleep(wait).await;
                    attempt += 1;
                    backoff = backoff.saturating_mul(2);
                    continue;
                }
                break resp;
            }
            Err(e) => {
                if (e.is_timeout() || e.is_connect()) && attempt < MAX_ATTEMPTS {
                    let wait = retry_wait(None, backoff);
                    warn!(
                        "Request error {} for {}. Retrying in {:?} (attempt {}/{})",
                        e,
                        url,
                        wait,
                        attempt + 1,
                        MAX_ATTEMPTS
                    );
                    tokio::time::sleep(wait).await;
                    attempt += 1;
                    backoff = backoff.saturating_mul(2);
                    continue;
                }
                error!("Request failed for URL {}: {}", url, e);
                return if e.is_timeout() {
                    Err(AppError::network_timeout(url))
                } else if e.is_connect() {
                    Err(AppError::network_connection(url, e.to_string()))
                } else {
                    Err(AppError::ApiFetch(e))
                };
            }
        }
    };

    let status = response.status();
    debug!("Response status: {status}");

    if !status.is_success() {
        let status_code = status.as_u16();
        let reason = status.canonical_reason().unwrap_or("Unknown error");

        error!("HTTP {} - {} (URL: {})", status_code, reason, url);

        return Err(match status_code {
            429 => AppError::api_rate_limit(reason, url),
            400..=499 => AppError::api_client_error(status_code, reason, url),
            502 | 503 => AppError::api_service_unavailable(status_code, reason, url),
            _ => AppError::api_server_error(status_code, reason, url),
        });
    }

    let response_text = match response.text().await {
        Ok(text) => text,
        Err(e) => {
            error!("Failed to read response text from URL {}: {}", url, e);
            return Err(AppError::ApiFetch(e));
        }
    };

    debug!("Response length: {} bytes", response_text.len());

    match serde_json::from_str::<T>(&response_text) {
        Ok(parsed) => Ok(parsed),
        Err(e) => {
            error!("Failed to parse API response: {} (URL: {})", e, url);
            if response_text.trim().is_empty() {
                Err(AppError::api_malformed_json("Response body is empty", url))
            } else if e.classify() == Category::Data {
                Err(AppError::api_unexpected_structure(e.to_string(), url))
            } else {
                Err(AppError::api_malformed_json(e.to_string(), url))
            }
        }
    }
}
