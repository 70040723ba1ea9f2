use thiserror::Error;

use crate::constants::retry;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Failed to fetch data from origin API: {0}")]
    ApiFetch(#[from] reqwest::Error),

    #[error("Failed to parse JSON: {0}")]
    ApiParse(#[from] serde_json::Error),

    // Origin HTTP status errors
    #[error("Origin API server error ({status}): {message} (URL: {url})")]
    ApiServerError {
        status: u16,
        message: String,
        url: String,
    },

    #[error("Origin API client error ({status}): {message} (URL: {url})")]
    ApiClientError {
        status: u16,
        message: String,
        url: String,
    },

    #[error("Origin API rate limit exceeded (429): {message} (URL: {url})")]
    ApiRateLimit { message: String, url: String },

    #[error("Origin API service unavailable ({status}): {message} (URL: {url})")]
    ApiServiceUnavailable {
        status: u16,
        message: String,
        url: String,
    },

    // Network-specific errors
    #[error("Network timeout while fetching data from: {url}")]
    NetworkTimeout { url: String },

    #[error("Connection failed to: {url} - {message}")]
    NetworkConnection { url: String, message: String },

    // Origin payload errors
    #[error("Origin API returned malformed JSON: {message} (URL: {url})")]
    ApiMalformedJson { message: String, url: String },

    #[error("Origin API returned unexpected data structure: {message} (URL: {url})")]
    ApiUnexpectedStructure { message: String, url: String },

    #[error("Origin API reported errors: {message} (URL: {url})")]
    ApiReportedErrors { message: String, url: String },

    // Object store errors
    #[error("Store read failed for key {key}: {message}")]
    StoreRead { key: String, message: String },

    #[error("Store write failed for key {key}: {message}")]
    StoreWrite { key: String, message: String },

    #[error("Store move failed from {from} to {to}: {message}")]
    StoreMove {
        from: String,
        to: String,
        message: String,
    },

    #[error("Value for key {key} is {size} bytes, above the store limit of {limit} bytes")]
    StoreValueTooLarge {
        key: String,
        size: usize,
        limit: usize,
    },

    // Caller input errors
    #[error("Invalid date '{value}': expected YYYY-MM-DD")]
    InvalidDate { value: String },

    #[error("Invalid timezone: {value}")]
    InvalidTimezone { value: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDeserialize(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Log setup error: {0}")]
    LogSetup(String),
}

impl AppError {
    /// Create a configuration error with context
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a log setup error with context
    pub fn log_setup_error(msg: impl Into<String>) -> Self {
        Self::LogSetup(msg.into())
    }

    /// Create an API server error (5xx status codes)
    pub fn api_server_error(
        status: u16,
        message: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self::ApiServerError {
            status,
            message: message.into(),
            url: url.into(),
        }
    }

    /// Create an API client error (4xx status codes except 429)
    pub fn api_client_error(
        status: u16,
        message: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self::ApiClientError {
            status,
            message: message.into(),
            url: url.into(),
        }
    }

    /// Create an API rate limit error
    pub fn api_rate_limit(message: impl Into<String>, url: impl Into<String>) -> Self {
        Self::ApiRateLimit {
            message: message.into(),
            url: url.into(),
        }
    }

    /// Create an API service unavailable error
    pub fn api_service_unavailable(
        status: u16,
        message: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self::ApiServiceUnavailable {
            status,
            message: message.into(),
            url: url.into(),
        }
    }

    /// Create a network timeout error
    pub fn network_timeout(url: impl Into<String>) -> Self {
        Self::NetworkTimeout { url: url.into() }
    }

    /// Create a network connection error
    pub fn network_connection(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NetworkConnection {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create a malformed JSON error
    pub fn api_malformed_json(message: impl Into<String>, url: impl Into<String>) -> Self {
        Self::ApiMalformedJson {
            message: message.into(),
            url: url.into(),
        }
    }

    /// Create an unexpected data structure error
    pub fn api_unexpected_structure(message: impl Into<String>, url: impl Into<String>) -> Self {
        Self::ApiUnexpectedStructure {
            message: message.into(),
            url: url.into(),
        }
    }

    /// Create an error for an origin response that carries an `errors` object
    pub fn api_reported_errors(message: impl Into<String>, url: impl Into<String>) -> Self {
        Self::ApiReportedErrors {
            message: message.into(),
            url: url.into(),
        }
    }

    pub fn store_read(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::StoreRead {
            key: key.into(),
            message: message.into(),
        }
    }

    pub fn store_write(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::StoreWrite {
            key: key.into(),
            message: message.into(),
        }
    }

    pub fn store_move(
        from: impl Into<String>,
        to: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::StoreMove {
            from: from.into(),
            to: to.into(),
            message: message.into(),
        }
    }

    pub fn store_value_too_large(key: impl Into<String>, size: usize, limit: usize) -> Self {
        Self::StoreValueTooLarge {
            key: key.into(),
            size,
            limit,
        }
    }

    pub fn invalid_date(value: impl Into<String>) -> Self {
        Self::InvalidDate {
            value: value.into(),
        }
    }

    pub fn invalid_timezone(value: impl Into<String>) -> Self {
        Self::InvalidTimezone {
            value: value.into(),
        }
    }

    /// Check if error is retryable (network issues, server errors, rate limits)
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AppError::NetworkTimeout { .. }
                | AppError::NetworkConnection { .. }
                | AppError::ApiServerError { .. }
                | AppError::ApiServiceUnavailable { .. }
                | AppError::ApiRateLimit { .. }
        )
    }

    /// Get suggested retry delay in seconds based on error type
    pub fn retry_delay_seconds(&self) -> Option<u64> {
        match self {
            AppError::ApiRateLimit { .. } => Some(retry::RATE_LIMIT_DELAY_SECONDS),
            AppError::ApiServerError { .. } => Some(retry::SERVER_ERROR_DELAY_SECONDS),
            AppError::ApiServiceUnavailable { .. } => {
                Some(retry::SERVICE_UNAVAILABLE_DELAY_SECONDS)
            }
            AppError::NetworkTimeout { .. } => Some(retry::NETWORK_TIMEOUT_DELAY_SECONDS),
            AppError::NetworkConnection { .. } => Some(retry::NETWORK_CONNECTION_DELAY_SECONDS),
            _ => None,
        }
    }

    /// True for failures of the origin fixtures API: rate limiting,
    /// transport problems and malformed responses.
    pub fn is_origin_error(&self) -> bool {
        matches!(
            self,
            AppError::ApiFetch(_)
                | AppError::ApiServerError { .. }
                | AppError::ApiClientError { .. }
                | AppError::ApiRateLimit { .. }
                | AppError::ApiServiceUnavailable { .. }
                | AppError::NetworkTimeout { .. }
                | AppError::NetworkConnection { .. }
                | AppError::ApiMalformedJson { .. }
                | AppError::ApiUnexpectedStructure { .. }
                | AppError::ApiReportedErrors { .. }
        )
    }

    /// True for object store failures
    pub fn is_store_error(&self) -> bool {
        matches!(
            self,
            AppError::StoreRead { .. }
                | AppError::StoreWrite { .. }
                | AppError::StoreMove { .. }
                | AppError::StoreValueTooLarge { .. }
        )
    }

    /// True for bad caller input, which is reported without touching the cache
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            AppError::InvalidDate { .. } | AppError::InvalidTimezone { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_helper() {
        let error = AppError::config_error("Invalid configuration");
        assert!(matches!(error, AppError::Config(_)));
        assert_eq!(
            error.to_string(),
            "Configuration error: Invalid configuration"
        );
    }

    #[test]
    fn test_api_rate_limit_helper() {
        let error = AppError::api_rate_limit("Too many requests", "https://api.example.com");
        assert!(matches!(error, AppError::ApiRateLimit { .. }));
        assert_eq!(
            error.to_string(),
            "Origin API rate limit exceeded (429): Too many requests (URL: https://api.example.com)"
        );
    }

    #[test]
    fn test_store_helpers_display() {
        assert_eq!(
            AppError::store_read("today/fixtures-2024-05-02.json", "timeout").to_string(),
            "Store read failed for key today/fixtures-2024-05-02.json: timeout"
        );
        assert_eq!(
            AppError::store_move("future/a", "today/a", "delete failed").to_string(),
            "Store move failed from future/a to today/a: delete failed"
        );
        assert_eq!(
            AppError::store_value_too_large("k", 2048, 1024).to_string(),
            "Value for key k is 2048 bytes, above the store limit of 1024 bytes"
        );
    }

    #[test]
    fn test_validation_helpers_display() {
        assert_eq!(
            AppError::invalid_date("2024/05/01").to_string(),
            "Invalid date '2024/05/01': expected YYYY-MM-DD"
        );
        assert_eq!(
            AppError::invalid_timezone("Mars/Olympus").to_string(),
            "Invalid timezone: Mars/Olympus"
        );
    }

    #[test]
    fn test_is_retryable() {
        assert!(AppError::network_timeout("url").is_retryable());
        assert!(AppError::network_connection("url", "message").is_retryable());
        assert!(AppError::api_server_error(500, "message", "url").is_retryable());
        assert!(AppError::api_rate_limit("message", "url").is_retryable());
        assert!(AppError::api_service_unavailable(503, "message", "url").is_retryable());

        assert!(!AppError::api_client_error(400, "message", "url").is_retryable());
        assert!(!AppError::config_error("message").is_retryable());
        assert!(!AppError::api_malformed_json("message", "url").is_retryable());
        assert!(!AppError::store_write("key", "message").is_retryable());
    }

    #[test]
    fn test_retry_delay_seconds_uses_constants() {
        assert_eq!(
            AppError::api_rate_limit("rate limit", "url").retry_delay_seconds(),
            Some(retry::RATE_LIMIT_DELAY_SECONDS)
        );
        assert_eq!(
            AppError::api_server_error(500, "server error", "url").retry_delay_seconds(),
            Some(retry::SERVER_ERROR_DELAY_SECONDS)
        );
        assert_eq!(
            AppError::api_service_unavailable(503, "unavailable", "url").retry_delay_seconds(),
            Some(retry::SERVICE_UNAVAILABLE_DELAY_SECONDS)
        );
        assert_eq!(
            AppError::network_timeout("url").retry_delay_seconds(),
            Some(retry::NETWORK_TIMEOUT_DELAY_SECONDS)
        );
        assert_eq!(
            AppError::network_connection("url", "refused").retry_delay_seconds(),
            Some(retry::NETWORK_CONNECTION_DELAY_SECONDS)
        );
        assert_eq!(AppError::invalid_date("x").retry_delay_seconds(), None);
    }

    #[test]
    fn test_error_classification_is_disjoint() {
        let errors = vec![
            AppError::api_rate_limit("rate", "url"),
            AppError::network_timeout("url"),
            AppError::api_malformed_json("bad", "url"),
            AppError::api_reported_errors("token", "url"),
            AppError::store_read("k", "m"),
            AppError::store_write("k", "m"),
            AppError::store_move("a", "b", "m"),
            AppError::store_value_too_large("k", 2, 1),
            AppError::invalid_date("x"),
            AppError::invalid_timezone("x"),
            AppError::config_error("x"),
        ];

        for error in errors {
            let classes = [
                error.is_origin_error(),
                error.is_store_error(),
                error.is_validation_error(),
            ];
            assert!(
                classes.iter().filter(|c| **c).count() <= 1,
                "Error {error:?} belongs to more than one class"
            );
        }
    }

    #[test]
    fn test_error_from_serde_json() {
        let json_error = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let app_error: AppError = json_error.into();
        assert!(matches!(app_error, AppError::ApiParse(_)));
    }

    #[test]
    fn test_error_from_io() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let app_error: AppError = io_error.into();
        assert!(matches!(app_error, AppError::Io(_)));
    }

    #[test]
    fn test_error_from_toml_deserialize() {
        let toml_error = toml::from_str::<toml::Value>("invalid = [toml").unwrap_err();
        let app_error: AppError = toml_error.into();
        assert!(matches!(app_error, AppError::TomlDeserialize(_)));
    }
}
