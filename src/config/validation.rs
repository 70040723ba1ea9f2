use crate::error::AppError;
use std::path::Path;

use super::{StoreBackend, StoreConfig};

/// Validates the origin and logging settings
///
/// # Validation Rules
/// - API domain cannot be empty
/// - API domain must be a valid URL or domain name
/// - HTTP timeout must be positive
/// - If log file path is provided, it cannot be empty
/// - Log file path parent directory must exist or be creatable
pub fn validate_config(
    api_domain: &str,
    log_file_path: &Option<String>,
    http_timeout_seconds: u64,
) -> Result<(), AppError> {
    if api_domain.trim().is_empty() {
        return Err(AppError::config_error("API domain cannot be empty"));
    }

    if !api_domain.starts_with("http://") && !api_domain.starts_with("https://") {
        // Without a scheme it should at least look like a domain
        if !api_domain.contains('.') && !api_domain.starts_with("localhost") {
            return Err(AppError::config_error(
                "API domain must be a valid URL or domain name",
            ));
        }
    }

    if http_timeout_seconds == 0 {
        return Err(AppError::config_error("HTTP timeout must be at least 1 second"));
    }

    if let Some(log_path) = log_file_path {
        if log_path.is_empty() {
            return Err(AppError::config_error("Log file path cannot be empty"));
        }

        if let Some(parent) = Path::new(log_path).parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::config_error(format!(
                    "Cannot create log directory '{}': {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    Ok(())
}

/// Validates the `[store]` table
pub fn validate_store(store: &StoreConfig) -> Result<(), AppError> {
    if store.chunk_size == 0 {
        return Err(AppError::config_error("Store chunk size must be positive"));
    }
    if store.capacity == 0 {
        return Err(AppError::config_error("Store capacity must be positive"));
    }
    if store.max_value_bytes == Some(0) {
        return Err(AppError::config_error(
            "Store value limit must be positive when set",
        ));
    }
    if store.backend == StoreBackend::File
        && let Some(dir) = &store.dir
        && dir.trim().is_empty()
    {
        return Err(AppError::config_error("Store directory cannot be empty"));
    }
    Ok(())
}
