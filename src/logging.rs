use crate::cli::Args;
use crate::config::Config;
use crate::error::AppError;
use std::io::stderr;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const DEFAULT_LOG_FILE_NAME: &str = "fixture_cache.log";

fn env_filter(default_directive: &str) -> Result<EnvFilter, AppError> {
    let directive: Directive = default_directive
        .parse()
        .map_err(|e| AppError::log_setup_error(format!("Invalid log directive: {e}")))?;
    Ok(EnvFilter::from_default_env().add_directive(directive))
}

/// Splits the configured log path into directory and file name, falling back
/// to the platform log directory.
pub fn resolve_log_location(custom_path: Option<&String>) -> (String, String) {
    match custom_path {
        Some(custom_path) => {
            let path = Path::new(custom_path);
            let parent = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            let file_name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or(DEFAULT_LOG_FILE_NAME);
            (parent.to_string_lossy().to_string(), file_name.to_string())
        }
        None => (
            Config::get_log_dir_path(),
            DEFAULT_LOG_FILE_NAME.to_string(),
        ),
    }
}

/// Sets up logging for the binary.
///
/// - Always logs to a daily rolling file
/// - `--debug` adds a stderr layer at debug level; stdout stays reserved for
///   the JSON result
/// - `RUST_LOG` refines both filters
///
/// Returns the path to the log file and the guard that must be kept alive
/// for the duration of the program to ensure proper log flushing.
pub async fn setup_logging(args: &Args, config: &Config) -> Result<(String, WorkerGuard), AppError> {
    let custom_log_path = args.log_file.as_ref().or(config.log_file_path.as_ref());
    let (log_dir, log_file_name) = resolve_log_location(custom_log_path);

    if !Path::new(&log_dir).exists() {
        tokio::fs::create_dir_all(&log_dir).await.map_err(|e| {
            AppError::log_setup_error(format!("Failed to create log directory: {e}"))
        })?;
    }

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, &log_file_name);

    // The guard must outlive every log call or buffered lines are lost
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::Layer::new()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_filter(env_filter("fixture_cache=info")?);

    let stderr_layer = if args.debug {
        Some(
            fmt::Layer::new()
                .with_writer(stderr)
                .with_ansi(true)
                .with_filter(env_filter("fixture_cache=debug")?),
        )
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .map_err(|e| AppError::log_setup_error(format!("Failed to install subscriber: {e}")))?;

    let log_file_path = format!("{log_dir}/{log_file_name}");
    Ok((log_file_path, guard))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_custom_log_location() {
        let custom = "/var/log/fixtures/app.log".to_string();
        let (dir, file) = resolve_log_location(Some(&custom));
        assert_eq!(dir, "/var/log/fixtures");
        assert_eq!(file, "app.log");
    }

    #[test]
    fn test_resolve_bare_file_name() {
        let custom = "app.log".to_string();
        let (dir, file) = resolve_log_location(Some(&custom));
        assert_eq!(dir, ".");
        assert_eq!(file, "app.log");
    }

    #[test]
    fn test_resolve_default_log_location() {
        let (dir, file) = resolve_log_location(None);
        assert!(dir.ends_with("logs"));
        assert_eq!(file, DEFAULT_LOG_FILE_NAME);
    }

    #[test]
    fn test_default_directives_parse() {
        assert!(env_filter("fixture_cache=info").is_ok());
        assert!(env_filter("fixture_cache=debug").is_ok());
    }
}
