use crate::cli::Args;
use crate::config::Config;
use crate::data_fetcher::FixtureService;
use crate::data_fetcher::models::FixturesPayload;
use crate::error::AppError;
use std::time::Duration;
use tracing::{error, info};

/// Handles the --version command.
pub fn handle_version_command() {
    println!("{} {}", crate::NAME, crate::VERSION);
}

/// Handles the --list-config command.
pub async fn handle_list_config_command() -> Result<(), AppError> {
    Config::display().await
}

/// Handles configuration update commands (--config, --set-api-key, --set-store-dir).
///
/// Starts from the saved file (or defaults), applies the updates and saves.
pub async fn handle_config_update_command(args: &Args) -> Result<(), AppError> {
    let config_path = Config::get_config_path();
    let mut config = Config::load_from_path(&config_path)
        .await
        .unwrap_or_default();

    if let Some(new_domain) = &args.new_api_domain {
        config.api_domain = new_domain.trim().to_string();
    }

    if let Some(new_key) = &args.new_api_key {
        let new_key = new_key.trim();
        config.api_key = (!new_key.is_empty()).then(|| new_key.to_string());
    }

    if let Some(new_dir) = &args.new_store_dir {
        config.store.dir = Some(new_dir.clone());
    }

    config.validate()?;
    config.save().await?;
    println!("Config updated successfully!");

    Ok(())
}

/// Serializes a payload for stdout
pub fn render_payload(payload: &FixturesPayload, pretty: bool) -> Result<String, AppError> {
    let rendered = if pretty {
        serde_json::to_string_pretty(payload)?
    } else {
        serde_json::to_string(payload)?
    };
    Ok(rendered)
}

/// Runs the fixtures query once, or every `--watch` seconds until Ctrl-C.
///
/// In watch mode an origin failure is logged and reported on stderr and the
/// loop carries on; a single run returns the error.
pub async fn handle_fetch_command(args: &Args, service: &FixtureService) -> Result<(), AppError> {
    let Some(interval) = args.watch.filter(|secs| *secs > 0) else {
        let payload = service
            .get_fixtures(args.date.as_deref(), &args.timezone, args.live)
            .await?;
        println!("{}", render_payload(&payload, args.pretty)?);
        return Ok(());
    };

    info!(interval_seconds = interval, "watch mode started");
    let mut ticker = tokio::time::interval(Duration::from_secs(interval));
    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                info!("watch mode interrupted");
                return Ok(());
            }
        }

        match service
            .get_fixtures(args.date.as_deref(), &args.timezone, args.live)
            .await
        {
            Ok(payload) => println!("{}", render_payload(&payload, args.pretty)?),
            Err(e) if e.is_validation_error() => return Err(e),
            Err(e) => {
                error!(error = %e, "fixtures query failed");
                eprintln!("Error: {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_fetcher::models::ResponseSource;

    #[test]
    fn test_render_payload() {
        let payload = FixturesPayload {
            data: vec![],
            source: ResponseSource::Cache,
        };
        assert_eq!(
            render_payload(&payload, false).unwrap(),
            r#"{"data":[],"source":"cache"}"#
        );
        assert!(render_payload(&payload, true).unwrap().contains('\n'));
    }
}
