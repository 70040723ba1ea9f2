// src/main.rs
use clap::Parser;
use fixture_cache::cli::{Args, is_config_operation};
use fixture_cache::commands::{
    handle_config_update_command, handle_fetch_command, handle_list_config_command,
    handle_version_command,
};
use fixture_cache::config::Config;
use fixture_cache::data_fetcher::FixtureService;
use fixture_cache::error::AppError;
use fixture_cache::logging::setup_logging;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let args = Args::parse();

    if args.version {
        handle_version_command();
        return Ok(());
    }

    if is_config_operation(&args) {
        if args.list_config {
            return handle_list_config_command().await;
        }
        return handle_config_update_command(&args).await;
    }

    let config = Config::load().await?;
    let (log_file_path, _guard) = setup_logging(&args, &config).await?;
    info!(
        version = fixture_cache::VERSION,
        log_file = %log_file_path,
        store = %config.store.backend,
        "starting"
    );

    let service = FixtureService::from_config(&config)?;
    if let Err(e) = handle_fetch_command(&args, &service).await {
        error!(error = %e, "fixtures query failed");
        return Err(e);
    }
    Ok(())
}
