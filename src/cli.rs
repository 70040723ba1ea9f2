use clap::Parser;
use clap::builder::styling::{AnsiColor, Effects, Styles};

fn get_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
        .usage(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Yellow.on_default())
        .error(AnsiColor::Red.on_default().effects(Effects::BOLD))
        .valid(AnsiColor::Green.on_default())
        .invalid(AnsiColor::Red.on_default())
}

/// Whether the invocation edits or prints configuration instead of fetching fixtures
pub fn is_config_operation(args: &Args) -> bool {
    args.new_api_domain.is_some()
        || args.new_api_key.is_some()
        || args.new_store_dir.is_some()
        || args.list_config
}

/// Football fixture cache
///
/// Fetches fixtures for a date from the origin API, caching them in a
/// partitioned store so repeated lookups are served without origin calls.
/// Prints the fixtures grouped by country and league as JSON on stdout.
///
/// Cached data for live matches and for yesterday, today and tomorrow is
/// refreshed every 15 seconds; other dates are kept for an hour.
#[derive(Parser, Debug)]
#[command(about, long_about = None)]
#[command(disable_version_flag = true)]
#[command(styles = get_styles())]
pub struct Args {
    /// Date to fetch in YYYY-MM-DD format. Defaults to the current UTC date.
    #[arg(long = "date", short = 'd', help_heading = "Query")]
    pub date: Option<String>,

    /// IANA timezone used for kickoff dates and times in the output
    #[arg(long = "timezone", short = 't', default_value = "UTC", help_heading = "Query")]
    pub timezone: String,

    /// Fetch matches currently in play instead of the full day
    #[arg(long = "live", help_heading = "Query")]
    pub live: bool,

    /// Repeat the query every N seconds until interrupted
    #[arg(long = "watch", value_name = "SECONDS", help_heading = "Output")]
    pub watch: Option<u64>,

    /// Pretty-print the JSON output
    #[arg(long = "pretty", short = 'p', help_heading = "Output")]
    pub pretty: bool,

    /// Update API domain in config
    #[arg(long = "config", value_name = "API_DOMAIN", help_heading = "Configuration")]
    pub new_api_domain: Option<String>,

    /// Store the origin API key in config
    #[arg(long = "set-api-key", value_name = "KEY", help_heading = "Configuration")]
    pub new_api_key: Option<String>,

    /// Set the file store directory in config
    #[arg(long = "set-store-dir", value_name = "DIR", help_heading = "Configuration")]
    pub new_store_dir: Option<String>,

    /// List current configuration settings
    #[arg(long = "list-config", short = 'l', help_heading = "Configuration")]
    pub list_config: bool,

    /// Show version information
    #[arg(short = 'V', long = "version", help_heading = "Info")]
    pub version: bool,

    /// Also write debug logs to stderr
    #[arg(long = "debug", help_heading = "Debug")]
    pub debug: bool,

    /// Specify a custom log file path. If not provided, logs will be written to the default location.
    #[arg(long = "log-file", help_heading = "Debug")]
    pub log_file: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["fixture_cache"]).unwrap();
        assert_eq!(args.timezone, "UTC");
        assert!(args.date.is_none());
        assert!(!args.live);
        assert!(args.watch.is_none());
        assert!(!is_config_operation(&args));
    }

    #[test]
    fn test_query_flags() {
        let args = Args::try_parse_from([
            "fixture_cache",
            "-d",
            "2024-05-02",
            "--timezone",
            "Europe/Helsinki",
            "--live",
            "--watch",
            "15",
            "--pretty",
        ])
        .unwrap();
        assert_eq!(args.date.as_deref(), Some("2024-05-02"));
        assert_eq!(args.timezone, "Europe/Helsinki");
        assert!(args.live);
        assert_eq!(args.watch, Some(15));
        assert!(args.pretty);
    }

    #[test]
    fn test_config_operations() {
        let args = Args::try_parse_from(["fixture_cache", "--set-api-key", "abc"]).unwrap();
        assert!(is_config_operation(&args));

        let args = Args::try_parse_from(["fixture_cache", "-l"]).unwrap();
        assert!(is_config_operation(&args));
    }

    #[test]
    fn test_watch_requires_number() {
        assert!(Args::try_parse_from(["fixture_cache", "--watch", "soon"]).is_err());
    }
}
