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

/// True when the invocation only touches configuration and needs no API key
/// or cache.
pub fn is_config_command(args: &Args) -> bool {
    args.list_config
        || args.new_api_key.is_some()
        || args.new_log_file_path.is_some()
        || args.clear_log_file_path
}

/// Sports data API client
///
/// Fetches a resource from one of the api-sports.io sport APIs and prints the
/// response payload as JSON. Responses are cached on disk per sport and
/// served from the cache until they expire.
///
/// Examples:
///   sports_api_client --sport rugby --resource teams --param league=16 --param season=2024
///   sports_api_client --sport f1 --resource games --param season=2024 --refresh
///   sports_api_client --sport mma --cache-stats
#[derive(Parser, Debug)]
#[command(about, long_about = None, version)]
#[command(styles = get_styles())]
pub struct Args {
    /// Sport whose API to use (baseball, handball, rugby, volleyball,
    /// american-football, formula-1, mma, football)
    #[arg(short, long, default_value = "football", help_heading = "Request")]
    pub sport: String,

    /// Resource to fetch, by its cache field name (e.g. teams, games, standings)
    #[arg(short, long, help_heading = "Request")]
    pub resource: Option<String>,

    /// Query parameter as NAME=VALUE. Repeat for several parameters.
    #[arg(short, long = "param", value_name = "NAME=VALUE", help_heading = "Request")]
    pub params: Vec<String>,

    /// Ignore any cached response and fetch from the API
    #[arg(long, help_heading = "Request")]
    pub refresh: bool,

    /// Use this cache TTL in seconds instead of the configured one
    #[arg(long, value_name = "SECONDS", help_heading = "Cache")]
    pub ttl: Option<u64>,

    /// Print entry counts for the sport's cache, after any fetch
    #[arg(long = "cache-stats", help_heading = "Cache")]
    pub cache_stats: bool,

    /// Empty every table of the sport's cache
    #[arg(long = "clear-cache", help_heading = "Cache")]
    pub clear_cache: bool,

    /// Delete the sport's persisted cache file
    #[arg(long = "purge-cache", help_heading = "Cache")]
    pub purge_cache: bool,

    /// Update the API key in config. Will prompt for a new key if not provided.
    #[arg(
        long = "set-api-key",
        help_heading = "Configuration",
        value_name = "API_KEY",
        num_args = 0..=1,
        default_missing_value = ""
    )]
    pub new_api_key: Option<String>,

    /// Update log file path in config. This sets a persistent custom log file location.
    #[arg(long = "set-log-file", help_heading = "Configuration")]
    pub new_log_file_path: Option<String>,

    /// Clear the custom log file path from config. This reverts to using the default log location.
    #[arg(long = "clear-log-file", help_heading = "Configuration")]
    pub clear_log_file_path: bool,

    /// List current configuration settings
    #[arg(long = "list-config", short = 'l', help_heading = "Configuration")]
    pub list_config: bool,

    /// Also write logs to stdout, at debug level for this crate.
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
    fn test_parse_fetch_arguments() {
        let args = Args::parse_from([
            "sports_api_client",
            "--sport",
            "rugby",
            "--resource",
            "teams",
            "--param",
            "league=16",
            "-p",
            "season=2024",
            "--refresh",
        ]);
        assert_eq!(args.sport, "rugby");
        assert_eq!(args.resource.as_deref(), Some("teams"));
        assert_eq!(args.params, vec!["league=16", "season=2024"]);
        assert!(args.refresh);
        assert!(!is_config_command(&args));
    }

    #[test]
    fn test_set_api_key_without_value() {
        let args = Args::parse_from(["sports_api_client", "--set-api-key"]);
        assert_eq!(args.new_api_key.as_deref(), Some(""));
        assert!(is_config_command(&args));
    }

    #[test]
    fn test_default_sport() {
        let args = Args::parse_from(["sports_api_client", "--cache-stats"]);
        assert_eq!(args.sport, "football");
        assert!(args.cache_stats);
    }

    #[test]
    fn test_cache_stats_help_matches_behaviour() {
        use clap::CommandFactory;

        let command = Args::command();
        let help = command
            .get_arguments()
            .find(|arg| arg.get_id() == "cache_stats")
            .and_then(|arg| arg.get_help())
            .map(ToString::to_string)
            .unwrap();
        assert!(help.contains("after any fetch"));
        assert!(!help.contains("exit"));

        let args = Args::parse_from([
            "sports_api_client",
            "--resource",
            "teams",
            "--cache-stats",
        ]);
        assert!(args.cache_stats);
        assert_eq!(args.resource.as_deref(), Some("teams"));
    }
}
