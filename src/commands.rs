use crate::cli::Args;
use sports_api_client::config::Config;
use sports_api_client::config::user_prompts::prompt_for_api_key;
use sports_api_client::data_fetcher::api::SportsApiClient;
use sports_api_client::data_fetcher::cache::{CacheStore, FileStorage};
use sports_api_client::data_fetcher::models::{QueryParams, ResourceKind, Sport};
use sports_api_client::data_fetcher::service::SportsDataService;
use sports_api_client::error::AppError;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// A fully parsed fetch/cache invocation
#[derive(Debug)]
pub struct Request {
    pub sport: Sport,
    pub kind: Option<ResourceKind>,
    pub params: QueryParams,
}

/// Validates command line argument combinations and parses the request.
pub fn parse_request(args: &Args) -> Result<Request, AppError> {
    let sport: Sport = args.sport.parse()?;
    let kind = args
        .resource
        .as_deref()
        .map(str::parse::<ResourceKind>)
        .transpose()?;

    if kind.is_none() && !(args.cache_stats || args.clear_cache || args.purge_cache) {
        return Err(AppError::invalid_parameter(
            "Nothing to do: pass --resource or one of --cache-stats, --clear-cache, --purge-cache",
        ));
    }

    if let Some(kind) = kind
        && !sport.supports(kind)
    {
        return Err(AppError::unsupported_resource(sport.slug(), kind.field_name()));
    }

    if args.ttl == Some(0) {
        return Err(AppError::invalid_parameter("--ttl must be at least one second"));
    }

    let mut params = QueryParams::new();
    for raw in &args.params {
        let parsed: QueryParams = raw.parse()?;
        for (name, value) in parsed.iter() {
            params.insert(name, value);
        }
    }

    Ok(Request {
        sport,
        kind,
        params,
    })
}

/// Handles the --list-config command.
pub async fn handle_list_config_command() -> Result<(), AppError> {
    Config::display().await
}

/// Handles configuration update commands (--set-api-key, --set-log-file, --clear-log-file).
pub async fn handle_config_update_command(args: &Args) -> Result<(), AppError> {
    let mut config = Config::load_from_path(&Config::get_config_path())
        .await
        .unwrap_or_default();

    if let Some(new_key) = &args.new_api_key {
        config.api_key = if new_key.is_empty() {
            prompt_for_api_key().await?
        } else {
            new_key.clone()
        };
    }

    if let Some(new_log_path) = &args.new_log_file_path {
        config.log_file_path = Some(new_log_path.clone());
    } else if args.clear_log_file_path {
        config.log_file_path = None;
        println!("Custom log file path cleared. Using default location.");
    }

    config.validate()?;
    config.save().await?;
    println!("Config updated successfully!");

    Ok(())
}

/// Opens the persisted cache for `sport`.
///
/// The TTL restored with the cache is kept unless `--ttl` or the
/// configuration asks for another one.
pub async fn open_cache(
    sport: Sport,
    config: &Config,
    ttl_override: Option<u64>,
) -> CacheStore {
    let storage = FileStorage::new(config.cache_dir_path());
    let mut store = CacheStore::open(sport.cache_store_name(), Arc::new(storage)).await;

    let requested = ttl_override
        .map(Duration::from_secs)
        .or_else(|| config.cache_ttl());
    if let Some(ttl) = requested
        && store.ttl() != ttl
    {
        info!("Changing TTL of '{}' to {}s", store.name(), ttl.as_secs());
        store.set_ttl(ttl);
    }
    store
}

/// Loads what the invocation needs. Cache-only commands never touch the API,
/// so they skip the API key prompt and check.
pub async fn load_config(request: &Request) -> Result<Config, AppError> {
    if request.kind.is_some() {
        Config::load().await
    } else {
        Config::load_cache_settings().await
    }
}

/// Handles --clear-cache and --purge-cache.
pub fn handle_cache_commands(args: &Args, store: &mut CacheStore) {
    if args.clear_cache {
        store.clear();
        println!("Cleared cache '{}'", store.name());
    }

    if args.purge_cache {
        store.purge_persisted();
        println!("Removed persisted cache '{}'", store.name());
    }
}

/// The --cache-stats report. Taken after any fetch so it includes what the
/// fetch cached.
pub fn cache_stats_report(args: &Args, store: &CacheStore) -> Option<String> {
    args.cache_stats.then(|| store.stats().to_string())
}

/// Fetches the requested resource through the cache and prints the payload
/// as pretty JSON. The store is handed back even when the fetch fails so
/// pending writes can still be flushed.
pub async fn handle_fetch_command(
    config: &Config,
    request: &Request,
    kind: ResourceKind,
    refresh: bool,
    store: CacheStore,
) -> (CacheStore, Result<(), AppError>) {
    let client = match SportsApiClient::new(request.sport, config) {
        Ok(client) => client,
        Err(e) => return (store, Err(e)),
    };
    let mut service = SportsDataService::new(client, store);

    let result = if refresh {
        service.refresh(kind, &request.params).await
    } else {
        service.fetch(kind, &request.params).await
    };

    let printed = result.and_then(|items| {
        info!(
            "Printing {} {} item(s) for {}",
            items.len(),
            kind,
            request.sport
        );
        println!("{}", serde_json::to_string_pretty(&items)?);
        Ok(())
    });

    (service.into_cache(), printed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["sports_api_client"];
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    #[test]
    fn test_parse_request_collects_params() {
        let request = parse_request(&args(&[
            "--sport",
            "rugby",
            "--resource",
            "teams",
            "--param",
            "league=16",
            "--param",
            "season=2024&team=3",
            "--param",
            "league=17",
        ]))
        .unwrap();

        assert_eq!(request.sport, Sport::Rugby);
        assert_eq!(request.kind, Some(ResourceKind::Teams));
        assert_eq!(request.params.get("league"), Some("17"));
        assert_eq!(request.params.get("team"), Some("3"));
        assert_eq!(request.params.len(), 3);
    }

    #[test]
    fn test_parse_request_requires_an_action() {
        let result = parse_request(&args(&["--sport", "mma"]));
        assert!(matches!(result, Err(AppError::InvalidParameter(_))));

        assert!(parse_request(&args(&["--sport", "mma", "--cache-stats"])).is_ok());
    }

    #[test]
    fn test_parse_request_rejects_unsupported_and_bad_input() {
        assert!(matches!(
            parse_request(&args(&["--sport", "f1", "--resource", "odds"])),
            Err(AppError::UnsupportedResource { .. })
        ));
        assert!(parse_request(&args(&["--sport", "curling", "--resource", "teams"])).is_err());
        assert!(parse_request(&args(&["--resource", "teams", "--param", "broken"])).is_err());
        assert!(parse_request(&args(&["--resource", "teams", "--ttl", "0"])).is_err());
    }

    #[tokio::test]
    async fn test_open_cache_applies_ttl_override() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = Config {
            api_key: "key".to_string(),
            cache_dir: Some(temp_dir.path().to_string_lossy().to_string()),
            ..Config::default()
        };

        let store = open_cache(Sport::Handball, &config, Some(42)).await;
        assert_eq!(store.ttl(), Duration::from_secs(42));
        assert_eq!(store.name(), "handball-cache");
        store.flush().await;

        assert!(temp_dir.path().join("handball-cache.json").exists());
    }

    #[tokio::test]
    async fn test_open_cache_keeps_persisted_ttl_unless_asked() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = Config {
            api_key: "key".to_string(),
            cache_dir: Some(temp_dir.path().to_string_lossy().to_string()),
            ..Config::default()
        };

        let store = open_cache(Sport::Volleyball, &config, Some(42)).await;
        store.flush().await;
        drop(store);

        // No --ttl and nothing configured: the stored TTL wins
        let reopened = open_cache(Sport::Volleyball, &config, None).await;
        assert_eq!(reopened.ttl(), Duration::from_secs(42));
        assert!(!reopened.is_dirty());
        drop(reopened);

        let configured = Config {
            cache_ttl_seconds: Some(90),
            ..config.clone()
        };
        let store = open_cache(Sport::Volleyball, &configured, None).await;
        assert_eq!(store.ttl(), Duration::from_secs(90));
        store.flush().await;
        drop(store);

        let store = open_cache(Sport::Volleyball, &config, None).await;
        assert_eq!(store.ttl(), Duration::from_secs(90));
    }

    #[tokio::test]
    async fn test_cache_stats_reflect_cache_commands() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = Config {
            cache_dir: Some(temp_dir.path().to_string_lossy().to_string()),
            ..Config::default()
        };
        let mut store = open_cache(Sport::Baseball, &config, None).await;
        store.set_value(ResourceKind::Countries, None, serde_json::json!(["US"]));

        let stats_only = args(&["--sport", "baseball", "--cache-stats"]);
        handle_cache_commands(&stats_only, &mut store);
        let report = cache_stats_report(&stats_only, &store).unwrap();
        assert!(report.contains("Total: 1 entries (1 valid)"));

        let clear_and_stats = args(&["--sport", "baseball", "--clear-cache", "--cache-stats"]);
        handle_cache_commands(&clear_and_stats, &mut store);
        let report = cache_stats_report(&clear_and_stats, &store).unwrap();
        assert!(report.contains("Total: 0 entries (0 valid)"));

        assert!(cache_stats_report(&args(&["--clear-cache"]), &store).is_none());
        store.flush().await;
    }

    #[test]
    fn test_request_kind_decides_config_needs() {
        let cache_only = parse_request(&args(&["--sport", "mma", "--purge-cache"])).unwrap();
        assert!(cache_only.kind.is_none());

        let fetch = parse_request(&args(&["--sport", "mma", "--resource", "teams"])).unwrap();
        assert!(fetch.kind.is_some());
    }
}
