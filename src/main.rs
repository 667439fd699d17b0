// src/main.rs
mod cli;
mod commands;
mod logging;

use clap::Parser;
use cli::{Args, is_config_command};
use commands::{
    cache_stats_report, handle_cache_commands, handle_config_update_command, handle_fetch_command,
    handle_list_config_command, load_config, open_cache, parse_request,
};
use sports_api_client::error::AppError;
use tracing::{debug, info};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let args = Args::parse();

    if args.list_config {
        return handle_list_config_command().await;
    }

    if is_config_command(&args) {
        return handle_config_update_command(&args).await;
    }

    let request = parse_request(&args)?;
    let config = load_config(&request).await?;

    let (log_file_path, _guard) = logging::setup_logging(&args, config.log_file_path.as_ref()).await?;
    debug!("Logging to {log_file_path}");
    info!(
        "Starting {} {} for {}",
        sports_api_client::NAME,
        sports_api_client::VERSION,
        request.sport
    );

    let mut store = open_cache(request.sport, &config, args.ttl).await;
    handle_cache_commands(&args, &mut store);

    let outcome = match request.kind {
        Some(kind) => {
            let (returned, outcome) =
                handle_fetch_command(&config, &request, kind, args.refresh, store).await;
            store = returned;
            outcome
        }
        None => Ok(()),
    };

    if let Some(report) = cache_stats_report(&args, &store) {
        println!("{report}");
    }

    // Make sure queued cache writes reach the disk before exiting
    store.flush().await;
    outcome
}
