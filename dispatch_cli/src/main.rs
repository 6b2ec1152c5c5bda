//! CLI binary for the rate-limited, TTL-aware request dispatcher.
//!
//! Reads configuration from the environment (optionally via a `.env`
//! file), applies any CLI overrides, sets up logging, and runs the
//! dispatcher until interrupted by signal. There are no subcommands --
//! the binary does one thing until it is told to stop.

mod logging;

use anyhow::Result;
use clap::Parser;
use dispatch_lib::{Config, Dispatcher};
use tokio_util::sync::CancellationToken;

/// Rate-limited, TTL-aware request dispatcher.
#[derive(Parser)]
#[command(name = "dispatcher")]
#[command(about = "Dispatch rate-limited, TTL-bounded requests to an HTTP endpoint")]
struct Cli {
    /// Overrides DISPATCH_URL.
    #[arg(long)]
    url: Option<String>,

    /// Overrides API_TIMEOUT, in fractional seconds.
    #[arg(long)]
    timeout: Option<f64>,

    /// Number of workers (credentials) to run; capped at the number of
    /// distinct credentials available, since one worker must own one
    /// credential.
    #[arg(long)]
    workers: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let mut config = Config::from_env();
    if let Some(url) = cli.url {
        config.url = url;
    }
    if let Some(timeout) = cli.timeout {
        config.api_timeout = std::time::Duration::from_secs_f64(timeout);
    }
    if let Some(workers) = cli.workers {
        config = config.with_worker_count(workers);
    }

    let _guard = logging::init(&config);

    tracing::info!(url = %config.url, workers = config.api_keys.len(), "starting dispatcher");

    let dispatcher = Dispatcher::new(config);
    dispatcher.run(CancellationToken::new()).await;

    Ok(())
}
