// src/main.rs
mod config;
mod edgar;
mod extractors;
mod pipeline;
mod storage;
mod utils;

use std::time::Duration;

use clap::Parser;
use config::{Config, ListingConfig, OrderCheck, StoreConfig};
use edgar::PageSize;
use pipeline::Pipeline;
use storage::github::GitHubStore;
use utils::AppError;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Tracks Form 8-K filings that report a given item and keeps a markdown table of them on GitHub
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Item code to look for in the 8-K description (e.g. 1.05 for cybersecurity incidents)
    #[arg(short, long, default_value = "1.05")]
    item: String,

    /// Owner of the repository holding the filing table
    #[arg(long, default_value = "mslmslmsl")]
    owner: String,

    /// Repository holding the filing table
    #[arg(long, default_value = "8-Ks")]
    repo: String,

    /// Path of the filing table inside the repository
    #[arg(long, default_value = "8-Ks.md")]
    path: String,

    /// GitHub token with contents write access
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    github_token: String,

    /// Filings per listing page (10, 20, 40, 80 or 100)
    #[arg(long, default_value = "100")]
    page_size: PageSize,

    /// Timeout in seconds for each HTTP request
    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,

    /// Pause before each listing request, in milliseconds
    #[arg(long, default_value_t = 150)]
    request_delay_ms: u64,

    /// User-Agent sent to EDGAR
    #[arg(long, env = "EDGAR_USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    user_agent: String,

    /// EDGAR "latest filings" endpoint
    #[arg(long, default_value = "https://www.sec.gov/cgi-bin/browse-edgar")]
    listing_url: String,

    /// GitHub API base URL
    #[arg(long, default_value = "https://api.github.com")]
    github_api_url: String,

    /// How to treat filings that arrive out of newest-first order
    #[arg(long, value_enum, default_value_t = OrderCheck::Flag)]
    order_check: OrderCheck,

    /// Log and skip listing rows that can't be parsed instead of aborting
    #[arg(long)]
    skip_malformed_rows: bool,

    /// Fetch and merge, but only log the resulting document
    #[arg(long)]
    dry_run: bool,
}

impl TryFrom<Args> for Config {
    type Error = AppError;

    fn try_from(args: Args) -> Result<Self, Self::Error> {
        if args.item.trim().is_empty() {
            return Err(AppError::Config("item code must not be empty".to_string()));
        }
        if args.github_token.trim().is_empty() {
            return Err(AppError::Config(
                "GitHub token not found. Set the GITHUB_TOKEN env var.".to_string(),
            ));
        }
        if args.timeout_secs == 0 {
            return Err(AppError::Config("timeout must be at least one second".to_string()));
        }
        for (name, value) in [("listing URL", &args.listing_url), ("GitHub API URL", &args.github_api_url)] {
            reqwest::Url::parse(value)
                .map_err(|e| AppError::Config(format!("invalid {} '{}': {}", name, value, e)))?;
        }

        let timeout = Duration::from_secs(args.timeout_secs);
        Ok(Config {
            item: args.item.trim().to_string(),
            listing: ListingConfig {
                url: args.listing_url,
                user_agent: args.user_agent,
                page_size: args.page_size,
                timeout,
                request_delay: Duration::from_millis(args.request_delay_ms),
            },
            store: StoreConfig {
                api_url: args.github_api_url,
                owner: args.owner,
                repo: args.repo,
                path: args.path,
                token: args.github_token,
                timeout,
            },
            order_check: args.order_check,
            skip_malformed_rows: args.skip_malformed_rows,
            dry_run: args.dry_run,
        })
    }
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging();

    // 2. Parse CLI Arguments into the run configuration
    let config = Config::try_from(Args::parse())?;
    tracing::info!("Starting check with config: {:?}", config);

    // 3. Wire the store and pipeline
    let store = GitHubStore::new(config.store.clone())?;
    let pipeline = Pipeline::new(config, store)?;

    // 4. Run once; any failure leaves the stored document as it was
    let checked_at = chrono::Local::now().naive_local();
    match pipeline.run(checked_at).await {
        Ok(summary) => {
            tracing::info!(
                "Check finished. New: {}, Stored: {}, Total: {}, Outcome: {:?}",
                summary.total - summary.stored,
                summary.stored,
                summary.total,
                summary.outcome
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Check failed, nothing written: {}", e);
            Err(e)
        }
    }
}
