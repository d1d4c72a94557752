use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use borrowscan_core::traits::{BlobStore, SymbolUniverse};
use borrowscan_core::{AppConfig, BatchScheduler, ConfigLoader};
use borrowscan_report::{GcsClient, ResultPublisher};
use borrowscan_source::{CsvSymbolUniverse, ShortableStocksFactory};

#[derive(Parser)]
#[command(name = "borrowscan")]
#[command(about = "Overnight stock-loan availability delta collector", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch availability for the symbol universe and publish delta reports
    Run {
        /// Config file path
        #[arg(short, long, default_value = "config/Config.toml")]
        config: String,
        /// Cap the number of symbols read from the universe
        #[arg(long)]
        limit: Option<usize>,
        /// Date stamp for output files (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,
        /// Skip object-store upload even if a bucket is configured
        #[arg(long)]
        no_upload: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match cli.command {
        Commands::Run {
            config,
            limit,
            date,
            no_upload,
        } => {
            run_collection(&config, limit, date.as_deref(), no_upload).await?;
        }
    }

    Ok(())
}

fn blob_store(config: &AppConfig, no_upload: bool) -> Option<Arc<dyn BlobStore>> {
    if no_upload {
        return None;
    }
    let bucket = config.output.bucket.clone()?;
    match config.output.gcs_token.clone() {
        Some(token) => Some(Arc::new(GcsClient::new(bucket, token))),
        None => {
            warn!("Bucket '{}' configured without a token, skipping upload", bucket);
            None
        }
    }
}

async fn run_collection(
    config_path: &str,
    limit: Option<usize>,
    date: Option<&str>,
    no_upload: bool,
) -> Result<()> {
    let config = ConfigLoader::load_from(config_path)?;

    let date = match date {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .with_context(|| format!("Invalid --date '{raw}', expected YYYY-MM-DD"))?,
        None => Local::now().date_naive(),
    };

    let blob = blob_store(&config, no_upload);

    if config.run.fetch_universe_from_bucket {
        match &blob {
            Some(store) => {
                fetch_universe(store.as_ref(), &config.run.universe_file).await;
            }
            None => warn!("No object store available, using the local universe file"),
        }
    }

    let universe = CsvSymbolUniverse::new(&config.run.universe_file);
    let limit = limit.or(config.run.symbol_limit);
    let symbols = universe.symbols(limit).await?;
    info!("Loaded {} symbols from {}", symbols.len(), config.run.universe_file);

    let factory = Arc::new(ShortableStocksFactory::new(
        config.source.base_url.clone(),
        Duration::from_secs(config.source.fetch_timeout_secs),
    ));
    let scheduler = BatchScheduler::new(
        factory,
        config.run.batch_size,
        config.run.max_concurrency,
    );

    let cancel = scheduler.cancel_flag();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping new fetches");
            cancel.cancel();
        }
    });

    let result_set = scheduler.run(symbols).await;

    let mut publisher = ResultPublisher::new(
        &config.output.output_dir,
        &config.output.results_prefix,
        &config.output.notfound_prefix,
    );
    if let Some(store) = blob {
        publisher = publisher.with_blob_store(store);
    }
    let files = publisher.publish(&result_set, date).await?;
    info!(
        "Published {} and {}",
        files.results_path.display(),
        files.not_found_path.display()
    );

    Ok(())
}

/// Best-effort refresh of the universe file from the object store; falls
/// back to whatever is on disk, mirroring the collector's tolerance for a
/// degraded source.
async fn fetch_universe(store: &dyn BlobStore, universe_file: &str) {
    let name = Path::new(universe_file)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(universe_file);
    match store.download(name).await {
        Ok(bytes) => {
            if let Err(e) = std::fs::write(universe_file, bytes) {
                warn!("Could not write universe file {}: {}", universe_file, e);
            } else {
                info!("Downloaded universe file {} from the bucket", name);
            }
        }
        Err(e) => {
            warn!(
                "Failed to download universe file from the bucket: {}. Falling back to local copy.",
                e
            );
        }
    }
}
