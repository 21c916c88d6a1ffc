use anyhow::{Context, Result};
use clap::Parser;
use marker_probe::{
    logging::init_logging,
    proxy::{AliveRecorder, BatchRunner, ProxyChecker, ProxyParser},
    Config,
};
use std::path::PathBuf;
use tracing::{info, warn};

/// Check HTTP proxies by looking for a marker in a page fetched through them
#[derive(Parser)]
#[command(name = "marker-probe")]
#[command(about = "Check HTTP proxies by looking for a marker in a page fetched through them")]
struct Cli {
    /// The URL to check against
    #[arg(short, long, default_value = "https://www.cloudflare.com/")]
    url: String,

    /// The text to search for in the response body
    #[arg(short, long, default_value = "Security")]
    element: String,

    /// Timeout for each request in milliseconds
    #[arg(short, long, default_value_t = 5000)]
    timeout: u64,

    /// Number of concurrent requests to make
    #[arg(short, long, default_value_t = 50)]
    concurrency: usize,

    /// Path to the file containing proxy addresses
    #[arg(short, long, default_value = "proxies.txt")]
    proxy_file: PathBuf,

    /// Path to the file to append alive proxy addresses to
    #[arg(short, long, default_value = "alive.txt")]
    alive_proxy_file: PathBuf,

    /// Path to the file for deduplicated alive proxies
    #[arg(long, default_value = "unique.txt")]
    unique_file: PathBuf,

    /// Path to the file for duplicate alive proxies
    #[arg(long, default_value = "duplicates.txt")]
    duplicates_file: PathBuf,

    /// Log response previews and other debug output
    #[arg(short, long)]
    verbose: bool,
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        Self {
            target_url: cli.url,
            marker: cli.element,
            timeout_ms: cli.timeout,
            concurrency: cli.concurrency,
            proxy_file: cli.proxy_file,
            alive_file: cli.alive_proxy_file,
            unique_file: cli.unique_file,
            duplicates_file: cli.duplicates_file,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    let config = Config::from(cli);
    config.validate()?;

    let proxies = ProxyParser::parse_file(&config.proxy_file)?;
    info!(
        "Loaded {} proxies from {}",
        proxies.len(),
        config.proxy_file.display()
    );
    if proxies.is_empty() {
        warn!("No proxies to check");
    }

    let recorder = AliveRecorder::open(&config.alive_file)
        .await
        .with_context(|| format!("failed to open {}", config.alive_file.display()))?;
    let checker = ProxyChecker::new(config.checker_config()).with_alive_recorder(recorder);
    let runner = BatchRunner::new(checker, config.concurrency)?;

    let report = runner.run(&proxies).await;

    info!(
        "Finished checking all proxies. {} alive, {} dead",
        report.unique_alive, report.dead
    );
    info!(
        "Raw probe results: {} alive, {} dead",
        report.probe_alive, report.probe_dead
    );
    info!("Found {} duplicate IP addresses.", report.duplicates.len());

    let wrote_duplicates =
        ProxyParser::save_report(&report, &config.unique_file, &config.duplicates_file)
            .context("failed to save result lists")?;

    info!(
        "Saved {} unique proxies to {}",
        report.unique.len(),
        config.unique_file.display()
    );
    if wrote_duplicates {
        info!(
            "Duplicate proxies saved to {}.",
            config.duplicates_file.display()
        );
    }

    Ok(())
}
