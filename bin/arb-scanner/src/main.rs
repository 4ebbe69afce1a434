use anyhow::{Context, Result};
use clap::Parser;
use config::ScannerConfig;
use detector::{write_report, ScanService};
use price_feed::CoinGeckoSource;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Scans historical prices for cross-exchange spreads and writes them to a JSON report.
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    /// Path to a scanner configuration YAML; built-in defaults are used when omitted
    #[arg(long)]
    config: Option<PathBuf>,
    /// Trading pairs to scan, e.g. btc-usd,eth-usd
    #[arg(long, value_delimiter = ',')]
    pairs: Option<Vec<String>>,
    /// Exchanges to simulate, in offset order
    #[arg(long, value_delimiter = ',')]
    exchanges: Option<Vec<String>>,
    /// Days of price history to fetch
    #[arg(long)]
    days: Option<u32>,
    /// Minimum relative spread to report (0.01 = 1%)
    #[arg(long)]
    threshold: Option<f64>,
    /// Report output path
    #[arg(long)]
    output: Option<PathBuf>,
    /// Abort on the first pair that fails to load
    #[arg(long)]
    fail_fast: bool,
    /// Log filter, overrides RUST_LOG
    #[arg(long)]
    log_level: Option<String>,
}

impl Args {
    /// CLI values take priority over the configuration file.
    fn apply_overrides(&self, config: &mut ScannerConfig) {
        if let Some(pairs) = &self.pairs {
            config.scan.trading_pairs = pairs.iter().map(|p| p.trim().to_string()).collect();
        }
        if let Some(exchanges) = &self.exchanges {
            config.scan.exchanges = exchanges.iter().map(|e| e.trim().to_string()).collect();
        }
        if let Some(days) = self.days {
            config.scan.lookback_days = days;
        }
        if let Some(threshold) = self.threshold {
            config.scan.threshold = threshold;
        }
        if let Some(output) = &self.output {
            config.output.path = output.clone();
        }
        if self.fail_fast {
            config.scan.fail_fast = true;
        }
    }
}

fn init_tracing(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_level.as_deref());

    let mut scanner_cfg = match &args.config {
        Some(path) => ScannerConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => ScannerConfig::default(),
    };
    args.apply_overrides(&mut scanner_cfg);
    scanner_cfg.validate()?;

    let source = Arc::new(CoinGeckoSource::new(&scanner_cfg.feed)?);
    let service = ScanService::from_config(&scanner_cfg, source)?;

    let report = service.run().await?;
    write_report(&scanner_cfg.output.path, &report.opportunities)?;

    info!(
        opportunities = report.opportunities.len(),
        failed_pairs = report.failed_pairs.len(),
        output = %scanner_cfg.output.path.display(),
        "Done"
    );
    Ok(())
}
