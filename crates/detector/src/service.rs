use crate::spread::{DetectorConfig, SpreadDetector};
use common::{ArbitrageOpportunity, AssetPair, PricePoint};
use config_lib::{ConfigError, ScannerConfig, TimestampZone};
use futures::stream::{self, StreamExt};
use price_feed::{FeedError, PriceHistory, PriceSource};
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that abort a scan.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Failed to load price history for {pair}: {source}")]
    Feed {
        pair: AssetPair,
        #[source]
        source: FeedError,
    },
}

/// Run-wide settings for a scan.
#[derive(Debug, Clone)]
pub struct ScanSettings {
    /// Pairs to scan, in report order.
    pub pairs: Vec<AssetPair>,
    pub lookback_days: u32,
    pub timezone: TimestampZone,
    /// Abort on the first feed failure instead of skipping the pair.
    pub fail_fast: bool,
    /// Upper bound on fetches in flight.
    pub max_concurrency: usize,
}

/// Outcome of one scan.
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    /// Opportunities ordered by pair, then by feed timestamp.
    pub opportunities: Vec<ArbitrageOpportunity>,
    pub pairs_scanned: usize,
    /// Pairs skipped because their history could not be loaded.
    pub failed_pairs: Vec<AssetPair>,
    /// Distinct timestamps compared across all scanned pairs.
    pub snapshots_scanned: usize,
}

/// Fetches price history for every configured pair and runs spread detection
/// over the simulated per-exchange prices.
pub struct ScanService {
    source: Arc<dyn PriceSource>,
    detector: SpreadDetector,
    settings: ScanSettings,
}

impl ScanService {
    pub fn new(
        source: Arc<dyn PriceSource>,
        detector_config: DetectorConfig,
        settings: ScanSettings,
    ) -> Self {
        Self {
            source,
            detector: SpreadDetector::new(detector_config),
            settings,
        }
    }

    /// Builds the service from a validated scanner configuration.
    pub fn from_config(
        config: &ScannerConfig,
        source: Arc<dyn PriceSource>,
    ) -> Result<Self, ConfigError> {
        // Shortest decimal rendering of the float, so 0.01 stays exactly 0.01.
        let threshold = Decimal::from_str(&config.scan.threshold.to_string()).map_err(|e| {
            ConfigError::ValidationError(format!(
                "Threshold {} is not representable: {}",
                config.scan.threshold, e
            ))
        })?;

        let detector_config = DetectorConfig {
            exchanges: config.exchanges()?,
            threshold,
        };
        let settings = ScanSettings {
            pairs: config.trading_pairs()?,
            lookback_days: config.scan.lookback_days,
            timezone: config.scan.timezone,
            fail_fast: config.scan.fail_fast,
            max_concurrency: config.feed.max_concurrency,
        };

        Ok(Self::new(source, detector_config, settings))
    }

    pub fn detector(&self) -> &SpreadDetector {
        &self.detector
    }

    /// Runs one scan and returns its own result sequence.
    pub async fn run(&self) -> Result<ScanReport, ScanError> {
        info!(
            pairs = self.settings.pairs.len(),
            exchanges = self.detector.config().exchanges.len(),
            threshold = %self.detector.config().threshold,
            lookback_days = self.settings.lookback_days,
            "Starting spread scan"
        );

        let histories = self.fetch_all().await?;

        let mut report = ScanReport::default();
        for (pair, result) in histories {
            let history = match result {
                Ok(history) => history,
                Err(e) => {
                    warn!(pair = %pair, error = %e, "Skipping pair");
                    report.failed_pairs.push(pair);
                    continue;
                }
            };

            let found = self.detector.detect_history(&history);
            debug!(
                pair = %pair,
                snapshots = history.len(),
                opportunities = found.len(),
                "Scanned pair"
            );
            report.pairs_scanned += 1;
            report.snapshots_scanned += history.len();
            report.opportunities.extend(found);
        }

        info!(
            pairs_scanned = report.pairs_scanned,
            pairs_failed = report.failed_pairs.len(),
            snapshots = report.snapshots_scanned,
            opportunities = report.opportunities.len(),
            "Spread scan finished"
        );
        Ok(report)
    }

    /// Fetches every pair with bounded concurrency. Results come back in
    /// configured pair order. With `fail_fast` the first failure is returned
    /// and outstanding fetches are dropped.
    async fn fetch_all(
        &self,
    ) -> Result<Vec<(AssetPair, Result<PriceHistory, FeedError>)>, ScanError> {
        let lookback_days = self.settings.lookback_days;
        let mut fetches = stream::iter(self.settings.pairs.iter().cloned())
            .map(|pair| {
                let source = Arc::clone(&self.source);
                async move {
                    let points = source.fetch(&pair, lookback_days).await;
                    (pair, points)
                }
            })
            .buffered(self.settings.max_concurrency.max(1));

        let mut histories = Vec::with_capacity(self.settings.pairs.len());
        while let Some((pair, points)) = fetches.next().await {
            let history = points.and_then(|points| self.build_history(&pair, &points));
            match history {
                Err(source) if self.settings.fail_fast => {
                    return Err(ScanError::Feed { pair, source });
                }
                history => histories.push((pair, history)),
            }
        }
        Ok(histories)
    }

    fn build_history(
        &self,
        pair: &AssetPair,
        points: &[PricePoint],
    ) -> Result<PriceHistory, FeedError> {
        PriceHistory::build(
            pair.clone(),
            points,
            &self.detector.config().exchanges,
            self.settings.timezone,
        )
    }
}
