use common::{AssetPair, ExchangeId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

pub const DEFAULT_BASE_URL: &str = "https://api.coingecko.com/api/v3";
pub const DEFAULT_OUTPUT_PATH: &str = "arbitrage_opportunities.json";

// The top-level configuration struct that maps directly to the YAML file.
// Every field is optional in the file; missing fields take the defaults below.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScannerConfig {
    pub feed: FeedConfig,
    pub scan: ScanConfig,
    pub output: OutputConfig,
}

/// Market-data endpoint and HTTP behaviour.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct FeedConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    /// Additional attempts after the first one for transient failures.
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    /// Upper bound on fetches in flight at once.
    pub max_concurrency: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
            max_retries: 3,
            initial_backoff_ms: 250,
            max_concurrency: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScanConfig {
    /// Pairs in `BASE-QUOTE` form, scanned in this order.
    pub trading_pairs: Vec<String>,
    /// Exchange names; the position of each name drives the simulated offset
    /// and breaks ties between equal prices.
    pub exchanges: Vec<String>,
    pub lookback_days: u32,
    /// Minimum relative spread, 0.01 == 1%.
    pub threshold: f64,
    pub timezone: TimestampZone,
    /// Abort the whole run on the first feed error instead of skipping the pair.
    pub fail_fast: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            trading_pairs: vec![
                "btc-usd".to_string(),
                "eth-usd".to_string(),
                "bnb-usd".to_string(),
            ],
            exchanges: vec![
                "binance".to_string(),
                "coinbase".to_string(),
                "kraken".to_string(),
            ],
            lookback_days: 1,
            threshold: 0.01,
            timezone: TimestampZone::Utc,
            fail_fast: false,
        }
    }
}

/// Zone used when rendering feed timestamps in the report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampZone {
    #[default]
    Utc,
    Local,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_OUTPUT_PATH),
        }
    }
}

impl ScannerConfig {
    /// Load configuration from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: ScannerConfig =
            serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content =
            serde_yaml::to_string(self).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        std::fs::write(path.as_ref(), content)?;
        Ok(())
    }

    /// Configured trading pairs, parsed, in configured order.
    pub fn trading_pairs(&self) -> Result<Vec<AssetPair>, ConfigError> {
        self.scan
            .trading_pairs
            .iter()
            .map(|raw| {
                raw.parse::<AssetPair>()
                    .map_err(|e| ConfigError::ValidationError(e.to_string()))
            })
            .collect()
    }

    /// Configured exchanges, parsed, in configured order.
    pub fn exchanges(&self) -> Result<Vec<ExchangeId>, ConfigError> {
        self.scan
            .exchanges
            .iter()
            .map(|raw| {
                raw.parse::<ExchangeId>()
                    .map_err(|e| ConfigError::ValidationError(e.to_string()))
            })
            .collect()
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scan.trading_pairs.is_empty() {
            return Err(ConfigError::ValidationError(
                "No trading pairs configured".to_string(),
            ));
        }
        self.trading_pairs()?;

        if self.scan.exchanges.is_empty() {
            return Err(ConfigError::ValidationError(
                "No exchanges configured".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        for exchange in self.exchanges()? {
            if !seen.insert(exchange.clone()) {
                return Err(ConfigError::ValidationError(format!(
                    "Exchange '{}' is listed more than once",
                    exchange
                )));
            }
        }

        if self.scan.lookback_days == 0 {
            return Err(ConfigError::ValidationError(
                "Lookback days must be greater than 0".to_string(),
            ));
        }

        if !self.scan.threshold.is_finite() || self.scan.threshold < 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "Threshold must be a non-negative number, got {}",
                self.scan.threshold
            )));
        }

        if self.feed.base_url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "Feed base URL cannot be empty".to_string(),
            ));
        }

        if self.feed.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "Feed timeout must be greater than 0".to_string(),
            ));
        }

        if self.feed.max_concurrency == 0 {
            return Err(ConfigError::ValidationError(
                "Feed concurrency must be greater than 0".to_string(),
            ));
        }

        if self.output.path.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "Output path cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}
