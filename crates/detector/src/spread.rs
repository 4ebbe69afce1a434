//! Cross-exchange spread detection.
//!
//! For one instant, compare the prices a set of exchanges quote for the same
//! pair and report when the relative gap between the cheapest and the dearest
//! exceeds a threshold.

use common::{ArbitrageOpportunity, ExchangeId, ExchangePriceMap, Price, PriceQuote};
use price_feed::PriceHistory;
use rust_decimal::Decimal;

/// Configuration for the spread detector.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorConfig {
    /// Candidate exchanges. Order decides ties between equal prices.
    pub exchanges: Vec<ExchangeId>,
    /// Minimum relative spread `(max - min) / min` to report.
    pub threshold: Decimal,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            exchanges: vec![
                ExchangeId::from("binance"),
                ExchangeId::from("coinbase"),
                ExchangeId::from("kraken"),
            ],
            threshold: Decimal::new(1, 2),
        }
    }
}

/// Lowest and highest quote at one instant, with the relative gap between them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spread {
    pub lowest: PriceQuote,
    pub highest: PriceQuote,
    /// `(highest - lowest) / lowest`, unrounded. Saturates at `Decimal::MAX`.
    pub ratio: Decimal,
    /// `ratio * 100`. Saturates at `Decimal::MAX`.
    pub percentage_diff: Decimal,
}

impl Spread {
    pub fn into_opportunity(self, timestamp: impl Into<String>) -> ArbitrageOpportunity {
        ArbitrageOpportunity {
            timestamp: timestamp.into(),
            lowest_price: self.lowest,
            highest_price: self.highest,
            percentage_diff: self.percentage_diff,
        }
    }
}

/// Returns the spread when it exceeds `threshold`.
///
/// Only exchanges present in `prices` are compared; fewer than two yields
/// `None`. When several exchanges share the minimum (or maximum) price the
/// first one in `exchanges` order is reported. A non-positive minimum yields
/// `None` since the relative spread is undefined. A spread too large for
/// `Decimal` is reported with its ratio saturated at `Decimal::MAX`.
pub fn detect(
    prices: &ExchangePriceMap,
    exchanges: &[ExchangeId],
    threshold: Decimal,
) -> Option<Spread> {
    let present: Vec<(&ExchangeId, Price)> = exchanges
        .iter()
        .filter_map(|exchange| prices.get(exchange).map(|price| (exchange, *price)))
        .collect();

    if present.len() < 2 {
        return None;
    }

    let mut lowest = present[0];
    let mut highest = present[0];
    for &(exchange, price) in &present[1..] {
        if price < lowest.1 {
            lowest = (exchange, price);
        }
        if price > highest.1 {
            highest = (exchange, price);
        }
    }

    if lowest.1 .0 <= Decimal::ZERO {
        return None;
    }

    let ratio = (highest.1 .0 - lowest.1 .0)
        .checked_div(lowest.1 .0)
        .unwrap_or(Decimal::MAX);
    if ratio <= threshold {
        return None;
    }
    let percentage_diff = ratio
        .checked_mul(Decimal::ONE_HUNDRED)
        .unwrap_or(Decimal::MAX);

    Some(Spread {
        lowest: PriceQuote {
            exchange: lowest.0.clone(),
            price: lowest.1,
        },
        highest: PriceQuote {
            exchange: highest.0.clone(),
            price: highest.1,
        },
        ratio,
        percentage_diff,
    })
}

/// [`detect`] for a timestamped price map.
pub fn detect_at(
    timestamp: &str,
    prices: &ExchangePriceMap,
    exchanges: &[ExchangeId],
    threshold: Decimal,
) -> Option<ArbitrageOpportunity> {
    detect(prices, exchanges, threshold).map(|spread| spread.into_opportunity(timestamp))
}

/// Runs [`detect_at`] over many instants, keeping their order.
pub fn detect_batch<'a, I>(
    snapshots: I,
    exchanges: &[ExchangeId],
    threshold: Decimal,
) -> Vec<ArbitrageOpportunity>
where
    I: IntoIterator<Item = (&'a str, &'a ExchangePriceMap)>,
{
    snapshots
        .into_iter()
        .filter_map(|(timestamp, prices)| detect_at(timestamp, prices, exchanges, threshold))
        .collect()
}

/// Spread detection bound to a fixed exchange list and threshold.
#[derive(Debug, Clone, Default)]
pub struct SpreadDetector {
    config: DetectorConfig,
}

impl SpreadDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    pub fn detect(&self, prices: &ExchangePriceMap) -> Option<Spread> {
        detect(prices, &self.config.exchanges, self.config.threshold)
    }

    pub fn detect_at(&self, timestamp: &str, prices: &ExchangePriceMap) -> Option<ArbitrageOpportunity> {
        detect_at(timestamp, prices, &self.config.exchanges, self.config.threshold)
    }

    /// Every opportunity in a pair's history, in history order.
    pub fn detect_history(&self, history: &PriceHistory) -> Vec<ArbitrageOpportunity> {
        detect_batch(
            history
                .entries()
                .iter()
                .map(|(timestamp, prices)| (timestamp.as_str(), prices)),
            &self.config.exchanges,
            self.config.threshold,
        )
    }
}
