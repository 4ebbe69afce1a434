use crate::errors::CommonError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Represents a price, using a high-precision decimal type.
///
/// Serialized as a plain JSON number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Price(#[serde(with = "rust_decimal::serde::float")] pub Decimal);

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Represents a financial asset, identified by a symbol string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Asset(pub String);

impl Asset {
    /// The symbol as used in market-data URLs (`btc`, `usd`).
    pub fn as_lowercase(&self) -> String {
        self.0.to_lowercase()
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Asset {
    fn from(s: &str) -> Self {
        Asset(s.to_uppercase())
    }
}

/// Represents a pair of assets for trading.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AssetPair {
    /// The base asset of the pair.
    pub base: Asset,
    /// The quote asset of the pair.
    pub quote: Asset,
}

impl AssetPair {
    /// Creates a new asset pair.
    pub fn new(base: Asset, quote: Asset) -> Self {
        AssetPair { base, quote }
    }
}

impl fmt::Display for AssetPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

/// Parses the `BASE-QUOTE` form used in configuration, e.g. `btc-usd`.
impl FromStr for AssetPair {
    type Err = CommonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (base, quote) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| CommonError::InvalidPair(s.to_string()))?;

        for symbol in [base, quote] {
            if symbol.is_empty() || symbol.contains(['-', '/', ' ']) {
                return Err(CommonError::InvalidPair(s.to_string()));
            }
        }

        Ok(AssetPair::new(Asset::from(base), Asset::from(quote)))
    }
}

/// Represents a unique identifier for an exchange.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExchangeId(pub String);

impl fmt::Display for ExchangeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ExchangeId {
    fn from(s: &str) -> Self {
        ExchangeId(s.to_string())
    }
}

impl FromStr for ExchangeId {
    type Err = CommonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        if name.is_empty() {
            return Err(CommonError::InvalidExchange(s.to_string()));
        }
        Ok(ExchangeId(name.to_string()))
    }
}

/// A single observation from the price feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricePoint {
    /// Epoch milliseconds, as reported by the feed.
    pub timestamp_ms: i64,
    pub price: Price,
}

impl PricePoint {
    pub fn new(timestamp_ms: i64, price: Price) -> Self {
        Self {
            timestamp_ms,
            price,
        }
    }
}

/// Prices of one trading pair at one instant, keyed by exchange.
///
/// An exchange missing from the map is left out of comparisons.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExchangePriceMap(HashMap<ExchangeId, Price>);

impl ExchangePriceMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, exchange: ExchangeId, price: Price) -> Option<Price> {
        self.0.insert(exchange, price)
    }

    pub fn get(&self, exchange: &ExchangeId) -> Option<&Price> {
        self.0.get(exchange)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ExchangeId, &Price)> {
        self.0.iter()
    }
}

impl FromIterator<(ExchangeId, Price)> for ExchangePriceMap {
    fn from_iter<I: IntoIterator<Item = (ExchangeId, Price)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// One side of an opportunity: where the price was seen and what it was.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub exchange: ExchangeId,
    pub price: Price,
}

/// A detected cross-exchange price divergence.
///
/// Field order matches the JSON report layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArbitrageOpportunity {
    /// Rendered as `YYYY-MM-DD HH:MM:SS`.
    pub timestamp: String,
    pub lowest_price: PriceQuote,
    pub highest_price: PriceQuote,
    #[serde(with = "rust_decimal::serde::float")]
    pub percentage_diff: Decimal,
}
