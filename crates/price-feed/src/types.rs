use common::{Price, PricePoint};
use rust_decimal::Decimal;
use serde::Deserialize;

/// Body of a `market_chart` response. Only the price series is used.
#[derive(Debug, Deserialize)]
pub struct MarketChartResponse {
    pub prices: Option<Vec<RawPricePoint>>,
}

/// A `[timestampMillis, price]` element of the series.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RawPricePoint(
    pub i64,
    #[serde(with = "rust_decimal::serde::float")] pub Decimal,
);

impl From<RawPricePoint> for PricePoint {
    fn from(raw: RawPricePoint) -> Self {
        PricePoint::new(raw.0, Price(raw.1))
    }
}
