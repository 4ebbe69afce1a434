use crate::error::FeedError;
use crate::simulate::simulate_exchange_prices;
use chrono::{DateTime, Local};
use common::{AssetPair, ExchangeId, ExchangePriceMap, PricePoint};
use config_lib::TimestampZone;
use std::collections::HashMap;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Renders an epoch-millisecond timestamp as `YYYY-MM-DD HH:MM:SS`.
///
/// Sub-second precision is dropped.
pub fn format_timestamp(timestamp_ms: i64, zone: TimestampZone) -> Result<String, FeedError> {
    let utc = DateTime::from_timestamp_millis(timestamp_ms)
        .ok_or(FeedError::InvalidTimestamp(timestamp_ms))?;
    let rendered = match zone {
        TimestampZone::Utc => utc.format(TIMESTAMP_FORMAT).to_string(),
        TimestampZone::Local => utc.with_timezone(&Local).format(TIMESTAMP_FORMAT).to_string(),
    };
    Ok(rendered)
}

/// Simulated per-exchange prices for one trading pair, keyed by rendered
/// timestamp in the order the feed first reported each timestamp.
///
/// Feed points that render to the same second share one entry; the later
/// point's prices replace the earlier ones.
#[derive(Debug, Clone)]
pub struct PriceHistory {
    pair: AssetPair,
    entries: Vec<(String, ExchangePriceMap)>,
}

impl PriceHistory {
    pub fn build(
        pair: AssetPair,
        points: &[PricePoint],
        exchanges: &[ExchangeId],
        zone: TimestampZone,
    ) -> Result<Self, FeedError> {
        let mut entries: Vec<(String, ExchangePriceMap)> = Vec::with_capacity(points.len());
        let mut positions: HashMap<String, usize> = HashMap::with_capacity(points.len());

        for point in points {
            let timestamp = format_timestamp(point.timestamp_ms, zone)?;
            let prices = simulate_exchange_prices(point.price, exchanges);
            match positions.get(&timestamp) {
                Some(&index) => entries[index].1 = prices,
                None => {
                    positions.insert(timestamp.clone(), entries.len());
                    entries.push((timestamp, prices));
                }
            }
        }

        Ok(Self { pair, entries })
    }

    pub fn pair(&self) -> &AssetPair {
        &self.pair
    }

    pub fn entries(&self) -> &[(String, ExchangePriceMap)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::Price;
    use rust_decimal_macros::dec;

    fn exchanges() -> Vec<ExchangeId> {
        vec!["binance".into(), "coinbase".into(), "kraken".into()]
    }

    fn pair() -> AssetPair {
        "btc-usd".parse().unwrap()
    }

    #[test]
    fn test_format_timestamp_utc() {
        assert_eq!(
            format_timestamp(1704067200000, TimestampZone::Utc).unwrap(),
            "2024-01-01 00:00:00"
        );
        assert_eq!(
            format_timestamp(1704067265999, TimestampZone::Utc).unwrap(),
            "2024-01-01 00:01:05"
        );
    }

    #[test]
    fn test_format_timestamp_local_has_same_shape() {
        let rendered = format_timestamp(1704067200000, TimestampZone::Local).unwrap();
        assert_eq!(rendered.len(), "YYYY-MM-DD HH:MM:SS".len());
    }

    #[test]
    fn test_format_timestamp_out_of_range() {
        assert!(matches!(
            format_timestamp(i64::MAX, TimestampZone::Utc),
            Err(FeedError::InvalidTimestamp(i64::MAX))
        ));
    }

    #[test]
    fn test_build_keeps_feed_order() {
        let points = vec![
            PricePoint::new(1704067200000, Price(dec!(42000))),
            PricePoint::new(1704067500000, Price(dec!(42100))),
        ];
        let history = PriceHistory::build(pair(), &points, &exchanges(), TimestampZone::Utc).unwrap();

        assert_eq!(history.pair(), &pair());
        assert_eq!(history.len(), 2);
        let (first_ts, first_prices) = &history.entries()[0];
        assert_eq!(first_ts, "2024-01-01 00:00:00");
        assert_eq!(first_prices.get(&"binance".into()), Some(&Price(dec!(41985))));
        let (second_ts, second_prices) = &history.entries()[1];
        assert_eq!(second_ts, "2024-01-01 00:05:00");
        assert_eq!(second_prices.get(&"kraken".into()), Some(&Price(dec!(42105))));
    }

    #[test]
    fn test_same_second_collapses_to_later_point() {
        let points = vec![
            PricePoint::new(1704067200100, Price(dec!(100))),
            PricePoint::new(1704067500000, Price(dec!(200))),
            PricePoint::new(1704067200900, Price(dec!(300))),
        ];
        let history = PriceHistory::build(pair(), &points, &exchanges(), TimestampZone::Utc).unwrap();

        assert_eq!(history.len(), 2);
        assert_eq!(history.entries()[0].0, "2024-01-01 00:00:00");
        assert_eq!(
            history.entries()[0].1.get(&"coinbase".into()),
            Some(&Price(dec!(295)))
        );
        assert_eq!(history.entries()[1].0, "2024-01-01 00:05:00");
    }

    #[test]
    fn test_empty_series() {
        let history = PriceHistory::build(pair(), &[], &exchanges(), TimestampZone::Utc).unwrap();
        assert!(history.is_empty());
    }
}
