//! Synthetic per-exchange prices.
//!
//! The feed publishes one aggregate price per instant. Each configured exchange
//! gets that price shifted by `index * 10 - 15`, where `index` is the
//! exchange's position in the configured list. This stands in for real
//! per-venue data and must stay bit-for-bit stable.

use common::{ExchangeId, ExchangePriceMap, Price};
use rust_decimal::Decimal;

/// Offset applied to the exchange at `index`: -15, -5, +5, +15, ...
pub fn simulated_offset(index: usize) -> Decimal {
    Decimal::from(index as u64) * Decimal::TEN - Decimal::from(15)
}

/// Builds the per-exchange price map for one source price.
///
/// A name listed twice keeps the offset of its first position.
pub fn simulate_exchange_prices(price: Price, exchanges: &[ExchangeId]) -> ExchangePriceMap {
    let mut prices = ExchangePriceMap::new();
    for (index, exchange) in exchanges.iter().enumerate() {
        if prices.get(exchange).is_none() {
            prices.insert(exchange.clone(), Price(price.0 + simulated_offset(index)));
        }
    }
    prices
}
