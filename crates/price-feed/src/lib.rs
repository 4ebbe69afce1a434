//! # Price Feed Crate
//!
//! Retrieves historical prices for a trading pair from a market-data API and,
//! lacking real per-venue data, derives simulated per-exchange prices from the
//! single series.

pub mod error;
pub mod history;
pub mod simulate;
pub mod source;
pub mod types;

pub use error::FeedError;
pub use history::{format_timestamp, PriceHistory};
pub use simulate::{simulate_exchange_prices, simulated_offset};
pub use source::{CoinGeckoSource, PriceSource};
