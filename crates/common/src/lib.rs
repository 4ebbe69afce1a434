//! # Spread Scanner Common Crate
//!
//! This crate provides common data types and error definitions
//! used across the `spread-scanner` workspace.

/// Module for common error types.
pub mod errors;
/// Module for common data structures and types.
pub mod types;

// Re-export key items for easier access.
pub use errors::CommonError;
pub use types::{
    ArbitrageOpportunity, Asset, AssetPair, ExchangeId, ExchangePriceMap, Price, PricePoint,
    PriceQuote,
};
