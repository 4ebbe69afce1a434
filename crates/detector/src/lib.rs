//! # Spread Detector Crate
//!
//! This crate detects cross-exchange price divergences in simulated per-exchange
//! prices, drives a full scan over the configured trading pairs, and writes the
//! resulting report.

pub mod report;
pub mod service;
pub mod spread;

// Re-export the main service struct for easy access.
pub use report::{write_report, ReportError};
pub use service::{ScanError, ScanReport, ScanService, ScanSettings};
pub use spread::{detect, detect_at, detect_batch, DetectorConfig, Spread, SpreadDetector};
