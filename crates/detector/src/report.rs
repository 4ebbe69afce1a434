//! JSON report of detected opportunities.

use common::ArbitrageOpportunity;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write report to {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Renders opportunities as a JSON array indented by four spaces.
pub fn render_report(opportunities: &[ArbitrageOpportunity]) -> Result<Vec<u8>, ReportError> {
    let mut buf = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    opportunities.serialize(&mut serializer)?;
    Ok(buf)
}

/// Writes the report to `path`, replacing any existing file. Missing parent
/// directories are created.
pub fn write_report(path: &Path, opportunities: &[ArbitrageOpportunity]) -> Result<(), ReportError> {
    let rendered = render_report(opportunities)?;
    let io_error = |source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_error)?;
    }
    std::fs::write(path, rendered).map_err(io_error)?;

    info!(path = %path.display(), opportunities = opportunities.len(), "Wrote report");
    Ok(())
}
