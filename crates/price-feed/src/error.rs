use std::time::Duration;
use thiserror::Error;

/// Failures while retrieving or interpreting a price series.
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Unexpected HTTP status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Response has no 'prices' series")]
    MissingPrices,

    #[error("Timestamp {0}ms is out of range")]
    InvalidTimestamp(i64),
}

impl FeedError {
    /// Whether another attempt at the same request may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            FeedError::Transport(_) | FeedError::Timeout(_) => true,
            FeedError::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display() {
        let err = FeedError::Status {
            status: 404,
            body: "coin not found".to_string(),
        };
        assert_eq!(format!("{}", err), "Unexpected HTTP status 404: coin not found");
    }

    #[test]
    fn test_missing_prices_display() {
        assert_eq!(
            format!("{}", FeedError::MissingPrices),
            "Response has no 'prices' series"
        );
    }

    #[test]
    fn test_transient_classification() {
        let status = |status| FeedError::Status {
            status,
            body: String::new(),
        };
        assert!(status(429).is_transient());
        assert!(status(500).is_transient());
        assert!(status(503).is_transient());
        assert!(!status(400).is_transient());
        assert!(!status(404).is_transient());
        assert!(FeedError::Timeout(Duration::from_secs(1)).is_transient());
        assert!(!FeedError::MissingPrices.is_transient());
        assert!(!FeedError::InvalidRequest("days".into()).is_transient());
    }
}
