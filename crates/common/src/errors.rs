use thiserror::Error;

/// Common error types for the application.
#[derive(Error, Debug, PartialEq)]
pub enum CommonError {
    /// A trading pair string that is not of the form `BASE-QUOTE`.
    #[error("Invalid trading pair '{0}': expected BASE-QUOTE")]
    InvalidPair(String),

    /// An asset symbol that is empty or contains separators.
    #[error("Invalid asset symbol: '{0}'")]
    InvalidAsset(String),

    /// An exchange name that is empty.
    #[error("Invalid exchange name: '{0}'")]
    InvalidExchange(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_pair_display() {
        let err = CommonError::InvalidPair("btcusd".to_string());
        assert_eq!(
            format!("{}", err),
            "Invalid trading pair 'btcusd': expected BASE-QUOTE"
        );
    }

    #[test]
    fn test_invalid_asset_display() {
        let err = CommonError::InvalidAsset("".to_string());
        assert_eq!(format!("{}", err), "Invalid asset symbol: ''");
    }

    #[test]
    fn test_invalid_exchange_display() {
        let err = CommonError::InvalidExchange(" ".to_string());
        assert_eq!(format!("{}", err), "Invalid exchange name: ' '");
    }
}
