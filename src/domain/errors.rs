/// Simplified error system - no over-engineering!
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Malformed candle or indicator payload; the offending update is
    /// dropped and prior state kept.
    Validation(String),
    /// Payload could not be interpreted at all.
    Parse(String),
    /// Timestamp could not be normalized to epoch milliseconds.
    Timestamp(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Validation(msg) => write!(f, "Validation Error: {}", msg),
            StoreError::Parse(msg) => write!(f, "Parse Error: {}", msg),
            StoreError::Timestamp(msg) => write!(f, "Timestamp Error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

pub type StoreResult<T> = Result<T, StoreError>;
