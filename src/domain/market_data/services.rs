use super::entities::Candle;
use crate::domain::errors::StoreError;

/// Domain service for candle validation.
///
/// Rejection is reported, never fatal: a bad candle is dropped before it
/// can reach the history buffer.
#[derive(Debug, Clone, Default)]
pub struct CandleValidator;

impl CandleValidator {
    pub fn new() -> Self {
        Self
    }

    /// Quick predicate form, used on hot paths.
    pub fn is_valid(&self, candle: &Candle) -> bool {
        candle.ohlcv.is_valid()
    }

    /// Validation with a detailed error for logging.
    pub fn validate(&self, candle: &Candle) -> Result<(), StoreError> {
        let ohlcv = &candle.ohlcv;

        if !ohlcv.open.is_finite()
            || !ohlcv.high.is_finite()
            || !ohlcv.low.is_finite()
            || !ohlcv.close.is_finite()
        {
            return Err(StoreError::Validation(format!(
                "non-finite OHLC at t={}",
                candle.time.value()
            )));
        }
        if !ohlcv.volume.value().is_finite() {
            return Err(StoreError::Validation(format!(
                "non-finite volume at t={}",
                candle.time.value()
            )));
        }

        if ohlcv.high.value() < ohlcv.low.value() {
            return Err(StoreError::Validation(
                "high price cannot be lower than low price".to_string(),
            ));
        }
        if ohlcv.high.value() < ohlcv.open.value() {
            return Err(StoreError::Validation(
                "high price cannot be lower than open price".to_string(),
            ));
        }
        if ohlcv.high.value() < ohlcv.close.value() {
            return Err(StoreError::Validation(
                "high price cannot be lower than close price".to_string(),
            ));
        }
        if ohlcv.low.value() > ohlcv.open.value() {
            return Err(StoreError::Validation(
                "low price cannot be higher than open price".to_string(),
            ));
        }
        if ohlcv.low.value() > ohlcv.close.value() {
            return Err(StoreError::Validation(
                "low price cannot be higher than close price".to_string(),
            ));
        }

        if ohlcv.volume.value() < 0.0 {
            return Err(StoreError::Validation("volume cannot be negative".to_string()));
        }

        Ok(())
    }
}
