//! Timestamp normalization and bucket alignment.
//!
//! The single boundary where unit ambiguity (epoch seconds vs milliseconds,
//! ISO strings) is resolved. Everything downstream works in milliseconds.

use super::value_objects::{Timeframe, Timestamp};
use crate::domain::logging::TimeProvider;
use chrono::{DateTime, NaiveDateTime};

/// Numeric values below this are treated as epoch seconds and scaled up.
pub const MILLIS_CUTOFF: f64 = 1e12;

/// Normalize a raw numeric epoch value to milliseconds.
///
/// Returns `None` for non-finite or negative input.
pub fn normalize_epoch_ms(raw: f64) -> Option<u64> {
    if !raw.is_finite() || raw < 0.0 {
        return None;
    }
    if raw < MILLIS_CUTOFF { Some((raw * 1000.0) as u64) } else { Some(raw as u64) }
}

/// Parse a textual timestamp to epoch milliseconds.
///
/// Accepts RFC 3339, the naive `YYYY-MM-DD HH:MM:SS` form (with `T` or
/// space separator, optional fractional seconds) and numeric text.
pub fn parse_text_ms(text: &str) -> Option<u64> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        let ms = dt.timestamp_millis();
        return if ms >= 0 { Some(ms as u64) } else { None };
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, fmt) {
            let ms = naive.and_utc().timestamp_millis();
            return if ms >= 0 { Some(ms as u64) } else { None };
        }
    }
    text.trim().parse::<f64>().ok().and_then(normalize_epoch_ms)
}

/// Floor a millisecond timestamp to the start of its timeframe bucket.
///
/// Pure and deterministic. This is the tie-breaker for every "same bucket
/// or new bucket" decision in the store.
pub fn align(ts_ms: u64, timeframe: Timeframe) -> Timestamp {
    let bucket = timeframe.duration_ms();
    Timestamp::from_millis(ts_ms / bucket * bucket)
}

/// Bucket the wall clock is currently in.
///
/// Used to decide whether an incoming tick starts a brand-new bucket even
/// before any tick carries a timestamp for it.
pub fn current_bucket(clock: &dyn TimeProvider, timeframe: Timeframe) -> Timestamp {
    align(clock.current_timestamp(), timeframe)
}
