pub use super::value_objects::{OHLCV, Price, Timestamp, Volume};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Domain entity - one OHLCV bar for a fixed timeframe bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Bucket start, normalized to the timeframe grid.
    pub time: Timestamp,
    pub ohlcv: OHLCV,
}

impl Candle {
    pub fn new(time: Timestamp, ohlcv: OHLCV) -> Self {
        Self { time, ohlcv }
    }

    pub fn change(&self) -> f64 {
        self.ohlcv.close.value() - self.ohlcv.open.value()
    }

    /// Percent change over the bar, guarded against a zero open.
    pub fn change_percent(&self) -> f64 {
        let open = self.ohlcv.open.value();
        if open == 0.0 {
            return 0.0;
        }
        let pct = (self.ohlcv.close.value() - open) / open * 100.0;
        if pct.is_finite() { pct } else { 0.0 }
    }
}

/// Derived read model - current price, absolute and percent change.
///
/// Never stored independently; rebuilt from the live candle (or the last
/// closed one) after every mutation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceSummary {
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
}

impl PriceSummary {
    pub fn from_candle(candle: &Candle) -> Self {
        Self {
            price: candle.ohlcv.close.value(),
            change: candle.change(),
            change_percent: candle.change_percent(),
        }
    }
}

/// Domain entity - ordered, time-deduplicated history of closed candles.
///
/// Ascending by `time` at all times, trimmed from the front past capacity.
#[derive(Debug, Clone)]
pub struct CandleSeries {
    candles: VecDeque<Candle>,
    max_size: usize,
}

impl CandleSeries {
    pub fn new(max_size: usize) -> Self {
        Self { candles: VecDeque::new(), max_size }
    }

    /// Append-or-replace-by-time insertion.
    ///
    /// A candle at an existing bucket time replaces the old one in place;
    /// otherwise the candle is inserted at its sorted position. Tolerates
    /// out-of-order delivery: a close for an older bucket lands in the
    /// middle of the series, not at the end.
    pub fn insert_or_replace(&mut self, candle: Candle) {
        if let Some(last_candle) = self.candles.back_mut() {
            if last_candle.time == candle.time {
                *last_candle = candle;
                return;
            }

            if candle.time.value() < last_candle.time.value() {
                self.insert_candle_sorted(candle);
                return;
            }
        }

        self.candles.push_back(candle);

        // Limit size for performance
        if self.candles.len() > self.max_size {
            self.candles.pop_front();
        }
    }

    /// Insert a candle while keeping time order
    fn insert_candle_sorted(&mut self, candle: Candle) {
        let insert_pos = self
            .candles
            .iter()
            .position(|c| c.time.value() >= candle.time.value())
            .unwrap_or(self.candles.len());

        // Replace the candle if one with the same timestamp exists
        if insert_pos < self.candles.len() && self.candles[insert_pos].time == candle.time {
            self.candles[insert_pos] = candle;
        } else {
            self.candles.insert(insert_pos, candle);
        }

        if self.candles.len() > self.max_size {
            self.candles.pop_front();
        }
    }

    pub fn candles(&self) -> &VecDeque<Candle> {
        &self.candles
    }

    pub fn get(&self, time: Timestamp) -> Option<&Candle> {
        self.candles.iter().find(|c| c.time == time)
    }

    pub fn latest(&self) -> Option<&Candle> {
        self.candles.back()
    }

    pub fn count(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    /// Capacity of the series (maximum candle count)
    pub fn capacity(&self) -> usize {
        self.max_size
    }

    /// Get the last closing price
    pub fn last_close(&self) -> Option<Price> {
        self.candles.back().map(|candle| candle.ohlcv.close)
    }

    pub fn to_vec(&self) -> Vec<Candle> {
        self.candles.iter().cloned().collect()
    }
}
