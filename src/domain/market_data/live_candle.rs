//! In-progress candle state machine.
//!
//! At most one live candle exists at any time. Ticks mutate it in place
//! while the bucket matches; a bucket change promotes the old candle so
//! the store can merge it into history even when the transport never sent
//! an explicit close for it.

use super::entities::Candle;
use super::value_objects::{OHLCV, Price, Timestamp, Volume};

/// What a tick did to the live candle.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// No live candle existed; a fresh one was opened.
    Opened,
    /// The live candle for the same bucket was updated in place.
    Updated,
    /// The tick landed in a newer bucket. The carried candle is the old
    /// live candle, to be merged into history by the caller.
    RolledOver(Candle),
    /// The tick's bucket is older than the live candle's. The live candle
    /// is untouched; a confirmed bucket never reopens.
    Stale,
}

#[derive(Debug, Clone, Default)]
pub struct LiveCandleBuilder {
    live: Option<Candle>,
    previous: Option<Candle>,
}

impl LiveCandleBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live(&self) -> Option<&Candle> {
        self.live.as_ref()
    }

    /// Most recently promoted or closed candle.
    pub fn previous(&self) -> Option<&Candle> {
        self.previous.as_ref()
    }

    pub fn reset(&mut self) {
        self.live = None;
        self.previous = None;
    }

    /// Drive the state machine with one tick.
    ///
    /// `bucket` is the already-aligned bucket the tick belongs to and
    /// `seed_close` the last historical close, used to seed the open of a
    /// freshly opened candle so the live bar joins history without a gap.
    pub fn apply_tick(
        &mut self,
        bucket: Timestamp,
        price: Price,
        volume: Volume,
        seed_close: Option<Price>,
    ) -> TickOutcome {
        match self.live.take() {
            None => {
                self.live = Some(Self::open_candle(bucket, price, volume, seed_close));
                TickOutcome::Opened
            }
            Some(mut candle) if candle.time == bucket => {
                if price > candle.ohlcv.high {
                    candle.ohlcv.high = price;
                }
                if price < candle.ohlcv.low {
                    candle.ohlcv.low = price;
                }
                candle.ohlcv.close = price;
                candle.ohlcv.volume = Volume::from(candle.ohlcv.volume.value() + volume.value());
                self.live = Some(candle);
                TickOutcome::Updated
            }
            Some(candle) if bucket.value() < candle.time.value() => {
                self.live = Some(candle);
                TickOutcome::Stale
            }
            Some(old) => {
                // Rollover without an explicit close: promote the old bar,
                // open the next one at its closing price.
                let seed = old.ohlcv.close;
                self.previous = Some(old.clone());
                self.live = Some(Self::open_candle(bucket, price, volume, Some(seed)));
                TickOutcome::RolledOver(old)
            }
        }
    }

    /// Handle an authoritative close for `bucket`.
    ///
    /// Clears the live candle only when it belongs to the closed bucket;
    /// a live candle already rolled over to a newer bucket is untouched.
    /// Returns whether the live candle was cleared.
    pub fn close_bucket(&mut self, bucket: Timestamp) -> bool {
        match &self.live {
            Some(candle) if candle.time == bucket => {
                self.previous = self.live.take();
                true
            }
            _ => false,
        }
    }

    fn open_candle(
        bucket: Timestamp,
        price: Price,
        volume: Volume,
        seed_close: Option<Price>,
    ) -> Candle {
        let open = seed_close.unwrap_or(price);
        let high = if price > open { price } else { open };
        let low = if price < open { price } else { open };
        Candle::new(bucket, OHLCV::new(open, high, low, price, volume))
    }
}
