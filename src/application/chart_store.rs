//! The owned chart state object.
//!
//! All mutation funnels through [`ChartStore::apply`]; rendering consumers
//! read accessors or take an immutable [`StoreSnapshot`]. Handlers run to
//! completion on a single event at a time, which is what makes the
//! read-old-live-candle-then-replace sequences safe without locking.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::errors::StoreError;
use crate::domain::events::{CandlePayload, IndicatorUpdate, InitPayload, StoreEvent, TickPayload};
use crate::domain::logging::{LogComponent, SystemTimeProvider, TimeProvider};
use crate::domain::market_data::services::CandleValidator;
use crate::domain::market_data::{
    Candle, CandleSeries, IndicatorMergeEngine, LiveCandleBuilder, Price, PriceSummary,
    TickOutcome, Timeframe, Timestamp, Volume, alignment,
};
use crate::domain::state::{StoreFlags, StoreSnapshot};
use crate::{log_debug, log_warn};

/// History retention limit, matching the chart's render budget.
pub const DEFAULT_MAX_CANDLES: usize = 1000;

pub struct ChartStore {
    timeframe: Timeframe,
    history: CandleSeries,
    live: LiveCandleBuilder,
    indicators: IndicatorMergeEngine,
    summary: Option<PriceSummary>,
    flags: StoreFlags,
    last_error: Option<StoreError>,
    validator: CandleValidator,
    clock: Box<dyn TimeProvider>,
}

impl ChartStore {
    pub fn new(timeframe: Timeframe) -> Self {
        Self::with_clock(timeframe, Box::new(SystemTimeProvider::new()))
    }

    /// Construct with an injected clock; the wall-clock bucket decides
    /// rollovers for ticks that carry no timestamp.
    pub fn with_clock(timeframe: Timeframe, clock: Box<dyn TimeProvider>) -> Self {
        Self {
            timeframe,
            history: CandleSeries::new(DEFAULT_MAX_CANDLES),
            live: LiveCandleBuilder::new(),
            indicators: IndicatorMergeEngine::new(),
            summary: None,
            flags: StoreFlags { loading: true, ..StoreFlags::default() },
            last_error: None,
            validator: CandleValidator::new(),
            clock,
        }
    }

    /// The single mutation entry point.
    pub fn apply(&mut self, event: StoreEvent) {
        match event {
            StoreEvent::Init(payload) => self.on_init(payload),
            StoreEvent::Tick { candle, indicators } => self.on_tick(&candle, &indicators),
            StoreEvent::Close { candle, indicators } => self.on_close(&candle, &indicators),
        }
    }

    fn on_init(&mut self, payload: InitPayload) {
        self.history = CandleSeries::new(self.history.capacity());
        self.live.reset();
        self.indicators.clear();

        for candle_payload in &payload.candles {
            match candle_payload.to_candle(self.timeframe) {
                Ok(candle) => self.insert_into_history(candle),
                Err(err) => {
                    log_warn!(
                        LogComponent::Application("ChartStore"),
                        "snapshot candle dropped: {}",
                        err
                    );
                    self.record_error(err);
                }
            }
        }

        let bucket = self
            .history
            .latest()
            .map(|c| c.time)
            .unwrap_or_else(|| alignment::current_bucket(self.clock.as_ref(), self.timeframe));
        for (id, update) in &payload.indicators {
            self.indicators.merge(id, update, bucket, &self.history);
        }

        self.flags.loading = false;
        self.refresh_summary();
        log_debug!(
            LogComponent::Application("ChartStore"),
            "initialized with {} candles, {} indicators",
            self.history.count(),
            self.indicators.len()
        );
    }

    fn on_tick(&mut self, tick: &TickPayload, indicators: &HashMap<String, IndicatorUpdate>) {
        if !tick.close.is_finite() {
            let err = StoreError::Validation(format!("non-finite tick price {}", tick.close));
            log_warn!(LogComponent::Application("ChartStore"), "tick dropped: {}", err);
            self.record_error(err);
            return;
        }
        let volume = if tick.volume.is_finite() && tick.volume > 0.0 { tick.volume } else { 0.0 };

        let ms = match &tick.time {
            Some(raw) => match raw.epoch_ms() {
                Ok(ms) => ms,
                Err(err) => {
                    log_warn!(
                        LogComponent::Application("ChartStore"),
                        "tick timestamp unusable ({}), falling back to wall clock",
                        err
                    );
                    self.record_error(err);
                    self.clock.current_timestamp()
                }
            },
            None => self.clock.current_timestamp(),
        };
        let bucket = alignment::align(ms, self.timeframe);

        let seed = self.history.last_close();
        let outcome =
            self.live.apply_tick(bucket, Price::from(tick.close), Volume::from(volume), seed);
        match outcome {
            TickOutcome::RolledOver(old) => {
                // Self-healing path for transports that never emitted a
                // close for the old bucket; a later authoritative close
                // overwrites.
                self.insert_into_history(old);
            }
            TickOutcome::Stale => {
                // Delayed tick for a bucket that already rolled over. Only
                // a full close event may revise a confirmed bucket.
                log_debug!(
                    LogComponent::Application("ChartStore"),
                    "stale tick for bucket t={} dropped",
                    bucket.value()
                );
                return;
            }
            TickOutcome::Opened | TickOutcome::Updated => {}
        }

        self.merge_indicators(indicators, bucket);
        self.refresh_summary();
    }

    fn on_close(&mut self, payload: &CandlePayload, indicators: &HashMap<String, IndicatorUpdate>) {
        let candle = match payload.to_candle(self.timeframe) {
            Ok(candle) => candle,
            Err(err) => {
                log_warn!(LogComponent::Application("ChartStore"), "close dropped: {}", err);
                self.record_error(err);
                return;
            }
        };
        if let Err(err) = self.validator.validate(&candle) {
            log_warn!(LogComponent::Application("ChartStore"), "close rejected: {}", err);
            self.record_error(err);
            return;
        }

        // History first, then conditionally clear live state: a close that
        // arrives after a tick-driven rollover overwrites the promoted
        // candle instead of duplicating it.
        let bucket = candle.time;
        self.history.insert_or_replace(candle);
        self.live.close_bucket(bucket);

        self.merge_indicators(indicators, bucket);
        self.refresh_summary();
    }

    fn merge_indicators(&mut self, updates: &HashMap<String, IndicatorUpdate>, bucket: Timestamp) {
        for (id, update) in updates {
            self.indicators.merge(id, update, bucket, &self.history);
        }
    }

    fn insert_into_history(&mut self, candle: Candle) {
        match self.validator.validate(&candle) {
            Ok(()) => self.history.insert_or_replace(candle),
            Err(err) => {
                log_warn!(
                    LogComponent::Application("ChartStore"),
                    "candle rejected at t={}: {}",
                    candle.time.value(),
                    err
                );
                self.record_error(err);
            }
        }
    }

    fn refresh_summary(&mut self) {
        self.summary =
            self.live.live().or_else(|| self.history.latest()).map(PriceSummary::from_candle);
    }

    fn record_error(&mut self, err: StoreError) {
        self.flags.has_error = true;
        self.last_error = Some(err);
    }

    /// Explicit user/request-driven removal; aggregation never removes a
    /// series on its own.
    pub fn remove_indicator(&mut self, id: &str) -> bool {
        self.indicators.remove(id)
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.flags.loading = loading;
    }

    pub fn set_connected(&mut self, connected: bool) {
        self.flags.connected = connected;
    }

    pub fn clear_error(&mut self) {
        self.flags.has_error = false;
        self.last_error = None;
    }

    pub fn timeframe(&self) -> Timeframe {
        self.timeframe
    }

    pub fn history(&self) -> &CandleSeries {
        &self.history
    }

    pub fn live_candle(&self) -> Option<&Candle> {
        self.live.live()
    }

    pub fn previous_live_candle(&self) -> Option<&Candle> {
        self.live.previous()
    }

    pub fn indicators(&self) -> &IndicatorMergeEngine {
        &self.indicators
    }

    pub fn summary(&self) -> Option<PriceSummary> {
        self.summary
    }

    pub fn flags(&self) -> StoreFlags {
        self.flags
    }

    pub fn last_error(&self) -> Option<&StoreError> {
        self.last_error.as_ref()
    }

    /// Immutable snapshot for rendering consumers.
    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            timeframe: self.timeframe,
            candles: Arc::new(self.history.to_vec()),
            live_candle: self.live.live().cloned(),
            indicators: Arc::new(self.indicators.all().clone()),
            summary: self.summary,
            flags: self.flags,
        }
    }
}
