use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::market_data::entities::{Candle, PriceSummary};
use crate::domain::market_data::indicator_engine::IndicatorSeries;
use crate::domain::market_data::value_objects::Timeframe;

/// Loading/connectivity flags, set by the transport collaborator and read
/// by an external error-display layer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StoreFlags {
    pub loading: bool,
    pub connected: bool,
    pub has_error: bool,
}

/// Immutable view handed to rendering consumers.
///
/// Every mutation path replaces rather than deep-mutates, so a snapshot
/// always observes one consistent state.
#[derive(Clone, Debug)]
pub struct StoreSnapshot {
    pub timeframe: Timeframe,
    pub candles: Arc<Vec<Candle>>,
    pub live_candle: Option<Candle>,
    pub indicators: Arc<HashMap<String, IndicatorSeries>>,
    pub summary: Option<PriceSummary>,
    pub flags: StoreFlags,
}
