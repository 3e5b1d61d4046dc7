//! Transport-facing event surface.
//!
//! The wire protocol itself (WebSocket frames, REST responses) belongs to
//! the transport collaborator; these are the shapes it hands over after
//! decoding. Three event kinds drive every mutation of the store.

use crate::domain::errors::{StoreError, StoreResult};
use crate::domain::market_data::alignment;
use crate::domain::market_data::{Candle, OHLCV, Price, Timeframe, Volume};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Timestamp as delivered by the transport: numeric epoch seconds or
/// milliseconds, or an ISO string. Normalized exactly once, at this
/// boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawTimestamp {
    Numeric(f64),
    Text(String),
}

impl RawTimestamp {
    pub fn epoch_ms(&self) -> StoreResult<u64> {
        match self {
            RawTimestamp::Numeric(raw) => alignment::normalize_epoch_ms(*raw)
                .ok_or_else(|| StoreError::Timestamp(format!("unusable epoch value {}", raw))),
            RawTimestamp::Text(text) => alignment::parse_text_ms(text)
                .ok_or_else(|| StoreError::Timestamp(format!("unparseable timestamp '{}'", text))),
        }
    }
}

/// Full candle as carried by init snapshots and close events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandlePayload {
    pub time: RawTimestamp,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: f64,
}

impl CandlePayload {
    /// Convert to a domain candle; the bucket time is recomputed through
    /// alignment rather than trusted from the event.
    pub fn to_candle(&self, timeframe: Timeframe) -> StoreResult<Candle> {
        let ms = self.time.epoch_ms()?;
        Ok(Candle::new(
            alignment::align(ms, timeframe),
            OHLCV::new(
                Price::from(self.open),
                Price::from(self.high),
                Price::from(self.low),
                Price::from(self.close),
                Volume::from(self.volume),
            ),
        ))
    }
}

/// Partial candle carried by tick events: just price and volume, with an
/// optional source timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickPayload {
    #[serde(default)]
    pub time: Option<RawTimestamp>,
    pub close: f64,
    #[serde(default)]
    pub volume: f64,
}

/// One indicator's incoming payload.
///
/// `values` is either a flat number list (time series) or a list of
/// structured objects (opaque blob); `signals` may carry an explicit
/// `index` time list; both side maps are shallow-merged on update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndicatorUpdate {
    #[serde(default)]
    pub values: Vec<Value>,
    #[serde(default)]
    pub signals: Map<String, Value>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

/// Initialization snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InitPayload {
    #[serde(default)]
    pub candles: Vec<CandlePayload>,
    #[serde(default)]
    pub indicators: HashMap<String, IndicatorUpdate>,
}

/// The three event kinds the store accepts, tagged for transports that
/// deliver JSON messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreEvent {
    Init(InitPayload),
    Tick {
        candle: TickPayload,
        #[serde(default)]
        indicators: HashMap<String, IndicatorUpdate>,
    },
    Close {
        candle: CandlePayload,
        #[serde(default)]
        indicators: HashMap<String, IndicatorUpdate>,
    },
}
