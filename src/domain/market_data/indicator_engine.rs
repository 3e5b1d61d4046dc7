//! Incremental merge of named indicator series.
//!
//! Payloads arrive precomputed from the backend. The engine only merges:
//! it never recomputes indicator math and never destroys history on an
//! update that omits it.

use super::alignment;
use super::entities::CandleSeries;
use super::value_objects::Timestamp;
use crate::domain::events::IndicatorUpdate;
use crate::domain::logging::LogComponent;
use crate::{log_debug, log_warn};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// One point of a time-series indicator, parallel to the candle history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IndicatorPoint {
    pub time: Timestamp,
    pub value: f64,
}

/// Tagged union over the two payload families an indicator can carry.
///
/// Selected by payload shape, not by indicator name: a flat number list is
/// a time series, anything else (e.g. order-block object lists keyed by
/// instance id) is kept as an opaque blob.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum IndicatorData {
    Points(Vec<IndicatorPoint>),
    Structured(Value),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorSeries {
    pub id: String,
    pub data: IndicatorData,
    pub signals: Map<String, Value>,
    pub metadata: Map<String, Value>,
}

impl IndicatorSeries {
    pub fn points(&self) -> Option<&[IndicatorPoint]> {
        match &self.data {
            IndicatorData::Points(points) => Some(points),
            IndicatorData::Structured(_) => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct IndicatorMergeEngine {
    series: HashMap<String, IndicatorSeries>,
}

impl IndicatorMergeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&IndicatorSeries> {
        self.series.get(id)
    }

    pub fn all(&self) -> &HashMap<String, IndicatorSeries> {
        &self.series
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn clear(&mut self) {
        self.series.clear();
    }

    /// Explicit removal, the only way a series disappears.
    pub fn remove(&mut self, id: &str) -> bool {
        self.series.remove(id).is_some()
    }

    /// Merge one incoming update for the named series.
    ///
    /// Empty-guard invariant: an empty `values` list is "no new
    /// information", never "clear this series". An indicator computed over
    /// a short lookback window must not wipe the rest of the history.
    pub fn merge(
        &mut self,
        id: &str,
        update: &IndicatorUpdate,
        current_bucket: Timestamp,
        history: &CandleSeries,
    ) {
        if update.values.is_empty() {
            log_debug!(
                LogComponent::Domain("IndicatorMerge"),
                "empty payload for '{}', keeping prior state",
                id
            );
            return;
        }

        let numeric = update.values.iter().all(Value::is_number);

        match self.series.get_mut(id) {
            Some(series) => {
                if !numeric {
                    series.data = IndicatorData::Structured(Value::Array(update.values.clone()));
                } else if update.values.len() == 1 {
                    let value = update.values[0].as_f64().unwrap_or(f64::NAN);
                    Self::upsert_point(series, id, current_bucket, value);
                } else {
                    // Multi-point refresh rebuilds the point list outright.
                    series.data =
                        IndicatorData::Points(Self::build_points(update, history));
                }
                shallow_merge(&mut series.signals, &update.signals);
                shallow_merge(&mut series.metadata, &update.metadata);
            }
            None => {
                let data = if numeric {
                    IndicatorData::Points(Self::build_points(update, history))
                } else {
                    IndicatorData::Structured(Value::Array(update.values.clone()))
                };
                self.series.insert(
                    id.to_string(),
                    IndicatorSeries {
                        id: id.to_string(),
                        data,
                        signals: update.signals.clone(),
                        metadata: update.metadata.clone(),
                    },
                );
            }
        }
    }

    /// Steady-state tick path: replace the point at the current bucket or
    /// append one. Appends are strictly increasing in time; out-of-order
    /// single points are dropped.
    fn upsert_point(series: &mut IndicatorSeries, id: &str, bucket: Timestamp, value: f64) {
        if !value.is_finite() {
            log_warn!(
                LogComponent::Domain("IndicatorMerge"),
                "non-finite value for '{}' at t={}, dropped",
                id,
                bucket.value()
            );
            return;
        }
        if !matches!(series.data, IndicatorData::Points(_)) {
            // Shape changed to a flat series; start a fresh point list.
            series.data = IndicatorData::Points(Vec::new());
        }
        let IndicatorData::Points(points) = &mut series.data else {
            return;
        };
        let replace = match points.last() {
            Some(last) if last.time == bucket => true,
            Some(last) if bucket.value() < last.time.value() => {
                log_debug!(
                    LogComponent::Domain("IndicatorMerge"),
                    "out-of-order point for '{}' (t={} < t={}), dropped",
                    id,
                    bucket.value(),
                    last.time.value()
                );
                return;
            }
            _ => false,
        };
        if replace {
            if let Some(last) = points.last_mut() {
                last.value = value;
            }
        } else {
            points.push(IndicatorPoint { time: bucket, value });
        }
    }

    /// Build a point list for a full payload.
    ///
    /// Timestamps come from `signals.index` when present, otherwise the
    /// values align positionally against the tail of the candle history.
    fn build_points(update: &IndicatorUpdate, history: &CandleSeries) -> Vec<IndicatorPoint> {
        let values: Vec<f64> = update.values.iter().filter_map(Value::as_f64).collect();

        let mut points: Vec<IndicatorPoint> =
            match update.signals.get("index").and_then(Value::as_array) {
                Some(index) => index
                    .iter()
                    .zip(values.iter())
                    .filter_map(|(raw, &value)| {
                        let time = time_from_value(raw)?;
                        value.is_finite()
                            .then_some(IndicatorPoint { time: Timestamp::from_millis(time), value })
                    })
                    .collect(),
                None => {
                    let candles = history.candles();
                    let n = candles.len().min(values.len());
                    candles
                        .iter()
                        .skip(candles.len() - n)
                        .zip(values.iter().skip(values.len() - n))
                        .filter(|(_, value)| value.is_finite())
                        .map(|(candle, &value)| IndicatorPoint { time: candle.time, value })
                        .collect()
                }
            };

        points.sort_by_key(|p| p.time.value());
        points.dedup_by(|next, prev| {
            if next.time == prev.time {
                prev.value = next.value;
                true
            } else {
                false
            }
        });
        points
    }
}

/// `new = {..existing, ..incoming}`: keys absent from the incoming payload
/// survive.
fn shallow_merge(existing: &mut Map<String, Value>, incoming: &Map<String, Value>) {
    for (key, value) in incoming {
        existing.insert(key.clone(), value.clone());
    }
}

fn time_from_value(raw: &Value) -> Option<u64> {
    match raw {
        Value::Number(n) => n.as_f64().and_then(alignment::normalize_epoch_ms),
        Value::String(s) => alignment::parse_text_ms(s),
        _ => None,
    }
}
