//! Chart state store for a live candlestick view.
//!
//! Consumes a totally-ordered stream of transport events (init snapshot,
//! tick, bar close), maintains candle history, the single in-progress
//! candle and named indicator series, and exposes immutable snapshots to
//! rendering consumers. The transport itself (WebSocket/REST, reconnects)
//! lives outside this crate.

pub mod application;
pub mod domain;

pub use application::chart_store::ChartStore;
pub use domain::events::StoreEvent;
pub use domain::state::StoreSnapshot;
