//! Market data aggregate containing entities, services and value objects.

pub mod alignment;
pub mod entities;
pub mod indicator_engine;
pub mod live_candle;
pub mod services;
pub mod value_objects;

pub use entities::*;
pub use indicator_engine::*;
pub use live_candle::*;
pub use value_objects::*;
