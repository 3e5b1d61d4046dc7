pub mod chart_store;

pub use chart_store::ChartStore;
