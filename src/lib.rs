//! Forecourt - Core Library
//! Concurrent fuel-station core: pump reservation, pricing, accounting

// Public modules
pub mod core;
pub mod registry;
pub mod station;

// Re-exports
pub use crate::core::types::{FuelCategory, GasPump, StationStats};
pub use crate::core::{Error, Result};
pub use registry::PumpRegistry;
pub use station::GasStation;
