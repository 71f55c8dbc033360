//! Core module - common types, config, and error handling

pub mod config;
pub mod error;
pub mod types;

pub use config::StationConfig;
pub use error::{Error, Result};
pub use types::*;
