//! Error handling - per-request, recoverable failures

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Forecourt error taxonomy.
///
/// Every failure is per-request: nothing here is fatal to the process, and a
/// failed purchase never leaves partially-reserved state behind.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// Malformed input (non-positive amount, non-positive price, bad stock).
    /// Surfaced immediately; no counters move.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// No pump of the requested category can cover the requested amount.
    /// Counted once in `cancellations_no_gas` by the failed selection.
    #[error("not enough gas available for this request")]
    NotEnoughGas,

    /// Current price exceeds the buyer's ceiling. Counted once in
    /// `cancellations_too_expensive`; no pump is touched.
    #[error("gas too expensive for the buyer's price ceiling")]
    GasTooExpensive,
}
