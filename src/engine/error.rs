//! Engine error types.

use crate::orders::OrderError;
use thiserror::Error;

/// Errors surfaced synchronously by the engine.
///
/// Asynchronous conditions (latency-budget violations, cancels of unknown
/// orders, noise on a dormant book) are counted or ignored per the
/// propagation policy, never raised.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum EngineError {
    /// The submitted order failed validation; nothing was enqueued.
    #[error("invalid order: {0}")]
    InvalidOrder(#[from] OrderError),

    /// The order references a symbol the engine was not constructed with.
    #[error("unknown symbol: {symbol}")]
    UnknownSymbol {
        /// The unrecognized symbol.
        symbol: String,
    },

    /// The configured simulation speed is not a positive finite number.
    #[error("simulation speed must be positive and finite, got {speed}")]
    InvalidSimulationSpeed {
        /// The rejected speed factor.
        speed: f64,
    },
}
