//! Validation errors raised when constructing or submitting orders.

use thiserror::Error;

/// Errors produced by order validation.
///
/// These are surfaced synchronously to the submitter; an order that fails
/// validation is never enqueued.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum OrderError {
    /// Order quantity must be a positive integer.
    #[error("order quantity must be positive")]
    ZeroQuantity,

    /// Limit orders require a positive, finite limit price.
    #[error("limit price must be positive and finite, got {price}")]
    InvalidLimitPrice {
        /// The rejected price.
        price: f64,
    },

    /// A limit order was constructed without a price.
    #[error("limit orders require a price")]
    MissingLimitPrice,

    /// A market order was constructed with a price attached.
    #[error("market orders must not carry a price, got {price}")]
    UnexpectedPrice {
        /// The offending price.
        price: f64,
    },
}
