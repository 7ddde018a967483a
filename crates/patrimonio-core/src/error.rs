use rust_decimal::Decimal;
use thiserror::Error;

/// Errors produced by the calculation library. Validation problems name the
/// offending field; arithmetic dead ends carry enough context to explain the
/// rejection to the user.
#[derive(Debug, Error)]
pub enum PatrimonioError {
    #[error("Invalid value for '{field}': {reason}")]
    InvalidInput { field: String, reason: String },

    /// The requested terms cannot produce a repayable loan, e.g. a payment
    /// that does not cover the first period's interest.
    #[error("Unworkable terms: {0}")]
    FinancialImpossibility(String),

    #[error("{function} did not converge within {iterations} iterations (last delta {last_delta})")]
    ConvergenceFailure {
        function: String,
        iterations: u32,
        last_delta: Decimal,
    },

    #[error("Not enough data: {0}")]
    InsufficientData(String),

    #[error("Division by zero while computing {context}")]
    DivisionByZero { context: String },

    #[error("Calendar error: {0}")]
    DateError(String),

    #[error("Serialization failed: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for PatrimonioError {
    fn from(e: serde_json::Error) -> Self {
        PatrimonioError::SerializationError(e.to_string())
    }
}
