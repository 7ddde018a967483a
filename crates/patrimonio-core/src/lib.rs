pub mod error;
pub mod records;
pub mod types;

#[cfg(feature = "amortization")]
pub mod amortization;

#[cfg(feature = "reconciliation")]
pub mod reconciliation;

#[cfg(feature = "balance")]
pub mod balance;

#[cfg(feature = "analytics")]
pub mod analytics;

#[cfg(feature = "investment")]
pub mod investment;

pub use error::PatrimonioError;
pub use records::*;
pub use types::*;

/// Standard result type for all patrimonio operations.
pub type PatrimonioResult<T> = Result<T, PatrimonioError>;
