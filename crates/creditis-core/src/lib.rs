pub mod calendar;
pub mod error;
pub mod types;

#[cfg(feature = "lending")]
pub mod lending;

#[cfg(feature = "ledger")]
pub mod ledger;

pub use error::CreditisError;
pub use types::*;

/// Standard result type for all creditis operations
pub type CreditisResult<T> = Result<T, CreditisError>;
