pub mod amortization;
pub mod error;
pub mod limits;
pub mod types;

#[cfg(feature = "quote")]
pub mod quote;

pub use error::LoanQuoteError;
pub use types::*;

/// Standard result type for all loan-quote operations
pub type LoanQuoteResult<T> = Result<T, LoanQuoteError>;
