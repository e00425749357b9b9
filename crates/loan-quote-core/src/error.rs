use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoanQuoteError {
    #[error("Invalid argument: {field} — {reason}")]
    InvalidArgument { field: String, reason: String },

    #[error("Insufficient funds: requested {requested} but lenders can only provide {available}")]
    InsufficientFunds { requested: Decimal, available: Decimal },

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Arithmetic overflow in {context}")]
    Overflow { context: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl LoanQuoteError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        LoanQuoteError::InvalidArgument {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for LoanQuoteError {
    fn from(e: serde_json::Error) -> Self {
        LoanQuoteError::SerializationError(e.to_string())
    }
}
