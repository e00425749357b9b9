//! Loan term and requested-amount policy.
//!
//! The quote engine itself only rejects non-positive amounts; the bounds here
//! are enforced by callers before a quote is requested.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::LoanQuoteError;
use crate::types::Money;
use crate::LoanQuoteResult;

/// Number of monthly repayments for every quoted loan.
pub const REPAYMENT_MONTHS: u32 = 36;

pub const MIN_LOAN_AMOUNT: u32 = 1000;
pub const MAX_LOAN_AMOUNT: u32 = 15000;
pub const LOAN_AMOUNT_INCREMENT: u32 = 100;

/// Accepted range and granularity of a requested loan amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanLimits {
    pub min_amount: u32,
    pub max_amount: u32,
    pub increment: u32,
}

impl Default for LoanLimits {
    fn default() -> Self {
        LoanLimits {
            min_amount: MIN_LOAN_AMOUNT,
            max_amount: MAX_LOAN_AMOUNT,
            increment: LOAN_AMOUNT_INCREMENT,
        }
    }
}

impl LoanLimits {
    /// Check that `amount` lies in `[min_amount, max_amount]` and is a whole
    /// multiple of `increment`.
    pub fn validate(&self, amount: Money) -> LoanQuoteResult<()> {
        if self.min_amount > self.max_amount {
            return Err(LoanQuoteError::invalid(
                "limits",
                format!(
                    "Minimum amount {} exceeds maximum amount {}",
                    self.min_amount, self.max_amount
                ),
            ));
        }

        let min = Decimal::from(self.min_amount);
        let max = Decimal::from(self.max_amount);
        if amount < min || amount > max {
            return Err(LoanQuoteError::invalid(
                "requested_amount",
                format!("Amount must be between {min} and {max}, got {amount}"),
            ));
        }

        if self.increment > 0 && !(amount % Decimal::from(self.increment)).is_zero() {
            return Err(LoanQuoteError::invalid(
                "requested_amount",
                format!("Amount must be a multiple of {}, got {amount}", self.increment),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_limits_accept_bounds() {
        let limits = LoanLimits::default();
        assert!(limits.validate(dec!(1000)).is_ok());
        assert!(limits.validate(dec!(15000)).is_ok());
        assert!(limits.validate(dec!(7700)).is_ok());
    }

    #[test]
    fn test_out_of_range_rejected() {
        let limits = LoanLimits::default();
        assert!(limits.validate(dec!(900)).is_err());
        assert!(limits.validate(dec!(15100)).is_err());
    }

    #[test]
    fn test_increment_enforced() {
        let limits = LoanLimits::default();
        let err = limits.validate(dec!(1050)).unwrap_err();
        match err {
            LoanQuoteError::InvalidArgument { field, .. } => assert_eq!(field, "requested_amount"),
            other => panic!("Expected InvalidArgument, got {other:?}"),
        }
        assert!(limits.validate(dec!(1000.5)).is_err());
    }

    #[test]
    fn test_zero_increment_disables_step_check() {
        let limits = LoanLimits {
            min_amount: 1,
            max_amount: 50,
            increment: 0,
        };
        assert!(limits.validate(dec!(37)).is_ok());
    }

    #[test]
    fn test_inverted_limits_rejected() {
        let limits = LoanLimits {
            min_amount: 2000,
            max_amount: 1000,
            increment: 100,
        };
        assert!(limits.validate(dec!(1500)).is_err());
    }
}
