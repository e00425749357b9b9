pub mod allocation;
pub mod engine;

pub use allocation::{allocate, compare_lenders, order_lenders, Allocation};
pub use engine::{compute_quote, quote_loan, LenderAllocation, QuoteInput, QuoteOutput};
