pub mod amortization;
pub mod quote;
