use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use loan_quote_core::limits::{LoanLimits, LOAN_AMOUNT_INCREMENT, MAX_LOAN_AMOUNT, MIN_LOAN_AMOUNT};
use loan_quote_core::quote::{self, QuoteInput};

use crate::input;

/// Arguments for a loan quote
#[derive(Args)]
pub struct QuoteArgs {
    /// CSV market file with Lender, Rate and Available columns
    #[arg(long)]
    pub market: Option<String>,

    /// Path to a JSON or YAML quote document (lenders + requested_amount)
    #[arg(long, conflicts_with = "market")]
    pub input: Option<String>,

    /// Requested loan amount (overrides the amount in a quote document)
    #[arg(long)]
    pub amount: Option<Decimal>,

    /// Smallest amount that may be requested
    #[arg(long, default_value_t = MIN_LOAN_AMOUNT)]
    pub min_amount: u32,

    /// Largest amount that may be requested
    #[arg(long, default_value_t = MAX_LOAN_AMOUNT)]
    pub max_amount: u32,

    /// Requested amounts must be a multiple of this step (0 disables)
    #[arg(long, default_value_t = LOAN_AMOUNT_INCREMENT)]
    pub increment: u32,

    /// Skip the amount range and increment checks
    #[arg(long)]
    pub no_limits: bool,
}

impl QuoteArgs {
    fn limits(&self) -> LoanLimits {
        LoanLimits {
            min_amount: self.min_amount,
            max_amount: self.max_amount,
            increment: self.increment,
        }
    }
}

pub fn run_quote(args: QuoteArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut skipped: Vec<String> = Vec::new();

    let mut quote_input: QuoteInput = if let Some(ref path) = args.input {
        input::file::read_document(path)?
    } else if let Some(ref path) = args.market {
        let market = input::market::read_market(path)?;
        skipped = market.skipped;
        QuoteInput {
            lenders: market.lenders,
            requested_amount: args
                .amount
                .ok_or("--amount is required with --market")?,
        }
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("Provide --market with --amount, or a quote document via --input or stdin".into());
    };

    if let Some(amount) = args.amount {
        quote_input.requested_amount = amount;
    }

    if !args.no_limits {
        args.limits().validate(quote_input.requested_amount)?;
    }

    let mut result = quote::quote_loan(&quote_input)?;

    if !skipped.is_empty() {
        result
            .warnings
            .push(format!("Skipped {} malformed market row(s)", skipped.len()));
        result.warnings.extend(skipped);
    }

    Ok(serde_json::to_value(result)?)
}
