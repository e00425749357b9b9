use clap::Args;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::{json, Value};

use loan_quote_core::amortization;
use loan_quote_core::limits::REPAYMENT_MONTHS;

/// Arguments for a single-loan monthly repayment
#[derive(Args)]
pub struct RepaymentArgs {
    /// Loan principal
    #[arg(long)]
    pub principal: Decimal,

    /// Annual interest rate as a decimal (0.07 = 7%)
    #[arg(long)]
    pub rate: Decimal,

    /// Number of monthly repayments
    #[arg(long, default_value_t = REPAYMENT_MONTHS)]
    pub periods: u32,
}

/// Arguments for estimating the annual rate behind a repayment
#[derive(Args)]
pub struct RateArgs {
    /// Loan principal
    #[arg(long)]
    pub principal: Decimal,

    /// Monthly repayment
    #[arg(long)]
    pub repayment: Decimal,

    /// Number of monthly repayments
    #[arg(long, default_value_t = REPAYMENT_MONTHS)]
    pub periods: u32,
}

pub fn run_repayment(args: RepaymentArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let monthly = amortization::monthly_repayment(args.principal, args.rate, args.periods)?;
    let total = monthly
        .checked_mul(Decimal::from(args.periods))
        .ok_or("Total repayment is out of range")?;

    Ok(json!({
        "result": {
            "monthly_repayment": monthly.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
            "total_repayment": total.round_dp_with_strategy(2, RoundingStrategy::AwayFromZero),
            "unrounded_monthly_repayment": monthly,
        },
        "assumptions": {
            "principal": args.principal,
            "annual_rate": args.rate,
            "periods": args.periods,
        },
    }))
}

pub fn run_rate(args: RateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let principal = args.principal.to_f64().ok_or("--principal is out of range")?;
    let repayment = args.repayment.to_f64().ok_or("--repayment is out of range")?;

    let estimate = amortization::estimate_annual_rate_detailed(principal, args.periods, repayment)?;
    let rate_pct = amortization::annual_rate_percent(estimate.annual_rate)?;

    let mut warnings: Vec<String> = Vec::new();
    if !estimate.converged {
        warnings.push(format!(
            "Estimate stopped after {} iterations with residual {:e}",
            estimate.iterations, estimate.residual
        ));
    }

    Ok(json!({
        "result": {
            "rate_pct": rate_pct,
            "annual_rate": estimate.annual_rate,
            "monthly_multiplier": estimate.monthly_multiplier,
            "iterations": estimate.iterations,
            "converged": estimate.converged,
        },
        "assumptions": {
            "principal": args.principal,
            "monthly_repayment": args.repayment,
            "periods": args.periods,
        },
        "warnings": warnings,
    }))
}
