//! Blended loan quotes across a pool of lenders.
//!
//! Lenders are ordered cheapest first, the requested principal is allocated
//! greedily, each slice is amortized at its lender's rate and the slices are
//! summed into a single monthly repayment. The blended annual rate is then
//! recovered from that repayment.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use crate::amortization::{self, RateEstimate};
use crate::error::LoanQuoteError;
use crate::limits::REPAYMENT_MONTHS;
use crate::quote::allocation::{allocate, order_lenders};
use crate::types::{with_metadata, ComputationOutput, Lender, Money, QuoteResult, Rate};
use crate::LoanQuoteResult;

// ---------------------------------------------------------------------------
// Input / Output Types
// ---------------------------------------------------------------------------

/// Input for a quote with full breakdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteInput {
    pub lenders: Vec<Lender>,
    pub requested_amount: Money,
}

/// A funded slice of the loan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LenderAllocation {
    pub name: String,
    pub rate: Rate,
    pub amount: u32,
    /// Unrounded repayment owed to this lender each month.
    pub monthly_repayment: Money,
}

/// Quote plus the allocation it was built from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteOutput {
    pub quote: QuoteResult,
    /// Funded slices in allocation order.
    pub allocations: Vec<LenderAllocation>,
    pub rate_estimate: RateEstimate,
}

impl QuoteInput {
    /// Parse a quote request from JSON.
    pub fn from_json(json: &str) -> LoanQuoteResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

struct QuoteBreakdown {
    output: QuoteOutput,
    truncated: bool,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Quote a loan of `requested_amount` from `lenders` over the fixed term.
///
/// Only the integer part of `requested_amount` is allocated.
pub fn compute_quote(lenders: &[Lender], requested_amount: Money) -> LoanQuoteResult<QuoteResult> {
    build_quote(lenders, requested_amount).map(|b| b.output.quote)
}

/// Quote a loan and report which lenders fund it, wrapped in the standard
/// output envelope.
pub fn quote_loan(input: &QuoteInput) -> LoanQuoteResult<ComputationOutput<QuoteOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let breakdown = build_quote(&input.lenders, input.requested_amount)?;

    if breakdown.truncated {
        warnings.push(format!(
            "Requested amount {} has a fractional part; only {} was allocated",
            input.requested_amount,
            input.requested_amount.trunc()
        ));
    }
    let estimate = &breakdown.output.rate_estimate;
    if !estimate.converged {
        warnings.push(format!(
            "Rate estimate stopped after {} iterations with residual {:e}",
            estimate.iterations, estimate.residual
        ));
    }

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "term_months": REPAYMENT_MONTHS,
        "lender_count": input.lenders.len(),
        "ordering": "rate ascending, then available amount descending",
        "monthly_rounding": "half-up to 2dp",
        "total_rounding": "up to 2dp",
    });

    Ok(with_metadata(
        "Greedy lender allocation with amortized repayment (Newton-Raphson rate estimate)",
        &assumptions,
        warnings,
        elapsed,
        breakdown.output,
    ))
}

// ---------------------------------------------------------------------------
// Internal
// ---------------------------------------------------------------------------

fn build_quote(lenders: &[Lender], requested_amount: Money) -> LoanQuoteResult<QuoteBreakdown> {
    let principal = requested_principal(requested_amount)?;
    let truncated = !requested_amount.fract().is_zero();

    let ordered = order_lenders(lenders);
    let slices = allocate(&ordered, principal)?;

    let mut allocations = Vec::with_capacity(slices.len());
    let mut monthly_sum = Decimal::ZERO;
    for slice in &slices {
        let repayment = amortization::monthly_repayment(
            Decimal::from(slice.amount),
            slice.lender.rate,
            REPAYMENT_MONTHS,
        )?;
        monthly_sum += repayment;
        allocations.push(LenderAllocation {
            name: slice.lender.name.clone(),
            rate: slice.lender.rate,
            amount: slice.amount,
            monthly_repayment: repayment,
        });
    }

    let total = monthly_sum
        .checked_mul(Decimal::from(REPAYMENT_MONTHS))
        .ok_or_else(|| LoanQuoteError::Overflow {
            context: "total repayment".into(),
        })?;

    let monthly_f64 = monthly_sum.to_f64().ok_or_else(|| {
        LoanQuoteError::invalid("monthly_repayment", "Monthly repayment is not representable as f64")
    })?;
    let rate_estimate =
        amortization::estimate_annual_rate_detailed(f64::from(principal), REPAYMENT_MONTHS, monthly_f64)?;

    debug!(
        principal,
        lenders_used = allocations.len(),
        monthly = %monthly_sum,
        annual_rate = rate_estimate.annual_rate,
        "quote computed"
    );

    let quote = QuoteResult {
        requested_amount,
        rate_pct: amortization::annual_rate_percent(rate_estimate.annual_rate)?,
        monthly_repayment: monthly_sum.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
        total_repayment: total.round_dp_with_strategy(2, RoundingStrategy::AwayFromZero),
    };

    Ok(QuoteBreakdown {
        output: QuoteOutput {
            quote,
            allocations,
            rate_estimate,
        },
        truncated,
    })
}

fn requested_principal(requested_amount: Money) -> LoanQuoteResult<u32> {
    let whole = requested_amount.trunc();
    if whole <= Decimal::ZERO {
        return Err(LoanQuoteError::invalid(
            "requested_amount",
            format!("Requested amount must be at least 1, got {requested_amount}"),
        ));
    }
    whole.to_u32().ok_or_else(|| {
        LoanQuoteError::invalid(
            "requested_amount",
            format!("Requested amount {requested_amount} is too large"),
        )
    })
}
