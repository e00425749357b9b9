//! Amortized loan mathematics.
//!
//! Converts between (principal, annual rate, term) and a level monthly
//! repayment, and inverts that relationship with Newton-Raphson to recover an
//! approximate annual rate from (principal, term, monthly repayment).

use rust_decimal::{Decimal, MathematicalOps, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::LoanQuoteError;
use crate::types::{Money, Rate};
use crate::LoanQuoteResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Fractional digits kept by every intermediate decimal division.
pub const INTERNAL_SCALE: u32 = 10;
pub const NEWTON_EPSILON: f64 = 0.00001;
pub const NEWTON_MAX_ITERATIONS: u32 = 1000;

const MONTHS_PER_YEAR: Decimal = dec!(12);
/// Repayment shortfall below principal / periods absorbed as rounding noise
/// from the internal scale.
const REPAYMENT_SHORTFALL_TOLERANCE: f64 = 0.000001;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Result of inverting the annuity formula.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateEstimate {
    /// Annualised rate in fractional form (0.10 = 10%).
    pub annual_rate: f64,
    /// Root found for m = 1 + monthly rate.
    pub monthly_multiplier: f64,
    pub iterations: u32,
    /// f(m) at the returned multiplier.
    pub residual: f64,
    /// False when the iteration cap was hit before |f(m)| <= epsilon.
    pub converged: bool,
}

struct NewtonOutcome {
    root: f64,
    iterations: u32,
    residual: f64,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Level monthly repayment for an amortized loan.
///
/// Every division is rounded half-up to [`INTERNAL_SCALE`] digits. The result
/// is not rounded to presentation precision. A rate whose monthly share rounds
/// to zero at that scale is repaid as a zero-rate loan.
///
/// `(1 + r/12)^periods` must fit in a [`Decimal`] (about 7.9e28). Terms long
/// enough to exceed that at the given rate are rejected as
/// [`LoanQuoteError::InvalidArgument`] on `periods`; the fixed 36-month term
/// stays within range for any annual rate below roughly 63 (6300%).
pub fn monthly_repayment(principal: Money, annual_rate: Rate, periods: u32) -> LoanQuoteResult<Money> {
    if principal <= Decimal::ZERO {
        return Err(LoanQuoteError::invalid(
            "principal",
            format!("Principal must be positive, got {principal}"),
        ));
    }
    if annual_rate < Decimal::ZERO {
        return Err(LoanQuoteError::invalid(
            "annual_rate",
            format!("Annual interest rate must be non-negative, got {annual_rate}"),
        ));
    }
    if periods == 0 {
        return Err(LoanQuoteError::invalid(
            "periods",
            "Number of payment periods must be > 0",
        ));
    }

    let nper = Decimal::from(periods);

    if annual_rate.is_zero() {
        return divide(principal, nper, "zero-rate repayment");
    }

    let monthly_rate = divide(annual_rate, MONTHS_PER_YEAR, "monthly rate")?;
    // below the internal scale the monthly rate is indistinguishable from zero
    if monthly_rate.is_zero() {
        return divide(principal, nper, "zero-rate repayment");
    }

    let growth = (Decimal::ONE + monthly_rate)
        .checked_powu(u64::from(periods))
        .ok_or_else(|| {
            LoanQuoteError::invalid(
                "periods",
                format!("(1 + {monthly_rate})^{periods} exceeds the decimal range; term too long for this rate"),
            )
        })?;
    let discount = divide(Decimal::ONE, growth, "discount factor")?;
    let annuity_denominator = Decimal::ONE - discount;

    let interest = principal.checked_mul(monthly_rate).ok_or_else(|| {
        LoanQuoteError::invalid(
            "principal",
            format!("Principal {principal} times monthly rate {monthly_rate} exceeds the decimal range"),
        )
    })?;

    divide(interest, annuity_denominator, "annuity denominator")
}

/// Approximate annual rate (fractional form) implied by a monthly repayment.
pub fn estimate_annual_rate(principal: f64, periods: u32, monthly_repayment: f64) -> LoanQuoteResult<f64> {
    estimate_annual_rate_detailed(principal, periods, monthly_repayment).map(|e| e.annual_rate)
}

/// Approximate annual rate together with the root-finder diagnostics.
///
/// Solves `f(m) = (P + M)·m^n − P·m^(n+1) − M = 0` for the monthly multiplier
/// `m`, starting from `1 + M/P`. Iteration stops once `|f(m)| <= 1e-5` or after
/// [`NEWTON_MAX_ITERATIONS`] steps; hitting the cap is not an error and the
/// last iterate is returned with `converged = false`.
pub fn estimate_annual_rate_detailed(
    principal: f64,
    periods: u32,
    monthly_repayment: f64,
) -> LoanQuoteResult<RateEstimate> {
    if !principal.is_finite() || principal <= 0.0 {
        return Err(LoanQuoteError::invalid(
            "principal",
            format!("Principal must be positive, got {principal}"),
        ));
    }
    if periods == 0 {
        return Err(LoanQuoteError::invalid("periods", "Term must be > 0"));
    }
    let n = i32::try_from(periods)
        .map_err(|_| LoanQuoteError::invalid("periods", format!("Term {periods} is too large")))?;
    if !monthly_repayment.is_finite() {
        return Err(LoanQuoteError::invalid(
            "monthly_repayment",
            "Monthly repayment must be a finite number",
        ));
    }
    let minimum = principal / f64::from(periods);
    if minimum - monthly_repayment > REPAYMENT_SHORTFALL_TOLERANCE {
        return Err(LoanQuoteError::invalid(
            "monthly_repayment",
            format!(
                "Monthly repayment {monthly_repayment} cannot pay off {principal} in {periods} periods even without interest"
            ),
        ));
    }

    let p = principal;
    let pmt = monthly_repayment;
    let nf = f64::from(periods);

    let f = |m: f64| (p + pmt) * m.powi(n) - p * m.powi(n + 1) - pmt;
    let df = |m: f64| (p + pmt) * nf * m.powi(n - 1) - p * (nf + 1.0) * m.powi(n);

    // Assume the whole payment is interest for the starting point.
    let guess = 1.0 + pmt / p;
    let outcome = newton_raphson(f, df, guess, NEWTON_MAX_ITERATIONS);

    let converged = outcome.residual.abs() <= NEWTON_EPSILON;
    if converged {
        debug!(
            iterations = outcome.iterations,
            residual = outcome.residual,
            "rate estimate converged"
        );
    } else {
        warn!(
            iterations = outcome.iterations,
            residual = outcome.residual,
            principal,
            monthly_repayment,
            "rate estimate stopped before reaching tolerance"
        );
    }

    Ok(RateEstimate {
        annual_rate: 12.0 * (outcome.root - 1.0),
        monthly_multiplier: outcome.root,
        iterations: outcome.iterations,
        residual: outcome.residual,
        converged,
    })
}

/// Fractional annual rate as a percentage at 1 decimal place, half-up.
pub fn annual_rate_percent(annual_rate: f64) -> LoanQuoteResult<Decimal> {
    let pct = Decimal::from_f64_retain(annual_rate * 100.0).ok_or_else(|| {
        LoanQuoteError::invalid("annual_rate", format!("Rate estimate {annual_rate} is not finite"))
    })?;
    let mut rounded = pct.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
    if rounded.is_zero() {
        // -0.0 reads badly in a quote
        rounded.set_sign_positive(true);
    }
    Ok(rounded)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn round_internal(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(INTERNAL_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

fn divide(numerator: Decimal, denominator: Decimal, context: &str) -> LoanQuoteResult<Decimal> {
    if denominator.is_zero() {
        return Err(LoanQuoteError::DivisionByZero {
            context: context.into(),
        });
    }
    numerator
        .checked_div(denominator)
        .map(round_internal)
        .ok_or_else(|| LoanQuoteError::Overflow {
            context: context.into(),
        })
}

/// Bounded Newton-Raphson. Stops early on a zero derivative or a non-finite
/// step, returning the last finite iterate.
fn newton_raphson<F, DF>(f: F, df: DF, guess: f64, max_iterations: u32) -> NewtonOutcome
where
    F: Fn(f64) -> f64,
    DF: Fn(f64) -> f64,
{
    let mut current = guess;
    let mut residual = f(current);
    let mut iterations = 0;

    while iterations < max_iterations && residual.abs() > NEWTON_EPSILON {
        let slope = df(current);
        if slope == 0.0 {
            break;
        }
        let next = current - residual / slope;
        if !next.is_finite() {
            break;
        }
        current = next;
        residual = f(current);
        iterations += 1;
    }

    NewtonOutcome {
        root: current,
        iterations,
        residual,
    }
}
