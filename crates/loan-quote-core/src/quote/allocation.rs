//! Lender ordering and greedy allocation of a requested principal.

use std::cmp::Ordering;

use rust_decimal::Decimal;
use tracing::debug;

use crate::error::LoanQuoteError;
use crate::types::Lender;
use crate::LoanQuoteResult;

/// Amount borrowed from a single lender for one quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Allocation<'a> {
    pub lender: &'a Lender,
    pub amount: u32,
}

/// Cheapest rate first; among equal rates the larger lender comes first.
pub fn compare_lenders(a: &Lender, b: &Lender) -> Ordering {
    a.rate
        .cmp(&b.rate)
        .then_with(|| b.available.cmp(&a.available))
}

/// Sort lenders by [`compare_lenders`]. The sort is stable, so fully tied
/// lenders keep their input order.
pub fn order_lenders(lenders: &[Lender]) -> Vec<&Lender> {
    let mut ordered: Vec<&Lender> = lenders.iter().collect();
    ordered.sort_by(|a, b| compare_lenders(a, b));
    ordered
}

/// Walk the ordered lenders, taking each one's full capacity until the
/// remainder fits within a single lender.
///
/// Lenders with nothing available are skipped, so every allocation is
/// strictly positive.
pub fn allocate<'a>(ordered: &[&'a Lender], requested: u32) -> LoanQuoteResult<Vec<Allocation<'a>>> {
    if requested == 0 {
        return Err(LoanQuoteError::invalid(
            "requested_amount",
            "Requested amount must be positive",
        ));
    }

    let mut allocations = Vec::new();
    let mut remaining = requested;

    for &lender in ordered {
        if lender.available == 0 {
            continue;
        }

        if lender.available >= remaining {
            allocations.push(Allocation {
                lender,
                amount: remaining,
            });
            debug!(
                lenders_used = allocations.len(),
                requested, "allocation complete"
            );
            return Ok(allocations);
        }

        allocations.push(Allocation {
            lender,
            amount: lender.available,
        });
        remaining -= lender.available;
    }

    let available: u64 = ordered.iter().map(|l| u64::from(l.available)).sum();
    debug!(requested, available, "lender pool exhausted");

    Err(LoanQuoteError::InsufficientFunds {
        requested: Decimal::from(requested),
        available: Decimal::from(available),
    })
}
