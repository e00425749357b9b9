use loan_quote_core::quote::{self, allocation, QuoteInput};
use loan_quote_core::{Lender, LoanQuoteError};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Quote engine tests against a small lending market
// ===========================================================================

fn sample_market() -> Vec<Lender> {
    vec![
        Lender::new("Bob", dec!(0.075), 640),
        Lender::new("Jane", dec!(0.069), 480),
        Lender::new("Fred", dec!(0.071), 520),
        Lender::new("Mary", dec!(0.104), 170),
        Lender::new("John", dec!(0.081), 320),
        Lender::new("Dave", dec!(0.074), 140),
        Lender::new("Angela", dec!(0.071), 60),
    ]
}

// ---------------------------------------------------------------------------
// Full quotes
// ---------------------------------------------------------------------------

#[test]
fn test_market_quote_1000() {
    let result = quote::compute_quote(&sample_market(), dec!(1000)).unwrap();
    // Jane 480 @ 6.9% + Fred 520 @ 7.1%
    assert_eq!(result.rate_pct, dec!(7.0));
    assert_eq!(result.monthly_repayment, dec!(30.88));
    assert_eq!(result.total_repayment, dec!(1111.65));
    assert_eq!(result.requested_amount, dec!(1000));
}

#[test]
fn test_market_quote_2000() {
    let result = quote::compute_quote(&sample_market(), dec!(2000)).unwrap();
    assert_eq!(result.rate_pct, dec!(7.3));
    assert_eq!(result.monthly_repayment, dec!(62.01));
    assert_eq!(result.total_repayment, dec!(2232.43));
}

#[test]
fn test_market_allocation_order() {
    let input = QuoteInput {
        lenders: sample_market(),
        requested_amount: dec!(2000),
    };
    let output = quote::quote_loan(&input).unwrap();
    let slices: Vec<(String, u32)> = output
        .result
        .allocations
        .iter()
        .map(|a| (a.name.clone(), a.amount))
        .collect();

    // Fred and Angela share a rate; Fred has more available so goes first.
    assert_eq!(
        slices,
        vec![
            ("Jane".to_string(), 480),
            ("Fred".to_string(), 520),
            ("Angela".to_string(), 60),
            ("Dave".to_string(), 140),
            ("Bob".to_string(), 640),
            ("John".to_string(), 160),
        ]
    );
}

#[test]
fn test_market_cannot_cover_large_request() {
    // Market total is 2330
    let err = quote::compute_quote(&sample_market(), dec!(2400)).unwrap_err();
    match err {
        LoanQuoteError::InsufficientFunds {
            requested,
            available,
        } => {
            assert_eq!(requested, dec!(2400));
            assert_eq!(available, dec!(2330));
        }
        other => panic!("Expected InsufficientFunds, got {other:?}"),
    }
}

#[test]
fn test_whole_market_can_be_borrowed() {
    let result = quote::compute_quote(&sample_market(), dec!(2330));
    assert!(result.is_ok());
}

#[test]
fn test_input_order_does_not_change_quote() {
    let mut reversed = sample_market();
    reversed.reverse();
    let a = quote::compute_quote(&sample_market(), dec!(1500)).unwrap();
    let b = quote::compute_quote(&reversed, dec!(1500)).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_quote_output_serializes_decimals_as_strings() {
    let input = QuoteInput {
        lenders: sample_market(),
        requested_amount: dec!(1000),
    };
    let output = quote::quote_loan(&input).unwrap();
    let json = serde_json::to_value(&output).unwrap();
    assert_eq!(json["result"]["quote"]["monthly_repayment"], "30.88");
    assert_eq!(json["result"]["quote"]["rate_pct"], "7.0");
    assert_eq!(json["assumptions"]["term_months"], 36);
}

#[test]
fn test_quote_input_deserializes_from_json() {
    let input: QuoteInput = serde_json::from_str(
        r#"{
            "requested_amount": "8000",
            "lenders": [
                { "name": "A", "rate": "0.05", "available": 5000 },
                { "name": "B", "rate": "0.10", "available": 10000 }
            ]
        }"#,
    )
    .unwrap();
    let output = quote::quote_loan(&input).unwrap();
    assert_eq!(output.result.quote.monthly_repayment, dec!(246.66));
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

fn lender_pool() -> impl Strategy<Value = Vec<Lender>> {
    prop::collection::vec((0u32..3000, 0u32..5000), 1..20).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (bps, available))| {
                Lender::new(format!("L{i}"), Decimal::new(i64::from(bps), 4), available)
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn prop_allocation_is_exact_and_bounded(pool in lender_pool(), requested in 1u32..60000) {
        let ordered = allocation::order_lenders(&pool);
        let capacity: u64 = pool.iter().map(|l| u64::from(l.available)).sum();

        match allocation::allocate(&ordered, requested) {
            Ok(slices) => {
                let total: u64 = slices.iter().map(|s| u64::from(s.amount)).sum();
                prop_assert_eq!(total, u64::from(requested));
                for s in &slices {
                    prop_assert!(s.amount > 0);
                    prop_assert!(s.amount <= s.lender.available);
                }
            }
            Err(LoanQuoteError::InsufficientFunds { .. }) => {
                prop_assert!(capacity < u64::from(requested));
            }
            Err(other) => prop_assert!(false, "unexpected error {:?}", other),
        }
    }

    #[test]
    fn prop_allocation_is_deterministic(pool in lender_pool(), requested in 1u32..20000) {
        let ordered = allocation::order_lenders(&pool);
        let first = allocation::allocate(&ordered, requested).ok();
        let second = allocation::allocate(&ordered, requested).ok();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_ordering_is_sorted(pool in lender_pool()) {
        let ordered = allocation::order_lenders(&pool);
        for pair in ordered.windows(2) {
            prop_assert!(pair[0].rate <= pair[1].rate);
            if pair[0].rate == pair[1].rate {
                prop_assert!(pair[0].available >= pair[1].available);
            }
        }
    }

    #[test]
    fn prop_total_never_understates_repayment(pool in lender_pool(), requested in 1000u32..15000) {
        let input = QuoteInput { lenders: pool, requested_amount: Decimal::from(requested) };
        if let Ok(output) = quote::quote_loan(&input) {
            let monthly: Decimal = output.result.allocations.iter().map(|a| a.monthly_repayment).sum();
            let unrounded = monthly * Decimal::from(36);
            prop_assert!(output.result.quote.total_repayment >= unrounded);
            prop_assert!(output.result.quote.total_repayment - unrounded < dec!(0.01));
        }
    }
}
