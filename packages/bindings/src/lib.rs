use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use serde::Deserialize;

use loan_quote_core::limits::REPAYMENT_MONTHS;
use loan_quote_core::quote::QuoteInput;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn default_periods() -> u32 {
    REPAYMENT_MONTHS
}

#[derive(Deserialize)]
struct RepaymentRequest {
    principal: Decimal,
    rate: Decimal,
    #[serde(default = "default_periods")]
    periods: u32,
}

#[derive(Deserialize)]
struct RateRequest {
    principal: f64,
    monthly_repayment: f64,
    #[serde(default = "default_periods")]
    periods: u32,
}

// ---------------------------------------------------------------------------
// Quotes
// ---------------------------------------------------------------------------

#[napi]
pub fn compute_quote(input_json: String) -> NapiResult<String> {
    let input = QuoteInput::from_json(&input_json).map_err(to_napi_error)?;
    let output = loan_quote_core::quote::compute_quote(&input.lenders, input.requested_amount)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn quote_loan(input_json: String) -> NapiResult<String> {
    let input = QuoteInput::from_json(&input_json).map_err(to_napi_error)?;
    let output = loan_quote_core::quote::quote_loan(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Amortization
// ---------------------------------------------------------------------------

#[napi]
pub fn monthly_repayment(input_json: String) -> NapiResult<String> {
    let input: RepaymentRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        loan_quote_core::amortization::monthly_repayment(input.principal, input.rate, input.periods)
            .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn estimate_annual_rate(input_json: String) -> NapiResult<String> {
    let input: RateRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = loan_quote_core::amortization::estimate_annual_rate_detailed(
        input.principal,
        input.periods,
        input.monthly_repayment,
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
