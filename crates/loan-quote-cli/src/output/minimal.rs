use serde_json::Value;

use super::format_scalar;

/// Print just the key answer from the output.
///
/// A quote prints its four headline figures, one per line. Other results
/// print the first well-known field found, falling back to the first field.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Some(quote) = result_obj.get("quote").and_then(Value::as_object) {
        let field = |key: &str| quote.get(key).map(format_scalar).unwrap_or_default();
        println!("Requested amount: {}", field("requested_amount"));
        println!("Annual interest rate: {}%", field("rate_pct"));
        println!("Monthly repayment: {}", field("monthly_repayment"));
        println!("Total repayment: {}", field("total_repayment"));
        return;
    }

    let priority_keys = ["rate_pct", "monthly_repayment", "total_repayment"];

    if let Value::Object(map) = result_obj {
        for key in &priority_keys {
            if let Some(val) = map.get(*key) {
                if !val.is_null() {
                    println!("{}", format_scalar(val));
                    return;
                }
            }
        }

        // Fall back to first field
        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_scalar(val));
            return;
        }
    }

    println!("{}", format_scalar(result_obj));
}
