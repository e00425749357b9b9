pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::{Map, Value};

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Scalar fields of a result object, with nested objects flattened into
/// dotted keys. Arrays of objects are returned separately so they can be
/// rendered as their own tables.
pub(crate) fn split_result(map: &Map<String, Value>) -> (Vec<(String, Value)>, Vec<(String, Vec<Value>)>) {
    let mut fields = Vec::new();
    let mut lists = Vec::new();
    flatten_into("", map, &mut fields, &mut lists);
    (fields, lists)
}

fn flatten_into(
    prefix: &str,
    map: &Map<String, Value>,
    fields: &mut Vec<(String, Value)>,
    lists: &mut Vec<(String, Vec<Value>)>,
) {
    for (key, val) in map {
        let name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match val {
            Value::Object(inner) => flatten_into(&name, inner, fields, lists),
            Value::Array(items) if items.iter().all(Value::is_object) && !items.is_empty() => {
                lists.push((name, items.clone()));
            }
            _ => fields.push((name, val.clone())),
        }
    }
}

pub(crate) fn format_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_scalar).collect();
            items.join(", ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_split_result_flattens_and_extracts_lists() {
        let value = json!({
            "quote": { "rate_pct": "7.0", "monthly_repayment": "30.88" },
            "allocations": [ { "name": "Jane", "amount": 480 } ],
        });
        let (fields, lists) = split_result(value.as_object().unwrap());

        let keys: Vec<&str> = fields.iter().map(|(k, _)| k.as_str()).collect();
        assert!(keys.contains(&"quote.rate_pct"));
        assert!(keys.contains(&"quote.monthly_repayment"));
        assert_eq!(lists.len(), 1);
        assert_eq!(lists[0].0, "allocations");
    }

    #[test]
    fn test_format_scalar() {
        assert_eq!(format_scalar(&json!("1.5")), "1.5");
        assert_eq!(format_scalar(&json!(36)), "36");
        assert_eq!(format_scalar(&json!(null)), "");
        assert_eq!(format_scalar(&json!(["a", "b"])), "a, b");
    }
}
