use serde_json::{Map, Value};
use std::io;

use super::{format_scalar, split_result};

/// Write output as CSV to stdout.
///
/// Scalar result fields become `field,value` rows. A quote's allocation list
/// follows as a second block with its own header row.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(stdout.lock());

    let empty = Map::new();
    let result = match value {
        Value::Object(map) => match map.get("result") {
            Some(Value::Object(result)) => result,
            _ => map,
        },
        _ => &empty,
    };

    if result.is_empty() {
        let _ = wtr.write_record([&format_scalar(value)]);
        let _ = wtr.flush();
        return;
    }

    let (fields, lists) = split_result(result);
    let _ = wtr.write_record(["field", "value"]);
    for (key, val) in &fields {
        let _ = wtr.write_record([key.as_str(), &format_scalar(val)]);
    }

    for (_, items) in &lists {
        write_array_csv(&mut wtr, items);
    }

    let _ = wtr.flush();
}

fn write_array_csv<W: io::Write>(wtr: &mut csv::Writer<W>, arr: &[Value]) {
    let Some(Value::Object(first)) = arr.first() else {
        return;
    };

    let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
    let _ = wtr.write_record(&headers);

    for item in arr {
        if let Value::Object(map) = item {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(*h).map(format_scalar).unwrap_or_default())
                .collect();
            let _ = wtr.write_record(&row);
        }
    }
}
