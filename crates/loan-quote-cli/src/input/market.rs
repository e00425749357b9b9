//! Lender market files.
//!
//! CSV with a `Lender,Rate,Available` header. Rows that fail to parse are
//! skipped and reported rather than failing the whole file.

use rust_decimal::Decimal;
use std::fs::File;
use std::io::Read;
use std::str::FromStr;
use tracing::{debug, warn};

use loan_quote_core::Lender;

use super::file::resolve_path;

/// Lenders read from a market file plus a description of every skipped row.
#[derive(Debug, Default)]
pub struct Market {
    pub lenders: Vec<Lender>,
    pub skipped: Vec<String>,
}

struct Columns {
    name: usize,
    rate: usize,
    available: usize,
}

/// Read a CSV market file from disk.
pub fn read_market(path: &str) -> Result<Market, Box<dyn std::error::Error>> {
    let canonical = resolve_path(path)?;
    let file = File::open(&canonical)
        .map_err(|e| format!("Failed to read '{}': {}", canonical.display(), e))?;
    let market = parse_market(file)
        .map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e))?;
    debug!(
        path = %canonical.display(),
        lenders = market.lenders.len(),
        skipped = market.skipped.len(),
        "market loaded"
    );
    Ok(market)
}

/// Parse CSV market data. Fails only when the header is unusable or no row
/// yields a valid lender.
pub fn parse_market<R: Read>(reader: R) -> Result<Market, Box<dyn std::error::Error>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let columns = locate_columns(rdr.headers()?)?;
    let mut market = Market::default();

    for (idx, record) in rdr.records().enumerate() {
        // header is line 1
        let line = idx + 2;
        let parsed = record
            .map_err(|e| e.to_string())
            .and_then(|r| parse_row(&r, &columns));
        match parsed {
            Ok(lender) => market.lenders.push(lender),
            Err(reason) => {
                warn!(line, %reason, "skipping market row");
                market.skipped.push(format!("line {line}: {reason}"));
            }
        }
    }

    if market.lenders.is_empty() {
        return Err("Market contains no valid lenders".into());
    }

    Ok(market)
}

fn locate_columns(headers: &csv::StringRecord) -> Result<Columns, Box<dyn std::error::Error>> {
    let find = |wanted: &str| {
        headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("Missing '{wanted}' column"))
    };
    Ok(Columns {
        name: find("Lender")?,
        rate: find("Rate")?,
        available: find("Available")?,
    })
}

fn parse_row(record: &csv::StringRecord, columns: &Columns) -> Result<Lender, String> {
    let name = required(record, columns.name, "lender name")?;
    let raw_rate = required(record, columns.rate, "rate")?;
    let raw_available = required(record, columns.available, "available amount")?;

    let rate = Decimal::from_str(raw_rate).map_err(|_| format!("invalid rate '{raw_rate}'"))?;
    if rate < Decimal::ZERO {
        return Err(format!("negative rate '{raw_rate}'"));
    }
    let available = raw_available
        .parse::<u32>()
        .map_err(|_| format!("invalid available amount '{raw_available}'"))?;

    Ok(Lender::new(name, rate, available))
}

fn required<'r>(record: &'r csv::StringRecord, idx: usize, label: &str) -> Result<&'r str, String> {
    record
        .get(idx)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| format!("missing {label}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_market() {
        let data = "Lender,Rate,Available\nBob,0.075,640\nJane,0.069,480\n";
        let market = parse_market(data.as_bytes()).unwrap();
        assert_eq!(
            market.lenders,
            vec![
                Lender::new("Bob", dec!(0.075), 640),
                Lender::new("Jane", dec!(0.069), 480),
            ]
        );
        assert!(market.skipped.is_empty());
    }

    #[test]
    fn test_columns_located_by_header() {
        let data = "available, lender ,RATE\n500,Ann,0.05\n";
        let market = parse_market(data.as_bytes()).unwrap();
        assert_eq!(market.lenders, vec![Lender::new("Ann", dec!(0.05), 500)]);
    }

    #[test]
    fn test_bad_rows_are_skipped() {
        let data = "Lender,Rate,Available\n\
                    Bob,0.075,640\n\
                    Broken,abc,100\n\
                    Negative,-0.01,100\n\
                    Fraction,0.07,12.5\n\
                    Short,0.07\n\
                    Jane,0.069,480\n";
        let market = parse_market(data.as_bytes()).unwrap();
        assert_eq!(market.lenders.len(), 2);
        assert_eq!(market.skipped.len(), 4);
        assert!(market.skipped[0].starts_with("line 3"));
    }

    #[test]
    fn test_missing_column_fails() {
        let data = "Lender,Rate\nBob,0.075\n";
        assert!(parse_market(data.as_bytes()).is_err());
    }

    #[test]
    fn test_no_valid_rows_fails() {
        let data = "Lender,Rate,Available\nBob,x,y\n";
        assert!(parse_market(data.as_bytes()).is_err());
    }
}
