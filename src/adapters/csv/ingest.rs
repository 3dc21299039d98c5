//! CSV Ingest - Parsing the Three Seller Exports
//!
//! Each source is a delimited UTF-8 file with a header row. Column
//! presence is validated here (the documented column set is required,
//! missing ones are reported by name); cell-level problems are not
//! errors. Malformed numeric cells deserialize to `None` through the
//! lenient helpers on the record types and default to zero at merge
//! time, so one junk cell can never sink an upload.

use csv::{ReaderBuilder, Trim};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use crate::domain::product::{RawInventory, RawPricing, RawProductInfo, SourceKind};

/// Errors surfaced to the upload endpoint.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The header row lacks required columns.
    #[error("{source_kind} file is missing required columns: {missing:?}")]
    MissingColumns {
        source_kind: SourceKind,
        missing: Vec<String>,
    },
    /// Header row present but no data rows.
    #[error("{source_kind} file contains no data rows")]
    Empty { source_kind: SourceKind },
    /// Structurally unreadable CSV.
    #[error("failed to read {source_kind} file: {source}")]
    Malformed {
        source_kind: SourceKind,
        #[source]
        source: csv::Error,
    },
}

/// Documented column set per source.
pub fn required_columns(kind: SourceKind) -> &'static [&'static str] {
    match kind {
        SourceKind::Info => &["sku", "name", "cost_price"],
        SourceKind::Inventory => &["sku", "stock_main", "stock_branch", "sales_30d"],
        SourceKind::Pricing => &["sku", "price_list", "price_market"],
    }
}

/// Parses the product-master export.
pub fn parse_info(bytes: &[u8]) -> Result<Vec<RawProductInfo>, IngestError> {
    parse_source(bytes, SourceKind::Info)
}

/// Parses the inventory/sales export.
pub fn parse_inventory(bytes: &[u8]) -> Result<Vec<RawInventory>, IngestError> {
    parse_source(bytes, SourceKind::Inventory)
}

/// Parses the pricing export.
pub fn parse_pricing(bytes: &[u8]) -> Result<Vec<RawPricing>, IngestError> {
    parse_source(bytes, SourceKind::Pricing)
}

fn parse_source<T: DeserializeOwned>(
    bytes: &[u8],
    kind: SourceKind,
) -> Result<Vec<T>, IngestError> {
    let data = strip_bom(bytes);

    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(data);

    let headers = reader
        .headers()
        .map_err(|source| IngestError::Malformed {
            source_kind: kind,
            source,
        })?
        .clone();

    let missing: Vec<String> = required_columns(kind)
        .iter()
        .filter(|col| !headers.iter().any(|h| h == **col))
        .map(|col| (*col).to_string())
        .collect();
    if !missing.is_empty() {
        return Err(IngestError::MissingColumns {
            source_kind: kind,
            missing,
        });
    }

    let mut rows = Vec::new();
    for record in reader.deserialize::<T>() {
        rows.push(record.map_err(|source| IngestError::Malformed {
            source_kind: kind,
            source,
        })?);
    }

    if rows.is_empty() {
        return Err(IngestError::Empty { source_kind: kind });
    }

    debug!(source = %kind, rows = rows.len(), "Source file parsed");
    Ok(rows)
}

/// Spreadsheet exports routinely lead with a UTF-8 BOM; drop it so the
/// first header cell is not `\u{feff}sku`.
fn strip_bom(bytes: &[u8]) -> &[u8] {
    bytes.strip_prefix(b"\xef\xbb\xbf").unwrap_or(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_info_basic() {
        let csv = b"sku,name,cost_price\nA1,Widget,100000\nB2,Gadget,50000\n";
        let rows = parse_info(csv).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].sku, "A1");
        assert_eq!(rows[0].name.as_deref(), Some("Widget"));
        assert_eq!(rows[0].cost_price, Some(100_000.0));
    }

    #[test]
    fn test_parse_tolerates_bom() {
        let csv = b"\xef\xbb\xbfsku,name,cost_price\nA1,Widget,1\n";
        let rows = parse_info(csv).unwrap();
        assert_eq!(rows[0].sku, "A1");
    }

    #[test]
    fn test_malformed_numeric_cell_becomes_none() {
        let csv = b"sku,name,cost_price\nA1,Widget,not-a-number\n";
        let rows = parse_info(csv).unwrap();
        assert_eq!(rows[0].cost_price, None);
    }

    #[test]
    fn test_integer_cells_accept_float_form() {
        let csv = b"sku,stock_main,stock_branch,sales_30d\nA1,3.0,2,junk\n";
        let rows = parse_inventory(csv).unwrap();
        assert_eq!(rows[0].stock_main, Some(3));
        assert_eq!(rows[0].stock_branch, Some(2));
        assert_eq!(rows[0].sales_30d, None);
    }

    #[test]
    fn test_missing_columns_reported_by_name() {
        let csv = b"sku,name\nA1,Widget\n";
        let err = parse_info(csv).unwrap_err();
        match err {
            IngestError::MissingColumns { missing, .. } => {
                assert_eq!(missing, vec!["cost_price".to_string()]);
            }
            other => panic!("expected MissingColumns, got {other:?}"),
        }
    }

    #[test]
    fn test_extra_columns_ignored() {
        let csv = b"sku,price_list,price_market,supplier\nA1,1000,900,ACME\n";
        let rows = parse_pricing(csv).unwrap();
        assert_eq!(rows[0].price_market, Some(900.0));
    }

    #[test]
    fn test_empty_file_rejected() {
        let csv = b"sku,name,cost_price\n";
        assert!(matches!(
            parse_info(csv).unwrap_err(),
            IngestError::Empty { .. }
        ));
    }

    #[test]
    fn test_empty_cells_become_none() {
        let csv = b"sku,price_list,price_market\nA1,,\n";
        let rows = parse_pricing(csv).unwrap();
        assert_eq!(rows[0].price_list, None);
        assert_eq!(rows[0].price_market, None);
    }
}
