//! CSV Export - Spreadsheet-Compatible Profit Report
//!
//! Serializes the unified collection to a delimited report: one row
//! per product plus the resolved category display name. The output is
//! prefixed with a UTF-8 BOM so Excel opens it with the right
//! encoding; quoting and escaping are the csv writer's job.

use anyhow::{Context, Result};
use chrono::NaiveDate;

use crate::domain::fee_table::{FeeTable, ShopVariant};
use crate::domain::product::UnifiedProduct;

const HEADERS: [&str; 11] = [
    "sku",
    "name",
    "category",
    "fee_rate_percent",
    "cost_price",
    "price_market",
    "platform_fee",
    "profit",
    "stock_main",
    "stock_branch",
    "sales_30d",
];

/// Renders the profit report as CSV bytes (BOM included).
///
/// `table` supplies the category display names; the merge invariant
/// guarantees every `fee_category_id` resolves, but an unknown id
/// still degrades to "N/A" rather than failing the download.
pub fn export_report(products: &[UnifiedProduct], table: &FeeTable) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::from("\u{feff}".as_bytes()));

    writer
        .write_record(HEADERS)
        .context("Failed to write report header")?;

    for p in products {
        let category = table
            .find(&p.fee_category_id)
            .map_or("N/A", |c| c.name.as_str());
        writer
            .write_record([
                p.sku.clone(),
                p.name.clone(),
                category.to_string(),
                p.fee_rate.to_string(),
                p.cost_price.to_string(),
                p.price_market.to_string(),
                p.platform_fee.to_string(),
                p.profit.to_string(),
                p.stock_main.to_string(),
                p.stock_branch.to_string(),
                p.sales_30d.to_string(),
            ])
            .context("Failed to write report row")?;
    }

    writer
        .into_inner()
        .context("Failed to flush report buffer")
}

/// Download filename: variant plus report date.
pub fn report_filename(variant: ShopVariant, date: NaiveDate) -> String {
    format!("profit_report_{variant}_{}.csv", date.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fee_table::{builtin_table, ShopVariant};

    fn product(sku: &str, name: &str) -> UnifiedProduct {
        UnifiedProduct {
            sku: sku.into(),
            name: name.into(),
            cost_price: 100_000.0,
            stock_main: 5,
            stock_branch: 0,
            sales_30d: 2,
            price_list: 150_000.0,
            price_market: 140_000.0,
            fee_category_id: "laptop".into(),
            fee_rate: 1.5,
            platform_fee: 23_394.0,
            profit: 16_606.0,
        }
    }

    #[test]
    fn test_report_starts_with_bom() {
        let table = builtin_table(ShopVariant::Standard);
        let bytes = export_report(&[product("A1", "Widget")], &table).unwrap();
        assert!(bytes.starts_with(b"\xef\xbb\xbf"));
    }

    #[test]
    fn test_report_rows_and_category_name() {
        let table = builtin_table(ShopVariant::Standard);
        let bytes = export_report(&[product("A1", "Widget")], &table).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let mut lines = text.trim_start_matches('\u{feff}').lines();
        assert_eq!(lines.next().unwrap().split(',').next().unwrap(), "sku");

        let row = lines.next().unwrap();
        assert!(row.starts_with("A1,Widget,Laptops,1.5,"));
        assert!(row.contains("23394"));
    }

    #[test]
    fn test_report_quotes_embedded_delimiters() {
        let table = builtin_table(ShopVariant::Standard);
        let mut p = product("A1", "Widget, 27\" model");
        p.fee_category_id = "monitor".into();
        let bytes = export_report(&[p], &table).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        // Quoted field with the inner quote doubled.
        assert!(text.contains("\"Widget, 27\"\" model\""));
    }

    #[test]
    fn test_unknown_category_degrades() {
        let table = builtin_table(ShopVariant::Standard);
        let mut p = product("A1", "Widget");
        p.fee_category_id = "no_such".into();
        let text = String::from_utf8(export_report(&[p], &table).unwrap()).unwrap();
        assert!(text.contains("A1,Widget,N/A,"));
    }

    #[test]
    fn test_filename_carries_variant_and_date() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 7).unwrap();
        assert_eq!(
            report_filename(ShopVariant::Mall, date),
            "profit_report_mall_2026-08-07.csv"
        );
    }
}
