//! Dashboard Analytics - Stats, Chart Series, Chat Context
//!
//! Aggregations over the merged collection: the header stat cards,
//! the profit-extremes and profit-by-category chart series, and the
//! size-capped JSON summary fed to the AI assistant.

use serde::Serialize;

use crate::domain::fee_table::{FeeTable, ShopVariant};
use crate::domain::product::UnifiedProduct;

/// Header stat cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
  /// Number of unified products.
  pub total_items: usize,
  /// Products with profit at or below zero.
  pub loss_making: usize,
  /// Stock warnings: some stock somewhere, but either warehouse
  /// individually under the threshold. Deliberately stricter than the
  /// table's low-stock filter, which tests the combined stock.
  pub low_stock: usize,
}

/// Computes the header stat cards.
pub fn stats(products: &[UnifiedProduct], low_stock_threshold: i64) -> DashboardStats {
  DashboardStats {
    total_items: products.len(),
    loss_making: products.iter().filter(|p| p.profit <= 0.0).count(),
    low_stock: products
      .iter()
      .filter(|p| {
        p.stock_total() > 0
          && (p.stock_main < low_stock_threshold || p.stock_branch < low_stock_threshold)
      })
      .count(),
  }
}

/// One bar of the profit-extremes chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfitPoint {
  pub sku: String,
  pub profit: f64,
  pub sales_30d: i64,
}

/// The `n` most and `n` least profitable products, best first.
///
/// The two slices can overlap when fewer than `2n` products exist;
/// duplicates are dropped so a product never charts twice.
pub fn profit_extremes(products: &[UnifiedProduct], n: usize) -> Vec<ProfitPoint> {
  let mut sorted: Vec<&UnifiedProduct> = products.iter().collect();
  sorted.sort_by(|a, b| b.profit.partial_cmp(&a.profit).unwrap_or(std::cmp::Ordering::Equal));

  let mut points: Vec<ProfitPoint> = Vec::with_capacity(2 * n);
  let push = |p: &UnifiedProduct, points: &mut Vec<ProfitPoint>| {
    if !points.iter().any(|existing| existing.sku == p.sku) {
      points.push(ProfitPoint {
        sku: p.sku.clone(),
        profit: p.profit,
        sales_30d: p.sales_30d,
      });
    }
  };

  for p in sorted.iter().take(n) {
    push(p, &mut points);
  }
  for p in sorted.iter().rev().take(n).rev() {
    push(p, &mut points);
  }
  points
}

/// One slice of the profit-source chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryProfit {
  pub category: String,
  pub profit: f64,
}

/// Positive profit summed per resolved fee category, in table order.
///
/// Loss-makers are excluded: the chart answers "where does the profit
/// come from", not "what nets out".
pub fn profit_by_category(
  products: &[UnifiedProduct],
  table: &FeeTable,
) -> Vec<CategoryProfit> {
  table
    .categories()
    .iter()
    .filter_map(|category| {
      let total: f64 = products
        .iter()
        .filter(|p| p.fee_category_id == category.id && p.profit > 0.0)
        .map(|p| p.profit)
        .sum();
      (total > 0.0).then(|| CategoryProfit {
        category: category.name.clone(),
        profit: total,
      })
    })
    .collect()
}

// ────────────────────────────────────────────
// AI chat context
// ────────────────────────────────────────────

/// One product in the AI digest. Single-letter keys keep the payload
/// small; the legend travels alongside in [`ChatContext`].
#[derive(Debug, Clone, Serialize)]
struct ProductDigest {
  /// SKU
  s: String,
  /// Name
  n: String,
  /// Profit
  p: f64,
  /// Marketplace price
  pr: f64,
  /// Combined stock
  st: i64,
  /// 30-day sales
  sa: i64,
  /// Fee category id
  c: String,
}

/// The serialized summary handed to the external text service.
#[derive(Debug, Clone, Serialize)]
pub struct ChatContext {
  shop_variant: ShopVariant,
  service_fee_enabled: bool,
  low_stock_threshold: i64,
  total_items: usize,
  total_profit: f64,
  total_stock: i64,
  /// Key legend for the digest rows.
  legend: &'static str,
  /// First `limit` products, digest form.
  sample: Vec<ProductDigest>,
}

/// Builds the chat context: aggregates plus the first `limit` products
/// in digest form. The cap bounds the payload regardless of catalog
/// size.
pub fn chat_context(
  products: &[UnifiedProduct],
  shop_variant: ShopVariant,
  service_fee_enabled: bool,
  low_stock_threshold: i64,
  limit: usize,
) -> ChatContext {
  ChatContext {
    shop_variant,
    service_fee_enabled,
    low_stock_threshold,
    total_items: products.len(),
    total_profit: products.iter().map(|p| p.profit).sum(),
    total_stock: products.iter().map(UnifiedProduct::stock_total).sum(),
    legend: "s=sku n=name p=profit pr=market price st=stock sa=sales 30d c=fee category",
    sample: products
      .iter()
      .take(limit)
      .map(|p| ProductDigest {
        s: p.sku.clone(),
        n: p.name.clone(),
        p: p.profit,
        pr: p.price_market,
        st: p.stock_total(),
        sa: p.sales_30d,
        c: p.fee_category_id.clone(),
      })
      .collect(),
  }
}

impl ChatContext {
  /// JSON form sent to the analyst port.
  pub fn to_json(&self) -> String {
    serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::fee_table::builtin_table;

  fn product(sku: &str, profit: f64, main: i64, branch: i64, sales: i64) -> UnifiedProduct {
    UnifiedProduct {
      sku: sku.into(),
      name: format!("{sku} name"),
      cost_price: 0.0,
      stock_main: main,
      stock_branch: branch,
      sales_30d: sales,
      price_list: 0.0,
      price_market: 0.0,
      fee_category_id: "other".into(),
      fee_rate: 7.0,
      platform_fee: 0.0,
      profit,
    }
  }

  #[test]
  fn test_stats_counts() {
    let products = vec![
      product("A", -1.0, 50, 50, 0),
      product("B", 5.0, 2, 50, 0),
      product("C", 5.0, 0, 0, 0),
      product("D", 0.0, 50, 50, 0),
    ];
    let s = stats(&products, 10);
    assert_eq!(s.total_items, 4);
    // Zero profit counts as loss-making.
    assert_eq!(s.loss_making, 2);
    // Only B: C has no stock at all, A and D are healthy everywhere.
    assert_eq!(s.low_stock, 1);
  }

  #[test]
  fn test_profit_extremes_top_and_bottom() {
    let products: Vec<UnifiedProduct> = (0..10)
      .map(|i| product(&format!("P{i}"), f64::from(i), 1, 0, 0))
      .collect();
    let points = profit_extremes(&products, 2);
    let skus: Vec<&str> = points.iter().map(|p| p.sku.as_str()).collect();
    assert_eq!(skus, vec!["P9", "P8", "P1", "P0"]);
  }

  #[test]
  fn test_profit_extremes_no_duplicates_on_small_input() {
    let products = vec![product("A", 1.0, 1, 0, 0), product("B", 2.0, 1, 0, 0)];
    let points = profit_extremes(&products, 5);
    assert_eq!(points.len(), 2);
  }

  #[test]
  fn test_profit_by_category_positive_only() {
    let table = builtin_table(ShopVariant::Standard);
    let mut a = product("A", 100.0, 1, 0, 0);
    a.fee_category_id = "laptop".into();
    let mut b = product("B", -50.0, 1, 0, 0);
    b.fee_category_id = "laptop".into();
    let c = product("C", 30.0, 1, 0, 0);

    let slices = profit_by_category(&[a, b, c], &table);
    assert_eq!(slices.len(), 2);
    assert_eq!(slices[0].category, "Laptops");
    // The loss-maker is excluded, not netted.
    assert!((slices[0].profit - 100.0).abs() < 1e-9);
    assert_eq!(slices[1].category, "Other / Default");
  }

  #[test]
  fn test_chat_context_caps_sample() {
    let products: Vec<UnifiedProduct> = (0..80)
      .map(|i| product(&format!("P{i}"), 1.0, 1, 1, 0))
      .collect();
    let ctx = chat_context(&products, ShopVariant::Mall, true, 10, 50);
    assert_eq!(ctx.sample.len(), 50);
    assert_eq!(ctx.total_items, 80);
    assert_eq!(ctx.total_stock, 160);
    assert!((ctx.total_profit - 80.0).abs() < 1e-9);

    let json = ctx.to_json();
    assert!(json.contains("\"sample\""));
    assert!(json.contains("\"s\":\"P0\""));
  }
}
