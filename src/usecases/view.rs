//! Table View Derivation - Filters, Sorting, Variant Grouping
//!
//! Transforms the merged product collection into what the table
//! actually displays: text search, category and status filters,
//! best-seller ranking, optional variant grouping, and a stable sort.
//! Pure functions over the merge output; nothing here mutates or
//! recomputes fees.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::product::UnifiedProduct;

/// Status chip filters above the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
  #[default]
  All,
  /// Profit at or below zero.
  Loss,
  /// Combined stock above zero but under the configured threshold.
  LowStock,
  /// Combined stock exactly zero.
  OutOfStock,
  /// Positive trailing-30-day sales, ranked descending, top N.
  BestSeller,
}

/// Sortable table columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
  Sku,
  Name,
  CostPrice,
  PriceList,
  PriceMarket,
  FeeRate,
  PlatformFee,
  Profit,
  StockMain,
  StockBranch,
  Sales30d,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
  Asc,
  Desc,
}

/// One derived table query.
#[derive(Debug, Clone)]
pub struct TableQuery {
  /// Case-insensitive substring over SKU and name.
  pub search: Option<String>,
  /// Exact fee-category id filter.
  pub category: Option<String>,
  pub status: StatusFilter,
  pub sort_field: SortField,
  pub sort_order: SortOrder,
  /// Collapse `BASE_VARIANT` SKUs into one aggregated row per base.
  pub group_variants: bool,
  /// Threshold for the low-stock status predicate.
  pub low_stock_threshold: i64,
  /// Row cap for the best-seller ranking.
  pub best_seller_limit: usize,
}

impl Default for TableQuery {
  fn default() -> Self {
    Self {
      search: None,
      category: None,
      status: StatusFilter::All,
      sort_field: SortField::Profit,
      sort_order: SortOrder::Asc,
      group_variants: false,
      low_stock_threshold: 10,
      best_seller_limit: 20,
    }
  }
}

/// One displayed row: a (possibly aggregated) product plus how many
/// variants were folded into it (1 when ungrouped).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
  #[serde(flatten)]
  pub product: UnifiedProduct,
  pub variant_count: usize,
}

/// Derives the displayed rows from the merged collection.
///
/// Pipeline: search filter, category filter, status filter (the
/// best-seller chip ranks by sales and truncates, and also suppresses
/// the final sort), variant grouping, stable sort with ties left in
/// input order.
pub fn apply(products: &[UnifiedProduct], query: &TableQuery) -> Vec<TableRow> {
  let mut data: Vec<UnifiedProduct> = products.to_vec();

  if let Some(needle) = query
    .search
    .as_deref()
    .map(str::trim)
    .filter(|s| !s.is_empty())
  {
    let needle = needle.to_lowercase();
    data.retain(|p| {
      p.sku.to_lowercase().contains(&needle) || p.name.to_lowercase().contains(&needle)
    });
  }

  if let Some(category) = query.category.as_deref() {
    data.retain(|p| p.fee_category_id == category);
  }

  match query.status {
    StatusFilter::All => {}
    StatusFilter::Loss => data.retain(|p| p.profit <= 0.0),
    StatusFilter::LowStock => data.retain(|p| {
      let stock = p.stock_total();
      stock > 0 && stock < query.low_stock_threshold
    }),
    StatusFilter::OutOfStock => data.retain(|p| p.stock_total() == 0),
    StatusFilter::BestSeller => {
      data.retain(|p| p.sales_30d > 0);
      data.sort_by(|a, b| b.sales_30d.cmp(&a.sales_30d));
      data.truncate(query.best_seller_limit);
    }
  }

  let mut rows: Vec<TableRow> = if query.group_variants {
    group_variants(data)
  } else {
    data
      .into_iter()
      .map(|product| TableRow {
        product,
        variant_count: 1,
      })
      .collect()
  };

  if query.status != StatusFilter::BestSeller {
    sort_rows(&mut rows, query.sort_field, query.sort_order);
  }

  rows
}

/// Strips one trailing variant suffix from a SKU.
///
/// An underscore anywhere wins over a dash; a separator at position 0
/// does not split. `X_RED` and `X-RED` both group under `X`, while
/// `_RED` and `PLAIN` stay whole.
pub fn base_sku(sku: &str) -> &str {
  let sep = sku.rfind('_').or_else(|| sku.rfind('-'));
  match sep {
    Some(i) if i > 0 => &sku[..i],
    _ => sku,
  }
}

/// Variant aggregation accumulator.
struct Group {
  product: UnifiedProduct,
  count: usize,
  cost_sum: f64,
  price_market_sum: f64,
  fee_sum: f64,
}

/// Collapses variant SKUs into one row per base SKU.
///
/// Stock, sales, and profit are summed; cost price, market price, and
/// platform fee are arithmetic means across the variants (not the
/// sales-weighted average; grouped money columns are approximate).
/// Name, list price, and fee category carry over from the first
/// variant seen.
fn group_variants(data: Vec<UnifiedProduct>) -> Vec<TableRow> {
  use std::collections::hash_map::Entry;

  let mut order: Vec<String> = Vec::new();
  let mut groups: HashMap<String, Group> = HashMap::new();

  for mut item in data {
    let base = base_sku(&item.sku).to_string();
    match groups.entry(base) {
      Entry::Vacant(slot) => {
        order.push(slot.key().clone());
        item.sku = slot.key().clone();
        slot.insert(Group {
          count: 1,
          cost_sum: item.cost_price,
          price_market_sum: item.price_market,
          fee_sum: item.platform_fee,
          product: item,
        });
      }
      Entry::Occupied(mut slot) => {
        let group = slot.get_mut();
        group.count += 1;
        group.cost_sum += item.cost_price;
        group.price_market_sum += item.price_market;
        group.fee_sum += item.platform_fee;
        group.product.stock_main += item.stock_main;
        group.product.stock_branch += item.stock_branch;
        group.product.sales_30d += item.sales_30d;
        group.product.profit += item.profit;
      }
    }
  }

  order
    .into_iter()
    .map(|base| {
      let group = groups.remove(&base).expect("ordered base has a group");
      let n = group.count as f64;
      let mut product = group.product;
      product.cost_price = group.cost_sum / n;
      product.price_market = group.price_market_sum / n;
      product.platform_fee = group.fee_sum / n;
      TableRow {
        product,
        variant_count: group.count,
      }
    })
    .collect()
}

fn sort_rows(rows: &mut [TableRow], field: SortField, order: SortOrder) {
  use std::cmp::Ordering;

  // `sort_by` is stable, so ties keep their input order in both
  // directions (reversing the Ordering, not the slice).
  rows.sort_by(|a, b| {
    let (a, b) = (&a.product, &b.product);
    let ord = match field {
      SortField::Sku => a.sku.cmp(&b.sku),
      SortField::Name => a.name.cmp(&b.name),
      SortField::CostPrice => cmp_f64(a.cost_price, b.cost_price),
      SortField::PriceList => cmp_f64(a.price_list, b.price_list),
      SortField::PriceMarket => cmp_f64(a.price_market, b.price_market),
      SortField::FeeRate => cmp_f64(a.fee_rate, b.fee_rate),
      SortField::PlatformFee => cmp_f64(a.platform_fee, b.platform_fee),
      SortField::Profit => cmp_f64(a.profit, b.profit),
      SortField::StockMain => a.stock_main.cmp(&b.stock_main),
      SortField::StockBranch => a.stock_branch.cmp(&b.stock_branch),
      SortField::Sales30d => a.sales_30d.cmp(&b.sales_30d),
    };
    match order {
      SortOrder::Asc => ord,
      SortOrder::Desc => ord.reverse(),
    }
  });

  fn cmp_f64(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
  }
}
