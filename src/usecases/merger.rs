//! Record Merger - Three-Source Reconciliation Engine
//!
//! Joins the product-master, inventory, and pricing exports into one
//! unified product per SKU (full outer join), resolves each product's
//! effective fee category against the active table and the override
//! store, and computes the platform fee and profit.
//!
//! Merge pass:
//! 1. Fold every source row into a per-SKU draft (normalized SKU,
//!    blank SKUs dropped, later rows within a source overwrite earlier
//!    field values)
//! 2. Resolve the fee category (usable override, else table default)
//! 3. Compute fee breakdown and profit via the fee calculator
//! 4. Emit unified products in first-seen SKU order
//!
//! The pass is deterministic and idempotent: identical inputs and an
//! unchanged override store always produce field-for-field identical
//! output. There are no partial failures; malformed values were
//! already coerced to `None` at the CSV boundary and default to zero
//! here.

use std::collections::HashMap;

use tracing::debug;

use crate::domain::fee_table::FeeTable;
use crate::domain::fees::{profit, FeeCalculator};
use crate::domain::product::{
  normalize_sku, RawSources, Sku, UnifiedProduct, UNNAMED_PRODUCT,
};
use crate::ports::override_store::OverrideStore;

/// Per-SKU accumulation state while folding the three sources.
#[derive(Debug, Clone, Default)]
struct Draft {
  name: Option<String>,
  cost_price: f64,
  stock_main: i64,
  stock_branch: i64,
  sales_30d: i64,
  price_list: f64,
  price_market: f64,
}

/// The reconciliation engine. Stateless apart from the fee constants;
/// every call rebuilds the unified collection from scratch.
#[derive(Debug, Clone)]
pub struct Merger {
  fees: FeeCalculator,
}

impl Merger {
  /// Creates a merger computing fees with the given calculator.
  pub fn new(fees: FeeCalculator) -> Self {
    Self { fees }
  }

  /// The fee calculator used by this merger.
  pub fn fees(&self) -> &FeeCalculator {
    &self.fees
  }

  /// Merges the three raw sources into unified products.
  ///
  /// Every distinct normalized SKU seen in any source yields exactly
  /// one product; missing sources contribute field defaults. The
  /// resolved `fee_category_id` is always present in `table`: an
  /// override whose category the table does not know silently falls
  /// back to the table default, which is what carries overrides
  /// across shop-variant switches (shared ids survive, foreign ids
  /// degrade).
  pub fn merge(
    &self,
    sources: &RawSources,
    table: &FeeTable,
    service_enabled: bool,
    overrides: &dyn OverrideStore,
  ) -> Vec<UnifiedProduct> {
    let mut order: Vec<Sku> = Vec::new();
    let mut drafts: HashMap<Sku, Draft> = HashMap::new();

    // ── 1. Fold sources into per-SKU drafts ─────────────────
    // Later rows for the same SKU within a source overwrite the
    // earlier values field-wise, including re-applied defaults; a
    // duplicate row with a blank cell resets that field to zero.
    for row in &sources.info {
      if let Some(draft) = entry(&mut order, &mut drafts, &row.sku) {
        draft.name = row
          .name
          .as_deref()
          .map(str::trim)
          .filter(|n| !n.is_empty())
          .map(str::to_string);
        draft.cost_price = row.cost_price.unwrap_or(0.0);
      }
    }

    for row in &sources.inventory {
      if let Some(draft) = entry(&mut order, &mut drafts, &row.sku) {
        draft.stock_main = row.stock_main.unwrap_or(0);
        draft.stock_branch = row.stock_branch.unwrap_or(0);
        draft.sales_30d = row.sales_30d.unwrap_or(0);
      }
    }

    for row in &sources.pricing {
      if let Some(draft) = entry(&mut order, &mut drafts, &row.sku) {
        draft.price_list = row.price_list.unwrap_or(0.0);
        draft.price_market = row.price_market.unwrap_or(0.0);
      }
    }

    // ── 2–4. Resolve category, compute fee, emit ────────────
    let mut products = Vec::with_capacity(order.len());
    for sku in order {
      let draft = drafts
        .remove(&sku)
        .expect("every ordered SKU has a draft");

      let category = overrides
        .get(&sku)
        .and_then(|id| table.find(&id))
        .unwrap_or_else(|| table.default_category());

      let breakdown = self
        .fees
        .breakdown(draft.price_market, category.rate, service_enabled);
      let platform_fee = breakdown.total;

      products.push(UnifiedProduct {
        sku,
        name: draft.name.unwrap_or_else(|| UNNAMED_PRODUCT.to_string()),
        cost_price: draft.cost_price,
        stock_main: draft.stock_main,
        stock_branch: draft.stock_branch,
        sales_30d: draft.sales_30d,
        price_list: draft.price_list,
        price_market: draft.price_market,
        fee_category_id: category.id.clone(),
        fee_rate: category.rate,
        platform_fee,
        profit: profit(draft.price_market, draft.cost_price, platform_fee),
      });
    }

    debug!(
      products = products.len(),
      info_rows = sources.info.len(),
      inventory_rows = sources.inventory.len(),
      pricing_rows = sources.pricing.len(),
      "Merge pass complete"
    );

    products
  }
}

/// Fetches or creates the draft for a raw SKU, recording first-seen
/// order. Blank SKUs yield `None` and the row is dropped.
fn entry<'a>(
  order: &mut Vec<Sku>,
  drafts: &'a mut HashMap<Sku, Draft>,
  raw_sku: &str,
) -> Option<&'a mut Draft> {
  let sku = normalize_sku(raw_sku)?;
  if !drafts.contains_key(&sku) {
    order.push(sku.clone());
  }
  Some(drafts.entry(sku).or_default())
}
