//! Dashboard Session - Stateful Orchestrator
//!
//! Owns everything a seller session consists of: the three uploaded
//! raw sources, the fee table registry, the override store, the user
//! settings, and the merged product collection. Every mutation that
//! can change a computed field triggers a full rebuild through the
//! merger; the unified collection is never patched in place.

use tracing::info;

use crate::config::UserSettings;
use crate::domain::fee_table::{FeeTable, ShopVariant};
use crate::domain::fees::FeeBreakdown;
use crate::domain::product::{
  normalize_sku, RawInventory, RawPricing, RawProductInfo, RawSources, Sku, SourceKind,
  UnifiedProduct,
};
use crate::ports::override_store::OverrideStore;
use crate::usecases::merger::Merger;
use crate::usecases::registry::{FeeTableRegistry, RegistryError};
use crate::usecases::view::{self, TableQuery, TableRow};

/// One seller's dashboard session.
pub struct Dashboard {
  sources: RawSources,
  registry: FeeTableRegistry,
  overrides: Box<dyn OverrideStore>,
  settings: UserSettings,
  merger: Merger,
  products: Vec<UnifiedProduct>,
}

impl Dashboard {
  /// Creates a session with empty sources.
  ///
  /// `overrides` may arrive pre-hydrated from a snapshot; the first
  /// merge (and every later one) resolves against whatever it holds.
  pub fn new(settings: UserSettings, merger: Merger, overrides: Box<dyn OverrideStore>) -> Self {
    Self {
      sources: RawSources::default(),
      registry: FeeTableRegistry::new(),
      overrides,
      settings,
      merger,
      products: Vec::new(),
    }
  }

  /// Rebuilds the unified collection from current state.
  fn remerge(&mut self) {
    let table = self.registry.table(self.settings.shop_variant);
    self.products = self.merger.merge(
      &self.sources,
      table,
      self.settings.service_fee_enabled,
      self.overrides.as_ref(),
    );
  }

  // ── Source uploads ──────────────────────────────────────

  /// Replaces one source wholesale and rebuilds.
  pub fn load_info(&mut self, rows: Vec<RawProductInfo>) {
    info!(rows = rows.len(), source = %SourceKind::Info, "Source replaced");
    self.sources.info = rows;
    self.remerge();
  }

  pub fn load_inventory(&mut self, rows: Vec<RawInventory>) {
    info!(rows = rows.len(), source = %SourceKind::Inventory, "Source replaced");
    self.sources.inventory = rows;
    self.remerge();
  }

  pub fn load_pricing(&mut self, rows: Vec<RawPricing>) {
    info!(rows = rows.len(), source = %SourceKind::Pricing, "Source replaced");
    self.sources.pricing = rows;
    self.remerge();
  }

  // ── Settings ────────────────────────────────────────────

  pub fn settings(&self) -> &UserSettings {
    &self.settings
  }

  /// Switches the active marketplace tab. Overrides re-resolve
  /// against the new variant's table on the rebuild: shared category
  /// ids stick, foreign ones fall back to the new default.
  pub fn set_shop_variant(&mut self, variant: ShopVariant) {
    if self.settings.shop_variant != variant {
      info!(variant = %variant, "Shop variant switched");
      self.settings.shop_variant = variant;
      self.remerge();
    }
  }

  pub fn set_service_fee_enabled(&mut self, enabled: bool) {
    if self.settings.service_fee_enabled != enabled {
      self.settings.service_fee_enabled = enabled;
      self.remerge();
    }
  }

  /// Threshold only affects derived views, not computed fields, so no
  /// rebuild happens here.
  pub fn set_low_stock_threshold(&mut self, threshold: i64) {
    self.settings.low_stock_threshold = threshold;
  }

  // ── Overrides ───────────────────────────────────────────

  /// Pins a product to a fee category. Returns `false` (and records
  /// nothing) for a blank SKU. The category id is stored unchecked;
  /// resolution validates it against the active table on rebuild.
  pub fn set_override(&mut self, raw_sku: &str, category_id: &str) -> bool {
    let Some(sku) = normalize_sku(raw_sku) else {
      return false;
    };
    self.overrides.set(&sku, category_id);
    self.remerge();
    true
  }

  /// Current override entries, for snapshot persistence.
  pub fn override_entries(&self) -> Vec<(Sku, String)> {
    self.overrides.entries()
  }

  // ── Fee tables ──────────────────────────────────────────

  /// The table for the active shop variant.
  pub fn active_table(&self) -> &FeeTable {
    self.registry.table(self.settings.shop_variant)
  }

  pub fn table(&self, variant: ShopVariant) -> &FeeTable {
    self.registry.table(variant)
  }

  /// Applies user-edited rates to a variant's table and rebuilds.
  pub fn update_fee_table(
    &mut self,
    variant: ShopVariant,
    table: FeeTable,
  ) -> Result<(), RegistryError> {
    self.registry.update_rates(variant, table)?;
    self.remerge();
    Ok(())
  }

  // ── Derived output ──────────────────────────────────────

  /// The full unified collection in merge order.
  pub fn products(&self) -> &[UnifiedProduct] {
    &self.products
  }

  /// Derived table rows for one query.
  pub fn rows(&self, query: &TableQuery) -> Vec<TableRow> {
    view::apply(&self.products, query)
  }

  /// Itemized fee for one product at current settings, for the fee
  /// detail popover. `None` for unknown SKUs.
  pub fn fee_detail(&self, raw_sku: &str) -> Option<FeeBreakdown> {
    let sku = normalize_sku(raw_sku)?;
    let product = self.products.iter().find(|p| p.sku == sku)?;
    Some(self.merger.fees().breakdown(
      product.price_market,
      product.fee_rate,
      self.settings.service_fee_enabled,
    ))
  }
}
