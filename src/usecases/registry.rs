//! Fee Table Registry - Per-Variant Commission Tables
//!
//! Holds one fee table per shop variant, seeded from the built-in
//! schedules at startup. Sellers can re-tune the rates of the active
//! table at runtime; edits live in memory for the rest of the session
//! and must keep the category id set intact, so recorded overrides
//! and shared-id preservation across variants keep working.

use std::collections::HashMap;

use thiserror::Error;
use tracing::info;

use crate::domain::fee_table::{builtin_table, FeeTable, ShopVariant};

/// Errors from fee table edits.
#[derive(Debug, Error)]
pub enum RegistryError {
  /// The replacement table changed the category id set. Renaming,
  /// reordering, and rate edits are allowed; ids are not.
  #[error(
    "fee table for {variant} must keep its category ids (missing: {missing:?}, unexpected: {unexpected:?})"
  )]
  CategoryMismatch {
    variant: ShopVariant,
    missing: Vec<String>,
    unexpected: Vec<String>,
  },
}

/// In-memory registry of the session's fee tables.
pub struct FeeTableRegistry {
  tables: HashMap<ShopVariant, FeeTable>,
}

impl Default for FeeTableRegistry {
  fn default() -> Self {
    Self::new()
  }
}

impl FeeTableRegistry {
  /// Registry seeded with the built-in table for every variant.
  pub fn new() -> Self {
    let tables = ShopVariant::ALL
      .into_iter()
      .map(|v| (v, builtin_table(v)))
      .collect();
    Self { tables }
  }

  /// The current table for a shop variant.
  pub fn table(&self, variant: ShopVariant) -> &FeeTable {
    // Every variant is seeded in `new` and ids never leave the map.
    &self.tables[&variant]
  }

  /// Replaces a variant's table with user-edited rates.
  ///
  /// The replacement must carry exactly the same category id set as
  /// the current table; anything else is rejected untouched. Order is
  /// the caller's to choose, which also moves the fallback (last
  /// entry) with it.
  pub fn update_rates(
    &mut self,
    variant: ShopVariant,
    updated: FeeTable,
  ) -> Result<(), RegistryError> {
    let current = self.table(variant);

    let missing: Vec<String> = current
      .ids()
      .filter(|id| !updated.contains(id))
      .map(str::to_string)
      .collect();
    let unexpected: Vec<String> = updated
      .ids()
      .filter(|id| !current.contains(id))
      .map(str::to_string)
      .collect();

    if !missing.is_empty() || !unexpected.is_empty() {
      return Err(RegistryError::CategoryMismatch {
        variant,
        missing,
        unexpected,
      });
    }

    info!(
      variant = %variant,
      categories = updated.categories().len(),
      "Fee table rates updated"
    );
    self.tables.insert(variant, updated);
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::fee_table::FeeCategory;

  fn retuned(table: &FeeTable, id: &str, rate: f64) -> FeeTable {
    let categories = table
      .categories()
      .iter()
      .map(|c| FeeCategory {
        id: c.id.clone(),
        name: c.name.clone(),
        rate: if c.id == id { rate } else { c.rate },
      })
      .collect();
    FeeTable::new(categories)
  }

  #[test]
  fn test_seeded_for_all_variants() {
    let registry = FeeTableRegistry::new();
    for variant in ShopVariant::ALL {
      assert!(!registry.table(variant).categories().is_empty());
    }
  }

  #[test]
  fn test_update_replaces_rates() {
    let mut registry = FeeTableRegistry::new();
    let edited = retuned(registry.table(ShopVariant::Standard), "laptop", 2.25);
    registry.update_rates(ShopVariant::Standard, edited).unwrap();

    let rate = registry
      .table(ShopVariant::Standard)
      .find("laptop")
      .unwrap()
      .rate;
    assert!((rate - 2.25).abs() < 1e-9);
    // Other variants untouched.
    let mall_rate = registry.table(ShopVariant::Mall).find("laptop").unwrap().rate;
    assert!((mall_rate - 3.30).abs() < 1e-9);
  }

  #[test]
  fn test_update_rejects_removed_id() {
    let mut registry = FeeTableRegistry::new();
    let stripped = FeeTable::new(
      registry
        .table(ShopVariant::Mall)
        .categories()
        .iter()
        .filter(|c| c.id != "cpu")
        .cloned()
        .collect(),
    );

    let err = registry
      .update_rates(ShopVariant::Mall, stripped)
      .unwrap_err();
    match err {
      RegistryError::CategoryMismatch { missing, unexpected, .. } => {
        assert_eq!(missing, vec!["cpu".to_string()]);
        assert!(unexpected.is_empty());
      }
    }
  }

  #[test]
  fn test_update_rejects_added_id() {
    let mut registry = FeeTableRegistry::new();
    let mut categories: Vec<FeeCategory> =
      registry.table(ShopVariant::TiktokShop).categories().to_vec();
    categories.push(FeeCategory {
      id: "smartwatch".into(),
      name: "Smartwatches".into(),
      rate: 4.0,
    });

    let err = registry
      .update_rates(ShopVariant::TiktokShop, FeeTable::new(categories))
      .unwrap_err();
    match err {
      RegistryError::CategoryMismatch { missing, unexpected, .. } => {
        assert!(missing.is_empty());
        assert_eq!(unexpected, vec!["smartwatch".to_string()]);
      }
    }
  }

  #[test]
  fn test_update_allows_reorder() {
    let mut registry = FeeTableRegistry::new();
    let mut categories: Vec<FeeCategory> =
      registry.table(ShopVariant::Standard).categories().to_vec();
    categories.rotate_left(1);
    let new_last = categories.last().unwrap().id.clone();

    registry
      .update_rates(ShopVariant::Standard, FeeTable::new(categories))
      .unwrap();
    // Reordering moves the designated fallback along with it.
    assert_eq!(
      registry.table(ShopVariant::Standard).default_category().id,
      new_last
    );
  }
}
