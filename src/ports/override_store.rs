//! Override Store Port - Per-Product Category Choices
//!
//! A seller can pin any product to a specific fee category from the
//! table dropdown. Those choices are keyed by normalized SKU and live
//! outside the merge output, so they survive the wholesale rebuild
//! that every merge performs.

use crate::domain::product::Sku;

/// Persistent mapping from SKU to a user-chosen fee category id.
///
/// The store is deliberately dumb: it records whatever category id it
/// is given, including ids no table currently knows. Validity is
/// enforced at merge time, where an unknown id silently resolves to
/// the active table's default category. Entries never expire; they
/// live for the whole session.
///
/// The core is synchronous (no suspension points), so this port is a
/// plain trait. Hosts that mutate from multiple threads are expected
/// to wrap the store in a reader-writer lock.
pub trait OverrideStore: Send + Sync {
  /// The category id chosen for this SKU, if any.
  fn get(&self, sku: &str) -> Option<String>;

  /// Records a category choice for this SKU, replacing any previous
  /// one. Takes effect on the next merge; already-produced entities
  /// are not retroactively mutated.
  fn set(&mut self, sku: &str, category_id: &str);

  /// All recorded choices, for snapshot persistence.
  fn entries(&self) -> Vec<(Sku, String)>;
}
