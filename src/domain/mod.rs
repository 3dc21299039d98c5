//! Domain layer - Core business logic and models.
//!
//! Pure reconciliation and fee mathematics for the seller dashboard.
//! No I/O and no external service dependencies here (hexagonal
//! architecture inner ring); everything is synchronous, deterministic,
//! and testable in isolation.

pub mod fee_table;
pub mod fees;
pub mod product;

// Re-export core types for convenience
pub use fee_table::{builtin_table, FeeCategory, FeeTable, ShopVariant};
pub use fees::{profit, FeeBreakdown, FeeCalculator};
pub use product::{
    normalize_sku, RawInventory, RawPricing, RawProductInfo, RawSources, Sku, SourceKind,
    UnifiedProduct,
};
