//! Core product domain types.
//!
//! Defines the three raw source record shapes, the unified product
//! entity they merge into, and SKU normalization. Raw record fields
//! other than the SKU are `Option`s: the CSV adapter parses leniently
//! (malformed content becomes `None`) and the merger applies defaults
//! exactly once, so everything downstream operates on fully typed,
//! defaulted data.

use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────
// SKU normalization
// ────────────────────────────────────────────

/// Normalized product identifier shared across all three sources.
pub type Sku = String;

/// Normalizes a raw SKU: trim surrounding whitespace, ASCII uppercase.
///
/// This is the single normalization point for the whole crate; both the
/// merger and the override path go through it, so `" logi-g102 "` and
/// `"LOGI-G102"` can never mint separate entities. Returns `None` for
/// identifiers that are empty after trimming; rows carrying those are
/// dropped without affecting the rest of the merge.
pub fn normalize_sku(raw: &str) -> Option<Sku> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_ascii_uppercase())
    }
}

/// Placeholder name for products whose master-data row is missing.
pub const UNNAMED_PRODUCT: &str = "N/A";

// ────────────────────────────────────────────
// Raw source records (pre-merge)
// ────────────────────────────────────────────

/// The three independent seller exports the dashboard reconciles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Product master data: name and cost price.
    Info,
    /// Warehouse stock levels and trailing-30-day sales.
    Inventory,
    /// List price and marketplace listing price.
    Pricing,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Inventory => write!(f, "inventory"),
            Self::Pricing => write!(f, "pricing"),
        }
    }
}

impl std::str::FromStr for SourceKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "info" => Ok(Self::Info),
            "inventory" => Ok(Self::Inventory),
            "pricing" => Ok(Self::Pricing),
            _ => Err(()),
        }
    }
}

/// One row of the product-master export.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawProductInfo {
    /// Raw (un-normalized) SKU as it appeared in the file.
    pub sku: String,
    /// Display name; blank treated as absent.
    #[serde(default)]
    pub name: Option<String>,
    /// Acquisition cost; absent or unparseable coerces to 0 at merge.
    #[serde(default, deserialize_with = "de::lenient_f64")]
    pub cost_price: Option<f64>,
}

/// One row of the inventory/sales export.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawInventory {
    pub sku: String,
    /// Units at the main warehouse.
    #[serde(default, deserialize_with = "de::lenient_i64")]
    pub stock_main: Option<i64>,
    /// Units at the branch warehouse.
    #[serde(default, deserialize_with = "de::lenient_i64")]
    pub stock_branch: Option<i64>,
    /// Units sold over the trailing 30 days.
    #[serde(default, deserialize_with = "de::lenient_i64")]
    pub sales_30d: Option<i64>,
}

/// One row of the pricing export.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPricing {
    pub sku: String,
    /// Reference list price (e.g. own web store).
    #[serde(default, deserialize_with = "de::lenient_f64")]
    pub price_list: Option<f64>,
    /// Price actually listed on the marketplace; the fee basis.
    #[serde(default, deserialize_with = "de::lenient_f64")]
    pub price_market: Option<f64>,
}

/// The current snapshot of all three uploaded sources.
#[derive(Debug, Clone, Default)]
pub struct RawSources {
    pub info: Vec<RawProductInfo>,
    pub inventory: Vec<RawInventory>,
    pub pricing: Vec<RawPricing>,
}

impl RawSources {
    /// True when none of the three sources has been loaded yet.
    pub fn is_empty(&self) -> bool {
        self.info.is_empty() && self.inventory.is_empty() && self.pricing.is_empty()
    }
}

// ────────────────────────────────────────────
// Unified entity (post-merge)
// ────────────────────────────────────────────

/// One fully reconciled product: the outer join of the three sources
/// plus the resolved fee category and the computed fee and profit.
///
/// Instances are rebuilt wholesale on every merge; the only state that
/// survives a rebuild lives in the override store and the fee table
/// registry. `fee_category_id` always names a category present in the
/// table the merge ran against, and `platform_fee`/`profit` are never
/// stale relative to `price_market`, `fee_rate`, and the service
/// toggle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnifiedProduct {
    pub sku: Sku,
    pub name: String,
    pub cost_price: f64,
    pub stock_main: i64,
    pub stock_branch: i64,
    pub sales_30d: i64,
    pub price_list: f64,
    pub price_market: f64,
    /// Resolved fee category id, always present in the active table.
    pub fee_category_id: String,
    /// Percentage rate of the resolved category.
    pub fee_rate: f64,
    /// Total platform fee at `price_market`.
    pub platform_fee: f64,
    /// `price_market - cost_price - platform_fee`; may be negative.
    pub profit: f64,
}

impl UnifiedProduct {
    /// Combined stock across both warehouses.
    pub fn stock_total(&self) -> i64 {
        self.stock_main + self.stock_branch
    }
}

// ────────────────────────────────────────────
// Lenient numeric deserialization (CSV boundary)
// ────────────────────────────────────────────

/// Deserializers that coerce malformed numeric CSV content to `None`
/// instead of failing the whole file. A junk `cost_price` cell must
/// degrade to the field default, never abort the upload.
pub mod de {
    use serde::{Deserialize, Deserializer};

    pub fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        Ok(raw.and_then(|s| s.trim().parse::<f64>().ok()))
    }

    pub fn lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        Ok(raw.and_then(|s| {
            let t = s.trim();
            // Integer columns occasionally arrive as "3.0" from
            // spreadsheet exports; accept the float form too.
            t.parse::<i64>()
                .ok()
                .or_else(|| t.parse::<f64>().ok().map(|f| f as i64))
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_trims_and_uppercases() {
        assert_eq!(normalize_sku("  logi-g102 "), Some("LOGI-G102".to_string()));
        assert_eq!(normalize_sku("SSD-980_RED"), Some("SSD-980_RED".to_string()));
    }

    #[test]
    fn test_normalize_blank_is_none() {
        assert_eq!(normalize_sku(""), None);
        assert_eq!(normalize_sku("   "), None);
        assert_eq!(normalize_sku("\t\n"), None);
    }

    #[test]
    fn test_stock_total() {
        let p = UnifiedProduct {
            sku: "A1".into(),
            name: "Widget".into(),
            cost_price: 0.0,
            stock_main: 5,
            stock_branch: 2,
            sales_30d: 0,
            price_list: 0.0,
            price_market: 0.0,
            fee_category_id: "other".into(),
            fee_rate: 7.0,
            platform_fee: 0.0,
            profit: 0.0,
        };
        assert_eq!(p.stock_total(), 7);
    }

    #[test]
    fn test_source_kind_display() {
        assert_eq!(SourceKind::Info.to_string(), "info");
        assert_eq!(SourceKind::Inventory.to_string(), "inventory");
        assert_eq!(SourceKind::Pricing.to_string(), "pricing");
    }
}
