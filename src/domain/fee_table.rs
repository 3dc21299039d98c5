//! Fee categories and per-marketplace fee tables.
//!
//! Each shop variant carries its own table of category commission
//! rates. Category ids are shared across tables for the same semantic
//! category (a `laptop` is a `laptop` on every marketplace), which is
//! what lets a per-product category override survive a shop-variant
//! switch as long as the new table still knows the category. The last
//! entry of every table is the designated fallback category.

use serde::{Deserialize, Serialize};

/// The marketplace variants the dashboard models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShopVariant {
    /// Regular marketplace storefront.
    Standard,
    /// Official-store ("mall") program with its own commission grid.
    Mall,
    /// TikTok Shop storefront.
    TiktokShop,
}

impl ShopVariant {
    /// All variants, in tab-display order.
    pub const ALL: [Self; 3] = [Self::Standard, Self::Mall, Self::TiktokShop];
}

impl std::fmt::Display for ShopVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Standard => write!(f, "standard"),
            Self::Mall => write!(f, "mall"),
            Self::TiktokShop => write!(f, "tiktok_shop"),
        }
    }
}

impl std::str::FromStr for ShopVariant {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "standard" => Ok(Self::Standard),
            "mall" => Ok(Self::Mall),
            "tiktok_shop" => Ok(Self::TiktokShop),
            _ => Err(()),
        }
    }
}

/// One fee category: a stable id, a display name, and a commission
/// rate in percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeCategory {
    /// Stable id, shared across tables for the same semantic category.
    pub id: String,
    /// Display name shown in the category picker.
    pub name: String,
    /// Category-fixed commission rate, percent of the listing price.
    pub rate: f64,
}

/// An ordered, non-empty list of fee categories for one shop variant.
///
/// The last category is the fallback applied to products without a
/// usable override.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeTable {
    categories: Vec<FeeCategory>,
}

impl FeeTable {
    /// Creates a table from an ordered category list.
    ///
    /// # Panics
    /// Panics if `categories` is empty; a table without a fallback
    /// category cannot resolve anything.
    pub fn new(categories: Vec<FeeCategory>) -> Self {
        assert!(!categories.is_empty(), "fee table must not be empty");
        Self { categories }
    }

    /// The ordered category list.
    pub fn categories(&self) -> &[FeeCategory] {
        &self.categories
    }

    /// Looks up a category by id.
    pub fn find(&self, id: &str) -> Option<&FeeCategory> {
        self.categories.iter().find(|c| c.id == id)
    }

    /// Whether the table knows this category id.
    pub fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    /// The designated fallback category (the last entry).
    pub fn default_category(&self) -> &FeeCategory {
        self.categories
            .last()
            .expect("fee table is non-empty by construction")
    }

    /// Category ids in table order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|c| c.id.as_str())
    }
}

fn cat(id: &str, name: &str, rate: f64) -> FeeCategory {
    FeeCategory {
        id: id.to_string(),
        name: name.to_string(),
        rate,
    }
}

/// Built-in commission grid for the given shop variant.
///
/// Rates follow the published IT-category schedules. Every table ends
/// with the `other` catch-all so the fallback is the same semantic
/// category everywhere.
pub fn builtin_table(variant: ShopVariant) -> FeeTable {
    match variant {
        ShopVariant::Mall => FeeTable::new(vec![
            // 3.30% group: systems and servers
            cat("laptop", "Laptops", 3.30),
            cat("desktop", "Desktops / All-in-One", 3.30),
            cat("server", "Servers", 3.30),
            cat("mini_pc", "Mini PCs", 3.30),
            // 6.40% group: high-end cameras
            cat("camera_dslr", "DSLR / Mirrorless Cameras", 6.40),
            // 7.80% group
            cat("cpu", "CPUs", 7.80),
            cat("monitor", "Monitors", 7.80),
            cat("action_camera", "Action / Digital Cameras", 7.80),
            cat("lens", "Camera Lenses", 7.80),
            // 8.50% group
            cat("mainboard", "Mainboards", 8.50),
            cat("printer", "Printers / Scanners", 8.50),
            // 10.50% group: storage and premium audio
            cat("ssd", "SSDs", 10.50),
            cat("external_drive", "External Drives", 10.50),
            cat("ups", "UPS Units", 10.50),
            cat("amplifier", "Amplifiers & Receivers", 10.50),
            cat("drawing_tablet", "Drawing Tablets", 10.50),
            cat("printer_3d", "3D / Label Printers", 10.50),
            // 12.60% group: most components and accessories
            cat("ram", "RAM", 12.60),
            cat("gpu", "Graphics Cards", 12.60),
            cat("case_psu", "Cases & Power Supplies", 12.60),
            cat("cooling", "Fans & Cooling", 12.60),
            cat("mouse_keyboard", "Mice & Keyboards", 12.60),
            cat("audio", "Speakers / Headsets / Mics", 12.60),
            cat("network", "Network Equipment", 12.60),
            cat("usb_storage", "USB / Flash / NAS", 12.60),
            cat("optical_drive", "Optical Drives", 12.60),
            cat("camera_accessory", "Camera / Drone Accessories", 12.60),
            cat("software", "Software", 12.60),
            cat("cable_adapter", "Cables & Adapters", 12.60),
            cat("office_equipment", "Other Office Equipment", 12.60),
            cat("other", "Other / Default", 12.60),
        ]),
        ShopVariant::Standard => FeeTable::new(vec![
            // 1.50% group
            cat("monitor", "Monitors", 1.50),
            cat("desktop", "Desktops", 1.50),
            cat("laptop", "Laptops", 1.50),
            // 7.00% group
            cat("components", "PC Components (General)", 7.00),
            cat("accessories", "PC Accessories", 7.00),
            cat("printer", "Printers & Scanners", 7.00),
            cat("storage", "Storage Devices", 7.00),
            cat("network", "Network Equipment", 7.00),
            cat("cable_adapter", "Cables & Adapters", 7.00),
            cat("media_player", "Media Players", 7.00),
            // 8.00% group
            cat("mouse_keyboard", "Mice & Keyboards", 8.00),
            cat("office_equipment", "Office Equipment", 8.00),
            cat("software", "Software", 8.00),
            cat("audio", "Headsets / Speakers / Mics", 8.00),
            cat("amplifier", "Amplifiers & Audio Systems", 8.00),
            cat("other", "Other / Default", 7.00),
        ]),
        ShopVariant::TiktokShop => FeeTable::new(vec![
            // 1.21% group
            cat("phone_tablet", "Phones & Tablets", 1.21),
            // 1.82% group
            cat("laptop", "Laptops", 1.82),
            cat("desktop", "Desktops", 1.82),
            cat("monitor", "Monitors", 1.82),
            // 3.63% group
            cat("camera_dslr", "DSLR / Mirrorless Cameras", 3.63),
            // 6.05% group: most components and accessories
            cat("components", "Components (RAM/CPU/GPU/Mainboard)", 6.05),
            cat("accessories", "Accessories (Mice/Keyboards/Headsets)", 6.05),
            cat("network", "Network Equipment", 6.05),
            cat("office_equipment", "Office Equipment", 6.05),
            cat("camera_accessory", "Cameras & Accessories", 6.05),
            cat("other", "Other / Default", 6.05),
        ]),
    }
}
