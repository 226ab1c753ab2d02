//! Fixed place-type → category → icon taxonomy.
//!
//! # Invariants
//! - The standard map is built once per process and never mutated.
//! - Every category name maps to exactly one icon resource.
//! - Unmapped place types resolve to `OTHER_CATEGORY`.

use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

pub const OTHER_CATEGORY: &str = "Other";

const PLACE_TYPE_CATEGORIES: &[(&str, &str)] = &[
    ("bakery", "Restaurant"),
    ("bar", "Restaurant"),
    ("cafe", "Restaurant"),
    ("food", "Restaurant"),
    ("restaurant", "Restaurant"),
    ("meal_delivery", "Restaurant"),
    ("meal_takeaway", "Restaurant"),
    ("gas_station", "Gas"),
    ("clothing_store", "Shopping"),
    ("department_store", "Shopping"),
    ("furniture_store", "Shopping"),
    ("grocery_or_supermarket", "Shopping"),
    ("hardware_store", "Shopping"),
    ("home_goods_store", "Shopping"),
    ("jewelry_store", "Shopping"),
    ("shoe_store", "Shopping"),
    ("shopping_mall", "Shopping"),
    ("store", "Shopping"),
    ("lodging", "Lodging"),
    ("room", "Lodging"),
];

const CATEGORY_ICONS: &[(&str, &str)] = &[
    ("Gas", "ic_gas"),
    ("Lodging", "ic_lodging"),
    (OTHER_CATEGORY, "ic_other"),
    ("Restaurant", "ic_restaurant"),
    ("Shopping", "ic_shopping"),
];

static STANDARD_CATEGORY_MAP: Lazy<CategoryMap> = Lazy::new(CategoryMap::build_standard);

/// Icon reference carried by view projections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "resource")]
pub enum IconRef {
    /// Platform drawable resource name.
    Resource(&'static str),
    /// No icon could be resolved for the category.
    None,
}

impl IconRef {
    pub fn resource(&self) -> Option<&'static str> {
        match self {
            Self::Resource(name) => Some(*name),
            Self::None => None,
        }
    }
}

impl From<Option<&'static str>> for IconRef {
    fn from(value: Option<&'static str>) -> Self {
        value.map_or(Self::None, Self::Resource)
    }
}

/// Place-type and category lookup tables.
#[derive(Debug)]
pub struct CategoryMap {
    by_place_type: HashMap<&'static str, &'static str>,
    icons: BTreeMap<&'static str, &'static str>,
}

impl CategoryMap {
    /// Returns the process-wide standard taxonomy.
    pub fn standard() -> &'static CategoryMap {
        &STANDARD_CATEGORY_MAP
    }

    fn build_standard() -> Self {
        Self {
            by_place_type: PLACE_TYPE_CATEGORIES.iter().copied().collect(),
            icons: CATEGORY_ICONS.iter().copied().collect(),
        }
    }

    /// Maps an external place type to a category name.
    ///
    /// Matching ignores case and surrounding whitespace, so `GAS_STATION`
    /// and `gas_station` resolve the same way.
    pub fn resolve_category(&self, place_type: &str) -> &'static str {
        let normalized = place_type.trim().to_ascii_lowercase();
        self.by_place_type
            .get(normalized.as_str())
            .copied()
            .unwrap_or(OTHER_CATEGORY)
    }

    /// Resolves the first mapped type in `place_types`, or `Other`.
    pub fn resolve_first<'a>(&self, place_types: impl IntoIterator<Item = &'a str>) -> &'static str {
        place_types
            .into_iter()
            .map(|place_type| self.resolve_category(place_type))
            .find(|category| *category != OTHER_CATEGORY)
            .unwrap_or(OTHER_CATEGORY)
    }

    pub fn category_icon(&self, category: &str) -> Option<&'static str> {
        self.icons.get(category).copied()
    }

    pub fn icon_ref(&self, category: &str) -> IconRef {
        self.category_icon(category).into()
    }

    pub fn is_category(&self, category: &str) -> bool {
        self.icons.contains_key(category)
    }

    /// All category names, sorted.
    pub fn categories(&self) -> Vec<&'static str> {
        self.icons.keys().copied().collect()
    }
}
