//! Uniform catalog lookup
//!
//! Pricing always comes from the catalog at order time, never from the
//! client. The production implementation loads a JSON file once at startup;
//! the catalog is small and changes rarely.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// One priced uniform item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogItem {
    pub item_id: String,
    pub name: String,
    pub price: f64,
    /// Empty when the item is one-size
    #[serde(default)]
    pub sizes: Vec<String>,
}

impl CatalogItem {
    /// Whether a requested size is valid for this item
    pub fn accepts_size(&self, size: Option<&str>) -> bool {
        match size {
            None => self.sizes.is_empty(),
            Some(s) => self.sizes.iter().any(|known| known == s),
        }
    }
}

pub trait Catalog: Send + Sync {
    /// Look an item up by its display name (case-insensitive)
    fn lookup(&self, name: &str) -> Option<CatalogItem>;

    fn all(&self) -> Vec<CatalogItem>;
}

/// Catalog backed by a JSON file loaded at startup
pub struct JsonCatalog {
    by_name: HashMap<String, CatalogItem>,
}

impl JsonCatalog {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let items: Vec<CatalogItem> = serde_json::from_str(&raw)?;
        Ok(Self::from_items(items))
    }

    pub fn from_items(items: Vec<CatalogItem>) -> Self {
        let by_name = items
            .into_iter()
            .map(|item| (item.name.to_lowercase(), item))
            .collect();
        Self { by_name }
    }
}

impl Catalog for JsonCatalog {
    fn lookup(&self, name: &str) -> Option<CatalogItem> {
        self.by_name.get(&name.to_lowercase()).cloned()
    }

    fn all(&self) -> Vec<CatalogItem> {
        let mut items: Vec<CatalogItem> = self.by_name.values().cloned().collect();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> JsonCatalog {
        JsonCatalog::from_items(vec![
            CatalogItem {
                item_id: "item-1".to_string(),
                name: "Work Shirt".to_string(),
                price: 12.5,
                sizes: vec!["S".to_string(), "M".to_string(), "L".to_string()],
            },
            CatalogItem {
                item_id: "item-2".to_string(),
                name: "Belt".to_string(),
                price: 8.0,
                sizes: vec![],
            },
        ])
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let cat = catalog();
        assert_eq!(cat.lookup("work shirt").unwrap().item_id, "item-1");
        assert!(cat.lookup("Apron").is_none());
    }

    #[test]
    fn size_validation_tracks_the_item() {
        let cat = catalog();
        let shirt = cat.lookup("Work Shirt").unwrap();
        assert!(shirt.accepts_size(Some("M")));
        assert!(!shirt.accepts_size(Some("XXL")));
        assert!(!shirt.accepts_size(None));

        let belt = cat.lookup("Belt").unwrap();
        assert!(belt.accepts_size(None));
        assert!(!belt.accepts_size(Some("M")));
    }
}
