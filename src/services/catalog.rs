use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// The two dashboard catalogs, loaded once at startup and shared read-only.
///
/// `nbs` maps a food item to its item types; `supermarkets` maps a food item
/// to item types and their category labels. Requests are validated against
/// the catalog for their namespace before any scoped query runs.
#[derive(Debug, Clone)]
pub struct DashboardCatalogs {
    nbs: BTreeMap<String, Vec<String>>,
    supermarkets: BTreeMap<String, BTreeMap<String, Vec<String>>>,
}

impl DashboardCatalogs {
    pub fn new(
        nbs: BTreeMap<String, Vec<String>>,
        supermarkets: BTreeMap<String, BTreeMap<String, Vec<String>>>,
    ) -> Self {
        Self { nbs, supermarkets }
    }

    /// Load both catalog documents from `dir`. A missing or malformed file
    /// is an error; callers treat that as fatal at startup.
    pub fn load(dir: &Path) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let nbs_path = dir.join("nbs_dashboard.json");
        let nbs_raw = fs::read_to_string(&nbs_path)
            .map_err(|e| format!("failed to read {}: {}", nbs_path.display(), e))?;
        let nbs = serde_json::from_str(&nbs_raw)
            .map_err(|e| format!("failed to parse {}: {}", nbs_path.display(), e))?;

        let supermarkets_path = dir.join("supermarkets_dashboard.json");
        let supermarkets_raw = fs::read_to_string(&supermarkets_path)
            .map_err(|e| format!("failed to read {}: {}", supermarkets_path.display(), e))?;
        let supermarkets = serde_json::from_str(&supermarkets_raw)
            .map_err(|e| format!("failed to parse {}: {}", supermarkets_path.display(), e))?;

        Ok(Self { nbs, supermarkets })
    }

    pub fn validate_nbs_item(&self, food_item: &str) -> Result<(), String> {
        if self.nbs.contains_key(food_item) {
            Ok(())
        } else {
            Err(invalid_item_message(self.nbs.keys()))
        }
    }

    pub fn validate_supermarket_item(&self, food_item: &str) -> Result<(), String> {
        if self.supermarkets.contains_key(food_item) {
            Ok(())
        } else {
            Err(invalid_item_message(self.supermarkets.keys()))
        }
    }

    /// Item types listed for an NBS food item.
    pub fn nbs_item_types(&self, food_item: &str) -> Vec<String> {
        self.nbs.get(food_item).cloned().unwrap_or_default()
    }

    /// Every (item_type, category) pair listed for a supermarket food item,
    /// flattened for scoped filtering.
    pub fn supermarket_pairs(&self, food_item: &str) -> Vec<(String, String)> {
        let Some(item_types) = self.supermarkets.get(food_item) else {
            return Vec::new();
        };
        item_types
            .iter()
            .flat_map(|(item_type, categories)| {
                categories
                    .iter()
                    .map(move |category| (item_type.clone(), category.clone()))
            })
            .collect()
    }
}

fn invalid_item_message<'a>(keys: impl Iterator<Item = &'a String>) -> String {
    let valid: Vec<&str> = keys.map(String::as_str).collect();
    format!("Invalid food_item. Valid options are: {}", valid.join(", "))
}
