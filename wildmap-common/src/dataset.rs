//! Dataset catalog
//!
//! Maps a dataset id (`frogs`, `owls`, ...) to the static feed file that
//! holds its recordings and the circle color used to draw it. The catalog
//! is built once at startup and never mutated afterwards.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Circle color for datasets the catalog does not know about
pub const DEFAULT_COLOR: &str = "#000";

/// Feed file and display color for one dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetEntry {
    /// Feed file name, relative to the feed root (e.g. `frogs.json`)
    pub file: String,
    /// CSS color for the recordings layer circles
    pub color: String,
}

impl DatasetEntry {
    pub fn new(file: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            color: color.into(),
        }
    }

    fn validate(&self, id: &str) -> Result<()> {
        if self.file.trim().is_empty() {
            return Err(Error::InvalidInput(format!(
                "dataset '{}' has an empty feed file",
                id
            )));
        }
        if self.color.trim().is_empty() {
            return Err(Error::InvalidInput(format!(
                "dataset '{}' has an empty color",
                id
            )));
        }
        Ok(())
    }
}

/// A dataset name resolved against the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedDataset {
    /// Catalog id, `None` when the name was not in the catalog
    pub id: Option<String>,
    /// Feed file to fetch
    pub file: String,
    /// Circle color to draw with
    pub color: String,
}

/// Immutable dataset id → entry mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetCatalog {
    entries: BTreeMap<String, DatasetEntry>,
}

impl DatasetCatalog {
    /// The four feeds shipped with the viewer
    pub fn builtin() -> Self {
        let mut entries = BTreeMap::new();
        entries.insert(
            "birds".to_string(),
            DatasetEntry::new("xeno-suffolk.json", "#e76f51"),
        );
        entries.insert(
            "frogs".to_string(),
            DatasetEntry::new("frogs.json", "#2a9d8f"),
        );
        entries.insert(
            "mammals".to_string(),
            DatasetEntry::new("mammals.json", "#264653"),
        );
        entries.insert(
            "owls".to_string(),
            DatasetEntry::new("owls.json", "#8e44ad"),
        );
        Self { entries }
    }

    /// Built-in catalog with entries from configuration layered on top.
    ///
    /// An override with an existing id replaces that entry; a new id adds one.
    pub fn with_overrides(overrides: &BTreeMap<String, DatasetEntry>) -> Result<Self> {
        let mut catalog = Self::builtin();
        for (id, entry) in overrides {
            entry.validate(id)?;
            catalog.entries.insert(id.clone(), entry.clone());
        }
        Ok(catalog)
    }

    pub fn get(&self, id: &str) -> Option<&DatasetEntry> {
        self.entries.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &DatasetEntry)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve a dataset id or feed file name.
    ///
    /// Lookup by id first, then by file name. Names matching neither are
    /// treated as a feed file drawn in [`DEFAULT_COLOR`].
    pub fn resolve(&self, name: &str) -> ResolvedDataset {
        if let Some(entry) = self.entries.get(name) {
            return ResolvedDataset {
                id: Some(name.to_string()),
                file: entry.file.clone(),
                color: entry.color.clone(),
            };
        }

        if let Some((id, entry)) = self.entries.iter().find(|(_, e)| e.file == name) {
            return ResolvedDataset {
                id: Some(id.clone()),
                file: entry.file.clone(),
                color: entry.color.clone(),
            };
        }

        ResolvedDataset {
            id: None,
            file: name.to_string(),
            color: DEFAULT_COLOR.to_string(),
        }
    }
}

impl Default for DatasetCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_colors() {
        let catalog = DatasetCatalog::builtin();
        assert_eq!(catalog.len(), 4);
        assert_eq!(catalog.resolve("frogs").color, "#2a9d8f");
        assert_eq!(catalog.resolve("birds").color, "#e76f51");
        assert_eq!(catalog.resolve("mammals").color, "#264653");
        assert_eq!(catalog.resolve("owls").color, "#8e44ad");
    }

    #[test]
    fn test_resolve_by_file_name() {
        let catalog = DatasetCatalog::builtin();
        let resolved = catalog.resolve("frogs.json");
        assert_eq!(resolved.id.as_deref(), Some("frogs"));
        assert_eq!(resolved.file, "frogs.json");
        assert_eq!(resolved.color, "#2a9d8f");
    }

    #[test]
    fn test_unknown_dataset_falls_back_to_default_color() {
        let catalog = DatasetCatalog::builtin();
        let resolved = catalog.resolve("bats.json");
        assert_eq!(resolved.id, None);
        assert_eq!(resolved.file, "bats.json");
        assert_eq!(resolved.color, DEFAULT_COLOR);
    }

    #[test]
    fn test_overrides_replace_and_extend() {
        let mut overrides = BTreeMap::new();
        overrides.insert("owls".to_string(), DatasetEntry::new("owls-2024.json", "#ff00ff"));
        overrides.insert("bats".to_string(), DatasetEntry::new("bats.json", "#111111"));

        let catalog = DatasetCatalog::with_overrides(&overrides).unwrap();
        assert_eq!(catalog.len(), 5);
        assert_eq!(catalog.get("owls").unwrap().file, "owls-2024.json");
        assert_eq!(catalog.resolve("bats").color, "#111111");
        // Untouched entries survive
        assert_eq!(catalog.resolve("frogs").color, "#2a9d8f");
    }

    #[test]
    fn test_override_with_empty_color_rejected() {
        let mut overrides = BTreeMap::new();
        overrides.insert("bats".to_string(), DatasetEntry::new("bats.json", " "));

        let result = DatasetCatalog::with_overrides(&overrides);
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }
}
