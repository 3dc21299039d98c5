//! Override Store Adapters - In-Memory Map + JSON Snapshots
//!
//! `MemoryOverrideStore` is the live store behind the port; the
//! snapshot store persists its entries to `overrides.json` with
//! atomic writes (tmp file, then rename) so category choices survive
//! restarts the same way the UI's local storage did.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs;
use tracing::info;

use crate::domain::product::{normalize_sku, Sku};
use crate::ports::override_store::OverrideStore;

/// In-memory override store.
///
/// Keys are normalized on the way in and out, so a hydrated snapshot
/// written by an older build with raw keys still resolves.
#[derive(Debug, Clone, Default)]
pub struct MemoryOverrideStore {
    entries: HashMap<Sku, String>,
}

impl MemoryOverrideStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store hydrated from snapshot entries. Blank SKUs are skipped.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut store = Self::new();
        for (sku, category_id) in entries {
            store.set(&sku, &category_id);
        }
        store
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl OverrideStore for MemoryOverrideStore {
    fn get(&self, sku: &str) -> Option<String> {
        let sku = normalize_sku(sku)?;
        self.entries.get(&sku).cloned()
    }

    fn set(&mut self, sku: &str, category_id: &str) {
        if let Some(sku) = normalize_sku(sku) {
            self.entries.insert(sku, category_id.to_string());
        }
    }

    fn entries(&self) -> Vec<(Sku, String)> {
        let mut entries: Vec<(Sku, String)> = self
            .entries
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        entries.sort();
        entries
    }
}

/// Atomic JSON snapshot file for override entries.
pub struct OverrideSnapshotStore {
    path: PathBuf,
    tmp_path: PathBuf,
}

impl OverrideSnapshotStore {
    /// Creates the store in the given data directory, creating the
    /// directory if needed.
    pub async fn new(data_dir: &str) -> Result<Self> {
        let dir = Path::new(data_dir);
        fs::create_dir_all(dir)
            .await
            .context("Failed to create data directory")?;

        Ok(Self {
            path: dir.join("overrides.json"),
            tmp_path: dir.join("overrides.json.tmp"),
        })
    }

    /// Saves the entries atomically (tmp → rename). A sorted map keeps
    /// the file diff-friendly.
    pub async fn save(&self, entries: &[(Sku, String)]) -> Result<()> {
        let map: BTreeMap<&str, &str> = entries
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        let json =
            serde_json::to_string_pretty(&map).context("Failed to serialize overrides")?;

        fs::write(&self.tmp_path, &json)
            .await
            .context("Failed to write tmp overrides file")?;
        fs::rename(&self.tmp_path, &self.path)
            .await
            .context("Failed to rename overrides file")?;

        info!(
            path = %self.path.display(),
            entries = entries.len(),
            "Override snapshot saved"
        );
        Ok(())
    }

    /// Loads the snapshot. `None` when no file exists (first startup).
    pub async fn load(&self) -> Result<Option<HashMap<String, String>>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&self.path)
            .await
            .context("Failed to read overrides file")?;
        let map: HashMap<String, String> =
            serde_json::from_str(&json).context("Failed to parse overrides JSON")?;

        info!(entries = map.len(), "Override snapshot loaded");
        Ok(Some(map))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_normalizes_keys() {
        let mut store = MemoryOverrideStore::new();
        store.set("  a1 ", "laptop");
        assert_eq!(store.get("A1").as_deref(), Some("laptop"));
        assert_eq!(store.get("a1").as_deref(), Some("laptop"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_memory_store_set_replaces() {
        let mut store = MemoryOverrideStore::new();
        store.set("A1", "laptop");
        store.set("A1", "monitor");
        assert_eq!(store.get("A1").as_deref(), Some("monitor"));
    }

    #[test]
    fn test_memory_store_blank_sku_ignored() {
        let mut store = MemoryOverrideStore::new();
        store.set("   ", "laptop");
        assert!(store.is_empty());
        assert_eq!(store.get(""), None);
    }

    #[test]
    fn test_unknown_category_id_stored_unchecked() {
        // Validity is a resolution-time concern; the store records
        // whatever it is told.
        let mut store = MemoryOverrideStore::new();
        store.set("A1", "category_from_the_future");
        assert_eq!(
            store.get("A1").as_deref(),
            Some("category_from_the_future")
        );
    }

    #[test]
    fn test_from_entries_hydration() {
        let store = MemoryOverrideStore::from_entries(vec![
            ("a1".to_string(), "laptop".to_string()),
            ("".to_string(), "ghost".to_string()),
        ]);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("A1").as_deref(), Some("laptop"));
    }

    #[tokio::test]
    async fn test_snapshot_round_trip() {
        let dir = std::env::temp_dir().join(format!(
            "profit-dash-overrides-{}",
            std::process::id()
        ));
        let store = OverrideSnapshotStore::new(dir.to_str().unwrap())
            .await
            .unwrap();

        assert!(store.load().await.unwrap().is_none());

        let entries = vec![
            ("A1".to_string(), "laptop".to_string()),
            ("B2".to_string(), "ram".to_string()),
        ];
        store.save(&entries).await.unwrap();

        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.get("A1").map(String::as_str), Some("laptop"));

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }
}
