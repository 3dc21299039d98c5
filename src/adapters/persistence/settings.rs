//! Settings Store - Atomic JSON User-Settings Persistence
//!
//! Saves the user-editable configuration surface (shop variant,
//! service-fee toggle, low-stock threshold) to `settings.json` using
//! atomic writes (write to tmp file, then rename). The core only ever
//! reads current values; persisting them is this adapter's job.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs;
use tracing::info;

use crate::config::UserSettings;

/// Atomic JSON store for [`UserSettings`].
pub struct SettingsStore {
    path: PathBuf,
    tmp_path: PathBuf,
}

impl SettingsStore {
    /// Creates the store in the given data directory, creating the
    /// directory if needed.
    pub async fn new(data_dir: &str) -> Result<Self> {
        let dir = Path::new(data_dir);
        fs::create_dir_all(dir)
            .await
            .context("Failed to create data directory")?;

        Ok(Self {
            path: dir.join("settings.json"),
            tmp_path: dir.join("settings.json.tmp"),
        })
    }

    /// Saves the settings atomically (tmp → rename).
    pub async fn save(&self, settings: &UserSettings) -> Result<()> {
        let json = serde_json::to_string_pretty(settings)
            .context("Failed to serialize settings")?;

        fs::write(&self.tmp_path, &json)
            .await
            .context("Failed to write tmp settings file")?;
        fs::rename(&self.tmp_path, &self.path)
            .await
            .context("Failed to rename settings file")?;

        info!(
            path = %self.path.display(),
            variant = %settings.shop_variant,
            "Settings snapshot saved"
        );
        Ok(())
    }

    /// Loads the snapshot. `None` when no file exists (first startup).
    pub async fn load(&self) -> Result<Option<UserSettings>> {
        if !self.path.exists() {
            info!("No settings file found, starting from config defaults");
            return Ok(None);
        }

        let json = fs::read_to_string(&self.path)
            .await
            .context("Failed to read settings file")?;
        let settings: UserSettings =
            serde_json::from_str(&json).context("Failed to parse settings JSON")?;

        Ok(Some(settings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fee_table::ShopVariant;

    #[tokio::test]
    async fn test_settings_round_trip() {
        let dir = std::env::temp_dir().join(format!(
            "profit-dash-settings-{}",
            std::process::id()
        ));
        let store = SettingsStore::new(dir.to_str().unwrap()).await.unwrap();

        assert!(store.load().await.unwrap().is_none());

        let settings = UserSettings {
            shop_variant: ShopVariant::Mall,
            service_fee_enabled: false,
            low_stock_threshold: 25,
        };
        store.save(&settings).await.unwrap();

        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded, settings);

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }
}
