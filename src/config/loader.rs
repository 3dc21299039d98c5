//! Configuration Loader - File Loading and Validation
//!
//! Handles loading `config.toml`, validating all parameters, and
//! providing clear error messages for misconfiguration. A missing
//! file is not an error: the dashboard starts on defaults so a fresh
//! checkout runs without ceremony.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use super::AppConfig;

/// Load and validate configuration from a TOML file.
///
/// # Errors
/// Returns a detailed error if the file exists but cannot be read or
/// parsed, or if validation rules are violated.
pub fn load_config(path: &str) -> Result<AppConfig> {
  let path = Path::new(path);

  let config = if path.exists() {
    let content = std::fs::read_to_string(path)
      .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    toml::from_str(&content).with_context(|| "Failed to parse config.toml")?
  } else {
    info!(path = %path.display(), "No config file found, using defaults");
    AppConfig::default()
  };

  validate_config(&config)?;
  Ok(config)
}

/// Validate all configuration parameters.
fn validate_config(config: &AppConfig) -> Result<()> {
  anyhow::ensure!(
    !config.server.bind_address.is_empty(),
    "server.bind_address must not be empty"
  );

  // Fee constants: rates may be zero (a marketplace without a payment
  // fee is legal) but never negative, and caps must stay meaningful.
  anyhow::ensure!(
    config.fees.payment_rate_percent >= 0.0,
    "fees.payment_rate_percent must be >= 0, got {}",
    config.fees.payment_rate_percent
  );
  anyhow::ensure!(
    config.fees.service_rate_percent >= 0.0,
    "fees.service_rate_percent must be >= 0, got {}",
    config.fees.service_rate_percent
  );
  anyhow::ensure!(
    config.fees.service_fee_cap >= 0.0,
    "fees.service_fee_cap must be >= 0, got {}",
    config.fees.service_fee_cap
  );
  anyhow::ensure!(
    config.fees.infra_fee >= 0.0,
    "fees.infra_fee must be >= 0, got {}",
    config.fees.infra_fee
  );

  anyhow::ensure!(
    config.dashboard.low_stock_threshold >= 0,
    "dashboard.low_stock_threshold must be >= 0, got {}",
    config.dashboard.low_stock_threshold
  );
  anyhow::ensure!(
    config.dashboard.best_seller_limit > 0,
    "dashboard.best_seller_limit must be positive"
  );

  anyhow::ensure!(
    config.ai.summary_limit > 0,
    "ai.summary_limit must be positive"
  );
  anyhow::ensure!(
    !config.ai.api_url.is_empty(),
    "ai.api_url must not be empty"
  );
  anyhow::ensure!(
    config.ai.timeout_seconds > 0,
    "ai.timeout_seconds must be positive"
  );

  anyhow::ensure!(
    !config.persistence.data_dir.is_empty(),
    "persistence.data_dir must not be empty"
  );

  Ok(())
}
