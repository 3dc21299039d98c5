//! Configuration Module - TOML-based Dashboard Configuration
//!
//! Loads configuration from `config.toml`. Every field has a default,
//! so a missing file or a partial one still yields a runnable setup.
//! Fee rate constants are externalized here - nothing is hardcoded in
//! the domain layer.

pub mod loader;

use serde::{Deserialize, Serialize};

use crate::domain::fee_table::ShopVariant;

/// Top-level dashboard configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
  /// HTTP server settings.
  #[serde(default)]
  pub server: ServerConfig,
  /// Initial dashboard settings (used until a settings snapshot
  /// exists).
  #[serde(default)]
  pub dashboard: DashboardConfig,
  /// Platform-wide fee constants.
  #[serde(default)]
  pub fees: FeeConfig,
  /// External AI text-generation service.
  #[serde(default)]
  pub ai: AiConfig,
  /// Snapshot persistence.
  #[serde(default)]
  pub persistence: PersistenceConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  /// API bind address.
  #[serde(default = "default_bind_address")]
  pub bind_address: String,
  /// Log level filter used when RUST_LOG is unset.
  #[serde(default = "default_log_level")]
  pub log_level: String,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      bind_address: default_bind_address(),
      log_level: default_log_level(),
    }
  }
}

/// Initial dashboard settings.
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
  /// Marketplace tab selected at first startup.
  #[serde(default = "default_shop_variant")]
  pub shop_variant: ShopVariant,
  /// Whether the capped service fee is charged.
  #[serde(default = "default_true")]
  pub service_fee_enabled: bool,
  /// Stock warning threshold.
  #[serde(default = "default_low_stock_threshold")]
  pub low_stock_threshold: i64,
  /// Row cap for the best-seller chip.
  #[serde(default = "default_best_seller_limit")]
  pub best_seller_limit: usize,
}

impl Default for DashboardConfig {
  fn default() -> Self {
    Self {
      shop_variant: default_shop_variant(),
      service_fee_enabled: true,
      low_stock_threshold: default_low_stock_threshold(),
      best_seller_limit: default_best_seller_limit(),
    }
  }
}

/// Platform-wide fee constants. Defaults follow the published
/// marketplace schedule.
#[derive(Debug, Clone, Deserialize)]
pub struct FeeConfig {
  /// Payment processing rate, percent of price.
  #[serde(default = "default_payment_rate")]
  pub payment_rate_percent: f64,
  /// Service fee rate, percent of price.
  #[serde(default = "default_service_rate")]
  pub service_rate_percent: f64,
  /// Flat ceiling for the service fee.
  #[serde(default = "default_service_cap")]
  pub service_fee_cap: f64,
  /// Flat infrastructure fee per priced sale.
  #[serde(default = "default_infra_fee")]
  pub infra_fee: f64,
}

impl Default for FeeConfig {
  fn default() -> Self {
    Self {
      payment_rate_percent: default_payment_rate(),
      service_rate_percent: default_service_rate(),
      service_fee_cap: default_service_cap(),
      infra_fee: default_infra_fee(),
    }
  }
}

impl FeeConfig {
  /// Builds the domain fee calculator from this section.
  pub fn calculator(&self) -> crate::domain::fees::FeeCalculator {
    crate::domain::fees::FeeCalculator::new(
      self.payment_rate_percent,
      self.service_rate_percent,
      self.service_fee_cap,
      self.infra_fee,
    )
  }
}

/// External text-generation service configuration. The API key is
/// never part of the file; it comes from `TEXTGEN_API_KEY`.
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
  /// Whether the chat endpoint is wired at all.
  #[serde(default = "default_true")]
  pub enabled: bool,
  /// Base URL of the generateContent-style API.
  #[serde(default = "default_ai_url")]
  pub api_url: String,
  /// Model name appended to the URL.
  #[serde(default = "default_ai_model")]
  pub model: String,
  /// Request timeout in seconds.
  #[serde(default = "default_ai_timeout")]
  pub timeout_seconds: u64,
  /// Product cap for the serialized chat context.
  #[serde(default = "default_summary_limit")]
  pub summary_limit: usize,
}

impl Default for AiConfig {
  fn default() -> Self {
    Self {
      enabled: true,
      api_url: default_ai_url(),
      model: default_ai_model(),
      timeout_seconds: default_ai_timeout(),
      summary_limit: default_summary_limit(),
    }
  }
}

/// Snapshot persistence configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PersistenceConfig {
  /// Directory for settings.json and overrides.json.
  #[serde(default = "default_data_dir")]
  pub data_dir: String,
}

impl Default for PersistenceConfig {
  fn default() -> Self {
    Self {
      data_dir: default_data_dir(),
    }
  }
}

/// The user-editable configuration surface, persisted across restarts
/// (the localStorage analog). Seeded from [`DashboardConfig`] when no
/// snapshot exists yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSettings {
  pub shop_variant: ShopVariant,
  pub service_fee_enabled: bool,
  pub low_stock_threshold: i64,
}

impl Default for UserSettings {
  fn default() -> Self {
    Self::from(&DashboardConfig::default())
  }
}

impl From<&DashboardConfig> for UserSettings {
  fn from(config: &DashboardConfig) -> Self {
    Self {
      shop_variant: config.shop_variant,
      service_fee_enabled: config.service_fee_enabled,
      low_stock_threshold: config.low_stock_threshold,
    }
  }
}

// Default value functions for serde

fn default_bind_address() -> String {
  "0.0.0.0:8080".to_string()
}

fn default_log_level() -> String {
  "info".to_string()
}

fn default_shop_variant() -> ShopVariant {
  ShopVariant::Standard
}

fn default_true() -> bool {
  true
}

fn default_low_stock_threshold() -> i64 {
  10
}

fn default_best_seller_limit() -> usize {
  20
}

fn default_payment_rate() -> f64 {
  4.91
}

fn default_service_rate() -> f64 {
  2.5
}

fn default_service_cap() -> f64 {
  50_000.0
}

fn default_infra_fee() -> f64 {
  4_620.0 // 3 000 + 1 620
}

fn default_ai_url() -> String {
  "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_ai_model() -> String {
  "gemini-2.5-flash".to_string()
}

fn default_ai_timeout() -> u64 {
  30
}

fn default_summary_limit() -> usize {
  50
}

fn default_data_dir() -> String {
  "data".to_string()
}
