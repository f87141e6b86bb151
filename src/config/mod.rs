//! Configuration Module - TOML + Environment Configuration
//!
//! Loads configuration from an optional `config.toml` and applies
//! environment variable overrides (`.env` supported). All object ids
//! and strategy parameters are externalized here - nothing is
//! hardcoded in the use-case layer. The signing key is never part of
//! this struct; the signer reads it directly from the environment.

pub mod loader;

use serde::Deserialize;

use crate::domain::order::{OrderType, SelfMatchingOption};
use crate::domain::vault::Vault;

/// Top-level quoter configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
  /// Process identity and logging.
  #[serde(default)]
  pub bot: BotConfig,
  /// Ledger endpoint and on-chain object ids.
  #[serde(default)]
  pub chain: ChainConfig,
  /// Spread order parameters.
  #[serde(default)]
  pub strategy: StrategyConfig,
  /// Loop pacing.
  #[serde(default)]
  pub scheduler: SchedulerConfig,
  /// Metrics and health endpoints.
  #[serde(default)]
  pub metrics: MetricsConfig,
  /// Vaults to quote, visited in this order.
  #[serde(default)]
  pub vaults: Vec<Vault>,
}

/// Process identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
  /// Human-readable process name.
  #[serde(default = "default_name")]
  pub name: String,
  /// Log level (trace, debug, info, warn, error).
  #[serde(default = "default_log_level")]
  pub log_level: String,
  /// Emit JSON log lines instead of human-readable ones.
  #[serde(default = "default_true")]
  pub json_logs: bool,
  /// Dry-run transactions instead of executing them.
  #[serde(default)]
  pub dry_run: bool,
}

/// Ledger and contract configuration.
///
/// Object ids are ALWAYS in config or env - never hardcoded.
#[derive(Debug, Clone, Deserialize)]
pub struct ChainConfig {
  /// Sui full node JSON-RPC endpoint.
  #[serde(default = "default_rpc_url")]
  pub rpc_url: String,
  /// Package exporting the `mm_vault` module.
  #[serde(default)]
  pub amm_package_id: String,
  /// DeepBook package the vault trades against.
  #[serde(default)]
  pub deepbook_package_id: String,
  /// Trade capability object held by the quoter's address.
  #[serde(default)]
  pub trade_cap_id: String,
  /// Default DeepBook pool (vaults may override).
  #[serde(default)]
  pub pool_id: String,
  /// DeepBook balance manager backing the vault.
  #[serde(default)]
  pub balance_manager_id: Option<String>,
  /// RPC request timeout (milliseconds).
  #[serde(default = "default_request_timeout")]
  pub request_timeout_ms: u64,
  /// Gas budget per transaction (MIST).
  #[serde(default = "default_gas_budget")]
  pub gas_budget: u64,
}

/// Spread order parameters, passed to the vault unchanged.
#[derive(Debug, Clone, Deserialize)]
pub struct StrategyConfig {
  /// Spread width in basis points.
  #[serde(default = "default_spread_bps")]
  pub spread_bps: u64,
  /// Order size in base units.
  #[serde(default = "default_order_size")]
  pub order_size: u64,
  /// Maximum inventory skew, 0-100.
  #[serde(default = "default_max_skew")]
  pub max_skew_percent: u64,
  /// Order lifetime measured from submission (milliseconds).
  #[serde(default = "default_order_expiry")]
  pub order_expiry_ms: u64,
  #[serde(default)]
  pub order_type: OrderType,
  #[serde(default)]
  pub self_matching: SelfMatchingOption,
  /// Treat undecodable vault balances as an error instead of zero.
  #[serde(default)]
  pub strict_balance_decode: bool,
  /// Decode `OrderCreatedEvent`s and keep an active-order map.
  #[serde(default)]
  pub track_orders: bool,
}

/// Loop pacing configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
  /// Pause after each successful vault visit (milliseconds).
  #[serde(default = "default_interval")]
  pub interval_ms: u64,
  /// Pause after a failed vault visit (milliseconds).
  #[serde(default = "default_error_backoff")]
  pub error_backoff_ms: u64,
}

/// Metrics and monitoring configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
  /// Serve /live, /ready and /metrics.
  #[serde(default)]
  pub enabled: bool,
  /// Metrics server bind address.
  #[serde(default = "default_metrics_addr")]
  pub bind_address: String,
}

impl Default for BotConfig {
  fn default() -> Self {
    Self {
      name: default_name(),
      log_level: default_log_level(),
      json_logs: true,
      dry_run: false,
    }
  }
}

impl Default for ChainConfig {
  fn default() -> Self {
    Self {
      rpc_url: default_rpc_url(),
      amm_package_id: String::new(),
      deepbook_package_id: String::new(),
      trade_cap_id: String::new(),
      pool_id: String::new(),
      balance_manager_id: None,
      request_timeout_ms: default_request_timeout(),
      gas_budget: default_gas_budget(),
    }
  }
}

impl Default for StrategyConfig {
  fn default() -> Self {
    Self {
      spread_bps: default_spread_bps(),
      order_size: default_order_size(),
      max_skew_percent: default_max_skew(),
      order_expiry_ms: default_order_expiry(),
      order_type: OrderType::default(),
      self_matching: SelfMatchingOption::default(),
      strict_balance_decode: false,
      track_orders: false,
    }
  }
}

impl Default for SchedulerConfig {
  fn default() -> Self {
    Self {
      interval_ms: default_interval(),
      error_backoff_ms: default_error_backoff(),
    }
  }
}

impl Default for MetricsConfig {
  fn default() -> Self {
    Self {
      enabled: false,
      bind_address: default_metrics_addr(),
    }
  }
}

// Default value functions for serde

fn default_name() -> String {
  "vault-quoter".to_string()
}

fn default_log_level() -> String {
  "info".to_string()
}

fn default_true() -> bool {
  true
}

fn default_rpc_url() -> String {
  "https://fullnode.mainnet.sui.io:443".to_string()
}

fn default_request_timeout() -> u64 {
  30_000
}

fn default_gas_budget() -> u64 {
  50_000_000 // 0.05 SUI
}

fn default_spread_bps() -> u64 {
  1000
}

fn default_order_size() -> u64 {
  100
}

fn default_max_skew() -> u64 {
  20
}

fn default_order_expiry() -> u64 {
  300_000
}

fn default_interval() -> u64 {
  10_000
}

fn default_error_backoff() -> u64 {
  5_000
}

fn default_metrics_addr() -> String {
  "0.0.0.0:9090".to_string()
}
