//! Configuration Loader - File Loading, Env Overrides and Validation
//!
//! Handles loading `config.toml`, applying environment overrides,
//! validating all parameters, and providing clear error messages for
//! misconfiguration. Any failure here is fatal at startup.

use std::collections::HashSet;
use std::fmt::Display;
use std::path::Path;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use tracing::info;

use super::AppConfig;
use crate::domain::move_type::{parse_address, parse_type_tag, SuiAddress};

/// Load, override and validate configuration.
///
/// # Arguments
/// * `path` - Path to the config.toml file (may be absent)
///
/// # Errors
/// Returns detailed error if:
/// - The file exists but can't be read or parsed
/// - An environment override has an invalid value
/// - Validation rules are violated
pub fn load_config(path: &str) -> Result<AppConfig> {
  let path = Path::new(path);

  let mut config = if path.exists() {
    let content = std::fs::read_to_string(path)
      .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config(&content)?
  } else {
    info!(path = %path.display(), "No config file, using defaults and environment");
    AppConfig::default()
  };

  apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
  validate_config(&config)?;

  info!(
    vaults = config.vaults.len(),
    spread_bps = config.strategy.spread_bps,
    order_size = config.strategy.order_size,
    interval_ms = config.scheduler.interval_ms,
    "Configuration loaded successfully"
  );

  Ok(config)
}

/// Parse TOML content into an `AppConfig`.
pub fn parse_config(content: &str) -> Result<AppConfig> {
  toml::from_str(content).with_context(|| "Failed to parse config.toml")
}

/// Apply environment overrides using `lookup` to resolve variables.
///
/// Variable names match the deployment `.env` file.
pub fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F) -> Result<()>
where
  F: Fn(&str) -> Option<String>,
{
  let chain = &mut config.chain;
  override_string(&lookup, "RPC_URL", &mut chain.rpc_url);
  override_string(&lookup, "AMM_PACKAGE_ID", &mut chain.amm_package_id);
  override_string(&lookup, "DEEPBOOK_PACKAGE_ID", &mut chain.deepbook_package_id);
  override_string(&lookup, "TRADE_CAP_ID", &mut chain.trade_cap_id);
  override_string(&lookup, "POOL_ID", &mut chain.pool_id);
  if let Some(id) = lookup("BALANCE_MANAGER_ID").filter(|v| !v.is_empty()) {
    chain.balance_manager_id = Some(id);
  }
  override_parsed(&lookup, "GAS_BUDGET", &mut chain.gas_budget)?;
  override_parsed(&lookup, "REQUEST_TIMEOUT_MS", &mut chain.request_timeout_ms)?;

  let strategy = &mut config.strategy;
  override_parsed(&lookup, "SPREAD_BPS", &mut strategy.spread_bps)?;
  override_parsed(&lookup, "ORDER_SIZE", &mut strategy.order_size)?;
  override_parsed(&lookup, "MAX_SKEW_PERCENT", &mut strategy.max_skew_percent)?;
  override_parsed(&lookup, "ORDER_EXPIRY_MS", &mut strategy.order_expiry_ms)?;

  override_parsed(&lookup, "INTERVAL_MS", &mut config.scheduler.interval_ms)?;
  override_parsed(&lookup, "ERROR_BACKOFF_MS", &mut config.scheduler.error_backoff_ms)?;

  override_string(&lookup, "LOG_LEVEL", &mut config.bot.log_level);
  override_parsed(&lookup, "DRY_RUN", &mut config.bot.dry_run)?;

  Ok(())
}

fn override_string<F>(lookup: &F, key: &str, target: &mut String)
where
  F: Fn(&str) -> Option<String>,
{
  if let Some(value) = lookup(key).filter(|v| !v.is_empty()) {
    *target = value;
  }
}

fn override_parsed<F, T>(lookup: &F, key: &str, target: &mut T) -> Result<()>
where
  F: Fn(&str) -> Option<String>,
  T: FromStr,
  T::Err: Display,
{
  if let Some(raw) = lookup(key).filter(|v| !v.is_empty()) {
    *target = raw
      .trim()
      .parse()
      .map_err(|e| anyhow!("Invalid value for {key} ({raw:?}): {e}"))?;
  }
  Ok(())
}

/// Validate all configuration parameters.
///
/// Checks for:
/// - Required object ids present and well-formed
/// - Positive sizes, spreads and intervals
/// - Skew within 0..=100
/// - At least one vault, unique ids, parseable and distinct type tags
pub fn validate_config(config: &AppConfig) -> Result<()> {
  // Chain validation
  anyhow::ensure!(!config.chain.rpc_url.is_empty(), "RPC_URL must not be empty");

  for (name, id) in [
    ("AMM_PACKAGE_ID", &config.chain.amm_package_id),
    ("TRADE_CAP_ID", &config.chain.trade_cap_id),
  ] {
    anyhow::ensure!(!id.is_empty(), "{name} is required");
    object_id(name, id)?;
  }

  if !config.chain.deepbook_package_id.is_empty() {
    object_id("DEEPBOOK_PACKAGE_ID", &config.chain.deepbook_package_id)?;
  }
  if let Some(id) = &config.chain.balance_manager_id {
    object_id("BALANCE_MANAGER_ID", id)?;
  }
  anyhow::ensure!(config.chain.gas_budget > 0, "gas_budget must be positive");

  // Strategy validation
  anyhow::ensure!(
    config.strategy.spread_bps > 0,
    "spread_bps must be positive, got {}",
    config.strategy.spread_bps
  );
  anyhow::ensure!(
    config.strategy.order_size > 0,
    "order_size must be positive, got {}",
    config.strategy.order_size
  );
  anyhow::ensure!(
    config.strategy.max_skew_percent <= 100,
    "max_skew_percent must be in [0, 100], got {}",
    config.strategy.max_skew_percent
  );
  anyhow::ensure!(
    config.strategy.order_expiry_ms > 0,
    "order_expiry_ms must be positive"
  );

  // Scheduler validation
  anyhow::ensure!(config.scheduler.interval_ms > 0, "interval_ms must be positive");

  // Vault validation
  anyhow::ensure!(!config.vaults.is_empty(), "At least one vault must be configured");

  let mut seen: HashSet<SuiAddress> = HashSet::new();
  for (i, vault) in config.vaults.iter().enumerate() {
    let id = parse_address(&vault.id)
      .with_context(|| format!("Vault {i} has an invalid object id: {:?}", vault.id))?;
    // 0x7a and 0x007a name the same object
    anyhow::ensure!(seen.insert(id), "Vault {} is configured twice", vault.id);

    for (field, tag) in [
      ("base_asset_type", &vault.base_asset_type),
      ("quote_asset_type", &vault.quote_asset_type),
      ("lp_token_type", &vault.lp_token_type),
    ] {
      parse_type_tag(tag)
        .with_context(|| format!("Vault {} has an invalid {field}: {tag:?}", vault.label()))?;
    }
    anyhow::ensure!(
      vault.has_distinct_types(),
      "Vault {} must have distinct base, quote and LP types",
      vault.label()
    );

    let pool = vault.pool_id.as_deref().unwrap_or(&config.chain.pool_id);
    parse_address(pool).with_context(|| {
      format!(
        "Vault {} has no valid pool id (set POOL_ID or vaults.pool_id)",
        vault.label()
      )
    })?;
  }

  Ok(())
}

fn object_id(name: &str, id: &str) -> Result<SuiAddress> {
  parse_address(id).with_context(|| format!("{name} is not a valid object id: {id}"))
}
