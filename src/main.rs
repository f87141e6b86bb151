//! Vault Quoter - Entry Point
//!
//! Initializes configuration, logging, the Sui connection and the
//! quoting loop. Runs until SIGINT.
//!
//! Wiring sequence:
//! 1. Load .env, then config.toml + env overrides + validation
//! 2. Init tracing (JSON structured logging)
//! 3. Load the operator key from PRIVATE_KEY
//! 4. Connect to the Sui RPC node (fatal if unreachable)
//! 5. Create SuiGateway (implements ChainGateway port)
//! 6. Build reader, order builder and QuoteScheduler
//! 7. Optionally spawn the metrics/health server
//! 8. Spawn the scheduler loop
//! 9. Wait for SIGINT → cancel and exit without draining

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use vault_quoter::adapters::chain::{SuiGateway, SuiRpcClient, SuiSigner};
use vault_quoter::adapters::metrics::{HealthServer, HealthState, MetricsRegistry};
use vault_quoter::config::{self, AppConfig};
use vault_quoter::ports::chain_gateway::ChainGateway;
use vault_quoter::ports::clock::SystemClock;
use vault_quoter::ports::telemetry::{NoTelemetry, QuoteTelemetry};
use vault_quoter::usecases::{QuoteScheduler, SpreadOrderBuilder, VaultBalanceReader};

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. Load configuration ───────────────────────────────
    dotenv::dotenv().ok();
    let config_path =
        std::env::var("VAULT_QUOTER_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
    let config = config::loader::load_config(&config_path)
        .context("Failed to load configuration")?;

    // ── 2. Initialize structured logging ────────────────────
    init_tracing(&config);

    info!(
        name = %config.bot.name,
        version = env!("CARGO_PKG_VERSION"),
        dry_run = config.bot.dry_run,
        vaults = config.vaults.len(),
        "Starting vault quoter"
    );
    if config.bot.dry_run {
        warn!("Dry-run mode - transactions are simulated, nothing is committed");
    }

    // ── 3. Operator key ─────────────────────────────────────
    let signer = SuiSigner::from_env().context("Failed to load operator key")?;

    // ── 4. Sui RPC connection ───────────────────────────────
    let rpc = Arc::new(
        SuiRpcClient::connect(&config.chain)
            .await
            .context("Failed to connect to Sui RPC")?,
    );

    // ── 5. Chain gateway ────────────────────────────────────
    let gateway = Arc::new(SuiGateway::new(rpc, signer, &config.chain, config.bot.dry_run));
    info!(sender = %gateway.sender(), "Operator account loaded");

    // ── 6. Use cases ────────────────────────────────────────
    let shutdown = CancellationToken::new();
    let health = Arc::new(HealthState::default());

    let telemetry: Arc<dyn QuoteTelemetry> = if config.metrics.enabled {
        let metrics = Arc::new(MetricsRegistry::new().context("Failed to register metrics")?);
        spawn_health(&config, &health, &metrics, &gateway, &shutdown);
        metrics
    } else {
        Arc::new(NoTelemetry)
    };

    let mut scheduler = build_scheduler(&config, &gateway)?.with_telemetry(telemetry);

    // ── 7. Quoting loop ─────────────────────────────────────
    let loop_token = shutdown.child_token();
    let loop_health = Arc::clone(&health);
    tokio::spawn(async move {
        loop_health.set_scheduler_running(true);
        if let Err(e) = scheduler.run(loop_token).await {
            error!(error = %e, "Quote scheduler failed");
        }
        loop_health.set_scheduler_running(false);
    });

    info!("Market maker running - press ctrl-c to stop");

    // ── 8. Wait for SIGINT ──────────────────────────────────
    signal::ctrl_c().await.context("Failed to listen for ctrl-c")?;

    info!("Shutting down market maker");
    shutdown.cancel();

    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.bot.log_level));

    if config.bot.json_logs {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn build_scheduler(
    config: &AppConfig,
    gateway: &Arc<SuiGateway>,
) -> Result<QuoteScheduler<SuiGateway, SystemClock>> {
    let reader = VaultBalanceReader::new(Arc::clone(gateway), config.chain.amm_package_id.clone())
        .with_strict_decode(config.strategy.strict_balance_decode);

    let builder = SpreadOrderBuilder::new(
        Arc::clone(gateway),
        Arc::new(SystemClock),
        &config.chain,
        &config.strategy,
    );

    Ok(
        QuoteScheduler::new(config.vaults.clone(), reader, builder, &config.scheduler)?
            .with_order_tracking(config.strategy.track_orders),
    )
}

/// Serve /live, /ready and /metrics, and keep readiness in sync with
/// the ledger connection.
fn spawn_health(
    config: &AppConfig,
    health: &Arc<HealthState>,
    metrics: &Arc<MetricsRegistry>,
    gateway: &Arc<SuiGateway>,
    shutdown: &CancellationToken,
) {
    let server = HealthServer::new(
        Arc::clone(health),
        Arc::clone(metrics),
        config.metrics.bind_address.clone(),
    );
    let server_token = shutdown.child_token();
    tokio::spawn(async move {
        if let Err(e) = server.run(server_token).await {
            error!(error = %e, "Health server failed");
        }
    });

    let probe_health = Arc::clone(health);
    let probe_gateway = Arc::clone(gateway);
    let probe_token = shutdown.child_token();
    let period = Duration::from_millis(config.scheduler.interval_ms);
    tokio::spawn(async move {
        loop {
            probe_health.set_chain_healthy(probe_gateway.is_healthy().await);
            tokio::select! {
                biased;
                () = probe_token.cancelled() => break,
                () = tokio::time::sleep(period) => {}
            }
        }
    });
}
