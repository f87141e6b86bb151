//! Prometheus Metrics Registry - Quoting Observability
//!
//! Registers the quoter's Prometheus metrics and implements the
//! `QuoteTelemetry` port so the scheduler can feed them directly.
//! Covers vault balances, submission latency, order counts and
//! failures per stage.

use std::time::Duration;

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGaugeVec, Opts, Registry,
    TextEncoder,
};

use crate::domain::vault::BalanceSnapshot;
use crate::ports::telemetry::QuoteTelemetry;

/// Centralized Prometheus metrics for the quoter.
///
/// All metrics follow the naming convention `vault_quoter_*` and carry
/// a `vault` label.
pub struct MetricsRegistry {
    registry: Registry,
    /// Last sampled vault balances, by side (`base` / `quote`).
    pub vault_balance: IntGaugeVec,
    /// Spread order submission latency (milliseconds).
    pub submission_latency_ms: HistogramVec,
    /// Spread orders accepted by the ledger.
    pub orders_submitted: IntCounterVec,
    /// Failed vault visits, by stage.
    pub visit_failures: IntCounterVec,
}

impl MetricsRegistry {
    /// Create and register all Prometheus metrics.
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let vault_balance = IntGaugeVec::new(
            Opts::new("vault_quoter_vault_balance", "Last sampled vault balance in base units"),
            &["vault", "side"],
        )?;

        let submission_latency_ms = HistogramVec::new(
            HistogramOpts::new(
                "vault_quoter_submission_latency_ms",
                "Spread order submission latency in milliseconds",
            )
            .buckets(vec![100.0, 250.0, 500.0, 1000.0, 2000.0, 5000.0, 10000.0]),
            &["vault"],
        )?;

        let orders_submitted = IntCounterVec::new(
            Opts::new("vault_quoter_orders_submitted_total", "Spread orders accepted"),
            &["vault"],
        )?;

        let visit_failures = IntCounterVec::new(
            Opts::new("vault_quoter_visit_failures_total", "Failed vault visits"),
            &["vault", "stage"],
        )?;

        registry.register(Box::new(vault_balance.clone()))?;
        registry.register(Box::new(submission_latency_ms.clone()))?;
        registry.register(Box::new(orders_submitted.clone()))?;
        registry.register(Box::new(visit_failures.clone()))?;

        Ok(Self {
            registry,
            vault_balance,
            submission_latency_ms,
            orders_submitted,
            visit_failures,
        })
    }

    /// Render all metrics in the Prometheus text format.
    pub fn gather_text(&self) -> anyhow::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

impl QuoteTelemetry for MetricsRegistry {
    fn record_balances(&self, vault: &str, snapshot: &BalanceSnapshot) {
        // Gauges are i64; saturate rather than wrap on huge balances.
        let clamp = |v: u64| i64::try_from(v).unwrap_or(i64::MAX);
        self.vault_balance
            .with_label_values(&[vault, "base"])
            .set(clamp(snapshot.base_balance));
        self.vault_balance
            .with_label_values(&[vault, "quote"])
            .set(clamp(snapshot.quote_balance));
    }

    fn record_submission(&self, vault: &str, latency: Duration) {
        self.orders_submitted.with_label_values(&[vault]).inc();
        self.submission_latency_ms
            .with_label_values(&[vault])
            .observe(latency.as_secs_f64() * 1000.0);
    }

    fn record_failure(&self, vault: &str, stage: &str) {
        self.visit_failures.with_label_values(&[vault, stage]).inc();
    }
}
