//! Telemetry Port - Quote Loop Observability
//!
//! Receives per-visit measurements from the scheduler. Every method has
//! a no-op default so implementors only record what they export.

use std::time::Duration;

use crate::domain::vault::BalanceSnapshot;

pub trait QuoteTelemetry: Send + Sync + 'static {
  /// Balances sampled for a vault.
  fn record_balances(&self, _vault: &str, _snapshot: &BalanceSnapshot) {}

  /// A spread order was accepted by the ledger.
  fn record_submission(&self, _vault: &str, _latency: Duration) {}

  /// A vault visit failed at `stage`.
  fn record_failure(&self, _vault: &str, _stage: &str) {}
}

/// Telemetry sink that drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoTelemetry;

impl QuoteTelemetry for NoTelemetry {}
