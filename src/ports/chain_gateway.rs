//! Chain Gateway Port - Ledger Read/Write Interface
//!
//! Defines the trait the quoting loop uses to reach the ledger:
//! read-only simulated calls for observing vault state, and signed
//! submission of programmable transactions. Key management, object
//! resolution and wire encoding live entirely behind this trait.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::transaction::TransactionPlan;

/// One BCS-encoded value returned by a simulated Move call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnValue {
  /// Raw BCS bytes.
  pub bytes: Vec<u8>,
  /// Move type of the value as rendered by the node (e.g. `u64`).
  pub type_tag: String,
}

impl ReturnValue {
  pub fn new(bytes: Vec<u8>, type_tag: impl Into<String>) -> Self {
    Self {
      bytes,
      type_tag: type_tag.into(),
    }
  }
}

/// Return values of a single command in a simulated transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandResult {
  pub return_values: Vec<ReturnValue>,
}

/// Result of a read-only simulated transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InspectResult {
  /// Per-command results, in command order. Empty if the node
  /// returned none.
  pub results: Vec<CommandResult>,
}

/// An event emitted by a submitted transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainEvent {
  /// Fully qualified event type (`package::module::Struct`).
  pub event_type: String,
  /// Event payload as JSON.
  pub parsed_json: Value,
}

/// Outcome of a submitted transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionOutcome {
  /// Transaction digest.
  pub digest: String,
  /// Events emitted by the transaction.
  pub events: Vec<ChainEvent>,
  /// Whether this was a dry run (nothing committed).
  pub dry_run: bool,
}

/// Trait for ledger access.
///
/// Implementations must surface transport failures and rejected
/// transactions as errors; callers decide how to retry.
#[async_trait]
pub trait ChainGateway: Send + Sync + 'static {
  /// Execute `plan` without committing it and return per-command results.
  async fn inspect(&self, plan: &TransactionPlan) -> anyhow::Result<InspectResult>;

  /// Sign and submit `plan` as one atomic transaction.
  ///
  /// # Errors
  /// Returns error if signing fails, the node rejects the transaction,
  /// or the transaction executes with a failure status.
  async fn submit(&self, plan: &TransactionPlan) -> anyhow::Result<SubmissionOutcome>;

  /// Check if the ledger connection is healthy.
  async fn is_healthy(&self) -> bool;
}
