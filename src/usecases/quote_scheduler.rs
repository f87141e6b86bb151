//! Quote Scheduler - Core Quoting Loop
//!
//! Visits the configured vaults round-robin, one at a time:
//! 1. Read the vault's balances (read-only call)
//! 2. Submit one spread order (proof + create in one transaction)
//! 3. Sleep `interval_ms`, then move to the next vault
//!
//! A failure at either stage is logged with the vault context and
//! followed by a fixed `error_backoff_ms` pause; the loop then moves on
//! to the next vault. Nothing is retried within the same visit and no
//! error ever leaves the loop. Vaults are never processed concurrently.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::config::SchedulerConfig;
use crate::domain::order::ActiveOrderRecord;
use crate::domain::vault::{BalanceSnapshot, ObjectId, OrderId, Vault};
use crate::ports::chain_gateway::ChainGateway;
use crate::ports::clock::Clock;
use crate::ports::order_hooks::{
  InertOrderCanceller, InertOrderObserver, OrderCanceller, OrderObserver,
};
use crate::ports::telemetry::{NoTelemetry, QuoteTelemetry};

use super::balance_reader::VaultBalanceReader;
use super::spread_order_builder::{SpreadOrderBuilder, SubmittedOrder};

/// Event emitted by the vault strategy when a spread order is placed.
pub const ORDER_CREATED_EVENT_SUFFIX: &str = "::strategy::OrderCreatedEvent";

/// Where the scheduler currently is in its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
  Idle,
  ForEachVault,
  ReadBalance,
  SubmitOrder,
  Sleep,
}

/// Stage at which a vault visit failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
  ReadBalance,
  SubmitOrder,
}

impl fmt::Display for FailureStage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::ReadBalance => write!(f, "read_balance"),
      Self::SubmitOrder => write!(f, "submit_order"),
    }
  }
}

/// Result of one vault visit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
  Submitted {
    snapshot: BalanceSnapshot,
    digest: String,
  },
  Failed {
    stage: FailureStage,
    error: String,
  },
}

/// What `step` did and how long the caller should pause afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
  pub vault_id: ObjectId,
  pub outcome: StepOutcome,
  pub delay: Duration,
}

impl StepReport {
  pub const fn is_success(&self) -> bool {
    matches!(self.outcome, StepOutcome::Submitted { .. })
  }
}

/// Round-robin quoting engine. Owns the cursor and the active-order map.
pub struct QuoteScheduler<G: ChainGateway, C: Clock> {
  vaults: Vec<Vault>,
  reader: VaultBalanceReader<G>,
  builder: SpreadOrderBuilder<G, C>,
  interval: Duration,
  error_backoff: Duration,
  /// Index of the next vault to visit.
  cursor: usize,
  state: SchedulerState,
  /// Live order pairs keyed by bid and ask order id.
  active_orders: HashMap<OrderId, ActiveOrderRecord>,
  track_orders: bool,
  canceller: Arc<dyn OrderCanceller>,
  observer: Arc<dyn OrderObserver>,
  telemetry: Arc<dyn QuoteTelemetry>,
}

impl<G: ChainGateway, C: Clock> QuoteScheduler<G, C> {
  /// Create a scheduler over `vaults`, visited in the given order.
  ///
  /// # Errors
  /// Fails if `vaults` is empty.
  pub fn new(
    vaults: Vec<Vault>,
    reader: VaultBalanceReader<G>,
    builder: SpreadOrderBuilder<G, C>,
    config: &SchedulerConfig,
  ) -> Result<Self> {
    anyhow::ensure!(!vaults.is_empty(), "Quote scheduler needs at least one vault");

    Ok(Self {
      vaults,
      reader,
      builder,
      interval: Duration::from_millis(config.interval_ms),
      error_backoff: Duration::from_millis(config.error_backoff_ms),
      cursor: 0,
      state: SchedulerState::Idle,
      active_orders: HashMap::new(),
      track_orders: false,
      canceller: Arc::new(InertOrderCanceller),
      observer: Arc::new(InertOrderObserver),
      telemetry: Arc::new(NoTelemetry),
    })
  }

  /// Decode `OrderCreatedEvent`s into the active-order map.
  #[must_use]
  pub fn with_order_tracking(mut self, enabled: bool) -> Self {
    self.track_orders = enabled;
    self
  }

  #[must_use]
  pub fn with_observer(mut self, observer: Arc<dyn OrderObserver>) -> Self {
    self.observer = observer;
    self
  }

  #[must_use]
  pub fn with_canceller(mut self, canceller: Arc<dyn OrderCanceller>) -> Self {
    self.canceller = canceller;
    self
  }

  #[must_use]
  pub fn with_telemetry(mut self, telemetry: Arc<dyn QuoteTelemetry>) -> Self {
    self.telemetry = telemetry;
    self
  }

  pub const fn state(&self) -> SchedulerState {
    self.state
  }

  /// Index of the vault the next `step` will visit.
  pub const fn cursor(&self) -> usize {
    self.cursor
  }

  pub fn vaults(&self) -> &[Vault] {
    &self.vaults
  }

  pub const fn active_orders(&self) -> &HashMap<OrderId, ActiveOrderRecord> {
    &self.active_orders
  }

  /// Run until `cancel` fires.
  ///
  /// The token is checked at every suspension point; an in-flight
  /// ledger call is dropped, not awaited.
  pub async fn run(&mut self, cancel: CancellationToken) -> Result<()> {
    info!(
      vaults = self.vaults.len(),
      interval_ms = self.interval.as_millis(),
      "Market maker started"
    );

    loop {
      let report = tokio::select! {
        biased;
        () = cancel.cancelled() => break,
        report = self.step() => report,
      };

      tokio::select! {
        biased;
        () = cancel.cancelled() => break,
        () = tokio::time::sleep(report.delay) => {}
      }
    }

    self.state = SchedulerState::Idle;
    info!("Quote scheduler stopped");
    Ok(())
  }

  /// Visit every vault once, in order, without sleeping in between.
  pub async fn run_pass(&mut self) -> Vec<StepReport> {
    let mut reports = Vec::with_capacity(self.vaults.len());
    for _ in 0..self.vaults.len() {
      reports.push(self.step().await);
    }
    reports
  }

  /// Visit the vault under the cursor and advance the cursor.
  ///
  /// Never fails: errors are logged and reported with the backoff delay.
  /// The caller is responsible for sleeping `report.delay`.
  #[instrument(skip(self), fields(cursor = self.cursor))]
  pub async fn step(&mut self) -> StepReport {
    self.state = SchedulerState::ForEachVault;
    let vault = self.vaults[self.cursor].clone();

    let outcome = self.visit(&vault).await;

    let delay = match &outcome {
      StepOutcome::Submitted { .. } => self.interval,
      StepOutcome::Failed { stage, error } => {
        error!(
          vault = %vault.label(),
          stage = %stage,
          error = %error,
          backoff_ms = self.error_backoff.as_millis(),
          "Error in market maker loop"
        );
        self.telemetry.record_failure(vault.label(), &stage.to_string());
        self.error_backoff
      }
    };

    self.cursor = (self.cursor + 1) % self.vaults.len();
    self.state = SchedulerState::Sleep;

    StepReport {
      vault_id: vault.id,
      outcome,
      delay,
    }
  }

  async fn visit(&mut self, vault: &Vault) -> StepOutcome {
    self.state = SchedulerState::ReadBalance;
    let snapshot = match self.reader.read_balances(vault).await {
      Ok(snapshot) => snapshot,
      Err(e) => {
        return StepOutcome::Failed {
          stage: FailureStage::ReadBalance,
          error: format!("{e:#}"),
        };
      }
    };

    info!(
      vault = %vault.label(),
      base = snapshot.base_balance,
      quote = snapshot.quote_balance,
      "Balances"
    );
    self.telemetry.record_balances(vault.label(), &snapshot);

    self.state = SchedulerState::SubmitOrder;
    let started = Instant::now();
    match self.builder.submit(vault).await {
      Ok(submitted) => {
        self.telemetry.record_submission(vault.label(), started.elapsed());
        info!(vault = %vault.label(), digest = %submitted.outcome.digest, "Transaction result");
        self.track(&submitted);
        StepOutcome::Submitted {
          snapshot,
          digest: submitted.outcome.digest,
        }
      }
      Err(e) => StepOutcome::Failed {
        stage: FailureStage::SubmitOrder,
        error: format!("{e:#}"),
      },
    }
  }

  /// Record order pairs announced by the submission's events.
  fn track(&mut self, submitted: &SubmittedOrder) {
    if !self.track_orders {
      return;
    }

    let now_ms = self.builder.now_ms();
    for event in &submitted.outcome.events {
      if !event.event_type.ends_with(ORDER_CREATED_EVENT_SUFFIX) {
        continue;
      }

      let Some(record) = ActiveOrderRecord::from_event_json(
        &submitted.request.vault_id,
        &submitted.outcome.digest,
        &event.parsed_json,
        now_ms,
      ) else {
        warn!(event_type = %event.event_type, "Unrecognised OrderCreatedEvent payload");
        continue;
      };

      debug!(
        bid = %record.bid_order_id,
        ask = %record.ask_order_id,
        mid = record.mid_price,
        "Tracking spread order pair"
      );
      self.observer.on_order_created(&record);
      self.active_orders.insert(record.bid_order_id.clone(), record.clone());
      self.active_orders.insert(record.ask_order_id.clone(), record);
    }
  }

  /// Cancel a resting order through the configured capability.
  ///
  /// Not invoked by the loop itself.
  pub async fn cancel_order(&mut self, order_id: &OrderId) -> Result<()> {
    self.canceller.cancel_order(order_id).await?;
    // Only this leg is dropped; the sibling stays tracked under its own id.
    if self.active_orders.remove(order_id).is_some() {
      debug!(order_id = %order_id, "Order removed from active map");
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::VecDeque;
  use std::sync::Mutex;

  use serde_json::json;

  use crate::config::{ChainConfig, StrategyConfig};
  use crate::domain::transaction::TransactionPlan;
  use crate::ports::chain_gateway::{
    ChainEvent, CommandResult, InspectResult, ReturnValue, SubmissionOutcome,
  };

  /// Gateway replaying canned answers and recording call order.
  #[derive(Default)]
  struct ScriptedGateway {
    inspects: Mutex<VecDeque<Result<InspectResult>>>,
    submits: Mutex<VecDeque<Result<SubmissionOutcome>>>,
    log: Mutex<Vec<String>>,
  }

  impl ScriptedGateway {
    fn push_inspect(&self, r: Result<InspectResult>) {
      self.inspects.lock().unwrap().push_back(r);
    }
    fn push_submit(&self, r: Result<SubmissionOutcome>) {
      self.submits.lock().unwrap().push_back(r);
    }
    fn log(&self) -> Vec<String> {
      self.log.lock().unwrap().clone()
    }
  }

  #[async_trait::async_trait]
  impl ChainGateway for ScriptedGateway {
    async fn inspect(&self, plan: &TransactionPlan) -> Result<InspectResult> {
      let vault = plan.calls[0].arguments[0].clone();
      self.log.lock().unwrap().push(format!("inspect {vault:?}"));
      self.inspects.lock().unwrap().pop_front().unwrap_or_else(|| Ok(InspectResult::default()))
    }
    async fn submit(&self, plan: &TransactionPlan) -> Result<SubmissionOutcome> {
      let vault = plan.calls[1].arguments[0].clone();
      self.log.lock().unwrap().push(format!("submit {vault:?}"));
      self.submits.lock().unwrap().pop_front().unwrap_or_else(|| Ok(outcome("D", vec![])))
    }
    async fn is_healthy(&self) -> bool {
      true
    }
  }

  struct FixedClock(u64);

  impl Clock for FixedClock {
    fn now_ms(&self) -> u64 {
      self.0
    }
  }

  fn outcome(digest: &str, events: Vec<ChainEvent>) -> SubmissionOutcome {
    SubmissionOutcome {
      digest: digest.to_string(),
      events,
      dry_run: false,
    }
  }

  fn balances(base: u64, quote: u64) -> InspectResult {
    InspectResult {
      results: vec![CommandResult {
        return_values: vec![
          ReturnValue::new(base.to_le_bytes().to_vec(), "u64"),
          ReturnValue::new(quote.to_le_bytes().to_vec(), "u64"),
        ],
      }],
    }
  }

  fn vault(id: &str) -> Vault {
    Vault::new(id, "0x1::a::A", "0x2::sui::SUI", "0x3::lp::LP")
  }

  fn scheduler(
    gateway: &Arc<ScriptedGateway>,
    vaults: Vec<Vault>,
  ) -> QuoteScheduler<ScriptedGateway, FixedClock> {
    let chain = ChainConfig {
      amm_package_id: "0xa11".to_string(),
      trade_cap_id: "0xcab".to_string(),
      pool_id: "0xb00".to_string(),
      ..ChainConfig::default()
    };
    let reader = VaultBalanceReader::new(gateway.clone(), "0xa11");
    let builder = SpreadOrderBuilder::new(
      gateway.clone(),
      Arc::new(FixedClock(1_000)),
      &chain,
      &StrategyConfig::default(),
    );
    QuoteScheduler::new(vaults, reader, builder, &SchedulerConfig::default()).unwrap()
  }

  #[test]
  fn test_empty_vault_list_is_rejected() {
    let gateway = Arc::new(ScriptedGateway::default());
    let chain = ChainConfig::default();
    let reader = VaultBalanceReader::new(gateway.clone(), "0xa11");
    let builder = SpreadOrderBuilder::new(
      gateway,
      Arc::new(FixedClock(0)),
      &chain,
      &StrategyConfig::default(),
    );
    assert!(QuoteScheduler::new(vec![], reader, builder, &SchedulerConfig::default()).is_err());
  }

  #[tokio::test]
  async fn test_successful_step_uses_interval() {
    let gateway = Arc::new(ScriptedGateway::default());
    gateway.push_inspect(Ok(balances(500, 1_000)));
    gateway.push_submit(Ok(outcome("Dig1", vec![])));

    let mut s = scheduler(&gateway, vec![vault("0x7a")]);
    let report = s.step().await;

    assert_eq!(
      report.outcome,
      StepOutcome::Submitted {
        snapshot: BalanceSnapshot::new(500, 1_000),
        digest: "Dig1".to_string(),
      }
    );
    assert_eq!(report.delay, Duration::from_millis(10_000));
    assert_eq!(s.state(), SchedulerState::Sleep);
    assert_eq!(s.cursor(), 0);
  }

  #[tokio::test]
  async fn test_read_failure_skips_submit_and_backs_off() {
    let gateway = Arc::new(ScriptedGateway::default());
    gateway.push_inspect(Err(anyhow::anyhow!("connection refused")));

    let mut s = scheduler(&gateway, vec![vault("0x7a"), vault("0x7b")]);
    let report = s.step().await;

    assert!(!report.is_success());
    assert!(matches!(
      report.outcome,
      StepOutcome::Failed { stage: FailureStage::ReadBalance, .. }
    ));
    assert_eq!(report.delay, Duration::from_millis(5_000));
    assert_eq!(gateway.log(), vec![r#"inspect Object { id: "0x7a", mutable: true }"#]);
    assert_eq!(s.cursor(), 1);
  }

  #[tokio::test]
  async fn test_pass_visits_vaults_in_order() {
    let gateway = Arc::new(ScriptedGateway::default());
    gateway.push_inspect(Ok(balances(1, 1)));
    gateway.push_submit(Err(anyhow::anyhow!("MoveAbort in create_spread_order")));
    gateway.push_inspect(Ok(balances(2, 2)));
    gateway.push_submit(Ok(outcome("Dig2", vec![])));

    let mut s = scheduler(&gateway, vec![vault("0x7a"), vault("0x7b")]);
    let reports = s.run_pass().await;

    assert!(matches!(
      reports[0].outcome,
      StepOutcome::Failed { stage: FailureStage::SubmitOrder, .. }
    ));
    assert!(reports[1].is_success());
    assert_eq!(reports[1].vault_id, "0x7b");
    assert_eq!(
      gateway.log(),
      vec![
        r#"inspect Object { id: "0x7a", mutable: true }"#,
        r#"submit Object { id: "0x7a", mutable: true }"#,
        r#"inspect Object { id: "0x7b", mutable: true }"#,
        r#"submit Object { id: "0x7b", mutable: true }"#,
      ]
    );
    assert_eq!(s.cursor(), 0);
  }

  fn created_event() -> ChainEvent {
    ChainEvent {
      event_type: "0xa11::strategy::OrderCreatedEvent".to_string(),
      parsed_json: json!({
        "bid_order_id": "11", "ask_order_id": "12",
        "mid_price": "1000", "bid_price": "950", "ask_price": "1050",
      }),
    }
  }

  #[tokio::test]
  async fn test_order_tracking_is_opt_in() {
    let gateway = Arc::new(ScriptedGateway::default());
    gateway.push_submit(Ok(outcome("Dig", vec![created_event()])));
    let mut s = scheduler(&gateway, vec![vault("0x7a")]);
    s.step().await;
    assert!(s.active_orders().is_empty());
  }

  #[tokio::test]
  async fn test_tracked_orders_keyed_by_both_legs() {
    let gateway = Arc::new(ScriptedGateway::default());
    gateway.push_submit(Ok(outcome("Dig", vec![created_event()])));
    let mut s = scheduler(&gateway, vec![vault("0x7a")]).with_order_tracking(true);
    s.step().await;

    let orders = s.active_orders();
    assert_eq!(orders.len(), 2);
    assert_eq!(orders["11"].ask_order_id, "12");
    assert_eq!(orders["12"].timestamp_ms, 1_000);

    s.cancel_order(&"11".to_string()).await.unwrap();
    assert_eq!(s.active_orders().len(), 1);
    assert!(s.active_orders().contains_key("12"));
  }
}
