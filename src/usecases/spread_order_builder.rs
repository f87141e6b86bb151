//! Spread Order Builder - Proof + Order Transaction Assembly
//!
//! Builds one spread order request per call and submits it as a single
//! programmable transaction:
//! 1. `mm_vault::generate_trade_proof(trade_cap, vault)`
//! 2. `mm_vault::create_spread_order(vault, proof, pool, ..., clock)`
//!
//! The proof is consumed inside the same transaction that creates the
//! order, so it can never be replayed. Expiry is computed from the
//! clock at submission time.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, instrument};

use crate::config::{ChainConfig, StrategyConfig};
use crate::domain::order::SpreadOrderRequest;
use crate::domain::transaction::{CallInput, MoveCall, TransactionPlan, CLOCK_OBJECT_ID};
use crate::domain::vault::{ObjectId, Vault};
use crate::ports::chain_gateway::{ChainGateway, SubmissionOutcome};
use crate::ports::clock::Clock;

use super::balance_reader::VAULT_MODULE;

pub const GENERATE_TRADE_PROOF: &str = "generate_trade_proof";
pub const CREATE_SPREAD_ORDER: &str = "create_spread_order";

/// A request together with the ledger's answer to it.
#[derive(Debug, Clone)]
pub struct SubmittedOrder {
  pub request: SpreadOrderRequest,
  pub outcome: SubmissionOutcome,
}

/// Builds and submits spread orders for configured vaults.
pub struct SpreadOrderBuilder<G: ChainGateway, C: Clock> {
  gateway: Arc<G>,
  clock: Arc<C>,
  amm_package_id: ObjectId,
  trade_cap_id: ObjectId,
  /// Pool used when the vault has no override.
  default_pool_id: ObjectId,
  strategy: StrategyConfig,
}

impl<G: ChainGateway, C: Clock> SpreadOrderBuilder<G, C> {
  pub fn new(
    gateway: Arc<G>,
    clock: Arc<C>,
    chain: &ChainConfig,
    strategy: &StrategyConfig,
  ) -> Self {
    Self {
      gateway,
      clock,
      amm_package_id: chain.amm_package_id.clone(),
      trade_cap_id: chain.trade_cap_id.clone(),
      default_pool_id: chain.pool_id.clone(),
      strategy: strategy.clone(),
    }
  }

  /// Current time according to the builder's clock.
  pub fn now_ms(&self) -> u64 {
    self.clock.now_ms()
  }

  /// Build the request for `vault` as of `now_ms`.
  ///
  /// Strategy values are carried over unchanged; no clamping.
  ///
  /// # Errors
  /// Fails if the expiry would overflow or not lie after `now_ms`.
  pub fn build(&self, vault: &Vault, now_ms: u64) -> Result<SpreadOrderRequest> {
    let expire_at_ms = now_ms
      .checked_add(self.strategy.order_expiry_ms)
      .context("Order expiry overflows u64")?;
    anyhow::ensure!(
      expire_at_ms > now_ms,
      "Order expiry must lie in the future (order_expiry_ms = 0)"
    );

    Ok(SpreadOrderRequest {
      vault_id: vault.id.clone(),
      base_asset_type: vault.base_asset_type.clone(),
      quote_asset_type: vault.quote_asset_type.clone(),
      lp_token_type: vault.lp_token_type.clone(),
      pool_id: vault
        .pool_id
        .clone()
        .unwrap_or_else(|| self.default_pool_id.clone()),
      spread_bps: self.strategy.spread_bps,
      order_size: self.strategy.order_size,
      max_skew_percent: self.strategy.max_skew_percent,
      expire_at_ms,
      self_matching: self.strategy.self_matching,
      order_type: self.strategy.order_type,
    })
  }

  /// Assemble the two-command transaction for `request`.
  pub fn plan(&self, request: &SpreadOrderRequest) -> TransactionPlan {
    let mut plan = TransactionPlan::default();

    let proof = plan.push(MoveCall {
      package: self.amm_package_id.clone(),
      module: VAULT_MODULE.to_string(),
      function: GENERATE_TRADE_PROOF.to_string(),
      type_arguments: request.type_arguments(),
      arguments: vec![
        CallInput::object(self.trade_cap_id.clone()),
        CallInput::object(request.vault_id.clone()),
      ],
    });

    plan.push(MoveCall {
      package: self.amm_package_id.clone(),
      module: VAULT_MODULE.to_string(),
      function: CREATE_SPREAD_ORDER.to_string(),
      type_arguments: request.type_arguments(),
      arguments: vec![
        CallInput::object(request.vault_id.clone()),
        proof,
        CallInput::object(request.pool_id.clone()),
        CallInput::PureU64(request.spread_bps),
        CallInput::PureU64(request.order_size),
        CallInput::PureU8(request.order_type.as_u8()),
        CallInput::PureU64(request.max_skew_percent),
        CallInput::PureU8(request.self_matching.as_u8()),
        CallInput::PureU64(request.expire_at_ms),
        CallInput::immutable(CLOCK_OBJECT_ID),
      ],
    });

    plan
  }

  /// Build and submit one spread order for `vault`.
  ///
  /// # Errors
  /// Propagates proof, signing and submission failures unchanged.
  #[instrument(skip(self, vault), fields(vault = %vault.label()))]
  pub async fn submit(&self, vault: &Vault) -> Result<SubmittedOrder> {
    let request = self.build(vault, self.clock.now_ms())?;
    let plan = self.plan(&request);

    let outcome = self.gateway.submit(&plan).await?;

    info!(
      digest = %outcome.digest,
      spread_bps = request.spread_bps,
      order_size = request.order_size,
      expire_at_ms = request.expire_at_ms,
      dry_run = outcome.dry_run,
      "Spread order submitted"
    );

    Ok(SubmittedOrder { request, outcome })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::order::{OrderType, SelfMatchingOption};
  use crate::ports::chain_gateway::InspectResult;

  struct NoGateway;

  #[async_trait::async_trait]
  impl ChainGateway for NoGateway {
    async fn inspect(&self, _plan: &TransactionPlan) -> Result<InspectResult> {
      anyhow::bail!("unused")
    }
    async fn submit(&self, _plan: &TransactionPlan) -> Result<SubmissionOutcome> {
      anyhow::bail!("unused")
    }
    async fn is_healthy(&self) -> bool {
      false
    }
  }

  struct FixedClock(u64);

  impl Clock for FixedClock {
    fn now_ms(&self) -> u64 {
      self.0
    }
  }

  fn builder(strategy: StrategyConfig) -> SpreadOrderBuilder<NoGateway, FixedClock> {
    let chain = ChainConfig {
      amm_package_id: "0xa11".to_string(),
      trade_cap_id: "0xcab".to_string(),
      pool_id: "0xb00".to_string(),
      ..ChainConfig::default()
    };
    SpreadOrderBuilder::new(Arc::new(NoGateway), Arc::new(FixedClock(0)), &chain, &strategy)
  }

  fn vault() -> Vault {
    Vault::new("0x7a", "0x1::a::A", "0x2::sui::SUI", "0x3::lp::LP")
  }

  #[test]
  fn test_build_carries_strategy_values() {
    let strategy = StrategyConfig {
      spread_bps: 10_000,
      order_size: 10_000_000,
      max_skew_percent: 10,
      order_type: OrderType::PostOnly,
      self_matching: SelfMatchingOption::CancelMaker,
      ..StrategyConfig::default()
    };
    let request = builder(strategy).build(&vault(), 1_000).unwrap();
    assert_eq!(request.spread_bps, 10_000);
    assert_eq!(request.order_size, 10_000_000);
    assert_eq!(request.max_skew_percent, 10);
    assert_eq!(request.order_type, OrderType::PostOnly);
    assert_eq!(request.self_matching, SelfMatchingOption::CancelMaker);
    assert_eq!(request.expire_at_ms, 301_000);
    assert_eq!(request.pool_id, "0xb00");
  }

  #[test]
  fn test_vault_pool_override() {
    let mut v = vault();
    v.pool_id = Some("0xfee".to_string());
    let request = builder(StrategyConfig::default()).build(&v, 0).unwrap();
    assert_eq!(request.pool_id, "0xfee");
  }

  #[test]
  fn test_expiry_overflow_is_an_error() {
    let b = builder(StrategyConfig::default());
    assert!(b.build(&vault(), u64::MAX - 10).is_err());

    let zero_ttl = builder(StrategyConfig {
      order_expiry_ms: 0,
      ..StrategyConfig::default()
    });
    assert!(zero_ttl.build(&vault(), 5).is_err());
  }

  #[test]
  fn test_plan_composes_proof_inside_transaction() {
    let b = builder(StrategyConfig::default());
    let request = b.build(&vault(), 42).unwrap();
    let plan = b.plan(&request);

    assert_eq!(plan.calls.len(), 2);
    assert_eq!(plan.calls[0].function, GENERATE_TRADE_PROOF);
    assert_eq!(
      plan.calls[0].arguments,
      vec![CallInput::object("0xcab"), CallInput::object("0x7a")]
    );

    let create = &plan.calls[1];
    assert_eq!(create.function, CREATE_SPREAD_ORDER);
    assert_eq!(create.type_arguments, vault().type_arguments());
    assert_eq!(create.arguments[1], CallInput::Result(0));
    assert_eq!(create.arguments[3], CallInput::PureU64(1000));
    assert_eq!(create.arguments[4], CallInput::PureU64(100));
    assert_eq!(create.arguments[5], CallInput::PureU8(0));
    assert_eq!(create.arguments[6], CallInput::PureU64(20));
    assert_eq!(create.arguments[7], CallInput::PureU8(0));
    assert_eq!(create.arguments[8], CallInput::PureU64(300_042));
    assert_eq!(create.arguments[9], CallInput::immutable("0x6"));
  }
}
