//! Property-Based Tests - Order Request Invariants
//!
//! Uses `proptest` to verify that spread order requests carry the
//! configured strategy through unchanged across random inputs.

use std::sync::Arc;

use proptest::prelude::*;

use vault_quoter::adapters::chain::transaction::{format_address, parse_address};
use vault_quoter::config::{ChainConfig, StrategyConfig};
use vault_quoter::domain::transaction::{CallInput, TransactionPlan};
use vault_quoter::domain::vault::Vault;
use vault_quoter::ports::chain_gateway::{ChainGateway, InspectResult, SubmissionOutcome};
use vault_quoter::ports::clock::Clock;
use vault_quoter::usecases::SpreadOrderBuilder;

struct OfflineGateway;

#[async_trait::async_trait]
impl ChainGateway for OfflineGateway {
    async fn inspect(&self, _plan: &TransactionPlan) -> anyhow::Result<InspectResult> {
        anyhow::bail!("offline")
    }
    async fn submit(&self, _plan: &TransactionPlan) -> anyhow::Result<SubmissionOutcome> {
        anyhow::bail!("offline")
    }
    async fn is_healthy(&self) -> bool {
        false
    }
}

struct FixedClock;

impl Clock for FixedClock {
    fn now_ms(&self) -> u64 {
        0
    }
}

fn builder(strategy: &StrategyConfig) -> SpreadOrderBuilder<OfflineGateway, FixedClock> {
    let chain = ChainConfig {
        amm_package_id: "0xa11".to_string(),
        trade_cap_id: "0xcab".to_string(),
        pool_id: "0xb00".to_string(),
        ..ChainConfig::default()
    };
    SpreadOrderBuilder::new(Arc::new(OfflineGateway), Arc::new(FixedClock), &chain, strategy)
}

fn vault() -> Vault {
    Vault::new("0x7a", "0x2::sui::SUI", "0xdba3::usdc::USDC", "0xa11::lp::LP")
}

// ── Spread Order Request Properties ─────────────────────────

proptest! {
    /// Strategy values reach the request and the plan without clamping.
    #[test]
    fn strategy_values_are_carried_unchanged(
        spread_bps in 1u64..=u64::MAX,
        order_size in 1u64..=u64::MAX,
        max_skew_percent in 0u64..=100,
    ) {
        let strategy = StrategyConfig {
            spread_bps,
            order_size,
            max_skew_percent,
            ..StrategyConfig::default()
        };
        let b = builder(&strategy);
        let request = b.build(&vault(), 1_700_000_000_000).unwrap();

        prop_assert_eq!(request.spread_bps, spread_bps);
        prop_assert_eq!(request.order_size, order_size);
        prop_assert_eq!(request.max_skew_percent, max_skew_percent);

        let plan = b.plan(&request);
        let args = &plan.calls[1].arguments;
        prop_assert_eq!(&args[3], &CallInput::PureU64(spread_bps));
        prop_assert_eq!(&args[4], &CallInput::PureU64(order_size));
        prop_assert_eq!(&args[6], &CallInput::PureU64(max_skew_percent));
    }

    /// Expiry is exactly `now + order_expiry_ms` whenever it fits in u64.
    #[test]
    fn expiry_is_exact(
        now in 0u64..u64::MAX / 2,
        ttl in 1u64..u64::MAX / 2,
    ) {
        let strategy = StrategyConfig {
            order_expiry_ms: ttl,
            ..StrategyConfig::default()
        };
        let request = builder(&strategy).build(&vault(), now).unwrap();
        prop_assert_eq!(request.expire_at_ms, now + ttl);
        prop_assert!(request.expire_at_ms > now);
    }

    /// Expiry overflow is reported, never wrapped.
    #[test]
    fn expiry_overflow_is_rejected(now in (u64::MAX - 1_000)..=u64::MAX) {
        let strategy = StrategyConfig {
            order_expiry_ms: 300_000,
            ..StrategyConfig::default()
        };
        prop_assert!(builder(&strategy).build(&vault(), now).is_err());
    }
}

// ── Address Properties ──────────────────────────────────────

proptest! {
    /// Short and canonical hex forms name the same address.
    #[test]
    fn short_addresses_pad_to_canonical(bytes in proptest::array::uniform32(any::<u8>())) {
        let canonical = format_address(&bytes);
        let trimmed = canonical.trim_start_matches("0x").trim_start_matches('0');
        let short = format!("0x{}", if trimmed.is_empty() { "0" } else { trimmed });

        prop_assert_eq!(parse_address(&canonical).unwrap(), bytes);
        prop_assert_eq!(parse_address(&short).unwrap(), bytes);
    }
}
