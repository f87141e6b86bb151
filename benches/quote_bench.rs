//! Quote Path Benchmarks - Request Build and Transaction Encoding
//!
//! Benchmarks the per-visit CPU work between the balance read and the
//! network submission: request build, plan assembly, type-tag parsing
//! and BCS encoding of the signed transaction data.
//!
//! Run with: cargo bench --bench quote_bench

use std::collections::HashMap;
use std::hint::black_box;
use std::sync::Arc;

use criterion::{criterion_group, criterion_main, Criterion};

use vault_quoter::adapters::chain::signer::SuiSigner;
use vault_quoter::adapters::chain::transaction::{
    lower_plan, parse_type_tag, plan_objects, ObjectArg, ObjectDigest, TransactionData,
};
use vault_quoter::config::{ChainConfig, StrategyConfig};
use vault_quoter::domain::transaction::TransactionPlan;
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
        1_700_000_000_000
    }
}

fn builder() -> SpreadOrderBuilder<OfflineGateway, FixedClock> {
    let chain = ChainConfig {
        amm_package_id: "0xa11".to_string(),
        trade_cap_id: "0xcab".to_string(),
        pool_id: "0xb00".to_string(),
        ..ChainConfig::default()
    };
    SpreadOrderBuilder::new(
        Arc::new(OfflineGateway),
        Arc::new(FixedClock),
        &chain,
        &StrategyConfig::default(),
    )
}

fn vault() -> Vault {
    Vault::new(
        "0x7a",
        "0x2::sui::SUI",
        "0xdba34672e30cb065b1f93e3ab55318768fd6fef66c15942c9f7cb846e2f900e7::usdc::USDC",
        "0xa11::lp::LP<0x2::sui::SUI, 0xdba34672e30cb065b1f93e3ab55318768fd6fef66c15942c9f7cb846e2f900e7::usdc::USDC>",
    )
}

/// Benchmark request build + two-command plan assembly.
fn bench_build_plan(c: &mut Criterion) {
    let b = builder();
    let v = vault();

    c.bench_function("spread_order_build_plan", |bench| {
        bench.iter(|| {
            let request = b.build(black_box(&v), black_box(1_700_000_000_000)).unwrap();
            b.plan(&request)
        });
    });
}

/// Benchmark parsing a nested Move type tag.
fn bench_type_tag(c: &mut Criterion) {
    let lp = vault().lp_token_type;

    c.bench_function("parse_type_tag_nested", |bench| {
        bench.iter(|| parse_type_tag(black_box(&lp)).unwrap());
    });
}

/// Benchmark lowering, BCS encoding and signing of a spread order.
fn bench_encode_and_sign(c: &mut Criterion) {
    let b = builder();
    let plan = b.plan(&b.build(&vault(), 1_700_000_000_000).unwrap());
    let objects: HashMap<_, _> = plan_objects(&plan)
        .unwrap()
        .into_iter()
        .map(|(id, mutable)| {
            (
                id,
                ObjectArg::SharedObject {
                    id,
                    initial_shared_version: 1,
                    mutable,
                },
            )
        })
        .collect();
    let signer = SuiSigner::from_seed(&[5u8; 32]);
    let gas = vec![([9u8; 32], 12, ObjectDigest(vec![1u8; 32]))];

    c.bench_function("spread_order_encode_and_sign", |bench| {
        bench.iter(|| {
            let pt = lower_plan(black_box(&plan), &objects).unwrap();
            let data =
                TransactionData::new_programmable(signer.address(), gas.clone(), pt, 50_000_000, 750);
            let bytes = bcs::to_bytes(&data).unwrap();
            signer.sign_transaction(&bytes)
        });
    });
}

criterion_group!(benches, bench_build_plan, bench_type_tag, bench_encode_and_sign);
criterion_main!(benches);
