//! Sui Gateway - `ChainGateway` over JSON-RPC
//!
//! Turns chain-neutral `TransactionPlan`s into signed Sui programmable
//! transactions:
//! 1. Resolve every referenced object (owned ref or shared version)
//! 2. Lower the plan to BCS `ProgrammableTransaction`
//! 3. Inspect via `devInspect`, or pay gas, sign and execute
//!
//! In dry-run mode submissions go to `sui_dryRunTransactionBlock` and
//! nothing is committed.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::{json, Value};
use tracing::{debug, instrument, warn};

use super::error::GatewayError;
use super::rpc::SuiRpcClient;
use super::signer::SuiSigner;
use super::transaction::{
    format_address, lower_plan, parse_address, plan_objects, ObjectArg, ObjectDigest, ObjectRef, SuiAddress,
    TransactionData, TransactionKind,
};
use super::types::{
    CoinPage, DevInspectResults, DryRunResponse, ObjectData, ObjectResponse, Owner, SuiEvent,
    TransactionBlockResponse, TransactionEffects,
};
use crate::config::ChainConfig;
use crate::domain::transaction::TransactionPlan;
use crate::ports::chain_gateway::{
    ChainEvent, ChainGateway, CommandResult, InspectResult, ReturnValue, SubmissionOutcome,
};

const SUI_COIN_TYPE: &str = "0x2::sui::SUI";

/// Protocol cap on gas payment objects.
const MAX_GAS_OBJECTS: usize = 256;

/// Sui implementation of the chain gateway.
pub struct SuiGateway {
    rpc: Arc<SuiRpcClient>,
    signer: SuiSigner,
    gas_budget: u64,
    dry_run: bool,
}

impl SuiGateway {
    pub fn new(
        rpc: Arc<SuiRpcClient>,
        signer: SuiSigner,
        config: &ChainConfig,
        dry_run: bool,
    ) -> Self {
        Self {
            rpc,
            signer,
            gas_budget: config.gas_budget,
            dry_run,
        }
    }

    /// Sender address as `0x`-prefixed hex.
    pub fn sender(&self) -> String {
        format_address(&self.signer.address())
    }

    #[instrument(skip_all, fields(objects = tracing::field::Empty))]
    async fn resolve_objects(
        &self,
        plan: &TransactionPlan,
    ) -> Result<HashMap<SuiAddress, ObjectArg>> {
        let wanted = plan_objects(plan)?;
        tracing::Span::current().record("objects", wanted.len());

        let ids: Vec<String> = wanted.iter().map(|(id, _)| format_address(id)).collect();
        let responses: Vec<ObjectResponse> = self
            .rpc
            .call("sui_multiGetObjects", json!([ids, { "showOwner": true }]))
            .await?;

        if responses.len() != wanted.len() {
            return Err(GatewayError::Decode(format!(
                "sui_multiGetObjects returned {} entries for {} ids",
                responses.len(),
                wanted.len()
            ))
            .into());
        }

        let mut resolved = HashMap::with_capacity(wanted.len());
        for ((id, mutable), response) in wanted.into_iter().zip(responses) {
            let data = match response.data {
                Some(data) => data,
                None => return Err(missing_object(id, response.error.as_ref()).into()),
            };
            resolved.insert(id, object_arg(id, &data, mutable)?);
        }
        Ok(resolved)
    }

    async fn gas_payment(&self) -> Result<Vec<ObjectRef>> {
        let owner = self.sender();
        let page: CoinPage = self
            .rpc
            .call("suix_getCoins", json!([owner, SUI_COIN_TYPE, Value::Null, Value::Null]))
            .await?;

        select_gas_coins(page, self.gas_budget)?
            .ok_or_else(|| GatewayError::NoGasCoins(owner).into())
    }

    async fn build_transaction(&self, plan: &TransactionPlan) -> Result<Vec<u8>> {
        let objects = self.resolve_objects(plan).await?;
        let pt = lower_plan(plan, &objects)?;

        let price = self.rpc.reference_gas_price().await?;
        let payment = self.gas_payment().await?;

        let data = TransactionData::new_programmable(
            self.signer.address(),
            payment,
            pt,
            self.gas_budget,
            price,
        );
        bcs::to_bytes(&data).context("Failed to encode transaction data")
    }
}

#[async_trait]
impl ChainGateway for SuiGateway {
    #[instrument(skip_all, fields(calls = plan.calls.len()))]
    async fn inspect(&self, plan: &TransactionPlan) -> Result<InspectResult> {
        let objects = self.resolve_objects(plan).await?;
        let kind = TransactionKind::ProgrammableTransaction(lower_plan(plan, &objects)?);
        let kind_bytes = bcs::to_bytes(&kind).context("Failed to encode transaction kind")?;

        let response: DevInspectResults = self
            .rpc
            .call(
                "sui_devInspectTransactionBlock",
                json!([self.sender(), STANDARD.encode(kind_bytes), Value::Null, Value::Null]),
            )
            .await?;

        Ok(inspect_result(response))
    }

    #[instrument(skip_all, fields(calls = plan.calls.len(), dry_run = self.dry_run))]
    async fn submit(&self, plan: &TransactionPlan) -> Result<SubmissionOutcome> {
        let tx_bytes = self.build_transaction(plan).await?;
        let tx_b64 = STANDARD.encode(&tx_bytes);

        if self.dry_run {
            let response: DryRunResponse = self
                .rpc
                .call("sui_dryRunTransactionBlock", json!([tx_b64]))
                .await?;
            let digest = response
                .effects
                .transaction_digest
                .clone()
                .unwrap_or_else(|| "dry-run".to_string());
            ensure_success(&digest, &response.effects)?;
            return Ok(SubmissionOutcome {
                digest,
                events: chain_events(response.events),
                dry_run: true,
            });
        }

        let signature = self.signer.sign_transaction(&tx_bytes);
        let response: TransactionBlockResponse = self
            .rpc
            .call(
                "sui_executeTransactionBlock",
                json!([
                    tx_b64,
                    [signature],
                    { "showEffects": true, "showEvents": true },
                    "WaitForLocalExecution"
                ]),
            )
            .await?;

        let effects = response
            .effects
            .as_ref()
            .ok_or_else(|| GatewayError::Decode(format!("{}: missing effects", response.digest)))?;
        ensure_success(&response.digest, effects)?;

        debug!(digest = %response.digest, "Transaction executed");
        Ok(SubmissionOutcome {
            digest: response.digest,
            events: chain_events(response.events.unwrap_or_default()),
            dry_run: false,
        })
    }

    async fn is_healthy(&self) -> bool {
        self.rpc.is_healthy().await
    }
}

/// Build the input argument for an object as currently owned.
fn object_arg(id: SuiAddress, data: &ObjectData, mutable: bool) -> Result<ObjectArg> {
    let raw = data
        .owner
        .as_ref()
        .ok_or_else(|| GatewayError::Decode(format!("{}: owner not returned", data.object_id)))?;
    let owner = Owner::from_value(raw).map_err(|e| {
        GatewayError::Decode(format!("{}: unsupported owner {raw}: {e}", data.object_id))
    })?;

    Ok(match owner {
        Owner::Shared {
            initial_shared_version,
        } => ObjectArg::SharedObject {
            id,
            initial_shared_version,
            mutable,
        },
        Owner::ConsensusAddressOwner { start_version, .. } => ObjectArg::SharedObject {
            id,
            initial_shared_version: start_version,
            mutable,
        },
        Owner::AddressOwner(_) | Owner::ObjectOwner(_) | Owner::Immutable => {
            ObjectArg::ImmOrOwnedObject((id, data.version, ObjectDigest::from_base58(&data.digest)?))
        }
    })
}

fn missing_object(id: SuiAddress, error: Option<&Value>) -> GatewayError {
    let reason = match error {
        Some(Value::Object(fields)) => fields
            .get("code")
            .and_then(Value::as_str)
            .map_or_else(|| Value::Object(fields.clone()).to_string(), str::to_string),
        Some(other) => other.to_string(),
        None => "no data returned".to_string(),
    };
    GatewayError::ObjectNotFound {
        id: format_address(&id),
        reason,
    }
}

/// Pick the largest coins until they cover `budget`.
///
/// Returns `None` if the owner has no SUI coins at all.
fn select_gas_coins(page: CoinPage, budget: u64) -> Result<Option<Vec<ObjectRef>>> {
    let mut coins = page.data;
    if coins.is_empty() {
        return Ok(None);
    }
    coins.sort_by(|a, b| b.balance.cmp(&a.balance));

    let mut payment = Vec::new();
    let mut total = 0u64;
    for coin in coins.into_iter().take(MAX_GAS_OBJECTS) {
        total = total.saturating_add(coin.balance);
        payment.push((
            parse_address(&coin.coin_object_id)?,
            coin.version,
            ObjectDigest::from_base58(&coin.digest)?,
        ));
        if total >= budget {
            break;
        }
    }

    if total < budget {
        warn!(total, budget, "SUI gas coins do not cover the gas budget");
    }
    Ok(Some(payment))
}

fn ensure_success(digest: &str, effects: &TransactionEffects) -> Result<(), GatewayError> {
    if effects.status.is_success() {
        return Ok(());
    }
    Err(GatewayError::Rejected {
        digest: digest.to_string(),
        reason: effects
            .status
            .error
            .clone()
            .unwrap_or_else(|| effects.status.status.clone()),
    })
}

fn inspect_result(response: DevInspectResults) -> InspectResult {
    if let Some(error) = &response.error {
        warn!(error = %error, "devInspect reported an execution error");
    }

    InspectResult {
        results: response
            .results
            .unwrap_or_default()
            .into_iter()
            .map(|r| CommandResult {
                return_values: r
                    .return_values
                    .into_iter()
                    .map(|(bytes, type_tag)| ReturnValue::new(bytes, type_tag))
                    .collect(),
            })
            .collect(),
    }
}

fn chain_events(events: Vec<SuiEvent>) -> Vec<ChainEvent> {
    events
        .into_iter()
        .map(|e| ChainEvent {
            event_type: e.event_type,
            parsed_json: e.parsed_json,
        })
        .collect()
}
