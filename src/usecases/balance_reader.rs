//! Vault Balance Reader - Read-only Balance Sampling
//!
//! Simulates `mm_vault::get_vault_balance` against the ledger and
//! decodes the two `u64` return values (base, then quote). A call that
//! succeeds without decodable values is reported as an empty snapshot
//! unless strict decoding is enabled. Transport errors propagate.

use std::sync::Arc;

use anyhow::{bail, Result};
use tracing::{instrument, warn};

use crate::domain::transaction::{CallInput, MoveCall, TransactionPlan};
use crate::domain::vault::{BalanceSnapshot, ObjectId, Vault};
use crate::ports::chain_gateway::{ChainGateway, InspectResult, ReturnValue};

/// Module exposing the vault entry points.
pub const VAULT_MODULE: &str = "mm_vault";

const GET_VAULT_BALANCE: &str = "get_vault_balance";

/// Reads vault balances through the chain gateway.
pub struct VaultBalanceReader<G: ChainGateway> {
  gateway: Arc<G>,
  amm_package_id: ObjectId,
  /// Fail instead of returning zero balances on malformed results.
  strict_decode: bool,
}

impl<G: ChainGateway> VaultBalanceReader<G> {
  pub fn new(gateway: Arc<G>, amm_package_id: impl Into<ObjectId>) -> Self {
    Self {
      gateway,
      amm_package_id: amm_package_id.into(),
      strict_decode: false,
    }
  }

  /// Treat undecodable results as errors.
  #[must_use]
  pub const fn with_strict_decode(mut self, strict: bool) -> Self {
    self.strict_decode = strict;
    self
  }

  /// The read-only call issued for `vault`.
  pub fn balance_call(&self, vault: &Vault) -> MoveCall {
    MoveCall {
      package: self.amm_package_id.clone(),
      module: VAULT_MODULE.to_string(),
      function: GET_VAULT_BALANCE.to_string(),
      type_arguments: vault.type_arguments(),
      arguments: vec![CallInput::object(vault.id.clone())],
    }
  }

  /// Sample the vault's current base and quote balances.
  ///
  /// # Errors
  /// Returns the gateway error if the simulated call fails, or a decode
  /// error when strict decoding is enabled.
  #[instrument(skip(self, vault), fields(vault = %vault.label()))]
  pub async fn read_balances(&self, vault: &Vault) -> Result<BalanceSnapshot> {
    let plan = TransactionPlan::single(self.balance_call(vault));
    let result = self.gateway.inspect(&plan).await?;

    match decode_balances(&result) {
      Some(snapshot) => Ok(snapshot),
      None if self.strict_decode => {
        bail!("get_vault_balance returned no decodable balances for {}", vault.id)
      }
      None => {
        warn!(
          commands = result.results.len(),
          "No decodable balances returned, assuming empty vault"
        );
        Ok(BalanceSnapshot::empty())
      }
    }
  }
}

/// Decode `(u64, u64)` from the first command's return values.
pub fn decode_balances(result: &InspectResult) -> Option<BalanceSnapshot> {
  let values = &result.results.first()?.return_values;
  let base = decode_u64(values.first()?)?;
  let quote = decode_u64(values.get(1)?)?;
  Some(BalanceSnapshot::new(base, quote))
}

fn decode_u64(value: &ReturnValue) -> Option<u64> {
  if value.type_tag != "u64" || value.bytes.len() != 8 {
    return None;
  }
  bcs::from_bytes(&value.bytes).ok()
}
