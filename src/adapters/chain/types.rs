//! Sui JSON-RPC response types.
//!
//! Only the fields the gateway reads are modelled. Sui renders most
//! 64-bit integers as strings, so those go through `u64_from_any`.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Accept a `u64` encoded either as a JSON number or a decimal string.
pub fn u64_from_any<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
  D: Deserializer<'de>,
{
  #[derive(Deserialize)]
  #[serde(untagged)]
  enum NumOrStr {
    Num(u64),
    Str(String),
  }

  match NumOrStr::deserialize(deserializer)? {
    NumOrStr::Num(n) => Ok(n),
    NumOrStr::Str(s) => s.parse().map_err(serde::de::Error::custom),
  }
}

/// `sui_multiGetObjects` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct ObjectResponse {
  pub data: Option<ObjectData>,
  pub error: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectData {
  pub object_id: String,
  #[serde(deserialize_with = "u64_from_any")]
  pub version: u64,
  /// Base58 object digest.
  pub digest: String,
  /// Raw owner, decoded with `Owner::from_value` so unknown kinds fail
  /// only the object that carries them.
  pub owner: Option<Value>,
}

/// Ownership as rendered with `showOwner`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub enum Owner {
  AddressOwner(String),
  ObjectOwner(String),
  Shared {
    #[serde(deserialize_with = "u64_from_any")]
    initial_shared_version: u64,
  },
  Immutable,
  /// Consensus-sequenced object with a single owner.
  ConsensusAddressOwner {
    #[serde(deserialize_with = "u64_from_any")]
    start_version: u64,
    owner: String,
  },
}

impl Owner {
  pub fn from_value(value: &Value) -> Result<Self, serde_json::Error> {
    Self::deserialize(value)
  }
}

/// One page of `suix_getCoins`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoinPage {
  pub data: Vec<Coin>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coin {
  pub coin_object_id: String,
  #[serde(deserialize_with = "u64_from_any")]
  pub version: u64,
  pub digest: String,
  #[serde(deserialize_with = "u64_from_any")]
  pub balance: u64,
}

/// `sui_devInspectTransactionBlock` result.
#[derive(Debug, Clone, Deserialize)]
pub struct DevInspectResults {
  #[serde(default)]
  pub error: Option<String>,
  #[serde(default)]
  pub results: Option<Vec<ExecutionResult>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
  /// `(bcs_bytes, type)` pairs.
  #[serde(default)]
  pub return_values: Vec<(Vec<u8>, String)>,
}

/// `sui_executeTransactionBlock` result.
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionBlockResponse {
  pub digest: String,
  pub effects: Option<TransactionEffects>,
  #[serde(default)]
  pub events: Option<Vec<SuiEvent>>,
}

/// `sui_dryRunTransactionBlock` result.
#[derive(Debug, Clone, Deserialize)]
pub struct DryRunResponse {
  pub effects: TransactionEffects,
  #[serde(default)]
  pub events: Vec<SuiEvent>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionEffects {
  pub status: ExecutionStatus,
  #[serde(default)]
  pub transaction_digest: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExecutionStatus {
  /// `success` or `failure`.
  pub status: String,
  #[serde(default)]
  pub error: Option<String>,
}

impl ExecutionStatus {
  pub fn is_success(&self) -> bool {
    self.status == "success"
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiEvent {
  #[serde(rename = "type")]
  pub event_type: String,
  #[serde(default)]
  pub parsed_json: Value,
}
