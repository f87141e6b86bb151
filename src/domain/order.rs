//! Spread order types.
//!
//! A spread order is a bid/ask pair placed by the vault's on-chain
//! strategy around the pool mid price. The quoter only chooses the
//! parameters; pricing and matching happen on-chain.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::vault::{MoveType, ObjectId, OrderId};

/// DeepBook order restriction, encoded as `u8` on-chain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    #[default]
    NoRestriction,
    ImmediateOrCancel,
    FillOrKill,
    PostOnly,
}

impl OrderType {
    pub const fn as_u8(self) -> u8 {
        match self {
            Self::NoRestriction => 0,
            Self::ImmediateOrCancel => 1,
            Self::FillOrKill => 2,
            Self::PostOnly => 3,
        }
    }
}

/// DeepBook self-matching policy, encoded as `u8` on-chain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelfMatchingOption {
    #[default]
    SelfMatchingAllowed,
    CancelTaker,
    CancelMaker,
}

impl SelfMatchingOption {
    pub const fn as_u8(self) -> u8 {
        match self {
            Self::SelfMatchingAllowed => 0,
            Self::CancelTaker => 1,
            Self::CancelMaker => 2,
        }
    }
}

/// One "create spread order" intent. Built, submitted, dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpreadOrderRequest {
    pub vault_id: ObjectId,
    pub base_asset_type: MoveType,
    pub quote_asset_type: MoveType,
    pub lp_token_type: MoveType,
    /// Pool the order is placed into.
    pub pool_id: ObjectId,
    /// Spread width in basis points.
    pub spread_bps: u64,
    /// Order quantity in base units.
    pub order_size: u64,
    /// Maximum tolerated inventory skew, 0–100.
    pub max_skew_percent: u64,
    /// Absolute expiry (Unix ms).
    pub expire_at_ms: u64,
    pub self_matching: SelfMatchingOption,
    pub order_type: OrderType,
}

impl SpreadOrderRequest {
    pub fn type_arguments(&self) -> Vec<MoveType> {
        vec![
            self.base_asset_type.clone(),
            self.quote_asset_type.clone(),
            self.lp_token_type.clone(),
        ]
    }
}

/// A live bid/ask pair created by one spread order submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveOrderRecord {
    pub vault_id: ObjectId,
    /// Transaction digest that created the pair.
    pub digest: String,
    pub bid_order_id: OrderId,
    pub ask_order_id: OrderId,
    pub mid_price: u64,
    pub bid_price: u64,
    pub ask_price: u64,
    /// Local time the submission was confirmed (Unix ms).
    pub timestamp_ms: u64,
}

impl ActiveOrderRecord {
    /// Decode the `parsedJson` payload of an `OrderCreatedEvent`.
    ///
    /// Returns `None` if any field is missing or not an integer.
    pub fn from_event_json(
        vault_id: &str,
        digest: &str,
        json: &Value,
        timestamp_ms: u64,
    ) -> Option<Self> {
        Some(Self {
            vault_id: vault_id.to_string(),
            digest: digest.to_string(),
            bid_order_id: json_integer_string(json.get("bid_order_id")?)?,
            ask_order_id: json_integer_string(json.get("ask_order_id")?)?,
            mid_price: json_u64(json.get("mid_price")?)?,
            bid_price: json_u64(json.get("bid_price")?)?,
            ask_price: json_u64(json.get("ask_price")?)?,
            timestamp_ms,
        })
    }
}

// Sui renders u64/u128 event fields as JSON strings.
fn json_u64(value: &Value) -> Option<u64> {
    match value {
        Value::String(s) => s.parse().ok(),
        Value::Number(n) => n.as_u64(),
        _ => None,
    }
}

fn json_integer_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if s.parse::<u128>().is_ok() => Some(s.clone()),
        Value::Number(n) => n.as_u64().map(|n| n.to_string()),
        _ => None,
    }
}
