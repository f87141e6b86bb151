//! Vault identity and balance types.
//!
//! A vault is an on-chain object holding base and quote assets and minting
//! LP tokens. The quoter never creates or destroys vaults; it only reads
//! their balances and places spread orders on their behalf.

use serde::{Deserialize, Serialize};

use super::move_type::parse_address;

// ────────────────────────────────────────────
// Type aliases consumed by ports and adapters
// ────────────────────────────────────────────

/// On-chain object identifier (`0x`-prefixed hex).
pub type ObjectId = String;

/// Fully qualified Move type, e.g. `0x2::sui::SUI`.
pub type MoveType = String;

/// Order identifier assigned by the order book.
pub type OrderId = String;

/// One managed liquidity vault.
///
/// Loaded from `[[vaults]]` in `config.toml` at startup and immutable
/// for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vault {
    /// Vault object id.
    pub id: ObjectId,
    /// Base asset coin type.
    pub base_asset_type: MoveType,
    /// Quote asset coin type.
    pub quote_asset_type: MoveType,
    /// LP token coin type minted by the vault.
    pub lp_token_type: MoveType,
    /// DeepBook pool this vault quotes into. Falls back to the global pool.
    #[serde(default)]
    pub pool_id: Option<ObjectId>,
    /// Human-readable label for logs and metrics.
    #[serde(default)]
    pub name: Option<String>,
}

impl Vault {
    /// Create a vault without pool override or label.
    pub fn new(
        id: impl Into<ObjectId>,
        base_asset_type: impl Into<MoveType>,
        quote_asset_type: impl Into<MoveType>,
        lp_token_type: impl Into<MoveType>,
    ) -> Self {
        Self {
            id: id.into(),
            base_asset_type: base_asset_type.into(),
            quote_asset_type: quote_asset_type.into(),
            lp_token_type: lp_token_type.into(),
            pool_id: None,
            name: None,
        }
    }

    /// Type arguments in the order every `mm_vault` entry point expects.
    pub fn type_arguments(&self) -> Vec<MoveType> {
        vec![
            self.base_asset_type.clone(),
            self.quote_asset_type.clone(),
            self.lp_token_type.clone(),
        ]
    }

    /// Label used in logs: the configured name, else the object id.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }

    /// Whether the three type tags are pairwise distinct.
    pub fn has_distinct_types(&self) -> bool {
        self.base_asset_type != self.quote_asset_type
            && self.base_asset_type != self.lp_token_type
            && self.quote_asset_type != self.lp_token_type
    }
}

/// Point-in-time vault balances in each token's smallest unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BalanceSnapshot {
    pub base_balance: u64,
    pub quote_balance: u64,
}

impl BalanceSnapshot {
    pub const fn new(base_balance: u64, quote_balance: u64) -> Self {
        Self {
            base_balance,
            quote_balance,
        }
    }

    /// Snapshot reported when the vault returns no decodable balances.
    pub const fn empty() -> Self {
        Self::new(0, 0)
    }

    pub const fn is_empty(&self) -> bool {
        self.base_balance == 0 && self.quote_balance == 0
    }
}

/// Check that `id` looks like a Sui object id: `0x` followed by 1-64 hex digits.
pub fn is_valid_object_id(id: &str) -> bool {
    parse_address(id).is_ok()
}
