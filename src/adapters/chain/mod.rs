//! Chain Adapters - Sui Ledger Interaction Layer
//!
//! Provides on-chain access over Sui JSON-RPC for:
//! - RPC connection management and health probing
//! - BCS transaction encoding from `TransactionPlan`s
//! - Ed25519 signing with the operator key
//! - Object resolution, gas selection and submission (`SuiGateway`)

pub mod error;
pub mod gateway;
pub mod rpc;
pub mod signer;
pub mod transaction;
pub mod types;

pub use error::{GatewayError, KeyError};
pub use gateway::SuiGateway;
pub use rpc::SuiRpcClient;
pub use signer::SuiSigner;
