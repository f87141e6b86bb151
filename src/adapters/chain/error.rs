//! Sui adapter errors.

use thiserror::Error;

/// Failures talking to a Sui full node.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("RPC transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Malformed RPC response: {0}")]
    Decode(String),

    #[error("Object {id} not found: {reason}")]
    ObjectNotFound { id: String, reason: String },

    #[error("No SUI gas coins owned by {0}")]
    NoGasCoins(String),

    #[error("Transaction {digest} failed: {reason}")]
    Rejected { digest: String, reason: String },
}

/// Failures loading or using the signing key.
#[derive(Error, Debug)]
pub enum KeyError {
    #[error("PRIVATE_KEY not set")]
    Missing,

    #[error("PRIVATE_KEY is not valid bech32 or base64: {0}")]
    Encoding(String),

    #[error("Unsupported key scheme flag {0:#04x}, only Ed25519 is supported")]
    UnsupportedScheme(u8),

    #[error("Expected a 32-byte secret key, got {0} bytes")]
    Length(usize),
}
