//! Sui Signer - Ed25519 Transaction Signing
//!
//! Loads the operator key from the `PRIVATE_KEY` environment variable
//! and signs transaction bytes under the Sui transaction intent. The
//! key is never logged and never leaves this module.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use ed25519_dalek::{Signer, SigningKey};

use super::error::KeyError;
use super::transaction::SuiAddress;

type Blake2b256 = Blake2b<U32>;

/// Bech32 human-readable part of exported Sui private keys.
const PRIVATE_KEY_HRP: &str = "suiprivkey";

/// Signature scheme flag for Ed25519.
const ED25519_FLAG: u8 = 0x00;

/// `TransactionData` intent: scope 0, version 0, app id Sui.
const TRANSACTION_INTENT: [u8; 3] = [0, 0, 0];

/// Ed25519 signer for a single Sui account.
pub struct SuiSigner {
    key: SigningKey,
    address: SuiAddress,
}

impl SuiSigner {
    /// Load the key from `PRIVATE_KEY`.
    pub fn from_env() -> Result<Self, KeyError> {
        let raw = std::env::var("PRIVATE_KEY").map_err(|_| KeyError::Missing)?;
        Self::from_key_str(raw.trim())
    }

    /// Parse a `suiprivkey1...` bech32 key or a base64 `flag || secret` key.
    pub fn from_key_str(encoded: &str) -> Result<Self, KeyError> {
        if encoded.is_empty() {
            return Err(KeyError::Missing);
        }

        let bytes = if encoded.starts_with(PRIVATE_KEY_HRP) {
            let (hrp, data) =
                bech32::decode(encoded).map_err(|e| KeyError::Encoding(e.to_string()))?;
            if hrp.to_lowercase() != PRIVATE_KEY_HRP {
                return Err(KeyError::Encoding(format!("unexpected prefix {hrp}")));
            }
            data
        } else {
            STANDARD
                .decode(encoded)
                .map_err(|e| KeyError::Encoding(e.to_string()))?
        };

        let secret = match bytes.split_first() {
            Some((&ED25519_FLAG, rest)) if rest.len() == 32 => rest,
            Some((&flag, rest)) if rest.len() == 32 => {
                return Err(KeyError::UnsupportedScheme(flag));
            }
            _ => return Err(KeyError::Length(bytes.len().saturating_sub(1))),
        };

        let mut seed = [0u8; 32];
        seed.copy_from_slice(secret);
        Ok(Self::from_seed(&seed))
    }

    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let key = SigningKey::from_bytes(seed);
        let address = derive_address(&key.verifying_key().to_bytes());
        Self { key, address }
    }

    pub const fn address(&self) -> SuiAddress {
        self.address
    }

    /// Sign BCS `TransactionData` bytes and return the serialized,
    /// base64-encoded signature (`flag || sig || pubkey`).
    pub fn sign_transaction(&self, tx_bytes: &[u8]) -> String {
        let digest = signing_digest(tx_bytes);
        let signature = self.key.sign(&digest);

        let mut serialized = Vec::with_capacity(1 + 64 + 32);
        serialized.push(ED25519_FLAG);
        serialized.extend_from_slice(&signature.to_bytes());
        serialized.extend_from_slice(&self.key.verifying_key().to_bytes());
        STANDARD.encode(serialized)
    }
}

/// Blake2b-256 over `intent || tx_bytes`.
pub fn signing_digest(tx_bytes: &[u8]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    hasher.update(TRANSACTION_INTENT);
    hasher.update(tx_bytes);
    hasher.finalize().into()
}

/// Sui address of an Ed25519 public key.
pub fn derive_address(public_key: &[u8; 32]) -> SuiAddress {
    let mut hasher = Blake2b256::new();
    hasher.update([ED25519_FLAG]);
    hasher.update(public_key);
    hasher.finalize().into()
}
