//! Sui JSON-RPC Client - Full Node Connection Management
//!
//! Thin JSON-RPC 2.0 client over reqwest. Validates connectivity at
//! startup and exposes a generic `call` used by the gateway. No retries:
//! the quoting loop owns the backoff policy.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, instrument};

use super::error::GatewayError;
use crate::config::ChainConfig;

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct RpcEnvelope {
    result: Option<Value>,
    error: Option<RpcErrorBody>,
}

/// JSON-RPC client for a single Sui full node.
pub struct SuiRpcClient {
    http: Client,
    rpc_url: String,
    next_id: AtomicU64,
}

impl SuiRpcClient {
    /// Build the client without touching the network.
    pub fn new(config: &ChainConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .pool_max_idle_per_host(5)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            rpc_url: config.rpc_url.clone(),
            next_id: AtomicU64::new(1),
        })
    }

    /// Build the client and check the node answers.
    ///
    /// Fails if the RPC endpoint is unreachable at startup.
    #[instrument(skip_all, fields(rpc_url = %config.rpc_url))]
    pub async fn connect(config: &ChainConfig) -> Result<Self> {
        let client = Self::new(config)?;

        let chain_id: String = client
            .call("sui_getChainIdentifier", json!([]))
            .await
            .context("Failed to query chain identifier")?;

        info!(chain_id = %chain_id, "Connected to Sui RPC");
        Ok(client)
    }

    /// Invoke `method` with positional `params` and decode the result.
    pub async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<T, GatewayError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        debug!(method, id, "RPC request");

        let envelope: RpcEnvelope = self
            .http
            .post(&self.rpc_url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        decode_envelope(method, envelope)
    }

    /// Current reference gas price in MIST.
    pub async fn reference_gas_price(&self) -> Result<u64, GatewayError> {
        let value: Value = self.call("suix_getReferenceGasPrice", json!([])).await?;
        match &value {
            Value::String(s) => s.parse().ok(),
            Value::Number(n) => n.as_u64(),
            _ => None,
        }
        .ok_or_else(|| GatewayError::Decode(format!("reference gas price: {value}")))
    }

    /// Check if the RPC connection is healthy via a lightweight call.
    pub async fn is_healthy(&self) -> bool {
        self.call::<Value>("sui_getLatestCheckpointSequenceNumber", json!([]))
            .await
            .is_ok()
    }
}

fn decode_envelope<T: DeserializeOwned>(
    method: &str,
    envelope: RpcEnvelope,
) -> Result<T, GatewayError> {
    if let Some(err) = envelope.error {
        return Err(GatewayError::Rpc {
            code: err.code,
            message: err.message,
        });
    }

    let result = envelope
        .result
        .ok_or_else(|| GatewayError::Decode(format!("{method}: missing result")))?;

    serde_json::from_value(result).map_err(|e| GatewayError::Decode(format!("{method}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(v: Value) -> RpcEnvelope {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn test_result_is_decoded() {
        let out: String = decode_envelope(
            "sui_getChainIdentifier",
            envelope(json!({"jsonrpc": "2.0", "id": 1, "result": "35834a8a"})),
        )
        .unwrap();
        assert_eq!(out, "35834a8a");
    }

    #[test]
    fn test_rpc_error_is_surfaced() {
        let err = decode_envelope::<Value>(
            "sui_executeTransactionBlock",
            envelope(json!({
                "jsonrpc": "2.0", "id": 2,
                "error": {"code": -32002, "message": "Transaction validator signing failed"}
            })),
        )
        .unwrap_err();
        assert!(matches!(err, GatewayError::Rpc { code: -32002, .. }));
    }

    #[test]
    fn test_missing_result_is_decode_error() {
        let err = decode_envelope::<Value>("m", envelope(json!({"jsonrpc": "2.0", "id": 3})))
            .unwrap_err();
        assert!(matches!(err, GatewayError::Decode(_)));
    }

    #[test]
    fn test_new_does_not_connect() {
        let config = ChainConfig {
            rpc_url: "http://127.0.0.1:1".to_string(),
            ..ChainConfig::default()
        };
        assert!(SuiRpcClient::new(&config).is_ok());
    }
}
