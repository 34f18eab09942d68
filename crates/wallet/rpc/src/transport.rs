//! JSON-RPC 2.0 envelope and error-code translation.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::trace;

use wallet_core::ProviderError;

/// EIP-1193: a permission request is already being processed.
pub(crate) const CODE_REQUEST_PENDING: i64 = -32002;
/// EIP-1193: the user rejected the request.
pub(crate) const CODE_USER_REJECTED: i64 = 4001;
/// Wallet convention: the requested chain has not been added.
pub(crate) const CODE_UNRECOGNIZED_CHAIN: i64 = 4902;

#[derive(Debug, Serialize)]
pub(crate) struct RpcRequest<'a> {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: &'a str,
    pub params: Value,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RpcResponse {
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<RpcErrorObject>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RpcErrorObject {
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

/// Translate a provider error object into the closed error set.
///
/// `4902` stays a [`ProviderError::Rpc`] here because the error object does
/// not carry the chain id; the switch path refines it with
/// [`refine_unrecognized`].
pub(crate) fn translate_error(error: RpcErrorObject) -> ProviderError {
    match error.code {
        CODE_REQUEST_PENDING => ProviderError::RequestPending,
        CODE_USER_REJECTED => ProviderError::UserRejected,
        code => ProviderError::Rpc {
            code,
            message: error.message,
        },
    }
}

/// Attach the target chain id to a `4902` failure.
pub(crate) fn refine_unrecognized(error: ProviderError, chain_id: u64) -> ProviderError {
    match error {
        ProviderError::Rpc {
            code: CODE_UNRECOGNIZED_CHAIN,
            ..
        } => ProviderError::UnrecognizedChain(chain_id),
        other => other,
    }
}

/// Parse a `0x`-prefixed hex quantity (chain ids, block numbers).
pub(crate) fn parse_quantity(value: &str) -> Result<u64, ProviderError> {
    let digits = value.strip_prefix("0x").unwrap_or(value);
    u64::from_str_radix(digits, 16)
        .map_err(|_| ProviderError::Transport(format!("malformed quantity {value:?}")))
}

/// Shared HTTP transport for request/response JSON-RPC.
///
/// Cloned into the polling watcher task, so the ids stay globally unique.
#[derive(Clone)]
pub(crate) struct RpcTransport {
    endpoint: String,
    http: reqwest::Client,
    next_id: Arc<AtomicU64>,
}

impl RpcTransport {
    pub(crate) fn new(endpoint: String) -> Self {
        Self {
            endpoint,
            http: reqwest::Client::new(),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    pub(crate) fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub(crate) async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        let payload = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };

        trace!(method, "provider request");

        let response = self
            .http
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await
            .map_err(|err| ProviderError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Transport(format!(
                "wallet bridge returned HTTP {status}"
            )));
        }

        let body: RpcResponse = response
            .json()
            .await
            .map_err(|err| ProviderError::Transport(err.to_string()))?;

        if let Some(error) = body.error {
            return Err(translate_error(error));
        }
        // The chain switch/registration methods answer success with
        // `result: null` (EIP-3326/EIP-3085), so a null result is a result,
        // not a missing field. Typed decodes still reject null where a
        // value is required.
        Ok(body.result.unwrap_or(Value::Null))
    }
}
