//! Wallet Provider Contract
//!
//! The payment flow talks to the wallet exclusively through this interface,
//! modelled on the EIP-1193 `request({ method, params })` call that browser
//! wallet extensions inject. Implementations live at the edge: the WASM front
//! end binds `window.ethereum`, tests use a scripted mock.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use club_payments::provider::WalletProvider;
//!
//! let chain_id = provider.chain_id().await?;
//! let accounts = provider.request_accounts().await?;
//! ```

use std::fmt;

use alloy_primitives::Address;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::network::{ChainId, NetworkDefinition};

/// RPC method names used by the payment flow
pub mod methods {
    pub const CHAIN_ID: &str = "eth_chainId";
    pub const REQUEST_ACCOUNTS: &str = "eth_requestAccounts";
    pub const SWITCH_CHAIN: &str = "wallet_switchEthereumChain";
    pub const ADD_CHAIN: &str = "wallet_addEthereumChain";
    pub const SEND_TRANSACTION: &str = "eth_sendTransaction";
}

/// A provider request: `{ method, params }`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RpcRequest {
    pub method: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<Value>,
}

impl RpcRequest {
    pub fn new(method: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            method: method.into(),
            params,
        }
    }
}

/// Rejection reported by the wallet: `{ code, message }`
#[derive(Error, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[error("{message} (code {code})")]
pub struct ProviderError {
    pub code: i64,
    pub message: String,
}

impl ProviderError {
    /// User rejected the request
    pub const USER_REJECTED: i64 = 4001;

    /// Provider is not connected to any chain, or has gone away
    pub const DISCONNECTED: i64 = 4900;

    /// Chain has not been added to the wallet
    pub const UNRECOGNIZED_CHAIN: i64 = 4902;

    /// Response did not have the expected shape
    pub const MALFORMED_RESPONSE: i64 = -32603;

    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn disconnected() -> Self {
        Self::new(Self::DISCONNECTED, "Wallet provider is not available")
    }

    pub const fn is_user_rejection(&self) -> bool {
        self.code == Self::USER_REJECTED
    }

    pub const fn is_unrecognized_chain(&self) -> bool {
        self.code == Self::UNRECOGNIZED_CHAIN
    }
}

/// Opaque transaction identifier; means "submitted", not "settled"
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxHash(String);

impl TxHash {
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First ten characters, for status lines
    pub fn short(&self) -> String {
        format!("{}...", self.0.chars().take(10).collect::<String>())
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Native-currency transfer payload for `eth_sendTransaction`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRequest {
    pub from: Address,
    pub to: Address,

    /// Minor units as `0x`-prefixed hex
    pub value: String,
}

fn decode<T: DeserializeOwned>(method: &str, value: Value) -> Result<T, ProviderError> {
    serde_json::from_value(value).map_err(|e| {
        ProviderError::new(
            ProviderError::MALFORMED_RESPONSE,
            format!("unexpected {method} response: {e}"),
        )
    })
}

fn encode<T: Serialize>(method: &str, param: &T) -> Result<Value, ProviderError> {
    serde_json::to_value(param).map_err(|e| {
        ProviderError::new(
            ProviderError::MALFORMED_RESPONSE,
            format!("cannot encode {method} params: {e}"),
        )
    })
}

/// Injected wallet capability
///
/// Calls are asynchronous and single-threaded: implementations may hold
/// JS handles, so futures are not required to be `Send`.
#[async_trait(?Send)]
pub trait WalletProvider {
    /// Whether the wallet binding exists in the execution environment
    fn is_available(&self) -> bool;

    /// Raw provider request
    async fn request(&self, request: RpcRequest) -> Result<Value, ProviderError>;

    /// Currently active network
    async fn chain_id(&self) -> Result<ChainId, ProviderError> {
        let value = self.request(RpcRequest::new(methods::CHAIN_ID, vec![])).await?;
        decode(methods::CHAIN_ID, value)
    }

    /// Ask the user for account access
    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError> {
        let value = self
            .request(RpcRequest::new(methods::REQUEST_ACCOUNTS, vec![]))
            .await?;
        decode(methods::REQUEST_ACCOUNTS, value)
    }

    /// Ask the wallet to switch its active network
    async fn switch_chain(&self, chain_id: ChainId) -> Result<(), ProviderError> {
        let params = vec![serde_json::json!({ "chainId": chain_id.to_hex() })];
        self.request(RpcRequest::new(methods::SWITCH_CHAIN, params))
            .await
            .map(|_| ())
    }

    /// Register a network definition with the wallet
    async fn add_chain(&self, network: &NetworkDefinition) -> Result<(), ProviderError> {
        let params = vec![encode(methods::ADD_CHAIN, network)?];
        self.request(RpcRequest::new(methods::ADD_CHAIN, params))
            .await
            .map(|_| ())
    }

    /// Submit a transaction; resolves once the wallet has broadcast it
    async fn send_transaction(&self, tx: &TransactionRequest) -> Result<TxHash, ProviderError> {
        let params = vec![encode(methods::SEND_TRANSACTION, tx)?];
        let value = self
            .request(RpcRequest::new(methods::SEND_TRANSACTION, params))
            .await?;
        decode(methods::SEND_TRANSACTION, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_wire_format() {
        let request = RpcRequest::new(methods::CHAIN_ID, vec![]);
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({ "method": "eth_chainId" })
        );
    }

    #[test]
    fn test_provider_error_codes() {
        let err: ProviderError =
            serde_json::from_str(r#"{"code":4001,"message":"User rejected the request."}"#).unwrap();
        assert!(err.is_user_rejection());
        assert!(!err.is_unrecognized_chain());
        assert_eq!(err.to_string(), "User rejected the request. (code 4001)");
    }

    #[test]
    fn test_tx_hash_short() {
        let hash = TxHash::new("0x9fc76417374aa880d4449a1f7f31ec597f00b1f6f3dd2d66f4c9c6c445836d8b");
        assert_eq!(hash.short(), "0x9fc76417...");
    }
}
