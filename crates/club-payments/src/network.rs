//! Accepted Networks
//!
//! Chain identifiers, the add-network definition offered to wallets that do
//! not know the test network, and the fixed receiving address.

use std::fmt;
use std::str::FromStr;

use alloy_primitives::{Address, address};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Chain id string that is not `0x`-prefixed hex
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid chain id '{0}'")]
pub struct InvalidChainId(pub String);

/// EVM chain identifier, rendered as `0x`-prefixed lowercase hex
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChainId(u64);

impl ChainId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn value(self) -> u64 {
        self.0
    }

    /// Hex form used by wallet RPC methods
    pub fn to_hex(self) -> String {
        format!("{:#x}", self.0)
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl FromStr for ChainId {
    type Err = InvalidChainId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .ok_or_else(|| InvalidChainId(s.to_string()))?;
        u64::from_str_radix(digits, 16)
            .map(Self)
            .map_err(|_| InvalidChainId(s.to_string()))
    }
}

impl Serialize for ChainId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ChainId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Sepolia testnet
pub const SEPOLIA_CHAIN_ID: ChainId = ChainId::new(0x00aa_36a7);

/// Polygon mainnet
pub const POLYGON_CHAIN_ID: ChainId = ChainId::new(0x89);

/// Networks payments may be submitted on
pub const ACCEPTED_NETWORKS: [ChainId; 2] = [SEPOLIA_CHAIN_ID, POLYGON_CHAIN_ID];

/// Owner wallet receiving every payment
pub const RECEIVING_ADDRESS: Address = address!("e2d165ab23cd2ed0cafb969b8bc55b9a71f17b5c");

/// Whether payments may be submitted on this network
pub fn is_accepted(chain_id: ChainId) -> bool {
    ACCEPTED_NETWORKS.contains(&chain_id)
}

/// Native currency metadata for `wallet_addEthereumChain`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// EIP-3085 network definition
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkDefinition {
    pub chain_id: ChainId,
    pub chain_name: String,
    pub rpc_urls: Vec<String>,
    pub native_currency: NativeCurrency,
    pub block_explorer_urls: Vec<String>,
}

impl NetworkDefinition {
    /// The test network users are offered when on an unsupported chain
    pub fn sepolia() -> Self {
        Self {
            chain_id: SEPOLIA_CHAIN_ID,
            chain_name: "Sepolia Testnet".into(),
            rpc_urls: vec!["https://sepolia.infura.io/v3/9aa3d95b3bc440fa88ea12eaa4456161".into()],
            native_currency: NativeCurrency {
                name: "Ether".into(),
                symbol: "ETH".into(),
                decimals: 18,
            },
            block_explorer_urls: vec!["https://sepolia.etherscan.io".into()],
        }
    }
}
