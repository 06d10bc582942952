//! Payment status indicator
//!
//! The single line of feedback shown next to the wallet controls.

use std::fmt;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::provider::TxHash;

/// `0x1234...abcd`
pub fn short_address(address: &Address) -> String {
    let full = address.to_string();
    let head: String = full.chars().take(6).collect();
    let tail: String = full.chars().skip(full.len().saturating_sub(4)).collect();
    format!("{head}...{tail}")
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "detail", rename_all = "snake_case")]
pub enum PaymentStatus {
    NotConnected,
    Connected(Address),
    ConnectionRejected,
    AwaitingConfirmation,
    Submitted(TxHash),
    Failed,
}

impl PaymentStatus {
    /// Whether the line should be styled as an error
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::ConnectionRejected | Self::Failed)
    }

    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Connected(_) | Self::Submitted(_))
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConnected => f.write_str("Wallet not connected"),
            Self::Connected(address) => write!(f, "Connected: {}", short_address(address)),
            Self::ConnectionRejected => f.write_str("Wallet connection rejected."),
            Self::AwaitingConfirmation => f.write_str("Waiting for wallet confirmation…"),
            Self::Submitted(hash) => write!(f, "Transaction sent: {}", hash.short()),
            Self::Failed => f.write_str("Payment failed or rejected."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    #[test]
    fn test_status_text() {
        let account = address!("abc0000000000000000000000000000000001234");
        // Display is checksummed; compare case-insensitively
        assert_eq!(
            PaymentStatus::Connected(account).to_string().to_lowercase(),
            "connected: 0xabc0...1234"
        );
        assert_eq!(
            PaymentStatus::Submitted(TxHash::new("0x1234567890abcdef")).to_string(),
            "Transaction sent: 0x12345678..."
        );
        assert!(PaymentStatus::Failed.is_error());
        assert!(!PaymentStatus::NotConnected.is_success());
    }
}
