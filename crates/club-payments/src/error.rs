//! Payment Error Types

use thiserror::Error;

use crate::network::ChainId;
use crate::provider::ProviderError;

/// Result type alias
pub type Result<T> = std::result::Result<T, PaymentError>;

/// Wallet payment errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PaymentError {
    /// No wallet extension in the execution environment
    #[error("Wallet provider unavailable")]
    ProviderUnavailable,

    /// User declined account access, or the provider failed the handshake
    #[error("Wallet connection rejected: {0}")]
    ConnectionRejected(String),

    /// A connection handshake is already running
    #[error("Wallet connection already in progress")]
    ConnectionPending,

    /// Active network is neither accepted chain
    #[error("Unsupported network: {0}")]
    UnsupportedNetwork(ChainId),

    /// Provider does not know the target network definition
    #[error("Network {0} must be registered with the wallet")]
    NetworkRegistrationRequired(ChainId),

    /// Switching or registering the network failed
    #[error("Network switch failed: {0}")]
    NetworkSwitchFailed(String),

    /// Submission attempted with no active plan selection
    #[error("No plan selected")]
    NoPlanSelected,

    /// A payment is already outstanding
    #[error("Payment already in progress")]
    PaymentInProgress,

    /// User declined the transaction or the provider/network rejected it
    #[error("Transaction rejected or failed: {0}")]
    SubmissionRejectedOrFailed(String),

    /// Remote store write failed after a successful submission
    #[error("Payment record write failed: {0}")]
    RecordWriteFailed(String),

    /// No signed-in user to record the payment against
    #[error("No authenticated user")]
    NotAuthenticated,

    /// Amount is not a non-negative decimal within the supported precision
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl PaymentError {
    /// Check if the user can retry without changing their environment
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ConnectionRejected(_)
                | Self::SubmissionRejectedOrFailed(_)
                | Self::RecordWriteFailed(_)
                | Self::NetworkSwitchFailed(_)
        )
    }

    /// Get user-friendly message
    pub const fn user_message(&self) -> &str {
        match self {
            Self::ProviderUnavailable => {
                "MetaMask not detected. Please install MetaMask from https://metamask.io"
            }
            Self::ConnectionRejected(_) => "Wallet connection rejected.",
            Self::ConnectionPending => "Wallet connection already in progress.",
            Self::UnsupportedNetwork(_) => "You are on the wrong network.",
            Self::NetworkRegistrationRequired(_) | Self::NetworkSwitchFailed(_) => {
                "Could not switch your wallet to Sepolia Testnet."
            }
            Self::NoPlanSelected => "No plan selected.",
            Self::PaymentInProgress => "A payment is already in progress.",
            Self::SubmissionRejectedOrFailed(_) => "Payment failed or cancelled.",
            Self::InvalidAmount(_) => "The selected amount is not valid.",
            _ => "An error occurred processing your payment.",
        }
    }

    /// Map a failed `wallet_switchEthereumChain` call
    pub fn from_switch_error(target: ChainId, err: &ProviderError) -> Self {
        if err.is_unrecognized_chain() {
            Self::NetworkRegistrationRequired(target)
        } else {
            Self::NetworkSwitchFailed(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::SEPOLIA_CHAIN_ID;

    #[test]
    fn test_switch_error_mapping() {
        let unknown = ProviderError::new(ProviderError::UNRECOGNIZED_CHAIN, "Unrecognized chain ID");
        assert_eq!(
            PaymentError::from_switch_error(SEPOLIA_CHAIN_ID, &unknown),
            PaymentError::NetworkRegistrationRequired(SEPOLIA_CHAIN_ID)
        );

        let rejected = ProviderError::new(ProviderError::USER_REJECTED, "User rejected the request.");
        assert!(matches!(
            PaymentError::from_switch_error(SEPOLIA_CHAIN_ID, &rejected),
            PaymentError::NetworkSwitchFailed(_)
        ));
    }

    #[test]
    fn test_retryable() {
        assert!(PaymentError::ConnectionRejected("denied".into()).is_retryable());
        assert!(!PaymentError::ProviderUnavailable.is_retryable());
        assert!(!PaymentError::NoPlanSelected.is_retryable());
    }
}
