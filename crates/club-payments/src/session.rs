//! Wallet Session
//!
//! Tracks the connected account and active network, and negotiates the
//! network with the wallet during the connection handshake.
//!
//! ```text
//! Disconnected ──connect()──▶ Connecting ──ok──▶ Connected
//!       ▲                         │                  │
//!       └────────── error ────────┘◀──── connect() ──┘
//! ```
//!
//! The cached account and network mirror the wallet's state at the last
//! query. The extension may change either at any time; stale values are
//! tolerated until the next explicit query.

use std::cell::RefCell;
use std::rc::Rc;

use alloy_primitives::Address;

use crate::error::{PaymentError, Result};
use crate::network::{self, ChainId, NetworkDefinition};
use crate::notify::{DEFAULT_NOTICE, LONG_NOTICE, NotificationChannel, Severity};
use crate::provider::WalletProvider;
use crate::status::PaymentStatus;

/// Prompt shown when the wallet is on a network payments are not accepted on
pub const WRONG_NETWORK_PROMPT: &str =
    "You are on the wrong network.\n\nSwitch to Sepolia Testnet for testing with free test ETH?";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

#[derive(Debug, Default)]
struct SessionState {
    connection: ConnectionState,
    account: Option<Address>,
    network: Option<ChainId>,
}

/// Puts the previous connection state back if a handshake is abandoned
/// before it settles
struct Handshake<'a> {
    state: &'a RefCell<SessionState>,
    previous: Option<ConnectionState>,
}

impl<'a> Handshake<'a> {
    fn begin(state: &'a RefCell<SessionState>) -> Self {
        let previous =
            std::mem::replace(&mut state.borrow_mut().connection, ConnectionState::Connecting);
        Self {
            state,
            previous: Some(previous),
        }
    }

    fn settle(mut self, connection: ConnectionState, account: Option<Address>) {
        self.previous = None;
        let mut state = self.state.borrow_mut();
        state.connection = connection;
        state.account = account;
    }
}

impl Drop for Handshake<'_> {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            tracing::debug!("Wallet handshake abandoned");
            self.state.borrow_mut().connection = previous;
        }
    }
}

pub struct WalletSession {
    provider: Rc<dyn WalletProvider>,
    notifier: Rc<dyn NotificationChannel>,
    state: RefCell<SessionState>,
}

impl WalletSession {
    pub fn new(provider: Rc<dyn WalletProvider>, notifier: Rc<dyn NotificationChannel>) -> Self {
        Self {
            provider,
            notifier,
            state: RefCell::new(SessionState::default()),
        }
    }

    /// Account from the last successful handshake
    pub fn current_account(&self) -> Option<Address> {
        self.state.borrow().account
    }

    /// Network reported by the wallet at the last query or switch
    pub fn current_network(&self) -> Option<ChainId> {
        self.state.borrow().network
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.state.borrow().connection
    }

    pub fn provider(&self) -> &dyn WalletProvider {
        self.provider.as_ref()
    }

    /// Connect to the wallet: read the network, offer a switch when it is
    /// not accepted, then request account access.
    ///
    /// Failures are already reported through the notification channel when
    /// this returns `Err`.
    pub async fn connect(&self) -> Result<Address> {
        if !self.provider.is_available() {
            tracing::warn!("No wallet provider detected");
            let err = PaymentError::ProviderUnavailable;
            self.notifier
                .notify(err.user_message(), Severity::Error, LONG_NOTICE);
            return Err(err);
        }

        if self.connection_state() == ConnectionState::Connecting {
            tracing::debug!("Connect requested while a handshake is running");
            let err = PaymentError::ConnectionPending;
            self.notifier
                .notify(err.user_message(), Severity::Warning, DEFAULT_NOTICE);
            return Err(err);
        }
        let handshake = Handshake::begin(&self.state);

        match self.handshake().await {
            Ok(account) => {
                handshake.settle(ConnectionState::Connected, Some(account));
                tracing::info!(account = %account, "Wallet connected");
                self.notifier.set_status(&PaymentStatus::Connected(account));
                Ok(account)
            }
            Err(err) => {
                handshake.settle(ConnectionState::Disconnected, None);
                tracing::warn!(error = %err, "Wallet connection failed");
                self.notifier.set_status(&PaymentStatus::ConnectionRejected);
                self.notifier
                    .notify(err.user_message(), Severity::Error, DEFAULT_NOTICE);
                Err(err)
            }
        }
    }

    async fn handshake(&self) -> Result<Address> {
        let chain_id = self
            .provider
            .chain_id()
            .await
            .map_err(|e| PaymentError::ConnectionRejected(e.to_string()))?;
        self.state.borrow_mut().network = Some(chain_id);

        if !network::is_accepted(chain_id) {
            // a declined or failed switch does not block the connection
            if let Err(err) = self.negotiate_network(chain_id).await {
                tracing::warn!(chain_id = %chain_id, error = %err, "Continuing on unsupported network");
            }
        }

        let accounts = self
            .provider
            .request_accounts()
            .await
            .map_err(|e| PaymentError::ConnectionRejected(e.to_string()))?;

        accounts
            .first()
            .copied()
            .ok_or_else(|| PaymentError::ConnectionRejected("wallet returned no accounts".into()))
    }

    async fn negotiate_network(&self, active: ChainId) -> Result<()> {
        if !self.notifier.confirm(WRONG_NETWORK_PROMPT).await {
            return Err(PaymentError::UnsupportedNetwork(active));
        }

        let target = NetworkDefinition::sepolia();
        self.switch_network(&target).await.inspect_err(|err| {
            self.notifier
                .notify(err.user_message(), Severity::Error, DEFAULT_NOTICE);
        })
    }

    /// Switch to `target`, registering it once if the wallet does not know it
    async fn switch_network(&self, target: &NetworkDefinition) -> Result<()> {
        if let Err(err) = self.provider.switch_chain(target.chain_id).await {
            match PaymentError::from_switch_error(target.chain_id, &err) {
                PaymentError::NetworkRegistrationRequired(chain_id) => {
                    tracing::info!(chain_id = %chain_id, "Registering network with wallet");
                    self.provider
                        .add_chain(target)
                        .await
                        .map_err(|e| PaymentError::NetworkSwitchFailed(e.to_string()))?;
                    self.notifier.notify(
                        &format!("{} added to wallet", target.chain_name),
                        Severity::Success,
                        DEFAULT_NOTICE,
                    );
                    self.provider
                        .switch_chain(chain_id)
                        .await
                        .map_err(|e| PaymentError::NetworkSwitchFailed(e.to_string()))?;
                }
                other => return Err(other),
            }
        }

        self.state.borrow_mut().network = Some(target.chain_id);
        tracing::info!(chain_id = %target.chain_id, "Switched wallet network");
        self.notifier.notify(
            &format!("Switched to {}", target.chain_name),
            Severity::Success,
            DEFAULT_NOTICE,
        );
        Ok(())
    }
}
