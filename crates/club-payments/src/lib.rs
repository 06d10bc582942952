//! # club-payments
//!
//! Wallet payments for ClubConnect plans.
//!
//! A member picks a plan, connects a browser wallet, approves a native
//! currency transfer to the club's receiving address, and the submitted
//! transaction hash is written against their account.
//!
//! ```text
//! ┌──────────────┐     ┌───────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ select_plan  │────▶│   connect     │────▶│    submit    │────▶│    record    │
//! │ (PlanSelect) │     │ (WalletSess.) │     │ (send tx)    │     │ (Firestore)  │
//! └──────────────┘     └───────────────┘     └──────────────┘     └──────────────┘
//!                             │
//!                             ▼
//!                      wrong network? ──▶ switch / add Sepolia
//! ```
//!
//! "Success" means the wallet accepted and broadcast the transaction. Nothing
//! here waits for on-chain confirmation.
//!
//! The wallet and the notification surface are traits
//! ([`WalletProvider`], [`NotificationChannel`]) so the flow runs the same in
//! the browser and under test. Everything is single-threaded: futures are not
//! `Send` and shared state lives in `Cell`/`RefCell`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::rc::Rc;
//! use club_payments::{FirestoreRecorder, PaymentFlow, TracingNotifier, WalletSession};
//!
//! let notifier = Rc::new(TracingNotifier::default());
//! let session = WalletSession::new(Rc::new(my_wallet), notifier.clone());
//! let flow = PaymentFlow::new(session, Rc::new(FirestoreRecorder::from_env()?), notifier);
//!
//! flow.select_plan("coachHiring", "Coach Hiring", "0.02")?;
//! let receipt = flow.pay().await?;
//! println!("submitted {}", receipt.tx_hash);
//! ```

pub mod amount;
pub mod error;
pub mod firestore;
pub mod flow;
pub mod network;
pub mod notify;
pub mod plan;
pub mod provider;
pub mod recorder;
pub mod session;
pub mod status;

#[cfg(test)]
mod testing;

pub use error::{PaymentError, Result};
pub use firestore::{FirestoreConfig, FirestoreRecorder};
pub use flow::{PaymentFlow, TransactionReceipt};
pub use network::{ChainId, NetworkDefinition, RECEIVING_ADDRESS, SEPOLIA_CHAIN_ID};
pub use notify::{NotificationChannel, Severity, TracingNotifier};
pub use plan::{CATALOG, CatalogEntry, PlanSelection};
pub use provider::{ProviderError, RpcRequest, TransactionRequest, TxHash, WalletProvider};
pub use recorder::{MemoryPaymentRecorder, PaymentRecord, PaymentRecorder, SignedInUser};
pub use session::{ConnectionState, WalletSession};
pub use status::PaymentStatus;
