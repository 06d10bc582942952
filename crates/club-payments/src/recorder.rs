//! Payment Recording
//!
//! Persists "payment submitted" against the signed-in user's record. The
//! write happens once per successful submission; later on-chain confirmation
//! or failure is not reconciled.

use std::cell::RefCell;
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{PaymentError, Result};
use crate::provider::TxHash;

/// Signed-in user of the document store
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedInUser {
    pub uid: String,

    /// Bearer token for the store's REST API
    #[serde(default)]
    pub id_token: Option<String>,
}

impl SignedInUser {
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            id_token: None,
        }
    }

    #[must_use]
    pub fn with_id_token(mut self, token: impl Into<String>) -> Self {
        self.id_token = Some(token.into());
        self
    }
}

/// Payment fields written to the user's record
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    #[serde(skip)]
    pub user_id: String,
    pub registration_paid: bool,
    pub registration_tx_hash: TxHash,
    pub registration_paid_at: DateTime<Utc>,
}

impl PaymentRecord {
    pub fn paid(user_id: impl Into<String>, tx_hash: TxHash) -> Self {
        Self {
            user_id: user_id.into(),
            registration_paid: true,
            registration_tx_hash: tx_hash,
            registration_paid_at: Utc::now(),
        }
    }
}

/// Remote store client
#[async_trait(?Send)]
pub trait PaymentRecorder {
    /// Record a submitted payment for the signed-in user
    async fn record(&self, plan_id: &str, tx_hash: &TxHash) -> Result<PaymentRecord>;
}

/// In-memory recorder (for development and tests)
#[derive(Default)]
pub struct MemoryPaymentRecorder {
    user: RefCell<Option<SignedInUser>>,
    records: RefCell<HashMap<String, PaymentRecord>>,
    writes: RefCell<Vec<(String, TxHash)>>,
}

impl MemoryPaymentRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorder with a user already signed in
    pub fn signed_in(uid: impl Into<String>) -> Self {
        let recorder = Self::new();
        recorder.sign_in(SignedInUser::new(uid));
        recorder
    }

    pub fn sign_in(&self, user: SignedInUser) {
        *self.user.borrow_mut() = Some(user);
    }

    pub fn sign_out(&self) {
        self.user.borrow_mut().take();
    }

    pub fn get(&self, uid: &str) -> Option<PaymentRecord> {
        self.records.borrow().get(uid).cloned()
    }

    /// Every `(plan_id, tx_hash)` write attempt that reached the store
    pub fn writes(&self) -> Vec<(String, TxHash)> {
        self.writes.borrow().clone()
    }
}

#[async_trait(?Send)]
impl PaymentRecorder for MemoryPaymentRecorder {
    async fn record(&self, plan_id: &str, tx_hash: &TxHash) -> Result<PaymentRecord> {
        let uid = self
            .user
            .borrow()
            .as_ref()
            .map(|user| user.uid.clone())
            .ok_or(PaymentError::NotAuthenticated)?;

        let record = PaymentRecord::paid(&uid, tx_hash.clone());
        self.writes
            .borrow_mut()
            .push((plan_id.to_string(), tx_hash.clone()));
        self.records.borrow_mut().insert(uid, record.clone());

        tracing::info!(plan_id, tx_hash = %tx_hash, "Payment status recorded");
        Ok(record)
    }
}
