//! Payment Flow
//!
//! Plan selection → wallet connection → transfer submission → record write,
//! strictly in that order. Each step's output gates the next.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::amount;
use crate::error::{PaymentError, Result};
use crate::network::RECEIVING_ADDRESS;
use crate::notify::{DEFAULT_NOTICE, LONG_NOTICE, NotificationChannel, Severity};
use crate::plan::PlanSelection;
use crate::provider::{TransactionRequest, TxHash};
use crate::recorder::PaymentRecorder;
use crate::session::WalletSession;
use crate::status::PaymentStatus;

/// Shown after submission; nothing tracks on-chain confirmation
pub const PAYMENT_SENT_NOTICE: &str =
    "Payment transaction sent! Your account will be updated once confirmed on the blockchain.";

/// Returned by the wallet on submission. Submitted, not settled.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
    pub tx_hash: TxHash,
}

/// Clears the in-flight flag when the payment attempt ends
struct InFlight<'a>(&'a Cell<bool>);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a Cell<bool>) -> Option<Self> {
        if flag.replace(true) {
            None
        } else {
            Some(Self(flag))
        }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

pub struct PaymentFlow {
    session: WalletSession,
    recorder: Rc<dyn PaymentRecorder>,
    notifier: Rc<dyn NotificationChannel>,
    selection: RefCell<Option<PlanSelection>>,
    in_flight: Cell<bool>,
}

impl PaymentFlow {
    pub fn new(
        session: WalletSession,
        recorder: Rc<dyn PaymentRecorder>,
        notifier: Rc<dyn NotificationChannel>,
    ) -> Self {
        Self {
            session,
            recorder,
            notifier,
            selection: RefCell::new(None),
            in_flight: Cell::new(false),
        }
    }

    pub const fn session(&self) -> &WalletSession {
        &self.session
    }

    /// Make `plan_id` the active selection, replacing any previous one
    pub fn select_plan(&self, plan_id: &str, plan_name: &str, amount: &str) -> Result<()> {
        self.select(PlanSelection::new(plan_id, plan_name, amount))
    }

    pub fn select(&self, selection: PlanSelection) -> Result<()> {
        amount::validate(&selection.amount)?;
        tracing::debug!(plan_id = %selection.plan_id, amount = %selection.amount, "Plan selected");
        *self.selection.borrow_mut() = Some(selection);
        Ok(())
    }

    pub fn selection(&self) -> Option<PlanSelection> {
        self.selection.borrow().clone()
    }

    pub fn clear_selection(&self) {
        self.selection.borrow_mut().take();
    }

    /// Whether a payment attempt is outstanding
    pub fn is_paying(&self) -> bool {
        self.in_flight.get()
    }

    /// Connect the wallet ahead of paying
    pub async fn connect(&self) -> Result<Address> {
        self.session.connect().await
    }

    /// Pay for the active selection.
    ///
    /// Every failure has been reported through the notification channel by
    /// the time this returns. The selection survives a failed attempt so the
    /// user can retry.
    pub async fn pay(&self) -> Result<TransactionReceipt> {
        let Some(_guard) = InFlight::acquire(&self.in_flight) else {
            tracing::warn!("Payment already in flight, ignoring request");
            return Err(self.warn(PaymentError::PaymentInProgress));
        };

        let Some(selection) = self.selection() else {
            return Err(self.warn(PaymentError::NoPlanSelected));
        };

        let account = match self.session.current_account() {
            Some(account) => account,
            // connect() has already surfaced its own failure
            None => self.session.connect().await?,
        };

        if !self.session.provider().is_available() {
            return Err(self.fail(PaymentError::ProviderUnavailable));
        }

        self.submit(&selection, account).await
    }

    async fn submit(&self, selection: &PlanSelection, from: Address) -> Result<TransactionReceipt> {
        let value = amount::to_minor_units_hex(&selection.amount).map_err(|e| self.fail(e))?;
        let tx = TransactionRequest {
            from,
            to: RECEIVING_ADDRESS,
            value,
        };

        tracing::info!(
            plan_id = %selection.plan_id,
            amount = %selection.amount,
            from = %from,
            "Submitting payment"
        );
        self.notifier.set_status(&PaymentStatus::AwaitingConfirmation);

        let tx_hash = self
            .session
            .provider()
            .send_transaction(&tx)
            .await
            .map_err(|err| {
                tracing::warn!(code = err.code, error = %err, "Payment transaction failed");
                self.fail(PaymentError::SubmissionRejectedOrFailed(err.to_string()))
            })?;

        tracing::info!(tx_hash = %tx_hash, plan_id = %selection.plan_id, "Payment submitted");
        self.notifier
            .set_status(&PaymentStatus::Submitted(tx_hash.clone()));

        // TODO: queue failed writes for retry; today a submitted but
        // unrecorded payment needs manual reconciliation.
        if let Err(err) = self.recorder.record(&selection.plan_id, &tx_hash).await {
            tracing::error!(
                tx_hash = %tx_hash,
                plan_id = %selection.plan_id,
                error = %err,
                "Payment submitted but not recorded"
            );
        }

        self.notifier
            .notify(PAYMENT_SENT_NOTICE, Severity::Success, LONG_NOTICE);
        self.clear_if_current(selection);

        Ok(TransactionReceipt { tx_hash })
    }

    /// Clear the selection unless the user picked another plan mid-payment
    fn clear_if_current(&self, paid: &PlanSelection) {
        let mut selection = self.selection.borrow_mut();
        if selection.as_ref() == Some(paid) {
            selection.take();
        }
    }

    fn warn(&self, err: PaymentError) -> PaymentError {
        self.notifier
            .notify(err.user_message(), Severity::Warning, DEFAULT_NOTICE);
        err
    }

    fn fail(&self, err: PaymentError) -> PaymentError {
        self.notifier.set_status(&PaymentStatus::Failed);
        self.notifier
            .notify(err.user_message(), Severity::Error, DEFAULT_NOTICE);
        err
    }
}
