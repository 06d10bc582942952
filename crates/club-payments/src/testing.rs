//! Scripted doubles for the wallet and notification seams.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use alloy_primitives::{Address, address};
use async_trait::async_trait;
use serde_json::{Value, json};

use crate::notify::{NotificationChannel, Severity};
use crate::provider::{ProviderError, RpcRequest, WalletProvider, methods};
use crate::status::PaymentStatus;

pub const ACCOUNT: Address = address!("abc0000000000000000000000000000000001234");

pub const TX_HASH: &str = "0x9fc76417374aa880d4449a1f7f31ec597f00b1f6f3dd2d66f4c9c6c445836d8b";

type Reply = Result<Value, ProviderError>;

/// Wallet that answers from per-method scripts and records every request.
///
/// Each method has a queue of replies; the last reply repeats once the queue
/// is down to one. Every request yields to the scheduler first so concurrent
/// callers interleave.
pub struct MockWallet {
    available: Cell<bool>,
    replies: RefCell<HashMap<&'static str, VecDeque<Reply>>>,
    calls: RefCell<Vec<RpcRequest>>,
}

impl MockWallet {
    /// Wallet on Sepolia with one account that accepts everything
    pub fn happy() -> Self {
        Self::empty()
            .reply(methods::CHAIN_ID, Ok(json!("0xaa36a7")))
            .reply(methods::REQUEST_ACCOUNTS, Ok(json!([ACCOUNT])))
            .reply(methods::SWITCH_CHAIN, Ok(Value::Null))
            .reply(methods::ADD_CHAIN, Ok(Value::Null))
            .reply(methods::SEND_TRANSACTION, Ok(json!(TX_HASH)))
    }

    pub fn empty() -> Self {
        Self {
            available: Cell::new(true),
            replies: RefCell::new(HashMap::new()),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn unavailable() -> Self {
        let wallet = Self::happy();
        wallet.available.set(false);
        wallet
    }

    /// Append a reply to a method's queue
    #[must_use]
    pub fn reply(self, method: &'static str, reply: Reply) -> Self {
        self.replies
            .borrow_mut()
            .entry(method)
            .or_default()
            .push_back(reply);
        self
    }

    /// Replace all replies for a method
    #[must_use]
    pub fn script(self, method: &'static str, replies: Vec<Reply>) -> Self {
        self.replies
            .borrow_mut()
            .insert(method, replies.into_iter().collect());
        self
    }

    pub fn set_available(&self, available: bool) {
        self.available.set(available);
    }

    pub fn calls(&self) -> Vec<RpcRequest> {
        self.calls.borrow().clone()
    }

    pub fn methods(&self) -> Vec<String> {
        self.calls.borrow().iter().map(|c| c.method.clone()).collect()
    }

    pub fn count(&self, method: &str) -> usize {
        self.calls.borrow().iter().filter(|c| c.method == method).count()
    }
}

#[async_trait(?Send)]
impl WalletProvider for MockWallet {
    fn is_available(&self) -> bool {
        self.available.get()
    }

    async fn request(&self, request: RpcRequest) -> Result<Value, ProviderError> {
        self.calls.borrow_mut().push(request.clone());
        tokio::task::yield_now().await;

        let mut replies = self.replies.borrow_mut();
        let queue = replies
            .get_mut(request.method.as_str())
            .ok_or_else(|| ProviderError::new(-32601, "method not scripted"))?;
        if queue.len() > 1 {
            queue.pop_front().unwrap_or_else(|| Ok(Value::Null))
        } else {
            queue.front().cloned().unwrap_or_else(|| Ok(Value::Null))
        }
    }
}

pub fn user_rejected() -> ProviderError {
    ProviderError::new(ProviderError::USER_REJECTED, "User rejected the request.")
}

pub fn unrecognized_chain() -> ProviderError {
    ProviderError::new(ProviderError::UNRECOGNIZED_CHAIN, "Unrecognized chain ID")
}

/// Notification channel that remembers everything shown
pub struct RecordingNotifier {
    confirm_answer: bool,
    pub notices: RefCell<Vec<(String, Severity, Duration)>>,
    pub prompts: RefCell<Vec<String>>,
    pub statuses: RefCell<Vec<PaymentStatus>>,
}

impl RecordingNotifier {
    pub fn answering(confirm_answer: bool) -> Self {
        Self {
            confirm_answer,
            notices: RefCell::new(Vec::new()),
            prompts: RefCell::new(Vec::new()),
            statuses: RefCell::new(Vec::new()),
        }
    }

    pub fn severities(&self) -> Vec<Severity> {
        self.notices.borrow().iter().map(|(_, s, _)| *s).collect()
    }

    pub fn messages(&self) -> Vec<String> {
        self.notices.borrow().iter().map(|(m, _, _)| m.clone()).collect()
    }

    pub fn last_status(&self) -> Option<PaymentStatus> {
        self.statuses.borrow().last().cloned()
    }
}

#[async_trait(?Send)]
impl NotificationChannel for RecordingNotifier {
    fn notify(&self, message: &str, severity: Severity, duration: Duration) {
        self.notices
            .borrow_mut()
            .push((message.to_string(), severity, duration));
    }

    async fn confirm(&self, message: &str) -> bool {
        self.prompts.borrow_mut().push(message.to_string());
        self.confirm_answer
    }

    fn set_status(&self, status: &PaymentStatus) {
        self.statuses.borrow_mut().push(status.clone());
    }
}
