//! Notification Channel
//!
//! Transient user feedback consumed by the wallet flow: toasts, yes/no
//! prompts and the status indicator. Rendering belongs to the front end.

use std::cell::RefCell;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::status::PaymentStatus;

/// How long a regular notice stays visible
pub const DEFAULT_NOTICE: Duration = Duration::from_millis(4000);

/// Notices carrying instructions the user needs time to read
pub const LONG_NOTICE: Duration = Duration::from_millis(6000);

/// Notice severity
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Error,
    Warning,
    Info,
}

impl Severity {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

#[async_trait(?Send)]
pub trait NotificationChannel {
    /// Show a transient notice
    fn notify(&self, message: &str, severity: Severity, duration: Duration);

    /// Ask a yes/no question; dismissing the prompt answers `false`
    async fn confirm(&self, message: &str) -> bool;

    /// Update the status indicator
    fn set_status(&self, status: &PaymentStatus);
}

/// Headless channel that routes everything to `tracing`
pub struct TracingNotifier {
    confirm_answer: bool,
    status: RefCell<PaymentStatus>,
}

impl Default for TracingNotifier {
    fn default() -> Self {
        Self::new(false)
    }
}

impl TracingNotifier {
    /// `confirm_answer` is returned for every prompt
    pub const fn new(confirm_answer: bool) -> Self {
        Self {
            confirm_answer,
            status: RefCell::new(PaymentStatus::NotConnected),
        }
    }

    /// Last status set
    pub fn status(&self) -> PaymentStatus {
        self.status.borrow().clone()
    }
}

#[async_trait(?Send)]
impl NotificationChannel for TracingNotifier {
    fn notify(&self, message: &str, severity: Severity, duration: Duration) {
        let duration_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        match severity {
            Severity::Error => tracing::error!(duration_ms, "{message}"),
            Severity::Warning => tracing::warn!(duration_ms, "{message}"),
            Severity::Success | Severity::Info => {
                tracing::info!(severity = severity.as_str(), duration_ms, "{message}");
            }
        }
    }

    async fn confirm(&self, message: &str) -> bool {
        tracing::info!(answer = self.confirm_answer, "Prompt: {message}");
        self.confirm_answer
    }

    fn set_status(&self, status: &PaymentStatus) {
        tracing::debug!(status = %status, "Status updated");
        *self.status.borrow_mut() = status.clone();
    }
}
