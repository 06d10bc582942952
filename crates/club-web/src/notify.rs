//! Toast notifications backed by Leptos signals

use std::time::Duration;

use async_trait::async_trait;
use club_payments::{NotificationChannel, PaymentStatus, Severity};
use leptos::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Toast {
    pub id: u64,
    pub message: String,
    pub severity: Severity,
}

/// Notification channel rendered by `ToastList` and `StatusLine`
#[derive(Clone, Copy)]
pub struct ToastChannel {
    toasts: RwSignal<Vec<Toast>>,
    status: RwSignal<PaymentStatus>,
    next_id: StoredValue<u64>,
}

impl ToastChannel {
    pub fn new() -> Self {
        Self {
            toasts: RwSignal::new(Vec::new()),
            status: RwSignal::new(PaymentStatus::NotConnected),
            next_id: StoredValue::new(0),
        }
    }

    pub const fn toasts(&self) -> RwSignal<Vec<Toast>> {
        self.toasts
    }

    pub const fn status(&self) -> RwSignal<PaymentStatus> {
        self.status
    }

    pub fn dismiss(&self, id: u64) {
        self.toasts.update(|toasts| toasts.retain(|toast| toast.id != id));
    }
}

impl Default for ToastChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait(?Send)]
impl NotificationChannel for ToastChannel {
    fn notify(&self, message: &str, severity: Severity, duration: Duration) {
        let id = self.next_id.get_value();
        self.next_id.set_value(id + 1);

        self.toasts.update(|toasts| {
            toasts.push(Toast {
                id,
                message: message.to_string(),
                severity,
            });
        });

        let channel = *self;
        set_timeout(move || channel.dismiss(id), duration);
    }

    async fn confirm(&self, message: &str) -> bool {
        window().confirm_with_message(message).unwrap_or(false)
    }

    fn set_status(&self, status: &PaymentStatus) {
        self.status.set(status.clone());
    }
}
