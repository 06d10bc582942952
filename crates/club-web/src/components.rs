//! UI Components

use club_payments::{CatalogEntry, PaymentStatus, PlanSelection};
use leptos::prelude::*;

use crate::notify::Toast;

/// Price card for one catalog plan; the button is supplied by the caller
#[component]
pub fn PlanCard(entry: &'static CatalogEntry, children: Children) -> impl IntoView {
    view! {
        <div class="plan" data-plan-id=entry.plan_id>
            <h2>{entry.name}</h2>
            <div class="price">{entry.amount}<span>" ETH"</span></div>
            {children()}
        </div>
    }
}

/// Plan name and amount shown at the top of the payment modal
#[component]
pub fn PlanSummary(selection: PlanSelection) -> impl IntoView {
    view! {
        <div class="plan-summary">
            <h2 class="plan-name">{selection.plan_name}</h2>
            <p class="plan-amount">{selection.amount}" ETH"</p>
        </div>
    }
}

#[component]
pub fn StatusLine(status: RwSignal<PaymentStatus>) -> impl IntoView {
    let class = move || {
        let status = status.get();
        if status.is_error() {
            "status status-error"
        } else if status.is_success() {
            "status status-success"
        } else {
            "status"
        }
    };

    view! { <p class=class>{move || status.get().to_string()}</p> }
}

#[component]
pub fn ToastList(toasts: RwSignal<Vec<Toast>>) -> impl IntoView {
    view! {
        <div class="toasts">
            <For
                each=move || toasts.get()
                key=|toast| toast.id
                children=|toast| {
                    let class = format!("toast toast-{}", toast.severity.as_str());
                    view! { <div class=class>{toast.message}</div> }
                }
            />
        </div>
    }
}
