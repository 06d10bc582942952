//! Main App Component

use std::rc::Rc;

use alloy_primitives::Address;
use club_payments::{
    CATALOG, NotificationChannel, PaymentFlow, PlanSelection, WalletSession,
};
use leptos::prelude::*;

use crate::components::{PlanCard, PlanSummary, StatusLine, ToastList};
use crate::notify::ToastChannel;
use crate::wallet::BrowserWallet;

/// Pricing page plus the payment modal
#[component]
pub fn App() -> impl IntoView {
    let channel = ToastChannel::new();
    let notifier: Rc<dyn NotificationChannel> = Rc::new(channel);
    let session = WalletSession::new(Rc::new(BrowserWallet), notifier.clone());
    let flow = StoredValue::new_local(Rc::new(PaymentFlow::new(
        session,
        crate::recorder(),
        notifier,
    )));

    let selected = RwSignal::new(None::<PlanSelection>);
    let account = RwSignal::new(None::<Address>);
    let busy = RwSignal::new(false);

    let open = move |selection: PlanSelection| {
        flow.with_value(|flow| {
            if flow.select(selection.clone()).is_ok() {
                selected.set(Some(selection));
            }
        });
    };

    let close = move |_| {
        flow.with_value(|flow| flow.clear_selection());
        selected.set(None);
    };

    let connect = move |_| {
        let flow = flow.get_value();
        busy.set(true);
        leptos::task::spawn_local(async move {
            // failures are already shown through the toast channel
            flow.connect().await.ok();
            account.set(flow.session().current_account());
            busy.set(false);
        });
    };

    let pay = move |_| {
        let flow = flow.get_value();
        busy.set(true);
        leptos::task::spawn_local(async move {
            if flow.pay().await.is_ok() {
                selected.set(None);
            }
            account.set(flow.session().current_account());
            busy.set(false);
        });
    };

    let plans = CATALOG
        .iter()
        .map(|entry| {
            let selection =
                PlanSelection::from_control(entry.plan_id, Some(entry.name), Some(entry.amount));
            view! {
                <PlanCard entry=entry>
                    <button class="btn btn-primary" on:click=move |_| open(selection.clone())>
                        "Pay with MetaMask"
                    </button>
                </PlanCard>
            }
        })
        .collect_view();

    view! {
        <main class="app">
            <div class="pricing">
                <h1>"Membership & Services"</h1>
                <div class="plans">{plans}</div>
            </div>

            {move || {
                selected
                    .get()
                    .map(|selection| {
                        view! {
                            <div class="modal-backdrop">
                                <div class="modal">
                                    <button class="modal-close" on:click=close>"×"</button>
                                    <PlanSummary selection=selection />
                                    <StatusLine status=channel.status() />
                                    <button
                                        class="btn"
                                        disabled=move || busy.get()
                                        on:click=connect
                                    >
                                        {move || match account.get() {
                                            Some(_) => "Wallet connected",
                                            None => "Connect Wallet",
                                        }}
                                    </button>
                                    <button
                                        class="btn btn-primary"
                                        disabled=move || account.get().is_none() || busy.get()
                                        on:click=pay
                                    >
                                        "Pay Now"
                                    </button>
                                </div>
                            </div>
                        }
                    })
            }}

            <ToastList toasts=channel.toasts() />
        </main>
    }
}
