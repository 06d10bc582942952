//! ClubConnect Web Frontend
//!
//! Leptos-based WASM pricing page that pays for plans with a browser wallet.
//!
//! Firestore settings are baked in at build time from `FIREBASE_PROJECT_ID`,
//! `FIREBASE_API_KEY` and `FIRESTORE_BASE_URL`. The page's auth script feeds
//! the signed-in user through [`set_signed_in_user`].

mod app;
mod components;
mod notify;
mod wallet;

use std::rc::Rc;

use club_payments::{FirestoreConfig, FirestoreRecorder, SignedInUser};
use wasm_bindgen::prelude::*;

pub use app::App;
pub use notify::{Toast, ToastChannel};
pub use wallet::BrowserWallet;

thread_local! {
    static RECORDER: Rc<FirestoreRecorder> = Rc::new(FirestoreRecorder::new(firestore_config()));
}

fn firestore_config() -> FirestoreConfig {
    let mut config = FirestoreConfig::new(option_env!("FIREBASE_PROJECT_ID").unwrap_or("clubconnect"));
    config.api_key = option_env!("FIREBASE_API_KEY").map(str::to_string);
    if let Some(base_url) = option_env!("FIRESTORE_BASE_URL") {
        config.base_url = base_url.into();
    }
    config
}

pub(crate) fn recorder() -> Rc<FirestoreRecorder> {
    RECORDER.with(Rc::clone)
}

/// Called by the auth script once a user signs in or refreshes their token
#[wasm_bindgen]
pub fn set_signed_in_user(uid: String, id_token: Option<String>) {
    let user = match id_token {
        Some(token) => SignedInUser::new(uid).with_id_token(token),
        None => SignedInUser::new(uid),
    };
    recorder().sign_in(user);
}

#[wasm_bindgen]
pub fn sign_out_user() {
    recorder().sign_out();
}

/// WASM entry point
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    leptos::mount::mount_to_body(App);
}
