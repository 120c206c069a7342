//! Connection Badge Component
//!
//! Push channel status, who else is online, and a manual reconnect once
//! automatic retries have given up.

use board_sync::ConnectionState;
use leptos::prelude::*;

use crate::context::use_app_context;
use crate::store::{use_app_store, AppStateStoreFields};

#[component]
pub fn ConnectionBadge() -> impl IntoView {
    let ctx = use_app_context();
    let store = use_app_store();

    let state = move || store.connection().get();
    let online = move || store.presence().with(|presence| presence.len());

    view! {
        <div class=move || format!("connection-badge {}", state().as_str())>
            <span class="connection-state">{move || state().as_str()}</span>
            <span class="presence-count">
                {move || match online() {
                    0 => String::new(),
                    n => format!("{n} online"),
                }}
            </span>
            <Show when=move || state() == ConnectionState::Disconnected>
                <button class="reconnect-btn" on:click=move |_| ctx.realtime().reconnect()>
                    "Reconnect"
                </button>
            </Show>
        </div>
    }
}
