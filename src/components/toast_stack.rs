//! Toast Stack Component
//!
//! Failure messages raised by the engine, one per failed remote call.

use gloo_timers::future::TimeoutFuture;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::store::{store_dismiss_toast, use_app_store, AppStateStoreFields, Toast};

const TOAST_TTL_MS: u32 = 6_000;

#[component]
pub fn ToastStack() -> impl IntoView {
    let store = use_app_store();

    view! {
        <div class="toast-stack">
            <For
                each=move || store.toasts().get()
                key=|toast| toast.id
                children=move |toast| view! { <ToastItem toast=toast /> }
            />
        </div>
    }
}

#[component]
fn ToastItem(toast: Toast) -> impl IntoView {
    let store = use_app_store();
    let id = toast.id;

    spawn_local(async move {
        TimeoutFuture::new(TOAST_TTL_MS).await;
        store_dismiss_toast(&store, id);
    });

    view! {
        <div class="toast error" role="alert">
            <span class="toast-message">{toast.message}</span>
            <button class="toast-close" on:click=move |_| store_dismiss_toast(&store, id)>"×"</button>
        </div>
    }
}
