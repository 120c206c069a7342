//! New Card / New List Forms
//!
//! The input clears as soon as the optimistic entity appears.

use board_sync::EntityId;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::context::use_app_context;

/// Add-card input at the bottom of a list column
#[component]
pub fn NewCardForm(list_id: EntityId) -> impl IntoView {
    let ctx = use_app_context();
    let (title, set_title) = signal(String::new());

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let text = title.get_untracked().trim().to_string();
        if text.is_empty() {
            return;
        }
        set_title.set(String::new());
        let engine = ctx.engine();
        let list_id = list_id.clone();
        spawn_local(async move {
            if let Err(err) = engine.create_card(&list_id, text).await {
                log::warn!("create card in {list_id}: {err}");
            }
        });
    };

    view! {
        <form class="new-card-form" on:submit=on_submit>
            <input
                type="text"
                placeholder="Add a card..."
                prop:value=move || title.get()
                on:input=move |ev| set_title.set(event_target_value(&ev))
            />
            <button type="submit">"Add"</button>
        </form>
    }
}

/// Add-list input at the end of the board
#[component]
pub fn NewListForm() -> impl IntoView {
    let ctx = use_app_context();
    let (title, set_title) = signal(String::new());

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let text = title.get_untracked().trim().to_string();
        if text.is_empty() {
            return;
        }
        set_title.set(String::new());
        let engine = ctx.engine();
        spawn_local(async move {
            if let Err(err) = engine.create_list(text).await {
                log::warn!("create list: {err}");
            }
        });
    };

    view! {
        <form class="new-list-form" on:submit=on_submit>
            <input
                type="text"
                placeholder="Add a list..."
                prop:value=move || title.get()
                on:input=move |ev| set_title.set(event_target_value(&ev))
            />
            <button type="submit">"+"</button>
        </form>
    }
}
