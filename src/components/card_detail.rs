//! Card Detail Component
//!
//! Side panel for the open card. Closes itself when the card disappears
//! (the app clears `open_card` on `OpenCardRemoved`).

use board_sync::{Card, CardPatch};
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::context::use_app_context;
use crate::store::{store_find_card, use_app_store, AppStateStoreFields};

#[component]
pub fn CardDetail() -> impl IntoView {
    let store = use_app_store();

    // Keyed on the open id only, so board updates do not wipe unsaved edits
    move || {
        store
            .open_card()
            .get()
            .and_then(|id| untrack(|| store_find_card(&store, &id)))
            .map(|card| view! { <CardEditor card=card /> })
    }
}

#[component]
fn CardEditor(card: Card) -> impl IntoView {
    let ctx = use_app_context();

    let (title, set_title) = signal(card.title.clone());
    let (description, set_description) = signal(card.description.clone().unwrap_or_default());
    let id = card.id.clone();

    let on_save = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let text = title.get_untracked().trim().to_string();
        if text.is_empty() {
            return;
        }
        let body = description.get_untracked();
        let patch = CardPatch {
            title: Some(text),
            description: Some((!body.trim().is_empty()).then_some(body)),
            ..Default::default()
        };
        let engine = ctx.engine();
        let id = id.clone();
        spawn_local(async move {
            if let Err(err) = engine.update_card(&id, patch).await {
                log::warn!("update card {id}: {err}");
            }
        });
    };

    view! {
        <aside class="card-detail">
            <form on:submit=on_save>
                <input
                    type="text"
                    class="card-detail-title"
                    prop:value=move || title.get()
                    on:input=move |ev| set_title.set(event_target_value(&ev))
                />
                <textarea
                    class="card-detail-description"
                    placeholder="Description"
                    prop:value=move || description.get()
                    on:input=move |ev| set_description.set(event_target_value(&ev))
                />
                {(!card.assignees.is_empty()).then(|| view! {
                    <p class="card-detail-assignees">{card.assignees.join(", ")}</p>
                })}
                <div class="card-detail-actions">
                    <button type="submit">"Save"</button>
                    <button type="button" on:click=move |_| ctx.set_open_card(None)>"Close"</button>
                </div>
            </form>
        </aside>
    }
}
