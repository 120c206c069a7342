//! Card Item Component
//!
//! One card in a list column: drag handle, pin toggle, delete, and who else
//! is looking at it.

use board_sync::{Card, Entity};
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_dragdrop::{make_on_mousedown, DndSignals};

use crate::components::DeleteConfirmButton;
use crate::context::use_app_context;
use crate::store::{use_app_store, AppStateStoreFields};

#[component]
pub fn CardItem(card: Card, dnd: DndSignals) -> impl IntoView {
    let ctx = use_app_context();
    let store = use_app_store();

    let id = card.id.clone();
    let pending = card.is_temp();
    let pinned = card.pinned;

    let on_mousedown = make_on_mousedown(dnd, id.to_string());

    let drag_id = id.to_string();
    let item_class = move || {
        let mut c = String::from("card-item");
        if pinned {
            c.push_str(" pinned");
        }
        if pending {
            c.push_str(" pending");
        }
        if dnd.is_dragging(&drag_id) {
            c.push_str(" dragging");
        }
        c
    };

    let open_id = id.clone();
    let on_click = move |_| {
        // The mouseup that ended a drag also fires click
        if dnd.drag_just_ended_read.get_untracked() {
            return;
        }
        ctx.set_open_card(Some(open_id.clone()));
    };

    let pin_id = id.clone();
    let on_toggle_pin = move |ev: web_sys::MouseEvent| {
        ev.stop_propagation();
        let engine = ctx.engine();
        let id = pin_id.clone();
        spawn_local(async move {
            if let Err(err) = engine.toggle_pin(&id).await {
                log::warn!("toggle pin {id}: {err}");
            }
        });
    };

    let delete_id = id.clone();
    let on_delete = Callback::new(move |_| {
        let engine = ctx.engine();
        let id = delete_id.clone();
        spawn_local(async move {
            if let Err(err) = engine.delete_card(&id).await {
                log::warn!("delete card {id}: {err}");
            }
        });
    });

    let viewer_id = id.clone();
    let viewers = move || {
        store.presence().with(|presence| {
            presence
                .values()
                .filter(|user| user.viewing_card.as_ref() == Some(&viewer_id))
                .count()
        })
    };

    view! {
        <div class=item_class on:mousedown=on_mousedown on:click=on_click>
            <span class="card-title">{card.title.clone()}</span>
            {(!card.labels.is_empty()).then(|| view! {
                <span class="card-labels">
                    {card.labels.iter().map(|label| view! { <span class="card-label">{label.clone()}</span> }).collect_view()}
                </span>
            })}
            <span class="card-viewers">
                {move || match viewers() {
                    0 => String::new(),
                    n => format!("👁 {n}"),
                }}
            </span>
            <button
                class=if pinned { "pin-btn active" } else { "pin-btn" }
                title=if pinned { "Unpin" } else { "Pin" }
                disabled=pending
                on:click=on_toggle_pin
            >
                "📌"
            </button>
            <Show when=move || !pending>
                <DeleteConfirmButton button_class="delete-btn" on_confirm=on_delete />
            </Show>
        </div>
    }
}
