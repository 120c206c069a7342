//! List Column Component
//!
//! A list header (rename, archive, delete, drag handle) over its cards with
//! drop zones between them.

use board_sync::EntityId;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_dragdrop::*;

use crate::components::{CardItem, DeleteConfirmButton, NewCardForm};
use crate::context::use_app_context;
use crate::store::{use_app_store, AppStateStoreFields};

#[component]
pub fn ListColumn(list_id: EntityId, card_dnd: DndSignals, list_dnd: DndSignals) -> impl IntoView {
    let ctx = use_app_context();
    let store = use_app_store();

    let lookup_id = list_id.clone();
    let column = Memo::new(move |_| {
        store
            .columns()
            .with(|columns| columns.iter().find(|column| column.list.id == lookup_id).cloned())
    });
    let title = move || column.with(|column| column.as_ref().map(|c| c.list.title.clone()).unwrap_or_default());
    let pending = list_id.is_temp();

    // Rename
    let (editing, set_editing) = signal(false);
    let (draft, set_draft) = signal(String::new());
    let rename_id = list_id.clone();
    let on_rename = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        set_editing.set(false);
        let text = draft.get_untracked().trim().to_string();
        if text.is_empty() || text == title() {
            return;
        }
        let engine = ctx.engine();
        let id = rename_id.clone();
        spawn_local(async move {
            if let Err(err) = engine.rename_list(&id, text).await {
                log::warn!("rename list {id}: {err}");
            }
        });
    };

    let archive_id = list_id.clone();
    let on_archive = move |_| {
        let engine = ctx.engine();
        let id = archive_id.clone();
        spawn_local(async move {
            if let Err(err) = engine.archive_list(&id).await {
                log::warn!("archive list {id}: {err}");
            }
        });
    };

    let delete_id = list_id.clone();
    let on_delete = Callback::new(move |_| {
        let engine = ctx.engine();
        let id = delete_id.clone();
        spawn_local(async move {
            if let Err(err) = engine.delete_list(&id).await {
                log::warn!("delete list {id}: {err}");
            }
        });
    });

    let container = list_id.to_string();
    let is_drop_target = {
        let container = container.clone();
        move || card_dnd.is_target(&DropTarget::Container(container.clone()))
    };
    let column_class = {
        let container = container.clone();
        move || {
            let mut c = String::from("list-column");
            if pending {
                c.push_str(" pending");
            }
            if list_dnd.is_dragging(&container) {
                c.push_str(" dragging");
            }
            if is_drop_target() {
                c.push_str(" drop-target");
            }
            c
        }
    };

    let cards_container = container.clone();
    let cards = move || {
        let cards = column.with(|column| column.as_ref().map(|c| c.cards.clone()).unwrap_or_default());
        let len = cards.len();
        let container = cards_container.clone();
        view! {
            {cards
                .into_iter()
                .enumerate()
                .map(|(index, card)| {
                    view! {
                        <CardDropZone dnd=card_dnd container=container.clone() index=index />
                        <CardItem card=card dnd=card_dnd />
                    }
                })
                .collect_view()}
            <CardDropZone dnd=card_dnd container=container.clone() index=len />
        }
    };

    view! {
        <section
            class=column_class
            on:mouseenter=make_on_container_mouseenter(card_dnd, container.clone())
            on:mouseleave=make_on_mouseleave(card_dnd)
        >
            <header class="list-header" on:mousedown=make_on_mousedown(list_dnd, container.clone())>
                <Show
                    when=move || editing.get()
                    fallback=move || {
                        view! {
                            <h2
                                class="list-title"
                                on:dblclick=move |_| {
                                    if !pending {
                                        set_draft.set(title());
                                        set_editing.set(true);
                                    }
                                }
                            >
                                {title}
                            </h2>
                        }
                    }
                >
                    <form class="list-rename-form" on:submit=on_rename.clone()>
                        <input
                            type="text"
                            prop:value=move || draft.get()
                            on:input=move |ev| set_draft.set(event_target_value(&ev))
                            on:blur=move |_| set_editing.set(false)
                        />
                    </form>
                </Show>
                <Show when=move || !pending>
                    <button class="archive-btn" title="Archive list" on:click=on_archive.clone()>"⤓"</button>
                    <DeleteConfirmButton button_class="delete-btn" prompt="Delete list and its cards?" on_confirm=on_delete />
                </Show>
            </header>
            <div class="list-cards">{cards}</div>
            <NewCardForm list_id=list_id.clone() />
        </section>
    }
}

/// Gap before card `index` of a list; only visible while dragging
#[component]
fn CardDropZone(dnd: DndSignals, container: String, index: usize) -> impl IntoView {
    let target = DropTarget::Zone(container.clone(), index);
    let on_mouseenter = make_on_zone_mouseenter(dnd, container, index);
    let zone_class = move || {
        let mut c = String::from("drop-zone");
        if !dnd.is_active() {
            c.push_str(" hidden");
        }
        if dnd.is_target(&target) {
            c.push_str(" active");
        }
        c
    };

    view! { <div class=zone_class on:mouseenter=on_mouseenter on:mouseleave=make_on_mouseleave(dnd) /> }
}
