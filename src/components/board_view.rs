//! Board View Component
//!
//! Columns side by side with drag-and-drop for cards and lists.
//!
//! Drops are translated into engine actions:
//! - card onto a gap in its own list: intra-list reorder at that index
//! - card onto another list: cross-list move (lands below the pinned block)
//! - list onto a gap between lists: list reorder

use board_sync::EntityId;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_dragdrop::*;

use crate::components::{ListColumn, NewListForm};
use crate::context::{use_app_context, AppContext};
use crate::store::{use_app_store, AppStateStoreFields, AppStore};

/// Container id used for the row of lists
const BOARD: &str = "board";

#[component]
pub fn BoardView() -> impl IntoView {
    let ctx = use_app_context();
    let store = use_app_store();

    let card_dnd = create_dnd_signals();
    let list_dnd = create_dnd_signals();
    bind_global_mouseup(card_dnd, move |card_id, target| drop_card(ctx, EntityId::new(card_id), target));
    bind_global_mouseup(list_dnd, move |list_id, target| drop_list(ctx, store, EntityId::new(list_id), target));

    let list_ids = move || {
        store.columns().with(|columns| {
            columns
                .iter()
                .enumerate()
                .map(|(index, column)| (index, column.list.id.clone()))
                .collect::<Vec<_>>()
        })
    };

    view! {
        <div class="board">
            <For
                each=list_ids
                key=|(index, id)| (*index, id.clone())
                children=move |(index, id)| {
                    view! {
                        <ListDropZone dnd=list_dnd index=index />
                        <ListColumn list_id=id card_dnd=card_dnd list_dnd=list_dnd />
                    }
                }
            />
            {move || view! { <ListDropZone dnd=list_dnd index=store.columns().with(Vec::len) /> }}
            <NewListForm />
        </div>
    }
}

fn drop_card(ctx: AppContext, card_id: EntityId, target: DropTarget) {
    let engine = ctx.engine();
    let to_list = EntityId::new(target.container());
    let Some((from_list, from_index)) = engine.store().read(|state| state.locate_card(&card_id)) else {
        log::debug!("dropped card {card_id} is gone");
        return;
    };
    log::debug!("drop card {card_id} from {from_list}[{from_index}] onto {target:?}");

    spawn_local(async move {
        let result = match target {
            DropTarget::Zone(_, zone) if from_list == to_list => {
                let to_index = zone_to_index(from_index, zone);
                if to_index == from_index {
                    return;
                }
                engine
                    .reorder_within_list(&to_list, from_index, to_index)
                    .await
                    .map(|_| ())
            }
            DropTarget::Zone(_, zone) => engine.reorder_across_lists(&card_id, &to_list, zone).await,
            DropTarget::Container(_) => engine.move_card(&card_id, &to_list).await.map(|_| ()),
        };
        if let Err(err) = result {
            log::warn!("drop of card {card_id}: {err}");
        }
    });
}

fn drop_list(ctx: AppContext, store: AppStore, list_id: EntityId, target: DropTarget) {
    let DropTarget::Zone(_, zone) = target else {
        return;
    };
    let from_index = store
        .columns()
        .with_untracked(|columns| columns.iter().position(|column| column.list.id == list_id));
    let Some(from_index) = from_index else {
        return;
    };
    let to_index = zone_to_index(from_index, zone);
    if to_index == from_index {
        return;
    }

    let engine = ctx.engine();
    spawn_local(async move {
        if let Err(err) = engine.reorder_lists(from_index, to_index).await {
            log::warn!("reorder of list {list_id}: {err}");
        }
    });
}

/// Gap before list `index`; only visible while a list is dragged
#[component]
fn ListDropZone(dnd: DndSignals, index: usize) -> impl IntoView {
    let target = DropTarget::Zone(BOARD.to_string(), index);
    let on_mouseenter = make_on_zone_mouseenter(dnd, BOARD.to_string(), index);
    let zone_class = move || {
        let mut c = String::from("list-drop-zone");
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
