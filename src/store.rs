//! Global Application State Store
//!
//! Uses Leptos reactive_stores for fine-grained reactivity. The board
//! engine owns the authoritative client state; this store is its one-way
//! projection plus UI-only state (toasts, presence, connection badge).

use std::collections::BTreeMap;

use board_sync::{
    ordering, BoardState, Card, ConnectionState, EntityId, List, PresenceSink, PresenceUpdate,
    ToastSink,
};
use leptos::prelude::*;
use reactive_stores::Store;

/// One visible list with its cards in display order
#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    pub list: List,
    pub cards: Vec<Card>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Toast {
    pub id: u64,
    pub message: String,
}

/// Global application state with field-level reactivity
#[derive(Clone, Debug, Default, Store)]
pub struct AppState {
    /// Visible lists in board order
    pub columns: Vec<Column>,
    /// Card shown in the detail panel
    pub open_card: Option<EntityId>,
    /// Push channel status for the badge
    pub connection: ConnectionState,
    pub toasts: Vec<Toast>,
    pub next_toast_id: u64,
    /// Other users by id
    pub presence: BTreeMap<String, PresenceUpdate>,
}

/// Type alias for the store
pub type AppStore = Store<AppState>;

/// Get the app store from context
pub fn use_app_store() -> AppStore {
    expect_context::<AppStore>()
}

// ========================
// Store Helper Functions
// ========================

/// Rebuild the column projection from the engine state
pub fn store_sync_board(store: &AppStore, board: &BoardState) {
    let columns: Vec<Column> = board
        .visible_lists()
        .into_iter()
        .map(|list| Column {
            cards: ordering::sorted_for_display(board.cards(&list.id)),
            list,
        })
        .collect();
    store.columns().set(columns);
}

/// Look up a card in the projection
pub fn store_find_card(store: &AppStore, id: &EntityId) -> Option<Card> {
    store.columns().with(|columns| {
        columns
            .iter()
            .flat_map(|column| column.cards.iter())
            .find(|card| &card.id == id)
            .cloned()
    })
}

pub fn store_push_toast(store: &AppStore, message: impl Into<String>) -> u64 {
    let id = store.next_toast_id().get_untracked();
    store.next_toast_id().set(id + 1);
    store.toasts().write().push(Toast {
        id,
        message: message.into(),
    });
    id
}

pub fn store_dismiss_toast(store: &AppStore, id: u64) {
    store.toasts().write().retain(|toast| toast.id != id);
}

pub fn store_set_connection(store: &AppStore, state: ConnectionState) {
    if store.connection().get_untracked() != state {
        store.connection().set(state);
    }
}

pub fn store_update_presence(store: &AppStore, update: &PresenceUpdate) {
    let presence_field = store.presence();
    let mut presence = presence_field.write();
    if update.online {
        presence.insert(update.user_id.clone(), update.clone());
    } else {
        presence.remove(&update.user_id);
    }
}

// ========================
// Engine Collaborators
// ========================

/// Routes engine failures into the toast stack
pub struct StoreToasts(pub AppStore);

impl ToastSink for StoreToasts {
    fn error(&self, message: &str) {
        store_push_toast(&self.0, message);
    }
}

/// Routes presence events into the store
pub struct StorePresence(pub AppStore);

impl PresenceSink for StorePresence {
    fn presence_changed(&self, update: &PresenceUpdate) {
        store_update_presence(&self.0, update);
    }
}
