//! Realtime Reconciler
//!
//! Merges push events, and authoritative remote results, into the board.
//!
//! Every handler is total over (event, current state): unknown ids are a
//! no-op, re-delivered events are idempotent, and a partial update never
//! erases a field group it does not carry.

use std::rc::Rc;

use crate::domain::{
    Card, CardPatch, EntityId, EntityKind, EntityPatch, EntitySnapshot, List, ListPatch,
    PresenceUpdate, RealtimeEvent,
};
use crate::ordering;
use crate::store::{BoardState, BoardStore};

/// Receives presence events; never touches board entities
pub trait PresenceSink {
    fn presence_changed(&self, update: &PresenceUpdate);
}

/// What applying one event did to the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    /// Entities that left the store (deleted or archived)
    Removed(Vec<EntityId>),
    /// Nothing to do; the reason is for logs
    Ignored(&'static str),
    /// Handed to the presence collaborator
    Forwarded,
}

/// Apply one board event. Presence events are ignored here.
pub fn apply_event(state: &mut BoardState, event: &RealtimeEvent) -> Outcome {
    match event {
        RealtimeEvent::EntityCreated { entity } => match entity {
            EntitySnapshot::List(list) => merge_created_list(state, list),
            EntitySnapshot::Card(card) => merge_created_card(state, card),
        },
        RealtimeEvent::EntityUpdated { entity } => match entity {
            EntityPatch::List { id, changes } => merge_list_patch(state, id, changes),
            EntityPatch::Card { id, changes } => merge_card_patch(state, id, changes),
        },
        RealtimeEvent::EntityDeleted { kind, id } => remove_entity(state, *kind, id),
        RealtimeEvent::EntityMoved {
            card_id,
            from_list,
            to_list,
            position,
        } => move_card(state, card_id, from_list, to_list, *position),
        RealtimeEvent::ListReordered { positions } => {
            ordering::apply_list_position_map(state.lists_mut(), positions);
            Outcome::Applied
        }
        RealtimeEvent::CardsReordered { list_id, positions } => match state.cards_mut(list_id) {
            Some(cards) => {
                ordering::apply_position_map(cards, positions);
                Outcome::Applied
            }
            None => Outcome::Ignored("unknown list"),
        },
        RealtimeEvent::PresenceUpdate(_) => Outcome::Ignored("presence"),
    }
}

// ========================
// Creation
// ========================

fn merge_created_list(state: &mut BoardState, list: &List) -> Outcome {
    if state.list(&list.id).is_some() {
        return Outcome::Ignored("duplicate list");
    }
    match state.find_temp_list(&list.title) {
        Some(temp_id) => {
            log::debug!("list {} supersedes pending {}", list.id, temp_id);
            state.replace_list(&temp_id, list.clone());
        }
        None => state.insert_list(list.clone()),
    }
    Outcome::Applied
}

fn merge_created_card(state: &mut BoardState, card: &Card) -> Outcome {
    if state.card(&card.id).is_some() {
        return Outcome::Ignored("duplicate card");
    }
    if state.list(&card.list_id).is_none() {
        return Outcome::Ignored("unknown list");
    }
    if let Some(temp_id) = state.find_temp_card(&card.list_id, &card.title) {
        log::debug!("card {} supersedes pending {}", card.id, temp_id);
        let adopted = with_temp_position(state, &temp_id, card);
        state.replace_card(&temp_id, adopted);
        return Outcome::Applied;
    }
    if let Some(cards) = state.cards_mut(&card.list_id) {
        ordering::insert_at_position(cards, card.clone());
    }
    Outcome::Applied
}

/// Resolve a local creation against the server's entity.
///
/// If a push event already replaced the temp card the confirmation is
/// redundant and only a leftover temp entry (heuristic miss) is dropped.
/// The real card takes over the temp card's current position: later local
/// inserts may have shifted it since the create was sent.
pub fn confirm_created_card(state: &mut BoardState, temp_id: &EntityId, real: &Card) -> Outcome {
    if state.card(&real.id).is_some() {
        return match state.remove_card(temp_id) {
            Some(_) => Outcome::Removed(vec![temp_id.clone()]),
            None => Outcome::Ignored("already reconciled"),
        };
    }
    let adopted = with_temp_position(state, temp_id, real);
    if state.replace_card(temp_id, adopted) {
        Outcome::Applied
    } else {
        Outcome::Ignored("temp card gone")
    }
}

/// The stored position of a confirmed card when it differs from the one the
/// server recorded; the caller persists it
pub fn confirmed_position_drift(state: &BoardState, real: &Card) -> Option<i64> {
    let local = state.card(&real.id)?;
    (!local.pinned && local.position != real.position).then_some(local.position)
}

fn with_temp_position(state: &BoardState, temp_id: &EntityId, card: &Card) -> Card {
    let mut adopted = card.clone();
    if let Some(temp) = state.card(temp_id).filter(|temp| temp.list_id == card.list_id) {
        adopted.position = temp.position;
    }
    adopted
}

/// List counterpart of [`confirm_created_card`]
pub fn confirm_created_list(state: &mut BoardState, temp_id: &EntityId, real: &List) -> Outcome {
    if state.list(&real.id).is_some() {
        return match state.remove_list(temp_id) {
            Some(_) => Outcome::Removed(vec![temp_id.clone()]),
            None => Outcome::Ignored("already reconciled"),
        };
    }
    if state.replace_list(temp_id, real.clone()) {
        Outcome::Applied
    } else {
        Outcome::Ignored("temp list gone")
    }
}

// ========================
// Updates
// ========================

/// Non-regression merge of a partial list snapshot
pub fn merge_list_patch(state: &mut BoardState, id: &EntityId, changes: &ListPatch) -> Outcome {
    let Some(list) = state.list_mut(id) else {
        return Outcome::Ignored("unknown list");
    };
    let was_archived = list.archived;
    let moved = changes.apply_to(list);
    let archived_now = list.archived && !was_archived;
    if moved {
        ordering::sort_lists(state.lists_mut());
    }
    if archived_now {
        let mut hidden: Vec<EntityId> = state.cards(id).iter().map(|card| card.id.clone()).collect();
        hidden.push(id.clone());
        return Outcome::Removed(hidden);
    }
    Outcome::Applied
}

/// Non-regression merge of a partial card snapshot. A different `listId`
/// is applied as a move; `archived: true` removes the card.
pub fn merge_card_patch(state: &mut BoardState, id: &EntityId, changes: &CardPatch) -> Outcome {
    let Some((current_list, _)) = state.locate_card(id) else {
        return Outcome::Ignored("unknown card");
    };
    if changes.archived == Some(true) {
        state.remove_card(id);
        return Outcome::Removed(vec![id.clone()]);
    }

    match &changes.list_id {
        Some(dest) if *dest != current_list => {
            if state.list(dest).is_none() {
                return Outcome::Ignored("unknown destination list");
            }
            let Some(mut card) = state.remove_card(id) else {
                return Outcome::Ignored("unknown card");
            };
            changes.apply_to(&mut card);
            card.list_id = dest.clone();
            if let Some(cards) = state.cards_mut(dest) {
                ordering::insert_at_position(cards, card);
            }
        }
        _ => {
            let reorder = state.card_mut(id).is_some_and(|card| changes.apply_to(card));
            if reorder {
                if let Some(cards) = state.cards_mut(&current_list) {
                    ordering::sort_for_display(cards);
                }
            }
        }
    }
    Outcome::Applied
}

/// Merge an authoritative card returned by the remote client
pub fn merge_confirmed_card(state: &mut BoardState, card: &Card) -> Outcome {
    merge_card_patch(state, &card.id, &CardPatch::from(card))
}

/// Merge an authoritative list returned by the remote client
pub fn merge_confirmed_list(state: &mut BoardState, list: &List) -> Outcome {
    merge_list_patch(state, &list.id, &ListPatch::from(list))
}

// ========================
// Removal and Moves
// ========================

fn remove_entity(state: &mut BoardState, kind: EntityKind, id: &EntityId) -> Outcome {
    match kind {
        EntityKind::Card => match state.remove_card(id) {
            Some(_) => Outcome::Removed(vec![id.clone()]),
            None => Outcome::Ignored("card already absent"),
        },
        EntityKind::List => match state.remove_list(id) {
            Some((_, cards)) => {
                let mut removed: Vec<EntityId> = cards.into_iter().map(|card| card.id).collect();
                removed.push(id.clone());
                Outcome::Removed(removed)
            }
            None => Outcome::Ignored("list already absent"),
        },
    }
}

fn move_card(
    state: &mut BoardState,
    card_id: &EntityId,
    from_list: &EntityId,
    to_list: &EntityId,
    position: Option<i64>,
) -> Outcome {
    let Some((current_list, _)) = state.locate_card(card_id) else {
        return Outcome::Ignored("unknown card");
    };
    if state.list(to_list).is_none() {
        return Outcome::Ignored("unknown destination list");
    }
    if current_list != *from_list && current_list != *to_list {
        log::debug!("move of {card_id}: expected it in {from_list}, found it in {current_list}");
    }

    if current_list == *to_list {
        let already_there = match position {
            None => true,
            Some(position) => state.card(card_id).is_some_and(|card| card.position == position),
        };
        if already_there {
            return Outcome::Ignored("already in place");
        }
    }

    let Some(mut card) = state.remove_card(card_id) else {
        return Outcome::Ignored("unknown card");
    };
    card.list_id = to_list.clone();
    if let Some(cards) = state.cards_mut(to_list) {
        match position {
            Some(position) => {
                card.position = position;
                ordering::insert_at_position(cards, card);
            }
            None => {
                ordering::place_moved_card(cards, card);
            }
        }
    }
    Outcome::Applied
}

// ========================
// Reconciler
// ========================

/// Feeds push events into the shared store, one at a time, in arrival order
#[derive(Clone)]
pub struct Reconciler {
    store: BoardStore,
    presence: Rc<dyn PresenceSink>,
}

impl Reconciler {
    pub fn new(store: BoardStore, presence: Rc<dyn PresenceSink>) -> Self {
        Self { store, presence }
    }

    pub fn handle(&self, event: &RealtimeEvent) -> Outcome {
        if let RealtimeEvent::PresenceUpdate(update) = event {
            self.presence.presence_changed(update);
            return Outcome::Forwarded;
        }

        let outcome = self.store.mutate(|state| apply_event(state, event));
        match &outcome {
            Outcome::Removed(ids) => self.store.report_removed(ids),
            Outcome::Ignored(reason) => log::debug!("{} ignored: {}", event.name(), reason),
            Outcome::Applied | Outcome::Forwarded => log::debug!("{} applied", event.name()),
        }
        outcome
    }
}
