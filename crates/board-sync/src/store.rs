//! Entity Store
//!
//! Canonical in-memory board: lists and the cards owned by each list.
//!
//! `BoardState` is plain data; the optimistic executor snapshots and restores
//! it wholesale. `BoardStore` is the single shared handle both the executor
//! and the reconciler mutate. Subscribers are notified only after a mutation
//! completes.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::rc::Rc;

use crate::domain::{Card, EntityId, List};
use crate::ordering;
use crate::remote::BoardSnapshot;

// ========================
// Board State
// ========================

/// Lists (sorted by position) and each list's cards (in display order)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoardState {
    lists: Vec<List>,
    cards: BTreeMap<EntityId, Vec<Card>>,
}

impl BoardState {
    /// Build from a full fetch. Cards naming an unknown list are dropped.
    pub fn from_snapshot(snapshot: BoardSnapshot) -> Self {
        let mut state = BoardState::default();
        for list in snapshot.lists {
            state.insert_list(list);
        }
        for card in snapshot.cards {
            match state.cards.get_mut(&card.list_id) {
                Some(cards) => cards.push(card),
                None => log::warn!("dropping card {} of unknown list {}", card.id, card.list_id),
            }
        }
        for cards in state.cards.values_mut() {
            ordering::sort_for_display(cards);
        }
        state
    }

    /// All lists, archived included, sorted by position
    pub fn lists(&self) -> &[List] {
        &self.lists
    }

    pub fn visible_lists(&self) -> Vec<List> {
        ordering::visible_lists(&self.lists)
    }

    pub fn list(&self, id: &EntityId) -> Option<&List> {
        self.lists.iter().find(|list| &list.id == id)
    }

    pub fn list_mut(&mut self, id: &EntityId) -> Option<&mut List> {
        self.lists.iter_mut().find(|list| &list.id == id)
    }

    pub fn lists_mut(&mut self) -> &mut Vec<List> {
        &mut self.lists
    }

    /// Cards of a list in display order; empty for an unknown list
    pub fn cards(&self, list_id: &EntityId) -> &[Card] {
        self.cards.get(list_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn cards_mut(&mut self, list_id: &EntityId) -> Option<&mut Vec<Card>> {
        self.cards.get_mut(list_id)
    }

    pub fn card(&self, id: &EntityId) -> Option<&Card> {
        self.cards.values().flatten().find(|card| &card.id == id)
    }

    pub fn card_mut(&mut self, id: &EntityId) -> Option<&mut Card> {
        self.cards.values_mut().flatten().find(|card| &card.id == id)
    }

    /// Owning list and display index of a card
    pub fn locate_card(&self, id: &EntityId) -> Option<(EntityId, usize)> {
        self.cards.iter().find_map(|(list_id, cards)| {
            cards
                .iter()
                .position(|card| &card.id == id)
                .map(|index| (list_id.clone(), index))
        })
    }

    pub fn card_count(&self) -> usize {
        self.cards.values().map(Vec::len).sum()
    }

    pub fn insert_list(&mut self, list: List) {
        self.cards.entry(list.id.clone()).or_default();
        self.lists.push(list);
        ordering::sort_lists(&mut self.lists);
    }

    /// Remove a list together with every card it owns
    pub fn remove_list(&mut self, id: &EntityId) -> Option<(List, Vec<Card>)> {
        let index = self.lists.iter().position(|list| &list.id == id)?;
        let list = self.lists.remove(index);
        let cards = self.cards.remove(id).unwrap_or_default();
        Some((list, cards))
    }

    /// Swap the list stored under `old_id` for `list`, re-keying its cards
    pub fn replace_list(&mut self, old_id: &EntityId, list: List) -> bool {
        let Some(slot) = self.lists.iter_mut().find(|existing| &existing.id == old_id) else {
            return false;
        };
        let new_id = list.id.clone();
        *slot = list;
        if let Some(mut cards) = self.cards.remove(old_id) {
            for card in cards.iter_mut() {
                card.list_id = new_id.clone();
            }
            self.cards.insert(new_id, cards);
        }
        ordering::sort_lists(&mut self.lists);
        true
    }

    pub fn remove_card(&mut self, id: &EntityId) -> Option<Card> {
        let (list_id, index) = self.locate_card(id)?;
        self.cards.get_mut(&list_id).map(|cards| cards.remove(index))
    }

    /// Swap the card stored under `old_id` for `card` in the same list slot.
    /// The replacement keeps its own list id; if that differs it is moved.
    pub fn replace_card(&mut self, old_id: &EntityId, card: Card) -> bool {
        let Some((list_id, index)) = self.locate_card(old_id) else {
            return false;
        };
        if card.list_id != list_id {
            self.remove_card(old_id);
            return match self.cards.get_mut(&card.list_id) {
                Some(dest) => {
                    ordering::insert_at_position(dest, card);
                    true
                }
                None => false,
            };
        }
        if let Some(cards) = self.cards.get_mut(&list_id) {
            cards[index] = card;
            ordering::sort_for_display(cards);
        }
        true
    }

    /// Temp card in `list_id` whose title matches; the creation-race heuristic
    pub fn find_temp_card(&self, list_id: &EntityId, title: &str) -> Option<EntityId> {
        self.cards(list_id)
            .iter()
            .find(|card| card.id.is_temp() && card.title == title)
            .map(|card| card.id.clone())
    }

    /// Temp list whose title matches
    pub fn find_temp_list(&self, title: &str) -> Option<EntityId> {
        self.lists
            .iter()
            .find(|list| list.id.is_temp() && list.title == title)
            .map(|list| list.id.clone())
    }

    /// Structural problems, if any. Empty for a consistent store.
    pub fn invariant_violations(&self) -> Vec<String> {
        let mut problems = Vec::new();
        let mut seen = HashSet::new();

        for (list_id, cards) in &self.cards {
            if self.list(list_id).is_none() {
                problems.push(format!("cards stored under missing list {list_id}"));
            }
            let mut unpinned_seen = false;
            let mut positions = HashSet::new();
            for card in cards {
                if &card.list_id != list_id {
                    problems.push(format!("card {} stored under {list_id} but names {}", card.id, card.list_id));
                }
                if !seen.insert(card.id.clone()) {
                    problems.push(format!("card {} present more than once", card.id));
                }
                if card.pinned && unpinned_seen {
                    problems.push(format!("pinned card {} follows an unpinned card", card.id));
                }
                unpinned_seen |= !card.pinned;
                if !card.pinned && !positions.insert(card.position) {
                    problems.push(format!("unpinned position {} repeated in {list_id}", card.position));
                }
            }
        }
        for list in &self.lists {
            if !seen.insert(list.id.clone()) {
                problems.push(format!("list {} present more than once", list.id));
            }
        }
        problems
    }
}

// ========================
// Shared Store Handle
// ========================

/// Notifications emitted after a mutation completes
#[derive(Debug, Clone, PartialEq)]
pub enum StoreSignal {
    Changed,
    /// The card open in the detail view no longer exists
    OpenCardRemoved(EntityId),
}

type Listener = Rc<dyn Fn(&StoreSignal)>;

#[derive(Default)]
struct StoreInner {
    state: RefCell<BoardState>,
    open_card: RefCell<Option<EntityId>>,
    listeners: RefCell<Vec<Listener>>,
}

/// Cheaply cloneable handle to the one board state.
///
/// Single-threaded by construction: all writers run synchronously on the
/// event loop, so `RefCell` borrows never overlap.
#[derive(Clone, Default)]
pub struct BoardStore {
    inner: Rc<StoreInner>,
}

impl BoardStore {
    pub fn new(state: BoardState) -> Self {
        let store = Self::default();
        *store.inner.state.borrow_mut() = state;
        store
    }

    pub fn read<R>(&self, f: impl FnOnce(&BoardState) -> R) -> R {
        f(&self.inner.state.borrow())
    }

    /// Apply one synchronous mutation, then notify subscribers
    pub fn mutate<R>(&self, f: impl FnOnce(&mut BoardState) -> R) -> R {
        let result = f(&mut self.inner.state.borrow_mut());
        self.emit(&StoreSignal::Changed);
        result
    }

    pub fn snapshot(&self) -> BoardState {
        self.inner.state.borrow().clone()
    }

    /// Replace the whole state (rollback, full resync)
    pub fn restore(&self, state: BoardState) {
        *self.inner.state.borrow_mut() = state;
        self.emit(&StoreSignal::Changed);
    }

    pub fn subscribe(&self, listener: impl Fn(&StoreSignal) + 'static) {
        self.inner.listeners.borrow_mut().push(Rc::new(listener));
    }

    /// Record which card the detail view shows (None when closed)
    pub fn set_open_card(&self, id: Option<EntityId>) {
        *self.inner.open_card.borrow_mut() = id;
    }

    pub fn open_card(&self) -> Option<EntityId> {
        self.inner.open_card.borrow().clone()
    }

    /// Signal outward if the open card is among `removed`
    pub fn report_removed(&self, removed: &[EntityId]) {
        let open = self.open_card();
        if let Some(open) = open.filter(|open| removed.contains(open)) {
            self.set_open_card(None);
            self.emit(&StoreSignal::OpenCardRemoved(open));
        }
    }

    fn emit(&self, signal: &StoreSignal) {
        let listeners: Vec<Listener> = self.inner.listeners.borrow().clone();
        for listener in listeners {
            listener(signal);
        }
    }
}

impl fmt::Debug for BoardStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoardStore")
            .field("state", &self.inner.state.borrow())
            .field("open_card", &self.inner.open_card.borrow())
            .finish()
    }
}
