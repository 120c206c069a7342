//! Board Engine
//!
//! The entry points the UI calls. Each user action validates locally, then
//! runs through the optimistic executor against the shared store.

use std::cell::Cell;
use std::rc::Rc;

use crate::domain::{
    Card, CardDraft, CardPatch, Entity, EntityId, EntityKind, List, ListDraft, ListPatch,
};
use crate::error::{SyncError, SyncResult};
use crate::optimistic::{BatchOutcome, ExecuteOptions, OptimisticExecutor, ToastSink};
use crate::ordering;
use crate::reconcile::{self, PresenceSink, Reconciler};
use crate::store::{BoardState, BoardStore};

pub struct BoardSync<C> {
    client: C,
    store: BoardStore,
    executor: OptimisticExecutor,
    toasts: Rc<dyn ToastSink>,
    next_temp: Cell<u64>,
}

impl<C: crate::remote::RemoteClient> BoardSync<C> {
    pub fn new(client: C, toasts: Rc<dyn ToastSink>) -> Self {
        Self::with_state(client, toasts, BoardState::default())
    }

    /// Start from an already-known board (tests, cached boards)
    pub fn with_state(client: C, toasts: Rc<dyn ToastSink>, state: BoardState) -> Self {
        let store = BoardStore::new(state);
        Self {
            client,
            executor: OptimisticExecutor::new(store.clone(), toasts.clone()),
            store,
            toasts,
            next_temp: Cell::new(1),
        }
    }

    pub fn store(&self) -> &BoardStore {
        &self.store
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// A reconciler writing into this engine's store
    pub fn reconciler(&self, presence: Rc<dyn PresenceSink>) -> Reconciler {
        Reconciler::new(self.store.clone(), presence)
    }

    // ========================
    // Projections
    // ========================

    /// Visible lists in board order
    pub fn lists(&self) -> Vec<List> {
        self.store.read(|state| state.visible_lists())
    }

    /// Cards of a list in display order
    pub fn cards(&self, list_id: &EntityId) -> Vec<Card> {
        self.store.read(|state| ordering::sorted_for_display(state.cards(list_id)))
    }

    pub fn set_open_card(&self, id: Option<EntityId>) {
        self.store.set_open_card(id);
    }

    // ========================
    // Board
    // ========================

    /// Replace the store with a full fetch (startup, resync after reconnect)
    pub async fn load(&self) -> SyncResult<()> {
        match self.client.fetch_board().await {
            Ok(snapshot) => {
                log::info!("board loaded: {} lists, {} cards", snapshot.lists.len(), snapshot.cards.len());
                self.store.restore(BoardState::from_snapshot(snapshot));
                Ok(())
            }
            Err(error) => {
                log::warn!("board load failed: {error}");
                self.toasts.error(&format!("Could not load board: {error}"));
                Err(SyncError::Remote {
                    action: "load board",
                    source: error,
                })
            }
        }
    }

    // ========================
    // Cards
    // ========================

    pub async fn create_card(&self, list_id: &EntityId, title: impl Into<String>) -> SyncResult<Card> {
        self.require_list(list_id)?;
        let title = title.into();
        let temp_id = self.mint_temp_id();
        let position = self
            .store
            .read(|state| ordering::new_card_position(state.cards(list_id)));
        let temp = Card::new(temp_id.clone(), list_id.clone(), title.clone(), position);
        let draft = CardDraft {
            list_id: list_id.clone(),
            title,
            position,
        };

        let mut shifted = Vec::new();
        let mut drift = None;
        let real = self
            .executor
            .execute(
                ExecuteOptions::new("create card"),
                |state| {
                    if let Some(cards) = state.cards_mut(list_id) {
                        let before = cards.clone();
                        ordering::insert_new_card(cards, temp);
                        shifted = shifted_ids(&before, cards);
                    }
                },
                || self.client.create_card(&draft),
                |state, real| {
                    reconcile::confirm_created_card(state, &temp_id, real);
                    drift = reconcile::confirmed_position_drift(state, real);
                },
            )
            .await?;

        // Creates issued meanwhile pushed this card down after it was sent
        if drift.is_some() {
            shifted.push(real.id.clone());
        }
        self.persist_card_positions("save card order", shifted).await;
        Ok(self.store.read(|state| state.card(&real.id).cloned()).unwrap_or(real))
    }

    /// Apply a partial update. A card being unpinned in place re-enters at
    /// the top of the unpinned block, like a new card.
    pub async fn update_card(&self, card_id: &EntityId, mut patch: CardPatch) -> SyncResult<Card> {
        let card = self.require_card(card_id)?;
        if let Some(dest) = &patch.list_id {
            self.require_list(dest)?;
        }
        let unpinning = card.pinned
            && patch.pinned == Some(false)
            && patch.position.is_none()
            && patch.list_id.as_ref().map_or(true, |dest| *dest == card.list_id);
        if unpinning {
            let position = self.store.read(|state| {
                let others: Vec<Card> = state
                    .cards(&card.list_id)
                    .iter()
                    .filter(|other| &other.id != card_id)
                    .cloned()
                    .collect();
                ordering::new_card_position(&others)
            });
            patch.position = Some(position);
        }

        let mut shifted = Vec::new();
        let updated = self
            .executor
            .execute(
                ExecuteOptions::new("update card"),
                |state| {
                    if unpinning {
                        if let Some(cards) = state.cards_mut(&card.list_id) {
                            let before = cards.clone();
                            ordering::unpin_card(cards, card_id);
                            shifted = shifted_ids(&before, cards);
                            shifted.retain(|id| id != card_id);
                        }
                    }
                    reconcile::merge_card_patch(state, card_id, &patch);
                },
                || self.client.update_card(card_id, &patch),
                |state, real| {
                    reconcile::merge_confirmed_card(state, real);
                },
            )
            .await?;
        if patch.archived == Some(true) {
            self.store.report_removed(std::slice::from_ref(card_id));
        }
        self.persist_card_positions("save card order", shifted).await;
        Ok(updated)
    }

    pub async fn toggle_pin(&self, card_id: &EntityId) -> SyncResult<Card> {
        let card = self.require_card(card_id)?;
        self.update_card(card_id, CardPatch::pinned(!card.pinned)).await
    }

    pub async fn delete_card(&self, card_id: &EntityId) -> SyncResult<()> {
        self.require_card(card_id)?;
        self.executor
            .execute(
                ExecuteOptions::new("delete card"),
                |state| {
                    state.remove_card(card_id);
                },
                || self.client.delete_card(card_id),
                |_, _| {},
            )
            .await?;
        self.store.report_removed(std::slice::from_ref(card_id));
        Ok(())
    }

    /// Move a card to another list. It always lands at the top of the
    /// destination's unpinned block.
    pub async fn move_card(&self, card_id: &EntityId, to_list: &EntityId) -> SyncResult<Card> {
        let card = self.require_card(card_id)?;
        self.require_list(to_list)?;
        if &card.list_id == to_list {
            return Ok(card);
        }
        let position = self
            .store
            .read(|state| ordering::new_card_position(state.cards(to_list)));

        let mut shifted = Vec::new();
        let moved = self
            .executor
            .execute(
                ExecuteOptions::new("move card"),
                |state| {
                    let Some(mut card) = state.remove_card(card_id) else {
                        return;
                    };
                    card.list_id = to_list.clone();
                    if let Some(cards) = state.cards_mut(to_list) {
                        let before = cards.clone();
                        ordering::place_moved_card(cards, card);
                        shifted = shifted_ids(&before, cards);
                    }
                },
                || self.client.move_card(card_id, to_list, position),
                |state, real| {
                    reconcile::merge_confirmed_card(state, real);
                },
            )
            .await?;

        self.persist_card_positions("save card order", shifted).await;
        Ok(moved)
    }

    /// Drag within one list; honors the exact target index
    pub async fn reorder_within_list(
        &self,
        list_id: &EntityId,
        from_index: usize,
        to_index: usize,
    ) -> SyncResult<BatchOutcome> {
        self.require_list(list_id)?;
        let len = self.store.read(|state| state.cards(list_id).len());
        for index in [from_index, to_index] {
            if index >= len {
                return Err(SyncError::IndexOutOfRange { index, len });
            }
        }

        let client = &self.client;
        let outcome = self
            .executor
            .execute_batch(
                ExecuteOptions::new("reorder cards"),
                |state| {
                    let Some(cards) = state.cards_mut(list_id) else {
                        return Vec::new();
                    };
                    let before = cards.clone();
                    ordering::intra_list_reorder(cards, from_index, to_index);
                    ordering::changed_positions(&before, cards, |card| card.position)
                        .into_iter()
                        .filter(|(id, _)| !id.is_temp())
                        .map(|(id, position)| async move {
                            client.update_card(&id, &CardPatch::position(position)).await
                        })
                        .collect()
                },
                |state, card| {
                    reconcile::merge_confirmed_card(state, card);
                },
            )
            .await;
        Ok(outcome)
    }

    /// Drag that ends over a different list. The drop index is ignored: the
    /// card lands at the top of the destination's unpinned block. A drop
    /// back into the card's own list is an ordinary intra-list reorder.
    pub async fn reorder_across_lists(
        &self,
        card_id: &EntityId,
        to_list: &EntityId,
        drop_index: usize,
    ) -> SyncResult<()> {
        let (current_list, from_index) = self
            .store
            .read(|state| state.locate_card(card_id))
            .ok_or_else(|| SyncError::not_found(EntityKind::Card, card_id))?;

        if &current_list == to_list {
            let last = self.store.read(|state| state.cards(to_list).len().saturating_sub(1));
            self.reorder_within_list(to_list, from_index, drop_index.min(last)).await?;
            return Ok(());
        }
        log::debug!("cross-list drop of {card_id} at index {drop_index} placed below pinned cards");
        self.move_card(card_id, to_list).await?;
        Ok(())
    }

    // ========================
    // Lists
    // ========================

    pub async fn create_list(&self, title: impl Into<String>) -> SyncResult<List> {
        let title = title.into();
        let temp_id = self.mint_temp_id();
        let position = self.store.read(|state| ordering::next_list_position(state.lists()));
        let temp = List::new(temp_id.clone(), title.clone(), position);
        let draft = ListDraft { title, position };

        self.executor
            .execute(
                ExecuteOptions::new("create list"),
                |state| state.insert_list(temp),
                || self.client.create_list(&draft),
                |state, real| {
                    reconcile::confirm_created_list(state, &temp_id, real);
                },
            )
            .await
    }

    pub async fn update_list(&self, list_id: &EntityId, patch: ListPatch) -> SyncResult<List> {
        self.require_list(list_id)?;
        let hidden: Vec<EntityId> = if patch.archived == Some(true) {
            self.store.read(|state| state.cards(list_id).iter().map(|card| card.id.clone()).collect())
        } else {
            Vec::new()
        };

        let updated = self
            .executor
            .execute(
                ExecuteOptions::new("update list"),
                |state| {
                    reconcile::merge_list_patch(state, list_id, &patch);
                },
                || self.client.update_list(list_id, &patch),
                |state, real| {
                    reconcile::merge_confirmed_list(state, real);
                },
            )
            .await?;
        self.store.report_removed(&hidden);
        Ok(updated)
    }

    pub async fn rename_list(&self, list_id: &EntityId, title: impl Into<String>) -> SyncResult<List> {
        self.update_list(list_id, ListPatch::rename(title)).await
    }

    pub async fn archive_list(&self, list_id: &EntityId) -> SyncResult<List> {
        self.update_list(list_id, ListPatch::archive()).await
    }

    pub async fn delete_list(&self, list_id: &EntityId) -> SyncResult<()> {
        self.require_list(list_id)?;
        let mut removed = Vec::new();
        self.executor
            .execute(
                ExecuteOptions::new("delete list"),
                |state| {
                    if let Some((_, cards)) = state.remove_list(list_id) {
                        removed = cards.into_iter().map(|card| card.id).collect();
                    }
                },
                || self.client.delete_list(list_id),
                |_, _| {},
            )
            .await?;
        self.store.report_removed(&removed);
        Ok(())
    }

    /// Drag a list to a new index among the visible lists
    pub async fn reorder_lists(&self, from_index: usize, to_index: usize) -> SyncResult<BatchOutcome> {
        let len = self.store.read(|state| state.visible_lists().len());
        for index in [from_index, to_index] {
            if index >= len {
                return Err(SyncError::IndexOutOfRange { index, len });
            }
        }

        let client = &self.client;
        let outcome = self
            .executor
            .execute_batch(
                ExecuteOptions::new("reorder lists"),
                |state| {
                    let before = state.lists().to_vec();
                    ordering::reorder_lists(state.lists_mut(), from_index, to_index);
                    ordering::changed_positions(&before, state.lists(), |list| list.position)
                        .into_iter()
                        .filter(|(id, _)| !id.is_temp())
                        .map(|(id, position)| async move {
                            client.update_list(&id, &ListPatch::position(position)).await
                        })
                        .collect()
                },
                |state, list| {
                    reconcile::merge_confirmed_list(state, list);
                },
            )
            .await;
        Ok(outcome)
    }

    // ========================
    // Helpers
    // ========================

    fn mint_temp_id(&self) -> EntityId {
        let seq = self.next_temp.get();
        self.next_temp.set(seq + 1);
        EntityId::temp(seq)
    }

    fn require_card(&self, id: &EntityId) -> SyncResult<Card> {
        let card = self
            .store
            .read(|state| state.card(id).cloned())
            .ok_or_else(|| SyncError::not_found(EntityKind::Card, id))?;
        if card.is_temp() {
            return Err(SyncError::pending(EntityKind::Card, id));
        }
        Ok(card)
    }

    fn require_list(&self, id: &EntityId) -> SyncResult<List> {
        let list = self
            .store
            .read(|state| state.list(id).cloned())
            .ok_or_else(|| SyncError::not_found(EntityKind::List, id))?;
        if list.is_temp() {
            return Err(SyncError::pending(EntityKind::List, id));
        }
        Ok(list)
    }

    /// Persist the current positions of cards shifted by a create, move or
    /// unpin. Positions are read at call time.
    async fn persist_card_positions(&self, action: &'static str, ids: Vec<EntityId>) -> BatchOutcome {
        let changes: Vec<(EntityId, i64)> = self.store.read(|state| {
            ids.into_iter()
                .filter(|id| !id.is_temp())
                .filter_map(|id| {
                    let position = state.card(&id)?.position;
                    Some((id, position))
                })
                .collect()
        });
        if changes.is_empty() {
            return BatchOutcome::default();
        }
        let client = &self.client;
        self.executor
            .execute_batch(
                ExecuteOptions::new(action),
                |_| {
                    changes
                        .into_iter()
                        .map(|(id, position)| async move {
                            client.update_card(&id, &CardPatch::position(position)).await
                        })
                        .collect()
                },
                |state, card| {
                    reconcile::merge_confirmed_card(state, card);
                },
            )
            .await
    }
}

/// Ids of cards whose position changed between `before` and `after`
fn shifted_ids(before: &[Card], after: &[Card]) -> Vec<EntityId> {
    ordering::changed_positions(before, after, |card| card.position)
        .into_iter()
        .map(|(id, _)| id)
        .collect()
}
