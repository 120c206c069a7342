//! Board Engine Integration Tests
//!
//! Drives `BoardSync` against an in-memory remote. Remote calls can be held
//! open with a oneshot gate to interleave push events with pending actions.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::rc::Rc;

use async_trait::async_trait;
use board_sync::{
    BackoffConfig, BoardSnapshot, BoardState, BoardSync, Card, CardDraft, CardPatch, ConnectionState,
    EntityId, EntityKind, EntitySnapshot, FrameOutcome, List, ListDraft, ListPatch, Outcome,
    PositionMap, PresenceSink, PresenceUpdate, RealtimeEvent, RealtimeSession, RemoteClient,
    RemoteError, RemoteResult, StoreSignal, SyncError, ToastSink, TransitionError,
};
use tokio::sync::oneshot;

// ========================
// Fixtures
// ========================

#[derive(Default)]
struct FakeRemote {
    lists: RefCell<BTreeMap<EntityId, List>>,
    cards: RefCell<BTreeMap<EntityId, Card>>,
    calls: RefCell<Vec<String>>,
    failing: RefCell<HashSet<String>>,
    gates: RefCell<HashMap<&'static str, oneshot::Receiver<()>>>,
    next_id: Cell<u64>,
}

impl FakeRemote {
    fn seeded(snapshot: &BoardSnapshot) -> Self {
        let remote = Self::default();
        for list in &snapshot.lists {
            remote.lists.borrow_mut().insert(list.id.clone(), list.clone());
        }
        for card in &snapshot.cards {
            remote.cards.borrow_mut().insert(card.id.clone(), card.clone());
        }
        remote
    }

    /// Reject every call to `op`, or only calls naming `op target`
    fn fail(&self, key: &str) {
        self.failing.borrow_mut().insert(key.to_string());
    }

    /// Hold the next `op` call open until the returned sender fires
    fn gate(&self, op: &'static str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates.borrow_mut().insert(op, rx);
        tx
    }

    fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn mint(&self, prefix: &str) -> EntityId {
        let next = self.next_id.get() + 1;
        self.next_id.set(next);
        EntityId::new(format!("{prefix}-{next}"))
    }

    async fn enter(&self, op: &'static str, target: &str) -> RemoteResult<()> {
        self.calls.borrow_mut().push(format!("{op} {target}"));
        let gate = self.gates.borrow_mut().remove(op);
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        let failing = self.failing.borrow();
        if failing.contains(op) || failing.contains(&format!("{op} {target}")) {
            return Err(RemoteError::new(format!("{op} rejected")));
        }
        Ok(())
    }
}

#[async_trait(?Send)]
impl RemoteClient for FakeRemote {
    async fn fetch_board(&self) -> RemoteResult<BoardSnapshot> {
        self.enter("fetch_board", "").await?;
        Ok(BoardSnapshot {
            lists: self.lists.borrow().values().cloned().collect(),
            cards: self.cards.borrow().values().cloned().collect(),
        })
    }

    async fn create_card(&self, draft: &CardDraft) -> RemoteResult<Card> {
        self.enter("create_card", draft.list_id.as_str()).await?;
        let card = Card::new(self.mint("srv"), draft.list_id.clone(), draft.title.clone(), draft.position);
        self.cards.borrow_mut().insert(card.id.clone(), card.clone());
        Ok(card)
    }

    async fn update_card(&self, id: &EntityId, patch: &CardPatch) -> RemoteResult<Card> {
        self.enter("update_card", id.as_str()).await?;
        let mut cards = self.cards.borrow_mut();
        let card = cards.get_mut(id).ok_or_else(|| RemoteError::new("no such card"))?;
        patch.apply_to(card);
        if let Some(list_id) = &patch.list_id {
            card.list_id = list_id.clone();
        }
        Ok(card.clone())
    }

    async fn delete_card(&self, id: &EntityId) -> RemoteResult<()> {
        self.enter("delete_card", id.as_str()).await?;
        self.cards.borrow_mut().remove(id);
        Ok(())
    }

    async fn move_card(&self, id: &EntityId, to_list: &EntityId, position: i64) -> RemoteResult<Card> {
        self.enter("move_card", id.as_str()).await?;
        let mut cards = self.cards.borrow_mut();
        let card = cards.get_mut(id).ok_or_else(|| RemoteError::new("no such card"))?;
        card.list_id = to_list.clone();
        card.position = position;
        Ok(card.clone())
    }

    async fn create_list(&self, draft: &ListDraft) -> RemoteResult<List> {
        self.enter("create_list", &draft.title).await?;
        let list = List::new(self.mint("list"), draft.title.clone(), draft.position);
        self.lists.borrow_mut().insert(list.id.clone(), list.clone());
        Ok(list)
    }

    async fn update_list(&self, id: &EntityId, patch: &ListPatch) -> RemoteResult<List> {
        self.enter("update_list", id.as_str()).await?;
        let mut lists = self.lists.borrow_mut();
        let list = lists.get_mut(id).ok_or_else(|| RemoteError::new("no such list"))?;
        patch.apply_to(list);
        Ok(list.clone())
    }

    async fn delete_list(&self, id: &EntityId) -> RemoteResult<()> {
        self.enter("delete_list", id.as_str()).await?;
        self.lists.borrow_mut().remove(id);
        self.cards.borrow_mut().retain(|_, card| &card.list_id != id);
        Ok(())
    }
}

#[derive(Default)]
struct Toasts(RefCell<Vec<String>>);

impl ToastSink for Toasts {
    fn error(&self, message: &str) {
        self.0.borrow_mut().push(message.to_string());
    }
}

impl Toasts {
    fn count(&self) -> usize {
        self.0.borrow().len()
    }
}

#[derive(Default)]
struct Presence(RefCell<Vec<PresenceUpdate>>);

impl PresenceSink for Presence {
    fn presence_changed(&self, update: &PresenceUpdate) {
        self.0.borrow_mut().push(update.clone());
    }
}

fn board(lists: Vec<List>, cards: Vec<Card>) -> (BoardSync<FakeRemote>, Rc<Toasts>) {
    let snapshot = BoardSnapshot { lists, cards };
    let toasts = Rc::new(Toasts::default());
    let engine = BoardSync::with_state(
        FakeRemote::seeded(&snapshot),
        toasts.clone(),
        BoardState::from_snapshot(snapshot),
    );
    (engine, toasts)
}

fn id(value: &str) -> EntityId {
    EntityId::from(value)
}

/// (id, position) pairs in display order
fn order(engine: &BoardSync<FakeRemote>, list: &str) -> Vec<(String, i64)> {
    engine
        .cards(&id(list))
        .into_iter()
        .map(|card| (card.id.to_string(), card.position))
        .collect()
}

fn ids(engine: &BoardSync<FakeRemote>, list: &str) -> Vec<String> {
    order(engine, list).into_iter().map(|(id, _)| id).collect()
}

fn assert_consistent(engine: &BoardSync<FakeRemote>) {
    let problems = engine.store().read(|state| state.invariant_violations());
    assert!(problems.is_empty(), "store inconsistent: {problems:?}");
}

fn pair(id: &str, position: i64) -> (String, i64) {
    (id.to_string(), position)
}

/// Unpinned (id, position) pairs the server holds for `list`, by position
fn server_order(engine: &BoardSync<FakeRemote>, list: &str) -> Vec<(String, i64)> {
    let mut cards: Vec<(String, i64)> = engine
        .client()
        .cards
        .borrow()
        .values()
        .filter(|card| card.list_id == id(list) && !card.pinned)
        .map(|card| (card.id.to_string(), card.position))
        .collect();
    cards.sort_by_key(|(_, position)| *position);
    cards
}

// ========================
// Ordering scenarios
// ========================

#[tokio::test]
async fn test_new_card_lands_below_pinned_block() {
    let (engine, toasts) = board(
        vec![List::new("l1", "Todo", 0)],
        vec![
            Card::new("a", "l1", "A", 0).pinned(),
            Card::new("b", "l1", "B", 1),
            Card::new("c", "l1", "C", 2),
        ],
    );

    let created = engine.create_card(&id("l1"), "D").await.unwrap();

    assert_eq!(created.id, id("srv-1"));
    assert_eq!(
        order(&engine, "l1"),
        vec![pair("a", 0), pair("srv-1", 1), pair("b", 2), pair("c", 3)]
    );
    assert_eq!(
        engine.client().calls(),
        vec!["create_card l1", "update_card b", "update_card c"]
    );
    assert_eq!(engine.client().cards.borrow()[&id("c")].position, 3);
    assert_eq!(toasts.count(), 0);
    assert_consistent(&engine);
}

#[tokio::test]
async fn test_cross_list_move_ignores_drop_index() {
    let (engine, _) = board(
        vec![List::new("src", "Todo", 0), List::new("dst", "Doing", 1)],
        vec![
            Card::new("c", "src", "C", 0),
            Card::new("d", "src", "D", 1),
            Card::new("e", "src", "E", 2),
            Card::new("f", "dst", "F", 0).pinned(),
            Card::new("g", "dst", "G", 1),
        ],
    );

    engine.reorder_across_lists(&id("c"), &id("dst"), 2).await.unwrap();

    assert_eq!(order(&engine, "dst"), vec![pair("f", 0), pair("c", 1), pair("g", 2)]);
    assert_eq!(ids(&engine, "src"), vec!["d", "e"]);
    assert_eq!(engine.client().calls(), vec!["move_card c", "update_card g"]);
    assert_eq!(engine.client().cards.borrow()[&id("c")].list_id, id("dst"));
    assert_consistent(&engine);
}

#[tokio::test]
async fn test_drop_into_own_list_is_an_intra_list_reorder() {
    let (engine, _) = board(
        vec![List::new("l1", "Todo", 0)],
        vec![Card::new("a", "l1", "A", 0), Card::new("b", "l1", "B", 1)],
    );

    engine.reorder_across_lists(&id("a"), &id("l1"), 9).await.unwrap();

    assert_eq!(order(&engine, "l1"), vec![pair("b", 0), pair("a", 1)]);
    assert!(engine.client().calls().iter().all(|call| call.starts_with("update_card")));
}

#[tokio::test]
async fn test_intra_list_reorder_renumbers_sequentially() {
    let (engine, toasts) = board(
        vec![List::new("l1", "Todo", 0)],
        vec![
            Card::new("a", "l1", "A", 0),
            Card::new("b", "l1", "B", 1),
            Card::new("c", "l1", "C", 2),
            Card::new("d", "l1", "D", 3),
        ],
    );

    let outcome = engine.reorder_within_list(&id("l1"), 0, 2).await.unwrap();

    assert_eq!(
        order(&engine, "l1"),
        vec![pair("b", 0), pair("c", 1), pair("a", 2), pair("d", 3)]
    );
    assert_eq!(outcome.succeeded, 3);
    assert!(outcome.is_complete());
    assert_eq!(toasts.count(), 0);
}

#[tokio::test]
async fn test_partial_batch_failure_keeps_local_order() {
    let (engine, toasts) = board(
        vec![List::new("l1", "Todo", 0)],
        vec![
            Card::new("a", "l1", "A", 0),
            Card::new("b", "l1", "B", 1),
            Card::new("c", "l1", "C", 2),
            Card::new("d", "l1", "D", 3),
        ],
    );
    engine.client().fail("update_card c");

    let outcome = engine.reorder_within_list(&id("l1"), 0, 2).await.unwrap();

    assert_eq!((outcome.succeeded, outcome.failed), (2, 1));
    assert_eq!(toasts.count(), 1);
    assert_eq!(ids(&engine, "l1"), vec!["b", "c", "a", "d"]);
    // The server kept the old slot for the rejected card
    assert_eq!(engine.client().cards.borrow()[&id("c")].position, 2);
}

#[tokio::test]
async fn test_reorder_lists_persists_only_changed_positions() {
    let (engine, _) = board(
        vec![
            List::new("l1", "Todo", 0),
            List::new("l2", "Doing", 1),
            List::new("l3", "Done", 2),
        ],
        vec![],
    );

    let outcome = engine.reorder_lists(2, 0).await.unwrap();

    let titles: Vec<String> = engine.lists().into_iter().map(|list| list.title).collect();
    assert_eq!(titles, vec!["Done", "Todo", "Doing"]);
    assert_eq!(outcome.succeeded, 3);
    assert!(matches!(
        engine.reorder_lists(0, 3).await,
        Err(SyncError::IndexOutOfRange { index: 3, len: 3 })
    ));
}

// ========================
// Pinned-first invariant
// ========================

#[tokio::test]
async fn test_pinned_first_holds_across_operations() {
    let (engine, _) = board(
        vec![List::new("l1", "Todo", 0), List::new("l2", "Doing", 1)],
        vec![
            Card::new("p", "l1", "P", 5).pinned(),
            Card::new("a", "l1", "A", 0),
            Card::new("b", "l1", "B", 1),
            Card::new("q", "l2", "Q", 0).pinned(),
            Card::new("x", "l2", "X", 1),
        ],
    );
    let reconciler = engine.reconciler(Rc::new(Presence::default()));

    engine.toggle_pin(&id("b")).await.unwrap();
    assert_eq!(ids(&engine, "l1"), vec!["p", "b", "a"]);
    assert_consistent(&engine);

    engine.create_card(&id("l1"), "New").await.unwrap();
    assert_consistent(&engine);

    // An unpinned card dragged above the pinned block snaps back below it
    engine.reorder_within_list(&id("l2"), 1, 0).await.unwrap();
    assert_eq!(ids(&engine, "l2"), vec!["q", "x"]);
    assert_consistent(&engine);

    // A pinned card entering a list joins the end of the pinned block
    engine.move_card(&id("q"), &id("l1")).await.unwrap();
    assert_eq!(&ids(&engine, "l1")[..3], &["p", "b", "q"]);
    assert_consistent(&engine);

    reconciler.handle(&RealtimeEvent::EntityCreated {
        entity: EntitySnapshot::Card(Card::new("remote", "l1", "Remote", 0)),
    });
    reconciler.handle(&RealtimeEvent::EntityUpdated {
        entity: board_sync::EntityPatch::Card {
            id: id("a"),
            changes: CardPatch::pinned(true),
        },
    });
    let cards = engine.cards(&id("l1"));
    let first_unpinned = cards.iter().position(|card| !card.pinned).unwrap();
    assert!(cards[first_unpinned..].iter().all(|card| !card.pinned));
    assert_consistent(&engine);
}

#[tokio::test]
async fn test_unpinned_card_reenters_at_top_of_unpinned_block() {
    let (engine, toasts) = board(
        vec![List::new("l1", "Todo", 0)],
        vec![
            Card::new("a", "l1", "A", 0),
            Card::new("b", "l1", "B", 1),
            Card::new("c", "l1", "C", 2),
        ],
    );

    engine.toggle_pin(&id("c")).await.unwrap();
    engine.create_card(&id("l1"), "D").await.unwrap();
    assert_eq!(
        order(&engine, "l1"),
        vec![pair("c", 2), pair("srv-1", 0), pair("a", 1), pair("b", 2)]
    );

    let unpinned = engine.toggle_pin(&id("c")).await.unwrap();

    assert!(!unpinned.pinned);
    let expected = vec![pair("c", 0), pair("srv-1", 1), pair("a", 2), pair("b", 3)];
    assert_eq!(order(&engine, "l1"), expected);
    assert_eq!(server_order(&engine, "l1"), expected);
    assert_eq!(toasts.count(), 0);
    assert_consistent(&engine);
}

#[tokio::test]
async fn test_rejected_unpin_restores_pinned_block() {
    let (engine, toasts) = board(
        vec![List::new("l1", "Todo", 0)],
        vec![Card::new("p", "l1", "P", 4).pinned(), Card::new("a", "l1", "A", 0)],
    );
    engine.client().fail("update_card p");
    let before = engine.store().snapshot();

    assert!(engine.toggle_pin(&id("p")).await.is_err());

    assert_eq!(engine.store().snapshot(), before);
    assert_eq!(toasts.count(), 1);
    assert_eq!(engine.client().calls(), vec!["update_card p"]);
}

// ========================
// Creation races
// ========================

#[tokio::test]
async fn test_confirmation_before_push_event_leaves_one_card() {
    let (engine, _) = board(vec![List::new("l1", "Todo", 0)], vec![]);
    let reconciler = engine.reconciler(Rc::new(Presence::default()));

    let created = engine.create_card(&id("l1"), "Write tests").await.unwrap();
    let outcome = reconciler.handle(&RealtimeEvent::EntityCreated {
        entity: EntitySnapshot::Card(created.clone()),
    });

    assert_eq!(outcome, Outcome::Ignored("duplicate card"));
    assert_eq!(ids(&engine, "l1"), vec![created.id.to_string()]);
    assert_consistent(&engine);
}

#[tokio::test]
async fn test_push_event_before_confirmation_leaves_one_card() {
    let (engine, toasts) = board(vec![List::new("l1", "Todo", 0)], vec![]);
    let reconciler = engine.reconciler(Rc::new(Presence::default()));
    let release = engine.client().gate("create_card");
    let todo = id("l1");

    let (created, ()) = futures::join!(engine.create_card(&todo, "Write tests"), async {
        let pending = engine.cards(&todo);
        assert_eq!(pending.len(), 1);
        assert!(pending[0].id.is_temp());

        let pushed = Card::new("srv-1", "l1", "Write tests", 0);
        let outcome = reconciler.handle(&RealtimeEvent::EntityCreated {
            entity: EntitySnapshot::Card(pushed),
        });
        assert_eq!(outcome, Outcome::Applied);
        assert_eq!(ids(&engine, "l1"), vec!["srv-1"]);
        release.send(()).unwrap();
    });

    assert_eq!(created.unwrap().id, id("srv-1"));
    assert_eq!(ids(&engine, "l1"), vec!["srv-1"]);
    assert_eq!(toasts.count(), 0);
    assert_consistent(&engine);
}

#[tokio::test]
async fn test_overlapping_creates_keep_positions_unique() {
    let (engine, toasts) = board(
        vec![List::new("l1", "Todo", 0)],
        vec![Card::new("a", "l1", "A", 0)],
    );
    let release = engine.client().gate("create_card");
    let todo = id("l1");

    let (first, second) = futures::join!(engine.create_card(&todo, "X"), async {
        // X is still in flight; Y pushes its temp card down to 1
        let second = engine.create_card(&todo, "Y").await.unwrap();
        release.send(()).unwrap();
        second
    });

    let first = first.unwrap();
    assert_eq!(second.id, id("srv-1"));
    assert_eq!(first.id, id("srv-2"));
    assert_eq!(first.position, 1);
    let expected = vec![pair("srv-1", 0), pair("srv-2", 1), pair("a", 2)];
    assert_eq!(order(&engine, "l1"), expected);
    assert_eq!(server_order(&engine, "l1"), expected);
    assert_eq!(toasts.count(), 0);
    assert_consistent(&engine);
}

#[tokio::test]
async fn test_list_creation_race_leaves_one_list() {
    let (engine, _) = board(vec![], vec![]);
    let reconciler = engine.reconciler(Rc::new(Presence::default()));
    let release = engine.client().gate("create_list");

    let (created, ()) = futures::join!(engine.create_list("Backlog"), async {
        assert!(engine.lists()[0].id.is_temp());
        reconciler.handle(&RealtimeEvent::EntityCreated {
            entity: EntitySnapshot::List(List::new("list-1", "Backlog", 0)),
        });
        release.send(()).unwrap();
    });

    assert_eq!(created.unwrap().id, id("list-1"));
    let lists = engine.lists();
    assert_eq!(lists.len(), 1);
    assert_eq!(lists[0].id, id("list-1"));
}

#[tokio::test]
async fn test_pending_entities_reject_follow_up_actions_without_toast() {
    let (engine, toasts) = board(vec![List::new("l1", "Todo", 0)], vec![]);
    let release = engine.client().gate("create_card");
    let todo = id("l1");

    let (created, ()) = futures::join!(engine.create_card(&todo, "Draft"), async {
        let temp = engine.cards(&todo)[0].id.clone();
        assert!(matches!(
            engine.delete_card(&temp).await,
            Err(SyncError::PendingCreation { kind: EntityKind::Card, .. })
        ));
        assert!(matches!(
            engine.update_card(&temp, CardPatch::title("Renamed")).await,
            Err(SyncError::PendingCreation { .. })
        ));
        release.send(()).unwrap();
    });

    created.unwrap();
    assert!(matches!(
        engine.move_card(&id("ghost"), &todo).await,
        Err(SyncError::NotFound { kind: EntityKind::Card, .. })
    ));
    assert!(matches!(
        engine.reorder_within_list(&todo, 0, 4).await,
        Err(SyncError::IndexOutOfRange { index: 4, len: 1 })
    ));
    assert_eq!(toasts.count(), 0);
    assert_eq!(engine.client().calls(), vec!["create_card l1"]);
}

// ========================
// Rollback
// ========================

#[tokio::test]
async fn test_rejected_move_restores_exact_snapshot() {
    let (engine, toasts) = board(
        vec![List::new("l1", "Todo", 0), List::new("l2", "Doing", 1)],
        vec![
            Card::new("a", "l1", "A", 0),
            Card::new("b", "l1", "B", 1),
            Card::new("c", "l2", "C", 0),
        ],
    );
    engine.client().fail("move_card");
    let before = engine.store().snapshot();

    let result = engine.move_card(&id("a"), &id("l2")).await;

    assert!(matches!(result, Err(SyncError::Remote { action: "move card", .. })));
    assert_eq!(engine.store().snapshot(), before);
    assert_eq!(*toasts.0.borrow(), vec!["Could not move card: move_card rejected".to_string()]);
}

#[tokio::test]
async fn test_rejected_create_removes_temp_card() {
    let (engine, toasts) = board(
        vec![List::new("l1", "Todo", 0)],
        vec![Card::new("a", "l1", "A", 0)],
    );
    engine.client().fail("create_card");
    let before = engine.store().snapshot();

    assert!(engine.create_card(&id("l1"), "Doomed").await.is_err());

    assert_eq!(engine.store().snapshot(), before);
    assert_eq!(toasts.count(), 1);
    // Nothing was shifted on the server
    assert_eq!(engine.client().calls(), vec!["create_card l1"]);
}

#[tokio::test]
async fn test_rejected_list_delete_restores_cards() {
    let (engine, toasts) = board(
        vec![List::new("l1", "Todo", 0)],
        vec![Card::new("a", "l1", "A", 0), Card::new("b", "l1", "B", 1)],
    );
    engine.client().fail("delete_list");
    let before = engine.store().snapshot();

    assert!(engine.delete_list(&id("l1")).await.is_err());

    assert_eq!(engine.store().snapshot(), before);
    assert_eq!(ids(&engine, "l1"), vec!["a", "b"]);
    assert_eq!(toasts.count(), 1);
}

// ========================
// Lists
// ========================

#[tokio::test]
async fn test_archive_list_hides_list_and_closes_open_card() {
    let (engine, _) = board(
        vec![List::new("l1", "Todo", 0), List::new("l2", "Doing", 1)],
        vec![Card::new("a", "l1", "A", 0)],
    );
    let signals = Rc::new(RefCell::new(Vec::new()));
    let sink = signals.clone();
    engine.store().subscribe(move |signal| sink.borrow_mut().push(signal.clone()));
    engine.set_open_card(Some(id("a")));

    engine.archive_list(&id("l1")).await.unwrap();

    let visible: Vec<EntityId> = engine.lists().into_iter().map(|list| list.id).collect();
    assert_eq!(visible, vec![id("l2")]);
    assert!(engine.client().lists.borrow()[&id("l1")].archived);
    assert!(signals.borrow().contains(&StoreSignal::OpenCardRemoved(id("a"))));
}

#[tokio::test]
async fn test_rename_list_keeps_position() {
    let (engine, _) = board(vec![List::new("l1", "Todo", 3)], vec![]);

    let renamed = engine.rename_list(&id("l1"), "Backlog").await.unwrap();

    assert_eq!(renamed.title, "Backlog");
    assert_eq!(engine.lists()[0].position, 3);
}

// ========================
// Realtime
// ========================

#[tokio::test]
async fn test_list_reordered_event_is_idempotent() {
    let (engine, _) = board(
        vec![
            List::new("l1", "Todo", 0),
            List::new("l2", "Doing", 1),
            List::new("l3", "Done", 2),
        ],
        vec![],
    );
    let reconciler = engine.reconciler(Rc::new(Presence::default()));
    let positions: PositionMap = [(id("l1"), 2), (id("l2"), 0), (id("l3"), 1)].into_iter().collect();
    let event = RealtimeEvent::ListReordered { positions };

    reconciler.handle(&event);
    let once = engine.store().snapshot();
    reconciler.handle(&event);

    assert_eq!(engine.store().snapshot(), once);
    let order: Vec<EntityId> = engine.lists().into_iter().map(|list| list.id).collect();
    assert_eq!(order, vec![id("l2"), id("l3"), id("l1")]);
}

#[tokio::test]
async fn test_remote_delete_of_open_card_signals_detail_view() {
    let (engine, _) = board(
        vec![List::new("l1", "Todo", 0)],
        vec![Card::new("a", "l1", "A", 0)],
    );
    let reconciler = engine.reconciler(Rc::new(Presence::default()));
    let signals = Rc::new(RefCell::new(Vec::new()));
    let sink = signals.clone();
    engine.store().subscribe(move |signal| sink.borrow_mut().push(signal.clone()));
    engine.set_open_card(Some(id("a")));

    reconciler.handle(&RealtimeEvent::EntityDeleted {
        kind: EntityKind::Card,
        id: id("a"),
    });

    assert!(signals.borrow().contains(&StoreSignal::OpenCardRemoved(id("a"))));
    assert_eq!(engine.store().open_card(), None);
}

#[tokio::test]
async fn test_reconnect_triggers_full_resync() {
    let (engine, _) = board(
        vec![List::new("l1", "Todo", 0)],
        vec![Card::new("a", "l1", "A", 0), Card::new("b", "l1", "B", 1)],
    );
    let presence = Rc::new(Presence::default());
    let mut session = RealtimeSession::new(engine.reconciler(presence), BackoffConfig::default());
    assert!(!session.on_open().unwrap());

    session.on_failure(0.5);
    // Missed while reconnecting
    engine.client().cards.borrow_mut().remove(&id("b"));
    assert_eq!(
        session.on_frame(r#"{"type":"entityDeleted","kind":"card","id":"b"}"#),
        FrameOutcome::Dropped
    );

    if session.on_open().unwrap() {
        engine.load().await.unwrap();
    }
    assert_eq!(ids(&engine, "l1"), vec!["a"]);
    assert_eq!(session.state(), ConnectionState::Connected);
}

#[tokio::test]
async fn test_session_never_reconnects_from_disconnected_on_its_own() {
    let (engine, _) = board(vec![List::new("l1", "Todo", 0)], vec![]);
    let mut session = RealtimeSession::new(
        engine.reconciler(Rc::new(Presence::default())),
        BackoffConfig {
            max_attempts: Some(1),
            ..BackoffConfig::default()
        },
    );
    session.on_open().unwrap();

    session.on_failure(0.0);
    assert_eq!(session.state(), ConnectionState::Reconnecting);
    session.on_failure(0.0);
    assert_eq!(session.state(), ConnectionState::Disconnected);

    assert_eq!(
        session.on_open(),
        Err(TransitionError::OpenWhile(ConnectionState::Disconnected))
    );
    session.request_reconnect().unwrap();
    assert!(session.on_open().unwrap());
    assert_eq!(session.state(), ConnectionState::Connected);
}

#[tokio::test]
async fn test_failed_load_toasts_and_keeps_store() {
    let (engine, toasts) = board(
        vec![List::new("l1", "Todo", 0)],
        vec![Card::new("a", "l1", "A", 0)],
    );
    engine.client().fail("fetch_board");
    let before = engine.store().snapshot();

    assert!(matches!(engine.load().await, Err(SyncError::Remote { action: "load board", .. })));
    assert_eq!(engine.store().snapshot(), before);
    assert_eq!(toasts.count(), 1);
}
