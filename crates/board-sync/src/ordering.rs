//! Ordering Policy
//!
//! Pure functions computing display order and position reassignment.
//!
//! Within a list the visible order is always: pinned cards in their relative
//! pinned order, then unpinned cards ascending by `position`. Every function
//! here leaves its input in that order.

use crate::domain::{Card, Entity, EntityId, List, PositionMap};

// ========================
// Cards
// ========================

/// Number of pinned cards (the length of the leading pinned block)
pub fn pinned_count(cards: &[Card]) -> usize {
    cards.iter().filter(|card| card.pinned).count()
}

/// Re-sort in place: pinned block first (stable), unpinned ascending by position.
/// Idempotent.
pub fn sort_for_display(cards: &mut [Card]) {
    cards.sort_by_key(|card| if card.pinned { (0, 0) } else { (1, card.position) });
}

/// Sorted copy, for projections
pub fn sorted_for_display(cards: &[Card]) -> Vec<Card> {
    let mut sorted = cards.to_vec();
    sort_for_display(&mut sorted);
    sorted
}

/// New cards go to the top of the unpinned block
pub fn insertion_index_for_new_card(cards: &[Card]) -> usize {
    pinned_count(cards)
}

/// Position a card takes when it enters at the top of the unpinned block:
/// the pinned count, or lower if an unpinned sibling already sits below it
pub fn new_card_position(cards: &[Card]) -> i64 {
    let pinned = pinned_count(cards) as i64;
    cards
        .iter()
        .filter(|card| !card.pinned)
        .map(|card| card.position)
        .min()
        .map_or(pinned, |lowest| lowest.min(pinned))
}

/// Assign the card at `inserted_at` the first unpinned slot and push every
/// other unpinned card down by one. Pinned cards are not renumbered.
pub fn renumber_after_insert(cards: &mut [Card], inserted_at: usize) {
    if inserted_at >= cards.len() {
        return;
    }
    let others: Vec<Card> = cards
        .iter()
        .enumerate()
        .filter(|(index, _)| *index != inserted_at)
        .map(|(_, card)| card.clone())
        .collect();
    let base = new_card_position(&others);

    for (index, card) in cards.iter_mut().enumerate() {
        if index == inserted_at {
            card.position = base;
        } else if !card.pinned {
            card.position += 1;
        }
    }
}

/// Insert a freshly created (unpinned) card at the top of the unpinned block.
/// Returns the display index it landed at.
pub fn insert_new_card(cards: &mut Vec<Card>, card: Card) -> usize {
    sort_for_display(cards);
    let at = insertion_index_for_new_card(cards);
    cards.insert(at, card);
    renumber_after_insert(cards, at);
    sort_for_display(cards);
    at
}

/// Destination index for a card entering this list from another list.
/// Deliberately ignores whatever drop index the user targeted.
pub fn cross_list_move_target(dest_cards: &[Card]) -> usize {
    pinned_count(dest_cards)
}

/// Place a card arriving from another list. Unpinned cards go through the
/// same renumbering as a new card; pinned cards join the end of the pinned
/// block and leave unpinned positions alone.
pub fn place_moved_card(dest_cards: &mut Vec<Card>, card: Card) -> usize {
    sort_for_display(dest_cards);
    let at = cross_list_move_target(dest_cards);
    if card.pinned {
        dest_cards.insert(at, card);
        return at;
    }
    dest_cards.insert(at, card);
    renumber_after_insert(dest_cards, at);
    sort_for_display(dest_cards);
    at
}

/// Unpin `id` and re-enter it at the top of the unpinned block, pushing the
/// other unpinned cards down by one. Returns false if the card is not here.
pub fn unpin_card(cards: &mut Vec<Card>, id: &EntityId) -> bool {
    let Some(index) = cards.iter().position(|card| &card.id == id) else {
        return false;
    };
    let mut card = cards.remove(index);
    card.pinned = false;
    insert_new_card(cards, card);
    true
}

/// Insert a remote-origin card at the position it already carries.
/// Unpinned siblings at or after that position shift down by one when the
/// slot is taken, keeping positions unique.
pub fn insert_at_position(cards: &mut Vec<Card>, card: Card) {
    if card.pinned {
        sort_for_display(cards);
        let at = pinned_count(cards);
        cards.insert(at, card);
        return;
    }
    let taken = cards
        .iter()
        .any(|other| !other.pinned && other.position == card.position);
    if taken {
        for other in cards.iter_mut().filter(|other| !other.pinned) {
            if other.position >= card.position {
                other.position += 1;
            }
        }
    }
    cards.push(card);
    sort_for_display(cards);
}

/// Literal array move within one list followed by sequential renumbering
/// `0..n-1`. Returns false (and leaves `cards` untouched) for an
/// out-of-range index.
pub fn intra_list_reorder(cards: &mut Vec<Card>, from_index: usize, to_index: usize) -> bool {
    if from_index >= cards.len() || to_index >= cards.len() {
        return false;
    }
    let card = cards.remove(from_index);
    cards.insert(to_index, card);
    for (index, card) in cards.iter_mut().enumerate() {
        card.position = index as i64;
    }
    // An unpinned card dropped into the pinned block snaps back below it
    sort_for_display(cards);
    true
}

/// Authoritative bulk reorder. Cards missing from the map keep their
/// position; ids in the map that are not in `cards` are ignored.
pub fn apply_position_map(cards: &mut [Card], positions: &PositionMap) {
    for card in cards.iter_mut() {
        if let Some(position) = positions.get(&card.id) {
            card.position = *position;
        }
    }
    sort_for_display(cards);
}

// ========================
// Lists
// ========================

pub fn sort_lists(lists: &mut [List]) {
    lists.sort_by_key(|list| list.position);
}

/// Non-archived lists in board order
pub fn visible_lists(lists: &[List]) -> Vec<List> {
    let mut visible: Vec<List> = lists.iter().filter(|list| !list.archived).cloned().collect();
    sort_lists(&mut visible);
    visible
}

/// Position for a list appended at the end of the board
pub fn next_list_position(lists: &[List]) -> i64 {
    lists
        .iter()
        .map(|list| list.position)
        .max()
        .map_or(0, |max| max + 1)
}

/// Move a visible list from one display index to another and renumber the
/// visible lists `0..n-1`. Archived lists keep their positions.
pub fn reorder_lists(lists: &mut Vec<List>, from_index: usize, to_index: usize) -> bool {
    let mut visible = visible_lists(lists);
    if from_index >= visible.len() || to_index >= visible.len() {
        return false;
    }
    let moved = visible.remove(from_index);
    visible.insert(to_index, moved);

    let positions: PositionMap = visible
        .iter()
        .enumerate()
        .map(|(index, list)| (list.id.clone(), index as i64))
        .collect();
    apply_list_position_map(lists, &positions);
    true
}

/// Authoritative bulk list reorder; same tolerance rules as [`apply_position_map`]
pub fn apply_list_position_map(lists: &mut [List], positions: &PositionMap) {
    for list in lists.iter_mut() {
        if let Some(position) = positions.get(&list.id) {
            list.position = *position;
        }
    }
    sort_lists(lists);
}

/// Entities of `after` whose position differs from their counterpart in
/// `before`, paired with the new position. Entities absent from `before`
/// are skipped.
pub fn changed_positions<T, F>(before: &[T], after: &[T], position: F) -> Vec<(EntityId, i64)>
where
    T: Entity,
    F: Fn(&T) -> i64,
{
    after
        .iter()
        .filter_map(|entity| {
            let previous = before.iter().find(|old| old.id() == entity.id())?;
            (position(previous) != position(entity)).then(|| (entity.id().clone(), position(entity)))
        })
        .collect()
}
