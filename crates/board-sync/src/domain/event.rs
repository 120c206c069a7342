//! Realtime Events
//!
//! Events pushed by the server describing what other actors changed.
//! Every event carries enough state to be applied without having seen any
//! earlier event.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::card::{Card, CardPatch};
use super::entity::{EntityId, EntityKind};
use super::list::{List, ListPatch};

/// Id -> position assignment carried by reorder events
pub type PositionMap = BTreeMap<EntityId, i64>;

/// Full state of a newly created entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum EntitySnapshot {
    List(List),
    Card(Card),
}

/// Changed fields of an existing entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum EntityPatch {
    List {
        id: EntityId,
        #[serde(default)]
        changes: ListPatch,
    },
    Card {
        id: EntityId,
        #[serde(default)]
        changes: CardPatch,
    },
}

/// Another actor's cursor / viewing state. Never touches board entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceUpdate {
    pub user_id: String,
    #[serde(default)]
    pub viewing_card: Option<EntityId>,
    #[serde(default)]
    pub online: bool,
    #[serde(default)]
    pub extra: Option<Value>,
}

/// A single push-channel event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RealtimeEvent {
    EntityCreated {
        entity: EntitySnapshot,
    },
    EntityUpdated {
        entity: EntityPatch,
    },
    EntityDeleted {
        kind: EntityKind,
        id: EntityId,
    },
    EntityMoved {
        #[serde(rename = "cardId")]
        card_id: EntityId,
        #[serde(rename = "fromList")]
        from_list: EntityId,
        #[serde(rename = "toList")]
        to_list: EntityId,
        #[serde(default)]
        position: Option<i64>,
    },
    ListReordered {
        positions: PositionMap,
    },
    CardsReordered {
        #[serde(rename = "listId")]
        list_id: EntityId,
        positions: PositionMap,
    },
    PresenceUpdate(PresenceUpdate),
}

impl RealtimeEvent {
    /// Decode one push frame
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            RealtimeEvent::EntityCreated { .. } => "entityCreated",
            RealtimeEvent::EntityUpdated { .. } => "entityUpdated",
            RealtimeEvent::EntityDeleted { .. } => "entityDeleted",
            RealtimeEvent::EntityMoved { .. } => "entityMoved",
            RealtimeEvent::ListReordered { .. } => "listReordered",
            RealtimeEvent::CardsReordered { .. } => "cardsReordered",
            RealtimeEvent::PresenceUpdate(_) => "presenceUpdate",
        }
    }
}
