//! Domain Layer
//!
//! Board entities, their partial snapshots and the realtime event union.
//! This layer has no dependencies beyond serde.

mod card;
mod entity;
mod event;
mod list;

pub use card::{Card, CardDraft, CardPatch};
pub use entity::{Entity, EntityId, EntityKind, TEMP_ID_PREFIX};
pub use event::{EntityPatch, EntitySnapshot, PositionMap, PresenceUpdate, RealtimeEvent};
pub use list::{List, ListDraft, ListPatch};
