//! Domain Layer - Entity Identity
//!
//! Every board entity (list or card) is addressed by an `EntityId`.
//! Ids minted on the client before the server has confirmed a creation carry
//! a reserved prefix and are called temp ids.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Reserved prefix for client-minted placeholder ids
pub const TEMP_ID_PREFIX: &str = "temp-";

/// Identity of a list or card
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Build a placeholder id from a client-local sequence number
    pub fn temp(seq: u64) -> Self {
        Self(format!("{TEMP_ID_PREFIX}{seq}"))
    }

    /// True for ids minted by the client that the server has not replaced yet
    pub fn is_temp(&self) -> bool {
        self.0.starts_with(TEMP_ID_PREFIX)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for EntityId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Which kind of board entity an id refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    List,
    Card,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::List => f.write_str("list"),
            EntityKind::Card => f.write_str("card"),
        }
    }
}

/// Core trait for board entities
pub trait Entity: Clone {
    const KIND: EntityKind;

    /// Returns the entity's identifier
    fn id(&self) -> &EntityId;

    /// Returns the title used by the temp-entity matching heuristic
    fn title(&self) -> &str;

    fn is_temp(&self) -> bool {
        self.id().is_temp()
    }
}
