//! Card Entity
//!
//! A card belongs to exactly one list at any instant. Its `position` orders it
//! among siblings sharing the same `pinned` value.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::entity::{Entity, EntityId, EntityKind};

/// A board card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: EntityId,
    /// Owning list
    pub list_id: EntityId,
    pub position: i64,
    #[serde(default)]
    pub pinned: bool,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Due date as unix milliseconds
    #[serde(default)]
    pub due_at: Option<i64>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub assignees: Vec<String>,
    #[serde(default)]
    pub custom_fields: BTreeMap<String, Value>,
    /// Server-assigned modification time (unix milliseconds)
    #[serde(default)]
    pub updated_at: Option<i64>,
}

impl Card {
    pub fn new(
        id: impl Into<EntityId>,
        list_id: impl Into<EntityId>,
        title: impl Into<String>,
        position: i64,
    ) -> Self {
        Self {
            id: id.into(),
            list_id: list_id.into(),
            position,
            pinned: false,
            title: title.into(),
            description: None,
            due_at: None,
            labels: Vec::new(),
            assignees: Vec::new(),
            custom_fields: BTreeMap::new(),
            updated_at: None,
        }
    }

    pub fn pinned(mut self) -> Self {
        self.pinned = true;
        self
    }
}

impl Entity for Card {
    const KIND: EntityKind = EntityKind::Card;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }
}

/// Fields sent to the remote client when creating a card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardDraft {
    pub list_id: EntityId,
    pub title: String,
    pub position: i64,
}

/// Partial card snapshot.
///
/// `None` means "not carried": the stored field group is preserved.
/// Nullable fields use a double option so that an explicit `null` clears them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pinned: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(
        default,
        deserialize_with = "nullable::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "nullable::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_at: Option<Option<i64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignees: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_fields: Option<BTreeMap<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
}

impl CardPatch {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    pub fn pinned(pinned: bool) -> Self {
        Self {
            pinned: Some(pinned),
            ..Default::default()
        }
    }

    pub fn position(position: i64) -> Self {
        Self {
            position: Some(position),
            ..Default::default()
        }
    }

    /// Merge carried fields onto `card`.
    ///
    /// `list_id` and `archived` are membership changes and are left to the
    /// caller. Returns true if `position` or `pinned` changed.
    pub fn apply_to(&self, card: &mut Card) -> bool {
        let mut reorder = false;
        if let Some(position) = self.position {
            reorder |= card.position != position;
            card.position = position;
        }
        if let Some(pinned) = self.pinned {
            reorder |= card.pinned != pinned;
            card.pinned = pinned;
        }
        if let Some(title) = &self.title {
            card.title = title.clone();
        }
        if let Some(description) = &self.description {
            card.description = description.clone();
        }
        if let Some(due_at) = self.due_at {
            card.due_at = due_at;
        }
        if let Some(labels) = &self.labels {
            card.labels = labels.clone();
        }
        if let Some(assignees) = &self.assignees {
            card.assignees = assignees.clone();
        }
        if let Some(custom_fields) = &self.custom_fields {
            card.custom_fields = custom_fields.clone();
        }
        if let Some(updated_at) = self.updated_at {
            card.updated_at = Some(updated_at);
        }
        reorder
    }
}

impl From<&Card> for CardPatch {
    fn from(card: &Card) -> Self {
        Self {
            list_id: Some(card.list_id.clone()),
            position: Some(card.position),
            pinned: Some(card.pinned),
            title: Some(card.title.clone()),
            description: Some(card.description.clone()),
            due_at: Some(card.due_at),
            labels: Some(card.labels.clone()),
            assignees: Some(card.assignees.clone()),
            custom_fields: Some(card.custom_fields.clone()),
            archived: None,
            updated_at: card.updated_at,
        }
    }
}

mod nullable {
    use serde::{Deserialize, Deserializer};

    /// Present-but-null deserializes to `Some(None)`; absence is handled by `default`
    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_preserves_absent_field_groups() {
        let mut card = Card::new("c1", "l1", "Write docs", 3);
        card.labels = vec!["urgent".to_string()];
        card.description = Some("draft".to_string());

        let patch: CardPatch = serde_json::from_str(r#"{"title":"Write better docs"}"#).unwrap();
        let reorder = patch.apply_to(&mut card);

        assert!(!reorder);
        assert_eq!(card.title, "Write better docs");
        assert_eq!(card.labels, vec!["urgent".to_string()]);
        assert_eq!(card.description.as_deref(), Some("draft"));
    }

    #[test]
    fn test_explicit_null_clears_nullable_field() {
        let mut card = Card::new("c1", "l1", "Ship", 0);
        card.due_at = Some(1_700_000_000_000);

        let patch: CardPatch = serde_json::from_str(r#"{"dueAt":null}"#).unwrap();
        assert_eq!(patch.due_at, Some(None));
        patch.apply_to(&mut card);
        assert_eq!(card.due_at, None);
    }

    #[test]
    fn test_pin_change_reports_reorder() {
        let mut card = Card::new("c1", "l1", "Ship", 4);
        assert!(CardPatch::pinned(true).apply_to(&mut card));
        assert!(card.pinned);
        assert!(!CardPatch::pinned(true).apply_to(&mut card));
    }
}
