//! List Entity
//!
//! A column on the board. Lists own their cards and are ordered by `position`.

use serde::{Deserialize, Serialize};

use super::entity::{Entity, EntityId, EntityKind};

/// A board list (column)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct List {
    pub id: EntityId,
    pub title: String,
    /// Unique among the board's lists; totally orders the visible ones
    pub position: i64,
    #[serde(default)]
    pub archived: bool,
}

impl List {
    pub fn new(id: impl Into<EntityId>, title: impl Into<String>, position: i64) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            position,
            archived: false,
        }
    }
}

impl Entity for List {
    const KIND: EntityKind = EntityKind::List;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }
}

/// Fields sent to the remote client when creating a list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDraft {
    pub title: String,
    pub position: i64,
}

/// Partial list snapshot. Absent fields leave the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived: Option<bool>,
}

impl ListPatch {
    pub fn rename(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    pub fn archive() -> Self {
        Self {
            archived: Some(true),
            ..Default::default()
        }
    }

    pub fn position(position: i64) -> Self {
        Self {
            position: Some(position),
            ..Default::default()
        }
    }

    /// Merge carried fields onto `list`; returns true if `position` changed
    pub fn apply_to(&self, list: &mut List) -> bool {
        if let Some(title) = &self.title {
            list.title = title.clone();
        }
        if let Some(archived) = self.archived {
            list.archived = archived;
        }
        match self.position {
            Some(position) if position != list.position => {
                list.position = position;
                true
            }
            _ => false,
        }
    }
}

impl From<&List> for ListPatch {
    fn from(list: &List) -> Self {
        Self {
            title: Some(list.title.clone()),
            position: Some(list.position),
            archived: Some(list.archived),
        }
    }
}
