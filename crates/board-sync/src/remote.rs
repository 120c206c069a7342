//! Remote Operation Client
//!
//! Abstract interface to the content-management API. Implementations live
//! outside this crate (a JS bridge in the browser shell, fakes in tests).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{Card, CardDraft, CardPatch, EntityId, List, ListDraft, ListPatch};

pub type RemoteResult<T> = Result<T, RemoteError>;

/// A rejected remote call, carrying a human-readable message
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct RemoteError {
    pub message: String,
}

impl RemoteError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Everything on the board, as returned by a full fetch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub lists: Vec<List>,
    pub cards: Vec<Card>,
}

/// Authoritative operations on the remote board.
///
/// Every mutating call resolves to the server's view of the entity.
/// Futures are not required to be `Send`: the engine runs on a single
/// cooperative thread.
#[async_trait(?Send)]
pub trait RemoteClient {
    /// Fetch every list and card of the board
    async fn fetch_board(&self) -> RemoteResult<BoardSnapshot>;

    async fn create_card(&self, draft: &CardDraft) -> RemoteResult<Card>;

    async fn update_card(&self, id: &EntityId, patch: &CardPatch) -> RemoteResult<Card>;

    async fn delete_card(&self, id: &EntityId) -> RemoteResult<()>;

    /// Change list membership; `position` is the slot in the destination
    async fn move_card(&self, id: &EntityId, to_list: &EntityId, position: i64) -> RemoteResult<Card>;

    async fn create_list(&self, draft: &ListDraft) -> RemoteResult<List>;

    async fn update_list(&self, id: &EntityId, patch: &ListPatch) -> RemoteResult<List>;

    async fn delete_list(&self, id: &EntityId) -> RemoteResult<()>;
}
