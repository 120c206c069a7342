//! Board Commands
//!
//! `RemoteClient` over the host bridge. Every call is scoped to one board.

use async_trait::async_trait;
use board_sync::{
    BoardSnapshot, Card, CardDraft, CardPatch, EntityId, List, ListDraft, ListPatch, RemoteClient,
    RemoteError, RemoteResult,
};
use serde::Serialize;

use super::{call, call_unit};

// ========================
// Argument Structs
// ========================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BoardArgs<'a> {
    board_id: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IdArgs<'a> {
    board_id: &'a str,
    id: &'a EntityId,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateCardArgs<'a> {
    board_id: &'a str,
    draft: &'a CardDraft,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateCardArgs<'a> {
    board_id: &'a str,
    id: &'a EntityId,
    patch: &'a CardPatch,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MoveCardArgs<'a> {
    board_id: &'a str,
    id: &'a EntityId,
    to_list: &'a EntityId,
    position: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateListArgs<'a> {
    board_id: &'a str,
    draft: &'a ListDraft,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateListArgs<'a> {
    board_id: &'a str,
    id: &'a EntityId,
    patch: &'a ListPatch,
}

// ========================
// Client
// ========================

pub struct BridgeClient {
    board_id: String,
}

impl BridgeClient {
    pub fn new(board_id: impl Into<String>) -> Self {
        Self {
            board_id: board_id.into(),
        }
    }

    fn id_args<'a>(&'a self, id: &'a EntityId) -> IdArgs<'a> {
        IdArgs {
            board_id: &self.board_id,
            id,
        }
    }
}

#[async_trait(?Send)]
impl RemoteClient for BridgeClient {
    async fn fetch_board(&self) -> RemoteResult<BoardSnapshot> {
        call("fetch_board", &BoardArgs { board_id: &self.board_id })
            .await
            .map_err(RemoteError::new)
    }

    async fn create_card(&self, draft: &CardDraft) -> RemoteResult<Card> {
        let args = CreateCardArgs {
            board_id: &self.board_id,
            draft,
        };
        call("create_card", &args).await.map_err(RemoteError::new)
    }

    async fn update_card(&self, id: &EntityId, patch: &CardPatch) -> RemoteResult<Card> {
        let args = UpdateCardArgs {
            board_id: &self.board_id,
            id,
            patch,
        };
        call("update_card", &args).await.map_err(RemoteError::new)
    }

    async fn delete_card(&self, id: &EntityId) -> RemoteResult<()> {
        call_unit("delete_card", &self.id_args(id)).await.map_err(RemoteError::new)
    }

    async fn move_card(&self, id: &EntityId, to_list: &EntityId, position: i64) -> RemoteResult<Card> {
        let args = MoveCardArgs {
            board_id: &self.board_id,
            id,
            to_list,
            position,
        };
        call("move_card", &args).await.map_err(RemoteError::new)
    }

    async fn create_list(&self, draft: &ListDraft) -> RemoteResult<List> {
        let args = CreateListArgs {
            board_id: &self.board_id,
            draft,
        };
        call("create_list", &args).await.map_err(RemoteError::new)
    }

    async fn update_list(&self, id: &EntityId, patch: &ListPatch) -> RemoteResult<List> {
        let args = UpdateListArgs {
            board_id: &self.board_id,
            id,
            patch,
        };
        call("update_list", &args).await.map_err(RemoteError::new)
    }

    async fn delete_list(&self, id: &EntityId) -> RemoteResult<()> {
        call_unit("delete_list", &self.id_args(id)).await.map_err(RemoteError::new)
    }
}
