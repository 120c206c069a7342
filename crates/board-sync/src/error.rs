//! Error Types
//!
//! Action-level failures returned by the board engine.

use thiserror::Error;

use crate::domain::{EntityId, EntityKind};
use crate::remote::RemoteError;

/// Common result type for board actions
pub type SyncResult<T> = Result<T, SyncError>;

/// Why a board action did not complete
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SyncError {
    /// The remote call rejected; the store has been rolled back
    #[error("{action} failed: {source}")]
    Remote {
        action: &'static str,
        #[source]
        source: RemoteError,
    },

    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: EntityId },

    /// The entity still carries a temp id and cannot be addressed remotely yet
    #[error("{kind} {id} is still being created")]
    PendingCreation { kind: EntityKind, id: EntityId },

    #[error("index {index} out of range for {len} entries")]
    IndexOutOfRange { index: usize, len: usize },
}

impl SyncError {
    pub fn not_found(kind: EntityKind, id: &EntityId) -> Self {
        SyncError::NotFound {
            kind,
            id: id.clone(),
        }
    }

    pub fn pending(kind: EntityKind, id: &EntityId) -> Self {
        SyncError::PendingCreation {
            kind,
            id: id.clone(),
        }
    }
}
