//! Board Sync
//!
//! Optimistic mutation and realtime reconciliation for a kanban board.
//!
//! - `domain`: lists, cards, partial snapshots and realtime events
//! - `ordering`: pinned-first display order and position reassignment
//! - `store`: the single shared board state
//! - `optimistic`: speculative apply, remote call, reconcile or roll back
//! - `reconcile`: merging pushed events into the store
//! - `connection` / `realtime`: push-channel health and frame intake
//! - `board`: the actions the UI calls

pub mod board;
pub mod config;
pub mod connection;
pub mod domain;
pub mod error;
pub mod optimistic;
pub mod ordering;
pub mod realtime;
pub mod reconcile;
pub mod remote;
pub mod store;

pub use board::BoardSync;
pub use config::{BackoffConfig, BoardConfig, ConfigError};
pub use connection::{ConnectionMachine, ConnectionState, Retry, TransitionError};
pub use domain::{
    Card, CardDraft, CardPatch, Entity, EntityId, EntityKind, EntityPatch, EntitySnapshot, List,
    ListDraft, ListPatch, PositionMap, PresenceUpdate, RealtimeEvent,
};
pub use error::{SyncError, SyncResult};
pub use optimistic::{BatchOutcome, ExecuteOptions, OptimisticExecutor, ToastSink};
pub use realtime::{FrameOutcome, RealtimeSession};
pub use reconcile::{Outcome, PresenceSink, Reconciler};
pub use remote::{BoardSnapshot, RemoteClient, RemoteError, RemoteResult};
pub use store::{BoardState, BoardStore, StoreSignal};
