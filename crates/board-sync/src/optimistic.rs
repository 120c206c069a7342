//! Optimistic Executor
//!
//! Apply a speculative change, invoke the remote operation, then either
//! reconcile with the authoritative result or roll back to the exact state
//! captured before the change.
//!
//! The executor does not coordinate concurrent operations on the same
//! entity: each call snapshots whatever the store holds when it starts, and
//! the only suspension point is the remote call itself.

use std::future::Future;
use std::rc::Rc;

use futures::future::join_all;

use crate::error::{SyncError, SyncResult};
use crate::remote::{RemoteError, RemoteResult};
use crate::store::{BoardState, BoardStore};

/// Receives one user-visible message per failed remote call
pub trait ToastSink {
    fn error(&self, message: &str);
}

/// Per-call settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecuteOptions {
    /// Short verb phrase used in logs and errors ("create card")
    pub action: &'static str,
    /// Overrides the default toast text
    pub error_message: Option<String>,
}

impl ExecuteOptions {
    pub fn new(action: &'static str) -> Self {
        Self {
            action,
            error_message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    fn toast_for(&self, error: &RemoteError) -> String {
        match &self.error_message {
            Some(message) => message.clone(),
            None => format!("Could not {}: {}", self.action, error),
        }
    }
}

/// Result of a batch of independent remote calls
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchOutcome {
    pub fn is_complete(&self) -> bool {
        self.failed == 0
    }
}

#[derive(Clone)]
pub struct OptimisticExecutor {
    store: BoardStore,
    toasts: Rc<dyn ToastSink>,
}

impl OptimisticExecutor {
    pub fn new(store: BoardStore, toasts: Rc<dyn ToastSink>) -> Self {
        Self { store, toasts }
    }

    pub fn store(&self) -> &BoardStore {
        &self.store
    }

    /// Run one optimistic operation.
    ///
    /// `optimistic_update` is published before `remote_call` is even
    /// invoked. On success `on_success` merges the authoritative result; pass
    /// a no-op to let the optimistic state stand. On failure the store is
    /// restored to the state captured before `optimistic_update` and exactly
    /// one toast is raised.
    pub async fn execute<R, U, C, Fut, S>(
        &self,
        options: ExecuteOptions,
        optimistic_update: U,
        remote_call: C,
        on_success: S,
    ) -> SyncResult<R>
    where
        U: FnOnce(&mut BoardState),
        C: FnOnce() -> Fut,
        Fut: Future<Output = RemoteResult<R>>,
        S: FnOnce(&mut BoardState, &R),
    {
        let before = self.store.snapshot();
        self.store.mutate(optimistic_update);
        log::debug!("{}: optimistic state published", options.action);

        match remote_call().await {
            Ok(result) => {
                self.store.mutate(|state| on_success(state, &result));
                log::debug!("{}: confirmed", options.action);
                Ok(result)
            }
            Err(error) => {
                log::warn!("{}: rejected ({}), rolling back", options.action, error);
                self.store.restore(before);
                self.toasts.error(&options.toast_for(&error));
                Err(SyncError::Remote {
                    action: options.action,
                    source: error,
                })
            }
        }
    }

    /// Run a speculative change followed by independent remote calls.
    ///
    /// `optimistic_update` applies the change and returns the calls that
    /// persist it. The calls run concurrently. There is no batch rollback: a
    /// failed call raises its own toast and the store keeps whatever the
    /// other calls confirmed.
    pub async fn execute_batch<R, U, Fut, S>(
        &self,
        options: ExecuteOptions,
        optimistic_update: U,
        on_each_success: S,
    ) -> BatchOutcome
    where
        U: FnOnce(&mut BoardState) -> Vec<Fut>,
        Fut: Future<Output = RemoteResult<R>>,
        S: Fn(&mut BoardState, &R),
    {
        let calls = self.store.mutate(optimistic_update);
        log::debug!("{}: optimistic state published, {} calls", options.action, calls.len());

        let mut outcome = BatchOutcome::default();
        for result in join_all(calls).await {
            match result {
                Ok(value) => {
                    outcome.succeeded += 1;
                    self.store.mutate(|state| on_each_success(state, &value));
                }
                Err(error) => {
                    outcome.failed += 1;
                    log::warn!("{}: one call rejected ({})", options.action, error);
                    self.toasts.error(&options.toast_for(&error));
                }
            }
        }
        if outcome.failed > 0 {
            log::warn!(
                "{}: {} of {} calls failed, order may differ from the server until the next resync",
                options.action,
                outcome.failed,
                outcome.failed + outcome.succeeded
            );
        }
        outcome
    }
}
