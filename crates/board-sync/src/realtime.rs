//! Realtime Session
//!
//! Couples the connection state machine with the reconciler. The transport
//! driver (a WebSocket in the browser) reports opens, frames and failures;
//! the session decides whether a frame reaches the store.

use crate::config::BackoffConfig;
use crate::connection::{ConnectionMachine, ConnectionState, Retry, TransitionError};
use crate::domain::RealtimeEvent;
use crate::reconcile::{Outcome, Reconciler};

/// What happened to one inbound frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameOutcome {
    Reconciled(Outcome),
    /// Arrived while not connected; not buffered
    Dropped,
    /// Could not be decoded; logged and skipped
    Malformed,
}

pub struct RealtimeSession {
    machine: ConnectionMachine,
    reconciler: Reconciler,
    /// Set by a failure; the next open should trigger a full resync
    missed_events: bool,
}

impl RealtimeSession {
    pub fn new(reconciler: Reconciler, backoff: BackoffConfig) -> Self {
        Self {
            machine: ConnectionMachine::new(backoff),
            reconciler,
            missed_events: false,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.machine.state()
    }

    /// Transport opened. Returns true when events may have been missed
    /// since the previous connection and the board should be re-fetched.
    pub fn on_open(&mut self) -> Result<bool, TransitionError> {
        self.machine.on_open()?;
        Ok(std::mem::take(&mut self.missed_events))
    }

    /// One raw text frame from the push channel
    pub fn on_frame(&mut self, raw: &str) -> FrameOutcome {
        match RealtimeEvent::from_json(raw) {
            Ok(event) => self.on_event(&event),
            Err(error) => {
                log::warn!("dropping malformed realtime frame: {error}");
                FrameOutcome::Malformed
            }
        }
    }

    /// One decoded event
    pub fn on_event(&mut self, event: &RealtimeEvent) -> FrameOutcome {
        if !self.machine.accepts_events() {
            log::debug!("dropping {} received while {}", event.name(), self.machine.state());
            return FrameOutcome::Dropped;
        }
        FrameOutcome::Reconciled(self.reconciler.handle(event))
    }

    pub fn on_failure(&mut self, jitter_sample: f64) -> Retry {
        self.missed_events = true;
        self.machine.on_failure(jitter_sample)
    }

    pub fn request_reconnect(&mut self) -> Result<(), TransitionError> {
        self.machine.request_reconnect()
    }

    pub fn disconnect(&mut self) {
        self.missed_events = true;
        self.machine.disconnect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Card, List, PresenceUpdate};
    use crate::reconcile::PresenceSink;
    use crate::remote::BoardSnapshot;
    use crate::store::{BoardState, BoardStore};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Presence(RefCell<Vec<String>>);

    impl PresenceSink for Presence {
        fn presence_changed(&self, update: &PresenceUpdate) {
            self.0.borrow_mut().push(update.user_id.clone());
        }
    }

    fn session() -> (RealtimeSession, BoardStore, Rc<Presence>) {
        let store = BoardStore::new(BoardState::from_snapshot(BoardSnapshot {
            lists: vec![List::new("l1", "Todo", 0)],
            cards: vec![Card::new("c1", "l1", "One", 0)],
        }));
        let presence = Rc::new(Presence::default());
        let reconciler = Reconciler::new(store.clone(), presence.clone());
        (RealtimeSession::new(reconciler, BackoffConfig::default()), store, presence)
    }

    const DELETE_C1: &str = r#"{"type":"entityDeleted","kind":"card","id":"c1"}"#;

    #[test]
    fn test_frames_before_open_are_dropped() {
        let (mut session, store, _) = session();
        assert_eq!(session.on_frame(DELETE_C1), FrameOutcome::Dropped);
        assert_eq!(store.read(|s| s.card_count()), 1);
    }

    #[test]
    fn test_malformed_frame_does_not_stop_later_frames() {
        let (mut session, store, _) = session();
        session.on_open().unwrap();

        assert_eq!(session.on_frame("{\"type\":\"entityDeleted\""), FrameOutcome::Malformed);
        assert_eq!(session.on_frame(r#"{"type":"mystery"}"#), FrameOutcome::Malformed);
        assert_eq!(
            session.on_frame(DELETE_C1),
            FrameOutcome::Reconciled(Outcome::Removed(vec!["c1".into()]))
        );
        assert_eq!(store.read(|s| s.card_count()), 0);
    }

    #[test]
    fn test_presence_is_forwarded_not_stored() {
        let (mut session, store, presence) = session();
        session.on_open().unwrap();
        let before = store.snapshot();

        let outcome = session.on_frame(r#"{"type":"presenceUpdate","userId":"u7","online":true}"#);

        assert_eq!(outcome, FrameOutcome::Reconciled(Outcome::Forwarded));
        assert_eq!(*presence.0.borrow(), vec!["u7".to_string()]);
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn test_reopen_after_failure_requests_resync() {
        let (mut session, _, _) = session();
        assert!(!session.on_open().unwrap());

        session.on_failure(0.1);
        assert_eq!(session.state(), ConnectionState::Reconnecting);
        assert_eq!(session.on_frame(DELETE_C1), FrameOutcome::Dropped);

        assert!(session.on_open().unwrap());
        assert!(!session.on_open().unwrap());
    }
}
