//! Connection State Machine
//!
//! Tracks push-channel health and decides reconnect timing.
//!
//! ```text
//! Connecting ──open──▶ Connected ──failure──▶ Reconnecting ──open──▶ Connected
//!     │                                            │
//!     └──failure──▶ Reconnecting                   └──attempts exhausted──▶ Disconnected
//! ```
//!
//! `Disconnected` is left only through [`ConnectionMachine::request_reconnect`].

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::BackoffConfig;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    #[default]
    Connecting,
    Connected,
    Reconnecting,
    Disconnected,
}

impl ConnectionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Reconnecting => "reconnecting",
            ConnectionState::Disconnected => "disconnected",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("cannot open while {0}; an explicit reconnect is required")]
    OpenWhile(ConnectionState),
    #[error("already connected")]
    AlreadyConnected,
}

/// What the driver should do after a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Retry {
    /// Try again after `delay`
    After { attempt: u32, delay: Duration },
    /// Attempts exhausted; now `Disconnected`
    GiveUp,
    /// Already disconnected; nothing scheduled
    Idle,
}

/// Exponential backoff cap for a 1-based attempt: `base * 2^(attempt-1)`,
/// clamped to `max`
pub fn backoff_cap(config: &BackoffConfig, attempt: u32) -> Duration {
    let exponent = attempt.saturating_sub(1).min(31);
    let factor = 1u64 << exponent;
    let delay_ms = config.base_delay_ms.saturating_mul(factor).min(config.max_delay_ms);
    Duration::from_millis(delay_ms)
}

/// Apply jitter to a cap. `sample` is a uniform random value in `[0, 1)`;
/// the result lies in `[cap * (1 - jitter), cap]`.
pub fn jittered(cap: Duration, jitter: f64, sample: f64) -> Duration {
    let jitter = jitter.clamp(0.0, 1.0);
    let sample = sample.clamp(0.0, 1.0);
    let scale = 1.0 - jitter + jitter * sample;
    Duration::from_nanos((cap.as_nanos() as f64 * scale) as u64)
}

#[derive(Debug, Clone)]
pub struct ConnectionMachine {
    state: ConnectionState,
    attempt: u32,
    backoff: BackoffConfig,
}

impl ConnectionMachine {
    /// A fresh machine starts in `Connecting`
    pub fn new(backoff: BackoffConfig) -> Self {
        Self {
            state: ConnectionState::Connecting,
            attempt: 0,
            backoff,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Failures since the last successful open
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Events are only reconciled while connected
    pub fn accepts_events(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    /// The transport opened. Legal from `Connecting` and `Reconnecting`;
    /// a repeated open while connected is a no-op.
    pub fn on_open(&mut self) -> Result<(), TransitionError> {
        match self.state {
            ConnectionState::Connecting | ConnectionState::Reconnecting => {
                log::info!("push channel connected (after {} failed attempts)", self.attempt);
                self.state = ConnectionState::Connected;
                self.attempt = 0;
                Ok(())
            }
            ConnectionState::Connected => Ok(()),
            ConnectionState::Disconnected => Err(TransitionError::OpenWhile(self.state)),
        }
    }

    /// The transport failed or closed unexpectedly
    pub fn on_failure(&mut self, jitter_sample: f64) -> Retry {
        if self.state == ConnectionState::Disconnected {
            return Retry::Idle;
        }
        self.attempt += 1;
        if self
            .backoff
            .max_attempts
            .is_some_and(|max| self.attempt > max)
        {
            log::info!("push channel gave up after {} attempts", self.attempt - 1);
            self.state = ConnectionState::Disconnected;
            return Retry::GiveUp;
        }
        self.state = ConnectionState::Reconnecting;
        let cap = backoff_cap(&self.backoff, self.attempt);
        let delay = jittered(cap, self.backoff.jitter, jitter_sample);
        log::info!("push channel lost, retry {} in {:?}", self.attempt, delay);
        Retry::After {
            attempt: self.attempt,
            delay,
        }
    }

    /// User-requested reconnect; accepted from any state but `Connected`
    pub fn request_reconnect(&mut self) -> Result<(), TransitionError> {
        if self.state == ConnectionState::Connected {
            return Err(TransitionError::AlreadyConnected);
        }
        log::info!("manual reconnect requested while {}", self.state);
        self.state = ConnectionState::Connecting;
        self.attempt = 0;
        Ok(())
    }

    /// Deliberate shutdown (page unload, board closed)
    pub fn disconnect(&mut self) {
        self.state = ConnectionState::Disconnected;
    }
}
