//! Connection state machine for the realtime channel.
//!
//! The machine is pure: [`ConnectionFsm::dispatch`] takes a [`Signal`],
//! moves to the next [`ConnectionState`] and returns the [`Step`] the driver
//! must perform. All timing comes from the [`ReconnectPolicy`].

use std::fmt;
use std::time::Duration;

use tracing::trace;

use crate::config::ReconnectPolicy;

/// Observable state of the realtime connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No connection and none wanted.
    Disconnected,
    /// First attempt of an enabled period is in progress.
    Connecting,
    /// A socket is open.
    Connected,
    /// Waiting for or performing reconnection attempt `attempt`.
    Reconnecting { attempt: u32 },
    /// The reconnection budget is spent. Only an explicit enable recovers.
    Failed,
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Disconnected => f.write_str("disconnected"),
            ConnectionState::Connecting => f.write_str("connecting"),
            ConnectionState::Connected => f.write_str("connected"),
            ConnectionState::Reconnecting { attempt } => write!(f, "reconnecting ({})", attempt),
            ConnectionState::Failed => f.write_str("failed"),
        }
    }
}

/// Input to the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// The channel was enabled.
    Enable,
    /// A connection attempt succeeded.
    Opened,
    /// A connection attempt failed.
    AttemptFailed,
    /// An open connection was lost.
    Dropped,
    /// The channel was disabled.
    Disable,
}

/// What the driver has to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Open a connection now.
    Connect,
    /// Wait `delay`, then open a connection.
    Retry { attempt: u32, delay: Duration },
    /// The connection is up. `after_attempts` is 0 for a first connect.
    Established { after_attempts: u32 },
    /// Stop; the budget is spent.
    GiveUp { attempts: u32 },
    /// Close whatever is open and stop.
    Teardown,
    /// Nothing to do.
    Ignore,
}

/// Connection state machine.
#[derive(Debug, Clone)]
pub struct ConnectionFsm {
    state: ConnectionState,
    policy: ReconnectPolicy,
}

impl ConnectionFsm {
    /// Create a machine in [`ConnectionState::Disconnected`].
    pub fn new(policy: ReconnectPolicy) -> Self {
        Self {
            state: ConnectionState::Disconnected,
            policy,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Feed a signal and return the step to perform.
    pub fn dispatch(&mut self, signal: Signal) -> Step {
        use ConnectionState::*;

        let step = match (self.state, signal) {
            (Disconnected | Failed, Signal::Enable) => {
                self.state = Connecting;
                Step::Connect
            }
            (_, Signal::Enable) => Step::Ignore,

            (Connecting, Signal::Opened) => {
                self.state = Connected;
                Step::Established { after_attempts: 0 }
            }
            (Reconnecting { attempt }, Signal::Opened) => {
                self.state = Connected;
                Step::Established {
                    after_attempts: attempt,
                }
            }

            (Connecting, Signal::AttemptFailed) | (Connected, Signal::Dropped) => {
                self.schedule(1)
            }
            (Reconnecting { attempt }, Signal::AttemptFailed) => {
                self.schedule(attempt.saturating_add(1))
            }

            (Disconnected, Signal::Disable) => Step::Ignore,
            (_, Signal::Disable) => {
                self.state = Disconnected;
                Step::Teardown
            }

            _ => Step::Ignore,
        };

        trace!(?signal, state = %self.state, ?step, "Connection state dispatch");
        step
    }

    fn schedule(&mut self, attempt: u32) -> Step {
        if attempt > self.policy.max_attempts {
            self.state = ConnectionState::Failed;
            return Step::GiveUp {
                attempts: self.policy.max_attempts,
            };
        }

        self.state = ConnectionState::Reconnecting { attempt };
        Step::Retry {
            attempt,
            delay: self.policy.delay_for(attempt),
        }
    }
}
