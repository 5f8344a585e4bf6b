//! The connection lifecycle as a pure transition function.
//!
//! The supervisor owns the state and performs the side effects; this module
//! only decides what happens next. Keeping the table free of I/O means every
//! edge can be tested without a runtime.

use std::time::Duration;

use idlekeeper_session::SessionEvent;

use crate::ReconnectPolicy;

// ---------------------------------------------------------------------------
// LinkState
// ---------------------------------------------------------------------------

/// Where the supervisor is in the connection lifecycle.
///
/// ```text
/// Disconnected → Connecting → Joined → Ended → Connecting → ...
///                     └──────────────────┘
/// ```
///
/// - **Disconnected**: nothing attempted yet.
/// - **Connecting**: a session exists but has not logged in.
/// - **Joined**: the player is in the world and behaviors are armed.
/// - **Ended**: the session is over. Either a reconnect is pending or the
///   process is about to exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkState {
    #[default]
    Disconnected,
    Connecting,
    Joined,
    Ended,
}

impl LinkState {
    /// Whether a session is currently open (joined or not).
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Connecting | Self::Joined)
    }

    /// The state after opening a new session. Only valid when no session is
    /// live.
    pub fn start(self) -> Option<Self> {
        match self {
            Self::Disconnected | Self::Ended => Some(Self::Connecting),
            Self::Connecting | Self::Joined => None,
        }
    }
}

impl std::fmt::Display for LinkState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disconnected => write!(f, "Disconnected"),
            Self::Connecting => write!(f, "Connecting"),
            Self::Joined => write!(f, "Joined"),
            Self::Ended => write!(f, "Ended"),
        }
    }
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

/// A side effect the supervisor must perform after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Arm the behavior timers for the current session.
    ArmBehaviors,
    /// Head towards the configured initial position, if there is one.
    MoveToInitialPosition,
    /// Hand the inbound message to the chat log.
    LogChat,
    /// Terminate the current session so that its `End` event fires.
    ForceEnd { reason: String },
    /// Open a new session after `delay`.
    Reconnect { delay: Duration },
    /// Give up: the process exits with a failure status.
    Terminate { reason: String },
}

// ---------------------------------------------------------------------------
// Transition
// ---------------------------------------------------------------------------

/// Computes the next state and the actions for one session event.
///
/// Events arriving while no session is live belong to a superseded session
/// and are ignored. Kicks and errors never end the session by themselves:
/// they request a [`ForceEnd`](Action::ForceEnd), and the single reconnect
/// decision happens when the resulting `End` arrives.
pub fn transition(
    state: LinkState,
    event: &SessionEvent,
    reconnect: &ReconnectPolicy,
) -> (LinkState, Vec<Action>) {
    if !state.is_live() {
        return (state, Vec::new());
    }

    match event {
        SessionEvent::Login if state == LinkState::Connecting => (
            LinkState::Joined,
            vec![Action::ArmBehaviors, Action::MoveToInitialPosition],
        ),
        SessionEvent::Login | SessionEvent::Spawn => (state, Vec::new()),
        SessionEvent::Message { .. } => (state, vec![Action::LogChat]),
        SessionEvent::Kicked { reason } => (
            state,
            vec![Action::ForceEnd {
                reason: reason.clone(),
            }],
        ),
        SessionEvent::Error { message } => (
            state,
            vec![Action::ForceEnd {
                reason: message.clone(),
            }],
        ),
        SessionEvent::End { reason } => {
            let action = if reconnect.enabled {
                Action::Reconnect {
                    delay: reconnect.delay(),
                }
            } else {
                Action::Terminate {
                    reason: reason.clone(),
                }
            };
            (LinkState::Ended, vec![action])
        }
    }
}
