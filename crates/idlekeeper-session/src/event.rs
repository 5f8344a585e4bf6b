//! Lifecycle events a session raises, and the channel that carries them.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::mpsc;

/// Something the protocol client observed on the session.
///
/// Events are delivered in the order they were raised. `End` is always the
/// last event of a session and is delivered exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The server accepted the login; the player is in the game.
    Login,
    /// The player entity (re)spawned in the world.
    Spawn,
    /// An inbound chat or system message, already rendered to plain text.
    Message { text: String },
    /// The server kicked the player.
    Kicked { reason: String },
    /// A transport or protocol error.
    Error { message: String },
    /// The session is over. Nothing follows this event.
    End { reason: String },
}

impl SessionEvent {
    /// Returns `true` for the final event of a session.
    pub fn is_end(&self) -> bool {
        matches!(self, Self::End { .. })
    }
}

/// Receiving half of a session's event stream.
pub type EventReceiver = mpsc::UnboundedReceiver<SessionEvent>;

/// Creates a fresh event channel for one session.
///
/// The sending half is wrapped in an [`EventEmitter`] so protocol clients
/// cannot emit anything after `End`.
pub fn event_channel() -> (EventEmitter, EventReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        EventEmitter {
            tx,
            ended: Arc::new(AtomicBool::new(false)),
        },
        rx,
    )
}

/// Sending half of a session's event stream.
///
/// Cheap to clone; all clones share the "already ended" flag, so however many
/// paths race to end a session (remote close, kick, local quit), only the
/// first `End` gets through.
#[derive(Debug, Clone)]
pub struct EventEmitter {
    tx: mpsc::UnboundedSender<SessionEvent>,
    ended: Arc<AtomicBool>,
}

impl EventEmitter {
    /// Emits a non-terminal event. Dropped silently once the session ended
    /// or the receiver is gone.
    ///
    /// Passing `SessionEvent::End` here behaves like [`end`](Self::end).
    pub fn emit(&self, event: SessionEvent) {
        if let SessionEvent::End { reason } = event {
            self.end(reason);
            return;
        }
        if self.ended.load(Ordering::Acquire) {
            tracing::trace!(?event, "event after end dropped");
            return;
        }
        let _ = self.tx.send(event);
    }

    /// Emits `End` if it has not been emitted yet.
    ///
    /// Returns `true` if this call was the one that ended the session.
    pub fn end(&self, reason: impl Into<String>) -> bool {
        if self.ended.swap(true, Ordering::AcqRel) {
            return false;
        }
        let _ = self.tx.send(SessionEvent::End {
            reason: reason.into(),
        });
        true
    }

    /// Whether `End` has already been emitted.
    pub fn has_ended(&self) -> bool {
        self.ended.load(Ordering::Acquire)
    }
}
