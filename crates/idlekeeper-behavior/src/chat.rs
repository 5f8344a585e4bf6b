//! Scripted chat and inbound chat logging.

use std::sync::Arc;
use std::time::Duration;

use idlekeeper_session::{GameSession, SessionEvent};
use serde::{Deserialize, Serialize};
use tokio::time;
use tracing::{debug, info, warn};

use crate::EpochGuard;

/// Retry delay while the session has no presence.
pub const ABSENT_RETRY: Duration = Duration::from_secs(30);

/// Shortest allowed gap between two scripted messages, in seconds.
pub const MIN_CHAT_INTERVAL_SECS: u64 = 1;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Scripted chat policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub enabled: bool,
    /// Keep cycling through `messages`. When `false` at most one message is
    /// ever sent per session.
    pub repeat: bool,
    /// Delay before the first message and between messages, in seconds.
    pub interval_secs: u64,
    /// Sent verbatim, in order, wrapping around.
    pub messages: Vec<String>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            repeat: true,
            interval_secs: 60,
            messages: Vec::new(),
        }
    }
}

impl ChatConfig {
    /// Fixes out-of-range values so the loop is safe to run.
    ///
    /// `interval_secs` is raised to [`MIN_CHAT_INTERVAL_SECS`]: a zero
    /// interval would resend on every wake-up without ever yielding to the
    /// timer, flooding the server until it kicks the player.
    pub fn validated(mut self) -> Self {
        if self.interval_secs < MIN_CHAT_INTERVAL_SECS {
            warn!(
                interval_secs = self.interval_secs,
                min = MIN_CHAT_INTERVAL_SECS,
                "chat interval too short, raising"
            );
            self.interval_secs = MIN_CHAT_INTERVAL_SECS;
        }
        self
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Enabled and has something to say.
    pub fn is_active(&self) -> bool {
        self.enabled && !self.messages.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Chat loop
// ---------------------------------------------------------------------------

/// Outcome of one chat loop invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatStep {
    /// `message` should be sent; run again after `next`, or never if `None`.
    Send {
        message: String,
        next: Option<Duration>,
    },
    /// Nothing sent; run again after the given delay.
    Wait(Duration),
    /// The loop is finished for this session.
    Stop,
}

/// Chat state for one session. The cursor starts at 0 and only moves when a
/// message is handed out.
#[derive(Debug, Clone)]
pub struct ChatLoop {
    messages: Vec<String>,
    repeat: bool,
    interval: Duration,
    cursor: usize,
}

impl ChatLoop {
    /// Builds a loop from a copy of `config`, validated first.
    pub fn new(config: &ChatConfig) -> Self {
        let config = config.clone().validated();
        Self {
            interval: config.interval(),
            repeat: config.repeat,
            messages: config.messages,
            cursor: 0,
        }
    }

    /// Index of the next message to send.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Decides what this invocation does, given whether the session
    /// currently has presence.
    pub fn step(&mut self, present: bool) -> ChatStep {
        if self.messages.is_empty() {
            return ChatStep::Stop;
        }
        if !present {
            return if self.repeat {
                ChatStep::Wait(ABSENT_RETRY)
            } else {
                ChatStep::Stop
            };
        }

        let message = self.messages[self.cursor].clone();
        self.cursor = (self.cursor + 1) % self.messages.len();
        ChatStep::Send {
            message,
            next: self.repeat.then_some(self.interval),
        }
    }
}

/// Drives a [`ChatLoop`] until it stops or the guard goes stale.
///
/// The first invocation happens one full interval after the call; nothing is
/// ever sent immediately on join.
pub async fn run_chat<S: GameSession>(session: Arc<S>, guard: EpochGuard, mut chat: ChatLoop) {
    let mut delay = chat.interval();

    loop {
        time::sleep(delay).await;
        if !guard.is_current() {
            debug!(session = %session.id(), "chat loop stopped, session superseded");
            return;
        }

        match chat.step(session.has_presence()) {
            ChatStep::Send { message, next } => {
                session.chat(&message);
                debug!(session = %session.id(), %message, "chat message sent");
                match next {
                    Some(next) => delay = next,
                    None => return,
                }
            }
            ChatStep::Wait(retry) => {
                debug!(
                    session = %session.id(),
                    retry_secs = retry.as_secs(),
                    "no presence, chat message deferred"
                );
                delay = retry;
            }
            ChatStep::Stop => {
                debug!(session = %session.id(), "chat loop finished");
                return;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Chat log
// ---------------------------------------------------------------------------

/// Logs inbound chat. Stateless: no buffering, no filtering.
#[derive(Debug, Clone, Copy)]
pub struct ChatLog {
    enabled: bool,
}

impl ChatLog {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Logs the event if it is an inbound message. Returns whether it logged.
    pub fn observe(&self, event: &SessionEvent) -> bool {
        match event {
            SessionEvent::Message { text } if self.enabled => {
                info!(target: "chat", "{text}");
                true
            }
            _ => false,
        }
    }
}
