//! The connection supervisor: one session at a time, reconnect on end.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use idlekeeper_behavior::{ArmedBehaviors, BehaviorConfig, ChatLog, EpochCounter, arm};
use idlekeeper_session::{
    ConnectOptions, Connector, Control, GameSession, SessionEvent, SessionId,
};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::{Action, IdlekeeperError, LinkState, Settings, SettingsError, transition};

// ---------------------------------------------------------------------------
// ReconnectPolicy
// ---------------------------------------------------------------------------

/// What happens after a session ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconnectPolicy {
    pub enabled: bool,
    /// Fixed delay between the end of a session and the next attempt.
    pub delay_ms: u64,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            delay_ms: 15_000,
        }
    }
}

impl ReconnectPolicy {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

// ---------------------------------------------------------------------------
// Supervisor
// ---------------------------------------------------------------------------

/// Owns the current session and the reconnect loop.
///
/// Events of the current session are processed strictly in order. When a
/// session ends, the epoch advances and its behavior tasks are aborted
/// before anything else happens, so nothing armed for an old session can
/// touch a new one.
pub struct Supervisor<C: Connector> {
    connector: C,
    options: ConnectOptions,
    reconnect: ReconnectPolicy,
    behavior: BehaviorConfig,
    chat_log: ChatLog,
    epoch: EpochCounter,
    next_id: SessionId,
    state: watch::Sender<LinkState>,
}

impl<C: Connector> Supervisor<C> {
    /// Builds a supervisor from validated settings.
    ///
    /// Fails without touching the network if the username or host is
    /// missing.
    pub fn new(settings: &Settings, connector: C) -> Result<Self, SettingsError> {
        settings.validate()?;
        let (state, _) = watch::channel(LinkState::Disconnected);
        Ok(Self {
            connector,
            options: settings.connect_options(),
            reconnect: settings.reconnect,
            behavior: settings.behavior.clone(),
            chat_log: ChatLog::new(settings.behavior.chat_log),
            epoch: EpochCounter::new(),
            next_id: SessionId::new(1),
            state,
        })
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LinkState {
        *self.state.borrow()
    }

    /// Watches lifecycle state changes.
    pub fn subscribe(&self) -> watch::Receiver<LinkState> {
        self.state.subscribe()
    }

    /// Runs sessions forever.
    ///
    /// Only returns when a session ends while reconnecting is disabled.
    pub async fn run(mut self) -> Result<Infallible, IdlekeeperError> {
        loop {
            let delay = self.run_session().await?;
            tokio::time::sleep(delay).await;
        }
    }

    /// Opens one session and processes its events until it ends. Returns
    /// the reconnect delay.
    async fn run_session(&mut self) -> Result<Duration, IdlekeeperError> {
        let id = self.next_id;
        self.next_id = id.next();
        if let Some(next) = self.state().start() {
            self.set_state(next);
        }

        info!(
            target: "afkbot",
            session = %id,
            "trying to connect to {} with account: {} ({})",
            self.options.address(),
            self.options.username,
            self.options.auth
        );
        let (session, mut events) = self.connector.connect(id, &self.options);
        let session = Arc::new(session);
        let mut armed: Option<ArmedBehaviors> = None;
        // Set once this session has been told to end; later kicks and errors
        // only wait for the `End` already on its way.
        let mut force_ended = false;

        loop {
            // A stream that closes without `End` still ends the session.
            let event = events.recv().await.unwrap_or_else(|| SessionEvent::End {
                reason: "event stream closed".into(),
            });
            log_event(id, &event);

            let (next, actions) = transition(self.state(), &event, &self.reconnect);
            self.set_state(next);

            if event.is_end() {
                self.epoch.advance();
                if let Some(armed) = armed.take() {
                    armed.cancel();
                }
            }

            for action in actions {
                match action {
                    Action::ArmBehaviors => {
                        let guard = self.epoch.guard();
                        armed = Some(arm(Arc::clone(&session), guard, &self.behavior));
                    }
                    Action::MoveToInitialPosition => {
                        if let Some(target) = self.options.initial_position {
                            info!(target: "afkbot", session = %id, "moving to initial position");
                            session.set_control(Control::Forward, true);
                            session.look_at(target);
                        }
                    }
                    Action::LogChat => {
                        self.chat_log.observe(&event);
                    }
                    Action::ForceEnd { reason } => {
                        if force_ended {
                            debug!(session = %id, %reason, "session already ending");
                        } else {
                            force_ended = true;
                            session.end(&reason);
                        }
                    }
                    Action::Reconnect { delay } => {
                        info!(
                            target: "afkbot",
                            session = %id,
                            "reconnecting in {} seconds...",
                            delay.as_secs_f64()
                        );
                        return Ok(delay);
                    }
                    Action::Terminate { reason } => {
                        error!(target: "afkbot", session = %id, "auto-reconnect is disabled, exiting");
                        return Err(IdlekeeperError::ReconnectDisabled { reason });
                    }
                }
            }
        }
    }

    fn set_state(&self, next: LinkState) {
        self.state.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            debug!(from = %current, to = %next, "link state changed");
            *current = next;
            true
        });
    }
}

fn log_event(id: SessionId, event: &SessionEvent) {
    match event {
        SessionEvent::Login => info!(target: "afkbot", session = %id, "bot joined the server"),
        SessionEvent::Spawn => debug!(target: "afkbot", session = %id, "spawned"),
        SessionEvent::Message { .. } => {}
        SessionEvent::Kicked { reason } => {
            warn!(target: "afkbot", session = %id, "kicked from server, reason: {reason}");
        }
        SessionEvent::Error { message } => {
            error!(target: "afkbot", session = %id, "session error: {message}");
        }
        SessionEvent::End { reason } => {
            info!(target: "afkbot", session = %id, "disconnected, reason: {reason}");
        }
    }
}
