//! Arming all behaviors for a freshly joined session.
//!
//! [`arm`] is called once per login. It spawns one task per enabled timer
//! and returns their handles in an [`ArmedBehaviors`]; the supervisor keeps
//! that value for as long as the session lives and drops it on `End`.

use std::sync::Arc;

use idlekeeper_session::GameSession;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::info;

use crate::{AntiIdle, AntiIdleConfig, ChatConfig, ChatLoop, EpochGuard, run_anti_idle, run_chat};

/// Policies for every behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    pub anti_idle: AntiIdleConfig,
    pub chat: ChatConfig,
    /// Log inbound chat messages.
    pub chat_log: bool,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            anti_idle: AntiIdleConfig::default(),
            chat: ChatConfig::default(),
            chat_log: true,
        }
    }
}

/// Timer tasks armed for one session.
///
/// Dropping the value aborts every task.
#[derive(Debug, Default)]
pub struct ArmedBehaviors {
    handles: Vec<JoinHandle<()>>,
}

impl ArmedBehaviors {
    /// Number of timer tasks that were armed.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Aborts every timer task.
    pub fn cancel(self) {
        drop(self);
    }
}

impl Drop for ArmedBehaviors {
    fn drop(&mut self) {
        for handle in &self.handles {
            handle.abort();
        }
    }
}

/// Spawns the enabled timers for `session`.
///
/// `session` is an `Arc` because each task holds its own clone; the tasks
/// never outlive the [`ArmedBehaviors`] they are returned in, but the
/// compiler cannot know that, so `tokio::spawn` needs `'static` ownership.
///
/// Each timer is independent: its own task, its own cursor. The chat log is
/// event-driven and has no timer; the caller feeds it events.
pub fn arm<S: GameSession>(
    session: Arc<S>,
    guard: EpochGuard,
    config: &BehaviorConfig,
) -> ArmedBehaviors {
    let mut handles = Vec::new();

    if config.anti_idle.enabled {
        info!(target: "behavior", session = %session.id(), "started anti-idle module");
        let anti_idle = AntiIdle::new(config.anti_idle.clone());
        handles.push(tokio::spawn(run_anti_idle(
            Arc::clone(&session),
            guard.clone(),
            anti_idle,
        )));
    }

    if config.chat.is_active() {
        info!(
            target: "behavior",
            session = %session.id(),
            messages = config.chat.messages.len(),
            "started chat-messages module"
        );
        handles.push(tokio::spawn(run_chat(
            Arc::clone(&session),
            guard,
            ChatLoop::new(&config.chat),
        )));
    }

    ArmedBehaviors { handles }
}
