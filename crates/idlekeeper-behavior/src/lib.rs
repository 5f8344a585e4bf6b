//! Timed behaviors that keep an idlekeeper session looking active.
//!
//! Three independent behaviors, armed once per joined session:
//!
//! - **Anti-idle** ([`AntiIdle`]) — every tick: match the sneak policy, pulse
//!   jump for [`JUMP_PULSE`], and hold one randomly drawn movement direction.
//! - **Scripted chat** ([`ChatLoop`]) — send configured messages in order,
//!   wrapping around, one per interval.
//! - **Chat log** ([`ChatLog`]) — log every inbound message as plain text.
//!
//! Each timer runs as its own Tokio task and carries an [`EpochGuard`]. When
//! the session it was armed for ends, the epoch moves on and the task exits
//! at its next wake-up without touching the session.
//!
//! # Integration
//!
//! ```ignore
//! let epoch = EpochCounter::new();
//! let armed = idlekeeper_behavior::arm(Arc::clone(&session), epoch.guard(), &config);
//! // ... session ends ...
//! epoch.advance();
//! armed.cancel();
//! ```

mod anti_idle;
mod chat;
mod epoch;
mod scheduler;

pub use anti_idle::{AntiIdle, AntiIdleConfig, AntiIdleTick, JUMP_PULSE, run_anti_idle};
pub use chat::{
    ABSENT_RETRY, ChatConfig, ChatLog, ChatLoop, ChatStep, MIN_CHAT_INTERVAL_SECS, run_chat,
};
pub use epoch::{EpochCounter, EpochGuard};
pub use scheduler::{ArmedBehaviors, BehaviorConfig, arm};
