//! Anti-idle: periodic synthetic movement so the server never sees an idle
//! player.

use std::sync::Arc;
use std::time::Duration;

use idlekeeper_session::{Control, Direction, GameSession};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, trace, warn};

use crate::EpochGuard;

/// How long jump stays held on each tick.
pub const JUMP_PULSE: Duration = Duration::from_millis(500);

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Anti-idle policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AntiIdleConfig {
    pub enabled: bool,
    /// Time between ticks, in milliseconds.
    pub interval_ms: u64,
    /// Whether the player should be sneaking.
    pub sneak: bool,
    /// Directions to draw from. Duplicates are ignored.
    pub movements: Vec<Direction>,
}

impl Default for AntiIdleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_ms: 10_000,
            sneak: false,
            movements: Direction::ALL.to_vec(),
        }
    }
}

impl AntiIdleConfig {
    /// Fixes out-of-range values so the config is safe to run.
    ///
    /// - `interval_ms` is raised to [`JUMP_PULSE`] so every jump is released
    ///   before the next tick.
    /// - Duplicate movements are removed, keeping first occurrences.
    pub fn validated(mut self) -> Self {
        let min = JUMP_PULSE.as_millis() as u64;
        if self.interval_ms < min {
            warn!(
                interval_ms = self.interval_ms,
                min, "anti-idle interval shorter than the jump pulse, raising"
            );
            self.interval_ms = min;
        }
        let mut seen = Vec::with_capacity(self.movements.len());
        self.movements.retain(|d| {
            if seen.contains(d) {
                false
            } else {
                seen.push(*d);
                true
            }
        });
        self
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

// ---------------------------------------------------------------------------
// Tick logic
// ---------------------------------------------------------------------------

/// What a single anti-idle tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AntiIdleTick {
    /// The session had no presence; nothing was sent.
    Skipped,
    /// Jump was pressed and, if the movement set is non-empty, a direction
    /// is now held.
    Acted { direction: Option<Direction> },
}

/// Anti-idle state for one session: the policy, the random source, and the
/// movement cursor.
pub struct AntiIdle<R = StdRng> {
    config: AntiIdleConfig,
    rng: R,
    current: Option<Direction>,
}

impl AntiIdle<StdRng> {
    /// Creates the behavior with a freshly seeded random source.
    pub fn new(config: AntiIdleConfig) -> Self {
        Self::with_rng(config, StdRng::from_rng(&mut rand::rng()))
    }
}

impl<R: Rng> AntiIdle<R> {
    /// Creates the behavior with a caller-supplied random source.
    pub fn with_rng(config: AntiIdleConfig, rng: R) -> Self {
        Self {
            config: config.validated(),
            rng,
            current: None,
        }
    }

    pub fn config(&self) -> &AntiIdleConfig {
        &self.config
    }

    /// The direction currently held, if any.
    pub fn current(&self) -> Option<Direction> {
        self.current
    }

    /// Runs one tick against `session`.
    ///
    /// Leaves jump held; the caller releases it after [`JUMP_PULSE`].
    pub fn tick<S: GameSession + ?Sized>(&mut self, session: &S) -> AntiIdleTick {
        if !session.has_presence() {
            trace!(session = %session.id(), "anti-idle tick skipped, no presence");
            return AntiIdleTick::Skipped;
        }

        if session.control_state(Control::Sneak) != self.config.sneak {
            session.set_control(Control::Sneak, self.config.sneak);
        }

        session.set_control(Control::Jump, true);

        // Release before press: two directions are never held together. Any
        // direction held by someone else (the join nudge) is released too.
        self.current = None;
        for direction in Direction::ALL {
            if session.control_state(direction.control()) {
                session.set_control(direction.control(), false);
            }
        }
        let next = self.config.movements.choose(&mut self.rng).copied();
        if let Some(direction) = next {
            session.set_control(direction.control(), true);
        }
        self.current = next;

        trace!(session = %session.id(), direction = ?next, "anti-idle tick");
        AntiIdleTick::Acted { direction: next }
    }
}

/// Drives [`AntiIdle`] until the guard goes stale.
///
/// The first tick fires one interval after the call. Ticks missed while the
/// task was not scheduled are skipped rather than replayed.
pub async fn run_anti_idle<S, R>(session: Arc<S>, guard: EpochGuard, mut anti_idle: AntiIdle<R>)
where
    S: GameSession,
    R: Rng,
{
    let period = anti_idle.config.interval();
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        if !guard.is_current() {
            debug!(session = %session.id(), "anti-idle stopped, session superseded");
            return;
        }

        if let AntiIdleTick::Acted { .. } = anti_idle.tick(session.as_ref()) {
            time::sleep(JUMP_PULSE).await;
            if guard.is_current() {
                session.set_control(Control::Jump, false);
            }
        }
    }
}
