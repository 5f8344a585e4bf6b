//! Session generations for timer cancellation.
//!
//! Aborting a task only takes effect at its next `.await`. A timer that has
//! already woken up can still run one more step after its session ended.
//! The epoch closes that gap: the supervisor advances the counter *before*
//! aborting, and every timer checks its [`EpochGuard`] right after waking,
//! so a stale step sees a newer epoch and returns without touching the
//! session.
//!
//! The counter is an `Arc<AtomicU64>` rather than a lock: reads happen on
//! every tick, writes once per session.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Shared counter identifying the current session generation.
///
/// The supervisor advances it whenever a session ends. Cloning shares the
/// same counter.
#[derive(Debug, Clone, Default)]
pub struct EpochCounter(Arc<AtomicU64>);

impl EpochCounter {
    /// Creates a counter at epoch 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current epoch.
    pub fn current(&self) -> u64 {
        self.0.load(Ordering::Acquire)
    }

    /// Moves to the next epoch and returns it. Every outstanding
    /// [`EpochGuard`] becomes stale.
    pub fn advance(&self) -> u64 {
        self.0.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// A guard pinned to the current epoch.
    pub fn guard(&self) -> EpochGuard {
        EpochGuard {
            counter: self.clone(),
            epoch: self.current(),
        }
    }
}

/// Remembers the epoch a timer was armed in.
#[derive(Debug, Clone)]
pub struct EpochGuard {
    counter: EpochCounter,
    epoch: u64,
}

impl EpochGuard {
    /// The epoch this guard was created in.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// `false` once the counter has advanced past the armed epoch.
    pub fn is_current(&self) -> bool {
        self.counter.current() == self.epoch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_counter_starts_at_zero() {
        let counter = EpochCounter::new();
        assert_eq!(counter.current(), 0);
        assert_eq!(counter.guard().epoch(), 0);
    }

    #[test]
    fn test_advance_invalidates_outstanding_guards() {
        let counter = EpochCounter::new();
        let guard = counter.guard();
        assert!(guard.is_current());

        assert_eq!(counter.advance(), 1);
        assert!(!guard.is_current());
        assert!(counter.guard().is_current());
    }

    #[test]
    fn test_clones_share_the_counter() {
        let counter = EpochCounter::new();
        let guard = counter.guard();
        let clone = counter.clone();
        clone.advance();
        assert_eq!(counter.current(), 1);
        assert!(!guard.is_current());
    }
}
