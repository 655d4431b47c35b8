#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Step drivers that own the current simulation step.
//!
//! A session picks exactly one [`Policy`]. Inputs addressed to another policy
//! are ignored, so drivers are never combined.

use std::time::Duration;

/// How the current step advances.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Policy {
    /// Advance one step each time the accumulated elapsed time reaches `interval`.
    Timer {
        /// Time spent on each step before advancing.
        interval: Duration,
    },
    /// Move one step per key press.
    Manual,
    /// Follow an externally polled step field.
    External,
}

/// Keys understood by the manual policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepKey {
    /// Show the following step.
    Next,
    /// Show the preceding step.
    Previous,
}

/// Input delivered to the playback on each update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackInput {
    /// Wall-clock time elapsed since the previous update.
    Elapsed(Duration),
    /// A step key was pressed.
    Key(StepKey),
    /// Latest value read from the external step field.
    External(i64),
}

/// Owner of the current step for one replay session.
#[derive(Clone, Debug)]
pub struct Playback {
    policy: Policy,
    total: usize,
    current: usize,
    accumulator: Duration,
}

impl Playback {
    /// Creates a playback over `total` steps starting at step zero.
    #[must_use]
    pub const fn new(policy: Policy, total: usize) -> Self {
        Self {
            policy,
            total,
            current: 0,
            accumulator: Duration::ZERO,
        }
    }

    /// Active policy.
    #[must_use]
    pub const fn policy(&self) -> Policy {
        self.policy
    }

    /// Current step.
    #[must_use]
    pub const fn current(&self) -> usize {
        self.current
    }

    /// Number of steps available.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.total
    }

    /// Reports whether the current step is the last one.
    #[must_use]
    pub const fn at_end(&self) -> bool {
        self.total == 0 || self.current + 1 >= self.total
    }

    /// Processes one input and returns the new step when it changed.
    pub fn handle(&mut self, input: PlaybackInput) -> Option<usize> {
        if self.total == 0 {
            return None;
        }

        let requested = match (self.policy, input) {
            (Policy::Timer { interval }, PlaybackInput::Elapsed(dt)) => {
                self.accumulator = self.accumulator.saturating_add(dt);
                if self.accumulator < interval {
                    return None;
                }
                self.accumulator = Duration::ZERO;
                self.current + 1
            }
            (Policy::Manual, PlaybackInput::Key(StepKey::Next)) => self.current + 1,
            (Policy::Manual, PlaybackInput::Key(StepKey::Previous)) => {
                self.current.saturating_sub(1)
            }
            (Policy::External, PlaybackInput::External(value)) => {
                usize::try_from(value).unwrap_or(0)
            }
            (policy, input) => {
                tracing::trace!(?policy, ?input, "input ignored by active policy");
                return None;
            }
        };

        let clamped = requested.min(self.total - 1);
        if clamped == self.current {
            return None;
        }
        self.current = clamped;
        Some(clamped)
    }
}
