//! Search debounce and cancellation
//!
//! Keystrokes must not translate one-to-one into autocomplete requests.
//! This controller tracks the user's latest search intent with a
//! monotonically increasing generation number: every keystroke supersedes
//! the previous timer, an expired timer only fires if its generation is
//! still current, and a completed request is only applied under the same
//! condition. Completion order of network calls is irrelevant; the latest
//! intent wins.
//!
//! The controller is pure state. The owner spawns the actual delay timer
//! and reports expiry and completion back here, which keeps every
//! transition unit-testable without a clock.

use std::time::Duration;

/// Fixed delay between the last keystroke and the autocomplete request
pub const DEBOUNCE_DELAY: Duration = Duration::from_millis(300);

/// Debounce controller state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebounceState {
    /// Nothing scheduled and nothing awaited
    Idle,
    /// A timer or an issued request for this generation is outstanding
    Pending { generation: u64 },
}

/// Tracks which autocomplete intent is current
#[derive(Debug)]
pub struct SearchController {
    state: DebounceState,
    generation: u64,
}

impl Default for SearchController {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchController {
    pub fn new() -> Self {
        Self {
            state: DebounceState::Idle,
            generation: 0,
        }
    }

    /// Current state, for rendering the "searching" hint
    pub fn state(&self) -> DebounceState {
        self.state
    }

    /// A non-empty keystroke arrived: supersede whatever was scheduled and
    /// return the generation the new timer must carry
    pub fn schedule(&mut self) -> u64 {
        self.generation += 1;
        self.state = DebounceState::Pending {
            generation: self.generation,
        };
        self.generation
    }

    /// An empty keystroke arrived: supersede pending timers and in-flight
    /// requests alike, with no new timer
    pub fn cancel(&mut self) {
        self.generation += 1;
        self.state = DebounceState::Idle;
    }

    /// A timer expired. True iff its generation is still the scheduled one,
    /// in which case the request should now be issued.
    pub fn should_fire(&self, generation: u64) -> bool {
        matches!(self.state, DebounceState::Pending { generation: current } if current == generation)
    }

    /// A request completed. True iff its generation is still current, in
    /// which case the result may be applied; the controller returns to Idle.
    pub fn complete(&mut self, generation: u64) -> bool {
        if self.should_fire(generation) {
            self.state = DebounceState::Idle;
            true
        } else {
            false
        }
    }
}
