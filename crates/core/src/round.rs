//! Wall-clock round clock.

use crate::Rounder;
use parking_lot::RwLock;
use shardline_types::RoundIndex;
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
struct ClockState {
    index: RoundIndex,
    start: Duration,
    now: Duration,
}

/// A round clock anchored at genesis time, dividing wall-clock time into
/// fixed-duration rounds.
///
/// The owner (node main loop, simulation runner) feeds time in through
/// [`RoundClock::update`]; the clock never reads the system clock itself,
/// which keeps every consumer deterministic under test.
pub struct RoundClock {
    genesis: Duration,
    round_duration: Duration,
    state: RwLock<ClockState>,
}

impl RoundClock {
    /// Create a clock for rounds of `round_duration` starting at `genesis`.
    ///
    /// `round_duration` must be non-zero.
    pub fn new(genesis: Duration, round_duration: Duration) -> Self {
        assert!(!round_duration.is_zero(), "round duration must be non-zero");
        RoundClock {
            genesis,
            round_duration,
            state: RwLock::new(ClockState {
                index: -1,
                start: genesis,
                now: Duration::ZERO,
            }),
        }
    }

    /// Advance the clock to `now`, recomputing the round index and start.
    ///
    /// Before genesis the index is -1 and the round start is pinned at
    /// genesis.
    pub fn update(&self, now: Duration) {
        let mut state = self.state.write();
        state.now = now;

        if now < self.genesis {
            state.index = -1;
            state.start = self.genesis;
            return;
        }

        let elapsed_ms = (now - self.genesis).as_millis();
        let round_ms = self.round_duration.as_millis();
        let index = (elapsed_ms / round_ms) as i64;

        state.index = index;
        state.start = self.genesis + self.round_duration * (index as u32);
    }
}

impl Rounder for RoundClock {
    fn index(&self) -> RoundIndex {
        self.state.read().index
    }

    fn time_stamp(&self) -> Duration {
        self.state.read().start
    }

    fn time_duration(&self) -> Duration {
        self.round_duration
    }

    fn now(&self) -> Duration {
        self.state.read().now
    }
}
