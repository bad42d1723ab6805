//! Gravity clock: the cancelable deadline that drives automatic descent.
//!
//! The clock never sleeps or spawns anything. The host asks how long to
//! wait, polls input for at most that long, and calls [`GravityClock::poll`]
//! to learn whether a gravity tick is due.

use std::time::{Duration, Instant};

use log::debug;

use crate::game::GameEvent;

// Timing (in milliseconds)
const BASE_TICK_MS: u64 = 900;
const MIN_TICK_MS: u64 = 120;
const SPEED_INCREASE_PER_LEVEL: u64 = 75;

/// Gravity period for a zero-based `level`.
pub fn interval_for_level(level: u32) -> Duration {
    let reduction = u64::from(level).saturating_mul(SPEED_INCREASE_PER_LEVEL);
    Duration::from_millis(BASE_TICK_MS.saturating_sub(reduction).max(MIN_TICK_MS))
}

#[derive(Debug, Clone)]
pub struct GravityClock {
    period: Duration,
    deadline: Option<Instant>,
}

impl GravityClock {
    /// A clock armed for level 0 starting at `now`.
    pub fn new(now: Instant) -> Self {
        let mut clock = Self {
            period: interval_for_level(0),
            deadline: None,
        };
        clock.arm(0, now);
        clock
    }

    /// (Re)starts the clock for `level`; the first tick is one period after `now`.
    pub fn arm(&mut self, level: u32, now: Instant) {
        self.period = interval_for_level(level);
        self.deadline = Some(now + self.period);
        debug!("gravity clock armed at {:?}", self.period);
    }

    pub fn cancel(&mut self) {
        if self.deadline.take().is_some() {
            debug!("gravity clock cancelled");
        }
    }

    /// Re-derives the period. The wait already in flight keeps its deadline;
    /// only ticks scheduled after it use the new period.
    pub fn set_level(&mut self, level: u32) {
        self.period = interval_for_level(level);
        debug!("gravity period now {:?}", self.period);
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Time left before the next tick, or `None` while cancelled.
    pub fn time_until_tick(&self, now: Instant) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    /// Returns true when a tick is due and schedules the following one.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = Some(now + self.period);
                true
            }
            _ => false,
        }
    }

    /// Follows the engine's lifecycle: level-ups change the period,
    /// game over cancels, restart re-arms at level 0.
    pub fn observe(&mut self, event: &GameEvent, now: Instant) {
        match event {
            GameEvent::LevelUp(level) => self.set_level(*level),
            GameEvent::GameOver => self.cancel(),
            GameEvent::GameRestarted => self.arm(0, now),
            _ => {}
        }
    }
}
