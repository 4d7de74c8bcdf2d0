//! Countdown clock bounding the length of a round.

use std::time::Duration;

use art_critic_core::TimerAdjustment;

/// Rate multiplier applied before any pace increase.
pub(crate) const BASE_RATE: f32 = 1.0;

/// Outcome of advancing the clock by one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ClockTick {
    /// The clock had already expired; nothing happened.
    Stopped,
    /// Time elapsed and the round continues.
    Advanced,
    /// The clock reached zero during this tick.
    Expired,
}

/// Bounded timer whose remaining time drains at a variable rate.
#[derive(Clone, Debug)]
pub(crate) struct CountdownClock {
    remaining: Duration,
    max: Duration,
    rate_multiplier: f32,
    pace_steps: u32,
    running: bool,
}

impl CountdownClock {
    pub(crate) fn new(max: Duration) -> Self {
        Self {
            remaining: max,
            max,
            rate_multiplier: BASE_RATE,
            pace_steps: 0,
            running: true,
        }
    }

    pub(crate) fn remaining(&self) -> Duration {
        self.remaining
    }

    pub(crate) fn max(&self) -> Duration {
        self.max
    }

    pub(crate) fn rate_multiplier(&self) -> f32 {
        self.rate_multiplier
    }

    pub(crate) fn is_running(&self) -> bool {
        self.running
    }

    /// Drains `dt * rate_multiplier`, reporting expiry exactly once.
    pub(crate) fn tick(&mut self, dt: Duration) -> ClockTick {
        if !self.running {
            return ClockTick::Stopped;
        }

        let scaled = dt.as_secs_f64() * f64::from(self.rate_multiplier);
        let drained = Duration::try_from_secs_f64(scaled).unwrap_or(Duration::MAX);
        self.remaining = self.remaining.saturating_sub(drained);

        if self.remaining.is_zero() {
            self.running = false;
            ClockTick::Expired
        } else {
            ClockTick::Advanced
        }
    }

    /// Applies a bonus or penalty clamped to `[0, max]`. Ignored once expired.
    pub(crate) fn adjust(&mut self, adjustment: TimerAdjustment) -> Option<Duration> {
        if !self.running {
            return None;
        }

        self.remaining = match adjustment {
            TimerAdjustment::Bonus(bonus) => self.remaining.saturating_add(bonus).min(self.max),
            TimerAdjustment::Penalty(penalty) => self.remaining.saturating_sub(penalty),
        };
        Some(self.remaining)
    }

    /// Raises the drain rate, never below [`BASE_RATE`]. Returns the pace step count.
    pub(crate) fn accelerate(&mut self, increment: f32) -> Option<u32> {
        if !self.running || !increment.is_finite() {
            return None;
        }

        self.rate_multiplier = (self.rate_multiplier + increment).max(BASE_RATE);
        self.pace_steps = self.pace_steps.saturating_add(1);
        Some(self.pace_steps)
    }
}
