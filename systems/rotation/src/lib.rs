#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that periodically rotates the target value judged by the oracle.
//!
//! Every rotation period the system picks a new value from the unlocked subset
//! and emits [`Command::SetTarget`]. Within one rotation cycle a value is used
//! at most once; the cycle restarts after every alternative has been used.
//! Random picks are retried a bounded number of times and fall back to the
//! first unlocked value so that selection always terminates.

use std::time::Duration;

use art_critic_core::{Attribute, Command, ConfigError, Event, OracleView, RoundPhase};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

const DEFAULT_INTERVAL: Duration = Duration::from_secs(30);
const DEFAULT_RETRY_LIMIT: u32 = 100;

/// Cadence between two rotations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RotationInterval {
    /// Rotate after the same duration every time.
    Fixed(Duration),
    /// Draw each period uniformly from `[min, max]`.
    Random {
        /// Shortest possible period.
        min: Duration,
        /// Longest possible period.
        max: Duration,
    },
}

impl Default for RotationInterval {
    fn default() -> Self {
        Self::Fixed(DEFAULT_INTERVAL)
    }
}

/// Configuration parameters required to construct the rotation system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    interval: RotationInterval,
    retry_limit: u32,
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided cadence and seed.
    #[must_use]
    pub const fn new(interval: RotationInterval, rng_seed: u64) -> Self {
        Self {
            interval,
            retry_limit: DEFAULT_RETRY_LIMIT,
            rng_seed,
        }
    }

    /// Overrides how many random picks are attempted before falling back.
    #[must_use]
    pub const fn with_retry_limit(mut self, retry_limit: u32) -> Self {
        self.retry_limit = retry_limit;
        self
    }
}

/// Rotation system that keeps the target value moving.
#[derive(Debug)]
pub struct Rotation {
    interval: RotationInterval,
    retry_limit: u32,
    accumulator: Duration,
    period: Duration,
    used_this_cycle: Vec<Attribute>,
    rng: ChaCha8Rng,
}

impl Rotation {
    /// Creates a new rotation system, rejecting inverted random ranges.
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        if let RotationInterval::Random { min, max } = config.interval {
            if min > max {
                return Err(ConfigError::InvertedRotationRange { min, max });
            }
        }

        let mut rotation = Self {
            interval: config.interval,
            retry_limit: config.retry_limit,
            accumulator: Duration::ZERO,
            period: Duration::ZERO,
            used_this_cycle: Vec::new(),
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        };
        rotation.period = rotation.draw_period();
        Ok(rotation)
    }

    /// Duration of the rotation period currently in progress.
    #[must_use]
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Consumes events and the oracle view to emit target changes.
    ///
    /// At most one rotation is emitted per call so that every pick observes the
    /// target produced by the previous one.
    pub fn handle(
        &mut self,
        events: &[Event],
        phase: RoundPhase,
        oracle: &OracleView,
        out: &mut Vec<Command>,
    ) {
        if phase != RoundPhase::Running {
            self.accumulator = Duration::ZERO;
            return;
        }

        for event in events {
            if let Event::TimeAdvanced { dt } = event {
                self.accumulator = self.accumulator.saturating_add(*dt);
            }
        }

        if self.period.is_zero() || self.accumulator < self.period {
            return;
        }

        self.accumulator -= self.period;
        self.period = self.draw_period();

        if let Some(value) = self.rotate(oracle) {
            out.push(Command::SetTarget { value });
        }
    }

    /// Selects the next target from the unlocked subset.
    ///
    /// Returns `None` while nothing is unlocked. With a single unlocked value
    /// that value is returned even though it equals the current target.
    pub fn rotate(&mut self, oracle: &OracleView) -> Option<Attribute> {
        let unlocked = oracle.unlocked();
        let first = unlocked.first()?;
        if unlocked.len() == 1 {
            return Some(first.clone());
        }

        let current = oracle.current();
        if !unlocked
            .iter()
            .any(|value| self.is_eligible(value, current))
        {
            self.used_this_cycle.clear();
        }

        for _ in 0..self.retry_limit {
            let candidate = &unlocked[self.rng.gen_range(0..unlocked.len())];
            if self.is_eligible(candidate, current) {
                self.used_this_cycle.push(candidate.clone());
                return Some(candidate.clone());
            }
        }

        debug!(fallback = %first, "rotation retries exhausted");
        Some(first.clone())
    }

    fn is_eligible(&self, value: &Attribute, current: Option<&Attribute>) -> bool {
        current.map_or(true, |current| !value.matches(current))
            && !self.used_this_cycle.iter().any(|used| used.matches(value))
    }

    fn draw_period(&mut self) -> Duration {
        match self.interval {
            RotationInterval::Fixed(period) => period,
            RotationInterval::Random { min, max } => {
                if min == max {
                    return min;
                }
                self.rng.gen_range(min..=max)
            }
        }
    }
}
