#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure progression system that unlocks new target values as submissions accumulate.

use std::time::Duration;

use art_critic_core::{Attribute, Command, ConfigError, Event, OracleView, RoundPhase};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

const DEFAULT_SUBMISSIONS_PER_UNLOCK: u32 = 10;
const DEFAULT_CLOCK_RATE_INCREMENT: f32 = 0.1;
const DEFAULT_NOTIFICATION_DURATION: Duration = Duration::from_secs(3);

/// Policy deciding which locked value is unlocked next.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UnlockOrder {
    /// Unlock the first locked value in master-list order.
    #[default]
    MasterList,
    /// Unlock a uniformly random locked value.
    Random,
}

/// Configuration parameters required to construct the progression system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    submissions_per_unlock: u32,
    clock_rate_increment: f32,
    notification_duration: Duration,
    order: UnlockOrder,
    rng_seed: u64,
}

impl Config {
    /// Creates a configuration with the default milestone cadence.
    #[must_use]
    pub const fn new(rng_seed: u64) -> Self {
        Self {
            submissions_per_unlock: DEFAULT_SUBMISSIONS_PER_UNLOCK,
            clock_rate_increment: DEFAULT_CLOCK_RATE_INCREMENT,
            notification_duration: DEFAULT_NOTIFICATION_DURATION,
            order: UnlockOrder::MasterList,
            rng_seed,
        }
    }

    /// Overrides how many submissions separate two unlocks.
    #[must_use]
    pub const fn with_submissions_per_unlock(mut self, submissions: u32) -> Self {
        self.submissions_per_unlock = submissions;
        self
    }

    /// Overrides the clock rate increase applied at every milestone.
    #[must_use]
    pub const fn with_clock_rate_increment(mut self, increment: f32) -> Self {
        self.clock_rate_increment = increment;
        self
    }

    /// Overrides how long unlock notifications stay visible.
    #[must_use]
    pub const fn with_notification_duration(mut self, duration: Duration) -> Self {
        self.notification_duration = duration;
        self
    }

    /// Overrides the unlock order policy.
    #[must_use]
    pub const fn with_order(mut self, order: UnlockOrder) -> Self {
        self.order = order;
        self
    }
}

/// Transient message announcing an unlock.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    text: String,
    remaining: Duration,
}

impl Notification {
    /// Text shown to the player.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Time left before the notification hides itself.
    #[must_use]
    pub fn remaining(&self) -> Duration {
        self.remaining
    }
}

/// Progression system that tracks submissions and unlocks values at milestones.
#[derive(Debug)]
pub struct Progression {
    submissions_per_unlock: u32,
    clock_rate_increment: f32,
    notification_duration: Duration,
    order: UnlockOrder,
    submissions: u32,
    notification: Option<Notification>,
    rng: ChaCha8Rng,
}

impl Progression {
    /// Creates a new progression system, rejecting milestones that can never fire
    /// and pace increments that are negative or not finite.
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        if config.submissions_per_unlock == 0 {
            return Err(ConfigError::ZeroSubmissionsPerUnlock);
        }
        if !config.clock_rate_increment.is_finite() || config.clock_rate_increment < 0.0 {
            return Err(ConfigError::InvalidPaceIncrement);
        }

        Ok(Self {
            submissions_per_unlock: config.submissions_per_unlock,
            clock_rate_increment: config.clock_rate_increment,
            notification_duration: config.notification_duration,
            order: config.order,
            submissions: 0,
            notification: None,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        })
    }

    /// Number of submissions recorded so far.
    #[must_use]
    pub fn submissions(&self) -> u32 {
        self.submissions
    }

    /// Notification currently on display, if any.
    #[must_use]
    pub fn notification(&self) -> Option<&Notification> {
        self.notification.as_ref()
    }

    /// Consumes events and the oracle view to emit unlock and pace commands.
    pub fn handle(
        &mut self,
        events: &[Event],
        phase: RoundPhase,
        oracle: &OracleView,
        out: &mut Vec<Command>,
    ) {
        if phase != RoundPhase::Running {
            return;
        }

        let mut requested: Vec<Attribute> = Vec::new();
        for event in events {
            match event {
                Event::TimeAdvanced { dt } => self.age_notification(*dt),
                Event::ArtworkSubmitted { .. } => {
                    if let Some(value) = self.record_submission(oracle, &requested, out) {
                        requested.push(value);
                    }
                }
                Event::ValueUnlocked { value } => self.announce(oracle, value),
                _ => {}
            }
        }
    }

    /// Counts one submission and, at every milestone, requests an unlock and a pace increase.
    ///
    /// Values listed in `pending` were already requested and are treated as unlocked.
    /// Returns the value requested for unlock, if any.
    pub fn record_submission(
        &mut self,
        oracle: &OracleView,
        pending: &[Attribute],
        out: &mut Vec<Command>,
    ) -> Option<Attribute> {
        self.submissions = self.submissions.saturating_add(1);
        if self.submissions % self.submissions_per_unlock != 0 {
            return None;
        }

        out.push(Command::IncreasePace {
            clock_rate_increment: self.clock_rate_increment,
        });

        let locked: Vec<&Attribute> = oracle
            .locked()
            .filter(|value| !pending.iter().any(|requested| requested.matches(value)))
            .collect();
        let Some(value) = self.pick(&locked) else {
            debug!(submissions = self.submissions, "milestone reached with every value unlocked");
            return None;
        };

        info!(%value, submissions = self.submissions, "unlock milestone reached");
        out.push(Command::UnlockValue {
            value: value.clone(),
        });
        Some(value)
    }

    fn pick(&mut self, locked: &[&Attribute]) -> Option<Attribute> {
        if locked.is_empty() {
            return None;
        }
        let index = match self.order {
            UnlockOrder::MasterList => 0,
            UnlockOrder::Random => self.rng.gen_range(0..locked.len()),
        };
        Some(locked[index].clone())
    }

    fn announce(&mut self, oracle: &OracleView, value: &Attribute) {
        let kind = oracle.criterion().label().to_ascii_lowercase();
        self.notification = Some(Notification {
            text: format!("New {kind} unlocked: {value}"),
            remaining: self.notification_duration,
        });
    }

    fn age_notification(&mut self, dt: Duration) {
        let expired = match self.notification.as_mut() {
            Some(notification) => {
                notification.remaining = notification.remaining.saturating_sub(dt);
                notification.remaining.is_zero()
            }
            None => false,
        };
        if expired {
            self.notification = None;
        }
    }
}
