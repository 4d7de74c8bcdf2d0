#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system responsible for emitting artwork spawn commands.

use std::time::Duration;

use art_critic_core::{ArtworkTemplate, Command, ConfigError, Event, RoundPhase};
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

const DEFAULT_INITIAL_INTERVAL: Duration = Duration::from_secs(10);
const DEFAULT_MIN_INTERVAL: Duration = Duration::from_secs(1);
const DEFAULT_INTERVAL_REDUCTION: Duration = Duration::from_millis(500);

/// Strategy used to pick the next template.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Selection {
    /// Walk a shuffled queue of every template, reshuffling once exhausted.
    #[default]
    Shuffled,
    /// Pick a template uniformly at random on every spawn.
    Uniform,
}

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Debug)]
pub struct Config {
    initial_interval: Duration,
    min_interval: Duration,
    interval_reduction: Duration,
    templates: Vec<ArtworkTemplate>,
    selection: Selection,
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided templates and seed.
    #[must_use]
    pub fn new(templates: Vec<ArtworkTemplate>, rng_seed: u64) -> Self {
        Self {
            initial_interval: DEFAULT_INITIAL_INTERVAL,
            min_interval: DEFAULT_MIN_INTERVAL,
            interval_reduction: DEFAULT_INTERVAL_REDUCTION,
            templates,
            selection: Selection::default(),
            rng_seed,
        }
    }

    /// Overrides the spawn cadence: starting interval, floor, and per-pace reduction.
    #[must_use]
    pub fn with_cadence(mut self, initial: Duration, minimum: Duration, reduction: Duration) -> Self {
        self.initial_interval = initial;
        self.min_interval = minimum;
        self.interval_reduction = reduction;
        self
    }

    /// Overrides the template selection strategy.
    #[must_use]
    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = selection;
        self
    }
}

/// Pure system that emits spawn commands while the round runs.
#[derive(Debug)]
pub struct Spawning {
    spawn_interval: Duration,
    min_interval: Duration,
    interval_reduction: Duration,
    accumulator: Duration,
    templates: Vec<ArtworkTemplate>,
    selection: Selection,
    queue: Vec<usize>,
    cursor: usize,
    rng: ChaCha8Rng,
}

impl Spawning {
    /// Creates a new spawning system, rejecting cadences that could stall.
    ///
    /// Both the starting interval and its floor must be non-zero, and the floor
    /// may not exceed the starting interval.
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        if config.initial_interval.is_zero() || config.min_interval.is_zero() {
            return Err(ConfigError::ZeroSpawnInterval);
        }
        if config.min_interval > config.initial_interval {
            return Err(ConfigError::SpawnFloorAboveInitial {
                initial: config.initial_interval,
                minimum: config.min_interval,
            });
        }

        let mut spawning = Self {
            spawn_interval: config.initial_interval,
            min_interval: config.min_interval,
            interval_reduction: config.interval_reduction,
            accumulator: Duration::ZERO,
            queue: (0..config.templates.len()).collect(),
            templates: config.templates,
            selection: config.selection,
            cursor: 0,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        };
        spawning.reshuffle();
        Ok(spawning)
    }

    /// Interval currently separating two spawns.
    #[must_use]
    pub fn spawn_interval(&self) -> Duration {
        self.spawn_interval
    }

    /// Shortens the spawn interval, never below the configured floor.
    pub fn reduce_interval(&mut self, by: Duration) {
        let reduced = self
            .spawn_interval
            .saturating_sub(by)
            .max(self.min_interval)
            .min(self.spawn_interval);
        if reduced != self.spawn_interval {
            debug!(?reduced, "spawn interval reduced");
        }
        self.spawn_interval = reduced;
    }

    /// Consumes events to emit spawn commands.
    pub fn handle(&mut self, events: &[Event], phase: RoundPhase, out: &mut Vec<Command>) {
        if phase != RoundPhase::Running {
            self.accumulator = Duration::ZERO;
            return;
        }

        let mut accumulated = Duration::ZERO;
        for event in events {
            match event {
                Event::TimeAdvanced { dt } => accumulated = accumulated.saturating_add(*dt),
                Event::PaceIncreased { .. } => self.reduce_interval(self.interval_reduction),
                _ => {}
            }
        }

        if accumulated.is_zero() || self.templates.is_empty() {
            return;
        }

        self.accumulator = self.accumulator.saturating_add(accumulated);
        let spawn_attempts = self.resolve_spawn_attempts();

        for _ in 0..spawn_attempts {
            let template = self.next_template();
            out.push(Command::SpawnArtwork { template });
        }
    }

    fn resolve_spawn_attempts(&mut self) -> usize {
        let mut attempts = 0;
        while self.accumulator >= self.spawn_interval {
            self.accumulator -= self.spawn_interval;
            attempts += 1;
        }
        attempts
    }

    fn next_template(&mut self) -> ArtworkTemplate {
        debug_assert!(!self.templates.is_empty(), "next_template requires templates");
        let index = match self.selection {
            Selection::Uniform => self.rng.gen_range(0..self.templates.len()),
            Selection::Shuffled => {
                let index = self.queue[self.cursor];
                self.cursor += 1;
                if self.cursor >= self.queue.len() {
                    self.cursor = 0;
                    self.reshuffle();
                }
                index
            }
        };
        self.templates[index].clone()
    }

    fn reshuffle(&mut self) {
        self.queue.shuffle(&mut self.rng);
    }
}
