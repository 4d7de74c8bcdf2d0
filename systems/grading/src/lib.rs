#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure grading system that stamps verdicts onto artworks inside its zone.

use std::time::Duration;

use art_critic_core::{ArtworkView, Command, ConfigError, Event, Rating, RoundPhase, Zone};
use tracing::{debug, error};

const DEFAULT_COOLDOWN: Duration = Duration::from_millis(500);
const DEFAULT_PRESS_FEEDBACK: Duration = Duration::from_millis(200);

/// Configuration parameters required to construct a grading station.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    rating: Rating,
    zone: Option<Zone>,
    cooldown: Duration,
    press_feedback: Duration,
}

impl Config {
    /// Creates a configuration for a stamp carrying `rating` over `zone`.
    #[must_use]
    pub const fn new(rating: Rating, zone: Option<Zone>) -> Self {
        Self {
            rating,
            zone,
            cooldown: DEFAULT_COOLDOWN,
            press_feedback: DEFAULT_PRESS_FEEDBACK,
        }
    }

    /// Overrides the cooldown window and the pressed-feedback duration.
    #[must_use]
    pub const fn with_timings(mut self, cooldown: Duration, press_feedback: Duration) -> Self {
        self.cooldown = cooldown;
        self.press_feedback = press_feedback;
        self
    }
}

/// Input snapshot distilled from adapter-provided frame input data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GradingInput {
    /// Indicates whether the player pressed the stamp on this frame.
    pub activated: bool,
}

impl GradingInput {
    /// Creates a new input descriptor.
    #[must_use]
    pub const fn new(activated: bool) -> Self {
        Self { activated }
    }
}

/// Cooldown state of a grading station.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StationState {
    /// The station accepts the next activation.
    Idle,
    /// Activations are dropped until the cooldown expires.
    Cooldown {
        /// Time left before the station becomes idle again.
        remaining: Duration,
    },
}

/// Grading stamp that judges every artwork inside its zone on activation.
#[derive(Debug)]
pub struct GradingStation {
    rating: Rating,
    zone: Option<Zone>,
    cooldown: Duration,
    press_feedback: Duration,
    state: StationState,
    pressed_for: Duration,
}

impl GradingStation {
    /// Creates a new station. A missing zone is reported once and leaves the station inert.
    #[must_use]
    pub fn new(config: Config) -> Self {
        if config.zone.is_none() {
            let problem = ConfigError::MissingZone {
                component: "grading station",
            };
            error!(rating = ?config.rating, %problem, "grading station disabled");
        }

        Self {
            rating: config.rating,
            zone: config.zone,
            cooldown: config.cooldown,
            press_feedback: config.press_feedback,
            state: StationState::Idle,
            pressed_for: Duration::ZERO,
        }
    }

    /// Verdict this station stamps.
    #[must_use]
    pub const fn rating(&self) -> Rating {
        self.rating
    }

    /// Zone this station grades, if one was assigned.
    #[must_use]
    pub const fn zone(&self) -> Option<Zone> {
        self.zone
    }

    /// Reports whether the station can ever grade.
    #[must_use]
    pub const fn is_operational(&self) -> bool {
        self.zone.is_some()
    }

    /// Current cooldown state.
    #[must_use]
    pub const fn state(&self) -> StationState {
        self.state
    }

    /// Reports whether the stamp should render in its pressed pose.
    #[must_use]
    pub fn is_pressed(&self) -> bool {
        !self.pressed_for.is_zero()
    }

    /// Consumes events, input, and the artwork view to emit grading commands.
    pub fn handle(
        &mut self,
        events: &[Event],
        phase: RoundPhase,
        input: GradingInput,
        artworks: &ArtworkView,
        out: &mut Vec<Command>,
    ) {
        if phase != RoundPhase::Running {
            self.state = StationState::Idle;
            self.pressed_for = Duration::ZERO;
            return;
        }

        for event in events {
            if let Event::TimeAdvanced { dt } = event {
                self.advance(*dt);
            }
        }

        if input.activated {
            let _ = self.activate(artworks, out);
        }
    }

    /// Grades every artwork inside the zone unless the station is cooling down.
    ///
    /// Returns whether the activation was accepted. Suppressed activations are
    /// dropped, never deferred.
    pub fn activate(&mut self, artworks: &ArtworkView, out: &mut Vec<Command>) -> bool {
        let Some(zone) = self.zone else {
            return false;
        };
        if let StationState::Cooldown { remaining } = self.state {
            debug!(?remaining, "stamp cooling down; activation dropped");
            return false;
        }

        if !self.cooldown.is_zero() {
            self.state = StationState::Cooldown {
                remaining: self.cooldown,
            };
        }
        self.pressed_for = self.press_feedback;

        let before = out.len();
        out.extend(artworks.within(&zone).map(|artwork| Command::GradeArtwork {
            artwork: artwork.id,
            rating: self.rating,
        }));
        debug!(rating = ?self.rating, graded = out.len() - before, "stamp activated");
        true
    }

    fn advance(&mut self, dt: Duration) {
        self.pressed_for = self.pressed_for.saturating_sub(dt);
        if let StationState::Cooldown { remaining } = self.state {
            let remaining = remaining.saturating_sub(dt);
            self.state = if remaining.is_zero() {
                StationState::Idle
            } else {
                StationState::Cooldown { remaining }
            };
        }
    }
}
