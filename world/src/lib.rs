#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Art Critic.

mod artworks;
mod clock;
mod ledger;
mod oracle;

use std::time::Duration;

use art_critic_core::{
    Attribute, Command, ConfigError, Criterion, Event, RoundPhase, WELCOME_BANNER,
};
use glam::Vec2;
use tracing::{debug, info};

use crate::{
    artworks::ArtworkRegistry,
    clock::{ClockTick, CountdownClock},
    ledger::ScoreLedger,
    oracle::ValidityOracle,
};

const DEFAULT_ROUND_DURATION: Duration = Duration::from_secs(300);
const DEFAULT_STYLES: [&str; 4] = ["StillLife", "Cubic", "Jugendstil", "Futurism"];

/// Tunable parameters supplied when a round is created.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Attribute the validity rule judges.
    pub criterion: Criterion,
    /// Every value that may become the target, in unlock order.
    pub master_values: Vec<Attribute>,
    /// Number of master values available when the round starts.
    pub initially_unlocked: usize,
    /// Starting and maximum time on the countdown clock.
    pub round_duration: Duration,
    /// Position new artworks appear at.
    pub spawn_position: Vec2,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            criterion: Criterion::Style,
            master_values: DEFAULT_STYLES.into_iter().map(Attribute::from).collect(),
            initially_unlocked: 1,
            round_duration: DEFAULT_ROUND_DURATION,
            spawn_position: Vec2::ZERO,
        }
    }
}

/// Represents the authoritative Art Critic world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    phase: RoundPhase,
    oracle: ValidityOracle,
    clock: CountdownClock,
    ledger: ScoreLedger,
    artworks: ArtworkRegistry,
    spawn_position: Vec2,
    submissions: u32,
}

impl World {
    /// Creates a new round ready for simulation.
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        if config.round_duration.is_zero() {
            return Err(ConfigError::ZeroRoundDuration);
        }

        let oracle = ValidityOracle::new(
            config.criterion,
            config.master_values,
            config.initially_unlocked,
        )?;

        Ok(Self {
            banner: WELCOME_BANNER,
            phase: RoundPhase::Running,
            oracle,
            clock: CountdownClock::new(config.round_duration),
            ledger: ScoreLedger::default(),
            artworks: ArtworkRegistry::new(),
            spawn_position: config.spawn_position,
            submissions: 0,
        })
    }

    fn revalidate_artworks(&mut self) {
        let criterion = self.oracle.criterion();
        let oracle = &self.oracle;
        for artwork in self.artworks.iter_mut() {
            artwork.is_valid = oracle.is_valid(artwork.template.attribute(criterion));
        }
    }

    fn end_round(&mut self, out_events: &mut Vec<Event>) {
        self.phase = RoundPhase::Over;
        let score = self.ledger.current();
        info!(%score, submissions = self.submissions, "round ended");
        out_events.push(Event::RoundEnded { score });
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    if world.phase == RoundPhase::Over {
        debug!(?command, "round over; command ignored");
        return;
    }

    match command {
        Command::Tick { dt } => match world.clock.tick(dt) {
            ClockTick::Stopped => {}
            ClockTick::Advanced => out_events.push(Event::TimeAdvanced { dt }),
            ClockTick::Expired => world.end_round(out_events),
        },
        Command::SpawnArtwork { template } => {
            let criterion = world.oracle.criterion();
            let is_valid = world.oracle.is_valid(template.attribute(criterion));
            let name = template.name().to_owned();
            let artwork = world
                .artworks
                .insert(template, world.spawn_position, is_valid);
            out_events.push(Event::ArtworkSpawned {
                artwork,
                template: name,
            });
        }
        Command::MoveArtwork { artwork, position } => match world.artworks.get_mut(artwork) {
            Some(entry) => entry.position = position,
            None => debug!(artwork = artwork.get(), "move ignored for missing artwork"),
        },
        Command::GradeArtwork { artwork, rating } => {
            let Some(entry) = world.artworks.get_mut(artwork) else {
                debug!(artwork = artwork.get(), "grade ignored for missing artwork");
                return;
            };
            let correct = rating.is_correct_for(entry.is_valid);
            entry.rating = Some(rating);
            entry.graded_correctly = correct;
            out_events.push(Event::ArtworkGraded {
                artwork,
                rating,
                correct,
            });
        }
        Command::SettleSubmission {
            artwork,
            reward,
            adjustment,
        } => {
            let graded = world
                .artworks
                .get(artwork)
                .map_or(false, |entry| entry.is_graded());
            if !graded {
                debug!(artwork = artwork.get(), "settlement ignored for ungraded or missing artwork");
                return;
            }
            let Some(entry) = world.artworks.remove(artwork) else {
                return;
            };

            world.ledger.add(reward);
            if let Some(remaining) = world.clock.adjust(adjustment) {
                out_events.push(Event::TimerAdjusted { remaining });
            }
            world.submissions = world.submissions.saturating_add(1);
            out_events.push(Event::ArtworkSubmitted {
                artwork,
                correct: entry.graded_correctly,
                reward,
                adjustment,
            });
        }
        Command::RejectSubmission { artwork } => {
            if world.artworks.get(artwork).is_some() {
                out_events.push(Event::SubmissionRejected { artwork });
            }
        }
        Command::SetTarget { value } => {
            if world.oracle.is_current(&value) {
                debug!(%value, "target unchanged");
                return;
            }
            match world.oracle.set_value(&value) {
                Some(value) => {
                    world.revalidate_artworks();
                    out_events.push(Event::TargetChanged { value });
                }
                None => debug!(%value, "target refused; value is not unlocked"),
            }
        }
        Command::UnlockValue { value } => match world.oracle.unlock(&value) {
            Some(value) => {
                world.revalidate_artworks();
                info!(%value, "value unlocked");
                out_events.push(Event::ValueUnlocked {
                    value: value.clone(),
                });
                out_events.push(Event::TargetChanged { value });
            }
            None => debug!(%value, "unlock refused; value already unlocked or unknown"),
        },
        Command::AdjustTimer { adjustment } => {
            if let Some(remaining) = world.clock.adjust(adjustment) {
                out_events.push(Event::TimerAdjusted { remaining });
            }
        }
        Command::IncreasePace {
            clock_rate_increment,
        } => {
            if let Some(step) = world.clock.accelerate(clock_rate_increment) {
                out_events.push(Event::PaceIncreased { step });
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use super::World;
    use art_critic_core::{ArtworkView, Money, OracleView, RoundPhase};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Reports whether the round is still running.
    #[must_use]
    pub fn round_phase(world: &World) -> RoundPhase {
        world.phase
    }

    /// Captures a read-only view of the artworks in play.
    #[must_use]
    pub fn artwork_view(world: &World) -> ArtworkView {
        let criterion = world.oracle.criterion();
        ArtworkView::from_snapshots(
            world
                .artworks
                .iter()
                .map(|artwork| artwork.snapshot(criterion))
                .collect(),
        )
    }

    /// Captures a read-only view of the validity oracle.
    #[must_use]
    pub fn oracle_view(world: &World) -> OracleView {
        world.oracle.view()
    }

    /// Text describing the current target, e.g. `Current Style: Cubic`.
    #[must_use]
    pub fn target_label(world: &World) -> String {
        world.oracle.label()
    }

    /// Captures the state of the countdown clock.
    #[must_use]
    pub fn clock(world: &World) -> ClockSnapshot {
        ClockSnapshot {
            remaining: world.clock.remaining(),
            max: world.clock.max(),
            rate_multiplier: world.clock.rate_multiplier(),
            running: world.clock.is_running(),
        }
    }

    /// Current ledger balance.
    #[must_use]
    pub fn score(world: &World) -> Money {
        world.ledger.current()
    }

    /// Number of artworks consumed by the submission gate.
    #[must_use]
    pub fn submissions(world: &World) -> u32 {
        world.submissions
    }

    /// Immutable representation of the countdown clock.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct ClockSnapshot {
        /// Time left in the round.
        pub remaining: Duration,
        /// Upper bound on the remaining time.
        pub max: Duration,
        /// Factor applied to elapsed time before it drains the clock.
        pub rate_multiplier: f32,
        /// Whether the clock is still counting down.
        pub running: bool,
    }

    impl ClockSnapshot {
        /// Remaining time as a fraction of the maximum, for timer bars.
        #[must_use]
        pub fn fraction_remaining(&self) -> f32 {
            if self.max.is_zero() {
                return 0.0;
            }
            (self.remaining.as_secs_f32() / self.max.as_secs_f32()).clamp(0.0, 1.0)
        }
    }
}

/// Current ledger balance formatted for the end-of-round panel.
#[must_use]
pub fn final_score_label(world: &World) -> String {
    format!("Final Score: {}", query::score(world))
}

#[cfg(test)]
mod tests {
    use super::*;
    use art_critic_core::{ArtworkId, ArtworkTemplate, Money, Rating, TimerAdjustment};

    fn world() -> World {
        World::new(Config::default()).expect("default config is valid")
    }

    fn template(style: &str) -> ArtworkTemplate {
        ArtworkTemplate::new(format!("{style} piece"), Attribute::new("Blue"), style.into())
    }

    fn run(world: &mut World, command: Command) -> Vec<Event> {
        let mut events = Vec::new();
        apply(world, command, &mut events);
        events
    }

    fn spawn(world: &mut World, style: &str) -> ArtworkId {
        let events = run(
            world,
            Command::SpawnArtwork {
                template: template(style),
            },
        );
        match events.as_slice() {
            [Event::ArtworkSpawned { artwork, .. }] => *artwork,
            other => panic!("unexpected events: {other:?}"),
        }
    }

    #[test]
    fn rejects_invalid_configuration() {
        let zero = Config {
            round_duration: Duration::ZERO,
            ..Config::default()
        };
        assert_eq!(World::new(zero).unwrap_err(), ConfigError::ZeroRoundDuration);

        let empty = Config {
            master_values: Vec::new(),
            ..Config::default()
        };
        assert_eq!(World::new(empty).unwrap_err(), ConfigError::EmptyMasterList);
    }

    #[test]
    fn tick_reports_time_advanced_while_running() {
        let mut world = world();
        let events = run(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(16),
            },
        );
        assert_eq!(
            events,
            vec![Event::TimeAdvanced {
                dt: Duration::from_millis(16)
            }]
        );
        assert_eq!(query::round_phase(&world), RoundPhase::Running);
    }

    #[test]
    fn penalty_to_zero_ends_round_on_next_tick_exactly_once() {
        let mut world = world();
        let _ = run(
            &mut world,
            Command::Tick {
                dt: Duration::from_secs(295),
            },
        );
        assert_eq!(query::clock(&world).remaining, Duration::from_secs(5));

        let events = run(
            &mut world,
            Command::AdjustTimer {
                adjustment: TimerAdjustment::Penalty(Duration::from_secs(20)),
            },
        );
        assert_eq!(
            events,
            vec![Event::TimerAdjusted {
                remaining: Duration::ZERO
            }]
        );

        let events = run(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(16),
            },
        );
        assert_eq!(
            events,
            vec![Event::RoundEnded {
                score: Money::ZERO
            }]
        );
        assert_eq!(query::round_phase(&world), RoundPhase::Over);

        let events = run(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(16),
            },
        );
        assert!(events.is_empty());
        assert_eq!(final_score_label(&world), "Final Score: $0.00");
    }

    #[test]
    fn spawned_artworks_are_judged_against_current_target() {
        let mut world = world();
        let valid = spawn(&mut world, "stilllife");
        let invalid = spawn(&mut world, "Cubic");

        let view = query::artwork_view(&world);
        assert!(view.get(valid).map_or(false, |a| a.is_valid));
        assert!(view.get(invalid).map_or(false, |a| !a.is_valid));
        assert_eq!(query::target_label(&world), "Current Style: StillLife");
    }

    #[test]
    fn target_change_revalidates_live_artworks() {
        let mut world = world();
        let cubic = spawn(&mut world, "Cubic");
        let _ = run(
            &mut world,
            Command::UnlockValue {
                value: "Cubic".into(),
            },
        );
        assert!(query::artwork_view(&world)
            .get(cubic)
            .map_or(false, |a| a.is_valid));

        let events = run(
            &mut world,
            Command::SetTarget {
                value: "StillLife".into(),
            },
        );
        assert_eq!(
            events,
            vec![Event::TargetChanged {
                value: "StillLife".into()
            }]
        );
        assert!(query::artwork_view(&world)
            .get(cubic)
            .map_or(false, |a| !a.is_valid));
    }

    #[test]
    fn setting_the_current_target_again_is_silent() {
        let mut world = world();
        let events = run(
            &mut world,
            Command::SetTarget {
                value: "stilllife".into(),
            },
        );
        assert!(events.is_empty());
        assert_eq!(query::target_label(&world), "Current Style: StillLife");
    }

    #[test]
    fn duplicate_master_values_are_rejected() {
        let config = Config {
            master_values: vec!["Cubic".into(), "CUBIC".into()],
            ..Config::default()
        };
        assert_eq!(
            World::new(config).unwrap_err(),
            ConfigError::DuplicateMasterValue {
                value: "CUBIC".into()
            }
        );
    }

    #[test]
    fn locked_target_is_refused() {
        let mut world = world();
        let events = run(
            &mut world,
            Command::SetTarget {
                value: "Futurism".into(),
            },
        );
        assert!(events.is_empty());
        assert_eq!(
            query::oracle_view(&world).current(),
            Some(&Attribute::new("StillLife"))
        );
    }

    #[test]
    fn unlock_reports_value_and_new_target() {
        let mut world = world();
        let events = run(
            &mut world,
            Command::UnlockValue {
                value: "Jugendstil".into(),
            },
        );
        assert_eq!(
            events,
            vec![
                Event::ValueUnlocked {
                    value: "Jugendstil".into()
                },
                Event::TargetChanged {
                    value: "Jugendstil".into()
                },
            ]
        );
        assert_eq!(query::oracle_view(&world).unlocked().len(), 2);
    }

    #[test]
    fn grading_records_correctness() {
        let mut world = world();
        let artwork = spawn(&mut world, "StillLife");
        let events = run(
            &mut world,
            Command::GradeArtwork {
                artwork,
                rating: Rating::No,
            },
        );
        assert_eq!(
            events,
            vec![Event::ArtworkGraded {
                artwork,
                rating: Rating::No,
                correct: false
            }]
        );

        let snapshot = query::artwork_view(&world).into_vec().remove(0);
        assert!(snapshot.is_graded);
        assert!(!snapshot.graded_correctly);
        assert_eq!(snapshot.rating, Some(Rating::No));
    }

    #[test]
    fn settlement_consumes_artwork_exactly_once() {
        let mut world = world();
        let artwork = spawn(&mut world, "StillLife");
        let _ = run(
            &mut world,
            Command::GradeArtwork {
                artwork,
                rating: Rating::Yes,
            },
        );
        let _ = run(
            &mut world,
            Command::Tick {
                dt: Duration::from_secs(60),
            },
        );

        let settle = Command::SettleSubmission {
            artwork,
            reward: Money::from_units(100),
            adjustment: TimerAdjustment::Bonus(Duration::from_secs(20)),
        };
        let events = run(&mut world, settle.clone());
        assert_eq!(
            events,
            vec![
                Event::TimerAdjusted {
                    remaining: Duration::from_secs(260)
                },
                Event::ArtworkSubmitted {
                    artwork,
                    correct: true,
                    reward: Money::from_units(100),
                    adjustment: TimerAdjustment::Bonus(Duration::from_secs(20)),
                },
            ]
        );
        assert_eq!(query::score(&world), Money::from_units(100));
        assert!(query::artwork_view(&world).is_empty());

        assert!(run(&mut world, settle).is_empty());
        assert!(run(
            &mut world,
            Command::GradeArtwork {
                artwork,
                rating: Rating::No
            }
        )
        .is_empty());
        assert_eq!(query::score(&world), Money::from_units(100));
        assert_eq!(query::submissions(&world), 1);
    }

    #[test]
    fn ungraded_settlement_is_absorbed() {
        let mut world = world();
        let artwork = spawn(&mut world, "StillLife");
        let events = run(
            &mut world,
            Command::SettleSubmission {
                artwork,
                reward: Money::from_units(100),
                adjustment: TimerAdjustment::Bonus(Duration::from_secs(20)),
            },
        );
        assert!(events.is_empty());
        assert_eq!(query::artwork_view(&world).len(), 1);
        assert_eq!(query::score(&world), Money::ZERO);
    }

    #[test]
    fn rejection_is_reported_for_live_artworks_only() {
        let mut world = world();
        let artwork = spawn(&mut world, "Cubic");
        assert_eq!(
            run(&mut world, Command::RejectSubmission { artwork }),
            vec![Event::SubmissionRejected { artwork }]
        );
        assert!(run(
            &mut world,
            Command::RejectSubmission {
                artwork: ArtworkId::new(99)
            }
        )
        .is_empty());
    }

    #[test]
    fn commands_after_round_end_are_ignored() {
        let mut world = world();
        let _ = run(
            &mut world,
            Command::Tick {
                dt: Duration::from_secs(301),
            },
        );
        assert_eq!(query::round_phase(&world), RoundPhase::Over);

        assert!(run(
            &mut world,
            Command::SpawnArtwork {
                template: template("Cubic")
            }
        )
        .is_empty());
        assert!(run(
            &mut world,
            Command::AdjustTimer {
                adjustment: TimerAdjustment::Bonus(Duration::from_secs(20))
            }
        )
        .is_empty());
        assert_eq!(query::clock(&world).remaining, Duration::ZERO);
        assert!(!query::clock(&world).running);
    }

    #[test]
    fn pace_increases_are_counted() {
        let mut world = world();
        let events = run(
            &mut world,
            Command::IncreasePace {
                clock_rate_increment: 0.1,
            },
        );
        assert_eq!(events, vec![Event::PaceIncreased { step: 1 }]);
        let clock = query::clock(&world);
        assert!((clock.rate_multiplier - 1.1).abs() < 1e-6);
        assert!((clock.fraction_remaining() - 1.0).abs() < f32::EPSILON);
    }
}
