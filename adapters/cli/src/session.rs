use std::time::Duration;

use art_critic_core::{
    ArtworkId, ArtworkView, Command, ConfigError, Event, Rating, RoundPhase, Zone,
};
use art_critic_system_grading::{GradingInput, GradingStation};
use art_critic_system_progression::Progression;
use art_critic_system_rotation::Rotation;
use art_critic_system_spawning::Spawning;
use art_critic_system_submission::SubmissionGate;
use art_critic_world::{self as world, query, World};
use glam::Vec2;
use tracing::warn;

use crate::tuning::Setup;

/// Upper bound on command/event exchanges within one frame.
const MAX_PASSES: usize = 32;

/// Zones the player interacts with, as placed in the scene.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Layout {
    pub(crate) yes_zone: Option<Zone>,
    pub(crate) no_zone: Option<Zone>,
    pub(crate) submission_zone: Option<Zone>,
}

impl Layout {
    /// Zone of the stamp carrying `rating`.
    pub(crate) fn station(&self, rating: Rating) -> Option<Zone> {
        match rating {
            Rating::Yes => self.yes_zone,
            Rating::No => self.no_zone,
        }
    }
}

/// Player input collected for a single frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct FrameInput {
    /// Drags resolved to their drop positions.
    pub(crate) moves: Vec<(ArtworkId, Vec2)>,
    /// Stamp pressed this frame, if any.
    pub(crate) stamp: Option<Rating>,
}

/// Running totals gathered from world events.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Summary {
    pub(crate) submitted: u32,
    pub(crate) correct: u32,
    pub(crate) refused: u32,
    pub(crate) unlocked: u32,
}

/// One round wired to every system, advanced with a fixed tick.
#[derive(Debug)]
pub(crate) struct Session {
    world: World,
    spawning: Spawning,
    rotation: Rotation,
    progression: Progression,
    yes_station: GradingStation,
    no_station: GradingStation,
    gate: SubmissionGate,
    layout: Layout,
    summary: Summary,
}

impl Session {
    pub(crate) fn new(setup: Setup) -> Result<Self, ConfigError> {
        Ok(Self {
            world: World::new(setup.world)?,
            spawning: Spawning::new(setup.spawning)?,
            rotation: Rotation::new(setup.rotation)?,
            progression: Progression::new(setup.progression)?,
            yes_station: GradingStation::new(setup.yes_station),
            no_station: GradingStation::new(setup.no_station),
            gate: SubmissionGate::new(setup.submission),
            layout: setup.layout,
            summary: Summary::default(),
        })
    }

    pub(crate) fn layout(&self) -> &Layout {
        &self.layout
    }

    pub(crate) fn artworks(&self) -> ArtworkView {
        query::artwork_view(&self.world)
    }

    pub(crate) fn is_running(&self) -> bool {
        query::round_phase(&self.world) == RoundPhase::Running
    }

    pub(crate) fn welcome_banner(&self) -> &'static str {
        query::welcome_banner(&self.world)
    }

    pub(crate) fn target_label(&self) -> String {
        query::target_label(&self.world)
    }

    pub(crate) fn final_score_label(&self) -> String {
        world::final_score_label(&self.world)
    }

    pub(crate) fn remaining(&self) -> Duration {
        query::clock(&self.world).remaining
    }

    pub(crate) fn notification(&self) -> Option<&str> {
        self.progression
            .notification()
            .map(|notification| notification.text())
    }

    pub(crate) fn summary(&self) -> Summary {
        self.summary
    }

    /// Applies the frame's input, advances the clock by `dt`, and lets every
    /// system react until no further commands are produced.
    ///
    /// Returns every event the world emitted during the frame.
    pub(crate) fn step(&mut self, dt: Duration, input: &FrameInput) -> Vec<Event> {
        let mut events = Vec::new();
        for &(artwork, position) in &input.moves {
            world::apply(
                &mut self.world,
                Command::MoveArtwork { artwork, position },
                &mut events,
            );
        }
        world::apply(&mut self.world, Command::Tick { dt }, &mut events);

        let mut log = Vec::new();
        let mut stamp = input.stamp;
        let mut passes = 0;
        loop {
            self.record(&events);
            log.extend_from_slice(&events);

            let commands = self.dispatch(&events, stamp.take());
            if commands.is_empty() {
                break;
            }
            passes += 1;
            if passes > MAX_PASSES {
                warn!(passes, dropped = commands.len(), "systems did not settle within a frame");
                break;
            }

            events.clear();
            for command in commands {
                world::apply(&mut self.world, command, &mut events);
            }
        }
        log
    }

    /// Hands one event batch to every system and collects their commands.
    ///
    /// Player-facing systems run first so that stamps and drops resolve
    /// against the state the player saw before any target rotation.
    fn dispatch(&mut self, events: &[Event], stamp: Option<Rating>) -> Vec<Command> {
        let phase = query::round_phase(&self.world);
        let artworks = query::artwork_view(&self.world);
        let oracle = query::oracle_view(&self.world);
        let mut commands = Vec::new();

        for station in [&mut self.yes_station, &mut self.no_station] {
            let input = GradingInput::new(stamp == Some(station.rating()));
            station.handle(events, phase, input, &artworks, &mut commands);
        }
        self.gate.handle(phase, &artworks, &mut commands);
        self.spawning.handle(events, phase, &mut commands);
        self.rotation.handle(events, phase, &oracle, &mut commands);
        self.progression.handle(events, phase, &oracle, &mut commands);
        commands
    }

    fn record(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::ArtworkSubmitted { correct, .. } => {
                    self.summary.submitted += 1;
                    if *correct {
                        self.summary.correct += 1;
                    }
                }
                Event::SubmissionRejected { .. } => self.summary.refused += 1,
                Event::ValueUnlocked { .. } => self.summary.unlocked += 1,
                _ => {}
            }
        }
    }
}
