use std::{fs, path::Path, time::Duration};

use anyhow::{anyhow, Context, Result};
use art_critic_core::{ArtworkTemplate, Attribute, ConfigError, Criterion, Money, Rating, Zone};
use art_critic_system_grading as grading;
use art_critic_system_progression::{self as progression, UnlockOrder};
use art_critic_system_rotation::{self as rotation, RotationInterval};
use art_critic_system_spawning::{self as spawning, Selection};
use art_critic_system_submission::{self as submission, UngradedPolicy};
use art_critic_world::Config as WorldConfig;
use glam::Vec2;
use serde::Deserialize;

use crate::session::Layout;

const GALLERY: [(&str, &str, &str); 8] = [
    ("Sunflowers", "Yellow", "StillLife"),
    ("Fruit Bowl", "Red", "StillLife"),
    ("Guitar Player", "Brown", "Cubic"),
    ("Violin and Jug", "Blue", "Cubic"),
    ("Golden Portrait", "Yellow", "Jugendstil"),
    ("Water Serpents", "Green", "Jugendstil"),
    ("Speeding Car", "Red", "Futurism"),
    ("Dynamic Dog", "Blue", "Futurism"),
];

/// Round tuning read from an optional TOML file. Omitted sections keep their defaults.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Tuning {
    round: RoundTuning,
    spawning: SpawningTuning,
    rotation: RotationTuning,
    progression: ProgressionTuning,
    grading: GradingTuning,
    submission: SubmissionTuning,
    layout: LayoutTuning,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RoundTuning {
    criterion: Criterion,
    master_values: Vec<Attribute>,
    initially_unlocked: usize,
    duration_secs: f64,
}

impl Default for RoundTuning {
    fn default() -> Self {
        let world = WorldConfig::default();
        Self {
            criterion: world.criterion,
            master_values: world.master_values,
            initially_unlocked: world.initially_unlocked,
            duration_secs: world.round_duration.as_secs_f64(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
enum SelectionTuning {
    #[default]
    Shuffled,
    Uniform,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct SpawningTuning {
    initial_interval_secs: f64,
    min_interval_secs: f64,
    interval_reduction_secs: f64,
    selection: SelectionTuning,
    templates: Vec<ArtworkTemplate>,
}

impl Default for SpawningTuning {
    fn default() -> Self {
        Self {
            initial_interval_secs: 10.0,
            min_interval_secs: 1.0,
            interval_reduction_secs: 0.5,
            selection: SelectionTuning::Shuffled,
            templates: GALLERY
                .iter()
                .map(|&(name, color, style)| ArtworkTemplate::new(name, color.into(), style.into()))
                .collect(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RotationTuning {
    interval_secs: f64,
    random_range_secs: Option<[f64; 2]>,
    retry_limit: u32,
}

impl Default for RotationTuning {
    fn default() -> Self {
        Self {
            interval_secs: 30.0,
            random_range_secs: None,
            retry_limit: 100,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
enum UnlockOrderTuning {
    #[default]
    MasterList,
    Random,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ProgressionTuning {
    submissions_per_unlock: u32,
    clock_rate_increment: f32,
    notification_secs: f64,
    order: UnlockOrderTuning,
}

impl Default for ProgressionTuning {
    fn default() -> Self {
        Self {
            submissions_per_unlock: 10,
            clock_rate_increment: 0.1,
            notification_secs: 3.0,
            order: UnlockOrderTuning::MasterList,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct GradingTuning {
    cooldown_secs: f64,
    press_feedback_secs: f64,
}

impl Default for GradingTuning {
    fn default() -> Self {
        Self {
            cooldown_secs: 0.5,
            press_feedback_secs: 0.2,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
enum UngradedTuning {
    #[default]
    Ignore,
    Reject,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct SubmissionTuning {
    reward: i64,
    bonus_secs: f64,
    penalty_secs: f64,
    ungraded: UngradedTuning,
}

impl Default for SubmissionTuning {
    fn default() -> Self {
        Self {
            reward: 100,
            bonus_secs: 20.0,
            penalty_secs: 5.0,
            ungraded: UngradedTuning::Ignore,
        }
    }
}

/// Scene layout. A `[layout]` table replaces the defaults, and every zone it
/// leaves out stays unassigned.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LayoutTuning {
    #[serde(default)]
    spawn: Vec2,
    #[serde(default)]
    yes_zone: Option<Zone>,
    #[serde(default)]
    no_zone: Option<Zone>,
    #[serde(default)]
    submission_zone: Option<Zone>,
}

impl Default for LayoutTuning {
    fn default() -> Self {
        Self {
            spawn: Vec2::ZERO,
            yes_zone: Some(Zone::new(Vec2::new(-6.0, 4.0), Vec2::splat(3.0))),
            no_zone: Some(Zone::new(Vec2::new(6.0, 4.0), Vec2::splat(3.0))),
            submission_zone: Some(Zone::new(Vec2::new(0.0, -6.0), Vec2::new(8.0, 2.0))),
        }
    }
}

/// Component configurations assembled from a tuning file.
#[derive(Debug)]
pub(crate) struct Setup {
    pub(crate) world: WorldConfig,
    pub(crate) spawning: spawning::Config,
    pub(crate) rotation: rotation::Config,
    pub(crate) progression: progression::Config,
    pub(crate) yes_station: grading::Config,
    pub(crate) no_station: grading::Config,
    pub(crate) submission: submission::Config,
    pub(crate) layout: Layout,
}

impl Tuning {
    /// Reads tuning from a TOML file.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read tuning file {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid tuning file {}", path.display()))
    }

    pub(crate) fn parse(text: &str) -> Result<Self> {
        toml::from_str(text).context("failed to parse tuning TOML")
    }

    /// Maps the tuning onto component configurations. `seed` feeds every random stream.
    pub(crate) fn into_setup(self, seed: u64) -> Result<Setup> {
        let Self {
            round,
            spawning: spawn_tuning,
            rotation: rotation_tuning,
            progression: progression_tuning,
            grading: grading_tuning,
            submission: submission_tuning,
            layout,
        } = self;

        let world = WorldConfig {
            criterion: round.criterion,
            master_values: round.master_values,
            initially_unlocked: round.initially_unlocked,
            round_duration: seconds("round.duration_secs", round.duration_secs)?,
            spawn_position: layout.spawn,
        };

        let initial = seconds(
            "spawning.initial_interval_secs",
            spawn_tuning.initial_interval_secs,
        )?;
        let minimum = seconds("spawning.min_interval_secs", spawn_tuning.min_interval_secs)?;
        if initial.is_zero() || minimum.is_zero() {
            return Err(ConfigError::ZeroSpawnInterval.into());
        }
        if minimum > initial {
            return Err(ConfigError::SpawnFloorAboveInitial { initial, minimum }.into());
        }
        let reduction = seconds(
            "spawning.interval_reduction_secs",
            spawn_tuning.interval_reduction_secs,
        )?;
        let selection = match spawn_tuning.selection {
            SelectionTuning::Shuffled => Selection::Shuffled,
            SelectionTuning::Uniform => Selection::Uniform,
        };
        let spawning = spawning::Config::new(spawn_tuning.templates, seed)
            .with_cadence(initial, minimum, reduction)
            .with_selection(selection);

        let interval = match rotation_tuning.random_range_secs {
            Some([min, max]) => RotationInterval::Random {
                min: seconds("rotation.random_range_secs", min)?,
                max: seconds("rotation.random_range_secs", max)?,
            },
            None => RotationInterval::Fixed(seconds(
                "rotation.interval_secs",
                rotation_tuning.interval_secs,
            )?),
        };
        let rotation = rotation::Config::new(interval, seed.wrapping_add(1))
            .with_retry_limit(rotation_tuning.retry_limit);

        let order = match progression_tuning.order {
            UnlockOrderTuning::MasterList => UnlockOrder::MasterList,
            UnlockOrderTuning::Random => UnlockOrder::Random,
        };
        let increment = progression_tuning.clock_rate_increment;
        if !increment.is_finite() || increment < 0.0 {
            return Err(ConfigError::InvalidPaceIncrement.into());
        }
        let progression = progression::Config::new(seed.wrapping_add(2))
            .with_submissions_per_unlock(progression_tuning.submissions_per_unlock)
            .with_clock_rate_increment(increment)
            .with_notification_duration(seconds(
                "progression.notification_secs",
                progression_tuning.notification_secs,
            )?)
            .with_order(order);

        let cooldown = seconds("grading.cooldown_secs", grading_tuning.cooldown_secs)?;
        let press_feedback = seconds(
            "grading.press_feedback_secs",
            grading_tuning.press_feedback_secs,
        )?;
        let yes_station =
            grading::Config::new(Rating::Yes, layout.yes_zone).with_timings(cooldown, press_feedback);
        let no_station =
            grading::Config::new(Rating::No, layout.no_zone).with_timings(cooldown, press_feedback);

        let ungraded = match submission_tuning.ungraded {
            UngradedTuning::Ignore => UngradedPolicy::Ignore,
            UngradedTuning::Reject => UngradedPolicy::Reject,
        };
        let submission = submission::Config::new(layout.submission_zone)
            .with_reward(Money::from_units(submission_tuning.reward))
            .with_time_adjustments(
                seconds("submission.bonus_secs", submission_tuning.bonus_secs)?,
                seconds("submission.penalty_secs", submission_tuning.penalty_secs)?,
            )
            .with_ungraded_policy(ungraded);

        Ok(Setup {
            world,
            spawning,
            rotation,
            progression,
            yes_station,
            no_station,
            submission,
            layout: Layout {
                yes_zone: layout.yes_zone,
                no_zone: layout.no_zone,
                submission_zone: layout.submission_zone,
            },
        })
    }
}

fn seconds(field: &str, value: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(value)
        .map_err(|err| anyhow!("{field} must be a non-negative number of seconds ({value}): {err}"))
}
