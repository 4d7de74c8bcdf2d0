#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Art Critic engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! views, and respond exclusively with new command batches.

use std::{fmt, time::Duration};

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Art Critic.";

/// Describes whether the round still accepts play.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RoundPhase {
    /// The countdown is running and every system is live.
    Running,
    /// The countdown reached zero; the round is frozen.
    Over,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that a new artwork be instantiated from a template.
    SpawnArtwork {
        /// Template describing the artwork's attributes.
        template: ArtworkTemplate,
    },
    /// Relocates an artwork, typically while the player drags it.
    MoveArtwork {
        /// Identifier of the artwork being moved.
        artwork: ArtworkId,
        /// New position of the artwork in world units.
        position: Vec2,
    },
    /// Stamps a verdict onto an artwork.
    GradeArtwork {
        /// Identifier of the artwork being graded.
        artwork: ArtworkId,
        /// Verdict carried by the stamp.
        rating: Rating,
    },
    /// Consumes a graded artwork, crediting the ledger and adjusting the clock.
    SettleSubmission {
        /// Identifier of the submitted artwork.
        artwork: ArtworkId,
        /// Money credited to the ledger.
        reward: Money,
        /// Adjustment applied to the countdown clock.
        adjustment: TimerAdjustment,
    },
    /// Refuses an artwork that reached the submission gate ungraded.
    RejectSubmission {
        /// Identifier of the refused artwork.
        artwork: ArtworkId,
    },
    /// Replaces the current target value judged by the oracle.
    SetTarget {
        /// Value every artwork is judged against from now on.
        value: Attribute,
    },
    /// Adds a value from the master list to the unlocked subset.
    UnlockValue {
        /// Value to unlock.
        value: Attribute,
    },
    /// Applies an external bonus or penalty to the countdown clock.
    AdjustTimer {
        /// Signed adjustment applied to the remaining time.
        adjustment: TimerAdjustment,
    },
    /// Speeds up the round after a progression milestone.
    IncreasePace {
        /// Amount added to the countdown clock's rate multiplier.
        clock_rate_increment: f32,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that an artwork entered play.
    ArtworkSpawned {
        /// Identifier assigned to the new artwork.
        artwork: ArtworkId,
        /// Name of the template the artwork was created from.
        template: String,
    },
    /// Confirms that a stamp verdict was recorded on an artwork.
    ArtworkGraded {
        /// Identifier of the graded artwork.
        artwork: ArtworkId,
        /// Verdict applied by the stamp.
        rating: Rating,
        /// Whether the verdict matched the artwork's validity.
        correct: bool,
    },
    /// Confirms that an artwork was consumed by the submission gate.
    ArtworkSubmitted {
        /// Identifier of the consumed artwork.
        artwork: ArtworkId,
        /// Whether the artwork had been graded correctly.
        correct: bool,
        /// Money credited for the submission.
        reward: Money,
        /// Adjustment applied to the clock for the submission.
        adjustment: TimerAdjustment,
    },
    /// Reports that an ungraded artwork was refused at the gate.
    SubmissionRejected {
        /// Identifier of the refused artwork.
        artwork: ArtworkId,
    },
    /// Announces that the oracle now judges against a new value.
    TargetChanged {
        /// Value that became the current target.
        value: Attribute,
    },
    /// Announces that a value joined the unlocked subset.
    ValueUnlocked {
        /// Value that was unlocked.
        value: Attribute,
    },
    /// Reports the remaining time after an external adjustment.
    TimerAdjusted {
        /// Remaining time after clamping.
        remaining: Duration,
    },
    /// Reports that the round sped up.
    PaceIncreased {
        /// Number of pace increases applied so far in the round.
        step: u32,
    },
    /// Announces the end of the round. Emitted exactly once.
    RoundEnded {
        /// Ledger balance at the moment the clock expired.
        score: Money,
    },
}

/// Unique identifier assigned to an artwork.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArtworkId(u32);

impl ArtworkId {
    /// Creates a new artwork identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Tag judged by the validity rule, such as a color name or an art style.
///
/// Comparison through [`Attribute::matches`] ignores ASCII case, and an empty
/// tag never matches anything.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attribute(String);

impl Attribute {
    /// Creates a new attribute from the provided tag.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// Borrows the tag.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Reports whether the tag is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Reports whether two tags denote the same value.
    #[must_use]
    pub fn matches(&self, other: &Attribute) -> bool {
        !self.is_empty() && self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Attribute {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}

/// Selects which artwork attribute the validity rule inspects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    /// Artworks are judged by their color name.
    Color,
    /// Artworks are judged by their style.
    Style,
}

impl Criterion {
    /// Human readable name of the criterion.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Color => "Color",
            Self::Style => "Style",
        }
    }
}

/// Blueprint the spawner instantiates artworks from.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtworkTemplate {
    name: String,
    color: Attribute,
    style: Attribute,
}

impl ArtworkTemplate {
    /// Creates a template with the provided name and attributes.
    #[must_use]
    pub fn new(name: impl Into<String>, color: Attribute, style: Attribute) -> Self {
        Self {
            name: name.into(),
            color,
            style,
        }
    }

    /// Display name of the template.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Color name painted on the artwork.
    #[must_use]
    pub fn color(&self) -> &Attribute {
        &self.color
    }

    /// Style the artwork belongs to.
    #[must_use]
    pub fn style(&self) -> &Attribute {
        &self.style
    }

    /// Attribute inspected under the provided criterion.
    #[must_use]
    pub fn attribute(&self, criterion: Criterion) -> &Attribute {
        match criterion {
            Criterion::Color => &self.color,
            Criterion::Style => &self.style,
        }
    }
}

/// Verdict carried by a grading stamp.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rating {
    /// The stamp approves the artwork.
    Yes,
    /// The stamp rejects the artwork.
    No,
}

impl Rating {
    /// Reports whether the verdict agrees with the artwork's validity.
    #[must_use]
    pub const fn is_correct_for(self, is_valid: bool) -> bool {
        matches!(self, Self::Yes) == is_valid
    }

    /// Verdict that agrees with the provided validity.
    #[must_use]
    pub const fn agreeing_with(is_valid: bool) -> Self {
        if is_valid {
            Self::Yes
        } else {
            Self::No
        }
    }
}

/// Currency amount tracked in whole cents.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Money(i64);

impl Money {
    /// Zero balance.
    pub const ZERO: Self = Self(0);

    /// Creates an amount from a number of cents.
    #[must_use]
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Creates an amount from a whole number of currency units.
    #[must_use]
    pub const fn from_units(units: i64) -> Self {
        Self(units.saturating_mul(100))
    }

    /// Amount expressed in cents.
    #[must_use]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Adds two amounts, saturating at the numeric bounds.
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let magnitude = self.0.unsigned_abs();
        write!(f, "{sign}${}.{:02}", magnitude / 100, magnitude % 100)
    }
}

/// Signed change applied to the countdown clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimerAdjustment {
    /// Adds time to the clock.
    Bonus(Duration),
    /// Removes time from the clock.
    Penalty(Duration),
}

/// Axis-aligned rectangular trigger zone measured in world units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "ZoneExtents")]
pub struct Zone {
    center: Vec2,
    size: Vec2,
}

impl Zone {
    /// Creates a zone centred on `center` spanning `size`.
    #[must_use]
    pub fn new(center: Vec2, size: Vec2) -> Self {
        Self {
            center,
            size: size.abs(),
        }
    }

    /// Centre of the zone.
    #[must_use]
    pub const fn center(&self) -> Vec2 {
        self.center
    }

    /// Full extents of the zone.
    #[must_use]
    pub const fn size(&self) -> Vec2 {
        self.size
    }

    /// Reports whether the point lies inside the zone, edges included.
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        let offset = (point - self.center).abs();
        let half = self.size * 0.5;
        offset.x <= half.x && offset.y <= half.y
    }
}

#[derive(Deserialize)]
struct ZoneExtents {
    center: Vec2,
    size: Vec2,
}

impl From<ZoneExtents> for Zone {
    fn from(extents: ZoneExtents) -> Self {
        Self::new(extents.center, extents.size)
    }
}

/// Immutable representation of a single artwork's state used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct ArtworkSnapshot {
    /// Identifier allocated to the artwork by the world.
    pub id: ArtworkId,
    /// Name of the template the artwork was created from.
    pub name: String,
    /// Current position of the artwork in world units.
    pub position: Vec2,
    /// Attribute judged by the active criterion.
    pub attribute: Attribute,
    /// Whether the artwork satisfies the current target.
    pub is_valid: bool,
    /// Whether a stamp verdict has been recorded.
    pub is_graded: bool,
    /// Whether the recorded verdict was correct. Meaningful only when graded.
    pub graded_correctly: bool,
    /// Last verdict stamped onto the artwork.
    pub rating: Option<Rating>,
}

/// Read-only snapshot describing all live artworks.
#[derive(Clone, Debug, Default)]
pub struct ArtworkView {
    snapshots: Vec<ArtworkSnapshot>,
}

impl ArtworkView {
    /// Creates a new artwork view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<ArtworkSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &ArtworkSnapshot> {
        self.snapshots.iter()
    }

    /// Iterator over the artworks positioned inside the zone.
    pub fn within<'a>(&'a self, zone: &'a Zone) -> impl Iterator<Item = &'a ArtworkSnapshot> {
        self.snapshots
            .iter()
            .filter(move |snapshot| zone.contains(snapshot.position))
    }

    /// Looks up the snapshot of a single artwork.
    #[must_use]
    pub fn get(&self, artwork: ArtworkId) -> Option<&ArtworkSnapshot> {
        self.snapshots
            .binary_search_by_key(&artwork, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Number of artworks captured in the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<ArtworkSnapshot> {
        self.snapshots
    }
}

/// Read-only snapshot of the validity oracle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OracleView {
    criterion: Criterion,
    master: Vec<Attribute>,
    unlocked: Vec<Attribute>,
    current: Option<Attribute>,
}

impl OracleView {
    /// Captures a new oracle view.
    #[must_use]
    pub fn new(
        criterion: Criterion,
        master: Vec<Attribute>,
        unlocked: Vec<Attribute>,
        current: Option<Attribute>,
    ) -> Self {
        Self {
            criterion,
            master,
            unlocked,
            current,
        }
    }

    /// Attribute the rule judges.
    #[must_use]
    pub const fn criterion(&self) -> Criterion {
        self.criterion
    }

    /// Every value that can ever be unlocked, in unlock order.
    #[must_use]
    pub fn master(&self) -> &[Attribute] {
        &self.master
    }

    /// Values currently available to the rotation.
    #[must_use]
    pub fn unlocked(&self) -> &[Attribute] {
        &self.unlocked
    }

    /// Master-list values that are not unlocked yet, in master-list order.
    pub fn locked(&self) -> impl Iterator<Item = &Attribute> {
        self.master
            .iter()
            .filter(move |value| !self.unlocked.iter().any(|unlocked| unlocked.matches(value)))
    }

    /// Value artworks are currently judged against.
    #[must_use]
    pub fn current(&self) -> Option<&Attribute> {
        self.current.as_ref()
    }
}

/// Configuration problems detected while assembling a round.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The master list of target values is empty.
    #[error("the master list of target values is empty")]
    EmptyMasterList,
    /// More values were requested unlocked than the master list holds.
    #[error("{requested} values requested unlocked but the master list holds {available}")]
    TooManyInitialValues {
        /// Number of values requested at round start.
        requested: usize,
        /// Size of the master list.
        available: usize,
    },
    /// The round would start with no time on the clock.
    #[error("the round duration must be greater than zero")]
    ZeroRoundDuration,
    /// The spawn floor exceeds the starting spawn interval.
    #[error("minimum spawn interval {minimum:?} exceeds initial interval {initial:?}")]
    SpawnFloorAboveInitial {
        /// Starting spawn interval.
        initial: Duration,
        /// Minimum spawn interval.
        minimum: Duration,
    },
    /// A spawn interval or its floor is zero.
    #[error("spawn intervals must be greater than zero")]
    ZeroSpawnInterval,
    /// Unlocks would never fire.
    #[error("submissions per unlock must be greater than zero")]
    ZeroSubmissionsPerUnlock,
    /// The clock rate increment is negative or not a number.
    #[error("the clock rate increment must be a finite, non-negative number")]
    InvalidPaceIncrement,
    /// The master list names the same value twice, ignoring case.
    #[error("the master list names {value} more than once")]
    DuplicateMasterValue {
        /// Value listed again.
        value: Attribute,
    },
    /// A randomised rotation range is inverted.
    #[error("rotation range minimum {min:?} exceeds maximum {max:?}")]
    InvertedRotationRange {
        /// Lower bound of the range.
        min: Duration,
        /// Upper bound of the range.
        max: Duration,
    },
    /// A required trigger zone was not assigned.
    #[error("{component} has no trigger zone assigned")]
    MissingZone {
        /// Component missing its zone.
        component: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attributes_match_ignoring_case() {
        let cubic = Attribute::new("Cubic");
        assert!(cubic.matches(&Attribute::new("cubic")));
        assert!(cubic.matches(&Attribute::new("CUBIC")));
        assert!(!cubic.matches(&Attribute::new("Futurism")));
    }

    #[test]
    fn empty_attribute_never_matches() {
        let empty = Attribute::new("");
        assert!(!empty.matches(&Attribute::new("")));
        assert!(!empty.matches(&Attribute::new("Cubic")));
    }

    #[test]
    fn rating_correctness_follows_validity() {
        assert!(Rating::Yes.is_correct_for(true));
        assert!(Rating::No.is_correct_for(false));
        assert!(!Rating::Yes.is_correct_for(false));
        assert!(!Rating::No.is_correct_for(true));
        assert_eq!(Rating::agreeing_with(true), Rating::Yes);
        assert_eq!(Rating::agreeing_with(false), Rating::No);
    }

    #[test]
    fn zone_contains_edges_and_rejects_outside_points() {
        let zone = Zone::new(Vec2::new(10.0, 5.0), Vec2::new(4.0, 2.0));
        assert!(zone.contains(Vec2::new(10.0, 5.0)));
        assert!(zone.contains(Vec2::new(12.0, 6.0)));
        assert!(zone.contains(Vec2::new(8.0, 4.0)));
        assert!(!zone.contains(Vec2::new(12.1, 5.0)));
        assert!(!zone.contains(Vec2::new(10.0, 3.9)));
    }

    #[test]
    fn zone_normalises_negative_size() {
        let zone = Zone::new(Vec2::ZERO, Vec2::new(-2.0, -2.0));
        assert_eq!(zone.size(), Vec2::new(2.0, 2.0));
        assert!(zone.contains(Vec2::new(1.0, -1.0)));
    }

    #[test]
    fn deserialized_zone_normalises_negative_size() {
        let zone: Zone = toml::from_str("center = [0.0, 0.0]\nsize = [-4.0, 2.0]\n")
            .expect("zone parses");
        assert_eq!(zone.size(), Vec2::new(4.0, 2.0));
        assert!(zone.contains(Vec2::new(1.5, 0.5)));
    }

    #[test]
    fn money_formats_with_two_decimals() {
        assert_eq!(Money::from_units(100).to_string(), "$100.00");
        assert_eq!(Money::from_cents(1_205).to_string(), "$12.05");
        assert_eq!(Money::from_cents(-50).to_string(), "-$0.50");
        assert_eq!(Money::ZERO.to_string(), "$0.00");
    }

    #[test]
    fn oracle_view_lists_locked_values_in_master_order() {
        let view = OracleView::new(
            Criterion::Style,
            vec!["StillLife".into(), "Cubic".into(), "Futurism".into()],
            vec!["Cubic".into()],
            Some("Cubic".into()),
        );
        let locked: Vec<&str> = view.locked().map(Attribute::as_str).collect();
        assert_eq!(locked, ["StillLife", "Futurism"]);
    }

    #[test]
    fn locked_values_ignore_case_of_unlocked_entries() {
        let view = OracleView::new(
            Criterion::Style,
            vec!["StillLife".into(), "Cubic".into()],
            vec!["cubic".into()],
            Some("cubic".into()),
        );
        let locked: Vec<&str> = view.locked().map(Attribute::as_str).collect();
        assert_eq!(locked, ["StillLife"]);
    }

    #[test]
    fn artwork_view_looks_up_by_identifier() {
        let view = ArtworkView::from_snapshots(vec![snapshot(3, 0.0), snapshot(1, 5.0)]);
        assert_eq!(view.iter().map(|s| s.id.get()).collect::<Vec<_>>(), [1, 3]);
        assert_eq!(view.get(ArtworkId::new(3)).map(|s| s.position.x), Some(0.0));
        assert!(view.get(ArtworkId::new(2)).is_none());
    }

    #[test]
    fn template_is_readable_from_toml() {
        let template: ArtworkTemplate =
            toml::from_str("name = \"Sunflowers\"\ncolor = \"Yellow\"\nstyle = \"StillLife\"\n")
                .expect("template parses");
        assert_eq!(template.name(), "Sunflowers");
        assert_eq!(template.attribute(Criterion::Color).as_str(), "Yellow");
        assert_eq!(template.attribute(Criterion::Style).as_str(), "StillLife");
    }

    fn snapshot(id: u32, x: f32) -> ArtworkSnapshot {
        ArtworkSnapshot {
            id: ArtworkId::new(id),
            name: format!("artwork-{id}"),
            position: Vec2::new(x, 0.0),
            attribute: Attribute::new("Cubic"),
            is_valid: false,
            is_graded: false,
            graded_correctly: false,
            rating: None,
        }
    }
}
