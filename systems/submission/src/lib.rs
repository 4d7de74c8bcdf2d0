#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure submission system that settles graded artworks dropped into the gate.

use std::{collections::BTreeSet, time::Duration};

use art_critic_core::{
    ArtworkId, ArtworkSnapshot, ArtworkView, Command, ConfigError, Money, RoundPhase,
    TimerAdjustment, Zone,
};
use tracing::{debug, error};

const DEFAULT_REWARD_UNITS: i64 = 100;
const DEFAULT_BONUS: Duration = Duration::from_secs(20);
const DEFAULT_PENALTY: Duration = Duration::from_secs(5);

/// Policy applied to artworks that reach the gate without a verdict.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UngradedPolicy {
    /// The artwork passes through untouched and stays in play.
    #[default]
    Ignore,
    /// The artwork is refused so adapters can bounce it out of the gate.
    Reject,
}

/// Configuration parameters required to construct the submission gate.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    zone: Option<Zone>,
    reward: Money,
    bonus: Duration,
    penalty: Duration,
    ungraded: UngradedPolicy,
}

impl Config {
    /// Creates a configuration for a gate over `zone` with the default payouts.
    #[must_use]
    pub const fn new(zone: Option<Zone>) -> Self {
        Self {
            zone,
            reward: Money::from_units(DEFAULT_REWARD_UNITS),
            bonus: DEFAULT_BONUS,
            penalty: DEFAULT_PENALTY,
            ungraded: UngradedPolicy::Ignore,
        }
    }

    /// Overrides the money credited for a correctly graded artwork.
    #[must_use]
    pub const fn with_reward(mut self, reward: Money) -> Self {
        self.reward = reward;
        self
    }

    /// Overrides the time added for a correct verdict and removed for a wrong one.
    #[must_use]
    pub const fn with_time_adjustments(mut self, bonus: Duration, penalty: Duration) -> Self {
        self.bonus = bonus;
        self.penalty = penalty;
        self
    }

    /// Overrides how ungraded arrivals are treated.
    #[must_use]
    pub const fn with_ungraded_policy(mut self, policy: UngradedPolicy) -> Self {
        self.ungraded = policy;
        self
    }
}

/// Submission gate that converts graded arrivals into settlements.
#[derive(Debug)]
pub struct SubmissionGate {
    zone: Option<Zone>,
    reward: Money,
    bonus: Duration,
    penalty: Duration,
    ungraded: UngradedPolicy,
    occupants: BTreeSet<ArtworkId>,
}

impl SubmissionGate {
    /// Creates a new gate. A missing zone is reported once and leaves the gate inert.
    #[must_use]
    pub fn new(config: Config) -> Self {
        if config.zone.is_none() {
            let problem = ConfigError::MissingZone {
                component: "submission gate",
            };
            error!(%problem, "submission gate disabled");
        }

        Self {
            zone: config.zone,
            reward: config.reward,
            bonus: config.bonus,
            penalty: config.penalty,
            ungraded: config.ungraded,
            occupants: BTreeSet::new(),
        }
    }

    /// Zone watched by the gate, if one was assigned.
    #[must_use]
    pub const fn zone(&self) -> Option<Zone> {
        self.zone
    }

    /// Reports whether the gate can ever accept a submission.
    #[must_use]
    pub const fn is_operational(&self) -> bool {
        self.zone.is_some()
    }

    /// Policy applied to ungraded arrivals.
    #[must_use]
    pub const fn ungraded_policy(&self) -> UngradedPolicy {
        self.ungraded
    }

    /// Compares the gate's occupants against the previous frame and handles arrivals.
    ///
    /// An artwork arrives when it is inside the zone now but was not on the
    /// previous call. Artworks that stay inside do not arrive again.
    pub fn handle(&mut self, phase: RoundPhase, artworks: &ArtworkView, out: &mut Vec<Command>) {
        let Some(zone) = self.zone else {
            return;
        };
        if phase != RoundPhase::Running {
            self.occupants.clear();
            return;
        }

        let mut occupants = BTreeSet::new();
        for artwork in artworks.within(&zone) {
            let _ = occupants.insert(artwork.id);
            if !self.occupants.contains(&artwork.id) {
                self.on_arrival(artwork, out);
            }
        }
        self.occupants = occupants;
    }

    /// Settles or refuses a single artwork entering the gate.
    pub fn on_arrival(&self, artwork: &ArtworkSnapshot, out: &mut Vec<Command>) {
        if !artwork.is_graded {
            match self.ungraded {
                UngradedPolicy::Ignore => {
                    debug!(artwork = artwork.id.get(), "ungraded artwork ignored at gate");
                }
                UngradedPolicy::Reject => {
                    debug!(artwork = artwork.id.get(), "ungraded artwork refused at gate");
                    out.push(Command::RejectSubmission {
                        artwork: artwork.id,
                    });
                }
            }
            return;
        }

        let (reward, adjustment) = self.payout(artwork.graded_correctly);
        debug!(
            artwork = artwork.id.get(),
            correct = artwork.graded_correctly,
            %reward,
            "artwork submitted"
        );
        out.push(Command::SettleSubmission {
            artwork: artwork.id,
            reward,
            adjustment,
        });
    }

    /// Reward and clock adjustment for a verdict of the given correctness.
    #[must_use]
    pub const fn payout(&self, correct: bool) -> (Money, TimerAdjustment) {
        if correct {
            (self.reward, TimerAdjustment::Bonus(self.bonus))
        } else {
            (Money::ZERO, TimerAdjustment::Penalty(self.penalty))
        }
    }
}
