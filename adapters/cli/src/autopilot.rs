use std::collections::BTreeMap;

use art_critic_core::{ArtworkId, ArtworkView, Rating};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::session::{FrameInput, Layout};

/// Scripted player standing in for mouse input.
///
/// Every frame it drops graded artworks into the submission zone, carries the
/// oldest ungraded artwork to a stamp and presses it. Whether it judges an
/// artwork correctly is decided once per artwork with probability `accuracy`.
#[derive(Debug)]
pub(crate) struct Autopilot {
    accuracy: f64,
    intends_correct: BTreeMap<ArtworkId, bool>,
    rng: ChaCha8Rng,
}

impl Autopilot {
    pub(crate) fn new(accuracy: f64, seed: u64) -> Self {
        let accuracy = if accuracy.is_finite() {
            accuracy.clamp(0.0, 1.0)
        } else {
            1.0
        };
        Self {
            accuracy,
            intends_correct: BTreeMap::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub(crate) fn plan(&mut self, artworks: &ArtworkView, layout: &Layout) -> FrameInput {
        self.intends_correct
            .retain(|artwork, _| artworks.get(*artwork).is_some());

        let mut input = FrameInput::default();
        if let Some(gate) = layout.submission_zone {
            input.moves.extend(
                artworks
                    .iter()
                    .filter(|artwork| artwork.is_graded && !gate.contains(artwork.position))
                    .map(|artwork| (artwork.id, gate.center())),
            );
        }

        let Some(next) = artworks.iter().find(|artwork| !artwork.is_graded) else {
            return input;
        };
        let correct = match self.intends_correct.get(&next.id) {
            Some(correct) => *correct,
            None => {
                let correct = self.rng.gen_bool(self.accuracy);
                let _ = self.intends_correct.insert(next.id, correct);
                correct
            }
        };
        let rating = if correct {
            Rating::agreeing_with(next.is_valid)
        } else {
            Rating::agreeing_with(!next.is_valid)
        };

        if let Some(station) = layout.station(rating) {
            if !station.contains(next.position) {
                input.moves.push((next.id, station.center()));
            }
            input.stamp = Some(rating);
        }
        input
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use art_critic_core::{ArtworkSnapshot, Attribute, Zone};
    use glam::Vec2;

    fn layout() -> Layout {
        Layout {
            yes_zone: Some(Zone::new(Vec2::new(-5.0, 0.0), Vec2::splat(2.0))),
            no_zone: Some(Zone::new(Vec2::new(5.0, 0.0), Vec2::splat(2.0))),
            submission_zone: Some(Zone::new(Vec2::new(0.0, -5.0), Vec2::splat(2.0))),
        }
    }

    fn artwork(id: u32, is_valid: bool, rating: Option<Rating>) -> ArtworkSnapshot {
        ArtworkSnapshot {
            id: ArtworkId::new(id),
            name: format!("artwork-{id}"),
            position: Vec2::ZERO,
            attribute: Attribute::new("Cubic"),
            is_valid,
            is_graded: rating.is_some(),
            graded_correctly: rating.map_or(false, |rating| rating.is_correct_for(is_valid)),
            rating,
        }
    }

    #[test]
    fn accurate_pilot_carries_valid_artwork_to_yes_stamp() {
        let mut pilot = Autopilot::new(1.0, 1);
        let view = ArtworkView::from_snapshots(vec![artwork(1, true, None)]);

        let input = pilot.plan(&view, &layout());

        assert_eq!(input.stamp, Some(Rating::Yes));
        assert_eq!(input.moves, vec![(ArtworkId::new(1), Vec2::new(-5.0, 0.0))]);
    }

    #[test]
    fn careless_pilot_picks_the_wrong_stamp() {
        let mut pilot = Autopilot::new(0.0, 1);
        let view = ArtworkView::from_snapshots(vec![artwork(1, true, None)]);
        assert_eq!(pilot.plan(&view, &layout()).stamp, Some(Rating::No));
    }

    #[test]
    fn graded_artworks_are_dropped_into_the_gate() {
        let mut pilot = Autopilot::new(1.0, 1);
        let view = ArtworkView::from_snapshots(vec![
            artwork(1, true, Some(Rating::Yes)),
            artwork(2, false, Some(Rating::Yes)),
        ]);

        let input = pilot.plan(&view, &layout());

        assert_eq!(input.stamp, None);
        assert_eq!(
            input.moves,
            vec![
                (ArtworkId::new(1), Vec2::new(0.0, -5.0)),
                (ArtworkId::new(2), Vec2::new(0.0, -5.0)),
            ]
        );
    }
}
