//! Authoritative storage for the artworks currently in play.

use std::collections::BTreeMap;

use art_critic_core::{ArtworkId, ArtworkSnapshot, ArtworkTemplate, Criterion, Rating};
use glam::Vec2;

/// State of a single live artwork.
#[derive(Clone, Debug)]
pub(crate) struct Artwork {
    pub(crate) id: ArtworkId,
    pub(crate) template: ArtworkTemplate,
    pub(crate) position: Vec2,
    pub(crate) is_valid: bool,
    pub(crate) rating: Option<Rating>,
    pub(crate) graded_correctly: bool,
}

impl Artwork {
    pub(crate) fn is_graded(&self) -> bool {
        self.rating.is_some()
    }

    pub(crate) fn snapshot(&self, criterion: Criterion) -> ArtworkSnapshot {
        ArtworkSnapshot {
            id: self.id,
            name: self.template.name().to_owned(),
            position: self.position,
            attribute: self.template.attribute(criterion).clone(),
            is_valid: self.is_valid,
            is_graded: self.is_graded(),
            graded_correctly: self.graded_correctly,
            rating: self.rating,
        }
    }
}

/// Registry that stores artworks and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct ArtworkRegistry {
    entries: BTreeMap<ArtworkId, Artwork>,
    next_id: ArtworkId,
}

impl ArtworkRegistry {
    /// Creates an empty registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_id: ArtworkId::new(0),
        }
    }

    /// Stores a new artwork and returns the identifier allocated to it.
    pub(crate) fn insert(
        &mut self,
        template: ArtworkTemplate,
        position: Vec2,
        is_valid: bool,
    ) -> ArtworkId {
        let id = self.next_id;
        self.next_id = ArtworkId::new(id.get().saturating_add(1));
        let _ = self.entries.insert(
            id,
            Artwork {
                id,
                template,
                position,
                is_valid,
                rating: None,
                graded_correctly: false,
            },
        );
        id
    }

    pub(crate) fn get(&self, id: ArtworkId) -> Option<&Artwork> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: ArtworkId) -> Option<&mut Artwork> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn remove(&mut self, id: ArtworkId) -> Option<Artwork> {
        self.entries.remove(&id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Artwork> {
        self.entries.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Artwork> {
        self.entries.values_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use art_critic_core::Attribute;

    fn template() -> ArtworkTemplate {
        ArtworkTemplate::new("Guernica", Attribute::new("Grey"), Attribute::new("Cubic"))
    }

    #[test]
    fn identifiers_are_never_reused() {
        let mut registry = ArtworkRegistry::new();
        let first = registry.insert(template(), Vec2::ZERO, false);
        assert!(registry.remove(first).is_some());
        let second = registry.insert(template(), Vec2::ZERO, false);
        assert_ne!(first, second);
        assert_eq!(second.get(), 1);
    }

    #[test]
    fn snapshot_reports_criterion_attribute() {
        let mut registry = ArtworkRegistry::new();
        let id = registry.insert(template(), Vec2::new(1.0, 2.0), true);
        let artwork = registry.get(id).expect("artwork stored");

        let by_style = artwork.snapshot(Criterion::Style);
        assert_eq!(by_style.attribute, Attribute::new("Cubic"));
        assert!(by_style.is_valid);
        assert!(!by_style.is_graded);

        let by_color = artwork.snapshot(Criterion::Color);
        assert_eq!(by_color.attribute, Attribute::new("Grey"));
    }
}
