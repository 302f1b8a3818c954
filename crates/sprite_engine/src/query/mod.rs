//! Spatial queries against the live sprite set
//!
//! Every query goes broad phase first (the spatial index) and then runs an
//! exact test. Point, rect and line queries test sprite bounds; overlap queries
//! test collide rects of collision participants. Sprites with zero-area bounds
//! never appear in any result.

use crate::error::SpriteResult;
use crate::foundation::math::{Rect, Vec2};
use crate::physics::{clip_segment, rects_overlap};
use crate::spatial::SpatialIndex;
use crate::sprite::{Sprite, SpriteId, SpriteStore};

/// A sprite crossed by a segment query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentHit {
    /// The sprite crossed
    pub sprite: SpriteId,
    /// Fraction along the segment where it enters the sprite's bounds
    pub ti1: f32,
    /// Fraction along the segment where it leaves the sprite's bounds
    pub ti2: f32,
    /// Point at `ti1`
    pub entry_point: Vec2,
    /// Point at `ti2`
    pub exit_point: Vec2,
}

/// Two sprites whose collide rects overlap (always stores the smaller id first)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OverlapPair {
    /// Smaller id
    pub first: SpriteId,
    /// Larger id
    pub second: SpriteId,
}

impl OverlapPair {
    /// Create a new pair (always stores smaller id first for consistency)
    pub fn new(a: SpriteId, b: SpriteId) -> Self {
        if a < b {
            Self { first: a, second: b }
        } else {
            Self { first: b, second: a }
        }
    }

    /// Whether `id` is one of the two sprites
    pub fn contains(&self, id: SpriteId) -> bool {
        self.first == id || self.second == id
    }
}

/// Stateless query view over a store and its index
pub struct QueryEngine<'a> {
    store: &'a SpriteStore,
    index: &'a dyn SpatialIndex,
}

impl<'a> QueryEngine<'a> {
    /// Bind a query view
    pub fn new(store: &'a SpriteStore, index: &'a dyn SpatialIndex) -> Self {
        Self { store, index }
    }

    /// Sprites whose bounds contain `point`, in iteration order
    pub fn sprites_at_point(&self, point: Vec2) -> Vec<SpriteId> {
        let region = Rect::new(point.x, point.y, 0.0, 0.0);
        self.matching(region, |sprite| sprite.bounds().contains_point(point))
    }

    /// Sprites whose bounds overlap `rect` with positive area, in iteration order
    pub fn sprites_in_rect(&self, rect: Rect) -> Vec<SpriteId> {
        if rect.is_empty() {
            return Vec::new();
        }
        self.matching(rect, |sprite| sprite.bounds().overlaps(&rect))
    }

    /// Sprites crossed by the segment `start -> end`, ordered by entry fraction
    pub fn sprites_along_line(&self, start: Vec2, end: Vec2) -> Vec<SpriteId> {
        self.sprite_info_along_line(start, end)
            .into_iter()
            .map(|hit| hit.sprite)
            .collect()
    }

    /// Entry/exit detail for every sprite crossed by `start -> end`
    ///
    /// Ordered by `ti1`, ties by sprite id.
    pub fn sprite_info_along_line(&self, start: Vec2, end: Vec2) -> Vec<SegmentHit> {
        let region = Rect::new(
            start.x.min(end.x),
            start.y.min(end.y),
            (end.x - start.x).abs(),
            (end.y - start.y).abs(),
        );
        let delta = end - start;

        let mut hits: Vec<SegmentHit> = self
            .candidates(region)
            .filter(|sprite| !sprite.bounds().is_empty())
            .filter_map(|sprite| {
                clip_segment(start, end, &sprite.bounds()).map(|(ti1, ti2)| SegmentHit {
                    sprite: sprite.id(),
                    ti1,
                    ti2,
                    entry_point: start + delta * ti1,
                    exit_point: start + delta * ti2,
                })
            })
            .collect();

        hits.sort_by(|a, b| a.ti1.total_cmp(&b.ti1).then(a.sprite.cmp(&b.sprite)));
        hits
    }

    /// Sprites whose collide rects currently overlap `id`'s, in iteration order
    pub fn overlapping_sprites(&self, id: SpriteId) -> SpriteResult<Vec<SpriteId>> {
        let sprite = self.store.get(id)?;
        if !sprite.participates_in_collisions() {
            return Ok(Vec::new());
        }
        let rect = sprite.world_collide_rect();
        Ok(self.matching(rect, |other| {
            other.id() != id
                && other.participates_in_collisions()
                && rects_overlap(&rect, &other.world_collide_rect())
        }))
    }

    /// Every pair of collision participants whose collide rects overlap, sorted
    pub fn all_overlapping_pairs(&self) -> Vec<OverlapPair> {
        let mut pairs = Vec::new();
        for sprite in self.store.iter_ordered() {
            if !sprite.participates_in_collisions() {
                continue;
            }
            let rect = sprite.world_collide_rect();
            for other in self.candidates(rect) {
                if other.id() > sprite.id()
                    && other.participates_in_collisions()
                    && rects_overlap(&rect, &other.world_collide_rect())
                {
                    pairs.push(OverlapPair::new(sprite.id(), other.id()));
                }
            }
        }
        pairs.sort_unstable();
        pairs.dedup();
        pairs
    }

    fn candidates(&self, region: Rect) -> impl Iterator<Item = &'a Sprite> + '_ {
        let store = self.store;
        self.index
            .candidates_for_region(region)
            .into_iter()
            .filter_map(move |id| store.get(id).ok())
    }

    /// Candidates passing `test` and having non-empty bounds, in iteration order
    fn matching<F>(&self, region: Rect, test: F) -> Vec<SpriteId>
    where
        F: Fn(&Sprite) -> bool,
    {
        let mut ids: Vec<SpriteId> = self
            .candidates(region)
            .filter(|sprite| !sprite.bounds().is_empty() && test(sprite))
            .map(Sprite::id)
            .collect();
        self.store.sort_by_order(&mut ids);
        ids
    }
}
