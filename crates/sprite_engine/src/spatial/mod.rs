//! Spatial partitioning for the broad phase
//!
//! The index maps world regions to candidate sprites so collision resolution
//! and queries only run exact tests against nearby sprites. It is derived
//! data: the scene keeps it in step with the sprite store on every mutation.

mod grid;

pub use grid::UniformGrid;

use crate::foundation::math::Rect;
use crate::sprite::SpriteId;

/// Broad-phase interface
///
/// This abstraction allows swapping partitioning schemes (grid, interval
/// lists, trees) without touching collision resolution or queries.
pub trait SpatialIndex {
    /// Add a sprite covering `rect`
    fn insert(&mut self, id: SpriteId, rect: Rect);

    /// Move a sprite from `old` to `new`; inserts it if it is not indexed yet
    fn update(&mut self, id: SpriteId, old: Rect, new: Rect);

    /// Remove a sprite, returning whether it was indexed
    fn remove(&mut self, id: SpriteId) -> bool;

    /// Sorted, deduplicated candidates whose indexed rect may intersect `region`
    ///
    /// Never misses a sprite whose rect intersects the region (touching edges
    /// included). Sprites indexed with a zero-area rect are never returned.
    fn candidates_for_region(&self, region: Rect) -> Vec<SpriteId>;

    /// Rect currently recorded for a sprite
    fn indexed_rect(&self, id: SpriteId) -> Option<Rect>;

    /// Remove every entry
    fn clear(&mut self);

    /// Number of indexed sprites, degenerate ones included
    fn len(&self) -> usize;

    /// Whether nothing is indexed
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
