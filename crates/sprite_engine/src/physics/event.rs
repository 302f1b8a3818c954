//! Collision events produced by a move

use super::response::CollisionResponse;
use crate::foundation::math::{CollisionNormal, Rect, Vec2};
use crate::sprite::SpriteId;

/// One resolved contact
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionEvent {
    /// The sprite being moved
    pub sprite: SpriteId,
    /// The sprite it touched
    pub other: SpriteId,
    /// Response applied to this contact
    pub response: CollisionResponse,
    /// The sprites already overlapped when the move started
    pub overlaps: bool,
    /// How far through the requested move the contact happened, in `[0, 1]`
    pub ti: f32,
    /// Touch position minus start position
    ///
    /// Zero for an `Overlap` contact that already overlapped, and for any
    /// contact of a zero-displacement check: no push-out is applied to those.
    pub movement: Vec2,
    /// Contact normal pointing away from `other`
    pub normal: CollisionNormal,
    /// Sprite position when the contact began, or the pass start for a
    /// contact that applies no push-out
    pub touch: Vec2,
    /// Bounds of the moving sprite at the touch position
    pub sprite_rect: Rect,
    /// Bounds of the other sprite
    pub other_rect: Rect,
}

/// Result of `check_collisions` / `move_with_collisions`
#[derive(Debug, Clone, PartialEq)]
pub struct MoveOutcome {
    /// Where the sprite ends up
    pub actual: Vec2,
    /// Contacts ordered by `ti`, ties by `other`
    pub events: Vec<CollisionEvent>,
}

impl MoveOutcome {
    /// A move that reached its goal without touching anything
    pub fn unobstructed(goal: Vec2) -> Self {
        Self {
            actual: goal,
            events: Vec::new(),
        }
    }

    /// Whether any contact was reported
    pub fn collided(&self) -> bool {
        !self.events.is_empty()
    }

    /// Whether the sprite touched `other` during the move
    pub fn touched(&self, other: SpriteId) -> bool {
        self.events.iter().any(|event| event.other == other)
    }
}
