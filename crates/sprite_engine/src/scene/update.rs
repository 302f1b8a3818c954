//! Per-sprite update hooks

use std::rc::Rc;

use crate::foundation::math::Vec2;
use crate::sprite::Sprite;

/// What an update hook wants done with its sprite this frame
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum SpriteUpdate {
    /// Leave the sprite where it is
    #[default]
    Stay,
    /// Teleport the sprite, ignoring collisions
    MoveTo(Vec2),
    /// Move towards a goal with collision resolution
    MoveWithCollisions(Vec2),
}

/// Update hook; receives an immutable snapshot of its sprite
///
/// Hooks cannot reach the world, so they can't add, remove or mutate sprites
/// while the update pass is iterating.
pub type UpdateFn = Rc<dyn Fn(&Sprite) -> SpriteUpdate>;

/// Wrap a closure as an [`UpdateFn`]
pub fn update_fn<F>(f: F) -> UpdateFn
where
    F: Fn(&Sprite) -> SpriteUpdate + 'static,
{
    Rc::new(f)
}
