//! Scene context
//!
//! [`SpriteWorld`] is the single owner of sprites and everything derived from
//! them. Hooks registered with it are plain function values:
//!
//! ```text
//! update_sprites()  ──► UpdateFn(&Sprite)            -> SpriteUpdate
//! move_with_collisions ► ResponseFn(&Sprite, &Sprite) -> CollisionResponse
//! draw_sprites()    ──► DrawFn(&Sprite, bounds, draw_rect), if the sprite has one
//!                   └─► SpriteRenderer::draw_sprite(&Sprite, bounds, draw_rect)
//! ```
//!
//! Hooks only ever see immutable snapshots, so the sprite set can't change
//! under an iteration.

mod update;
mod world;

#[cfg(test)]
mod tests;

pub use update::{update_fn, SpriteUpdate, UpdateFn};
pub use world::SpriteWorld;
