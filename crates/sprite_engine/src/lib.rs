//! # Sprite Engine
//!
//! A 2D sprite scene with swept-rectangle collision detection.
//!
//! ## Features
//!
//! - **Sprite Store**: Flat sprite records behind generational handles, iterated in z order
//! - **Swept Collisions**: Continuous AABB sweeps with Slide, Freeze, Overlap and Bounce responses
//! - **Broad Phase**: Uniform grid spatial index kept in step with every mutation
//! - **Queries**: Point, rect, segment and overlap queries against the live set
//! - **Redraw Tracking**: Dirty rect accumulation and a renderer trait for drawing
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sprite_engine::prelude::*;
//!
//! fn main() -> Result<(), SpriteError> {
//!     let mut world = SpriteWorld::new();
//!
//!     let player = world.create_sprite();
//!     world.set_bounds(player, Rect::new(0.0, 0.0, 10.0, 10.0))?;
//!
//!     let wall = world.create_sprite();
//!     world.set_bounds(wall, Rect::new(15.0, 0.0, 10.0, 10.0))?;
//!
//!     world.set_collision_response_fn(player, Some(constant_response(CollisionResponse::Slide)))?;
//!
//!     let outcome = world.move_with_collisions(player, Vec2::new(20.0, 0.0))?;
//!     for event in &outcome.events {
//!         println!("hit {:?} at ti={}", event.other, event.ti);
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod error;
pub mod foundation;
pub mod physics;
pub mod query;
pub mod render;
pub mod scene;
pub mod spatial;
pub mod sprite;

pub use error::{SpriteError, SpriteResult};
pub use scene::SpriteWorld;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::{Config, WorldConfig},
        error::{SpriteError, SpriteResult},
        foundation::math::{CollisionNormal, Rect, Vec2},
        physics::{constant_response, response_fn, CollisionEvent, CollisionResponse, MoveOutcome, ResponseFn},
        query::{OverlapPair, SegmentHit},
        render::{draw_fn, DrawFn, SpriteRenderer},
        scene::{update_fn, SpriteUpdate, SpriteWorld, UpdateFn},
        sprite::{ImageFlip, ImageHandle, Sprite, SpriteFlags, SpriteId, UserData},
    };
}
