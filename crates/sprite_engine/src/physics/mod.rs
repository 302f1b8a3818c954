//! Physics module for swept collision detection and response
//!
//! Broad phase comes from [`crate::spatial`]; this module holds the narrow
//! phase ([`sweep`]), the response policy and the pass-based resolver that
//! turns a requested move into a [`MoveOutcome`].

pub mod collision_world;
pub mod event;
pub mod response;
pub mod sweep;

pub use collision_world::CollisionWorld;
pub use event::{CollisionEvent, MoveOutcome};
pub use response::{constant_response, response_fn, CollisionResponse, ResponseFn, ResponsePolicy};
pub use sweep::{clip_segment, rects_overlap, sweep_rects, Contact};
