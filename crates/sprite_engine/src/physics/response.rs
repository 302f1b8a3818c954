//! Collision response policy
//!
//! Each contact is resolved with a response chosen by a caller-supplied
//! function of `(moving, other)`. The moving sprite's own function wins, then
//! the world default, then [`CollisionResponse::Freeze`].

use std::fmt;
use std::rc::Rc;

use slotmap::SecondaryMap;

use crate::sprite::{Sprite, SpriteId};

/// How a moving sprite reacts to a contact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CollisionResponse {
    /// Stop moving along the contact normal, keep the tangential motion
    Slide,
    /// Stop at the contact point
    #[default]
    Freeze,
    /// Report the contact and pass through
    Overlap,
    /// Reflect the motion along the contact normal
    Bounce,
}

/// Response function; receives immutable snapshots of both sprites
pub type ResponseFn = Rc<dyn Fn(&Sprite, &Sprite) -> CollisionResponse>;

/// Wrap a closure as a [`ResponseFn`]
pub fn response_fn<F>(f: F) -> ResponseFn
where
    F: Fn(&Sprite, &Sprite) -> CollisionResponse + 'static,
{
    Rc::new(f)
}

/// A [`ResponseFn`] that always answers `response`
pub fn constant_response(response: CollisionResponse) -> ResponseFn {
    Rc::new(move |_: &Sprite, _: &Sprite| response)
}

/// Registered response functions
#[derive(Default, Clone)]
pub struct ResponsePolicy {
    per_sprite: SecondaryMap<SpriteId, ResponseFn>,
    fallback: Option<ResponseFn>,
}

impl ResponsePolicy {
    /// Create a policy that freezes on every contact
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or clear the response function used when `id` is the moving sprite
    pub fn set_for_sprite(&mut self, id: SpriteId, response: Option<ResponseFn>) {
        match response {
            Some(f) => {
                self.per_sprite.insert(id, f);
            }
            None => {
                self.per_sprite.remove(id);
            }
        }
    }

    /// Set or clear the world-wide fallback
    pub fn set_default(&mut self, response: Option<ResponseFn>) {
        self.fallback = response;
    }

    /// Whether `id` has its own response function
    pub fn has_sprite_response(&self, id: SpriteId) -> bool {
        self.per_sprite.contains_key(id)
    }

    /// Give `to` the same response function as `from`
    pub fn copy_sprite_response(&mut self, from: SpriteId, to: SpriteId) {
        if let Some(f) = self.per_sprite.get(from).cloned() {
            self.per_sprite.insert(to, f);
        }
    }

    /// Drop the response function of a removed sprite
    pub fn forget(&mut self, id: SpriteId) {
        self.per_sprite.remove(id);
    }

    /// Drop every per-sprite function; the fallback survives
    pub fn clear_sprites(&mut self) {
        self.per_sprite.clear();
    }

    /// Response for `moving` hitting `other`
    pub fn resolve(&self, moving: &Sprite, other: &Sprite) -> CollisionResponse {
        self.per_sprite
            .get(moving.id())
            .or(self.fallback.as_ref())
            .map_or(CollisionResponse::Freeze, |f| f(moving, other))
    }
}

impl fmt::Debug for ResponsePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponsePolicy")
            .field("per_sprite", &self.per_sprite.len())
            .field("has_fallback", &self.fallback.is_some())
            .finish()
    }
}
