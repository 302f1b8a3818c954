//! # Rendering interface
//!
//! The engine does not rasterize anything itself. It tracks which parts of the
//! display changed and, when asked to draw, hands each visible sprite to a
//! caller-supplied [`SpriteRenderer`] once per dirty region it intersects.
//!
//! ## Draw contract
//!
//! - Sprites arrive in ascending z order, ties in insertion order
//! - `bounds` is the sprite's bounds in display space (draw offset applied
//!   unless the sprite ignores it)
//! - `draw_rect` is the part of `bounds` to repaint: the dirty region clipped
//!   to the bounds and to the sprite's clip rect
//! - A sprite with its own [`DrawFn`] is drawn by that hook, with the same
//!   arguments, and never reaches the renderer

mod dirty_rects;

pub use dirty_rects::DirtyRectTracker;

use std::rc::Rc;

use crate::foundation::math::Rect;
use crate::sprite::Sprite;

/// Receiver of draw calls
pub trait SpriteRenderer {
    /// Draw the part `draw_rect` of `sprite`, whose display-space bounds are `bounds`
    fn draw_sprite(&mut self, sprite: &Sprite, bounds: Rect, draw_rect: Rect);
}

impl<F> SpriteRenderer for F
where
    F: FnMut(&Sprite, Rect, Rect),
{
    fn draw_sprite(&mut self, sprite: &Sprite, bounds: Rect, draw_rect: Rect) {
        self(sprite, bounds, draw_rect);
    }
}

/// Per-sprite draw hook: `(sprite, bounds, draw_rect)` as for [`SpriteRenderer`]
pub type DrawFn = Rc<dyn Fn(&Sprite, Rect, Rect)>;

/// Wrap a closure as a [`DrawFn`]
pub fn draw_fn<F>(f: F) -> DrawFn
where
    F: Fn(&Sprite, Rect, Rect) + 'static,
{
    Rc::new(f)
}
