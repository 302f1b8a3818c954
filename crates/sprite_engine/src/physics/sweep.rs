//! Narrow-phase rectangle tests
//!
//! A moving rect against a stationary rect reduces to a point against their
//! Minkowski sum: the other rect grown by the mover's size, tested against the
//! mover's origin. The slab method then gives entry/exit fractions per axis.

use crate::foundation::math::{CollisionNormal, Rect, Vec2};

/// Result of sweeping one rect against another
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Fraction of the displacement at which contact starts, in `[0, 1)`
    pub t: f32,
    /// The rects already overlapped before moving
    pub overlaps: bool,
    /// Contact normal pointing away from the other rect
    pub normal: CollisionNormal,
    /// Origin of the moving rect at the moment of contact
    pub touch: Vec2,
}

/// Minkowski sum of `other` and the size of `moving`, anchored for `moving`'s origin
fn minkowski(moving: &Rect, other: &Rect) -> Rect {
    Rect::new(
        other.x - moving.width,
        other.y - moving.height,
        other.width + moving.width,
        other.height + moving.height,
    )
}

/// Entry and exit fractions along one axis, `None` when the axis never overlaps
fn slab(origin: f32, delta: f32, low: f32, high: f32) -> Option<(f32, f32)> {
    if delta == 0.0 {
        if origin > low && origin < high {
            Some((f32::NEG_INFINITY, f32::INFINITY))
        } else {
            None
        }
    } else {
        let t1 = (low - origin) / delta;
        let t2 = (high - origin) / delta;
        Some((t1.min(t2), t1.max(t2)))
    }
}

/// Minimum translation out of an overlap; ties prefer -x, +x, -y, +y
fn separate(origin: Vec2, sum: &Rect) -> Contact {
    let candidates = [
        (origin.x - sum.x, CollisionNormal::new(-1, 0), Vec2::new(sum.x, origin.y)),
        (sum.right() - origin.x, CollisionNormal::new(1, 0), Vec2::new(sum.right(), origin.y)),
        (origin.y - sum.y, CollisionNormal::new(0, -1), Vec2::new(origin.x, sum.y)),
        (sum.bottom() - origin.y, CollisionNormal::new(0, 1), Vec2::new(origin.x, sum.bottom())),
    ];

    let mut best = candidates[0];
    for candidate in &candidates[1..] {
        if candidate.0 < best.0 {
            best = *candidate;
        }
    }

    Contact {
        t: 0.0,
        overlaps: true,
        normal: best.1,
        touch: best.2,
    }
}

/// Sweep `moving` by `delta` against the stationary `other`
///
/// Returns a contact when the rects overlap at the start, or when their
/// interiors start to overlap at some `t` in `[0, 1)`. Grazing along a shared
/// edge is not a contact.
pub fn sweep_rects(moving: &Rect, delta: Vec2, other: &Rect) -> Option<Contact> {
    if moving.is_empty() || other.is_empty() {
        return None;
    }

    let sum = minkowski(moving, other);
    let origin = moving.origin();

    if origin.x > sum.x && origin.x < sum.right() && origin.y > sum.y && origin.y < sum.bottom() {
        return Some(separate(origin, &sum));
    }

    let (enter_x, exit_x) = slab(origin.x, delta.x, sum.x, sum.right())?;
    let (enter_y, exit_y) = slab(origin.y, delta.y, sum.y, sum.bottom())?;

    let t_entry = enter_x.max(enter_y);
    let t_exit = exit_x.min(exit_y);
    if !(t_entry < t_exit) || t_entry < 0.0 || t_entry >= 1.0 {
        return None;
    }

    let hit_x = enter_x > enter_y || (enter_x == enter_y && delta.x != 0.0);
    let (normal, touch) = if hit_x {
        let edge = if delta.x > 0.0 { sum.x } else { sum.right() };
        let normal = CollisionNormal::new(if delta.x > 0.0 { -1 } else { 1 }, 0);
        (normal, Vec2::new(edge, origin.y + delta.y * t_entry))
    } else {
        let edge = if delta.y > 0.0 { sum.y } else { sum.bottom() };
        let normal = CollisionNormal::new(0, if delta.y > 0.0 { -1 } else { 1 });
        (normal, Vec2::new(origin.x + delta.x * t_entry, edge))
    };

    Some(Contact {
        t: t_entry.clamp(0.0, 1.0),
        overlaps: false,
        normal,
        touch,
    })
}

/// Positive-area overlap expressed as a zero-displacement sweep
pub fn rects_overlap(a: &Rect, b: &Rect) -> bool {
    sweep_rects(a, Vec2::zeros(), b).is_some_and(|contact| contact.overlaps)
}

/// Clip the segment `start -> end` against `rect` (Liang-Barsky)
///
/// Returns the entry and exit fractions along the segment. The clipped part
/// must lie in the half-open rect, so a segment running along the right or
/// bottom edge is a miss.
pub fn clip_segment(start: Vec2, end: Vec2, rect: &Rect) -> Option<(f32, f32)> {
    if rect.is_empty() {
        return None;
    }

    let delta = end - start;
    let mut t0 = 0.0_f32;
    let mut t1 = 1.0_f32;

    let edges = [
        (-delta.x, start.x - rect.x),
        (delta.x, rect.right() - start.x),
        (-delta.y, start.y - rect.y),
        (delta.y, rect.bottom() - start.y),
    ];

    for (p, q) in edges {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
        } else {
            let r = q / p;
            if p < 0.0 {
                if r > t1 {
                    return None;
                }
                t0 = t0.max(r);
            } else {
                if r < t0 {
                    return None;
                }
                t1 = t1.min(r);
            }
        }
    }

    let midpoint = start + delta * ((t0 + t1) * 0.5);
    if rect.contains_point(midpoint) {
        Some((t0, t1))
    } else {
        None
    }
}
