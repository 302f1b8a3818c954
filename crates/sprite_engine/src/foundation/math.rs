//! Math utilities and types
//!
//! Provides the 2D geometry the sprite engine works in: vectors from
//! nalgebra, half-open rectangles and integer contact normals.

use approx::AbsDiffEq;
use serde::{Deserialize, Serialize};

pub use nalgebra::Vector2;

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// Axis-aligned rectangle with a half-open extent.
///
/// A rectangle covers `x <= px < x + width` and `y <= py < y + height`.
/// Two rectangles whose edges coincide *touch* but do not *overlap*;
/// overlap always means a positive-area intersection.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge (inclusive)
    pub x: f32,
    /// Top edge (inclusive)
    pub y: f32,
    /// Horizontal extent
    pub width: f32,
    /// Vertical extent
    pub height: f32,
}

impl Rect {
    /// Create a new rectangle
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// The zero rectangle at the origin
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }

    /// Create a rectangle from its top-left corner and size
    pub fn from_origin_size(origin: Vec2, size: Vec2) -> Self {
        Self::new(origin.x, origin.y, size.x, size.y)
    }

    /// Right edge (exclusive)
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge (exclusive)
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Top-left corner
    pub fn origin(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Width and height as a vector
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// Area of the rectangle (zero for degenerate rectangles)
    pub fn area(&self) -> f32 {
        if self.is_empty() {
            0.0
        } else {
            self.width * self.height
        }
    }

    /// A rectangle is empty when it has no positive area
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Copy of this rectangle with negative or non-finite sizes clamped to zero
    pub fn clamped(&self) -> Self {
        let clamp = |v: f32| if v.is_finite() && v > 0.0 { v } else { 0.0 };
        Self::new(self.x, self.y, clamp(self.width), clamp(self.height))
    }

    /// Copy of this rectangle moved by `delta`
    pub fn translated(&self, delta: Vec2) -> Self {
        Self::new(self.x + delta.x, self.y + delta.y, self.width, self.height)
    }

    /// Copy of this rectangle with its origin placed at `origin`
    pub fn with_origin(&self, origin: Vec2) -> Self {
        Self::new(origin.x, origin.y, self.width, self.height)
    }

    /// Half-open point containment
    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    /// Whether `other` lies entirely inside this rectangle
    pub fn contains_rect(&self, other: &Self) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Positive-area intersection test
    pub fn overlaps(&self, other: &Self) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Closed intersection test: touching edges count as intersecting
    pub fn intersects_closed(&self, other: &Self) -> bool {
        self.x <= other.right()
            && other.x <= self.right()
            && self.y <= other.bottom()
            && other.y <= self.bottom()
    }

    /// Intersection of both rectangles, empty (zero-sized) when they don't overlap
    pub fn intersection(&self, other: &Self) -> Self {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        Self::new(x, y, (right - x).max(0.0), (bottom - y).max(0.0))
    }

    /// Bounding rectangle of both rectangles, ignoring empty operands
    pub fn union(&self, other: &Self) -> Self {
        if other.is_empty() {
            return *self;
        }
        if self.is_empty() {
            return *other;
        }
        self.bounding(other)
    }

    /// Bounding rectangle of both rectangles, empty or not
    pub fn bounding(&self, other: &Self) -> Self {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Self::new(x, y, right - x, bottom - y)
    }
}

impl AbsDiffEq for Rect {
    type Epsilon = f32;

    fn default_epsilon() -> Self::Epsilon {
        f32::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        self.x.abs_diff_eq(&other.x, epsilon)
            && self.y.abs_diff_eq(&other.y, epsilon)
            && self.width.abs_diff_eq(&other.width, epsilon)
            && self.height.abs_diff_eq(&other.height, epsilon)
    }
}

/// Integer contact normal; each component is -1, 0 or 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CollisionNormal {
    /// Horizontal component
    pub x: i8,
    /// Vertical component
    pub y: i8,
}

impl CollisionNormal {
    /// Create a normal from its components
    pub const fn new(x: i8, y: i8) -> Self {
        Self { x, y }
    }

    /// Whether the normal points along the x axis
    pub const fn is_horizontal(&self) -> bool {
        self.x != 0
    }

    /// Whether the normal points along the y axis
    pub const fn is_vertical(&self) -> bool {
        self.y != 0
    }
}
