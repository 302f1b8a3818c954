//! Sprite records and their flag/handle types
//!
//! A sprite is a flat record. Behaviour differences come from the flags and
//! from function values registered with the world, never from subtyping.

use bitflags::bitflags;

use crate::foundation::math::{Rect, Vec2};

slotmap::new_key_type! {
    /// Stable handle to a sprite
    ///
    /// Handles are generational: once a sprite is removed (or the world is
    /// reset) its handle never resolves again, even if the slot is reused.
    pub struct SpriteId;
}

bitflags! {
    /// Per-sprite behaviour switches
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SpriteFlags: u8 {
        /// Drawn by the renderer
        const VISIBLE = 1 << 0;
        /// Takes part in collision resolution and overlap queries
        const COLLISIONS_ENABLED = 1 << 1;
        /// Update hook runs during `update_sprites`
        const UPDATES_ENABLED = 1 << 2;
        /// Fully covers its bounds when drawn
        const OPAQUE = 1 << 3;
        /// Drawn without the world draw offset
        const IGNORES_DRAW_OFFSET = 1 << 4;
    }
}

impl Default for SpriteFlags {
    fn default() -> Self {
        Self::VISIBLE | Self::COLLISIONS_ENABLED | Self::UPDATES_ENABLED
    }
}

/// Opaque caller-owned token attached to a sprite
///
/// The engine stores and returns it but never interprets it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserData(pub u64);

/// Opaque reference to a caller-owned image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageHandle(pub u32);

/// Mirroring applied when the sprite's image is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ImageFlip {
    /// Drawn as-is
    #[default]
    Unflipped,
    /// Mirrored horizontally
    FlippedX,
    /// Mirrored vertically
    FlippedY,
    /// Mirrored on both axes
    FlippedXY,
}

/// A sprite in the scene
#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    pub(crate) id: SpriteId,
    pub(crate) sequence: u64,
    pub(crate) bounds: Rect,
    pub(crate) collide_rect: Option<Rect>,
    pub(crate) center: Vec2,
    pub(crate) z_index: i16,
    pub(crate) flags: SpriteFlags,
    pub(crate) tag: u8,
    pub(crate) userdata: Option<UserData>,
    pub(crate) image: Option<ImageHandle>,
    pub(crate) image_flip: ImageFlip,
    pub(crate) clip_rect: Option<Rect>,
}

impl Sprite {
    pub(crate) fn new(id: SpriteId, sequence: u64) -> Self {
        Self {
            id,
            sequence,
            bounds: Rect::zero(),
            collide_rect: None,
            center: Vec2::zeros(),
            z_index: 0,
            flags: SpriteFlags::default(),
            tag: 0,
            userdata: None,
            image: None,
            image_flip: ImageFlip::default(),
            clip_rect: None,
        }
    }

    /// Handle of this sprite
    pub fn id(&self) -> SpriteId {
        self.id
    }

    /// Insertion sequence; breaks z-index ties
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// World-space bounds
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Anchor inside the bounds, as a fraction of the size
    pub fn center(&self) -> Vec2 {
        self.center
    }

    /// Position of the anchor point in world space
    pub fn position(&self) -> Vec2 {
        self.bounds.origin() + self.center.component_mul(&self.bounds.size())
    }

    /// Bounds the sprite would have with its anchor at `position`
    pub fn bounds_at(&self, position: Vec2) -> Rect {
        let origin = position - self.center.component_mul(&self.bounds.size());
        self.bounds.with_origin(origin)
    }

    /// Collide rect relative to the bounds origin; defaults to the full bounds
    pub fn collide_rect(&self) -> Rect {
        self.collide_rect
            .unwrap_or_else(|| Rect::new(0.0, 0.0, self.bounds.width, self.bounds.height))
    }

    /// Whether an explicit collide rect was set
    pub fn has_collide_rect(&self) -> bool {
        self.collide_rect.is_some()
    }

    /// Collide rect in world space
    pub fn world_collide_rect(&self) -> Rect {
        self.collide_rect().translated(self.bounds.origin())
    }

    /// Region this sprite occupies in the spatial index
    pub(crate) fn indexed_rect(&self) -> Rect {
        self.bounds.union(&self.world_collide_rect())
    }

    /// Whether the sprite can generate or receive contacts
    pub fn participates_in_collisions(&self) -> bool {
        self.collisions_enabled() && !self.world_collide_rect().is_empty()
    }

    /// Draw/update order key
    pub fn z_index(&self) -> i16 {
        self.z_index
    }

    /// Behaviour flags
    pub fn flags(&self) -> SpriteFlags {
        self.flags
    }

    /// Whether the sprite is drawn
    pub fn is_visible(&self) -> bool {
        self.flags.contains(SpriteFlags::VISIBLE)
    }

    /// Whether the sprite takes part in collisions
    pub fn collisions_enabled(&self) -> bool {
        self.flags.contains(SpriteFlags::COLLISIONS_ENABLED)
    }

    /// Whether the update hook runs
    pub fn updates_enabled(&self) -> bool {
        self.flags.contains(SpriteFlags::UPDATES_ENABLED)
    }

    /// Whether the sprite fully covers its bounds
    pub fn is_opaque(&self) -> bool {
        self.flags.contains(SpriteFlags::OPAQUE)
    }

    /// Whether the world draw offset is skipped for this sprite
    pub fn ignores_draw_offset(&self) -> bool {
        self.flags.contains(SpriteFlags::IGNORES_DRAW_OFFSET)
    }

    /// Caller tag
    pub fn tag(&self) -> u8 {
        self.tag
    }

    /// Caller token
    pub fn userdata(&self) -> Option<UserData> {
        self.userdata
    }

    /// Image drawn for this sprite
    pub fn image(&self) -> Option<ImageHandle> {
        self.image
    }

    /// Image mirroring
    pub fn image_flip(&self) -> ImageFlip {
        self.image_flip
    }

    /// Screen-space clip rect applied when drawing
    pub fn clip_rect(&self) -> Option<Rect> {
        self.clip_rect
    }
}
