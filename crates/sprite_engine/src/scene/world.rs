//! Sprite World - the scene context
//!
//! `SpriteWorld` owns the sprite store, the spatial index, the dirty-rect
//! tracker and every registered hook. All mutation goes through it so the
//! derived state never lags behind the store:
//!
//! 1. The sprite record is updated
//! 2. The spatial index entry is updated if the indexed rect changed
//! 3. Old and new display bounds are marked dirty if the sprite is visible
//!
//! Every operation taking a [`SpriteId`] fails with
//! [`SpriteError::InvalidHandle`] when the sprite is gone.

use std::path::Path;

use slotmap::SecondaryMap;

use super::update::{SpriteUpdate, UpdateFn};
use crate::config::{Config, WorldConfig};
use crate::error::{SpriteError, SpriteResult};
use crate::foundation::math::{Rect, Vec2};
use crate::physics::{CollisionWorld, MoveOutcome, ResponseFn, ResponsePolicy};
use crate::query::{OverlapPair, QueryEngine, SegmentHit};
use crate::render::{DirtyRectTracker, DrawFn, SpriteRenderer};
use crate::spatial::{SpatialIndex, UniformGrid};
use crate::sprite::{ImageFlip, ImageHandle, Sprite, SpriteFlags, SpriteId, SpriteStore, UserData};

/// Display-space bounds of a sprite
fn display_rect(sprite: &Sprite, draw_offset: Vec2) -> Rect {
    if sprite.ignores_draw_offset() {
        sprite.bounds()
    } else {
        sprite.bounds().translated(draw_offset)
    }
}

/// Part of a sprite that may be painted: display bounds limited by the clip rect
fn paintable_rect(sprite: &Sprite, draw_offset: Vec2) -> Rect {
    let bounds = display_rect(sprite, draw_offset);
    match sprite.clip_rect() {
        Some(clip) => bounds.intersection(&clip),
        None => bounds,
    }
}

/// The scene: sprites, collision bookkeeping and redraw tracking
pub struct SpriteWorld {
    config: WorldConfig,
    store: SpriteStore,
    index: UniformGrid,
    dirty: DirtyRectTracker,
    responses: ResponsePolicy,
    updates: SecondaryMap<SpriteId, UpdateFn>,
    draws: SecondaryMap<SpriteId, DrawFn>,
    draw_offset: Vec2,
}

impl SpriteWorld {
    /// Create an empty world with the default configuration
    pub fn new() -> Self {
        Self::build(WorldConfig::default())
    }

    /// Create an empty world with a custom configuration
    pub fn with_config(config: WorldConfig) -> SpriteResult<Self> {
        config.validate().map_err(SpriteError::InvalidConfig)?;
        Ok(Self::build(config))
    }

    /// Create an empty world from a `.toml` or `.ron` configuration file
    pub fn from_config_file(path: impl AsRef<Path>) -> SpriteResult<Self> {
        Self::with_config(WorldConfig::load_from_file(path)?)
    }

    fn build(config: WorldConfig) -> Self {
        log::debug!(
            "Creating sprite world: cell size {}, {} resolution passes",
            config.cell_size,
            config.max_resolution_passes
        );
        let mut dirty = DirtyRectTracker::new(config.dirty_rect_capacity, config.display_bounds);
        dirty.set_always_redraw(config.always_redraw);

        Self {
            index: UniformGrid::new(config.cell_size),
            dirty,
            config,
            store: SpriteStore::new(),
            responses: ResponsePolicy::new(),
            updates: SecondaryMap::new(),
            draws: SecondaryMap::new(),
            draw_offset: Vec2::zeros(),
        }
    }

    /// Active configuration
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    // ---------------------------------------------------------------------
    // Lifecycle
    // ---------------------------------------------------------------------

    /// Create a sprite with zero bounds and default flags
    pub fn create_sprite(&mut self) -> SpriteId {
        let id = self.store.insert();
        if let Ok(sprite) = self.store.get(id) {
            self.index.insert(id, sprite.indexed_rect());
        }
        log::trace!("Created sprite {id:?}");
        id
    }

    /// Duplicate a sprite, including its hooks, under a new handle
    pub fn copy_sprite(&mut self, id: SpriteId) -> SpriteResult<SpriteId> {
        let source = self.checked(id)?.clone();
        let copy = self.store.insert_copy(&source);
        self.index.insert(copy, source.indexed_rect());

        if let Some(hook) = self.updates.get(id).cloned() {
            self.updates.insert(copy, hook);
        }
        if let Some(hook) = self.draws.get(id).cloned() {
            self.draws.insert(copy, hook);
        }
        self.responses.copy_sprite_response(id, copy);

        if source.is_visible() {
            self.dirty.add(display_rect(&source, self.draw_offset));
        }
        Ok(copy)
    }

    /// Remove a sprite; its handle becomes invalid
    pub fn remove_sprite(&mut self, id: SpriteId) -> SpriteResult<()> {
        let sprite = self.store.remove(id).map_err(|err| Self::invalid_handle(id, err))?;
        self.index.remove(id);
        self.updates.remove(id);
        self.draws.remove(id);
        self.responses.forget(id);
        if sprite.is_visible() {
            self.dirty.add(display_rect(&sprite, self.draw_offset));
        }
        Ok(())
    }

    /// Remove several sprites; nothing is removed unless every handle is valid
    pub fn remove_sprites(&mut self, ids: &[SpriteId]) -> SpriteResult<()> {
        for id in ids {
            self.checked(*id)?;
        }
        for id in ids {
            // Duplicate handles in `ids` are already gone on the second visit
            if self.store.contains(*id) {
                self.remove_sprite(*id)?;
            }
        }
        Ok(())
    }

    /// Remove every sprite, hook and index entry; all handles become invalid
    ///
    /// The areas of the removed visible sprites are marked for redraw. The
    /// world default collision response and the draw offset survive.
    pub fn reset_world(&mut self) {
        log::debug!("Resetting sprite world ({} sprites)", self.store.len());
        let offset = self.draw_offset;
        let vacated: Vec<Rect> = self
            .store
            .iter_ordered()
            .filter(|sprite| sprite.is_visible())
            .map(|sprite| display_rect(sprite, offset))
            .collect();
        for rect in vacated {
            self.dirty.add(rect);
        }

        self.store.clear();
        self.index.clear();
        self.updates.clear();
        self.draws.clear();
        self.responses.clear_sprites();
    }

    /// Rebuild the spatial index from the sprite store
    pub fn reset_collision_world(&mut self) {
        self.index = UniformGrid::new(self.config.cell_size);
        for sprite in self.store.iter_ordered() {
            self.index.insert(sprite.id(), sprite.indexed_rect());
        }
        log::debug!("Rebuilt collision index: {} sprites", self.index.len());
    }

    /// Number of live sprites
    pub fn sprite_count(&self) -> usize {
        self.store.len()
    }

    /// Whether the handle names a live sprite
    pub fn contains(&self, id: SpriteId) -> bool {
        self.store.contains(id)
    }

    /// Snapshot of a sprite
    pub fn sprite(&self, id: SpriteId) -> SpriteResult<&Sprite> {
        self.checked(id)
    }

    /// All sprites in iteration order (ascending z, then insertion)
    pub fn sprites(&self) -> impl Iterator<Item = &Sprite> + '_ {
        self.store.iter_ordered()
    }

    // ---------------------------------------------------------------------
    // Geometry
    // ---------------------------------------------------------------------

    /// World-space bounds
    pub fn bounds(&self, id: SpriteId) -> SpriteResult<Rect> {
        Ok(self.checked(id)?.bounds())
    }

    /// Set the bounds; negative or non-finite sizes are clamped to zero
    pub fn set_bounds(&mut self, id: SpriteId, bounds: Rect) -> SpriteResult<()> {
        let bounds = Self::clamp_geometry(id, bounds);
        self.edit_geometry(id, |sprite| sprite.bounds = bounds)
    }

    /// Sprite position (bounds origin plus center times size)
    pub fn position(&self, id: SpriteId) -> SpriteResult<Vec2> {
        Ok(self.checked(id)?.position())
    }

    /// Place the sprite's position at `position`, ignoring collisions
    pub fn move_to(&mut self, id: SpriteId, position: Vec2) -> SpriteResult<()> {
        self.edit_geometry(id, |sprite| sprite.bounds = sprite.bounds_at(position))
    }

    /// Move the sprite by `delta`, ignoring collisions
    pub fn move_by(&mut self, id: SpriteId, delta: Vec2) -> SpriteResult<()> {
        self.edit_geometry(id, |sprite| sprite.bounds = sprite.bounds.translated(delta))
    }

    /// Resize the sprite, keeping its position
    pub fn set_size(&mut self, id: SpriteId, width: f32, height: f32) -> SpriteResult<()> {
        let size = Self::clamp_geometry(id, Rect::new(0.0, 0.0, width, height)).size();
        self.edit_geometry(id, |sprite| {
            let position = sprite.position();
            let origin = position - sprite.center.component_mul(&size);
            sprite.bounds = Rect::from_origin_size(origin, size);
        })
    }

    /// Anchor point as a fraction of the size
    pub fn center(&self, id: SpriteId) -> SpriteResult<Vec2> {
        Ok(self.checked(id)?.center())
    }

    /// Move the anchor point, keeping the sprite's position
    pub fn set_center(&mut self, id: SpriteId, center: Vec2) -> SpriteResult<()> {
        self.edit_geometry(id, |sprite| {
            let position = sprite.position();
            sprite.center = center;
            sprite.bounds = sprite.bounds_at(position);
        })
    }

    /// Collide rect relative to the bounds origin
    pub fn collide_rect(&self, id: SpriteId) -> SpriteResult<Rect> {
        Ok(self.checked(id)?.collide_rect())
    }

    /// Set the collide rect relative to the bounds origin; negative sizes are clamped to zero
    pub fn set_collide_rect(&mut self, id: SpriteId, rect: Rect) -> SpriteResult<()> {
        let rect = Self::clamp_geometry(id, rect);
        self.edit_geometry(id, |sprite| sprite.collide_rect = Some(rect))
    }

    /// Go back to colliding with the full bounds
    pub fn clear_collide_rect(&mut self, id: SpriteId) -> SpriteResult<()> {
        self.edit_geometry(id, |sprite| sprite.collide_rect = None)
    }

    /// Collide rect in world space
    pub fn world_collide_rect(&self, id: SpriteId) -> SpriteResult<Rect> {
        Ok(self.checked(id)?.world_collide_rect())
    }

    // ---------------------------------------------------------------------
    // Properties
    // ---------------------------------------------------------------------

    /// Draw order key
    pub fn z_index(&self, id: SpriteId) -> SpriteResult<i16> {
        Ok(self.checked(id)?.z_index())
    }

    /// Change the draw order key; takes effect for the next iteration
    pub fn set_z_index(&mut self, id: SpriteId, z_index: i16) -> SpriteResult<()> {
        self.store
            .set_z_index(id, z_index)
            .map_err(|err| Self::invalid_handle(id, err))?;
        self.dirty_sprite(id)
    }

    /// Whether the sprite is drawn
    pub fn is_visible(&self, id: SpriteId) -> SpriteResult<bool> {
        Ok(self.checked(id)?.is_visible())
    }

    /// Show or hide the sprite
    pub fn set_visible(&mut self, id: SpriteId, visible: bool) -> SpriteResult<()> {
        if self.set_flag(id, SpriteFlags::VISIBLE, visible)? {
            let sprite = self.store.get(id)?;
            self.dirty.add(display_rect(sprite, self.draw_offset));
        }
        Ok(())
    }

    /// Whether the sprite takes part in collisions
    pub fn collisions_enabled(&self, id: SpriteId) -> SpriteResult<bool> {
        Ok(self.checked(id)?.collisions_enabled())
    }

    /// Enable or disable collisions; the sprite stays indexed either way
    pub fn set_collisions_enabled(&mut self, id: SpriteId, enabled: bool) -> SpriteResult<()> {
        self.set_flag(id, SpriteFlags::COLLISIONS_ENABLED, enabled).map(|_| ())
    }

    /// Whether the update hook runs
    pub fn updates_enabled(&self, id: SpriteId) -> SpriteResult<bool> {
        Ok(self.checked(id)?.updates_enabled())
    }

    /// Enable or disable the update hook
    pub fn set_updates_enabled(&mut self, id: SpriteId, enabled: bool) -> SpriteResult<()> {
        self.set_flag(id, SpriteFlags::UPDATES_ENABLED, enabled).map(|_| ())
    }

    /// Whether the sprite fully covers its bounds
    pub fn is_opaque(&self, id: SpriteId) -> SpriteResult<bool> {
        Ok(self.checked(id)?.is_opaque())
    }

    /// Mark the sprite as fully covering its bounds; covered sprites beneath it are not drawn
    pub fn set_opaque(&mut self, id: SpriteId, opaque: bool) -> SpriteResult<()> {
        if self.set_flag(id, SpriteFlags::OPAQUE, opaque)? {
            self.dirty_sprite(id)?;
        }
        Ok(())
    }

    /// Whether the sprite is drawn without the world draw offset
    pub fn ignores_draw_offset(&self, id: SpriteId) -> SpriteResult<bool> {
        Ok(self.checked(id)?.ignores_draw_offset())
    }

    /// Draw the sprite in display space, unaffected by the draw offset
    pub fn set_ignores_draw_offset(&mut self, id: SpriteId, ignores: bool) -> SpriteResult<()> {
        self.edit_geometry(id, |sprite| sprite.flags.set(SpriteFlags::IGNORES_DRAW_OFFSET, ignores))
    }

    /// Caller-defined tag
    pub fn tag(&self, id: SpriteId) -> SpriteResult<u8> {
        Ok(self.checked(id)?.tag())
    }

    /// Set the caller-defined tag
    pub fn set_tag(&mut self, id: SpriteId, tag: u8) -> SpriteResult<()> {
        self.checked_mut(id)?.tag = tag;
        Ok(())
    }

    /// Caller-owned token
    pub fn userdata(&self, id: SpriteId) -> SpriteResult<Option<UserData>> {
        Ok(self.checked(id)?.userdata())
    }

    /// Attach or clear the caller-owned token
    pub fn set_userdata(&mut self, id: SpriteId, userdata: Option<UserData>) -> SpriteResult<()> {
        self.checked_mut(id)?.userdata = userdata;
        Ok(())
    }

    /// Image drawn for the sprite
    pub fn image(&self, id: SpriteId) -> SpriteResult<Option<ImageHandle>> {
        Ok(self.checked(id)?.image())
    }

    /// Image mirroring
    pub fn image_flip(&self, id: SpriteId) -> SpriteResult<ImageFlip> {
        Ok(self.checked(id)?.image_flip())
    }

    /// Attach an image of the given size; the sprite is resized to it, keeping its position
    pub fn set_image(&mut self, id: SpriteId, image: ImageHandle, size: Vec2, flip: ImageFlip) -> SpriteResult<()> {
        self.dirty_sprite(id)?;
        self.set_size(id, size.x, size.y)?;
        let sprite = self.checked_mut(id)?;
        sprite.image = Some(image);
        sprite.image_flip = flip;
        self.dirty_sprite(id)
    }

    /// Detach the image; the bounds are kept
    pub fn clear_image(&mut self, id: SpriteId) -> SpriteResult<()> {
        self.checked_mut(id)?.image = None;
        self.dirty_sprite(id)
    }

    /// Change the image mirroring
    pub fn set_image_flip(&mut self, id: SpriteId, flip: ImageFlip) -> SpriteResult<()> {
        self.checked_mut(id)?.image_flip = flip;
        self.dirty_sprite(id)
    }

    /// Display-space clip rect
    pub fn clip_rect(&self, id: SpriteId) -> SpriteResult<Option<Rect>> {
        Ok(self.checked(id)?.clip_rect())
    }

    /// Limit drawing of the sprite to `clip`
    pub fn set_clip_rect(&mut self, id: SpriteId, clip: Rect) -> SpriteResult<()> {
        self.checked_mut(id)?.clip_rect = Some(clip.clamped());
        self.dirty_sprite(id)
    }

    /// Remove the sprite's clip rect
    pub fn clear_clip_rect(&mut self, id: SpriteId) -> SpriteResult<()> {
        self.checked_mut(id)?.clip_rect = None;
        self.dirty_sprite(id)
    }

    /// Set `clip` on every sprite with `start_z <= z <= end_z`
    pub fn set_clip_rects_in_range(&mut self, clip: Rect, start_z: i16, end_z: i16) -> SpriteResult<()> {
        for id in self.ids_in_z_range(start_z, end_z) {
            self.set_clip_rect(id, clip)?;
        }
        Ok(())
    }

    /// Clear the clip rect of every sprite with `start_z <= z <= end_z`
    pub fn clear_clip_rects_in_range(&mut self, start_z: i16, end_z: i16) -> SpriteResult<()> {
        for id in self.ids_in_z_range(start_z, end_z) {
            self.clear_clip_rect(id)?;
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Hooks
    // ---------------------------------------------------------------------

    /// Set or clear the sprite's update hook
    pub fn set_update_fn(&mut self, id: SpriteId, hook: Option<UpdateFn>) -> SpriteResult<()> {
        self.checked(id)?;
        match hook {
            Some(hook) => {
                self.updates.insert(id, hook);
            }
            None => {
                self.updates.remove(id);
            }
        }
        Ok(())
    }

    /// Set or clear the sprite's draw hook; a hooked sprite bypasses the renderer
    pub fn set_draw_fn(&mut self, id: SpriteId, hook: Option<DrawFn>) -> SpriteResult<()> {
        self.checked(id)?;
        match hook {
            Some(hook) => {
                self.draws.insert(id, hook);
            }
            None => {
                self.draws.remove(id);
            }
        }
        self.dirty_sprite(id)
    }

    /// Whether the sprite has its own collision response function
    pub fn has_collision_response_fn(&self, id: SpriteId) -> SpriteResult<bool> {
        self.checked(id)?;
        Ok(self.responses.has_sprite_response(id))
    }

    /// Set or clear the response function used when this sprite moves
    pub fn set_collision_response_fn(&mut self, id: SpriteId, response: Option<ResponseFn>) -> SpriteResult<()> {
        self.checked(id)?;
        self.responses.set_for_sprite(id, response);
        Ok(())
    }

    /// Set or clear the response function used by sprites without their own
    pub fn set_default_collision_response(&mut self, response: Option<ResponseFn>) {
        self.responses.set_default(response);
    }

    // ---------------------------------------------------------------------
    // Collisions
    // ---------------------------------------------------------------------

    /// Preview moving `id` to `goal`; nothing is changed
    pub fn check_collisions(&self, id: SpriteId, goal: Vec2) -> SpriteResult<MoveOutcome> {
        self.checked(id)?;
        CollisionWorld::new(&self.store, &self.index, &self.responses, self.config.max_resolution_passes)
            .resolve(id, goal)
    }

    /// Move `id` towards `goal`, stopping or deflecting at contacts
    pub fn move_with_collisions(&mut self, id: SpriteId, goal: Vec2) -> SpriteResult<MoveOutcome> {
        let outcome = self.check_collisions(id, goal)?;
        self.move_to(id, outcome.actual)?;
        Ok(outcome)
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    fn query(&self) -> QueryEngine<'_> {
        QueryEngine::new(&self.store, &self.index)
    }

    /// Sprites whose bounds contain `point`
    pub fn sprites_at_point(&self, point: Vec2) -> Vec<SpriteId> {
        self.query().sprites_at_point(point)
    }

    /// Sprites whose bounds overlap `rect`
    pub fn sprites_in_rect(&self, rect: Rect) -> Vec<SpriteId> {
        self.query().sprites_in_rect(rect)
    }

    /// Sprites crossed by the segment `start -> end`
    pub fn sprites_along_line(&self, start: Vec2, end: Vec2) -> Vec<SpriteId> {
        self.query().sprites_along_line(start, end)
    }

    /// Entry and exit detail for sprites crossed by `start -> end`
    pub fn sprite_info_along_line(&self, start: Vec2, end: Vec2) -> Vec<SegmentHit> {
        self.query().sprite_info_along_line(start, end)
    }

    /// Sprites whose collide rects overlap `id`'s
    pub fn overlapping_sprites(&self, id: SpriteId) -> SpriteResult<Vec<SpriteId>> {
        self.checked(id)?;
        self.query().overlapping_sprites(id)
    }

    /// Every overlapping pair of collision participants
    pub fn all_overlapping_pairs(&self) -> Vec<OverlapPair> {
        self.query().all_overlapping_pairs()
    }

    // ---------------------------------------------------------------------
    // Redraw tracking
    // ---------------------------------------------------------------------

    /// Offset applied to every sprite that doesn't ignore it
    pub fn draw_offset(&self) -> Vec2 {
        self.draw_offset
    }

    /// Change the draw offset; the whole display is redrawn
    pub fn set_draw_offset(&mut self, offset: Vec2) {
        if offset != self.draw_offset {
            self.draw_offset = offset;
            self.dirty.invalidate_all();
        }
    }

    /// Display area dirty rects are clipped to
    pub fn display_bounds(&self) -> Rect {
        self.dirty.display_bounds()
    }

    /// Resize the display; the whole new display is redrawn
    pub fn set_display_bounds(&mut self, bounds: Rect) -> SpriteResult<()> {
        if bounds.is_empty() {
            return Err(SpriteError::InvalidConfig(format!("display bounds {bounds:?} are empty")));
        }
        self.config.display_bounds = bounds;
        self.dirty.set_display_bounds(bounds);
        Ok(())
    }

    /// Whether every draw repaints the whole display
    pub fn always_redraw(&self) -> bool {
        self.dirty.always_redraw()
    }

    /// Repaint the whole display on every draw
    pub fn set_always_redraw(&mut self, enabled: bool) {
        self.config.always_redraw = enabled;
        self.dirty.set_always_redraw(enabled);
    }

    /// Mark a display region for redraw
    pub fn add_dirty_rect(&mut self, rect: Rect) {
        self.dirty.add(rect);
    }

    /// Mark a sprite's display bounds for redraw
    pub fn mark_dirty(&mut self, id: SpriteId) -> SpriteResult<()> {
        let sprite = self.checked(id)?;
        let rect = display_rect(sprite, self.draw_offset);
        self.dirty.add(rect);
        Ok(())
    }

    /// Regions waiting to be redrawn
    pub fn dirty_rects(&self) -> &[Rect] {
        self.dirty.rects()
    }

    /// Take the regions waiting to be redrawn
    pub fn drain_dirty_rects(&mut self) -> Vec<Rect> {
        self.dirty.drain()
    }

    // ---------------------------------------------------------------------
    // Frame driver
    // ---------------------------------------------------------------------

    /// Run each updates-enabled sprite's hook in z order and apply its answer
    ///
    /// Returns the outcome of every collision move requested this pass.
    pub fn update_sprites(&mut self) -> SpriteResult<Vec<(SpriteId, MoveOutcome)>> {
        let mut outcomes = Vec::new();
        for id in self.store.ordered_ids() {
            let Some(hook) = self.updates.get(id).cloned() else {
                continue;
            };
            let sprite = self.store.get(id)?;
            if !sprite.updates_enabled() {
                continue;
            }

            match hook(sprite) {
                SpriteUpdate::Stay => {}
                SpriteUpdate::MoveTo(position) => self.move_to(id, position)?,
                SpriteUpdate::MoveWithCollisions(goal) => {
                    let outcome = self.move_with_collisions(id, goal)?;
                    outcomes.push((id, outcome));
                }
            }
        }
        Ok(outcomes)
    }

    /// Redraw every dirty region; returns the number of draw calls made
    ///
    /// Visible sprites are drawn in z order, once per dirty region they
    /// intersect, by their draw hook if they have one and by `renderer`
    /// otherwise. A region part hidden under a higher opaque sprite is skipped.
    pub fn draw_sprites<R: SpriteRenderer + ?Sized>(&mut self, renderer: &mut R) -> usize {
        let regions = self.dirty.drain();
        if regions.is_empty() {
            return 0;
        }

        let offset = self.draw_offset;
        let drawable: Vec<(&Sprite, Rect)> = self
            .store
            .iter_ordered()
            .filter(|sprite| sprite.is_visible())
            .map(|sprite| (sprite, paintable_rect(sprite, offset)))
            .filter(|(_, area)| !area.is_empty())
            .collect();

        let mut calls = 0;
        for (layer, (sprite, area)) in drawable.iter().enumerate() {
            for region in &regions {
                let draw_rect = area.intersection(region);
                if draw_rect.is_empty() {
                    continue;
                }
                let covered = drawable[layer + 1..]
                    .iter()
                    .any(|(above, cover)| above.is_opaque() && cover.contains_rect(&draw_rect));
                if covered {
                    continue;
                }
                let bounds = display_rect(sprite, offset);
                match self.draws.get(sprite.id()) {
                    Some(hook) => hook(sprite, bounds, draw_rect),
                    None => renderer.draw_sprite(sprite, bounds, draw_rect),
                }
                calls += 1;
            }
        }
        log::trace!("Drew {calls} sprite regions for {} dirty rects", regions.len());
        calls
    }

    /// Run [`Self::update_sprites`] followed by [`Self::draw_sprites`]
    pub fn update_and_draw_sprites<R: SpriteRenderer + ?Sized>(
        &mut self,
        renderer: &mut R,
    ) -> SpriteResult<Vec<(SpriteId, MoveOutcome)>> {
        let outcomes = self.update_sprites()?;
        self.draw_sprites(renderer);
        Ok(outcomes)
    }

    // ---------------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------------

    fn invalid_handle(id: SpriteId, err: SpriteError) -> SpriteError {
        log::warn!("Operation on invalid sprite handle {id:?}");
        err
    }

    /// Look up a live sprite, logging handle misuse
    fn checked(&self, id: SpriteId) -> SpriteResult<&Sprite> {
        self.store.get(id).map_err(|err| Self::invalid_handle(id, err))
    }

    fn checked_mut(&mut self, id: SpriteId) -> SpriteResult<&mut Sprite> {
        self.store.get_mut(id).map_err(|err| Self::invalid_handle(id, err))
    }

    fn clamp_geometry(id: SpriteId, rect: Rect) -> Rect {
        let clamped = rect.clamped();
        if clamped != rect {
            log::trace!("Clamped degenerate rect {rect:?} for {id:?}");
        }
        clamped
    }

    /// Apply a geometry change, then sync the index and the dirty regions
    fn edit_geometry<F>(&mut self, id: SpriteId, edit: F) -> SpriteResult<()>
    where
        F: FnOnce(&mut Sprite),
    {
        let offset = self.draw_offset;
        let sprite = self.checked_mut(id)?;

        let old_indexed = sprite.indexed_rect();
        let old_display = display_rect(sprite, offset);
        edit(&mut *sprite);
        let new_indexed = sprite.indexed_rect();
        let new_display = display_rect(sprite, offset);
        let visible = sprite.is_visible();

        if new_indexed != old_indexed {
            self.index.update(id, old_indexed, new_indexed);
        }
        if visible && new_display != old_display {
            self.dirty.add(old_display);
            self.dirty.add(new_display);
        }
        Ok(())
    }

    /// Flip a flag, returning whether it changed
    fn set_flag(&mut self, id: SpriteId, flag: SpriteFlags, enabled: bool) -> SpriteResult<bool> {
        let sprite = self.checked_mut(id)?;
        let changed = sprite.flags.contains(flag) != enabled;
        sprite.flags.set(flag, enabled);
        Ok(changed)
    }

    /// Mark a visible sprite's display bounds dirty
    fn dirty_sprite(&mut self, id: SpriteId) -> SpriteResult<()> {
        let sprite = self.checked(id)?;
        if sprite.is_visible() {
            let rect = display_rect(sprite, self.draw_offset);
            self.dirty.add(rect);
        }
        Ok(())
    }

    fn ids_in_z_range(&self, start_z: i16, end_z: i16) -> Vec<SpriteId> {
        self.store
            .iter_ordered()
            .filter(|sprite| (start_z..=end_z).contains(&sprite.z_index()))
            .map(Sprite::id)
            .collect()
    }
}

impl Default for SpriteWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SpriteWorld {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpriteWorld")
            .field("sprites", &self.store.len())
            .field("indexed", &self.index.len())
            .field("update_hooks", &self.updates.len())
            .field("draw_hooks", &self.draws.len())
            .field("responses", &self.responses)
            .field("dirty_rects", &self.dirty.rects().len())
            .field("draw_offset", &self.draw_offset)
            .finish()
    }
}
