//! Sprite storage with stable handles and z-ordering

use std::cell::RefCell;
use std::cmp::Ordering;

use slotmap::SlotMap;

use super::types::{Sprite, SpriteId};
use crate::error::{SpriteError, SpriteResult};

/// Owns every live sprite
///
/// Iteration order is ascending z-index, ties broken by insertion order.
/// The sorted order is cached and rebuilt lazily after inserts, removals and
/// z-index changes.
#[derive(Debug, Default)]
pub struct SpriteStore {
    sprites: SlotMap<SpriteId, Sprite>,
    next_sequence: u64,
    order: RefCell<Option<Vec<SpriteId>>>,
}

impl SpriteStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fresh sprite with zero bounds
    pub fn insert(&mut self) -> SpriteId {
        let sequence = self.take_sequence();
        self.invalidate_order();
        self.sprites.insert_with_key(|id| Sprite::new(id, sequence))
    }

    /// Insert a copy of `source` under a new handle
    pub fn insert_copy(&mut self, source: &Sprite) -> SpriteId {
        let sequence = self.take_sequence();
        self.invalidate_order();
        self.sprites.insert_with_key(|id| Sprite {
            id,
            sequence,
            ..source.clone()
        })
    }

    /// Look up a sprite
    pub fn get(&self, id: SpriteId) -> SpriteResult<&Sprite> {
        self.sprites.get(id).ok_or(SpriteError::InvalidHandle(id))
    }

    /// Look up a sprite for mutation; z-index changes must go through [`Self::set_z_index`]
    pub(crate) fn get_mut(&mut self, id: SpriteId) -> SpriteResult<&mut Sprite> {
        self.sprites.get_mut(id).ok_or(SpriteError::InvalidHandle(id))
    }

    /// Change a sprite's z-index
    pub fn set_z_index(&mut self, id: SpriteId, z_index: i16) -> SpriteResult<()> {
        let sprite = self.get_mut(id)?;
        if sprite.z_index != z_index {
            sprite.z_index = z_index;
            self.invalidate_order();
        }
        Ok(())
    }

    /// Remove a sprite, returning its final state
    pub fn remove(&mut self, id: SpriteId) -> SpriteResult<Sprite> {
        let sprite = self.sprites.remove(id).ok_or(SpriteError::InvalidHandle(id))?;
        self.invalidate_order();
        Ok(sprite)
    }

    /// Remove every sprite; all outstanding handles become invalid
    pub fn clear(&mut self) {
        self.sprites.clear();
        self.invalidate_order();
    }

    /// Whether the handle names a live sprite
    pub fn contains(&self, id: SpriteId) -> bool {
        self.sprites.contains_key(id)
    }

    /// Number of live sprites
    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }

    /// Handles in iteration order (ascending z, then insertion)
    pub fn ordered_ids(&self) -> Vec<SpriteId> {
        let mut cache = self.order.borrow_mut();
        cache
            .get_or_insert_with(|| {
                let mut ids: Vec<SpriteId> = self.sprites.keys().collect();
                ids.sort_by(|a, b| Self::compare(&self.sprites[*a], &self.sprites[*b]));
                ids
            })
            .clone()
    }

    /// Sprites in iteration order
    pub fn iter_ordered(&self) -> impl Iterator<Item = &Sprite> + '_ {
        self.ordered_ids().into_iter().map(move |id| &self.sprites[id])
    }

    /// Sort `ids` into iteration order, dropping handles that are no longer live
    pub fn sort_by_order(&self, ids: &mut Vec<SpriteId>) {
        ids.retain(|id| self.sprites.contains_key(*id));
        ids.sort_by(|a, b| Self::compare(&self.sprites[*a], &self.sprites[*b]));
    }

    /// Iteration order of two sprites
    pub fn compare(a: &Sprite, b: &Sprite) -> Ordering {
        a.z_index.cmp(&b.z_index).then(a.sequence.cmp(&b.sequence))
    }

    fn take_sequence(&mut self) -> u64 {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        sequence
    }

    fn invalidate_order(&self) {
        self.order.borrow_mut().take();
    }
}
