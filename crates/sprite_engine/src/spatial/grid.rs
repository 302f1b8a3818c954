//! Uniform grid spatial index
//!
//! Divides the plane into square cells of a configurable size. Each sprite is
//! listed in every cell its indexed rect touches, so moving a sprite only
//! rewrites the cells it left and entered.

use std::collections::HashMap;

use super::SpatialIndex;
use crate::foundation::math::Rect;
use crate::sprite::SpriteId;

/// Inclusive range of cell coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CellRange {
    min_x: i32,
    min_y: i32,
    max_x: i32,
    max_y: i32,
}

impl CellRange {
    /// Cells covered; saturates for ranges spanning most of the `i32` plane
    fn cell_count(&self) -> u64 {
        let columns = (i64::from(self.max_x) - i64::from(self.min_x) + 1).unsigned_abs();
        let rows = (i64::from(self.max_y) - i64::from(self.min_y) + 1).unsigned_abs();
        columns.saturating_mul(rows)
    }

    fn contains(&self, cell: (i32, i32)) -> bool {
        cell.0 >= self.min_x && cell.0 <= self.max_x && cell.1 >= self.min_y && cell.1 <= self.max_y
    }

    fn cells(self) -> impl Iterator<Item = (i32, i32)> {
        (self.min_y..=self.max_y).flat_map(move |y| (self.min_x..=self.max_x).map(move |x| (x, y)))
    }
}

/// Entry stored per sprite
#[derive(Debug, Clone, Copy)]
struct GridEntry {
    rect: Rect,
    /// `None` for zero-area rects, which are recorded but never bucketed
    cells: Option<CellRange>,
}

/// Uniform grid keyed by cell coordinates
#[derive(Debug, Clone)]
pub struct UniformGrid {
    cell_size: f32,
    cells: HashMap<(i32, i32), Vec<SpriteId>>,
    entries: HashMap<SpriteId, GridEntry>,
}

impl UniformGrid {
    /// Create an empty grid; `cell_size` must be positive
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            cells: HashMap::new(),
            entries: HashMap::new(),
        }
    }

    /// Edge length of a cell
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Number of occupied cells
    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }

    fn cell_range(&self, rect: &Rect) -> CellRange {
        let to_cell = |v: f32| (v / self.cell_size).floor() as i32;
        CellRange {
            min_x: to_cell(rect.x),
            min_y: to_cell(rect.y),
            max_x: to_cell(rect.right()),
            max_y: to_cell(rect.bottom()),
        }
    }

    fn bucket_range(&self, rect: &Rect) -> Option<CellRange> {
        if rect.is_empty() {
            None
        } else {
            Some(self.cell_range(rect))
        }
    }

    fn add_to_cells(&mut self, id: SpriteId, range: CellRange) {
        for cell in range.cells() {
            self.cells.entry(cell).or_default().push(id);
        }
    }

    fn remove_from_cells(&mut self, id: SpriteId, range: CellRange) {
        for cell in range.cells() {
            if let Some(bucket) = self.cells.get_mut(&cell) {
                bucket.retain(|other| *other != id);
                if bucket.is_empty() {
                    self.cells.remove(&cell);
                }
            }
        }
    }
}

impl SpatialIndex for UniformGrid {
    fn insert(&mut self, id: SpriteId, rect: Rect) {
        if self.entries.contains_key(&id) {
            self.remove(id);
        }
        let cells = self.bucket_range(&rect);
        if let Some(range) = cells {
            self.add_to_cells(id, range);
        }
        self.entries.insert(id, GridEntry { rect, cells });
    }

    fn update(&mut self, id: SpriteId, old: Rect, new: Rect) {
        let Some(entry) = self.entries.get(&id).copied() else {
            self.insert(id, new);
            return;
        };
        if entry.rect != old {
            log::trace!("Grid update for {id:?}: caller old rect {old:?} differs from indexed {:?}", entry.rect);
        }

        let new_cells = self.bucket_range(&new);
        if new_cells != entry.cells {
            if let Some(range) = entry.cells {
                self.remove_from_cells(id, range);
            }
            if let Some(range) = new_cells {
                self.add_to_cells(id, range);
            }
        }
        self.entries.insert(id, GridEntry { rect: new, cells: new_cells });
    }

    fn remove(&mut self, id: SpriteId) -> bool {
        match self.entries.remove(&id) {
            Some(entry) => {
                if let Some(range) = entry.cells {
                    self.remove_from_cells(id, range);
                }
                true
            }
            None => false,
        }
    }

    fn candidates_for_region(&self, region: Rect) -> Vec<SpriteId> {
        let range = self.cell_range(&region);
        let mut found: Vec<SpriteId> = Vec::new();

        // Huge regions: walking occupied cells beats walking the range
        if range.cell_count() > self.cells.len() as u64 {
            for (cell, bucket) in &self.cells {
                if range.contains(*cell) {
                    found.extend_from_slice(bucket);
                }
            }
        } else {
            for cell in range.cells() {
                if let Some(bucket) = self.cells.get(&cell) {
                    found.extend_from_slice(bucket);
                }
            }
        }

        found.sort_unstable();
        found.dedup();
        found.retain(|id| {
            self.entries
                .get(id)
                .is_some_and(|entry| entry.rect.intersects_closed(&region))
        });
        found
    }

    fn indexed_rect(&self, id: SpriteId) -> Option<Rect> {
        self.entries.get(&id).map(|entry| entry.rect)
    }

    fn clear(&mut self) {
        self.cells.clear();
        self.entries.clear();
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
