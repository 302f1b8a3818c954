//! # World Configuration
//!
//! Tuning for the broad phase, the dirty-rect tracker and collision
//! resolution. Every field has a default, so partial config files are fine.

use serde::{Deserialize, Serialize};

use super::Config;
use crate::foundation::math::Rect;

/// Configuration of a [`SpriteWorld`](crate::scene::SpriteWorld)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Edge length of a spatial grid cell in world units
    pub cell_size: f32,
    /// Dirty rects kept before collapsing into a single bounding rect
    pub dirty_rect_capacity: usize,
    /// Resolution passes per move: the initial sweep plus Slide/Bounce retries
    pub max_resolution_passes: u32,
    /// Display area; dirty rects are clipped to it
    pub display_bounds: Rect,
    /// Redraw the whole display every frame
    pub always_redraw: bool,
}

impl WorldConfig {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self {
            cell_size: 64.0,
            dirty_rect_capacity: 32,
            max_resolution_passes: 3,
            display_bounds: Rect::new(0.0, 0.0, 400.0, 240.0),
            always_redraw: false,
        }
    }

    /// Set the spatial grid cell size
    pub fn with_cell_size(mut self, cell_size: f32) -> Self {
        self.cell_size = cell_size;
        self
    }

    /// Set the dirty rect capacity
    pub fn with_dirty_rect_capacity(mut self, capacity: usize) -> Self {
        self.dirty_rect_capacity = capacity;
        self
    }

    /// Set the resolution pass cap
    pub fn with_max_resolution_passes(mut self, passes: u32) -> Self {
        self.max_resolution_passes = passes;
        self
    }

    /// Set the display bounds
    pub fn with_display_bounds(mut self, bounds: Rect) -> Self {
        self.display_bounds = bounds;
        self
    }

    /// Enable or disable full-display redraw every frame
    pub fn with_always_redraw(mut self, enabled: bool) -> Self {
        self.always_redraw = enabled;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            return Err(format!("Cell size must be positive and finite, got {}", self.cell_size));
        }

        if self.dirty_rect_capacity == 0 {
            return Err("Dirty rect capacity must be at least 1".to_string());
        }

        if self.max_resolution_passes == 0 {
            return Err("Max resolution passes must be at least 1".to_string());
        }

        if self.display_bounds.is_empty() {
            return Err("Display bounds must have positive area".to_string());
        }

        Ok(())
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl Config for WorldConfig {}
