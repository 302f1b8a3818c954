//! Dirty region accumulation

use crate::foundation::math::Rect;

/// Regions of the display that need redrawing
///
/// Rects are clipped to the display. Empty rects and rects already covered by
/// an entry are dropped. Once more than `capacity` rects are pending, the list
/// collapses into their bounding union.
#[derive(Debug, Clone)]
pub struct DirtyRectTracker {
    rects: Vec<Rect>,
    capacity: usize,
    display: Rect,
    always_redraw: bool,
}

impl DirtyRectTracker {
    /// Create an empty tracker
    pub fn new(capacity: usize, display: Rect) -> Self {
        Self {
            rects: Vec::with_capacity(capacity.max(1)),
            capacity: capacity.max(1),
            display,
            always_redraw: false,
        }
    }

    /// Record a region
    pub fn add(&mut self, rect: Rect) {
        let clipped = rect.intersection(&self.display);
        if clipped.is_empty() || self.rects.iter().any(|r| r.contains_rect(&clipped)) {
            return;
        }

        self.rects.retain(|r| !clipped.contains_rect(r));
        self.rects.push(clipped);

        if self.rects.len() > self.capacity {
            let merged = self.rects.iter().skip(1).fold(self.rects[0], |acc, r| acc.bounding(r));
            log::trace!("Dirty rect list over capacity {}, collapsed to {merged:?}", self.capacity);
            self.rects.clear();
            self.rects.push(merged);
        }
    }

    /// Mark the whole display dirty
    pub fn invalidate_all(&mut self) {
        self.rects.clear();
        self.rects.push(self.display);
    }

    /// Take the pending regions, leaving the tracker empty
    pub fn drain(&mut self) -> Vec<Rect> {
        if self.always_redraw {
            self.rects.clear();
            return vec![self.display];
        }
        std::mem::take(&mut self.rects)
    }

    /// Pending regions
    pub fn rects(&self) -> &[Rect] {
        &self.rects
    }

    /// Whether nothing is pending
    pub fn is_empty(&self) -> bool {
        self.rects.is_empty() && !self.always_redraw
    }

    /// Display area rects are clipped to
    pub fn display_bounds(&self) -> Rect {
        self.display
    }

    /// Change the display area; everything pending is replaced by the new display
    pub fn set_display_bounds(&mut self, display: Rect) {
        self.display = display;
        self.invalidate_all();
    }

    /// Whether `drain` always yields the full display
    pub fn always_redraw(&self) -> bool {
        self.always_redraw
    }

    /// Enable or disable full-display redraw on every drain
    pub fn set_always_redraw(&mut self, enabled: bool) {
        self.always_redraw = enabled;
    }
}
