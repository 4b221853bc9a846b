//! View state: current page, zoom scale and selected placement tool

use crate::config::TakeoffConfig;
use crate::symbol::SymbolId;

/// Navigation and zoom state of the page viewer
///
/// Invariants:
/// - `1 <= active_page <= total_pages` while `total_pages > 0`
/// - `scale` stays within the configured bounds after every mutation
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    active_page: u32,
    total_pages: u32,
    scale: f32,
    active_symbol: Option<SymbolId>,
    min_scale: f32,
    max_scale: f32,
    zoom_step: f32,
}

impl ViewState {
    pub fn new(config: &TakeoffConfig) -> Self {
        Self {
            active_page: 1,
            total_pages: 0,
            scale: config.clamp_scale(1.0),
            active_symbol: None,
            min_scale: config.min_scale,
            max_scale: config.max_scale,
            zoom_step: config.zoom_step,
        }
    }

    /// 1-based page currently shown
    pub fn active_page(&self) -> u32 {
        self.active_page
    }

    /// Page count of the loaded document, 0 when none is known yet
    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Zoom as a whole percentage for display
    pub fn zoom_percent(&self) -> u32 {
        (self.scale * 100.0).round() as u32
    }

    pub fn active_symbol(&self) -> Option<SymbolId> {
        self.active_symbol
    }

    pub fn set_active_symbol(&mut self, symbol: Option<SymbolId>) {
        self.active_symbol = symbol;
    }

    /// Record the page count reported by the renderer
    pub fn set_total_pages(&mut self, total_pages: u32) {
        self.total_pages = total_pages;
        self.active_page = self.clamp_page(self.active_page);
    }

    /// Jump to a page, clamped to the document. Returns true if the page changed.
    pub fn set_active_page(&mut self, page: u32) -> bool {
        let page = self.clamp_page(page);
        let changed = page != self.active_page;
        self.active_page = page;
        changed
    }

    pub fn can_go_previous(&self) -> bool {
        self.total_pages > 0 && self.active_page > 1
    }

    pub fn can_go_next(&self) -> bool {
        self.total_pages > 0 && self.active_page < self.total_pages
    }

    /// Returns true if the page changed
    pub fn previous_page(&mut self) -> bool {
        if !self.can_go_previous() {
            return false;
        }
        self.active_page -= 1;
        true
    }

    /// Returns true if the page changed
    pub fn next_page(&mut self) -> bool {
        if !self.can_go_next() {
            return false;
        }
        self.active_page += 1;
        true
    }

    /// Set the zoom factor, clamped to bounds. Returns true if it changed.
    pub fn set_scale(&mut self, scale: f32) -> bool {
        let scale = if scale.is_nan() {
            self.min_scale
        } else {
            // Hundredths keep repeated steps from drifting (1.1, not 1.1000001)
            ((scale * 100.0).round() / 100.0).clamp(self.min_scale, self.max_scale)
        };
        let changed = scale != self.scale;
        self.scale = scale;
        changed
    }

    pub fn can_zoom_in(&self) -> bool {
        self.scale < self.max_scale
    }

    pub fn can_zoom_out(&self) -> bool {
        self.scale > self.min_scale
    }

    pub fn zoom_in(&mut self) -> bool {
        self.set_scale(self.scale + self.zoom_step)
    }

    pub fn zoom_out(&mut self) -> bool {
        self.set_scale(self.scale - self.zoom_step)
    }

    /// Back to page 1 with no known page count. Zoom and tool are kept.
    pub fn reset_pages(&mut self) {
        self.active_page = 1;
        self.total_pages = 0;
    }

    fn clamp_page(&self, page: u32) -> u32 {
        if self.total_pages == 0 {
            1
        } else {
            page.clamp(1, self.total_pages)
        }
    }
}
