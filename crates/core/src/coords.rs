//! Coordinate mapping between rendered view space and document space
//!
//! Clicks arrive in rendered pixels relative to the page's rendering origin.
//! They are divided by the zoom scale before storage, so stored coordinates do
//! not depend on the zoom level at placement time. At draw time the stored
//! point is multiplied back by the current scale and treated as the marker
//! center.

use crate::annotation::PageCoordinate;

/// Point in rendered (scaled) pixel space, relative to the page origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewPoint {
    pub x: f32,
    pub y: f32,
}

impl ViewPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Page size in document space (page pixels at 100% zoom)
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PageDimensions {
    pub width: f32,
    pub height: f32,
}

impl PageDimensions {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Size of the annotation overlay at the given scale
    pub fn scaled(&self, scale: f32) -> (f32, f32) {
        (self.width * scale, self.height * scale)
    }
}

/// Screen box a marker occupies, in rendered pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerRect {
    pub left: f32,
    pub top: f32,
    /// Side length; markers are square boxes regardless of shape
    pub size: f32,
}

impl MarkerRect {
    pub fn center(&self) -> ViewPoint {
        let half = self.size / 2.0;
        ViewPoint::new(self.left + half, self.top + half)
    }

    /// Check whether a rendered point falls inside the marker box
    pub fn contains(&self, point: ViewPoint) -> bool {
        point.x >= self.left
            && point.x <= self.left + self.size
            && point.y >= self.top
            && point.y <= self.top + self.size
    }
}

/// Convert a click in rendered space to document space
pub fn to_document(click: ViewPoint, scale: f32) -> PageCoordinate {
    PageCoordinate::new(click.x / scale, click.y / scale)
}

/// Convert a stored document-space point to rendered space
pub fn to_rendered(position: PageCoordinate, scale: f32) -> ViewPoint {
    ViewPoint::new(position.x * scale, position.y * scale)
}

/// Box to draw a marker of `symbol_size` pixels centered on `position`
///
/// The marker size is in screen pixels and does not grow with zoom; only its
/// anchor moves.
pub fn marker_rect(position: PageCoordinate, scale: f32, symbol_size: f32) -> MarkerRect {
    let center = to_rendered(position, scale);
    let half = symbol_size / 2.0;
    MarkerRect {
        left: center.x - half,
        top: center.y - half,
        size: symbol_size,
    }
}
