//! Points, offsets, and the transient view state.

use serde::{Deserialize, Serialize};

/// A location in document coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Point {
    /// Create a point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A displacement, such as a drag or pan amount.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Offset {
    /// Horizontal component.
    pub width: f64,
    /// Vertical component.
    pub height: f64,
}

impl Offset {
    /// The zero offset.
    pub const ZERO: Self = Self::new(0.0, 0.0);

    /// Create an offset.
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Zoom and pan of the editor viewport.
///
/// UI-only state; never persisted with the document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewState {
    zoom_scale: f64,
    /// Pan offset of the viewport.
    pub pan_offset: Offset,
}

impl ViewState {
    /// Current zoom scale (always finite and positive).
    #[must_use]
    pub fn zoom_scale(&self) -> f64 {
        self.zoom_scale
    }

    /// Set the zoom scale.
    ///
    /// Returns `false` and leaves the scale unchanged when `scale` is not a
    /// finite positive number.
    pub fn set_zoom_scale(&mut self, scale: f64) -> bool {
        if !scale.is_finite() || scale <= 0.0 {
            return false;
        }
        self.zoom_scale = scale;
        true
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            zoom_scale: 1.0,
            pan_offset: Offset::ZERO,
        }
    }
}
