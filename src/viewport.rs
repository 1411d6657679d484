// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Pan/zoom transform between logical diagram space and screen space.
//!
//! `screen = logical * zoom + pan`. Zoom is clamped to [`MIN_ZOOM`, `MAX_ZOOM`]
//! on every write, so the inverse is always defined.

use crate::model::{Point, Size};

pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 3.0;

pub fn clamp_zoom(zoom: f64) -> f64 {
    if zoom.is_nan() {
        return 1.0;
    }
    zoom.clamp(MIN_ZOOM, MAX_ZOOM)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pan: Point,
    zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            pan: Point::ORIGIN,
            zoom: 1.0,
        }
    }
}

impl Viewport {
    /// Builds a viewport, clamping `zoom` into range.
    pub fn new(pan: Point, zoom: f64) -> Self {
        Self {
            pan,
            zoom: clamp_zoom(zoom),
        }
    }

    pub fn pan(&self) -> Point {
        self.pan
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn to_screen(&self, logical: Point) -> Point {
        logical * self.zoom + self.pan
    }

    pub fn to_logical(&self, screen: Point) -> Point {
        (screen - self.pan) / self.zoom
    }

    pub fn size_to_screen(&self, size: Size) -> Size {
        size.scaled(self.zoom)
    }

    /// Screen-space displacement expressed in logical units.
    pub fn delta_to_logical(&self, screen_delta: Point) -> Point {
        screen_delta / self.zoom
    }

    /// Adds `delta` to the zoom factor, clamped.
    ///
    /// With an anchor, the logical point under the anchor stays put on screen.
    pub fn zoom_by(&mut self, delta: f64, anchor: Option<Point>) -> bool {
        self.set_zoom(self.zoom + delta, anchor)
    }

    /// Sets the zoom factor, clamped. Returns whether anything changed.
    pub fn set_zoom(&mut self, zoom: f64, anchor: Option<Point>) -> bool {
        let previous = *self;
        let next = clamp_zoom(zoom);
        if let Some(anchor) = anchor {
            self.pan = anchor - (anchor - self.pan) * (next / self.zoom);
        }
        self.zoom = next;
        *self != previous
    }

    /// Moves the canvas by a screen-space delta. Unbounded.
    pub fn pan_by(&mut self, delta: Point) -> bool {
        self.pan += delta;
        delta != Point::ORIGIN
    }

    pub fn set_pan(&mut self, pan: Point) -> bool {
        let changed = self.pan != pan;
        self.pan = pan;
        changed
    }

    pub fn reset_zoom(&mut self) -> bool {
        self.set_zoom(1.0, None)
    }

    /// Back to the identity transform.
    pub fn center(&mut self) -> bool {
        let changed = *self != Viewport::default();
        *self = Viewport::default();
        changed
    }
}
