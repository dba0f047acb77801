// SPDX-License-Identifier: MIT
//! # Canvas Input
//!
//! [`Canvas`] ties the stroke surface to the brush and to the stroke state machine:
//!
//! ```text
//!            begin(p)                 extend(q): segment last→q, last = q
//!   Idle ───────────────▶ Stroking ◀──────────┐
//!    ▲                      │  └──────────────┘
//!    └──────── end() ───────┘
//! ```
//!
//! `begin` while already stroking and `extend` while idle are both no-ops.
//!
//! Pointer devices report positions in screen space. The surface is usually shown
//! at a different size than its raster (CSS scales a 500px canvas down on phones),
//! so [`DisplayRect::to_surface`] subtracts the displayed origin and rescales by
//! `raster size / displayed size` before anything is drawn.

use anyhow::Result;
use image::Rgba;

use crate::export;
use crate::palette::Brush;
use crate::surface::{Point, Size, StrokeSurface};

/// Where the surface currently sits on screen, in screen-space units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DisplayRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl DisplayRect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Translates a screen-space position into raster-local coordinates.
    ///
    /// A degenerate (zero or negative) displayed dimension is treated as unscaled.
    pub fn to_surface(&self, screen: Point, surface: Size) -> Point {
        let scale_x = if self.width > 0.0 {
            surface.w as f32 / self.width
        } else {
            1.0
        };
        let scale_y = if self.height > 0.0 {
            surface.h as f32 / self.height
        } else {
            1.0
        };
        Point::new(
            (screen.x - self.left) * scale_x,
            (screen.y - self.top) * scale_y,
        )
    }
}

/// Raw mouse and touch input, positions in screen space.
///
/// Touch events carry every active touch point; only the first one draws.
#[derive(Clone, Debug, PartialEq)]
pub enum PointerEvent {
    MouseDown(Point),
    MouseMove(Point),
    MouseUp,
    MouseLeave,
    TouchStart(Vec<Point>),
    TouchMove(Vec<Point>),
    TouchEnd,
}

/// Drawing surface plus brush selection plus the active stroke, if any.
#[derive(Clone, Debug, Default)]
pub struct Canvas {
    surface: StrokeSurface,
    brush: Brush,
    last: Option<Point>,
}

impl Canvas {
    pub fn new(size: Size) -> Self {
        Self {
            surface: StrokeSurface::new(size),
            brush: Brush::default(),
            last: None,
        }
    }

    /// Starts a stroke at `position`. Does nothing if a stroke is already active.
    pub fn begin(&mut self, position: Point) {
        if self.last.is_none() {
            self.last = Some(position);
        }
    }

    /// Draws from the last recorded position to `position` and records it.
    pub fn extend(&mut self, position: Point) {
        let Some(last) = self.last else {
            return;
        };
        self.surface.draw_segment(last, position, &self.brush);
        self.last = Some(position);
    }

    /// Finishes the active stroke, if any.
    pub fn end(&mut self) {
        self.last = None;
    }

    /// Repaints the whole surface with the background color.
    pub fn reset(&mut self) {
        self.surface.clear();
    }

    /// Encodes the current raster as a `data:image/png;base64,...` payload.
    pub fn export(&self) -> Result<String> {
        export::raster_to_data_url(self.surface.raster())
    }

    /// Routes a raw pointer event through [`DisplayRect::to_surface`] into
    /// `begin`/`extend`/`end`.
    pub fn handle(&mut self, event: &PointerEvent, display: &DisplayRect) {
        let size = self.surface.size();
        match event {
            PointerEvent::MouseDown(p) => self.begin(display.to_surface(*p, size)),
            PointerEvent::MouseMove(p) => self.extend(display.to_surface(*p, size)),
            PointerEvent::TouchStart(touches) => {
                if let Some(p) = touches.first() {
                    self.begin(display.to_surface(*p, size));
                }
            }
            PointerEvent::TouchMove(touches) => {
                if let Some(p) = touches.first() {
                    self.extend(display.to_surface(*p, size));
                }
            }
            PointerEvent::MouseUp | PointerEvent::MouseLeave | PointerEvent::TouchEnd => {
                self.end()
            }
        }
    }

    pub fn is_stroking(&self) -> bool {
        self.last.is_some()
    }

    pub fn brush(&self) -> &Brush {
        &self.brush
    }

    pub fn set_color(&mut self, color: Rgba<u8>) {
        self.brush.set_color(color);
    }

    pub fn set_width(&mut self, width: u32) {
        self.brush.set_width(width);
    }

    pub fn surface(&self) -> &StrokeSurface {
        &self.surface
    }
}
