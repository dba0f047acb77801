// SPDX-License-Identifier: MIT
//! # Stroke Surface
//!
//! A fixed-size RGBA raster mutated only by sequential line-segment draws and full
//! repaints. The surface is always completely covered by its background color
//! before the first stroke lands, so an untouched export decodes to a uniform image.
//!
//! ## Rasterization
//!
//! Segments are drawn as capsules: every pixel whose center lies within
//! `width / 2` of the segment is painted. That yields round caps and round joins
//! for free, which is what a browser canvas produces with `lineCap = "round"` and
//! `lineJoin = "round"`. No anti-aliasing is applied, so edges stay crisp for
//! recognition and the PNG export is bit-exact.

use image::{Rgba, RgbaImage};

use crate::palette::Brush;

/// Default logical size of the drawing surface (matches the on-page canvas).
pub const DEFAULT_SIZE: Size = Size { w: 500, h: 500 };

/// Solid white, the background every surface starts from.
pub const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Represents a 2D size with width and height in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Size {
    pub w: u32,
    pub h: u32,
}

/// A position in surface-local coordinates. Fractional values are allowed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Raster that freehand strokes are painted into.
#[derive(Clone, Debug)]
pub struct StrokeSurface {
    raster: RgbaImage,
    background: Rgba<u8>,
}

impl Default for StrokeSurface {
    fn default() -> Self {
        Self::new(DEFAULT_SIZE)
    }
}

impl StrokeSurface {
    /// Creates a surface of `size` filled with [`BACKGROUND`].
    pub fn new(size: Size) -> Self {
        Self::with_background(size, BACKGROUND)
    }

    /// Creates a surface of `size` filled with a custom background color.
    pub fn with_background(size: Size, background: Rgba<u8>) -> Self {
        // A zero-sized raster cannot be encoded; clamp to at least one pixel.
        let (w, h) = (size.w.max(1), size.h.max(1));
        Self {
            raster: RgbaImage::from_pixel(w, h, background),
            background,
        }
    }

    pub fn size(&self) -> Size {
        Size {
            w: self.raster.width(),
            h: self.raster.height(),
        }
    }

    pub fn background(&self) -> Rgba<u8> {
        self.background
    }

    /// Repaints every pixel with the background color, discarding all strokes.
    pub fn clear(&mut self) {
        let background = self.background;
        for pixel in self.raster.pixels_mut() {
            *pixel = background;
        }
    }

    /// Paints a straight, round-capped segment from `from` to `to`.
    ///
    /// Portions of the segment outside the raster are clipped. A zero-length
    /// segment paints a single round dot of the brush width.
    ///
    /// Time complexity: O(bbox area) where bbox is the segment's bounding box
    /// expanded by the brush radius and clipped to the raster.
    pub fn draw_segment(&mut self, from: Point, to: Point, brush: &Brush) {
        let radius = brush.width() as f32 / 2.0;
        let radius_sq = radius * radius;
        let (w, h) = (self.raster.width() as i64, self.raster.height() as i64);

        let min_x = ((from.x.min(to.x) - radius).floor() as i64).max(0);
        let min_y = ((from.y.min(to.y) - radius).floor() as i64).max(0);
        let max_x = ((from.x.max(to.x) + radius).ceil() as i64).min(w - 1);
        let max_y = ((from.y.max(to.y) + radius).ceil() as i64).min(h - 1);
        if min_x > max_x || min_y > max_y {
            return;
        }

        let color = brush.color();
        for py in min_y..=max_y {
            for px in min_x..=max_x {
                let center = Point::new(px as f32 + 0.5, py as f32 + 0.5);
                if distance_sq_to_segment(center, from, to) <= radius_sq {
                    self.raster.put_pixel(px as u32, py as u32, color);
                }
            }
        }
    }

    /// Returns the pixel at `(x, y)`, or `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba<u8>> {
        self.raster.get_pixel_checked(x, y).copied()
    }

    /// True when no pixel differs from the background.
    pub fn is_blank(&self) -> bool {
        self.raster.pixels().all(|p| *p == self.background)
    }

    pub fn raster(&self) -> &RgbaImage {
        &self.raster
    }
}

/// Squared distance from `p` to the closed segment `a..b`.
fn distance_sq_to_segment(p: Point, a: Point, b: Point) -> f32 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len_sq = dx * dx + dy * dy;
    let t = if len_sq <= f32::EPSILON {
        0.0
    } else {
        (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0)
    };
    let (cx, cy) = (a.x + t * dx, a.y + t * dy);
    (p.x - cx) * (p.x - cx) + (p.y - cy) * (p.y - cy)
}
