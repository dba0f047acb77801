// SPDX-License-Identifier: MIT
//! # Brush and Palette
//!
//! Color and stroke width are selection state: they live beside the surface, not
//! in it, and only affect segments drawn after they change.
//!
//! The palette mirrors the twelve swatches offered next to the canvas. Colors can
//! also be given as arbitrary `#RRGGBB` strings, which is what stroke scripts use.

use anyhow::{Result, anyhow};
use image::Rgba;

/// Thinnest selectable brush, in pixels.
pub const MIN_WIDTH: u32 = 1;
/// Widest selectable brush, in pixels.
pub const MAX_WIDTH: u32 = 20;
/// Brush width selected on a fresh canvas.
pub const DEFAULT_WIDTH: u32 = 5;

/// Current stroke color and width.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Brush {
    color: Rgba<u8>,
    width: u32,
}

impl Default for Brush {
    fn default() -> Self {
        Self::new(PaletteColor::Black.rgba(), DEFAULT_WIDTH)
    }
}

impl Brush {
    /// Creates a brush, clamping `width` into `MIN_WIDTH..=MAX_WIDTH`.
    pub fn new(color: Rgba<u8>, width: u32) -> Self {
        Self {
            color,
            width: width.clamp(MIN_WIDTH, MAX_WIDTH),
        }
    }

    pub fn color(&self) -> Rgba<u8> {
        self.color
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn set_color(&mut self, color: Rgba<u8>) {
        self.color = color;
    }

    /// Sets the width, clamped into `MIN_WIDTH..=MAX_WIDTH`.
    pub fn set_width(&mut self, width: u32) {
        self.width = width.clamp(MIN_WIDTH, MAX_WIDTH);
    }
}

/// The fixed swatches shown next to the canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum PaletteColor {
    Black,
    Red,
    Green,
    Blue,
    Yellow,
    Magenta,
    Cyan,
    Orange,
    Purple,
    Brown,
    Gray,
    Pink,
}

impl PaletteColor {
    /// All swatches in display order.
    pub fn all() -> &'static [PaletteColor] {
        &[
            PaletteColor::Black,
            PaletteColor::Red,
            PaletteColor::Green,
            PaletteColor::Blue,
            PaletteColor::Yellow,
            PaletteColor::Magenta,
            PaletteColor::Cyan,
            PaletteColor::Orange,
            PaletteColor::Purple,
            PaletteColor::Brown,
            PaletteColor::Gray,
            PaletteColor::Pink,
        ]
    }

    pub fn hex(self) -> &'static str {
        match self {
            PaletteColor::Black => "#000000",
            PaletteColor::Red => "#FF0000",
            PaletteColor::Green => "#00FF00",
            PaletteColor::Blue => "#0000FF",
            PaletteColor::Yellow => "#FFFF00",
            PaletteColor::Magenta => "#FF00FF",
            PaletteColor::Cyan => "#00FFFF",
            PaletteColor::Orange => "#FFA500",
            PaletteColor::Purple => "#800080",
            PaletteColor::Brown => "#8B4513",
            PaletteColor::Gray => "#808080",
            PaletteColor::Pink => "#FFC0CB",
        }
    }

    pub fn rgba(self) -> Rgba<u8> {
        let [r, g, b] = match self {
            PaletteColor::Black => [0x00, 0x00, 0x00],
            PaletteColor::Red => [0xFF, 0x00, 0x00],
            PaletteColor::Green => [0x00, 0xFF, 0x00],
            PaletteColor::Blue => [0x00, 0x00, 0xFF],
            PaletteColor::Yellow => [0xFF, 0xFF, 0x00],
            PaletteColor::Magenta => [0xFF, 0x00, 0xFF],
            PaletteColor::Cyan => [0x00, 0xFF, 0xFF],
            PaletteColor::Orange => [0xFF, 0xA5, 0x00],
            PaletteColor::Purple => [0x80, 0x00, 0x80],
            PaletteColor::Brown => [0x8B, 0x45, 0x13],
            PaletteColor::Gray => [0x80, 0x80, 0x80],
            PaletteColor::Pink => [0xFF, 0xC0, 0xCB],
        };
        Rgba([r, g, b, 0xFF])
    }
}

/// Parses `#RRGGBB` (leading `#` optional, case-insensitive) into an opaque color.
pub fn parse_hex_color(value: &str) -> Result<Rgba<u8>> {
    let digits = value.trim().trim_start_matches('#');
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(anyhow!("Invalid color '{}': expected #RRGGBB", value));
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16);
    Ok(Rgba([channel(0)?, channel(2)?, channel(4)?, 0xFF]))
}
