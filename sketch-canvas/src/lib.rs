// SPDX-License-Identifier: MIT
//! # sketch-canvas: Freehand Capture for VLM Input
//!
//! This crate owns the drawing side of the guessing game: a fixed-size raster that
//! freehand strokes are painted into, the translation from on-screen pointer
//! positions to raster pixels, and the lossless export that turns the raster into
//! a self-contained `data:image/png;base64,...` payload a vision model can read.
//!
//! ## Key Components
//!
//! - [`surface`]: The RGBA stroke surface and round-capped segment rasterizer
//! - [`palette`]: Brush state, the fixed color palette and hex color parsing
//! - [`input`]: The [`Canvas`](input::Canvas) stroke state machine and pointer mapping
//! - [`export`]: PNG encoding and data URL wrapping/unwrapping
//! - [`script`]: JSON stroke scripts that can be replayed without a pointer device
//!
//! ## Usage Example
//!
//! ```rust
//! use sketch_canvas::input::Canvas;
//! use sketch_canvas::surface::Point;
//!
//! let mut canvas = Canvas::default();
//! canvas.begin(Point::new(10.0, 10.0));
//! canvas.extend(Point::new(200.0, 200.0));
//! canvas.end();
//!
//! let payload = canvas.export()?;
//! assert!(payload.starts_with("data:image/png;base64,"));
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod export;
pub mod input;
pub mod palette;
pub mod script;
pub mod surface;

pub use input::{Canvas, DisplayRect, PointerEvent};
pub use palette::{Brush, PaletteColor};
pub use surface::{Point, Size, StrokeSurface};
