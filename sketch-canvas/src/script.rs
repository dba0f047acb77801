// SPDX-License-Identifier: MIT
//! # Stroke Scripts
//!
//! A stroke script is a JSON description of a drawing, replayed through the same
//! `begin`/`extend`/`end` calls a pointer would make:
//!
//! ```json
//! {
//!   "strokes": [
//!     { "color": "#FF0000", "width": 8, "points": [[100, 100], [400, 100], [250, 400]] }
//!   ]
//! }
//! ```
//!
//! `color` and `width` are optional and fall back to the canvas's current brush.
//! Points are in raster coordinates.

use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;

use crate::input::Canvas;
use crate::palette::{MAX_WIDTH, MIN_WIDTH, parse_hex_color};
use crate::surface::Point;

#[derive(Debug, Clone, Deserialize)]
pub struct StrokeScript {
    pub strokes: Vec<ScriptStroke>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScriptStroke {
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    pub points: Vec<[f32; 2]>,
}

impl StrokeScript {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("parsing stroke script")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading stroke script {}", path.display()))?;
        Self::from_json(&json)
    }

    /// Checks every stroke before anything is drawn, so a bad script leaves the canvas untouched.
    pub fn validate(&self) -> Result<()> {
        for (i, stroke) in self.strokes.iter().enumerate() {
            if let Some(color) = &stroke.color {
                parse_hex_color(color).with_context(|| format!("stroke {}", i))?;
            }
            if let Some(width) = stroke.width {
                if !(MIN_WIDTH..=MAX_WIDTH).contains(&width) {
                    return Err(anyhow!(
                        "stroke {}: width {} outside {}..={}",
                        i,
                        width,
                        MIN_WIDTH,
                        MAX_WIDTH
                    ));
                }
            }
        }
        Ok(())
    }

    /// Replays every stroke onto `canvas`.
    ///
    /// A single-point stroke paints a dot. The brush selection left behind is that
    /// of the last stroke, exactly as if a user had picked it.
    pub fn replay(&self, canvas: &mut Canvas) -> Result<()> {
        self.validate()?;
        for stroke in &self.strokes {
            if let Some(color) = &stroke.color {
                canvas.set_color(parse_hex_color(color)?);
            }
            if let Some(width) = stroke.width {
                canvas.set_width(width);
            }

            let mut points = stroke.points.iter().map(|[x, y]| Point::new(*x, *y));
            let Some(first) = points.next() else {
                continue;
            };
            canvas.begin(first);
            if stroke.points.len() == 1 {
                canvas.extend(first);
            }
            for p in points {
                canvas.extend(p);
            }
            canvas.end();
        }
        Ok(())
    }
}
