//! Shared value types for the sketch document.
//!
//! Everything here is plain data: points in frame-local space, colors with
//! floating channels, and the settings snapshot a stroke is started with.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Point { x, y }
    }

    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Point {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// Pixel dimensions of the drawing surface every frame is rendered at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl CanvasSize {
    pub const fn new(width: u32, height: u32) -> Self {
        CanvasSize { width, height }
    }
}

impl Default for CanvasSize {
    fn default() -> Self {
        CanvasSize {
            width: 400,
            height: 600,
        }
    }
}

// ---------------------------------------------------------------------------
// Paint
// ---------------------------------------------------------------------------

/// Straight-alpha color, each channel in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    #[serde(default = "opaque")]
    pub a: f32,
}

fn opaque() -> f32 {
    1.0
}

impl Color {
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Color { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Color { r, g, b, a }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawingMode {
    #[default]
    Draw,
    /// Removes color and alpha from whatever has been composited below.
    Erase,
}

/// The color/width/mode a new stroke starts with.
///
/// Captured once when the stroke begins; later changes to the caller's
/// settings do not affect a stroke already in progress.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokeSettings {
    #[serde(default)]
    pub color: Color,
    #[serde(default = "default_stroke_width")]
    pub width: f32,
    #[serde(default)]
    pub mode: DrawingMode,
}

pub fn default_stroke_width() -> f32 {
    3.0
}

impl Default for StrokeSettings {
    fn default() -> Self {
        StrokeSettings {
            color: Color::BLACK,
            width: default_stroke_width(),
            mode: DrawingMode::Draw,
        }
    }
}

impl StrokeSettings {
    pub fn eraser(width: f32) -> Self {
        StrokeSettings {
            mode: DrawingMode::Erase,
            width,
            ..Default::default()
        }
    }
}
