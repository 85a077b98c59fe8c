use serde::{Deserialize, Serialize};
use tiny_skia::{BlendMode, FillRule, PathBuilder, Pixmap, Transform};

use crate::types::{Color, DrawingMode, Point, StrokeSettings};

use super::{round_stroke, solid_paint};

/// A free-hand stroke. Points are kept in drawing order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub points: Vec<Point>,
    pub color: Color,
    pub width: f32,
    #[serde(default)]
    pub mode: DrawingMode,
}

impl Line {
    /// An empty stroke carrying the given settings.
    pub fn with_settings(settings: StrokeSettings) -> Self {
        Line {
            points: Vec::new(),
            color: settings.color,
            width: settings.width,
            mode: settings.mode,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn translate(&mut self, dx: f32, dy: f32) {
        for p in &mut self.points {
            *p = p.offset(dx, dy);
        }
    }

    pub fn draw(&self, pixmap: &mut Pixmap) {
        let mut paint = solid_paint(self.color);
        // Erase clears what is already composited instead of painting over it.
        paint.blend_mode = match self.mode {
            DrawingMode::Draw => BlendMode::SourceOver,
            DrawingMode::Erase => BlendMode::DestinationOut,
        };

        match self.points.as_slice() {
            [] => {}
            [dot] => {
                // A single tap still leaves a round mark the size of the pen.
                if let Some(path) = PathBuilder::from_circle(dot.x, dot.y, self.width / 2.0) {
                    pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
                }
            }
            [first, rest @ ..] => {
                let mut pb = PathBuilder::new();
                pb.move_to(first.x, first.y);
                for p in rest {
                    pb.line_to(p.x, p.y);
                }
                if let Some(path) = pb.finish() {
                    pixmap.stroke_path(
                        &path,
                        &paint,
                        &round_stroke(self.width),
                        Transform::identity(),
                        None,
                    );
                }
            }
        }
    }
}
