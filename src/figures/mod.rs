//! Drawable figures.
//!
//! The set of shapes is closed: a free-hand `Line` or a stroked `Rectangle`.
//! Each shape lives in its own module with its struct definition, movement
//! and painting side by side; `Figure` dispatches with exhaustive matches.

mod line;
mod rect;

pub use line::Line;
pub use rect::{Bounds, Rectangle};

use serde::{Deserialize, Serialize};
use tiny_skia::Pixmap;

use crate::types::{Color, DrawingMode};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Figure {
    Line(Line),
    Rectangle(Rectangle),
}

impl Figure {
    /// Translate every point of the figure in place.
    pub fn translate(&mut self, dx: f32, dy: f32) {
        match self {
            Figure::Line(l) => l.translate(dx, dy),
            Figure::Rectangle(r) => r.translate(dx, dy),
        }
    }

    /// A translated copy; `self` is left untouched.
    pub fn moved(&self, dx: f32, dy: f32) -> Figure {
        let mut figure = self.clone();
        figure.translate(dx, dy);
        figure
    }

    /// Paint onto `pixmap` over whatever has been composited so far.
    pub fn draw(&self, pixmap: &mut Pixmap) {
        match self {
            Figure::Line(l) => l.draw(pixmap),
            Figure::Rectangle(r) => r.draw(pixmap),
        }
    }

    pub fn is_erase(&self) -> bool {
        match self {
            Figure::Line(l) => l.mode == DrawingMode::Erase,
            Figure::Rectangle(_) => false,
        }
    }
}

impl From<Line> for Figure {
    fn from(value: Line) -> Self {
        Figure::Line(value)
    }
}

impl From<Rectangle> for Figure {
    fn from(value: Rectangle) -> Self {
        Figure::Rectangle(value)
    }
}

/// Build the paint shared by every figure: anti-aliased, solid color.
fn solid_paint(color: Color) -> tiny_skia::Paint<'static> {
    let mut paint = tiny_skia::Paint::default();
    paint.anti_alias = true;
    paint.set_color(to_skia_color(color));
    paint
}

fn to_skia_color(c: Color) -> tiny_skia::Color {
    tiny_skia::Color::from_rgba(
        c.r.clamp(0.0, 1.0),
        c.g.clamp(0.0, 1.0),
        c.b.clamp(0.0, 1.0),
        c.a.clamp(0.0, 1.0),
    )
    .unwrap_or(tiny_skia::Color::BLACK)
}

/// Round caps and joins, matching how strokes look while being drawn.
fn round_stroke(width: f32) -> tiny_skia::Stroke {
    tiny_skia::Stroke {
        width,
        line_cap: tiny_skia::LineCap::Round,
        line_join: tiny_skia::LineJoin::Round,
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Point;

    fn sample_line() -> Line {
        Line {
            points: vec![Point::new(1.0, 2.0), Point::new(3.0, 4.0)],
            color: Color::BLACK,
            width: 3.0,
            mode: DrawingMode::Draw,
        }
    }

    #[test]
    fn moved_leaves_original_untouched() {
        let figure = Figure::from(sample_line());
        let moved = figure.moved(10.0, -1.0);

        assert_eq!(figure, Figure::from(sample_line()));
        let Figure::Line(line) = moved else {
            panic!("variant changed");
        };
        assert_eq!(line.points, vec![Point::new(11.0, 1.0), Point::new(13.0, 3.0)]);
    }

    #[test]
    fn translate_moves_both_rectangle_corners() {
        let mut figure = Figure::from(Rectangle {
            bottom_left: Point::new(0.0, 10.0),
            top_right: Point::new(10.0, 0.0),
            color: Color::BLACK,
            width: 1.0,
        });
        figure.translate(5.0, 5.0);
        let Figure::Rectangle(r) = figure else {
            panic!("variant changed");
        };
        assert_eq!(r.bottom_left, Point::new(5.0, 15.0));
        assert_eq!(r.top_right, Point::new(15.0, 5.0));
    }

    #[test]
    fn only_erase_lines_report_erase() {
        let mut eraser = sample_line();
        eraser.mode = DrawingMode::Erase;
        assert!(Figure::from(eraser).is_erase());
        assert!(!Figure::from(sample_line()).is_erase());
        assert!(!Figure::from(Rectangle {
            bottom_left: Point::default(),
            top_right: Point::new(1.0, 1.0),
            color: Color::WHITE,
            width: 1.0,
        })
        .is_erase());
    }

    #[test]
    fn figures_serialize_with_type_tag() {
        let json = serde_json::to_string(&Figure::from(sample_line())).unwrap();
        assert!(json.contains(r#""type":"line""#));
        let back: Figure = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Figure::from(sample_line()));
    }
}
