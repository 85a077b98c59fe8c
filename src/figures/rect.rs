use serde::{Deserialize, Serialize};
use tiny_skia::{PathBuilder, Pixmap, Rect, Transform};

use crate::types::{Color, Point};

use super::{round_stroke, solid_paint};

/// A stroked (not filled) axis-aligned rectangle.
///
/// Corners are in screen space with y growing downward, so `bottom_left`
/// normally has the larger y of the two.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub bottom_left: Point,
    pub top_right: Point,
    pub color: Color,
    pub width: f32,
}

/// Axis-aligned bounding box of a shape's geometry (stroke width excluded).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl Bounds {
    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }

    /// Whether the box lies inside `[0, width] x [0, height]`.
    pub fn within(&self, width: f32, height: f32) -> bool {
        self.min_x >= 0.0 && self.min_y >= 0.0 && self.max_x <= width && self.max_y <= height
    }
}

impl Rectangle {
    /// A square of side `side` whose top-left corner sits at `(x, y)`.
    pub fn square(x: f32, y: f32, side: f32, color: Color, width: f32) -> Self {
        Rectangle {
            bottom_left: Point::new(x, y + side),
            top_right: Point::new(x + side, y),
            color,
            width,
        }
    }

    pub fn bounds(&self) -> Bounds {
        Bounds {
            min_x: self.bottom_left.x.min(self.top_right.x),
            min_y: self.bottom_left.y.min(self.top_right.y),
            max_x: self.bottom_left.x.max(self.top_right.x),
            max_y: self.bottom_left.y.max(self.top_right.y),
        }
    }

    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.bottom_left = self.bottom_left.offset(dx, dy);
        self.top_right = self.top_right.offset(dx, dy);
    }

    pub fn draw(&self, pixmap: &mut Pixmap) {
        let b = self.bounds();
        let Some(rect) = Rect::from_ltrb(b.min_x, b.min_y, b.max_x, b.max_y) else {
            return;
        };
        let path = PathBuilder::from_rect(rect);
        pixmap.stroke_path(
            &path,
            &solid_paint(self.color),
            &round_stroke(self.width),
            Transform::identity(),
            None,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_bounds_span_side_length() {
        let sq = Rectangle::square(10.0, 20.0, 70.0, Color::BLACK, 10.0);
        let b = sq.bounds();
        assert_eq!((b.min_x, b.min_y, b.max_x, b.max_y), (10.0, 20.0, 80.0, 90.0));
        assert_eq!(b.width(), 70.0);
        assert_eq!(b.height(), 70.0);
    }

    #[test]
    fn bounds_within_checks_every_edge() {
        let sq = Rectangle::square(0.0, 0.0, 10.0, Color::BLACK, 1.0);
        assert!(sq.bounds().within(10.0, 10.0));
        assert!(!sq.bounds().within(9.5, 10.0));

        let mut off = sq.clone();
        off.translate(-0.5, 0.0);
        assert!(!off.bounds().within(100.0, 100.0));
    }
}
