//! Procedural frame content.
//!
//! Each generated frame holds exactly one rectangle. Two strategies:
//! independent random rectangles, or a single square that wanders across
//! frames and bounces off the canvas edges.

use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::figures::Rectangle;
use crate::types::{CanvasSize, Color};

/// Side length of generated squares, before shrinking to fit small canvases.
pub const SQUARE_SIDE: f32 = 70.0;
/// Largest per-axis step of the moving square, in whole pixels.
pub const MAX_STEP: i32 = 10;
/// Stroke width of the moving square.
pub const MOVING_SQUARE_WIDTH: f32 = 10.0;
/// Upper bound accepted for a generation request from user input.
pub const MAX_GENERATED_FRAMES: usize = 1_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    RandomRectangles,
    MovingSquare,
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("unknown generation strategy {0:?}, expected \"random\" or \"moving\"")]
    UnknownStrategy(String),
    #[error("frame count must be a whole number, got {0:?}")]
    NotANumber(String),
    #[error("frame count must be between 1 and {MAX_GENERATED_FRAMES}, got {0}")]
    OutOfRange(usize),
}

impl FromStr for Strategy {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "random" | "random_rectangles" => Ok(Strategy::RandomRectangles),
            "moving" | "moving_square" => Ok(Strategy::MovingSquare),
            other => Err(ParseError::UnknownStrategy(other.to_string())),
        }
    }
}

/// Check a user-typed frame count before handing it to the timeline.
pub fn validate_frame_count(input: &str) -> Result<usize, ParseError> {
    let n: usize = input
        .trim()
        .parse()
        .map_err(|_| ParseError::NotANumber(input.to_string()))?;
    if !(1..=MAX_GENERATED_FRAMES).contains(&n) {
        return Err(ParseError::OutOfRange(n));
    }
    Ok(n)
}

// ---------------------------------------------------------------------------
// RNG
// ---------------------------------------------------------------------------

/// Xorshift32. Plenty for placing squares, and seedable for tests.
#[derive(Debug, Clone)]
pub struct Rng32 {
    state: u32,
}

impl Rng32 {
    pub fn from_seed(seed: u32) -> Self {
        Self { state: seed | 1 }
    }

    pub fn from_clock() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.subsec_nanos() ^ d.as_secs() as u32)
            .unwrap_or(0x9e37_79b9);
        Self::from_seed(nanos)
    }

    pub fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    /// Uniform in `[0, 1)`.
    pub fn next_f32(&mut self) -> f32 {
        (self.next_u32() >> 8) as f32 / (1u32 << 24) as f32
    }

    /// Uniform in `[min, max)`; `min` when the range is empty.
    pub fn range_f32(&mut self, min: f32, max: f32) -> f32 {
        if max <= min {
            return min;
        }
        min + (max - min) * self.next_f32()
    }

    /// Uniform in `[min, max]`.
    pub fn range_i32(&mut self, min: i32, max: i32) -> i32 {
        if max <= min {
            return min;
        }
        let span = (max - min) as u32 + 1;
        min + (self.next_u32() % span) as i32
    }

    pub fn opaque_color(&mut self) -> Color {
        Color::rgb(self.next_f32(), self.next_f32(), self.next_f32())
    }
}

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

/// Side length that fits the canvas in both directions.
fn fitted_side(canvas: CanvasSize) -> f32 {
    SQUARE_SIDE.min(canvas.width as f32).min(canvas.height as f32)
}

/// One rectangle per step, each independently placed, colored and stroked.
pub fn random_rectangles(n: usize, canvas: CanvasSize, rng: &mut Rng32) -> Vec<Rectangle> {
    let side = fitted_side(canvas);
    (0..n)
        .map(|_| {
            let x = rng.range_f32(0.0, canvas.width as f32 - side);
            let y = rng.range_f32(0.0, canvas.height as f32 - side);
            let color = rng.opaque_color();
            let width = rng.range_f32(1.0, 20.0);
            Rectangle::square(x, y, side, color, width)
        })
        .collect()
}

/// A black square that drifts by a small random step each frame.
///
/// Positions and steps are whole pixels, so the bounds check is exact.
#[derive(Debug, Clone)]
pub struct MovingSquare {
    square: Rectangle,
    canvas: CanvasSize,
}

impl MovingSquare {
    pub fn new(canvas: CanvasSize, rng: &mut Rng32) -> Self {
        let side = fitted_side(canvas).floor();
        let x = rng.range_i32(0, canvas.width as i32 - side as i32);
        let y = rng.range_i32(0, canvas.height as i32 - side as i32);
        MovingSquare {
            square: Rectangle::square(x as f32, y as f32, side, Color::BLACK, MOVING_SQUARE_WIDTH),
            canvas,
        }
    }

    pub fn current(&self) -> &Rectangle {
        &self.square
    }

    /// Advance one frame and return the square's new placement.
    ///
    /// A step that would leave the canvas on an axis is reversed on that axis.
    pub fn step(&mut self, rng: &mut Rng32) -> Rectangle {
        let b = self.square.bounds();
        let dx = bounce(
            rng.range_i32(-MAX_STEP, MAX_STEP) as f32,
            b.min_x,
            b.max_x,
            self.canvas.width as f32,
        );
        let dy = bounce(
            rng.range_i32(-MAX_STEP, MAX_STEP) as f32,
            b.min_y,
            b.max_y,
            self.canvas.height as f32,
        );
        self.square.translate(dx, dy);
        self.square.clone()
    }
}

/// Flip `delta` if it would push `[min, max]` outside `[0, limit]`.
///
/// The flipped step is still clamped: on a canvas barely larger than the
/// square even the reverse direction may not have room for a full step.
fn bounce(delta: f32, min: f32, max: f32, limit: f32) -> f32 {
    let delta = if max + delta > limit || min + delta < 0.0 {
        -delta
    } else {
        delta
    };
    delta.clamp(-min, limit - max)
}

pub fn moving_square(n: usize, canvas: CanvasSize, rng: &mut Rng32) -> Vec<Rectangle> {
    let mut mover = MovingSquare::new(canvas, rng);
    (0..n).map(|_| mover.step(rng)).collect()
}

pub fn rectangles(strategy: Strategy, n: usize, canvas: CanvasSize, rng: &mut Rng32) -> Vec<Rectangle> {
    match strategy {
        Strategy::RandomRectangles => random_rectangles(n, canvas, rng),
        Strategy::MovingSquare => moving_square(n, canvas, rng),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategy_parses_short_and_long_names() {
        assert_eq!("random".parse(), Ok(Strategy::RandomRectangles));
        assert_eq!("moving_square".parse(), Ok(Strategy::MovingSquare));
        assert!(matches!(
            "spiral".parse::<Strategy>(),
            Err(ParseError::UnknownStrategy(_))
        ));
    }

    #[test]
    fn frame_count_validation() {
        assert_eq!(validate_frame_count(" 24 "), Ok(24));
        assert_eq!(validate_frame_count("0"), Err(ParseError::OutOfRange(0)));
        assert_eq!(
            validate_frame_count("1000001"),
            Err(ParseError::OutOfRange(1_000_001))
        );
        assert!(matches!(
            validate_frame_count("12a"),
            Err(ParseError::NotANumber(_))
        ));
    }

    #[test]
    fn rng_ranges_hold() {
        let mut rng = Rng32::from_seed(42);
        for _ in 0..1000 {
            let f = rng.range_f32(1.0, 20.0);
            assert!((1.0..20.0).contains(&f));
            let i = rng.range_i32(-MAX_STEP, MAX_STEP);
            assert!((-MAX_STEP..=MAX_STEP).contains(&i));
        }
    }

    #[test]
    fn same_seed_same_rectangles() {
        let canvas = CanvasSize::new(300, 300);
        let a = random_rectangles(5, canvas, &mut Rng32::from_seed(7));
        let b = random_rectangles(5, canvas, &mut Rng32::from_seed(7));
        assert_eq!(a, b);
    }

    #[test]
    fn random_rectangles_fit_the_canvas() {
        let canvas = CanvasSize::new(120, 90);
        for r in random_rectangles(200, canvas, &mut Rng32::from_seed(3)) {
            assert!(r.bounds().within(120.0, 90.0), "{r:?}");
            assert!((1.0..20.0).contains(&r.width));
            assert_eq!(r.color.a, 1.0);
        }
    }

    #[test]
    fn bounce_reverses_at_edges() {
        // No room either way: the step collapses to zero.
        assert_eq!(bounce(5.0, 0.0, 70.0, 72.0), 0.0);
        assert_eq!(bounce(5.0, 10.0, 80.0, 82.0), -5.0);
        assert_eq!(bounce(-5.0, 2.0, 72.0, 400.0), 5.0);
        assert_eq!(bounce(3.0, 10.0, 80.0, 400.0), 3.0);
    }

    #[test]
    fn moving_square_steps_are_small() {
        let canvas = CanvasSize::new(400, 600);
        let mut rng = Rng32::from_seed(11);
        let mut mover = MovingSquare::new(canvas, &mut rng);
        let mut prev = mover.current().bounds();
        for _ in 0..500 {
            let next = mover.step(&mut rng).bounds();
            assert!((next.min_x - prev.min_x).abs() <= MAX_STEP as f32);
            assert!((next.min_y - prev.min_y).abs() <= MAX_STEP as f32);
            assert_eq!(next.width(), prev.width());
            prev = next;
        }
    }
}
