//! Renderer: the deterministic rasterizer.
//!
//! Turns an ordered figure list into a bitmap snapshot. Figures are painted
//! in list order onto a transparent canvas; later figures paint over earlier
//! ones and erase strokes clear what has been composited beneath them.
//!
//! The renderer is pure and stateless. Given the same input, it always
//! produces the same output. It knows nothing about frames, history or
//! playback.

use image::{Rgba, RgbaImage};
use tiny_skia::Pixmap;

use crate::figures::Figure;
use crate::types::CanvasSize;

/// Straight-alpha RGBA snapshot of a frame.
pub type Bitmap = RgbaImage;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("canvas must be non-empty, got {width}x{height}")]
    EmptyCanvas { width: u32, height: u32 },
    #[error("could not allocate a {width}x{height} canvas")]
    Allocation { width: u32, height: u32 },
}

/// Something that can turn figures into pixels.
///
/// Implementations receive an owned-or-borrowed snapshot of the figures and
/// must never reach back into live frame state, so they may run on any
/// thread.
pub trait Rasterizer {
    fn render(&self, figures: &[Figure], size: CanvasSize) -> Result<Bitmap, RenderError>;
}

/// CPU rasterizer backed by tiny-skia.
#[derive(Debug, Clone, Copy, Default)]
pub struct Renderer;

impl Rasterizer for Renderer {
    fn render(&self, figures: &[Figure], size: CanvasSize) -> Result<Bitmap, RenderError> {
        let CanvasSize { width, height } = size;
        if width == 0 || height == 0 {
            return Err(RenderError::EmptyCanvas { width, height });
        }
        let mut pixmap =
            Pixmap::new(width, height).ok_or(RenderError::Allocation { width, height })?;

        for figure in figures {
            figure.draw(&mut pixmap);
        }

        Ok(to_bitmap(&pixmap))
    }
}

/// Convert tiny-skia's premultiplied pixels to straight alpha.
fn to_bitmap(pixmap: &Pixmap) -> Bitmap {
    let mut bitmap = RgbaImage::new(pixmap.width(), pixmap.height());
    for (dst, src) in bitmap.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }
    bitmap
}

/// A fully transparent bitmap, used where a frame has nothing to show yet.
pub fn blank(size: CanvasSize) -> Bitmap {
    RgbaImage::new(size.width, size.height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::figures::{Line, Rectangle};
    use crate::types::{Color, DrawingMode, Point};

    const SIZE: CanvasSize = CanvasSize::new(40, 40);

    fn horizontal(mode: DrawingMode, color: Color) -> Figure {
        Figure::Line(Line {
            points: vec![Point::new(0.0, 20.0), Point::new(40.0, 20.0)],
            color,
            width: 6.0,
            mode,
        })
    }

    fn alpha_at(bitmap: &Bitmap, x: u32, y: u32) -> u8 {
        bitmap.get_pixel(x, y).0[3]
    }

    #[test]
    fn empty_figure_list_is_transparent() {
        let bitmap = Renderer.render(&[], SIZE).unwrap();
        assert_eq!(bitmap.dimensions(), (40, 40));
        assert!(bitmap.pixels().all(|p| p.0[3] == 0));
    }

    #[test]
    fn zero_sized_canvas_is_an_error() {
        let err = Renderer.render(&[], CanvasSize::new(0, 10)).unwrap_err();
        assert_eq!(err, RenderError::EmptyCanvas { width: 0, height: 10 });
    }

    #[test]
    fn draw_stroke_paints_its_color() {
        let bitmap = Renderer
            .render(&[horizontal(DrawingMode::Draw, Color::rgb(1.0, 0.0, 0.0))], SIZE)
            .unwrap();
        assert_eq!(bitmap.get_pixel(20, 20).0, [255, 0, 0, 255]);
        assert_eq!(alpha_at(&bitmap, 20, 2), 0);
    }

    #[test]
    fn erase_after_draw_removes_content() {
        let figures = [
            horizontal(DrawingMode::Draw, Color::BLACK),
            horizontal(DrawingMode::Erase, Color::BLACK),
        ];
        let bitmap = Renderer.render(&figures, SIZE).unwrap();
        assert_eq!(alpha_at(&bitmap, 20, 20), 0);
    }

    #[test]
    fn draw_after_erase_restores_content() {
        let figures = [
            horizontal(DrawingMode::Draw, Color::BLACK),
            horizontal(DrawingMode::Erase, Color::BLACK),
            horizontal(DrawingMode::Draw, Color::rgb(0.0, 0.0, 1.0)),
        ];
        let bitmap = Renderer.render(&figures, SIZE).unwrap();
        assert_eq!(bitmap.get_pixel(20, 20).0, [0, 0, 255, 255]);
    }

    #[test]
    fn rectangle_is_stroked_not_filled() {
        let rect = Figure::from(Rectangle::square(5.0, 5.0, 30.0, Color::BLACK, 2.0));
        let bitmap = Renderer.render(&[rect], SIZE).unwrap();
        assert_eq!(alpha_at(&bitmap, 5, 20), 255);
        assert_eq!(alpha_at(&bitmap, 20, 20), 0);
    }

    #[test]
    fn rendering_is_deterministic() {
        let figures = [
            horizontal(DrawingMode::Draw, Color::rgb(0.2, 0.4, 0.6)),
            Figure::from(Rectangle::square(3.0, 3.0, 20.0, Color::rgba(0.1, 0.9, 0.3, 0.5), 4.0)),
        ];
        let a = Renderer.render(&figures, SIZE).unwrap();
        let b = Renderer.render(&figures, SIZE).unwrap();
        assert_eq!(a, b);
    }
}
