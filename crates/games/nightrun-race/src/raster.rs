//! Software scanline rasterizer for [`DrawList`]s.

use std::io::{self, Write};

use crate::palette::{self, Rgb};
use crate::render::{DrawCommand, DrawList, RectPart, Span, SpriteCommand};

/// An RGB pixel grid, row-major from the top-left.
#[derive(Debug, Clone, PartialEq)]
pub struct Framebuffer {
    width: usize,
    height: usize,
    pixels: Vec<Rgb>,
}

/// Clamp a float coordinate into `[0, limit]` as a pixel index.
fn clamp_px(v: f32, limit: usize) -> usize {
    if v.is_nan() {
        return 0;
    }
    v.clamp(0.0, limit as f32) as usize
}

impl Framebuffer {
    pub fn new(width: u32, height: u32) -> Self {
        let (width, height) = (width as usize, height as usize);
        Self {
            width,
            height,
            pixels: vec![palette::BLACK; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgb> {
        if x < self.width && y < self.height {
            Some(self.pixels[y * self.width + x])
        } else {
            None
        }
    }

    /// Rasterize a whole frame, resizing to the list's dimensions if needed.
    pub fn draw(&mut self, list: &DrawList) {
        if self.width != list.width as usize || self.height != list.height as usize {
            *self = Framebuffer::new(list.width, list.height);
        }
        for command in &list.commands {
            match command {
                DrawCommand::Fill(color) => self.pixels.fill(*color),
                DrawCommand::Rect(rect) => self.fill_rect(rect, self.height as f32),
                DrawCommand::Trapezoid { near, far, color } => self.fill_trapezoid(near, far, *color),
                DrawCommand::Circle {
                    center,
                    radius,
                    color,
                } => self.fill_circle(center.x, center.y, *radius, *color),
                DrawCommand::Sprite(sprite) => self.draw_sprite(sprite),
            }
        }
    }

    fn blend_row(&mut self, y: usize, x0: usize, x1: usize, color: Rgb, alpha: f32) {
        let row = &mut self.pixels[y * self.width..(y + 1) * self.width];
        for px in &mut row[x0.min(x1)..x1] {
            *px = if alpha >= 1.0 { color } else { px.blend(color, alpha) };
        }
    }

    /// Pixel centers inside `[min, max)`, rows limited to above `clip_y`.
    fn fill_rect(&mut self, rect: &RectPart, clip_y: f32) {
        let x0 = clamp_px((rect.min.x - 0.5).ceil(), self.width);
        let x1 = clamp_px((rect.max.x - 0.5).ceil(), self.width);
        let y0 = clamp_px((rect.min.y - 0.5).ceil(), self.height);
        let y1 = clamp_px((rect.max.y.min(clip_y) - 0.5).ceil(), self.height);
        for y in y0..y1 {
            self.blend_row(y, x0, x1, rect.color, rect.alpha);
        }
    }

    fn fill_trapezoid(&mut self, near: &Span, far: &Span, color: Rgb) {
        let span_y = near.y - far.y;
        if span_y <= 0.0 {
            return;
        }
        let y0 = clamp_px((far.y - 0.5).ceil(), self.height);
        let y1 = clamp_px((near.y - 0.5).ceil(), self.height);
        for y in y0..y1 {
            let t = (y as f32 + 0.5 - far.y) / span_y;
            let cx = far.x + (near.x - far.x) * t;
            let hw = far.half_width + (near.half_width - far.half_width) * t;
            let x0 = clamp_px((cx - hw - 0.5).ceil(), self.width);
            let x1 = clamp_px((cx + hw - 0.5).ceil(), self.width);
            self.blend_row(y, x0, x1, color, 1.0);
        }
    }

    fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Rgb) {
        let y0 = clamp_px((cy - radius - 0.5).ceil(), self.height);
        let y1 = clamp_px((cy + radius - 0.5).ceil(), self.height);
        for y in y0..y1 {
            let dy = y as f32 + 0.5 - cy;
            let half = (radius * radius - dy * dy).max(0.0).sqrt();
            let x0 = clamp_px((cx - half - 0.5).ceil(), self.width);
            let x1 = clamp_px((cx + half - 0.5).ceil(), self.width);
            self.blend_row(y, x0, x1, color, 1.0);
        }
    }

    fn draw_sprite(&mut self, sprite: &SpriteCommand) {
        for part in sprite.parts() {
            self.fill_rect(&part, sprite.clip_y);
        }
    }

    /// Binary PPM (P6).
    pub fn write_ppm<W: Write>(&self, mut out: W) -> io::Result<()> {
        write!(out, "P6\n{} {}\n255\n", self.width, self.height)?;
        let mut bytes = Vec::with_capacity(self.pixels.len() * 3);
        for px in &self.pixels {
            bytes.extend_from_slice(&[px.r, px.g, px.b]);
        }
        out.write_all(&bytes)?;
        out.flush()
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;

    fn list(commands: Vec<DrawCommand>) -> DrawList {
        DrawList {
            width: 8,
            height: 8,
            commands,
        }
    }

    #[test]
    fn fill_covers_everything() {
        let mut fb = Framebuffer::new(8, 8);
        fb.draw(&list(vec![DrawCommand::Fill(palette::WHITE)]));
        assert!((0..8).all(|y| (0..8).all(|x| fb.pixel(x, y) == Some(palette::WHITE))));
    }

    #[test]
    fn rect_is_half_open() {
        let mut fb = Framebuffer::new(8, 8);
        fb.draw(&list(vec![DrawCommand::Rect(RectPart {
            min: Vec2::new(2.0, 2.0),
            max: Vec2::new(4.0, 4.0),
            color: palette::WHITE,
            alpha: 1.0,
        })]));
        assert_eq!(fb.pixel(2, 2), Some(palette::WHITE));
        assert_eq!(fb.pixel(3, 3), Some(palette::WHITE));
        assert_eq!(fb.pixel(4, 4), Some(palette::BLACK));
        assert_eq!(fb.pixel(1, 2), Some(palette::BLACK));
    }

    #[test]
    fn translucent_rect_blends() {
        let mut fb = Framebuffer::new(8, 8);
        fb.draw(&list(vec![DrawCommand::Rect(RectPart {
            min: Vec2::ZERO,
            max: Vec2::new(8.0, 8.0),
            color: palette::WHITE,
            alpha: 0.5,
        })]));
        assert_eq!(fb.pixel(0, 0).map(|p| p.r), Some(128));
    }

    #[test]
    fn trapezoid_narrows_upward() {
        let mut fb = Framebuffer::new(8, 8);
        fb.draw(&list(vec![DrawCommand::Trapezoid {
            near: Span {
                x: 4.0,
                y: 8.0,
                half_width: 4.0,
            },
            far: Span {
                x: 4.0,
                y: 0.0,
                half_width: 0.0,
            },
            color: palette::WHITE,
        }]));
        assert_eq!(fb.pixel(0, 7), Some(palette::WHITE));
        assert_eq!(fb.pixel(0, 0), Some(palette::BLACK));
        assert_eq!(fb.pixel(5, 1), Some(palette::BLACK));
        assert_eq!(fb.pixel(3, 2), Some(palette::WHITE));
    }

    #[test]
    fn offscreen_geometry_is_clamped() {
        let mut fb = Framebuffer::new(8, 8);
        fb.draw(&list(vec![
            DrawCommand::Rect(RectPart {
                min: Vec2::new(-1e9, -1e9),
                max: Vec2::new(-5.0, 1e9),
                color: palette::WHITE,
                alpha: 1.0,
            }),
            DrawCommand::Rect(RectPart {
                min: Vec2::splat(f32::NAN),
                max: Vec2::splat(f32::NAN),
                color: palette::WHITE,
                alpha: 1.0,
            }),
            DrawCommand::Circle {
                center: Vec2::new(-50.0, -50.0),
                radius: 3.0,
                color: palette::WHITE,
            },
        ]));
        assert_eq!(fb.pixel(3, 3), Some(palette::BLACK));
    }

    #[test]
    fn ppm_header_and_size() {
        let fb = Framebuffer::new(4, 2);
        let mut out = Vec::new();
        fb.write_ppm(&mut out).unwrap();
        let header = b"P6\n4 2\n255\n";
        assert!(out.starts_with(header));
        assert_eq!(out.len(), header.len() + 4 * 2 * 3);
    }
}
