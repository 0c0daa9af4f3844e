//! In-memory RGB framebuffer.
//!
//! Channels are kept as `f32` so that repeated low-alpha overlays fade
//! trails smoothly instead of stalling on 8-bit rounding.

use crate::visual::surface::{Color, Point, Surface};

/// Background of a fresh canvas.
pub const CANVAS_BACKGROUND: Color = Color::rgb(0x1a, 0x1a, 0x2e);

/// A width × height RGB image with source-over alpha blending.
#[derive(Debug, Clone)]
pub struct Raster {
    width: usize,
    height: usize,
    pixels: Vec<[f32; 3]>,
}

impl Raster {
    pub fn new(width: usize, height: usize) -> Self {
        Self::with_background(width, height, CANVAS_BACKGROUND)
    }

    pub fn with_background(width: usize, height: usize, background: Color) -> Self {
        let fill = [background.r as f32, background.g as f32, background.b as f32];
        Self {
            width,
            height,
            pixels: vec![fill; width * height],
        }
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Pixel at (x, y), rounded to 8-bit channels.
    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let [r, g, b] = self.pixels[y * self.width + x];
        Some([to_byte(r), to_byte(g), to_byte(b)])
    }

    /// Encode as binary PPM (P6).
    pub fn to_ppm(&self) -> Vec<u8> {
        let header = format!("P6\n{} {}\n255\n", self.width, self.height);
        let mut out = Vec::with_capacity(header.len() + self.pixels.len() * 3);
        out.extend_from_slice(header.as_bytes());
        for [r, g, b] in &self.pixels {
            out.extend_from_slice(&[to_byte(*r), to_byte(*g), to_byte(*b)]);
        }
        out
    }

    fn blend(&mut self, x: usize, y: usize, color: Color) {
        let a = color.a as f32;
        let px = &mut self.pixels[y * self.width + x];
        px[0] = color.r as f32 * a + px[0] * (1.0 - a);
        px[1] = color.g as f32 * a + px[1] * (1.0 - a);
        px[2] = color.b as f32 * a + px[2] * (1.0 - a);
    }

    /// Blend every pixel whose center lies at a distance in [inner, outer] from `center`.
    fn blend_annulus(&mut self, center: Point, inner: f64, outer: f64, color: Color) {
        if outer <= 0.0 || self.width == 0 || self.height == 0 {
            return;
        }
        let x0 = (center.x - outer).floor().max(0.0) as usize;
        let y0 = (center.y - outer).floor().max(0.0) as usize;
        let x1 = ((center.x + outer).ceil().max(0.0) as usize).min(self.width - 1);
        let y1 = ((center.y + outer).ceil().max(0.0) as usize).min(self.height - 1);

        let (inner_sq, outer_sq) = (inner.max(0.0).powi(2), outer * outer);
        for y in y0..=y1 {
            for x in x0..=x1 {
                let dx = x as f64 + 0.5 - center.x;
                let dy = y as f64 + 0.5 - center.y;
                let d = dx * dx + dy * dy;
                if d >= inner_sq && d <= outer_sq {
                    self.blend(x, y, color);
                }
            }
        }
    }
}

fn to_byte(channel: f32) -> u8 {
    channel.round().clamp(0.0, 255.0) as u8
}

impl Surface for Raster {
    fn width(&self) -> f64 {
        self.width as f64
    }

    fn height(&self) -> f64 {
        self.height as f64
    }

    fn fill_rect(&mut self, color: Color) {
        for y in 0..self.height {
            for x in 0..self.width {
                self.blend(x, y, color);
            }
        }
    }

    fn fill_circle(&mut self, center: Point, radius: f64, color: Color) {
        self.blend_annulus(center, 0.0, radius, color);
    }

    fn stroke_circle(&mut self, center: Point, radius: f64, line_width: f64, color: Color) {
        let half = line_width / 2.0;
        self.blend_annulus(center, radius - half, radius + half, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_raster_has_background() {
        let raster = Raster::new(4, 3);
        assert_eq!(raster.dimensions(), (4, 3));
        assert_eq!(raster.pixel(3, 2), Some([0x1a, 0x1a, 0x2e]));
        assert_eq!(raster.pixel(4, 0), None);
    }

    #[test]
    fn test_translucent_fill_fades_toward_color() {
        let mut raster = Raster::with_background(2, 2, Color::rgb(0, 0, 0));
        let overlay = Color::rgb(200, 100, 0).with_alpha(0.1);

        raster.fill_rect(overlay);
        assert_eq!(raster.pixel(0, 0), Some([20, 10, 0]));

        for _ in 0..200 {
            raster.fill_rect(overlay);
        }
        assert_eq!(raster.pixel(1, 1), Some([200, 100, 0]));
    }

    #[test]
    fn test_fill_circle_is_clipped() {
        let mut raster = Raster::with_background(10, 10, Color::rgb(0, 0, 0));
        raster.fill_circle(Point::new(0.0, 0.0), 3.0, Color::rgb(255, 255, 255));

        assert_eq!(raster.pixel(0, 0), Some([255, 255, 255]));
        assert_eq!(raster.pixel(9, 9), Some([0, 0, 0]));
    }

    #[test]
    fn test_stroke_circle_leaves_center_untouched() {
        let mut raster = Raster::with_background(41, 41, Color::rgb(0, 0, 0));
        raster.stroke_circle(Point::new(20.5, 20.5), 15.0, 2.0, Color::rgb(0, 0, 255));

        assert_eq!(raster.pixel(20, 20), Some([0, 0, 0]));
        assert_eq!(raster.pixel(35, 20), Some([0, 0, 255]));
    }

    #[test]
    fn test_ppm_encoding() {
        let raster = Raster::with_background(2, 1, Color::rgb(1, 2, 3));
        let ppm = raster.to_ppm();
        let header = b"P6\n2 1\n255\n";

        assert!(ppm.starts_with(header));
        assert_eq!(&ppm[header.len()..], &[1, 2, 3, 1, 2, 3]);
    }
}
