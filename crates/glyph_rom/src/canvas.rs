//! The fixed-size cell a glyph is drawn into.

use font::GlyphBitmap;

/// A W×H grid of 8-bit intensities, background 0.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Canvas {
    /// Create a blank canvas.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Intensity at `(x, y)`; 0 outside the canvas.
    pub fn pixel(&self, x: u32, y: u32) -> u8 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        self.pixels[y as usize * self.width as usize + x as usize]
    }

    /// One row of intensities.
    pub fn row(&self, y: u32) -> &[u8] {
        let start = y as usize * self.width as usize;
        &self.pixels[start..start + self.width as usize]
    }

    /// Draw a coverage bitmap with its top-left corner at `(x, y)`, painting
    /// `fill` scaled by each pixel's coverage. Overlaps keep the brighter value.
    ///
    /// Only the intersection of the bitmap rectangle and the canvas rectangle
    /// is written; anything outside is dropped. Returns `true` if some inked
    /// pixel fell outside the canvas.
    pub fn draw_coverage(&mut self, bitmap: &GlyphBitmap, x: i32, y: i32, fill: u8) -> bool {
        let x0 = i64::from(x).max(0);
        let y0 = i64::from(y).max(0);
        let x1 = (i64::from(x) + i64::from(bitmap.width)).min(i64::from(self.width));
        let y1 = (i64::from(y) + i64::from(bitmap.height)).min(i64::from(self.height));

        let mut drawn = 0usize;
        for cy in y0..y1.max(y0) {
            for cx in x0..x1.max(x0) {
                let alpha = bitmap.alpha((cx - i64::from(x)) as u32, (cy - i64::from(y)) as u32);
                if alpha == 0 {
                    continue;
                }
                drawn += 1;
                let value = ((u32::from(alpha) * u32::from(fill) + 127) / 255) as u8;
                let idx = cy as usize * self.width as usize + cx as usize;
                self.pixels[idx] = self.pixels[idx].max(value);
            }
        }

        let inked = bitmap.data.iter().filter(|&&a| a != 0).count();
        drawn < inked
    }
}
