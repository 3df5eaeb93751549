//! Drawing one character, centred, into a blank cell.

use font::{Face, FaceError};
use log::debug;

use crate::canvas::Canvas;
use crate::config::RomConfig;

/// Foreground intensity of rendered glyphs.
pub const FOREGROUND: u8 = 255;

/// The box a single character occupies when drawn at `size_px`, in whole
/// pixels: (advance width, ascent plus any ink below the baseline).
pub fn text_size(face: &Face, ch: char, size_px: f32) -> Result<(i32, i32), FaceError> {
    let metrics = face.metrics(ch, size_px)?;
    let width = metrics.advance.round() as i32;
    let height = face.ascent(size_px).ceil() as i32 + (-metrics.ink_bottom).max(0);
    Ok((width, height))
}

/// Render `ch` into a fresh `cell_width × cell_height` canvas.
///
/// The text box is centred with `max(0, (cell - size) / 2)` on each axis and
/// the baseline sits one ascent below its top. Ink outside the cell is
/// dropped.
pub fn render_glyph(face: &Face, ch: char, config: &RomConfig) -> Result<Canvas, FaceError> {
    let size_px = config.point_size as f32;
    let (width, height) = text_size(face, ch, size_px)?;
    let x = ((config.cell_width as i32 - width) / 2).max(0);
    let y = ((config.cell_height as i32 - height) / 2).max(0);
    let baseline = y + face.ascent(size_px).ceil() as i32;

    let bitmap = face.rasterize(ch, size_px)?;
    let mut canvas = Canvas::new(config.cell_width, config.cell_height);
    let clipped = canvas.draw_coverage(
        &bitmap,
        x + bitmap.bearing_x,
        baseline - bitmap.bearing_y,
        FOREGROUND,
    );
    if clipped {
        debug!(
            "glyph {ch:?} ({width}x{height} px at size {size_px}) clipped to {}x{} cell",
            config.cell_width, config.cell_height
        );
    }
    Ok(canvas)
}

#[cfg(test)]
mod tests {
    use super::*;
    use font::synth::{FontBuilder, rect};

    /// upem 16, ascender 12, descender -4: at 16px one unit is one pixel and
    /// the line exactly fills a 16px cell.
    fn face() -> Face {
        let mut fb = FontBuilder::new(16, 12, -4);
        let block = fb.glyph(8, vec![rect(0, -4, 8, 12)]);
        let cap = fb.glyph(6, vec![rect(0, 0, 2, 10)]);
        let wide = fb.glyph(20, vec![rect(0, -10, 20, 20)]);
        let blank = fb.glyph(8, Vec::new());
        fb.map('#', block).map('I', cap).map('W', wide).map(' ', blank);
        Face::from_bytes(fb.build()).unwrap()
    }

    fn config() -> RomConfig {
        RomConfig { point_size: 16, ..RomConfig::default() }
    }

    #[test]
    fn text_size_counts_descent_only_when_inked() {
        let face = face();
        assert_eq!(text_size(&face, '#', 16.0).unwrap(), (8, 16));
        assert_eq!(text_size(&face, 'I', 16.0).unwrap(), (6, 12));
        assert_eq!(text_size(&face, ' ', 16.0).unwrap(), (8, 12));
    }

    #[test]
    fn full_block_fills_cell() {
        let canvas = render_glyph(&face(), '#', &config()).unwrap();
        assert!((0..16).all(|y| canvas.row(y).iter().all(|&p| p == FOREGROUND)));
    }

    #[test]
    fn narrow_glyph_is_centred() {
        // Box 6x12 in an 8x16 cell: x = 1, y = 2, baseline = 14.
        let canvas = render_glyph(&face(), 'I', &config()).unwrap();
        for y in 0..16 {
            let inked = (4..14).contains(&y);
            assert_eq!(canvas.pixel(0, y), 0, "row {y}");
            assert_eq!(canvas.pixel(1, y) == FOREGROUND, inked, "row {y}");
            assert_eq!(canvas.pixel(2, y) == FOREGROUND, inked, "row {y}");
            assert_eq!(canvas.pixel(3, y), 0, "row {y}");
        }
    }

    #[test]
    fn oversized_glyph_is_clipped_not_rejected() {
        let canvas = render_glyph(&face(), 'W', &config()).unwrap();
        assert_eq!((canvas.width(), canvas.height()), (8, 16));
        assert!((0..16).all(|y| canvas.row(y).iter().all(|&p| p == FOREGROUND)));
    }

    #[test]
    fn blank_and_unmapped_render_empty() {
        let face = face();
        let empty = Canvas::new(8, 16);
        assert_eq!(render_glyph(&face, ' ', &config()).unwrap(), empty);
        assert_eq!(render_glyph(&face, '~', &config()).unwrap(), empty);
    }
}
