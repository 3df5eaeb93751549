//! Thresholding a rendered cell into one byte per row.

use crate::canvas::Canvas;

/// Pack one row of at most 8 intensities. Column `c` maps to bit `7 - c`
/// and a pixel sets its bit when strictly brighter than `threshold`.
pub fn pack_row(row: &[u8], threshold: u8) -> u8 {
    row.iter()
        .take(8)
        .enumerate()
        .filter(|&(_, &px)| px > threshold)
        .fold(0u8, |byte, (col, _)| byte | (0x80 >> col))
}

/// Pack every row of `canvas`, top to bottom.
pub fn pack_canvas(canvas: &Canvas, threshold: u8) -> Vec<u8> {
    (0..canvas.height()).map(|y| pack_row(canvas.row(y), threshold)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use font::GlyphBitmap;

    #[test]
    fn msb_is_leftmost_column() {
        assert_eq!(pack_row(&[255, 0, 0, 0, 0, 0, 0, 0], 128), 0x80);
        assert_eq!(pack_row(&[0, 0, 0, 0, 0, 0, 0, 255], 128), 0x01);
        assert_eq!(pack_row(&[255; 8], 128), 0xFF);
        assert_eq!(pack_row(&[255, 0, 255, 0, 255, 0, 255, 0], 128), 0xAA);
    }

    #[test]
    fn threshold_is_strict() {
        assert_eq!(pack_row(&[128, 129, 0, 0, 0, 0, 0, 0], 128), 0x40);
        assert_eq!(pack_row(&[1], 0), 0x80);
        assert_eq!(pack_row(&[255], 255), 0x00);
    }

    #[test]
    fn narrow_rows_leave_low_bits_clear() {
        assert_eq!(pack_row(&[255, 255, 255, 255, 255], 128), 0xF8);
        assert_eq!(pack_row(&[], 128), 0x00);
    }

    #[test]
    fn canvas_packs_top_to_bottom() {
        let mut canvas = Canvas::new(8, 4);
        let dot = GlyphBitmap {
            width: 1,
            height: 1,
            bearing_x: 0,
            bearing_y: 0,
            advance: 0.0,
            data: vec![255],
        };
        canvas.draw_coverage(&dot, 0, 1, 255);
        canvas.draw_coverage(&dot, 7, 3, 255);
        assert_eq!(pack_canvas(&canvas, 128), vec![0x00, 0x80, 0x00, 0x01]);
    }
}
