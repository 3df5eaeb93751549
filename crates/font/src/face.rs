//! A loaded TrueType face.
//!
//! Owns the font bytes, keeps the parsed header tables, and resolves a
//! character all the way to a rasterized bitmap.

use core::fmt;
use core::ops::Range;
use std::path::Path;

use common::{Mat3x2, ParseError};

use crate::glyph::{GlyphDesc, GlyphOutline, parse_glyph};
use crate::rasterizer::{GlyphBitmap, rasterize_outline};
use crate::tables::{
    CmapFormat4, FontFile, HeadTable, HheaTable, MaxpTable, TableTag, get_glyph_offset,
    get_hmetric, parse_cmap,
};

/// Composite glyphs may reference composites; stop following after this many
/// levels so a cyclic reference cannot recurse forever.
const MAX_COMPOSITE_DEPTH: u32 = 8;

// ─────────────────────────────────────────────────────────────────────────────
// FaceError
// ─────────────────────────────────────────────────────────────────────────────

/// Errors raised while loading a face or reading one of its glyphs.
#[derive(Debug)]
pub enum FaceError {
    /// The font file could not be read.
    Io(std::io::Error),
    /// A table or glyph record is malformed.
    Parse(ParseError),
    /// A table every TrueType outline font must carry is absent.
    MissingTable(TableTag),
    /// Composite glyph references nest deeper than `MAX_COMPOSITE_DEPTH`.
    GlyphNesting(u16),
}

impl fmt::Display for FaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Parse(e) => write!(f, "parse error: {e}"),
            Self::MissingTable(tag) => write!(f, "missing {tag} table"),
            Self::GlyphNesting(gid) => write!(f, "composite glyph {gid} nests too deeply"),
        }
    }
}

impl std::error::Error for FaceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ParseError> for FaceError {
    fn from(e: ParseError) -> Self {
        Self::Parse(e)
    }
}

impl From<std::io::Error> for FaceError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// GlyphMetrics
// ─────────────────────────────────────────────────────────────────────────────

/// Pixel metrics of one character at a given size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlyphMetrics {
    /// Advance width in pixels (unrounded).
    pub advance: f32,
    /// Ink bounds snapped outward to whole pixels, y-up relative to the
    /// baseline. All zero for glyphs without an outline.
    pub ink_left: i32,
    pub ink_right: i32,
    pub ink_top: i32,
    pub ink_bottom: i32,
}

// ─────────────────────────────────────────────────────────────────────────────
// Face
// ─────────────────────────────────────────────────────────────────────────────

/// A TrueType face loaded into memory.
pub struct Face {
    data: Vec<u8>,
    head: HeadTable,
    hhea: HheaTable,
    maxp: MaxpTable,
    cmap: CmapFormat4,
    loca: Range<usize>,
    glyf: Range<usize>,
    hmtx: Range<usize>,
}

impl Face {
    /// Read and parse a TrueType font file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, FaceError> {
        let data = std::fs::read(path)?;
        Self::from_bytes(data)
    }

    /// Parse a TrueType font already in memory.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, FaceError> {
        // Everything borrowed from `data` is copied out before it moves
        // into the struct.
        let (head, hhea, maxp, cmap, loca, glyf, hmtx) = {
            let ff = FontFile::parse(&data)?;
            let table = |tag| ff.table_data(tag).ok_or(FaceError::MissingTable(tag));
            let range = |tag| {
                ff.find_table(tag)
                    .map(|rec| rec.range())
                    .ok_or(FaceError::MissingTable(tag))
            };

            let head = HeadTable::parse(table(TableTag::HEAD)?)?;
            let hhea = HheaTable::parse(table(TableTag::HHEA)?)?;
            let maxp = MaxpTable::parse(table(TableTag::MAXP)?)?;
            let cmap = parse_cmap(table(TableTag::CMAP)?)?;

            (
                head,
                hhea,
                maxp,
                cmap,
                range(TableTag::LOCA)?,
                range(TableTag::GLYF)?,
                range(TableTag::HMTX)?,
            )
        };

        Ok(Face { data, head, hhea, maxp, cmap, loca, glyf, hmtx })
    }

    fn loca_data(&self) -> &[u8] {
        &self.data[self.loca.clone()]
    }

    fn glyf_data(&self) -> &[u8] {
        &self.data[self.glyf.clone()]
    }

    fn hmtx_data(&self) -> &[u8] {
        &self.data[self.hmtx.clone()]
    }

    pub fn units_per_em(&self) -> u16 {
        self.head.units_per_em
    }

    pub fn num_glyphs(&self) -> u16 {
        self.maxp.num_glyphs
    }

    fn scale(&self, size_px: f32) -> f32 {
        size_px / self.head.units_per_em as f32
    }

    /// Ascender in pixels (distance from the baseline up to the line top).
    pub fn ascent(&self, size_px: f32) -> f32 {
        self.hhea.ascender as f32 * self.scale(size_px)
    }

    /// Descender in pixels (negative below the baseline).
    pub fn descent(&self, size_px: f32) -> f32 {
        self.hhea.descender as f32 * self.scale(size_px)
    }

    /// Line height (ascender − descender + line gap) in pixels.
    pub fn line_height(&self, size_px: f32) -> f32 {
        (self.hhea.ascender as f32 - self.hhea.descender as f32 + self.hhea.line_gap as f32)
            * self.scale(size_px)
    }

    /// Map a character to its glyph id. Characters outside the BMP and
    /// unmapped characters give glyph 0 (`.notdef`).
    pub fn glyph_index(&self, ch: char) -> u16 {
        u16::try_from(u32::from(ch)).map_or(0, |cp| self.cmap.lookup(cp))
    }

    /// Advance width of a glyph in font units.
    pub fn advance_width(&self, glyph_id: u16) -> Result<u16, FaceError> {
        Ok(get_hmetric(self.hmtx_data(), glyph_id, self.hhea.num_h_metrics)?.advance_width)
    }

    /// The outline of a glyph in font units, with composite glyphs resolved
    /// into a single outline. `None` for glyphs with no contours.
    pub fn outline(&self, glyph_id: u16) -> Result<Option<GlyphOutline>, FaceError> {
        let mut outline = GlyphOutline::empty();
        self.append_outline(glyph_id, Mat3x2::IDENTITY, 0, &mut outline)?;
        Ok((!outline.is_empty()).then_some(outline))
    }

    fn append_outline(
        &self,
        glyph_id: u16,
        transform: Mat3x2,
        depth: u32,
        out: &mut GlyphOutline,
    ) -> Result<(), FaceError> {
        if depth > MAX_COMPOSITE_DEPTH {
            return Err(FaceError::GlyphNesting(glyph_id));
        }
        if glyph_id >= self.maxp.num_glyphs {
            return Err(ParseError::InvalidValue("glyph id out of range").into());
        }

        let (start, end) = get_glyph_offset(self.loca_data(), glyph_id, self.head.index_to_loc_format)?;
        let glyph_data = self
            .glyf_data()
            .get(start as usize..end as usize)
            .ok_or(ParseError::LengthOutOfRange("glyph outside glyf table"))?;

        match parse_glyph(glyph_data)? {
            GlyphDesc::Empty => {}
            GlyphDesc::Simple(outline) => out.append_transformed(&outline, transform),
            GlyphDesc::Composite(components) => {
                for component in components {
                    let nested = component.transform.then(transform);
                    self.append_outline(component.glyph_id, nested, depth + 1, out)?;
                }
            }
        }
        Ok(())
    }

    /// Advance and pixel-snapped ink bounds of `ch` at `size_px`.
    pub fn metrics(&self, ch: char, size_px: f32) -> Result<GlyphMetrics, FaceError> {
        let glyph_id = self.glyph_index(ch);
        let scale = self.scale(size_px);
        let advance = self.advance_width(glyph_id)? as f32 * scale;

        let metrics = match self.outline(glyph_id)? {
            Some(o) => GlyphMetrics {
                advance,
                ink_left: (o.x_min as f32 * scale).floor() as i32,
                ink_right: (o.x_max as f32 * scale).ceil() as i32,
                ink_top: (o.y_max as f32 * scale).ceil() as i32,
                ink_bottom: (o.y_min as f32 * scale).floor() as i32,
            },
            None => GlyphMetrics { advance, ink_left: 0, ink_right: 0, ink_top: 0, ink_bottom: 0 },
        };
        Ok(metrics)
    }

    /// Rasterize `ch` at `size_px`. Whitespace and unmapped characters with
    /// an empty `.notdef` give an empty bitmap carrying only the advance.
    pub fn rasterize(&self, ch: char, size_px: f32) -> Result<GlyphBitmap, FaceError> {
        let glyph_id = self.glyph_index(ch);
        let advance = self.advance_width(glyph_id)? as f32 * self.scale(size_px);

        let mut bitmap = match self.outline(glyph_id)? {
            Some(outline) => rasterize_outline(&outline, size_px, self.head.units_per_em),
            None => GlyphBitmap::empty(0.0),
        };
        bitmap.advance = advance;
        Ok(bitmap)
    }
}

impl fmt::Debug for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Face")
            .field("len", &self.data.len())
            .field("units_per_em", &self.head.units_per_em)
            .field("num_glyphs", &self.maxp.num_glyphs)
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::{Component, FontBuilder, rect};

    /// upem 16, so at 16px one font unit is one pixel.
    fn sample_face() -> Face {
        let mut fb = FontBuilder::new(16, 12, -4);
        let bar = fb.glyph(8, vec![rect(0, 0, 1, 12)]);
        let space = fb.glyph(8, Vec::new());
        let low = fb.glyph(8, vec![rect(2, -4, 6, 3)]);
        let pair = fb.composite(8, vec![
            Component { glyph_id: bar, dx: 0, dy: 0 },
            Component { glyph_id: bar, dx: 7, dy: -2 },
        ]);
        fb.map('|', bar).map(' ', space).map('g', low).map('"', pair);
        Face::from_bytes(fb.build()).unwrap()
    }

    #[test]
    fn load_rejects_non_font() {
        let err = Face::from_bytes(b"definitely not a font".to_vec()).unwrap_err();
        assert!(matches!(err, FaceError::Parse(_)));
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = Face::load("/nonexistent/dir/font.ttf").unwrap_err();
        assert!(matches!(err, FaceError::Io(_)));
    }

    #[test]
    fn header_metrics() {
        let face = sample_face();
        assert_eq!(face.units_per_em(), 16);
        assert_eq!(face.num_glyphs(), 5);
        assert_eq!(face.ascent(16.0), 12.0);
        assert_eq!(face.descent(16.0), -4.0);
        assert_eq!(face.line_height(8.0), 8.0);
    }

    #[test]
    fn glyph_index_maps_and_falls_back_to_notdef() {
        let face = sample_face();
        assert_eq!(face.glyph_index('|'), 1);
        assert_eq!(face.glyph_index('g'), 3);
        assert_eq!(face.glyph_index('Z'), 0);
        assert_eq!(face.glyph_index('\u{1F600}'), 0);
    }

    #[test]
    fn metrics_of_ink_and_whitespace() {
        let face = sample_face();
        let m = face.metrics('g', 16.0).unwrap();
        assert_eq!(m.advance, 8.0);
        assert_eq!((m.ink_left, m.ink_right, m.ink_top, m.ink_bottom), (2, 6, 3, -4));

        let m = face.metrics(' ', 16.0).unwrap();
        assert_eq!(m.advance, 8.0);
        assert_eq!((m.ink_top, m.ink_bottom), (0, 0));
    }

    #[test]
    fn rasterize_simple_glyph() {
        let face = sample_face();
        let bmp = face.rasterize('|', 16.0).unwrap();
        assert_eq!((bmp.width, bmp.height), (1, 12));
        assert_eq!((bmp.bearing_x, bmp.bearing_y), (0, 12));
        assert_eq!(bmp.advance, 8.0);
        assert!(bmp.data.iter().all(|&a| a == 255));
    }

    #[test]
    fn rasterize_space_is_empty() {
        let face = sample_face();
        let bmp = face.rasterize(' ', 16.0).unwrap();
        assert!(bmp.is_empty());
        assert_eq!(bmp.advance, 8.0);
    }

    #[test]
    fn composite_glyph_resolves_components() {
        let face = sample_face();
        let outline = face.outline(face.glyph_index('"')).unwrap().unwrap();
        assert_eq!(outline.contours.len(), 2);
        assert_eq!((outline.x_min, outline.y_min, outline.x_max, outline.y_max), (0, -2, 8, 12));

        let bmp = face.rasterize('"', 16.0).unwrap();
        assert_eq!((bmp.width, bmp.height), (8, 14));
        // Left bar spans font y 0..12, right bar -2..10.
        assert_eq!(bmp.alpha(0, 0), 255);
        assert_eq!(bmp.alpha(7, 0), 0);
        assert_eq!(bmp.alpha(7, 13), 255);
        assert_eq!(bmp.alpha(0, 13), 0);
    }

    #[test]
    fn self_referencing_composite_is_rejected() {
        let mut fb = FontBuilder::new(16, 12, -4);
        // Glyph 1 references itself.
        let looped = fb.composite(8, vec![Component { glyph_id: 1, dx: 0, dy: 0 }]);
        fb.map('x', looped);
        let face = Face::from_bytes(fb.build()).unwrap();
        assert!(matches!(face.outline(looped), Err(FaceError::GlyphNesting(_))));
    }
}
