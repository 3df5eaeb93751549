//! In-memory TrueType font builder.
//!
//! Produces small but structurally valid `.ttf` files (head, hhea, maxp,
//! cmap format 4, long loca, glyf, hmtx) from rectangles and point lists, so
//! parsing and rendering can be tested against real font bytes without
//! binary fixtures. Coordinates must fit in `i16`.

use std::collections::BTreeMap;

use crate::glyph::{
    ARG_1_AND_2_ARE_WORDS, ARGS_ARE_XY_VALUES, MORE_COMPONENTS, ON_CURVE_POINT, OutlinePoint,
};

/// An on-curve point.
pub fn on(x: i32, y: i32) -> OutlinePoint {
    OutlinePoint { x, y, on_curve: true }
}

/// An off-curve (quadratic control) point.
pub fn off(x: i32, y: i32) -> OutlinePoint {
    OutlinePoint { x, y, on_curve: false }
}

/// A counter-clockwise rectangle contour from `(x0, y0)` to `(x1, y1)`.
pub fn rect(x0: i32, y0: i32, x1: i32, y1: i32) -> Vec<OutlinePoint> {
    vec![on(x0, y0), on(x1, y0), on(x1, y1), on(x0, y1)]
}

/// A reference from a composite glyph to another glyph, offset in font units.
#[derive(Clone, Copy, Debug)]
pub struct Component {
    pub glyph_id: u16,
    pub dx: i16,
    pub dy: i16,
}

enum SynthGlyph {
    Simple(Vec<Vec<OutlinePoint>>),
    Composite(Vec<Component>),
}

/// Builder for a minimal TrueType font. Glyph 0 is an empty `.notdef`.
pub struct FontBuilder {
    units_per_em: u16,
    ascender: i16,
    descender: i16,
    glyphs: Vec<(u16, SynthGlyph)>,
    cmap: BTreeMap<u16, u16>,
}

impl FontBuilder {
    pub fn new(units_per_em: u16, ascender: i16, descender: i16) -> Self {
        Self {
            units_per_em,
            ascender,
            descender,
            glyphs: vec![(units_per_em / 2, SynthGlyph::Simple(Vec::new()))],
            cmap: BTreeMap::new(),
        }
    }

    /// Add a simple glyph; an empty contour list gives a glyph with no
    /// outline. Returns the new glyph id.
    pub fn glyph(&mut self, advance: u16, contours: Vec<Vec<OutlinePoint>>) -> u16 {
        self.glyphs.push((advance, SynthGlyph::Simple(contours)));
        (self.glyphs.len() - 1) as u16
    }

    /// Add a composite glyph. Returns the new glyph id.
    pub fn composite(&mut self, advance: u16, components: Vec<Component>) -> u16 {
        self.glyphs.push((advance, SynthGlyph::Composite(components)));
        (self.glyphs.len() - 1) as u16
    }

    /// Map a BMP character to a glyph id.
    pub fn map(&mut self, ch: char, glyph_id: u16) -> &mut Self {
        self.cmap.insert(u32::from(ch) as u16, glyph_id);
        self
    }

    /// Serialize the font.
    pub fn build(&self) -> Vec<u8> {
        let (glyf, loca) = self.glyf_and_loca();
        let tables: [(&[u8; 4], Vec<u8>); 7] = [
            (b"cmap", self.cmap_table()),
            (b"glyf", glyf),
            (b"head", self.head_table()),
            (b"hhea", self.hhea_table()),
            (b"hmtx", self.hmtx_table()),
            (b"loca", loca),
            (b"maxp", self.maxp_table()),
        ];

        let mut out = Vec::new();
        out.extend_from_slice(&0x0001_0000u32.to_be_bytes());
        put16(&mut out, tables.len() as u16);
        put16(&mut out, 0); // searchRange
        put16(&mut out, 0); // entrySelector
        put16(&mut out, 0); // rangeShift

        let mut offset = 12 + 16 * tables.len();
        for (tag, body) in &tables {
            out.extend_from_slice(*tag);
            out.extend_from_slice(&0u32.to_be_bytes()); // checksum
            out.extend_from_slice(&(offset as u32).to_be_bytes());
            out.extend_from_slice(&(body.len() as u32).to_be_bytes());
            offset += body.len().next_multiple_of(4);
        }
        for (_, body) in &tables {
            out.extend_from_slice(body);
            out.resize(out.len().next_multiple_of(4), 0);
        }
        out
    }

    fn head_table(&self) -> Vec<u8> {
        let mut t = Vec::with_capacity(54);
        t.extend_from_slice(&0x0001_0000u32.to_be_bytes()); // version
        t.extend_from_slice(&0x0001_0000u32.to_be_bytes()); // fontRevision
        t.extend_from_slice(&0u32.to_be_bytes()); // checksumAdjustment
        t.extend_from_slice(&0x5F0F_3CF5u32.to_be_bytes()); // magicNumber
        put16(&mut t, 0); // flags
        put16(&mut t, self.units_per_em);
        t.extend_from_slice(&[0u8; 16]); // created, modified
        for v in [0, self.descender, self.units_per_em as i16, self.ascender] {
            put16(&mut t, v as u16); // xMin, yMin, xMax, yMax
        }
        put16(&mut t, 0); // macStyle
        put16(&mut t, 8); // lowestRecPPEM
        put16(&mut t, 2); // fontDirectionHint
        put16(&mut t, 1); // indexToLocFormat: long
        put16(&mut t, 0); // glyphDataFormat
        t
    }

    fn hhea_table(&self) -> Vec<u8> {
        let mut t = Vec::with_capacity(36);
        t.extend_from_slice(&0x0001_0000u32.to_be_bytes());
        put16(&mut t, self.ascender as u16);
        put16(&mut t, self.descender as u16);
        put16(&mut t, 0); // lineGap
        let max_advance = self.glyphs.iter().map(|g| g.0).max().unwrap_or(0);
        put16(&mut t, max_advance);
        t.extend_from_slice(&[0u8; 22]);
        put16(&mut t, self.glyphs.len() as u16);
        t
    }

    fn maxp_table(&self) -> Vec<u8> {
        let mut t = 0x0000_5000u32.to_be_bytes().to_vec();
        put16(&mut t, self.glyphs.len() as u16);
        t
    }

    fn hmtx_table(&self) -> Vec<u8> {
        let mut t = Vec::with_capacity(self.glyphs.len() * 4);
        for (advance, _) in &self.glyphs {
            put16(&mut t, *advance);
            put16(&mut t, 0);
        }
        t
    }

    /// One single-code segment per mapping, plus the 0xFFFF terminator.
    fn cmap_table(&self) -> Vec<u8> {
        let mut segments: Vec<(u16, u16)> = self
            .cmap
            .iter()
            .filter(|&(&code, _)| code != 0xFFFF)
            .map(|(&code, &gid)| (code, gid.wrapping_sub(code)))
            .collect();
        segments.push((0xFFFF, 1));
        let seg_count = segments.len() as u16;

        let mut sub = Vec::new();
        put16(&mut sub, 4); // format
        put16(&mut sub, 16 + 8 * seg_count); // length
        put16(&mut sub, 0); // language
        put16(&mut sub, seg_count * 2);
        put16(&mut sub, 0); // searchRange
        put16(&mut sub, 0); // entrySelector
        put16(&mut sub, 0); // rangeShift
        segments.iter().for_each(|s| put16(&mut sub, s.0)); // endCode
        put16(&mut sub, 0); // reservedPad
        segments.iter().for_each(|s| put16(&mut sub, s.0)); // startCode
        segments.iter().for_each(|s| put16(&mut sub, s.1)); // idDelta
        segments.iter().for_each(|_| put16(&mut sub, 0)); // idRangeOffset

        let mut t = Vec::new();
        put16(&mut t, 0); // version
        put16(&mut t, 1); // numTables
        put16(&mut t, 3); // platform: Windows
        put16(&mut t, 1); // encoding: Unicode BMP
        t.extend_from_slice(&12u32.to_be_bytes());
        t.extend_from_slice(&sub);
        t
    }

    fn glyf_and_loca(&self) -> (Vec<u8>, Vec<u8>) {
        let mut glyf = Vec::new();
        let mut loca = Vec::new();
        for (_, glyph) in &self.glyphs {
            loca.extend_from_slice(&(glyf.len() as u32).to_be_bytes());
            match glyph {
                SynthGlyph::Simple(contours) if contours.iter().all(|c| c.is_empty()) => {}
                SynthGlyph::Simple(contours) => encode_simple(contours, &mut glyf),
                SynthGlyph::Composite(parts) => encode_composite(parts, &mut glyf),
            }
            glyf.resize(glyf.len().next_multiple_of(2), 0);
        }
        loca.extend_from_slice(&(glyf.len() as u32).to_be_bytes());
        (glyf, loca)
    }
}

fn put16(out: &mut Vec<u8>, v: u16) {
    out.extend_from_slice(&v.to_be_bytes());
}

fn encode_simple(contours: &[Vec<OutlinePoint>], out: &mut Vec<u8>) {
    let contours: Vec<&Vec<OutlinePoint>> = contours.iter().filter(|c| !c.is_empty()).collect();
    let points: Vec<OutlinePoint> = contours.iter().flat_map(|c| c.iter().copied()).collect();

    put16(out, contours.len() as u16);
    let x_min = points.iter().map(|p| p.x).min().unwrap_or(0);
    let y_min = points.iter().map(|p| p.y).min().unwrap_or(0);
    let x_max = points.iter().map(|p| p.x).max().unwrap_or(0);
    let y_max = points.iter().map(|p| p.y).max().unwrap_or(0);
    for v in [x_min, y_min, x_max, y_max] {
        put16(out, v as i16 as u16);
    }

    let mut end = 0usize;
    for c in &contours {
        end += c.len();
        put16(out, (end - 1) as u16);
    }
    put16(out, 0); // instructionLength

    // Every coordinate is written as a full i16 delta.
    out.extend(points.iter().map(|p| if p.on_curve { ON_CURVE_POINT } else { 0 }));
    let mut prev = 0;
    for p in &points {
        put16(out, (p.x - prev) as i16 as u16);
        prev = p.x;
    }
    prev = 0;
    for p in &points {
        put16(out, (p.y - prev) as i16 as u16);
        prev = p.y;
    }
}

fn encode_composite(parts: &[Component], out: &mut Vec<u8>) {
    put16(out, (-1i16) as u16);
    out.extend_from_slice(&[0u8; 8]); // bbox, recomputed by the parser
    for (i, part) in parts.iter().enumerate() {
        let mut flags = ARG_1_AND_2_ARE_WORDS | ARGS_ARE_XY_VALUES;
        if i + 1 < parts.len() {
            flags |= MORE_COMPONENTS;
        }
        put16(out, flags);
        put16(out, part.glyph_id);
        put16(out, part.dx as u16);
        put16(out, part.dy as u16);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
