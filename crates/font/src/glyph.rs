//! Glyph outline parsing from the `glyf` table.
//!
//! Handles both simple glyphs (contour points) and composite glyphs
//! (references to other glyphs with transforms). Composite glyphs are
//! flattened into a single outline by [`GlyphOutline::append_transformed`].

use common::{Cursor, Endian, Mat3x2, ParseError, Vec2};

// ─────────────────────────────────────────────────────────────────────────────
// OutlinePoint / Contour / GlyphOutline
// ─────────────────────────────────────────────────────────────────────────────

/// A single point in a glyph outline, in font units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OutlinePoint {
    pub x: i32,
    pub y: i32,
    pub on_curve: bool,
}

/// A closed contour (sequence of points).
#[derive(Clone, Debug, PartialEq)]
pub struct Contour {
    pub points: Vec<OutlinePoint>,
}

/// A glyph outline consisting of contours, with its bounding box in font units.
#[derive(Clone, Debug, PartialEq)]
pub struct GlyphOutline {
    pub contours: Vec<Contour>,
    pub x_min: i32,
    pub y_min: i32,
    pub x_max: i32,
    pub y_max: i32,
}

impl GlyphOutline {
    /// An outline with no contours and an empty bounding box.
    pub fn empty() -> Self {
        Self {
            contours: Vec::new(),
            x_min: 0, y_min: 0, x_max: 0, y_max: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.contours.iter().all(|c| c.points.is_empty())
    }

    /// Append every contour of `other`, mapped through `transform`, and grow
    /// the bounding box to cover the new points.
    pub fn append_transformed(&mut self, other: &GlyphOutline, transform: Mat3x2) {
        for contour in &other.contours {
            let points = contour
                .points
                .iter()
                .map(|p| {
                    let t = transform.transform_point(Vec2::new(p.x as f32, p.y as f32));
                    OutlinePoint {
                        x: t.x.round() as i32,
                        y: t.y.round() as i32,
                        on_curve: p.on_curve,
                    }
                })
                .collect();
            self.contours.push(Contour { points });
        }
        self.recompute_bounds();
    }

    /// Recompute the bounding box from the contour points.
    pub fn recompute_bounds(&mut self) {
        let mut points = self.contours.iter().flat_map(|c| c.points.iter());
        let Some(first) = points.next() else {
            (self.x_min, self.y_min, self.x_max, self.y_max) = (0, 0, 0, 0);
            return;
        };
        let mut bounds = (first.x, first.y, first.x, first.y);
        for p in points {
            bounds.0 = bounds.0.min(p.x);
            bounds.1 = bounds.1.min(p.y);
            bounds.2 = bounds.2.max(p.x);
            bounds.3 = bounds.3.max(p.y);
        }
        (self.x_min, self.y_min, self.x_max, self.y_max) = bounds;
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// CompositeComponent
// ─────────────────────────────────────────────────────────────────────────────

/// A component of a composite glyph.
#[derive(Clone, Copy, Debug)]
pub struct CompositeComponent {
    pub glyph_id: u16,
    /// Component-to-parent transform: scale/rotation in `a..d`, offset in `e, f`.
    pub transform: Mat3x2,
}

// ─────────────────────────────────────────────────────────────────────────────
// GlyphDesc
// ─────────────────────────────────────────────────────────────────────────────

/// Description of a glyph: empty, simple outline, or composite.
#[derive(Clone, Debug)]
pub enum GlyphDesc {
    /// Glyph has no outline (e.g., space character).
    Empty,
    /// Simple glyph with contour data.
    Simple(GlyphOutline),
    /// Composite glyph referencing other glyphs.
    Composite(Vec<CompositeComponent>),
}

// ─────────────────────────────────────────────────────────────────────────────
// Flag bits
// ─────────────────────────────────────────────────────────────────────────────

pub(crate) const ON_CURVE_POINT: u8 = 0x01;
pub(crate) const X_SHORT_VECTOR: u8 = 0x02;
pub(crate) const Y_SHORT_VECTOR: u8 = 0x04;
pub(crate) const REPEAT_FLAG: u8 = 0x08;
pub(crate) const X_IS_SAME_OR_POSITIVE_SHORT: u8 = 0x10;
pub(crate) const Y_IS_SAME_OR_POSITIVE_SHORT: u8 = 0x20;

pub(crate) const ARG_1_AND_2_ARE_WORDS: u16 = 0x0001;
pub(crate) const ARGS_ARE_XY_VALUES: u16 = 0x0002;
pub(crate) const WE_HAVE_A_SCALE: u16 = 0x0008;
pub(crate) const MORE_COMPONENTS: u16 = 0x0020;
pub(crate) const WE_HAVE_AN_X_AND_Y_SCALE: u16 = 0x0040;
pub(crate) const WE_HAVE_A_TWO_BY_TWO: u16 = 0x0080;

// ─────────────────────────────────────────────────────────────────────────────
// Parsing
// ─────────────────────────────────────────────────────────────────────────────

/// Parse a glyph from the `glyf` table.
///
/// `data` should be the slice of glyf data for this specific glyph
/// (determined via the `loca` table offsets).
pub fn parse_glyph(data: &[u8]) -> Result<GlyphDesc, ParseError> {
    if data.is_empty() {
        return Ok(GlyphDesc::Empty);
    }

    let mut c = Cursor::new(data, Endian::Big);
    let num_contours = c.i16()?;
    c.skip(8)?; // xMin, yMin, xMax, yMax; recomputed from the points

    if num_contours >= 0 {
        parse_simple_glyph(&mut c, num_contours as usize)
    } else {
        parse_composite_glyph(&mut c)
    }
}

/// Decode one coordinate array (x or y) as running deltas.
fn read_coordinates(
    c: &mut Cursor<'_>,
    flags: &[u8],
    short_bit: u8,
    same_or_positive_bit: u8,
) -> Result<Vec<i32>, ParseError> {
    let mut value: i32 = 0;
    let mut out = Vec::with_capacity(flags.len());
    for &flag in flags {
        if flag & short_bit != 0 {
            let d = c.u8()? as i32;
            value += if flag & same_or_positive_bit != 0 { d } else { -d };
        } else if flag & same_or_positive_bit == 0 {
            value += c.i16()? as i32;
        }
        out.push(value);
    }
    Ok(out)
}

fn parse_simple_glyph(c: &mut Cursor<'_>, num_contours: usize) -> Result<GlyphDesc, ParseError> {
    if num_contours == 0 {
        return Ok(GlyphDesc::Empty);
    }

    let mut end_pts = Vec::with_capacity(num_contours);
    for _ in 0..num_contours {
        let end = c.u16()? as usize;
        if end_pts.last().is_some_and(|&prev| end <= prev) {
            return Err(ParseError::InvalidValue("contour end points are not ascending"));
        }
        end_pts.push(end);
    }
    let num_points = end_pts.last().map_or(0, |&end| end + 1);

    let instruction_len = c.u16()? as usize;
    c.skip(instruction_len)?;

    let mut flags = Vec::with_capacity(num_points);
    while flags.len() < num_points {
        let flag = c.u8()?;
        flags.push(flag);
        if flag & REPEAT_FLAG != 0 {
            let repeat = (c.u8()? as usize).min(num_points - flags.len());
            flags.extend(std::iter::repeat_n(flag, repeat));
        }
    }

    let xs = read_coordinates(c, &flags, X_SHORT_VECTOR, X_IS_SAME_OR_POSITIVE_SHORT)?;
    let ys = read_coordinates(c, &flags, Y_SHORT_VECTOR, Y_IS_SAME_OR_POSITIVE_SHORT)?;

    let mut contours = Vec::with_capacity(num_contours);
    let mut start = 0usize;
    for end in end_pts {
        let points = (start..=end)
            .map(|j| OutlinePoint {
                x: xs[j],
                y: ys[j],
                on_curve: flags[j] & ON_CURVE_POINT != 0,
            })
            .collect();
        contours.push(Contour { points });
        start = end + 1;
    }

    let mut outline = GlyphOutline { contours, ..GlyphOutline::empty() };
    outline.recompute_bounds();
    Ok(GlyphDesc::Simple(outline))
}

fn parse_composite_glyph(c: &mut Cursor<'_>) -> Result<GlyphDesc, ParseError> {
    let mut components = Vec::new();

    loop {
        let flags = c.u16()?;
        let glyph_id = c.u16()?;

        let (arg1, arg2) = if flags & ARG_1_AND_2_ARE_WORDS != 0 {
            (c.i16()? as f32, c.i16()? as f32)
        } else {
            (c.i8()? as f32, c.i8()? as f32)
        };
        // Without ARGS_ARE_XY_VALUES the arguments are point indices to be
        // matched between parent and child; that alignment is not supported
        // and the component is placed at the origin instead.
        let (dx, dy) = if flags & ARGS_ARE_XY_VALUES != 0 { (arg1, arg2) } else { (0.0, 0.0) };

        let mut transform = Mat3x2::translate(dx, dy);
        if flags & WE_HAVE_A_SCALE != 0 {
            let scale = c.f2dot14()?;
            transform.a = scale;
            transform.d = scale;
        } else if flags & WE_HAVE_AN_X_AND_Y_SCALE != 0 {
            transform.a = c.f2dot14()?;
            transform.d = c.f2dot14()?;
        } else if flags & WE_HAVE_A_TWO_BY_TWO != 0 {
            transform.a = c.f2dot14()?;
            transform.b = c.f2dot14()?;
            transform.c = c.f2dot14()?;
            transform.d = c.f2dot14()?;
        }

        components.push(CompositeComponent { glyph_id, transform });

        if flags & MORE_COMPONENTS == 0 {
            break;
        }
    }

    Ok(GlyphDesc::Composite(components))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
