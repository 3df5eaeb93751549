//! Scanline glyph rasterizer.
//!
//! Converts glyph outlines to alpha bitmaps using:
//! - De Casteljau subdivision for quadratic Bézier flattening
//! - Scanline intersection with the nonzero winding fill rule, sampled on
//!   several sub-scanlines per pixel row
//!
//! Bitmaps are snapped to the pixel grid: the outline keeps its exact
//! sub-pixel position relative to the glyph origin, and the bitmap rectangle
//! is the smallest whole-pixel rectangle around it.

use common::Vec2;

use crate::glyph::{Contour, GlyphOutline};

/// Maximum distance (in pixels) between a flattened curve and its chords.
const FLATTEN_TOLERANCE: f32 = 0.05;

/// Subdivision depth cap; 2^12 segments per curve is far beyond what the
/// tolerance needs at glyph sizes.
const MAX_FLATTEN_DEPTH: u32 = 12;

/// Scanlines sampled per pixel row for vertical coverage.
const SUBSCANLINES: u32 = 16;

// ─────────────────────────────────────────────────────────────────────────────
// GlyphBitmap
// ─────────────────────────────────────────────────────────────────────────────

/// A rasterized glyph bitmap (A8 alpha channel).
#[derive(Clone, Debug, PartialEq)]
pub struct GlyphBitmap {
    pub width: u32,
    pub height: u32,
    /// Pixels from the glyph origin to the left edge of the bitmap.
    pub bearing_x: i32,
    /// Pixels from the baseline up to the top edge of the bitmap.
    pub bearing_y: i32,
    /// Horizontal advance width in pixels.
    pub advance: f32,
    /// Alpha data, row-major, one byte per pixel.
    pub data: Vec<u8>,
}

impl GlyphBitmap {
    /// A bitmap with no pixels (whitespace, missing outline).
    pub fn empty(advance: f32) -> Self {
        Self {
            width: 0,
            height: 0,
            bearing_x: 0,
            bearing_y: 0,
            advance,
            data: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Alpha at `(x, y)`, or 0 outside the bitmap.
    pub fn alpha(&self, x: u32, y: u32) -> u8 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        self.data[y as usize * self.width as usize + x as usize]
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Bézier flattening
// ─────────────────────────────────────────────────────────────────────────────

/// Flatten a quadratic Bézier curve (p0, p1_control, p2) into line segments.
///
/// Uses recursive De Casteljau subdivision until the control point is within
/// `tolerance` pixels of the chord midpoint. Only the end points of each
/// segment are pushed; `p0` is assumed to be in `output` already.
pub fn flatten_quad_bezier(p0: Vec2, p1: Vec2, p2: Vec2, tolerance: f32, output: &mut Vec<Vec2>) {
    flatten_quad_rec(p0, p1, p2, tolerance * tolerance, MAX_FLATTEN_DEPTH, output);
}

fn flatten_quad_rec(p0: Vec2, p1: Vec2, p2: Vec2, tol_sq: f32, depth: u32, output: &mut Vec<Vec2>) {
    if depth == 0 || p1.distance_sq(p0.midpoint(p2)) <= tol_sq {
        output.push(p2);
        return;
    }

    let p01 = p0.midpoint(p1);
    let p12 = p1.midpoint(p2);
    let p012 = p01.midpoint(p12);

    flatten_quad_rec(p0, p01, p012, tol_sq, depth - 1, output);
    flatten_quad_rec(p012, p12, p2, tol_sq, depth - 1, output);
}

/// Flatten one TrueType contour into a closed polygon.
///
/// Two consecutive off-curve points have an implied on-curve point at their
/// midpoint. A contour with no on-curve point at all starts at the midpoint
/// of its first two points.
fn flatten_contour(contour: &Contour, map: impl Fn(f32, f32) -> Vec2) -> Vec<Vec2> {
    let pts: Vec<(Vec2, bool)> = contour
        .points
        .iter()
        .map(|p| (map(p.x as f32, p.y as f32), p.on_curve))
        .collect();
    let n = pts.len();
    if n < 2 {
        return Vec::new();
    }

    let (start, first) = match pts.iter().position(|p| p.1) {
        Some(i) => (pts[i].0, i + 1),
        None => (pts[0].0.midpoint(pts[1].0), 1),
    };

    let mut polygon = vec![start];
    let mut last = start;
    let mut control: Option<Vec2> = None;

    for k in 0..n {
        let (p, on_curve) = pts[(first + k) % n];
        match (on_curve, control) {
            (true, None) => {
                polygon.push(p);
                last = p;
            }
            (true, Some(c)) => {
                flatten_quad_bezier(last, c, p, FLATTEN_TOLERANCE, &mut polygon);
                last = p;
                control = None;
            }
            (false, None) => control = Some(p),
            (false, Some(c)) => {
                let mid = c.midpoint(p);
                flatten_quad_bezier(last, c, mid, FLATTEN_TOLERANCE, &mut polygon);
                last = mid;
                control = Some(p);
            }
        }
    }

    // Close back to the start point.
    match control {
        Some(c) => flatten_quad_bezier(last, c, start, FLATTEN_TOLERANCE, &mut polygon),
        None => polygon.push(start),
    }
    polygon
}

// ─────────────────────────────────────────────────────────────────────────────
// Outline → Edges
// ─────────────────────────────────────────────────────────────────────────────

/// A non-horizontal edge, stored top to bottom, with its winding direction.
#[derive(Clone, Copy, Debug)]
struct Edge {
    x_top: f32,
    y_top: f32,
    x_bot: f32,
    y_bot: f32,
    winding: i32,
}

impl Edge {
    fn new(p0: Vec2, p1: Vec2) -> Option<Self> {
        if (p0.y - p1.y).abs() <= 1e-4 {
            return None;
        }
        let (top, bot, winding) = if p0.y < p1.y { (p0, p1, 1) } else { (p1, p0, -1) };
        Some(Edge { x_top: top.x, y_top: top.y, x_bot: bot.x, y_bot: bot.y, winding })
    }

    /// x at scanline `y`, if the edge spans it (top inclusive, bottom exclusive).
    fn x_at(&self, y: f32) -> Option<f32> {
        if y < self.y_top || y >= self.y_bot {
            return None;
        }
        let t = (y - self.y_top) / (self.y_bot - self.y_top);
        Some(self.x_top + t * (self.x_bot - self.x_top))
    }
}

/// Flatten all contours into edges in bitmap space (y down).
fn outline_to_edges(outline: &GlyphOutline, map: impl Fn(f32, f32) -> Vec2 + Copy) -> Vec<Edge> {
    let mut edges = Vec::new();
    for contour in &outline.contours {
        let polygon = flatten_contour(contour, map);
        edges.extend(polygon.windows(2).filter_map(|w| Edge::new(w[0], w[1])));
    }
    edges
}

// ─────────────────────────────────────────────────────────────────────────────
// Rasterization
// ─────────────────────────────────────────────────────────────────────────────

/// Rasterize a glyph outline to an alpha bitmap.
///
/// # Arguments
/// - `outline`: The glyph outline (in font units)
/// - `size_px`: Desired size in pixels (ppem)
/// - `units_per_em`: The font's units-per-em value
///
/// Each pixel's alpha is its covered area, estimated from
/// `SUBSCANLINES` evenly spaced scanlines per row with exact horizontal
/// coverage on each; 0 = transparent, 255 = opaque. `advance` is left at 0
/// for the caller.
pub fn rasterize_outline(outline: &GlyphOutline, size_px: f32, units_per_em: u16) -> GlyphBitmap {
    let scale = size_px / units_per_em as f32;

    if outline.is_empty() {
        return GlyphBitmap::empty(0.0);
    }

    let left = (outline.x_min as f32 * scale).floor() as i32;
    let right = (outline.x_max as f32 * scale).ceil() as i32;
    let top = (outline.y_max as f32 * scale).ceil() as i32;
    let bottom = (outline.y_min as f32 * scale).floor() as i32;
    if right <= left || top <= bottom {
        return GlyphBitmap::empty(0.0);
    }

    let w = (right - left) as u32;
    let h = (top - bottom) as u32;

    // Font space is y-up, bitmap space is y-down.
    let map = move |x: f32, y: f32| Vec2::new(x * scale - left as f32, top as f32 - y * scale);
    let edges = outline_to_edges(outline, map);

    let mut data = vec![0u8; w as usize * h as usize];
    let mut coverage = vec![0f32; w as usize];
    let mut crossings: Vec<(f32, i32)> = Vec::new();

    let weight = 1.0 / SUBSCANLINES as f32;

    for row in 0..h {
        coverage.fill(0.0);
        for sub in 0..SUBSCANLINES {
            let scan_y = row as f32 + (sub as f32 + 0.5) * weight;

            crossings.clear();
            crossings.extend(edges.iter().filter_map(|e| e.x_at(scan_y).map(|x| (x, e.winding))));
            crossings.sort_by(|a, b| a.0.total_cmp(&b.0));

            let mut winding = 0;
            let mut span_start = 0.0f32;
            for &(x, dir) in &crossings {
                let was_inside = winding != 0;
                winding += dir;
                match (was_inside, winding != 0) {
                    (false, true) => span_start = x,
                    (true, false) => add_span(&mut coverage, span_start, x, weight),
                    _ => {}
                }
            }
        }

        let row_start = row as usize * w as usize;
        for (col, &cov) in coverage.iter().enumerate() {
            data[row_start + col] = (cov.clamp(0.0, 1.0) * 255.0).round() as u8;
        }
    }

    GlyphBitmap {
        width: w,
        height: h,
        bearing_x: left,
        bearing_y: top,
        advance: 0.0,
        data,
    }
}

/// Accumulate the horizontal coverage of `[x_start, x_end)`, scaled by
/// `weight`, into `row`.
fn add_span(row: &mut [f32], x_start: f32, x_end: f32, weight: f32) {
    let width = row.len() as f32;
    let x_start = x_start.clamp(0.0, width);
    let x_end = x_end.clamp(0.0, width);
    if x_end <= x_start {
        return;
    }

    let col_start = x_start.floor() as usize;
    let col_end = (x_end.ceil() as usize).min(row.len());
    for (col, cell) in row.iter_mut().enumerate().take(col_end).skip(col_start) {
        let pixel_left = col as f32;
        let covered = x_end.min(pixel_left + 1.0) - x_start.max(pixel_left);
        *cell += covered.max(0.0) * weight;
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
