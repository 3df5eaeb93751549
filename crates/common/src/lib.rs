//! # Common Foundation Crate
//!
//! Byte-reading, parse errors and the small amount of 2D geometry shared by the
//! font parser and the glyph ROM encoder. **Zero external dependencies.**

#![forbid(unsafe_code)]

use core::fmt;
use std::ops::{Add, Mul, Sub};

// ─────────────────────────────────────────────────────────────────────────────
// Endian
// ─────────────────────────────────────────────────────────────────────────────

/// Byte order for multi-byte integer decoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Endian {
    Little,
    Big,
}

// ─────────────────────────────────────────────────────────────────────────────
// ParseError
// ─────────────────────────────────────────────────────────────────────────────

/// Errors that can occur when parsing binary font data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Tried to read past the end of the buffer.
    UnexpectedEof,
    /// A parsed value is not valid in context.
    InvalidValue(&'static str),
    /// A length or offset field points outside its table.
    LengthOutOfRange(&'static str),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedEof => write!(f, "unexpected end of input"),
            Self::InvalidValue(msg) => write!(f, "invalid value: {msg}"),
            Self::LengthOutOfRange(msg) => write!(f, "length out of range: {msg}"),
        }
    }
}

impl std::error::Error for ParseError {}

// ─────────────────────────────────────────────────────────────────────────────
// Cursor: endian-aware byte buffer reader
// ─────────────────────────────────────────────────────────────────────────────

/// A zero-copy, endian-aware byte-buffer reader.
pub struct Cursor<'a> {
    buf: &'a [u8],
    off: usize,
    pub endian: Endian,
}

impl<'a> Cursor<'a> {
    /// Create a new cursor at offset 0.
    #[inline]
    pub fn new(buf: &'a [u8], endian: Endian) -> Self {
        Self { buf, off: 0, endian }
    }

    /// Current read position (byte offset).
    #[inline]
    pub fn position(&self) -> usize {
        self.off
    }

    /// Number of bytes remaining from the current position.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.off)
    }

    #[inline]
    fn take(&mut self, n: usize) -> Result<&'a [u8], ParseError> {
        let end = self.off.checked_add(n).ok_or(ParseError::UnexpectedEof)?;
        let slice = self.buf.get(self.off..end).ok_or(ParseError::UnexpectedEof)?;
        self.off = end;
        Ok(slice)
    }

    /// Read a single byte.
    #[inline]
    pub fn u8(&mut self) -> Result<u8, ParseError> {
        Ok(self.take(1)?[0])
    }

    /// Read a signed byte.
    #[inline]
    pub fn i8(&mut self) -> Result<i8, ParseError> {
        Ok(self.take(1)?[0] as i8)
    }

    /// Read a `u16` in the cursor's endianness.
    #[inline]
    pub fn u16(&mut self) -> Result<u16, ParseError> {
        let b = self.take(2)?;
        Ok(match self.endian {
            Endian::Big => u16::from_be_bytes([b[0], b[1]]),
            Endian::Little => u16::from_le_bytes([b[0], b[1]]),
        })
    }

    /// Read an `i16` in the cursor's endianness.
    #[inline]
    pub fn i16(&mut self) -> Result<i16, ParseError> {
        let b = self.take(2)?;
        Ok(match self.endian {
            Endian::Big => i16::from_be_bytes([b[0], b[1]]),
            Endian::Little => i16::from_le_bytes([b[0], b[1]]),
        })
    }

    /// Read a `u32` in the cursor's endianness.
    #[inline]
    pub fn u32(&mut self) -> Result<u32, ParseError> {
        let b = self.take(4)?;
        Ok(match self.endian {
            Endian::Big => u32::from_be_bytes([b[0], b[1], b[2], b[3]]),
            Endian::Little => u32::from_le_bytes([b[0], b[1], b[2], b[3]]),
        })
    }

    /// Read a 2.14 fixed-point number (used by composite glyph transforms).
    #[inline]
    pub fn f2dot14(&mut self) -> Result<f32, ParseError> {
        Ok(self.i16()? as f32 / 16384.0)
    }

    /// Read exactly `n` bytes as a slice.
    #[inline]
    pub fn bytes(&mut self, n: usize) -> Result<&'a [u8], ParseError> {
        self.take(n)
    }

    /// Skip `n` bytes.
    #[inline]
    pub fn skip(&mut self, n: usize) -> Result<(), ParseError> {
        self.take(n).map(|_| ())
    }
}

impl fmt::Debug for Cursor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("off", &self.off)
            .field("len", &self.buf.len())
            .field("endian", &self.endian)
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Vec2: 2D point
// ─────────────────────────────────────────────────────────────────────────────

/// A 2D vector (or point) with `f32` components.
#[derive(Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Point halfway between `self` and `other`.
    #[inline]
    pub fn midpoint(self, other: Self) -> Self {
        Self {
            x: (self.x + other.x) * 0.5,
            y: (self.y + other.y) * 0.5,
        }
    }

    /// Squared distance to `other`.
    #[inline]
    pub fn distance_sq(self, other: Self) -> f32 {
        let d = self - other;
        d.x * d.x + d.y * d.y
    }
}

impl fmt::Debug for Vec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Vec2({}, {})", self.x, self.y)
    }
}

impl Add for Vec2 {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl Sub for Vec2 {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl Mul<f32> for Vec2 {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: f32) -> Self {
        Self {
            x: self.x * rhs,
            y: self.y * rhs,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Mat3x2: 2D affine transformation matrix
// ─────────────────────────────────────────────────────────────────────────────

/// A 3×2 affine transformation matrix.
///
/// ```text
/// | a  b  0 |
/// | c  d  0 |
/// | e  f  1 |
/// ```
///
/// Transforming a point `(x, y)`:
/// ```text
/// x' = a*x + c*y + e
/// y' = b*x + d*y + f
/// ```
///
/// This is the same layout TrueType uses for composite glyph components
/// (`xscale, scale01, scale10, yscale, dx, dy`).
#[derive(Clone, Copy, PartialEq)]
pub struct Mat3x2 {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
}

impl Mat3x2 {
    /// The identity matrix (no transformation).
    pub const IDENTITY: Self = Self {
        a: 1.0, b: 0.0,
        c: 0.0, d: 1.0,
        e: 0.0, f: 0.0,
    };

    /// Create a translation matrix.
    #[inline]
    pub const fn translate(tx: f32, ty: f32) -> Self {
        Self {
            a: 1.0, b: 0.0,
            c: 0.0, d: 1.0,
            e: tx, f: ty,
        }
    }

    /// Transform a point.
    #[inline]
    pub fn transform_point(self, p: Vec2) -> Vec2 {
        Vec2 {
            x: self.a * p.x + self.c * p.y + self.e,
            y: self.b * p.x + self.d * p.y + self.f,
        }
    }

    /// Multiply two matrices: `self * rhs` (apply `self` first, then `rhs`).
    ///
    /// Composite glyphs nest: a component's own transform is applied before
    /// the transform of the glyph that references it.
    #[inline]
    pub fn then(self, rhs: Self) -> Self {
        Self {
            a: self.a * rhs.a + self.b * rhs.c,
            b: self.a * rhs.b + self.b * rhs.d,
            c: self.c * rhs.a + self.d * rhs.c,
            d: self.c * rhs.b + self.d * rhs.d,
            e: self.e * rhs.a + self.f * rhs.c + rhs.e,
            f: self.e * rhs.b + self.f * rhs.d + rhs.f,
        }
    }
}

impl Default for Mat3x2 {
    #[inline]
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl fmt::Debug for Mat3x2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Mat3x2 [{}, {}; {}, {}; {}, {}]",
            self.a, self.b, self.c, self.d, self.e, self.f
        )
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
