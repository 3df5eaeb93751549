//! # Font Engine
//!
//! TrueType parsing and anti-aliased glyph rasterization for the glyph ROM
//! encoder, from font bytes to per-character coverage bitmaps.
//!
//! - `tables`: Parse the sfnt table directory, head, hhea, maxp, cmap, loca, hmtx
//! - `glyph`: Parse simple and composite glyph outlines from the `glyf` table
//! - `rasterizer`: Scanline rasterization with quadratic Bézier flattening
//! - `face`: A loaded face that maps characters to metrics and bitmaps
//! - `synth`: (feature `synth`) build small TrueType files in memory

pub mod tables;
pub mod glyph;
pub mod rasterizer;
pub mod face;

#[cfg(any(test, feature = "synth"))]
pub mod synth;

pub use face::{Face, FaceError, GlyphMetrics};
pub use rasterizer::GlyphBitmap;
