//! The encoded character set.

use font::{Face, FaceError};
use log::{Level, debug, log_enabled, trace};

use crate::config::{FIRST_CODE, LAST_CODE, RomConfig, char_codes};
use crate::pack::pack_canvas;
use crate::render::render_glyph;

/// Packed bitmaps for every printable ASCII character, `cell_height` bytes
/// each, in ascending code order starting at space.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlyphTable {
    cell_width: u32,
    cell_height: u32,
    bytes: Vec<u8>,
}

impl GlyphTable {
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn cell_height(&self) -> u32 {
        self.cell_height
    }

    /// The rows of one character, or `None` outside `0x20..=0x7E`.
    pub fn block(&self, code: u8) -> Option<&[u8]> {
        if !(FIRST_CODE..=LAST_CODE).contains(&code) {
            return None;
        }
        let rows = self.cell_height as usize;
        let start = usize::from(code - FIRST_CODE) * rows;
        self.bytes.get(start..start + rows)
    }

    /// Render one character's rows as `#`/`.` text, one line per row.
    pub fn preview(&self, code: u8) -> Option<String> {
        let block = self.block(code)?;
        let mut out = String::with_capacity(block.len() * (self.cell_width as usize + 1));
        for &byte in block {
            for col in 0..self.cell_width {
                out.push(if byte & (0x80 >> col) != 0 { '#' } else { '.' });
            }
            out.push('\n');
        }
        Some(out)
    }
}

/// Render and pack `0x20..=0x7E` from `face`.
pub fn encode_charset(face: &Face, config: &RomConfig) -> Result<GlyphTable, FaceError> {
    let mut bytes = Vec::with_capacity(config.table_len());
    for code in char_codes() {
        let canvas = render_glyph(face, char::from(code), config)?;
        bytes.extend(pack_canvas(&canvas, config.threshold));
    }
    debug!("encoded {} glyphs into {} bytes", char_codes().count(), bytes.len());
    let table = GlyphTable {
        cell_width: config.cell_width,
        cell_height: config.cell_height,
        bytes,
    };
    if log_enabled!(Level::Trace) {
        for code in char_codes() {
            if let Some(preview) = table.preview(code) {
                trace!("{:?}\n{preview}", char::from(code));
            }
        }
    }
    Ok(table)
}
