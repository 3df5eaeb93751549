//! Encoder configuration.

use std::ops::RangeInclusive;
use std::path::PathBuf;

use crate::error::RomError;

/// First character encoded (space).
pub const FIRST_CODE: u8 = 0x20;
/// Last character encoded (tilde).
pub const LAST_CODE: u8 = 0x7E;
/// Number of characters in the table.
pub const GLYPH_COUNT: usize = (LAST_CODE - FIRST_CODE) as usize + 1;

/// The encoded character codes, in output order.
pub const fn char_codes() -> RangeInclusive<u8> {
    FIRST_CODE..=LAST_CODE
}

/// Font files tried in order; the first that exists is used.
const DEFAULT_FONT_CANDIDATES: &[&str] = &[
    r"C:\Windows\Fonts\DejaVuSansMono.ttf",
    r"C:\Windows\Fonts\consola.ttf",
    r"C:\Windows\Fonts\Consola.ttf",
    r"C:\Windows\Fonts\lucon.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/TTF/DejaVuSansMono.ttf",
    "/usr/share/fonts/dejavu-sans-mono-fonts/DejaVuSansMono.ttf",
    "/usr/share/fonts/dejavu/DejaVuSansMono.ttf",
];

const DEFAULT_OUTPUT: &str = "font_printable.coe";

/// Tallest accepted cell, in rows.
pub const MAX_CELL_HEIGHT: u32 = 256;

/// Everything the encoder needs; nothing is read from the environment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RomConfig {
    /// File to write. Overwritten without confirmation.
    pub output_path: PathBuf,
    /// Ordered font file candidates.
    pub font_candidates: Vec<PathBuf>,
    /// Cell width in pixels; one row packs into one byte, so at most 8.
    pub cell_width: u32,
    /// Cell height in pixels, and the number of bytes per character.
    pub cell_height: u32,
    /// Rendering size in pixels per em.
    pub point_size: u32,
    /// Pixels strictly brighter than this become 1 bits.
    pub threshold: u8,
}

impl Default for RomConfig {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from(DEFAULT_OUTPUT),
            font_candidates: DEFAULT_FONT_CANDIDATES.iter().map(PathBuf::from).collect(),
            cell_width: 8,
            cell_height: 16,
            point_size: 14,
            threshold: 128,
        }
    }
}

impl RomConfig {
    /// Reject cell geometry the byte-per-row format cannot express.
    pub fn validate(&self) -> Result<(), RomError> {
        if !(1..=8).contains(&self.cell_width) {
            return Err(RomError::InvalidConfig("cell_width must be between 1 and 8"));
        }
        if !(1..=MAX_CELL_HEIGHT).contains(&self.cell_height) {
            return Err(RomError::InvalidConfig("cell_height must be between 1 and 256"));
        }
        if self.point_size == 0 {
            return Err(RomError::InvalidConfig("point_size must be non-zero"));
        }
        Ok(())
    }

    /// Size in bytes of the encoded table.
    pub fn table_len(&self) -> usize {
        GLYPH_COUNT * self.cell_height as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = RomConfig::default();
        assert_eq!((cfg.cell_width, cfg.cell_height), (8, 16));
        assert_eq!(cfg.point_size, 14);
        assert_eq!(cfg.threshold, 128);
        assert_eq!(cfg.font_candidates.len(), DEFAULT_FONT_CANDIDATES.len());
        assert_eq!(cfg.font_candidates[0], PathBuf::from(r"C:\Windows\Fonts\DejaVuSansMono.ttf"));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn printable_ascii_range() {
        assert_eq!(GLYPH_COUNT, 95);
        assert_eq!(char_codes().count(), GLYPH_COUNT);
        assert_eq!(RomConfig::default().table_len(), 1520);
    }

    #[test]
    fn validate_rejects_bad_geometry() {
        let wide = RomConfig { cell_width: 9, ..RomConfig::default() };
        assert!(matches!(wide.validate(), Err(RomError::InvalidConfig(_))));

        let narrow = RomConfig { cell_width: 0, ..RomConfig::default() };
        assert!(narrow.validate().is_err());

        let flat = RomConfig { cell_height: 0, ..RomConfig::default() };
        assert!(flat.validate().is_err());

        let tall = RomConfig { cell_height: 1 << 30, ..RomConfig::default() };
        assert!(matches!(tall.validate(), Err(RomError::InvalidConfig(_))));

        let tallest = RomConfig { cell_height: MAX_CELL_HEIGHT, ..RomConfig::default() };
        assert!(tallest.validate().is_ok());

        let tiny = RomConfig { point_size: 0, ..RomConfig::default() };
        assert!(tiny.validate().is_err());

        let small = RomConfig { cell_width: 5, cell_height: 7, ..RomConfig::default() };
        assert!(small.validate().is_ok());
        assert_eq!(small.table_len(), 95 * 7);
    }
}
