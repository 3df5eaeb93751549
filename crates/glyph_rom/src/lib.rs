//! Glyph ROM generation.
//!
//! Renders the printable ASCII range `0x20..=0x7E` from a TrueType font into
//! fixed-size monochrome cells, packs each row into one byte (leftmost pixel
//! in the most significant bit), and writes the result as a radix-16
//! memory-initialization file for an FPGA block RAM.

pub mod canvas;
pub mod coe;
pub mod config;
pub mod error;
pub mod pack;
pub mod render;
pub mod resolve;
pub mod table;

use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use font::Face;
use log::info;

pub use config::{GLYPH_COUNT, RomConfig};
pub use error::{CoeError, RomError};
pub use table::{GlyphTable, encode_charset};

/// Outcome of a successful [`generate`] run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Report {
    /// The font that was rendered.
    pub font_path: PathBuf,
    /// Absolute path of the written file.
    pub output_path: PathBuf,
    /// Number of glyph bytes written.
    pub byte_count: usize,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Wrote {} ({} bytes) using {}",
            self.output_path.display(),
            self.byte_count,
            self.font_path.display()
        )
    }
}

/// Resolve a font, encode the character set and write the COE file.
///
/// When no candidate font exists this fails with [`RomError::NoUsableFont`]
/// before anything is written. An existing output file is overwritten.
pub fn generate(config: &RomConfig) -> Result<Report, RomError> {
    config.validate()?;

    let font_path = resolve::resolve_font(&config.font_candidates)?.to_path_buf();
    info!("using font {}", font_path.display());

    let font_err = |source| RomError::Font { path: font_path.clone(), source };
    let face = Face::load(&font_path).map_err(font_err)?;
    let table = encode_charset(&face, config).map_err(font_err)?;

    write_table(&config.output_path, table.bytes())?;
    let output_path = std::path::absolute(&config.output_path).map_err(|source| RomError::Io {
        path: config.output_path.clone(),
        source,
    })?;
    info!("wrote {} bytes to {}", table.len(), output_path.display());

    Ok(Report {
        font_path,
        output_path,
        byte_count: table.len(),
    })
}

fn write_table(path: &Path, bytes: &[u8]) -> Result<(), RomError> {
    let io_err = |source| RomError::Io { path: path.to_path_buf(), source };
    let mut out = BufWriter::new(File::create(path).map_err(io_err)?);
    coe::write_coe(&mut out, bytes).map_err(io_err)?;
    out.flush().map_err(io_err)
}
