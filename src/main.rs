//! fontrom: renders printable ASCII from a monospace TrueType font into a
//! 1520-byte 8×16 glyph ROM image (`font_printable.coe`).

use std::io::{self, Write};
use std::process::ExitCode;

use glyph_rom::{RomConfig, RomError, generate};
use log::{LevelFilter, error};
use simple_logger::SimpleLogger;

const NO_FONT_MESSAGE: &str =
    "No candidate font found. Add the path of a monospace TrueType font to the font candidate list.";

fn main() -> ExitCode {
    if let Err(e) = SimpleLogger::new().with_level(LevelFilter::Info).init() {
        eprintln!("logger init failed: {e}");
    }

    match run(&RomConfig::default(), &mut io::stdout().lock()) {
        Ok(status) => ExitCode::from(status),
        Err(e) => {
            eprintln!("stdout: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Generate the ROM, write the one-line outcome to `out` and return the
/// process exit status: 0 on success, 1 otherwise.
fn run<W: Write>(config: &RomConfig, out: &mut W) -> io::Result<u8> {
    match generate(config) {
        Ok(report) => {
            writeln!(out, "{report}")?;
            Ok(0)
        }
        Err(RomError::NoUsableFont { .. }) => {
            writeln!(out, "{NO_FONT_MESSAGE}")?;
            Ok(1)
        }
        Err(e) => {
            error!("{e}");
            Ok(1)
        }
    }
}
