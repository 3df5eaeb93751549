//! Font resolution: first existing candidate wins.

use std::path::{Path, PathBuf};

use log::trace;

use crate::error::RomError;

/// Return the first candidate path that exists on disk.
pub fn resolve_font(candidates: &[PathBuf]) -> Result<&Path, RomError> {
    for path in candidates {
        if std::fs::metadata(path).is_ok() {
            return Ok(path.as_path());
        }
        trace!("font candidate {} does not exist", path.display());
    }
    Err(RomError::NoUsableFont { tried: candidates.len() })
}
