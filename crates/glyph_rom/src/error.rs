use std::path::PathBuf;

use font::FaceError;
use thiserror::Error;

/// Everything that can stop a glyph ROM from being generated.
#[derive(Debug, Error)]
pub enum RomError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),

    /// None of the candidate font paths exist. Raised before any rendering.
    #[error("no usable font found among {tried} candidate path(s)")]
    NoUsableFont { tried: usize },

    #[error("font {}: {source}", path.display())]
    Font {
        path: PathBuf,
        #[source]
        source: FaceError,
    },

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from reading a memory-initialization file back.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoeError {
    #[error("missing `{0}` header")]
    MissingHeader(&'static str),

    #[error("unsupported radix {0}, only 16 is supported")]
    UnsupportedRadix(String),

    #[error("line {line}: `{token}` is not a two-digit hex byte")]
    BadToken { line: usize, token: String },

    #[error("missing `;` terminator")]
    MissingTerminator,
}
