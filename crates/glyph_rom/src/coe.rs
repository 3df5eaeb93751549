//! Memory-initialization (COE) text format.
//!
//! ```text
//! memory_initialization_radix=16;
//! memory_initialization_vector=
//! 00,00,00,00,00,00,00,00,00,00,00,00,00,00,00,00,
//! ...
//! ;
//! ```
//!
//! Every byte is two uppercase hex digits followed by a comma, sixteen per
//! line. The vector is closed by a line holding a single `;`.

use std::io::{self, Write};

use crate::error::CoeError;

const RADIX_KEY: &str = "memory_initialization_radix";
const VECTOR_KEY: &str = "memory_initialization_vector";

/// Bytes per vector line.
pub const BYTES_PER_LINE: usize = 16;

/// Write `bytes` as a radix-16 COE document.
pub fn write_coe<W: Write>(out: &mut W, bytes: &[u8]) -> io::Result<()> {
    writeln!(out, "{RADIX_KEY}=16;")?;
    writeln!(out, "{VECTOR_KEY}=")?;
    for line in bytes.chunks(BYTES_PER_LINE) {
        for byte in line {
            write!(out, "{byte:02X},")?;
        }
        writeln!(out)?;
    }
    writeln!(out, ";")
}

/// Read a radix-16 COE document back into bytes.
///
/// Hex digits may be either case, and the final value may carry the `;`
/// itself (`AA,BB;`) instead of a separate terminator line.
pub fn parse_coe(text: &str) -> Result<Vec<u8>, CoeError> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty());

    let radix = lines
        .next()
        .and_then(|(_, line)| header_value(line, RADIX_KEY))
        .ok_or(CoeError::MissingHeader(RADIX_KEY))?;
    let radix = radix.trim_end_matches(';').trim();
    if radix != "16" {
        return Err(CoeError::UnsupportedRadix(radix.to_string()));
    }

    lines
        .next()
        .and_then(|(_, line)| header_value(line, VECTOR_KEY))
        .ok_or(CoeError::MissingHeader(VECTOR_KEY))?;

    let mut bytes = Vec::new();
    for (line_no, line) in lines {
        let (body, terminated) = match line.strip_suffix(';') {
            Some(body) => (body, true),
            None => (line, false),
        };
        for token in body.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            bytes.push(parse_hex_byte(token).ok_or_else(|| CoeError::BadToken {
                line: line_no,
                token: token.to_string(),
            })?);
        }
        if terminated {
            return Ok(bytes);
        }
    }
    Err(CoeError::MissingTerminator)
}

fn header_value<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    let (name, value) = line.split_once('=')?;
    (name.trim() == key).then(|| value.trim())
}

fn parse_hex_byte(token: &str) -> Option<u8> {
    if token.len() != 2 || !token.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u8::from_str_radix(token, 16).ok()
}
