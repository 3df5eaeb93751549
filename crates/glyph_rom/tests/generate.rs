use std::fs;
use std::path::{Path, PathBuf};

use font::synth::{FontBuilder, rect};
use glyph_rom::coe::parse_coe;
use glyph_rom::{RomConfig, RomError, generate};

/// A font whose em is 16 units, so at 16px every unit is one pixel and the
/// 12/-4 line box fills a 16-row cell exactly.
fn test_font() -> Vec<u8> {
    let mut fb = FontBuilder::new(16, 12, -4);
    let block = fb.glyph(8, vec![rect(0, -4, 8, 12)]);
    let left = fb.glyph(8, vec![rect(0, 0, 1, 12)]);
    let right = fb.glyph(8, vec![rect(7, 0, 8, 12)]);
    let huge = fb.glyph(20, vec![rect(0, -10, 20, 20)]);
    let blank = fb.glyph(8, Vec::new());
    fb.map('#', block)
        .map('[', left)
        .map(']', right)
        .map('W', huge)
        .map(' ', blank);
    fb.build()
}

fn config(dir: &Path, candidates: Vec<PathBuf>) -> RomConfig {
    RomConfig {
        output_path: dir.join("font_printable.coe"),
        font_candidates: candidates,
        point_size: 16,
        ..RomConfig::default()
    }
}

fn block(bytes: &[u8], ch: char) -> &[u8] {
    let start = (ch as usize - 0x20) * 16;
    &bytes[start..start + 16]
}

#[test]
fn writes_full_table() {
    let dir = tempfile::tempdir().unwrap();
    let font = dir.path().join("mono.ttf");
    fs::write(&font, test_font()).unwrap();

    let cfg = config(dir.path(), vec![font.clone()]);
    let report = generate(&cfg).unwrap();
    assert_eq!(report.font_path, font);
    assert_eq!(report.byte_count, 1520);
    assert!(report.output_path.is_absolute());

    let text = fs::read_to_string(&cfg.output_path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "memory_initialization_radix=16;");
    assert_eq!(lines[1], "memory_initialization_vector=");
    assert_eq!(lines.len(), 2 + 95 + 1);
    assert_eq!(*lines.last().unwrap(), ";");
    for line in &lines[2..97] {
        assert_eq!(line.len(), 16 * 3);
        assert!(line.split_terminator(',').all(|t| {
            t.len() == 2 && t.chars().all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c))
        }));
    }

    let bytes = parse_coe(&text).unwrap();
    assert_eq!(bytes.len(), 1520);
    assert_eq!(block(&bytes, ' '), &[0u8; 16]);
    assert_eq!(block(&bytes, '#'), &[0xFFu8; 16]);
    assert_eq!(block(&bytes, 'W'), &[0xFFu8; 16]);
    assert_eq!(block(&bytes, 'A'), &[0u8; 16]);
}

#[test]
fn leftmost_pixel_is_most_significant_bit() {
    let dir = tempfile::tempdir().unwrap();
    let font = dir.path().join("mono.ttf");
    fs::write(&font, test_font()).unwrap();

    let cfg = config(dir.path(), vec![font]);
    generate(&cfg).unwrap();
    let bytes = parse_coe(&fs::read_to_string(&cfg.output_path).unwrap()).unwrap();

    for row in 0..16 {
        let inked = (2..14).contains(&row);
        assert_eq!(block(&bytes, '[')[row], if inked { 0x80 } else { 0x00 });
        assert_eq!(block(&bytes, ']')[row], if inked { 0x01 } else { 0x00 });
    }
}

#[test]
fn first_existing_candidate_is_used() {
    let dir = tempfile::tempdir().unwrap();
    let font = dir.path().join("third.ttf");
    fs::write(&font, test_font()).unwrap();

    let candidates = vec![dir.path().join("first.ttf"), dir.path().join("second.ttf"), font.clone()];
    let report = generate(&config(dir.path(), candidates)).unwrap();
    assert_eq!(report.font_path, font);
}

#[test]
fn no_font_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path(), vec![dir.path().join("missing.ttf")]);

    let err = generate(&cfg).unwrap_err();
    assert!(matches!(err, RomError::NoUsableFont { tried: 1 }));
    assert!(!cfg.output_path.exists());
}

#[test]
fn unreadable_font_is_a_font_error() {
    let dir = tempfile::tempdir().unwrap();
    let font = dir.path().join("broken.ttf");
    fs::write(&font, b"not a font").unwrap();

    let cfg = config(dir.path(), vec![font.clone()]);
    match generate(&cfg) {
        Err(RomError::Font { path, .. }) => assert_eq!(path, font),
        other => panic!("expected font error, got {other:?}"),
    }
    assert!(!cfg.output_path.exists());
}

#[test]
fn output_is_deterministic_and_overwritten() {
    let dir = tempfile::tempdir().unwrap();
    let font = dir.path().join("mono.ttf");
    fs::write(&font, test_font()).unwrap();
    let cfg = config(dir.path(), vec![font]);

    fs::write(&cfg.output_path, "stale contents that are longer than nothing").unwrap();
    generate(&cfg).unwrap();
    let first = fs::read(&cfg.output_path).unwrap();
    generate(&cfg).unwrap();
    let second = fs::read(&cfg.output_path).unwrap();

    assert_eq!(first, second);
    assert!(first.starts_with(b"memory_initialization_radix=16;"));
}
