//! TrueType / OpenType table parsing.
//!
//! Parses the sfnt table directory and the tables needed to turn a character
//! into an outline: `head`, `hhea`, `maxp`, `cmap` (format 4), `loca`, `hmtx`.

use common::{Cursor, Endian, ParseError};

// ─────────────────────────────────────────────────────────────────────────────
// TableTag
// ─────────────────────────────────────────────────────────────────────────────

/// A 4-byte table tag identifying a TrueType/OpenType table.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TableTag(pub [u8; 4]);

impl TableTag {
    pub const HEAD: Self = Self(*b"head");
    pub const CMAP: Self = Self(*b"cmap");
    pub const GLYF: Self = Self(*b"glyf");
    pub const LOCA: Self = Self(*b"loca");
    pub const HHEA: Self = Self(*b"hhea");
    pub const HMTX: Self = Self(*b"hmtx");
    pub const MAXP: Self = Self(*b"maxp");
}

impl core::fmt::Debug for TableTag {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = core::str::from_utf8(&self.0).unwrap_or("????");
        write!(f, "TableTag('{s}')")
    }
}

impl core::fmt::Display for TableTag {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = core::str::from_utf8(&self.0).unwrap_or("????");
        write!(f, "{s}")
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// FontFile: table directory
// ─────────────────────────────────────────────────────────────────────────────

/// A single entry in the sfnt table directory.
#[derive(Clone, Copy, Debug)]
pub struct TableRecord {
    pub tag: TableTag,
    pub offset: u32,
    pub length: u32,
}

impl TableRecord {
    /// Byte range of the table within the font file.
    pub fn range(&self) -> core::ops::Range<usize> {
        let start = self.offset as usize;
        start..start.saturating_add(self.length as usize)
    }
}

/// A parsed font file with access to raw table data.
pub struct FontFile<'a> {
    pub data: &'a [u8],
    pub tables: Vec<TableRecord>,
}

impl<'a> FontFile<'a> {
    /// Parse the sfnt table directory from font file data.
    pub fn parse(data: &'a [u8]) -> Result<Self, ParseError> {
        let mut c = Cursor::new(data, Endian::Big);

        let sfnt_version = c.u32()?;
        // TrueType (0x00010000) or OpenType ('OTTO')
        if sfnt_version != 0x0001_0000 && sfnt_version != 0x4F54_544F {
            return Err(ParseError::InvalidValue("not a TrueType/OpenType font"));
        }

        let num_tables = c.u16()?;
        c.skip(6)?; // searchRange, entrySelector, rangeShift

        let mut tables = Vec::with_capacity(num_tables as usize);
        for _ in 0..num_tables {
            let tag_bytes = c.bytes(4)?;
            let tag = TableTag([tag_bytes[0], tag_bytes[1], tag_bytes[2], tag_bytes[3]]);
            let _checksum = c.u32()?;
            let offset = c.u32()?;
            let length = c.u32()?;
            tables.push(TableRecord { tag, offset, length });
        }

        Ok(FontFile { data, tables })
    }

    /// Find a table record by tag. Records pointing past the end of the
    /// file are treated as absent.
    pub fn find_table(&self, tag: TableTag) -> Option<&TableRecord> {
        self.tables
            .iter()
            .find(|t| t.tag == tag)
            .filter(|t| t.range().end <= self.data.len())
    }

    /// Find a table by tag and return its raw data slice.
    pub fn table_data(&self, tag: TableTag) -> Option<&'a [u8]> {
        let range = self.find_table(tag)?.range();
        self.data.get(range)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// head / hhea / maxp
// ─────────────────────────────────────────────────────────────────────────────

/// Parsed `head` table.
#[derive(Clone, Debug)]
pub struct HeadTable {
    pub units_per_em: u16,
    pub x_min: i16,
    pub y_min: i16,
    pub x_max: i16,
    pub y_max: i16,
    pub index_to_loc_format: i16, // 0 = short (u16), 1 = long (u32)
}

impl HeadTable {
    pub fn parse(data: &[u8]) -> Result<Self, ParseError> {
        let mut c = Cursor::new(data, Endian::Big);
        c.skip(16)?; // version, fontRevision, checksumAdjustment, magicNumber
        let _flags = c.u16()?;
        let units_per_em = c.u16()?;
        if units_per_em == 0 {
            return Err(ParseError::InvalidValue("unitsPerEm is zero"));
        }
        c.skip(16)?; // created + modified (LONGDATETIME × 2)
        let x_min = c.i16()?;
        let y_min = c.i16()?;
        let x_max = c.i16()?;
        let y_max = c.i16()?;
        c.skip(6)?; // macStyle, lowestRecPPEM, fontDirectionHint
        let index_to_loc_format = c.i16()?;

        Ok(HeadTable {
            units_per_em,
            x_min, y_min, x_max, y_max,
            index_to_loc_format,
        })
    }
}

/// Parsed `hhea` (horizontal header) table.
#[derive(Clone, Debug)]
pub struct HheaTable {
    pub ascender: i16,
    pub descender: i16,
    pub line_gap: i16,
    pub num_h_metrics: u16,
}

impl HheaTable {
    pub fn parse(data: &[u8]) -> Result<Self, ParseError> {
        let mut c = Cursor::new(data, Endian::Big);
        c.skip(4)?; // version
        let ascender = c.i16()?;
        let descender = c.i16()?;
        let line_gap = c.i16()?;
        let _advance_width_max = c.u16()?;
        c.skip(22)?; // min/max extents, caret fields, reserved, metricDataFormat
        let num_h_metrics = c.u16()?;
        if num_h_metrics == 0 {
            return Err(ParseError::InvalidValue("numberOfHMetrics is zero"));
        }

        Ok(HheaTable { ascender, descender, line_gap, num_h_metrics })
    }
}

/// Parsed `maxp` table.
#[derive(Clone, Debug)]
pub struct MaxpTable {
    pub num_glyphs: u16,
}

impl MaxpTable {
    pub fn parse(data: &[u8]) -> Result<Self, ParseError> {
        let mut c = Cursor::new(data, Endian::Big);
        let _version = c.u32()?;
        let num_glyphs = c.u16()?;
        Ok(MaxpTable { num_glyphs })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// cmap format 4
// ─────────────────────────────────────────────────────────────────────────────

/// Parsed `cmap` format 4 subtable (BMP character-to-glyph mapping).
#[derive(Clone, Debug)]
pub struct CmapFormat4 {
    end_code: Vec<u16>,
    start_code: Vec<u16>,
    id_delta: Vec<i16>,
    id_range_offset: Vec<u16>,
    glyph_id_array: Vec<u16>,
}

impl CmapFormat4 {
    /// Parse a format 4 subtable, starting at its `format` field.
    pub fn parse(data: &[u8]) -> Result<Self, ParseError> {
        let mut c = Cursor::new(data, Endian::Big);
        let format = c.u16()?;
        if format != 4 {
            return Err(ParseError::InvalidValue("only cmap format 4 is supported"));
        }
        let length = c.u16()? as usize;
        let _language = c.u16()?;
        let seg_count = (c.u16()? / 2) as usize;
        c.skip(6)?; // searchRange, entrySelector, rangeShift

        let read_u16s = |c: &mut Cursor<'_>| -> Result<Vec<u16>, ParseError> {
            (0..seg_count).map(|_| c.u16()).collect()
        };

        let end_code = read_u16s(&mut c)?;
        let _reserved_pad = c.u16()?;
        let start_code = read_u16s(&mut c)?;
        let id_delta = read_u16s(&mut c)?.into_iter().map(|d| d as i16).collect();
        let id_range_offset = read_u16s(&mut c)?;

        // Whatever is left inside `length` is the glyph id array. Some fonts
        // understate `length`, so also stop at the end of the data.
        let glyph_count = length.saturating_sub(c.position()).min(c.remaining()) / 2;
        let glyph_id_array = (0..glyph_count)
            .map(|_| c.u16())
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CmapFormat4 {
            end_code,
            start_code,
            id_delta,
            id_range_offset,
            glyph_id_array,
        })
    }

    /// Look up a glyph ID for a BMP codepoint. Unmapped codepoints return 0
    /// (`.notdef`).
    pub fn lookup(&self, codepoint: u16) -> u16 {
        // First segment whose end code is >= codepoint.
        let i = self.end_code.partition_point(|&end| end < codepoint);
        if i >= self.end_code.len() || self.start_code[i] > codepoint {
            return 0;
        }

        let delta = self.id_delta[i];
        let range_offset = self.id_range_offset[i] as usize;
        if range_offset == 0 {
            return codepoint.wrapping_add(delta as u16);
        }

        // idRangeOffset is relative to its own slot in the idRangeOffset
        // array; rebase it onto glyph_id_array.
        let seg_count = self.end_code.len();
        let idx = (range_offset / 2 + (codepoint - self.start_code[i]) as usize + i)
            .checked_sub(seg_count);

        match idx.and_then(|idx| self.glyph_id_array.get(idx)) {
            Some(&0) | None => 0,
            Some(&gid) => gid.wrapping_add(delta as u16),
        }
    }
}

/// Find and parse the best cmap subtable: Microsoft Unicode BMP (3, 1)
/// first, then any Unicode-platform subtable.
pub fn parse_cmap(data: &[u8]) -> Result<CmapFormat4, ParseError> {
    let mut c = Cursor::new(data, Endian::Big);
    let _version = c.u16()?;
    let num_tables = c.u16()?;

    let mut best_offset: Option<u32> = None;
    for _ in 0..num_tables {
        let platform_id = c.u16()?;
        let encoding_id = c.u16()?;
        let offset = c.u32()?;

        if platform_id == 3 && encoding_id == 1 {
            best_offset = Some(offset);
            break;
        }
        if platform_id == 0 && best_offset.is_none() {
            best_offset = Some(offset);
        }
    }

    let offset = best_offset.ok_or(ParseError::InvalidValue("no suitable cmap subtable found"))?;
    let subtable = data.get(offset as usize..).ok_or(ParseError::UnexpectedEof)?;
    CmapFormat4::parse(subtable)
}

// ─────────────────────────────────────────────────────────────────────────────
// loca / hmtx
// ─────────────────────────────────────────────────────────────────────────────

/// Get the byte range `(start, end)` of a glyph within the `glyf` table.
///
/// `index_to_loc_format`: 0 = short (offsets are u16 × 2), 1 = long (offsets are u32).
pub fn get_glyph_offset(loca_data: &[u8], glyph_id: u16, index_to_loc_format: i16) -> Result<(u32, u32), ParseError> {
    let mut c = Cursor::new(loca_data, Endian::Big);
    let (offset, next_offset) = if index_to_loc_format == 0 {
        c.skip(glyph_id as usize * 2)?;
        (c.u16()? as u32 * 2, c.u16()? as u32 * 2)
    } else {
        c.skip(glyph_id as usize * 4)?;
        (c.u32()?, c.u32()?)
    };

    if next_offset < offset {
        return Err(ParseError::LengthOutOfRange("loca offsets are not ascending"));
    }
    Ok((offset, next_offset))
}

/// Horizontal metrics for a glyph.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HMetric {
    pub advance_width: u16,
    pub left_side_bearing: i16,
}

/// Get horizontal metrics for a glyph.
///
/// Glyphs past `num_h_metrics` share the last advance width and take their
/// left side bearing from the trailing LSB array.
pub fn get_hmetric(hmtx_data: &[u8], glyph_id: u16, num_h_metrics: u16) -> Result<HMetric, ParseError> {
    let mut c = Cursor::new(hmtx_data, Endian::Big);

    if glyph_id < num_h_metrics {
        c.skip(glyph_id as usize * 4)?;
        let advance_width = c.u16()?;
        let left_side_bearing = c.i16()?;
        return Ok(HMetric { advance_width, left_side_bearing });
    }

    c.skip((num_h_metrics as usize).saturating_sub(1) * 4)?;
    let advance_width = c.u16()?;
    let _last_lsb = c.i16()?;
    c.skip((glyph_id - num_h_metrics) as usize * 2)?;
    let left_side_bearing = c.i16()?;
    Ok(HMetric { advance_width, left_side_bearing })
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn be16(vals: &[u16]) -> Vec<u8> {
        vals.iter().flat_map(|v| v.to_be_bytes()).collect()
    }

    #[test]
    fn table_tag_display() {
        assert_eq!(format!("{}", TableTag::HEAD), "head");
        assert_eq!(format!("{:?}", TableTag::GLYF), "TableTag('glyf')");
    }

    #[test]
    fn parse_font_file_bad_magic() {
        let data = [0u8; 12];
        assert!(FontFile::parse(&data).is_err());
    }

    #[test]
    fn table_record_past_end_is_absent() {
        let mut data = Vec::new();
        data.extend_from_slice(&0x0001_0000u32.to_be_bytes());
        data.extend_from_slice(&be16(&[1, 0, 0, 0]));
        data.extend_from_slice(b"head");
        data.extend_from_slice(&0u32.to_be_bytes()); // checksum
        data.extend_from_slice(&28u32.to_be_bytes()); // offset
        data.extend_from_slice(&100u32.to_be_bytes()); // length, past the end

        let ff = FontFile::parse(&data).unwrap();
        assert_eq!(ff.tables.len(), 1);
        assert!(ff.find_table(TableTag::HEAD).is_none());
        assert!(ff.table_data(TableTag::HEAD).is_none());
    }

    #[test]
    fn head_table_parse() {
        let mut data = vec![0u8; 54];
        data[18] = 0x03; data[19] = 0xE8; // unitsPerEm = 1000
        data[38] = 0xFF; data[39] = 0x38; // yMin = -200
        data[50] = 0; data[51] = 1; // long loca

        let head = HeadTable::parse(&data).unwrap();
        assert_eq!(head.units_per_em, 1000);
        assert_eq!(head.y_min, -200);
        assert_eq!(head.index_to_loc_format, 1);
    }

    #[test]
    fn head_table_rejects_zero_units_per_em() {
        let data = vec![0u8; 54];
        assert!(HeadTable::parse(&data).is_err());
    }

    #[test]
    fn hhea_table_parse() {
        let mut data = vec![0u8; 36];
        data[4..6].copy_from_slice(&800i16.to_be_bytes());
        data[6..8].copy_from_slice(&(-200i16).to_be_bytes());
        data[34..36].copy_from_slice(&3u16.to_be_bytes());

        let hhea = HheaTable::parse(&data).unwrap();
        assert_eq!(hhea.ascender, 800);
        assert_eq!(hhea.descender, -200);
        assert_eq!(hhea.num_h_metrics, 3);
    }

    #[test]
    fn maxp_table_parse() {
        let data = [0, 0, 0x50, 0, 0x01, 0x00];
        assert_eq!(MaxpTable::parse(&data).unwrap().num_glyphs, 256);
    }

    /// Two segments: 'A'..='C' by delta, 'a'..='b' through the glyph id
    /// array, plus the mandatory 0xFFFF terminator.
    fn sample_cmap4() -> Vec<u8> {
        let seg_count = 3u16;
        let mut body = Vec::new();
        body.extend_from_slice(&be16(&[0x43, 0x62, 0xFFFF])); // endCode
        body.extend_from_slice(&be16(&[0])); // reservedPad
        body.extend_from_slice(&be16(&[0x41, 0x61, 0xFFFF])); // startCode
        body.extend_from_slice(&be16(&[(10i16 - 0x41) as u16, 0, 1])); // idDelta
        // idRangeOffset for segment 1 points two slots past itself, which is
        // the start of glyph_id_array.
        body.extend_from_slice(&be16(&[0, 4, 0]));
        body.extend_from_slice(&be16(&[20, 0])); // glyph ids for 'a', 'b'

        let mut data = be16(&[4, 14 + body.len() as u16, 0, seg_count * 2, 4, 1, 2]);
        data.extend_from_slice(&body);
        data
    }

    #[test]
    fn cmap4_lookup_by_delta() {
        let cmap = CmapFormat4::parse(&sample_cmap4()).unwrap();
        assert_eq!(cmap.lookup(0x41), 10);
        assert_eq!(cmap.lookup(0x43), 12);
    }

    #[test]
    fn cmap4_lookup_by_range_offset() {
        let cmap = CmapFormat4::parse(&sample_cmap4()).unwrap();
        assert_eq!(cmap.lookup(0x61), 20);
        // A zero entry in the glyph id array means unmapped.
        assert_eq!(cmap.lookup(0x62), 0);
    }

    #[test]
    fn cmap4_unmapped_codepoints() {
        let cmap = CmapFormat4::parse(&sample_cmap4()).unwrap();
        assert_eq!(cmap.lookup(0x20), 0);
        assert_eq!(cmap.lookup(0x50), 0);
    }

    #[test]
    fn parse_cmap_prefers_windows_unicode() {
        let sub = sample_cmap4();
        let mut data = be16(&[0, 2]);
        // (1, 0) Macintosh record pointing at garbage, then (3, 1).
        data.extend_from_slice(&be16(&[1, 0]));
        data.extend_from_slice(&0xFFFFu32.to_be_bytes());
        data.extend_from_slice(&be16(&[3, 1]));
        data.extend_from_slice(&20u32.to_be_bytes());
        data.extend_from_slice(&sub);

        let cmap = parse_cmap(&data).unwrap();
        assert_eq!(cmap.lookup(0x42), 11);
    }

    #[test]
    fn parse_cmap_without_unicode_subtable() {
        let mut data = be16(&[0, 1, 1, 0]);
        data.extend_from_slice(&12u32.to_be_bytes());
        assert!(parse_cmap(&data).is_err());
    }

    #[test]
    fn loca_short_format() {
        let data = be16(&[0, 50, 120, 200]);
        assert_eq!(get_glyph_offset(&data, 1, 0).unwrap(), (100, 240));
    }

    #[test]
    fn loca_long_format() {
        let data: Vec<u8> = [0u32, 100, 240, 400].iter().flat_map(|v| v.to_be_bytes()).collect();
        assert_eq!(get_glyph_offset(&data, 2, 1).unwrap(), (240, 400));
        assert!(get_glyph_offset(&data, 3, 1).is_err());
    }

    #[test]
    fn loca_descending_offsets_rejected() {
        let data = be16(&[0, 50, 10]);
        assert!(get_glyph_offset(&data, 1, 0).is_err());
    }

    #[test]
    fn hmtx_long_and_trailing_lsb() {
        // Two full metrics, then one trailing LSB.
        let data = be16(&[600, 10, 500, (-5i16) as u16, 7]);
        assert_eq!(
            get_hmetric(&data, 1, 2).unwrap(),
            HMetric { advance_width: 500, left_side_bearing: -5 }
        );
        assert_eq!(
            get_hmetric(&data, 2, 2).unwrap(),
            HMetric { advance_width: 500, left_side_bearing: 7 }
        );
    }
}
