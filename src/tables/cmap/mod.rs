//! `cmap` — character-to-glyph mapping, dispatched over encoding records
//! and nine subtable formats.
//!
//! Identical subtable offsets across encoding records share one parsed
//! [`Subtable`] via `Arc`, the way the teacher's cmap decoder deduplicates
//! before allocating.
//!
//! See <https://docs.microsoft.com/en-us/typography/opentype/spec/cmap>.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::reader::Reader;

#[derive(Debug, Clone, PartialEq)]
pub struct CmapTable {
    pub version: u16,
    pub encoding_records: Vec<EncodingRecord>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EncodingRecord {
    pub platform_id: u16,
    pub encoding_id: u16,
    pub subtable: Arc<Subtable>,
}

/// Priority order for resolving "the" cmap subtable to use for general
/// Unicode lookups, highest preference first.
const PREFERRED_ENCODINGS: &[(u16, u16)] = &[(3, 10), (0, 4), (0, 6), (3, 1), (0, 3), (0, 2), (0, 1), (0, 0)];

impl CmapTable {
    pub fn parse(r: &mut Reader) -> Result<Self> {
        let table_start = r.window_start();
        let version = r.read_u16()?;
        let num_tables = r.read_u16()?;

        struct Raw {
            platform_id: u16,
            encoding_id: u16,
            offset: u32,
        }
        let mut raw_records = Vec::with_capacity(num_tables as usize);
        for _ in 0..num_tables {
            raw_records.push(Raw {
                platform_id: r.read_u16()?,
                encoding_id: r.read_u16()?,
                offset: r.read_u32()?,
            });
        }

        let mut by_offset: Vec<(u32, Arc<Subtable>)> = Vec::new();
        let mut encoding_records = Vec::with_capacity(raw_records.len());
        for raw in raw_records {
            let subtable = if let Some((_, existing)) = by_offset.iter().find(|(off, _)| *off == raw.offset) {
                existing.clone()
            } else {
                let mut sub_r = r.window_at(table_start + raw.offset as usize, r.buffer_len() - table_start)?;
                let parsed = Arc::new(Subtable::parse(&mut sub_r)?);
                by_offset.push((raw.offset, parsed.clone()));
                parsed
            };
            encoding_records.push(EncodingRecord {
                platform_id: raw.platform_id,
                encoding_id: raw.encoding_id,
                subtable,
            });
        }

        Ok(CmapTable {
            version,
            encoding_records,
        })
    }

    /// The subtable matching the highest-priority supported
    /// platform/encoding pair present in this table.
    pub fn preferred_subtable(&self) -> Option<&Subtable> {
        for &(platform_id, encoding_id) in PREFERRED_ENCODINGS {
            if let Some(r) = self
                .encoding_records
                .iter()
                .find(|r| r.platform_id == platform_id && r.encoding_id == encoding_id)
            {
                return Some(&r.subtable);
            }
        }
        self.encoding_records.first().map(|r| r.subtable.as_ref())
    }

    pub fn glyph_id_for_char(&self, c: char) -> Option<u16> {
        self.preferred_subtable()?.glyph_id(c as u32)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Subtable {
    Format0(Format0),
    Format2(Format2),
    Format4(Format4),
    Format6(Format6),
    Format8(Format8),
    Format10(Format10),
    Format12(Format12),
    Format13(Format13),
    Format14(Format14),
}

impl Subtable {
    pub fn parse(r: &mut Reader) -> Result<Self> {
        let format = r.read_u16()?;
        match format {
            0 => Ok(Subtable::Format0(Format0::parse(r)?)),
            2 => Ok(Subtable::Format2(Format2::parse(r)?)),
            4 => Ok(Subtable::Format4(Format4::parse(r)?)),
            6 => Ok(Subtable::Format6(Format6::parse(r)?)),
            8 => Ok(Subtable::Format8(Format8::parse(r)?)),
            10 => Ok(Subtable::Format10(Format10::parse(r)?)),
            12 => Ok(Subtable::Format12(Format12::parse(r)?)),
            13 => Ok(Subtable::Format13(Format13::parse(r)?)),
            14 => Ok(Subtable::Format14(Format14::parse(r)?)),
            other => Err(Error::UnsupportedFormat {
                context: "cmap subtable",
                format: other as u32,
            }),
        }
    }

    /// Maps a Unicode scalar value to a glyph id. Format 14 (variation
    /// sequences) always reports no match here — use
    /// [`Format14::uvs_glyph_id`] for that lookup instead.
    pub fn glyph_id(&self, codepoint: u32) -> Option<u16> {
        match self {
            Subtable::Format0(t) => t.glyph_id(codepoint),
            Subtable::Format2(t) => t.glyph_id(codepoint),
            Subtable::Format4(t) => t.glyph_id(codepoint),
            Subtable::Format6(t) => t.glyph_id(codepoint),
            Subtable::Format8(t) => t.glyph_id(codepoint),
            Subtable::Format10(t) => t.glyph_id(codepoint),
            Subtable::Format12(t) => t.glyph_id(codepoint),
            Subtable::Format13(t) => t.glyph_id(codepoint),
            Subtable::Format14(_) => None,
        }
    }
}

/// Format 0: byte encoding table, 256 single-byte codes.
#[derive(Debug, Clone, PartialEq)]
pub struct Format0 {
    pub language: u16,
    pub glyph_id_array: [u8; 256],
}

impl Format0 {
    fn parse(r: &mut Reader) -> Result<Self> {
        let _length = r.read_u16()?;
        let language = r.read_u16()?;
        let bytes = r.read_bytes(256)?;
        let mut glyph_id_array = [0u8; 256];
        glyph_id_array.copy_from_slice(bytes);
        Ok(Format0 { language, glyph_id_array })
    }

    pub fn glyph_id(&self, codepoint: u32) -> Option<u16> {
        self.glyph_id_array.get(codepoint as usize).map(|&g| g as u16)
    }
}

/// Format 2: high-byte mapping through table, for legacy CJK encodings.
#[derive(Debug, Clone, PartialEq)]
pub struct Format2 {
    pub language: u16,
    pub sub_header_keys: [u16; 256],
    pub sub_headers: Vec<SubHeader>,
    pub glyph_id_array: Vec<u16>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubHeader {
    pub first_code: u16,
    pub entry_count: u16,
    pub id_delta: i16,
    pub id_range_offset: u16,
}

impl Format2 {
    fn parse(r: &mut Reader) -> Result<Self> {
        let _length = r.read_u16()?;
        let language = r.read_u16()?;
        let mut sub_header_keys = [0u16; 256];
        for key in sub_header_keys.iter_mut() {
            *key = r.read_u16()?;
        }
        let num_sub_headers = sub_header_keys.iter().map(|&k| k / 8).max().unwrap_or(0) as usize + 1;
        let mut sub_headers = Vec::with_capacity(num_sub_headers);
        for _ in 0..num_sub_headers {
            sub_headers.push(SubHeader {
                first_code: r.read_u16()?,
                entry_count: r.read_u16()?,
                id_delta: r.read_i16()?,
                id_range_offset: r.read_u16()?,
            });
        }
        let mut glyph_id_array = Vec::new();
        while let Ok(v) = r.read_u16() {
            glyph_id_array.push(v);
        }
        Ok(Format2 {
            language,
            sub_header_keys,
            sub_headers,
            glyph_id_array,
        })
    }

    pub fn glyph_id(&self, codepoint: u32) -> Option<u16> {
        if codepoint > 0xFFFF {
            return None;
        }
        let high_byte = (codepoint >> 8) & 0xFF;
        let low_byte = codepoint & 0xFF;
        let key = *self.sub_header_keys.get(high_byte as usize)?;
        let sub_header_index = (key / 8) as usize;
        let header = self.sub_headers.get(sub_header_index)?;

        let code = if key == 0 { codepoint & 0xFF } else { low_byte };
        if code < header.first_code as u32 || code >= (header.first_code as u32 + header.entry_count as u32) {
            return if key == 0 && sub_header_index == 0 {
                None
            } else {
                None
            };
        }

        let array_index = (header.id_range_offset / 2) as i64
            + (code as i64 - header.first_code as i64)
            - (self.sub_headers.len() as i64 - sub_header_index as i64);
        let glyph = *self.glyph_id_array.get(array_index.max(0) as usize)?;
        if glyph == 0 {
            return None;
        }
        Some(((glyph as i32 + header.id_delta as i32) & 0xFFFF) as u16)
    }
}

/// Format 4: segment mapping to delta values, the common BMP format.
#[derive(Debug, Clone, PartialEq)]
pub struct Format4 {
    pub language: u16,
    pub segments: Vec<Segment>,
    pub glyph_id_array: Vec<u16>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub start_code: u16,
    pub end_code: u16,
    pub id_delta: i16,
    pub id_range_offset: u16,
}

impl Format4 {
    fn parse(r: &mut Reader) -> Result<Self> {
        let _length = r.read_u16()?;
        let language = r.read_u16()?;
        let seg_count_x2 = r.read_u16()?;
        let seg_count = (seg_count_x2 / 2) as usize;
        let _search_range = r.read_u16()?;
        let _entry_selector = r.read_u16()?;
        let _range_shift = r.read_u16()?;

        let mut end_codes = Vec::with_capacity(seg_count);
        for _ in 0..seg_count {
            end_codes.push(r.read_u16()?);
        }
        let _reserved_pad = r.read_u16()?;
        let mut start_codes = Vec::with_capacity(seg_count);
        for _ in 0..seg_count {
            start_codes.push(r.read_u16()?);
        }
        let mut id_deltas = Vec::with_capacity(seg_count);
        for _ in 0..seg_count {
            id_deltas.push(r.read_i16()?);
        }
        let mut id_range_offsets = Vec::with_capacity(seg_count);
        for _ in 0..seg_count {
            id_range_offsets.push(r.read_u16()?);
        }
        let mut glyph_id_array = Vec::new();
        while let Ok(v) = r.read_u16() {
            glyph_id_array.push(v);
        }

        let segments = (0..seg_count)
            .map(|i| Segment {
                start_code: start_codes[i],
                end_code: end_codes[i],
                id_delta: id_deltas[i],
                id_range_offset: id_range_offsets[i],
            })
            .collect();

        Ok(Format4 {
            language,
            segments,
            glyph_id_array,
        })
    }

    pub fn glyph_id(&self, codepoint: u32) -> Option<u16> {
        if codepoint > 0xFFFF {
            return None;
        }
        let c = codepoint as u16;
        let seg_count = self.segments.len();
        let (i, seg) = self
            .segments
            .iter()
            .enumerate()
            .find(|(_, s)| c <= s.end_code && c >= s.start_code)?;

        if seg.id_range_offset == 0 {
            if c == 0xFFFF && seg.end_code == 0xFFFF && seg.start_code == 0xFFFF {
                return None;
            }
            return Some(((c as i32 + seg.id_delta as i32) & 0xFFFF) as u16);
        }

        let array_index =
            (seg.id_range_offset / 2) as i64 + (c as i64 - seg.start_code as i64) - (seg_count as i64 - i as i64);
        let glyph = *self.glyph_id_array.get(array_index.max(0) as usize)?;
        if glyph == 0 {
            return None;
        }
        Some(((glyph as i32 + seg.id_delta as i32) & 0xFFFF) as u16)
    }
}

/// Format 6: trimmed table mapping, a dense run of consecutive codes.
#[derive(Debug, Clone, PartialEq)]
pub struct Format6 {
    pub language: u16,
    pub first_code: u16,
    pub glyph_id_array: Vec<u16>,
}

impl Format6 {
    fn parse(r: &mut Reader) -> Result<Self> {
        let _length = r.read_u16()?;
        let language = r.read_u16()?;
        let first_code = r.read_u16()?;
        let entry_count = r.read_u16()?;
        let mut glyph_id_array = Vec::with_capacity(entry_count as usize);
        for _ in 0..entry_count {
            glyph_id_array.push(r.read_u16()?);
        }
        Ok(Format6 {
            language,
            first_code,
            glyph_id_array,
        })
    }

    pub fn glyph_id(&self, codepoint: u32) -> Option<u16> {
        let index = codepoint.checked_sub(self.first_code as u32)?;
        self.glyph_id_array.get(index as usize).copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoverageGroup {
    pub start_char_code: u32,
    pub end_char_code: u32,
    pub start_glyph_id: u32,
}

/// Format 8: mixed 16-bit and 32-bit coverage, for Mac OS encodings that
/// layer surrogate pairs over a format-6-like table. The `is32` bitfield
/// is retained for completeness but not consulted by `glyph_id`, since the
/// group list alone is sufficient to resolve any codepoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Format8 {
    pub language: u32,
    pub is32: Vec<u8>,
    pub groups: Vec<CoverageGroup>,
}

impl Format8 {
    fn parse(r: &mut Reader) -> Result<Self> {
        let _reserved = r.read_u16()?;
        let _length = r.read_u32()?;
        let language = r.read_u32()?;
        let is32 = r.read_bytes(8192)?.to_vec();
        let num_groups = r.read_u32()?;
        let mut groups = Vec::with_capacity(num_groups as usize);
        for _ in 0..num_groups {
            groups.push(CoverageGroup {
                start_char_code: r.read_u32()?,
                end_char_code: r.read_u32()?,
                start_glyph_id: r.read_u32()?,
            });
        }
        Ok(Format8 {
            language,
            is32,
            groups,
        })
    }

    pub fn glyph_id(&self, codepoint: u32) -> Option<u16> {
        let g = self
            .groups
            .iter()
            .find(|g| codepoint >= g.start_char_code && codepoint <= g.end_char_code)?;
        Some((g.start_glyph_id + (codepoint - g.start_char_code)) as u16)
    }
}

/// Format 10: trimmed array, a dense run of consecutive 32-bit codes.
#[derive(Debug, Clone, PartialEq)]
pub struct Format10 {
    pub language: u32,
    pub start_char_code: u32,
    pub glyph_id_array: Vec<u16>,
}

impl Format10 {
    fn parse(r: &mut Reader) -> Result<Self> {
        let _reserved = r.read_u16()?;
        let _length = r.read_u32()?;
        let language = r.read_u32()?;
        let start_char_code = r.read_u32()?;
        let num_chars = r.read_u32()?;
        let mut glyph_id_array = Vec::with_capacity(num_chars as usize);
        for _ in 0..num_chars {
            glyph_id_array.push(r.read_u16()?);
        }
        Ok(Format10 {
            language,
            start_char_code,
            glyph_id_array,
        })
    }

    pub fn glyph_id(&self, codepoint: u32) -> Option<u16> {
        let index = codepoint.checked_sub(self.start_char_code)?;
        self.glyph_id_array.get(index as usize).copied()
    }
}

/// Format 12: segmented coverage, the full-Unicode analogue of format 4.
#[derive(Debug, Clone, PartialEq)]
pub struct Format12 {
    pub language: u32,
    pub groups: Vec<CoverageGroup>,
}

impl Format12 {
    fn parse(r: &mut Reader) -> Result<Self> {
        let _reserved = r.read_u16()?;
        let _length = r.read_u32()?;
        let language = r.read_u32()?;
        let num_groups = r.read_u32()?;
        let mut groups = Vec::with_capacity(num_groups as usize);
        for _ in 0..num_groups {
            groups.push(CoverageGroup {
                start_char_code: r.read_u32()?,
                end_char_code: r.read_u32()?,
                start_glyph_id: r.read_u32()?,
            });
        }
        Ok(Format12 { language, groups })
    }

    pub fn glyph_id(&self, codepoint: u32) -> Option<u16> {
        let g = self
            .groups
            .binary_search_by(|g| {
                if codepoint < g.start_char_code {
                    std::cmp::Ordering::Greater
                } else if codepoint > g.end_char_code {
                    std::cmp::Ordering::Less
                } else {
                    std::cmp::Ordering::Equal
                }
            })
            .ok()
            .map(|i| &self.groups[i])?;
        Some((g.start_glyph_id + (codepoint - g.start_char_code)) as u16)
    }
}

/// Format 13: many-to-one range mapping, typically used for "last resort"
/// fallback fonts where an entire block maps to one glyph.
#[derive(Debug, Clone, PartialEq)]
pub struct Format13 {
    pub language: u32,
    pub groups: Vec<CoverageGroup>,
}

impl Format13 {
    fn parse(r: &mut Reader) -> Result<Self> {
        let _reserved = r.read_u16()?;
        let _length = r.read_u32()?;
        let language = r.read_u32()?;
        let num_groups = r.read_u32()?;
        let mut groups = Vec::with_capacity(num_groups as usize);
        for _ in 0..num_groups {
            groups.push(CoverageGroup {
                start_char_code: r.read_u32()?,
                end_char_code: r.read_u32()?,
                start_glyph_id: r.read_u32()?,
            });
        }
        Ok(Format13 { language, groups })
    }

    pub fn glyph_id(&self, codepoint: u32) -> Option<u16> {
        let g = self
            .groups
            .iter()
            .find(|g| codepoint >= g.start_char_code && codepoint <= g.end_char_code)?;
        Some(g.start_glyph_id as u16)
    }
}

/// Format 14: Unicode variation sequences. Distinct API from the other
/// formats since lookups are keyed on (base character, variation
/// selector) pairs rather than a character alone.
#[derive(Debug, Clone, PartialEq)]
pub struct Format14 {
    pub var_selector_records: Vec<VarSelectorRecord>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VarSelectorRecord {
    pub var_selector: u32,
    pub default_uvs: Vec<UnicodeRange>,
    pub non_default_uvs: Vec<UvsMapping>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnicodeRange {
    pub start_unicode_value: u32,
    pub additional_count: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UvsMapping {
    pub unicode_value: u32,
    pub glyph_id: u16,
}

/// What a format-14 lookup resolves a variation sequence to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariationGlyph {
    /// The sequence has a variant glyph distinct from the base character.
    Variant(u16),
    /// The sequence is registered but renders identically to the base
    /// character — the caller should fall back to its normal cmap lookup.
    UseDefault,
}

impl Format14 {
    fn parse(r: &mut Reader) -> Result<Self> {
        let table_start = r.window_start();
        let _length = r.read_u32()?;
        let num_var_selector_records = r.read_u32()?;

        struct RawRecord {
            var_selector: u32,
            default_uvs_offset: u32,
            non_default_uvs_offset: u32,
        }
        let mut raw = Vec::with_capacity(num_var_selector_records as usize);
        for _ in 0..num_var_selector_records {
            raw.push(RawRecord {
                var_selector: r.read_u24()?,
                default_uvs_offset: r.read_u32()?,
                non_default_uvs_offset: r.read_u32()?,
            });
        }

        let mut var_selector_records = Vec::with_capacity(raw.len());
        for rec in raw {
            let default_uvs = if rec.default_uvs_offset != 0 {
                let mut dr = r.window_at(table_start + rec.default_uvs_offset as usize, r.buffer_len() - table_start)?;
                let num_ranges = dr.read_u32()?;
                let mut ranges = Vec::with_capacity(num_ranges as usize);
                for _ in 0..num_ranges {
                    ranges.push(UnicodeRange {
                        start_unicode_value: dr.read_u24()?,
                        additional_count: dr.read_u8()?,
                    });
                }
                ranges
            } else {
                Vec::new()
            };

            let non_default_uvs = if rec.non_default_uvs_offset != 0 {
                let mut nr =
                    r.window_at(table_start + rec.non_default_uvs_offset as usize, r.buffer_len() - table_start)?;
                let num_mappings = nr.read_u32()?;
                let mut mappings = Vec::with_capacity(num_mappings as usize);
                for _ in 0..num_mappings {
                    mappings.push(UvsMapping {
                        unicode_value: nr.read_u24()?,
                        glyph_id: nr.read_u16()?,
                    });
                }
                mappings
            } else {
                Vec::new()
            };

            var_selector_records.push(VarSelectorRecord {
                var_selector: rec.var_selector,
                default_uvs,
                non_default_uvs,
            });
        }

        Ok(Format14 { var_selector_records })
    }

    pub fn uvs_glyph_id(&self, base_char: u32, variation_selector: u32) -> Option<VariationGlyph> {
        let record = self
            .var_selector_records
            .iter()
            .find(|r| r.var_selector == variation_selector)?;

        if let Some(m) = record.non_default_uvs.iter().find(|m| m.unicode_value == base_char) {
            return Some(VariationGlyph::Variant(m.glyph_id));
        }
        if record
            .default_uvs
            .iter()
            .any(|r| base_char >= r.start_unicode_value && base_char <= r.start_unicode_value + r.additional_count as u32)
        {
            return Some(VariationGlyph::UseDefault);
        }
        None
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn format0_maps_byte_codes() {
        let mut d = Vec::new();
        d.extend_from_slice(&262u16.to_be_bytes()); // length
        d.extend_from_slice(&0u16.to_be_bytes()); // language
        let mut glyphs = [0u8; 256];
        glyphs[65] = 10;
        d.extend_from_slice(&glyphs);
        let mut r = Reader::new(&d);
        let t = Format0::parse(&mut r).unwrap();
        assert_eq!(t.glyph_id(65), Some(10));
        assert_eq!(t.glyph_id(66), Some(0));
    }

    #[test]
    fn format4_resolves_simple_delta_segment() {
        // One segment [65, 90] with idDelta making glyph = code - 64, plus the
        // required terminator segment 0xFFFF/0xFFFF.
        let mut d = Vec::new();
        d.extend_from_slice(&0u16.to_be_bytes()); // length (unused by parser)
        d.extend_from_slice(&0u16.to_be_bytes()); // language
        d.extend_from_slice(&4u16.to_be_bytes()); // segCountX2 = 2 segments
        d.extend_from_slice(&0u16.to_be_bytes());
        d.extend_from_slice(&0u16.to_be_bytes());
        d.extend_from_slice(&0u16.to_be_bytes());
        // endCode[]
        d.extend_from_slice(&90u16.to_be_bytes());
        d.extend_from_slice(&0xFFFFu16.to_be_bytes());
        d.extend_from_slice(&0u16.to_be_bytes()); // reservedPad
        // startCode[]
        d.extend_from_slice(&65u16.to_be_bytes());
        d.extend_from_slice(&0xFFFFu16.to_be_bytes());
        // idDelta[]
        d.extend_from_slice(&(-64i16).to_be_bytes());
        d.extend_from_slice(&1i16.to_be_bytes());
        // idRangeOffset[]
        d.extend_from_slice(&0u16.to_be_bytes());
        d.extend_from_slice(&0u16.to_be_bytes());

        let mut r = Reader::new(&d);
        let t = Format4::parse(&mut r).unwrap();
        assert_eq!(t.glyph_id('A' as u32), Some(1));
        assert_eq!(t.glyph_id('Z' as u32), Some(26));
        assert_eq!(t.glyph_id(0xFFFF), None);
    }

    #[test]
    fn format6_trimmed_table() {
        let mut d = Vec::new();
        d.extend_from_slice(&0u16.to_be_bytes()); // length
        d.extend_from_slice(&0u16.to_be_bytes()); // language
        d.extend_from_slice(&100u16.to_be_bytes()); // first code
        d.extend_from_slice(&3u16.to_be_bytes()); // entry count
        d.extend_from_slice(&5u16.to_be_bytes());
        d.extend_from_slice(&6u16.to_be_bytes());
        d.extend_from_slice(&7u16.to_be_bytes());

        let mut r = Reader::new(&d);
        let t = Format6::parse(&mut r).unwrap();
        assert_eq!(t.glyph_id(101), Some(6));
        assert_eq!(t.glyph_id(99), None);
    }

    #[test]
    fn format12_binary_searches_groups() {
        let mut d = Vec::new();
        d.extend_from_slice(&0u16.to_be_bytes()); // reserved
        d.extend_from_slice(&0u32.to_be_bytes()); // length
        d.extend_from_slice(&0u32.to_be_bytes()); // language
        d.extend_from_slice(&2u32.to_be_bytes()); // numGroups
        d.extend_from_slice(&0x41u32.to_be_bytes());
        d.extend_from_slice(&0x5Au32.to_be_bytes());
        d.extend_from_slice(&1u32.to_be_bytes());
        d.extend_from_slice(&0x1F600u32.to_be_bytes());
        d.extend_from_slice(&0x1F60Fu32.to_be_bytes());
        d.extend_from_slice(&500u32.to_be_bytes());

        let mut r = Reader::new(&d);
        let t = Format12::parse(&mut r).unwrap();
        assert_eq!(t.glyph_id('A' as u32), Some(1));
        assert_eq!(t.glyph_id(0x1F602), Some(502));
        assert_eq!(t.glyph_id(0x100), None);
    }

    #[test]
    fn preferred_subtable_follows_priority_order() {
        let format4 = Subtable::Format4(Format4 {
            language: 0,
            segments: vec![],
            glyph_id_array: vec![],
        });
        let table = CmapTable {
            version: 0,
            encoding_records: vec![EncodingRecord {
                platform_id: 3,
                encoding_id: 1,
                subtable: Arc::new(format4),
            }],
        };
        assert!(table.preferred_subtable().is_some());
    }
}
