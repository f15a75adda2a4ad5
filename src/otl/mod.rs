//! Shared OpenType Layout (GSUB/GPOS) structures: script/feature/lookup
//! lists, coverage tables, class definitions, device tables, value
//! records and anchor points.
//!
//! These are decoded once here and reused by both [`crate::otl::gsub`] and
//! [`crate::otl::gpos`], the way the two tables share this substrate in
//! the OpenType spec itself.

pub mod gpos;
pub mod gsub;

use crate::error::Result;
use crate::reader::Reader;
use crate::tag::Tag;
use std::collections::BTreeMap;

/// `ScriptList` / `Script` / `LangSys` — the script → language-system →
/// feature-index hierarchy common to both GSUB and GPOS headers.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScriptList {
    pub scripts: Vec<ScriptRecord>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScriptRecord {
    pub tag: Tag,
    pub script: Script,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Script {
    pub default_lang_sys: Option<LangSys>,
    pub lang_sys_records: Vec<(Tag, LangSys)>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LangSys {
    pub required_feature_index: Option<u16>,
    pub feature_indices: Vec<u16>,
}

impl ScriptList {
    pub fn parse(r: &mut Reader) -> Result<Self> {
        let table_start = r.window_start();
        let count = r.read_u16()?;
        let mut records = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let tag = r.read_tag()?;
            let offset = r.read_u16()?;
            records.push((tag, offset));
        }
        let mut scripts = Vec::with_capacity(records.len());
        for (tag, offset) in records {
            let mut sr = r.window_at(table_start + offset as usize, r.buffer_len() - table_start)?;
            scripts.push(ScriptRecord {
                tag,
                script: Script::parse(&mut sr)?,
            });
        }
        Ok(ScriptList { scripts })
    }

    pub fn find(&self, tag: Tag) -> Option<&Script> {
        self.scripts.iter().find(|s| s.tag == tag).map(|s| &s.script)
    }
}

impl Script {
    fn parse(r: &mut Reader) -> Result<Self> {
        let table_start = r.window_start();
        let default_lang_sys_offset = r.read_u16()?;
        let default_lang_sys = if default_lang_sys_offset != 0 {
            let mut lr = r.window_at(
                table_start + default_lang_sys_offset as usize,
                r.buffer_len() - table_start,
            )?;
            Some(LangSys::parse(&mut lr)?)
        } else {
            None
        };
        let lang_sys_count = r.read_u16()?;
        let mut lang_sys_records = Vec::with_capacity(lang_sys_count as usize);
        for _ in 0..lang_sys_count {
            let tag = r.read_tag()?;
            let offset = r.read_u16()?;
            let mut lr = r.window_at(table_start + offset as usize, r.buffer_len() - table_start)?;
            lang_sys_records.push((tag, LangSys::parse(&mut lr)?));
        }
        Ok(Script {
            default_lang_sys,
            lang_sys_records,
        })
    }

    pub fn lang_sys(&self, tag: Tag) -> Option<&LangSys> {
        self.lang_sys_records.iter().find(|(t, _)| *t == tag).map(|(_, l)| l)
    }
}

impl LangSys {
    fn parse(r: &mut Reader) -> Result<Self> {
        let _lookup_order = r.read_u16()?; // reserved
        let required = r.read_u16()?;
        let required_feature_index = if required == 0xFFFF { None } else { Some(required) };
        let feature_index_count = r.read_u16()?;
        let mut feature_indices = Vec::with_capacity(feature_index_count as usize);
        for _ in 0..feature_index_count {
            feature_indices.push(r.read_u16()?);
        }
        Ok(LangSys {
            required_feature_index,
            feature_indices,
        })
    }
}

/// `FeatureList` / `Feature`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureList {
    pub features: Vec<FeatureRecord>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRecord {
    pub tag: Tag,
    pub lookup_list_indices: Vec<u16>,
}

impl FeatureList {
    pub fn parse(r: &mut Reader) -> Result<Self> {
        let table_start = r.window_start();
        let count = r.read_u16()?;
        let mut records = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let tag = r.read_tag()?;
            let offset = r.read_u16()?;
            records.push((tag, offset));
        }
        let mut features = Vec::with_capacity(records.len());
        for (tag, offset) in records {
            let mut fr = r.window_at(table_start + offset as usize, r.buffer_len() - table_start)?;
            let _feature_params = fr.read_u16()?;
            let lookup_count = fr.read_u16()?;
            let mut lookup_list_indices = Vec::with_capacity(lookup_count as usize);
            for _ in 0..lookup_count {
                lookup_list_indices.push(fr.read_u16()?);
            }
            features.push(FeatureRecord {
                tag,
                lookup_list_indices,
            });
        }
        Ok(FeatureList { features })
    }

    pub fn by_tag(&self, tag: Tag) -> impl Iterator<Item = &FeatureRecord> {
        self.features.iter().filter(move |f| f.tag == tag)
    }
}

/// A `LookupList` generic over the per-type subtable payload (`GsubLookup`
/// or `GposLookup`), since the outer list/flags/mark-filtering-set layout
/// is identical between GSUB and GPOS.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupList<T> {
    pub lookups: Vec<Lookup<T>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Lookup<T> {
    pub lookup_type: u16,
    pub lookup_flag: u16,
    pub subtables: Vec<T>,
    pub mark_filtering_set: Option<u16>,
}

impl Lookup<()> {
    pub const RIGHT_TO_LEFT: u16 = 0x0001;
    pub const IGNORE_BASE_GLYPHS: u16 = 0x0002;
    pub const IGNORE_LIGATURES: u16 = 0x0004;
    pub const IGNORE_MARKS: u16 = 0x0008;
    pub const USE_MARK_FILTERING_SET: u16 = 0x0010;
}

/// `Coverage` table, format 1 (glyph list) or format 2 (range list).
#[derive(Debug, Clone, PartialEq)]
pub enum Coverage {
    Format1 { glyphs: Vec<u16> },
    Format2 { ranges: Vec<RangeRecord> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeRecord {
    pub start_glyph_id: u16,
    pub end_glyph_id: u16,
    pub start_coverage_index: u16,
}

impl Coverage {
    pub fn parse(r: &mut Reader) -> Result<Self> {
        let format = r.read_u16()?;
        match format {
            1 => {
                let count = r.read_u16()?;
                let mut glyphs = Vec::with_capacity(count as usize);
                for _ in 0..count {
                    glyphs.push(r.read_u16()?);
                }
                Ok(Coverage::Format1 { glyphs })
            }
            _ => {
                let count = r.read_u16()?;
                let mut ranges = Vec::with_capacity(count as usize);
                for _ in 0..count {
                    ranges.push(RangeRecord {
                        start_glyph_id: r.read_u16()?,
                        end_glyph_id: r.read_u16()?,
                        start_coverage_index: r.read_u16()?,
                    });
                }
                Ok(Coverage::Format2 { ranges })
            }
        }
    }

    /// The coverage index for `glyph_id`, or `None` if not covered.
    pub fn index_of(&self, glyph_id: u16) -> Option<u16> {
        match self {
            Coverage::Format1 { glyphs } => glyphs.iter().position(|&g| g == glyph_id).map(|i| i as u16),
            Coverage::Format2 { ranges } => ranges.iter().find_map(|r| {
                if glyph_id >= r.start_glyph_id && glyph_id <= r.end_glyph_id {
                    Some(r.start_coverage_index + (glyph_id - r.start_glyph_id))
                } else {
                    None
                }
            }),
        }
    }

    pub fn contains(&self, glyph_id: u16) -> bool {
        self.index_of(glyph_id).is_some()
    }
}

/// `ClassDef` table, format 1 (contiguous glyph-to-class array) or format 2
/// (class-range list).
#[derive(Debug, Clone, PartialEq)]
pub enum ClassDef {
    Format1 {
        start_glyph_id: u16,
        class_values: Vec<u16>,
    },
    Format2 {
        ranges: Vec<ClassRangeRecord>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassRangeRecord {
    pub start_glyph_id: u16,
    pub end_glyph_id: u16,
    pub class: u16,
}

impl ClassDef {
    pub fn parse(r: &mut Reader) -> Result<Self> {
        let format = r.read_u16()?;
        match format {
            1 => {
                let start_glyph_id = r.read_u16()?;
                let count = r.read_u16()?;
                let mut class_values = Vec::with_capacity(count as usize);
                for _ in 0..count {
                    class_values.push(r.read_u16()?);
                }
                Ok(ClassDef::Format1 {
                    start_glyph_id,
                    class_values,
                })
            }
            _ => {
                let count = r.read_u16()?;
                let mut ranges = Vec::with_capacity(count as usize);
                for _ in 0..count {
                    ranges.push(ClassRangeRecord {
                        start_glyph_id: r.read_u16()?,
                        end_glyph_id: r.read_u16()?,
                        class: r.read_u16()?,
                    });
                }
                Ok(ClassDef::Format2 { ranges })
            }
        }
    }

    pub fn class_of(&self, glyph_id: u16) -> u16 {
        match self {
            ClassDef::Format1 {
                start_glyph_id,
                class_values,
            } => {
                if glyph_id < *start_glyph_id {
                    0
                } else {
                    class_values
                        .get((glyph_id - start_glyph_id) as usize)
                        .copied()
                        .unwrap_or(0)
                }
            }
            ClassDef::Format2 { ranges } => ranges
                .iter()
                .find(|r| glyph_id >= r.start_glyph_id && glyph_id <= r.end_glyph_id)
                .map(|r| r.class)
                .unwrap_or(0),
        }
    }
}

/// `Device` / `VariationIndex` table — hinting deltas per PPEM, or a
/// pointer into an item variation store. Stored as the raw
/// (start, end, format) plus decoded per-PPEM deltas for format 1-3; a
/// format of 0x8000 marks a `VariationIndex` table instead, whose two
/// 16-bit fields are `(outerIndex, innerIndex)`.
#[derive(Debug, Clone, PartialEq)]
pub enum Device {
    Hinting {
        start_size: u16,
        end_size: u16,
        delta_values: Vec<i8>,
    },
    VariationIndex { outer_index: u16, inner_index: u16 },
}

impl Device {
    pub fn parse(r: &mut Reader) -> Result<Self> {
        let start_size = r.read_u16()?;
        let end_size = r.read_u16()?;
        let format = r.read_u16()?;
        if format == 0x8000 {
            return Ok(Device::VariationIndex {
                outer_index: start_size,
                inner_index: end_size,
            });
        }
        let num_sizes = (end_size - start_size + 1) as usize;
        let bits_per_value = match format {
            1 => 2,
            2 => 4,
            3 => 8,
            _ => 8,
        };
        let values_per_word = 16 / bits_per_value;
        let word_count = (num_sizes + values_per_word - 1) / values_per_word;
        let mut delta_values = Vec::with_capacity(num_sizes);
        for _ in 0..word_count {
            let word = r.read_u16()?;
            for i in 0..values_per_word {
                if delta_values.len() >= num_sizes {
                    break;
                }
                let shift = 16 - bits_per_value * (i + 1);
                let mask = (1u16 << bits_per_value) - 1;
                let raw = (word >> shift) & mask;
                let sign_bit = 1u16 << (bits_per_value - 1);
                let signed = if raw & sign_bit != 0 {
                    (raw as i32 - (mask as i32 + 1)) as i8
                } else {
                    raw as i8
                };
                delta_values.push(signed);
            }
        }
        Ok(Device::Hinting {
            start_size,
            end_size,
            delta_values,
        })
    }
}

/// `ValueRecord` — a sparse set of positioning adjustments, whose present
/// fields are driven by an externally-supplied format bitmask (GPOS
/// §2.2.4). Device-table offsets are resolved eagerly against the
/// subtable's own start, matching how every other offset in this crate is
/// resolved immediately rather than lazily.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValueRecord {
    pub x_placement: i16,
    pub y_placement: i16,
    pub x_advance: i16,
    pub y_advance: i16,
    pub x_placement_device: Option<Device>,
    pub y_placement_device: Option<Device>,
    pub x_advance_device: Option<Device>,
    pub y_advance_device: Option<Device>,
}

pub mod value_format {
    pub const X_PLACEMENT: u16 = 0x0001;
    pub const Y_PLACEMENT: u16 = 0x0002;
    pub const X_ADVANCE: u16 = 0x0004;
    pub const Y_ADVANCE: u16 = 0x0008;
    pub const X_PLACEMENT_DEVICE: u16 = 0x0010;
    pub const Y_PLACEMENT_DEVICE: u16 = 0x0020;
    pub const X_ADVANCE_DEVICE: u16 = 0x0040;
    pub const Y_ADVANCE_DEVICE: u16 = 0x0080;
}

impl ValueRecord {
    pub fn parse(r: &mut Reader, format: u16, subtable_start: usize) -> Result<Self> {
        use value_format::*;
        let mut v = ValueRecord::default();
        if format & X_PLACEMENT != 0 {
            v.x_placement = r.read_i16()?;
        }
        if format & Y_PLACEMENT != 0 {
            v.y_placement = r.read_i16()?;
        }
        if format & X_ADVANCE != 0 {
            v.x_advance = r.read_i16()?;
        }
        if format & Y_ADVANCE != 0 {
            v.y_advance = r.read_i16()?;
        }
        if format & X_PLACEMENT_DEVICE != 0 {
            v.x_placement_device = Self::read_device(r, subtable_start)?;
        }
        if format & Y_PLACEMENT_DEVICE != 0 {
            v.y_placement_device = Self::read_device(r, subtable_start)?;
        }
        if format & X_ADVANCE_DEVICE != 0 {
            v.x_advance_device = Self::read_device(r, subtable_start)?;
        }
        if format & Y_ADVANCE_DEVICE != 0 {
            v.y_advance_device = Self::read_device(r, subtable_start)?;
        }
        Ok(v)
    }

    fn read_device(r: &mut Reader, subtable_start: usize) -> Result<Option<Device>> {
        let offset = r.read_u16()?;
        if offset == 0 {
            return Ok(None);
        }
        let mut dr = r.window_at(subtable_start + offset as usize, r.buffer_len() - subtable_start)?;
        Ok(Some(Device::parse(&mut dr)?))
    }
}

/// `AnchorPoint`, formats 1-3 (format 3 carries device-table offsets for
/// hinted placement; the contour-point hint in format 2 is recorded but
/// has no effect on `(x, y)`).
#[derive(Debug, Clone, PartialEq)]
pub struct AnchorPoint {
    pub x: i16,
    pub y: i16,
    pub anchor_point_index: Option<u16>,
    pub x_device: Option<Device>,
    pub y_device: Option<Device>,
}

impl AnchorPoint {
    pub fn parse(r: &mut Reader, subtable_start: usize) -> Result<Self> {
        let format = r.read_u16()?;
        let x = r.read_i16()?;
        let y = r.read_i16()?;
        let mut anchor_point_index = None;
        let mut x_device = None;
        let mut y_device = None;
        match format {
            2 => {
                anchor_point_index = Some(r.read_u16()?);
            }
            3 => {
                let x_offset = r.read_u16()?;
                let y_offset = r.read_u16()?;
                if x_offset != 0 {
                    let mut dr = r.window_at(subtable_start + x_offset as usize, r.buffer_len() - subtable_start)?;
                    x_device = Some(Device::parse(&mut dr)?);
                }
                if y_offset != 0 {
                    let mut dr = r.window_at(subtable_start + y_offset as usize, r.buffer_len() - subtable_start)?;
                    y_device = Some(Device::parse(&mut dr)?);
                }
            }
            _ => {}
        }
        Ok(AnchorPoint {
            x,
            y,
            anchor_point_index,
            x_device,
            y_device,
        })
    }
}

/// Parses a list of `Offset16`s (relative to `table_start`) immediately
/// following the cursor's current position, returning independent readers
/// scoped to each target — the common "array of offsets to subtables"
/// shape used throughout GSUB/GPOS lookups.
pub(crate) fn parse_offset_array<'a>(
    r: &mut Reader<'a>,
    count: u16,
    table_start: usize,
) -> Result<Vec<Reader<'a>>> {
    let mut offsets = Vec::with_capacity(count as usize);
    for _ in 0..count {
        offsets.push(r.read_u16()?);
    }
    let mut readers = Vec::with_capacity(offsets.len());
    for offset in offsets {
        readers.push(r.window_at(table_start + offset as usize, r.buffer_len() - table_start)?);
    }
    Ok(readers)
}

/// Generic lookup-list parser parameterized by a per-lookup-type subtable
/// decoder, shared between GSUB and GPOS.
pub(crate) fn parse_lookup_list<T>(
    r: &mut Reader,
    parse_subtable: impl Fn(&mut Reader, u16) -> Result<T>,
) -> Result<LookupList<T>> {
    let table_start = r.window_start();
    let count = r.read_u16()?;
    let mut lookup_offsets = Vec::with_capacity(count as usize);
    for _ in 0..count {
        lookup_offsets.push(r.read_u16()?);
    }

    let mut lookups = Vec::with_capacity(lookup_offsets.len());
    for offset in lookup_offsets {
        let mut lr = r.window_at(table_start + offset as usize, r.buffer_len() - table_start)?;
        let lookup_start = lr.window_start();
        let lookup_type = lr.read_u16()?;
        let lookup_flag = lr.read_u16()?;
        let subtable_count = lr.read_u16()?;
        let subtable_readers = parse_offset_array(&mut lr, subtable_count, lookup_start)?;
        let mut subtables = Vec::with_capacity(subtable_readers.len());
        for mut sr in subtable_readers {
            subtables.push(parse_subtable(&mut sr, lookup_type)?);
        }
        let mark_filtering_set = if lookup_flag & Lookup::<()>::USE_MARK_FILTERING_SET != 0 {
            Some(lr.read_u16()?)
        } else {
            None
        };
        lookups.push(Lookup {
            lookup_type,
            lookup_flag,
            subtables,
            mark_filtering_set,
        });
    }
    Ok(LookupList { lookups })
}

/// A resolved mapping from a `(script, language, feature)` triple to the
/// lookup indices that apply, the summary helper described in §4.7.
pub fn lookups_for_feature(
    script_list: &ScriptList,
    feature_list: &FeatureList,
    script: Tag,
    language: Option<Tag>,
    feature: Tag,
) -> Vec<u16> {
    let Some(s) = script_list.find(script) else {
        return Vec::new();
    };
    let lang_sys = language
        .and_then(|lang| s.lang_sys(lang))
        .or(s.default_lang_sys.as_ref());
    let Some(lang_sys) = lang_sys else {
        return Vec::new();
    };

    let mut indices = BTreeMap::new();
    for &feature_index in &lang_sys.feature_indices {
        if let Some(f) = feature_list.features.get(feature_index as usize) {
            if f.tag == feature {
                for &li in &f.lookup_list_indices {
                    indices.insert(li, ());
                }
            }
        }
    }
    indices.into_keys().collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn coverage_format1_membership() {
        let d = [0u8, 1, 0, 3, 0, 5, 0, 7, 0, 9];
        let mut r = Reader::new(&d);
        let cov = Coverage::parse(&mut r).unwrap();
        assert_eq!(cov.index_of(7), Some(1));
        assert_eq!(cov.index_of(8), None);
    }

    #[test]
    fn coverage_format2_ranges() {
        let mut d = Vec::new();
        d.extend_from_slice(&2u16.to_be_bytes());
        d.extend_from_slice(&1u16.to_be_bytes()); // 1 range
        d.extend_from_slice(&10u16.to_be_bytes());
        d.extend_from_slice(&20u16.to_be_bytes());
        d.extend_from_slice(&0u16.to_be_bytes());
        let mut r = Reader::new(&d);
        let cov = Coverage::parse(&mut r).unwrap();
        assert_eq!(cov.index_of(15), Some(5));
        assert_eq!(cov.index_of(25), None);
    }

    #[test]
    fn classdef_format1_lookup() {
        let mut d = Vec::new();
        d.extend_from_slice(&1u16.to_be_bytes());
        d.extend_from_slice(&100u16.to_be_bytes()); // start glyph
        d.extend_from_slice(&2u16.to_be_bytes()); // count
        d.extend_from_slice(&1u16.to_be_bytes());
        d.extend_from_slice(&2u16.to_be_bytes());
        let mut r = Reader::new(&d);
        let cd = ClassDef::parse(&mut r).unwrap();
        assert_eq!(cd.class_of(100), 1);
        assert_eq!(cd.class_of(101), 2);
        assert_eq!(cd.class_of(50), 0);
    }
}
