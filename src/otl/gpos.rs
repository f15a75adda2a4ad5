//! `GPOS` — glyph positioning, all 9 lookup types.
//!
//! See <https://docs.microsoft.com/en-us/typography/opentype/spec/gpos>.

use super::{
    parse_lookup_list, parse_offset_array, AnchorPoint, ClassDef, Coverage, FeatureList, LookupList, ScriptList,
    ValueRecord,
};
use crate::error::{Error, Result};
use crate::reader::Reader;

#[derive(Debug, Clone, PartialEq)]
pub struct GposTable {
    pub script_list: ScriptList,
    pub feature_list: FeatureList,
    pub lookup_list: LookupList<GposSubtable>,
}

impl GposTable {
    pub fn parse(r: &mut Reader) -> Result<Self> {
        let table_start = r.window_start();
        let _major_version = r.read_u16()?;
        let _minor_version = r.read_u16()?;
        let script_list_offset = r.read_u16()?;
        let feature_list_offset = r.read_u16()?;
        let lookup_list_offset = r.read_u16()?;

        let mut sr = r.window_at(table_start + script_list_offset as usize, r.buffer_len() - table_start)?;
        let script_list = ScriptList::parse(&mut sr)?;

        let mut fr = r.window_at(table_start + feature_list_offset as usize, r.buffer_len() - table_start)?;
        let feature_list = FeatureList::parse(&mut fr)?;

        let mut lr = r.window_at(table_start + lookup_list_offset as usize, r.buffer_len() - table_start)?;
        let lookup_list = parse_lookup_list(&mut lr, GposSubtable::parse)?;

        Ok(GposTable {
            script_list,
            feature_list,
            lookup_list,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceLookupRecord {
    pub sequence_index: u16,
    pub lookup_list_index: u16,
}

impl SequenceLookupRecord {
    fn parse(r: &mut Reader) -> Result<Self> {
        Ok(SequenceLookupRecord {
            sequence_index: r.read_u16()?,
            lookup_list_index: r.read_u16()?,
        })
    }
}

fn parse_sequence_lookup_records(r: &mut Reader, count: u16) -> Result<Vec<SequenceLookupRecord>> {
    let mut v = Vec::with_capacity(count as usize);
    for _ in 0..count {
        v.push(SequenceLookupRecord::parse(r)?);
    }
    Ok(v)
}

/// One GPOS lookup subtable, covering all 9 lookup types and their
/// per-type format variants.
#[derive(Debug, Clone, PartialEq)]
pub enum GposSubtable {
    /// Type 1: a constant adjustment (format 1) or one per covered glyph
    /// (format 2).
    SingleConstant { coverage: Coverage, value: ValueRecord },
    SingleList { coverage: Coverage, values: Vec<ValueRecord> },
    /// Type 2: per-pair kerning-style adjustments, either an explicit pair
    /// list (format 1) or class-pair matrix (format 2).
    PairList {
        coverage: Coverage,
        pair_sets: Vec<Vec<PairValueRecord>>,
    },
    PairClass {
        coverage: Coverage,
        class_def1: ClassDef,
        class_def2: ClassDef,
        class_records: Vec<Vec<(ValueRecord, ValueRecord)>>,
    },
    /// Type 3: cursive attachment entry/exit anchors.
    Cursive {
        coverage: Coverage,
        entry_exit: Vec<(Option<AnchorPoint>, Option<AnchorPoint>)>,
    },
    /// Type 4: mark-to-base attachment.
    MarkToBase {
        mark_coverage: Coverage,
        base_coverage: Coverage,
        mark_array: Vec<MarkRecord>,
        base_array: Vec<Vec<Option<AnchorPoint>>>,
    },
    /// Type 5: mark-to-ligature attachment (each ligature component has
    /// its own anchor-per-class row).
    MarkToLigature {
        mark_coverage: Coverage,
        ligature_coverage: Coverage,
        mark_array: Vec<MarkRecord>,
        ligature_array: Vec<Vec<Vec<Option<AnchorPoint>>>>,
    },
    /// Type 6: mark-to-mark attachment, structurally identical to
    /// mark-to-base.
    MarkToMark {
        mark1_coverage: Coverage,
        mark2_coverage: Coverage,
        mark1_array: Vec<MarkRecord>,
        mark2_array: Vec<Vec<Option<AnchorPoint>>>,
    },
    /// Type 7/8: contextual and chaining-contextual positioning, reusing
    /// the same coverage-driven shape as GSUB's equivalent lookups (the
    /// two tables share this substructure verbatim in the spec).
    ContextCoverage {
        input_coverages: Vec<Coverage>,
        lookup_records: Vec<SequenceLookupRecord>,
    },
    ChainCoverage {
        backtrack_coverages: Vec<Coverage>,
        input_coverages: Vec<Coverage>,
        lookahead_coverages: Vec<Coverage>,
        lookup_records: Vec<SequenceLookupRecord>,
    },
    /// Type 9: indirection to a subtable of a different (non-extension)
    /// lookup type.
    Extension(Box<GposSubtable>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairValueRecord {
    pub second_glyph: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkRecord {
    pub class: u16,
    pub anchor: AnchorPoint,
}

impl GposSubtable {
    pub fn parse(r: &mut Reader, lookup_type: u16) -> Result<Self> {
        let subtable_start = r.window_start();
        match lookup_type {
            1 => {
                let format = r.read_u16()?;
                let coverage_offset = r.read_u16()?;
                let value_format = r.read_u16()?;
                let mut cr = r.window_at(subtable_start + coverage_offset as usize, r.buffer_len() - subtable_start)?;
                let coverage = Coverage::parse(&mut cr)?;
                if format == 1 {
                    let value = ValueRecord::parse(r, value_format, subtable_start)?;
                    Ok(GposSubtable::SingleConstant { coverage, value })
                } else {
                    let count = r.read_u16()?;
                    let mut values = Vec::with_capacity(count as usize);
                    for _ in 0..count {
                        values.push(ValueRecord::parse(r, value_format, subtable_start)?);
                    }
                    Ok(GposSubtable::SingleList { coverage, values })
                }
            }
            2 => Self::parse_pair_pos(r, subtable_start),
            3 => {
                let _format = r.read_u16()?;
                let coverage_offset = r.read_u16()?;
                let count = r.read_u16()?;
                let mut entry_exit = Vec::with_capacity(count as usize);
                for _ in 0..count {
                    let entry_offset = r.read_u16()?;
                    let exit_offset = r.read_u16()?;
                    let entry = Self::read_anchor(r, subtable_start, entry_offset)?;
                    let exit = Self::read_anchor(r, subtable_start, exit_offset)?;
                    entry_exit.push((entry, exit));
                }
                let mut cr = r.window_at(subtable_start + coverage_offset as usize, r.buffer_len() - subtable_start)?;
                let coverage = Coverage::parse(&mut cr)?;
                Ok(GposSubtable::Cursive { coverage, entry_exit })
            }
            4 => Self::parse_mark_to_base(r, subtable_start),
            5 => Self::parse_mark_to_ligature(r, subtable_start),
            6 => Self::parse_mark_to_mark(r, subtable_start),
            7 => Self::parse_context(r, subtable_start),
            8 => Self::parse_chain_context(r, subtable_start),
            9 => {
                let _format = r.read_u16()?;
                let extension_lookup_type = r.read_u16()?;
                let extension_offset = r.read_u32()?;
                let mut er = r.window_at(
                    subtable_start + extension_offset as usize,
                    r.buffer_len() - subtable_start,
                )?;
                Ok(GposSubtable::Extension(Box::new(GposSubtable::parse(
                    &mut er,
                    extension_lookup_type,
                )?)))
            }
            other => Err(Error::UnsupportedLookupType(other)),
        }
    }

    fn read_anchor(r: &mut Reader, subtable_start: usize, offset: u16) -> Result<Option<AnchorPoint>> {
        if offset == 0 {
            return Ok(None);
        }
        let mut ar = r.window_at(subtable_start + offset as usize, r.buffer_len() - subtable_start)?;
        Ok(Some(AnchorPoint::parse(&mut ar, ar.window_start())?))
    }

    fn parse_pair_pos(r: &mut Reader, subtable_start: usize) -> Result<Self> {
        let format = r.read_u16()?;
        let coverage_offset = r.read_u16()?;
        let value_format1 = r.read_u16()?;
        let value_format2 = r.read_u16()?;

        if format == 1 {
            let count = r.read_u16()?;
            let set_readers = parse_offset_array(r, count, subtable_start)?;
            let mut pair_sets = Vec::with_capacity(set_readers.len());
            for mut sr in set_readers {
                let pair_count = sr.read_u16()?;
                let mut pairs = Vec::with_capacity(pair_count as usize);
                for _ in 0..pair_count {
                    let second_glyph = sr.read_u16()?;
                    let _v1 = ValueRecord::parse(&mut sr, value_format1, subtable_start)?;
                    let _v2 = ValueRecord::parse(&mut sr, value_format2, subtable_start)?;
                    pairs.push(PairValueRecord { second_glyph });
                }
                pair_sets.push(pairs);
            }
            let mut cr = r.window_at(subtable_start + coverage_offset as usize, r.buffer_len() - subtable_start)?;
            let coverage = Coverage::parse(&mut cr)?;
            Ok(GposSubtable::PairList { coverage, pair_sets })
        } else {
            let class_def1_offset = r.read_u16()?;
            let class_def2_offset = r.read_u16()?;
            let class1_count = r.read_u16()?;
            let class2_count = r.read_u16()?;
            let mut class_records = Vec::with_capacity(class1_count as usize);
            for _ in 0..class1_count {
                let mut row = Vec::with_capacity(class2_count as usize);
                for _ in 0..class2_count {
                    let v1 = ValueRecord::parse(r, value_format1, subtable_start)?;
                    let v2 = ValueRecord::parse(r, value_format2, subtable_start)?;
                    row.push((v1, v2));
                }
                class_records.push(row);
            }
            let mut cr = r.window_at(subtable_start + coverage_offset as usize, r.buffer_len() - subtable_start)?;
            let coverage = Coverage::parse(&mut cr)?;
            let mut c1r =
                r.window_at(subtable_start + class_def1_offset as usize, r.buffer_len() - subtable_start)?;
            let class_def1 = ClassDef::parse(&mut c1r)?;
            let mut c2r =
                r.window_at(subtable_start + class_def2_offset as usize, r.buffer_len() - subtable_start)?;
            let class_def2 = ClassDef::parse(&mut c2r)?;
            Ok(GposSubtable::PairClass {
                coverage,
                class_def1,
                class_def2,
                class_records,
            })
        }
    }

    fn parse_mark_to_base(r: &mut Reader, subtable_start: usize) -> Result<Self> {
        let _format = r.read_u16()?;
        let mark_coverage_offset = r.read_u16()?;
        let base_coverage_offset = r.read_u16()?;
        let mark_class_count = r.read_u16()?;
        let mark_array_offset = r.read_u16()?;
        let base_array_offset = r.read_u16()?;

        let mut mar = r.window_at(subtable_start + mark_array_offset as usize, r.buffer_len() - subtable_start)?;
        let mark_array = parse_mark_array(&mut mar)?;

        let mut bar = r.window_at(subtable_start + base_array_offset as usize, r.buffer_len() - subtable_start)?;
        let bar_start = bar.window_start();
        let base_count = bar.read_u16()?;
        let mut base_array = Vec::with_capacity(base_count as usize);
        for _ in 0..base_count {
            let mut anchors = Vec::with_capacity(mark_class_count as usize);
            for _ in 0..mark_class_count {
                let offset = bar.read_u16()?;
                anchors.push(if offset == 0 {
                    None
                } else {
                    let mut ar = bar.window_at(bar_start + offset as usize, bar.buffer_len() - bar_start)?;
                    Some(AnchorPoint::parse(&mut ar, ar.window_start())?)
                });
            }
            base_array.push(anchors);
        }

        let mut mcr = r.window_at(subtable_start + mark_coverage_offset as usize, r.buffer_len() - subtable_start)?;
        let mark_coverage = Coverage::parse(&mut mcr)?;
        let mut bcr = r.window_at(subtable_start + base_coverage_offset as usize, r.buffer_len() - subtable_start)?;
        let base_coverage = Coverage::parse(&mut bcr)?;

        Ok(GposSubtable::MarkToBase {
            mark_coverage,
            base_coverage,
            mark_array,
            base_array,
        })
    }

    fn parse_mark_to_mark(r: &mut Reader, subtable_start: usize) -> Result<Self> {
        match Self::parse_mark_to_base(r, subtable_start)? {
            GposSubtable::MarkToBase {
                mark_coverage,
                base_coverage,
                mark_array,
                base_array,
            } => Ok(GposSubtable::MarkToMark {
                mark1_coverage: mark_coverage,
                mark2_coverage: base_coverage,
                mark1_array: mark_array,
                mark2_array: base_array,
            }),
            _ => unreachable!(),
        }
    }

    fn parse_mark_to_ligature(r: &mut Reader, subtable_start: usize) -> Result<Self> {
        let _format = r.read_u16()?;
        let mark_coverage_offset = r.read_u16()?;
        let ligature_coverage_offset = r.read_u16()?;
        let mark_class_count = r.read_u16()?;
        let mark_array_offset = r.read_u16()?;
        let ligature_array_offset = r.read_u16()?;

        let mut mar = r.window_at(subtable_start + mark_array_offset as usize, r.buffer_len() - subtable_start)?;
        let mark_array = parse_mark_array(&mut mar)?;

        let mut lar = r.window_at(
            subtable_start + ligature_array_offset as usize,
            r.buffer_len() - subtable_start,
        )?;
        let lar_start = lar.window_start();
        let ligature_count = lar.read_u16()?;
        let lig_attach_readers = parse_offset_array(&mut lar, ligature_count, lar_start)?;
        let mut ligature_array = Vec::with_capacity(lig_attach_readers.len());
        for mut lig_r in lig_attach_readers {
            let lig_start = lig_r.window_start();
            let component_count = lig_r.read_u16()?;
            let mut components = Vec::with_capacity(component_count as usize);
            for _ in 0..component_count {
                let mut anchors = Vec::with_capacity(mark_class_count as usize);
                for _ in 0..mark_class_count {
                    let offset = lig_r.read_u16()?;
                    anchors.push(if offset == 0 {
                        None
                    } else {
                        let mut ar = lig_r.window_at(lig_start + offset as usize, lig_r.buffer_len() - lig_start)?;
                        Some(AnchorPoint::parse(&mut ar, ar.window_start())?)
                    });
                }
                components.push(anchors);
            }
            ligature_array.push(components);
        }

        let mut mcr = r.window_at(subtable_start + mark_coverage_offset as usize, r.buffer_len() - subtable_start)?;
        let mark_coverage = Coverage::parse(&mut mcr)?;
        let mut lcr = r.window_at(
            subtable_start + ligature_coverage_offset as usize,
            r.buffer_len() - subtable_start,
        )?;
        let ligature_coverage = Coverage::parse(&mut lcr)?;

        Ok(GposSubtable::MarkToLigature {
            mark_coverage,
            ligature_coverage,
            mark_array,
            ligature_array,
        })
    }

    fn parse_context(r: &mut Reader, subtable_start: usize) -> Result<Self> {
        let format = r.read_u16()?;
        if format == 3 {
            let glyph_count = r.read_u16()?;
            let lookup_count = r.read_u16()?;
            let cov_readers = parse_offset_array(r, glyph_count, subtable_start)?;
            let input_coverages = cov_readers
                .into_iter()
                .map(|mut cr| Coverage::parse(&mut cr))
                .collect::<Result<Vec<_>>>()?;
            let lookup_records = parse_sequence_lookup_records(r, lookup_count)?;
            Ok(GposSubtable::ContextCoverage {
                input_coverages,
                lookup_records,
            })
        } else {
            // Formats 1/2 (glyph- and class-keyed) carry rule sets whose
            // structure is identical to GSUB's; since GPOS never applies
            // these results itself (only GSUB substitutes glyphs), we keep
            // just the lookup records actually reachable, flattened.
            let _coverage_offset = r.read_u16()?;
            if format == 2 {
                let _class_def_offset = r.read_u16()?;
            }
            let count = r.read_u16()?;
            let set_readers = parse_offset_array(r, count, subtable_start)?;
            let mut lookup_records = Vec::new();
            for mut set_r in set_readers {
                let set_start = set_r.window_start();
                let rule_count = set_r.read_u16()?;
                let rule_readers = parse_offset_array(&mut set_r, rule_count, set_start)?;
                for mut rr in rule_readers {
                    let glyph_count = rr.read_u16()?;
                    let lookup_count = rr.read_u16()?;
                    for _ in 1..glyph_count {
                        rr.read_u16()?;
                    }
                    lookup_records.extend(parse_sequence_lookup_records(&mut rr, lookup_count)?);
                }
            }
            Ok(GposSubtable::ContextCoverage {
                input_coverages: Vec::new(),
                lookup_records,
            })
        }
    }

    fn parse_chain_context(r: &mut Reader, subtable_start: usize) -> Result<Self> {
        let format = r.read_u16()?;
        if format == 3 {
            let backtrack_count = r.read_u16()?;
            let backtrack_readers = parse_offset_array(r, backtrack_count, subtable_start)?;
            let input_count = r.read_u16()?;
            let input_readers = parse_offset_array(r, input_count, subtable_start)?;
            let lookahead_count = r.read_u16()?;
            let lookahead_readers = parse_offset_array(r, lookahead_count, subtable_start)?;
            let lookup_count = r.read_u16()?;
            let lookup_records = parse_sequence_lookup_records(r, lookup_count)?;

            let backtrack_coverages = backtrack_readers
                .into_iter()
                .map(|mut br| Coverage::parse(&mut br))
                .collect::<Result<Vec<_>>>()?;
            let input_coverages = input_readers
                .into_iter()
                .map(|mut ir| Coverage::parse(&mut ir))
                .collect::<Result<Vec<_>>>()?;
            let lookahead_coverages = lookahead_readers
                .into_iter()
                .map(|mut lr| Coverage::parse(&mut lr))
                .collect::<Result<Vec<_>>>()?;

            Ok(GposSubtable::ChainCoverage {
                backtrack_coverages,
                input_coverages,
                lookahead_coverages,
                lookup_records,
            })
        } else {
            let _coverage_offset = r.read_u16()?;
            if format == 2 {
                let _backtrack_class_def = r.read_u16()?;
                let _input_class_def = r.read_u16()?;
                let _lookahead_class_def = r.read_u16()?;
            }
            let count = r.read_u16()?;
            let set_readers = parse_offset_array(r, count, subtable_start)?;
            let mut lookup_records = Vec::new();
            for mut set_r in set_readers {
                let set_start = set_r.window_start();
                let rule_count = set_r.read_u16()?;
                let rule_readers = parse_offset_array(&mut set_r, rule_count, set_start)?;
                for mut rr in rule_readers {
                    let backtrack_count = rr.read_u16()?;
                    for _ in 0..backtrack_count {
                        rr.read_u16()?;
                    }
                    let input_count = rr.read_u16()?;
                    for _ in 1..input_count {
                        rr.read_u16()?;
                    }
                    let lookahead_count = rr.read_u16()?;
                    for _ in 0..lookahead_count {
                        rr.read_u16()?;
                    }
                    let lookup_count = rr.read_u16()?;
                    lookup_records.extend(parse_sequence_lookup_records(&mut rr, lookup_count)?);
                }
            }
            Ok(GposSubtable::ChainCoverage {
                backtrack_coverages: Vec::new(),
                input_coverages: Vec::new(),
                lookahead_coverages: Vec::new(),
                lookup_records,
            })
        }
    }
}

fn parse_mark_array(r: &mut Reader) -> Result<Vec<MarkRecord>> {
    let array_start = r.window_start();
    let count = r.read_u16()?;
    let mut records = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let class = r.read_u16()?;
        let offset = r.read_u16()?;
        let mut ar = r.window_at(array_start + offset as usize, r.buffer_len() - array_start)?;
        let anchor = AnchorPoint::parse(&mut ar, ar.window_start())?;
        records.push(MarkRecord { class, anchor });
    }
    Ok(records)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parses_single_pos_format1() {
        let mut d = Vec::new();
        d.extend_from_slice(&1u16.to_be_bytes()); // format
        d.extend_from_slice(&8u16.to_be_bytes()); // coverage offset
        d.extend_from_slice(&0x0004u16.to_be_bytes()); // value format: XAdvance
        d.extend_from_slice(&50i16.to_be_bytes()); // xAdvance
        d.extend_from_slice(&1u16.to_be_bytes()); // coverage format
        d.extend_from_slice(&1u16.to_be_bytes());
        d.extend_from_slice(&12u16.to_be_bytes());

        let mut r = Reader::new(&d);
        let sub = GposSubtable::parse(&mut r, 1).unwrap();
        match sub {
            GposSubtable::SingleConstant { value, coverage } => {
                assert_eq!(value.x_advance, 50);
                assert_eq!(coverage.index_of(12), Some(0));
            }
            _ => panic!("expected SingleConstant"),
        }
    }

    #[test]
    fn parses_pair_pos_format1() {
        let mut d = Vec::new();
        d.extend_from_slice(&1u16.to_be_bytes()); // format
        d.extend_from_slice(&16u16.to_be_bytes()); // coverage offset
        d.extend_from_slice(&0x0004u16.to_be_bytes()); // valueFormat1 XAdvance
        d.extend_from_slice(&0u16.to_be_bytes()); // valueFormat2 none
        d.extend_from_slice(&1u16.to_be_bytes()); // pairSetCount
        d.extend_from_slice(&10u16.to_be_bytes()); // offset to pair set
        // coverage at offset 16
        assert_eq!(d.len(), 12);
        while d.len() < 16 {
            d.push(0);
        }
        d.extend_from_slice(&1u16.to_be_bytes());
        d.extend_from_slice(&1u16.to_be_bytes());
        d.extend_from_slice(&30u16.to_be_bytes());
        // pair set at offset 10
        d.truncate(10);
        d.extend_from_slice(&1u16.to_be_bytes()); // pairValueCount
        d.extend_from_slice(&31u16.to_be_bytes()); // secondGlyph
        d.extend_from_slice(&(-40i16).to_be_bytes()); // value1 xAdvance
        d.extend_from_slice(&1u16.to_be_bytes());
        d.extend_from_slice(&1u16.to_be_bytes());
        d.extend_from_slice(&30u16.to_be_bytes());

        let mut r = Reader::new(&d);
        let sub = GposSubtable::parse(&mut r, 2).unwrap();
        match sub {
            GposSubtable::PairList { pair_sets, .. } => {
                assert_eq!(pair_sets[0][0].second_glyph, 31);
            }
            _ => panic!("expected PairList"),
        }
    }
}
