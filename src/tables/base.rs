use crate::error::{Error, Result};
use crate::otl::Device;
use crate::reader::Reader;
use crate::tag::Tag;

/// `BASE` — baseline data shared across scripts, used to align text set
/// in different scripts on a common line.
///
/// See <https://docs.microsoft.com/en-us/typography/opentype/spec/base>.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BaseTable {
    pub major_version: u16,
    pub minor_version: u16,
    pub horiz_axis: Option<Axis>,
    pub vert_axis: Option<Axis>,
}

impl BaseTable {
    pub fn parse(r: &mut Reader) -> Result<Self> {
        let table_start = r.window_start();
        let major_version = r.read_u16()?;
        let minor_version = r.read_u16()?;
        let horiz_axis_offset = r.read_u16()?;
        let vert_axis_offset = r.read_u16()?;
        if minor_version >= 1 {
            let _item_var_store_offset = r.read_u16()?;
        }

        let horiz_axis = if horiz_axis_offset != 0 {
            let mut ar = r.window_at(table_start + horiz_axis_offset as usize, r.buffer_len() - table_start)?;
            Some(Axis::parse(&mut ar)?)
        } else {
            None
        };
        let vert_axis = if vert_axis_offset != 0 {
            let mut ar = r.window_at(table_start + vert_axis_offset as usize, r.buffer_len() - table_start)?;
            Some(Axis::parse(&mut ar)?)
        } else {
            None
        };

        Ok(BaseTable {
            major_version,
            minor_version,
            horiz_axis,
            vert_axis,
        })
    }
}

/// One axis (horizontal or vertical): the ordered set of baseline tags in
/// use, plus per-script baseline data.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Axis {
    /// Ordered baseline tag sequence; a script's `BaseCoord` array is
    /// indexed in parallel with this list.
    pub baseline_tags: Vec<Tag>,
    pub scripts: Vec<(Tag, BaseScript)>,
}

impl Axis {
    fn parse(r: &mut Reader) -> Result<Self> {
        let table_start = r.window_start();
        let base_tag_list_offset = r.read_u16()?;
        let base_script_list_offset = r.read_u16()?;

        let baseline_tags = if base_tag_list_offset != 0 {
            let mut tr = r.window_at(table_start + base_tag_list_offset as usize, r.buffer_len() - table_start)?;
            let count = tr.read_u16()?;
            let mut tags = Vec::with_capacity(count as usize);
            for _ in 0..count {
                tags.push(tr.read_tag()?);
            }
            tags
        } else {
            Vec::new()
        };

        let mut sr = r.window_at(table_start + base_script_list_offset as usize, r.buffer_len() - table_start)?;
        let script_list_start = sr.window_start();
        let base_script_count = sr.read_u16()?;
        let mut records = Vec::with_capacity(base_script_count as usize);
        for _ in 0..base_script_count {
            let tag = sr.read_tag()?;
            let offset = sr.read_u16()?;
            records.push((tag, offset));
        }
        let mut scripts = Vec::with_capacity(records.len());
        for (tag, offset) in records {
            let mut bsr = sr.window_at(script_list_start + offset as usize, sr.buffer_len() - script_list_start)?;
            scripts.push((tag, BaseScript::parse(&mut bsr)?));
        }

        Ok(Axis { baseline_tags, scripts })
    }

    pub fn script(&self, tag: Tag) -> Option<&BaseScript> {
        self.scripts.iter().find(|(t, _)| *t == tag).map(|(_, s)| s)
    }
}

/// Per-script baseline data: the script's own baseline coordinates, plus
/// an optional default min/max extent and per-language-system overrides.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BaseScript {
    pub base_values: Option<BaseValues>,
    pub default_min_max: Option<MinMax>,
    pub base_lang_sys_records: Vec<(Tag, MinMax)>,
}

impl BaseScript {
    fn parse(r: &mut Reader) -> Result<Self> {
        let table_start = r.window_start();
        let base_values_offset = r.read_u16()?;
        let default_min_max_offset = r.read_u16()?;
        let base_lang_sys_count = r.read_u16()?;
        let mut lang_sys_offsets = Vec::with_capacity(base_lang_sys_count as usize);
        for _ in 0..base_lang_sys_count {
            let tag = r.read_tag()?;
            let offset = r.read_u16()?;
            lang_sys_offsets.push((tag, offset));
        }

        let base_values = if base_values_offset != 0 {
            let mut vr = r.window_at(table_start + base_values_offset as usize, r.buffer_len() - table_start)?;
            Some(BaseValues::parse(&mut vr)?)
        } else {
            None
        };
        let default_min_max = if default_min_max_offset != 0 {
            let mut mr = r.window_at(table_start + default_min_max_offset as usize, r.buffer_len() - table_start)?;
            Some(MinMax::parse(&mut mr)?)
        } else {
            None
        };
        let mut base_lang_sys_records = Vec::with_capacity(lang_sys_offsets.len());
        for (tag, offset) in lang_sys_offsets {
            let mut mr = r.window_at(table_start + offset as usize, r.buffer_len() - table_start)?;
            base_lang_sys_records.push((tag, MinMax::parse(&mut mr)?));
        }

        Ok(BaseScript {
            base_values,
            default_min_max,
            base_lang_sys_records,
        })
    }
}

/// A script's actual baseline positions, one `BaseCoord` per tag in the
/// enclosing [`Axis::baseline_tags`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BaseValues {
    pub default_baseline_index: u16,
    pub base_coords: Vec<BaseCoord>,
}

impl BaseValues {
    fn parse(r: &mut Reader) -> Result<Self> {
        let table_start = r.window_start();
        let default_baseline_index = r.read_u16()?;
        let base_coord_count = r.read_u16()?;
        let mut offsets = Vec::with_capacity(base_coord_count as usize);
        for _ in 0..base_coord_count {
            offsets.push(r.read_u16()?);
        }
        let mut base_coords = Vec::with_capacity(offsets.len());
        for offset in offsets {
            let mut cr = r.window_at(table_start + offset as usize, r.buffer_len() - table_start)?;
            base_coords.push(BaseCoord::parse(&mut cr)?);
        }
        Ok(BaseValues {
            default_baseline_index,
            base_coords,
        })
    }
}

/// A script's min/max extent along the axis, with optional per-feature
/// overrides (added in BASE 1.1).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MinMax {
    pub min_coord: Option<BaseCoord>,
    pub max_coord: Option<BaseCoord>,
    pub feat_min_max_records: Vec<FeatMinMaxRecord>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeatMinMaxRecord {
    pub feature_tag: Tag,
    pub min_coord: Option<BaseCoord>,
    pub max_coord: Option<BaseCoord>,
}

impl MinMax {
    fn parse(r: &mut Reader) -> Result<Self> {
        let table_start = r.window_start();
        let min_coord_offset = r.read_u16()?;
        let max_coord_offset = r.read_u16()?;
        let feat_min_max_count = r.read_u16()?;
        let mut records = Vec::with_capacity(feat_min_max_count as usize);
        for _ in 0..feat_min_max_count {
            records.push((r.read_tag()?, r.read_u16()?, r.read_u16()?));
        }

        let read_coord = |r: &mut Reader, offset: u16| -> Result<Option<BaseCoord>> {
            if offset == 0 {
                return Ok(None);
            }
            let mut cr = r.window_at(table_start + offset as usize, r.buffer_len() - table_start)?;
            Ok(Some(BaseCoord::parse(&mut cr)?))
        };

        let min_coord = read_coord(r, min_coord_offset)?;
        let max_coord = read_coord(r, max_coord_offset)?;
        let mut feat_min_max_records = Vec::with_capacity(records.len());
        for (feature_tag, min_offset, max_offset) in records {
            feat_min_max_records.push(FeatMinMaxRecord {
                feature_tag,
                min_coord: read_coord(r, min_offset)?,
                max_coord: read_coord(r, max_offset)?,
            });
        }

        Ok(MinMax {
            min_coord,
            max_coord,
            feat_min_max_records,
        })
    }
}

/// `BaseCoord`, formats 1-3: a plain design-unit coordinate, one anchored
/// to a glyph contour point, or one carrying a hinting device table.
#[derive(Debug, Clone, PartialEq)]
pub enum BaseCoord {
    Coordinate { coordinate: i16 },
    GlyphPoint { coordinate: i16, reference_glyph: u16, base_coord_point: u16 },
    Device { coordinate: i16, device: Device },
}

impl BaseCoord {
    fn parse(r: &mut Reader) -> Result<Self> {
        let format = r.read_u16()?;
        match format {
            1 => Ok(BaseCoord::Coordinate {
                coordinate: r.read_i16()?,
            }),
            2 => Ok(BaseCoord::GlyphPoint {
                coordinate: r.read_i16()?,
                reference_glyph: r.read_u16()?,
                base_coord_point: r.read_u16()?,
            }),
            3 => {
                let coordinate = r.read_i16()?;
                let device_offset = r.read_u16()?;
                let subtable_start = r.window_start();
                let device = if device_offset != 0 {
                    let mut dr = r.window_at(subtable_start + device_offset as usize, r.buffer_len() - subtable_start)?;
                    Device::parse(&mut dr)?
                } else {
                    Device::Hinting {
                        start_size: 0,
                        end_size: 0,
                        delta_values: Vec::new(),
                    }
                };
                Ok(BaseCoord::Device { coordinate, device })
            }
            other => Err(Error::UnsupportedFormat {
                context: "BaseCoord",
                format: other as u32,
            }),
        }
    }

    pub fn coordinate(&self) -> i16 {
        match self {
            BaseCoord::Coordinate { coordinate } => *coordinate,
            BaseCoord::GlyphPoint { coordinate, .. } => *coordinate,
            BaseCoord::Device { coordinate, .. } => *coordinate,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parses_minimal_horizontal_axis() {
        // BASE header: 1.0, horizAxis at 8, no vertAxis
        let mut d = Vec::new();
        d.extend_from_slice(&1u16.to_be_bytes());
        d.extend_from_slice(&0u16.to_be_bytes());
        d.extend_from_slice(&8u16.to_be_bytes()); // horizAxisOffset
        d.extend_from_slice(&0u16.to_be_bytes()); // vertAxisOffset
        assert_eq!(d.len(), 8);
        // Axis table at offset 8: baseTagList at relative offset 4, baseScriptList at relative offset 10.
        d.extend_from_slice(&4u16.to_be_bytes()); // baseTagListOffset
        d.extend_from_slice(&10u16.to_be_bytes()); // baseScriptListOffset
        // baseTagList at relative offset 4
        d.extend_from_slice(&1u16.to_be_bytes()); // count
        d.extend_from_slice(b"hang");
        // baseScriptList at relative offset 10
        d.extend_from_slice(&0u16.to_be_bytes()); // baseScriptCount = 0

        let mut r = Reader::new(&d);
        let base = BaseTable::parse(&mut r).unwrap();
        let axis = base.horiz_axis.unwrap();
        assert_eq!(axis.baseline_tags, vec![Tag::from_str_lossy("hang")]);
        assert!(axis.scripts.is_empty());
        assert!(base.vert_axis.is_none());
    }
}
