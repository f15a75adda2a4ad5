use crate::error::{Error, Result};
use crate::reader::{Fixed, Reader};

/// `head` — font header.
///
/// See <https://docs.microsoft.com/en-us/typography/opentype/spec/head>.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadTable {
    pub major_version: u16,
    pub minor_version: u16,
    pub font_revision: Fixed,
    /// The value stored on disk, *not* validated against the recomputed
    /// checksum — that comparison happens once, at the table-directory
    /// level, in [`crate::font`].
    pub check_sum_adjustment: u32,
    pub magic_number: u32,
    pub flags: u16,
    pub units_per_em: u16,
    /// Unix timestamp (seconds), already converted from the stored Mac
    /// epoch value.
    pub created: i64,
    pub modified: i64,
    pub x_min: i16,
    pub y_min: i16,
    pub x_max: i16,
    pub y_max: i16,
    pub mac_style: u16,
    pub lowest_rec_ppem: u16,
    pub font_direction_hint: i16,
    /// 0 = short (`Offset16`) `loca` entries, 1 = long (`Offset32`).
    pub index_to_loc_format: i16,
    pub glyph_data_format: i16,
}

pub const MAGIC_NUMBER: u32 = 0x5F0F_3CF5;

impl HeadTable {
    pub fn parse(r: &mut Reader) -> Result<Self> {
        let major_version = r.read_u16()?;
        let minor_version = r.read_u16()?;
        let font_revision = r.read_fixed()?;
        let check_sum_adjustment = r.read_u32()?;
        let magic_number = r.read_u32()?;
        if magic_number != MAGIC_NUMBER {
            return Err(Error::InvalidMagic { found: magic_number });
        }
        let flags = r.read_u16()?;
        let units_per_em = r.read_u16()?;
        let created = r.read_longdatetime()?;
        let modified = r.read_longdatetime()?;
        let x_min = r.read_fword()?;
        let y_min = r.read_fword()?;
        let x_max = r.read_fword()?;
        let y_max = r.read_fword()?;
        let mac_style = r.read_u16()?;
        let lowest_rec_ppem = r.read_u16()?;
        let font_direction_hint = r.read_i16()?;
        let index_to_loc_format = r.read_i16()?;
        let glyph_data_format = r.read_i16()?;

        Ok(HeadTable {
            major_version,
            minor_version,
            font_revision,
            check_sum_adjustment,
            magic_number,
            flags,
            units_per_em,
            created,
            modified,
            x_min,
            y_min,
            x_max,
            y_max,
            mac_style,
            lowest_rec_ppem,
            font_direction_hint,
            index_to_loc_format,
            glyph_data_format,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn sample_bytes(magic: u32) -> Vec<u8> {
        let mut d = Vec::new();
        d.extend_from_slice(&1u16.to_be_bytes()); // major
        d.extend_from_slice(&0u16.to_be_bytes()); // minor
        d.extend_from_slice(&0x0001_0000u32.to_be_bytes()); // font revision 1.0
        d.extend_from_slice(&0u32.to_be_bytes()); // checksum adjustment
        d.extend_from_slice(&magic.to_be_bytes());
        d.extend_from_slice(&0u16.to_be_bytes()); // flags
        d.extend_from_slice(&1000u16.to_be_bytes()); // units per em
        d.extend_from_slice(&0i64.to_be_bytes()); // created
        d.extend_from_slice(&0i64.to_be_bytes()); // modified
        d.extend_from_slice(&(-100i16).to_be_bytes()); // x_min
        d.extend_from_slice(&(-50i16).to_be_bytes()); // y_min
        d.extend_from_slice(&900i16.to_be_bytes()); // x_max
        d.extend_from_slice(&950i16.to_be_bytes()); // y_max
        d.extend_from_slice(&0u16.to_be_bytes()); // mac style
        d.extend_from_slice(&8u16.to_be_bytes()); // lowest rec ppem
        d.extend_from_slice(&2i16.to_be_bytes()); // font direction hint
        d.extend_from_slice(&1i16.to_be_bytes()); // index to loc format
        d.extend_from_slice(&0i16.to_be_bytes()); // glyph data format
        d
    }

    #[test]
    fn parses_valid_head() {
        let data = sample_bytes(MAGIC_NUMBER);
        let mut r = Reader::new(&data);
        let head = HeadTable::parse(&mut r).unwrap();
        assert_eq!(head.units_per_em, 1000);
        assert_eq!(head.index_to_loc_format, 1);
        assert_eq!(head.x_min, -100);
    }

    #[test]
    fn rejects_bad_magic() {
        let data = sample_bytes(0xDEAD_BEEF);
        let mut r = Reader::new(&data);
        let err = HeadTable::parse(&mut r).unwrap_err();
        assert!(matches!(err, Error::InvalidMagic { found: 0xDEAD_BEEF }));
    }
}
