use crate::error::Result;
use crate::reader::Reader;

/// `OS/2` — OS/2 and Windows-specific metrics, version-dispatched (0..=5).
///
/// Each version adds fields to the previous one; this decoder reads as far
/// as `version` allows and zero-fills everything beyond that, mirroring
/// the teacher's "only available for version > N" gating.
///
/// See <https://docs.microsoft.com/en-us/typography/opentype/spec/os2>.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Os2Table {
    pub version: u16,
    pub x_avg_char_width: i16,
    pub us_weight_class: u16,
    pub us_width_class: u16,
    pub fs_type: u16,
    pub y_subscript_x_size: i16,
    pub y_subscript_y_size: i16,
    pub y_subscript_x_offset: i16,
    pub y_subscript_y_offset: i16,
    pub y_superscript_x_size: i16,
    pub y_superscript_y_size: i16,
    pub y_superscript_x_offset: i16,
    pub y_superscript_y_offset: i16,
    pub y_strikeout_size: i16,
    pub y_strikeout_position: i16,
    pub s_family_class: i16,
    pub panose: [u8; 10],
    pub ul_unicode_range1: u32,
    pub ul_unicode_range2: u32,
    pub ul_unicode_range3: u32,
    pub ul_unicode_range4: u32,
    pub ach_vend_id: [u8; 4],
    pub fs_selection: u16,
    pub us_first_char_index: u16,
    pub us_last_char_index: u16,
    pub s_typo_ascender: i16,
    pub s_typo_descender: i16,
    pub s_typo_line_gap: i16,
    pub us_win_ascent: u16,
    pub us_win_descent: u16,
    /// version > 0
    pub ul_code_page_range1: u32,
    pub ul_code_page_range2: u32,
    /// version > 1
    pub sx_height: i16,
    pub s_cap_height: i16,
    pub us_default_char: u16,
    pub us_break_char: u16,
    pub us_max_context: u16,
    /// version > 4
    pub us_lower_optical_point_size: u16,
    pub us_upper_optical_point_size: u16,
}

impl Os2Table {
    pub fn parse(r: &mut Reader) -> Result<Self> {
        let version = r.read_u16()?;
        let x_avg_char_width = r.read_i16()?;
        let us_weight_class = r.read_u16()?;
        let us_width_class = r.read_u16()?;
        let fs_type = r.read_u16()?;
        let y_subscript_x_size = r.read_i16()?;
        let y_subscript_y_size = r.read_i16()?;
        let y_subscript_x_offset = r.read_i16()?;
        let y_subscript_y_offset = r.read_i16()?;
        let y_superscript_x_size = r.read_i16()?;
        let y_superscript_y_size = r.read_i16()?;
        let y_superscript_x_offset = r.read_i16()?;
        let y_superscript_y_offset = r.read_i16()?;
        let y_strikeout_size = r.read_i16()?;
        let y_strikeout_position = r.read_i16()?;
        let s_family_class = r.read_i16()?;
        let mut panose = [0u8; 10];
        panose.copy_from_slice(r.read_bytes(10)?);
        let ul_unicode_range1 = r.read_u32()?;
        let ul_unicode_range2 = r.read_u32()?;
        let ul_unicode_range3 = r.read_u32()?;
        let ul_unicode_range4 = r.read_u32()?;
        let mut ach_vend_id = [0u8; 4];
        ach_vend_id.copy_from_slice(r.read_bytes(4)?);
        let fs_selection = r.read_u16()?;
        let us_first_char_index = r.read_u16()?;
        let us_last_char_index = r.read_u16()?;
        let s_typo_ascender = r.read_i16()?;
        let s_typo_descender = r.read_i16()?;
        let s_typo_line_gap = r.read_i16()?;
        let us_win_ascent = r.read_u16()?;
        let us_win_descent = r.read_u16()?;

        let (ul_code_page_range1, ul_code_page_range2) = if version > 0 {
            (r.read_u32()?, r.read_u32()?)
        } else {
            (0, 0)
        };

        let (sx_height, s_cap_height, us_default_char, us_break_char, us_max_context) = if version > 1 {
            (
                r.read_i16()?,
                r.read_i16()?,
                r.read_u16()?,
                r.read_u16()?,
                r.read_u16()?,
            )
        } else {
            (0, 0, 0, 0, 0)
        };

        let (us_lower_optical_point_size, us_upper_optical_point_size) = if version > 4 {
            (r.read_u16()?, r.read_u16()?)
        } else {
            (0, 0)
        };

        Ok(Os2Table {
            version,
            x_avg_char_width,
            us_weight_class,
            us_width_class,
            fs_type,
            y_subscript_x_size,
            y_subscript_y_size,
            y_subscript_x_offset,
            y_subscript_y_offset,
            y_superscript_x_size,
            y_superscript_y_size,
            y_superscript_x_offset,
            y_superscript_y_offset,
            y_strikeout_size,
            y_strikeout_position,
            s_family_class,
            panose,
            ul_unicode_range1,
            ul_unicode_range2,
            ul_unicode_range3,
            ul_unicode_range4,
            ach_vend_id,
            fs_selection,
            us_first_char_index,
            us_last_char_index,
            s_typo_ascender,
            s_typo_descender,
            s_typo_line_gap,
            us_win_ascent,
            us_win_descent,
            ul_code_page_range1,
            ul_code_page_range2,
            sx_height,
            s_cap_height,
            us_default_char,
            us_break_char,
            us_max_context,
            us_lower_optical_point_size,
            us_upper_optical_point_size,
        })
    }

    /// `true` if bit 6 (ITALIC) is set in `fsSelection`.
    pub fn is_italic(&self) -> bool {
        self.fs_selection & 0x01 != 0
    }

    /// `true` if bit 5 (BOLD) is set in `fsSelection`.
    pub fn is_bold(&self) -> bool {
        self.fs_selection & 0x20 != 0
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn base_fields() -> Vec<u8> {
        let mut d = Vec::new();
        d.extend_from_slice(&500i16.to_be_bytes());
        d.extend_from_slice(&400u16.to_be_bytes());
        d.extend_from_slice(&5u16.to_be_bytes());
        d.extend_from_slice(&0u16.to_be_bytes());
        for _ in 0..8 {
            d.extend_from_slice(&0i16.to_be_bytes());
        }
        d.extend_from_slice(&51i16.to_be_bytes());
        d.extend_from_slice(&265i16.to_be_bytes());
        d.extend_from_slice(&2057i16.to_be_bytes());
        d.extend_from_slice(&[2, 0, 5, 9, 0, 0, 0, 0, 0, 0]);
        d.extend_from_slice(&3758097151u32.to_be_bytes());
        d.extend_from_slice(&1379991039u32.to_be_bytes());
        d.extend_from_slice(&262144u32.to_be_bytes());
        d.extend_from_slice(&0u32.to_be_bytes());
        d.extend_from_slice(b"BE5N");
        d.extend_from_slice(&192u16.to_be_bytes());
        d.extend_from_slice(&13u16.to_be_bytes());
        d.extend_from_slice(&65535u16.to_be_bytes());
        d.extend_from_slice(&977i16.to_be_bytes());
        d.extend_from_slice(&(-272i16).to_be_bytes());
        d.extend_from_slice(&0i16.to_be_bytes());
        d.extend_from_slice(&977u16.to_be_bytes());
        d.extend_from_slice(&272u16.to_be_bytes());
        d
    }

    #[test]
    fn parses_version_zero_without_extra_fields() {
        let mut d = vec![0u8, 0]; // version 0
        d.extend(base_fields());
        let mut r = Reader::new(&d);
        let os2 = Os2Table::parse(&mut r).unwrap();
        assert_eq!(os2.version, 0);
        assert_eq!(os2.ul_code_page_range1, 0);
        assert!(os2.is_bold());
    }

    #[test]
    fn parses_version_four_with_all_fields() {
        let mut d = vec![0u8, 4]; // version 4
        d.extend(base_fields());
        d.extend_from_slice(&536871199u32.to_be_bytes());
        d.extend_from_slice(&3288334336u32.to_be_bytes());
        d.extend_from_slice(&530i16.to_be_bytes());
        d.extend_from_slice(&735i16.to_be_bytes());
        d.extend_from_slice(&0u16.to_be_bytes());
        d.extend_from_slice(&32u16.to_be_bytes());
        d.extend_from_slice(&8u16.to_be_bytes());

        let mut r = Reader::new(&d);
        let os2 = Os2Table::parse(&mut r).unwrap();
        assert_eq!(os2.sx_height, 530);
        assert_eq!(os2.s_cap_height, 735);
        assert_eq!(os2.us_lower_optical_point_size, 0);
    }
}
