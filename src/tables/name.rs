use crate::error::Result;
use crate::reader::Reader;

/// `name` — human-readable strings (copyright, family, subfamily, ...).
///
/// Format 0 and format 1 share a common record list; format 1 additionally
/// carries language-tag records after it. Both end in a shared UTF-16BE
/// string storage area, which this decoder reads verbatim as `u16` code
/// units rather than eagerly decoding every record (callers resolve the
/// specific name they want via [`NameTable::get_string`]).
///
/// See <https://docs.microsoft.com/en-us/typography/opentype/spec/name>.
#[derive(Debug, Clone, PartialEq)]
pub struct NameTable {
    pub format: u16,
    pub name_records: Vec<NameRecord>,
    pub lang_tag_records: Vec<LangTagRecord>,
    pub string_data: Vec<u16>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameRecord {
    pub platform_id: u16,
    pub encoding_id: u16,
    pub language_id: u16,
    pub name_id: u16,
    pub length: u16,
    pub offset: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LangTagRecord {
    pub length: u16,
    pub offset: u16,
}

/// Well-known `nameID` values (the ones callers ask for most).
pub mod name_id {
    pub const COPYRIGHT: u16 = 0;
    pub const FONT_FAMILY: u16 = 1;
    pub const FONT_SUBFAMILY: u16 = 2;
    pub const UNIQUE_SUBFAMILY_ID: u16 = 3;
    pub const FULL_NAME: u16 = 4;
    pub const VERSION: u16 = 5;
    pub const POSTSCRIPT_NAME: u16 = 6;
}

impl NameTable {
    pub fn parse(r: &mut Reader) -> Result<Self> {
        let format = r.read_u16()?;
        let count = r.read_u16()?;
        let _storage_offset = r.read_u16()?;

        let mut name_records = Vec::with_capacity(count as usize);
        for _ in 0..count {
            name_records.push(NameRecord {
                platform_id: r.read_u16()?,
                encoding_id: r.read_u16()?,
                language_id: r.read_u16()?,
                name_id: r.read_u16()?,
                length: r.read_u16()?,
                offset: r.read_u16()?,
            });
        }

        let mut lang_tag_records = Vec::new();
        if format == 1 {
            let lang_tag_count = r.read_u16()?;
            for _ in 0..lang_tag_count {
                lang_tag_records.push(LangTagRecord {
                    length: r.read_u16()?,
                    offset: r.read_u16()?,
                });
            }
        }

        let mut string_data = Vec::new();
        while let Ok(v) = r.read_u16() {
            string_data.push(v);
        }

        Ok(NameTable {
            format,
            name_records,
            lang_tag_records,
            string_data,
        })
    }

    /// Looks up a record by platform/encoding/language/name id and decodes
    /// its bytes as UTF-16BE. Platform 1 (Macintosh) strings are not
    /// UTF-16 and are decoded as Latin-1 instead, matching common practice
    /// for this mostly-obsolete platform.
    fn decode_record(&self, record: &NameRecord) -> Option<String> {
        let start = (record.offset / 2) as usize;
        let end = start + (record.length / 2) as usize;
        let units = self.string_data.get(start..end)?;
        if record.platform_id == 1 {
            let bytes: Vec<u8> = units.iter().map(|&u| (u & 0xFF) as u8).collect();
            Some(bytes.iter().map(|&b| b as char).collect())
        } else {
            String::from_utf16(units).ok()
        }
    }

    /// First matching string for `name_id`, preferring Windows/Unicode
    /// (platform 3, encoding 1, language 0x409 "en-US") then falling back
    /// to any record with a matching `name_id`.
    pub fn get_string(&self, name_id: u16) -> Option<String> {
        if let Some(r) = self
            .name_records
            .iter()
            .find(|r| r.platform_id == 3 && r.encoding_id == 1 && r.language_id == 0x0409 && r.name_id == name_id)
        {
            if let Some(s) = self.decode_record(r) {
                return Some(s);
            }
        }
        let r = self.name_records.iter().find(|r| r.name_id == name_id)?;
        self.decode_record(r)
    }

    pub fn font_family_name(&self) -> Option<String> {
        self.get_string(name_id::FONT_FAMILY)
    }

    pub fn post_script_name(&self) -> Option<String> {
        self.get_string(name_id::POSTSCRIPT_NAME)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn utf16be_units(s: &str) -> Vec<u16> {
        s.encode_utf16().collect()
    }

    #[test]
    fn parses_format0_and_resolves_family_name() {
        let family = utf16be_units("Iosevka");
        let mut d = Vec::new();
        d.extend_from_slice(&0u16.to_be_bytes()); // format
        d.extend_from_slice(&1u16.to_be_bytes()); // count
        d.extend_from_slice(&12u16.to_be_bytes()); // storage offset (unused)
        // one record: platform 3, encoding 1, lang 0x409, name_id 1
        d.extend_from_slice(&3u16.to_be_bytes());
        d.extend_from_slice(&1u16.to_be_bytes());
        d.extend_from_slice(&0x0409u16.to_be_bytes());
        d.extend_from_slice(&1u16.to_be_bytes());
        d.extend_from_slice(&((family.len() * 2) as u16).to_be_bytes());
        d.extend_from_slice(&0u16.to_be_bytes());
        for u in &family {
            d.extend_from_slice(&u.to_be_bytes());
        }

        let mut r = Reader::new(&d);
        let name = NameTable::parse(&mut r).unwrap();
        assert_eq!(name.font_family_name().as_deref(), Some("Iosevka"));
    }

    #[test]
    fn parses_format1_with_lang_tags() {
        let mut d = Vec::new();
        d.extend_from_slice(&1u16.to_be_bytes()); // format
        d.extend_from_slice(&0u16.to_be_bytes()); // count
        d.extend_from_slice(&6u16.to_be_bytes()); // storage offset
        d.extend_from_slice(&0u16.to_be_bytes()); // lang tag count

        let mut r = Reader::new(&d);
        let name = NameTable::parse(&mut r).unwrap();
        assert_eq!(name.format, 1);
        assert!(name.lang_tag_records.is_empty());
    }

    #[test]
    fn missing_name_id_returns_none() {
        let mut d = Vec::new();
        d.extend_from_slice(&0u16.to_be_bytes());
        d.extend_from_slice(&0u16.to_be_bytes());
        d.extend_from_slice(&6u16.to_be_bytes());
        let mut r = Reader::new(&d);
        let name = NameTable::parse(&mut r).unwrap();
        assert_eq!(name.post_script_name(), None);
    }
}
