use std::fmt;

/// A 4-byte OpenType table/script/feature/language tag.
///
/// Tags are compared bytewise, not as strings, and are never byte-swapped
/// regardless of the reader's endianness (they are defined as "4 uint8",
/// not as an integer). `'OS/2'` is a valid tag and includes the slash.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tag(pub [u8; 4]);

impl Tag {
    pub const fn new(bytes: [u8; 4]) -> Self {
        Tag(bytes)
    }

    /// Builds a tag from a 4-character ASCII string, space-padding on the
    /// right if it is shorter (the convention OpenType itself uses for
    /// script/language tags such as `"DFLT"` or `"grek"`).
    pub fn from_str_lossy(s: &str) -> Self {
        let mut bytes = [b' '; 4];
        for (i, b) in s.as_bytes().iter().take(4).enumerate() {
            bytes[i] = *b;
        }
        Tag(bytes)
    }

    pub fn as_bytes(&self) -> [u8; 4] {
        self.0
    }
}

impl From<[u8; 4]> for Tag {
    fn from(bytes: [u8; 4]) -> Self {
        Tag(bytes)
    }
}

impl From<&str> for Tag {
    fn from(s: &str) -> Self {
        Tag::from_str_lossy(s)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.0 {
            write!(f, "{}", if b.is_ascii_graphic() || b == b' ' { b as char } else { '.' })?;
        }
        Ok(())
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tag({self})")
    }
}

macro_rules! well_known_tags {
    ($($name:ident => $lit:literal),* $(,)?) => {
        impl Tag {
            $(pub const $name: Tag = Tag(*$lit);)*
        }
    };
}

well_known_tags! {
    HEAD => b"head",
    HHEA => b"hhea",
    VHEA => b"vhea",
    MAXP => b"maxp",
    HMTX => b"hmtx",
    VMTX => b"vmtx",
    NAME => b"name",
    POST => b"post",
    OS2 => b"OS/2",
    CMAP => b"cmap",
    BASE => b"BASE",
    DSIG => b"DSIG",
    VORG => b"VORG",
    GSUB => b"GSUB",
    GPOS => b"GPOS",
    CFF => b"CFF ",
    CFF2 => b"CFF2",
    GLYF => b"glyf",
    LOCA => b"loca",
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn tag_display_and_eq() {
        assert_eq!(Tag::OS2.to_string(), "OS/2");
        assert_eq!(Tag::from_str_lossy("cmap"), Tag::CMAP);
        assert_ne!(Tag::from(*b"head"), Tag::from(*b"HEAD"));
    }

    #[test]
    fn short_tags_are_space_padded() {
        assert_eq!(Tag::from_str_lossy("DFLT"), Tag::new(*b"DFLT"));
        assert_eq!(Tag::from_str_lossy("ab"), Tag::new(*b"ab  "));
    }
}
