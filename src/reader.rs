//! A position-tracked, big-endian cursor over a borrowed byte buffer.
//!
//! This is the sole way any parser in this crate touches raw bytes. It
//! mirrors the OpenType spec's own vocabulary for scalar forms (`Fixed`,
//! `F2DOT14`, `FWORD`, `LONGDATETIME`, ...) rather than leaving each table
//! parser to reimplement the arithmetic.

use crate::error::{Error, Result};

/// Seconds between the TrueType/Mac epoch (1904-01-01 00:00 UTC) and the
/// Unix epoch (1970-01-01 00:00 UTC).
const MAC_EPOCH_TO_UNIX: i64 = 2_082_844_800;

macro_rules! impl_scalar_read {
    ($name:ident, $ty:ty, $width:expr) => {
        pub fn $name(&mut self) -> Result<$ty> {
            let bytes = self.read_array::<$width>()?;
            Ok(<$ty>::from_be_bytes(bytes))
        }
    };
}

/// A cursor over `buffer[start..end]`, with an explicit LIFO save/restore
/// stack of positions.
///
/// Cloning a `Reader` is cheap (it borrows the same buffer) but creates an
/// independent save/restore stack and cursor; use [`Reader::sub_reader`] to
/// create a child confined to a narrower window when a nested offset table
/// must not be able to read past its own extent.
#[derive(Clone)]
pub struct Reader<'a> {
    buffer: &'a [u8],
    start: usize,
    end: usize,
    pos: usize,
    saved: Vec<usize>,
}

impl<'a> Reader<'a> {
    /// A reader over the whole buffer.
    pub fn new(buffer: &'a [u8]) -> Self {
        Reader {
            buffer,
            start: 0,
            end: buffer.len(),
            pos: 0,
            saved: Vec::new(),
        }
    }

    /// A reader over `buffer[start..end]`, positioned at `start`.
    ///
    /// `end` is clamped to `buffer.len()`.
    pub fn new_window(buffer: &'a [u8], start: usize, end: usize) -> Self {
        let end = end.min(buffer.len());
        let start = start.min(end);
        Reader {
            buffer,
            start,
            end,
            pos: start,
            saved: Vec::new(),
        }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn window_start(&self) -> usize {
        self.start
    }

    pub fn window_end(&self) -> usize {
        self.end
    }

    /// The length of the underlying buffer this reader (and any reader
    /// derived from it via [`Reader::window_at`]) was built from.
    pub fn buffer_len(&self) -> usize {
        self.buffer.len()
    }

    pub fn remaining(&self) -> usize {
        self.end.saturating_sub(self.pos)
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Seeks to an absolute offset, which must lie within `[start, end]`
    /// (the end is inclusive here so a reader can legally sit just past its
    /// last byte, as `skip`/sequential reads naturally leave it).
    pub fn seek(&mut self, pos: usize) -> Result<()> {
        if pos < self.start || pos > self.end {
            return Err(Error::SeekOutOfBounds {
                target: pos as u64,
                start: self.start as u64,
                end: self.end as u64,
            });
        }
        self.pos = pos;
        Ok(())
    }

    /// Seeks to `window_start() + offset`, the common case of resolving an
    /// offset recorded relative to the table/sub-table this reader is
    /// scoped to.
    pub fn seek_from_start(&mut self, offset: usize) -> Result<()> {
        self.seek(self.start + offset)
    }

    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.seek(self.pos + n)
    }

    /// Pushes the current position onto the save stack.
    pub fn save(&mut self) {
        self.saved.push(self.pos);
    }

    /// Pops the most recently saved position and seeks back to it.
    ///
    /// Fails if the save stack is empty; the cursor is left untouched in
    /// that case.
    pub fn restore(&mut self) -> Result<()> {
        match self.saved.pop() {
            Some(pos) => {
                self.pos = pos;
                Ok(())
            }
            None => Err(Error::SeekOutOfBounds {
                target: self.pos as u64,
                start: self.start as u64,
                end: self.end as u64,
            }),
        }
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        if self.pos + N > self.end {
            return Err(Error::UnexpectedEof);
        }
        let mut out = [0u8; N];
        out.copy_from_slice(&self.buffer[self.pos..self.pos + N]);
        self.pos += N;
        Ok(out)
    }

    /// Returns a borrowed view of the next `n` bytes without copying.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.pos + n > self.end {
            return Err(Error::UnexpectedEof);
        }
        let slice = &self.buffer[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Returns the remaining bytes in this reader's window without
    /// consuming them.
    pub fn remaining_bytes(&self) -> &'a [u8] {
        &self.buffer[self.pos..self.end]
    }

    /// Consumes `len` bytes of `self` and returns an independent cursor
    /// scoped to exactly that range. The child has its own save/restore
    /// stack; moving it never affects `self`.
    pub fn sub_reader(&mut self, len: usize) -> Result<Reader<'a>> {
        let bytes = self.read_bytes(len)?;
        Ok(Reader {
            buffer: bytes,
            start: 0,
            end: bytes.len(),
            pos: 0,
            saved: Vec::new(),
        })
    }

    /// A reader over `[offset, offset+len)` of the *original* buffer this
    /// reader was built from, ignoring the current cursor position. Used to
    /// jump to a table/sub-table whose absolute extent is already known
    /// (e.g. a directory entry, or a resolved OTL sub-offset).
    pub fn window_at(&self, offset: usize, len: usize) -> Result<Reader<'a>> {
        if offset + len > self.buffer.len() {
            return Err(Error::UnexpectedEof);
        }
        Ok(Reader::new_window(self.buffer, offset, offset + len))
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.read_array::<1>()?[0] as i8)
    }

    impl_scalar_read!(read_u16, u16, 2);
    impl_scalar_read!(read_i16, i16, 2);
    impl_scalar_read!(read_u32, u32, 4);
    impl_scalar_read!(read_i32, i32, 4);
    impl_scalar_read!(read_u64, u64, 8);
    impl_scalar_read!(read_i64, i64, 8);

    pub fn read_u24(&mut self) -> Result<u32> {
        let b = self.read_array::<3>()?;
        Ok(u32::from_be_bytes([0, b[0], b[1], b[2]]))
    }

    /// Four raw bytes, not byte-swapped: tags are defined as 4 uint8, not
    /// as an integer.
    pub fn read_tag(&mut self) -> Result<crate::tag::Tag> {
        Ok(crate::tag::Tag::new(self.read_array::<4>()?))
    }

    /// Offset16: 0 conventionally means "absent"; callers decide how to
    /// treat that per-field, this layer just exposes the raw value.
    pub fn read_offset16(&mut self) -> Result<u16> {
        self.read_u16()
    }

    pub fn read_offset24(&mut self) -> Result<u32> {
        self.read_u24()
    }

    pub fn read_offset32(&mut self) -> Result<u32> {
        self.read_u32()
    }

    /// Signed 16.16 fixed point.
    pub fn read_fixed(&mut self) -> Result<Fixed> {
        Ok(Fixed(self.read_i32()?))
    }

    /// Signed 2.14 fixed point, used for variation-space coordinates.
    pub fn read_f2dot14(&mut self) -> Result<F2Dot14> {
        Ok(F2Dot14(self.read_i16()?))
    }

    /// Signed font design units.
    pub fn read_fword(&mut self) -> Result<i16> {
        self.read_i16()
    }

    /// Unsigned font design units.
    pub fn read_ufword(&mut self) -> Result<u16> {
        self.read_u16()
    }

    /// Seconds since 1904-01-01, converted to a Unix timestamp.
    pub fn read_longdatetime(&mut self) -> Result<i64> {
        Ok(self.read_i64()? - MAC_EPOCH_TO_UNIX)
    }

    pub fn read_version16dot16(&mut self) -> Result<Version16Dot16> {
        Ok(Version16Dot16(self.read_u32()?))
    }
}

/// Signed 16.16 fixed-point number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fixed(pub i32);

impl Fixed {
    pub fn to_f64(self) -> f64 {
        self.0 as f64 / 65536.0
    }
}

/// Signed 2.14 fixed-point number, range roughly [-2.0, 2.0).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct F2Dot14(pub i16);

impl F2Dot14 {
    pub fn to_f64(self) -> f64 {
        self.0 as f64 / 16384.0
    }
}

/// A `major.minor` version encoded as upper/lower halves of a `uint32`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Version16Dot16(pub u32);

impl Version16Dot16 {
    pub const ONE: Version16Dot16 = Version16Dot16(0x0001_0000);
    pub const HALF: Version16Dot16 = Version16Dot16(0x0000_5000);

    pub fn major(self) -> u16 {
        (self.0 >> 16) as u16
    }

    pub fn minor(self) -> u16 {
        (self.0 & 0xFFFF) as u16
    }

    /// `(major, minor/65536)` as a float, the generic interpretation for
    /// versions outside the two well-known constants above.
    pub fn as_f64(self) -> f64 {
        self.major() as f64 + self.minor() as f64 / 65536.0
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn scalar_reads_are_big_endian() {
        let data = [0x00, 0x0A, 0x00, 0x00, 0x00, 0x14];
        let mut r = Reader::new(&data);
        assert_eq!(r.read_u16().unwrap(), 10);
        assert_eq!(r.read_u32().unwrap(), 20);
    }

    #[test]
    fn read_past_end_is_unexpected_eof() {
        let data = [0u8; 1];
        let mut r = Reader::new(&data);
        assert!(matches!(r.read_u16(), Err(Error::UnexpectedEof)));
    }

    #[test]
    fn save_restore_roundtrips() {
        let data = [1, 2, 3, 4, 5, 6];
        let mut r = Reader::new(&data);
        r.read_u8().unwrap();
        r.save();
        r.read_u16().unwrap();
        r.restore().unwrap();
        assert_eq!(r.position(), 1);
    }

    #[test]
    fn restore_on_empty_stack_fails() {
        let data = [1, 2, 3];
        let mut r = Reader::new(&data);
        assert!(r.restore().is_err());
    }

    #[test]
    fn sub_reader_is_independent_of_parent() {
        let data = [0xAA, 1, 2, 3, 4, 0xBB, 0xBB];
        let mut parent = Reader::new(&data);
        parent.read_u8().unwrap(); // consume the 0xAA marker
        let mut child = parent.sub_reader(4).unwrap();
        assert_eq!(parent.position(), 5);

        child.save();
        assert_eq!(child.read_u32().unwrap(), 0x01020304);
        child.restore().unwrap();
        assert_eq!(child.position(), 0);

        // parent's own save stack is untouched by the child's use of save/restore
        assert!(parent.restore().is_err());
    }

    #[test]
    fn read_longdatetime_converts_mac_epoch() {
        let mut data = Vec::new();
        data.extend_from_slice(&MAC_EPOCH_TO_UNIX.to_be_bytes());
        let mut r = Reader::new(&data);
        assert_eq!(r.read_longdatetime().unwrap(), 0);
    }

    #[test]
    fn version_16_dot_16_recognizes_well_known_values() {
        let mut data = Vec::new();
        data.extend_from_slice(&0x0001_0000u32.to_be_bytes());
        data.extend_from_slice(&0x0000_5000u32.to_be_bytes());
        let mut r = Reader::new(&data);
        assert_eq!(r.read_version16dot16().unwrap(), Version16Dot16::ONE);
        assert_eq!(r.read_version16dot16().unwrap(), Version16Dot16::HALF);
    }

    #[test]
    fn tag_reads_are_endian_invariant() {
        let data = *b"OS/2";
        let mut r = Reader::new(&data);
        assert_eq!(r.read_tag().unwrap(), crate::tag::Tag::OS2);
    }

    #[test]
    fn fixed_and_f2dot14_conversions() {
        let mut data = Vec::new();
        data.extend_from_slice(&3_u16.to_be_bytes()); // decimal
        data.extend_from_slice(&2031_u16.to_be_bytes()); // fraction (~0.031)
        let mut r = Reader::new(&data);
        let decimal = r.read_i16().unwrap();
        let fraction = r.read_u16().unwrap();
        assert_eq!(decimal, 3);
        assert!((fraction as f64 / 65536.0 - 0.031).abs() < 0.001);
    }
}
