use crate::error::Result;
use crate::reader::Reader;

/// `hmtx`/`vmtx` — per-glyph advance + side bearing.
///
/// `numOfLong*Metrics` paired entries, followed by the remaining glyphs'
/// side bearings alone (they share the last paired entry's advance). A
/// mismatch between these counts and the table's actual byte length is
/// tolerated: this parser simply stops once the reader runs out of bytes,
/// per §4.3's "truncated read" allowance.
///
/// See <https://docs.microsoft.com/en-us/typography/opentype/spec/hmtx>.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MetricsTable {
    pub metrics: Vec<LongMetric>,
    pub extra_side_bearings: Vec<i16>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LongMetric {
    pub advance: u16,
    pub side_bearing: i16,
}

impl MetricsTable {
    pub fn parse(r: &mut Reader, number_of_long_metrics: u16, num_glyphs: u16) -> Result<Self> {
        let mut metrics = Vec::with_capacity(number_of_long_metrics as usize);
        for _ in 0..number_of_long_metrics {
            let advance = match r.read_u16() {
                Ok(v) => v,
                Err(_) => break,
            };
            let side_bearing = match r.read_i16() {
                Ok(v) => v,
                Err(_) => break,
            };
            metrics.push(LongMetric { advance, side_bearing });
        }

        let remaining_glyphs = num_glyphs.saturating_sub(metrics.len() as u16);
        let mut extra_side_bearings = Vec::with_capacity(remaining_glyphs as usize);
        for _ in 0..remaining_glyphs {
            match r.read_i16() {
                Ok(v) => extra_side_bearings.push(v),
                Err(_) => break,
            }
        }

        Ok(MetricsTable {
            metrics,
            extra_side_bearings,
        })
    }

    /// The advance for `glyph_id`, following the "last paired entry applies
    /// to every trailing glyph" rule.
    pub fn advance(&self, glyph_id: u16) -> Option<u16> {
        if let Some(m) = self.metrics.get(glyph_id as usize) {
            return Some(m.advance);
        }
        self.metrics.last().map(|m| m.advance)
    }

    pub fn side_bearing(&self, glyph_id: u16) -> Option<i16> {
        if let Some(m) = self.metrics.get(glyph_id as usize) {
            return Some(m.side_bearing);
        }
        let extra_index = glyph_id as usize - self.metrics.len();
        self.extra_side_bearings.get(extra_index).copied()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parses_paired_and_trailing_entries() {
        let mut d = Vec::new();
        d.extend_from_slice(&500u16.to_be_bytes());
        d.extend_from_slice(&10i16.to_be_bytes());
        d.extend_from_slice(&600u16.to_be_bytes());
        d.extend_from_slice(&20i16.to_be_bytes());
        d.extend_from_slice(&5i16.to_be_bytes()); // trailing lsb for glyph 2

        let mut r = Reader::new(&d);
        let hmtx = MetricsTable::parse(&mut r, 2, 3).unwrap();
        assert_eq!(hmtx.advance(0), Some(500));
        assert_eq!(hmtx.advance(1), Some(600));
        assert_eq!(hmtx.advance(2), Some(600)); // inherits last paired advance
        assert_eq!(hmtx.side_bearing(2), Some(5));
    }

    #[test]
    fn tolerates_truncated_table() {
        let d = [0x01, 0xF4]; // only half of one entry
        let mut r = Reader::new(&d);
        let hmtx = MetricsTable::parse(&mut r, 3, 5).unwrap();
        assert_eq!(hmtx.metrics.len(), 0);
    }
}
