use crate::error::Result;
use crate::reader::Reader;
use crate::tables::GlyphId;

/// `VORG` — default and per-glyph vertical origin Y coordinates, used by
/// vertical-layout CFF fonts in place of `glyf`'s own vertical metrics.
///
/// See <https://docs.microsoft.com/en-us/typography/opentype/spec/vorg>.
#[derive(Debug, Clone, PartialEq)]
pub struct VorgTable {
    pub major_version: u16,
    pub minor_version: u16,
    /// Y coordinate applied to any glyph not listed in `vert_origin_y_metrics`.
    pub default_vert_origin_y: i16,
    /// Sorted by glyph id, ascending.
    pub vert_origin_y_metrics: Vec<VertOriginYMetric>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertOriginYMetric {
    pub glyph_id: GlyphId,
    pub vert_origin_y: i16,
}

impl VorgTable {
    pub fn parse(r: &mut Reader) -> Result<Self> {
        let major_version = r.read_u16()?;
        let minor_version = r.read_u16()?;
        let default_vert_origin_y = r.read_i16()?;
        let num_vert_origin_y_metrics = r.read_u16()?;
        let mut vert_origin_y_metrics = Vec::with_capacity(num_vert_origin_y_metrics as usize);
        for _ in 0..num_vert_origin_y_metrics {
            vert_origin_y_metrics.push(VertOriginYMetric {
                glyph_id: GlyphId(r.read_u16()?),
                vert_origin_y: r.read_i16()?,
            });
        }
        Ok(VorgTable {
            major_version,
            minor_version,
            default_vert_origin_y,
            vert_origin_y_metrics,
        })
    }

    /// The vertical origin Y for `glyph_id`, falling back to the default
    /// when the glyph has no override. Entries are sorted, so this could
    /// binary-search; a linear scan is simpler and VORG tables are small.
    pub fn vert_origin_y(&self, glyph_id: GlyphId) -> i16 {
        self.vert_origin_y_metrics
            .iter()
            .find(|m| m.glyph_id == glyph_id)
            .map(|m| m.vert_origin_y)
            .unwrap_or(self.default_vert_origin_y)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn falls_back_to_default_for_unlisted_glyphs() {
        let mut d = Vec::new();
        d.extend_from_slice(&1u16.to_be_bytes());
        d.extend_from_slice(&0u16.to_be_bytes());
        d.extend_from_slice(&880i16.to_be_bytes()); // default
        d.extend_from_slice(&1u16.to_be_bytes()); // count
        d.extend_from_slice(&5u16.to_be_bytes()); // glyph id
        d.extend_from_slice(&900i16.to_be_bytes());

        let mut r = Reader::new(&d);
        let vorg = VorgTable::parse(&mut r).unwrap();
        assert_eq!(vorg.vert_origin_y(GlyphId(5)), 900);
        assert_eq!(vorg.vert_origin_y(GlyphId(6)), 880);
    }
}
