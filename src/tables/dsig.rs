use crate::error::Result;
use crate::reader::Reader;

/// `DSIG` — digital signature table. The payload is an opaque PKCS#7
/// blob; this crate has no use for its contents beyond exposing the raw
/// bytes, since verifying a signature is outside the scope of a parser.
///
/// See <https://docs.microsoft.com/en-us/typography/opentype/spec/dsig>.
#[derive(Debug, Clone, PartialEq)]
pub struct DsigTable {
    pub version: u32,
    pub flags: u16,
    pub signature_records: Vec<SignatureRecord>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignatureRecord {
    pub format: u32,
    /// Bytes after the 12-byte signature-block header (`reserved1`,
    /// `reserved2`, `signatureLength`).
    pub signature: Vec<u8>,
}

impl DsigTable {
    pub fn parse(r: &mut Reader) -> Result<Self> {
        let table_start = r.window_start();
        let version = r.read_u32()?;
        let num_signatures = r.read_u16()?;
        let flags = r.read_u16()?;

        struct Raw {
            format: u32,
            length: u32,
            offset: u32,
        }
        let mut raw = Vec::with_capacity(num_signatures as usize);
        for _ in 0..num_signatures {
            raw.push(Raw {
                format: r.read_u32()?,
                length: r.read_u32()?,
                offset: r.read_u32()?,
            });
        }

        let mut signature_records = Vec::with_capacity(raw.len());
        for rec in raw {
            let mut sr = r.window_at(table_start + rec.offset as usize, r.buffer_len() - table_start)?;
            let _reserved1 = sr.read_u32()?;
            let _reserved2 = sr.read_u32()?;
            let signature_length = sr.read_u32()?;
            let payload_len = (rec.length as usize).saturating_sub(12).min(signature_length as usize);
            let signature = sr.read_bytes(payload_len)?.to_vec();
            signature_records.push(SignatureRecord {
                format: rec.format,
                signature,
            });
        }

        Ok(DsigTable {
            version,
            flags,
            signature_records,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parses_single_signature_block() {
        let mut d = Vec::new();
        d.extend_from_slice(&1u32.to_be_bytes()); // version
        d.extend_from_slice(&1u16.to_be_bytes()); // numSignatures
        d.extend_from_slice(&0u16.to_be_bytes()); // flags
        d.extend_from_slice(&1u32.to_be_bytes()); // format
        d.extend_from_slice(&16u32.to_be_bytes()); // length (12 header + 4 payload)
        d.extend_from_slice(&20u32.to_be_bytes()); // offset
        assert_eq!(d.len(), 20);
        d.extend_from_slice(&0u32.to_be_bytes()); // reserved1
        d.extend_from_slice(&0u32.to_be_bytes()); // reserved2
        d.extend_from_slice(&4u32.to_be_bytes()); // signatureLength
        d.extend_from_slice(&[0xDE, 0xAD, 0xBE, 0xEF]);

        let mut r = Reader::new(&d);
        let dsig = DsigTable::parse(&mut r).unwrap();
        assert_eq!(dsig.signature_records.len(), 1);
        assert_eq!(dsig.signature_records[0].signature, vec![0xDE, 0xAD, 0xBE, 0xEF]);
    }
}
