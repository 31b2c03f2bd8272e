//! Snapshot record codec.
//!
//! A snapshot file is a plain concatenation of records, written in the
//! namespace's insertion order:
//!
//! ```text
//! +-------------+
//! | u32 klen    |  big-endian, includes trailing NUL
//! | u32 ilen    |  big-endian, includes trailing NUL
//! | u32 dlen    |  big-endian, includes trailing NUL; 0 = data absent
//! | u32 when    |  big-endian, seconds since epoch
//! | u32 count   |  big-endian
//! +-------------+
//! | bytes[klen] |  nkey, NUL-terminated
//! | bytes[ilen] |  id, NUL-terminated
//! | bytes[dlen] |  data, NUL-terminated; present only when dlen > 0
//! +-------------+
//! ```
//!
//! End of file at a header boundary terminates the stream. A short read
//! after a complete header is corruption.

use std::io::{self, Read, Write};

use byteorder::{BigEndian, ByteOrder, WriteBytesExt};

use typeahead_core::{Error, Result};

/// Fixed header size: five big-endian `u32` fields.
pub const HEADER_LEN: usize = 20;

/// Upper bound on any single length field; a corrupt header must not drive
/// a multi-gigabyte allocation.
const MAX_FIELD_LEN: u32 = 1 << 20;

/// One persisted entry, exactly as stored on disk.
///
/// Keys are stored pre-normalized; readers must not fold them again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotRecord {
    pub nkey: String,
    pub id: String,
    pub data: Option<String>,
    pub when: u64,
    pub count: i64,
}

impl SnapshotRecord {
    /// Append this record to `w`.
    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_u32::<BigEndian>(self.nkey.len() as u32 + 1)?;
        w.write_u32::<BigEndian>(self.id.len() as u32 + 1)?;
        let dlen = self.data.as_ref().map_or(0, |d| d.len() as u32 + 1);
        w.write_u32::<BigEndian>(dlen)?;
        w.write_u32::<BigEndian>(self.when as u32)?;
        w.write_u32::<BigEndian>(self.count as u32)?;
        w.write_all(self.nkey.as_bytes())?;
        w.write_all(&[0])?;
        w.write_all(self.id.as_bytes())?;
        w.write_all(&[0])?;
        if let Some(data) = &self.data {
            w.write_all(data.as_bytes())?;
            w.write_all(&[0])?;
        }
        Ok(())
    }

    /// Read one record from `r`.
    ///
    /// Returns `Ok(None)` when the stream ends at the header boundary,
    /// including a header cut short by truncation. Any shortfall after a
    /// complete header is `Corruption`.
    pub fn read_from<R: Read>(r: &mut R) -> Result<Option<SnapshotRecord>> {
        let mut header = [0u8; HEADER_LEN];
        match r.read_exact(&mut header) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
            Err(e) => return Err(e.into()),
        }

        let klen = BigEndian::read_u32(&header[0..4]);
        let ilen = BigEndian::read_u32(&header[4..8]);
        let dlen = BigEndian::read_u32(&header[8..12]);
        let when = BigEndian::read_u32(&header[12..16]);
        let count = BigEndian::read_u32(&header[16..20]);

        let nkey = read_field(r, klen, "key")?;
        let id = read_field(r, ilen, "id")?;
        let data = if dlen > 0 {
            Some(read_field(r, dlen, "data")?)
        } else {
            None
        };

        Ok(Some(SnapshotRecord {
            nkey,
            id,
            data,
            when: u64::from(when),
            count: i64::from(count),
        }))
    }
}

/// Read a NUL-terminated field of exactly `len` bytes (NUL included).
fn read_field<R: Read>(r: &mut R, len: u32, what: &str) -> Result<String> {
    if len == 0 {
        return Err(Error::corruption(format!("zero-length {what} field")));
    }
    if len > MAX_FIELD_LEN {
        return Err(Error::corruption(format!(
            "{what} field length {len} exceeds limit"
        )));
    }
    let mut buf = vec![0u8; len as usize];
    r.read_exact(&mut buf)
        .map_err(|_| Error::corruption(format!("short read in {what} field")))?;
    if buf.pop() != Some(0) {
        return Err(Error::corruption(format!(
            "{what} field missing NUL terminator"
        )));
    }
    String::from_utf8(buf).map_err(|_| Error::corruption(format!("{what} field is not UTF-8")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(nkey: &str, id: &str, data: Option<&str>, when: u64, count: i64) -> SnapshotRecord {
        SnapshotRecord {
            nkey: nkey.into(),
            id: id.into(),
            data: data.map(String::from),
            when,
            count,
        }
    }

    fn encode(records: &[SnapshotRecord]) -> Vec<u8> {
        let mut buf = Vec::new();
        for r in records {
            r.write_to(&mut buf).unwrap();
        }
        buf
    }

    fn decode_all(mut bytes: &[u8]) -> Result<Vec<SnapshotRecord>> {
        let mut out = Vec::new();
        while let Some(r) = SnapshotRecord::read_from(&mut bytes)? {
            out.push(r);
        }
        Ok(out)
    }

    #[test]
    fn wire_layout_of_a_full_record() {
        let bytes = encode(&[record("ab", "x", Some("d"), 0x0102, 3)]);
        assert_eq!(
            bytes,
            [
                0, 0, 0, 3, // klen = "ab" + NUL
                0, 0, 0, 2, // ilen = "x" + NUL
                0, 0, 0, 2, // dlen = "d" + NUL
                0, 0, 1, 2, // when
                0, 0, 0, 3, // count
                b'a', b'b', 0, b'x', 0, b'd', 0,
            ]
        );
    }

    #[test]
    fn absent_data_encodes_dlen_zero() {
        let original = record("star wars", "", None, 100, 1);
        let bytes = encode(std::slice::from_ref(&original));
        let decoded = decode_all(&bytes).unwrap();
        assert_eq!(decoded, vec![original]);
    }

    #[test]
    fn multiple_records_preserve_order() {
        let records = vec![
            record("apple", "", Some("a"), 100, 1),
            record("apricot", "7", None, 200, 2),
            record("banana", "", Some("b"), 300, 5),
        ];
        assert_eq!(decode_all(&encode(&records)).unwrap(), records);
    }

    #[test]
    fn empty_stream_is_done() {
        assert_eq!(decode_all(b"").unwrap(), vec![]);
    }

    #[test]
    fn truncated_header_is_done() {
        let bytes = encode(&[record("k", "", None, 1, 1)]);
        // Cut inside the second record's header.
        let mut stream = bytes.clone();
        stream.extend_from_slice(&bytes[..7]);
        let decoded = decode_all(&stream).unwrap();
        assert_eq!(decoded.len(), 1);
    }

    #[test]
    fn truncated_body_is_corruption() {
        let bytes = encode(&[record("longish-key", "", Some("data"), 1, 1)]);
        let cut = HEADER_LEN + 3; // header complete, key field short
        let err = decode_all(&bytes[..cut]).unwrap_err();
        assert!(matches!(err, Error::Corruption(_)));
    }

    #[test]
    fn missing_terminator_is_corruption() {
        let mut bytes = encode(&[record("k", "", None, 1, 1)]);
        // Overwrite the key's NUL terminator.
        let nul_at = HEADER_LEN + 1;
        bytes[nul_at] = b'!';
        let err = decode_all(&bytes).unwrap_err();
        assert!(matches!(err, Error::Corruption(_)));
    }

    #[test]
    fn oversized_length_is_corruption() {
        let mut bytes = encode(&[record("k", "", None, 1, 1)]);
        bytes[0..4].copy_from_slice(&0xFFFF_FFFFu32.to_be_bytes());
        let err = decode_all(&bytes).unwrap_err();
        assert!(matches!(err, Error::Corruption(_)));
    }
}
