//! Encoding and decoding of the file table of a normal archive.

use std::io::{Read, Seek, SeekFrom, Write};

use binrw::{BinRead, BinWrite};
use tracing::{debug, instrument};

use crate::error::{Error, Result};
use crate::types::{NormalHeader, PakRecord, MAX_NAME_LEN, RECORD_SIZE};

/// Structure representing a PAK file entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PakEntry {
    /// Name of the file, `/` separated
    pub name: Box<str>,
    /// Raw file name. To be used when name was incorrectly decoded.
    pub name_raw: Box<[u8]>,
    /// Offset of the data from the start of the normal archive
    pub offset: u32,
    /// Size of the data, without padding
    pub size: u32,
}

impl PakEntry {
    /// The first byte after the entry's data
    pub fn end(&self) -> u64 {
        self.offset as u64 + self.size as u64
    }
}

/// Check that `name` fits the fixed width name field of the file table.
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || name.contains('\0') {
        return Err(Error::InvalidName(name.to_owned()));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(Error::NameTooLong {
            name: name.to_owned(),
            len: name.len(),
        });
    }
    Ok(())
}

/// Build the table record of a single entry, zero filling the rest of the name field.
pub fn encode_record(name: &str, offset: u32, size: u32) -> Result<PakRecord> {
    validate_name(name)?;

    let mut record = PakRecord {
        offset,
        size,
        ..Default::default()
    };
    record.name[..name.len()].copy_from_slice(name.as_bytes());
    Ok(record)
}

/// Write one record per entry, in order.
#[instrument(skip_all, err, fields(entries = entries.len()))]
pub fn encode_table<W: Write + Seek>(writer: &mut W, entries: &[PakEntry]) -> Result<()> {
    for entry in entries {
        encode_record(&entry.name, entry.offset, entry.size)?.write(writer)?;
    }
    Ok(())
}

/// Read the table described by `header` from a normal archive of `raw_size` bytes.
///
/// The table size and every entry are checked against `raw_size` before anything is allocated
/// from them.
#[instrument(skip(reader), err)]
pub fn decode_table<R: Read + Seek>(
    reader: &mut R,
    header: &NormalHeader,
    raw_size: u64,
) -> Result<Vec<PakEntry>> {
    if header.table_size % RECORD_SIZE != 0 {
        return Err(Error::MalformedTable(format!(
            "table size {} is not a multiple of {RECORD_SIZE}",
            header.table_size
        )));
    }

    let table_end = header.table_offset as u64 + header.table_size as u64;
    if table_end > raw_size {
        return Err(Error::MalformedTable(format!(
            "table ends at {table_end} but the archive is {raw_size} bytes long"
        )));
    }

    let count = (header.table_size / RECORD_SIZE) as usize;
    debug!(count, "reading file table");

    reader.seek(SeekFrom::Start(header.table_offset as u64))?;

    let mut entries = Vec::with_capacity(count);
    for _ in 0..count {
        let record = PakRecord::read(reader)?;
        let name_raw = record.name_bytes();
        let entry = PakEntry {
            name: String::from_utf8_lossy(name_raw).into(),
            name_raw: name_raw.into(),
            offset: record.offset,
            size: record.size,
        };

        if entry.end() > raw_size {
            return Err(Error::MalformedTable(format!(
                "{} ends at {} but the archive is {raw_size} bytes long",
                entry.name,
                entry.end()
            )));
        }
        entries.push(entry);
    }

    Ok(entries)
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use pretty_assertions::assert_eq;

    use crate::error::{Error, Result};
    use crate::table::{decode_table, encode_record, encode_table, validate_name, PakEntry};
    use crate::types::NormalHeader;

    fn entry(name: &str, offset: u32, size: u32) -> PakEntry {
        PakEntry {
            name: name.into(),
            name_raw: name.as_bytes().into(),
            offset,
            size,
        }
    }

    #[test]
    fn validate_name_lengths() {
        assert!(validate_name(&"a".repeat(55)).is_ok());
        assert!(matches!(
            validate_name(&"a".repeat(56)),
            Err(Error::NameTooLong { len: 56, .. })
        ));
        assert!(matches!(validate_name(""), Err(Error::InvalidName(_))));
        assert!(matches!(validate_name("a\0b"), Err(Error::InvalidName(_))));
    }

    #[test]
    fn encode_record_zero_fills() -> Result<()> {
        let record = encode_record("models/barney.mdl", 0x1000, 42)?;
        assert_eq!(record.name_bytes(), b"models/barney.mdl");
        assert!(record.name[17..].iter().all(|&b| b == 0));
        assert_eq!(record.offset, 0x1000);
        assert_eq!(record.size, 42);

        Ok(())
    }

    #[test]
    fn encode_then_decode_table() -> Result<()> {
        let entries = vec![entry("a.txt", 0x800, 5), entry("sound/b.wav", 0x1000, 3000)];

        let mut data = vec![0; 0x1000 + 3000];
        let mut cursor = Cursor::new(&mut data);
        cursor.set_position(12);
        encode_table(&mut cursor, &entries)?;

        let header = NormalHeader {
            table_offset: 12,
            table_size: 128,
        };
        let raw_size = data.len() as u64;
        let decoded = decode_table(&mut Cursor::new(&data), &header, raw_size)?;
        assert_eq!(decoded, entries);

        Ok(())
    }

    #[test]
    fn decode_rejects_partial_record() {
        let data = vec![0; 0x100];
        let header = NormalHeader {
            table_offset: 12,
            table_size: 65,
        };

        assert!(matches!(
            decode_table(&mut Cursor::new(&data), &header, 0x100),
            Err(Error::MalformedTable(_))
        ));
    }

    #[test]
    fn decode_rejects_table_past_end() {
        let data = vec![0; 0x40];
        let header = NormalHeader {
            table_offset: 12,
            table_size: 0x4000_0000,
        };

        assert!(matches!(
            decode_table(&mut Cursor::new(&data), &header, 0x40),
            Err(Error::MalformedTable(_))
        ));
    }

    #[test]
    fn decode_rejects_entry_past_end() -> Result<()> {
        let mut data = vec![0; 0x100];
        let mut cursor = Cursor::new(&mut data);
        cursor.set_position(12);
        encode_table(&mut cursor, &[entry("a.txt", 0x80, 0x81)])?;

        let header = NormalHeader {
            table_offset: 12,
            table_size: 64,
        };
        assert!(matches!(
            decode_table(&mut Cursor::new(&data), &header, 0x100),
            Err(Error::MalformedTable(_))
        ));

        Ok(())
    }
}
