//! Detection of the physical encoding of a PAK file.

use std::io::{Read, Seek, SeekFrom};

use binrw::BinRead;
use tracing::instrument;

use crate::error::{Error, Result};
use crate::types::{CompressedHeader, NormalHeader, ZLIB_MARKER};

/// Number of leading bytes needed to classify a file
pub const DETECT_LEN: usize = 6;

const NORMAL_SIGNATURE: &[u8; 4] = b"PACK";

/// Identifies how a PAK file is stored on disk
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum PakKind {
    /// Header, file table and data padded to 0x800 byte boundaries
    #[default]
    Normal,

    /// A size field followed by a zlib stream holding a whole normal archive
    Compressed,

    /// Neither of the above
    Unknown,
}

impl PakKind {
    /// Classify a file from its first [`DETECT_LEN`] bytes.
    ///
    /// The normal signature is checked first, the compressed marker sits in the bytes that hold
    /// the table offset of a normal header. Shorter inputs are accepted and simply fail the checks
    /// they are too short for.
    pub fn detect(bytes: &[u8]) -> PakKind {
        if bytes.get(..4) == Some(NORMAL_SIGNATURE.as_slice()) {
            PakKind::Normal
        } else if bytes.get(4..DETECT_LEN) == Some(ZLIB_MARKER.as_slice()) {
            PakKind::Compressed
        } else {
            PakKind::Unknown
        }
    }

    /// Peek at the start of `reader` and classify it, leaving the reader at the start.
    pub fn detect_reader<R: Read + Seek>(reader: &mut R) -> Result<PakKind> {
        reader.seek(SeekFrom::Start(0))?;

        let mut buf = Vec::with_capacity(DETECT_LEN);
        reader.by_ref().take(DETECT_LEN as u64).read_to_end(&mut buf)?;
        reader.seek(SeekFrom::Start(0))?;

        Ok(PakKind::detect(&buf))
    }
}

/// The header of a PAK file, resolved to one of its two encodings
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum PakHeader {
    Normal(NormalHeader),
    Compressed(CompressedHeader),
}

impl PakHeader {
    /// Classify and read the header at the start of `reader`.
    #[instrument(skip(reader), err)]
    pub fn read<R: Read + Seek>(reader: &mut R) -> Result<PakHeader> {
        let header = match PakKind::detect_reader(reader)? {
            PakKind::Normal => PakHeader::Normal(NormalHeader::read(reader).map_err(|e| {
                if e.is_eof() {
                    Error::MalformedTable("archive ends inside its header".into())
                } else {
                    e.into()
                }
            })?),
            PakKind::Compressed => PakHeader::Compressed(CompressedHeader::read(reader)?),
            PakKind::Unknown => return Err(Error::UnknownFormat),
        };
        Ok(header)
    }

    pub fn kind(&self) -> PakKind {
        match self {
            PakHeader::Normal(_) => PakKind::Normal,
            PakHeader::Compressed(_) => PakKind::Compressed,
        }
    }
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use pretty_assertions::assert_eq;

    use crate::error::{Error, Result};
    use crate::format::{PakHeader, PakKind};
    use crate::types::NormalHeader;

    #[test]
    fn detect_normal() {
        assert_eq!(
            PakKind::detect(&[0x50, 0x41, 0x43, 0x4B, 0x0C, 0x00]),
            PakKind::Normal
        );
    }

    #[test]
    fn detect_compressed() {
        assert_eq!(
            PakKind::detect(&[0x00, 0x10, 0x00, 0x00, 0x78, 0xDA]),
            PakKind::Compressed
        );
    }

    #[test]
    fn detect_unknown() {
        assert_eq!(PakKind::detect(b"TREE0005"), PakKind::Unknown);
        assert_eq!(
            PakKind::detect(&[0x00, 0x10, 0x00, 0x00, 0x78, 0x9C]),
            PakKind::Unknown
        );
    }

    #[test]
    fn detect_short_input() {
        assert_eq!(PakKind::detect(&[]), PakKind::Unknown);
        assert_eq!(PakKind::detect(b"PAC"), PakKind::Unknown);
        assert_eq!(PakKind::detect(b"PACK"), PakKind::Normal);
        assert_eq!(PakKind::detect(&[0, 0, 0, 0, 0x78]), PakKind::Unknown);
    }

    #[test]
    fn detect_signature_wins_over_marker() {
        // table offset 0xDA78 puts the zlib marker at bytes 4..6
        #[rustfmt::skip]
        let adversarial = [
            0x50, 0x41, 0x43, 0x4B,
            0x78, 0xDA, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
        ];
        assert_eq!(PakKind::detect(&adversarial), PakKind::Normal);
    }

    #[test]
    fn detect_every_table_offset_stays_normal() {
        for low in [0x0000u16, 0xDA78, 0x78DA, 0xFFFF] {
            let mut header = b"PACK".to_vec();
            header.extend_from_slice(&low.to_le_bytes());
            assert_eq!(PakKind::detect(&header), PakKind::Normal);
        }
    }

    #[test]
    fn read_header_rewinds() -> Result<()> {
        #[rustfmt::skip]
        let mut input = Cursor::new(vec![
            0x50, 0x41, 0x43, 0x4B,
            0x0C, 0x00, 0x00, 0x00,
            0x40, 0x00, 0x00, 0x00,
        ]);
        input.set_position(7);

        let header = PakHeader::read(&mut input)?;
        assert_eq!(
            header,
            PakHeader::Normal(NormalHeader {
                table_offset: 12,
                table_size: 64,
            })
        );
        assert_eq!(header.kind(), PakKind::Normal);

        Ok(())
    }

    #[test]
    fn read_header_truncated() {
        for len in 4..12 {
            let mut header = b"PACK".to_vec();
            header.resize(len, 0);
            assert!(
                matches!(
                    PakHeader::read(&mut Cursor::new(header)),
                    Err(Error::MalformedTable(_))
                ),
                "{len} byte header should be rejected"
            );
        }
    }

    #[test]
    fn read_header_unknown() {
        let mut input = Cursor::new(b"not a pak".to_vec());
        assert!(matches!(
            PakHeader::read(&mut input),
            Err(Error::UnknownFormat)
        ));
    }
}
