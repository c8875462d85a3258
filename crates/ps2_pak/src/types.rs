//! Base types for structure of PAK and SPZ files.

use binrw::{BinRead, BinWrite};

/// Width of the name field of a [`PakRecord`], including the terminating zero
pub const NAME_FIELD_LEN: usize = 56;

/// Longest name that still leaves room for the terminating zero
pub const MAX_NAME_LEN: usize = NAME_FIELD_LEN - 1;

/// Size of [`NormalHeader`] on disk
pub const NORMAL_HEADER_SIZE: u32 = 12;

/// Size of [`PakRecord`] on disk
pub const RECORD_SIZE: u32 = 64;

/// The first two bytes of a zlib stream written at the best compression level
///
/// Compressed archives are a size field followed directly by such a stream, which makes this the
/// marker used to recognize them.
pub const ZLIB_MARKER: [u8; 2] = [0x78, 0xDA];

/// Size of [`SpriteHeader`] on disk
pub const SPRITE_HEADER_SIZE: u32 = 8;

/// Size of [`FrameRecord`] on disk
pub const FRAME_RECORD_SIZE: u32 = 8;

/// Normal PAK header
///
/// Always starts with "PACK", followed by the location of the file table.
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq)]
#[brw(magic = b"PACK", little)]
pub struct NormalHeader {
    /// The offset from the beginning of the file where the file table starts
    pub table_offset: u32,

    /// The size of the file table in bytes
    pub table_size: u32,
}

/// Compressed PAK header
///
/// Shares its first bytes with [`NormalHeader`], the two can only be told apart by
/// [`crate::format::PakKind::detect`].
#[derive(BinRead, BinWrite, Debug, Copy, Clone, PartialEq)]
#[brw(little)]
pub struct CompressedHeader {
    /// The size of the normal archive stored inside the zlib stream
    pub uncompressed_size: u32,

    /// The zlib stream header, expected to be [`ZLIB_MARKER`]
    pub marker: [u8; 2],
}

impl Default for CompressedHeader {
    fn default() -> Self {
        Self {
            uncompressed_size: Default::default(),
            marker: ZLIB_MARKER,
        }
    }
}

/// PAK file table record
///
/// Defines an entry in the PAK file
#[derive(BinRead, BinWrite, Debug, Copy, Clone, PartialEq)]
#[brw(little)]
pub struct PakRecord {
    /// Zero terminated name, anything after the first zero is ignored
    pub name: [u8; NAME_FIELD_LEN],

    /// The offset to the data for this record from the start of the file
    pub offset: u32,

    /// The size of this record's data
    pub size: u32,
}

impl Default for PakRecord {
    fn default() -> Self {
        Self {
            name: [0; NAME_FIELD_LEN],
            offset: Default::default(),
            size: Default::default(),
        }
    }
}

impl PakRecord {
    /// The name bytes up to the first zero
    pub fn name_bytes(&self) -> &[u8] {
        let end = self
            .name
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(NAME_FIELD_LEN);
        &self.name[..end]
    }
}

/// SPZ sprite header
///
/// Sprites start with "SPAZ", a sprite type, a zero byte, the RAM flag and a frame count. The frame
/// table follows directly.
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq)]
#[brw(magic = b"SPAZ", little)]
pub struct SpriteHeader {
    /// 0 - parallel, 2 - oriented, 3 - parallel oriented
    pub sprite_type: u8,

    /// Set when the frame table holds RAM addresses instead of file offsets
    #[brw(magic = 0u8)]
    pub ram_flag: u8,

    /// The number of [`FrameRecord`]s following the header
    pub frame_count: u8,
}

/// SPZ frame table record
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq)]
#[brw(little)]
pub struct FrameRecord {
    /// Global frame id, zero outside of relocated archives
    pub frame_id: u32,

    /// Offset of the frame from the start of the sprite, or a RAM address when relocated
    pub frame_offset: u32,
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use binrw::BinRead;
    use binrw::BinWrite;
    use pretty_assertions::assert_eq;

    use crate::error::Result;
    use crate::types::{
        CompressedHeader, FrameRecord, NormalHeader, PakRecord, SpriteHeader, ZLIB_MARKER,
    };

    #[test]
    fn read_normal_header() -> Result<()> {
        #[rustfmt::skip]
        let mut input = Cursor::new(vec![
            0x50, 0x41, 0x43, 0x4B,
            0x0C, 0x00, 0x00, 0x00,
            0x80, 0x00, 0x00, 0x00,
        ]);

        let expected = NormalHeader {
            table_offset: 12,
            table_size: 128,
        };

        assert_eq!(NormalHeader::read(&mut input)?, expected);

        Ok(())
    }

    #[test]
    fn write_normal_header() -> Result<()> {
        #[rustfmt::skip]
        let expected: Vec<u8> = vec![
            0x50, 0x41, 0x43, 0x4B,
            0x0C, 0x00, 0x00, 0x00,
            0x40, 0x00, 0x00, 0x00,
        ];

        let header = NormalHeader {
            table_offset: 12,
            table_size: 64,
        };

        let mut actual = Vec::new();
        header.write(&mut Cursor::new(&mut actual))?;

        assert_eq!(actual, expected);

        Ok(())
    }

    #[test]
    fn read_compressed_header() -> Result<()> {
        #[rustfmt::skip]
        let mut input = Cursor::new(vec![
            0x00, 0x10, 0x00, 0x00,
            0x78, 0xDA,
        ]);

        let expected = CompressedHeader {
            uncompressed_size: 0x1000,
            marker: ZLIB_MARKER,
        };

        assert_eq!(CompressedHeader::read(&mut input)?, expected);

        Ok(())
    }

    #[test]
    fn read_record_ignores_garbage_after_terminator() -> Result<()> {
        let mut input = vec![0xCD; 56];
        input[..5].copy_from_slice(b"a.txt");
        input[5] = 0;
        input.extend_from_slice(&[0x00, 0x08, 0x00, 0x00]);
        input.extend_from_slice(&[0x05, 0x00, 0x00, 0x00]);

        let record = PakRecord::read(&mut Cursor::new(input))?;
        assert_eq!(record.name_bytes(), b"a.txt");
        assert_eq!(record.offset, 0x800);
        assert_eq!(record.size, 5);

        Ok(())
    }

    #[test]
    fn write_record() -> Result<()> {
        let mut record = PakRecord {
            offset: 0x800,
            size: 11,
            ..Default::default()
        };
        record.name[..9].copy_from_slice(b"hello.txt");

        let mut actual = Vec::new();
        record.write(&mut Cursor::new(&mut actual))?;

        assert_eq!(actual.len(), 64);
        assert_eq!(&actual[..9], b"hello.txt");
        assert!(actual[9..56].iter().all(|&b| b == 0));
        assert_eq!(&actual[56..], &[0x00, 0x08, 0x00, 0x00, 0x0B, 0x00, 0x00, 0x00]);

        Ok(())
    }

    #[test]
    fn read_sprite_header() -> Result<()> {
        #[rustfmt::skip]
        let mut input = Cursor::new(vec![
            0x53, 0x50, 0x41, 0x5A,
            0x02, 0x00, 0x01, 0x03,
            // Frame
            0x05, 0x00, 0x00, 0x00,
            0x20, 0x00, 0x00, 0x00,
        ]);

        let header = SpriteHeader::read(&mut input)?;
        assert_eq!(
            header,
            SpriteHeader {
                sprite_type: 2,
                ram_flag: 1,
                frame_count: 3,
            }
        );

        let frame = FrameRecord::read(&mut input)?;
        assert_eq!(
            frame,
            FrameRecord {
                frame_id: 5,
                frame_offset: 0x20,
            }
        );

        Ok(())
    }

    #[test]
    fn read_sprite_header_rejects_non_zero_magic() {
        #[rustfmt::skip]
        let mut input = Cursor::new(vec![
            0x53, 0x50, 0x41, 0x5A,
            0x02, 0x07, 0x00, 0x01,
        ]);

        assert!(SpriteHeader::read(&mut input).is_err());
    }
}
