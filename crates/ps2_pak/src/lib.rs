//! This library handles reading from and creating **PAK** files used by the *PlayStation 2* release of *Half-Life*.
//!
//! # PAK Archive Format Documentation
//!
//! PAK archives bundle the game's assets into a single file. The same logical archive, a list of
//! named files, is stored in one of two physical encodings: a **normal** archive that the game
//! reads directly from disc, or a **compressed** archive holding a complete normal archive in a
//! zlib stream. [`PakKind::detect`] tells them apart from the first six bytes.
//!
//! ## Normal Archives
//!
//! A normal archive consists of a header, the file table and the data of each file.
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Signature              | 4 bytes: "PACK"                                            |
//! | 0x0004         | Table Offset           | 4 bytes: Offset of the file table                          |
//! | 0x0008         | Table Size             | 4 bytes: Size of the file table in bytes                   |
//!
//! The file table is a sequence of 64 byte records, its size has to be a multiple of 64.
//!
//! | Offset (bytes) | Field                  | Description                                             |
//! |----------------|------------------------|---------------------------------------------------------|
//! | 0x0000         | Name                   | 56 bytes: Zero terminated name, at most 55 characters   |
//! | 0x0038         | Data Offset            | 4 bytes: Offset of the file data from the file start    |
//! | 0x003C         | Data Size              | 4 bytes: Size of the file data                          |
//!
//! Readers only trust the header offsets. [`PakWriter`] places the table directly after the header
//! and the data after the table. Every data offset is a multiple of `0x800`, the size of a CD
//! sector, and the gaps are zero filled. The archive itself is padded to a multiple of `0x800`.
//!
//! ## Compressed Archives
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Uncompressed Size      | 4 bytes: Size of the normal archive                        |
//! | 0x0004         | Zlib Stream            | A zlib stream, always starting with 0x78 0xDA              |
//!
//! The zlib stream header is what identifies a compressed archive, it overlaps with the table offset
//! of a normal header. Normal archives stored this way only align their data to `0x10` bytes.
//!
//! ## Sprites in GLOBAL.PAK
//!
//! Sprites (`.spz`) start with an 8 byte header followed by a frame table.
//!
//! | Offset (bytes) | Field                  | Description                                             |
//! |----------------|------------------------|---------------------------------------------------------|
//! | 0x0000         | Signature              | 4 bytes: "SPAZ"                                         |
//! | 0x0004         | Type                   | 1 byte: Sprite orientation                              |
//! | 0x0005         | Magic                  | 1 byte: Always zero                                     |
//! | 0x0006         | RAM Flag               | 1 byte: Set when frame offsets are RAM addresses        |
//! | 0x0007         | Frame Count            | 1 byte: Number of frame records                         |
//! | 0x0008         | Frames                 | 8 bytes each: Frame id and frame offset                 |
//!
//! GLOBAL.PAK stays resident in memory, its sprites carry global frame ids and RAM addresses that
//! depend on where each sprite sits in the archive. See [`sprite`] for how these are rebuilt.
//!
//! ## Additional Information
//!
//! - **File Extension**: `.pak`
//! - **Endianness**: Little-endian for all multi-byte integers
//!

pub mod compression;
pub mod error;
pub mod format;
pub mod fs;
pub mod layout;
pub mod read;
pub mod sprite;
pub mod table;
pub mod types;
pub mod write;

pub use format::PakKind;
pub use fs::ExtractOptions;
pub use read::PakArchive;
pub use table::PakEntry;
pub use write::{PakWriter, PakWriterOptions};
