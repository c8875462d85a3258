//! Types for reading PAK archives
//!

use binrw::BinRead;
use std::{
    fmt::{self, Debug},
    io::{self, Cursor, Read, Seek, SeekFrom},
};
use tracing::{debug, instrument};

use crate::{
    compression::decompress_container,
    error::{Error, FileNotFoundError, Result},
    format::{PakHeader, PakKind},
    table::{decode_table, PakEntry},
    types::NormalHeader,
};

/// A struct for reading an entry from a PAK file
pub struct PakFile<'a, R: Read + Seek> {
    entry: &'a PakEntry,
    reader: io::Take<&'a mut PakSource<R>>,
}

impl<'a, R: Read + Seek> Debug for PakFile<'a, R> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "PakFile({:#?})", self.entry)
    }
}

/// Methods for retrieving information on PAK file entries
impl<'a, R: Read + Seek> PakFile<'a, R> {
    /// Get the name of the file
    ///
    /// # Warnings
    ///
    /// It is dangerous to use this name directly when extracting an archive.
    /// It may contain an absolute path (`/etc/shadow`), or break out of the
    /// current directory (`../runtime`). Use [`crate::fs::entry_path`] to build
    /// a path from it.
    pub fn name(&self) -> &str {
        &self.entry.name
    }

    /// Get the name of the file, in the raw (internal) byte representation.
    pub fn name_raw(&self) -> &[u8] {
        &self.entry.name_raw
    }

    /// Get the size of the file, in bytes
    pub fn size(&self) -> u64 {
        self.entry.size as u64
    }

    /// Get the offset of the file's data inside the normal archive
    pub fn data_start(&self) -> u64 {
        self.entry.offset as u64
    }

    /// Get the table entry of this file
    pub fn entry(&self) -> &PakEntry {
        self.entry
    }
}

impl<R: Read + Seek> Read for PakFile<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.reader.read(buf)
    }
}

/// Where the normal archive is read from
///
/// Compressed archives have no table of their own, they are inflated completely before anything
/// else happens.
pub(crate) enum PakSource<R> {
    Normal(R),
    Inflated(Cursor<Vec<u8>>),
}

impl<R: Read + Seek> Read for PakSource<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            PakSource::Normal(r) => r.read(buf),
            PakSource::Inflated(r) => r.read(buf),
        }
    }
}

impl<R: Read + Seek> Seek for PakSource<R> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        match self {
            PakSource::Normal(r) => r.seek(pos),
            PakSource::Inflated(r) => r.seek(pos),
        }
    }
}

/// PAK archive reader
///
/// ```no_run
/// use std::io::prelude::*;
///
/// fn list_pak_contents(reader: impl Read + Seek) -> ps2_pak::error::Result<()> {
///     let mut pak = ps2_pak::PakArchive::new(reader)?;
///
///     for i in 0..pak.len() {
///         let mut file = pak.by_index(i)?;
///         println!("Filename: {}", file.name());
///         std::io::copy(&mut file, &mut std::io::stdout())?;
///     }
///
///     Ok(())
/// }
/// ```
pub struct PakArchive<R> {
    source: PakSource<R>,
    kind: PakKind,
    stored_size: u64,
    container_size: u64,
    entries: Vec<PakEntry>,
}

impl<R> PakArchive<R> {
    /// How the archive was stored on disk
    pub fn kind(&self) -> PakKind {
        self.kind
    }

    /// Size of the archive as stored on disk
    pub fn stored_size(&self) -> u64 {
        self.stored_size
    }

    /// Size of the normal archive, after inflating it for compressed archives
    pub fn container_size(&self) -> u64 {
        self.container_size
    }

    /// Total size of the files in the archive, without padding or metadata.
    pub fn decompressed_size(&self) -> u64 {
        self.entries.iter().map(|e| e.size as u64).sum()
    }

    /// Number of entries contained in this PAK.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether this PAK archive contains no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The file table in archive order
    pub fn entries(&self) -> &[PakEntry] {
        &self.entries
    }

    /// Returns an iterator over all the file names in this archive.
    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_ref())
    }

    /// Get the index of the first file entry with this name, if it's present.
    pub fn index_for_name(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.name.as_ref() == name)
    }

    /// Get the name of a file entry, if it's present.
    pub fn name_for_index(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(|e| e.name.as_ref())
    }
}

impl<R: Read + Seek> PakArchive<R> {
    /// Read a PAK archive collecting the files it contains.
    #[instrument(skip(reader), err)]
    pub fn new(mut reader: R) -> Result<PakArchive<R>> {
        let archive = match PakHeader::read(&mut reader)? {
            PakHeader::Normal(header) => {
                let container_size = reader.seek(SeekFrom::End(0))?;
                let entries = decode_table(&mut reader, &header, container_size)?;
                PakArchive {
                    source: PakSource::Normal(reader),
                    kind: PakKind::Normal,
                    stored_size: container_size,
                    container_size,
                    entries,
                }
            }
            PakHeader::Compressed(_) => {
                reader.seek(SeekFrom::Start(0))?;
                let mut compressed = Vec::new();
                reader.read_to_end(&mut compressed)?;

                let mut inflated = Cursor::new(decompress_container(&compressed)?);
                let header = NormalHeader::read(&mut inflated)?;
                let container_size = inflated.get_ref().len() as u64;
                let entries = decode_table(&mut inflated, &header, container_size)?;
                PakArchive {
                    source: PakSource::Inflated(inflated),
                    kind: PakKind::Compressed,
                    stored_size: compressed.len() as u64,
                    container_size,
                    entries,
                }
            }
        };

        debug!(
            kind = ?archive.kind,
            entries = archive.entries.len(),
            "opened archive"
        );
        Ok(archive)
    }

    /// Search for a file entry by name
    pub fn by_name(&mut self, name: &str) -> Result<PakFile<'_, R>> {
        let Some(index) = self.index_for_name(name) else {
            return Err(Error::FileNotFound(FileNotFoundError::Name(
                name.to_owned(),
            )));
        };
        self.by_index(index)
    }

    /// Get a contained file by index
    pub fn by_index(&mut self, file_number: usize) -> Result<PakFile<'_, R>> {
        let entry = self
            .entries
            .get(file_number)
            .ok_or(Error::FileNotFound(FileNotFoundError::Index(file_number)))?;

        self.source.seek(SeekFrom::Start(entry.offset as u64))?;

        Ok(PakFile {
            entry,
            reader: (&mut self.source).take(entry.size as u64),
        })
    }

    /// Read the complete data of a contained file
    pub fn read_entry(&mut self, file_number: usize) -> Result<Vec<u8>> {
        let mut file = self.by_index(file_number)?;

        let mut data = Vec::new();
        data.try_reserve_exact(file.size() as usize)?;
        file.read_to_end(&mut data)?;

        if data.len() as u64 != file.size() {
            return Err(Error::MalformedTable(format!(
                "{} is cut short after {} bytes",
                file.name(),
                data.len()
            )));
        }
        Ok(data)
    }
}
