//! Types for writing PAK archives
//!

use binrw::BinWrite;
use bon::Builder;
use indexmap::IndexMap;
use std::fmt::Debug;
use std::io::{self, Cursor, Seek, SeekFrom, Write};
use tracing::{debug, instrument, warn, Level};

use crate::compression::compress_container;
use crate::error::{Error, Result};
use crate::format::PakKind;
use crate::layout::{align_up, alignment_for, plan_offsets};
use crate::sprite::FrameRelocator;
use crate::table::{encode_table, validate_name, PakEntry};
use crate::types::{NormalHeader, NORMAL_HEADER_SIZE, RECORD_SIZE};

/// Options for how the PAK file should be written
#[derive(Debug, Clone, Copy, Builder)]
pub struct PakWriterOptions {
    /// Whether to write a normal or a compressed archive
    #[builder(default)]
    pub kind: PakKind,

    /// Rewrite sprite frame tables the way GLOBAL.PAK expects them
    #[builder(default)]
    pub relocate_frames: bool,
}

/// PAK archive generator
///
/// Entries are collected in memory, offsets are only assigned once [`PakWriter::finish`] is called.
///
/// ```
/// # fn doit() -> ps2_pak::error::Result<()>
/// # {
/// # use ps2_pak::PakWriter;
/// use std::io::Write;
/// use ps2_pak::write::PakWriterOptions;
///
/// let mut pak = PakWriter::new(std::io::Cursor::new(Vec::new()), PakWriterOptions::builder()
///            .kind(ps2_pak::PakKind::Compressed)
///            .build());
///
/// pak.start_file("hello_world.txt")?;
/// pak.write_all(b"Hello, World!")?;
///
/// // Apply the changes you've made.
/// pak.finish()?;
///
/// # Ok(())
/// # }
/// # doit().unwrap();
/// ```
pub struct PakWriter<W: Write + Seek> {
    inner: W,
    options: PakWriterOptions,
    files: IndexMap<Box<str>, Vec<u8>>,
    writing_to_file: bool,
}

impl<W: Write + Seek> PakWriter<W> {
    /// Initializes the archive.
    ///
    /// Before writing to this object, the [`PakWriter::start_file`] function should be called.
    pub fn new(inner: W, options: PakWriterOptions) -> PakWriter<W> {
        PakWriter {
            inner,
            options,
            files: IndexMap::new(),
            writing_to_file: false,
        }
    }

    /// Returns true if a file is currently open for writing.
    pub const fn is_writing_file(&self) -> bool {
        self.writing_to_file
    }

    /// Number of entries added so far
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether no entry has been added yet
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Start a new file, closing the previous one.
    #[instrument(skip(self, name), err)]
    pub fn start_file(&mut self, name: impl ToString) -> Result<()> {
        let name = name.to_string();
        validate_name(&name)?;

        if self.files.contains_key(name.as_str()) {
            return Err(Error::DuplicateName(name));
        }

        self.files.insert(name.into(), Vec::new());
        self.writing_to_file = true;

        Ok(())
    }

    /// Compute the file table the archive will be written with.
    pub fn layout(&self) -> Result<Vec<PakEntry>> {
        let quantum = alignment_for(self.options.kind);
        let offsets = plan_offsets(
            Self::table_end(self.files.len())?,
            self.files.values().map(|data| data.len() as u64),
            quantum,
        );

        self.files
            .iter()
            .zip(offsets)
            .map(|((name, data), offset)| {
                let size = u32::try_from(data.len()).map_err(|_| Error::ArchiveTooLarge)?;
                let entry = PakEntry {
                    name: name.clone(),
                    name_raw: name.as_bytes().into(),
                    offset: u32::try_from(offset).map_err(|_| Error::ArchiveTooLarge)?,
                    size,
                };
                u32::try_from(entry.end()).map_err(|_| Error::ArchiveTooLarge)?;
                Ok(entry)
            })
            .collect()
    }

    fn table_end(count: usize) -> Result<u64> {
        let count = u32::try_from(count).map_err(|_| Error::ArchiveTooLarge)?;
        let table_size = count
            .checked_mul(RECORD_SIZE)
            .ok_or(Error::ArchiveTooLarge)?;
        Ok(NORMAL_HEADER_SIZE as u64 + table_size as u64)
    }

    /// Assemble the normal archive: header, table, then the data of each entry.
    #[instrument(skip(self), err)]
    fn build_container(&mut self) -> Result<Vec<u8>> {
        let quantum = alignment_for(self.options.kind);
        let entries = self.layout()?;

        if self.options.relocate_frames {
            let mut relocator = FrameRelocator::new();
            for (entry, data) in entries.iter().zip(self.files.values_mut()) {
                if relocator.relocate(data, entry.offset)? {
                    debug!(name = %entry.name, offset = entry.offset, "relocated sprite frames");
                } else if entry.name.to_ascii_lowercase().ends_with(".spz") {
                    warn!(name = %entry.name, "not a sprite, leaving frame table untouched");
                }
            }
        }

        let table_end = Self::table_end(entries.len())?;
        let data_end = entries.last().map_or(table_end, |e| e.end());
        let container_size = align_up(data_end, quantum);
        if container_size > u32::MAX as u64 {
            return Err(Error::ArchiveTooLarge);
        }

        let mut buffer = Vec::new();
        buffer.try_reserve_exact(container_size as usize)?;
        let mut cursor = Cursor::new(buffer);

        NormalHeader {
            table_offset: NORMAL_HEADER_SIZE,
            table_size: (table_end - NORMAL_HEADER_SIZE as u64) as u32,
        }
        .write(&mut cursor)?;
        encode_table(&mut cursor, &entries)?;

        for (entry, data) in entries.iter().zip(self.files.values()) {
            debug!(name = %entry.name, offset = entry.offset, size = entry.size, "placing entry");
            // seeking past the end zero fills the padding
            cursor.seek(SeekFrom::Start(entry.offset as u64))?;
            cursor.write_all(data)?;
        }

        let mut buffer = cursor.into_inner();
        buffer.resize(container_size as usize, 0);
        Ok(buffer)
    }

    /// Finish the last file and write the complete archive
    ///
    /// This will return the writer, but one should normally not append any data to the end of the file.
    #[instrument(skip(self), err)]
    pub fn finish(mut self) -> Result<W> {
        self.writing_to_file = false;

        let archive = match self.options.kind {
            PakKind::Normal => self.build_container()?,
            PakKind::Compressed => compress_container(&self.build_container()?)?,
            PakKind::Unknown => return Err(Error::UnknownFormat),
        };

        self.inner.write_all(&archive)?;
        self.inner.flush()?;

        Ok(self.inner)
    }
}

impl<W: Write + Seek> Write for PakWriter<W> {
    #[instrument(skip_all, err, ret(level = Level::TRACE), fields(size=buf.len()) )]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if !self.writing_to_file {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                "No file has been started",
            ));
        }

        let Some((_, data)) = self.files.last_mut() else {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                "No file has been started",
            ));
        };
        data.extend_from_slice(buf);
        Ok(buf.len())
    }

    #[instrument(skip(self), err)]
    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl<W: Write + Seek> Debug for PakWriter<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PakWriter")
            .field("options", &self.options)
            .field("files", &self.files.len())
            .field("writing_to_file", &self.writing_to_file)
            .finish()
    }
}
