//! Packing directories into archives and extracting archives into directories.

use std::fs::{self, File};
use std::io::{self, BufReader, Read, Seek, Write};
use std::path::{Component, Path, PathBuf};

use bon::Builder;
use tempfile::NamedTempFile;
use tracing::{debug, info, instrument};
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::read::PakArchive;
use crate::sprite::restore_frames;
use crate::table::PakEntry;
use crate::write::{PakWriter, PakWriterOptions};

/// Options for how an archive should be extracted
#[derive(Debug, Clone, Copy, Default, Builder)]
pub struct ExtractOptions {
    /// Replace files that already exist in the destination
    #[builder(default)]
    pub overwrite: bool,

    /// Turn sprites with RAM addresses back into plain sprites, for GLOBAL.PAK
    #[builder(default)]
    pub restore_frames: bool,
}

/// Build the relative path an entry is extracted to.
///
/// Both `/` and `\` separate directories. Names that would leave the destination directory are
/// rejected.
pub fn entry_path(name: &str) -> Result<PathBuf> {
    if name.starts_with(|c: char| c == '/' || c == '\\') {
        return Err(Error::UnsafePath(name.to_owned()));
    }

    let mut path = PathBuf::new();
    for part in name.split(|c: char| c == '/' || c == '\\') {
        if part.is_empty() || part == "." {
            continue;
        }

        let mut components = Path::new(part).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(component)), None) => path.push(component),
            _ => return Err(Error::UnsafePath(name.to_owned())),
        }
    }

    if path.as_os_str().is_empty() {
        return Err(Error::UnsafePath(name.to_owned()));
    }
    Ok(path)
}

/// Build the entry name of `path`, a file somewhere below `root`.
pub fn entry_name(root: &Path, path: &Path) -> Result<String> {
    let relative = path
        .strip_prefix(root)
        .map_err(|_| Error::UnsafePath(path.display().to_string()))?;

    let parts = relative
        .components()
        .map(|component| match component {
            Component::Normal(part) => part
                .to_str()
                .ok_or_else(|| Error::InvalidName(part.to_string_lossy().into_owned())),
            _ => Err(Error::UnsafePath(relative.display().to_string())),
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(parts.join("/"))
}

/// Pack every file below `source` into the archive at `destination`.
///
/// Files are added sorted by path. The archive is written to a temporary file next to
/// `destination` and only moved into place once it is complete, a failed pack leaves
/// `destination` as it was.
#[instrument(skip(options), err)]
pub fn pack_directory(
    source: &Path,
    destination: &Path,
    options: PakWriterOptions,
    overwrite: bool,
) -> Result<Vec<PakEntry>> {
    let files = WalkDir::new(source)
        .sort_by_file_name()
        .into_iter()
        .filter(|e| e.as_ref().map_or(true, |e| e.file_type().is_file()))
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(io::Error::from)?;

    let parent = match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut writer = PakWriter::new(NamedTempFile::new_in(parent)?, options);

    for file in files {
        let name = entry_name(source, file.path())?;
        info!("adding {}", name);

        writer.start_file(&name)?;
        let mut input = File::open(file.path())?;
        io::copy(&mut input, &mut writer)?;
    }

    let entries = writer.layout()?;
    let temp = writer.finish()?;

    if overwrite {
        temp.persist(destination).map_err(|e| e.error)?;
    } else {
        temp.persist_noclobber(destination).map_err(|e| e.error)?;
    }
    info!("wrote {} entries to {}", entries.len(), destination.display());

    Ok(entries)
}

/// Extract the archive at `archive` into the directory `destination`.
#[instrument(err)]
pub fn unpack_archive(
    archive: &Path,
    destination: &Path,
    options: ExtractOptions,
) -> Result<Vec<PathBuf>> {
    let mut pak = PakArchive::new(BufReader::new(File::open(archive)?))?;
    pak.extract(destination, options)
}

impl<R: Read + Seek> PakArchive<R> {
    /// Extract every entry into `directory`, creating subdirectories as needed.
    ///
    /// Entries are written exactly as stored, unless `restore_frames` is set, in which case
    /// sprites with relocated frame tables are turned back into plain sprites.
    #[instrument(skip(self), err)]
    pub fn extract(&mut self, directory: &Path, options: ExtractOptions) -> Result<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(self.len());

        for index in 0..self.len() {
            let entry = self.entries()[index].clone();
            let path = directory.join(entry_path(&entry.name)?);

            let mut data = self.read_entry(index)?;
            if options.restore_frames && restore_frames(&mut data, entry.offset)? {
                debug!(name = %entry.name, "restored sprite frames");
            }

            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }

            info!("writing {}", path.display());
            let mut out = if options.overwrite {
                File::create(&path)?
            } else {
                File::create_new(&path)?
            };
            out.write_all(&data)?;

            written.push(path);
        }

        Ok(written)
    }
}
