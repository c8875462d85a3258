use clap::Args;
use miette::miette;
use miette::{Context, Result};
use ps2_pak::{fs::pack_directory, PakKind, PakWriterOptions};
use std::path::{Path, PathBuf};
use tracing::info;
use walkdir::WalkDir;

/// Name of the archive whose sprites need relocated frame tables
const GLOBAL_PAK: &str = "GLOBAL.PAK";

#[derive(Args)]
pub struct PackArgs {
    /// An input directory
    #[arg(short, long, value_name = "DIR")]
    directory: PathBuf,

    /// A target PAK file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// Compress the whole archive
    #[arg(long, default_value_t = false)]
    compressed: bool,

    /// Rewrite sprite frame tables for GLOBAL.PAK, implied by the file name
    #[arg(long, default_value_t = false)]
    relocate_frames: bool,

    /// Allow overwriting the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,
}

impl PackArgs {
    pub fn handle(&self) -> Result<()> {
        pack(
            &self.directory,
            &self.file,
            self.compressed,
            self.relocate_frames,
            self.overwrite,
        )
    }
}

pub(crate) fn is_global_pak(file: &Path) -> bool {
    file.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.eq_ignore_ascii_case(GLOBAL_PAK))
}

pub(crate) fn pack(
    directory: &Path,
    file: &Path,
    compressed: bool,
    relocate_frames: bool,
    overwrite: bool,
) -> Result<()> {
    info!("creating {}", file.display());

    let has_files = WalkDir::new(directory)
        .into_iter()
        .filter_map(|e| e.ok())
        .any(|e| e.file_type().is_file());
    if !has_files {
        return Err(miette!("directory is empty"));
    }

    let relocate_frames = relocate_frames || is_global_pak(file);
    if relocate_frames {
        info!("relocating sprite frames");
    }

    let options = PakWriterOptions::builder()
        .kind(if compressed {
            PakKind::Compressed
        } else {
            PakKind::Normal
        })
        .relocate_frames(relocate_frames)
        .build();

    let entries = pack_directory(directory, file, options, overwrite)
        .context(format!("packing {}", directory.display()))?;
    info!("packed {} entries", entries.len());

    Ok(())
}

#[cfg(test)]
mod test {
    use std::path::Path;

    use super::is_global_pak;

    #[test]
    fn global_pak_by_name() {
        assert!(is_global_pak(Path::new("GLOBAL.PAK")));
        assert!(is_global_pak(Path::new("out/global.pak")));
        assert!(!is_global_pak(Path::new("GLOBAL.PAK.bak")));
        assert!(!is_global_pak(Path::new("sound.pak")));
    }
}
