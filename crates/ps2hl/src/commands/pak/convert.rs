use clap::Args;
use miette::miette;
use miette::{Context, IntoDiagnostic, Result};
use ps2_pak::fs::{unpack_archive, ExtractOptions};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Args)]
pub struct ConvertArgs {
    /// A directory to pack or a PAK file to extract
    #[arg(value_name = "PATH")]
    path: PathBuf,

    /// Compress the whole archive when packing
    #[arg(long, default_value_t = false)]
    compressed: bool,
}

impl ConvertArgs {
    pub fn handle(&self) -> Result<()> {
        let metadata = std::fs::metadata(&self.path)
            .into_diagnostic()
            .context(format!("path: {}", &self.path.display()))?;

        if metadata.is_dir() {
            let file = archive_path(&self.path)?;
            super::pack::pack(&self.path, &file, self.compressed, false, false)
        } else {
            let directory = directory_path(&self.path)?;
            info!("extracting into {}", directory.display());
            let options = ExtractOptions::builder()
                .restore_frames(super::pack::is_global_pak(&self.path))
                .build();
            unpack_archive(&self.path, &directory, options)
                .context(format!("extracting {}", &self.path.display()))?;
            Ok(())
        }
    }
}

/// `models/` is packed into `models.pak`
fn archive_path(directory: &Path) -> Result<PathBuf> {
    let name = directory
        .file_name()
        .ok_or(miette!("unable to name an archive after {}", directory.display()))?;

    let mut name = name.to_os_string();
    name.push(".pak");
    Ok(directory.with_file_name(name))
}

/// `models.pak` is extracted into `models/`
fn directory_path(file: &Path) -> Result<PathBuf> {
    let stem = file
        .file_stem()
        .ok_or(miette!("unable to name a directory after {}", file.display()))?;

    Ok(file.with_file_name(stem))
}

#[cfg(test)]
mod test {
    use std::path::{Path, PathBuf};

    use super::{archive_path, directory_path};

    #[test]
    fn names_follow_the_input() {
        assert_eq!(
            archive_path(Path::new("data/models")).unwrap(),
            PathBuf::from("data/models.pak")
        );
        assert_eq!(
            directory_path(Path::new("data/GLOBAL.PAK")).unwrap(),
            PathBuf::from("data/GLOBAL")
        );
    }
}
