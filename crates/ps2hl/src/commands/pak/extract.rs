use clap::Args;
use miette::{Context, IntoDiagnostic, Result};
use ps2_pak::{fs::ExtractOptions, PakArchive};
use std::{fs::File, io::BufReader, path::PathBuf};
use tracing::info;

#[derive(Args)]
pub struct ExtractArgs {
    /// An input PAK file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// A target directory
    #[arg(short, long, value_name = "DIR")]
    directory: PathBuf,

    /// Restore sprite frame tables from GLOBAL.PAK, implied by the file name
    #[arg(long, default_value_t = false)]
    restore_frames: bool,

    /// Allow overwriting the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,
}

impl ExtractArgs {
    pub fn handle(&self) -> Result<()> {
        let f = File::open(&self.file)
            .into_diagnostic()
            .context(format!("path: {}", &self.file.display()))?;
        let mut pak = PakArchive::new(BufReader::new(f))
            .context(format!("reading {}", &self.file.display()))?;
        info!("{} contains {} entries", self.file.display(), pak.len());

        let restore_frames = self.restore_frames || super::pack::is_global_pak(&self.file);
        if restore_frames {
            info!("restoring sprite frames");
        }

        let options = ExtractOptions::builder()
            .overwrite(self.overwrite)
            .restore_frames(restore_frames)
            .build();
        pak.extract(&self.directory, options)
            .context(format!("extracting into {}", &self.directory.display()))?;

        Ok(())
    }
}
