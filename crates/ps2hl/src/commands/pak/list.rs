use clap::Args;
use miette::{Context, IntoDiagnostic, Result};
use owo_colors::OwoColorize;
use ps2_pak::{PakArchive, PakKind};
use std::{fs::File, io::BufReader, path::PathBuf};

#[derive(Args)]
pub struct ListArgs {
    /// An input PAK file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,
}

impl ListArgs {
    pub fn handle(&self) -> Result<()> {
        let f = File::open(&self.file)
            .into_diagnostic()
            .context(format!("path: {}", &self.file.display()))?;
        let pak = PakArchive::new(BufReader::new(f))
            .context(format!("reading {}", &self.file.display()))?;

        println!("{} ({})", self.file.display().bold(), summary(&pak).dimmed());

        for entry in pak.entries() {
            println!(
                "{:#010X} {:>10} {}",
                entry.offset.cyan(),
                entry.size.yellow(),
                entry.name
            );
        }

        Ok(())
    }
}

/// Encoding and sizes of an archive, for the listing header
fn summary<R>(pak: &PakArchive<R>) -> String {
    match pak.kind() {
        PakKind::Compressed => format!(
            "compressed, {} bytes on disk, {} bytes inflated, {} bytes of files",
            pak.stored_size(),
            pak.container_size(),
            pak.decompressed_size()
        ),
        _ => format!(
            "normal, {} bytes on disk, {} bytes of files",
            pak.stored_size(),
            pak.decompressed_size()
        ),
    }
}
