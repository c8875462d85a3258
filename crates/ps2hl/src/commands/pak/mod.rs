pub mod convert;
pub mod extract;
pub mod list;
pub mod pack;

#[derive(clap::Subcommand)]
pub enum PakCommands {
    /// Pack a directory, or extract a PAK file next to itself
    Convert(convert::ConvertArgs),
    /// Extract a PAK file into a directory
    Extract(extract::ExtractArgs),
    /// List the entries of a PAK file
    List(list::ListArgs),
    /// Pack a directory into a PAK file
    Pack(pack::PackArgs),
}

impl PakCommands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            PakCommands::Convert(convert) => convert.handle(),
            PakCommands::Extract(extract) => extract.handle(),
            PakCommands::List(list) => list.handle(),
            PakCommands::Pack(pack) => pack.handle(),
        }
    }
}
