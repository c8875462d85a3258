pub mod pak;

#[derive(clap::Subcommand)]
pub enum Commands {
    /// Handle PAK files
    Pak {
        #[command(subcommand)]
        command: pak::PakCommands,
    },
}

impl Commands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            Commands::Pak { command } => command.handle(),
        }
    }
}
