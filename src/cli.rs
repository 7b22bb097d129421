use clap::{Parser, Subcommand};

#[derive(Debug, Parser, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct CLI {
    /// Print the installation prefix and exit
    #[clap(long)]
    pub(crate) prefix: bool,

    #[command(subcommand)]
    pub(crate) command: Option<KegCommand>,
}

#[derive(Debug, Subcommand, Clone, PartialEq)]
pub enum KegCommand {
    /// Download, verify and extract a package into the cellar
    Install {
        name: String,
    },
    /// Delete an installed package from the cellar
    Remove {
        name: String,
    },
    /// List installed packages
    List,
    /// Show registry metadata for a package
    Info {
        name: String,
    },
    /// Search registry package names
    Search {
        term: String,
    },
    /// Fetch the remote registry and replace the local copy
    Update,
}
