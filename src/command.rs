use std::fmt;

use clap::Subcommand;

pub mod index_jump;

pub use index_jump::{IndexJump, IndexJumpCMD};

///////////////////////////////
/// Possible subcommands to parse
#[derive(Subcommand)]
pub enum Commands {
    /// Estimate the index jump rate and the expected false reads in each sample
    IndexJump(IndexJumpCMD),
}

impl fmt::Debug for Commands {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cmd = match self {
            Commands::IndexJump(_) => "IndexJump",
        };
        write!(f, "{}", cmd)
    }
}

impl Commands {
    pub fn try_execute(&mut self) -> anyhow::Result<()> {
        match self {
            Commands::IndexJump(cmd) => cmd.try_execute(),
        }
    }
}
