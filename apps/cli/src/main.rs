//! kmportal CLI: submit, review, and explore organizational knowledge.
//!
//! Each invocation loads the contribution snapshot, applies one
//! operation, and writes the snapshot back.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli)
}
