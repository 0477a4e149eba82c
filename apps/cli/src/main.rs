//! nbpress CLI — notebook publication tool.
//!
//! Prepares documentation notebooks for the hosted Colab runtime: filters
//! volatile state, rewrites environment-specific code lines, and injects the
//! standard setup and closing cell sequences.

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
