//! # Addon Store CLI
//!
//! This is the binary entry point for the `addon-store` command-line tool.
//!
//! Its primary responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Executing the appropriate command based on the parsed arguments.
//! - Handling top-level application errors and translating them into user-friendly
//!   output.
//!
//! The store itself lives in the `addon_store` library crate; the binary is a
//! thin wrapper that opens it, rescans, and runs one command.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
