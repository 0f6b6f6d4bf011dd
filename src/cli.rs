//! Command-line argument parsing.

use crate::{
    commands::Command,
    errors::{Error, Result},
};
use clap::{Parser, error::ErrorKind};
use std::ffi::OsString;

/// Toggle maintenance mode for a table's boolean column.
#[derive(Debug, Parser)]
#[command(name = "maintenance-toggle", version, long_about = None)]
pub struct Cli {
    /// `on` to back up and clear the flag column, `off` to restore it
    pub command: String,
}

/// Parses the process arguments into a `Command`.
///
/// # Errors
/// `Error::Cli` when clap wants to print help or version, `Error::Usage` for a
/// missing or extra argument, `Error::InvalidCommand` for anything other than
/// `on` or `off`.
pub fn parse_command<I, T>(args: I) -> Result<Command>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::try_parse_from(args).map_err(|e| match e.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => Error::Cli(e),
        _ => Error::Usage,
    })?;
    cli.command.parse()
}
