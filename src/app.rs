//! Process-level flow: arguments, settings, connection, dispatch, exit status.
//!
//! Kept out of `main` so the exit status can be checked without spawning the
//! binary. Settings are only loaded, and a connection only opened, once the
//! command has parsed.

use crate::{
    cli,
    commands::{self, Command},
    config::{self, Settings},
    errors::{Error, Result},
};
use std::{ffi::OsString, io::Write};
use tracing::{error, info, warn};

/// Exit status for a completed `on`/`off`, including swallowed step errors.
pub const EXIT_SUCCESS: u8 = 0;
/// Exit status for usage, command and configuration errors.
pub const EXIT_FAILURE: u8 = 1;

/// Runs the tool end to end and returns the process exit status.
///
/// `lookup` stands in for `std::env::var`; status and error lines go to `out`.
pub async fn run<I, T, F, W>(args: I, lookup: F, out: &mut W) -> u8
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
    F: Fn(&str) -> Option<String>,
    W: Write,
{
    let command = match cli::parse_command(args) {
        Ok(command) => command,
        Err(Error::Cli(e)) => {
            if let Err(print_err) = e.print() {
                error!("Failed to print help: {}", print_err);
            }
            return u8::try_from(e.exit_code()).unwrap_or(EXIT_FAILURE);
        }
        Err(e) => return report_fatal(out, &e),
    };

    let result = match config::settings::load_settings_with(lookup) {
        Ok(settings) => execute(&settings, command, out).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => report_fatal(out, &e),
    }
}

async fn execute<W: Write>(settings: &Settings, command: Command, out: &mut W) -> Result<()> {
    info!(
        table = %settings.target.table,
        column = %settings.target.column,
        "Loaded maintenance settings"
    );

    let db = config::database::connect(&settings.database_url).await?;
    let summary = commands::dispatch(
        &db,
        &settings.target,
        settings.on_backup_failure,
        command,
        out,
    )
    .await?;

    if !summary.is_clean() {
        warn!(
            failed = ?summary.failed_steps,
            skipped = ?summary.skipped_steps,
            "Command '{}' completed with errors", command
        );
    }

    if let Err(e) = db.close().await {
        warn!("Failed to close database connection: {}", e);
    }
    Ok(())
}

fn report_fatal<W: Write>(out: &mut W, err: &Error) -> u8 {
    error!("{}", err);
    if let Err(io_err) = writeln!(out, "{err}") {
        error!("Failed to write error message: {}", io_err);
    }
    EXIT_FAILURE
}
