//! Command dispatcher.
//!
//! Maps `on` to backup + update and `off` to restore. Every step's outcome is
//! written to `out` as a status line. Step errors are reported and swallowed;
//! the only thing that changes control flow is `BackupFailurePolicy::Abort`.

use crate::{
    config::{BackupFailurePolicy, MaintenanceTarget},
    core::{RestoreOutcome, backup_table, disable_flag, restore_flag},
    errors::{Error, Result},
};
use sea_orm::DatabaseConnection;
use std::{fmt, io::Write, str::FromStr};
use tracing::{error, info, instrument, warn};

/// A maintenance command given on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Back up the table and clear the flag column
    On,
    /// Restore the flag column from the backup and drop it
    Off,
}

impl FromStr for Command {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let command = s.to_lowercase();
        match command.as_str() {
            "on" => Ok(Self::On),
            "off" => Ok(Self::Off),
            _ => Err(Error::InvalidCommand { command }),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::On => write!(f, "on"),
            Self::Off => write!(f, "off"),
        }
    }
}

/// One step of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Snapshot into the backup table
    Backup,
    /// Clear the flag column
    Update,
    /// Restore from the backup table
    Restore,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Backup => write!(f, "backup"),
            Self::Update => write!(f, "update"),
            Self::Restore => write!(f, "restore"),
        }
    }
}

/// Steps that failed (or were skipped) while running a command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    /// Steps whose error was reported and swallowed
    pub failed_steps: Vec<Step>,
    /// Steps not attempted because of `BackupFailurePolicy::Abort`
    pub skipped_steps: Vec<Step>,
}

impl DispatchSummary {
    /// True if every step ran and succeeded.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed_steps.is_empty() && self.skipped_steps.is_empty()
    }

    fn record_failure<W: Write>(&mut self, out: &mut W, step: Step, err: &Error) -> Result<()> {
        error!(%step, "Error during {}: {}", step, err);
        writeln!(out, "Error during {step}: {err}")?;
        self.failed_steps.push(step);
        Ok(())
    }
}

/// Runs `command` against `target`, writing status lines to `out`.
///
/// # Errors
/// Only `Error::Io` from writing to `out`. Database errors are reported in the
/// output and listed in the returned summary.
#[instrument(skip(db, out), fields(table = %target.table))]
pub async fn dispatch<W: Write>(
    db: &DatabaseConnection,
    target: &MaintenanceTarget,
    policy: BackupFailurePolicy,
    command: Command,
    out: &mut W,
) -> Result<DispatchSummary> {
    info!("Running maintenance command '{}'", command);
    let mut summary = DispatchSummary::default();

    match command {
        Command::On => {
            let backup_ok = match backup_table(db, target).await {
                Ok(report) => {
                    writeln!(out, "Backup created: {}", report.backup_table)?;
                    true
                }
                Err(e) => {
                    summary.record_failure(out, Step::Backup, &e)?;
                    false
                }
            };

            if !backup_ok && policy == BackupFailurePolicy::Abort {
                warn!("Skipping update after failed backup");
                writeln!(
                    out,
                    "Skipping update: backup failed and on_backup_failure = abort"
                )?;
                summary.skipped_steps.push(Step::Update);
                return Ok(summary);
            }

            match disable_flag(db, target).await {
                Ok(report) => writeln!(
                    out,
                    "Updated column '{}' from true to false.",
                    report.column
                )?,
                Err(e) => summary.record_failure(out, Step::Update, &e)?,
            }
        }
        Command::Off => match restore_flag(db, target).await {
            Ok(RestoreOutcome::NoBackup { backup_table }) => {
                writeln!(out, "No backup table found: {backup_table}")?;
            }
            Ok(RestoreOutcome::Restored { backup_table, .. }) => {
                writeln!(out, "Restored column '{}' values from backup.", target.column)?;
                writeln!(out, "Backup table '{backup_table}' removed.")?;
            }
            Err(e @ Error::DropBackup { .. }) => {
                writeln!(out, "Restored column '{}' values from backup.", target.column)?;
                summary.record_failure(out, Step::Restore, &e)?;
            }
            Err(e) => summary.record_failure(out, Step::Restore, &e)?,
        },
    }

    Ok(summary)
}
