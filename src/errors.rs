//! Unified error types for the maintenance toggle.
//!
//! Usage and configuration errors abort the process. Everything raised by a
//! database operation is returned to the dispatcher, which reports it and
//! moves on to the next step.

use sea_orm::DbErr;
use thiserror::Error;

/// Usage line printed for a missing or surplus argument.
pub const USAGE: &str = "Usage: maintenance-toggle <on|off>";

/// All errors produced by the crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing, unreadable or malformed configuration
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description of the problem
        message: String,
    },

    /// Wrong number of command-line arguments
    #[error("Usage: maintenance-toggle <on|off>")]
    Usage,

    /// A command other than `on` or `off`
    #[error("Invalid command '{command}'. Please use 'on' or 'off'.")]
    InvalidCommand {
        /// The lower-cased command that was rejected
        command: String,
    },

    /// Help or version output requested from clap
    #[error(transparent)]
    Cli(#[from] clap::Error),

    /// Any error reported by the database layer
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    /// Schema introspection found no such table
    #[error("Table '{table}' does not exist")]
    TableNotFound {
        /// Table that was looked up
        table: String,
    },

    /// Schema introspection found the table but not the column
    #[error("Column '{column}' not found in table '{table}'")]
    ColumnNotFound {
        /// Table that was introspected
        table: String,
        /// Column that is absent
        column: String,
    },

    /// Rows were restored but the backup table could not be dropped
    #[error("Failed to drop backup table '{table}': {source}")]
    DropBackup {
        /// Backup table left behind
        table: String,
        /// Underlying driver error
        #[source]
        source: DbErr,
    },

    /// Writing status output failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
