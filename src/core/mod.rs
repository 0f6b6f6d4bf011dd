//! Maintenance operations - framework-agnostic backup, update and restore logic.
//!
//! Each operation takes any `SeaORM` connection, introspects the live schema it
//! needs, and returns a typed report or an `Error`. Deciding what to do with an
//! error is left to the dispatcher in `commands`.

/// Backup table creation
pub mod backup;
/// Clearing and restoring the flag column
pub mod flag;
/// Live schema introspection and identifier quoting
pub mod schema;

pub use backup::{BackupReport, backup_table};
pub use flag::{RestoreOutcome, RowKey, UpdateReport, disable_flag, restore_flag};
