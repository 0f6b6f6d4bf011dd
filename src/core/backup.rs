//! Backup operation - snapshots the target table into `<table>_bak`.
//!
//! The copy is made with `CREATE TABLE ... AS SELECT *`, so it carries rows and
//! columns but not necessarily indexes, constraints or foreign keys.

use crate::{
    config::MaintenanceTarget,
    core::schema::{quote_ident, table_exists},
    errors::{Error, Result},
};
use sea_orm::{
    ConnectionTrait,
    sea_query::{Alias, Table},
};
use tracing::{debug, instrument};

/// Result of a successful backup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupReport {
    /// Name of the freshly created backup table
    pub backup_table: String,
}

/// Replaces `<table>_bak` with a full copy of the target table.
///
/// An existing backup table is dropped without confirmation. The target is
/// checked first so a typo in the table name never costs an existing backup.
///
/// # Errors
/// `Error::TableNotFound` if the target table does not exist, or
/// `Error::Database` if dropping or creating the backup fails.
#[instrument(skip(db), fields(table = %target.table))]
pub async fn backup_table<C>(db: &C, target: &MaintenanceTarget) -> Result<BackupReport>
where
    C: ConnectionTrait,
{
    let backend = db.get_database_backend();
    let backup_name = target.backup_table();

    if !table_exists(db, &target.table).await? {
        return Err(Error::TableNotFound {
            table: target.table.clone(),
        });
    }

    let drop_stmt = Table::drop()
        .table(Alias::new(backup_name.as_str()))
        .if_exists()
        .to_owned();
    db.execute(backend.build(&drop_stmt)).await?;
    debug!("Dropped previous backup table '{}' if present", backup_name);

    let create_sql = format!(
        "CREATE TABLE {} AS SELECT * FROM {}",
        quote_ident(backend, &backup_name),
        quote_ident(backend, &target.table)
    );
    db.execute_unprepared(&create_sql).await?;

    debug!("Backup created: {}", backup_name);
    Ok(BackupReport {
        backup_table: backup_name,
    })
}
