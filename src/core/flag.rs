//! Flag column operations.
//!
//! `disable_flag` clears every true value in one bulk statement. `restore_flag`
//! walks the true rows recorded in the backup table, sets each one back by
//! primary key, and then drops the backup.

use crate::{
    config::MaintenanceTarget,
    core::schema::{require_columns, table_exists},
    errors::{Error, Result},
};
use sea_orm::{
    ConnectionTrait, DatabaseConnection, QueryResult, TransactionTrait, Value,
    prelude::Uuid,
    sea_query::{Alias, Expr, Query, Table},
};
use tracing::{debug, instrument};

/// Result of clearing the flag column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateReport {
    /// Table that was updated
    pub table: String,
    /// Flag column that was cleared
    pub column: String,
    /// Number of rows switched from true to false
    pub rows_affected: u64,
}

/// Result of a restore attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// There was no backup table, nothing was changed
    NoBackup {
        /// Backup table that was looked for
        backup_table: String,
    },
    /// Flags were restored and the backup table dropped
    Restored {
        /// Backup table that was consumed
        backup_table: String,
        /// Number of rows whose flag was set back to true
        rows_restored: usize,
    },
}

/// Primary key value of a backup row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowKey {
    /// Signed integer key of any width, widened to `i64`
    Int(i64),
    /// Unsigned integer key (MySQL `INT UNSIGNED`, `BIGINT UNSIGNED`)
    Unsigned(u64),
    /// Native UUID key (Postgres `uuid`)
    Uuid(Uuid),
    /// Text key (slugs, codes)
    Text(String),
}

impl RowKey {
    /// Decodes `key_column` of `row`, trying each key type the supported
    /// backends produce. Drivers type-check strictly, so a Postgres `INT4`
    /// column only decodes as `i32`.
    pub fn from_row(row: &QueryResult, key_column: &str) -> Result<Self> {
        let first_err = match row.try_get::<i64>("", key_column) {
            Ok(id) => return Ok(Self::Int(id)),
            Err(e) => e,
        };
        if let Ok(id) = row.try_get::<i32>("", key_column) {
            return Ok(Self::Int(i64::from(id)));
        }
        if let Ok(id) = row.try_get::<i16>("", key_column) {
            return Ok(Self::Int(i64::from(id)));
        }
        if let Ok(id) = row.try_get::<u64>("", key_column) {
            return Ok(Self::Unsigned(id));
        }
        if let Ok(id) = row.try_get::<u32>("", key_column) {
            return Ok(Self::Unsigned(u64::from(id)));
        }
        if let Ok(id) = row.try_get::<Uuid>("", key_column) {
            return Ok(Self::Uuid(id));
        }
        row.try_get::<String>("", key_column)
            .map(Self::Text)
            .map_err(|_| Error::Database(first_err))
    }
}

impl From<RowKey> for Value {
    fn from(key: RowKey) -> Self {
        match key {
            RowKey::Int(id) => id.into(),
            RowKey::Unsigned(id) => id.into(),
            RowKey::Uuid(id) => id.into(),
            RowKey::Text(id) => id.into(),
        }
    }
}

/// Sets the flag column to false on every row where it is currently true.
///
/// The target schema is introspected first so a renamed column surfaces as
/// `Error::ColumnNotFound` rather than a driver error. The update is a single
/// auto-committed statement.
#[instrument(skip(db), fields(table = %target.table, column = %target.column))]
pub async fn disable_flag<C>(db: &C, target: &MaintenanceTarget) -> Result<UpdateReport>
where
    C: ConnectionTrait,
{
    let backend = db.get_database_backend();
    require_columns(db, &target.table, &[target.column.as_str()]).await?;

    let stmt = Query::update()
        .table(Alias::new(target.table.as_str()))
        .value(Alias::new(target.column.as_str()), false)
        .and_where(Expr::col(Alias::new(target.column.as_str())).eq(true))
        .to_owned();
    let result = db.execute(backend.build(&stmt)).await?;

    debug!(
        rows = result.rows_affected(),
        "Updated column '{}' from true to false", target.column
    );
    Ok(UpdateReport {
        table: target.table.clone(),
        column: target.column.clone(),
        rows_affected: result.rows_affected(),
    })
}

/// Restores true flag values from `<table>_bak` and drops the backup.
///
/// Rows are matched on the key column and updated one statement at a time
/// inside a single transaction. The backup table is dropped after that
/// transaction commits; if the drop fails the restored rows stay restored and
/// `Error::DropBackup` is returned.
#[instrument(skip(db), fields(table = %target.table, column = %target.column))]
pub async fn restore_flag(
    db: &DatabaseConnection,
    target: &MaintenanceTarget,
) -> Result<RestoreOutcome> {
    let backend = db.get_database_backend();
    let backup_name = target.backup_table();

    if !table_exists(db, &backup_name).await? {
        debug!("No backup table found: {}", backup_name);
        return Ok(RestoreOutcome::NoBackup {
            backup_table: backup_name,
        });
    }

    let required = [target.key_column.as_str(), target.column.as_str()];
    require_columns(db, &target.table, &required).await?;
    require_columns(db, &backup_name, &required).await?;

    let select = Query::select()
        .column(Alias::new(target.key_column.as_str()))
        .from(Alias::new(backup_name.as_str()))
        .and_where(Expr::col(Alias::new(target.column.as_str())).eq(true))
        .to_owned();
    let keys = db
        .query_all(backend.build(&select))
        .await?
        .iter()
        .map(|row| RowKey::from_row(row, &target.key_column))
        .collect::<Result<Vec<_>>>()?;
    debug!("Found {} rows to restore in '{}'", keys.len(), backup_name);

    let txn = db.begin().await?;
    for key in &keys {
        let stmt = Query::update()
            .table(Alias::new(target.table.as_str()))
            .value(Alias::new(target.column.as_str()), true)
            .and_where(Expr::col(Alias::new(target.key_column.as_str())).eq(Value::from(key.clone())))
            .to_owned();
        txn.execute(backend.build(&stmt)).await?;
    }
    txn.commit().await?;
    debug!(rows = keys.len(), "Restored column '{}' values from backup", target.column);

    let drop_stmt = Table::drop()
        .table(Alias::new(backup_name.as_str()))
        .to_owned();
    if let Err(source) = db.execute(backend.build(&drop_stmt)).await {
        debug!("Restored rows but could not drop '{}': {}", backup_name, source);
        return Err(Error::DropBackup {
            table: backup_name,
            source,
        });
    }
    debug!("Backup table '{}' removed", backup_name);

    Ok(RestoreOutcome::Restored {
        backup_table: backup_name,
        rows_restored: keys.len(),
    })
}
