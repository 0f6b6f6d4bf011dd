//! Shared test utilities for the maintenance toggle.
//!
//! This module provides helpers for setting up in-memory databases with a
//! seeded `widgets` table and for reading flag values back out.

use crate::{config::MaintenanceTarget, errors::Result};
use sea_orm::{
    ConnectionTrait, DatabaseConnection, DbBackend, DbErr, MockDatabase, MockExecResult,
    Statement, Value,
};
use std::collections::BTreeMap;
use tracing_subscriber::EnvFilter;

/// Installs a test-friendly tracing subscriber once per process.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Creates an empty in-memory `SQLite` database.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    Ok(db)
}

/// Creates an in-memory database with the `widgets` table seeded as
/// `[{1, true}, {2, false}, {3, true}]`.
pub async fn setup_widgets_db() -> Result<DatabaseConnection> {
    let db = setup_test_db().await?;
    db.execute_unprepared(
        "CREATE TABLE widgets (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            enabled BOOLEAN NOT NULL
        )",
    )
    .await?;
    db.execute_unprepared(
        "INSERT INTO widgets (id, name, enabled) VALUES
            (1, 'sprocket', TRUE),
            (2, 'gear', FALSE),
            (3, 'cog', TRUE)",
    )
    .await?;
    Ok(db)
}

/// Target pointing at `widgets.enabled` keyed on `id`.
pub fn widgets_target() -> MaintenanceTarget {
    MaintenanceTarget::new("widgets", "enabled")
}

/// Reads `(id, flag)` pairs from `table`, ordered by id.
pub async fn read_flags(
    db: &DatabaseConnection,
    table: &str,
    column: &str,
) -> Result<Vec<(i64, bool)>> {
    let sql = format!("SELECT id, CAST({column} AS INTEGER) AS flag FROM {table} ORDER BY id");
    let rows = db
        .query_all(Statement::from_string(DbBackend::Sqlite, sql))
        .await?;
    let mut flags = Vec::with_capacity(rows.len());
    for row in rows {
        let id: i64 = row.try_get("", "id")?;
        let flag: i64 = row.try_get("", "flag")?;
        flags.push((id, flag != 0));
    }
    Ok(flags)
}

/// Sets a single row's flag directly, bypassing the maintenance operations.
pub async fn set_flag(
    db: &DatabaseConnection,
    table: &str,
    column: &str,
    id: i64,
    value: bool,
) -> Result<()> {
    db.execute(Statement::from_sql_and_values(
        DbBackend::Sqlite,
        format!("UPDATE {table} SET {column} = ? WHERE id = ?"),
        [value.into(), id.into()],
    ))
    .await?;
    Ok(())
}

/// Catalog result rows with a single `name` column, as returned by the
/// introspection queries.
pub fn catalog_rows(names: &[&str]) -> Vec<BTreeMap<&'static str, Value>> {
    names
        .iter()
        .map(|name| BTreeMap::from([("name", Value::from(*name))]))
        .collect()
}

/// Result rows with a single `id` column holding the given key values.
pub fn key_rows(keys: &[Value]) -> Vec<BTreeMap<&'static str, Value>> {
    keys.iter()
        .map(|key| BTreeMap::from([("id", key.clone())]))
        .collect()
}

/// Mock connection scripted for one `restore_flag` call on `widgets.enabled`.
///
/// The backup exists, both tables carry `id` and `enabled`, and the backup
/// holds `keys` as its true rows. Every per-row update succeeds; the final
/// drop succeeds unless `drop_error` is given.
pub fn mock_restore_db(
    backend: DbBackend,
    keys: &[Value],
    drop_error: Option<DbErr>,
) -> DatabaseConnection {
    let columns = ["id", "name", "enabled"];
    let updates = keys.iter().map(|_| MockExecResult {
        last_insert_id: 0,
        rows_affected: 1,
    });

    let mock = MockDatabase::new(backend)
        .append_query_results([
            catalog_rows(&["widgets_bak"]),
            catalog_rows(&columns),
            catalog_rows(&columns),
            key_rows(keys),
        ])
        .append_exec_results(updates);

    let mock = match drop_error {
        Some(err) => mock.append_exec_errors([err]),
        None => mock.append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }]),
    };
    mock.into_connection()
}
