//! Live schema introspection.
//!
//! Tables and columns are looked up in the connected database's catalog each time
//! an operation runs, so nothing about the target schema is compiled in. Every
//! backend `SeaORM` supports gets its own catalog query.

use crate::errors::{Error, Result};
use sea_orm::{ConnectionTrait, DbBackend, Statement};
use tracing::{debug, instrument};

/// Catalog query returning one `name` row if the bound table exists.
const fn table_exists_sql(backend: DbBackend) -> &'static str {
    match backend {
        DbBackend::Sqlite => "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?",
        DbBackend::Postgres => {
            "SELECT table_name::text AS name FROM information_schema.tables \
             WHERE table_schema = current_schema() AND table_name = $1"
        }
        DbBackend::MySql => {
            "SELECT CAST(table_name AS CHAR) AS name FROM information_schema.tables \
             WHERE table_schema = DATABASE() AND table_name = ?"
        }
    }
}

/// Catalog query returning the bound table's columns as `name` rows.
const fn table_columns_sql(backend: DbBackend) -> &'static str {
    match backend {
        DbBackend::Sqlite => "SELECT name FROM pragma_table_info(?) ORDER BY cid",
        DbBackend::Postgres => {
            "SELECT column_name::text AS name FROM information_schema.columns \
             WHERE table_schema = current_schema() AND table_name = $1 \
             ORDER BY ordinal_position"
        }
        DbBackend::MySql => {
            "SELECT CAST(column_name AS CHAR) AS name FROM information_schema.columns \
             WHERE table_schema = DATABASE() AND table_name = ? \
             ORDER BY ordinal_position"
        }
    }
}

/// Returns true if `table` exists in the current database / schema.
#[instrument(skip(db))]
pub async fn table_exists<C>(db: &C, table: &str) -> Result<bool>
where
    C: ConnectionTrait,
{
    let backend = db.get_database_backend();
    let sql = table_exists_sql(backend);

    let row = db
        .query_one(Statement::from_sql_and_values(backend, sql, [table.into()]))
        .await?;
    debug!("Table '{}' exists: {}", table, row.is_some());
    Ok(row.is_some())
}

/// Returns the column names of `table` in declaration order.
///
/// # Errors
/// Returns `Error::TableNotFound` if the catalog has no columns for the table.
#[instrument(skip(db))]
pub async fn table_columns<C>(db: &C, table: &str) -> Result<Vec<String>>
where
    C: ConnectionTrait,
{
    let backend = db.get_database_backend();
    let sql = table_columns_sql(backend);

    let rows = db
        .query_all(Statement::from_sql_and_values(backend, sql, [table.into()]))
        .await?;
    if rows.is_empty() {
        return Err(Error::TableNotFound {
            table: table.to_string(),
        });
    }

    let columns = rows
        .iter()
        .map(|row| row.try_get::<String>("", "name"))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    debug!("Columns of '{}': {:?}", table, columns);
    Ok(columns)
}

/// Introspects `table` and checks that every name in `required` is one of its columns.
///
/// # Errors
/// `Error::TableNotFound` for a missing table, `Error::ColumnNotFound` for the
/// first required column that is absent.
pub async fn require_columns<C>(db: &C, table: &str, required: &[&str]) -> Result<Vec<String>>
where
    C: ConnectionTrait,
{
    let columns = table_columns(db, table).await?;
    if let Some(missing) = required
        .iter()
        .find(|name| !columns.iter().any(|c| c == *name))
    {
        return Err(Error::ColumnNotFound {
            table: table.to_string(),
            column: (*missing).to_string(),
        });
    }
    Ok(columns)
}

/// Quotes an identifier for interpolation into raw SQL on `backend`.
#[must_use]
pub fn quote_ident(backend: DbBackend, name: &str) -> String {
    match backend {
        DbBackend::MySql => format!("`{}`", name.replace('`', "``")),
        DbBackend::Postgres | DbBackend::Sqlite => format!("\"{}\"", name.replace('"', "\"\"")),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::{catalog_rows, init_test_tracing, setup_widgets_db};
    use sea_orm::{MockDatabase, Transaction};

    #[tokio::test]
    async fn test_table_exists() -> Result<()> {
        init_test_tracing();
        let db = setup_widgets_db().await?;

        assert!(table_exists(&db, "widgets").await?);
        assert!(!table_exists(&db, "widgets_bak").await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_table_columns_in_order() -> Result<()> {
        let db = setup_widgets_db().await?;

        let columns = table_columns(&db, "widgets").await?;
        assert_eq!(columns, vec!["id", "name", "enabled"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_table_columns_missing_table() -> Result<()> {
        let db = setup_widgets_db().await?;

        let err = table_columns(&db, "gadgets").await.unwrap_err();
        assert!(matches!(err, Error::TableNotFound { ref table } if table == "gadgets"));
        Ok(())
    }

    #[tokio::test]
    async fn test_require_columns_reports_missing_column() -> Result<()> {
        let db = setup_widgets_db().await?;

        require_columns(&db, "widgets", &["id", "enabled"]).await?;
        let err = require_columns(&db, "widgets", &["id", "active"])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::ColumnNotFound { ref table, ref column } if table == "widgets" && column == "active"
        ));
        Ok(())
    }

    #[test]
    fn test_quote_ident() {
        assert_eq!(quote_ident(DbBackend::Sqlite, "widgets"), "\"widgets\"");
        assert_eq!(quote_ident(DbBackend::Postgres, "we\"ird"), "\"we\"\"ird\"");
        assert_eq!(quote_ident(DbBackend::MySql, "a`b"), "`a``b`");
    }

    #[tokio::test]
    async fn test_catalog_queries_on_postgres_and_mysql() -> Result<()> {
        for backend in [DbBackend::Postgres, DbBackend::MySql] {
            let db = MockDatabase::new(backend)
                .append_query_results([
                    catalog_rows(&["widgets"]),
                    catalog_rows(&[]),
                    catalog_rows(&["id", "enabled"]),
                ])
                .into_connection();

            assert!(table_exists(&db, "widgets").await?);
            assert!(!table_exists(&db, "widgets_bak").await?);
            assert_eq!(table_columns(&db, "widgets").await?, vec!["id", "enabled"]);

            assert_eq!(
                db.into_transaction_log(),
                vec![
                    Transaction::from_sql_and_values(
                        backend,
                        table_exists_sql(backend),
                        ["widgets".into()]
                    ),
                    Transaction::from_sql_and_values(
                        backend,
                        table_exists_sql(backend),
                        ["widgets_bak".into()]
                    ),
                    Transaction::from_sql_and_values(
                        backend,
                        table_columns_sql(backend),
                        ["widgets".into()]
                    ),
                ]
            );
        }
        Ok(())
    }

    #[test]
    fn test_catalog_queries_use_backend_placeholders() {
        for sql in [
            table_exists_sql(DbBackend::Postgres),
            table_columns_sql(DbBackend::Postgres),
        ] {
            assert!(sql.contains("current_schema()") && sql.contains("$1"));
            assert!(!sql.contains('?'));
        }
        for sql in [
            table_exists_sql(DbBackend::MySql),
            table_columns_sql(DbBackend::MySql),
        ] {
            assert!(sql.contains("DATABASE()") && sql.contains('?'));
            assert!(!sql.contains("$1"));
        }
    }

    #[tokio::test]
    async fn test_missing_table_on_postgres() -> Result<()> {
        let db = MockDatabase::new(DbBackend::Postgres)
            .append_query_results([catalog_rows(&[])])
            .into_connection();

        let err = table_columns(&db, "gadgets").await.unwrap_err();
        assert!(matches!(err, Error::TableNotFound { ref table } if table == "gadgets"));
        Ok(())
    }
}
