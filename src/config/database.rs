//! Database connection management.
//!
//! The connection is opened lazily with a single-slot pool: no socket or file
//! is touched until the first statement runs, so an unreachable database shows
//! up as an error of whichever operation needs it first.

use crate::errors::{Error, Result};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::{debug, instrument};

/// Opens a lazy `SeaORM` connection for `database_url`.
///
/// # Errors
/// Returns `Error::Config` if the connection string is rejected before any
/// connection is attempted (unknown scheme, malformed URL).
#[instrument(skip(database_url))]
pub async fn connect(database_url: &str) -> Result<DatabaseConnection> {
    let mut options = ConnectOptions::new(database_url.to_owned());
    options
        .max_connections(1)
        .min_connections(0)
        .connect_lazy(true)
        .sqlx_logging(false);

    debug!("Opening lazy database connection");
    Database::connect(options).await.map_err(|e| Error::Config {
        message: format!("Invalid database connection string: {e}"),
    })
}
