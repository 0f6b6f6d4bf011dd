//! Settings loading for the maintenance toggle.
//!
//! Values come from an optional TOML file (`maintenance.toml` by default, or the
//! path in `MAINTENANCE_CONFIG`) and are overridden field by field by environment
//! variables. A `.env` file is loaded by `main` before this runs.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default config file, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "maintenance.toml";

/// Primary key column used when none is configured.
pub const DEFAULT_KEY_COLUMN: &str = "id";

const CONFIG_PATH_VAR: &str = "MAINTENANCE_CONFIG";
const DATABASE_URL_VAR: &str = "DATABASE_URL";
const TABLE_VAR: &str = "MAINTENANCE_TABLE";
const COLUMN_VAR: &str = "MAINTENANCE_COLUMN";
const KEY_COLUMN_VAR: &str = "MAINTENANCE_KEY_COLUMN";
const ON_BACKUP_FAILURE_VAR: &str = "MAINTENANCE_ON_BACKUP_FAILURE";

/// What `on` does with the update step when the backup step failed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackupFailurePolicy {
    /// Run the update anyway. Matches the behaviour operators rely on.
    #[default]
    Continue,
    /// Skip the update so no flags are cleared without a snapshot.
    Abort,
}

impl std::str::FromStr for BackupFailurePolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "continue" => Ok(Self::Continue),
            "abort" => Ok(Self::Abort),
            other => Err(Error::Config {
                message: format!(
                    "Invalid on_backup_failure value '{other}', expected 'continue' or 'abort'"
                ),
            }),
        }
    }
}

/// The table and columns maintenance mode operates on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaintenanceTarget {
    /// Table holding the flag column
    pub table: String,
    /// Boolean column cleared by `on` and restored by `off`
    pub column: String,
    /// Primary key used to match backup rows to target rows
    pub key_column: String,
}

impl MaintenanceTarget {
    /// Creates a target using the default `id` key column.
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
            key_column: DEFAULT_KEY_COLUMN.to_string(),
        }
    }

    /// Name of the backup table, `<table>_bak`.
    #[must_use]
    pub fn backup_table(&self) -> String {
        format!("{}_bak", self.table)
    }
}

/// Fully resolved runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Connection string understood by `SeaORM` (e.g. `sqlite://data/app.sqlite`)
    pub database_url: String,
    /// Table and columns to toggle
    pub target: MaintenanceTarget,
    /// Behaviour of `on` after a failed backup
    pub on_backup_failure: BackupFailurePolicy,
}

/// Raw shape of `maintenance.toml`. Every field is optional so the
/// environment can supply whatever the file leaves out.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    database_url: Option<String>,
    table: Option<String>,
    column: Option<String>,
    key_column: Option<String>,
    on_backup_failure: Option<BackupFailurePolicy>,
}

/// Loads settings from the configured TOML file, with `lookup` standing in
/// for `std::env::var` (`main` passes the real environment).
pub fn load_settings_with<F>(lookup: F) -> Result<Settings>
where
    F: Fn(&str) -> Option<String>,
{
    let (path, explicit) = lookup(CONFIG_PATH_VAR).map_or_else(
        || (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        |p| (PathBuf::from(p), true),
    );

    let file = if explicit || path.exists() {
        read_file_settings(&path)?
    } else {
        tracing::debug!("No config file at {:?}, using environment only", path);
        FileSettings::default()
    };

    resolve(file, &lookup)
}

fn read_file_settings(path: &Path) -> Result<FileSettings> {
    tracing::debug!("Attempting to load configuration from: {:?}", path);
    let contents = std::fs::read_to_string(path).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path.display()),
    })?;
    parse_file_settings(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse {}: {e}", path.display()),
    })
}

fn parse_file_settings(contents: &str) -> std::result::Result<FileSettings, toml::de::Error> {
    toml::from_str(contents)
}

fn resolve<F>(file: FileSettings, lookup: &F) -> Result<Settings>
where
    F: Fn(&str) -> Option<String>,
{
    let database_url = required(lookup(DATABASE_URL_VAR).or(file.database_url), "database_url")?;
    let table = required(lookup(TABLE_VAR).or(file.table), "table")?;
    let column = required(lookup(COLUMN_VAR).or(file.column), "column")?;
    let key_column = required(
        Some(
            lookup(KEY_COLUMN_VAR)
                .or(file.key_column)
                .unwrap_or_else(|| DEFAULT_KEY_COLUMN.to_string()),
        ),
        "key_column",
    )?;

    let on_backup_failure = match lookup(ON_BACKUP_FAILURE_VAR) {
        Some(raw) => raw.parse()?,
        None => file.on_backup_failure.unwrap_or_default(),
    };

    Ok(Settings {
        database_url,
        target: MaintenanceTarget {
            table,
            column,
            key_column,
        },
        on_backup_failure,
    })
}

fn required(value: Option<String>, name: &str) -> Result<String> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        Some(_) => Err(Error::Config {
            message: format!("'{name}' must not be empty"),
        }),
        None => Err(Error::Config {
            message: format!("'{name}' is not set in the config file or environment"),
        }),
    }
}
