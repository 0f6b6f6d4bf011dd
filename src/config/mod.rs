/// Database connection management
pub mod database;

/// Target table settings loaded from `maintenance.toml` and the environment
pub mod settings;

pub use settings::{BackupFailurePolicy, MaintenanceTarget, Settings};
