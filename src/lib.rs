//! `maintenance-toggle` - maintenance mode for a single boolean column.
//!
//! `on` snapshots the configured table into `<table>_bak` and clears the flag
//! column; `off` sets the previously-true rows back from the snapshot and drops
//! it. Works against any database `SeaORM` connects to.

// Deny the most critical lints that could lead to bugs or security issues
#![deny(
    // Security and correctness
    unsafe_code,
    unsafe_op_in_unsafe_fn,

    // Code quality - things that are almost always bugs
    unreachable_code,
    unreachable_patterns,
    unused_must_use,

    // Documentation - broken links are bugs
    rustdoc::broken_intra_doc_links,
    rustdoc::private_intra_doc_links,
)]
// Warn on things that should be fixed but aren't necessarily bugs
#![warn(
    missing_docs,

    clippy::all,
    clippy::pedantic,
    clippy::nursery,

    // Correctness
    clippy::dbg_macro,
    clippy::exit,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used,

    // Style consistency
    clippy::enum_glob_use,
    clippy::semicolon_if_nothing_returned,

    future_incompatible,
    rust_2018_idioms,
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::result_large_err,
)]

/// Process flow from arguments to exit status
pub mod app;
/// Command-line argument parsing
pub mod cli;
/// Command dispatcher - maps `on`/`off` to maintenance operations
pub mod commands;
/// Configuration management for settings and the database connection
pub mod config;
/// Core maintenance operations - backup, update, restore
pub mod core;
/// Unified error types and result handling
pub mod errors;

#[cfg(test)]
pub mod test_utils;
