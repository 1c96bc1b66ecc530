// Rust 1.92 compiler bug: false positives for thiserror/miette derive macro fields
// https://github.com/rust-lang/rust/issues/147648
#![allow(unused_assignments)]

//! cacheout - replay the output of slow commands
//!
//! `cacheout <command>` runs the command once, shows its output live and
//! records it. Later invocations of the exact same command line replay the
//! recording until it is older than the validity window.
//!
//! The caching itself lives in [`cacheout_cache`]; this crate is the command
//! line surface around it:
//!
//! - [`cli`] - argument parsing, errors and exit codes
//! - [`commands`] - the operations selected by the arguments
//! - [`tracing`] - logging configuration

/// CLI argument parsing and exit codes.
pub mod cli;
/// Operations selected on the command line.
pub mod commands;
/// Tracing and logging configuration.
pub mod tracing;

pub use cli::{Cli, CliError};
pub use commands::Command;
