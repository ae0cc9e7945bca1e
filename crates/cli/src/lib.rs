//! zig-bsdiff command line interface.
//!
//! Installs the prebuilt `bsdiff`/`bspatch` binaries for the current
//! platform, exposes their paths, and vendors the toolchain needed for a
//! development build.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod tracing;

pub use error::{CliError, EXIT_FAILURE, EXIT_OK, exit_code_for, render_error};
