//! CLI error type, exit codes and rendering.

use miette::{Diagnostic, Report};
use std::io::{self, Write};
use std::path::PathBuf;
use thiserror::Error;

/// Successful exit code
pub const EXIT_OK: i32 = 0;
/// Exit code for any fatal failure
pub const EXIT_FAILURE: i32 = 1;

/// CLI-specific error types
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    /// Provisioning the release binaries failed
    #[error("Failed to install zig-bsdiff binaries: {source}")]
    #[diagnostic(code(zig_bsdiff::cli::install))]
    Install {
        /// The underlying provisioning error
        #[diagnostic_source]
        source: zig_bsdiff_provision::Error,
        /// Remediation steps
        #[help]
        help: String,
    },

    /// Lookup, staging or platform error
    #[error(transparent)]
    #[diagnostic(transparent)]
    Provision(#[from] zig_bsdiff_provision::Error),

    /// Development setup failed
    #[error(transparent)]
    #[diagnostic(transparent)]
    Vendor(#[from] zig_bsdiff_vendor::Error),

    /// CLI or configuration error
    #[error("CLI/configuration error: {message}")]
    #[diagnostic(code(zig_bsdiff::cli::config))]
    Config {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },

    /// A provisioned binary could not be started
    #[error("Failed to run {}: {source}", path.display())]
    #[diagnostic(
        code(zig_bsdiff::cli::exec),
        help("Reinstall the binaries with `zig-bsdiff install --force`")
    )]
    Exec {
        /// The binary that failed to start
        path: PathBuf,
        /// The underlying spawn error
        #[source]
        source: io::Error,
    },
}

impl CliError {
    /// Wrap an install failure with the standard remediation list.
    #[must_use]
    pub fn install(source: zig_bsdiff_provision::Error, releases_page: &str) -> Self {
        Self::Install {
            source,
            help: format!(
                "You can try:\n\
                 1. Check your internet connection\n\
                 2. Manually download binaries from {releases_page}\n\
                 3. Build from source: zig build -Doptimize=ReleaseFast"
            ),
        }
    }

    /// Create a new configuration error with help text
    #[must_use]
    pub fn config_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: Some(help.into()),
        }
    }
}

/// Exit code for an error. Every failure maps to 1.
#[must_use]
pub const fn exit_code_for(_err: &CliError) -> i32 {
    EXIT_FAILURE
}

/// Render an error with miette's human-friendly report on stderr.
#[allow(clippy::print_stderr)]
pub fn render_error(err: CliError) {
    let report = Report::new(err);
    eprintln!("{report:?}");
    let _ = io::stderr().flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_install_help_lists_remediation() {
        let source =
            zig_bsdiff_provision::Error::download_failed(404, "https://example.com/a.tar.gz");
        let err = CliError::install(source, "https://github.com/blackboardsh/zig-bsdiff/releases");

        let help = err.help().map(|h| h.to_string()).unwrap_or_default();
        assert!(help.starts_with("You can try:"));
        assert!(help.contains("Check your internet connection"));
        assert!(help.contains("https://github.com/blackboardsh/zig-bsdiff/releases"));
        assert!(help.contains("Build from source"));
        assert!(err.to_string().contains("HTTP 404"));
    }

    #[test]
    fn test_every_error_exits_with_one() {
        let config = CliError::config_with_help("bad", "fix it");
        assert_eq!(exit_code_for(&config), EXIT_FAILURE);
        let err: CliError =
            zig_bsdiff_provision::Error::unsupported_platform("freebsd", "x64").into();
        assert_eq!(exit_code_for(&err), 1);
    }

    #[test]
    fn test_config_with_help() {
        let err = CliError::config_with_help("bad file", "fix it");
        assert_eq!(err.help().map(|h| h.to_string()), Some("fix it".to_string()));
    }
}
