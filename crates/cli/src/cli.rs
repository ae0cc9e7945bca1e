//! Command line definition.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::tracing::{LogLevel, TracingFormat};

/// Installer and development setup for the zig-bsdiff binaries.
#[derive(Parser, Debug)]
#[command(name = "zig-bsdiff")]
#[command(about = "Install the zig-bsdiff binaries and set up a development checkout")]
#[command(long_about = None)]
#[command(version)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Logging verbosity level.
    #[arg(
        short = 'L',
        long,
        global = true,
        help = "Set logging level",
        default_value = "warn",
        value_enum
    )]
    pub level: LogLevel,

    /// Log output format.
    #[arg(
        long,
        global = true,
        help = "Set log output format",
        default_value = "compact",
        value_enum
    )]
    pub log_format: TracingFormat,

    /// Configuration file with `[provision]` and `[vendor]` sections.
    #[arg(
        long,
        global = true,
        env = "ZIG_BSDIFF_CONFIG",
        help = "Path to zig-bsdiff.toml"
    )]
    pub config: Option<PathBuf>,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download the prebuilt binaries for this platform.
    #[command(about = "Download the prebuilt bsdiff and bspatch binaries")]
    Install {
        /// Directory the binaries are installed into.
        #[arg(long, env = "ZIG_BSDIFF_BIN_DIR")]
        bin_dir: Option<PathBuf>,

        /// Release version to install.
        #[arg(long)]
        version: Option<String>,

        /// Download even if the binaries are already present.
        #[arg(long)]
        force: bool,
    },

    /// Vendor the Zig compiler and libsais for a development build.
    #[command(about = "Sync submodules and vendor Zig and libsais")]
    Setup {
        /// Project root containing `vendors/`.
        #[arg(long)]
        root: Option<PathBuf>,

        /// Do not run `git submodule update`.
        #[arg(long)]
        skip_submodules: bool,

        /// C compiler used to build libsais.
        #[arg(long, env = "CC")]
        cc: Option<String>,
    },

    /// Print the absolute path of an installed binary.
    #[command(about = "Print the path of an installed binary")]
    Path {
        /// `bsdiff` or `bspatch`.
        name: String,

        /// Directory the binaries are installed into.
        #[arg(long, env = "ZIG_BSDIFF_BIN_DIR")]
        bin_dir: Option<PathBuf>,
    },

    /// Run a binary, installing it first if needed.
    #[command(about = "Run bsdiff or bspatch, downloading them on first use")]
    Exec {
        /// `bsdiff` or `bspatch`.
        name: String,

        /// Directory the binaries are installed into.
        #[arg(long, env = "ZIG_BSDIFF_BIN_DIR")]
        bin_dir: Option<PathBuf>,

        /// Arguments passed to the binary.
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Copy locally built binaries into a distribution directory.
    #[command(about = "Stage built binaries for publishing")]
    Package {
        /// Directory containing the built binaries.
        #[arg(long, default_value = "zig-out/bin")]
        build_dir: PathBuf,

        /// Directory the binaries are copied into.
        #[arg(long, default_value = "dist")]
        dist_dir: PathBuf,
    },
}

/// Parse the process arguments.
#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_install_flags() {
        let cli = Cli::try_parse_from([
            "zig-bsdiff",
            "install",
            "--bin-dir",
            "out",
            "--version",
            "1.2.0",
            "--force",
        ])
        .unwrap();

        let Commands::Install {
            bin_dir,
            version,
            force,
        } = cli.command
        else {
            panic!("expected install");
        };
        assert_eq!(bin_dir, Some(PathBuf::from("out")));
        assert_eq!(version.as_deref(), Some("1.2.0"));
        assert!(force);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "zig-bsdiff",
            "path",
            "bsdiff",
            "--level",
            "debug",
            "--log-format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.level, LogLevel::Debug);
        assert_eq!(cli.log_format, TracingFormat::Json);
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["zig-bsdiff", "package"]).unwrap();
        assert_eq!(cli.level, LogLevel::Warn);
        assert_eq!(cli.log_format, TracingFormat::Compact);

        let Commands::Package {
            build_dir,
            dist_dir,
        } = cli.command
        else {
            panic!("expected package");
        };
        assert_eq!(build_dir, PathBuf::from("zig-out/bin"));
        assert_eq!(dist_dir, PathBuf::from("dist"));
    }

    #[test]
    fn test_exec_forwards_hyphenated_args() {
        let cli =
            Cli::try_parse_from(["zig-bsdiff", "exec", "bspatch", "old", "new", "-", "--stats"])
                .unwrap();
        let Commands::Exec { name, args, .. } = cli.command else {
            panic!("expected exec");
        };
        assert_eq!(name, "bspatch");
        assert_eq!(args, vec!["old", "new", "-", "--stats"]);
    }

    #[test]
    fn test_missing_subcommand_is_an_error() {
        assert!(Cli::try_parse_from(["zig-bsdiff"]).is_err());
    }
}
