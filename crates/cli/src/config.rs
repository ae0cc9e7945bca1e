//! `zig-bsdiff.toml` loading.

use serde::Deserialize;
use std::path::Path;
use tracing::debug;
use zig_bsdiff_provision::ProvisionConfig;
use zig_bsdiff_vendor::VendorConfig;

use crate::error::CliError;

/// Configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "zig-bsdiff.toml";

/// Contents of a configuration file. Every section and key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// `[provision]`
    pub provision: ProvisionConfig,
    /// `[vendor]`
    pub vendor: VendorConfig,
}

impl FileConfig {
    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, `zig-bsdiff.toml` in the
    /// working directory is used when present, otherwise the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Config`] when the file cannot be read or parsed.
    pub fn load(explicit: Option<&Path>) -> Result<Self, CliError> {
        let path = match explicit {
            Some(path) => path,
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => Path::new(DEFAULT_CONFIG_FILE),
            None => {
                debug!("No configuration file, using defaults");
                return Ok(Self::default());
            }
        };

        let source = std::fs::read_to_string(path).map_err(|e| {
            CliError::config_with_help(
                format!("cannot read {}: {e}", path.display()),
                "Pass an existing file with --config or unset ZIG_BSDIFF_CONFIG",
            )
        })?;
        debug!(?path, "Loaded configuration file");
        Self::parse(&source, path)
    }

    /// Parse configuration from TOML text read from `origin`.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Config`] for malformed TOML or unknown keys.
    pub fn parse(source: &str, origin: &Path) -> Result<Self, CliError> {
        toml::from_str(source).map_err(|e| {
            CliError::config_with_help(
                format!("invalid configuration in {}: {e}", origin.display()),
                "Only [provision] and [vendor] sections are recognized",
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_empty_file_is_defaults() {
        let config = FileConfig::parse("", Path::new("zig-bsdiff.toml")).unwrap();
        assert_eq!(config.provision.product, "zig-bsdiff");
        assert_eq!(config.vendor.zig_version, "0.13.0");
    }

    #[test]
    fn test_sections_override_defaults() {
        let source = r#"
            [provision]
            repo = "example/fork"
            version = "1.3.0"
            bin_dir = "tools/bin"
            sha256 = "0000000000000000000000000000000000000000000000000000000000000000"

            [vendor]
            zig_version = "0.14.0"
            c_compiler = "gcc"
            init_submodules = false
        "#;
        let config = FileConfig::parse(source, Path::new("zig-bsdiff.toml")).unwrap();

        assert_eq!(config.provision.repo.to_string(), "example/fork");
        assert_eq!(config.provision.version, "1.3.0");
        assert_eq!(config.provision.bin_dir, PathBuf::from("tools/bin"));
        assert_eq!(config.provision.max_redirects, 5);
        assert!(config.provision.validate().is_ok());
        assert_eq!(config.vendor.zig_version, "0.14.0");
        assert_eq!(config.vendor.c_compiler.as_deref(), Some("gcc"));
        assert!(!config.vendor.init_submodules);
        assert_eq!(config.vendor.libsais_version, "2.8.6");
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let err =
            FileConfig::parse("[provision]\nmirror = true\n", Path::new("cfg.toml")).unwrap_err();
        assert!(err.to_string().contains("cfg.toml"));
    }

    #[test]
    fn test_bad_repo_is_rejected() {
        let parsed = FileConfig::parse("[provision]\nrepo = \"noslash\"\n", Path::new("cfg.toml"));
        assert!(parsed.is_err());
    }

    #[test]
    fn test_explicit_missing_file_fails() {
        let temp = tempfile::TempDir::new().unwrap();
        let err = FileConfig::load(Some(&temp.path().join("absent.toml"))).unwrap_err();
        assert!(matches!(err, CliError::Config { .. }));
    }
}
