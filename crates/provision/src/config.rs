//! Provisioning configuration.
//!
//! Every value that used to be a literal in the install flow (release
//! coordinates, version, base URL, redirect cap) lives here and is passed
//! into the components explicitly.

use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::{Error, Result};

/// Redirect hops followed before a download fails.
pub const DEFAULT_MAX_REDIRECTS: usize = 5;

/// Version of this package; selects the release tag to download.
pub const PACKAGE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// GitHub `owner/name` coordinates of the release repository.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct RepoCoordinates {
    /// Repository owner or organization.
    pub owner: String,
    /// Repository name.
    pub name: String,
}

impl RepoCoordinates {
    /// Create coordinates from owner and name.
    #[must_use]
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl FromStr for RepoCoordinates {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.split_once('/') {
            Some((owner, name))
                if !owner.is_empty() && !name.is_empty() && !name.contains('/') =>
            {
                Ok(Self::new(owner, name))
            }
            _ => Err(Error::config(
                format!("invalid repository '{s}'"),
                "Use the GitHub 'owner/name' form, e.g. blackboardsh/zig-bsdiff",
            )),
        }
    }
}

impl TryFrom<String> for RepoCoordinates {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl fmt::Display for RepoCoordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Settings for downloading and installing the release binaries.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProvisionConfig {
    /// Repository the releases are published in.
    pub repo: RepoCoordinates,
    /// Product prefix of the release archive name.
    pub product: String,
    /// Release version, without the leading `v`.
    pub version: String,
    /// Scheme and host serving the releases.
    pub release_base_url: String,
    /// Directory the binaries are installed into.
    pub bin_dir: PathBuf,
    /// Maximum number of redirects followed per download.
    pub max_redirects: usize,
    /// Optional connect timeout in seconds. Requests never time out by default.
    pub connect_timeout_secs: Option<u64>,
    /// Optional SHA-256 of the release archive, checked before installation.
    pub sha256: Option<String>,
    /// User agent sent with every request.
    pub user_agent: String,
}

impl Default for ProvisionConfig {
    fn default() -> Self {
        Self {
            repo: RepoCoordinates::new("blackboardsh", "zig-bsdiff"),
            product: "zig-bsdiff".to_string(),
            version: PACKAGE_VERSION.to_string(),
            release_base_url: "https://github.com".to_string(),
            bin_dir: PathBuf::from("bin"),
            max_redirects: DEFAULT_MAX_REDIRECTS,
            connect_timeout_secs: None,
            sha256: None,
            user_agent: format!("zig-bsdiff/{PACKAGE_VERSION}"),
        }
    }
}

impl ProvisionConfig {
    /// Set the install directory.
    #[must_use]
    pub fn with_bin_dir(mut self, bin_dir: impl Into<PathBuf>) -> Self {
        self.bin_dir = bin_dir.into();
        self
    }

    /// Set the release version.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Set the release base URL (scheme and host).
    #[must_use]
    pub fn with_release_base_url(mut self, url: impl Into<String>) -> Self {
        self.release_base_url = url.into();
        self
    }

    /// Check the invariants the install flow relies on.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] describing the first invalid value.
    pub fn validate(&self) -> Result<()> {
        let version = self.version.strip_prefix('v').unwrap_or(&self.version);
        if version.is_empty() {
            return Err(Error::config(
                "release version is empty",
                "Set a version such as 1.2.0",
            ));
        }
        if self.product.is_empty() {
            return Err(Error::config(
                "product name is empty",
                "Set the release archive prefix, e.g. zig-bsdiff",
            ));
        }
        if !self.release_base_url.starts_with("http://")
            && !self.release_base_url.starts_with("https://")
        {
            return Err(Error::config(
                format!("invalid release base URL '{}'", self.release_base_url),
                "Use an http:// or https:// URL such as https://github.com",
            ));
        }
        match &self.sha256 {
            Some(digest)
                if digest.len() != 64 || !digest.chars().all(|c| c.is_ascii_hexdigit()) =>
            {
                Err(Error::config(
                    format!("invalid sha256 '{digest}'"),
                    "Provide the 64 character hex digest of the release archive",
                ))
            }
            _ => Ok(()),
        }
    }

    /// Version without a leading `v`.
    #[must_use]
    pub fn bare_version(&self) -> &str {
        self.version.strip_prefix('v').unwrap_or(&self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ProvisionConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.version, PACKAGE_VERSION);
        assert_eq!(config.repo.to_string(), "blackboardsh/zig-bsdiff");
        assert_eq!(config.max_redirects, DEFAULT_MAX_REDIRECTS);
    }

    #[test]
    fn test_repo_coordinates_parse() {
        let repo: RepoCoordinates = "acme/tools".parse().unwrap();
        assert_eq!(repo.owner, "acme");
        assert_eq!(repo.name, "tools");

        assert!("acme".parse::<RepoCoordinates>().is_err());
        assert!("/tools".parse::<RepoCoordinates>().is_err());
        assert!("acme/tools/extra".parse::<RepoCoordinates>().is_err());
    }

    #[test]
    fn test_empty_version_rejected() {
        let config = ProvisionConfig::default().with_version("");
        assert!(matches!(config.validate(), Err(Error::Config { .. })));

        let config = ProvisionConfig::default().with_version("v");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bare_version_strips_prefix() {
        let config = ProvisionConfig::default().with_version("v1.2.0");
        assert_eq!(config.bare_version(), "1.2.0");
    }

    #[test]
    fn test_invalid_sha256_rejected() {
        let config = ProvisionConfig {
            sha256: Some("abc".to_string()),
            ..ProvisionConfig::default()
        };
        assert!(config.validate().is_err());

        let config = ProvisionConfig {
            sha256: Some("a".repeat(64)),
            ..ProvisionConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let config = ProvisionConfig::default().with_release_base_url("github.com");
        assert!(config.validate().is_err());
    }
}
