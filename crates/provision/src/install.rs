//! Release binary installation.
//!
//! Ties the pieces together: the cache check gates the download, the
//! downloader streams the release archive into the bin directory, and the
//! permission fix runs last.

use std::path::PathBuf;
use tracing::{debug, info, instrument};

use crate::Result;
use crate::cache;
use crate::config::ProvisionConfig;
use crate::download::{Downloader, ExtractRequest};
use crate::locator::ArtifactLocator;
use crate::permissions;
use crate::platform::PlatformTag;

/// Result of an install run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// Every binary was already present; nothing was downloaded.
    AlreadyInstalled {
        /// Install directory.
        bin_dir: PathBuf,
    },
    /// The release archive was downloaded and unpacked.
    Installed {
        /// URL the archive was requested from.
        url: String,
        /// Install directory.
        bin_dir: PathBuf,
        /// Installed binaries.
        binaries: Vec<PathBuf>,
        /// SHA-256 of the downloaded archive.
        sha256: String,
    },
}

/// Installs the release binaries for a platform.
#[derive(Debug, Clone)]
pub struct Installer {
    config: ProvisionConfig,
    locator: ArtifactLocator,
    downloader: Downloader,
}

impl Installer {
    /// Create an installer.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Config`] for invalid configuration and
    /// [`crate::Error::Client`] if the HTTP client cannot be built.
    pub fn new(config: ProvisionConfig) -> Result<Self> {
        config.validate()?;
        let downloader = Downloader::from_config(&config)?;
        let locator = ArtifactLocator::from_config(&config);
        Ok(Self {
            config,
            locator,
            downloader,
        })
    }

    /// Artifact naming used by this installer.
    #[must_use]
    pub fn locator(&self) -> &ArtifactLocator {
        &self.locator
    }

    /// Configuration used by this installer.
    #[must_use]
    pub fn config(&self) -> &ProvisionConfig {
        &self.config
    }

    /// Whether every binary for `tag` is already present.
    #[must_use]
    pub fn is_installed(&self, tag: &PlatformTag) -> bool {
        cache::is_satisfied(&self.locator.expected_paths(tag))
    }

    /// Install the binaries unless they are already present.
    ///
    /// # Errors
    ///
    /// Returns download, extraction and permission errors unchanged, with
    /// the release page appended to download failures.
    pub async fn install(&self, tag: &PlatformTag) -> Result<InstallOutcome> {
        self.install_with(tag, false).await
    }

    /// Install the binaries, re-downloading when `force` is set.
    ///
    /// # Errors
    ///
    /// See [`Installer::install`].
    #[instrument(skip(self), fields(version = %self.config.bare_version()))]
    pub async fn install_with(&self, tag: &PlatformTag, force: bool) -> Result<InstallOutcome> {
        let bin_dir = self.locator.bin_dir().to_path_buf();
        let expected = self.locator.expected_paths(tag);

        if !force {
            let missing = cache::missing(&expected);
            if missing.is_empty() {
                info!(?bin_dir, "Binaries already installed");
                return Ok(InstallOutcome::AlreadyInstalled { bin_dir });
            }
            debug!(?missing, "Binaries missing");
        }

        let version = self.config.bare_version();
        let url = self.locator.release_url(version, tag);
        let request = ExtractRequest::gzip().with_sha256(self.config.sha256.clone());

        info!(%url, "Downloading binaries");
        let report = self
            .downloader
            .fetch_and_extract(&url, &bin_dir, &request)
            .await
            .map_err(|e| e.with_release_page(&self.locator.release_page(version)))?;

        permissions::make_executable(tag, &expected)?;

        let binaries = expected.into_iter().filter(|path| path.exists()).collect();
        info!(entries = report.entries, sha256 = %report.sha256, "Binaries installed");

        Ok(InstallOutcome::Installed {
            url,
            bin_dir,
            binaries,
            sha256: report.sha256,
        })
    }
}
