//! Release artifact naming.
//!
//! Pure mapping from (component, version, platform) to the release archive
//! URL and the installed binary path. No I/O happens here.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::Error;
use crate::config::{ProvisionConfig, RepoCoordinates};
use crate::platform::PlatformTag;

/// One of the two binaries shipped in a release archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Component {
    /// The diff generator.
    Bsdiff,
    /// The patch applier.
    Bspatch,
}

impl Component {
    /// Both components, in install order.
    pub const ALL: [Self; 2] = [Self::Bsdiff, Self::Bspatch];

    /// Binary name without extension.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bsdiff => "bsdiff",
            Self::Bspatch => "bspatch",
        }
    }

    /// Binary file name on the given platform.
    #[must_use]
    pub fn file_name(self, tag: &PlatformTag) -> String {
        tag.executable(self.name())
    }
}

impl FromStr for Component {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bsdiff" => Ok(Self::Bsdiff),
            "bspatch" => Ok(Self::Bspatch),
            other => Err(Error::InvalidBinaryName {
                name: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Where an artifact comes from and where it ends up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactLocation {
    /// Download URL of the release archive.
    pub url: String,
    /// File name of the release archive.
    pub archive_name: String,
    /// Installed path of the binary.
    pub local_path: PathBuf,
}

/// Builds release URLs and install paths from explicit configuration.
#[derive(Debug, Clone)]
pub struct ArtifactLocator {
    repo: RepoCoordinates,
    product: String,
    base_url: String,
    bin_dir: PathBuf,
}

impl ArtifactLocator {
    /// Create a locator.
    #[must_use]
    pub fn new(
        repo: RepoCoordinates,
        product: impl Into<String>,
        base_url: impl Into<String>,
        bin_dir: impl Into<PathBuf>,
    ) -> Self {
        let base_url: String = base_url.into();
        Self {
            repo,
            product: product.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
            bin_dir: bin_dir.into(),
        }
    }

    /// Create a locator from provisioning configuration.
    #[must_use]
    pub fn from_config(config: &ProvisionConfig) -> Self {
        Self::new(
            config.repo.clone(),
            config.product.clone(),
            config.release_base_url.clone(),
            config.bin_dir.clone(),
        )
    }

    /// Install directory.
    #[must_use]
    pub fn bin_dir(&self) -> &Path {
        &self.bin_dir
    }

    /// Release archive file name, e.g. `zig-bsdiff-linux-x64.tar.gz`.
    #[must_use]
    pub fn archive_name(&self, tag: &PlatformTag) -> String {
        format!("{}-{}-{}.tar.gz", self.product, tag.os, tag.arch)
    }

    /// Download URL of the release archive for a version.
    #[must_use]
    pub fn release_url(&self, version: &str, tag: &PlatformTag) -> String {
        format!(
            "{}/{}/releases/download/v{}/{}",
            self.base_url,
            self.repo,
            bare(version),
            self.archive_name(tag)
        )
    }

    /// Release page for a version, shown in download diagnostics.
    #[must_use]
    pub fn release_page(&self, version: &str) -> String {
        format!(
            "{}/{}/releases/tag/v{}",
            self.base_url,
            self.repo,
            bare(version)
        )
    }

    /// Listing of all releases.
    #[must_use]
    pub fn releases_page(&self) -> String {
        format!("{}/{}/releases", self.base_url, self.repo)
    }

    /// Installed path of a component.
    #[must_use]
    pub fn local_path(&self, component: Component, tag: &PlatformTag) -> PathBuf {
        self.bin_dir.join(component.file_name(tag))
    }

    /// Every path that must exist for the install to count as complete.
    #[must_use]
    pub fn expected_paths(&self, tag: &PlatformTag) -> Vec<PathBuf> {
        Component::ALL
            .iter()
            .map(|component| self.local_path(*component, tag))
            .collect()
    }

    /// Locate a component of a release.
    #[must_use]
    pub fn locate(
        &self,
        component: Component,
        version: &str,
        tag: &PlatformTag,
    ) -> ArtifactLocation {
        ArtifactLocation {
            url: self.release_url(version, tag),
            archive_name: self.archive_name(tag),
            local_path: self.local_path(component, tag),
        }
    }
}

fn bare(version: &str) -> &str {
    version.strip_prefix('v').unwrap_or(version)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{Arch, Os};

    fn locator() -> ArtifactLocator {
        ArtifactLocator::new(
            RepoCoordinates::new("blackboardsh", "zig-bsdiff"),
            "zig-bsdiff",
            "https://github.com",
            "/opt/cache",
        )
    }

    #[test]
    fn test_linux_x64_location() {
        let tag = PlatformTag::new(Os::Linux, Arch::X64);
        let location = locator().locate(Component::Bsdiff, "1.2.0", &tag);
        assert_eq!(
            location.url,
            concat!(
                "https://github.com/blackboardsh/zig-bsdiff/releases/download/",
                "v1.2.0/zig-bsdiff-linux-x64.tar.gz"
            )
        );
        assert_eq!(location.archive_name, "zig-bsdiff-linux-x64.tar.gz");
        assert_eq!(location.local_path, PathBuf::from("/opt/cache/bsdiff"));
    }

    #[test]
    fn test_windows_paths_carry_exe() {
        for arch in [Arch::X64, Arch::Arm64] {
            let tag = PlatformTag::new(Os::Win32, arch);
            let location = locator().locate(Component::Bspatch, "1.2.0", &tag);
            assert_eq!(location.local_path, PathBuf::from("/opt/cache/bspatch.exe"));
        }
    }

    #[test]
    fn test_locate_is_deterministic() {
        let tag = PlatformTag::new(Os::Darwin, Arch::Arm64);
        let first = locator().locate(Component::Bspatch, "0.3.1", &tag);
        let second = locator().locate(Component::Bspatch, "0.3.1", &tag);
        assert_eq!(first, second);
    }

    #[test]
    fn test_version_prefix_and_trailing_slash_normalized() {
        let locator = ArtifactLocator::new(
            RepoCoordinates::new("acme", "diff"),
            "diff",
            "http://127.0.0.1:8080/",
            "bin",
        );
        let tag = PlatformTag::new(Os::Darwin, Arch::X64);
        assert_eq!(
            locator.release_url("v2.0.0", &tag),
            "http://127.0.0.1:8080/acme/diff/releases/download/v2.0.0/diff-darwin-x64.tar.gz"
        );
        assert_eq!(
            locator.release_page("2.0.0"),
            "http://127.0.0.1:8080/acme/diff/releases/tag/v2.0.0"
        );
    }

    #[test]
    fn test_expected_paths_cover_both_binaries() {
        let tag = PlatformTag::new(Os::Linux, Arch::Arm64);
        assert_eq!(
            locator().expected_paths(&tag),
            vec![
                PathBuf::from("/opt/cache/bsdiff"),
                PathBuf::from("/opt/cache/bspatch")
            ]
        );
    }

    #[test]
    fn test_component_parse() {
        assert_eq!("bsdiff".parse::<Component>().unwrap(), Component::Bsdiff);
        assert_eq!("bspatch".parse::<Component>().unwrap(), Component::Bspatch);
        assert!(matches!(
            "zstd".parse::<Component>(),
            Err(Error::InvalidBinaryName { .. })
        ));
    }
}
