//! Provisioning of the zig-bsdiff release binaries.
//!
//! This crate provides functionality to:
//! - Resolve the running platform to a release tag (`linux-x64`, `win32-x64`, ...)
//! - Build release archive URLs and install paths from explicit configuration
//! - Stream, verify and unpack release archives with bounded redirects
//! - Skip work when the binaries are already installed
//!
//! # Example
//!
//! ```ignore
//! use zig_bsdiff_provision::{Installer, ProvisionConfig, platform};
//!
//! let tag = platform::resolve()?;
//! let installer = Installer::new(ProvisionConfig::default())?;
//! installer.install(&tag).await?;
//! ```

pub mod cache;
pub mod config;
pub mod download;
mod error;
pub mod extract;
pub mod install;
pub mod locator;
pub mod lookup;
pub mod permissions;
pub mod platform;
pub mod stage;

pub use config::{DEFAULT_MAX_REDIRECTS, PACKAGE_VERSION, ProvisionConfig, RepoCoordinates};
pub use download::{Downloader, ExtractReport, ExtractRequest};
pub use error::{Error, Result};
pub use extract::{Compression, ExtractOptions};
pub use install::{InstallOutcome, Installer};
pub use locator::{ArtifactLocation, ArtifactLocator, Component};
pub use lookup::{Binaries, binaries, binary_path};
pub use platform::{Arch, Os, PlatformTag, SUPPORTED_PLATFORMS};
