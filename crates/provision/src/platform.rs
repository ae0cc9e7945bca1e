//! Platform detection and normalization.
//!
//! Maps the identifiers reported by the running process onto the closed
//! support matrix used to name release archives (e.g. `linux-x64`,
//! `win32-x64`).

use std::fmt;

use crate::{Error, Result};

/// Platform/architecture combinations release archives are published for.
pub const SUPPORTED_PLATFORMS: &[&str] = &[
    "darwin-arm64",
    "darwin-x64",
    "linux-x64",
    "linux-arm64",
    "win32-x64",
];

/// Operating system family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Os {
    /// macOS
    Darwin,
    /// Linux
    Linux,
    /// Windows
    Win32,
}

impl Os {
    /// Look up an operating system identifier.
    ///
    /// Accepts both the release naming (`darwin`, `win32`) and Rust's
    /// `std::env::consts::OS` naming (`macos`, `windows`).
    #[must_use]
    pub fn from_identifier(s: &str) -> Option<Self> {
        match s {
            "darwin" | "macos" => Some(Self::Darwin),
            "linux" => Some(Self::Linux),
            "win32" | "windows" => Some(Self::Win32),
            _ => None,
        }
    }

    /// Name used in release archive filenames.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Darwin => "darwin",
            Self::Linux => "linux",
            Self::Win32 => "win32",
        }
    }

    /// Whether this is the Windows family.
    #[must_use]
    pub const fn is_windows(self) -> bool {
        matches!(self, Self::Win32)
    }

    /// Suffix carried by executables on this OS.
    #[must_use]
    pub const fn exe_suffix(self) -> &'static str {
        if self.is_windows() { ".exe" } else { "" }
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// CPU architecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
    /// x86-64
    X64,
    /// 64-bit ARM
    Arm64,
}

impl Arch {
    /// Look up an architecture identifier.
    #[must_use]
    pub fn from_identifier(s: &str) -> Option<Self> {
        match s {
            "x64" | "x86_64" => Some(Self::X64),
            "arm64" | "aarch64" => Some(Self::Arm64),
            _ => None,
        }
    }

    /// Name used in release archive filenames.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::X64 => "x64",
            Self::Arm64 => "arm64",
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved platform/architecture tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlatformTag {
    /// Operating system family.
    pub os: Os,
    /// CPU architecture.
    pub arch: Arch,
}

impl PlatformTag {
    /// Create a new tag.
    #[must_use]
    pub const fn new(os: Os, arch: Arch) -> Self {
        Self { os, arch }
    }

    /// File name of an executable on this platform.
    #[must_use]
    pub fn executable(&self, stem: &str) -> String {
        format!("{stem}{}", self.os.exe_suffix())
    }
}

impl fmt::Display for PlatformTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.os, self.arch)
    }
}

/// Resolve the tag of the running process.
///
/// # Errors
///
/// Returns [`Error::UnsupportedPlatform`] when the host is outside the
/// support matrix.
pub fn resolve() -> Result<PlatformTag> {
    resolve_from(std::env::consts::OS, std::env::consts::ARCH)
}

/// Resolve a tag from raw OS and architecture identifiers.
///
/// Each identifier is looked up independently; a miss on either side fails
/// with the raw identifiers and the supported combinations.
///
/// # Errors
///
/// Returns [`Error::UnsupportedPlatform`] when either lookup misses.
pub fn resolve_from(os: &str, arch: &str) -> Result<PlatformTag> {
    match (Os::from_identifier(os), Arch::from_identifier(arch)) {
        (Some(os), Some(arch)) => Ok(PlatformTag::new(os, arch)),
        _ => Err(Error::unsupported_platform(os, arch)),
    }
}
