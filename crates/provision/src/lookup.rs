//! Lookup of installed binaries.

use std::path::{Path, PathBuf};

use crate::locator::Component;
use crate::platform::PlatformTag;
use crate::{Error, Result};

/// Absolute paths of both installed binaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binaries {
    /// Path of `bsdiff`.
    pub bsdiff: PathBuf,
    /// Path of `bspatch`.
    pub bspatch: PathBuf,
}

/// Absolute path of an installed binary.
///
/// `releases_page` is shown in the error when the binary is missing.
///
/// # Errors
///
/// - [`Error::InvalidBinaryName`] for names other than `bsdiff`/`bspatch`
/// - [`Error::BinaryNotFound`] when the file does not exist
pub fn binary_path(
    bin_dir: &Path,
    tag: &PlatformTag,
    name: &str,
    releases_page: &str,
) -> Result<PathBuf> {
    let component: Component = name.parse()?;
    let path = bin_dir.join(component.file_name(tag));
    let path = std::path::absolute(&path).map_err(|e| Error::io("resolve path", &path, e))?;

    if !path.exists() {
        return Err(Error::binary_not_found(
            path,
            format!(
                "Binaries are downloaded automatically on first use.\n\
                 Run 'zig-bsdiff install' or 'zig-bsdiff exec {component}' to trigger \
                 the download, or download them manually from:\n{releases_page}"
            ),
        ));
    }

    Ok(path)
}

/// Absolute paths of both installed binaries.
///
/// # Errors
///
/// Returns [`Error::BinaryNotFound`] if either binary is missing.
pub fn binaries(bin_dir: &Path, tag: &PlatformTag, releases_page: &str) -> Result<Binaries> {
    Ok(Binaries {
        bsdiff: binary_path(bin_dir, tag, Component::Bsdiff.name(), releases_page)?,
        bspatch: binary_path(bin_dir, tag, Component::Bspatch.name(), releases_page)?,
    })
}
