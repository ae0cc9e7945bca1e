//! Staging of locally built binaries for publishing.

use std::path::{Path, PathBuf};
use tracing::info;

use crate::locator::Component;
use crate::platform::PlatformTag;
use crate::{Error, Result};

/// Copy both built binaries from `build_dir` into `dist_dir`.
///
/// # Errors
///
/// Returns [`Error::BinaryNotFound`] when a binary has not been built and
/// [`Error::Io`] when copying fails.
pub fn stage_binaries(
    build_dir: &Path,
    dist_dir: &Path,
    tag: &PlatformTag,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dist_dir).map_err(|e| Error::io("create directory", dist_dir, e))?;

    let mut staged = Vec::new();
    for component in Component::ALL {
        let file_name = component.file_name(tag);
        let src = build_dir.join(&file_name);
        let dest = dist_dir.join(&file_name);

        if !src.exists() {
            return Err(Error::binary_not_found(
                src,
                format!(
                    "Failed to package {file_name}. \
                     Build the release binaries first: zig build -Doptimize=ReleaseFast"
                ),
            ));
        }

        std::fs::copy(&src, &dest).map_err(|e| Error::io("copy binary", &dest, e))?;
        info!(?src, ?dest, "Staged binary");
        staged.push(dest);
    }

    Ok(staged)
}
