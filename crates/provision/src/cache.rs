//! Presence-based install cache.
//!
//! An install is complete when every expected file exists. Contents are not
//! inspected; extraction promotes files from a staging directory only after
//! the whole archive unpacked, so presence at the final path means the
//! download finished.

use std::path::{Path, PathBuf};
use tracing::trace;

/// Check whether every expected path exists.
///
/// An empty file counts as present.
#[must_use]
pub fn is_satisfied<P: AsRef<Path>>(expected: &[P]) -> bool {
    expected.iter().all(|path| {
        let present = path.as_ref().exists();
        trace!(path = ?path.as_ref(), present, "Cache check");
        present
    })
}

/// Expected paths that are not present.
#[must_use]
pub fn missing<P: AsRef<Path>>(expected: &[P]) -> Vec<PathBuf> {
    expected
        .iter()
        .map(|path| path.as_ref())
        .filter(|path| !path.exists())
        .map(Path::to_path_buf)
        .collect()
}
