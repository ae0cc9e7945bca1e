//! Execute permissions for installed binaries.

use std::path::{Path, PathBuf};
use tracing::{debug, trace};

use crate::platform::PlatformTag;
use crate::{Error, Result};

/// Mode applied to installed executables.
pub const EXECUTABLE_MODE: u32 = 0o755;

/// Mark existing binaries executable for owner, group and other.
///
/// Does nothing for Windows targets. Paths that do not exist are skipped:
/// not every archive ships every binary. Returns the paths whose mode was
/// set.
///
/// # Errors
///
/// Returns [`Error::Io`] if the mode of an existing file cannot be changed.
pub fn make_executable<P: AsRef<Path>>(tag: &PlatformTag, paths: &[P]) -> Result<Vec<PathBuf>> {
    if tag.os.is_windows() {
        debug!(%tag, "Skipping permission fix on Windows target");
        return Ok(Vec::new());
    }

    let mut changed = Vec::new();
    for path in paths {
        let path = path.as_ref();
        if !path.exists() {
            trace!(?path, "Executable not present, skipping permission fix");
            continue;
        }
        set_mode(path)?;
        changed.push(path.to_path_buf());
    }
    Ok(changed)
}

#[cfg(unix)]
fn set_mode(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let perms = std::fs::Permissions::from_mode(EXECUTABLE_MODE);
    std::fs::set_permissions(path, perms).map_err(|e| Error::io("set permissions", path, e))?;
    trace!(?path, mode = EXECUTABLE_MODE, "Set executable mode");
    Ok(())
}

#[cfg(not(unix))]
fn set_mode(path: &Path) -> Result<()> {
    // Non-Unix hosts have no mode bits; the file only has to be readable.
    std::fs::metadata(path).map_err(|e| Error::io("read metadata", path, e))?;
    Ok(())
}
