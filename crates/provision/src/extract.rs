//! Streaming tarball extraction.
//!
//! Unpacks gzip or xz compressed tar streams entry by entry, with optional
//! member selection and leading component stripping.

use flate2::read::GzDecoder;
use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};
use tar::Archive;
use tracing::trace;
use xz2::read::XzDecoder;

/// Compression wrapping the tar stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    /// `.tar.gz`
    Gzip,
    /// `.tar.xz`
    Xz,
}

/// Which entries to extract and how to place them.
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    /// Number of leading path components removed from each entry.
    pub strip_components: usize,
    /// Archive members to extract, matched on whole components before
    /// stripping. Empty means every entry.
    pub include: Vec<String>,
}

impl ExtractOptions {
    /// Strip `n` leading components.
    #[must_use]
    pub fn strip(mut self, n: usize) -> Self {
        self.strip_components = n;
        self
    }

    /// Only extract the given members (and everything below them).
    #[must_use]
    pub fn include<I, S>(mut self, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include = members.into_iter().map(Into::into).collect();
        self
    }

    fn selects(&self, path: &Path) -> bool {
        self.include.is_empty()
            || self
                .include
                .iter()
                .any(|member| path.starts_with(member.trim_end_matches('/')))
    }

    /// Destination-relative path of an entry, or `None` if it is skipped.
    fn target(&self, path: &Path) -> Option<PathBuf> {
        let normalized: PathBuf = path
            .components()
            .filter(|c| !matches!(c, Component::CurDir))
            .collect();
        if !self.selects(&normalized) {
            return None;
        }

        let components: Vec<_> = normalized.components().collect();
        if components.len() <= self.strip_components {
            return None;
        }

        let stripped: PathBuf = components[self.strip_components..].iter().collect();

        // Skip entries escaping the destination
        let escapes = stripped
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if escapes { None } else { Some(stripped) }
    }
}

/// Extract a compressed tar stream into `dest`.
///
/// Returns the number of entries written together with the raw input
/// reader, so the caller can drain and inspect whatever follows the
/// archive.
///
/// # Errors
///
/// Returns the first decompression, archive or filesystem error.
pub fn unpack_stream<R: Read>(
    reader: R,
    compression: Compression,
    dest: &Path,
    options: &ExtractOptions,
) -> io::Result<(usize, R)> {
    match compression {
        Compression::Gzip => {
            let mut archive = Archive::new(GzDecoder::new(reader));
            let count = unpack_entries(&mut archive, dest, options)?;
            Ok((count, archive.into_inner().into_inner()))
        }
        Compression::Xz => {
            let mut archive = Archive::new(XzDecoder::new(reader));
            let count = unpack_entries(&mut archive, dest, options)?;
            Ok((count, archive.into_inner().into_inner()))
        }
    }
}

fn unpack_entries<R: Read>(
    archive: &mut Archive<R>,
    dest: &Path,
    options: &ExtractOptions,
) -> io::Result<usize> {
    std::fs::create_dir_all(dest)?;
    let mut count = 0;

    for entry in archive.entries()? {
        let mut entry = entry?;
        let path = entry.path()?.into_owned();

        let Some(relative) = options.target(&path) else {
            trace!(?path, "Skipping archive entry");
            continue;
        };

        let target = dest.join(&relative);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        entry.unpack(&target)?;
        trace!(?path, ?target, "Extracted archive entry");
        count += 1;
    }

    Ok(count)
}
