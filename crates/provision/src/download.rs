//! HTTP download with bounded redirect following.
//!
//! Response bodies are streamed straight into the extractor: the async byte
//! stream is bridged into a blocking reader, decompressed and unpacked into
//! a staging directory next to the destination. Entries are renamed into
//! place only once the whole archive unpacked (and matched its digest, if
//! one is configured).

use futures::{StreamExt, TryStreamExt};
use reqwest::header::LOCATION;
use reqwest::redirect::Policy;
use reqwest::{Client, Response, StatusCode};
use sha2::{Digest, Sha256};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio_util::io::{StreamReader, SyncIoBridge};
use tracing::{debug, info, trace, warn};

use crate::config::ProvisionConfig;
use crate::extract::{self, Compression, ExtractOptions};
use crate::{Error, Result};

/// Name prefix of the per-download staging directory.
const STAGING_PREFIX: &str = ".staging-";

/// How a downloaded archive is unpacked.
#[derive(Debug, Clone)]
pub struct ExtractRequest {
    /// Compression of the tar stream.
    pub compression: Compression,
    /// Member selection and component stripping.
    pub options: ExtractOptions,
    /// Expected SHA-256 of the compressed bytes.
    pub expected_sha256: Option<String>,
}

impl ExtractRequest {
    /// Unpack a `.tar.gz` with default options.
    #[must_use]
    pub fn gzip() -> Self {
        Self {
            compression: Compression::Gzip,
            options: ExtractOptions::default(),
            expected_sha256: None,
        }
    }

    /// Unpack a `.tar.xz` with default options.
    #[must_use]
    pub fn xz() -> Self {
        Self {
            compression: Compression::Xz,
            options: ExtractOptions::default(),
            expected_sha256: None,
        }
    }

    /// Set member selection and stripping.
    #[must_use]
    pub fn with_options(mut self, options: ExtractOptions) -> Self {
        self.options = options;
        self
    }

    /// Require the archive to hash to `digest`.
    #[must_use]
    pub fn with_sha256(mut self, digest: Option<String>) -> Self {
        self.expected_sha256 = digest;
        self
    }
}

/// Outcome of a successful fetch-and-extract.
#[derive(Debug, Clone)]
pub struct ExtractReport {
    /// URL the body was finally served from, after redirects.
    pub final_url: String,
    /// Number of archive entries written.
    pub entries: usize,
    /// SHA-256 of the compressed archive.
    pub sha256: String,
    /// Top-level paths moved into the destination.
    pub installed: Vec<PathBuf>,
}

/// HTTP downloader that follows redirects itself so it can cap their depth.
#[derive(Debug, Clone)]
pub struct Downloader {
    client: Client,
    max_redirects: usize,
}

impl Downloader {
    /// Create a downloader.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Client`] if the TLS backend cannot be initialized.
    pub fn new(
        user_agent: &str,
        max_redirects: usize,
        connect_timeout: Option<Duration>,
    ) -> Result<Self> {
        let mut builder = Client::builder()
            .user_agent(user_agent)
            .redirect(Policy::none());
        if let Some(timeout) = connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        let client = builder.build().map_err(|source| Error::Client { source })?;
        Ok(Self {
            client,
            max_redirects,
        })
    }

    /// Create a downloader from provisioning configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Client`] if the TLS backend cannot be initialized.
    pub fn from_config(config: &ProvisionConfig) -> Result<Self> {
        Self::new(
            &config.user_agent,
            config.max_redirects,
            config.connect_timeout_secs.map(Duration::from_secs),
        )
    }

    /// Send a GET, following redirects up to the configured depth.
    ///
    /// Returns the URL that answered with a success status and its response.
    async fn open(&self, url: &str) -> Result<(String, Response)> {
        let mut current = url.to_string();

        for hop in 0..=self.max_redirects {
            debug!(url = %current, hop, "Requesting");
            let response = self
                .client
                .get(&current)
                .send()
                .await
                .map_err(|source| Error::http(&current, source))?;

            let status = response.status();
            if is_redirect(status) {
                let next = redirect_target(&response, &current)?;
                debug!(from = %current, to = %next, status = status.as_u16(), "Following redirect");
                current = next;
                continue;
            }

            if !status.is_success() {
                return Err(Error::download_failed(status.as_u16(), current));
            }

            return Ok((current, response));
        }

        Err(Error::TooManyRedirects {
            url: url.to_string(),
            limit: self.max_redirects,
        })
    }

    /// Download `url` and unpack it into `dest`.
    ///
    /// `dest` is created if missing. The archive is unpacked into a staging
    /// directory inside `dest` and promoted entry by entry on success; on
    /// failure the staging directory is removed and `dest` is untouched.
    ///
    /// # Errors
    ///
    /// - [`Error::DownloadFailed`] for non-success responses
    /// - [`Error::TooManyRedirects`] when the redirect cap is exceeded
    /// - [`Error::ExtractionFailed`] for body, decompression or archive errors
    /// - [`Error::ChecksumMismatch`] when a digest is configured and differs
    pub async fn fetch_and_extract(
        &self,
        url: &str,
        dest: &Path,
        request: &ExtractRequest,
    ) -> Result<ExtractReport> {
        let (final_url, response) = self.open(url).await?;

        tokio::fs::create_dir_all(dest)
            .await
            .map_err(|e| Error::io("create directory", dest, e))?;
        sweep_stale_staging(dest)?;
        let staging = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir_in(dest)
            .map_err(|e| Error::io("create staging directory", dest, e))?;

        info!(url = %final_url, dest = ?dest, "Streaming archive");

        let stream = response.bytes_stream().map_err(io::Error::other);
        let bridge = SyncIoBridge::new(StreamReader::new(Box::pin(stream)));
        let staging_path = staging.path().to_path_buf();
        let compression = request.compression;
        let options = request.options.clone();

        let (entries, sha256) = tokio::task::spawn_blocking(move || -> io::Result<(usize, String)> {
            let hashing = HashingReader::new(bridge);
            let (entries, mut rest) =
                extract::unpack_stream(hashing, compression, &staging_path, &options)?;
            io::copy(&mut rest, &mut io::sink())?;
            Ok((entries, rest.finish()))
        })
        .await
        .map_err(|e| Error::extraction_failed(&final_url, io::Error::other(e)))?
        .map_err(|e| Error::extraction_failed(&final_url, e))?;

        if let Some(expected) = &request.expected_sha256 {
            if !expected.eq_ignore_ascii_case(&sha256) {
                return Err(Error::ChecksumMismatch {
                    url: final_url,
                    expected: expected.clone(),
                    actual: sha256,
                });
            }
        }

        let installed = promote(staging.path(), dest)?;
        debug!(entries, %sha256, installed = installed.len(), "Archive extracted");

        Ok(ExtractReport {
            final_url,
            entries,
            sha256,
            installed,
        })
    }

    /// Download `url` into the file at `path`, returning the byte count.
    ///
    /// # Errors
    ///
    /// Returns download errors as for [`Downloader::fetch_and_extract`], and
    /// [`Error::Io`] if the file cannot be written.
    pub async fn fetch_to_file(&self, url: &str, path: &Path) -> Result<u64> {
        let (final_url, response) = self.open(url).await?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::io("create directory", parent, e))?;
        }
        let mut file = tokio::fs::File::create(path)
            .await
            .map_err(|e| Error::io("create file", path, e))?;

        let mut written = 0u64;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk =
                chunk.map_err(|e| Error::extraction_failed(&final_url, io::Error::other(e)))?;
            file.write_all(&chunk)
                .await
                .map_err(|e| Error::io("write file", path, e))?;
            written += chunk.len() as u64;
        }
        file.flush()
            .await
            .map_err(|e| Error::io("write file", path, e))?;

        debug!(url = %final_url, ?path, bytes = written, "Downloaded file");
        Ok(written)
    }
}

const fn is_redirect(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::MOVED_PERMANENTLY
            | StatusCode::FOUND
            | StatusCode::SEE_OTHER
            | StatusCode::TEMPORARY_REDIRECT
            | StatusCode::PERMANENT_REDIRECT
    )
}

fn redirect_target(response: &Response, current: &str) -> Result<String> {
    let location = response
        .headers()
        .get(LOCATION)
        .ok_or_else(|| Error::InvalidRedirect {
            url: current.to_string(),
            reason: "missing Location header".to_string(),
        })?
        .to_str()
        .map_err(|e| Error::InvalidRedirect {
            url: current.to_string(),
            reason: e.to_string(),
        })?;

    response
        .url()
        .join(location)
        .map(|url| url.to_string())
        .map_err(|e| Error::InvalidRedirect {
            url: current.to_string(),
            reason: format!("bad Location '{location}': {e}"),
        })
}

/// Remove staging directories left in `dest` by interrupted runs.
fn sweep_stale_staging(dest: &Path) -> Result<()> {
    let entries = std::fs::read_dir(dest).map_err(|e| Error::io("read directory", dest, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| Error::io("read directory", dest, e))?;
        let path = entry.path();
        if !entry.file_name().to_string_lossy().starts_with(STAGING_PREFIX) || !path.is_dir() {
            continue;
        }
        warn!(?path, "Removing stale staging directory");
        std::fs::remove_dir_all(&path)
            .map_err(|e| Error::io("remove stale staging directory", &path, e))?;
    }
    Ok(())
}

/// Move every top-level entry of `staging` into `dest`, replacing what is there.
fn promote(staging: &Path, dest: &Path) -> Result<Vec<PathBuf>> {
    let entries =
        std::fs::read_dir(staging).map_err(|e| Error::io("read staging directory", staging, e))?;

    let mut installed = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| Error::io("read staging directory", staging, e))?;
        let target = dest.join(entry.file_name());

        if target.is_dir() {
            std::fs::remove_dir_all(&target)
                .map_err(|e| Error::io("replace directory", &target, e))?;
        } else if target.exists() {
            std::fs::remove_file(&target).map_err(|e| Error::io("replace file", &target, e))?;
        }
        std::fs::rename(entry.path(), &target).map_err(|e| Error::io("install", &target, e))?;
        trace!(?target, "Promoted staged entry");
        installed.push(target);
    }

    installed.sort();
    Ok(installed)
}

/// Reader that hashes everything read through it.
struct HashingReader<R> {
    inner: R,
    hasher: Sha256,
}

impl<R: Read> HashingReader<R> {
    fn new(inner: R) -> Self {
        Self {
            inner,
            hasher: Sha256::new(),
        }
    }

    fn finish(self) -> String {
        format!("{:x}", self.hasher.finalize())
    }
}

impl<R: Read> Read for HashingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.hasher.update(&buf[..n]);
        Ok(n)
    }
}
