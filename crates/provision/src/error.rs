//! Error types for binary provisioning.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for provisioning operations.
pub type Result<T> = std::result::Result<T, Error>;

const DOWNLOAD_CAUSES: &str = "This usually means:\n\
    1. The release hasn't been published on GitHub yet\n\
    2. The release exists but the binaries weren't uploaded\n\
    3. You're offline or behind a firewall";

/// Errors that can occur while resolving, downloading or installing binaries.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// The running OS/architecture pair is outside the support matrix.
    #[error("Unsupported platform/architecture: {os}-{arch}")]
    #[diagnostic(
        code(zig_bsdiff::provision::unsupported_platform),
        help("Supported: {supported}")
    )]
    UnsupportedPlatform {
        /// Raw operating system identifier
        os: String,
        /// Raw architecture identifier
        arch: String,
        /// Comma separated list of supported combinations
        supported: String,
    },

    /// A binary name other than `bsdiff` or `bspatch` was requested.
    #[error("Invalid binary name: {name}. Must be 'bsdiff' or 'bspatch'")]
    #[diagnostic(code(zig_bsdiff::provision::invalid_binary_name))]
    InvalidBinaryName {
        /// The rejected name
        name: String,
    },

    /// The server answered with a non-success, non-redirect status.
    #[error("Failed to download: HTTP {status}\nURL: {url}")]
    #[diagnostic(code(zig_bsdiff::provision::download_failed))]
    DownloadFailed {
        /// HTTP status code
        status: u16,
        /// The URL that produced the status
        url: String,
        /// Likely causes and where to look next
        #[help]
        help: Option<String>,
    },

    /// The redirect chain exceeded the configured depth.
    #[error("Too many redirects (limit {limit}) while fetching {url}")]
    #[diagnostic(
        code(zig_bsdiff::provision::too_many_redirects),
        help("The server is redirecting in a loop; check the release URL and any proxy in between")
    )]
    TooManyRedirects {
        /// The URL the chain started from
        url: String,
        /// Configured maximum number of redirects
        limit: usize,
    },

    /// A redirect response carried no usable `Location` header.
    #[error("Invalid redirect from {url}: {reason}")]
    #[diagnostic(code(zig_bsdiff::provision::invalid_redirect))]
    InvalidRedirect {
        /// The URL that answered with the redirect
        url: String,
        /// What was wrong with the redirect
        reason: String,
    },

    /// The request could not be sent or the connection failed.
    #[error("Request to {url} failed: {source}")]
    #[diagnostic(
        code(zig_bsdiff::provision::http),
        help("Check your internet connection, proxy settings and firewall")
    )]
    Http {
        /// The URL being requested
        url: String,
        /// The underlying client error
        #[source]
        source: reqwest::Error,
    },

    /// The HTTP client could not be constructed.
    #[error("Failed to create HTTP client: {source}")]
    #[diagnostic(code(zig_bsdiff::provision::client))]
    Client {
        /// The underlying client error
        #[source]
        source: reqwest::Error,
    },

    /// The body stream, decompression or archive extraction failed.
    #[error("Failed to extract archive from {url}: {source}")]
    #[diagnostic(
        code(zig_bsdiff::provision::extraction_failed),
        help("The download was interrupted or the archive is corrupt; re-run the command")
    )]
    ExtractionFailed {
        /// The URL the archive came from
        url: String,
        /// The underlying stream error
        #[source]
        source: std::io::Error,
    },

    /// The downloaded archive does not match the configured digest.
    #[error("Checksum mismatch for {url}: expected {expected}, got {actual}")]
    #[diagnostic(
        code(zig_bsdiff::provision::checksum_mismatch),
        help("The archive was not installed. Verify the configured sha256 against the release")
    )]
    ChecksumMismatch {
        /// The URL the archive came from
        url: String,
        /// Configured digest
        expected: String,
        /// Digest of the received bytes
        actual: String,
    },

    /// A provisioned binary is not present on disk.
    #[error("Binary not found: {}", path.display())]
    #[diagnostic(code(zig_bsdiff::provision::binary_not_found))]
    BinaryNotFound {
        /// Expected location of the binary
        path: PathBuf,
        /// How to obtain the binary
        #[help]
        help: Option<String>,
    },

    /// Invalid configuration value.
    #[error("Configuration error: {message}")]
    #[diagnostic(code(zig_bsdiff::provision::config), help("{help}"))]
    Config {
        /// The error message
        message: String,
        /// Help text for the user
        help: String,
    },

    /// Filesystem operation failed.
    #[error("I/O error during {operation} at {}: {source}", path.display())]
    #[diagnostic(
        code(zig_bsdiff::provision::io),
        help("Check file permissions and ensure the path is writable")
    )]
    Io {
        /// What was being done
        operation: String,
        /// The path involved
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Create an unsupported platform error listing the support matrix.
    #[must_use]
    pub fn unsupported_platform(os: impl Into<String>, arch: impl Into<String>) -> Self {
        Self::UnsupportedPlatform {
            os: os.into(),
            arch: arch.into(),
            supported: crate::platform::SUPPORTED_PLATFORMS.join(", "),
        }
    }

    /// Create a download failure with the generic list of likely causes.
    #[must_use]
    pub fn download_failed(status: u16, url: impl Into<String>) -> Self {
        Self::DownloadFailed {
            status,
            url: url.into(),
            help: Some(DOWNLOAD_CAUSES.to_string()),
        }
    }

    /// Append a pointer to the release page to a download failure.
    ///
    /// Other variants are returned unchanged.
    #[must_use]
    pub fn with_release_page(self, page: &str) -> Self {
        match self {
            Self::DownloadFailed { status, url, help } => Self::DownloadFailed {
                status,
                url,
                help: Some(format!(
                    "{}\n\nPlease check: {page}",
                    help.as_deref().unwrap_or(DOWNLOAD_CAUSES)
                )),
            },
            other => other,
        }
    }

    /// Create an HTTP transport error.
    #[must_use]
    pub fn http(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Http {
            url: url.into(),
            source,
        }
    }

    /// Create an extraction error.
    #[must_use]
    pub fn extraction_failed(url: impl Into<String>, source: std::io::Error) -> Self {
        Self::ExtractionFailed {
            url: url.into(),
            source,
        }
    }

    /// Create a binary-not-found error with a remediation hint.
    #[must_use]
    pub fn binary_not_found(path: impl Into<PathBuf>, help: impl Into<String>) -> Self {
        Self::BinaryNotFound {
            path: path.into(),
            help: Some(help.into()),
        }
    }

    /// Create a configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: help.into(),
        }
    }

    /// Create a filesystem error.
    #[must_use]
    pub fn io(
        operation: impl Into<String>,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::Io {
            operation: operation.into(),
            path: path.into(),
            source,
        }
    }

    /// HTTP status code carried by the error, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::DownloadFailed { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_platform_lists_matrix() {
        let err = Error::unsupported_platform("freebsd", "x64");
        assert!(err.to_string().contains("freebsd-x64"));
        let Error::UnsupportedPlatform { supported, .. } = err else {
            unreachable!("constructor returns UnsupportedPlatform");
        };
        assert_eq!(
            supported,
            "darwin-arm64, darwin-x64, linux-x64, linux-arm64, win32-x64"
        );
    }

    #[test]
    fn test_download_failed_message() {
        let err = Error::download_failed(404, "https://example.com/a.tar.gz");
        assert!(err.to_string().contains("HTTP 404"));
        assert!(err.to_string().contains("https://example.com/a.tar.gz"));
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn test_with_release_page_appends_hint() {
        let err = Error::download_failed(404, "https://example.com/a.tar.gz")
            .with_release_page("https://example.com/releases/tag/v1.0.0");
        let Error::DownloadFailed { help, .. } = err else {
            unreachable!("variant is preserved");
        };
        let help = help.unwrap_or_default();
        assert!(help.contains("hasn't been published"));
        assert!(help.ends_with("Please check: https://example.com/releases/tag/v1.0.0"));
    }

    #[test]
    fn test_with_release_page_ignores_other_variants() {
        let err = Error::config("bad", "fix it").with_release_page("https://example.com");
        assert!(matches!(err, Error::Config { .. }));
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_io_error_display() {
        let source = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = Error::io("create directory", "/tmp/bin", source);
        assert!(err.to_string().contains("create directory"));
        assert!(err.to_string().contains("/tmp/bin"));
    }
}
