//! HTTP download of livery archives.
//!
//! Downloads are not resumable: an interrupted or failed transfer removes the
//! partial file before the error is returned.

use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::Path;
use std::time::Duration;

use reqwest::blocking::Client;
use tracing::{debug, info, warn};

use crate::livery::{sanitize_title, Metadata};

use super::cancel::CancelFlag;
use super::error::{ManagerError, ManagerResult};
use super::extractor::is_archive;
use super::traits::{ArchiveDownloader, MetadataProvider, ProgressCallback};

/// Buffer size for reading/writing during downloads (64KB).
const BUFFER_SIZE: usize = 64 * 1024;

/// Blocking HTTP downloader.
#[derive(Debug)]
pub struct HttpDownloader {
    client: Client,
    timeout: Duration,
}

impl HttpDownloader {
    /// Create a downloader with the given request timeout.
    pub fn new(timeout: Duration) -> ManagerResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("dcslm/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ManagerError::DownloadFailed {
                url: String::new(),
                reason: format!("failed to create HTTP client: {}", e),
            })?;
        Ok(Self { client, timeout })
    }

    fn stream(
        &self,
        url: &str,
        dest: &Path,
        cancel: &CancelFlag,
        progress: Option<&ProgressCallback>,
    ) -> ManagerResult<u64> {
        let mut response = self.client.get(url).send().map_err(|e| self.map_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ManagerError::DownloadFailed {
                url: url.to_string(),
                reason: format!("GET request failed with status {}", status),
            });
        }
        let total = response.content_length().unwrap_or(0);

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|e| ManagerError::CreateDirFailed {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        let file = File::create(dest).map_err(|e| ManagerError::WriteFailed {
            path: dest.to_path_buf(),
            source: e,
        })?;
        let mut writer = BufWriter::new(file);

        let mut buffer = vec![0u8; BUFFER_SIZE];
        let mut downloaded = 0u64;
        loop {
            cancel.check()?;
            let n = response.read(&mut buffer).map_err(|e| ManagerError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
            if n == 0 {
                break;
            }
            writer
                .write_all(&buffer[..n])
                .map_err(|e| ManagerError::WriteFailed {
                    path: dest.to_path_buf(),
                    source: e,
                })?;
            downloaded += n as u64;
            if let Some(cb) = progress {
                cb(downloaded, total);
            }
        }

        writer.flush().map_err(|e| ManagerError::WriteFailed {
            path: dest.to_path_buf(),
            source: e,
        })?;
        Ok(downloaded)
    }

    fn map_error(&self, url: &str, e: reqwest::Error) -> ManagerError {
        if e.is_timeout() {
            ManagerError::Timeout {
                url: url.to_string(),
                timeout_secs: self.timeout.as_secs(),
            }
        } else {
            ManagerError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    }
}

impl ArchiveDownloader for HttpDownloader {
    fn download(
        &self,
        url: &str,
        dest: &Path,
        cancel: &CancelFlag,
        progress: Option<&ProgressCallback>,
    ) -> ManagerResult<u64> {
        debug!(url = url, dest = %dest.display(), "Starting download");
        match self.stream(url, dest, cancel, progress) {
            Ok(bytes) => {
                info!(url = url, bytes = bytes, "Downloaded archive");
                Ok(bytes)
            }
            Err(e) => {
                if dest.exists() {
                    if let Err(remove_err) = fs::remove_file(dest) {
                        warn!(
                            path = %dest.display(),
                            error = %remove_err,
                            "Failed to remove partial download"
                        );
                    }
                }
                Err(e)
            }
        }
    }
}

/// Metadata provider for direct archive links.
///
/// Accepts URLs whose last segment is an archive file name and titles the
/// livery after that file. Anything else is rejected.
#[derive(Debug, Default)]
pub struct DirectLinkProvider;

impl MetadataProvider for DirectLinkProvider {
    fn resolve(&self, id_or_url: &str) -> ManagerResult<Metadata> {
        let failed = |reason: &str| ManagerError::MetadataFailed {
            source_id: id_or_url.to_string(),
            reason: reason.to_string(),
        };

        if !id_or_url.starts_with("http://") && !id_or_url.starts_with("https://") {
            return Err(failed("not a URL"));
        }
        let file_name = archive_file_name(id_or_url).ok_or_else(|| failed("not an archive link"))?;
        let stem = Path::new(&file_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&file_name);

        Ok(Metadata::titled(sanitize_title(stem)).with_download(id_or_url))
    }
}

/// Archive file name at the end of a download URL, if it names one.
pub fn archive_file_name(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next()?;
    let last = path.trim_end_matches('/').rsplit('/').next()?;
    if last.is_empty() || !is_archive(Path::new(last)) {
        return None;
    }
    Some(last.to_string())
}
