//! Downloader: fetches one link into the staging directory.

use std::path::{Path, PathBuf};

use futures_util::StreamExt;
use tokio::io::AsyncWriteExt;

use crate::config::Config;
use crate::error::{PipelineError, PipelineResult};
use crate::types::Link;

/// Streams remote images to deterministic staging files.
///
/// Stateless apart from the shared HTTP client, so one instance serves all
/// concurrent download tasks.
#[derive(Debug, Clone)]
pub struct Downloader {
    client: reqwest::Client,
    staging_dir: PathBuf,
    extension: String,
    reject_error_status: bool,
}

impl Downloader {
    /// Build a downloader from config, with its own HTTP client.
    pub fn new(config: &Config) -> crate::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.download.user_agent.clone())
            .build()?;
        Ok(Self::with_client(
            client,
            config.staging_dir(),
            &config.pipeline.staging_extension,
            config.download.reject_error_status,
        ))
    }

    /// Build a downloader around an existing client.
    pub fn with_client(
        client: reqwest::Client,
        staging_dir: PathBuf,
        extension: &str,
        reject_error_status: bool,
    ) -> Self {
        Self {
            client,
            staging_dir,
            extension: extension.to_string(),
            reject_error_status,
        }
    }

    /// Staging file for the link at position `id`: `<staging_dir>/image<id>.<ext>`.
    ///
    /// Distinct ids always map to distinct files, so concurrent downloads
    /// never share a destination.
    pub fn staging_path(&self, id: usize) -> PathBuf {
        self.staging_dir.join(format!("image{id}.{}", self.extension))
    }

    /// Download `link` to the staging file for `id`.
    ///
    /// The body is streamed chunk by chunk to disk. On a failure after the
    /// file was created, the partial file is removed. No retries.
    pub async fn fetch(&self, id: usize, link: &Link) -> PipelineResult<PathBuf> {
        let response = self
            .client
            .get(link.as_str())
            .send()
            .await
            .map_err(|e| PipelineError::Download {
                link: link.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if self.reject_error_status && !status.is_success() {
            return Err(PipelineError::HttpStatus {
                link: link.to_string(),
                status: status.as_u16(),
            });
        }

        let path = self.staging_path(id);
        let mut file = tokio::fs::File::create(&path)
            .await
            .map_err(|e| PipelineError::StagingWrite {
                path: path.clone(),
                message: e.to_string(),
            })?;

        let written = Self::stream_body(response, &mut file, link, &path).await;
        drop(file);

        match written {
            Ok(bytes) => {
                tracing::trace!("Wrote {} bytes to {:?}", bytes, path);
                Ok(path)
            }
            Err(e) => {
                if let Err(rm) = tokio::fs::remove_file(&path).await {
                    tracing::warn!("Could not remove partial download {:?}: {rm}", path);
                }
                Err(e)
            }
        }
    }

    async fn stream_body(
        response: reqwest::Response,
        file: &mut tokio::fs::File,
        link: &Link,
        path: &Path,
    ) -> PipelineResult<u64> {
        let write_err = |e: std::io::Error| PipelineError::StagingWrite {
            path: path.to_path_buf(),
            message: e.to_string(),
        };

        let mut stream = response.bytes_stream();
        let mut written: u64 = 0;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| PipelineError::Download {
                link: link.to_string(),
                message: format!("body interrupted: {e}"),
            })?;
            file.write_all(&chunk).await.map_err(write_err)?;
            written += chunk.len() as u64;
        }
        file.flush().await.map_err(write_err)?;
        Ok(written)
    }
}
