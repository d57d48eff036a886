//! Artifact downloads with bounded retries and archive validation.

use std::io;
use std::path::Path;

use taskscope_core::TaskId;
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, info, warn};

use crate::client::TaskClient;
use crate::error::ClientError;

impl TaskClient {
    /// Download `artifact` of `task_id` to `destination` and check that it is
    /// a readable zip archive.
    ///
    /// Any failure (HTTP status, transport, corrupt archive) is retried until
    /// `download_attempts` is reached, sleeping `retry_delay` in between. The
    /// destination file is removed after every failed attempt.
    pub async fn download_artifact(
        &self,
        destination: &Path,
        task_id: &TaskId,
        artifact: &str,
    ) -> Result<(), ClientError> {
        let url = self.artifact_url(task_id, artifact);
        let attempts = self.config.download_attempts.max(1);

        let mut attempt = 1;
        loop {
            match self.download_once(&url, destination).await {
                Ok(bytes) => {
                    info!(
                        task_id = %task_id,
                        artifact = %artifact,
                        path = %destination.display(),
                        bytes,
                        attempt,
                        "Artifact downloaded"
                    );
                    return Ok(());
                }
                Err(e) => {
                    discard_partial(destination).await;

                    if attempt >= attempts {
                        error!(
                            task_id = %task_id,
                            artifact = %artifact,
                            attempts,
                            error = %e,
                            "Artifact download failed"
                        );
                        return Err(ClientError::RetriesExhausted {
                            attempts,
                            last: Box::new(e),
                        });
                    }

                    warn!(
                        task_id = %task_id,
                        artifact = %artifact,
                        attempt,
                        status = ?e.status(),
                        error = %e,
                        "Artifact download attempt failed, retrying in {:?}",
                        self.config.retry_delay
                    );
                    self.delay.sleep(self.config.retry_delay).await;
                    attempt += 1;
                }
            }
        }
    }

    /// One attempt: stream the body to disk, then validate it.
    async fn download_once(&self, url: &str, destination: &Path) -> Result<u64, ClientError> {
        let mut response = self.http.get(url, &[]).await?;

        let mut file = tokio::fs::File::create(destination).await?;
        let mut written = 0u64;
        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;
        drop(file);

        let entries = verify_archive(destination).await?;
        debug!(path = %destination.display(), entries, "Archive is valid");
        Ok(written)
    }
}

/// Open `path` as a zip archive and return its entry count.
pub async fn verify_archive(path: &Path) -> Result<usize, ClientError> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || -> Result<usize, ClientError> {
        let file = std::fs::File::open(&path)?;
        let archive = zip::ZipArchive::new(file)?;
        Ok(archive.len())
    })
    .await
    .map_err(|e| ClientError::Io(io::Error::other(e)))?
}

async fn discard_partial(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => debug!(path = %path.display(), "Removed partial download"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove partial download"),
    }
}
