use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::warn;

use crate::error::{Error, Result};
use crate::publication::Publication;

/// Transfers remote attachment bytes to a local file.
#[async_trait]
pub trait Downloader: Send + Sync {
    /// Write the body behind `url` into `dest`, returning the number of bytes written.
    async fn download(&self, url: &str, dest: &Path) -> Result<u64>;
}

pub struct HttpDownloader {
    client: Client,
}

impl HttpDownloader {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("wallsync/0.1")
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Downloader for HttpDownloader {
    async fn download(&self, url: &str, dest: &Path) -> Result<u64> {
        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::fetch_failed(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::fetch_failed(url, format!("HTTP {}", status)));
        }

        let mut file = tokio::fs::File::create(dest)
            .await
            .map_err(|e| Error::fetch_failed(url, e))?;
        let mut written = 0u64;

        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| Error::fetch_failed(url, e))?
        {
            file.write_all(&chunk)
                .await
                .map_err(|e| Error::fetch_failed(url, e))?;
            written += chunk.len() as u64;
        }
        file.flush().await.map_err(|e| Error::fetch_failed(url, e))?;

        Ok(written)
    }
}

/// Materialize every remote attachment of `publications`, at most `concurrency` at a time.
///
/// Failures are reported per link and do not stop the remaining downloads.
pub async fn prefetch(
    publications: &[Publication],
    downloader: &dyn Downloader,
    concurrency: usize,
) -> Vec<(String, Result<PathBuf>)> {
    let pending = publications
        .iter()
        .flat_map(|publication| publication.attachments())
        .filter_map(|attachment| attachment.as_link().map(|link| (link.to_string(), attachment)));

    stream::iter(pending)
        .map(|(link, attachment)| async move {
            let outcome = attachment.as_local_path(downloader).await;
            if let Err(e) = &outcome {
                warn!(link = %link, error = %e, "attachment prefetch failed");
            }
            (link, outcome)
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await
}
