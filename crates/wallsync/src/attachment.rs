use serde::Serialize;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::download::Downloader;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentKind {
    Picture,
    Audio,
    Video,
    GenericFile,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum Origin {
    Link(String),
    Path(PathBuf),
}

/// A piece of media that is either remote (a link) or already on disk.
///
/// Remote bytes are fetched lazily on the first call to [`Attachment::as_local_path`]
/// or [`Attachment::as_handle`] and cached in a temporary file that lives as long
/// as the attachment. Concurrent callers share a single download.
#[derive(Debug, Serialize)]
pub struct Attachment {
    kind: AttachmentKind,
    #[serde(flatten)]
    origin: Origin,
    #[serde(skip)]
    local: OnceCell<NamedTempFile>,
}

impl Attachment {
    /// Build an attachment from exactly one of `link` or `path`.
    pub fn new(kind: AttachmentKind, link: Option<String>, path: Option<PathBuf>) -> Result<Self> {
        let link = link.filter(|l| !l.is_empty());
        let path = path.filter(|p| !p.as_os_str().is_empty());

        let origin = match (link, path) {
            (Some(link), None) => Origin::Link(link),
            (None, Some(path)) => Origin::Path(path),
            (Some(_), Some(_)) => {
                return Err(Error::InvalidAttachment(
                    "expected a link or a path, got both".to_string(),
                ))
            }
            (None, None) => {
                return Err(Error::InvalidAttachment(
                    "expected a link or a path, got neither".to_string(),
                ))
            }
        };

        Ok(Self {
            kind,
            origin,
            local: OnceCell::new(),
        })
    }

    pub fn from_link(kind: AttachmentKind, link: impl Into<String>) -> Result<Self> {
        Self::new(kind, Some(link.into()), None)
    }

    pub fn from_path(kind: AttachmentKind, path: impl Into<PathBuf>) -> Result<Self> {
        Self::new(kind, None, Some(path.into()))
    }

    pub fn kind(&self) -> AttachmentKind {
        self.kind
    }

    /// The remote URL, if this attachment was built from one.
    pub fn as_link(&self) -> Option<&str> {
        match &self.origin {
            Origin::Link(link) => Some(link),
            Origin::Path(_) => None,
        }
    }

    /// True when the bytes can be read without touching the network.
    pub fn is_materialized(&self) -> bool {
        match self.origin {
            Origin::Path(_) => true,
            Origin::Link(_) => self.local.initialized(),
        }
    }

    /// Path to the bytes on disk, downloading them on first use.
    pub async fn as_local_path(&self, downloader: &dyn Downloader) -> Result<PathBuf> {
        self.ensure_materialized(downloader)
            .await
            .map(Path::to_path_buf)
    }

    /// A fresh read handle over the bytes, downloading them on first use.
    pub async fn as_handle(&self, downloader: &dyn Downloader) -> Result<tokio::fs::File> {
        let path = self.ensure_materialized(downloader).await?;
        Ok(tokio::fs::File::open(path).await?)
    }

    async fn ensure_materialized(&self, downloader: &dyn Downloader) -> Result<&Path> {
        let link = match &self.origin {
            Origin::Path(path) => return Ok(path.as_path()),
            Origin::Link(link) => link,
        };

        let file = self
            .local
            .get_or_try_init(|| async {
                let file = NamedTempFile::new().map_err(|e| Error::fetch_failed(link, e))?;
                let size = downloader.download(link, file.path()).await?;
                debug!(link = %link, bytes = size, path = %file.path().display(), "attachment downloaded");
                Ok::<_, Error>(file)
            })
            .await?;

        Ok(file.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::download::testing::StubDownloader;
    use std::sync::atomic::Ordering;
    use tokio::io::AsyncReadExt;

    #[test]
    fn test_new_requires_exactly_one_origin() {
        assert!(Attachment::new(AttachmentKind::Picture, None, None).is_err());
        assert!(Attachment::new(
            AttachmentKind::Picture,
            Some("https://x/1.jpg".to_string()),
            Some(PathBuf::from("/tmp/1.jpg"))
        )
        .is_err());
        assert!(Attachment::new(AttachmentKind::Picture, Some("https://x/1.jpg".to_string()), None).is_ok());
        assert!(Attachment::new(AttachmentKind::Audio, None, Some(PathBuf::from("/tmp/1.mp3"))).is_ok());
    }

    #[test]
    fn test_empty_link_counts_as_missing() {
        let err = Attachment::new(AttachmentKind::GenericFile, Some(String::new()), None).unwrap_err();
        assert!(matches!(err, Error::InvalidAttachment(_)));
    }

    #[test]
    fn test_shorthand_constructors_reject_empty_origin() {
        assert!(matches!(
            Attachment::from_link(AttachmentKind::Picture, ""),
            Err(Error::InvalidAttachment(_))
        ));
        assert!(matches!(
            Attachment::from_path(AttachmentKind::Picture, ""),
            Err(Error::InvalidAttachment(_))
        ));
    }

    #[test]
    fn test_as_link() {
        let remote = Attachment::from_link(AttachmentKind::Picture, "https://x/1.jpg").unwrap();
        assert_eq!(remote.as_link(), Some("https://x/1.jpg"));

        let local = Attachment::from_path(AttachmentKind::Picture, "/tmp/1.jpg").unwrap();
        assert_eq!(local.as_link(), None);
        assert!(local.is_materialized());
    }

    #[tokio::test]
    async fn test_handle_twice_downloads_once() {
        let downloader = StubDownloader::new(b"picture bytes");
        let attachment = Attachment::from_link(AttachmentKind::Picture, "https://x/1.jpg").unwrap();
        assert!(!attachment.is_materialized());

        for _ in 0..2 {
            let mut handle = attachment.as_handle(&downloader).await.unwrap();
            let mut content = Vec::new();
            handle.read_to_end(&mut content).await.unwrap();
            assert_eq!(content, b"picture bytes");
        }

        assert_eq!(downloader.calls.load(Ordering::SeqCst), 1);
        assert!(attachment.is_materialized());
    }

    #[tokio::test]
    async fn test_path_and_handle_share_one_download() {
        let downloader = StubDownloader::new(b"abc");
        let attachment = Attachment::from_link(AttachmentKind::Audio, "https://x/a.mp3").unwrap();

        let first = attachment.as_local_path(&downloader).await.unwrap();
        let _handle = attachment.as_handle(&downloader).await.unwrap();
        let second = attachment.as_local_path(&downloader).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(std::fs::read(&first).unwrap(), b"abc");
        assert_eq!(downloader.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_concurrent_access_is_single_flight() {
        let downloader = StubDownloader::new(b"video");
        let attachment = Attachment::from_link(AttachmentKind::Video, "https://x/v.mp4").unwrap();

        let (a, b, c) = tokio::join!(
            attachment.as_local_path(&downloader),
            attachment.as_handle(&downloader),
            attachment.as_local_path(&downloader),
        );
        assert!(a.is_ok() && b.is_ok() && c.is_ok());
        assert_eq!(downloader.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_local_path_never_downloads() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), b"on disk").unwrap();

        let downloader = StubDownloader::new(b"unused");
        let attachment = Attachment::from_path(AttachmentKind::GenericFile, file.path()).unwrap();

        assert_eq!(
            attachment.as_local_path(&downloader).await.unwrap(),
            file.path().to_path_buf()
        );
        let mut content = String::new();
        attachment
            .as_handle(&downloader)
            .await
            .unwrap()
            .read_to_string(&mut content)
            .await
            .unwrap();
        assert_eq!(content, "on disk");
        assert_eq!(downloader.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failed_download_reports_link() {
        let downloader = StubDownloader::failing();
        let attachment = Attachment::from_link(AttachmentKind::Picture, "https://x/broken.jpg").unwrap();

        match attachment.as_handle(&downloader).await {
            Err(Error::FetchFailed { link, .. }) => assert_eq!(link, "https://x/broken.jpg"),
            other => panic!("expected FetchFailed, got {:?}", other),
        }
        assert!(!attachment.is_materialized());
        assert_eq!(downloader.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_temp_file_removed_on_drop() {
        let downloader = StubDownloader::new(b"tmp");
        let attachment = Attachment::from_link(AttachmentKind::Picture, "https://x/1.jpg").unwrap();
        let path = attachment.as_local_path(&downloader).await.unwrap();
        assert!(path.exists());

        drop(attachment);
        assert!(!path.exists());
    }

    #[test]
    fn test_serializes_origin_without_cache() {
        let remote = Attachment::from_link(AttachmentKind::GenericFile, "https://x/doc.pdf").unwrap();
        let json = serde_json::to_value(&remote).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"kind": "generic_file", "link": "https://x/doc.pdf"})
        );
    }
}
