// Public modules
pub mod attachment;
pub mod config;
pub mod download;
pub mod error;
pub mod publication;
pub mod source;
pub mod vk;

// Re-export commonly used types
pub use attachment::{Attachment, AttachmentKind};
pub use config::Config;
pub use download::{prefetch, Downloader, HttpDownloader};
pub use error::{Error, Result};
pub use publication::{Item, Poll, Publication};
pub use source::{build_source, Source, SourceConfig};
pub use vk::{OwnerKind, Target, VkApi, VkClient, VkSource, WallOwner};
