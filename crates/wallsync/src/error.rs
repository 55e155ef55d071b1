//! Error types shared by sources and attachments

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The configured target cannot be resolved or is of an unsupported kind
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// An attachment was built with both or neither of link and path
    #[error("Invalid attachment: {0}")]
    InvalidAttachment(String),

    /// Downloading attachment bytes failed
    #[error("Failed to fetch {link}: {reason}")]
    FetchFailed { link: String, reason: String },

    /// The provider answered with an error object
    #[error("Provider error {code}: {message}")]
    Provider { code: i64, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn fetch_failed(link: &str, reason: impl ToString) -> Self {
        Error::FetchFailed {
            link: link.to_string(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
