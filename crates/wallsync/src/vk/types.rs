use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fmt;

/// A wall post as returned by `wall.get`
#[derive(Debug, Clone, Deserialize)]
pub struct WallPost {
    pub id: i64,
    pub owner_id: i64,
    /// Unix time, seconds
    pub date: i64,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub attachments: Vec<RawAttachment>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WallPage {
    #[serde(default)]
    #[allow(dead_code)]
    pub count: i64,
    pub items: Vec<WallPost>,
}

/// An attachment is `{"type": "<tag>", "<tag>": {...payload...}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawAttachment {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

impl RawAttachment {
    /// Decode the object stored under the attachment's own tag.
    pub fn payload<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        let value = self.rest.get(&self.kind).cloned().unwrap_or(Value::Null);
        serde_json::from_value(value)
    }
}

#[derive(Debug, Deserialize)]
pub struct PhotoPayload {
    #[serde(default)]
    pub sizes: Vec<PhotoSize>,
}

#[derive(Debug, Deserialize)]
pub struct PhotoSize {
    pub url: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    #[serde(rename = "type", default)]
    pub size_type: String,
}

/// Shared shape of `audio`, `doc` and `link` payloads
#[derive(Debug, Deserialize)]
pub struct UrlPayload {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct VideoPayload {
    pub id: i64,
    pub owner_id: i64,
    #[serde(default)]
    pub access_key: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AlbumPayload {
    pub id: AlbumId,
    pub owner_id: i64,
}

/// Album ids are numeric, except for system albums ("wall", "profile", "saved").
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum AlbumId {
    Number(i64),
    Name(String),
}

impl fmt::Display for AlbumId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlbumId::Number(id) => write!(f, "{}", id),
            AlbumId::Name(name) => f.write_str(name),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PollPayload {
    pub question: String,
    #[serde(default)]
    pub answers: Vec<PollAnswer>,
    #[serde(default)]
    pub anonymous: bool,
    #[serde(default)]
    pub multiple: bool,
}

#[derive(Debug, Deserialize)]
pub struct PollAnswer {
    pub text: String,
}

/// Result of `utils.resolveScreenName`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResolvedTarget {
    #[serde(rename = "type")]
    pub kind: String,
    pub object_id: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VideoPage {
    #[serde(default)]
    pub items: Vec<VideoInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VideoInfo {
    #[serde(default)]
    pub player: Option<String>,
}
