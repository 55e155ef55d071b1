//! Turning raw wall posts into [`Publication`]s.
//!
//! Every attachment ends up as exactly one of: a structured item, a line of
//! text appended to the post (video, link, album), or a line pointing at the
//! original post when the type is unknown or its payload could not be read.
//! A broken attachment never fails the post.

use anyhow::{Context, Result};
use tracing::{debug, warn};

use super::api::VkApi;
use super::types::{
    AlbumPayload, PhotoPayload, PollPayload, RawAttachment, UrlPayload, VideoInfo, VideoPayload,
    WallPost,
};
use crate::attachment::{Attachment, AttachmentKind};
use crate::publication::{Item, Poll, Publication};

pub const VK_BASE: &str = "https://vk.com";

/// What a single attachment turns into
#[derive(Debug)]
pub enum Classified {
    Structured(Item),
    AppendText(String),
    Unsupported(String),
    /// A known type whose payload could not be decoded
    Unreadable(String),
}

pub fn permalink(owner_id: i64, post_id: i64) -> String {
    format!("{}/wall{}_{}", VK_BASE, owner_id, post_id)
}

pub fn unsupported_line(kind: &str, owner_id: i64, post_id: i64) -> String {
    format!(
        "Unsupported attachment type '{}'. You may want look to original: {}",
        kind,
        permalink(owner_id, post_id)
    )
}

pub fn unreadable_line(kind: &str, owner_id: i64, post_id: i64) -> String {
    format!(
        "Attachment of type '{}' could not be read. You may want look to original: {}",
        kind,
        permalink(owner_id, post_id)
    )
}

fn add_line(text: &mut String, line: &str) {
    text.push('\n');
    text.push_str(line);
}

fn remote(kind: AttachmentKind, url: String) -> Result<Classified> {
    let attachment = Attachment::from_link(kind, url)?;
    Ok(Classified::Structured(Item::Attachment(attachment)))
}

pub struct Normalizer<'a> {
    api: &'a dyn VkApi,
}

impl<'a> Normalizer<'a> {
    pub fn new(api: &'a dyn VkApi) -> Self {
        Self { api }
    }

    pub async fn normalize(&self, post: WallPost) -> Publication {
        let mut text = post.text;
        let mut items = Vec::new();

        for raw in &post.attachments {
            match self.classify(raw).await {
                Classified::Structured(item) => items.push(item),
                Classified::AppendText(line) => add_line(&mut text, &line),
                Classified::Unsupported(kind) => {
                    add_line(&mut text, &unsupported_line(&kind, post.owner_id, post.id))
                }
                Classified::Unreadable(kind) => {
                    add_line(&mut text, &unreadable_line(&kind, post.owner_id, post.id))
                }
            }
        }

        Publication::new(text, items)
    }

    pub async fn classify(&self, raw: &RawAttachment) -> Classified {
        let outcome = match raw.kind.as_str() {
            "photo" => Self::photo(raw),
            "audio" => raw
                .payload::<UrlPayload>()
                .context("bad audio payload")
                .and_then(|audio| remote(AttachmentKind::Audio, audio.url)),
            "doc" => raw
                .payload::<UrlPayload>()
                .context("bad doc payload")
                .and_then(|doc| remote(AttachmentKind::GenericFile, doc.url)),
            "video" => self.video(raw).await,
            "link" => raw
                .payload::<UrlPayload>()
                .context("bad link payload")
                .map(|link| Classified::AppendText(link.url)),
            "album" => raw
                .payload::<AlbumPayload>()
                .context("bad album payload")
                .map(|album| {
                    Classified::AppendText(format!("{}/album{}_{}", VK_BASE, album.owner_id, album.id))
                }),
            "poll" => Self::poll(raw),
            _ => Ok(Classified::Unsupported(raw.kind.clone())),
        };

        let classified = outcome.unwrap_or_else(|e| {
            let reason = format!("{:#}", e);
            warn!(kind = %raw.kind, error = %reason, "attachment degraded to text");
            Classified::Unreadable(raw.kind.clone())
        });
        debug!(kind = %raw.kind, outcome = ?classified, "attachment classified");
        classified
    }

    fn photo(raw: &RawAttachment) -> Result<Classified> {
        let photo: PhotoPayload = raw.payload().context("bad photo payload")?;
        // sizes are listed smallest first
        let largest = photo
            .sizes
            .into_iter()
            .last()
            .context("photo has no sizes")?;
        remote(AttachmentKind::Picture, largest.url)
    }

    fn poll(raw: &RawAttachment) -> Result<Classified> {
        let poll: PollPayload = raw.payload().context("bad poll payload")?;
        Ok(Classified::Structured(Item::Poll(Poll {
            title: poll.question,
            options: poll.answers.into_iter().map(|a| a.text).collect(),
            anonymous: poll.anonymous,
            multiple: poll.multiple,
        })))
    }

    async fn video(&self, raw: &RawAttachment) -> Result<Classified> {
        let video: VideoPayload = raw.payload().context("bad video payload")?;
        let fallback = format!("{}/video{}_{}", VK_BASE, video.owner_id, video.id);

        let player = match self
            .api
            .video_get(video.owner_id, video.id, video.access_key.as_deref())
            .await
        {
            Ok(Some(VideoInfo {
                player: Some(player),
            })) if !player.is_empty() => player,
            Ok(_) => {
                warn!(video = %fallback, "video has no player url");
                fallback
            }
            Err(e) => {
                warn!(video = %fallback, error = %e, "video lookup failed");
                fallback
            }
        };

        Ok(Classified::AppendText(player))
    }
}
