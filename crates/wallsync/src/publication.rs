use serde::Serialize;

use crate::attachment::Attachment;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Poll {
    pub title: String,
    pub options: Vec<String>,
    pub anonymous: bool,
    pub multiple: bool,
}

/// One structured entry of a publication, in provider order
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Item {
    Attachment(Attachment),
    Poll(Poll),
}

/// A normalized post: plain text plus ordered structured items.
#[derive(Debug, Serialize)]
pub struct Publication {
    text: String,
    items: Vec<Item>,
}

impl Publication {
    /// A post that consists of a single poll whose question repeats the
    /// text gets an empty text.
    pub fn new(text: String, items: Vec<Item>) -> Self {
        let text = match items.as_slice() {
            [Item::Poll(poll)] if poll.title == text => String::new(),
            _ => text,
        };

        Self { text, items }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn attachments(&self) -> impl Iterator<Item = &Attachment> {
        self.items.iter().filter_map(|item| match item {
            Item::Attachment(attachment) => Some(attachment),
            Item::Poll(_) => None,
        })
    }

    pub fn polls(&self) -> impl Iterator<Item = &Poll> {
        self.items.iter().filter_map(|item| match item {
            Item::Poll(poll) => Some(poll),
            Item::Attachment(_) => None,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.items.is_empty()
    }
}
