use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

use crate::error::Result;
use crate::publication::Publication;
use crate::vk::{Target, VkClient, VkSource, DEFAULT_API_VERSION};

/// A feed of posts that can be polled by timestamp.
#[async_trait]
pub trait Source: Send + Sync {
    fn name(&self) -> &str;

    /// Publications for posts strictly newer than `after` (Unix seconds), in
    /// the provider's order.
    async fn fetch_since(&self, after: i64) -> Result<Vec<Publication>>;
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

/// Configured feed, keyed by source type
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SourceConfig {
    Vk {
        token: String,
        target: Target,
        #[serde(default = "default_api_version")]
        api_version: String,
    },
}

/// Construct the source described by `config`, resolving its target.
pub async fn build_source(config: SourceConfig) -> Result<Box<dyn Source>> {
    match config {
        SourceConfig::Vk {
            token,
            target,
            api_version,
        } => {
            let client = VkClient::with_version(token, api_version)?;
            let source = VkSource::connect(Arc::new(client), target).await?;
            Ok(Box::new(source))
        }
    }
}
