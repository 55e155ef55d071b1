use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

use super::api::VkApi;
use super::normalize::Normalizer;
use super::owner::{Target, WallOwner};
use crate::error::{Error, Result};
use crate::publication::Publication;
use crate::source::Source;

/// Posts requested per `wall.get` call
pub const PAGE_SIZE: u32 = 100;
const WALL_FILTER: &str = "owner";

/// A VK wall, resolved once at construction.
pub struct VkSource {
    api: Arc<dyn VkApi>,
    owner: WallOwner,
}

impl VkSource {
    /// Resolve `target` and build the source. Fails with
    /// [`Error::InvalidConfiguration`] when the target does not exist or is
    /// neither a user nor a group.
    pub async fn connect(api: Arc<dyn VkApi>, target: Target) -> Result<Self> {
        let owner = match target {
            Target::Id(owner_id) => WallOwner::from_owner_id(owner_id)?,
            Target::ScreenName(name) => resolve(api.as_ref(), &name).await?,
        };

        info!(owner = %owner, "VK wall resolved");
        Ok(Self { api, owner })
    }

    pub fn owner(&self) -> WallOwner {
        self.owner
    }
}

async fn resolve(api: &dyn VkApi, screen_name: &str) -> Result<WallOwner> {
    let target = api
        .resolve_screen_name(screen_name)
        .await?
        .ok_or_else(|| Error::InvalidConfiguration(format!("target '{}' does not exist", screen_name)))?;

    match target.kind.as_str() {
        "user" => WallOwner::user(target.object_id),
        "group" => WallOwner::group(target.object_id),
        other => Err(Error::InvalidConfiguration(format!(
            "target '{}' must be a user or a group, not {}",
            screen_name, other
        ))),
    }
}

#[async_trait]
impl Source for VkSource {
    fn name(&self) -> &str {
        "vk"
    }

    async fn fetch_since(&self, after: i64) -> Result<Vec<Publication>> {
        let posts = self
            .api
            .wall_get(self.owner.owner_id(), PAGE_SIZE, WALL_FILTER)
            .await?;

        let fetched = posts.len();
        let fresh: Vec<_> = posts.into_iter().filter(|post| post.date > after).collect();

        // Only one page is read; anything older than its last post is not seen.
        if fetched >= PAGE_SIZE as usize && fresh.len() == fetched {
            warn!(
                owner = %self.owner,
                page = fetched,
                "every post on the page is new, older new posts may have been missed"
            );
        }
        info!(owner = %self.owner, fetched, new = fresh.len(), "wall page fetched");

        let normalizer = Normalizer::new(self.api.as_ref());
        let mut publications = Vec::with_capacity(fresh.len());
        for post in fresh {
            publications.push(normalizer.normalize(post).await);
        }

        Ok(publications)
    }
}
