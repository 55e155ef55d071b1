//! VK wall source

pub mod api;
pub mod normalize;
pub mod owner;
pub mod source;
pub mod types;

pub use api::{VkApi, VkClient, DEFAULT_API_VERSION};
pub use normalize::{permalink, Classified, Normalizer};
pub use owner::{OwnerKind, Target, WallOwner};
pub use source::VkSource;
pub use types::{RawAttachment, ResolvedTarget, VideoInfo, WallPost};

#[cfg(test)]
pub(crate) mod testing {
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::*;
    use crate::error::Result;

    /// Canned provider answers plus a record of what was asked.
    #[derive(Default)]
    pub struct StubApi {
        targets: HashMap<String, ResolvedTarget>,
        posts: Vec<WallPost>,
        players: HashMap<(i64, i64), String>,
        resolve_calls: AtomicUsize,
        wall_requests: Mutex<Vec<(i64, u32, String)>>,
        video_keys: Mutex<Vec<Option<String>>>,
    }

    impl StubApi {
        pub fn with_target(mut self, screen_name: &str, kind: &str, object_id: u64) -> Self {
            self.targets.insert(
                screen_name.to_string(),
                ResolvedTarget {
                    kind: kind.to_string(),
                    object_id,
                },
            );
            self
        }

        pub fn with_posts(mut self, posts: Vec<serde_json::Value>) -> Self {
            self.posts = posts
                .into_iter()
                .map(|post| serde_json::from_value(post).unwrap())
                .collect();
            self
        }

        pub fn with_video(mut self, owner_id: i64, video_id: i64, player: &str) -> Self {
            self.players.insert((owner_id, video_id), player.to_string());
            self
        }

        pub fn resolve_calls(&self) -> usize {
            self.resolve_calls.load(Ordering::SeqCst)
        }

        pub fn wall_requests(&self) -> Vec<(i64, u32, String)> {
            self.wall_requests.lock().unwrap().clone()
        }

        pub fn video_keys(&self) -> Vec<Option<String>> {
            self.video_keys.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl VkApi for StubApi {
        async fn resolve_screen_name(&self, screen_name: &str) -> Result<Option<ResolvedTarget>> {
            self.resolve_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.targets.get(screen_name).cloned())
        }

        async fn wall_get(&self, owner_id: i64, count: u32, filter: &str) -> Result<Vec<WallPost>> {
            self.wall_requests
                .lock()
                .unwrap()
                .push((owner_id, count, filter.to_string()));
            Ok(self.posts.clone())
        }

        async fn video_get(
            &self,
            owner_id: i64,
            video_id: i64,
            access_key: Option<&str>,
        ) -> Result<Option<VideoInfo>> {
            self.video_keys
                .lock()
                .unwrap()
                .push(access_key.map(str::to_string));
            Ok(self
                .players
                .get(&(owner_id, video_id))
                .map(|player| VideoInfo {
                    player: Some(player.clone()),
                }))
        }
    }
}
