use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use url::Url;

use super::types::{ResolvedTarget, VideoInfo, VideoPage, WallPage, WallPost};
use crate::error::{Error, Result};

pub const API_BASE: &str = "https://api.vk.com/method";
pub const DEFAULT_API_VERSION: &str = "5.95";

/// The provider calls the wall source depends on.
#[async_trait]
pub trait VkApi: Send + Sync {
    /// `None` when the screen name does not exist.
    async fn resolve_screen_name(&self, screen_name: &str) -> Result<Option<ResolvedTarget>>;

    async fn wall_get(&self, owner_id: i64, count: u32, filter: &str) -> Result<Vec<WallPost>>;

    async fn video_get(
        &self,
        owner_id: i64,
        video_id: i64,
        access_key: Option<&str>,
    ) -> Result<Option<VideoInfo>>;
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    response: Option<T>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error_code: i64,
    error_msg: String,
}

impl<T> Envelope<T> {
    fn into_result(self) -> Result<T> {
        match (self.response, self.error) {
            (_, Some(error)) => Err(Error::Provider {
                code: error.error_code,
                message: error.error_msg,
            }),
            (Some(response), None) => Ok(response),
            (None, None) => Err(Error::Provider {
                code: 0,
                message: "response carries neither a result nor an error".to_string(),
            }),
        }
    }
}

pub struct VkClient {
    client: Client,
    access_token: String,
    api_version: String,
}

impl VkClient {
    pub fn new(access_token: String) -> Result<Self> {
        Self::with_version(access_token, DEFAULT_API_VERSION.to_string())
    }

    pub fn with_version(access_token: String, api_version: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            access_token,
            api_version,
        })
    }

    fn method_url(&self, method: &str, params: &[(&str, String)]) -> Result<Url> {
        let auth = [
            ("access_token", self.access_token.clone()),
            ("v", self.api_version.clone()),
        ];

        Url::parse_with_params(
            &format!("{}/{}", API_BASE, method),
            params.iter().chain(auth.iter()),
        )
        .map_err(|e| Error::InvalidConfiguration(format!("bad API url for {}: {}", method, e)))
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: &[(&str, String)]) -> Result<T> {
        let url = self.method_url(method, params)?;
        debug!(method, "calling VK API");

        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("unknown error"));
            return Err(Error::Provider {
                code: i64::from(status.as_u16()),
                message: error_text,
            });
        }

        response.json::<Envelope<T>>().await?.into_result()
    }
}

/// `utils.resolveScreenName` answers with an empty list when nothing matches.
fn parse_resolved(value: Value) -> Result<Option<ResolvedTarget>> {
    if value.get("type").is_none() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_value(value)?))
}

#[async_trait]
impl VkApi for VkClient {
    async fn resolve_screen_name(&self, screen_name: &str) -> Result<Option<ResolvedTarget>> {
        let value: Value = self
            .call("utils.resolveScreenName", &[("screen_name", screen_name.to_string())])
            .await?;
        parse_resolved(value)
    }

    async fn wall_get(&self, owner_id: i64, count: u32, filter: &str) -> Result<Vec<WallPost>> {
        let page: WallPage = self
            .call(
                "wall.get",
                &[
                    ("owner_id", owner_id.to_string()),
                    ("count", count.to_string()),
                    ("filter", filter.to_string()),
                ],
            )
            .await?;
        Ok(page.items)
    }

    async fn video_get(
        &self,
        owner_id: i64,
        video_id: i64,
        access_key: Option<&str>,
    ) -> Result<Option<VideoInfo>> {
        let mut videos = format!("{}_{}", owner_id, video_id);
        if let Some(key) = access_key {
            videos.push('_');
            videos.push_str(key);
        }

        let page: VideoPage = self
            .call(
                "video.get",
                &[("owner_id", owner_id.to_string()), ("videos", videos)],
            )
            .await?;
        Ok(page.items.into_iter().next())
    }
}
