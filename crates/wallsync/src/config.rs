use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::source::SourceConfig;
use crate::vk::{Target, DEFAULT_API_VERSION};

const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 60;
const DEFAULT_DOWNLOAD_CONCURRENCY: usize = 4;

#[derive(Debug, Clone)]
pub struct Config {
    pub vk_access_token: String,
    pub vk_target: Target,
    pub vk_api_version: String,
    pub download_timeout: Duration,
    pub download_concurrency: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Try to load .env from multiple locations
        Self::try_load_dotenv();

        let vk_access_token = env::var("VK_ACCESS_TOKEN").context(
            "VK_ACCESS_TOKEN not found.\n\n\
            To fix this, create ~/.config/wallsync/.env with:\n  \
            VK_ACCESS_TOKEN=your_token_here\n  \
            VK_TARGET=screen_name_or_owner_id\n\n\
            A service token can be created at: https://vk.com/apps?act=manage",
        )?;

        let vk_target = env::var("VK_TARGET")
            .context("VK_TARGET not found. Set it to a screen name (e.g. apiclub) or an owner id (e.g. -1)")?
            .parse::<Target>()
            .context("VK_TARGET is invalid")?;

        let vk_api_version =
            env::var("VK_API_VERSION").unwrap_or_else(|_| DEFAULT_API_VERSION.to_string());

        let timeout_secs = parse_or(
            "WALLSYNC_DOWNLOAD_TIMEOUT_SECS",
            env::var("WALLSYNC_DOWNLOAD_TIMEOUT_SECS").ok(),
            DEFAULT_DOWNLOAD_TIMEOUT_SECS,
        )?;

        let download_concurrency = parse_or(
            "WALLSYNC_DOWNLOAD_CONCURRENCY",
            env::var("WALLSYNC_DOWNLOAD_CONCURRENCY").ok(),
            DEFAULT_DOWNLOAD_CONCURRENCY,
        )?;

        Ok(Self {
            vk_access_token,
            vk_target,
            vk_api_version,
            download_timeout: Duration::from_secs(timeout_secs),
            download_concurrency,
        })
    }

    pub fn source_config(&self) -> SourceConfig {
        SourceConfig::Vk {
            token: self.vk_access_token.clone(),
            target: self.vk_target.clone(),
            api_version: self.vk_api_version.clone(),
        }
    }

    fn try_load_dotenv() {
        // 1. Current directory (for development)
        if dotenvy::dotenv().is_ok() {
            return;
        }

        // 2. ~/.config/wallsync/.env
        if let Some(config_dir) = dirs::config_dir() {
            let config_path = config_dir.join("wallsync").join(".env");
            if config_path.exists() && dotenvy::from_path(&config_path).is_ok() {
                return;
            }
        }

        // 3. ~/.env
        if let Some(home_dir) = dirs::home_dir() {
            let home_path = home_dir.join(".env");
            if home_path.exists() {
                let _ = dotenvy::from_path(&home_path);
            }
        }

        // Nothing found is fine, the variables may be set in the environment
    }
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(default),
        Some(value) => value
            .parse()
            .with_context(|| format!("{} has an invalid value: {}", key, value)),
    }
}
