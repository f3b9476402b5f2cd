//! Application configuration management.
//!
//! This module handles loading and saving the client configuration: the API
//! base URL, the endpoint table, paging and timeout settings, the token
//! storage backend and the last email used to log in.
//!
//! Configuration is stored at `~/.config/postboard/config.json`.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Application name used for config/data directory paths
pub const APP_NAME: &str = "postboard";

/// Config file name
const CONFIG_FILE: &str = "config.json";

const DEFAULT_API_BASE_URL: &str = "http://localhost:8080";

/// Page size used by list endpoints when none is configured.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// HTTP request timeout in seconds.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

const ENV_API_URL: &str = "POSTBOARD_API_URL";
const ENV_PAGE_SIZE: &str = "POSTBOARD_PAGE_SIZE";

/// Where the access token is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TokenBackend {
    #[default]
    File,
    Keyring,
}

/// Endpoint table, relative to `api_base_url` unless given as an absolute URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub login: String,
    pub signup: String,
    pub logout: String,
    pub posts: String,
    pub images: String,
    pub member_me: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            login: "/login".to_string(),
            signup: "/api/v1/members".to_string(),
            logout: "/logout".to_string(),
            posts: "/api/v1/posts".to_string(),
            images: "/api/v1/images".to_string(),
            member_me: "/api/v1/members/me".to_string(),
        }
    }
}

impl Endpoints {
    pub fn post(&self, post_id: i64) -> String {
        format!("{}/{}", self.posts, post_id)
    }

    pub fn likes(&self, post_id: i64) -> String {
        format!("{}/{}/likes", self.posts, post_id)
    }

    pub fn comments(&self, post_id: i64) -> String {
        format!("{}/{}/comments", self.posts, post_id)
    }

    pub fn comment(&self, post_id: i64, comment_id: i64) -> String {
        format!("{}/{}/comments/{}", self.posts, post_id, comment_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    pub page_size: u32,
    pub request_timeout_secs: u64,
    /// Upper bound for one feed page fetch; unset means no deadline.
    pub feed_deadline_secs: Option<u64>,
    pub token_backend: TokenBackend,
    pub endpoints: Endpoints,
    pub last_email: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            feed_deadline_secs: None,
            token_backend: TokenBackend::default(),
            endpoints: Endpoints::default(),
            last_email: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            serde_json::from_str(&contents)?
        } else {
            Self::default()
        };
        config.apply_env();
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Override file settings with `POSTBOARD_*` environment variables
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(ENV_API_URL) {
            if !url.trim().is_empty() {
                self.api_base_url = url.trim().to_string();
            }
        }
        if let Ok(size) = std::env::var(ENV_PAGE_SIZE) {
            match size.trim().parse::<u32>() {
                Ok(size) => self.page_size = size,
                Err(e) => warn!(value = %size, error = %e, "Ignoring invalid page size override"),
            }
        }
    }

    /// Page size for list requests; never zero.
    pub fn effective_page_size(&self) -> u32 {
        if self.page_size == 0 {
            DEFAULT_PAGE_SIZE
        } else {
            self.page_size
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn feed_deadline(&self) -> Option<Duration> {
        self.feed_deadline_secs.map(Duration::from_secs)
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory holding the persisted session
    pub fn data_dir(&self) -> Result<PathBuf> {
        let data_dir = dirs::data_local_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_backend() {
        let config = Config::default();
        assert_eq!(config.api_base_url, "http://localhost:8080");
        assert_eq!(config.effective_page_size(), 20);
        assert_eq!(config.endpoints.login, "/login");
        assert_eq!(config.endpoints.signup, "/api/v1/members");
        assert_eq!(config.token_backend, TokenBackend::File);
    }

    #[test]
    fn test_zero_page_size_falls_back() {
        let config = Config {
            page_size: 0,
            ..Config::default()
        };
        assert_eq!(config.effective_page_size(), DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_partial_config_file_keeps_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"api_base_url": "https://api.example.com", "token_backend": "keyring"}"#)
                .expect("Failed to parse partial config");
        assert_eq!(config.api_base_url, "https://api.example.com");
        assert_eq!(config.token_backend, TokenBackend::Keyring);
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(config.endpoints, Endpoints::default());
    }

    #[test]
    fn test_endpoint_paths() {
        let endpoints = Endpoints::default();
        assert_eq!(endpoints.post(7), "/api/v1/posts/7");
        assert_eq!(endpoints.likes(7), "/api/v1/posts/7/likes");
        assert_eq!(endpoints.comments(7), "/api/v1/posts/7/comments");
        assert_eq!(endpoints.comment(7, 3), "/api/v1/posts/7/comments/3");
    }
}
