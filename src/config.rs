//! Site and pipeline configuration.
//!
//! Everything is optional: an absent or empty `autopost.yaml` yields the
//! defaults below, so a checkout works out of the box and a deployment only
//! overrides what it needs. The API key is deliberately not part of this
//! file; it comes from the environment (see [`crate::cli`]).

use crate::error::{AutopostError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, instrument};

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_PATH: &str = "autopost.yaml";

/// Hero images live here, under `public_dir` on disk and under `/` on the web.
pub const HERO_IMAGE_SUBDIR: &str = "images/blog";

/// Social-share images live here, same mapping as [`HERO_IMAGE_SUBDIR`].
pub const OG_IMAGE_SUBDIR: &str = "images/og";

/// Runtime configuration, deserialized from YAML with per-field defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Public base URL of the site, used for feed links.
    #[serde(default = "default_site_url")]
    pub site_url: String,

    /// Channel title for the RSS feed.
    #[serde(default = "default_site_title")]
    pub site_title: String,

    /// Channel description for the RSS feed.
    #[serde(default = "default_site_description")]
    pub site_description: String,

    /// Root of the static-site content tree; posts land in `blog/` or
    /// `drafts/` beneath it.
    #[serde(default = "default_content_dir")]
    pub content_dir: PathBuf,

    /// Root of the statically served files; images and feeds land here.
    #[serde(default = "default_public_dir")]
    pub public_dir: PathBuf,

    /// Seed list location.
    #[serde(default = "default_seeds_path")]
    pub seeds_path: PathBuf,

    /// Rotation state location.
    #[serde(default = "default_state_path")]
    pub state_path: PathBuf,

    /// Base URL of the OpenAI-compatible API.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Model used for article text.
    #[serde(default = "default_chat_model")]
    pub chat_model: String,

    /// Model used for social-image backgrounds.
    #[serde(default = "default_image_model")]
    pub image_model: String,

    /// Sampling temperature for article text.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// User-Agent sent on page and image fetches.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Web path used when no hero image could be downloaded.
    #[serde(default = "default_placeholder_image")]
    pub placeholder_image: String,

    /// Font file for the social-image title overlay. When unset, a list of
    /// common system fonts is tried.
    #[serde(default)]
    pub og_font_path: Option<PathBuf>,

    /// Timeout for page and image downloads, in seconds.
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,

    /// Timeout for text/image generation calls, in seconds. Generation is
    /// slow; this mostly guards against a hung upstream.
    #[serde(default = "default_generation_timeout_secs")]
    pub generation_timeout_secs: u64,
}

impl Config {
    /// Load configuration from `path`, or from [`DEFAULT_CONFIG_PATH`] when
    /// present, or fall back to pure defaults. An explicitly given path must
    /// exist and parse; the implicit default file is allowed to be missing.
    #[instrument(level = "debug", skip_all)]
    pub async fn load(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
        };

        let raw = match fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if !required => {
                debug!(path = %path.display(), error = %e, "no config file; using defaults");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(AutopostError::Configuration(format!(
                    "could not read config file {}: {e}",
                    path.display()
                )));
            }
        };

        serde_yaml::from_str(&raw).map_err(|e| {
            AutopostError::Configuration(format!("invalid config file {}: {e}", path.display()))
        })
    }

    /// Directory hero images are written to.
    pub fn hero_image_dir(&self) -> PathBuf {
        self.public_dir.join(HERO_IMAGE_SUBDIR)
    }

    /// Directory social-share images are written to.
    pub fn og_image_dir(&self) -> PathBuf {
        self.public_dir.join(OG_IMAGE_SUBDIR)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            site_url: default_site_url(),
            site_title: default_site_title(),
            site_description: default_site_description(),
            content_dir: default_content_dir(),
            public_dir: default_public_dir(),
            seeds_path: default_seeds_path(),
            state_path: default_state_path(),
            api_base_url: default_api_base_url(),
            chat_model: default_chat_model(),
            image_model: default_image_model(),
            temperature: default_temperature(),
            user_agent: default_user_agent(),
            placeholder_image: default_placeholder_image(),
            og_font_path: None,
            http_timeout_secs: default_http_timeout_secs(),
            generation_timeout_secs: default_generation_timeout_secs(),
        }
    }
}

fn default_site_url() -> String {
    "https://example.com".to_string()
}

fn default_site_title() -> String {
    "Review Blog".to_string()
}

fn default_site_description() -> String {
    "Product reviews and buying guides".to_string()
}

fn default_content_dir() -> PathBuf {
    PathBuf::from("src/content")
}

fn default_public_dir() -> PathBuf {
    PathBuf::from("public")
}

fn default_seeds_path() -> PathBuf {
    PathBuf::from("seeds.json")
}

fn default_state_path() -> PathBuf {
    PathBuf::from("state.json")
}

fn default_api_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_chat_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_image_model() -> String {
    "gpt-image-1".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (autopost)".to_string()
}

fn default_placeholder_image() -> String {
    "/images/blog/defaults/default.svg".to_string()
}

fn default_http_timeout_secs() -> u64 {
    60
}

fn default_generation_timeout_secs() -> u64 {
    300
}
