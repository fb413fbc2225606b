//! OpenAI-compatible API client for text and image generation.
//!
//! Plain reqwest against the `chat/completions` and `images/generations`
//! endpoints. The [`Generation`] trait is the seam the pipeline is generic
//! over, so tests drive it with stubs instead of the network. There is no
//! retry layer: a failed text call fails the run, and a failed image call
//! only downgrades the post.

use crate::config::Config;
use crate::error::{AutopostError, Result};
use crate::utils::truncate_chars;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, instrument};

/// Text and image generation seam.
pub trait Generation {
    /// Send a system+user message pair and return the assistant text.
    ///
    /// `Ok` with an empty string means the service answered but produced no
    /// content; callers decide whether that is acceptable.
    async fn chat(&self, system: &str, user: &str) -> Result<String>;

    /// Request one image; `Ok(None)` when the service responded without a
    /// payload.
    async fn generate_image(&self, prompt: &str, size: &str) -> Result<Option<String>>;
}

/// Live client for an OpenAI-compatible API.
pub struct OpenAiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    chat_model: String,
    image_model: String,
    temperature: f32,
}

impl OpenAiClient {
    /// Build the client from config plus the credential.
    pub fn new(cfg: &Config, api_key: String) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.generation_timeout_secs))
            .build()
            .map_err(|e| {
                AutopostError::Configuration(format!("could not build the API client: {e}"))
            })?;

        Ok(Self {
            http,
            base_url: cfg.api_base_url.trim_end_matches('/').to_string(),
            api_key,
            chat_model: cfg.chat_model.clone(),
            image_model: cfg.image_model.clone(),
            temperature: cfg.temperature,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Default, Deserialize)]
struct ChatChoice {
    #[serde(default)]
    message: ChatMessage,
}

#[derive(Debug, Default, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatResponse {
    /// Assistant text of the first choice; empty when the shape is off.
    fn content(self) -> String {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    #[serde(default)]
    data: Vec<ImageDatum>,
}

#[derive(Debug, Default, Deserialize)]
struct ImageDatum {
    #[serde(default)]
    b64_json: Option<String>,
}

impl Generation for OpenAiClient {
    #[instrument(level = "info", skip_all)]
    async fn chat(&self, system: &str, user: &str) -> Result<String> {
        let body = json!({
            "model": self.chat_model,
            "temperature": self.temperature,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": user},
            ],
        });

        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AutopostError::Generation(format!("chat request failed: {e}")))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(AutopostError::Generation(
                "chat endpoint rejected the API key (401)".to_string(),
            ));
        }
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AutopostError::Generation(format!(
                "chat endpoint returned {status}: {}",
                truncate_chars(&detail, 300)
            )));
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            AutopostError::Generation(format!("chat response was not valid JSON: {e}"))
        })?;
        let content = parsed.content();
        debug!(chars = content.chars().count(), "chat completion received");
        Ok(content)
    }

    #[instrument(level = "info", skip_all)]
    async fn generate_image(&self, prompt: &str, size: &str) -> Result<Option<String>> {
        let body = json!({
            "model": self.image_model,
            "prompt": prompt,
            "size": size,
        });

        let url = format!("{}/images/generations", self.base_url);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AutopostError::SoftImage(format!("image request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AutopostError::SoftImage(format!(
                "image endpoint returned {status}: {}",
                truncate_chars(&detail, 300)
            )));
        }

        let parsed: ImageResponse = response.json().await.map_err(|e| {
            AutopostError::SoftImage(format!("image response was not valid JSON: {e}"))
        })?;
        let payload = parsed.data.into_iter().next().and_then(|d| d.b64_json);
        debug!(present = payload.is_some(), "image payload received");
        Ok(payload)
    }
}
