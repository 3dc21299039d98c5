//! Text-Generation Client - Analyst Port Adapter
//!
//! Thin reqwest client for a generateContent-style text API. The
//! dashboard hands it the serialized data summary as system context
//! plus the user's question, and relays the answer text verbatim.
//! Prompting strategy and response rendering live with the caller.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::config::AiConfig;
use crate::ports::analyst::Analyst;

/// Environment variable holding the API key. The key never appears in
/// config files.
pub const API_KEY_ENV: &str = "TEXTGEN_API_KEY";

/// HTTP client for the external text-generation service.
pub struct TextGenClient {
    http: Client,
    api_url: String,
    model: String,
    api_key: String,
}

impl TextGenClient {
    /// Builds a client from config plus the `TEXTGEN_API_KEY` env var.
    ///
    /// Returns `Ok(None)` when the service is disabled or no key is
    /// set; the chat endpoint then reports itself unavailable instead
    /// of failing requests downstream.
    pub fn from_env(config: &AiConfig) -> Result<Option<Self>> {
        if !config.enabled {
            return Ok(None);
        }

        let Ok(api_key) = std::env::var(API_KEY_ENV) else {
            warn!(var = API_KEY_ENV, "No API key in environment, chat assistant disabled");
            return Ok(None);
        };
        if api_key.trim().is_empty() {
            return Ok(None);
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Some(Self {
            http,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
        }))
    }

    async fn generate(&self, system: &str, user: &str) -> Result<String> {
        let url = format!("{}/models/{}:generateContent", self.api_url, self.model);

        let body = json!({
            "system_instruction": { "parts": [{ "text": system }] },
            "contents": [{ "role": "user", "parts": [{ "text": user }] }],
        });

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .context("Text-generation request failed")?;

        let status = response.status();
        anyhow::ensure!(
            status.is_success(),
            "Text-generation service returned {status}"
        );

        let payload: Value = response
            .json()
            .await
            .context("Failed to parse text-generation response")?;

        let text = payload["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .context("Text-generation response contained no text")?;

        debug!(chars = text.len(), "Chat answer received");
        Ok(text.to_string())
    }
}

#[async_trait]
impl Analyst for TextGenClient {
    async fn analyze(&self, context: &str, question: &str) -> Result<String> {
        self.generate(context, question).await
    }

    async fn is_healthy(&self) -> bool {
        !self.api_key.is_empty()
    }
}
