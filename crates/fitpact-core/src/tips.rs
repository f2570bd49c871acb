//! AI coach-tip generation.
//!
//! Thin client for a generative-language API. This is the only call in the
//! system with meaningful latency, so it carries its own timeout and fails
//! closed: any error (missing key, timeout, HTTP failure, malformed body)
//! degrades to a fixed fallback string. No retry, and nothing here ever
//! propagates an error into the rest of the state refresh.

use reqwest::Client;
use serde_json::json;
use std::time::Duration;

use crate::storage::config::TipsConfig;

/// Returned whenever tip generation fails for any reason.
pub const FALLBACK_TIP: &str = "Failed to generate a tip. Keep up the great work!";

/// Client for the motivational-tip endpoint.
pub struct TipGenerator {
    client: Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl TipGenerator {
    /// Build from config; the FITPACT_API_KEY environment variable overrides
    /// the configured key.
    pub fn new(cfg: &TipsConfig) -> Self {
        let api_key = std::env::var("FITPACT_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
            .or_else(|| cfg.api_key.clone());
        Self {
            client: Client::new(),
            endpoint: cfg.endpoint.trim_end_matches('/').to_string(),
            model: cfg.model.clone(),
            api_key,
            timeout: Duration::from_secs(cfg.timeout_secs),
        }
    }

    /// Generate a short motivational tip about `topic`.
    ///
    /// Never fails: any error yields [`FALLBACK_TIP`].
    pub async fn generate_motivational_tip(&self, topic: &str) -> String {
        match tokio::time::timeout(self.timeout, self.request_tip(topic)).await {
            Ok(Ok(tip)) if !tip.trim().is_empty() => tip.trim().to_string(),
            _ => FALLBACK_TIP.to_string(),
        }
    }

    async fn request_tip(
        &self,
        topic: &str,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        let key = self.api_key.as_deref().ok_or("no API key configured")?;
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={key}",
            self.endpoint, self.model
        );

        let prompt = format!(
            "Generate a short, motivational, and encouraging tip for a group of \
             friends doing a fitness challenge. The tip should be related to: \
             \"{topic}\". Keep it concise, under 40 words, and positive. Address \
             the group as \"team\" or \"everyone\"."
        );
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "temperature": 0.8,
                "topK": 40,
                "topP": 0.95,
            }
        });

        let resp = self.client.post(&url).json(&body).send().await?;
        if !resp.status().is_success() {
            let status = resp.status();
            return Err(format!("tip endpoint error: HTTP {status}").into());
        }

        let value: serde_json::Value = resp.json().await?;
        let text = value
            .pointer("/candidates/0/content/parts/0/text")
            .and_then(|v| v.as_str())
            .ok_or("malformed tip response")?;
        Ok(text.to_string())
    }
}
