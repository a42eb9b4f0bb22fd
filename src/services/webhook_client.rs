use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::error::{ResearchError, Result};

const MAX_ERROR_BODY: usize = 300;

/// Outbound POST to an automation webhook.
#[async_trait]
pub trait WebhookClient: Send + Sync + 'static {
    /// Returns the decoded JSON body, `Value::Null` for an empty 2xx body.
    async fn post_json(&self, url: &str, payload: &Value) -> Result<Value>;
}

pub struct HttpWebhookClient {
    client: Client,
}

impl HttpWebhookClient {
    pub fn new(timeout: Duration) -> std::result::Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(HttpWebhookClient { client })
    }
}

#[async_trait]
impl WebhookClient for HttpWebhookClient {
    async fn post_json(&self, url: &str, payload: &Value) -> Result<Value> {
        let response = self.client.post(url).json(payload).send().await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let snippet: String = body.chars().take(MAX_ERROR_BODY).collect();
            return Err(ResearchError::UpstreamFailure(format!(
                "webhook returned {}: {}",
                status, snippet
            )));
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&body).map_err(|e| {
            ResearchError::UpstreamFailure(format!("webhook returned malformed JSON: {}", e))
        })
    }
}
