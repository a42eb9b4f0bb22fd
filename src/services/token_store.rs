use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::{
    configuration::StorageSettings,
    error::{ResearchError, Result},
};

const DROPBOX_TOKEN_URL: &str = "https://api.dropboxapi.com/oauth2/token";
const EXPIRY_SKEW_SECONDS: i64 = 60;

#[derive(Debug, Clone, PartialEq)]
pub struct AccessToken {
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    /// A token is usable until `EXPIRY_SKEW_SECONDS` before it actually expires.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(EXPIRY_SKEW_SECONDS) < self.expires_at
    }
}

#[async_trait]
pub trait TokenRefresher: Send + Sync + 'static {
    async fn refresh(&self) -> Result<AccessToken>;
}

/// What the status endpoint may reveal about the cached credential.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenStatus {
    pub configured: bool,
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Caches one access token and refreshes it on demand. Concurrent callers share a
/// single refresh because the lock is held across it.
pub struct TokenStore<R: TokenRefresher> {
    refresher: R,
    cached: Mutex<Option<AccessToken>>,
}

impl<R: TokenRefresher> TokenStore<R> {
    pub fn new(refresher: R) -> Self {
        TokenStore {
            refresher,
            cached: Mutex::new(None),
        }
    }

    pub async fn get(&self) -> Result<AccessToken> {
        self.get_at(Utc::now()).await
    }

    pub async fn get_at(&self, now: DateTime<Utc>) -> Result<AccessToken> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref().filter(|t| t.is_valid_at(now)) {
            return Ok(token.clone());
        }

        log::info!("Access token missing or expiring, refreshing");
        let token = self.refresher.refresh().await?;
        *cached = Some(token.clone());
        Ok(token)
    }

    pub async fn refresh(&self) -> Result<AccessToken> {
        let mut cached = self.cached.lock().await;
        let token = self.refresher.refresh().await?;
        *cached = Some(token.clone());
        Ok(token)
    }
}

#[derive(Deserialize)]
struct DropboxTokenResponse {
    access_token: String,
    expires_in: i64,
}

pub struct DropboxRefresher {
    client: Client,
    token_url: String,
    app_key: String,
    app_secret: String,
    refresh_token: String,
}

impl DropboxRefresher {
    /// `Ok(None)` unless all three credentials are configured.
    pub fn from_settings(
        settings: &StorageSettings,
    ) -> std::result::Result<Option<Self>, reqwest::Error> {
        let non_blank = |v: &Option<String>| v.clone().filter(|s| !s.trim().is_empty());
        let (Some(app_key), Some(app_secret), Some(refresh_token)) = (
            non_blank(&settings.app_key),
            non_blank(&settings.app_secret),
            non_blank(&settings.refresh_token),
        ) else {
            return Ok(None);
        };

        let client = Client::builder().timeout(settings.timeout()).build()?;
        Ok(Some(DropboxRefresher {
            client,
            token_url: DROPBOX_TOKEN_URL.to_string(),
            app_key,
            app_secret,
            refresh_token,
        }))
    }
}

#[async_trait]
impl TokenRefresher for DropboxRefresher {
    async fn refresh(&self) -> Result<AccessToken> {
        let response = self
            .client
            .post(&self.token_url)
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", self.refresh_token.as_str()),
                ("client_id", self.app_key.as_str()),
                ("client_secret", self.app_secret.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResearchError::UpstreamFailure(format!(
                "token refresh returned {}",
                status
            )));
        }

        let body: DropboxTokenResponse = response.json().await?;
        Ok(AccessToken {
            value: body.access_token,
            expires_at: Utc::now() + Duration::seconds(body.expires_in),
        })
    }
}

/// Read-only view used by the storage status endpoint.
#[async_trait]
pub trait TokenStatusSource: Send + Sync + 'static {
    async fn status(&self) -> TokenStatus;
}

#[async_trait]
impl<R: TokenRefresher> TokenStatusSource for TokenStore<R> {
    async fn status(&self) -> TokenStatus {
        match self.get().await {
            Ok(token) => TokenStatus {
                configured: true,
                available: true,
                expires_at: Some(token.expires_at),
                error: None,
            },
            Err(e) => {
                log::error!("Storage access token unavailable: {}", e);
                TokenStatus {
                    configured: true,
                    available: false,
                    expires_at: None,
                    error: Some(e.to_string()),
                }
            }
        }
    }
}

/// Stands in when no storage credentials are configured.
pub struct StorageNotConfigured;

#[async_trait]
impl TokenStatusSource for StorageNotConfigured {
    async fn status(&self) -> TokenStatus {
        TokenStatus {
            configured: false,
            available: false,
            expires_at: None,
            error: None,
        }
    }
}
