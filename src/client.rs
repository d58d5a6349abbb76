//! Client for the remote badge-listing endpoint
//!
//! The endpoint takes a `POST` with `{ "appId": <id> }` and a bearer
//! credential, and answers with a JSON badge listing. Decoding the envelope
//! is left to [`crate::badges::BadgeEnvelope`].

use async_trait::async_trait;
use config::ApiConfig;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;

/// Errors from the remote endpoints
#[derive(Debug, thiserror::Error)]
pub enum BadgeApiError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The endpoint returned a non-2xx status code.
    #[error("Badge API error ({status}): {body}")]
    Status { status: u16, body: String },

    /// The body parsed but holds no badge listing.
    #[error("Invalid response format: {0}")]
    InvalidResponseFormat(String),

    /// The body is not valid JSON.
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Anything that can list the badges of an app
#[async_trait]
pub trait BadgeSource: Send + Sync {
    /// Raw listing for `app_id`; one network call per invocation
    async fn list_badges(&self, app_id: u32) -> Result<Value, BadgeApiError>;
}

/// HTTP client for the badge-listing endpoint
pub struct BadgeApiClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<SecretString>,
}

impl BadgeApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self, BadgeApiError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()?;
        Ok(Self::with_client(client, config))
    }

    /// Create a client reusing an existing [`reqwest::Client`]
    pub fn with_client(client: reqwest::Client, config: &ApiConfig) -> Self {
        Self {
            client,
            endpoint: config.badge_list_url.clone(),
            api_key: config.api_key.clone(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Ensure the response has a success status code
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, BadgeApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(BadgeApiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl BadgeSource for BadgeApiClient {
    async fn list_badges(&self, app_id: u32) -> Result<Value, BadgeApiError> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .json(&serde_json::json!({ "appId": app_id }));
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key.expose_secret());
        } else {
            tracing::warn!(app_id, "no API key configured, sending unauthenticated request");
        }

        let response = Self::ensure_success(request.send().await?).await?;
        let body = response.text().await?;
        crate::trace_log!(app_id, body = %body, "raw badge listing");

        Ok(serde_json::from_str(&body)?)
    }
}
