use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::{
    conf::TokenClientSettings,
    lifecycle::LifecycleManager,
    retry::{AuthFailure, RetryError, call_with_refresh},
};

#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("Unauthorized")]
    Unauthorized,
    #[error("API error: {status} - {message}")]
    Status { status: u16, message: String },
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl AuthFailure for RemoteError {
    fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlobMetadata {
    pub id: String,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
}

/// Reads media item metadata from an external storage account.
#[derive(Clone)]
pub struct BlobClient {
    client: Client,
    base_url: String,
}

impl BlobClient {
    pub fn new(
        base_url: impl Into<String>,
        settings: &TokenClientSettings,
    ) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .user_agent(settings.user_agent.as_str())
            .timeout(Duration::from_millis(settings.timeout_ms))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub async fn get_item_metadata(
        &self,
        manager: &LifecycleManager,
        item_id: &str,
        cancel: &CancellationToken,
    ) -> Result<BlobMetadata, RetryError<RemoteError>> {
        let url = format!("{}/v1/mediaItems/{}", self.base_url, item_id);
        call_with_refresh(manager, cancel, |credential| {
            let request = self.client.get(&url).bearer_auth(credential.access_token);
            async move {
                let response = request.send().await?;
                let status = response.status();
                if status == StatusCode::UNAUTHORIZED {
                    return Err(RemoteError::Unauthorized);
                }
                if !status.is_success() {
                    let message = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Unknown error".to_string());
                    return Err(RemoteError::Status {
                        status: status.as_u16(),
                        message,
                    });
                }
                Ok(response.json::<BlobMetadata>().await?)
            }
        })
        .await
    }
}
