use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::{
    conf::TokenClientSettings,
    credential::Credential,
    error::{CredentialError, CredentialResult},
};

/// Trades a refresh token for a new access token.
#[async_trait]
pub trait TokenExchanger: Send + Sync {
    async fn exchange(&self, credential: &Credential) -> CredentialResult<String>;
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// OAuth2 `refresh_token` grant over HTTP.
#[derive(Clone)]
pub struct HttpTokenExchanger {
    client: Client,
}

impl HttpTokenExchanger {
    pub fn new(settings: &TokenClientSettings) -> CredentialResult<Self> {
        let client = Client::builder()
            .user_agent(settings.user_agent.as_str())
            .timeout(Duration::from_millis(settings.timeout_ms))
            .build()
            .map_err(|e| CredentialError::refresh_failed(None, e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl TokenExchanger for HttpTokenExchanger {
    async fn exchange(&self, credential: &Credential) -> CredentialResult<String> {
        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", credential.refresh_token.as_str()),
            ("client_id", credential.client_id.as_str()),
            ("client_secret", credential.client_secret.as_str()),
        ];
        debug!(endpoint = %credential.token_endpoint, "exchanging refresh token");
        let response = self
            .client
            .post(&credential.token_endpoint)
            .form(&params)
            .send()
            .await
            .map_err(|e| CredentialError::refresh_failed(None, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(CredentialError::refresh_failed(Some(status.as_u16()), body));
        }
        let token: TokenResponse = response.json().await.map_err(|e| {
            CredentialError::refresh_failed(Some(status.as_u16()), e.to_string())
        })?;
        Ok(token.access_token)
    }
}
