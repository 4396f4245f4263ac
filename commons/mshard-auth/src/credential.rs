use serde::{Deserialize, Serialize};

/// Tokens and client registration for one external storage account.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
    pub refresh_token: String,
    pub token_endpoint: String,
    pub client_id: String,
    pub client_secret: String,
}

// Secrets stay out of logs.
impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("token_endpoint", &self.token_endpoint)
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}

/// Persisted form of a [`Credential`], keyed by account id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialConfig {
    pub id: String,
    #[serde(flatten)]
    pub credential: Credential,
}

impl CredentialConfig {
    pub fn new(id: impl Into<String>, credential: Credential) -> Self {
        Self {
            id: id.into(),
            credential,
        }
    }
}
