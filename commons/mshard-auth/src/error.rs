#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialError {
    #[error("Token refresh failed (status {status:?}): {message}")]
    RefreshFailed {
        status: Option<u16>,
        message: String,
    },

    #[error("Credential not found: {0}")]
    CredentialNotFound(String),

    #[error("Duplicate credential id: {0}")]
    DuplicateCredential(String),

    #[error("Credential refresh cancelled")]
    Cancelled,
}

pub type CredentialResult<T> = Result<T, CredentialError>;

impl CredentialError {
    pub fn refresh_failed(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::RefreshFailed {
            status,
            message: message.into(),
        }
    }
}
