use std::future::Future;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::{credential::Credential, error::CredentialError, lifecycle::LifecycleManager};

/// Errors from remote calls made with a credential.
pub trait AuthFailure {
    /// True for an authorization failure (HTTP 401 or equivalent).
    fn is_unauthorized(&self) -> bool;
}

#[derive(Debug, thiserror::Error)]
pub enum RetryError<E> {
    #[error("Remote call failed: {0}")]
    Remote(E),
    #[error("Credential refresh failed: {0}")]
    Refresh(#[source] CredentialError),
}

impl<E> RetryError<E> {
    pub fn remote(&self) -> Option<&E> {
        match self {
            Self::Remote(e) => Some(e),
            Self::Refresh(_) => None,
        }
    }
}

/// Runs `op` with the current credential. On an authorization failure the
/// credential is refreshed once and `op` retried once; any other failure, or
/// a second failure, is returned as is.
pub async fn call_with_refresh<T, E, F, Fut>(
    manager: &LifecycleManager,
    cancel: &CancellationToken,
    op: F,
) -> Result<T, RetryError<E>>
where
    E: AuthFailure,
    F: Fn(Credential) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    match op(manager.credential().await).await {
        Err(err) if err.is_unauthorized() => {
            debug!("remote call unauthorized, refreshing credential");
            let refreshed = manager.refresh(cancel).await.map_err(RetryError::Refresh)?;
            op(refreshed).await.map_err(RetryError::Remote)
        }
        other => other.map_err(RetryError::Remote),
    }
}
