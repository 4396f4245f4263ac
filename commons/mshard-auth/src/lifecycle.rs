use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicU64, Ordering},
};

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use crate::{
    credential::Credential,
    error::{CredentialError, CredentialResult},
    exchange::TokenExchanger,
};

/// Hooks around a credential refresh.
#[async_trait]
pub trait RefreshListener: Send + Sync {
    /// Awaited before the token exchange starts.
    async fn before_refresh(&self);

    /// Called with the stored credential once the exchange has settled.
    /// On failure `credential` is the unchanged credential.
    async fn after_refresh(
        &self,
        credential: &Credential,
        error: Option<&CredentialError>,
    );
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialState {
    Valid,
    Refreshing,
}

struct RefreshingFlag<'a>(&'a AtomicBool);

impl<'a> RefreshingFlag<'a> {
    fn raise(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::Release);
        Self(flag)
    }
}

impl Drop for RefreshingFlag<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[derive(Default)]
struct RefreshRecord {
    last_outcome: Option<CredentialResult<()>>,
}

/// Owns one credential and its refresh protocol.
///
/// Refreshes are serialized: a caller that arrives while another refresh is
/// in flight waits for it and receives its outcome instead of exchanging the
/// token a second time.
pub struct LifecycleManager {
    credential: RwLock<Credential>,
    exchanger: Arc<dyn TokenExchanger>,
    listener: Option<Arc<dyn RefreshListener>>,
    gate: Mutex<RefreshRecord>,
    completed: AtomicU64,
    refreshing: AtomicBool,
}

impl LifecycleManager {
    pub fn new(credential: Credential, exchanger: Arc<dyn TokenExchanger>) -> Self {
        Self {
            credential: RwLock::new(credential),
            exchanger,
            listener: None,
            gate: Mutex::new(RefreshRecord::default()),
            completed: AtomicU64::new(0),
            refreshing: AtomicBool::new(false),
        }
    }

    pub fn with_listener(mut self, listener: Arc<dyn RefreshListener>) -> Self {
        self.listener = Some(listener);
        self
    }

    /// A copy of the current credential.
    pub async fn credential(&self) -> Credential {
        self.credential.read().await.clone()
    }

    pub fn state(&self) -> CredentialState {
        if self.refreshing.load(Ordering::Acquire) {
            CredentialState::Refreshing
        } else {
            CredentialState::Valid
        }
    }

    /// Number of refresh attempts that have settled, successful or not.
    pub fn refresh_count(&self) -> u64 {
        self.completed.load(Ordering::Acquire)
    }

    /// Exchanges the refresh token for a new access token and returns the
    /// updated credential. On failure the stored credential is unchanged.
    #[instrument(skip_all)]
    pub async fn refresh(&self, cancel: &CancellationToken) -> CredentialResult<Credential> {
        let arrived_at = self.completed.load(Ordering::Acquire);
        let mut record = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(CredentialError::Cancelled),
            record = self.gate.lock() => record,
        };

        // Share the outcome of a refresh that settled while this caller was
        // queued. A cancelled one is not shared.
        if self.completed.load(Ordering::Acquire) != arrived_at {
            match record.last_outcome.clone() {
                None | Some(Err(CredentialError::Cancelled)) => {}
                Some(outcome) => {
                    info!("joined a refresh that settled while waiting");
                    outcome?;
                    return Ok(self.credential().await);
                }
            }
        }

        let outcome = {
            let _flag = RefreshingFlag::raise(&self.refreshing);
            self.run_refresh(cancel).await
        };

        record.last_outcome = Some(outcome.as_ref().map(|_| ()).map_err(|e| e.clone()));
        self.completed.fetch_add(1, Ordering::AcqRel);
        outcome
    }

    async fn run_refresh(&self, cancel: &CancellationToken) -> CredentialResult<Credential> {
        if let Some(listener) = &self.listener {
            listener.before_refresh().await;
        }

        let current = self.credential().await;
        let exchanged = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(CredentialError::Cancelled),
            res = self.exchanger.exchange(&current) => res,
        };

        match exchanged {
            Ok(access_token) => {
                let updated = {
                    let mut credential = self.credential.write().await;
                    credential.access_token = access_token;
                    credential.clone()
                };
                info!(client_id = %updated.client_id, "access token refreshed");
                if let Some(listener) = &self.listener {
                    listener.after_refresh(&updated, None).await;
                }
                Ok(updated)
            }
            Err(err) => {
                warn!(client_id = %current.client_id, error = %err, "access token refresh failed");
                if let Some(listener) = &self.listener {
                    listener.after_refresh(&current, Some(&err)).await;
                }
                Err(err)
            }
        }
    }
}
