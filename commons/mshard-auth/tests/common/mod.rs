#![allow(dead_code)]

use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use mshard_auth::{Credential, CredentialError, CredentialResult, RefreshListener, TokenExchanger};

pub fn credential(endpoint: &str) -> Credential {
    Credential {
        access_token: "old-access".into(),
        refresh_token: "refresh-1".into(),
        token_endpoint: endpoint.into(),
        client_id: "client-1".into(),
        client_secret: "secret-1".into(),
    }
}

/// Hands out `access-1`, `access-2`, ... or fails every time. When `log` is
/// set, each exchange is recorded next to the listener's events.
pub struct FakeExchanger {
    pub calls: AtomicUsize,
    pub fail_with: Option<CredentialError>,
    pub delay: Duration,
    pub log: Option<Arc<RecordingListener>>,
}

impl FakeExchanger {
    fn build(
        fail_with: Option<CredentialError>,
        delay: Duration,
        log: Option<Arc<RecordingListener>>,
    ) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            fail_with,
            delay,
            log,
        })
    }

    pub fn ok() -> Arc<Self> {
        Self::build(None, Duration::ZERO, None)
    }

    pub fn slow(delay: Duration) -> Arc<Self> {
        Self::build(None, delay, None)
    }

    pub fn failing(err: CredentialError) -> Arc<Self> {
        Self::build(Some(err), Duration::ZERO, None)
    }

    pub fn ok_logging(log: Arc<RecordingListener>) -> Arc<Self> {
        Self::build(None, Duration::ZERO, Some(log))
    }

    pub fn failing_logging(err: CredentialError, log: Arc<RecordingListener>) -> Arc<Self> {
        Self::build(Some(err), Duration::ZERO, Some(log))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenExchanger for FakeExchanger {
    async fn exchange(&self, _credential: &Credential) -> CredentialResult<String> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(log) = &self.log {
            log.events.lock().unwrap().push(Event::Exchange);
        }
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match &self.fail_with {
            Some(err) => Err(err.clone()),
            None => Ok(format!("access-{n}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Before,
    Exchange,
    After {
        access_token: String,
        error: Option<CredentialError>,
    },
}

#[derive(Default)]
pub struct RecordingListener {
    pub events: Mutex<Vec<Event>>,
}

impl RecordingListener {
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl RefreshListener for RecordingListener {
    async fn before_refresh(&self) {
        self.events.lock().unwrap().push(Event::Before);
    }

    async fn after_refresh(&self, credential: &Credential, error: Option<&CredentialError>) {
        self.events.lock().unwrap().push(Event::After {
            access_token: credential.access_token.clone(),
            error: error.cloned(),
        });
    }
}
