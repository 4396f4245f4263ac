use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    credential::{Credential, CredentialConfig},
    error::{CredentialError, CredentialResult},
};

/// Durable home of credential configs.
#[async_trait]
pub trait CredentialPersistence: Send + Sync {
    async fn get_all(&self) -> CredentialResult<Vec<CredentialConfig>>;

    /// Fails with `CredentialNotFound` for an unknown id.
    async fn update_by_id(&self, id: &str, credential: &Credential) -> CredentialResult<()>;
}

#[derive(Clone, Default)]
pub struct MemoryCredentialPersistence {
    store: Arc<RwLock<Vec<CredentialConfig>>>,
}

impl MemoryCredentialPersistence {
    pub fn new(configs: Vec<CredentialConfig>) -> Self {
        Self {
            store: Arc::new(RwLock::new(configs)),
        }
    }

    pub async fn get(&self, id: &str) -> Option<CredentialConfig> {
        let store = self.store.read().await;
        store.iter().find(|c| c.id == id).cloned()
    }
}

#[async_trait]
impl CredentialPersistence for MemoryCredentialPersistence {
    async fn get_all(&self) -> CredentialResult<Vec<CredentialConfig>> {
        Ok(self.store.read().await.clone())
    }

    async fn update_by_id(&self, id: &str, credential: &Credential) -> CredentialResult<()> {
        let mut store = self.store.write().await;
        let config = store
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| CredentialError::CredentialNotFound(id.to_string()))?;
        config.credential = credential.clone();
        Ok(())
    }
}
