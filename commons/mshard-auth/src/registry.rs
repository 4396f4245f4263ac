use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::{
    credential::{Credential, CredentialConfig},
    error::{CredentialError, CredentialResult},
    exchange::TokenExchanger,
    lifecycle::{LifecycleManager, RefreshListener},
    persistence::CredentialPersistence,
};

/// Writes refreshed credentials back to persistence.
struct PersistingListener {
    id: String,
    persistence: Arc<dyn CredentialPersistence>,
}

#[async_trait]
impl RefreshListener for PersistingListener {
    async fn before_refresh(&self) {
        debug!(id = %self.id, "refreshing credential");
    }

    async fn after_refresh(&self, credential: &Credential, error: Option<&CredentialError>) {
        if let Some(err) = error {
            warn!(id = %self.id, error = %err, "refresh failed, credential not persisted");
            return;
        }
        if let Err(err) = self.persistence.update_by_id(&self.id, credential).await {
            error!(id = %self.id, error = %err, "failed to persist refreshed credential");
        }
    }
}

/// One lifecycle manager per configured account, fixed at construction.
pub struct CredentialRegistry {
    managers: Vec<(String, Arc<LifecycleManager>)>,
    index: HashMap<String, usize>,
}

impl CredentialRegistry {
    pub fn build_from_configs(
        configs: Vec<CredentialConfig>,
        persistence: Arc<dyn CredentialPersistence>,
        exchanger: Arc<dyn TokenExchanger>,
    ) -> CredentialResult<Self> {
        let mut managers = Vec::with_capacity(configs.len());
        let mut index = HashMap::with_capacity(configs.len());
        for config in configs {
            if index.contains_key(&config.id) {
                return Err(CredentialError::DuplicateCredential(config.id));
            }
            let listener = PersistingListener {
                id: config.id.clone(),
                persistence: persistence.clone(),
            };
            let manager = LifecycleManager::new(config.credential, exchanger.clone())
                .with_listener(Arc::new(listener));
            index.insert(config.id.clone(), managers.len());
            managers.push((config.id, Arc::new(manager)));
        }
        info!(count = managers.len(), "credential registry built");
        Ok(Self { managers, index })
    }

    /// Builds the registry from everything persistence currently holds.
    pub async fn load(
        persistence: Arc<dyn CredentialPersistence>,
        exchanger: Arc<dyn TokenExchanger>,
    ) -> CredentialResult<Self> {
        let configs = persistence.get_all().await?;
        Self::build_from_configs(configs, persistence, exchanger)
    }

    pub fn get_by_id(&self, id: &str) -> CredentialResult<Arc<LifecycleManager>> {
        self.index
            .get(id)
            .map(|i| self.managers[*i].1.clone())
            .ok_or_else(|| CredentialError::CredentialNotFound(id.to_string()))
    }

    /// Every manager in config order.
    pub fn list_all(&self) -> Vec<(String, Arc<LifecycleManager>)> {
        self.managers.clone()
    }

    pub fn len(&self) -> usize {
        self.managers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.managers.is_empty()
    }
}
