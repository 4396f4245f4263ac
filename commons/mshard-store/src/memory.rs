use std::{collections::BTreeMap, sync::Arc};

use async_trait::async_trait;
use mshard_models::{
    Entity, EntityFilter, EntityId, SortField, SortKey, compare_entities,
    compare_positions,
};
use tokio::sync::RwLock;

use crate::{
    error::{StoreError, StoreResult},
    traits::{ShardPage, ShardPageRequest, ShardStore},
};

/// In-memory shard keyed by local id. Cloning shares the underlying data.
#[derive(Clone)]
pub struct MemoryShardStore<E: Entity> {
    shard_id: String,
    store: Arc<RwLock<BTreeMap<String, E>>>,
}

impl<E: Entity> MemoryShardStore<E> {
    pub fn new(shard_id: impl Into<String>) -> Self {
        Self {
            shard_id: shard_id.into(),
            store: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    pub async fn insert(&self, entity: E) -> StoreResult<()> {
        self.check_shard(entity.id())?;
        let mut store = self.store.write().await;
        store.insert(entity.id().local_id().to_string(), entity);
        Ok(())
    }

    pub async fn remove(&self, id: &EntityId) -> StoreResult<Option<E>> {
        self.check_shard(id)?;
        let mut store = self.store.write().await;
        Ok(store.remove(id.local_id()))
    }

    fn check_shard(&self, id: &EntityId) -> StoreResult<()> {
        if id.shard_id() != self.shard_id {
            return Err(StoreError::ShardMismatch {
                shard_id: self.shard_id.clone(),
                id: id.clone(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl<E: Entity> ShardStore<E> for MemoryShardStore<E> {
    fn shard_id(&self) -> &str {
        &self.shard_id
    }

    async fn get_by_id(&self, id: &EntityId) -> StoreResult<E> {
        if id.shard_id() != self.shard_id {
            return Err(StoreError::EntityNotFound(id.clone()));
        }
        let store = self.store.read().await;
        store
            .get(id.local_id())
            .cloned()
            .ok_or_else(|| StoreError::EntityNotFound(id.clone()))
    }

    async fn count(&self, filter: &EntityFilter) -> StoreResult<u64> {
        let store = self.store.read().await;
        Ok(store.values().filter(|e| filter.matches(*e)).count() as u64)
    }

    async fn list_page(
        &self,
        request: ShardPageRequest<E>,
    ) -> StoreResult<ShardPage<E>> {
        let ShardPageRequest {
            filter,
            page_size,
            sort_by,
            last_seen_id,
        } = request;
        let store = self.store.read().await;

        // Id sorts only need the id; field sorts need the field value of the
        // last seen entity, which must still exist.
        let cursor = match last_seen_id {
            Some(id) => {
                self.check_shard(&id)?;
                let key = if sort_by.field.is_id() {
                    SortKey::Id
                } else {
                    store
                        .get(id.local_id())
                        .map(|e| e.sort_key(sort_by.field))
                        .ok_or_else(|| StoreError::EntityNotFound(id.clone()))?
                };
                Some((key, id))
            }
            None => None,
        };

        let mut items: Vec<E> = store
            .values()
            .filter(|e| filter.matches(*e))
            .filter(|e| match &cursor {
                Some((key, id)) => {
                    compare_positions(
                        &e.sort_key(sort_by.field),
                        e.id(),
                        key,
                        id,
                        sort_by.direction,
                    )
                    .is_gt()
                }
                None => true,
            })
            .cloned()
            .collect();
        items.sort_by(|a, b| compare_entities(a, b, &sort_by));
        items.truncate(page_size);
        Ok(ShardPage::new(items))
    }
}
