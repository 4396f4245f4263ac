use async_trait::async_trait;
use mshard_models::{Entity, EntityFilter, EntityId, SortBy};
use tokio_util::sync::CancellationToken;

use crate::error::StoreResult;

#[derive(Debug, Clone)]
pub struct ShardPageRequest<E: Entity> {
    pub filter: EntityFilter,
    pub page_size: usize,
    pub sort_by: SortBy<E::SortField>,
    /// Resume strictly after this entity in sort order.
    pub last_seen_id: Option<EntityId>,
}

#[derive(Debug, Clone)]
pub struct ShardPage<E> {
    pub items: Vec<E>,
    pub last_id: Option<EntityId>,
}

impl<E: Entity> ShardPage<E> {
    pub fn new(items: Vec<E>) -> Self {
        let last_id = items.last().map(|e| e.id().clone());
        Self { items, last_id }
    }
}

/// Access to the entities of exactly one shard.
#[async_trait]
pub trait ShardStore<E: Entity>: Send + Sync {
    fn shard_id(&self) -> &str;

    async fn get_by_id(&self, id: &EntityId) -> StoreResult<E>;

    async fn count(&self, filter: &EntityFilter) -> StoreResult<u64>;

    /// Up to `page_size` matching entities ordered by `sort_by`, with the
    /// entity id as the secondary key.
    async fn list_page(
        &self,
        request: ShardPageRequest<E>,
    ) -> StoreResult<ShardPage<E>>;
}

#[derive(Debug, Clone)]
pub struct PageQuery<E: Entity> {
    pub filter: EntityFilter,
    pub page_size: usize,
    pub sort_by: SortBy<E::SortField>,
    pub page_token: Option<String>,
}

impl<E: Entity> PageQuery<E> {
    pub fn new(page_size: usize, sort_by: SortBy<E::SortField>) -> Self {
        Self {
            filter: EntityFilter::all(),
            page_size,
            sort_by,
            page_token: None,
        }
    }

    pub fn with_filter(mut self, filter: EntityFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_page_token(mut self, token: Option<String>) -> Self {
        self.page_token = token;
        self
    }
}

#[derive(Debug, Clone)]
pub struct Page<E> {
    pub items: Vec<E>,
    /// Absent once pagination has terminated.
    pub next_page_token: Option<String>,
}

/// The merged view over every shard. Has no shard identity of its own.
#[async_trait]
pub trait AggregateStore<E: Entity>: Send + Sync {
    async fn get_by_id(
        &self,
        id: &EntityId,
        cancel: &CancellationToken,
    ) -> StoreResult<E>;

    async fn count(
        &self,
        filter: &EntityFilter,
        cancel: &CancellationToken,
    ) -> StoreResult<u64>;

    async fn list_page(
        &self,
        query: PageQuery<E>,
        cancel: &CancellationToken,
    ) -> StoreResult<Page<E>>;
}
