use std::{collections::HashMap, future::Future, sync::Arc};

use async_trait::async_trait;
use futures_util::future::try_join_all;
use mshard_models::{Entity, EntityFilter, EntityId, SortBy, compare_entities};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use crate::{
    conf::StoreSettings,
    error::{StoreError, StoreResult},
    token::PageToken,
    traits::{AggregateStore, Page, PageQuery, ShardPageRequest, ShardStore},
};

/// Each shard is asked for this many times the page size, so the merge has
/// enough candidates even when one shard dominates the page.
pub const OVER_FETCH_FACTOR: usize = 2;

pub type DynShardStore<E> = Arc<dyn ShardStore<E>>;

/// Presents a fixed set of shards as one ordered, paginated collection.
///
/// Read-only: all entity state lives in the shards. The shard table is built
/// once and never changes afterwards.
pub struct FanOutCoordinator<E: Entity> {
    shards: Vec<DynShardStore<E>>,
    index: HashMap<String, usize>,
    settings: StoreSettings,
}

impl<E: Entity> FanOutCoordinator<E> {
    pub fn new(shards: Vec<DynShardStore<E>>) -> StoreResult<Self> {
        Self::with_settings(shards, StoreSettings::default())
    }

    pub fn with_settings(
        shards: Vec<DynShardStore<E>>,
        settings: StoreSettings,
    ) -> StoreResult<Self> {
        let mut index = HashMap::with_capacity(shards.len());
        for (i, shard) in shards.iter().enumerate() {
            if index.insert(shard.shard_id().to_string(), i).is_some() {
                return Err(StoreError::DuplicateShard(
                    shard.shard_id().to_string(),
                ));
            }
        }
        Ok(Self {
            shards,
            index,
            settings,
        })
    }

    pub fn shard_ids(&self) -> impl Iterator<Item = &str> {
        self.shards.iter().map(|s| s.shard_id())
    }

    /// A first-page query using the configured default page size.
    pub fn query(&self, sort_by: SortBy<E::SortField>) -> PageQuery<E> {
        PageQuery::new(self.settings.default_page_size, sort_by)
    }

    fn shard(&self, shard_id: &str) -> StoreResult<&DynShardStore<E>> {
        self.index
            .get(shard_id)
            .map(|i| &self.shards[*i])
            .ok_or_else(|| StoreError::ShardNotFound(shard_id.to_string()))
    }

    /// Runs `op` against every shard concurrently. The first failure fails
    /// the whole call; results come back in shard order.
    async fn fan_out<'a, T, F, Fut>(
        &'a self,
        cancel: &CancellationToken,
        op: F,
    ) -> StoreResult<Vec<T>>
    where
        F: Fn(&'a DynShardStore<E>) -> Fut,
        Fut: Future<Output = StoreResult<T>>,
    {
        let calls = self.shards.iter().map(|shard| {
            let call = op(shard);
            async move {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => Err(StoreError::Cancelled),
                    res = call => res,
                }
            }
        });
        try_join_all(calls).await
    }
}

#[async_trait]
impl<E: Entity> AggregateStore<E> for FanOutCoordinator<E> {
    #[instrument(skip(self, id, cancel), fields(id = %id))]
    async fn get_by_id(
        &self,
        id: &EntityId,
        cancel: &CancellationToken,
    ) -> StoreResult<E> {
        let shard = self.shard(id.shard_id())?;
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(StoreError::Cancelled),
            res = shard.get_by_id(id) => res,
        }
    }

    #[instrument(skip(self, cancel))]
    async fn count(
        &self,
        filter: &EntityFilter,
        cancel: &CancellationToken,
    ) -> StoreResult<u64> {
        let counts = self.fan_out(cancel, |shard| shard.count(filter)).await?;
        Ok(counts.into_iter().sum())
    }

    #[instrument(skip(self, query, cancel), fields(page_size = query.page_size))]
    async fn list_page(
        &self,
        query: PageQuery<E>,
        cancel: &CancellationToken,
    ) -> StoreResult<Page<E>> {
        self.settings.check_page_size(query.page_size)?;
        let previous = PageToken::decode(query.page_token.as_deref())?;
        for shard_id in previous.shard_ids() {
            self.shard(shard_id)?;
        }
        let over_fetch = query.page_size.saturating_mul(OVER_FETCH_FACTOR);
        let sort_by = query.sort_by;

        let pages = self
            .fan_out(cancel, |shard| {
                let request = ShardPageRequest {
                    filter: query.filter.clone(),
                    page_size: over_fetch,
                    sort_by,
                    last_seen_id: previous.get(shard.shard_id()).cloned(),
                };
                shard.list_page(request)
            })
            .await?;

        let mut candidates: Vec<E> =
            pages.into_iter().flat_map(|p| p.items).collect();
        let fetched = candidates.len();
        candidates.sort_by(|a, b| compare_entities(a, b, &sort_by));
        candidates.truncate(query.page_size);

        if candidates.is_empty() {
            debug!("pagination exhausted");
            return Ok(Page {
                items: candidates,
                next_page_token: None,
            });
        }

        // Shards that contributed move to their last entry on this page;
        // the rest keep the position they came in with.
        let mut next = previous;
        for item in &candidates {
            next.set(item.id().clone());
        }
        let next_page_token = next.encode(self.shard_ids());
        debug!(fetched, returned = candidates.len(), "merged shard pages");
        Ok(Page {
            items: candidates,
            next_page_token,
        })
    }
}
