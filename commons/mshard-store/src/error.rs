use mshard_models::{EntityId, IdError};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Invalid id: {0}")]
    InvalidIdFormat(#[from] IdError),

    #[error("Invalid page token: {0}")]
    InvalidPageToken(String),

    #[error("Shard not found: {0}")]
    ShardNotFound(String),

    #[error("Entity not found: {0}")]
    EntityNotFound(EntityId),

    #[error("Id {id} does not belong to shard {shard_id}")]
    ShardMismatch { shard_id: String, id: EntityId },

    #[error("Invalid page size {size}: must be between 1 and {max}")]
    InvalidPageSize { size: usize, max: usize },

    #[error("Duplicate shard id: {0}")]
    DuplicateShard(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Storage backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}
