//! Credential lifecycle for the external storage accounts behind each shard.

pub mod blob;
pub mod conf;
pub mod credential;
pub mod error;
pub mod exchange;
pub mod lifecycle;
pub mod persistence;
pub mod registry;
pub mod retry;

pub use blob::{BlobClient, BlobMetadata, RemoteError};
pub use conf::TokenClientSettings;
pub use credential::{Credential, CredentialConfig};
pub use error::*;
pub use exchange::{HttpTokenExchanger, TokenExchanger};
pub use lifecycle::{CredentialState, LifecycleManager, RefreshListener};
pub use persistence::{CredentialPersistence, MemoryCredentialPersistence};
pub use registry::CredentialRegistry;
pub use retry::{AuthFailure, RetryError, call_with_refresh};
