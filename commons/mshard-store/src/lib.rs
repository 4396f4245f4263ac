//! Shard-transparent access to albums and media items.
//!
//! Each shard is an independent [`ShardStore`]; the [`FanOutCoordinator`]
//! merges them into one ordered collection with opaque page tokens.

pub mod conf;
pub mod coordinator;
pub mod error;
pub mod memory;
pub mod token;
pub mod traits;

pub use conf::StoreSettings;
pub use coordinator::{DynShardStore, FanOutCoordinator, OVER_FETCH_FACTOR};
pub use error::*;
pub use memory::MemoryShardStore;
pub use token::PageToken;
pub use traits::*;
