use std::collections::HashMap;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use mshard_models::EntityId;

use crate::error::{StoreError, StoreResult};

const ENTRY_SEPARATOR: &str = ",";

/// Per-shard resume positions carried between list calls.
///
/// The string form is the last seen id of each participating shard, each
/// entry base64url encoded and joined by commas, so ids may contain any
/// character. A shard without an entry resumes from its beginning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageToken {
    positions: HashMap<String, EntityId>,
}

impl PageToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// An absent or empty token decodes to no positions.
    pub fn decode(raw: Option<&str>) -> StoreResult<Self> {
        let mut token = Self::new();
        let Some(raw) = raw.filter(|r| !r.is_empty()) else {
            return Ok(token);
        };
        for entry in raw.split(ENTRY_SEPARATOR) {
            let id = EntityId::parse(&decode_entry(entry)?)?;
            if token.positions.contains_key(id.shard_id()) {
                return Err(StoreError::InvalidPageToken(format!(
                    "shard {} appears more than once",
                    id.shard_id()
                )));
            }
            token.positions.insert(id.shard_id().to_string(), id);
        }
        Ok(token)
    }

    /// Encodes entries in the given shard order; shards without an entry are
    /// skipped. Returns `None` when no shard has a position.
    pub fn encode<'a>(
        &self,
        shard_order: impl IntoIterator<Item = &'a str>,
    ) -> Option<String> {
        let entries: Vec<String> = shard_order
            .into_iter()
            .filter_map(|shard| self.positions.get(shard))
            .map(|id| URL_SAFE_NO_PAD.encode(id.to_string()))
            .collect();
        if entries.is_empty() {
            None
        } else {
            Some(entries.join(ENTRY_SEPARATOR))
        }
    }

    pub fn get(&self, shard_id: &str) -> Option<&EntityId> {
        self.positions.get(shard_id)
    }

    pub fn set(&mut self, id: EntityId) {
        self.positions.insert(id.shard_id().to_string(), id);
    }

    pub fn shard_ids(&self) -> impl Iterator<Item = &str> {
        self.positions.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

fn decode_entry(entry: &str) -> StoreResult<String> {
    let bytes = URL_SAFE_NO_PAD
        .decode(entry)
        .map_err(|e| StoreError::InvalidPageToken(format!("entry '{entry}': {e}")))?;
    String::from_utf8(bytes)
        .map_err(|_| StoreError::InvalidPageToken(format!("entry '{entry}' is not utf-8")))
}
