use std::{cmp::Ordering, fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub const ID_SEPARATOR: char = ':';

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    #[error("Invalid id format: '{0}'. Expected '<shard_id>:<local_id>'.")]
    InvalidIdFormat(String),
}

/// Shard-qualified identifier of an album or media item.
///
/// Only the pair is globally unique; `local_id` alone is unique within its
/// shard. The canonical string form is `"{shard_id}:{local_id}"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityId {
    shard_id: String,
    local_id: String,
}

impl EntityId {
    pub fn new(
        shard_id: impl Into<String>,
        local_id: impl Into<String>,
    ) -> Result<Self, IdError> {
        let shard_id = shard_id.into();
        let local_id = local_id.into();
        if !is_valid_part(&shard_id) || !is_valid_part(&local_id) {
            return Err(IdError::InvalidIdFormat(format!(
                "{shard_id}{ID_SEPARATOR}{local_id}"
            )));
        }
        Ok(Self { shard_id, local_id })
    }

    #[inline]
    /// Parses `"<shard_id>:<local_id>"`. Exactly one separator and two
    /// non-empty halves; anything else is rejected.
    pub fn parse(raw: &str) -> Result<Self, IdError> {
        let mut parts = raw.split(ID_SEPARATOR);
        match (parts.next(), parts.next(), parts.next()) {
            (Some(shard), Some(local), None)
                if !shard.is_empty() && !local.is_empty() =>
            {
                Ok(Self {
                    shard_id: shard.to_string(),
                    local_id: local.to_string(),
                })
            }
            _ => Err(IdError::InvalidIdFormat(raw.to_string())),
        }
    }

    pub fn shard_id(&self) -> &str {
        &self.shard_id
    }

    pub fn local_id(&self) -> &str {
        &self.local_id
    }
}

#[inline]
fn is_valid_part(part: &str) -> bool {
    !part.is_empty() && !part.contains(ID_SEPARATOR)
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.shard_id, ID_SEPARATOR, self.local_id)
    }
}

impl FromStr for EntityId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// Local id first: ids from different shards interleave, and the shard id only
// breaks ties between equal local ids.
impl Ord for EntityId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.local_id
            .cmp(&other.local_id)
            .then_with(|| self.shard_id.cmp(&other.shard_id))
    }
}

impl PartialOrd for EntityId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Serialize for EntityId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        EntityId::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_then_parse_gives_same_parts() {
        let id = EntityId::new("shard-a", "item_01").unwrap();
        assert_eq!(id.to_string(), "shard-a:item_01");
        let parsed = EntityId::parse(&id.to_string()).unwrap();
        assert_eq!(parsed.shard_id(), "shard-a");
        assert_eq!(parsed.local_id(), "item_01");
        assert_eq!(parsed, id);
    }

    #[test]
    fn malformed_ids_are_rejected() {
        for raw in ["a", "a:", ":b", ":", "a:b:c", ""] {
            let err = EntityId::parse(raw).unwrap_err();
            assert_eq!(err, IdError::InvalidIdFormat(raw.to_string()));
        }
    }

    #[test]
    fn new_rejects_separator_in_parts() {
        assert!(EntityId::new("a:b", "c").is_err());
        assert!(EntityId::new("a", "").is_err());
    }

    #[test]
    fn ordering_compares_local_id_before_shard() {
        let a1 = EntityId::new("A", "1").unwrap();
        let b2 = EntityId::new("B", "2").unwrap();
        let a3 = EntityId::new("A", "3").unwrap();
        let b1 = EntityId::new("B", "1").unwrap();
        assert!(a1 < b2);
        assert!(b2 < a3);
        assert!(a1 < b1);
        assert_eq!(a1.cmp(&b1), b1.cmp(&a1).reverse());
    }

    #[test]
    fn serde_uses_canonical_string() {
        let id = EntityId::new("s1", "x").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"s1:x\"");
        let back: EntityId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
        assert!(serde_json::from_str::<EntityId>("\"s1\"").is_err());
    }
}
