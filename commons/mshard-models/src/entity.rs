use std::{cmp::Ordering, fmt::Debug};

use chrono::{DateTime, Utc};

use crate::{EntityId, SortBy, SortDirection, SortField};

/// Value an entity contributes for a sort field.
///
/// Sorting by id yields [`SortKey::Id`] for every entity, so the comparison
/// falls through to the id itself.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortKey {
    Id,
    Text(String),
    Time(DateTime<Utc>),
}

impl SortKey {
    /// Primary-strength approximation: case differences do not order names,
    /// so equal names fall through to the id tiebreak.
    pub fn text(value: &str) -> Self {
        Self::Text(value.to_lowercase())
    }
}

/// An item stored in exactly one shard.
pub trait Entity: Clone + Debug + Send + Sync + 'static {
    type SortField: SortField;

    fn id(&self) -> &EntityId;

    /// The album this entity belongs to, if any.
    fn parent_id(&self) -> Option<&EntityId>;

    fn sort_key(&self, field: Self::SortField) -> SortKey;
}

/// Total order over entities: `(sort key, id)` compared lexicographically,
/// reversed as a whole for descending sorts. Never `Equal` for distinct ids.
pub fn compare_entities<E: Entity>(a: &E, b: &E, sort_by: &SortBy<E::SortField>) -> Ordering {
    compare_positions(
        &a.sort_key(sort_by.field),
        a.id(),
        &b.sort_key(sort_by.field),
        b.id(),
        sort_by.direction,
    )
}

pub fn compare_positions(
    a_key: &SortKey,
    a_id: &EntityId,
    b_key: &SortKey,
    b_id: &EntityId,
    direction: SortDirection,
) -> Ordering {
    let ord = a_key.cmp(b_key).then_with(|| a_id.cmp(b_id));
    match direction {
        SortDirection::Ascending => ord,
        SortDirection::Descending => ord.reverse(),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityFilter {
    pub parent_id: Option<EntityId>,
}

impl EntityFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn children_of(parent_id: EntityId) -> Self {
        Self {
            parent_id: Some(parent_id),
        }
    }

    pub fn matches<E: Entity>(&self, entity: &E) -> bool {
        match &self.parent_id {
            Some(parent) => entity.parent_id() == Some(parent),
            None => true,
        }
    }
}
