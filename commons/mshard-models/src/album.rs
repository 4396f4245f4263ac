use serde::{Deserialize, Serialize};

use crate::{AlbumSortField, Entity, EntityId, SortKey};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
    pub id: EntityId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_album_id: Option<EntityId>,
}

impl Album {
    pub fn new(id: EntityId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            parent_album_id: None,
        }
    }

    pub fn with_parent(mut self, parent: EntityId) -> Self {
        self.parent_album_id = Some(parent);
        self
    }
}

impl Entity for Album {
    type SortField = AlbumSortField;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn parent_id(&self) -> Option<&EntityId> {
        self.parent_album_id.as_ref()
    }

    fn sort_key(&self, field: AlbumSortField) -> SortKey {
        match field {
            AlbumSortField::Id => SortKey::Id,
            AlbumSortField::Name => SortKey::text(&self.name),
        }
    }
}
