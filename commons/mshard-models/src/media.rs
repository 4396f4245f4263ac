use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Entity, EntityId, MediaItemSortField, SortKey};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub lat: f64,
    pub lon: f64,
}

/// Pointer to the bytes of a media item in an external storage account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobRef {
    /// Id of the credential that can read this blob.
    pub account_id: String,
    pub item_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaItem {
    pub id: EntityId,
    pub file_name: String,
    pub album_id: EntityId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoLocation>,
    pub width: u32,
    pub height: u32,
    pub date_taken: DateTime<Utc>,
    pub blob_ref: BlobRef,
}

impl Entity for MediaItem {
    type SortField = MediaItemSortField;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn parent_id(&self) -> Option<&EntityId> {
        Some(&self.album_id)
    }

    fn sort_key(&self, field: MediaItemSortField) -> SortKey {
        match field {
            MediaItemSortField::Id => SortKey::Id,
            MediaItemSortField::FileName => SortKey::text(&self.file_name),
            MediaItemSortField::DateTaken => SortKey::Time(self.date_taken),
        }
    }
}
