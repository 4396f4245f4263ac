use std::{fmt::Debug, hash::Hash, str::FromStr};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseEnumError {
    #[error("Unrecognized {kind}: '{value}'")]
    Unrecognized { kind: &'static str, value: String },
}

impl ParseEnumError {
    pub fn unrecognized(kind: &'static str, value: impl Into<String>) -> Self {
        Self::Unrecognized {
            kind,
            value: value.into(),
        }
    }
}

/// A field an entity listing can be sorted by.
pub trait SortField:
    Copy + Debug + Eq + Hash + Send + Sync + FromStr<Err = ParseEnumError> + 'static
{
    /// True when sorting by this field means sorting by the entity id alone.
    fn is_id(&self) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortDirection {
    #[serde(rename = "ASCENDING")]
    Ascending,
    #[serde(rename = "DESCENDING")]
    Descending,
}

impl FromStr for SortDirection {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ASCENDING" | "ASC" => Ok(Self::Ascending),
            "DESCENDING" | "DESC" => Ok(Self::Descending),
            _ => Err(ParseEnumError::unrecognized("sort direction", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SortBy<F> {
    pub field: F,
    pub direction: SortDirection,
}

impl<F: SortField> SortBy<F> {
    pub fn new(field: F, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    pub fn ascending(field: F) -> Self {
        Self::new(field, SortDirection::Ascending)
    }

    pub fn descending(field: F) -> Self {
        Self::new(field, SortDirection::Descending)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlbumSortField {
    #[serde(rename = "ID")]
    Id,
    #[serde(rename = "NAME")]
    Name,
}

impl SortField for AlbumSortField {
    fn is_id(&self) -> bool {
        matches!(self, Self::Id)
    }
}

impl FromStr for AlbumSortField {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ID" => Ok(Self::Id),
            "NAME" => Ok(Self::Name),
            _ => Err(ParseEnumError::unrecognized("album sort field", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaItemSortField {
    #[serde(rename = "ID")]
    Id,
    #[serde(rename = "FILE_NAME")]
    FileName,
    #[serde(rename = "DATE_TAKEN")]
    DateTaken,
}

impl SortField for MediaItemSortField {
    fn is_id(&self) -> bool {
        matches!(self, Self::Id)
    }
}

impl FromStr for MediaItemSortField {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ID" => Ok(Self::Id),
            "FILE_NAME" | "NAME" => Ok(Self::FileName),
            "DATE_TAKEN" => Ok(Self::DateTaken),
            _ => Err(ParseEnumError::unrecognized("media item sort field", s)),
        }
    }
}
