//! Persisted library entities: media items, lists and the owner aggregate.

use crate::{ItemId, ListId, OwnerId, Timestamp};
use serde::{Deserialize, Serialize};

/// Kind of media an item or list holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaType {
    Book,
    Movie,
}

impl MediaType {
    /// Wire names accepted in snapshots.
    pub const NAMES: [&'static str; 2] = ["Book", "Movie"];

    /// Parse a wire name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Book" => Some(MediaType::Book),
            "Movie" => Some(MediaType::Movie),
            _ => None,
        }
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaType::Book => write!(f, "Book"),
            MediaType::Movie => write!(f, "Movie"),
        }
    }
}

/// The two entity kinds an import touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Item,
    List,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Item => write!(f, "media item"),
            EntityKind::List => write!(f, "list"),
        }
    }
}

/// Consumption status of a media item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    Planned,
    InProgress,
    Completed,
    OnHold,
    Dropped,
}

impl Status {
    /// Wire names accepted in snapshots.
    pub const NAMES: [&'static str; 5] = ["planned", "in-progress", "completed", "on-hold", "dropped"];
}

/// An external rating, e.g. `{"source": "Rotten Tomatoes", "value": "93%"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating {
    pub source: String,
    pub value: String,
}

/// Book-only attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookDetails {
    #[serde(rename = "ISBN", default, skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
}

/// Movie-only attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieDetails {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub awards: Option<String>,
    /// Minutes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub director: Option<String>,
    #[serde(rename = "imdbID", default, skip_serializing_if = "Option::is_none")]
    pub imdb_id: Option<String>,
}

/// Type-specific attributes, tagged on the wire by `mediaType`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mediaType")]
pub enum MediaDetails {
    Book(BookDetails),
    Movie(MovieDetails),
}

impl MediaDetails {
    pub fn media_type(&self) -> MediaType {
        match self {
            MediaDetails::Book(_) => MediaType::Book,
            MediaDetails::Movie(_) => MediaType::Movie,
        }
    }
}

/// The mutable fields of a media item: everything except its identifier
/// and its list memberships.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemFields {
    pub title: String,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_photo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_date: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ratings: Vec<Rating>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating_count: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub my_rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personal_notes: Option<String>,
    #[serde(flatten)]
    pub details: MediaDetails,
}

impl ItemFields {
    /// Minimal fields for an item of the given type.
    pub fn new(title: impl Into<String>, media_type: MediaType) -> Self {
        let details = match media_type {
            MediaType::Book => MediaDetails::Book(BookDetails::default()),
            MediaType::Movie => MediaDetails::Movie(MovieDetails::default()),
        };
        Self {
            title: title.into(),
            categories: Vec::new(),
            author: None,
            description: None,
            cover_photo: None,
            language: None,
            published_date: None,
            ratings: Vec::new(),
            rating_count: None,
            status: None,
            my_rating: None,
            progress: None,
            personal_notes: None,
            details,
        }
    }

    pub fn media_type(&self) -> MediaType {
        self.details.media_type()
    }
}

/// The mutable fields of a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListFields {
    pub title: String,
    pub color: String,
    pub media_type: MediaType,
}

impl ListFields {
    pub fn new(title: impl Into<String>, color: impl Into<String>, media_type: MediaType) -> Self {
        Self {
            title: title.into(),
            color: color.into(),
            media_type,
        }
    }
}

/// A persisted media item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    pub id: ItemId,
    #[serde(flatten)]
    pub fields: ItemFields,
    /// Lists that contain this item
    #[serde(default)]
    pub lists: Vec<ListId>,
    /// Creation time (milliseconds since epoch)
    pub created_at: Timestamp,
}

impl MediaItem {
    pub fn new(id: impl Into<ItemId>, fields: ItemFields, created_at: Timestamp) -> Self {
        Self {
            id: id.into(),
            fields,
            lists: Vec::new(),
            created_at,
        }
    }

    pub fn title(&self) -> &str {
        &self.fields.title
    }

    pub fn media_type(&self) -> MediaType {
        self.fields.media_type()
    }

    /// Add list memberships, skipping ones already present.
    ///
    /// Returns how many were added.
    pub fn add_lists<'a>(&mut self, lists: impl IntoIterator<Item = &'a ListId>) -> usize {
        union_into(&mut self.lists, lists)
    }
}

/// A persisted list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaList {
    pub id: ListId,
    /// Owning user; never leaves the store
    pub owner: OwnerId,
    #[serde(flatten)]
    pub fields: ListFields,
    /// Member items, in insertion order
    #[serde(default)]
    pub items: Vec<ItemId>,
    /// Creation time (milliseconds since epoch)
    pub created_at: Timestamp,
}

impl MediaList {
    pub fn new(
        id: impl Into<ListId>,
        owner: impl Into<OwnerId>,
        fields: ListFields,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id: id.into(),
            owner: owner.into(),
            fields,
            items: Vec::new(),
            created_at,
        }
    }

    pub fn title(&self) -> &str {
        &self.fields.title
    }

    pub fn media_type(&self) -> MediaType {
        self.fields.media_type
    }

    /// Add member items, skipping ones already present.
    ///
    /// Returns how many were added.
    pub fn add_items<'a>(&mut self, items: impl IntoIterator<Item = &'a ItemId>) -> usize {
        union_into(&mut self.items, items)
    }
}

/// The owner aggregate: which items and lists a user owns.
///
/// This is the authorization boundary of an import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Owner {
    pub id: OwnerId,
    #[serde(default)]
    pub items: Vec<ItemId>,
    #[serde(default)]
    pub lists: Vec<ListId>,
}

impl Owner {
    pub fn new(id: impl Into<OwnerId>) -> Self {
        Self {
            id: id.into(),
            items: Vec::new(),
            lists: Vec::new(),
        }
    }

    pub fn owns_item(&self, id: &str) -> bool {
        self.items.iter().any(|i| i == id)
    }

    pub fn owns_list(&self, id: &str) -> bool {
        self.lists.iter().any(|l| l == id)
    }

    /// Returns true if the item was not owned before.
    pub fn own_item(&mut self, id: &ItemId) -> bool {
        union_into(&mut self.items, std::iter::once(id)) == 1
    }

    /// Returns true if the list was not owned before.
    pub fn own_list(&mut self, id: &ListId) -> bool {
        union_into(&mut self.lists, std::iter::once(id)) == 1
    }
}

/// Append ids that are not yet present, keeping first-seen order.
pub(crate) fn union_into<'a>(
    target: &mut Vec<String>,
    additions: impl IntoIterator<Item = &'a String>,
) -> usize {
    let mut added = 0;
    for id in additions {
        if !target.contains(id) {
            target.push(id.clone());
            added += 1;
        }
    }
    added
}
