//! Snapshot types: the portable, owner-agnostic form of a library.
//!
//! A snapshot uses snapshot-local identifiers. Exports carry persisted
//! identifiers, which are just as valid as local ones when the file is
//! imported again.

use crate::{
    error::Result, Error, ItemFields, ListFields, MediaItem, MediaList, MediaType, ValidationIssue,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Version of the snapshot format for future compatibility.
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

fn default_format_version() -> u32 {
    SNAPSHOT_FORMAT_VERSION
}

/// A media item as it appears in a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotItem {
    /// Snapshot-local identifier
    #[serde(alias = "localId", alias = "_id")]
    pub id: String,
    #[serde(flatten)]
    pub fields: ItemFields,
    /// Snapshot-local list identifiers
    #[serde(default)]
    pub lists: Vec<String>,
}

impl SnapshotItem {
    pub fn title(&self) -> &str {
        &self.fields.title
    }

    pub fn media_type(&self) -> MediaType {
        self.fields.media_type()
    }
}

impl From<&MediaItem> for SnapshotItem {
    fn from(item: &MediaItem) -> Self {
        Self {
            id: item.id.clone(),
            fields: item.fields.clone(),
            lists: item.lists.clone(),
        }
    }
}

/// A list as it appears in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotList {
    /// Snapshot-local identifier
    #[serde(alias = "localId", alias = "_id")]
    pub id: String,
    #[serde(flatten)]
    pub fields: ListFields,
    /// Snapshot-local item identifiers
    #[serde(default)]
    pub items: Vec<String>,
}

impl SnapshotList {
    pub fn title(&self) -> &str {
        &self.fields.title
    }

    pub fn media_type(&self) -> MediaType {
        self.fields.media_type
    }
}

impl From<&MediaList> for SnapshotList {
    fn from(list: &MediaList) -> Self {
        Self {
            id: list.id.clone(),
            fields: list.fields.clone(),
            items: list.items.clone(),
        }
    }
}

/// A whole library: every media item and list of one owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibrarySnapshot {
    /// Snapshot format version
    #[serde(default = "default_format_version")]
    pub format_version: u32,
    /// When the snapshot was exported, if it came from an export
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exported_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub media_items: Vec<SnapshotItem>,
    #[serde(default)]
    pub lists: Vec<SnapshotList>,
}

impl Default for LibrarySnapshot {
    fn default() -> Self {
        Self::new()
    }
}

impl LibrarySnapshot {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self {
            format_version: SNAPSHOT_FORMAT_VERSION,
            exported_at: None,
            media_items: Vec::new(),
            lists: Vec::new(),
        }
    }

    /// Count of item->list references plus list->item references.
    pub fn membership_count(&self) -> usize {
        self.media_items.iter().map(|i| i.lists.len()).sum::<usize>()
            + self.lists.iter().map(|l| l.items.len()).sum::<usize>()
    }

    /// Validate an untyped payload and convert it.
    ///
    /// Returns every issue found when the payload does not validate.
    pub fn parse(
        value: &Value,
        options: &crate::ImportOptions,
    ) -> Result<std::result::Result<Self, Vec<ValidationIssue>>> {
        check_format_version(value)?;

        let issues = crate::validate::validate_snapshot(value, options);
        if !issues.is_empty() {
            return Ok(Err(issues));
        }

        let snapshot =
            Self::deserialize(value).map_err(|e| Error::InvalidSnapshot(e.to_string()))?;
        Ok(Ok(snapshot))
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| Error::InvalidSnapshot(e.to_string()))
    }

    /// Serialize to pretty JSON, the form used for file downloads.
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::InvalidSnapshot(e.to_string()))
    }

    /// Deserialize from JSON without structural validation.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| Error::InvalidSnapshot(e.to_string()))?;
        check_format_version(&value)?;
        Self::deserialize(&value).map_err(|e| Error::InvalidSnapshot(e.to_string()))
    }
}

/// Reject snapshots written by a newer format than this build understands.
pub fn check_format_version(value: &Value) -> Result<()> {
    let Some(version) = value.get("formatVersion") else {
        return Ok(());
    };

    match version.as_u64() {
        Some(v) if v <= SNAPSHOT_FORMAT_VERSION as u64 => Ok(()),
        Some(v) => Err(Error::InvalidSnapshot(format!(
            "unsupported snapshot format version: {} (max supported: {})",
            v, SNAPSHOT_FORMAT_VERSION
        ))),
        None => Err(Error::InvalidSnapshot(
            "formatVersion must be a non-negative integer".into(),
        )),
    }
}

/// Summary of a snapshot (without the full data).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotMetadata {
    pub format_version: u32,
    pub item_count: usize,
    pub list_count: usize,
    pub membership_count: usize,
}

impl From<&LibrarySnapshot> for SnapshotMetadata {
    fn from(snapshot: &LibrarySnapshot) -> Self {
        Self {
            format_version: snapshot.format_version,
            item_count: snapshot.media_items.len(),
            list_count: snapshot.lists.len(),
            membership_count: snapshot.membership_count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ImportOptions;
    use serde_json::json;

    fn dune_snapshot() -> Value {
        json!({
            "mediaItems": [
                {"localId": "i1", "title": "Dune", "mediaType": "Book", "lists": ["l1"], "categories": []}
            ],
            "lists": [
                {"localId": "l1", "title": "Sci-Fi", "color": "#3366ff", "mediaType": "Book", "items": ["i1"]}
            ]
        })
    }

    #[test]
    fn parse_accepts_local_id_alias() {
        let snapshot = LibrarySnapshot::parse(&dune_snapshot(), &ImportOptions::default())
            .unwrap()
            .unwrap();

        assert_eq!(snapshot.format_version, SNAPSHOT_FORMAT_VERSION);
        assert_eq!(snapshot.media_items[0].id, "i1");
        assert_eq!(snapshot.media_items[0].media_type(), MediaType::Book);
        assert_eq!(snapshot.lists[0].id, "l1");
        assert_eq!(snapshot.lists[0].items, vec!["i1"]);
    }

    #[test]
    fn parse_returns_issues_instead_of_error() {
        let value = json!({"mediaItems": [{"id": "i1", "mediaType": "Book"}], "lists": []});
        let issues = LibrarySnapshot::parse(&value, &ImportOptions::default())
            .unwrap()
            .unwrap_err();
        assert!(!issues.is_empty());
    }

    #[test]
    fn reject_future_format_version() {
        let json = r#"{"formatVersion": 999, "mediaItems": [], "lists": []}"#;
        let result = LibrarySnapshot::from_json(json);
        assert!(matches!(result, Err(Error::InvalidSnapshot(_))));

        let value = json!({"formatVersion": "one"});
        assert!(check_format_version(&value).is_err());
    }

    #[test]
    fn json_roundtrip() {
        let mut snapshot = LibrarySnapshot::parse(&dune_snapshot(), &ImportOptions::default())
            .unwrap()
            .unwrap();
        snapshot.exported_at = Some(DateTime::from_timestamp(1_706_745_600, 0).unwrap());

        let json = snapshot.to_json_pretty().unwrap();
        let restored = LibrarySnapshot::from_json(&json).unwrap();

        assert_eq!(snapshot, restored);
        assert!(json.contains("\"exportedAt\""));
    }

    #[test]
    fn snapshot_metadata() {
        let snapshot = LibrarySnapshot::parse(&dune_snapshot(), &ImportOptions::default())
            .unwrap()
            .unwrap();
        let metadata: SnapshotMetadata = (&snapshot).into();

        assert_eq!(metadata.item_count, 1);
        assert_eq!(metadata.list_count, 1);
        assert_eq!(metadata.membership_count, 2);
    }
}
