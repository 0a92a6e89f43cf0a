//! Structural and referential validation of untyped snapshots.
//!
//! Validation never stops at the first problem: every violation is collected
//! so a caller can report all of them at once. A snapshot with any issue must
//! not be imported.

use crate::{MediaType, Status};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Keys accepted for a snapshot-local identifier, in lookup order.
const ID_KEYS: [&str; 3] = ["id", "localId", "_id"];

/// Whether an issue concerns one entity's shape or references between entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueKind {
    Structural,
    Referential,
}

/// A single validation problem with a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub kind: IssueKind,
    pub message: String,
}

impl ValidationIssue {
    fn structural(message: impl Into<String>) -> Self {
        Self {
            kind: IssueKind::Structural,
            message: message.into(),
        }
    }

    fn referential(message: impl Into<String>) -> Self {
        Self {
            kind: IssueKind::Referential,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Size limits applied to incoming snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportOptions {
    pub max_items: usize,
    pub max_lists: usize,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            max_items: 10_000,
            max_lists: 1_000,
        }
    }
}

/// Expected shape of a field value.
#[derive(Debug, Clone, Copy, PartialEq)]
enum FieldType {
    NonEmptyString,
    String,
    StringArray,
    /// Array of identifier-shaped strings
    IdArray,
    /// `http://` or `https://` URL
    Url,
    Date,
    HexColor,
    MediaType,
    Status,
    Ratings,
    /// Finite number within an inclusive range
    Number { min: f64, max: f64 },
    /// Non-negative integer within an inclusive range
    Integer { min: u64, max: u64 },
}

impl FieldType {
    fn expectation(&self) -> String {
        match self {
            FieldType::NonEmptyString => "a non-empty string".into(),
            FieldType::String => "a string".into(),
            FieldType::StringArray => "an array of strings".into(),
            FieldType::IdArray => "an array of identifiers".into(),
            FieldType::Url => "an http(s) URL".into(),
            FieldType::Date => "a date (YYYY, YYYY-MM, YYYY-MM-DD or RFC 3339)".into(),
            FieldType::HexColor => "a hex color (#RGB or #RRGGBB)".into(),
            FieldType::MediaType => format!("one of {}", MediaType::NAMES.join(", ")),
            FieldType::Status => format!("one of {}", Status::NAMES.join(", ")),
            FieldType::Ratings => "an array of {source, value} objects".into(),
            FieldType::Number { min, max } if max.is_infinite() => {
                format!("a number >= {}", min)
            }
            FieldType::Number { min, max } => format!("a number between {} and {}", min, max),
            FieldType::Integer { min, max } => format!("an integer between {} and {}", min, max),
        }
    }
}

/// Definition of a checked field.
#[derive(Debug, Clone, Copy)]
struct FieldDef {
    name: &'static str,
    field_type: FieldType,
    required: bool,
}

impl FieldDef {
    const fn required(name: &'static str, field_type: FieldType) -> Self {
        Self {
            name,
            field_type,
            required: true,
        }
    }

    const fn optional(name: &'static str, field_type: FieldType) -> Self {
        Self {
            name,
            field_type,
            required: false,
        }
    }

    /// Check one field of `obj`, appending any problems to `issues`.
    fn check(&self, path: &str, obj: &Map<String, Value>, issues: &mut Vec<ValidationIssue>) {
        let field_path = format!("{}.{}", path, self.name);
        match obj.get(self.name) {
            None | Some(Value::Null) if self.required => {
                issues.push(ValidationIssue::structural(format!(
                    "{} is required",
                    field_path
                )));
            }
            None | Some(Value::Null) => {}
            Some(value) => self.check_value(&field_path, value, issues),
        }
    }

    fn check_value(&self, field_path: &str, value: &Value, issues: &mut Vec<ValidationIssue>) {
        let valid = match self.field_type {
            FieldType::NonEmptyString => value.as_str().is_some_and(|s| !s.trim().is_empty()),
            FieldType::String => value.is_string(),
            FieldType::StringArray | FieldType::IdArray => {
                return self.check_string_array(field_path, value, issues);
            }
            FieldType::Ratings => return check_ratings(field_path, value, issues),
            FieldType::Url => value.as_str().is_some_and(is_http_url),
            FieldType::Date => value.as_str().is_some_and(is_date),
            FieldType::HexColor => value.as_str().is_some_and(is_hex_color),
            FieldType::MediaType => value.as_str().and_then(MediaType::from_name).is_some(),
            FieldType::Status => value.as_str().is_some_and(|s| Status::NAMES.contains(&s)),
            FieldType::Number { min, max } => value
                .as_f64()
                .is_some_and(|n| n.is_finite() && n >= min && n <= max),
            FieldType::Integer { min, max } => {
                value.as_u64().is_some_and(|n| n >= min && n <= max)
            }
        };

        if !valid {
            issues.push(ValidationIssue::structural(format!(
                "{} must be {}, got {}",
                field_path,
                self.field_type.expectation(),
                describe(value)
            )));
        }
    }

    fn check_string_array(
        &self,
        field_path: &str,
        value: &Value,
        issues: &mut Vec<ValidationIssue>,
    ) {
        let Some(elements) = value.as_array() else {
            issues.push(ValidationIssue::structural(format!(
                "{} must be {}, got {}",
                field_path,
                self.field_type.expectation(),
                describe(value)
            )));
            return;
        };

        for (index, element) in elements.iter().enumerate() {
            let ok = match self.field_type {
                FieldType::IdArray => is_identifier(element),
                _ => element.is_string(),
            };
            if !ok {
                let expected = if self.field_type == FieldType::IdArray {
                    "an identifier"
                } else {
                    "a string"
                };
                issues.push(ValidationIssue::structural(format!(
                    "{}[{}] must be {}, got {}",
                    field_path,
                    index,
                    expected,
                    describe(element)
                )));
            }
        }
    }
}

const ITEM_FIELDS: &[FieldDef] = &[
    FieldDef::required("title", FieldType::NonEmptyString),
    FieldDef::required("mediaType", FieldType::MediaType),
    FieldDef::required("categories", FieldType::StringArray),
    FieldDef::optional("author", FieldType::String),
    FieldDef::optional("description", FieldType::String),
    FieldDef::optional("coverPhoto", FieldType::Url),
    FieldDef::optional("language", FieldType::String),
    FieldDef::optional("publishedDate", FieldType::Date),
    FieldDef::optional("ratings", FieldType::Ratings),
    FieldDef::optional(
        "ratingCount",
        FieldType::Number {
            min: 0.0,
            max: f64::INFINITY,
        },
    ),
    FieldDef::optional("status", FieldType::Status),
    FieldDef::optional("myRating", FieldType::Number { min: 0.0, max: 5.0 }),
    FieldDef::optional(
        "progress",
        FieldType::Number {
            min: 0.0,
            max: f64::INFINITY,
        },
    ),
    FieldDef::optional("personalNotes", FieldType::String),
    FieldDef::optional("lists", FieldType::IdArray),
];

const BOOK_FIELDS: &[FieldDef] = &[
    FieldDef::optional("ISBN", FieldType::String),
    FieldDef::optional(
        "pageCount",
        FieldType::Integer {
            min: 1,
            max: u32::MAX as u64,
        },
    ),
    FieldDef::optional("publisher", FieldType::String),
];

const MOVIE_FIELDS: &[FieldDef] = &[
    FieldDef::optional("actors", FieldType::StringArray),
    FieldDef::optional("awards", FieldType::String),
    FieldDef::optional(
        "runtime",
        FieldType::Integer {
            min: 0,
            max: u32::MAX as u64,
        },
    ),
    FieldDef::optional("director", FieldType::String),
    FieldDef::optional("imdbID", FieldType::String),
];

const LIST_FIELDS: &[FieldDef] = &[
    FieldDef::required("title", FieldType::NonEmptyString),
    FieldDef::required("color", FieldType::HexColor),
    FieldDef::required("mediaType", FieldType::MediaType),
    FieldDef::required("items", FieldType::IdArray),
];

/// What the cross-reference pass needs to know about one entity.
struct Entry<'a> {
    index: usize,
    obj: &'a Map<String, Value>,
    media_type: Option<MediaType>,
}

/// Validate a candidate snapshot.
///
/// Returns an empty vector when the snapshot is valid, otherwise every
/// structural issue followed by every referential issue, in document order.
pub fn validate_snapshot(value: &Value, options: &ImportOptions) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    let Some(root) = value.as_object() else {
        issues.push(ValidationIssue::structural(format!(
            "snapshot must be an object, got {}",
            describe(value)
        )));
        return issues;
    };

    let raw_items = top_level_array(root, "mediaItems", options.max_items, &mut issues);
    let raw_lists = top_level_array(root, "lists", options.max_lists, &mut issues);

    let items = check_entities(
        "mediaItems",
        raw_items,
        ITEM_FIELDS,
        type_specific_fields,
        &mut issues,
    );
    let lists = check_entities("lists", raw_lists, LIST_FIELDS, no_specific_fields, &mut issues);

    check_references(&items, "mediaItems", "lists", &lists, "list", &mut issues);
    check_references(&lists, "lists", "items", &items, "item", &mut issues);

    issues
}

fn type_specific_fields(media_type: MediaType) -> &'static [FieldDef] {
    match media_type {
        MediaType::Book => BOOK_FIELDS,
        MediaType::Movie => MOVIE_FIELDS,
    }
}

fn no_specific_fields(_: MediaType) -> &'static [FieldDef] {
    &[]
}

fn top_level_array<'a>(
    root: &'a Map<String, Value>,
    key: &str,
    limit: usize,
    issues: &mut Vec<ValidationIssue>,
) -> &'a [Value] {
    match root.get(key) {
        None | Some(Value::Null) => &[],
        Some(Value::Array(entries)) => {
            if entries.len() > limit {
                issues.push(ValidationIssue::structural(format!(
                    "{} has {} entries, the limit is {}",
                    key,
                    entries.len(),
                    limit
                )));
            }
            entries
        }
        Some(other) => {
            issues.push(ValidationIssue::structural(format!(
                "{} must be an array, got {}",
                key,
                describe(other)
            )));
            &[]
        }
    }
}

/// Run per-entity checks and index entities by their local identifier.
fn check_entities<'a>(
    collection: &str,
    entries: &'a [Value],
    fields: &[FieldDef],
    specific: fn(MediaType) -> &'static [FieldDef],
    issues: &mut Vec<ValidationIssue>,
) -> HashMap<&'a str, Entry<'a>> {
    let mut index: HashMap<&'a str, Entry<'a>> = HashMap::new();

    for (position, entry) in entries.iter().enumerate() {
        let path = format!("{}[{}]", collection, position);
        let Some(obj) = entry.as_object() else {
            issues.push(ValidationIssue::structural(format!(
                "{} must be an object, got {}",
                path,
                describe(entry)
            )));
            continue;
        };

        let id = match local_id(obj) {
            Some(v) if is_identifier(v) => v.as_str(),
            Some(v) => {
                issues.push(ValidationIssue::structural(format!(
                    "{}.id must be a non-empty string, got {}",
                    path,
                    describe(v)
                )));
                None
            }
            None => {
                issues.push(ValidationIssue::structural(format!("{}.id is required", path)));
                None
            }
        };

        for field in fields {
            field.check(&path, obj, issues);
        }

        let media_type = obj
            .get("mediaType")
            .and_then(Value::as_str)
            .and_then(MediaType::from_name);
        if let Some(media_type) = media_type {
            for field in specific(media_type) {
                field.check(&path, obj, issues);
            }
        }

        let Some(id) = id else { continue };
        if let Some(first) = index.get(id) {
            issues.push(ValidationIssue::structural(format!(
                "{} has duplicate id \"{}\" (first used by {}[{}])",
                path, id, collection, first.index
            )));
            continue;
        }
        index.insert(
            id,
            Entry {
                index: position,
                obj,
                media_type,
            },
        );
    }

    index
}

/// Check every reference from `sources[*].field` into `targets`.
fn check_references(
    sources: &HashMap<&str, Entry<'_>>,
    source_collection: &str,
    field: &str,
    targets: &HashMap<&str, Entry<'_>>,
    target_noun: &str,
    issues: &mut Vec<ValidationIssue>,
) {
    let mut ordered: Vec<&Entry<'_>> = sources.values().collect();
    ordered.sort_by_key(|e| e.index);

    for source in ordered {
        let Some(refs) = source.obj.get(field).and_then(Value::as_array) else {
            continue;
        };
        for (position, reference) in refs.iter().enumerate() {
            // Malformed references were already reported structurally.
            let Some(target_id) = reference.as_str().filter(|s| !s.is_empty()) else {
                continue;
            };
            let path = format!("{}[{}].{}[{}]", source_collection, source.index, field, position);
            match targets.get(target_id) {
                None => issues.push(ValidationIssue::referential(format!(
                    "{} references {} \"{}\" that does not exist",
                    path, target_noun, target_id
                ))),
                Some(target) => {
                    if let (Some(expected), Some(actual)) = (source.media_type, target.media_type)
                    {
                        if expected != actual {
                            issues.push(ValidationIssue::referential(format!(
                                "{} references {} \"{}\" with mediaType {}, but {}[{}] has mediaType {}",
                                path,
                                target_noun,
                                target_id,
                                actual,
                                source_collection,
                                source.index,
                                expected
                            )));
                        }
                    }
                }
            }
        }
    }
}

fn check_ratings(field_path: &str, value: &Value, issues: &mut Vec<ValidationIssue>) {
    let Some(ratings) = value.as_array() else {
        issues.push(ValidationIssue::structural(format!(
            "{} must be {}, got {}",
            field_path,
            FieldType::Ratings.expectation(),
            describe(value)
        )));
        return;
    };

    for (index, rating) in ratings.iter().enumerate() {
        let Some(obj) = rating.as_object() else {
            issues.push(ValidationIssue::structural(format!(
                "{}[{}] must be an object, got {}",
                field_path,
                index,
                describe(rating)
            )));
            continue;
        };
        for key in ["source", "value"] {
            let ok = obj
                .get(key)
                .and_then(Value::as_str)
                .is_some_and(|s| !s.is_empty());
            if !ok {
                issues.push(ValidationIssue::structural(format!(
                    "{}[{}].{} must be a non-empty string",
                    field_path, index, key
                )));
            }
        }
    }
}

fn local_id(obj: &Map<String, Value>) -> Option<&Value> {
    ID_KEYS
        .iter()
        .find_map(|key| obj.get(*key).filter(|v| !v.is_null()))
}

fn is_identifier(value: &Value) -> bool {
    value.as_str().is_some_and(|s| !s.trim().is_empty())
}

fn is_http_url(s: &str) -> bool {
    let rest = s
        .strip_prefix("https://")
        .or_else(|| s.strip_prefix("http://"));
    match rest {
        Some(rest) => {
            let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
            !host.is_empty() && !s.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

fn is_date(s: &str) -> bool {
    use chrono::{DateTime, NaiveDate, NaiveDateTime};

    let s = s.trim();
    if s.len() == 4 && s.chars().all(|c| c.is_ascii_digit()) {
        return true;
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
        || NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d").is_ok()
        || NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
        || DateTime::parse_from_rfc3339(s).is_ok()
}

fn is_hex_color(s: &str) -> bool {
    match s.strip_prefix('#') {
        Some(hex) => (hex.len() == 3 || hex.len() == 6) && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".into(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) if s.is_empty() => "an empty string".into(),
        Value::String(s) => format!("\"{}\"", s),
        Value::Array(_) => "an array".into(),
        Value::Object(_) => "an object".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn messages(value: &Value) -> Vec<String> {
        validate_snapshot(value, &ImportOptions::default())
            .into_iter()
            .map(|i| i.message)
            .collect()
    }

    fn valid_snapshot() -> Value {
        json!({
            "mediaItems": [
                {
                    "id": "i1",
                    "title": "Dune",
                    "mediaType": "Book",
                    "categories": ["Sci-Fi"],
                    "coverPhoto": "https://covers.example.com/dune.jpg",
                    "publishedDate": "1965-08-01",
                    "ratings": [{"source": "Goodreads", "value": "4.3"}],
                    "ratingCount": 1200,
                    "status": "completed",
                    "myRating": 5,
                    "progress": 100,
                    "ISBN": "9780441013593",
                    "pageCount": 412,
                    "lists": ["l1"]
                },
                {
                    "id": "i2",
                    "title": "Arrival",
                    "mediaType": "Movie",
                    "categories": [],
                    "actors": ["Amy Adams"],
                    "runtime": 116,
                    "publishedDate": "2016"
                }
            ],
            "lists": [
                {"id": "l1", "title": "Sci-Fi", "color": "#36f", "mediaType": "Book", "items": ["i1"]}
            ]
        })
    }

    #[test]
    fn valid_snapshot_has_no_issues() {
        assert!(messages(&valid_snapshot()).is_empty());
    }

    #[test]
    fn empty_object_is_valid() {
        assert!(messages(&json!({})).is_empty());
        assert!(messages(&json!({"mediaItems": [], "lists": []})).is_empty());
    }

    #[test]
    fn non_object_root() {
        let issues = messages(&json!([1, 2]));
        assert_eq!(issues, vec!["snapshot must be an object, got an array"]);
    }

    #[test]
    fn collects_every_item_issue() {
        let value = json!({
            "mediaItems": [{
                "id": "i1",
                "title": "  ",
                "mediaType": "Book",
                "categories": ["ok", 3],
                "coverPhoto": "ftp://example.com/a.jpg",
                "myRating": 7,
                "progress": -1,
                "pageCount": 0,
                "status": "finished"
            }]
        });

        let issues = messages(&value);
        assert_eq!(issues.len(), 7, "{:#?}", issues);
        assert!(issues.contains(&"mediaItems[0].title must be a non-empty string, got \"  \"".to_string()));
        assert!(issues.contains(&"mediaItems[0].categories[1] must be a string, got 3".to_string()));
        assert!(issues
            .iter()
            .any(|m| m.starts_with("mediaItems[0].coverPhoto must be an http(s) URL")));
        assert!(issues.contains(&"mediaItems[0].myRating must be a number between 0 and 5, got 7".to_string()));
        assert!(issues.contains(&"mediaItems[0].progress must be a number >= 0, got -1".to_string()));
        assert!(issues.contains(&"mediaItems[0].pageCount must be an integer between 1 and 4294967295, got 0".to_string()));
        assert!(issues.iter().any(|m| m.starts_with("mediaItems[0].status must be one of")));
    }

    #[test]
    fn missing_required_fields() {
        let value = json!({"mediaItems": [{"mediaType": "Movie"}], "lists": [{"id": "l1"}]});
        let issues = messages(&value);

        assert!(issues.contains(&"mediaItems[0].id is required".to_string()));
        assert!(issues.contains(&"mediaItems[0].title is required".to_string()));
        assert!(issues.contains(&"mediaItems[0].categories is required".to_string()));
        assert!(issues.contains(&"lists[0].title is required".to_string()));
        assert!(issues.contains(&"lists[0].color is required".to_string()));
        assert!(issues.contains(&"lists[0].mediaType is required".to_string()));
        assert!(issues.contains(&"lists[0].items is required".to_string()));
    }

    #[test]
    fn type_specific_fields_follow_media_type() {
        // pageCount on a movie is ignored, runtime on a movie is checked
        let value = json!({
            "mediaItems": [{
                "id": "m1",
                "title": "Arrival",
                "mediaType": "Movie",
                "categories": [],
                "pageCount": -5,
                "runtime": -1,
                "actors": "Amy Adams"
            }]
        });
        let issues = messages(&value);

        assert_eq!(issues.len(), 2, "{:#?}", issues);
        assert!(issues[0].starts_with("mediaItems[0].actors must be an array of strings"));
        assert_eq!(
            issues[1],
            "mediaItems[0].runtime must be an integer between 0 and 4294967295, got -1"
        );
    }

    #[test]
    fn counts_beyond_the_stored_range_are_reported() {
        let value = json!({
            "mediaItems": [
                {"id": "b", "title": "Tome", "mediaType": "Book", "categories": [], "pageCount": 5_000_000_000u64},
                {"id": "m", "title": "Epic", "mediaType": "Movie", "categories": [], "runtime": 4_294_967_296u64}
            ]
        });
        let issues = messages(&value);

        assert_eq!(
            issues,
            vec![
                "mediaItems[0].pageCount must be an integer between 1 and 4294967295, got 5000000000",
                "mediaItems[1].runtime must be an integer between 0 and 4294967295, got 4294967296",
            ]
        );
    }

    #[test]
    fn rating_count_accepts_any_non_negative_number() {
        let mut value = valid_snapshot();
        value["mediaItems"][0]["ratingCount"] = json!(1200.0);
        assert!(messages(&value).is_empty());

        value["mediaItems"][0]["ratingCount"] = json!(-3);
        assert_eq!(
            messages(&value),
            vec!["mediaItems[0].ratingCount must be a number >= 0, got -3"]
        );
    }

    #[test]
    fn invalid_media_type_skips_specific_checks() {
        let value = json!({
            "mediaItems": [{"id": "x", "title": "X", "mediaType": "Podcast", "categories": [], "pageCount": 0}]
        });
        let issues = messages(&value);
        assert_eq!(issues.len(), 1);
        assert!(issues[0].starts_with("mediaItems[0].mediaType must be one of Book, Movie"));
    }

    #[test]
    fn list_color_and_items() {
        let value = json!({
            "lists": [
                {"id": "l1", "title": "A", "color": "blue", "mediaType": "Book", "items": []},
                {"id": "l2", "title": "B", "color": "#12345", "mediaType": "Book", "items": [""]},
                {"id": "l3", "title": "C", "color": "#A1b2C3", "mediaType": "Book", "items": []}
            ]
        });
        let issues = messages(&value);

        assert_eq!(issues.len(), 3, "{:#?}", issues);
        assert!(issues[0].starts_with("lists[0].color must be a hex color"));
        assert!(issues[1].starts_with("lists[1].color must be a hex color"));
        assert_eq!(issues[2], "lists[1].items[0] must be an identifier, got an empty string");
    }

    #[test]
    fn ratings_shape() {
        let value = json!({
            "mediaItems": [{
                "id": "i1", "title": "Dune", "mediaType": "Book", "categories": [],
                "ratings": [{"source": "IMDb"}, "bad", {"source": "", "value": "9"}]
            }]
        });
        let issues = messages(&value);

        assert_eq!(
            issues,
            vec![
                "mediaItems[0].ratings[0].value must be a non-empty string",
                "mediaItems[0].ratings[1] must be an object, got \"bad\"",
                "mediaItems[0].ratings[2].source must be a non-empty string",
            ]
        );
    }

    #[test]
    fn dangling_item_list_reference() {
        let value = json!({
            "mediaItems": [
                {"id": "i1", "title": "Dune", "mediaType": "Book", "categories": [], "lists": ["l1", "l9"]}
            ],
            "lists": [
                {"id": "l1", "title": "Sci-Fi", "color": "#fff", "mediaType": "Book", "items": ["i1"]}
            ]
        });
        let issues = validate_snapshot(&value, &ImportOptions::default());

        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::Referential);
        assert_eq!(
            issues[0].message,
            "mediaItems[0].lists[1] references list \"l9\" that does not exist"
        );
    }

    #[test]
    fn missing_and_mismatched_list_members_are_distinct() {
        let value = json!({
            "mediaItems": [
                {"id": "b1", "title": "Dune", "mediaType": "Book", "categories": []}
            ],
            "lists": [
                {"id": "l1", "title": "Films", "color": "#000", "mediaType": "Movie", "items": ["b1", "gone"]}
            ]
        });
        let issues = messages(&value);

        assert_eq!(
            issues,
            vec![
                "lists[0].items[0] references item \"b1\" with mediaType Book, but lists[0] has mediaType Movie",
                "lists[0].items[1] references item \"gone\" that does not exist",
            ]
        );
    }

    #[test]
    fn item_list_media_type_mismatch() {
        let value = json!({
            "mediaItems": [
                {"id": "b1", "title": "Dune", "mediaType": "Book", "categories": [], "lists": ["l1"]}
            ],
            "lists": [
                {"id": "l1", "title": "Films", "color": "#000", "mediaType": "Movie", "items": []}
            ]
        });
        let issues = messages(&value);
        assert_eq!(
            issues,
            vec!["mediaItems[0].lists[0] references list \"l1\" with mediaType Movie, but mediaItems[0] has mediaType Book"]
        );
    }

    #[test]
    fn duplicate_ids() {
        let value = json!({
            "mediaItems": [
                {"id": "i1", "title": "Dune", "mediaType": "Book", "categories": []},
                {"localId": "i1", "title": "Emma", "mediaType": "Book", "categories": []}
            ]
        });
        let issues = messages(&value);
        assert_eq!(
            issues,
            vec!["mediaItems[1] has duplicate id \"i1\" (first used by mediaItems[0])"]
        );
    }

    #[test]
    fn same_title_different_media_type() {
        let value = json!({
            "mediaItems": [
                {"id": "i1", "title": "Dune", "mediaType": "Book", "categories": []},
                {"id": "i2", "title": " DUNE ", "mediaType": "Movie", "categories": []}
            ]
        });
        let issues = validate_snapshot(&value, &ImportOptions::default());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::Referential);
        assert!(issues[0].message.starts_with("mediaItems[1] titled \" DUNE \" is a Movie"));
    }

    #[test]
    fn size_limits() {
        let options = ImportOptions {
            max_items: 1,
            max_lists: 0,
        };
        let issues = validate_snapshot(&valid_snapshot(), &options);
        let messages: Vec<_> = issues.iter().map(|i| i.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "mediaItems has 2 entries, the limit is 1",
                "lists has 1 entries, the limit is 0",
            ]
        );
    }

    #[test]
    fn wrong_top_level_types() {
        let issues = messages(&json!({"mediaItems": {}, "lists": "none"}));
        assert_eq!(
            issues,
            vec![
                "mediaItems must be an array, got an object",
                "lists must be an array, got \"none\"",
            ]
        );
    }

    #[test]
    fn field_helpers() {
        assert!(is_http_url("http://a.b/c"));
        assert!(is_http_url("https://example.com"));
        assert!(!is_http_url("https://"));
        assert!(!is_http_url("https://exa mple.com"));
        assert!(!is_http_url("example.com"));

        assert!(is_date("1999"));
        assert!(is_date("1999-02"));
        assert!(is_date("1999-02-28"));
        assert!(is_date("2016-11-11T00:00:00Z"));
        assert!(!is_date("1999-02-30"));
        assert!(!is_date("yesterday"));

        assert!(is_hex_color("#fff"));
        assert!(is_hex_color("#00FF7a"));
        assert!(!is_hex_color("#ffff"));
        assert!(!is_hex_color("fff"));
    }
}
