//! Wire-format tests for the library import/export protocol.
//!
//! These run without a database: they check the JSON shapes clients send
//! and receive, using the engine types the server serializes.

use serde_json::json;
use shelf_engine::{
    ImportOptions, ImportOutcome, ImportReport, LibrarySnapshot, MemoryStore,
    SNAPSHOT_FORMAT_VERSION,
};

/// A snapshot as the web client sends it, using `_id` and `localId` identifiers.
fn client_snapshot() -> serde_json::Value {
    json!({
        "mediaItems": [
            {
                "_id": "64f0c2",
                "title": "Dune",
                "mediaType": "Book",
                "categories": ["Science Fiction"],
                "author": "Frank Herbert",
                "ISBN": "9780441013593",
                "pageCount": 412,
                "status": "in-progress",
                "progress": 120,
                "lists": ["64f0d9"]
            },
            {
                "localId": "m-1",
                "title": "Arrival",
                "mediaType": "Movie",
                "categories": [],
                "director": "Denis Villeneuve",
                "imdbID": "tt2543164",
                "runtime": 116,
                "ratings": [{"source": "Rotten Tomatoes", "value": "94%"}],
                "lists": []
            }
        ],
        "lists": [
            {"_id": "64f0d9", "title": "Sci-Fi", "color": "#3366ff", "mediaType": "Book", "items": ["64f0c2"]}
        ]
    })
}

#[cfg(test)]
mod protocol_tests {
    use super::*;

    #[test]
    fn test_import_response_shape() {
        let mut store = MemoryStore::new();
        store.add_owner("user-1");

        let outcome = store
            .import("user-1", &client_snapshot(), &ImportOptions::default(), 1706745600000)
            .unwrap();
        let ImportOutcome::Imported { library, report } = outcome else {
            panic!("expected import");
        };

        let body = json!({"library": library, "report": report});
        assert_eq!(body["library"]["formatVersion"], SNAPSHOT_FORMAT_VERSION);
        assert_eq!(body["library"]["exportedAt"], "2024-02-01T00:00:00Z");
        assert_eq!(body["library"]["mediaItems"].as_array().unwrap().len(), 2);
        assert_eq!(body["report"]["itemsCreated"], 2);
        assert_eq!(body["report"]["listsCreated"], 1);
        assert_eq!(body["report"]["backReferencesAdded"], 1);

        let dune = &body["library"]["mediaItems"][0];
        assert_eq!(dune["ISBN"], "9780441013593");
        assert_eq!(dune["status"], "in-progress");
        assert!(dune.get("_id").is_none());
        assert!(dune["id"].is_string());
    }

    #[test]
    fn test_validation_errors_are_strings() {
        let mut store = MemoryStore::new();
        store.add_owner("user-1");

        let mut snapshot = client_snapshot();
        snapshot["lists"][0]["color"] = json!("blue");
        snapshot["mediaItems"][1]["lists"] = json!(["64f0d9"]);

        let outcome = store
            .import("user-1", &snapshot, &ImportOptions::default(), 0)
            .unwrap();
        let errors = outcome.error_messages();

        // The server answers 422 with exactly these strings
        assert_eq!(
            json!({"errors": errors}),
            json!({"errors": [
                "lists[0].color must be a hex color (#RGB or #RRGGBB), got \"blue\"",
                "mediaItems[1].lists[0] references list \"64f0d9\" with mediaType Book, but mediaItems[1] has mediaType Movie"
            ]})
        );
    }

    #[test]
    fn test_export_is_importable() {
        let mut store = MemoryStore::new();
        store.add_owner("user-1");
        store
            .import("user-1", &client_snapshot(), &ImportOptions::default(), 1)
            .unwrap();

        let export = shelf_engine::export_library(&store, "user-1", 2).unwrap();
        let text = export.to_json_pretty().unwrap();
        let parsed = LibrarySnapshot::from_json(&text).unwrap();
        assert_eq!(parsed, export);

        let outcome = store
            .import("user-1", &serde_json::from_str(&text).unwrap(), &ImportOptions::default(), 3)
            .unwrap();
        let ImportOutcome::Imported { report, .. } = outcome else {
            panic!("expected import");
        };
        assert_eq!(
            report,
            ImportReport {
                items_updated: 2,
                lists_merged: 1,
                ..ImportReport::default()
            }
        );
    }

    #[test]
    fn test_report_field_names() {
        let value = serde_json::to_value(ImportReport::default()).unwrap();
        let mut keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec![
                "backReferencesAdded",
                "itemsCreated",
                "itemsUpdated",
                "listsCreated",
                "listsMerged"
            ]
        );
    }
}
