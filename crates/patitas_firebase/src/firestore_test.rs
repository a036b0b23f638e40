#[cfg(test)]
mod tests {
    use crate::firestore::{build_structured_query, build_update_write};
    use patitas_common::services::{FieldOp, Filter};
    use serde_json::{json, Value};

    #[test]
    fn test_single_filter_queries_skip_the_composite() {
        let query = build_structured_query(
            "solicitudes",
            &[Filter::equal("applicantId", "u1")],
        );
        assert_eq!(query["from"], json!([{ "collectionId": "solicitudes" }]));
        assert_eq!(
            query["where"]["fieldFilter"]["field"]["fieldPath"],
            json!("applicantId")
        );
        assert_eq!(query["where"]["fieldFilter"]["op"], json!("EQUAL"));
    }

    #[test]
    fn test_multiple_filters_compose_as_and() {
        let query = build_structured_query(
            "pins",
            &[
                Filter::equal("creatorId", "u1"),
                Filter::at_least("createdAt", "2026-08-06T00:00:00+00:00"),
            ],
        );
        let composite = &query["where"]["compositeFilter"];
        assert_eq!(composite["op"], json!("AND"));
        let filters = composite["filters"].as_array().unwrap();
        assert_eq!(filters.len(), 2);
        assert_eq!(
            filters[1]["fieldFilter"]["op"],
            json!("GREATER_THAN_OR_EQUAL")
        );
        // The range bound must travel as a timestamp, not a string.
        assert_eq!(
            filters[1]["fieldFilter"]["value"],
            json!({ "timestampValue": "2026-08-06T00:00:00+00:00" })
        );
    }

    #[test]
    fn test_no_filters_yields_bare_collection_scan() {
        let query = build_structured_query("pins", &[]);
        assert!(query.get("where").is_none());
    }

    #[test]
    fn test_update_write_splits_sets_and_transforms() {
        let write = build_update_write(
            "projects/p/databases/(default)/documents/counters/u1",
            &[
                FieldOp::set("liked.post1", Value::Null),
                FieldOp::increment("count", 1),
                FieldOp::server_time("lastUpdate"),
            ],
        );

        // The tombstone travels in the masked update document.
        assert_eq!(
            write["updateMask"]["fieldPaths"],
            json!(["liked.post1"])
        );
        assert_eq!(
            write["update"]["fields"]["liked"]["mapValue"]["fields"]["post1"],
            json!({ "nullValue": null })
        );

        // Increment and server time travel as transforms.
        let transforms = write["updateTransforms"].as_array().unwrap();
        assert_eq!(transforms.len(), 2);
        assert_eq!(
            transforms[0]["increment"],
            json!({ "integerValue": "1" })
        );
        assert_eq!(transforms[1]["setToServerValue"], json!("REQUEST_TIME"));

        // Partial updates never resurrect deleted documents.
        assert_eq!(write["currentDocument"]["exists"], json!(true));
    }
}
