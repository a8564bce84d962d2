//! Tests for record extraction

use super::*;
use crate::error::ErrorKind;
use pretty_assertions::assert_eq;
use serde_json::json;
use test_case::test_case;

#[test]
fn test_empty_path_uses_whole_body() {
    let extractor = RecordExtractor::new("").with_primary_key(["id"]);
    let records = extractor
        .extract(&json!([{"id": "a"}, {"id": "b"}]))
        .unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].primary_key, json!("a"));
    assert_eq!(records[1].primary_key, json!("b"));
}

#[test]
fn test_nested_path() {
    let extractor = RecordExtractor::new("data.items").with_primary_key(["id"]);
    let body = json!({"data": {"items": [{"id": 1}, {"id": 2}, {"id": 3}]}});

    let ids: Vec<_> = extractor
        .extract(&body)
        .unwrap()
        .into_iter()
        .map(|r| r.primary_key)
        .collect();
    assert_eq!(ids, vec![json!(1), json!(2), json!(3)]);
}

#[test]
fn test_indexed_path() {
    let extractor = RecordExtractor::new("pages[-1].rows");
    let body = json!({"pages": [{"rows": [{"n": 1}]}, {"rows": [{"n": 2}]}]});

    let records = extractor.extract(&body).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].data, json!({"n": 2}));
    assert_eq!(records[0].primary_key, json!(null));
}

#[test]
fn test_jsonpath_wildcard() {
    let extractor = RecordExtractor::new("$.groups[*].members[*]").with_primary_key(["id"]);
    let body = json!({
        "groups": [
            {"members": [{"id": "a"}, {"id": "b"}]},
            {"members": [{"id": "c"}]}
        ]
    });

    let ids: Vec<_> = extractor
        .extract(&body)
        .unwrap()
        .into_iter()
        .map(|r| r.primary_key)
        .collect();
    assert_eq!(ids, vec![json!("a"), json!("b"), json!("c")]);
}

#[test]
fn test_empty_array_yields_no_records() {
    let extractor = RecordExtractor::new("").with_primary_key(["id"]);
    assert!(extractor.extract(&json!([])).unwrap().is_empty());
}

#[test_case(json!({"id": 1}), "" ; "object instead of array")]
#[test_case(json!("text"), "" ; "string body")]
#[test_case(json!({"data": 5}), "data" ; "number at path")]
#[test_case(json!({"other": []}), "data" ; "path missing")]
#[test_case(json!([1, 2]), "" ; "array of scalars")]
fn test_shape_mismatch_is_extraction_error(body: serde_json::Value, path: &str) {
    let extractor = RecordExtractor::new(path);
    let err = extractor.extract(&body).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Extraction);
}

#[test]
fn test_missing_primary_key_is_reported() {
    let extractor = RecordExtractor::new("").with_primary_key(["id"]);
    let err = extractor
        .extract(&json!([{"id": "a"}, {"name": "no id"}]))
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::MissingField);
    assert!(err.to_string().contains("'id'"));
}

#[test]
fn test_null_primary_key_is_missing() {
    let extractor = RecordExtractor::new("").with_primary_key(["id"]);
    let err = extractor.extract(&json!([{"id": null}])).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingField);
}

#[test]
fn test_composite_primary_key() {
    let extractor = RecordExtractor::new("").with_primary_key(["account", "id"]);
    let records = extractor
        .extract(&json!([{"account": "x", "id": 7}]))
        .unwrap();
    assert_eq!(records[0].primary_key, json!(["x", 7]));
}

#[test]
fn test_cursor_value_read_when_present() {
    let extractor = RecordExtractor::new("")
        .with_primary_key(["id"])
        .with_cursor_field("updated_at");

    let records = extractor
        .extract(&json!([
            {"id": "c1", "updated_at": 1_675_000_000_000_i64},
            {"id": "c2"}
        ]))
        .unwrap();

    assert_eq!(records[0].cursor_value, Some(json!(1_675_000_000_000_i64)));
    assert_eq!(records[1].cursor_value, None);
}

#[test]
fn test_extraction_is_repeatable() {
    let extractor = RecordExtractor::new("data").with_primary_key(["id"]);
    let body = json!({"data": [{"id": 1, "v": "a"}, {"id": 2, "v": "b"}]});

    assert_eq!(
        extractor.extract(&body).unwrap(),
        extractor.extract(&body).unwrap()
    );
}

#[test]
fn test_lookup_helpers() {
    let body = json!({"meta": {"next": "abc", "count": 3, "items": [{"k": true}]}});
    assert_eq!(lookup_scalar(&body, "meta.next"), Some("abc".to_string()));
    assert_eq!(lookup_scalar(&body, "$.meta.count"), Some("3".to_string()));
    assert_eq!(lookup_scalar(&body, "meta.items[0].k"), Some("true".to_string()));
    assert_eq!(lookup_scalar(&body, "meta.items"), None);
    assert_eq!(lookup(&body, "meta.items[5]"), None);
    assert_eq!(lookup(&body, "meta.items[-2]"), None);
}
