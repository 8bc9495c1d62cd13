//! Normalization of embedded one-to-one relations.
//!
//! Aggregations built with `json_agg` (and the RPC procedures) hand back
//! single related rows as one-element arrays. Callers want a plain object.

use serde_json::{Map, Value};

/// `[x]` becomes `x`, `[]` and `null` become `None`, objects pass through.
///
/// Arrays with more than one element keep their first element.
pub fn normalize_relation(value: Option<Value>) -> Option<Value> {
    match value? {
        Value::Null => None,
        Value::Array(items) => items.into_iter().find(|item| !item.is_null()),
        other => Some(other),
    }
}

/// Normalize each named relation field of a JSON object in place
pub fn normalize_fields(object: &mut Map<String, Value>, fields: &[&str]) {
    for field in fields {
        let Some(raw) = object.remove(*field) else {
            continue;
        };
        match normalize_relation(Some(raw)) {
            Some(value) => {
                object.insert((*field).to_string(), value);
            }
            None => {
                object.insert((*field).to_string(), Value::Null);
            }
        }
    }
}

/// Read a string field of a normalized relation
pub fn relation_str(relation: Option<&Value>, field: &str) -> Option<String> {
    relation
        .and_then(|value| value.get(field))
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_singleton_array_becomes_object() {
        let value = normalize_relation(Some(json!([{ "id": 1, "name": "Boxer Club" }])));
        assert_eq!(value, Some(json!({ "id": 1, "name": "Boxer Club" })));
    }

    #[test]
    fn test_empty_and_null_become_none() {
        assert_eq!(normalize_relation(Some(json!([]))), None);
        assert_eq!(normalize_relation(Some(Value::Null)), None);
        assert_eq!(normalize_relation(None), None);
    }

    #[test]
    fn test_object_passes_through() {
        let value = normalize_relation(Some(json!({ "username": "apex" })));
        assert_eq!(value, Some(json!({ "username": "apex" })));
    }

    #[test]
    fn test_normalize_fields_in_place() {
        let mut object = json!({
            "id": "c1",
            "owner": [{ "username": "apex" }],
            "club": []
        })
        .as_object()
        .cloned()
        .unwrap();

        normalize_fields(&mut object, &["owner", "club", "missing"]);

        assert_eq!(object["owner"], json!({ "username": "apex" }));
        assert_eq!(object["club"], Value::Null);
        assert!(!object.contains_key("missing"));
        assert_eq!(
            relation_str(object.get("owner"), "username"),
            Some("apex".to_string())
        );
    }
}
