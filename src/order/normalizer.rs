//! Record normalization.
//!
//! Extracts the fields the aggregation engine needs from either input shape.
//! Modern trees follow the list-from-XML convention where every repeatable
//! field is array-wrapped; legacy trees carry flat, singular values. The two
//! extraction paths are intentionally kept separate: legacy feeds have their
//! own field layout, and the branches do not behave identically around
//! text-content unwrapping.

use serde_json::Value;

use crate::error::RecordError;
use crate::models::NormalizedRecord;
use crate::order::{xml, OrderInput, ATTRS_KEY, TEXT_KEY};

/// Turns one raw order into the flat record the aggregation engine consumes.
pub fn normalize(input: &OrderInput) -> Result<NormalizedRecord, RecordError> {
    match input {
        OrderInput::Xml(text) => Ok(modern(&xml::parse_order(text)?)),
        // a tree input that is a bare string is still an XML document
        OrderInput::Tree(Value::String(text)) => Ok(modern(&xml::parse_order(text)?)),
        OrderInput::Tree(tree @ Value::Object(_)) => {
            if is_modern(tree) {
                Ok(modern(tree))
            } else {
                Ok(legacy(tree))
            }
        }
        OrderInput::Tree(_) => Err(RecordError::InvalidInput),
    }
}

/// Modern trees wrap every repeatable field in an array, `type` included.
pub fn is_modern(order: &Value) -> bool {
    matches!(order.get("type"), Some(Value::Array(_)))
}

fn modern(order: &Value) -> NormalizedRecord {
    NormalizedRecord {
        external_id: first_non_empty([
            string_at(order, "meta.0.extid.0"),
            text_at(order, "meta.0.extid.0"),
            root_id(order),
        ]),
        operation: tag_text(lookup(order, "type.0")),
        estate_type: tag_text(lookup(order, "estate.0.type.0")),
        object_type: tag_text(lookup(order, "estate.0.object.0")),
        photo_count: sequence_len(lookup(order, "meta.0.attachments.0.attachment")),
        advanced: lookup(order, "meta.0.advstat.0").cloned(),
    }
}

fn legacy(order: &Value) -> NormalizedRecord {
    NormalizedRecord {
        external_id: first_non_empty([
            string_at(order, "meta.extid.0"),
            text_at(order, "meta.extid"),
            root_id(order),
        ]),
        operation: tag_text(lookup(order, "type")),
        estate_type: tag_text(lookup(order, "estate.type")),
        object_type: tag_text(lookup(order, "estate.object")),
        photo_count: sequence_len(lookup(order, "meta.attachments.attachment")),
        advanced: lookup(order, "meta.advstat").cloned(),
    }
}

/// Value at a dot-separated path; numeric segments index into arrays.
fn lookup<'a>(tree: &'a Value, path: &str) -> Option<&'a Value> {
    let mut node = tree;
    for segment in path.split('.') {
        node = match node {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(node)
}

/// Text content of a field value: the value itself when it is a string, its
/// reserved text sub-key when the element carried attributes.
fn tag_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(text) => Some(text.clone()),
        Value::Object(map) => match map.get(TEXT_KEY) {
            Some(Value::String(text)) => Some(text.clone()),
            _ => None,
        },
        _ => None,
    }
}

fn string_at(tree: &Value, path: &str) -> Option<String> {
    match lookup(tree, path)? {
        Value::String(text) => Some(text.clone()),
        _ => None,
    }
}

fn text_at(tree: &Value, path: &str) -> Option<String> {
    match lookup(tree, path)? {
        Value::Object(map) => match map.get(TEXT_KEY) {
            Some(Value::String(text)) => Some(text.clone()),
            _ => None,
        },
        _ => None,
    }
}

fn root_id(order: &Value) -> Option<String> {
    match order.get(ATTRS_KEY)?.get("id")? {
        Value::String(id) => Some(id.clone()),
        _ => None,
    }
}

fn first_non_empty(candidates: [Option<String>; 3]) -> Option<String> {
    candidates
        .into_iter()
        .flatten()
        .find(|value| !value.is_empty())
}

fn sequence_len(value: Option<&Value>) -> usize {
    value.and_then(Value::as_array).map_or(0, Vec::len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_modern_extraction() {
        let order = json!({
            "type": ["create"],
            "estate": [{"type": ["house"], "object": ["sale"]}],
            "meta": [{
                "extid": ["A1"],
                "attachments": [{"attachment": [{}, {}]}],
            }],
        });

        let record = normalize(&OrderInput::Tree(order)).unwrap();
        assert_eq!(record.external_id.as_deref(), Some("A1"));
        assert_eq!(record.operation.as_deref(), Some("create"));
        assert_eq!(record.estate_type.as_deref(), Some("house"));
        assert_eq!(record.object_type.as_deref(), Some("sale"));
        assert_eq!(record.photo_count, 2);
        assert!(record.advanced.is_none());
    }

    #[test]
    fn test_modern_text_subkey_unwrapping() {
        let order = json!({
            "type": [{"$": {"lang": "en"}, "_": "update"}],
            "estate": [{"type": [{"_": "flat"}], "object": ["rent"]}],
            "meta": [{"extid": [{"$": {"source": "crm"}, "_": "B7"}]}],
        });

        let record = normalize(&OrderInput::Tree(order)).unwrap();
        assert_eq!(record.external_id.as_deref(), Some("B7"));
        assert_eq!(record.operation.as_deref(), Some("update"));
        assert_eq!(record.estate_type.as_deref(), Some("flat"));
        assert_eq!(record.photo_count, 0);
    }

    #[test]
    fn test_legacy_extraction() {
        let order = json!({
            "type": "create",
            "estate": {"type": "house", "object": "sale"},
            "meta": {"extid": {"_": "A2"}},
        });

        let record = normalize(&OrderInput::Tree(order)).unwrap();
        assert_eq!(record.external_id.as_deref(), Some("A2"));
        assert_eq!(record.operation.as_deref(), Some("create"));
        assert_eq!(record.estate_type.as_deref(), Some("house"));
        assert_eq!(record.object_type.as_deref(), Some("sale"));
    }

    #[test]
    fn test_legacy_plain_extid_falls_back_to_root_id() {
        // the legacy branch only reads extid as a sequence head or via the
        // text sub-key; a bare string falls through to the root id attribute
        let order = json!({
            "$": {"id": "R5"},
            "type": "create",
            "meta": {"extid": "A2"},
        });

        let record = normalize(&OrderInput::Tree(order)).unwrap();
        assert_eq!(record.external_id.as_deref(), Some("R5"));
    }

    #[test]
    fn test_shape_detection() {
        assert!(is_modern(&json!({"type": ["create"]})));
        assert!(!is_modern(&json!({"type": "create"})));
        assert!(!is_modern(&json!({})));
    }

    #[test]
    fn test_missing_fields_stay_absent() {
        let record = normalize(&OrderInput::Tree(json!({}))).unwrap();
        assert_eq!(record.operation, None);
        assert_eq!(record.estate_type, None);
        assert_eq!(record.object_type, None);
        assert_eq!(record.external_id, None);
        assert_eq!(record.photo_count, 0);
        assert_eq!(record.operation_key(), "undefined");
    }

    #[test]
    fn test_advanced_payload_passthrough() {
        let order = json!({
            "type": ["create"],
            "meta": [{"advstat": [{"paid": true, "amount": 12}]}],
        });

        let record = normalize(&OrderInput::Tree(order)).unwrap();
        assert_eq!(record.advanced, Some(json!({"paid": true, "amount": 12})));
    }

    #[test]
    fn test_invalid_input_rejected() {
        assert!(matches!(
            normalize(&OrderInput::Tree(json!(42))),
            Err(RecordError::InvalidInput)
        ));
        assert!(matches!(
            normalize(&OrderInput::Tree(json!([1, 2]))),
            Err(RecordError::InvalidInput)
        ));
    }

    #[test]
    fn test_xml_input_normalizes_as_modern() {
        let xml = r#"
            <order id="9">
                <type>create</type>
                <estate><type>house</type><object>sale</object></estate>
                <meta>
                    <extid>A1</extid>
                    <attachments><attachment/><attachment/><attachment/></attachments>
                </meta>
            </order>"#;

        let record = normalize(&OrderInput::from(xml)).unwrap();
        assert_eq!(record.external_id.as_deref(), Some("A1"));
        assert_eq!(record.operation.as_deref(), Some("create"));
        assert_eq!(record.photo_count, 3);
    }
}
