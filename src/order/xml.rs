//! XML order documents to generic trees.
//!
//! Converts an `<order>` document into the modern tree shape the normalizer
//! expects: every repeatable child element becomes an array even when
//! singular, attributes land under [`ATTRS_KEY`], and the text content of an
//! element that also carries attributes or children lands under [`TEXT_KEY`].
//! An element with nothing but text collapses to a plain string.

use roxmltree::{Document, Node};
use serde_json::{Map, Value};

use crate::error::RecordError;
use crate::order::{ATTRS_KEY, TEXT_KEY};

/// Expected root element of an order document.
pub const ROOT_TAG: &str = "order";

/// Parses an order document into the generic array-wrapped tree.
pub fn parse_order(text: &str) -> Result<Value, RecordError> {
    let document = Document::parse(text)?;
    let root = document.root_element();
    if root.tag_name().name() != ROOT_TAG {
        return Err(RecordError::UnexpectedRoot(
            root.tag_name().name().to_string(),
        ));
    }
    Ok(element_value(root))
}

fn element_value(node: Node<'_, '_>) -> Value {
    let mut attrs = Map::new();
    for attr in node.attributes() {
        attrs.insert(
            attr.name().to_string(),
            Value::String(attr.value().to_string()),
        );
    }

    let mut children: Map<String, Value> = Map::new();
    for child in node.children().filter(|child| child.is_element()) {
        let name = child.tag_name().name().to_string();
        let value = element_value(child);
        let list = children.entry(name).or_insert_with(|| Value::Array(Vec::new()));
        if let Value::Array(items) = list {
            items.push(value);
        }
    }

    let text: String = node
        .children()
        .filter(|child| child.is_text())
        .filter_map(|child| child.text())
        .collect::<String>()
        .trim()
        .to_string();

    if attrs.is_empty() && children.is_empty() {
        return Value::String(text);
    }

    let mut map = Map::new();
    if !attrs.is_empty() {
        map.insert(ATTRS_KEY.to_string(), Value::Object(attrs));
    }
    if !text.is_empty() {
        map.insert(TEXT_KEY.to_string(), Value::String(text));
    }
    for (name, list) in children {
        map.insert(name, list);
    }
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        <order id="42">
            <type>create</type>
            <estate>
                <type>house</type>
                <object currency="EUR">sale</object>
            </estate>
            <meta>
                <extid>A1</extid>
                <attachments>
                    <attachment/>
                    <attachment/>
                </attachments>
            </meta>
        </order>"#;

    #[test]
    fn test_children_are_array_wrapped() {
        let tree = parse_order(SAMPLE).unwrap();
        assert_eq!(tree["type"], serde_json::json!(["create"]));
        assert_eq!(tree["estate"][0]["type"][0], "house");
    }

    #[test]
    fn test_attributes_and_text_keys() {
        let tree = parse_order(SAMPLE).unwrap();
        // root attribute
        assert_eq!(tree[ATTRS_KEY]["id"], "42");
        // mixed element: attributes plus text content
        let object = &tree["estate"][0]["object"][0];
        assert_eq!(object[ATTRS_KEY]["currency"], "EUR");
        assert_eq!(object[TEXT_KEY], "sale");
    }

    #[test]
    fn test_repeated_elements_accumulate() {
        let tree = parse_order(SAMPLE).unwrap();
        let attachments = tree["meta"][0]["attachments"][0]["attachment"]
            .as_array()
            .unwrap();
        assert_eq!(attachments.len(), 2);
    }

    #[test]
    fn test_text_only_element_collapses_to_string() {
        let tree = parse_order("<order><type>update</type></order>").unwrap();
        assert_eq!(tree["type"][0], "update");
    }

    #[test]
    fn test_unexpected_root_is_rejected() {
        let err = parse_order("<listing/>").unwrap_err();
        assert!(matches!(err, RecordError::UnexpectedRoot(name) if name == "listing"));
    }

    #[test]
    fn test_malformed_xml_is_rejected() {
        assert!(matches!(
            parse_order("<order><type>create</order>"),
            Err(RecordError::Xml(_))
        ));
    }
}
