//! Raw order handling: input shapes, XML conversion, normalization.

pub mod normalizer;
pub mod xml;

use serde_json::Value;

/// Reserved key for the text content of an element that also carries
/// attributes or children.
pub const TEXT_KEY: &str = "_";

/// Reserved key for an element's attributes.
pub const ATTRS_KEY: &str = "$";

/// One raw order, as the conversion pipeline hands it over.
///
/// Orders arrive either as XML text or as an already-parsed tree. An
/// all-whitespace document or a null tree is an empty input: feeding one to
/// the accumulator is a no-op that touches no counters.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderInput {
    /// An XML document with an `<order>` root element.
    Xml(String),
    /// A parsed tree, in either the modern (array-wrapped) or the legacy
    /// (flat) shape.
    Tree(Value),
}

impl OrderInput {
    pub fn is_empty(&self) -> bool {
        match self {
            OrderInput::Xml(text) => text.trim().is_empty(),
            OrderInput::Tree(Value::Null) => true,
            OrderInput::Tree(Value::Bool(flag)) => !flag,
            OrderInput::Tree(Value::String(text)) => text.trim().is_empty(),
            OrderInput::Tree(_) => false,
        }
    }
}

impl From<&str> for OrderInput {
    fn from(text: &str) -> Self {
        OrderInput::Xml(text.to_string())
    }
}

impl From<String> for OrderInput {
    fn from(text: String) -> Self {
        OrderInput::Xml(text)
    }
}

impl From<Value> for OrderInput {
    fn from(tree: Value) -> Self {
        OrderInput::Tree(tree)
    }
}
