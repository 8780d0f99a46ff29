//! Untyped XML tree shared by the typed resource mapping.
//!
//! Elements become ordered maps keyed by child name. Attributes are stored
//! under `@name` keys and mixed text under `#text`. A child name that repeats
//! is collected into a [`XmlValue::List`]; a child that appears once is stored
//! as-is, so a list of one cannot be told apart from a scalar until a typed
//! reader resolves it through [`OneOrMany`].

mod parser;
mod writer;

use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

pub use parser::parse_document;
pub use writer::{write_document, write_document_pretty};

/// Key prefix marking an attribute entry.
pub const ATTRIBUTE_PREFIX: char = '@';

/// Key of the text content of an element that also has attributes or children.
pub const TEXT_KEY: &str = "#text";

/// A node of the parsed (or to-be-written) XML tree.
#[derive(Debug, Clone, PartialEq)]
pub enum XmlValue {
    /// A text-only element or an attribute value.
    Text(String),
    /// An element with attributes and/or children. Empty elements are empty maps.
    Map(XmlMap),
    /// The same child element repeated, in document order.
    List(Vec<XmlValue>),
}

impl XmlValue {
    /// Text content, if this node carries any. An empty element has empty text.
    pub fn text(&self) -> Option<&str> {
        match self {
            XmlValue::Text(text) => Some(text),
            XmlValue::Map(map) if map.is_empty() => Some(""),
            XmlValue::Map(map) => map.get(TEXT_KEY).and_then(XmlValue::text),
            XmlValue::List(_) => None,
        }
    }

    pub fn as_map(&self) -> Option<&XmlMap> {
        match self {
            XmlValue::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Splits a child entry at the single-vs-list ambiguity.
    pub fn one_or_many(&self) -> OneOrMany<&XmlValue> {
        match self {
            XmlValue::List(items) => OneOrMany::Many(items.iter().collect()),
            other => OneOrMany::One(other),
        }
    }
}

/// A child entry that was either a lone element or a repeated one.
#[derive(Debug, Clone, PartialEq)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    /// Normalizes to a sequence. A lone element becomes a one-element vector.
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(item) => vec![item],
            OneOrMany::Many(items) => items,
        }
    }
}

/// Insertion-ordered element content.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XmlMap {
    entries: Vec<(String, XmlValue)>,
}

impl XmlMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// A document holding a single root element.
    pub fn with_root(name: impl Into<String>, value: XmlValue) -> Self {
        let mut map = Self::new();
        map.insert(name, value);
        map
    }

    /// Sets `key`, replacing an existing entry in place.
    pub fn insert(&mut self, key: impl Into<String>, value: XmlValue) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Adds a parsed child. A repeated key turns the entry into a list.
    pub fn push_repeated(&mut self, key: impl Into<String>, value: XmlValue) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, XmlValue::List(items))) => items.push(value),
            Some(entry) => {
                let first = core::mem::replace(&mut entry.1, XmlValue::List(Vec::new()));
                entry.1 = XmlValue::List(vec![first, value]);
            }
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&XmlValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &XmlValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_repeated_collects_list_in_order() {
        let mut map = XmlMap::new();
        map.push_repeated("EndDevice", XmlValue::Text("a".into()));
        assert!(matches!(map.get("EndDevice"), Some(XmlValue::Text(_))));

        map.push_repeated("EndDevice", XmlValue::Text("b".into()));
        map.push_repeated("EndDevice", XmlValue::Text("c".into()));
        let items = map.get("EndDevice").unwrap().one_or_many().into_vec();
        let texts: Vec<_> = items.iter().filter_map(|v| v.text()).collect();
        assert_eq!(texts, ["a", "b", "c"]);
    }

    #[test]
    fn test_single_value_normalizes_to_one_element() {
        let value = XmlValue::Map(XmlMap::new());
        assert_eq!(value.one_or_many().into_vec().len(), 1);
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut map = XmlMap::new();
        map.insert("a", XmlValue::Text("1".into()));
        map.insert("b", XmlValue::Text("2".into()));
        map.insert("a", XmlValue::Text("3".into()));
        let keys: Vec<_> = map.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["a", "b"]);
        assert_eq!(map.get("a").and_then(XmlValue::text), Some("3"));
    }

    #[test]
    fn test_text_of_attributed_element() {
        let mut map = XmlMap::new();
        map.insert("@href", XmlValue::Text("/edev/1".into()));
        map.insert(TEXT_KEY, XmlValue::Text("42".into()));
        assert_eq!(XmlValue::Map(map).text(), Some("42"));
    }

    #[test]
    fn test_text_of_empty_and_attribute_only_elements() {
        assert_eq!(XmlValue::Map(XmlMap::new()).text(), Some(""));

        let mut link = XmlMap::new();
        link.insert("@href", XmlValue::Text("/edev/1".into()));
        assert_eq!(XmlValue::Map(link).text(), None);
    }
}
