//! Minimal XML reading and writing for schema and query documents.
//!
//! The documents this crate exchanges with a warehouse service are a small,
//! well-behaved XML subset: elements, attributes, character data, comments,
//! a leading declaration, and the standard entities. This module implements
//! exactly that subset with byte-accurate error positions; it does not try
//! to be a general XML processor (no namespaces, no CDATA, no processing
//! instructions beyond the declaration).

pub mod reader;
pub mod writer;

pub use reader::{XmlError, parse_document};

use smol_str::SmolStr;
use std::collections::BTreeMap;

/// An element node in a parsed or under-construction document.
///
/// Attributes are kept name-ordered, which makes serialization canonical
/// regardless of the order they were set in. Character data directly inside
/// the element is concatenated into `text`, with entities already decoded.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    /// Tag name.
    pub name: SmolStr,
    /// Attributes, ordered by name.
    pub attributes: BTreeMap<SmolStr, String>,
    /// Child elements in document order.
    pub children: Vec<Element>,
    /// Concatenated character data directly under this element.
    pub text: String,
}

impl Element {
    /// Creates an empty element with the given tag name.
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            attributes: BTreeMap::new(),
            children: Vec::new(),
            text: String::new(),
        }
    }

    /// Sets an attribute, replacing any existing value for the same name.
    pub fn set_attr(&mut self, name: impl Into<SmolStr>, value: impl Into<String>) {
        self.attributes.insert(name.into(), value.into());
    }

    /// Returns the value of the named attribute, if present.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(|v| v.as_str())
    }

    /// Returns the named attribute treating an empty value as absent.
    ///
    /// Serialized queries routinely carry empty attributes for fields that
    /// do not apply, so most readers want this rather than [`Element::attr`].
    pub fn attr_non_empty(&self, name: &str) -> Option<&str> {
        self.attr(name).filter(|v| !v.is_empty())
    }

    /// Appends a child element.
    pub fn add_child(&mut self, child: Element) {
        self.children.push(child);
    }

    /// Direct children with the given tag name, in document order.
    pub fn child_elements<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// This element (if its name matches) and all matching descendants,
    /// in document order.
    pub fn find_all<'a>(&'a self, name: &str) -> Vec<&'a Element> {
        let mut found = Vec::new();
        self.collect_named(name, &mut found);
        found
    }

    fn collect_named<'a>(&'a self, name: &str, found: &mut Vec<&'a Element>) {
        if self.name == name {
            found.push(self);
        }
        for child in &self.children {
            child.collect_named(name, found);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_attr_replaces_existing() {
        let mut el = Element::new("query");
        el.set_attr("name", "first");
        el.set_attr("name", "second");
        assert_eq!(el.attributes.len(), 1);
        assert_eq!(el.attr("name"), Some("second"));
    }

    #[test]
    fn attr_non_empty_treats_empty_as_absent() {
        let mut el = Element::new("constraint");
        el.set_attr("value", "");
        el.set_attr("op", "=");
        assert_eq!(el.attr("value"), Some(""));
        assert_eq!(el.attr_non_empty("value"), None);
        assert_eq!(el.attr_non_empty("op"), Some("="));
        assert_eq!(el.attr_non_empty("code"), None);
    }

    #[test]
    fn find_all_includes_self_and_descendants() {
        let mut root = Element::new("template");
        let mut query = Element::new("query");
        query.add_child(Element::new("constraint"));
        query.add_child(Element::new("constraint"));
        root.add_child(query);

        assert_eq!(root.find_all("query").len(), 1);
        assert_eq!(root.find_all("constraint").len(), 2);
        assert_eq!(root.find_all("template").len(), 1);
    }

    #[test]
    fn child_elements_filters_direct_children_only() {
        let mut con = Element::new("constraint");
        let mut value = Element::new("value");
        value.text = "zero".into();
        value.add_child(Element::new("value"));
        con.add_child(value);

        // nested value is not a direct child of the constraint
        assert_eq!(con.child_elements("value").count(), 1);
    }
}
