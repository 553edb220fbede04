//! Serialization of [`Element`] trees back to document text.

use super::Element;
use std::fmt::Write;

impl Element {
    /// Serializes this element compactly, with no inter-element whitespace.
    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        self.write_compact(&mut out);
        out
    }

    /// Serializes this element with two-space indentation, one element per
    /// line. Elements holding only text stay on a single line.
    pub fn to_pretty_xml(&self) -> String {
        let mut out = String::new();
        self.write_pretty(&mut out, 0);
        out.push('\n');
        out
    }

    fn write_compact(&self, out: &mut String) {
        self.write_open_tag(out);
        if self.text.is_empty() && self.children.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        escape_text(&self.text, out);
        for child in &self.children {
            child.write_compact(out);
        }
        let _ = write!(out, "</{}>", self.name);
    }

    fn write_pretty(&self, out: &mut String, depth: usize) {
        let indent = "  ".repeat(depth);
        out.push_str(&indent);
        self.write_open_tag(out);
        if self.text.is_empty() && self.children.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        escape_text(&self.text, out);
        if !self.children.is_empty() {
            for child in &self.children {
                out.push('\n');
                child.write_pretty(out, depth + 1);
            }
            out.push('\n');
            out.push_str(&indent);
        }
        let _ = write!(out, "</{}>", self.name);
    }

    fn write_open_tag(&self, out: &mut String) {
        let _ = write!(out, "<{}", self.name);
        for (name, value) in &self.attributes {
            let _ = write!(out, " {name}=\"");
            escape_attr(value, out);
            out.push('"');
        }
    }
}

/// Escapes character data: `&`, `<`, and `>`.
fn escape_text(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
}

/// Escapes a double-quoted attribute value.
fn escape_attr(value: &str, out: &mut String) {
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\n' => out.push_str("&#10;"),
            _ => out.push(ch),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::parse_document;
    use super::*;

    #[test]
    fn empty_element_self_closes() {
        let el = Element::new("query");
        assert_eq!(el.to_xml(), "<query/>");
    }

    #[test]
    fn attributes_render_in_name_order() {
        let mut el = Element::new("query");
        el.set_attr("name", "q");
        el.set_attr("model", "testmodel");
        el.set_attr("view", "Employee.name");
        assert_eq!(
            el.to_xml(),
            r#"<query model="testmodel" name="q" view="Employee.name"/>"#
        );
    }

    #[test]
    fn children_and_text_render_nested() {
        let mut con = Element::new("constraint");
        con.set_attr("op", "ONE OF");
        let mut value = Element::new("value");
        value.text = "Tom".into();
        con.add_child(value);
        assert_eq!(
            con.to_xml(),
            r#"<constraint op="ONE OF"><value>Tom</value></constraint>"#
        );
    }

    #[test]
    fn escapes_attribute_values_and_text() {
        let mut el = Element::new("c");
        el.set_attr("value", r#"a<b & "c""#);
        let mut v = Element::new("value");
        v.text = "x > y & z".into();
        el.add_child(v);
        let xml = el.to_xml();
        assert!(xml.contains("a&lt;b &amp; &quot;c&quot;"));
        assert!(xml.contains("x &gt; y &amp; z"));
    }

    #[test]
    fn written_documents_parse_back() {
        let mut el = Element::new("query");
        el.set_attr("view", "Employee.name Employee.age");
        let mut con = Element::new("constraint");
        con.set_attr("value", "5 < 6 & \"q\"");
        el.add_child(con);

        let reparsed = parse_document(&el.to_xml()).unwrap();
        assert_eq!(reparsed, el);

        let reparsed_pretty = parse_document(&el.to_pretty_xml()).unwrap();
        // pretty output introduces whitespace text nodes around children
        assert_eq!(reparsed_pretty.children[0], el.children[0]);
    }

    #[test]
    fn pretty_output_indents_children() {
        let mut root = Element::new("query");
        root.set_attr("name", "q");
        root.add_child(Element::new("join"));
        let mut con = Element::new("constraint");
        let mut v = Element::new("value");
        v.text = "a".into();
        con.add_child(v);
        root.add_child(con);

        let pretty = root.to_pretty_xml();
        let expected = "<query name=\"q\">\n  <join/>\n  <constraint>\n    <value>a</value>\n  </constraint>\n</query>\n";
        assert_eq!(pretty, expected);
    }
}
