//! A character-level reader for the XML subset used by schema and query
//! documents.
//!
//! The reader scans byte-positioned source text and builds an [`Element`]
//! tree. Errors carry the byte span of the offending input so they can be
//! rendered against the document via the diagnostic bridge.

use super::Element;
use crate::diag::{Diag, Span};
use smol_str::SmolStr;
use std::fmt;

/// Errors raised while reading a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlError {
    /// Input ended while the reader expected more.
    UnexpectedEnd { expected: String, span: Span },
    /// A character that cannot appear here.
    Unexpected {
        found: char,
        expected: String,
        span: Span,
    },
    /// A closing tag that does not match the open element.
    MismatchedClose {
        open: SmolStr,
        close: SmolStr,
        span: Span,
    },
    /// An entity or character reference that cannot be decoded.
    InvalidEntity { entity: String, span: Span },
    /// A construct outside the supported subset (e.g. CDATA).
    Unsupported { construct: String, span: Span },
    /// Document-level shape problems (no root, trailing content).
    Malformed { detail: String, span: Span },
}

impl XmlError {
    /// The byte span of the offending input.
    pub fn span(&self) -> Span {
        match self {
            XmlError::UnexpectedEnd { span, .. }
            | XmlError::Unexpected { span, .. }
            | XmlError::MismatchedClose { span, .. }
            | XmlError::InvalidEntity { span, .. }
            | XmlError::Unsupported { span, .. }
            | XmlError::Malformed { span, .. } => span.clone(),
        }
    }

    /// Converts this error to a diagnostic labelled against the document.
    pub fn to_diag(&self) -> Diag {
        match self {
            XmlError::UnexpectedEnd { expected, span } => {
                Diag::error(format!("unexpected end of document, expected {expected}"))
                    .with_primary_label(span.clone(), "document ends here")
                    .with_code("xml::eof")
            }
            XmlError::Unexpected {
                found, expected, ..
            } => Diag::error(format!("unexpected character '{found}', expected {expected}"))
                .with_primary_label(self.span(), "here")
                .with_code("xml::unexpected"),
            XmlError::MismatchedClose { open, close, span } => {
                Diag::error(format!("closing tag '{close}' does not match open tag '{open}'"))
                    .with_primary_label(span.clone(), "mismatched closing tag")
                    .with_code("xml::mismatch")
            }
            XmlError::InvalidEntity { entity, span } => {
                Diag::error(format!("cannot decode entity '&{entity};'"))
                    .with_primary_label(span.clone(), "unknown entity")
                    .with_code("xml::entity")
            }
            XmlError::Unsupported { construct, span } => {
                Diag::error(format!("unsupported construct: {construct}"))
                    .with_primary_label(span.clone(), "not in the supported subset")
                    .with_code("xml::unsupported")
            }
            XmlError::Malformed { detail, span } => Diag::error(format!("malformed document: {detail}"))
                .with_primary_label(span.clone(), "here")
                .with_code("xml::malformed"),
        }
    }
}

impl fmt::Display for XmlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            XmlError::UnexpectedEnd { expected, span } => {
                write!(
                    f,
                    "unexpected end of document at byte {}, expected {}",
                    span.start, expected
                )
            }
            XmlError::Unexpected {
                found,
                expected,
                span,
            } => write!(
                f,
                "unexpected character '{}' at byte {}, expected {}",
                found, span.start, expected
            ),
            XmlError::MismatchedClose { open, close, span } => write!(
                f,
                "closing tag '{}' at byte {} does not match open tag '{}'",
                close, span.start, open
            ),
            XmlError::InvalidEntity { entity, span } => {
                write!(f, "cannot decode entity '&{};' at byte {}", entity, span.start)
            }
            XmlError::Unsupported { construct, span } => {
                write!(f, "unsupported construct at byte {}: {}", span.start, construct)
            }
            XmlError::Malformed { detail, span } => {
                write!(f, "malformed document at byte {}: {}", span.start, detail)
            }
        }
    }
}

impl std::error::Error for XmlError {}

/// Parses a document and returns its root element.
///
/// Leading declarations, comments, and a DOCTYPE are skipped; content after
/// the root element (other than whitespace and comments) is an error.
pub fn parse_document(source: &str) -> Result<Element, XmlError> {
    Reader::new(source).document()
}

/// A document reader over byte-positioned source text.
struct Reader<'a> {
    /// The source text being read.
    source: &'a str,
    /// Current byte position in source.
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(source: &'a str) -> Self {
        Self { source, pos: 0 }
    }

    fn document(&mut self) -> Result<Element, XmlError> {
        self.skip_misc()?;
        if self.is_at_end() {
            return Err(XmlError::Malformed {
                detail: "no root element".into(),
                span: self.pos..self.pos,
            });
        }
        let root = self.element()?;
        self.skip_misc()?;
        if !self.is_at_end() {
            return Err(XmlError::Malformed {
                detail: "content after the root element".into(),
                span: self.pos..self.source.len(),
            });
        }
        Ok(root)
    }

    /// Skips whitespace, comments, a declaration, and a DOCTYPE.
    fn skip_misc(&mut self) -> Result<(), XmlError> {
        loop {
            match self.peek() {
                ' ' | '\t' | '\r' | '\n' => {
                    self.advance();
                }
                '<' if self.starts_with("<?") => self.skip_until("?>", "declaration")?,
                '<' if self.starts_with("<!--") => self.skip_until("-->", "comment")?,
                '<' if self.starts_with("<!DOCTYPE") => self.skip_until(">", "DOCTYPE")?,
                _ => break,
            }
        }
        Ok(())
    }

    /// Consumes input up to and including `terminator`.
    fn skip_until(&mut self, terminator: &str, construct: &str) -> Result<(), XmlError> {
        let start = self.pos;
        while !self.is_at_end() {
            if self.starts_with(terminator) {
                self.pos += terminator.len();
                return Ok(());
            }
            self.advance();
        }
        Err(XmlError::UnexpectedEnd {
            expected: format!("end of {construct}"),
            span: start..self.pos,
        })
    }

    /// Reads one element: `<name attrs>` content `</name>` or `<name attrs/>`.
    fn element(&mut self) -> Result<Element, XmlError> {
        let open_start = self.pos;
        self.expect('<')?;
        let name = self.name("element name")?;
        let mut element = Element::new(name.clone());

        loop {
            self.skip_whitespace();
            match self.peek() {
                '/' => {
                    self.advance();
                    self.expect('>')?;
                    return Ok(element);
                }
                '>' => {
                    self.advance();
                    self.content(&mut element, open_start)?;
                    return Ok(element);
                }
                '\0' => {
                    return Err(XmlError::UnexpectedEnd {
                        expected: format!("end of '{name}' start tag"),
                        span: open_start..self.pos,
                    });
                }
                _ => {
                    let (attr_name, value) = self.attribute()?;
                    element.attributes.insert(attr_name, value);
                }
            }
        }
    }

    /// Reads element content up to and including the matching closing tag.
    fn content(&mut self, element: &mut Element, open_start: usize) -> Result<(), XmlError> {
        loop {
            if self.is_at_end() {
                return Err(XmlError::UnexpectedEnd {
                    expected: format!("closing tag for '{}'", element.name),
                    span: open_start..self.pos,
                });
            }
            if self.starts_with("</") {
                let close_start = self.pos;
                self.pos += 2;
                let close = self.name("closing tag name")?;
                self.skip_whitespace();
                self.expect('>')?;
                if close != element.name {
                    return Err(XmlError::MismatchedClose {
                        open: element.name.clone(),
                        close,
                        span: close_start..self.pos,
                    });
                }
                return Ok(());
            }
            if self.starts_with("<!--") {
                self.skip_until("-->", "comment")?;
                continue;
            }
            if self.starts_with("<![CDATA[") {
                return Err(XmlError::Unsupported {
                    construct: "CDATA section".into(),
                    span: self.pos..self.pos + 9,
                });
            }
            if self.peek() == '<' {
                let child = self.element()?;
                element.children.push(child);
                continue;
            }
            self.character_data(element)?;
        }
    }

    /// Accumulates character data (entities decoded) into the element text.
    fn character_data(&mut self, element: &mut Element) -> Result<(), XmlError> {
        while !self.is_at_end() && self.peek() != '<' {
            if self.peek() == '&' {
                let decoded = self.entity()?;
                element.text.push(decoded);
            } else {
                element.text.push(self.advance());
            }
        }
        Ok(())
    }

    /// Reads one attribute: `name="value"` or `name='value'`.
    fn attribute(&mut self) -> Result<(SmolStr, String), XmlError> {
        let name = self.name("attribute name")?;
        self.skip_whitespace();
        self.expect('=')?;
        self.skip_whitespace();
        let quote = self.peek();
        if quote != '"' && quote != '\'' {
            return Err(XmlError::Unexpected {
                found: quote,
                expected: "a quoted attribute value".into(),
                span: self.pos..self.pos + quote.len_utf8().max(1),
            });
        }
        self.advance();

        let start = self.pos;
        let mut value = String::new();
        while self.peek() != quote {
            if self.is_at_end() {
                return Err(XmlError::UnexpectedEnd {
                    expected: "closing attribute quote".into(),
                    span: start..self.pos,
                });
            }
            if self.peek() == '&' {
                value.push(self.entity()?);
            } else {
                value.push(self.advance());
            }
        }
        self.advance(); // closing quote
        Ok((name, value))
    }

    /// Decodes one entity or character reference starting at `&`.
    fn entity(&mut self) -> Result<char, XmlError> {
        let start = self.pos;
        self.advance(); // consume '&'
        let mut body = String::new();
        while self.peek() != ';' {
            if self.is_at_end() || body.len() > 8 {
                return Err(XmlError::InvalidEntity {
                    entity: body,
                    span: start..self.pos,
                });
            }
            body.push(self.advance());
        }
        self.advance(); // consume ';'
        let span = start..self.pos;

        match body.as_str() {
            "amp" => Ok('&'),
            "lt" => Ok('<'),
            "gt" => Ok('>'),
            "quot" => Ok('"'),
            "apos" => Ok('\''),
            _ => {
                let code = if let Some(hex) = body.strip_prefix("#x").or(body.strip_prefix("#X")) {
                    u32::from_str_radix(hex, 16).ok()
                } else if let Some(dec) = body.strip_prefix('#') {
                    dec.parse::<u32>().ok()
                } else {
                    None
                };
                code.and_then(char::from_u32)
                    .ok_or(XmlError::InvalidEntity { entity: body, span })
            }
        }
    }

    /// Reads a tag or attribute name.
    fn name(&mut self, expected: &str) -> Result<SmolStr, XmlError> {
        let start = self.pos;
        if !Self::is_name_start(self.peek()) {
            return Err(XmlError::Unexpected {
                found: self.peek(),
                expected: expected.into(),
                span: self.pos..self.pos + self.peek().len_utf8().max(1),
            });
        }
        while Self::is_name_continue(self.peek()) {
            self.advance();
        }
        Ok(SmolStr::new(&self.source[start..self.pos]))
    }

    fn is_name_start(ch: char) -> bool {
        ch.is_ascii_alphabetic() || ch == '_'
    }

    fn is_name_continue(ch: char) -> bool {
        ch.is_ascii_alphanumeric() || matches!(ch, '_' | '-' | '.' | ':')
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), ' ' | '\t' | '\r' | '\n') {
            self.advance();
        }
    }

    /// Consumes the expected character or errors.
    fn expect(&mut self, expected: char) -> Result<(), XmlError> {
        if self.peek() == expected {
            self.advance();
            Ok(())
        } else if self.is_at_end() {
            Err(XmlError::UnexpectedEnd {
                expected: format!("'{expected}'"),
                span: self.pos..self.pos,
            })
        } else {
            Err(XmlError::Unexpected {
                found: self.peek(),
                expected: format!("'{expected}'"),
                span: self.pos..self.pos + self.peek().len_utf8(),
            })
        }
    }

    /// Returns the current character without advancing.
    fn peek(&self) -> char {
        self.source[self.pos..].chars().next().unwrap_or('\0')
    }

    /// Advances and returns the current character.
    fn advance(&mut self) -> char {
        let ch = self.peek();
        if ch != '\0' {
            self.pos += ch.len_utf8();
        }
        ch
    }

    fn starts_with(&self, prefix: &str) -> bool {
        self.source[self.pos..].starts_with(prefix)
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.source.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_empty_self_closing_root() {
        let root = parse_document("<query/>").unwrap();
        assert_eq!(root.name, "query");
        assert!(root.attributes.is_empty());
        assert!(root.children.is_empty());
    }

    #[test]
    fn parses_attributes() {
        let root = parse_document(r#"<query name="q" model="testmodel" view="A.b"/>"#).unwrap();
        assert_eq!(root.attributes.len(), 3);
        assert_eq!(root.attr("model"), Some("testmodel"));
        assert_eq!(root.attr("view"), Some("A.b"));
    }

    #[test]
    fn parses_nested_children_and_text() {
        let source = r#"<constraint path="E.name" op="ONE OF"><value>Tom</value><value>Dick</value></constraint>"#;
        let root = parse_document(source).unwrap();
        let values: Vec<_> = root.child_elements("value").collect();
        assert_eq!(values.len(), 2);
        assert_eq!(values[0].text, "Tom");
        assert_eq!(values[1].text, "Dick");
    }

    #[test]
    fn decodes_entities_in_attributes_and_text() {
        let source = r#"<c value="a &amp; b &lt;= &quot;c&quot;"><v>x &gt; &#121;</v></c>"#;
        let root = parse_document(source).unwrap();
        assert_eq!(root.attr("value"), Some(r#"a & b <= "c""#));
        assert_eq!(root.children[0].text, "x > y");
    }

    #[test]
    fn decodes_hex_character_reference() {
        let root = parse_document("<v>&#x41;</v>").unwrap();
        assert_eq!(root.text, "A");
    }

    #[test]
    fn skips_declaration_comments_and_doctype() {
        let source = "<?xml version=\"1.0\"?>\n<!-- saved query -->\n<!DOCTYPE query>\n<query name=\"q\"/>\n<!-- trailer -->\n";
        let root = parse_document(source).unwrap();
        assert_eq!(root.name, "query");
        assert_eq!(root.attr("name"), Some("q"));
    }

    #[test]
    fn skips_comment_inside_content() {
        let root = parse_document("<a><!-- note --><b/></a>").unwrap();
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children[0].name, "b");
    }

    #[test]
    fn single_quoted_attributes() {
        let root = parse_document("<join path='E.department' style='OUTER'/>").unwrap();
        assert_eq!(root.attr("style"), Some("OUTER"));
    }

    #[test]
    fn whitespace_in_tags_is_tolerated() {
        let root = parse_document("<a  x = \"1\" ></a >").unwrap();
        assert_eq!(root.attr("x"), Some("1"));
    }

    #[test]
    fn mismatched_close_is_an_error() {
        let err = parse_document("<a><b></a></a>").unwrap_err();
        match err {
            XmlError::MismatchedClose { open, close, .. } => {
                assert_eq!(open, "b");
                assert_eq!(close, "a");
            }
            other => panic!("expected MismatchedClose, got {other:?}"),
        }
    }

    #[test]
    fn unclosed_root_is_an_error() {
        let err = parse_document("<a><b/>").unwrap_err();
        assert!(matches!(err, XmlError::UnexpectedEnd { .. }));
    }

    #[test]
    fn unknown_entity_is_an_error() {
        let err = parse_document("<a>&nope;</a>").unwrap_err();
        match err {
            XmlError::InvalidEntity { entity, .. } => assert_eq!(entity, "nope"),
            other => panic!("expected InvalidEntity, got {other:?}"),
        }
    }

    #[test]
    fn content_after_root_is_an_error() {
        let err = parse_document("<a/><b/>").unwrap_err();
        assert!(matches!(err, XmlError::Malformed { .. }));
    }

    #[test]
    fn empty_input_is_an_error() {
        let err = parse_document("   \n  ").unwrap_err();
        assert!(matches!(err, XmlError::Malformed { .. }));
    }

    #[test]
    fn cdata_is_rejected() {
        let err = parse_document("<a><![CDATA[x]]></a>").unwrap_err();
        assert!(matches!(err, XmlError::Unsupported { .. }));
    }

    #[test]
    fn error_spans_point_into_the_source() {
        let source = "<a>&bad;</a>";
        let err = parse_document(source).unwrap_err();
        let span = err.span();
        assert_eq!(&source[span.start..span.end], "&bad;");
    }

    #[test]
    fn to_diag_carries_span_label() {
        let err = parse_document("<a>&bad;</a>").unwrap_err();
        let diag = err.to_diag();
        assert_eq!(diag.labels.len(), 1);
        assert!(diag.message.contains("bad"));
    }
}
