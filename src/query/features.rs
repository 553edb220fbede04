//! Non-constraint query features: joins, path descriptions, sort orders.
//!
//! Each one wraps a dotted path with a small amount of presentation or
//! execution state and knows how to serialize itself into the canonical
//! query document.

use crate::xml::Element;
use std::fmt;

// ============================================================================
// Joins
// ============================================================================

/// How a reference path joins into the result set.
///
/// Inner joins restrict rows to those where the reference is populated;
/// outer joins keep the row and leave the columns empty. References start
/// out inner on the server, so only outer joins usually need declaring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JoinStyle {
    Inner,
    #[default]
    Outer,
}

impl JoinStyle {
    /// Case-insensitive parse of `INNER` / `OUTER`.
    pub fn parse(style: &str) -> Option<Self> {
        if style.eq_ignore_ascii_case("INNER") {
            Some(JoinStyle::Inner)
        } else if style.eq_ignore_ascii_case("OUTER") {
            Some(JoinStyle::Outer)
        } else {
            None
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            JoinStyle::Inner => "INNER",
            JoinStyle::Outer => "OUTER",
        }
    }
}

impl fmt::Display for JoinStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A join-style declaration for a reference path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Join {
    pub path: String,
    pub style: JoinStyle,
}

impl Join {
    pub fn new(path: impl Into<String>, style: JoinStyle) -> Self {
        Self {
            path: path.into(),
            style,
        }
    }

    pub(crate) fn to_element(&self) -> Element {
        let mut el = Element::new("join");
        el.set_attr("path", self.path.as_str());
        el.set_attr("style", self.style.as_str());
        el
    }
}

impl fmt::Display for Join {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.path, self.style)
    }
}

// ============================================================================
// Path descriptions
// ============================================================================

/// A human-readable column heading for a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathDescription {
    pub path: String,
    pub description: String,
}

impl PathDescription {
    pub fn new(path: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            description: description.into(),
        }
    }

    pub(crate) fn to_element(&self) -> Element {
        let mut el = Element::new("pathDescription");
        el.set_attr("pathString", self.path.as_str());
        el.set_attr("description", self.description.as_str());
        el
    }
}

impl fmt::Display for PathDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.description)
    }
}

// ============================================================================
// Sort order
// ============================================================================

/// Result ordering direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Case-insensitive parse of `asc` / `desc`.
    pub fn parse(direction: &str) -> Option<Self> {
        if direction.eq_ignore_ascii_case("asc") {
            Some(SortDirection::Asc)
        } else if direction.eq_ignore_ascii_case("desc") {
            Some(SortDirection::Desc)
        } else {
            None
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single ordering element: a view path and a direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOrder {
    pub path: String,
    pub direction: SortDirection,
}

impl SortOrder {
    pub fn new(path: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            path: path.into(),
            direction,
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.path, self.direction)
    }
}

/// The ordering elements of a query, in priority order.
///
/// Renders comma-joined with no surrounding spaces, the form the canonical
/// document's `sortOrder` attribute carries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortOrderList {
    orders: Vec<SortOrder>,
}

impl SortOrderList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, order: SortOrder) {
        self.orders.push(order);
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SortOrder> {
        self.orders.iter()
    }
}

impl From<SortOrder> for SortOrderList {
    fn from(order: SortOrder) -> Self {
        Self {
            orders: vec![order],
        }
    }
}

impl FromIterator<SortOrder> for SortOrderList {
    fn from_iter<I: IntoIterator<Item = SortOrder>>(iter: I) -> Self {
        Self {
            orders: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for SortOrderList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, order) in self.orders.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{order}")?;
        }
        Ok(())
    }
}
