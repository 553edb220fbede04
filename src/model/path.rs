//! Dotted-path resolution.
//!
//! A path string like `Department.employees.name` names a root class and a
//! chain of fields. Resolution walks the chain against a [`Model`], honouring
//! subclass overrides keyed by cumulative dotted prefixes, and yields a
//! [`Path`] of borrowed descriptors. Resolution failures carry the byte span
//! of the offending segment so they can be rendered against the path string.

use super::{Class, Field, Model};
use crate::diag::{Diag, Span};
use smol_str::SmolStr;
use std::collections::BTreeMap;
use std::fmt;

/// Subclass overrides, keyed by cumulative dotted prefix (`Department` or
/// `Department.employees`), valued by the narrowing class name.
pub type SubclassMap = BTreeMap<String, SmolStr>;

/// Checks the lexical form `identifier(.identifier)*` before any model
/// lookup happens.
pub(crate) fn check_format(path: &str) -> Result<(), PathError> {
    let well_formed = !path.is_empty()
        && path.split('.').all(|segment| {
            !segment.is_empty()
                && segment
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_')
        });
    if well_formed {
        Ok(())
    } else {
        Err(PathError::BadFormat {
            path: path.to_string(),
        })
    }
}

// ============================================================================
// Resolved paths
// ============================================================================

/// A validated dotted path: the root class followed by zero or more fields.
///
/// Borrows its descriptors from the model that resolved it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path<'m> {
    string: String,
    root: &'m Class,
    fields: Vec<&'m Field>,
    end_class: Option<&'m Class>,
}

/// The last descriptor of a [`Path`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathEnd<'m> {
    Class(&'m Class),
    Field(&'m Field),
}

impl<'m> Path<'m> {
    /// The root class the first segment named.
    pub fn root(&self) -> &'m Class {
        self.root
    }

    /// The field descriptors after the root, in order.
    pub fn fields(&self) -> &[&'m Field] {
        &self.fields
    }

    /// The final descriptor.
    pub fn end(&self) -> PathEnd<'m> {
        match self.fields.last() {
            Some(field) => PathEnd::Field(field),
            None => PathEnd::Class(self.root),
        }
    }

    /// The class this path refers to: the root class for a bare class path,
    /// the declared target type for a reference path (when the model defines
    /// it), and `None` for attribute paths.
    pub fn end_class(&self) -> Option<&'m Class> {
        self.end_class
    }

    /// True when the path is a bare class name.
    pub fn is_class(&self) -> bool {
        self.fields.is_empty()
    }

    /// True when the path ends on a reference or collection.
    pub fn is_reference(&self) -> bool {
        self.fields.last().is_some_and(|f| f.is_reference())
    }

    /// True when the path ends on a scalar attribute.
    pub fn is_attribute(&self) -> bool {
        self.fields.last().is_some_and(|f| f.is_attribute())
    }
}

impl fmt::Display for Path<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.string)
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Where the walk stands after consuming a segment.
enum Cursor<'m> {
    /// On a class; further fields may be selected.
    At(&'m Class),
    /// Past an attribute; nothing further can be selected.
    PastAttribute(SmolStr),
    /// Past a reference whose declared type the model does not define.
    PastUnresolved {
        reference: SmolStr,
        type_name: SmolStr,
        span: Span,
    },
}

impl Model {
    /// Resolves a dotted path with no subclass overrides.
    pub fn make_path<'m>(&'m self, path: &str) -> Result<Path<'m>, PathError> {
        self.make_path_with(path, &SubclassMap::new())
    }

    /// Resolves a dotted path, narrowing reference types per `subclasses`.
    pub fn make_path_with<'m>(
        &'m self,
        path: &str,
        subclasses: &SubclassMap,
    ) -> Result<Path<'m>, PathError> {
        check_format(path)?;
        let names: Vec<&str> = path.split('.').collect();
        let (root_name, rest) = match names.split_first() {
            Some(parts) => parts,
            None => {
                return Err(PathError::BadFormat {
                    path: path.to_string(),
                });
            }
        };

        let root = self
            .class(root_name)
            .ok_or_else(|| PathError::UnknownRoot {
                root: SmolStr::new(*root_name),
                path: path.to_string(),
            })?;

        // overrides swap the class the walk continues from, never the
        // descriptor that gets recorded
        let root_span = 0..root_name.len();
        let mut cursor = match subclasses.get(*root_name) {
            Some(subclass) => {
                Cursor::At(self.class(subclass).ok_or_else(|| {
                    PathError::UnknownSubclass {
                        subclass: subclass.clone(),
                        path: path.to_string(),
                        span: root_span.clone(),
                    }
                })?)
            }
            None => Cursor::At(root),
        };

        let mut fields: Vec<&Field> = Vec::new();
        let mut end_class = Some(root);
        let mut key = String::from(*root_name);
        let mut offset = root_name.len() + 1;

        for segment in rest {
            let span = offset..offset + segment.len();
            let class = match &cursor {
                Cursor::At(class) => *class,
                Cursor::PastAttribute(attribute) => {
                    return Err(PathError::AttributeDeadEnd {
                        attribute: attribute.clone(),
                        segment: SmolStr::new(*segment),
                        path: path.to_string(),
                        span,
                    });
                }
                Cursor::PastUnresolved {
                    reference,
                    type_name,
                    span,
                } => {
                    return Err(PathError::UnresolvedReference {
                        reference: reference.clone(),
                        type_name: type_name.clone(),
                        path: path.to_string(),
                        span: span.clone(),
                    });
                }
            };

            let field = class.field(segment).ok_or_else(|| PathError::NoSuchField {
                field: SmolStr::new(*segment),
                class: class.name.clone(),
                path: path.to_string(),
                span: span.clone(),
            })?;
            fields.push(field);
            key.push('.');
            key.push_str(segment);

            if field.is_reference() {
                end_class = self.class(&field.type_name);
                cursor = match subclasses.get(key.as_str()) {
                    Some(subclass) => {
                        Cursor::At(self.class(subclass).ok_or_else(|| {
                            PathError::UnknownSubclass {
                                subclass: subclass.clone(),
                                path: path.to_string(),
                                span: span.clone(),
                            }
                        })?)
                    }
                    None => match self.class(&field.type_name) {
                        Some(target) => Cursor::At(target),
                        None => Cursor::PastUnresolved {
                            reference: field.name.clone(),
                            type_name: field.type_name.clone(),
                            span: span.clone(),
                        },
                    },
                };
            } else {
                end_class = None;
                cursor = Cursor::PastAttribute(field.name.clone());
            }
            offset += segment.len() + 1;
        }

        Ok(Path {
            string: path.to_string(),
            root,
            fields,
            end_class,
        })
    }

    /// Checks a dotted path without keeping the resolved descriptors.
    pub fn validate_path(&self, path: &str) -> Result<(), PathError> {
        self.make_path(path).map(|_| ())
    }

    /// Checks a dotted path under subclass overrides.
    pub fn validate_path_with(
        &self,
        path: &str,
        subclasses: &SubclassMap,
    ) -> Result<(), PathError> {
        self.make_path_with(path, subclasses).map(|_| ())
    }
}

// ============================================================================
// Errors
// ============================================================================

/// A dotted path that failed to resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// The string does not match `identifier(.identifier)*`.
    BadFormat { path: String },
    /// The first segment does not name a class.
    UnknownRoot { root: SmolStr, path: String },
    /// A subclass override names a class the model does not define.
    UnknownSubclass {
        subclass: SmolStr,
        path: String,
        span: Span,
    },
    /// A segment names a field the current class does not have.
    NoSuchField {
        field: SmolStr,
        class: SmolStr,
        path: String,
        span: Span,
    },
    /// A segment follows an attribute, which has no fields.
    AttributeDeadEnd {
        attribute: SmolStr,
        segment: SmolStr,
        path: String,
        span: Span,
    },
    /// A segment follows a reference whose declared type is not in the model.
    UnresolvedReference {
        reference: SmolStr,
        type_name: SmolStr,
        path: String,
        span: Span,
    },
}

impl PathError {
    /// The path string that failed to resolve.
    pub fn path(&self) -> &str {
        match self {
            PathError::BadFormat { path }
            | PathError::UnknownRoot { path, .. }
            | PathError::UnknownSubclass { path, .. }
            | PathError::NoSuchField { path, .. }
            | PathError::AttributeDeadEnd { path, .. }
            | PathError::UnresolvedReference { path, .. } => path,
        }
    }

    /// Byte span of the offending segment within the path string.
    pub fn span(&self) -> Span {
        match self {
            PathError::BadFormat { path } => 0..path.len(),
            PathError::UnknownRoot { root, .. } => 0..root.len(),
            PathError::UnknownSubclass { span, .. }
            | PathError::NoSuchField { span, .. }
            | PathError::AttributeDeadEnd { span, .. }
            | PathError::UnresolvedReference { span, .. } => span.clone(),
        }
    }

    /// Converts this error to a diagnostic positioned in the path string.
    pub fn to_diag(&self) -> Diag {
        let (label, code) = match self {
            PathError::BadFormat { .. } => ("invalid path syntax", "path::syntax"),
            PathError::UnknownRoot { .. } => ("not a class in this model", "path::root"),
            PathError::UnknownSubclass { .. } => ("unknown subclass", "path::subclass"),
            PathError::NoSuchField { .. } => ("no such field", "path::field"),
            PathError::AttributeDeadEnd { .. } => {
                ("attributes have no fields", "path::attribute")
            }
            PathError::UnresolvedReference { .. } => {
                ("type not defined in this model", "path::reference")
            }
        };
        Diag::error(self.to_string())
            .with_primary_label(self.span(), label)
            .with_code(code)
    }
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathError::BadFormat { path } => {
                write!(f, "path '{path}' does not match the expected pattern")
            }
            PathError::UnknownRoot { root, path } => {
                write!(f, "could not find root class '{root}' while parsing '{path}'")
            }
            PathError::UnknownSubclass { subclass, path, .. } => write!(
                f,
                "'{subclass}' is not a class in this model (while parsing '{path}')"
            ),
            PathError::NoSuchField {
                field, class, path, ..
            } => write!(
                f,
                "There is no field called {field} in {class} (while parsing '{path}')"
            ),
            PathError::AttributeDeadEnd {
                attribute,
                segment,
                path,
                ..
            } => write!(
                f,
                "cannot select '{segment}' on '{attribute}', which is an attribute (while parsing '{path}')"
            ),
            PathError::UnresolvedReference {
                reference,
                type_name,
                path,
                ..
            } => write!(
                f,
                "'{reference}' refers to type '{type_name}', which is not defined in this model (while parsing '{path}')"
            ),
        }
    }
}

impl std::error::Error for PathError {}
