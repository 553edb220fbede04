//! In-memory representation of a warehouse data model.
//!
//! A [`Model`] is parsed once from the schema document the service publishes
//! and is immutable afterwards. It owns a set of [`Class`] descriptors, each
//! holding its merged [`Field`] map (own fields plus everything inherited
//! from resolved ancestors). Dotted-path resolution against the model lives
//! in [`path`].
//!
//! Construction is all-or-nothing: any parse or cross-reference failure
//! returns an error and no partially-built model is ever observable.

pub mod path;

use crate::diag::Diag;
use crate::xml::{self, Element, XmlError};
use path::PathError;
use smol_str::SmolStr;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

// ============================================================================
// Fields
// ============================================================================

/// Which shape of field a [`Field`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// A scalar column.
    Attribute,
    /// A one-to-one link to another class.
    Reference,
    /// A one-to-many link to another class.
    Collection,
}

/// A single field of a class: an attribute, reference, or collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Field name.
    pub name: SmolStr,
    /// Declared type name. For attributes this is a primitive type name
    /// (e.g. "String"); for references and collections it names a class.
    pub type_name: SmolStr,
    /// Attribute, reference, or collection.
    pub kind: FieldKind,
    /// Declared reverse field on the target class, for references and
    /// collections that have one.
    pub reverse_name: Option<SmolStr>,
    /// Name of the class that declared this field (inherited fields keep
    /// their declaring class).
    pub declared_in: SmolStr,
}

impl Field {
    /// True for scalar attribute fields.
    pub fn is_attribute(&self) -> bool {
        self.kind == FieldKind::Attribute
    }

    /// True for reference and collection fields alike.
    pub fn is_reference(&self) -> bool {
        matches!(self.kind, FieldKind::Reference | FieldKind::Collection)
    }

    /// True for collection fields only.
    pub fn is_collection(&self) -> bool {
        self.kind == FieldKind::Collection
    }

    fn attribute(name: impl Into<SmolStr>, type_name: impl Into<SmolStr>, owner: &SmolStr) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            kind: FieldKind::Attribute,
            reverse_name: None,
            declared_in: owner.clone(),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} is a {}", self.name, self.type_name)?;
        if let Some(reverse) = &self.reverse_name {
            write!(f, ", which links back to this as {reverse}")?;
        }
        Ok(())
    }
}

// ============================================================================
// Classes
// ============================================================================

/// A named entity type of the data model.
///
/// After vivification a class carries its full transitive ancestor list and
/// a field map merged across that ancestry; both are immutable for the life
/// of the owning [`Model`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Class {
    /// Class name.
    pub name: SmolStr,
    /// Declared parent names, namespace prefixes stripped. May mention
    /// types the model does not declare; those take no part in ancestry.
    pub parents: Vec<SmolStr>,
    /// Resolved transitive ancestor names, nearest first.
    ancestors: Vec<SmolStr>,
    /// Every name `isa` answers true for, including this class itself.
    supertypes: BTreeSet<SmolStr>,
    /// Merged field map (ordered by name for determinism).
    fields: BTreeMap<SmolStr, Field>,
}

impl Class {
    fn new(name: SmolStr, parents: Vec<SmolStr>) -> Self {
        let mut fields = BTreeMap::new();
        // every class carries the service-assigned object id
        fields.insert(
            SmolStr::new("id"),
            Field::attribute("id", "Integer", &name),
        );
        Self {
            name,
            parents,
            ancestors: Vec::new(),
            supertypes: BTreeSet::new(),
            fields,
        }
    }

    /// Resolved transitive ancestor names, nearest first.
    pub fn ancestors(&self) -> &[SmolStr] {
        &self.ancestors
    }

    /// All fields of this class, inherited ones included.
    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.values()
    }

    /// The scalar fields of this class.
    pub fn attributes(&self) -> impl Iterator<Item = &Field> {
        self.fields().filter(|f| f.is_attribute())
    }

    /// One-to-one reference fields (collections excluded).
    pub fn references(&self) -> impl Iterator<Item = &Field> {
        self.fields().filter(|f| f.kind == FieldKind::Reference)
    }

    /// One-to-many collection fields.
    pub fn collections(&self) -> impl Iterator<Item = &Field> {
        self.fields().filter(|f| f.is_collection())
    }

    /// Looks up a field by name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    /// Looks up a field by name, failing with the canonical model error.
    pub fn get_field(&self, name: &str) -> Result<&Field, ModelError> {
        self.fields.get(name).ok_or_else(|| ModelError::NoSuchField {
            field: SmolStr::new(name),
            class: self.name.clone(),
        })
    }

    /// True when this class is, or inherits from, `other`.
    ///
    /// Declared parents count even when the model does not define them, so
    /// a class extending an external supertype still answers `isa` for it.
    pub fn isa(&self, other: &str) -> bool {
        self.supertypes.contains(other)
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

// ============================================================================
// Model
// ============================================================================

/// The complete data model of a warehouse service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Model {
    /// Model name, as published by the service.
    pub name: SmolStr,
    /// Java-style package the service strips class names from.
    pub package_name: SmolStr,
    classes: BTreeMap<SmolStr, Class>,
}

impl Model {
    /// Parses a schema document and resolves all cross-references.
    pub fn parse(source: &str) -> Result<Self, ModelError> {
        let root = xml::parse_document(source)?;
        let mut model = Self::from_document(&root)?;
        model.vivify()?;
        Ok(model)
    }

    fn from_document(root: &Element) -> Result<Self, ModelError> {
        let model_elements = root.find_all("model");
        if model_elements.len() != 1 {
            return Err(ModelError::Parse {
                detail: format!("expected one model element, found {}", model_elements.len()),
            });
        }
        let model_element = model_elements[0];
        let name = model_element
            .attr_non_empty("name")
            .ok_or_else(|| ModelError::Parse {
                detail: "model name missing".into(),
            })?;
        let package_name =
            model_element
                .attr_non_empty("package")
                .ok_or_else(|| ModelError::Parse {
                    detail: "model package missing".into(),
                })?;

        let mut classes = BTreeMap::new();
        for class_element in model_element.find_all("class") {
            let class_name = class_element
                .attr_non_empty("name")
                .ok_or_else(|| ModelError::Parse {
                    detail: "class name missing".into(),
                })?;
            let parents = class_element
                .attr("extends")
                .unwrap_or("")
                .split_whitespace()
                .map(|p| SmolStr::new(strip_namespace(p)))
                .collect();
            let mut class = Class::new(SmolStr::new(class_name), parents);

            for attribute in class_element.child_elements("attribute") {
                let field_name = require_attr(attribute, "name")?;
                let type_name = require_attr(attribute, "type")?;
                class.fields.insert(
                    SmolStr::new(field_name),
                    Field::attribute(field_name, strip_namespace(type_name), &class.name),
                );
            }
            for (tag, kind) in [
                ("reference", FieldKind::Reference),
                ("collection", FieldKind::Collection),
            ] {
                for reference in class_element.child_elements(tag) {
                    let field_name = require_attr(reference, "name")?;
                    let type_name = require_attr(reference, "referenced-type")?;
                    let reverse_name = reference
                        .attr_non_empty("reverse-reference")
                        .map(SmolStr::new);
                    class.fields.insert(
                        SmolStr::new(field_name),
                        Field {
                            name: SmolStr::new(field_name),
                            type_name: SmolStr::new(type_name),
                            kind,
                            reverse_name,
                            declared_in: class.name.clone(),
                        },
                    );
                }
            }
            classes.insert(class.name.clone(), class);
        }

        Ok(Self {
            name: SmolStr::new(name),
            package_name: SmolStr::new(package_name),
            classes,
        })
    }

    /// Resolves ancestry, merges inherited fields, precomputes supertype
    /// sets, and checks reverse references. Runs once after parsing.
    fn vivify(&mut self) -> Result<(), ModelError> {
        let declared_parents: BTreeMap<SmolStr, Vec<SmolStr>> = self
            .classes
            .values()
            .map(|c| (c.name.clone(), c.parents.clone()))
            .collect();
        let declared_fields: BTreeMap<SmolStr, BTreeMap<SmolStr, Field>> = self
            .classes
            .values()
            .map(|c| (c.name.clone(), c.fields.clone()))
            .collect();

        for class in self.classes.values_mut() {
            class.ancestors = resolve_ancestry(&class.name, &declared_parents)?;

            // nearest ancestor wins on a name collision, own fields beat all
            for ancestor in &class.ancestors {
                if let Some(fields) = declared_fields.get(ancestor) {
                    for (name, field) in fields {
                        class
                            .fields
                            .entry(name.clone())
                            .or_insert_with(|| field.clone());
                    }
                }
            }

            class.supertypes.insert(class.name.clone());
            class.supertypes.extend(class.parents.iter().cloned());
            for ancestor in &class.ancestors {
                class.supertypes.insert(ancestor.clone());
                if let Some(parents) = declared_parents.get(ancestor) {
                    class.supertypes.extend(parents.iter().cloned());
                }
            }
        }

        // reverse references resolve against fully merged field maps, so
        // this runs as its own pass once every class is complete
        for class in self.classes.values() {
            for field in class.fields() {
                if let Some(reverse) = &field.reverse_name {
                    let resolved = self
                        .classes
                        .get(&field.type_name)
                        .is_some_and(|target| target.fields.contains_key(reverse));
                    if !resolved {
                        return Err(ModelError::DanglingReverseReference {
                            class: class.name.clone(),
                            field: field.name.clone(),
                            target: field.type_name.clone(),
                            reverse: reverse.clone(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Looks up a class by exact name, or by a dotted path (which must end
    /// on a class or reference).
    pub fn get_class(&self, name: &str) -> Result<&Class, ModelError> {
        if name.contains('.') {
            let path = self.make_path(name)?;
            if path.is_attribute() {
                return Err(ModelError::NotAClass {
                    path: name.to_string(),
                });
            }
            return path.end_class().ok_or_else(|| ModelError::NotAClass {
                path: name.to_string(),
            });
        }
        self.classes.get(name).ok_or_else(|| ModelError::NoSuchClass {
            name: SmolStr::new(name),
        })
    }

    /// Looks up a class by exact name.
    pub fn class(&self, name: &str) -> Option<&Class> {
        self.classes.get(name)
    }

    /// All classes of the model, ordered by name.
    pub fn classes(&self) -> impl Iterator<Item = &Class> {
        self.classes.values()
    }

    /// Maps a list of names through [`Model::get_class`].
    pub fn to_classes(&self, names: &[&str]) -> Result<Vec<&Class>, ModelError> {
        names.iter().map(|n| self.get_class(n)).collect()
    }
}

/// Strips a `java.lang.String`-style namespace prefix to its last segment.
fn strip_namespace(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

fn require_attr<'a>(element: &'a Element, name: &str) -> Result<&'a str, ModelError> {
    element
        .attr_non_empty(name)
        .ok_or_else(|| ModelError::Parse {
            detail: format!("{} element missing '{}'", element.name, name),
        })
}

/// Breadth-first transitive closure over declared parents.
///
/// Parent names the model does not declare drop out silently; a diamond is
/// visited once; a class reachable from itself is a fatal cycle.
fn resolve_ancestry(
    start: &SmolStr,
    declared_parents: &BTreeMap<SmolStr, Vec<SmolStr>>,
) -> Result<Vec<SmolStr>, ModelError> {
    let mut ancestry: Vec<SmolStr> = Vec::new();
    let mut seen: BTreeSet<SmolStr> = BTreeSet::new();
    seen.insert(start.clone());

    let mut frontier: Vec<SmolStr> = Vec::new();
    if let Some(parents) = declared_parents.get(start) {
        frontier.extend(parents.iter().cloned());
    }

    let mut next = 0;
    loop {
        for parent in frontier.drain(..) {
            if !declared_parents.contains_key(&parent) {
                continue; // external supertype, not part of the model
            }
            if parent == *start {
                return Err(ModelError::AncestryCycle {
                    class: start.clone(),
                });
            }
            if seen.insert(parent.clone()) {
                ancestry.push(parent);
            }
        }
        if next >= ancestry.len() {
            break;
        }
        let current = ancestry[next].clone();
        next += 1;
        if let Some(parents) = declared_parents.get(&current) {
            frontier.extend(parents.iter().cloned());
        }
    }
    Ok(ancestry)
}

// ============================================================================
// Errors
// ============================================================================

/// Errors raised while building or querying a [`Model`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// The schema document had the wrong shape.
    Parse { detail: String },
    /// The schema document was not well-formed.
    Document(XmlError),
    /// A class name the model does not declare.
    NoSuchClass { name: SmolStr },
    /// A dotted lookup resolved to something other than a class.
    NotAClass { path: String },
    /// A field name the class does not have.
    NoSuchField { field: SmolStr, class: SmolStr },
    /// A class participates in its own ancestry.
    AncestryCycle { class: SmolStr },
    /// A declared reverse reference that the target class does not have.
    DanglingReverseReference {
        class: SmolStr,
        field: SmolStr,
        target: SmolStr,
        reverse: SmolStr,
    },
    /// A dotted lookup failed to resolve.
    Path(PathError),
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::Parse { detail } => write!(f, "Error parsing model: {detail}"),
            ModelError::Document(err) => write!(f, "Error parsing model: {err}"),
            ModelError::NoSuchClass { name } => {
                write!(f, "'{name}' is not a class in this model")
            }
            ModelError::NotAClass { path } => write!(f, "'{path}' is not a class"),
            ModelError::NoSuchField { field, class } => {
                write!(f, "There is no field called {field} in {class}")
            }
            ModelError::AncestryCycle { class } => {
                write!(f, "inheritance cycle involving class '{class}'")
            }
            ModelError::DanglingReverseReference {
                class,
                field,
                target,
                reverse,
            } => write!(
                f,
                "reverse reference '{reverse}' of {class}.{field} does not exist on '{target}'"
            ),
            ModelError::Path(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ModelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ModelError::Document(err) => Some(err),
            ModelError::Path(err) => Some(err),
            _ => None,
        }
    }
}

impl From<XmlError> for ModelError {
    fn from(err: XmlError) -> Self {
        ModelError::Document(err)
    }
}

impl From<PathError> for ModelError {
    fn from(err: PathError) -> Self {
        ModelError::Path(err)
    }
}

impl ModelError {
    /// Converts this error to a diagnostic. Document errors keep their
    /// position in the schema source; the rest have no span to point at.
    pub fn to_diag(&self) -> Diag {
        match self {
            ModelError::Document(err) => err.to_diag(),
            ModelError::Path(err) => err.to_diag(),
            other => Diag::error(other.to_string()).with_code("model::invalid"),
        }
    }
}
