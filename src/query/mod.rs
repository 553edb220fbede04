//! Query construction, validation, and canonical serialization.
//!
//! A [`Query`] aggregates output columns (views), filters (constraints),
//! join styles, column headings, sort order, and boolean constraint logic
//! against a shared [`Model`]. Every mutating call validates its fragment
//! against the model immediately, using the query's current subclass
//! overrides; validation can be switched off for bulk construction and
//! re-run in one pass with [`Query::verify`], which is how deserialization
//! works.
//!
//! The type is generic over its coded-constraint entry so that a
//! [`Template`](crate::query::template::Template) is the same machinery
//! with [`TemplateConstraint`] entries instead of bare [`CodedConstraint`]s.

pub mod features;
pub mod template;

use crate::constraint::{
    BuiltConstraint, CodeGenerator, CodedConstraint, ConstraintArgs, ConstraintError,
    ConstraintKind, SubClassConstraint, SwitchableStatus, TemplateArgs, TemplateConstraint,
    build_constraint,
};
use crate::diag::Diag;
use crate::logic::parser::LogicError;
use crate::logic::{Logic, LogicOp, parse_logic};
use crate::model::Model;
use crate::model::path::{PathError, SubclassMap};
use crate::xml::{Element, XmlError, parse_document};
use smol_str::SmolStr;
use std::collections::BTreeMap;
use std::fmt;

pub use features::{Join, JoinStyle, PathDescription, SortDirection, SortOrder, SortOrderList};
pub use template::Template;

// ============================================================================
// Constraint entries
// ============================================================================

/// What a query stores per coded constraint.
///
/// Plain queries store [`CodedConstraint`] directly; templates store
/// [`TemplateConstraint`], which wraps one with editability flags.
pub trait QueryConstraint: Clone {
    /// The coded constraint this entry wraps.
    fn coded(&self) -> &CodedConstraint;

    fn coded_mut(&mut self) -> &mut CodedConstraint;

    /// Builds an entry from factory output plus any template decorations.
    /// Entry types that carry no decorations reject them here.
    fn from_built(
        base: CodedConstraint,
        editable: Option<bool>,
        switchable: Option<SwitchableStatus>,
    ) -> Result<Self, ConstraintError>
    where
        Self: Sized;

    /// Serializes the entry to a `constraint` element.
    fn element(&self) -> Element;
}

impl QueryConstraint for CodedConstraint {
    fn coded(&self) -> &CodedConstraint {
        self
    }

    fn coded_mut(&mut self) -> &mut CodedConstraint {
        self
    }

    fn from_built(
        base: CodedConstraint,
        editable: Option<bool>,
        switchable: Option<SwitchableStatus>,
    ) -> Result<Self, ConstraintError> {
        if editable.is_some() || switchable.is_some() {
            return Err(ConstraintError::NoMatchingVariant {
                detail: "editable and switchable apply only to template constraints".into(),
            });
        }
        Ok(base)
    }

    fn element(&self) -> Element {
        self.to_element()
    }
}

impl QueryConstraint for TemplateConstraint {
    fn coded(&self) -> &CodedConstraint {
        &self.base
    }

    fn coded_mut(&mut self) -> &mut CodedConstraint {
        &mut self.base
    }

    fn from_built(
        base: CodedConstraint,
        editable: Option<bool>,
        switchable: Option<SwitchableStatus>,
    ) -> Result<Self, ConstraintError> {
        Ok(TemplateConstraint::from_args(
            base,
            TemplateArgs {
                editable,
                switchable,
            },
        ))
    }

    fn element(&self) -> Element {
        let mut el = self.base.to_element();
        self.decorate(&mut el);
        el
    }
}

/// A borrowed view of one constraint of a query, coded or not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintRef<'a, C> {
    Coded(&'a C),
    SubClass(&'a SubClassConstraint),
}

impl<'a, C: QueryConstraint> ConstraintRef<'a, C> {
    pub fn path(&self) -> &'a str {
        match self {
            ConstraintRef::Coded(con) => &con.coded().path,
            ConstraintRef::SubClass(con) => &con.path,
        }
    }

    pub fn code(&self) -> Option<&'a SmolStr> {
        match self {
            ConstraintRef::Coded(con) => Some(&con.coded().code),
            ConstraintRef::SubClass(_) => None,
        }
    }
}

// ============================================================================
// Query
// ============================================================================

/// A structured query against a [`Model`].
#[derive(Debug, Clone)]
pub struct Query<'m, C: QueryConstraint = CodedConstraint> {
    model: &'m Model,
    /// Query name; empty unless the query was named.
    pub name: String,
    /// Long description; serialized even when empty.
    pub description: String,
    views: Vec<String>,
    path_descriptions: Vec<PathDescription>,
    joins: Vec<Join>,
    constraint_dict: BTreeMap<SmolStr, C>,
    uncoded_constraints: Vec<SubClassConstraint>,
    sort_orders: SortOrderList,
    logic: Option<Logic>,
    codegen: CodeGenerator,
    validate: bool,
}

fn split_views(paths: &str) -> Vec<String> {
    paths
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl<'m, C: QueryConstraint> Query<'m, C> {
    pub(crate) fn empty(model: &'m Model) -> Self {
        Self {
            model,
            name: String::new(),
            description: String::new(),
            views: Vec::new(),
            path_descriptions: Vec::new(),
            joins: Vec::new(),
            constraint_dict: BTreeMap::new(),
            uncoded_constraints: Vec::new(),
            sort_orders: SortOrderList::new(),
            logic: None,
            codegen: CodeGenerator::new(),
            validate: true,
        }
    }

    pub fn model(&self) -> &'m Model {
        self.model
    }

    /// Whether mutating calls validate their fragment immediately.
    pub fn validation_enabled(&self) -> bool {
        self.validate
    }

    /// Turns immediate validation off (or back on) for bulk construction.
    /// Skipped checks are all re-run by [`Query::verify`].
    pub fn set_validation(&mut self, enabled: bool) {
        self.validate = enabled;
    }

    // ------------------------------------------------------------------
    // Views
    // ------------------------------------------------------------------

    pub fn views(&self) -> &[String] {
        &self.views
    }

    /// Adds output columns. A single argument may carry several paths
    /// separated by whitespace, commas, or both; empty segments are
    /// dropped. Views must resolve to attribute paths.
    pub fn add_view(&mut self, paths: &str) -> Result<(), QueryError> {
        let views = split_views(paths);
        if self.validate {
            self.check_views(&views, &self.get_subclass_dict())?;
        }
        self.views.extend(views);
        Ok(())
    }

    /// Adds output columns from any collection of path strings, splitting
    /// each element like [`Query::add_view`].
    pub fn add_views<I>(&mut self, paths: I) -> Result<(), QueryError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        for path in paths {
            self.add_view(path.as_ref())?;
        }
        Ok(())
    }

    fn check_views(&self, views: &[String], subclasses: &SubclassMap) -> Result<(), QueryError> {
        for view in views {
            let path = self.model.make_path_with(view, subclasses)?;
            if !path.is_attribute() {
                return Err(ConstraintError::NotAnAttribute { path: view.clone() }.into());
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Constraints
    // ------------------------------------------------------------------

    /// Adds the constraint the argument bag describes and returns its
    /// assigned code, or `None` for a subclass constraint.
    ///
    /// Explicit codes are honoured and collisions rejected; generated
    /// codes fill the gaps in creation order (`A`, `B`, .. `Z`, `AA`).
    pub fn add_constraint(&mut self, args: ConstraintArgs) -> Result<Option<SmolStr>, QueryError> {
        let (built, template) = build_constraint(args)?;
        match built {
            BuiltConstraint::SubClass(con) => {
                // editable/switchable decorations are meaningless on a
                // structural constraint and are dropped on the floor
                if self.validate {
                    self.check_subclass(&con, &self.get_subclass_dict())?;
                }
                self.uncoded_constraints.push(con);
                Ok(None)
            }
            BuiltConstraint::Coded {
                mut base,
                explicit_code,
            } => {
                if explicit_code {
                    if self.constraint_dict.contains_key(&base.code) {
                        return Err(QueryError::DuplicateCode { code: base.code });
                    }
                } else {
                    let taken = &self.constraint_dict;
                    base.code = self.codegen.next_free(|code| taken.contains_key(code));
                }
                let con = C::from_built(base, template.editable, template.switchable)?;
                if self.validate {
                    self.check_coded(con.coded(), &self.get_subclass_dict())?;
                }
                let code = con.coded().code.clone();
                self.constraint_dict.insert(code.clone(), con);
                Ok(Some(code))
            }
        }
    }

    /// The constraint with the given code.
    pub fn get_constraint(&self, code: &str) -> Result<&C, QueryError> {
        self.constraint_dict
            .get(code)
            .ok_or_else(|| ConstraintError::NoSuchCode { code: code.into() }.into())
    }

    /// Coded constraints in code order. Shorter codes sort before longer
    /// ones, so `Z` comes before `AA` as the generator assigned them.
    pub fn coded_constraints(&self) -> impl Iterator<Item = &C> {
        let mut entries: Vec<_> = self.constraint_dict.iter().collect();
        entries.sort_by_key(|&(code, _)| (code.len(), code));
        entries.into_iter().map(|(_, con)| con)
    }

    pub fn subclass_constraints(&self) -> &[SubClassConstraint] {
        &self.uncoded_constraints
    }

    /// All constraints: coded in code order, then subclass constraints.
    pub fn constraints(&self) -> impl Iterator<Item = ConstraintRef<'_, C>> {
        self.coded_constraints()
            .map(ConstraintRef::Coded)
            .chain(
                self.uncoded_constraints
                    .iter()
                    .map(ConstraintRef::SubClass),
            )
    }

    /// The subclass overrides currently in force, keyed by constrained
    /// path.
    pub fn get_subclass_dict(&self) -> SubclassMap {
        self.uncoded_constraints
            .iter()
            .map(|con| (con.path.clone(), SmolStr::new(&con.subclass)))
            .collect()
    }

    fn check_coded(&self, con: &CodedConstraint, subclasses: &SubclassMap) -> Result<(), QueryError> {
        let path = self.model.make_path_with(&con.path, subclasses)?;
        match &con.kind {
            ConstraintKind::Unary { .. } => {}
            ConstraintKind::Binary { .. } | ConstraintKind::Multi { .. } => {
                if !path.is_attribute() {
                    return Err(ConstraintError::NotAnAttribute {
                        path: con.path.clone(),
                    }
                    .into());
                }
            }
            ConstraintKind::Ternary { .. } | ConstraintKind::List { .. } => {
                if path.end_class().is_none() {
                    return Err(ConstraintError::NotAClassOrReference {
                        path: con.path.clone(),
                    }
                    .into());
                }
            }
            ConstraintKind::Loop { loop_path, .. } => {
                let other = self.model.make_path_with(loop_path, subclasses)?;
                let Some(class_a) = path.end_class() else {
                    return Err(ConstraintError::NotAClassOrReference {
                        path: con.path.clone(),
                    }
                    .into());
                };
                let Some(class_b) = other.end_class() else {
                    return Err(ConstraintError::NotAClassOrReference {
                        path: loop_path.clone(),
                    }
                    .into());
                };
                if !class_a.isa(&class_b.name) && !class_b.isa(&class_a.name) {
                    return Err(ConstraintError::IncompatibleLoop {
                        path: con.path.clone(),
                        loop_path: loop_path.clone(),
                    }
                    .into());
                }
            }
        }
        Ok(())
    }

    fn check_subclass(
        &self,
        con: &SubClassConstraint,
        subclasses: &SubclassMap,
    ) -> Result<(), QueryError> {
        let parent = self.model.make_path_with(&con.path, subclasses)?;
        let Some(parent_class) = parent.end_class() else {
            return Err(ConstraintError::NotAClassOrReference {
                path: con.path.clone(),
            }
            .into());
        };
        let sub = self.model.make_path_with(&con.subclass, subclasses)?;
        let Some(sub_class) = sub.end_class() else {
            return Err(ConstraintError::NotAClassOrReference {
                path: con.subclass.clone(),
            }
            .into());
        };
        if !sub_class.isa(&parent_class.name) {
            return Err(ConstraintError::NotASubclass {
                subclass: con.subclass.clone(),
                parent: con.path.clone(),
            }
            .into());
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Joins and path descriptions
    // ------------------------------------------------------------------

    pub fn joins(&self) -> &[Join] {
        &self.joins
    }

    /// Declares the join style for a reference path. The style string is
    /// `INNER` or `OUTER` in any letter case.
    pub fn add_join(&mut self, path: &str, style: &str) -> Result<(), QueryError> {
        let style = JoinStyle::parse(style).ok_or_else(|| QueryError::UnknownJoinStyle {
            style: style.to_string(),
        })?;
        let join = Join::new(path, style);
        if self.validate {
            self.check_join(&join, &self.get_subclass_dict())?;
        }
        self.joins.push(join);
        Ok(())
    }

    fn check_join(&self, join: &Join, subclasses: &SubclassMap) -> Result<(), QueryError> {
        let path = self.model.make_path_with(&join.path, subclasses)?;
        if !path.is_reference() {
            return Err(QueryError::NotAReference {
                path: join.path.clone(),
            });
        }
        Ok(())
    }

    pub fn path_descriptions(&self) -> &[PathDescription] {
        &self.path_descriptions
    }

    pub fn add_path_description(
        &mut self,
        path: &str,
        description: &str,
    ) -> Result<(), QueryError> {
        let pd = PathDescription::new(path, description);
        if self.validate {
            self.model
                .validate_path_with(&pd.path, &self.get_subclass_dict())?;
        }
        self.path_descriptions.push(pd);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Sort order
    // ------------------------------------------------------------------

    /// The explicitly added sort orders. Empty until one is added; the
    /// serialized default comes from [`Query::get_sort_order`].
    pub fn sort_orders(&self) -> &SortOrderList {
        &self.sort_orders
    }

    /// Appends a sort order element. The path must already be in the view
    /// list.
    pub fn add_sort_order(
        &mut self,
        path: &str,
        direction: SortDirection,
    ) -> Result<(), QueryError> {
        let order = SortOrder::new(path, direction);
        if self.validate {
            self.check_sort_order(&order, &self.get_subclass_dict())?;
        }
        self.sort_orders.push(order);
        Ok(())
    }

    fn check_sort_order(
        &self,
        order: &SortOrder,
        subclasses: &SubclassMap,
    ) -> Result<(), QueryError> {
        self.model.validate_path_with(&order.path, subclasses)?;
        if !self.views.iter().any(|view| *view == order.path) {
            return Err(QueryError::SortOrderOutsideView {
                path: order.path.clone(),
            });
        }
        Ok(())
    }

    /// The effective sort order: the explicit list, or the first view
    /// ascending when none was added.
    pub fn get_sort_order(&self) -> Result<SortOrderList, QueryError> {
        if !self.sort_orders.is_empty() {
            return Ok(self.sort_orders.clone());
        }
        match self.views.first() {
            Some(view) => Ok(SortOrder::new(view.as_str(), SortDirection::Asc).into()),
            None => Err(QueryError::EmptyView),
        }
    }

    // ------------------------------------------------------------------
    // Logic
    // ------------------------------------------------------------------

    /// Sets the constraint logic from an expression string such as
    /// `A and (B or C)`.
    pub fn set_logic(&mut self, expression: &str) -> Result<(), QueryError> {
        let dict = &self.constraint_dict;
        let logic = parse_logic(expression, |code| dict.contains_key(code))?;
        if self.validate {
            self.check_logic_mentions(&logic)?;
        }
        self.logic = Some(logic);
        Ok(())
    }

    /// Sets the constraint logic from a tree built with the `&`/`|`
    /// operators on constraint handles.
    pub fn set_logic_group(&mut self, logic: Logic) -> Result<(), QueryError> {
        for code in logic.codes() {
            if !self.constraint_dict.contains_key(&code) {
                return Err(ConstraintError::NoSuchCode { code }.into());
            }
        }
        if self.validate {
            self.check_logic_mentions(&logic)?;
        }
        self.logic = Some(logic);
        Ok(())
    }

    /// The effective logic: the explicit expression, or every coded
    /// constraint and-ed together in code order.
    pub fn get_logic(&self) -> Result<Logic, QueryError> {
        if let Some(logic) = &self.logic {
            return Ok(logic.clone());
        }
        Logic::fold(
            LogicOp::And,
            self.coded_constraints().map(|con| con.coded().code.clone()),
        )
        .ok_or(QueryError::NoCodedConstraints)
    }

    /// Checks that the explicit logic, if any, still mentions every coded
    /// constraint exactly once. The default logic always does.
    pub fn validate_logic(&self) -> Result<(), QueryError> {
        match &self.logic {
            Some(logic) => self.check_logic_mentions(logic),
            None => Ok(()),
        }
    }

    /// Explicit logic must mention every coded constraint exactly once.
    fn check_logic_mentions(&self, logic: &Logic) -> Result<(), QueryError> {
        let mentioned = logic.codes();
        for code in self.constraint_dict.keys() {
            match mentioned.iter().filter(|c| *c == code).count() {
                0 => {
                    return Err(QueryError::CodeNotInLogic {
                        code: code.clone(),
                        logic: logic.to_string(),
                    });
                }
                1 => {}
                _ => {
                    return Err(QueryError::CodeRepeatedInLogic {
                        code: code.clone(),
                        logic: logic.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Validation
    // ------------------------------------------------------------------

    /// Re-runs every validation over the whole query and re-enables
    /// immediate validation. Used after bulk construction with checks
    /// switched off, and by deserialization.
    pub fn verify(&mut self) -> Result<(), QueryError> {
        let subclasses = self.get_subclass_dict();
        self.check_views(&self.views, &subclasses)?;
        for con in self.constraint_dict.values() {
            self.check_coded(con.coded(), &subclasses)?;
        }
        for con in &self.uncoded_constraints {
            self.check_subclass(con, &subclasses)?;
        }
        for join in &self.joins {
            self.check_join(join, &subclasses)?;
        }
        for pd in &self.path_descriptions {
            self.model.validate_path_with(&pd.path, &subclasses)?;
        }
        for order in self.sort_orders.iter() {
            self.check_sort_order(order, &subclasses)?;
        }
        self.validate_logic()?;
        self.validate = true;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Serialization
    // ------------------------------------------------------------------

    /// Builds the canonical document element. Attributes come out in name
    /// order; `constraintLogic` appears only with more than one coded
    /// constraint; children are path descriptions, joins, coded
    /// constraints in code order, then subclass constraints.
    pub fn to_element(&self) -> Result<Element, QueryError> {
        let mut query = Element::new("query");
        query.set_attr("name", self.name.as_str());
        query.set_attr("model", self.model.name.as_str());
        query.set_attr("view", self.views.join(" "));
        query.set_attr("sortOrder", self.get_sort_order()?.to_string());
        query.set_attr("longDescription", self.description.as_str());
        if self.constraint_dict.len() > 1 {
            query.set_attr("constraintLogic", self.get_logic()?.to_string());
        }
        for pd in &self.path_descriptions {
            query.add_child(pd.to_element());
        }
        for join in &self.joins {
            query.add_child(join.to_element());
        }
        for con in self.coded_constraints() {
            query.add_child(con.element());
        }
        for con in &self.uncoded_constraints {
            query.add_child(con.to_element());
        }
        Ok(query)
    }

    /// The canonical document on one line.
    pub fn to_xml(&self) -> Result<String, QueryError> {
        Ok(self.to_element()?.to_xml())
    }

    /// The canonical document, indented for reading.
    pub fn to_formatted_xml(&self) -> Result<String, QueryError> {
        Ok(self.to_element()?.to_pretty_xml())
    }

    // ------------------------------------------------------------------
    // Deserialization
    // ------------------------------------------------------------------

    /// Shared deserialization behind [`Query::from_xml`] and
    /// [`Template::parse`]. The document must contain exactly one query
    /// element; a template wrapper around it is accepted.
    pub(crate) fn read_xml(model: &'m Model, source: &str) -> Result<Self, QueryError> {
        let doc = parse_document(source)?;
        let queries = doc.find_all("query");
        if queries.len() != 1 {
            return Err(QueryError::Parse {
                detail: "wrong number of queries in xml".into(),
            });
        }
        let q = queries[0];

        let mut query = Self::empty(model);
        query.validate = false;
        query.name = q.attr("name").unwrap_or_default().to_string();
        query.description = q
            .attr_non_empty("longDescription")
            .or_else(|| q.attr_non_empty("description"))
            .unwrap_or_default()
            .to_string();
        if let Some(view) = q.attr("view") {
            query.add_view(view)?;
        }
        for pd in q.child_elements("pathDescription") {
            let path = pd.attr("pathString").unwrap_or_default();
            let description = pd.attr("description").unwrap_or_default();
            query.add_path_description(path, description)?;
        }
        for join in q.child_elements("join") {
            let path = join.attr("path").unwrap_or_default();
            let style = join.attr_non_empty("style").unwrap_or("OUTER");
            query.add_join(path, style)?;
        }
        for con in q.child_elements("constraint") {
            let path = con.attr_non_empty("path").ok_or_else(|| QueryError::Parse {
                detail: "Constraints must have a path".into(),
            })?;
            let mut args = ConstraintArgs::new(path);
            args.op = con.attr_non_empty("op").map(str::to_string);
            args.value = con.attr_non_empty("value").map(str::to_string);
            args.code = con.attr_non_empty("code").map(SmolStr::new);
            args.subclass = con.attr_non_empty("type").map(str::to_string);
            args.extra_value = con.attr_non_empty("extraValue").map(str::to_string);
            args.loop_path = con.attr_non_empty("loopPath").map(str::to_string);
            args.editable = con.attr_non_empty("editable").map(|v| v == "true");
            if let Some(switchable) = con.attr_non_empty("switchable") {
                let status =
                    SwitchableStatus::parse(switchable).ok_or_else(|| QueryError::Parse {
                        detail: format!("Bad value for switchable: '{switchable}'"),
                    })?;
                args.switchable = Some(status);
            }
            let values: Vec<String> = con
                .child_elements("value")
                .map(|v| v.text.clone())
                .collect();
            if !values.is_empty() {
                args.values = Some(values);
            }
            query.add_constraint(args)?;
        }
        if let Some(sort_order) = q.attr_non_empty("sortOrder") {
            for element in sort_order.split(',') {
                let mut parts = element.split_whitespace();
                match (parts.next(), parts.next(), parts.next()) {
                    (Some(path), Some(direction), None) => {
                        let direction = SortDirection::parse(direction).ok_or_else(|| {
                            QueryError::UnknownSortDirection {
                                direction: direction.to_string(),
                            }
                        })?;
                        query.add_sort_order(path, direction)?;
                    }
                    _ => {
                        return Err(QueryError::Parse {
                            detail: format!("Bad sort order element: '{element}'"),
                        });
                    }
                }
            }
        }
        if let Some(expression) = q.attr_non_empty("constraintLogic") {
            query.set_logic(expression)?;
        }
        query.verify()?;
        Ok(query)
    }
}

impl<'m> Query<'m, CodedConstraint> {
    /// A fresh query against the model, with validation on.
    pub fn new(model: &'m Model) -> Query<'m> {
        Self::empty(model)
    }

    /// Reads a query back from its canonical document, then verifies the
    /// whole of it against the model.
    pub fn from_xml(model: &'m Model, source: &str) -> Result<Query<'m>, QueryError> {
        Self::read_xml(model, source)
    }

    /// The request parameters for running this query: the canonical
    /// document under the `query` key.
    pub fn to_query_params(&self) -> Result<BTreeMap<String, String>, QueryError> {
        let mut params = BTreeMap::new();
        params.insert("query".to_string(), self.to_xml()?);
        Ok(params)
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Errors from building, validating, or (de)serializing queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// A path failed to resolve.
    Path(PathError),
    /// A constraint failed to build or validate.
    Constraint(ConstraintError),
    /// A logic expression failed to parse or resolve.
    Logic(LogicError),
    /// The query document was not well-formed.
    Document(XmlError),
    /// The query document had the wrong shape.
    Parse { detail: String },
    /// A default sort order was requested with no views to take it from.
    EmptyView,
    /// A sort order path missing from the view list.
    SortOrderOutsideView { path: String },
    /// A join on a path that is not a reference.
    NotAReference { path: String },
    /// A join style other than INNER or OUTER.
    UnknownJoinStyle { style: String },
    /// A sort direction other than asc or desc.
    UnknownSortDirection { direction: String },
    /// An explicit constraint code already in use on this query.
    DuplicateCode { code: SmolStr },
    /// Explicit logic leaving out a coded constraint.
    CodeNotInLogic { code: SmolStr, logic: String },
    /// Explicit logic mentioning a coded constraint more than once.
    CodeRepeatedInLogic { code: SmolStr, logic: String },
    /// An effective logic was requested on a query with no coded
    /// constraints.
    NoCodedConstraints,
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryError::Path(err) => write!(f, "{err}"),
            QueryError::Constraint(err) => write!(f, "{err}"),
            QueryError::Logic(err) => write!(f, "{err}"),
            QueryError::Document(err) => write!(f, "Error parsing query: {err}"),
            QueryError::Parse { detail } => write!(f, "Error parsing query: {detail}"),
            QueryError::EmptyView => write!(f, "Query view is empty"),
            QueryError::SortOrderOutsideView { path } => {
                write!(f, "Sort order element is not in the view: {path}")
            }
            QueryError::NotAReference { path } => write!(f, "'{path}' is not a reference"),
            QueryError::UnknownJoinStyle { style } => write!(f, "Unknown join style: {style}"),
            QueryError::UnknownSortDirection { direction } => {
                write!(f, "Sort direction must be one of asc, desc - not '{direction}'")
            }
            QueryError::DuplicateCode { code } => write!(
                f,
                "There is already a constraint with the code '{code}' on this query"
            ),
            QueryError::CodeNotInLogic { code, logic } => {
                write!(f, "Constraint {code} is not mentioned in the logic: {logic}")
            }
            QueryError::CodeRepeatedInLogic { code, logic } => write!(
                f,
                "Constraint {code} is mentioned more than once in the logic: {logic}"
            ),
            QueryError::NoCodedConstraints => {
                write!(f, "This query has no coded constraints")
            }
        }
    }
}

impl std::error::Error for QueryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            QueryError::Path(err) => Some(err),
            QueryError::Constraint(err) => Some(err),
            QueryError::Logic(err) => Some(err),
            QueryError::Document(err) => Some(err),
            _ => None,
        }
    }
}

impl From<PathError> for QueryError {
    fn from(err: PathError) -> Self {
        QueryError::Path(err)
    }
}

impl From<ConstraintError> for QueryError {
    fn from(err: ConstraintError) -> Self {
        QueryError::Constraint(err)
    }
}

impl From<LogicError> for QueryError {
    fn from(err: LogicError) -> Self {
        QueryError::Logic(err)
    }
}

impl From<XmlError> for QueryError {
    fn from(err: XmlError) -> Self {
        QueryError::Document(err)
    }
}

impl QueryError {
    /// Converts this error to a diagnostic. Wrapped path, logic, and
    /// document errors keep their spans into their own source text.
    pub fn to_diag(&self) -> Diag {
        match self {
            QueryError::Path(err) => err.to_diag(),
            QueryError::Constraint(err) => err.to_diag(),
            QueryError::Logic(err) => err.to_diag(),
            QueryError::Document(err) => err.to_diag(),
            other => Diag::error(other.to_string()).with_code("query::invalid"),
        }
    }
}
