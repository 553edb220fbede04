//! Constraints: the filter conditions a query applies to its records.
//!
//! Seven variants exist. Six are *coded*: they carry a one-letter-or-longer
//! code and participate in the query's boolean logic. These are unary (null checks),
//! binary (value comparisons), ternary (LOOKUP with an optional qualifier),
//! multi-value (ONE OF / NONE OF), list (membership of a named server-side
//! list), and loop (comparison against another path of the same query). The
//! seventh, [`SubClassConstraint`], is uncoded: it narrows the type of a
//! reference path for the whole query.
//!
//! Construction goes through [`ConstraintArgs`], a bag of optional fields
//! dispatched to exactly one variant by which fields are present and which
//! operator family the operator belongs to. Unknown combinations are
//! rejected up front rather than discovered by trial and error.

pub mod template;

use crate::diag::Diag;
use crate::model::path;
use crate::xml::Element;
use smol_str::SmolStr;
use std::fmt;

pub use template::{SwitchableStatus, TemplateConstraint};

// ============================================================================
// Operator families
// ============================================================================

/// Null-check operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    IsNull,
    IsNotNull,
}

impl UnaryOp {
    pub(crate) const LEGAL: &'static str = "IS NULL, IS NOT NULL";

    pub fn parse(op: &str) -> Option<Self> {
        match op {
            "IS NULL" => Some(UnaryOp::IsNull),
            "IS NOT NULL" => Some(UnaryOp::IsNotNull),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            UnaryOp::IsNull => "IS NULL",
            UnaryOp::IsNotNull => "IS NOT NULL",
        }
    }
}

/// Attribute-value comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    Like,
    NotLike,
}

impl BinaryOp {
    pub(crate) const LEGAL: &'static str = "=, !=, <, >, <=, >=, LIKE, NOT LIKE";

    pub fn parse(op: &str) -> Option<Self> {
        match op {
            "=" => Some(BinaryOp::Eq),
            "!=" => Some(BinaryOp::Ne),
            "<" => Some(BinaryOp::Lt),
            ">" => Some(BinaryOp::Gt),
            "<=" => Some(BinaryOp::Le),
            ">=" => Some(BinaryOp::Ge),
            "LIKE" => Some(BinaryOp::Like),
            "NOT LIKE" => Some(BinaryOp::NotLike),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            BinaryOp::Eq => "=",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::Le => "<=",
            BinaryOp::Ge => ">=",
            BinaryOp::Like => "LIKE",
            BinaryOp::NotLike => "NOT LIKE",
        }
    }
}

/// Broad object-search operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TernaryOp {
    Lookup,
}

impl TernaryOp {
    pub(crate) const LEGAL: &'static str = "LOOKUP";

    pub fn parse(op: &str) -> Option<Self> {
        match op {
            "LOOKUP" => Some(TernaryOp::Lookup),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        "LOOKUP"
    }
}

/// Multi-value membership operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MultiOp {
    OneOf,
    NoneOf,
}

impl MultiOp {
    pub(crate) const LEGAL: &'static str = "ONE OF, NONE OF";

    pub fn parse(op: &str) -> Option<Self> {
        match op {
            "ONE OF" => Some(MultiOp::OneOf),
            "NONE OF" => Some(MultiOp::NoneOf),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            MultiOp::OneOf => "ONE OF",
            MultiOp::NoneOf => "NONE OF",
        }
    }
}

/// Named-list membership operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListOp {
    In,
    NotIn,
}

impl ListOp {
    pub(crate) const LEGAL: &'static str = "IN, NOT IN";

    pub fn parse(op: &str) -> Option<Self> {
        match op {
            "IN" => Some(ListOp::In),
            "NOT IN" => Some(ListOp::NotIn),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            ListOp::In => "IN",
            ListOp::NotIn => "NOT IN",
        }
    }
}

/// Identity comparison against another path of the same query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopOp {
    Is,
    IsNot,
}

impl LoopOp {
    pub(crate) const LEGAL: &'static str = "IS, IS NOT";

    /// Accepts both the display form and the wire form used in serialized
    /// documents.
    pub fn parse(op: &str) -> Option<Self> {
        match op {
            "IS" | "=" => Some(LoopOp::Is),
            "IS NOT" | "!=" => Some(LoopOp::IsNot),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            LoopOp::Is => "IS",
            LoopOp::IsNot => "IS NOT",
        }
    }

    /// The form written into serialized documents.
    pub const fn wire_str(self) -> &'static str {
        match self {
            LoopOp::Is => "=",
            LoopOp::IsNot => "!=",
        }
    }
}

macro_rules! display_via_as_str {
    ($($ty:ty),+) => {$(
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    )+};
}

display_via_as_str!(UnaryOp, BinaryOp, TernaryOp, MultiOp, ListOp, LoopOp);

// ============================================================================
// Constraint values
// ============================================================================

/// The variant-specific payload of a coded constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstraintKind {
    Unary {
        op: UnaryOp,
    },
    Binary {
        op: BinaryOp,
        value: String,
    },
    Ternary {
        op: TernaryOp,
        value: String,
        extra_value: Option<String>,
    },
    Multi {
        op: MultiOp,
        values: Vec<String>,
    },
    List {
        op: ListOp,
        list_name: String,
    },
    Loop {
        op: LoopOp,
        loop_path: String,
    },
}

impl ConstraintKind {
    /// The operator in its display form.
    pub fn op_str(&self) -> &'static str {
        match self {
            ConstraintKind::Unary { op } => op.as_str(),
            ConstraintKind::Binary { op, .. } => op.as_str(),
            ConstraintKind::Ternary { op, .. } => op.as_str(),
            ConstraintKind::Multi { op, .. } => op.as_str(),
            ConstraintKind::List { op, .. } => op.as_str(),
            ConstraintKind::Loop { op, .. } => op.as_str(),
        }
    }

    /// Short family name, used in error messages.
    pub fn family(&self) -> &'static str {
        match self {
            ConstraintKind::Unary { .. } => "unary",
            ConstraintKind::Binary { .. } => "binary",
            ConstraintKind::Ternary { .. } => "ternary",
            ConstraintKind::Multi { .. } => "multi-value",
            ConstraintKind::List { .. } => "list",
            ConstraintKind::Loop { .. } => "loop",
        }
    }

    fn set_op(&mut self, op: &str) -> Result<(), ConstraintError> {
        let illegal = |family, allowed| ConstraintError::IllegalOperator {
            op: op.to_string(),
            family,
            allowed,
        };
        match self {
            ConstraintKind::Unary { op: slot } => {
                *slot = UnaryOp::parse(op).ok_or_else(|| illegal("unary", UnaryOp::LEGAL))?;
            }
            ConstraintKind::Binary { op: slot, .. } => {
                *slot = BinaryOp::parse(op).ok_or_else(|| illegal("binary", BinaryOp::LEGAL))?;
            }
            ConstraintKind::Ternary { op: slot, .. } => {
                *slot =
                    TernaryOp::parse(op).ok_or_else(|| illegal("ternary", TernaryOp::LEGAL))?;
            }
            ConstraintKind::Multi { op: slot, .. } => {
                *slot =
                    MultiOp::parse(op).ok_or_else(|| illegal("multi-value", MultiOp::LEGAL))?;
            }
            ConstraintKind::List { op: slot, .. } => {
                *slot = ListOp::parse(op).ok_or_else(|| illegal("list", ListOp::LEGAL))?;
            }
            ConstraintKind::Loop { op: slot, .. } => {
                *slot = LoopOp::parse(op).ok_or_else(|| illegal("loop", LoopOp::LEGAL))?;
            }
        }
        Ok(())
    }
}

/// A constraint that carries a code and takes part in boolean logic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodedConstraint {
    /// The constrained path.
    pub path: String,
    /// Logic code, unique within a query.
    pub code: SmolStr,
    /// Variant payload.
    pub kind: ConstraintKind,
}

impl CodedConstraint {
    /// Serializes to a `constraint` element. Multi-value payloads become
    /// repeated `value` children; loop operators use their wire form.
    pub(crate) fn to_element(&self) -> Element {
        let mut el = Element::new("constraint");
        el.set_attr("path", self.path.as_str());
        el.set_attr("code", self.code.as_str());
        match &self.kind {
            ConstraintKind::Unary { op } => {
                el.set_attr("op", op.as_str());
            }
            ConstraintKind::Binary { op, value } => {
                el.set_attr("op", op.as_str());
                el.set_attr("value", value.as_str());
            }
            ConstraintKind::Ternary {
                op,
                value,
                extra_value,
            } => {
                el.set_attr("op", op.as_str());
                el.set_attr("value", value.as_str());
                if let Some(extra) = extra_value {
                    el.set_attr("extraValue", extra.as_str());
                }
            }
            ConstraintKind::Multi { op, values } => {
                el.set_attr("op", op.as_str());
                for value in values {
                    let mut child = Element::new("value");
                    child.text = value.clone();
                    el.add_child(child);
                }
            }
            ConstraintKind::List { op, list_name } => {
                el.set_attr("op", op.as_str());
                el.set_attr("value", list_name.as_str());
            }
            ConstraintKind::Loop { op, loop_path } => {
                el.set_attr("op", op.wire_str());
                el.set_attr("loopPath", loop_path.as_str());
            }
        }
        el
    }

    /// Applies a typed field update, keeping the operator within the
    /// variant's legal set and payload fields within the variant's shape.
    pub fn apply(&mut self, update: &ConstraintUpdate) -> Result<(), ConstraintError> {
        if let Some(op) = &update.op {
            self.kind.set_op(op)?;
        }
        if let Some(value) = &update.value {
            match &mut self.kind {
                ConstraintKind::Binary { value: slot, .. }
                | ConstraintKind::Ternary { value: slot, .. }
                | ConstraintKind::List {
                    list_name: slot, ..
                } => *slot = value.clone(),
                other => {
                    return Err(ConstraintError::BadUpdate {
                        detail: format!(
                            "cannot set a value on a {} constraint",
                            other.family()
                        ),
                    });
                }
            }
        }
        if let Some(values) = &update.values {
            match &mut self.kind {
                ConstraintKind::Multi { values: slot, .. } => *slot = values.clone(),
                other => {
                    return Err(ConstraintError::BadUpdate {
                        detail: format!(
                            "cannot set a value list on a {} constraint",
                            other.family()
                        ),
                    });
                }
            }
        }
        if let Some(extra) = &update.extra_value {
            match &mut self.kind {
                ConstraintKind::Ternary { extra_value, .. } => {
                    *extra_value = Some(extra.clone());
                }
                other => {
                    return Err(ConstraintError::BadUpdate {
                        detail: format!(
                            "cannot set an extra value on a {} constraint",
                            other.family()
                        ),
                    });
                }
            }
        }
        if let Some(loop_path) = &update.loop_path {
            match &mut self.kind {
                ConstraintKind::Loop { loop_path: slot, .. } => {
                    path::check_format(loop_path)
                        .map_err(|_| ConstraintError::BadPath {
                            path: loop_path.clone(),
                        })?;
                    *slot = loop_path.clone();
                }
                other => {
                    return Err(ConstraintError::BadUpdate {
                        detail: format!(
                            "cannot set a loop path on a {} constraint",
                            other.family()
                        ),
                    });
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for CodedConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.path, self.kind.op_str())?;
        match &self.kind {
            ConstraintKind::Unary { .. } => Ok(()),
            ConstraintKind::Binary { value, .. } => write!(f, " {value}"),
            ConstraintKind::Ternary {
                value, extra_value, ..
            } => {
                write!(f, " {value}")?;
                if let Some(extra) = extra_value {
                    write!(f, " IN {extra}")?;
                }
                Ok(())
            }
            ConstraintKind::Multi { values, .. } => {
                write!(f, " [{}]", values.join(", "))
            }
            ConstraintKind::List { list_name, .. } => write!(f, " {list_name}"),
            ConstraintKind::Loop { loop_path, .. } => write!(f, " {loop_path}"),
        }
    }
}

/// An uncoded constraint narrowing a reference path to a subtype.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubClassConstraint {
    /// The reference path being narrowed.
    pub path: String,
    /// The subtype name.
    pub subclass: String,
}

impl SubClassConstraint {
    pub(crate) fn to_element(&self) -> Element {
        let mut el = Element::new("constraint");
        el.set_attr("path", self.path.as_str());
        el.set_attr("type", self.subclass.as_str());
        el
    }
}

impl fmt::Display for SubClassConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ISA {}", self.path, self.subclass)
    }
}

// ============================================================================
// Construction
// ============================================================================

/// The argument bag the constraint factory dispatches on.
///
/// Which fields are set, together with the operator's family, selects the
/// variant: `subclass` alone makes a subclass constraint; `values` demands a
/// multi-value operator; `loop_path` a loop operator; a bare `value` is a
/// comparison value, a LOOKUP term, or a list name depending on the
/// operator; no payload at all demands a null-check operator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstraintArgs {
    pub path: String,
    pub op: Option<String>,
    pub value: Option<String>,
    pub values: Option<Vec<String>>,
    pub extra_value: Option<String>,
    pub loop_path: Option<String>,
    pub subclass: Option<String>,
    pub code: Option<SmolStr>,
    pub editable: Option<bool>,
    pub switchable: Option<SwitchableStatus>,
}

impl ConstraintArgs {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_extra_value(mut self, extra: impl Into<String>) -> Self {
        self.extra_value = Some(extra.into());
        self
    }

    pub fn with_loop_path(mut self, loop_path: impl Into<String>) -> Self {
        self.loop_path = Some(loop_path.into());
        self
    }

    pub fn with_subclass(mut self, subclass: impl Into<String>) -> Self {
        self.subclass = Some(subclass.into());
        self
    }

    pub fn with_code(mut self, code: impl Into<SmolStr>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_editable(mut self, editable: bool) -> Self {
        self.editable = Some(editable);
        self
    }

    pub fn with_switchable(mut self, switchable: SwitchableStatus) -> Self {
        self.switchable = Some(switchable);
        self
    }
}

/// Template decorations split off the argument bag before dispatch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct TemplateArgs {
    pub editable: Option<bool>,
    pub switchable: Option<SwitchableStatus>,
}

/// A constraint fresh out of the factory, before code assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum BuiltConstraint {
    Coded {
        base: CodedConstraint,
        explicit_code: bool,
    },
    SubClass(SubClassConstraint),
}

/// Dispatches an argument bag to exactly one constraint variant.
///
/// Coded constraints come out with the explicit code when one was supplied,
/// or the placeholder code `A` otherwise; the owning query replaces the
/// placeholder with the next free code.
pub(crate) fn build_constraint(
    args: ConstraintArgs,
) -> Result<(BuiltConstraint, TemplateArgs), ConstraintError> {
    let no_match = |detail: String| ConstraintError::NoMatchingVariant { detail };

    path::check_format(&args.path).map_err(|_| ConstraintError::BadPath {
        path: args.path.clone(),
    })?;

    let template = TemplateArgs {
        editable: args.editable,
        switchable: args.switchable,
    };

    if let Some(subclass) = args.subclass {
        if args.op.is_some()
            || args.value.is_some()
            || args.values.is_some()
            || args.extra_value.is_some()
            || args.loop_path.is_some()
            || args.code.is_some()
        {
            return Err(no_match(format!(
                "a subclass constraint takes only a path and a subclass, got extra \
                 arguments for '{}'",
                args.path
            )));
        }
        path::check_format(&subclass).map_err(|_| ConstraintError::BadPath {
            path: subclass.clone(),
        })?;
        return Ok((
            BuiltConstraint::SubClass(SubClassConstraint {
                path: args.path,
                subclass,
            }),
            template,
        ));
    }

    let op = match args.op {
        Some(op) => op,
        None => {
            return Err(no_match(format!(
                "a constraint on '{}' needs an operator or a subclass",
                args.path
            )));
        }
    };

    let kind = if let Some(values) = args.values {
        let multi_op = MultiOp::parse(&op).ok_or_else(|| ConstraintError::IllegalOperator {
            op: op.clone(),
            family: "multi-value",
            allowed: MultiOp::LEGAL,
        })?;
        ConstraintKind::Multi {
            op: multi_op,
            values,
        }
    } else if let Some(loop_path) = args.loop_path {
        path::check_format(&loop_path).map_err(|_| ConstraintError::BadPath {
            path: loop_path.clone(),
        })?;
        let loop_op = LoopOp::parse(&op).ok_or_else(|| ConstraintError::IllegalOperator {
            op: op.clone(),
            family: "loop",
            allowed: LoopOp::LEGAL,
        })?;
        ConstraintKind::Loop {
            op: loop_op,
            loop_path,
        }
    } else if let Some(extra) = args.extra_value {
        let ternary_op =
            TernaryOp::parse(&op).ok_or_else(|| ConstraintError::IllegalOperator {
                op: op.clone(),
                family: "ternary",
                allowed: TernaryOp::LEGAL,
            })?;
        let value = args.value.ok_or_else(|| {
            no_match(format!(
                "a LOOKUP constraint on '{}' needs a value alongside its extra value",
                args.path
            ))
        })?;
        ConstraintKind::Ternary {
            op: ternary_op,
            value,
            extra_value: Some(extra),
        }
    } else if let Some(value) = args.value {
        // a bare value is a comparison value, a LOOKUP term, or a list
        // name, depending on the operator family
        if let Some(binary_op) = BinaryOp::parse(&op) {
            ConstraintKind::Binary {
                op: binary_op,
                value,
            }
        } else if let Some(ternary_op) = TernaryOp::parse(&op) {
            ConstraintKind::Ternary {
                op: ternary_op,
                value,
                extra_value: None,
            }
        } else if let Some(list_op) = ListOp::parse(&op) {
            ConstraintKind::List {
                op: list_op,
                list_name: value,
            }
        } else if MultiOp::parse(&op).is_some() {
            return Err(ConstraintError::ValuesRequired { op });
        } else {
            return Err(no_match(format!(
                "no constraint takes operator '{op}' with a single value"
            )));
        }
    } else if let Some(unary_op) = UnaryOp::parse(&op) {
        ConstraintKind::Unary { op: unary_op }
    } else if MultiOp::parse(&op).is_some() {
        return Err(ConstraintError::ValuesRequired { op });
    } else {
        return Err(no_match(format!(
            "no constraint takes operator '{op}' without a value"
        )));
    };

    let explicit_code = args.code.is_some();
    let base = CodedConstraint {
        path: args.path,
        code: args.code.unwrap_or_else(|| SmolStr::new("A")),
        kind,
    };
    Ok((BuiltConstraint::Coded {
        base,
        explicit_code,
    }, template))
}

/// A typed field update for an existing coded constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstraintUpdate {
    pub op: Option<String>,
    pub value: Option<String>,
    pub values: Option<Vec<String>>,
    pub extra_value: Option<String>,
    pub loop_path: Option<String>,
}

impl ConstraintUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_extra_value(mut self, extra: impl Into<String>) -> Self {
        self.extra_value = Some(extra.into());
        self
    }

    pub fn with_loop_path(mut self, loop_path: impl Into<String>) -> Self {
        self.loop_path = Some(loop_path.into());
        self
    }
}

// ============================================================================
// Code generation
// ============================================================================

/// Renders the `n`-th logic code: 1 is `A`, 26 is `Z`, 27 is `AA`.
fn letter_code(mut n: u32) -> SmolStr {
    let mut reversed = String::new();
    while n > 0 {
        n -= 1;
        reversed.push((b'A' + (n % 26) as u8) as char);
        n /= 26;
    }
    SmolStr::new(reversed.chars().rev().collect::<String>())
}

/// Hands out logic codes in creation order, skipping codes already in use
/// (explicitly supplied codes stay stable across later additions).
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CodeGenerator {
    next: u32,
}

impl CodeGenerator {
    pub(crate) fn new() -> Self {
        Self { next: 1 }
    }

    pub(crate) fn next_free(&mut self, is_taken: impl Fn(&str) -> bool) -> SmolStr {
        loop {
            let code = letter_code(self.next);
            self.next += 1;
            if !is_taken(&code) {
                return code;
            }
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Errors from building, validating, or editing constraints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstraintError {
    /// The argument bag matches no variant.
    NoMatchingVariant { detail: String },
    /// An operator outside the selected variant's legal set.
    IllegalOperator {
        op: String,
        family: &'static str,
        allowed: &'static str,
    },
    /// A multi-value operator given a scalar payload.
    ValuesRequired { op: String },
    /// A path or subclass argument failing the lexical pattern.
    BadPath { path: String },
    /// A value comparison on a path that is not an attribute.
    NotAnAttribute { path: String },
    /// A LOOKUP or list constraint on a path with no class.
    NotAClassOrReference { path: String },
    /// A subclass declaration that is not a subtype of the path's class.
    NotASubclass { subclass: String, parent: String },
    /// A loop comparison between unrelated classes.
    IncompatibleLoop { path: String, loop_path: String },
    /// A code the query has no constraint for.
    NoSuchCode { code: SmolStr },
    /// An attempt to re-parameterize a non-editable template constraint.
    NotEditable { code: SmolStr },
    /// An attempt to switch a locked template constraint.
    NotSwitchable { code: SmolStr },
    /// A field update that does not fit the constraint's variant.
    BadUpdate { detail: String },
}

impl fmt::Display for ConstraintError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintError::NoMatchingVariant { detail } => {
                write!(f, "No matching constraint class found: {detail}")
            }
            ConstraintError::IllegalOperator {
                op,
                family,
                allowed,
            } => write!(
                f,
                "{op} is not a legal operator for a {family} constraint \
                 (legal operators: {allowed})"
            ),
            ConstraintError::ValuesRequired { op } => {
                write!(f, "{op} requires a list of values")
            }
            ConstraintError::BadPath { path } => {
                write!(f, "'{path}' does not match the expected path pattern")
            }
            ConstraintError::NotAnAttribute { path } => {
                write!(f, "'{path}' does not represent an attribute")
            }
            ConstraintError::NotAClassOrReference { path } => write!(
                f,
                "'{path}' does not represent a class, or a reference to a class"
            ),
            ConstraintError::NotASubclass { subclass, parent } => {
                write!(f, "'{subclass}' is not a subclass of '{parent}'")
            }
            ConstraintError::IncompatibleLoop { path, loop_path } => write!(
                f,
                "'{loop_path}' does not refer to a class compatible with '{path}'"
            ),
            ConstraintError::NoSuchCode { code } => {
                write!(f, "There is no constraint with the code '{code}' on this query")
            }
            ConstraintError::NotEditable { code } => write!(
                f,
                "There is a constraint '{code}' on this query, but it is not editable"
            ),
            ConstraintError::NotSwitchable { code } => write!(
                f,
                "There is a constraint '{code}' on this query, but it is not switchable"
            ),
            ConstraintError::BadUpdate { detail } => f.write_str(detail),
        }
    }
}

impl std::error::Error for ConstraintError {}

impl ConstraintError {
    pub fn to_diag(&self) -> Diag {
        let code = match self {
            ConstraintError::NoMatchingVariant { .. } => "constraint::variant",
            ConstraintError::IllegalOperator { .. } => "constraint::operator",
            ConstraintError::ValuesRequired { .. } => "constraint::values",
            ConstraintError::BadPath { .. } => "constraint::path",
            ConstraintError::NotAnAttribute { .. }
            | ConstraintError::NotAClassOrReference { .. } => "constraint::target",
            ConstraintError::NotASubclass { .. } => "constraint::subclass",
            ConstraintError::IncompatibleLoop { .. } => "constraint::loop",
            ConstraintError::NoSuchCode { .. } => "constraint::code",
            ConstraintError::NotEditable { .. } | ConstraintError::NotSwitchable { .. } => {
                "constraint::template"
            }
            ConstraintError::BadUpdate { .. } => "constraint::update",
        };
        Diag::error(self.to_string()).with_code(code)
    }
}
