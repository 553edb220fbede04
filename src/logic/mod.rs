//! Boolean logic over constraint codes.
//!
//! A query's coded constraints combine into a single boolean expression,
//! e.g. `A and (B or C)`. The expression is a binary tree of codes joined
//! by `and`/`or`; [`parser`] builds one from text, and the `&`/`|`
//! operators build one from constraint handles.
//!
//! Rendering inserts brackets only where the operator changes between a
//! group and its parent, so same-operator chains stay flat:
//! `A and B and C`, but `(B and C) or (A and D)`.

pub mod parser;

use crate::constraint::{CodedConstraint, TemplateConstraint};
use smol_str::SmolStr;
use std::fmt;
use std::ops::{BitAnd, BitOr};

pub use parser::parse_logic;

/// A boolean connective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicOp {
    And,
    Or,
}

impl LogicOp {
    pub const fn as_str(self) -> &'static str {
        match self {
            LogicOp::And => "and",
            LogicOp::Or => "or",
        }
    }
}

impl fmt::Display for LogicOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Two logic subtrees joined by a connective.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicGroup {
    pub left: Logic,
    pub op: LogicOp,
    pub right: Logic,
}

/// A boolean expression over constraint codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Logic {
    /// A single constraint code.
    Code(SmolStr),
    /// A bracketed combination.
    Group(Box<LogicGroup>),
}

impl Logic {
    pub fn code(code: impl Into<SmolStr>) -> Self {
        Logic::Code(code.into())
    }

    pub fn group(left: Logic, op: LogicOp, right: Logic) -> Self {
        Logic::Group(Box::new(LogicGroup { left, op, right }))
    }

    /// The codes mentioned, left to right. Repeats are kept.
    pub fn codes(&self) -> Vec<SmolStr> {
        let mut out = Vec::new();
        self.collect_codes(&mut out);
        out
    }

    fn collect_codes(&self, out: &mut Vec<SmolStr>) {
        match self {
            Logic::Code(code) => out.push(code.clone()),
            Logic::Group(group) => {
                group.left.collect_codes(out);
                group.right.collect_codes(out);
            }
        }
    }

    /// Folds codes into a single expression under one connective. Returns
    /// `None` for an empty code list.
    pub(crate) fn fold<I>(op: LogicOp, codes: I) -> Option<Logic>
    where
        I: IntoIterator,
        I::Item: Into<SmolStr>,
    {
        let mut codes = codes.into_iter();
        let first = Logic::Code(codes.next()?.into());
        Some(codes.fold(first, |acc, code| {
            Logic::group(acc, op, Logic::Code(code.into()))
        }))
    }

    fn write(&self, f: &mut fmt::Formatter<'_>, parent: Option<LogicOp>) -> fmt::Result {
        match self {
            Logic::Code(code) => f.write_str(code),
            Logic::Group(group) => {
                // brackets only where the connective changes
                let bracketed = parent.is_some_and(|p| p != group.op);
                if bracketed {
                    f.write_str("(")?;
                }
                group.left.write(f, Some(group.op))?;
                write!(f, " {} ", group.op)?;
                group.right.write(f, Some(group.op))?;
                if bracketed {
                    f.write_str(")")?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for Logic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write(f, None)
    }
}

impl From<&CodedConstraint> for Logic {
    fn from(con: &CodedConstraint) -> Self {
        Logic::Code(con.code.clone())
    }
}

// template constraints combine through their base code
impl From<&TemplateConstraint> for Logic {
    fn from(con: &TemplateConstraint) -> Self {
        Logic::Code(con.base.code.clone())
    }
}

impl<R: Into<Logic>> BitAnd<R> for Logic {
    type Output = Logic;

    fn bitand(self, rhs: R) -> Logic {
        Logic::group(self, LogicOp::And, rhs.into())
    }
}

impl<R: Into<Logic>> BitOr<R> for Logic {
    type Output = Logic;

    fn bitor(self, rhs: R) -> Logic {
        Logic::group(self, LogicOp::Or, rhs.into())
    }
}

impl<R: Into<Logic>> BitAnd<R> for &CodedConstraint {
    type Output = Logic;

    fn bitand(self, rhs: R) -> Logic {
        Logic::group(Logic::from(self), LogicOp::And, rhs.into())
    }
}

impl<R: Into<Logic>> BitOr<R> for &CodedConstraint {
    type Output = Logic;

    fn bitor(self, rhs: R) -> Logic {
        Logic::group(Logic::from(self), LogicOp::Or, rhs.into())
    }
}

impl<R: Into<Logic>> BitAnd<R> for &TemplateConstraint {
    type Output = Logic;

    fn bitand(self, rhs: R) -> Logic {
        Logic::group(Logic::from(self), LogicOp::And, rhs.into())
    }
}

impl<R: Into<Logic>> BitOr<R> for &TemplateConstraint {
    type Output = Logic;

    fn bitor(self, rhs: R) -> Logic {
        Logic::group(Logic::from(self), LogicOp::Or, rhs.into())
    }
}
