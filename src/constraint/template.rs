//! Template decorations over coded constraints.
//!
//! A template is a query whose constraints callers may tune before running
//! it. Each coded constraint gains two flags: whether its operator and
//! payload may be edited, and whether it can be switched off entirely.
//! Subclass constraints are structural and carry no decoration.

use crate::constraint::{CodedConstraint, ConstraintError, TemplateArgs};
use crate::xml::Element;
use std::fmt;

/// Whether a template constraint can be toggled, and its current toggle.
///
/// `Locked` constraints always apply. `On` and `Off` constraints are
/// optional, with `Off` ones excluded from execution parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SwitchableStatus {
    #[default]
    Locked,
    On,
    Off,
}

impl SwitchableStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "locked" => Some(SwitchableStatus::Locked),
            "on" => Some(SwitchableStatus::On),
            "off" => Some(SwitchableStatus::Off),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            SwitchableStatus::Locked => "locked",
            SwitchableStatus::On => "on",
            SwitchableStatus::Off => "off",
        }
    }
}

impl fmt::Display for SwitchableStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A coded constraint wrapped with its template flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateConstraint {
    /// The underlying coded constraint.
    pub base: CodedConstraint,
    /// Whether callers may re-parameterize this constraint.
    pub editable: bool,
    status: SwitchableStatus,
}

impl TemplateConstraint {
    pub fn new(base: CodedConstraint, editable: bool, status: SwitchableStatus) -> Self {
        Self {
            base,
            editable,
            status,
        }
    }

    /// Applies decoration defaults: editable, locked.
    pub(crate) fn from_args(base: CodedConstraint, args: TemplateArgs) -> Self {
        Self {
            base,
            editable: args.editable.unwrap_or(true),
            status: args.switchable.unwrap_or_default(),
        }
    }

    /// True when the constraint always applies.
    pub fn required(&self) -> bool {
        self.status == SwitchableStatus::Locked
    }

    /// True when the constraint can be switched on and off.
    pub fn optional(&self) -> bool {
        !self.required()
    }

    /// True unless the constraint is switched off. Locked constraints count
    /// as on.
    pub fn switched_on(&self) -> bool {
        self.status != SwitchableStatus::Off
    }

    pub fn switched_off(&self) -> bool {
        self.status == SwitchableStatus::Off
    }

    pub fn switchable_status(&self) -> SwitchableStatus {
        self.status
    }

    pub fn switch_on(&mut self) -> Result<(), ConstraintError> {
        self.set_status(SwitchableStatus::On)
    }

    pub fn switch_off(&mut self) -> Result<(), ConstraintError> {
        self.set_status(SwitchableStatus::Off)
    }

    fn set_status(&mut self, status: SwitchableStatus) -> Result<(), ConstraintError> {
        if self.required() {
            return Err(ConstraintError::NotSwitchable {
                code: self.base.code.clone(),
            });
        }
        self.status = status;
        Ok(())
    }

    /// Adds the template attributes to a serialized `constraint` element.
    /// The switchable attribute appears only on optional constraints.
    pub(crate) fn decorate(&self, el: &mut Element) {
        el.set_attr("editable", if self.editable { "true" } else { "false" });
        if self.optional() {
            el.set_attr("switchable", self.status.as_str());
        }
    }
}

impl fmt::Display for TemplateConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let editable = if self.editable { "editable" } else { "non-editable" };
        write!(f, "{} ({editable}, {})", self.base, self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::{BuiltConstraint, ConstraintArgs, build_constraint};

    fn age_constraint() -> CodedConstraint {
        let (built, _) = build_constraint(
            ConstraintArgs::new("Employee.age")
                .with_op(">")
                .with_value("10"),
        )
        .unwrap();
        match built {
            BuiltConstraint::Coded { base, .. } => base,
            other => panic!("expected a coded constraint, got {other:?}"),
        }
    }

    #[test]
    fn defaults_are_editable_and_locked() {
        let con = TemplateConstraint::from_args(age_constraint(), TemplateArgs::default());
        assert!(con.editable);
        assert!(con.required());
        assert!(!con.optional());
        assert!(con.switched_on());
        assert!(!con.switched_off());
    }

    #[test]
    fn optional_constraints_toggle() {
        let mut con =
            TemplateConstraint::new(age_constraint(), true, SwitchableStatus::On);
        assert!(con.optional());
        assert!(con.switched_on());

        con.switch_off().unwrap();
        assert!(con.switched_off());
        con.switch_on().unwrap();
        assert!(con.switched_on());
    }

    #[test]
    fn locked_constraints_refuse_to_toggle() {
        let mut con =
            TemplateConstraint::new(age_constraint(), true, SwitchableStatus::Locked);
        let err = con.switch_off().unwrap_err();
        assert_eq!(err, ConstraintError::NotSwitchable { code: "A".into() });
        assert!(con.switched_on());
    }

    #[test]
    fn displays_base_and_flags() {
        let con = TemplateConstraint::new(age_constraint(), true, SwitchableStatus::Locked);
        assert_eq!(con.to_string(), "Employee.age > 10 (editable, locked)");

        let con = TemplateConstraint::new(age_constraint(), false, SwitchableStatus::Off);
        assert_eq!(con.to_string(), "Employee.age > 10 (non-editable, off)");
    }

    #[test]
    fn decoration_attributes_follow_the_flags() {
        let mut el = Element::new("constraint");
        TemplateConstraint::new(age_constraint(), true, SwitchableStatus::Locked)
            .decorate(&mut el);
        assert_eq!(el.attr("editable"), Some("true"));
        assert_eq!(el.attr("switchable"), None);

        let mut el = Element::new("constraint");
        TemplateConstraint::new(age_constraint(), false, SwitchableStatus::Off)
            .decorate(&mut el);
        assert_eq!(el.attr("editable"), Some("false"));
        assert_eq!(el.attr("switchable"), Some("off"));
    }

    #[test]
    fn status_parses_exact_lowercase_only() {
        assert_eq!(SwitchableStatus::parse("locked"), Some(SwitchableStatus::Locked));
        assert_eq!(SwitchableStatus::parse("on"), Some(SwitchableStatus::On));
        assert_eq!(SwitchableStatus::parse("off"), Some(SwitchableStatus::Off));
        assert_eq!(SwitchableStatus::parse("ON"), None);
        assert_eq!(SwitchableStatus::parse(""), None);
    }
}
