//! Templates: predefined queries whose constraints can be
//! re-parameterized per run.
//!
//! A template is a [`Query`] whose coded constraints are
//! [`TemplateConstraint`]s. Each carries an editability flag and a
//! switchable status on top of the underlying constraint, and the
//! template's request parameters name the editable, switched-on
//! constraints positionally rather than shipping a whole document.

use crate::constraint::{
    ConstraintError, ConstraintKind, ConstraintUpdate, SwitchableStatus, TemplateConstraint,
};
use crate::model::Model;
use crate::query::{Query, QueryError};
use std::collections::BTreeMap;

/// A query with re-parameterizable constraints.
pub type Template<'m> = Query<'m, TemplateConstraint>;

impl<'m> Query<'m> {
    /// Re-types this query as a template. Every coded constraint becomes
    /// editable and always on.
    pub fn into_template(self) -> Template<'m> {
        Query {
            model: self.model,
            name: self.name,
            description: self.description,
            views: self.views,
            path_descriptions: self.path_descriptions,
            joins: self.joins,
            constraint_dict: self
                .constraint_dict
                .into_iter()
                .map(|(code, base)| {
                    let con = TemplateConstraint::new(base, true, SwitchableStatus::default());
                    (code, con)
                })
                .collect(),
            uncoded_constraints: self.uncoded_constraints,
            sort_orders: self.sort_orders,
            logic: self.logic,
            codegen: self.codegen,
            validate: self.validate,
        }
    }
}

impl<'m> Query<'m, TemplateConstraint> {
    /// Reads a template from its document, then verifies the whole of it
    /// against the model. Both a bare query element and the usual
    /// `template` wrapper around one are accepted.
    pub fn parse(model: &'m Model, source: &str) -> Result<Template<'m>, QueryError> {
        Self::read_xml(model, source)
    }

    /// The constraints open to re-parameterization, in code order.
    pub fn editable_constraints(&self) -> impl Iterator<Item = &TemplateConstraint> {
        self.coded_constraints().filter(|con| con.editable)
    }

    fn constraint_mut(&mut self, code: &str) -> Result<&mut TemplateConstraint, QueryError> {
        self.constraint_dict
            .get_mut(code)
            .ok_or_else(|| ConstraintError::NoSuchCode { code: code.into() }.into())
    }

    /// Turns an optional constraint on.
    pub fn switch_on(&mut self, code: &str) -> Result<(), QueryError> {
        self.constraint_mut(code)?.switch_on()?;
        Ok(())
    }

    /// Turns an optional constraint off, removing it from the request
    /// parameters.
    pub fn switch_off(&mut self, code: &str) -> Result<(), QueryError> {
        self.constraint_mut(code)?.switch_off()?;
        Ok(())
    }

    /// A copy of this template with the given constraint updates applied.
    /// Updates are keyed by constraint code and may only touch editable
    /// constraints; this template is left untouched.
    pub fn get_adjusted_template<S, I>(&self, updates: I) -> Result<Template<'m>, QueryError>
    where
        S: AsRef<str>,
        I: IntoIterator<Item = (S, ConstraintUpdate)>,
    {
        let mut adjusted = self.clone();
        for (code, update) in updates {
            let con = adjusted.constraint_mut(code.as_ref())?;
            if !con.editable {
                return Err(ConstraintError::NotEditable {
                    code: con.base.code.clone(),
                }
                .into());
            }
            con.base.apply(&update)?;
        }
        Ok(adjusted)
    }

    /// The request parameters for running this template: its name plus
    /// one positional group per editable, switched-on constraint, in
    /// code order. Groups are numbered densely from 1 and carry the
    /// constraint's code, path, operator, and payload.
    pub fn to_query_params(&self) -> BTreeMap<String, String> {
        let mut params = BTreeMap::new();
        params.insert("name".to_string(), self.name.clone());
        let active = self
            .editable_constraints()
            .filter(|con| con.switched_on());
        for (i, con) in active.enumerate() {
            let n = i + 1;
            params.insert(format!("code{n}"), con.base.code.to_string());
            params.insert(format!("constraint{n}"), con.base.path.clone());
            match &con.base.kind {
                ConstraintKind::Unary { op } => {
                    params.insert(format!("op{n}"), op.to_string());
                }
                ConstraintKind::Binary { op, value } => {
                    params.insert(format!("op{n}"), op.to_string());
                    params.insert(format!("value{n}"), value.clone());
                }
                ConstraintKind::Ternary {
                    op,
                    value,
                    extra_value,
                } => {
                    params.insert(format!("op{n}"), op.to_string());
                    params.insert(format!("value{n}"), value.clone());
                    if let Some(extra) = extra_value {
                        params.insert(format!("extra{n}"), extra.clone());
                    }
                }
                ConstraintKind::Multi { op, values } => {
                    params.insert(format!("op{n}"), op.to_string());
                    params.insert(format!("value{n}"), values.join(","));
                }
                ConstraintKind::List { op, list_name } => {
                    params.insert(format!("op{n}"), op.to_string());
                    params.insert(format!("value{n}"), list_name.clone());
                }
                ConstraintKind::Loop { op, loop_path } => {
                    params.insert(format!("op{n}"), op.wire_str().to_string());
                    params.insert(format!("loopPath{n}"), loop_path.clone());
                }
            }
        }
        params
    }
}
