//! Query construction for schema-described data warehouses, with rich
//! diagnostics.
//!
//! This library builds, validates, and serializes structured queries
//! against a data model fetched from a warehouse service. Every path,
//! constraint, join, and sort order is checked against the model as the
//! query grows, with errors convertible to miette reports.
//!
//! # Example
//!
//! ```
//! use pathquery::{ConstraintArgs, Model, Query};
//!
//! let model = Model::parse(
//!     r#"<model name="testmodel" package="org.intermine.model.testmodel">
//!          <class name="Employee">
//!            <attribute name="name" type="java.lang.String"/>
//!            <attribute name="age" type="int"/>
//!          </class>
//!        </model>"#,
//! )
//! .unwrap();
//!
//! let mut query = Query::new(&model);
//! query.add_view("Employee.name Employee.age").unwrap();
//! query
//!     .add_constraint(ConstraintArgs::new("Employee.age").with_op(">").with_value("50"))
//!     .unwrap();
//!
//! let xml = query.to_xml().unwrap();
//! assert!(xml.contains(r#"view="Employee.name Employee.age""#));
//! assert!(xml.contains(r#"<constraint code="A" op="&gt;" path="Employee.age" value="50"/>"#));
//! ```

pub mod constraint;
pub mod diag;
pub mod logic;
pub mod model;
pub mod query;
pub mod xml;

// Re-export the data model types.
pub use model::path::{Path, PathError, SubclassMap};
pub use model::{Class, Field, Model, ModelError};

// Re-export the query machinery for convenience.
pub use constraint::{
    CodedConstraint, ConstraintArgs, ConstraintError, ConstraintUpdate, SwitchableStatus,
    TemplateConstraint,
};
pub use logic::{Logic, LogicOp, parse_logic};
pub use query::{
    Join, JoinStyle, PathDescription, Query, QueryError, SortDirection, SortOrder, Template,
};

// Re-export diagnostic primitives.
pub use diag::{Diag, DiagLabel, DiagSeverity, SourceFile};
