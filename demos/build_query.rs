//! Query construction demonstration
//!
//! This example builds a query against a small company schema, serializes
//! it to its canonical document form, reads it back, and shows how
//! validation failures render as positioned diagnostics.

use pathquery::diag::convert_diag_to_report;
use pathquery::{ConstraintArgs, Model, Query, SortDirection, SourceFile};

const SCHEMA: &str = r#"<model name="testmodel" package="org.intermine.model.testmodel">
  <class name="Employee">
    <attribute name="name" type="java.lang.String"/>
    <attribute name="age" type="int"/>
    <reference name="department" referenced-type="Department" reverse-reference="employees"/>
  </class>
  <class name="Manager" extends="Employee">
    <attribute name="title" type="java.lang.String"/>
  </class>
  <class name="Department">
    <attribute name="name" type="java.lang.String"/>
    <collection name="employees" referenced-type="Employee" reverse-reference="department"/>
  </class>
</model>"#;

fn main() {
    println!("=== Query Construction Demo ===\n");

    let model = match Model::parse(SCHEMA) {
        Ok(model) => model,
        Err(err) => {
            let report = convert_diag_to_report(&err.to_diag(), &SourceFile::new(SCHEMA));
            eprintln!("{report:?}");
            return;
        }
    };

    demo_build_and_serialize(&model);
    demo_round_trip(&model);
    demo_validation_failure(&model);
}

fn demo_build_and_serialize(model: &Model) {
    println!("--- Example 1: Build and Serialize ---");

    let mut q = Query::new(model);
    q.name = "DepartmentSearch".to_string();
    q.add_view("Employee.name Employee.age Employee.department.name")
        .unwrap();
    q.add_constraint(ConstraintArgs::new("Employee.age").with_op(">").with_value("30"))
        .unwrap();
    q.add_constraint(
        ConstraintArgs::new("Employee.department.name")
            .with_op("ONE OF")
            .with_values(["Sales", "Accounting"]),
    )
    .unwrap();
    q.add_constraint(ConstraintArgs::new("Employee.department.employees").with_subclass("Manager"))
        .unwrap();
    q.add_join("Employee.department", "outer").unwrap();
    q.add_sort_order("Employee.age", SortDirection::Desc).unwrap();
    q.set_logic("A and B").unwrap();

    println!("constraints:");
    for con in q.coded_constraints() {
        println!("  {con}");
    }
    for con in q.subclass_constraints() {
        println!("  {con}");
    }
    if let Ok(logic) = q.get_logic() {
        println!("logic: {logic}");
    }

    match q.to_formatted_xml() {
        Ok(xml) => println!("\n{xml}"),
        Err(err) => eprintln!("✗ serialization failed: {err}"),
    }
    println!();
}

fn demo_round_trip(model: &Model) {
    println!("--- Example 2: Read a Document Back ---");

    let document = r#"<query name="Old" model="testmodel" view="Employee.name Employee.age"
                      sortOrder="Employee.name asc" constraintLogic="A or B">
      <constraint path="Employee.age" op="&lt;" value="21" code="A"/>
      <constraint path="Employee.age" op="&gt;" value="65" code="B"/>
    </query>"#;

    match Query::from_xml(model, document) {
        Ok(q) => {
            println!("✓ Parsed query '{}' with {} views", q.name, q.views().len());
            match q.to_query_params() {
                Ok(params) => {
                    for (key, value) in &params {
                        println!("  {key} = {value}");
                    }
                }
                Err(err) => eprintln!("✗ {err}"),
            }
        }
        Err(err) => eprintln!("✗ parse failed: {err}"),
    }
    println!();
}

fn demo_validation_failure(model: &Model) {
    println!("--- Example 3: A Misspelled Path ---");

    let mut q = Query::new(model);
    let path = "Employee.department.nam";
    match q.add_view(path) {
        Ok(()) => println!("✓ unexpected success"),
        Err(err) => {
            let source = SourceFile::with_name(path, "view path");
            let report = convert_diag_to_report(&err.to_diag(), &source);
            println!("{report:?}");
        }
    }
}
