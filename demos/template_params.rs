//! Template parameterization demonstration
//!
//! This example loads a predefined template, tweaks its editable
//! constraints, and prints the request parameters each variant would
//! send to a webservice.

use pathquery::{ConstraintUpdate, Model, Template};

const SCHEMA: &str = r#"<model name="testmodel" package="org.intermine.model.testmodel">
  <class name="Employee">
    <attribute name="name" type="java.lang.String"/>
    <attribute name="age" type="int"/>
    <reference name="department" referenced-type="Department" reverse-reference="employees"/>
  </class>
  <class name="Department">
    <attribute name="name" type="java.lang.String"/>
    <collection name="employees" referenced-type="Employee" reverse-reference="department"/>
  </class>
</model>"#;

const TEMPLATE: &str = r#"<template name="EmployeesOverAge" title="Employees over a given age">
  <query name="EmployeesOverAge" model="testmodel" view="Employee.name Employee.age"
         sortOrder="Employee.age desc" longDescription="">
    <constraint path="Employee.age" op="&gt;" value="30" code="A" editable="true"/>
    <constraint path="Employee.department" op="LOOKUP" value="Sales" code="B"
                editable="true" switchable="on"/>
  </query>
</template>"#;

fn main() {
    println!("=== Template Parameterization Demo ===\n");

    let model = match Model::parse(SCHEMA) {
        Ok(model) => model,
        Err(err) => {
            eprintln!("✗ schema failed to parse: {err}");
            return;
        }
    };
    let template = match Template::parse(&model, TEMPLATE) {
        Ok(template) => template,
        Err(err) => {
            eprintln!("✗ template failed to parse: {err}");
            return;
        }
    };

    demo_default_parameters(&template);
    demo_adjusted_parameters(&template);
    demo_switched_off(&template);
}

fn print_params(template: &Template) {
    for (key, value) in template.to_query_params() {
        println!("  {key} = {value}");
    }
    println!();
}

fn demo_default_parameters(template: &Template) {
    println!("--- Example 1: Defaults ---");
    println!("editable constraints:");
    for con in template.editable_constraints() {
        println!("  {con}");
    }
    println!("parameters:");
    print_params(template);
}

fn demo_adjusted_parameters(template: &Template) {
    println!("--- Example 2: Adjusted Values ---");
    let updates = [
        ("A", ConstraintUpdate::new().with_op(">=").with_value("40")),
        ("B", ConstraintUpdate::new().with_value("Accounting")),
    ];
    match template.get_adjusted_template(updates) {
        Ok(adjusted) => {
            println!("parameters:");
            print_params(&adjusted);
        }
        Err(err) => eprintln!("✗ {err}"),
    }
}

fn demo_switched_off(template: &Template) {
    println!("--- Example 3: Switching a Constraint Off ---");
    let mut variant = template.clone();
    match variant.switch_off("B") {
        Ok(()) => {
            println!("parameters without the department lookup:");
            print_params(&variant);
        }
        Err(err) => eprintln!("✗ {err}"),
    }
}
