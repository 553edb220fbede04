//! Common test utilities
//!
//! This module holds the shared data model fixture used across the
//! integration tests. The model mirrors the testmodel published by the
//! reference warehouse services: a company with departments, employees,
//! and a management hierarchy deep enough to exercise subclassing.

use pathquery::Model;

/// Schema document for the shared test model.
///
/// Inheritance runs CEO -> Manager -> Employee, and every
/// reverse-reference resolves once inherited fields are merged in
/// (Department.manager points back at the department field Manager
/// inherits from Employee).
pub const TESTMODEL: &str = r#"<model name="testmodel" package="org.intermine.model.testmodel">
  <class name="Address">
    <attribute name="address" type="java.lang.String"/>
  </class>
  <class name="Employee">
    <attribute name="name" type="java.lang.String"/>
    <attribute name="age" type="int"/>
    <attribute name="fullTime" type="boolean"/>
    <attribute name="end" type="java.lang.String"/>
    <reference name="address" referenced-type="Address"/>
    <reference name="department" referenced-type="Department" reverse-reference="employees"/>
  </class>
  <class name="Manager" extends="Employee">
    <attribute name="seniority" type="java.lang.Integer"/>
    <attribute name="title" type="java.lang.String"/>
  </class>
  <class name="CEO" extends="Manager">
    <attribute name="salary" type="int"/>
    <reference name="company" referenced-type="Company" reverse-reference="CEO"/>
  </class>
  <class name="Department">
    <attribute name="name" type="java.lang.String"/>
    <reference name="address" referenced-type="Address"/>
    <reference name="company" referenced-type="Company" reverse-reference="departments"/>
    <reference name="manager" referenced-type="Manager" reverse-reference="department"/>
    <collection name="employees" referenced-type="Employee" reverse-reference="department"/>
  </class>
  <class name="Company">
    <attribute name="name" type="java.lang.String"/>
    <attribute name="vatNumber" type="int"/>
    <reference name="address" referenced-type="Address"/>
    <reference name="CEO" referenced-type="CEO" reverse-reference="company"/>
    <collection name="departments" referenced-type="Department" reverse-reference="company"/>
  </class>
</model>"#;

/// Parse the shared test model.
///
/// # Panics
/// Panics with the parse error if the fixture is broken, so every test
/// fails loudly rather than with a confusing downstream error.
pub fn load_model() -> Model {
    Model::parse(TESTMODEL).unwrap_or_else(|err| panic!("test model should parse: {err}"))
}
