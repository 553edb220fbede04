mod common;

use common::load_model;
use pathquery::diag::convert_diag_to_report;
use pathquery::logic::parser::LogicError;
use pathquery::{ConstraintArgs, Query, QueryError, SortDirection, SourceFile};

#[test]
fn every_view_spelling_builds_the_same_query() {
    let model = load_model();
    let mut reference = Query::new(&model);
    reference.add_view("Employee.name").unwrap();
    reference.add_view("Employee.age").unwrap();

    let spellings = [
        "Employee.name Employee.age",
        "Employee.name,Employee.age",
        "Employee.name, Employee.age",
    ];
    for spelling in spellings {
        let mut q = Query::new(&model);
        q.add_view(spelling).unwrap();
        assert_eq!(q.views(), reference.views(), "{spelling}");
    }

    let mut q = Query::new(&model);
    q.add_views(["Employee.name", "Employee.age"]).unwrap();
    assert_eq!(q.views(), reference.views());
}

/// One query using every constraint variant, serialized to the canonical
/// document and read back byte for byte.
#[test]
fn the_kitchen_sink_query_round_trips() {
    let model = load_model();
    let mut q = Query::new(&model);
    q.add_view("Employee.name Employee.age Employee.department.name").unwrap();
    q.add_constraint(ConstraintArgs::new("Employee.name").with_op("IS NOT NULL"))
        .unwrap();
    q.add_constraint(
        ConstraintArgs::new("Employee.age").with_op(">").with_value("10"),
    )
    .unwrap();
    q.add_constraint(
        ConstraintArgs::new("Employee.department")
            .with_op("LOOKUP")
            .with_value("Sales")
            .with_extra_value("Wernham-Hogg"),
    )
    .unwrap();
    q.add_constraint(
        ConstraintArgs::new("Employee.department.employees.name")
            .with_op("ONE OF")
            .with_values(["John", "Paul", "Mary"]),
    )
    .unwrap();
    q.add_constraint(
        ConstraintArgs::new("Employee.department.manager")
            .with_op("IS")
            .with_loop_path("Employee"),
    )
    .unwrap();
    q.add_constraint(
        ConstraintArgs::new("Employee")
            .with_op("IN")
            .with_value("some list of employees"),
    )
    .unwrap();
    q.add_constraint(
        ConstraintArgs::new("Department.employees").with_subclass("Manager"),
    )
    .unwrap();
    q.add_join("Employee.department", "outer").unwrap();
    q.add_sort_order("Employee.age", SortDirection::Asc).unwrap();
    q.set_logic("(A and B) or (C and D and (E or F))").unwrap();

    let expected = concat!(
        r#"<query constraintLogic="(A and B) or (C and D and (E or F))" "#,
        r#"longDescription="" model="testmodel" name="" sortOrder="Employee.age asc" "#,
        r#"view="Employee.name Employee.age Employee.department.name">"#,
        r#"<join path="Employee.department" style="OUTER"/>"#,
        r#"<constraint code="A" op="IS NOT NULL" path="Employee.name"/>"#,
        r#"<constraint code="B" op="&gt;" path="Employee.age" value="10"/>"#,
        r#"<constraint code="C" extraValue="Wernham-Hogg" op="LOOKUP" path="Employee.department" value="Sales"/>"#,
        r#"<constraint code="D" op="ONE OF" path="Employee.department.employees.name">"#,
        "<value>John</value><value>Paul</value><value>Mary</value></constraint>",
        r#"<constraint code="E" loopPath="Employee" op="=" path="Employee.department.manager"/>"#,
        r#"<constraint code="F" op="IN" path="Employee" value="some list of employees"/>"#,
        r#"<constraint path="Employee.department.employees" type="Manager"/>"#,
        "</query>",
    );
    assert_eq!(q.to_xml().unwrap(), expected);

    let restored = Query::from_xml(&model, expected).unwrap();
    assert_eq!(restored.to_xml().unwrap(), expected);
}

#[test]
fn and_binds_tighter_than_or() {
    let model = load_model();
    let mut q = Query::new(&model);
    for path in ["Employee.name", "Employee.age", "Employee.fullTime", "Employee.end"] {
        q.add_constraint(ConstraintArgs::new(path).with_op("IS NULL")).unwrap();
    }

    q.set_logic("A and B or C and D").unwrap();
    assert_eq!(q.get_logic().unwrap().to_string(), "(A and B) or (C and D)");

    q.set_logic("A or B and C or D").unwrap();
    assert_eq!(q.get_logic().unwrap().to_string(), "A or (B and C) or D");

    q.set_logic("(A or B) and (C or D)").unwrap();
    assert_eq!(q.get_logic().unwrap().to_string(), "(A or B) and (C or D)");
}

#[test]
fn bad_logic_expressions_are_rejected() {
    let model = load_model();
    let mut q = Query::new(&model);
    for path in ["Employee.name", "Employee.age", "Employee.fullTime", "Employee.end"] {
        q.add_constraint(ConstraintArgs::new(path).with_op("IS NULL")).unwrap();
    }

    let err = q.set_logic("E and C or A and D").unwrap_err();
    assert_eq!(
        err.to_string(),
        "There is no constraint with the code 'E' on this query"
    );

    let err = q.set_logic("A and B and C").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Constraint D is not mentioned in the logic: A and B and C"
    );

    let cases: [(&str, fn(&LogicError) -> bool); 5] = [
        ("A and B and C not D", |e| {
            matches!(e, LogicError::ExpectedOperator { .. })
        }),
        ("A and ((B and C and D)", |e| {
            matches!(e, LogicError::UnmatchedOpenBracket { .. })
        }),
        ("A and ((B and C) and D))", |e| {
            matches!(e, LogicError::UnmatchedCloseBracket { .. })
        }),
        ("A and B( and C and D)", |e| {
            matches!(e, LogicError::UnexpectedOpenBracket { .. })
        }),
        ("A and (B and C and )D", |e| {
            matches!(e, LogicError::ExpectedCode { .. })
        }),
    ];
    for (expression, is_expected) in cases {
        match q.set_logic(expression).unwrap_err() {
            QueryError::Logic(err) => {
                assert!(is_expected(&err), "unexpected error for {expression:?}: {err}");
            }
            other => panic!("expected a logic error for {expression:?}, got {other}"),
        }
    }
}

#[test]
fn constraint_codes_roll_over_past_z() {
    let model = load_model();
    let mut q = Query::new(&model);
    q.add_view("Employee.age").unwrap();
    let mut last = None;
    for _ in 0..27 {
        last = q
            .add_constraint(ConstraintArgs::new("Employee.age").with_op("IS NULL"))
            .unwrap();
    }
    assert_eq!(last.as_deref(), Some("AA"));
    assert_eq!(q.coded_constraints().count(), 27);

    let logic = q.get_logic().unwrap().to_string();
    assert!(logic.starts_with("A and B and "));
    assert!(logic.ends_with(" and Z and AA"));

    // serialization follows assignment order too, not string order
    let xml = q.to_xml().unwrap();
    let z = xml.find(r#"code="Z""#).unwrap();
    let aa = xml.find(r#"code="AA""#).unwrap();
    assert!(z < aa, "Z serialized after AA: {xml}");
}

#[test]
fn narrowing_a_collection_unlocks_subclass_fields_through_serialization() {
    let model = load_model();
    let mut q = Query::new(&model);
    q.add_constraint(
        ConstraintArgs::new("Department.employees").with_subclass("Manager"),
    )
    .unwrap();
    q.add_view("Department.name Department.employees.title").unwrap();

    let xml = q.to_xml().unwrap();
    let restored = Query::from_xml(&model, &xml).unwrap();
    assert_eq!(restored.views(), q.views());
    assert_eq!(
        restored
            .get_subclass_dict()
            .get("Department.employees")
            .map(|s| s.as_str()),
        Some("Manager")
    );

    // without the narrowing constraint the same view list is invalid
    let mut bare = Query::new(&model);
    let err = bare
        .add_view("Department.name Department.employees.title")
        .unwrap_err();
    assert!(matches!(err, QueryError::Path(_)));
}

#[test]
fn old_style_description_attributes_are_canonicalized() {
    let model = load_model();
    let source = r#"<query name="q" model="testmodel" view="Employee.name"
                    description="All the employees"/>"#;
    let q = Query::from_xml(&model, source).unwrap();
    assert_eq!(q.description, "All the employees");
    assert!(
        q.to_xml()
            .unwrap()
            .contains(r#"longDescription="All the employees""#)
    );
}

#[test]
fn logic_errors_render_as_positioned_reports() {
    let model = load_model();
    let mut q = Query::new(&model);
    q.add_constraint(ConstraintArgs::new("Employee.name").with_op("IS NULL"))
        .unwrap();

    let expression = "A and Q";
    let err = q.set_logic(expression).unwrap_err();
    let diag = err.to_diag();
    assert_eq!(diag.code.as_deref(), Some("logic::code"));
    assert_eq!(diag.labels[0].span, 6..7); // points at "Q"

    let source = SourceFile::with_name(expression, "constraint logic");
    let report = convert_diag_to_report(&diag, &source);
    let rendered = format!("{report:?}");
    assert!(
        rendered.contains("There is no constraint with the code 'Q'"),
        "unexpected report: {rendered}"
    );
}
