//! Query Engine Benchmarks
//!
//! This suite measures the cost of the main library operations across
//! realistic inputs. Benchmarks are organized into the following groups:
//!
//! - **Model Parsing**: Schema documents of increasing size
//! - **Path Resolution**: Dotted paths of increasing depth
//! - **Logic Parsing**: Constraint logic expressions of increasing width
//! - **Query Construction**: Building fully-constrained queries
//! - **Serialization**: Writing and re-reading query documents
//! - **Pipeline Stages**: Schema parse vs. build vs. serialize
//!
//! ## Running Benchmarks
//!
//! ```bash
//! # Run all benchmarks
//! cargo bench
//!
//! # Run a specific group
//! cargo bench model_parsing
//! cargo bench serialization
//! ```

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use pathquery::logic::parse_logic;
use pathquery::{ConstraintArgs, Model, Query, SortDirection};

/// The shared six-class company schema.
const TESTMODEL: &str = r#"<model name="testmodel" package="org.intermine.model.testmodel">
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

/// A schema with `classes` chained classes, each holding two attributes
/// and a reference to its predecessor.
fn synthetic_schema(classes: usize) -> String {
    let mut doc = String::from(r#"<model name="bench" package="org.bench.model">"#);
    for i in 0..classes {
        doc.push_str(&format!(r#"<class name="Entry{i}">"#));
        doc.push_str(r#"<attribute name="identifier" type="java.lang.String"/>"#);
        doc.push_str(r#"<attribute name="score" type="double"/>"#);
        if i > 0 {
            doc.push_str(&format!(
                r#"<reference name="previous" referenced-type="Entry{}"/>"#,
                i - 1
            ));
        }
        doc.push_str("</class>");
    }
    doc.push_str("</model>");
    doc
}

fn build_full_query(model: &Model) -> Query<'_> {
    let mut q = Query::new(model);
    q.add_view("Employee.name Employee.age Employee.department.name")
        .unwrap();
    q.add_constraint(ConstraintArgs::new("Employee.name").with_op("IS NOT NULL"))
        .unwrap();
    q.add_constraint(ConstraintArgs::new("Employee.age").with_op(">").with_value("10"))
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
    q.add_join("Employee.department", "outer").unwrap();
    q.add_sort_order("Employee.age", SortDirection::Asc).unwrap();
    q.set_logic("(A and B) or (C and D and E)").unwrap();
    q
}

// ============================================================================
// Model Parsing
// ============================================================================

fn bench_model_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("model_parsing");

    group.throughput(Throughput::Bytes(TESTMODEL.len() as u64));
    group.bench_function("testmodel", |b| {
        b.iter(|| Model::parse(black_box(TESTMODEL)));
    });

    for classes in [10, 50, 200] {
        let doc = synthetic_schema(classes);
        group.throughput(Throughput::Bytes(doc.len() as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{classes}_classes")),
            &doc,
            |b, doc| {
                b.iter(|| Model::parse(black_box(doc)));
            },
        );
    }

    group.finish();
}

// ============================================================================
// Path Resolution
// ============================================================================

fn bench_path_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("path_resolution");
    let model = Model::parse(TESTMODEL).unwrap();

    let paths = [
        ("root_attribute", "Employee.name"),
        ("one_reference", "Employee.department.name"),
        (
            "deep_chain",
            "Employee.department.company.departments.employees.name",
        ),
        ("inherited_field", "CEO.department.company.vatNumber"),
    ];

    for (name, path) in paths {
        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::from_parameter(name), &path, |b, p| {
            b.iter(|| model.make_path(black_box(p)));
        });
    }

    group.finish();
}

// ============================================================================
// Logic Parsing
// ============================================================================

fn bench_logic_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("logic_parsing");

    for codes in [4, 16, 64] {
        let mut expression = String::new();
        for i in 0..codes {
            if i > 0 {
                expression.push_str(if i % 2 == 0 { " or " } else { " and " });
            }
            expression.push_str(&format!("C{i}"));
        }

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{codes}_codes")),
            &expression,
            |b, expr| {
                b.iter(|| parse_logic(black_box(expr), |_| true));
            },
        );
    }

    group.finish();
}

// ============================================================================
// Query Construction
// ============================================================================

fn bench_query_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_construction");
    let model = Model::parse(TESTMODEL).unwrap();

    group.bench_function("views_only", |b| {
        b.iter(|| {
            let mut q = Query::new(black_box(&model));
            q.add_view("Employee.name Employee.age Employee.department.name")
                .unwrap();
            q
        });
    });

    group.bench_function("fully_constrained", |b| {
        b.iter(|| build_full_query(black_box(&model)));
    });

    group.bench_function("deferred_validation", |b| {
        b.iter(|| {
            let mut q = Query::new(black_box(&model));
            q.set_validation(false);
            q.add_view("Employee.name Employee.age Employee.department.name")
                .unwrap();
            q.add_constraint(ConstraintArgs::new("Employee.age").with_op(">").with_value("10"))
                .unwrap();
            q.verify().unwrap();
            q
        });
    });

    group.finish();
}

// ============================================================================
// Serialization
// ============================================================================

fn bench_serialization(c: &mut Criterion) {
    let mut group = c.benchmark_group("serialization");
    let model = Model::parse(TESTMODEL).unwrap();
    let query = build_full_query(&model);
    let document = query.to_xml().unwrap();

    group.bench_function("to_xml", |b| {
        b.iter(|| black_box(&query).to_xml());
    });

    group.bench_function("to_formatted_xml", |b| {
        b.iter(|| black_box(&query).to_formatted_xml());
    });

    group.throughput(Throughput::Bytes(document.len() as u64));
    group.bench_with_input(BenchmarkId::from_parameter("from_xml"), &document, |b, doc| {
        b.iter(|| Query::from_xml(&model, black_box(doc)));
    });

    group.finish();
}

// ============================================================================
// Pipeline Stages
// ============================================================================

fn bench_pipeline_stages(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline_stages");
    let model = Model::parse(TESTMODEL).unwrap();
    let document = build_full_query(&model).to_xml().unwrap();

    group.bench_function("01_parse_model", |b| {
        b.iter(|| Model::parse(black_box(TESTMODEL)));
    });

    group.bench_function("02_build_query", |b| {
        b.iter(|| build_full_query(black_box(&model)));
    });

    group.bench_function("03_round_trip", |b| {
        b.iter(|| {
            Query::from_xml(&model, black_box(&document))
                .unwrap()
                .to_xml()
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_model_parsing,
    bench_path_resolution,
    bench_logic_parsing,
    bench_query_construction,
    bench_serialization,
    bench_pipeline_stages,
);

criterion_main!(benches);
