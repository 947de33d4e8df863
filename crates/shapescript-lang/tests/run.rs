//! Run orchestrator tests: store updates, clearing and failure atomicity.

use pretty_assertions::assert_eq;
use shapescript_lang::{
    EngineConfig, MemoryParameterStore, MemoryShapeStore, ParameterStore, RecordShapeFactory, RunOptions,
    RunOutcome, Runner, Shape, ShapeFactory, ShapeKind, ShapeStore, Value,
};

type MemoryRunner = Runner<RecordShapeFactory, MemoryShapeStore, MemoryParameterStore>;

fn seeded() -> MemoryRunner {
    let mut shapes = MemoryShapeStore::default();
    shapes.add("old", Shape::new(ShapeKind::Rectangle, "old"));
    let mut parameters = MemoryParameterStore::default();
    parameters.add("keep", Value::Number(1.0));
    Runner::new(RecordShapeFactory, shapes, parameters)
}

#[test]
fn success_reports_counts_and_fills_stores() {
    let mut runner = MemoryRunner::default();
    let outcome = runner.run("param size 50\nshape c circle { radius: size }", RunOptions::default());
    assert_eq!(outcome, RunOutcome::Success { shapes_created: 1, parameters_created: 1 });

    assert_eq!(runner.parameters().get("size"), Some(&Value::Number(50.0)));
    let c = runner.shapes().get("c").expect("c committed");
    assert_eq!(c.kind, ShapeKind::Circle);
    assert_eq!(c.param("radius"), Some(&Value::Number(50.0)));
}

#[test]
fn failure_leaves_stores_untouched() {
    let mut runner = seeded();
    let outcome = runner.run(
        "param fresh 2\nshape ok circle { }\nshape x circle { radius: 10 / 0 }",
        RunOptions::default(),
    );

    assert_eq!(
        outcome,
        RunOutcome::Failure { error: "Division by zero".into(), line: None, column: None }
    );
    assert_eq!(runner.shapes().names(), vec!["old"]);
    assert_eq!(runner.parameters().names(), vec!["keep"]);
}

#[test]
fn syntax_failures_report_location() {
    let mut runner = seeded();
    let outcome = runner.run("param a 1\nshape circle c { radius: }", RunOptions::default());
    match outcome {
        RunOutcome::Failure { line, column, .. } => assert_eq!((line, column), (Some(2), Some(26))),
        other => panic!("expected failure, got {other:?}"),
    }
    assert_eq!(runner.shapes().names(), vec!["old"]);
}

#[test]
fn clearing_happens_before_the_run_even_if_it_fails() {
    let mut runner = seeded();
    let outcome = runner.run(
        "shape x circle { radius: missing }",
        RunOptions { clear_shapes: true, clear_parameters: false },
    );
    assert!(!outcome.is_success());
    assert!(runner.shapes().names().is_empty());
    assert_eq!(runner.parameters().names(), vec!["keep"]);
}

#[test]
fn existing_entries_are_updated_in_place() {
    let mut runner = seeded();
    let outcome = runner.run("param keep 9\nshape old circle { radius: 3 }", RunOptions::default());
    assert!(outcome.is_success());
    assert_eq!(runner.parameters().get("keep"), Some(&Value::Number(9.0)));
    assert_eq!(runner.shapes().get("old").map(|s| s.kind), Some(ShapeKind::Circle));
}

#[test]
fn consumed_operands_are_not_committed() {
    let mut runner = MemoryRunner::default();
    let outcome = runner.run(
        "shape a rectangle { width: 100 height: 60 }\nshape b circle { radius: 20 }\nunion u { add a add b }",
        RunOptions::default(),
    );
    assert_eq!(outcome, RunOutcome::Success { shapes_created: 1, parameters_created: 0 });
    assert_eq!(runner.shapes().names(), vec!["u"]);
    assert_eq!(runner.shapes().get("u").map(|s| s.kind), Some(ShapeKind::Path));
}

#[test]
fn engine_config_reaches_boolean_operations() {
    let config = EngineConfig { scale_factor: 1.0, simplify: false };
    let mut runner = MemoryRunner::default().with_config(config);
    assert_eq!(runner.config(), config);

    let outcome = runner.run(
        "shape a circle { radius: 10.5 }\nshape b circle { radius: 3 }\nunion u { add a add b }",
        RunOptions::default(),
    );
    assert!(outcome.is_success());
    let path = runner.shapes().get("u").and_then(|u| u.path.as_ref()).expect("u committed with a path");
    // a unit grid leaves only whole coordinates
    assert!(path.contours[0].iter().all(|&(x, y)| x.fract() == 0.0 && y.fract() == 0.0));
}

/// Factory that only knows circles.
struct CirclesOnly;

impl ShapeFactory for CirclesOnly {
    fn create(&self, type_name: &str) -> Option<Shape> {
        (type_name == "circle").then(|| Shape::new(ShapeKind::Circle, ""))
    }
}

#[test]
fn shapes_without_a_factory_are_skipped() {
    let mut runner = Runner::new(CirclesOnly, MemoryShapeStore::default(), MemoryParameterStore::default());
    let outcome = runner.run("shape c circle { }\nshape r rectangle { }", RunOptions::default());
    assert_eq!(outcome, RunOutcome::Success { shapes_created: 1, parameters_created: 0 });
    assert_eq!(runner.shapes().names(), vec!["c"]);
}
