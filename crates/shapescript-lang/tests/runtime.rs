//! Interpreter behavior tests.
//!
//! Tests the full stack: source → lexer → parser → interpreter.
//! Parameter and shape maps are inspected on the returned result.

use pretty_assertions::assert_eq;
use shapescript_lang::csg::contour::shoelace;
use shapescript_lang::{Error, InterpretResult, NameKind, Shape, ShapeKind, Value, interpret};

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn run(src: &str) -> InterpretResult {
    interpret(src).unwrap_or_else(|e| panic!("interpret failed: {e}"))
}

fn run_err(src: &str) -> Error {
    match interpret(src) {
        Ok(r) => panic!("expected the run to fail, got shapes {:?}", r.shapes.keys().collect::<Vec<_>>()),
        Err(e) => e,
    }
}

fn n(result: &InterpretResult, key: &str) -> f64 {
    match result.parameters.get(key) {
        Some(Value::Number(x)) => *x,
        other => panic!("expected Number for '{key}', got: {other:?}"),
    }
}

fn shape<'r>(result: &'r InterpretResult, name: &str) -> &'r Shape {
    result.shapes.get(name).unwrap_or_else(|| {
        panic!("no shape '{name}', have {:?}", result.shapes.keys().collect::<Vec<_>>())
    })
}

fn names(result: &InterpretResult) -> Vec<&str> {
    result.shapes.keys().map(String::as_str).collect()
}

// ─── End-to-end scenarios ────────────────────────────────────────────────────

#[test]
fn parameter_feeds_shape() {
    let r = run("param size 50\nshape c circle { radius: size }");
    assert_eq!(r.parameters.len(), 1);
    assert_eq!(n(&r, "size"), 50.0);
    assert_eq!(names(&r), vec!["c"]);
    let c = shape(&r, "c");
    assert_eq!(c.kind, ShapeKind::Circle);
    assert_eq!(c.param("radius"), Some(&Value::Number(50.0)));
}

#[test]
fn union_consumes_operands() {
    let r = run("
        shape a rectangle { width: 100 height: 60 }
        shape b circle { radius: 20 }
        union u { add a add b }
    ");
    assert_eq!(names(&r), vec!["u"]);
    let u = shape(&r, "u");
    assert_eq!(u.kind, ShapeKind::Path);
    assert_eq!(u.param("operands"), Some(&Value::Array(vec!["a".into(), "b".into()])));
    assert_eq!(u.param("operation"), Some(&Value::from("union")));
}

#[test]
fn difference_with_interior_cut_has_one_hole() {
    let r = run("
        shape plate rectangle { width: 200 height: 100 }
        shape hole circle { radius: 20 }
        difference d { add plate add hole }
    ");
    let d = shape(&r, "d");
    assert_eq!(d.param("hasHoles"), Some(&Value::Bool(true)));

    let path = d.path.as_ref().unwrap();
    assert!(path.has_holes);
    assert_eq!(path.contours.len(), 2);
    assert!(shoelace(&path.contours[0]) < 0.0, "outer must be counter-clockwise");
    assert!(shoelace(&path.contours[1]) > 0.0, "hole must be clockwise");
}

#[test]
fn division_by_zero_fails_the_run() {
    assert_eq!(run_err("shape x circle { radius: 10 / 0 }"), Error::division_by_zero());
}

#[test]
fn function_result_becomes_parameter() {
    let r = run("def dbl(n) { return n * 2 }\nparam p dbl(5)");
    assert_eq!(n(&r, "p"), 10.0);
    assert!(r.functions.contains_key("dbl"));
}

// ─── Naming ──────────────────────────────────────────────────────────────────

#[test]
fn loop_shapes_get_distinct_names() {
    let r = run("for i from 0 to 2 { shape s circle { radius: i } }");
    assert_eq!(names(&r), vec!["s_0", "s_1", "s_2"]);
    assert_eq!(shape(&r, "s_2").param("radius"), Some(&Value::Number(2.0)));
}

#[test]
fn nested_loops_qualify_outermost_first() {
    let r = run("for i from 0 to 1 { for j from 0 to 1 { shape c circle { } } }");
    assert_eq!(names(&r), vec!["c_0_0", "c_0_1", "c_1_0", "c_1_1"]);
}

#[test]
fn function_shapes_outlive_the_call() {
    let r = run("
        def ring(r) { shape disc circle { radius: r } return r }
        param a ring(5)
        param b ring(8)
    ");
    assert_eq!(names(&r), vec!["disc_ring_1", "disc_ring_2"]);
    assert_eq!(shape(&r, "disc_ring_2").param("radius"), Some(&Value::Number(8.0)));
}

#[test]
fn loop_references_resolve_to_the_current_iteration() {
    let r = run("
        for i from 1 to 2 {
            shape s circle { }
            transform s { position: [i * 10, 0] }
        }
    ");
    assert_eq!(shape(&r, "s_1").transform.position, (10.0, 0.0));
    assert_eq!(shape(&r, "s_2").transform.position, (20.0, 0.0));
}

#[test]
fn boolean_inside_loop() {
    let r = run("
        for i from 0 to 1 {
            shape a rectangle { width: 50 height: 50 }
            shape b circle { radius: 10 }
            difference cut { add a add b }
        }
    ");
    assert_eq!(names(&r), vec!["cut_0", "cut_1"]);
    assert_eq!(shape(&r, "cut_0").id, "a_0_D1");
    assert_eq!(shape(&r, "cut_1").id, "a_1_D2");
}

#[test]
fn runs_are_deterministic() {
    let src = "
        param w 80
        for i from 0 to 1 { shape s rectangle { width: w height: 20 + i } }
        shape c circle { radius: 5 }
        union u { add s_0 add c }
    ";
    let first = run(src);
    let second = run(src);
    assert_eq!(first.parameters, second.parameters);
    assert_eq!(first.shapes, second.shapes);
    assert_eq!(shape(&first, "u").id, "s_0_U1");
}

// ─── Scoping ─────────────────────────────────────────────────────────────────

#[test]
fn loop_bindings_stay_visible() {
    let r = run("for i from 0 to 3 { param last i }");
    assert_eq!(n(&r, "last"), 3.0);
    assert_eq!(n(&r, "i"), 3.0);
}

#[test]
fn function_locals_do_not_leak() {
    let r = run("def f(x) { param y x + 1 return y }\nparam z f(1)");
    assert_eq!(n(&r, "z"), 2.0);
    assert!(!r.parameters.contains_key("y"));
    assert!(!r.parameters.contains_key("x"));
}

#[test]
fn functions_see_their_defining_scope_not_the_caller() {
    let r = run("
        param scale 3
        def grow(v) { return v * scale }
        def outer() { param scale 100 return grow(2) }
        param result outer()
    ");
    assert_eq!(n(&r, "result"), 6.0);
}

#[test]
fn top_level_return_does_not_stop_the_script() {
    let r = run("return 1\nparam after 2");
    assert_eq!(n(&r, "after"), 2.0);
}

// ─── Control flow and expressions ────────────────────────────────────────────

#[test]
fn if_else_chains() {
    let r = run("
        param x 7
        if x > 10 { param size 3 } else if x > 5 { param size 2 } else { param size 1 }
    ");
    assert_eq!(n(&r, "size"), 2.0);
}

#[test]
fn property_references_read_shapes() {
    let r = run("
        shape box rectangle { width: 40 height: 10 position: [5, 6] }
        param w box.width * 2
        param x box.x
    ");
    assert_eq!(n(&r, "w"), 80.0);
    assert_eq!(n(&r, "x"), 5.0);
}

#[test]
fn builtins_use_degrees() {
    let r = run("param h round(sin(30) * 100)\nparam m max(2, abs(-9))");
    assert_eq!(n(&r, "h"), 50.0);
    assert_eq!(n(&r, "m"), 9.0);
}

#[test]
fn last_statement_value_is_the_result() {
    let r = run("param a 1\nparam b a + 41");
    assert_eq!(r.result, Value::Number(42.0));
}

// ─── Errors ──────────────────────────────────────────────────────────────────

#[test]
fn unknown_parameter() {
    assert_eq!(run_err("shape c circle { radius: nope }"), Error::name(NameKind::Parameter, "nope"));
}

#[test]
fn unknown_function() {
    assert_eq!(run_err("param p gear(1)"), Error::name(NameKind::Function, "gear"));
}

#[test]
fn unknown_boolean_operand() {
    assert_eq!(
        run_err("shape a circle { }\nunion u { add a add ghost }"),
        Error::name(NameKind::Shape, "ghost")
    );
}

#[test]
fn wrong_argument_count() {
    assert_eq!(
        run_err("def f(a) { return a }\nparam p f(1, 2)"),
        Error::Arity { function: "f".into(), expected: 1, found: 2 }
    );
}

#[test]
fn syntax_errors_carry_location() {
    let err = run_err("param a 1\nshape circle c { radius: }");
    assert!(matches!(err, Error::Parse(_)), "got {err:?}");
    assert_eq!(err.location(), Some((2, 26)));
}

#[test]
fn oversized_boolean_operands_are_a_geometry_error() {
    let err = run_err("
        shape a circle { radius: 1000000000000000 }
        shape b circle { radius: 10 }
        union u { add a add b }
    ");
    assert!(matches!(err, Error::Geometry(_)), "got {err:?}");
}

#[test]
fn text_cannot_be_a_boolean_operand() {
    let err = run_err("shape t text { content: \"A\" }\nshape c circle { }\nunion u { add t add c }");
    assert!(matches!(err, Error::Geometry(_)), "got {err:?}");
}

// ─── Misc statements ─────────────────────────────────────────────────────────

#[test]
fn layers_and_constraints_reach_the_result() {
    let r = run("
        shape a circle { }
        shape b rectangle { }
        layer front { add a add b position [10, 0] }
        constraints { coincident a.center b.center }
    ");
    let front = &r.layers["front"];
    assert_eq!(front.members, vec!["a", "b"]);
    assert_eq!(front.transform.position, (10.0, 0.0));
    assert_eq!(shape(&r, "a").layer.as_deref(), Some("front"));
    assert_eq!(r.constraints.len(), 1);
}

#[test]
fn drawn_squares_of_either_turn_direction_survive_a_union() {
    let r = run("
        draw d {
            forward 20 left 90 forward 20 left 90 forward 20 left 90 forward 20
            penup goto 100, 0 pendown
            forward 10 right 90 forward 10 right 90 forward 10 right 90 forward 10
        }
        shape dot circle { radius: 1 position: [-50, -50] }
        union u { add d add dot }
    ");
    let path = shape(&r, "u").path.as_ref().unwrap();
    let mut areas: Vec<f64> = path.contours.iter().map(|c| shoelace(c).abs() / 2.0).collect();
    areas.sort_by(|a, b| b.total_cmp(a));
    assert_eq!(areas.len(), 3);
    assert!((areas[0] - 400.0).abs() < 1e-3, "areas {areas:?}");
    assert!((areas[1] - 100.0).abs() < 1e-3, "areas {areas:?}");
}

#[test]
fn draw_blocks_produce_paths() {
    let r = run("draw tri { forward 30 left 120 forward 30 left 120 forward 30 }");
    let tri = shape(&r, "tri");
    assert_eq!(tri.kind, ShapeKind::Path);
    assert_eq!(tri.path.as_ref().unwrap().contours[0].len(), 4);
}
