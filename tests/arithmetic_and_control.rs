//! Arithmetic, control flow, and truthiness properties, driven end to
//! end through `Runner::run_to_completion` — whole programs rather than
//! poking individual evaluator nodes.

use hotlisp::runner::Runner;
use std::io::Write;

fn temp_script(contents: &str) -> std::path::PathBuf {
    let mut path = std::env::temp_dir();
    path.push(format!("hotlisp_it_{}_{}.lisp", std::process::id(), rand::random::<u32>()));
    let mut f = std::fs::File::create(&path).unwrap();
    f.write_all(contents.as_bytes()).unwrap();
    path
}

fn run(source: &str) -> hotlisp::value::Value {
    let path = temp_script(source);
    let mut runner = Runner::new_headless(&path).unwrap();
    let result = runner.run_to_completion().unwrap();
    std::fs::remove_file(path).ok();
    result
}

#[test]
fn test_addition() {
    assert_eq!(run("(+ 1 1)").as_int(), Some(2));
}

#[test]
fn test_unary_and_variadic_subtraction() {
    assert_eq!(run("(- 5)").as_int(), Some(-5));
    assert_eq!(run("(- 10 3 2)").as_int(), Some(5));
}

#[test]
fn test_if_truthy_falsy_and_missing_else() {
    assert_eq!(run("(if 1 2 3)").as_int(), Some(2));
    assert_eq!(run("(if 0 2 3)").as_int(), Some(3));
    assert!(matches!(run("(if 0 2)"), hotlisp::value::Value::Nil));
}

#[test]
fn test_lambda_call() {
    assert_eq!(run("((lambda x y (+ 1 y)) 2 3)").as_int(), Some(4));
}

#[test]
fn test_tail_recursion_to_two_thousand() {
    let source = "((fun countto x y (if (< x y) (countto (+ x 1) y) x)) 1 2000)";
    assert_eq!(run(source).as_int(), Some(2000));
}

#[test]
fn test_truthiness_empty_string_zero_int_zero_float_empty_list() {
    assert_eq!(run(r#"(if "" 1 2)"#).as_int(), Some(2));
    assert_eq!(run("(if 0 1 2)").as_int(), Some(2));
    assert_eq!(run("(if 0.0 1 2)").as_int(), Some(2));
    assert_eq!(run("(if (list) 1 2)").as_int(), Some(2));
}

#[test]
fn test_concrete_scenario_two_fun_and_call() {
    assert_eq!(run("(do (fun inc x (+ x 1)) (inc 41))").as_int(), Some(42));
}

#[test]
fn test_concrete_scenario_if_false_with_no_else_is_nil() {
    assert!(matches!(run("(if (< 3 2) 1)"), hotlisp::value::Value::Nil));
}
