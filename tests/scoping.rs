//! Scoping and mutation — `set`'s "innermost frame that already holds
//! the name, else define at the top" rule, exercised both at the top
//! level and across a call boundary.

use hotlisp::runner::Runner;
use std::io::Write;

fn temp_script(contents: &str) -> std::path::PathBuf {
    let mut path = std::env::temp_dir();
    path.push(format!("hotlisp_scope_{}_{}.lisp", std::process::id(), rand::random::<u32>()));
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
fn test_repeated_set_accumulates_at_top_level() {
    assert_eq!(run("(do (set a 1) (set a (+ a 2)) a)").as_int(), Some(3));
}

#[test]
fn test_set_inside_a_call_finds_an_existing_outer_binding_and_mutates_it() {
    // `f`'s call frame is empty, so `set x` walks outward and finds
    // `x` already bound at the top level — the innermost *existing*
    // frame wins, so this mutates the caller's binding rather than
    // shadowing it with a fresh local.
    let source = "(do (set x 100) (fun f (set x 1)) (do (f) x))";
    assert_eq!(run(source).as_int(), Some(1));
}

#[test]
fn test_set_on_a_genuinely_new_name_inside_a_call_stays_local() {
    // `local` has never existed anywhere, so `set` defines it in the
    // call frame (the fallback half of the rule); that frame is
    // dropped when the call returns, so the name never escapes to the
    // caller — referencing it afterward is a `NameError`.
    let path = temp_script("(do (fun f (set local 1)) (f) local)");
    let mut runner = Runner::new_headless(&path).unwrap();
    let err = runner.run_to_completion().unwrap_err();
    std::fs::remove_file(path).ok();
    assert!(matches!(err, hotlisp::errors::EvalError::NameError { .. }));
}

#[test]
fn test_set_on_a_parameter_rebinds_the_call_frame_not_the_caller() {
    let source = "(do (fun bump n (do (set n (+ n 1)) n)) (bump 41))";
    assert_eq!(run(source).as_int(), Some(42));
}
