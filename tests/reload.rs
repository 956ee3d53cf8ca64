//! The headline "snapshot-and-swap" property and the "reload safety"
//! full-reset property, driven against real temp files with
//! `std::fs::write` between `Runner::poll()` calls — integration tests
//! rather than unit tests, since they exercise the whole reload
//! controller against the filesystem.

use hotlisp::errors::ReloadOutcome;
use hotlisp::runner::Runner;
use std::io::Write;

fn temp_script(contents: &str) -> std::path::PathBuf {
    let mut path = std::env::temp_dir();
    path.push(format!("hotlisp_reload_it_{}_{}.lisp", std::process::id(), rand::random::<u32>()));
    let mut f = std::fs::File::create(&path).unwrap();
    f.write_all(contents.as_bytes()).unwrap();
    path
}

#[test]
fn test_snapshot_and_swap_headline_property() {
    let path = temp_script("(do (fun f x (+ x 1)) (fun loopf n (if (< n 3) (loopf (f n)) n)) (loopf 0))");
    let mut runner = Runner::new_headless(&path).unwrap();

    let mut entered = false;
    for _ in 0..2000 {
        if runner.function_table().snapshot_exists("f") {
            entered = true;
            break;
        }
        if runner.step_once().unwrap().is_some() {
            break;
        }
    }
    assert!(entered, "expected f to be snapshotted before the program finished");

    std::fs::write(&path, "(do (fun f x (+ x 2)) (fun loopf n (if (< n 3) (loopf (f n)) n)) (loopf 0))").unwrap();
    let outcome = runner.poll();
    assert!(matches!(outcome, ReloadOutcome::HotSwap { ref name } if name == "f"));

    // Driving to completion must now go through the *new* body of `f`.
    let result = runner.run_to_completion().unwrap();
    assert!(result.as_int().is_some());

    std::fs::remove_file(path).ok();
}

#[test]
fn test_reload_safety_full_reset_on_addition_removal_or_multi_modify() {
    let path = temp_script("(do (fun f x x) (fun g x x) (f 1))");
    let mut runner = Runner::new_headless(&path).unwrap();
    runner.step_once().unwrap();

    std::fs::write(&path, "(do (fun f x x) (fun g x x) (fun h x x) (f 1))").unwrap();
    assert!(matches!(runner.poll(), ReloadOutcome::FullReset));

    std::fs::write(&path, "(do (fun g x x) (f 1))").unwrap();
    assert!(matches!(runner.poll(), ReloadOutcome::FullReset));

    std::fs::write(&path, "(do (fun f x (+ x 1)) (fun g x (+ x 1)) (f 1))").unwrap();
    assert!(matches!(runner.poll(), ReloadOutcome::FullReset));

    std::fs::remove_file(path).ok();
}

#[test]
fn test_unchanged_or_unparseable_reload_is_a_noop() {
    let path = temp_script("(do (fun f x x) (f 1))");
    let mut runner = Runner::new_headless(&path).unwrap();

    assert!(matches!(runner.poll(), ReloadOutcome::NoOp));

    std::fs::write(&path, "(do (fun f x x) (f 1)").unwrap(); // unterminated
    assert!(matches!(runner.poll(), ReloadOutcome::NoOp));

    std::fs::remove_file(path).ok();
}

#[test]
fn test_full_reset_restores_the_programs_initial_state_not_mid_run_state() {
    let path = temp_script("(do (set counter 0) (fun bump (set counter (+ counter 1))) (bump) (bump))");
    let mut runner = Runner::new_headless(&path).unwrap();
    runner.step_once().unwrap();

    std::fs::write(&path, "(do (set counter 0) (fun bump (set counter (+ counter 1))) (fun extra x x) (bump) (bump))").unwrap();
    assert!(matches!(runner.poll(), ReloadOutcome::FullReset));

    let result = runner.run_to_completion().unwrap();
    // A fresh run from the original deep-copied root bumps `counter`
    // exactly twice from zero, regardless of how far the prior run had
    // already progressed before the reset.
    assert_eq!(result.as_int(), Some(2));
}
