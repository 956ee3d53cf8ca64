//! Symbol canonicalization: a host that registers a built-in under its
//! canonical name must still be reachable from source using the
//! hyphenated/`?`-suffixed spelling.

use hotlisp::graphics::{GraphicsHost, HeadlessGraphics};
use hotlisp::runner::Runner;
use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

fn temp_script(contents: &str) -> std::path::PathBuf {
    let mut path = std::env::temp_dir();
    path.push(format!("hotlisp_canon_{}_{}.lisp", std::process::id(), rand::random::<u32>()));
    let mut f = std::fs::File::create(&path).unwrap();
    f.write_all(contents.as_bytes()).unwrap();
    path
}

#[test]
fn test_hyphenated_question_mark_symbol_resolves_to_canonical_builtin() {
    // `HeadlessGraphics` registers under the canonicalized name
    // `mouse_pressedq`; source spells it `mouse-pressed?`.
    let path = temp_script("(if (mouse-pressed?) 1 0)");
    let host: Rc<RefCell<dyn GraphicsHost>> = Rc::new(RefCell::new(HeadlessGraphics::default()));
    let mut runner = Runner::new(&path, host).unwrap();
    let result = runner.run_to_completion().unwrap();
    std::fs::remove_file(path).ok();
    assert_eq!(result.as_int(), Some(0));
}

#[test]
fn test_up_key_and_down_key_canonical_forms_both_resolve() {
    let path = temp_script("(+ (if (up-key?) 1 0) (if (down-key?) 1 0))");
    let mut runner = Runner::new_headless(&path).unwrap();
    let result = runner.run_to_completion().unwrap();
    std::fs::remove_file(path).ok();
    assert_eq!(result.as_int(), Some(0));
}

#[test]
fn test_plain_name_with_no_special_characters_is_unaffected() {
    let path = temp_script("(width)");
    let mut runner = Runner::new_headless(&path).unwrap();
    let result = runner.run_to_completion().unwrap();
    std::fs::remove_file(path).ok();
    assert_eq!(result.as_int(), Some(320));
}
