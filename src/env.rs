//! Lexical scope chain, in the same "ordered frame list" shape as the
//! `aicheye-crustty`'s `memory::stack::Stack` — frames are pushed per activation
//! and looked up right-to-left, except here a frame is a plain
//! name-to-value map rather than a C activation record with locals and
//! scope markers (this language has no block scoping below call frames).

use crate::value::Value;
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::rc::Rc;

pub type Frame = Rc<RefCell<FxHashMap<String, Value>>>;

/// An ordered list of frames: index 0 is built-ins, index 1 is the
/// top-level user frame, and one frame is pushed per function call.
///
/// Cloning an `Env` clones the `Vec` of `Rc` handles (cheap — frames are
/// shared) not their contents; `deep_copy` (used when snapshotting) is
/// the operation that actually duplicates frame contents.
#[derive(Clone)]
pub struct Env {
    frames: Vec<Frame>,
}

impl Env {
    pub fn new() -> Self {
        Env { frames: Vec::new() }
    }

    pub fn with_frames(frames: Vec<Frame>) -> Self {
        Env { frames }
    }

    pub fn push_frame(&self) -> Env {
        let mut frames = self.frames.clone();
        frames.push(Rc::new(RefCell::new(FxHashMap::default())));
        Env { frames }
    }

    /// Builds the call frame for a function activation: the *captured*
    /// environment (this function's closure, not the caller's) with one
    /// new frame binding each parameter to its argument.
    pub fn with_call_frame(&self, params: &[String], args: &[Value]) -> Env {
        let mut frames = self.frames.clone();
        let mut bindings = FxHashMap::default();
        for (param, arg) in params.iter().zip(args.iter()) {
            bindings.insert(param.clone(), arg.clone());
        }
        frames.push(Rc::new(RefCell::new(bindings)));
        Env { frames }
    }

    pub fn define(&self, name: &str, value: Value) {
        let last = self.frames.last().expect("env always has at least one frame");
        last.borrow_mut().insert(name.to_string(), value);
    }

    /// Rebinds the innermost frame that already contains `name`; if no
    /// frame has it, defines it in the last (outermost-of-activation)
    /// frame.
    pub fn assign(&self, name: &str, value: Value) {
        for frame in self.frames.iter().rev() {
            if frame.borrow().contains_key(name) {
                frame.borrow_mut().insert(name.to_string(), value);
                return;
            }
        }
        self.define(name, value);
    }

    pub fn lookup(&self, name: &str) -> Option<Value> {
        for frame in self.frames.iter().rev() {
            if let Some(v) = frame.borrow().get(name) {
                return Some(v.clone());
            }
        }
        None
    }

    /// Deep-copies every frame reachable from this environment so later
    /// mutation of the live environment can't corrupt a snapshot taken
    /// from it.
    pub fn deep_copy(&self) -> Env {
        let frames = self
            .frames
            .iter()
            .map(|f| Rc::new(RefCell::new(f.borrow().clone())))
            .collect();
        Env { frames }
    }
}

impl Default for Env {
    fn default() -> Self {
        Self::new()
    }
}

/// Tries `name` verbatim; on failure, replaces `-` with `_` and, if the
/// name ends in `?`, drops it and appends `q`.
pub fn canonicalize(name: &str) -> String {
    let mut s = name.replace('-', "_");
    if let Some(stripped) = s.strip_suffix('?') {
        s = format!("{}q", stripped);
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonicalize_hyphen_and_question_mark() {
        assert_eq!(canonicalize("mouse-pressed?"), "mouse_pressedq");
        assert_eq!(canonicalize("up-key?"), "up_keyq");
        assert_eq!(canonicalize("plain"), "plain");
    }

    #[test]
    fn test_assign_rebinds_innermost_else_defines_last() {
        let env = Env::new();
        let env = env.push_frame(); // builtins stand-in
        let env = env.push_frame(); // top-level frame
        env.define("a", Value::Int(1));
        let call_env = env.push_frame();
        call_env.assign("a", Value::Int(2));
        assert_eq!(env.lookup("a").unwrap().as_int(), Some(2));

        call_env.assign("b", Value::Int(9));
        assert!(call_env.lookup("b").is_some());
        assert!(env.lookup("b").is_none());
    }

    #[test]
    fn test_deep_copy_is_independent() {
        let env = Env::new().push_frame();
        env.define("a", Value::Int(1));
        let snap = env.deep_copy();
        env.assign("a", Value::Int(2));
        assert_eq!(env.lookup("a").unwrap().as_int(), Some(2));
        assert_eq!(snap.lookup("a").unwrap().as_int(), Some(1));
    }
}
