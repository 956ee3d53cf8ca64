//! Advances the current evaluator tree one step at a time and threads
//! `Child` replacements at the root, exactly the pseudocode in the
//! design notes:
//!
//! ```text
//! loop:
//!   r = state.step()
//!   if r == Incomplete: continue
//!   if r == Child(c):    state = c; publish state as driver_root; continue
//!   if r == Final(v):    terminate with v
//! ```
//!
//! Publishing the root after every `Child` replacement keeps the
//! function table's snapshot target current — "publishing" is a single
//! mutable reference swap, not a deep copy; snapshots deep-copy on
//! demand (`FunctionTable::snapshot`).

use crate::errors::EvalError;
use crate::eval::{Evaluator, Step};
use crate::function_table::FunctionTable;
use std::cell::RefCell;
use std::rc::Rc;

pub enum DriveResult {
    /// One step was taken; the driver has not reached a terminal value.
    Progress,
    /// The evaluator tree reached `Final`; the run is over.
    Done(crate::value::Value),
}

pub struct Driver {
    state: Rc<RefCell<Evaluator>>,
    funs: FunctionTable,
}

impl Driver {
    pub fn new(root: Evaluator, funs: FunctionTable) -> Self {
        let state = Rc::new(RefCell::new(root));
        funs.publish_root(&state);
        Driver { state, funs }
    }

    /// Replaces the driver's state wholesale — used by the reload
    /// controller for both a full reset and a snapshot restore.
    pub fn replace_state(&mut self, new_state: Evaluator) {
        self.state = Rc::new(RefCell::new(new_state));
        self.funs.publish_root(&self.state);
    }

    /// Advances by exactly one step, following `Child` chains at the
    /// root until the step itself reports `Incomplete` or `Final`.
    pub fn step(&mut self) -> Result<DriveResult, EvalError> {
        let result = self.state.borrow_mut().step()?;
        match result {
            Step::Incomplete => Ok(DriveResult::Progress),
            Step::Child(next) => {
                self.state = Rc::new(RefCell::new(next));
                self.funs.publish_root(&self.state);
                Ok(DriveResult::Progress)
            }
            Step::Final(v) => Ok(DriveResult::Done(v)),
        }
    }

    pub fn run_to_completion(&mut self) -> Result<crate::value::Value, EvalError> {
        loop {
            if let DriveResult::Done(v) = self.step()? {
                return Ok(v);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins;
    use crate::env::Env;
    use crate::reader::Parser;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Tail-recursion safety, driven through the real `Do`/`If`
    /// tail-position machinery rather than asserting on internal node
    /// counts: 10,000 iterations of a self-recursive `countto` must
    /// complete without a host stack overflow, since each tail call
    /// replaces the root rather than nesting a new frame around it.
    #[test]
    fn test_tail_recursion_reaches_ten_thousand_without_overflow() {
        let source = "(do (fun countto x y (if (< x y) (countto (+ x 1) y) x)) (countto 0 10000))";
        let mut parser = Parser::new(source).unwrap();
        let ast = parser.parse_program().unwrap().into_iter().next().unwrap();

        let funs = FunctionTable::new();
        let builtins_frame = Env::new().push_frame();
        builtins::install_core_builtins(&builtins_frame, Rc::new(RefCell::new(Vec::new())));
        let env = builtins_frame.push_frame();
        let root = Evaluator::of(ast, env, funs.clone());
        let mut driver = Driver::new(root, funs);
        let value = driver.run_to_completion().unwrap();
        assert_eq!(value.as_int(), Some(10000));
    }
}
