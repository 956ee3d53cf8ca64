//! The reload controller: owns the driver, periodically re-reads
//! source, diffs named functions at body granularity, and restores a
//! snapshot while swapping the changed function's body.
//!
//! Polling checks the clock after every driven step rather than on a
//! separate OS timer thread, since the whole system is single-threaded
//! cooperative.

use crate::builtins::{self, DisplayLog};
use crate::driver::{DriveResult, Driver};
use crate::env::Env;
use crate::errors::{EvalError, ReloadOutcome, RunError};
use crate::eval::Evaluator;
use crate::function_table::FunctionTable;
use crate::graphics::{GraphicsHost, HeadlessGraphics};
use crate::reader::{top_level_funs, Expr, Parser};
use crate::value::Value;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Everything needed to re-evaluate the program from scratch: the
/// parsed AST, the environment the initial evaluator was built in, and
/// the function table it shares with the driver.
pub struct Runner {
    path: std::path::PathBuf,
    ast: Vec<Expr>,
    funs: FunctionTable,
    driver: Driver,
    /// The evaluator tree exactly as constructed from the first parse,
    /// deep-copied once up front. A full reset restores *this* tree
    /// (further deep-copied, since the restore must not hand out the
    /// one and only pristine copy), matching `obj_iter.py`'s
    /// `self.orig_eval = copy.deepcopy(self.state)` / `self.reset`.
    orig_root: Evaluator,
    poll_interval: Duration,
    last_poll: Instant,
    reload_log: Vec<(Instant, ReloadOutcome)>,
    display_log: DisplayLog,
}

impl Runner {
    /// Reads and parses `path`, builds the initial environment (core
    /// builtins + graphics builtins bound to `host` + an empty
    /// top-level frame), and constructs the initial evaluator tree over
    /// the whole program wrapped in an implicit `do` — matching how the
    /// original's `Runner.__init__` evaluates the full parsed AST as one
    /// `Eval` node.
    pub fn new(path: impl Into<std::path::PathBuf>, host: Rc<RefCell<dyn GraphicsHost>>) -> Result<Self, RunError> {
        let path = path.into();
        let source = std::fs::read_to_string(&path).map_err(|e| {
            RunError::Parse(crate::reader::ParseError {
                message: format!("could not read {}: {}", path.display(), e),
                location: Default::default(),
            })
        })?;
        let ast = parse_source(&source)?;

        let display_log: DisplayLog = Rc::new(RefCell::new(Vec::new()));
        let builtins_frame = Env::new().push_frame();
        builtins::install_core_builtins(&builtins_frame, display_log.clone());
        let funs = FunctionTable::new();
        builtins::install_foreach(&builtins_frame, funs.clone());
        crate::graphics::install_graphics_builtins(&builtins_frame, host);
        let top_level_env = builtins_frame.push_frame();

        let root = build_root(&ast, top_level_env, funs.clone());
        let orig_root = root.deep_copy();
        let driver = Driver::new(root, funs.clone());

        Ok(Runner {
            path,
            ast,
            funs,
            driver,
            orig_root,
            poll_interval: Duration::from_secs(1),
            last_poll: Instant::now(),
            reload_log: Vec::new(),
            display_log,
        })
    }

    /// Builds a `Runner` with `HeadlessGraphics` as its host — the
    /// common case for running scripts and tests with no real window.
    pub fn new_headless(path: impl Into<std::path::PathBuf>) -> Result<Self, RunError> {
        let host: Rc<RefCell<dyn GraphicsHost>> = Rc::new(RefCell::new(HeadlessGraphics::default()));
        Self::new(path, host)
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn function_table(&self) -> &FunctionTable {
        &self.funs
    }

    pub fn reload_log(&self) -> &[(Instant, ReloadOutcome)] {
        &self.reload_log
    }

    /// The lines `display` has written so far, most recent last, capped
    /// at [`builtins::DisplayLog`]'s internal limit. Read by the status
    /// view's "recent output" pane.
    pub fn display_lines(&self) -> std::cell::Ref<'_, Vec<String>> {
        self.display_log.borrow()
    }

    pub fn source_path(&self) -> &std::path::Path {
        &self.path
    }

    /// Advances the driver by exactly one step, then checks the clock
    /// and polls the source file if `poll_interval` has elapsed. This
    /// is the unit `hotlisp --watch`'s status view event loop drives;
    /// `run_to_completion` below is just this in a tight loop.
    pub fn step_once(&mut self) -> Result<Option<Value>, EvalError> {
        let result = self.driver.step()?;
        if self.last_poll.elapsed() >= self.poll_interval {
            self.last_poll = Instant::now();
            self.poll();
        }
        match result {
            DriveResult::Progress => Ok(None),
            DriveResult::Done(v) => Ok(Some(v)),
        }
    }

    pub fn run_to_completion(&mut self) -> Result<Value, EvalError> {
        loop {
            if let Some(v) = self.step_once()? {
                return Ok(v);
            }
        }
    }

    /// Re-reads the source file and applies the reload policy. Never
    /// returns an error: a parse failure is logged and swallowed,
    /// matching the crate-wide rule that reload failures are policy
    /// outcomes, not propagated errors.
    pub fn poll(&mut self) -> ReloadOutcome {
        let outcome = self.poll_inner();
        self.reload_log.push((Instant::now(), outcome.clone()));
        outcome
    }

    fn poll_inner(&mut self) -> ReloadOutcome {
        let source = match std::fs::read_to_string(&self.path) {
            Ok(s) => s,
            Err(_) => return ReloadOutcome::NoOp,
        };
        let new_ast = match parse_source(&source) {
            Ok(ast) => ast,
            Err(_) => return ReloadOutcome::NoOp,
        };
        if new_ast == self.ast {
            return ReloadOutcome::NoOp;
        }

        let old_funs = top_level_funs(&self.ast);
        let new_funs = top_level_funs(&new_ast);
        let diff = diff_funs(&old_funs, &new_funs);

        let outcome = match diff {
            FunDiff::SingleModified(name) => self.hot_swap(&name, &new_funs),
            _ => {
                self.full_reset();
                ReloadOutcome::FullReset
            }
        };
        self.ast = new_ast;
        outcome
    }

    /// Replaces the named function's record with its new params/body
    /// (preserving captured env/funs) and, if a snapshot exists for it,
    /// restores the driver to that snapshot — otherwise execution
    /// continues from wherever it currently is, and the new body takes
    /// effect the next time the function is called (live-table
    /// resolution — see `DESIGN.md`).
    fn hot_swap(&mut self, name: &str, new_funs: &[(&str, &Expr)]) -> ReloadOutcome {
        let (params, body) = match function_shape(new_funs, name) {
            Some(shape) => shape,
            None => return ReloadOutcome::BadReload {
                reason: format!("modified function {} vanished from its own diff", name),
            },
        };
        self.funs.replace_body(name, params, body);

        if let Some(snapshot) = self.funs.take_snapshot(name) {
            self.driver.replace_state(snapshot.tree);
        }
        ReloadOutcome::HotSwap { name: name.to_string() }
    }

    /// Restores `state` to a fresh deep copy of the program's original
    /// evaluator tree and wipes every snapshot — the snapshots refer to
    /// evaluator subtrees that may reference a function record the
    /// reset just discarded. Also wipes the function table's records:
    /// `orig_root` shares this run's `FunctionTable` (pointer-identity,
    /// never deep-copied), so re-driving it re-evaluates every `(fun
    /// ...)` form in the program from scratch, and those would collide
    /// with the previous run's still-registered names otherwise.
    fn full_reset(&mut self) {
        self.funs.clear_records();
        self.funs.clear_snapshots();
        self.driver.replace_state(self.orig_root.deep_copy());
    }
}

fn parse_source(source: &str) -> Result<Vec<Expr>, crate::reader::ParseError> {
    let mut parser = Parser::new(source)?;
    parser.parse_program()
}

/// Wraps the whole program in an implicit `(do ...)` so the driver has
/// a single root evaluator; the `do`-form dispatch handles multi-form
/// programs the same way whether the list came from a literal
/// `(do ...)` or the top-level form sequence.
fn build_root(ast: &[Expr], env: Env, funs: FunctionTable) -> Evaluator {
    let loc = ast.first().map(Expr::location).unwrap_or_default();
    let mut wrapped = vec![Expr::Sym("do".to_string(), loc)];
    wrapped.extend(ast.iter().cloned());
    Evaluator::of(Expr::List(wrapped, loc), env, funs)
}

enum FunDiff {
    /// Exactly one function's body changed and nothing was added or
    /// removed — the only shape that supports an incremental hot swap.
    SingleModified(String),
    /// Anything else: additions, removals, or two-or-more modified
    /// bodies in one reload — any of these forces a full reset.
    Other,
}

fn diff_funs(old: &[(&str, &Expr)], new: &[(&str, &Expr)]) -> FunDiff {
    let old_names: std::collections::HashSet<&str> = old.iter().map(|(n, _)| *n).collect();
    let new_names: std::collections::HashSet<&str> = new.iter().map(|(n, _)| *n).collect();
    let added = new_names.difference(&old_names).count();
    let removed = old_names.difference(&new_names).count();
    if added > 0 || removed > 0 {
        return FunDiff::Other;
    }
    let modified: Vec<&str> = new
        .iter()
        .filter_map(|(name, new_ast)| {
            let old_ast = old.iter().find(|(n, _)| n == name).map(|(_, a)| *a)?;
            if old_ast != *new_ast {
                Some(*name)
            } else {
                None
            }
        })
        .collect();
    match modified.as_slice() {
        [single] => FunDiff::SingleModified(single.to_string()),
        _ => FunDiff::Other,
    }
}

/// Extracts `(params, body)` for `name` from a `top_level_funs` list —
/// `fun` shape is `(fun name p1 .. pk body)`.
fn function_shape(funs: &[(&str, &Expr)], name: &str) -> Option<(Vec<String>, Expr)> {
    let (_, ast) = funs.iter().find(|(n, _)| *n == name)?;
    let items = ast.as_list()?;
    let params: Vec<String> = items[2..items.len() - 1]
        .iter()
        .filter_map(Expr::as_sym)
        .map(String::from)
        .collect();
    let body = items.last()?.clone();
    Some((params, body))
}
