//! `hotlisp`: a live-programming runtime for a small Lisp-flavored
//! scripting language whose source file drives an interactive
//! graphical loop, built around step-granular, snapshot-resumable
//! evaluation so a named function's body can be hot-swapped mid-run
//! without restarting the program.
//!
//! Module layout follows `aicheye-crustty`'s split of
//! reader/model/engine/errors/ui into separate top-level modules, one
//! concern per file:
//!
//! - [`reader`] — tokenizer + recursive-descent parser
//! - [`env`] — lexical scope chain
//! - [`value`] — runtime values and function/lambda records
//! - [`function_table`] — the global function registry + per-name
//!   snapshots
//! - [`eval`] — the reified evaluator tree, one node per AST form
//! - [`driver`] — advances the evaluator tree one step at a time
//! - [`runner`] — the reload controller
//! - [`builtins`] — arithmetic/comparison/sequence host-callables
//! - [`graphics`] — the `GraphicsHost` trait boundary + a headless stub
//! - [`demo`] — the built-in demo program run with no script argument
//! - [`errors`] — error taxonomy
//! - [`ui`] — optional `ratatui` status view over a running `Runner`

pub mod builtins;
pub mod demo;
pub mod driver;
pub mod env;
pub mod errors;
pub mod eval;
pub mod function_table;
pub mod graphics;
pub mod reader;
pub mod runner;
pub mod ui;
pub mod value;
