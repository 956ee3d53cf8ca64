//! Error types, in the same shape as `aicheye-crustty`'s `interpreter::errors`:
//! one enum per error family, each variant carrying the
//! [`SourceLocation`] it happened at where one is known, a `location()`
//! accessor, and hand-written `Display`/`Error` impls (no `thiserror` —
//! `aicheye-crustty` doesn't reach for it either).

use crate::reader::SourceLocation;
use std::fmt;

pub use crate::reader::parser::ParseError;

/// Errors raised while stepping the evaluator tree.
#[derive(Debug, Clone)]
pub enum EvalError {
    /// A symbol had no binding in any environment frame, host table, or
    /// function table.
    NameError { symbol: String, location: SourceLocation },
    /// A function or lambda was called with the wrong number of arguments.
    ArityError {
        callee: String,
        expected: usize,
        given: usize,
        location: SourceLocation,
    },
    /// A value was used in a position that required a different shape
    /// (e.g. calling something that isn't callable, or a non-numeric
    /// argument to an arithmetic built-in).
    TypeError { message: String, location: SourceLocation },
    /// Two `fun` definitions claimed the same name.
    DuplicateDefinition { name: String, location: SourceLocation },
    /// A built-in raised its own error (out of range, bad input, etc).
    RuntimeError { message: String, location: SourceLocation },
}

impl EvalError {
    pub fn location(&self) -> SourceLocation {
        match self {
            EvalError::NameError { location, .. }
            | EvalError::ArityError { location, .. }
            | EvalError::TypeError { location, .. }
            | EvalError::DuplicateDefinition { location, .. }
            | EvalError::RuntimeError { location, .. } => *location,
        }
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalError::NameError { symbol, location } => {
                write!(f, "name error: {:?} is not bound ({})", symbol, location)
            }
            EvalError::ArityError {
                callee,
                expected,
                given,
                location,
            } => write!(
                f,
                "arity error: {} takes {} args, {} given ({})",
                callee, expected, given, location
            ),
            EvalError::TypeError { message, location } => {
                write!(f, "type error: {} ({})", message, location)
            }
            EvalError::DuplicateDefinition { name, location } => write!(
                f,
                "two definitions for function {} ({})",
                name, location
            ),
            EvalError::RuntimeError { message, location } => {
                write!(f, "runtime error: {} ({})", message, location)
            }
        }
    }
}

impl std::error::Error for EvalError {}

/// Why a reload attempt didn't apply a hot swap. Not an error in the
/// `Result`-propagating sense — a `BadReload` is logged and the runner
/// keeps going with a full reset (see `runner::Runner::poll`).
#[derive(Debug, Clone)]
pub enum ReloadOutcome {
    /// The file was unchanged or failed to parse; nothing happened.
    NoOp,
    /// Exactly one named function's body changed; its record (and
    /// snapshot, if any) was swapped in.
    HotSwap { name: String },
    /// More than one function changed shape, or one was added/removed;
    /// execution state was reset to the program's initial evaluator.
    FullReset,
    /// Reserved for future reload shapes this runtime can't yet cope
    /// with incrementally; currently unreachable since every non-trivial
    /// diff resolves to `FullReset` per policy, kept so `BadReload` has
    /// somewhere to live matching the error taxonomy.
    BadReload { reason: String },
}

/// A fatal outcome for a whole run: either the source failed to parse,
/// or evaluation raised an `EvalError`.
#[derive(Debug, Clone)]
pub enum RunError {
    Parse(ParseError),
    Eval(EvalError),
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunError::Parse(e) => write!(f, "parse error: {}", e),
            RunError::Eval(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for RunError {}

impl From<ParseError> for RunError {
    fn from(e: ParseError) -> Self {
        RunError::Parse(e)
    }
}

impl From<EvalError> for RunError {
    fn from(e: EvalError) -> Self {
        RunError::Eval(e)
    }
}
