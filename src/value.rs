//! Runtime values, in the same "tagged enum plus ergonomic accessors"
//! shape as `aicheye-crustty`'s `memory::value::Value` — except the payload
//! set here is the Lisp one (numbers, text, callables, sequences)
//! rather than C's (pointers, structs, arrays).

use crate::env::Env;
use crate::function_table::FunctionTable;
use crate::reader::Expr;
use std::fmt;
use std::rc::Rc;

/// A host-supplied primitive: takes already-evaluated arguments, returns
/// a value or an error message. Boxed behind `Rc` so `Value::clone()`
/// stays cheap — host callables are shared, never duplicated.
pub type HostFn = Rc<dyn Fn(&[Value]) -> Result<Value, String>>;

/// A named function record: `{ name, params, body, captured_env,
/// captured_funs }`. Immutable once built — reload replaces the
/// function table's *entry*, it never mutates a record in place.
#[derive(Clone)]
pub struct FunctionRecord {
    pub name: String,
    pub params: Vec<String>,
    pub body: Expr,
    pub captured_env: Env,
    pub captured_funs: FunctionTable,
}

impl fmt::Debug for FunctionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionRecord")
            .field("name", &self.name)
            .field("params", &self.params)
            .finish()
    }
}

/// An anonymous function record: same as `FunctionRecord` minus `name`.
/// Lambdas are never registered in the function table and never
/// participate in snapshot/restore (see `DESIGN.md`).
#[derive(Clone)]
pub struct LambdaRecord {
    pub params: Vec<String>,
    pub body: Expr,
    pub captured_env: Env,
    pub captured_funs: FunctionTable,
}

impl fmt::Debug for LambdaRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LambdaRecord").field("params", &self.params).finish()
    }
}

#[derive(Clone)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(Rc<str>),
    Function(Rc<FunctionRecord>),
    Lambda(Rc<LambdaRecord>),
    Host(HostFn),
    /// The `list` built-in's ordered sequence value.
    Seq(Rc<Vec<Value>>),
    Nil,
}

impl Value {
    pub fn str(s: impl Into<Rc<str>>) -> Value {
        Value::Str(s.into())
    }

    /// Truthiness per the surface language: `0`, `0.0`, `""`, an empty
    /// sequence, and `Nil` are false; everything else (including
    /// functions) is true.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Int(0) => false,
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::Seq(items) => !items.is_empty(),
            Value::Nil => false,
            _ => true,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Printable form used by `display`: matches the original's
    /// comma-joined, quote-free rendering.
    pub fn display_form(&self) -> String {
        match self {
            Value::Int(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Str(s) => s.to_string(),
            Value::Function(r) => format!("<function {}>", r.name),
            Value::Lambda(_) => "<lambda>".to_string(),
            Value::Host(_) => "<builtin>".to_string(),
            Value::Seq(items) => {
                let parts: Vec<String> = items.iter().map(Value::display_form).collect();
                format!("({})", parts.join(" "))
            }
            Value::Nil => "nil".to_string(),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_form())
    }
}
