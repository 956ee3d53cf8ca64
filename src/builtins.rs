//! Host-callable built-ins: arithmetic, comparison, display, and
//! sequence operations. `+`/`-`/`*`/`/`, `display`, and `coinflip` wrap
//! the obvious Rust operations; `=`/`<`/`>`, `list`, and `len` round out
//! comparisons and sequence handling that arithmetic alone doesn't cover
//! (graphics built-ins like `width`/`mouse-pressed?` live separately in
//! [`crate::graphics`]).
//!
//! Each built-in is installed as a [`Value::Host`] closure into an
//! [`Env`]'s frame 0, the frame built-ins always occupy. None of these
//! take an evaluator or environment — they operate only on
//! already-evaluated argument values, per the host-callable contract.

use crate::env::Env;
use crate::eval;
use crate::function_table::FunctionTable;
use crate::reader::SourceLocation;
use crate::value::Value;
use std::cell::RefCell;
use std::rc::Rc;

/// The lines `display` has written so far, shared between the built-in
/// and whoever wants to observe them (the status view's "last N lines
/// of display output" pane). `display` still writes to stdout too
/// — this is purely an additional tap, not a redirect, so headless
/// non-interactive runs keep their console chatter.
pub type DisplayLog = Rc<RefCell<Vec<String>>>;

/// Installs every arithmetic, comparison, and sequence built-in into
/// `env`'s current (innermost) frame, plus `display` wired to `log`.
/// Callers build the builtins frame first, then push the top-level
/// user frame on top — see `Runner::new`.
pub fn install_core_builtins(env: &Env, log: DisplayLog) {
    env.define("+", host(builtin_add));
    env.define("-", host(builtin_sub));
    env.define("*", host(builtin_mul));
    env.define("/", host(builtin_div));
    env.define("=", host(builtin_eq));
    env.define("<", host(builtin_lt));
    env.define(">", host(builtin_gt));
    env.define("display", make_display(log));
    env.define("list", host(builtin_list));
    env.define("len", host(builtin_len));
    env.define("coinflip", host(builtin_coinflip));
}

/// Installs `foreach`, which (unlike every other built-in here) needs
/// the function table: applying a user `Function`/`Lambda` per element
/// requires driving the reified evaluator, not just calling a Rust
/// closure. See `DESIGN.md` for why this drives through
/// `eval::call_value` rather than becoming a dedicated evaluator-node
/// variant — see `DESIGN.md` for why `foreach` drives through a plain
/// call rather than becoming a dedicated evaluator-node variant.
pub fn install_foreach(env: &Env, funs: FunctionTable) {
    let callable = move |args: &[Value]| -> Result<Value, String> {
        if args.len() != 2 {
            return Err(format!("foreach takes 2 args, {} given", args.len()));
        }
        let items = match &args[1] {
            Value::Seq(items) => items.clone(),
            other => return Err(format!("foreach expects a sequence, got {}", other.display_form())),
        };
        let mut last = Value::Nil;
        for item in items.iter() {
            last = eval::call_value(&args[0], std::slice::from_ref(item), &funs, SourceLocation::default())
                .map_err(|e| e.to_string())?;
        }
        Ok(last)
    };
    env.define("foreach", Value::Host(Rc::new(callable)));
}

fn host(f: fn(&[Value]) -> Result<Value, String>) -> Value {
    Value::Host(Rc::new(f))
}

fn as_number(v: &Value) -> Result<f64, String> {
    match v {
        Value::Int(i) => Ok(*i as f64),
        Value::Float(f) => Ok(*f),
        other => Err(format!("expected a number, got {}", other.display_form())),
    }
}

/// Numeric results stay `Int` when every argument was an `Int` and the
/// computed value happens to be integral; otherwise they widen to
/// `Float`. This matches the Python source, where `+`/`-`/`*` on ints
/// stay ints (Python has no separate float/int arithmetic split) and
/// `/` always produces a float-looking division.
fn numeric_result(value: f64, all_ints: bool) -> Value {
    if all_ints && value.fract() == 0.0 && value.is_finite() {
        Value::Int(value as i64)
    } else {
        Value::Float(value)
    }
}

fn all_ints(args: &[Value]) -> bool {
    args.iter().all(|v| matches!(v, Value::Int(_)))
}

/// `(+ a b c ...)` — variadic sum. `(+)` sums to `0`.
fn builtin_add(args: &[Value]) -> Result<Value, String> {
    let mut total = 0.0;
    for a in args {
        total += as_number(a)?;
    }
    Ok(numeric_result(total, all_ints(args)))
}

/// `(- x)` negates from zero; `(- a b c ...)` left-folds subtraction.
/// Matches `lisp.py`'s `reduce(operator.sub, args, 0) if len==1 else
/// reduce(operator.sub, args)`.
fn builtin_sub(args: &[Value]) -> Result<Value, String> {
    if args.is_empty() {
        return Err("- requires at least one argument".to_string());
    }
    let nums: Vec<f64> = args.iter().map(as_number).collect::<Result<_, _>>()?;
    let result = if nums.len() == 1 {
        -nums[0]
    } else {
        nums[1..].iter().fold(nums[0], |acc, n| acc - n)
    };
    Ok(numeric_result(result, all_ints(args)))
}

/// `(* a b c ...)` — variadic product. `(*)` is `1`.
fn builtin_mul(args: &[Value]) -> Result<Value, String> {
    let mut total = 1.0;
    for a in args {
        total *= as_number(a)?;
    }
    Ok(numeric_result(total, all_ints(args)))
}

/// `(/ x y)` — binary division only, matching `lisp.py`'s `lambda x,
/// y: x / y`.
fn builtin_div(args: &[Value]) -> Result<Value, String> {
    if args.len() != 2 {
        return Err(format!("/ takes 2 args, {} given", args.len()));
    }
    let x = as_number(&args[0])?;
    let y = as_number(&args[1])?;
    if y == 0.0 {
        return Err("division by zero".to_string());
    }
    Ok(numeric_result(x / y, all_ints(args) && (x / y).fract() == 0.0))
}

/// `(= a b c ...)` — variadic, true iff every argument compares equal
/// to its neighbor. Numbers compare by value; strings by content.
fn builtin_eq(args: &[Value]) -> Result<Value, String> {
    if args.len() < 2 {
        return Ok(int_bool(true));
    }
    for window in args.windows(2) {
        if !values_equal(&window[0], &window[1])? {
            return Ok(int_bool(false));
        }
    }
    Ok(int_bool(true))
}

fn values_equal(a: &Value, b: &Value) -> Result<bool, String> {
    match (a, b) {
        (Value::Str(x), Value::Str(y)) => Ok(x == y),
        _ => Ok(as_number(a)? == as_number(b)?),
    }
}

/// `(< a b)` — total-order comparison on numbers.
fn builtin_lt(args: &[Value]) -> Result<Value, String> {
    binary_cmp(args, "<", |a, b| a < b)
}

/// `(> a b)` — total-order comparison on numbers.
fn builtin_gt(args: &[Value]) -> Result<Value, String> {
    binary_cmp(args, ">", |a, b| a > b)
}

fn binary_cmp(args: &[Value], name: &str, cmp: fn(f64, f64) -> bool) -> Result<Value, String> {
    if args.len() != 2 {
        return Err(format!("{} takes 2 args, {} given", name, args.len()));
    }
    let a = as_number(&args[0])?;
    let b = as_number(&args[1])?;
    Ok(int_bool(cmp(a, b)))
}

/// The language has no dedicated boolean type: truthiness is
/// `Value`-based, so comparisons return `1`/`0` the way
/// how this language's `if` treats any nonzero, non-empty value as true.
fn int_bool(b: bool) -> Value {
    Value::Int(if b { 1 } else { 0 })
}

/// Caps how many lines [`DisplayLog`] keeps, so a long-running watched
/// program's status view doesn't grow an unbounded history.
const DISPLAY_LOG_CAPACITY: usize = 200;

/// Builds the `display` built-in closure over a particular [`DisplayLog`].
/// `display` still writes to stdout (so `hotlisp script.lisp` without
/// `--watch` behaves exactly as before); the log is read by the status
/// view, not a replacement for it.
fn make_display(log: DisplayLog) -> Value {
    let callable = move |args: &[Value]| -> Result<Value, String> {
        let line = args.iter().map(Value::display_form).collect::<Vec<_>>().join(", ");
        println!("{}", line);
        let mut lines = log.borrow_mut();
        lines.push(line);
        let overflow = lines.len().saturating_sub(DISPLAY_LOG_CAPACITY);
        if overflow > 0 {
            lines.drain(0..overflow);
        }
        Ok(Value::Nil)
    };
    Value::Host(Rc::new(callable))
}

/// `(list a b c)` — constructs an ordered sequence value.
fn builtin_list(args: &[Value]) -> Result<Value, String> {
    Ok(Value::Seq(Rc::new(args.to_vec())))
}

/// `(len seq)` — length of a sequence (or a string's character count).
fn builtin_len(args: &[Value]) -> Result<Value, String> {
    if args.len() != 1 {
        return Err(format!("len takes 1 arg, {} given", args.len()));
    }
    match &args[0] {
        Value::Seq(items) => Ok(Value::Int(items.len() as i64)),
        Value::Str(s) => Ok(Value::Int(s.chars().count() as i64)),
        other => Err(format!("len expects a sequence, got {}", other.display_form())),
    }
}

/// `(coinflip)` — a random bool, surfaced as `1`/`0` per [`int_bool`].
/// Grounded in `lisp.py`'s `random.choice([True, False])`.
fn builtin_coinflip(args: &[Value]) -> Result<Value, String> {
    if !args.is_empty() {
        return Err(format!("coinflip takes 0 args, {} given", args.len()));
    }
    Ok(int_bool(rand::random::<bool>()))
}
