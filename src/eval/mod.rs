//! The reified evaluator: one node type per AST form, each a resumable
//! state machine exposing a single `step` operation. This is the module
//! the rest of the runtime is built around — see `DESIGN.md` for why a
//! tree of owned state machines replaces host call-stack recursion here
//! (snapshot addressability).
//!
//! Every node holds exactly what it needs to resume and is
//! deep-copyable (`Evaluator::deep_copy`); `FunctionTable::snapshot`
//! calls that on the current driver root to capture a private copy at a
//! named function's entry point.

use crate::env::{canonicalize, Env};
use crate::errors::EvalError;
use crate::function_table::FunctionTable;
use crate::reader::{Expr, SourceLocation};
use crate::value::{FunctionRecord, LambdaRecord, Value};
use std::rc::Rc;

/// What a single `step` accomplished.
pub enum Step {
    /// Internal progress was made (e.g. a delegate was swapped in);
    /// call `step` again later.
    Incomplete,
    /// The driver must descend: this node is finished and `e` replaces
    /// it going forward. Returned only from a node's own *tail*
    /// position, which is what makes tail calls safe — the evaluator
    /// tree doesn't grow across a `Do`'s last form, an `If`'s taken
    /// branch, or a function call's body entry.
    Child(Evaluator),
    /// This node is done; its parent (or the driver, at the root)
    /// receives `v`.
    Final(Value),
}

pub enum Evaluator {
    /// Dispatcher: holds unexpanded AST plus the environment it should
    /// be evaluated in. Always resolves to `Child` on its first and
    /// only step, except `lambda`, which has no sub-steps and is
    /// `Final` immediately.
    Eval { ast: Expr, env: Env, funs: FunctionTable },
    Literal { value: Value },
    Lookup { symbol: String, env: Env, funs: FunctionTable, loc: SourceLocation },
    FunDef {
        name: String,
        params: Vec<String>,
        body: Expr,
        env: Env,
        funs: FunctionTable,
        loc: SourceLocation,
    },
    Set {
        symbol: String,
        delegate: Option<Box<Evaluator>>,
        value_ast: Expr,
        env: Env,
        funs: FunctionTable,
    },
    Do {
        remaining: Vec<Expr>,
        last: Expr,
        delegate: Option<Box<Evaluator>>,
        env: Env,
        funs: FunctionTable,
    },
    If {
        cond_ast: Expr,
        then_ast: Expr,
        else_ast: Option<Expr>,
        delegate: Option<Box<Evaluator>>,
        env: Env,
        funs: FunctionTable,
    },
    Invocation {
        /// `asts[0]` is the callee expression, `asts[1..]` the argument
        /// expressions, in source order.
        asts: Vec<Expr>,
        values: Vec<Value>,
        delegate: Option<Box<Evaluator>>,
        env: Env,
        funs: FunctionTable,
        loc: SourceLocation,
    },
}

impl Evaluator {
    pub fn of(ast: Expr, env: Env, funs: FunctionTable) -> Evaluator {
        Evaluator::Eval { ast, env, funs }
    }

    pub fn step(&mut self) -> Result<Step, EvalError> {
        match self {
            Evaluator::Eval { ast, env, funs } => step_eval(ast, env, funs),
            Evaluator::Literal { value } => Ok(Step::Final(value.clone())),
            Evaluator::Lookup { symbol, env, funs, loc } => step_lookup(symbol, env, funs, *loc),
            Evaluator::FunDef {
                name,
                params,
                body,
                env,
                funs,
                loc,
            } => step_fun_def(name, params, body, env, funs, *loc),
            Evaluator::Set {
                symbol,
                delegate,
                value_ast,
                env,
                funs,
            } => step_set(symbol, delegate, value_ast, env, funs),
            Evaluator::Do {
                remaining,
                last,
                delegate,
                env,
                funs,
            } => step_do(remaining, last, delegate, env, funs),
            Evaluator::If {
                cond_ast,
                then_ast,
                else_ast,
                delegate,
                env,
                funs,
            } => step_if(cond_ast, then_ast, else_ast, delegate, env, funs),
            Evaluator::Invocation {
                asts,
                values,
                delegate,
                env,
                funs,
                loc,
            } => step_invocation(asts, values, delegate, env, funs, *loc),
        }
    }

    /// Produces an independent copy of this subtree: every environment
    /// frame reachable from it is duplicated, so later mutation of the
    /// live tree cannot corrupt the copy. AST nodes are immutable and
    /// cheaply cloned; the function table is *not* deep-copied (cloning
    /// it yields a handle to the same shared table, by design).
    pub fn deep_copy(&self) -> Evaluator {
        match self {
            Evaluator::Eval { ast, env, funs } => Evaluator::Eval {
                ast: ast.clone(),
                env: env.deep_copy(),
                funs: funs.clone(),
            },
            Evaluator::Literal { value } => Evaluator::Literal { value: value.clone() },
            Evaluator::Lookup { symbol, env, funs, loc } => Evaluator::Lookup {
                symbol: symbol.clone(),
                env: env.deep_copy(),
                funs: funs.clone(),
                loc: *loc,
            },
            Evaluator::FunDef {
                name,
                params,
                body,
                env,
                funs,
                loc,
            } => Evaluator::FunDef {
                name: name.clone(),
                params: params.clone(),
                body: body.clone(),
                env: env.deep_copy(),
                funs: funs.clone(),
                loc: *loc,
            },
            Evaluator::Set {
                symbol,
                delegate,
                value_ast,
                env,
                funs,
            } => Evaluator::Set {
                symbol: symbol.clone(),
                delegate: delegate.as_ref().map(|d| Box::new(d.deep_copy())),
                value_ast: value_ast.clone(),
                env: env.deep_copy(),
                funs: funs.clone(),
            },
            Evaluator::Do {
                remaining,
                last,
                delegate,
                env,
                funs,
            } => Evaluator::Do {
                remaining: remaining.clone(),
                last: last.clone(),
                delegate: delegate.as_ref().map(|d| Box::new(d.deep_copy())),
                env: env.deep_copy(),
                funs: funs.clone(),
            },
            Evaluator::If {
                cond_ast,
                then_ast,
                else_ast,
                delegate,
                env,
                funs,
            } => Evaluator::If {
                cond_ast: cond_ast.clone(),
                then_ast: then_ast.clone(),
                else_ast: else_ast.clone(),
                delegate: delegate.as_ref().map(|d| Box::new(d.deep_copy())),
                env: env.deep_copy(),
                funs: funs.clone(),
            },
            Evaluator::Invocation {
                asts,
                values,
                delegate,
                env,
                funs,
                loc,
            } => Evaluator::Invocation {
                asts: asts.clone(),
                values: values.clone(),
                delegate: delegate.as_ref().map(|d| Box::new(d.deep_copy())),
                env: env.deep_copy(),
                funs: funs.clone(),
                loc: *loc,
            },
        }
    }
}

fn literal_value(ast: &Expr) -> Value {
    match ast {
        Expr::Int(i, _) => Value::Int(*i),
        Expr::Float(f, _) => Value::Float(*f),
        Expr::Str(s, _) => Value::str(s.as_str()),
        _ => unreachable!("literal_value called on a non-literal Expr"),
    }
}

fn step_eval(ast: &Expr, env: &Env, funs: &FunctionTable) -> Result<Step, EvalError> {
    match ast {
        Expr::Int(..) | Expr::Float(..) | Expr::Str(..) => Ok(Step::Child(Evaluator::Literal {
            value: literal_value(ast),
        })),
        Expr::Sym(name, loc) => Ok(Step::Child(Evaluator::Lookup {
            symbol: name.clone(),
            env: env.clone(),
            funs: funs.clone(),
            loc: *loc,
        })),
        Expr::List(items, loc) => dispatch_list(items, *loc, env, funs),
    }
}

fn dispatch_list(items: &[Expr], loc: SourceLocation, env: &Env, funs: &FunctionTable) -> Result<Step, EvalError> {
    if items.is_empty() {
        return Err(EvalError::TypeError {
            message: "empty list is not callable".to_string(),
            location: loc,
        });
    }
    if let Some(head) = items[0].as_sym() {
        match head {
            "do" => {
                let forms = &items[1..];
                if forms.is_empty() {
                    return Err(EvalError::TypeError {
                        message: "empty do is not valid".to_string(),
                        location: loc,
                    });
                }
                let last = forms[forms.len() - 1].clone();
                let remaining = forms[..forms.len() - 1].to_vec();
                return Ok(Step::Child(Evaluator::Do {
                    remaining,
                    last,
                    delegate: None,
                    env: env.clone(),
                    funs: funs.clone(),
                }));
            }
            "fun" => {
                let name = items
                    .get(1)
                    .and_then(Expr::as_sym)
                    .ok_or_else(|| type_error("fun requires a name", loc))?
                    .to_string();
                let params = parse_params(&items[2..items.len() - 1], loc)?;
                let body = items
                    .last()
                    .ok_or_else(|| type_error("fun requires a body", loc))?
                    .clone();
                return Ok(Step::Child(Evaluator::FunDef {
                    name,
                    params,
                    body,
                    env: env.clone(),
                    funs: funs.clone(),
                    loc,
                }));
            }
            "lambda" => {
                let params = parse_params(&items[1..items.len() - 1], loc)?;
                let body = items
                    .last()
                    .ok_or_else(|| type_error("lambda requires a body", loc))?
                    .clone();
                let record = LambdaRecord {
                    params,
                    body,
                    captured_env: env.clone(),
                    captured_funs: funs.clone(),
                };
                return Ok(Step::Final(Value::Lambda(Rc::new(record))));
            }
            "set" => {
                let symbol = items
                    .get(1)
                    .and_then(Expr::as_sym)
                    .ok_or_else(|| type_error("set requires a symbol", loc))?
                    .to_string();
                let value_ast = items
                    .get(2)
                    .ok_or_else(|| type_error("set requires a value expression", loc))?
                    .clone();
                return Ok(Step::Child(Evaluator::Set {
                    symbol,
                    delegate: None,
                    value_ast,
                    env: env.clone(),
                    funs: funs.clone(),
                }));
            }
            "if" => {
                let cond_ast = items
                    .get(1)
                    .ok_or_else(|| type_error("if requires a condition", loc))?
                    .clone();
                let then_ast = items
                    .get(2)
                    .ok_or_else(|| type_error("if requires a then-branch", loc))?
                    .clone();
                let else_ast = items.get(3).cloned();
                return Ok(Step::Child(Evaluator::If {
                    cond_ast,
                    then_ast,
                    else_ast,
                    delegate: None,
                    env: env.clone(),
                    funs: funs.clone(),
                }));
            }
            _ => {}
        }
    }
    Ok(Step::Child(Evaluator::Invocation {
        asts: items.to_vec(),
        values: Vec::new(),
        delegate: None,
        env: env.clone(),
        funs: funs.clone(),
        loc,
    }))
}

fn parse_params(items: &[Expr], loc: SourceLocation) -> Result<Vec<String>, EvalError> {
    items
        .iter()
        .map(|e| {
            e.as_sym()
                .map(|s| s.to_string())
                .ok_or_else(|| type_error("parameter names must be symbols", loc))
        })
        .collect()
}

fn type_error(message: &str, loc: SourceLocation) -> EvalError {
    EvalError::TypeError {
        message: message.to_string(),
        location: loc,
    }
}

fn step_lookup(symbol: &str, env: &Env, funs: &FunctionTable, loc: SourceLocation) -> Result<Step, EvalError> {
    if let Some(v) = resolve(symbol, env, funs) {
        return Ok(Step::Final(v));
    }
    let canon = canonicalize(symbol);
    if canon != symbol {
        if let Some(v) = resolve(&canon, env, funs) {
            return Ok(Step::Final(v));
        }
    }
    Err(EvalError::NameError {
        symbol: symbol.to_string(),
        location: loc,
    })
}

fn resolve(symbol: &str, env: &Env, funs: &FunctionTable) -> Option<Value> {
    env.lookup(symbol).or_else(|| funs.lookup(symbol).map(Value::Function))
}

fn step_fun_def(
    name: &str,
    params: &[String],
    body: &Expr,
    env: &Env,
    funs: &FunctionTable,
    loc: SourceLocation,
) -> Result<Step, EvalError> {
    let record = FunctionRecord {
        name: name.to_string(),
        params: params.to_vec(),
        body: body.clone(),
        captured_env: env.clone(),
        captured_funs: funs.clone(),
    };
    funs.define(record, loc)?;
    let record = funs.lookup(name).expect("just defined");
    Ok(Step::Final(Value::Function(record)))
}

fn step_set(
    symbol: &str,
    delegate: &mut Option<Box<Evaluator>>,
    value_ast: &Expr,
    env: &Env,
    funs: &FunctionTable,
) -> Result<Step, EvalError> {
    if delegate.is_none() {
        *delegate = Some(Box::new(Evaluator::of(value_ast.clone(), env.clone(), funs.clone())));
    }
    match delegate.as_mut().unwrap().step()? {
        Step::Incomplete => Ok(Step::Incomplete),
        Step::Child(c) => {
            *delegate = Some(Box::new(c));
            Ok(Step::Incomplete)
        }
        Step::Final(v) => {
            env.assign(symbol, v.clone());
            Ok(Step::Final(v))
        }
    }
}

fn step_do(
    remaining: &mut Vec<Expr>,
    last: &Expr,
    delegate: &mut Option<Box<Evaluator>>,
    env: &Env,
    funs: &FunctionTable,
) -> Result<Step, EvalError> {
    if let Some(d) = delegate.as_mut() {
        match d.step()? {
            Step::Incomplete => return Ok(Step::Incomplete),
            Step::Child(c) => {
                *delegate = Some(Box::new(c));
                return Ok(Step::Incomplete);
            }
            Step::Final(_) => {
                *delegate = None;
            }
        }
    }
    if remaining.is_empty() {
        // Tail position: replace this `Do` node itself with the last
        // form's evaluator rather than waiting on it, so a chain of
        // tail calls through `do` never grows the evaluator tree.
        Ok(Step::Child(Evaluator::of(last.clone(), env.clone(), funs.clone())))
    } else {
        let next = remaining.remove(0);
        *delegate = Some(Box::new(Evaluator::of(next, env.clone(), funs.clone())));
        Ok(Step::Incomplete)
    }
}

fn step_if(
    cond_ast: &Expr,
    then_ast: &Expr,
    else_ast: &Option<Expr>,
    delegate: &mut Option<Box<Evaluator>>,
    env: &Env,
    funs: &FunctionTable,
) -> Result<Step, EvalError> {
    if delegate.is_none() {
        *delegate = Some(Box::new(Evaluator::of(cond_ast.clone(), env.clone(), funs.clone())));
    }
    match delegate.as_mut().unwrap().step()? {
        Step::Incomplete => Ok(Step::Incomplete),
        Step::Child(c) => {
            *delegate = Some(Box::new(c));
            Ok(Step::Incomplete)
        }
        Step::Final(cond_value) => {
            if cond_value.is_truthy() {
                Ok(Step::Child(Evaluator::of(then_ast.clone(), env.clone(), funs.clone())))
            } else if let Some(else_branch) = else_ast {
                Ok(Step::Child(Evaluator::of(else_branch.clone(), env.clone(), funs.clone())))
            } else {
                Ok(Step::Final(Value::Nil))
            }
        }
    }
}

fn step_invocation(
    asts: &[Expr],
    values: &mut Vec<Value>,
    delegate: &mut Option<Box<Evaluator>>,
    env: &Env,
    funs: &FunctionTable,
    loc: SourceLocation,
) -> Result<Step, EvalError> {
    if let Some(d) = delegate.as_mut() {
        match d.step()? {
            Step::Incomplete => return Ok(Step::Incomplete),
            Step::Child(c) => {
                *delegate = Some(Box::new(c));
                return Ok(Step::Incomplete);
            }
            Step::Final(v) => {
                values.push(v);
                *delegate = None;
            }
        }
    }
    if values.len() < asts.len() {
        let next = asts[values.len()].clone();
        *delegate = Some(Box::new(Evaluator::of(next, env.clone(), funs.clone())));
        return Ok(Step::Incomplete);
    }
    perform_call(values, funs, loc)
}

fn perform_call(values: &[Value], funs: &FunctionTable, loc: SourceLocation) -> Result<Step, EvalError> {
    let callee = &values[0];
    let args = &values[1..];
    match callee {
        Value::Host(f) => f(args)
            .map(Step::Final)
            .map_err(|message| EvalError::RuntimeError { message, location: loc }),
        Value::Function(record) => {
            if record.params.len() != args.len() {
                return Err(EvalError::ArityError {
                    callee: record.name.clone(),
                    expected: record.params.len(),
                    given: args.len(),
                    location: loc,
                });
            }
            // Snapshot *before* entering the body: this is the moment a
            // later hot reload can rewind back to.
            funs.snapshot(&record.name);
            let new_env = record.captured_env.with_call_frame(&record.params, args);
            // Fetch the body through the live table, not the closed-over
            // record, so a swapped body takes effect on this very call.
            let live = funs.lookup(&record.name).unwrap_or_else(|| record.clone());
            Ok(Step::Child(Evaluator::of(live.body.clone(), new_env, funs.clone())))
        }
        Value::Lambda(record) => {
            if record.params.len() != args.len() {
                return Err(EvalError::ArityError {
                    callee: "<lambda>".to_string(),
                    expected: record.params.len(),
                    given: args.len(),
                    location: loc,
                });
            }
            let new_env = record.captured_env.with_call_frame(&record.params, args);
            Ok(Step::Child(Evaluator::of(record.body.clone(), new_env, record.captured_funs.clone())))
        }
        other => Err(EvalError::TypeError {
            message: format!("{} is not callable", other.display_form()),
            location: loc,
        }),
    }
}

/// Calls an already-evaluated callee value outside the main evaluator
/// tree, driving a user function's body to completion synchronously.
///
/// Used by built-ins like `foreach` that need to apply a
/// `Function`/`Lambda` value per element of a sequence. Calls made this
/// way are *not* individually snapshotted — hot-reload granularity
/// applies only to calls made through ordinary `Invocation` nodes in
/// the main evaluator tree (see `DESIGN.md`).
pub fn call_value(callee: &Value, args: &[Value], funs: &FunctionTable, loc: SourceLocation) -> Result<Value, EvalError> {
    match callee {
        Value::Host(f) => f(args).map_err(|message| EvalError::RuntimeError { message, location: loc }),
        Value::Function(record) => {
            if record.params.len() != args.len() {
                return Err(EvalError::ArityError {
                    callee: record.name.clone(),
                    expected: record.params.len(),
                    given: args.len(),
                    location: loc,
                });
            }
            let live = funs.lookup(&record.name).unwrap_or_else(|| record.clone());
            let new_env = record.captured_env.with_call_frame(&record.params, args);
            drive_to_completion(Evaluator::of(live.body.clone(), new_env, funs.clone()))
        }
        Value::Lambda(record) => {
            if record.params.len() != args.len() {
                return Err(EvalError::ArityError {
                    callee: "<lambda>".to_string(),
                    expected: record.params.len(),
                    given: args.len(),
                    location: loc,
                });
            }
            let new_env = record.captured_env.with_call_frame(&record.params, args);
            drive_to_completion(Evaluator::of(record.body.clone(), new_env, record.captured_funs.clone()))
        }
        other => Err(EvalError::TypeError {
            message: format!("{} is not callable", other.display_form()),
            location: loc,
        }),
    }
}

fn drive_to_completion(mut state: Evaluator) -> Result<Value, EvalError> {
    loop {
        match state.step()? {
            Step::Incomplete => continue,
            Step::Child(c) => state = c,
            Step::Final(v) => return Ok(v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::Parser;

    fn parse_one(src: &str) -> Expr {
        Parser::new(src).unwrap().parse_program().unwrap().into_iter().next().unwrap()
    }

    fn base_env() -> Env {
        Env::new().push_frame().push_frame()
    }

    fn run(src: &str) -> Result<Value, EvalError> {
        let funs = FunctionTable::new();
        drive_to_completion(Evaluator::of(parse_one(src), base_env(), funs))
    }

    #[test]
    fn test_eval_dispatches_literals_to_child() {
        let ast = parse_one("42");
        let mut ev = Evaluator::of(ast, base_env(), FunctionTable::new());
        match ev.step().unwrap() {
            Step::Child(Evaluator::Literal { value: Value::Int(42) }) => {}
            _ => panic!("expected Child(Literal(42))"),
        }
    }

    #[test]
    fn test_lookup_unbound_symbol_is_name_error() {
        let err = run("undefined-thing").unwrap_err();
        assert!(matches!(err, EvalError::NameError { .. }));
    }

    #[test]
    fn test_fun_def_then_invocation_resolves_through_table() {
        assert_eq!(run("(do (fun id x x) (id 9))").unwrap().as_int(), Some(9));
    }

    #[test]
    fn test_set_rebinds_outer_frame() {
        let result = run("(do (fun f x (do (set x (+ x 1)) x)) (f 5))").unwrap();
        assert_eq!(result.as_int(), Some(6));
    }

    #[test]
    fn test_do_is_tail_position_for_its_last_form() {
        // If `do`'s last form were awaited rather than replacing the
        // node, this would still produce 3 — the test documents intent,
        // not tail-call depth (see `driver`'s own depth test for that).
        assert_eq!(run("(do 1 2 3)").unwrap().as_int(), Some(3));
    }

    #[test]
    fn test_if_truthy_and_falsy_branches() {
        assert_eq!(run("(if 1 10 20)").unwrap().as_int(), Some(10));
        assert_eq!(run("(if 0 10 20)").unwrap().as_int(), Some(20));
        assert_eq!(run("(if 0 10)").unwrap().as_int(), None); // Nil
    }

    #[test]
    fn test_invocation_arity_mismatch_is_arity_error() {
        let err = run("(do (fun f x y (+ x y)) (f 1))").unwrap_err();
        assert!(matches!(err, EvalError::ArityError { .. }));
    }

    #[test]
    fn test_calling_a_non_callable_is_type_error() {
        let err = run("(5 1 2)").unwrap_err();
        assert!(matches!(err, EvalError::TypeError { .. }));
    }

    #[test]
    fn test_lambda_value_is_callable_and_closes_over_env() {
        let result = run("(do (set make-adder (lambda n (lambda x (+ x n)))) (do (set add5 (make-adder 5)) (add5 10)))");
        assert_eq!(result.unwrap().as_int(), Some(15));
    }

    #[test]
    fn test_duplicate_fun_definition_is_rejected() {
        let err = run("(do (fun f x x) (fun f x x))").unwrap_err();
        assert!(matches!(err, EvalError::DuplicateDefinition { .. }));
    }

    #[test]
    fn test_deep_copy_of_do_node_is_independent_of_delegate_mutation() {
        let funs = FunctionTable::new();
        let ast = parse_one("(do (set a 1) a)");
        let mut ev = Evaluator::of(ast, base_env(), funs);
        // Drive one step so a `Do` delegate gets populated, then copy and
        // diverge: mutating the original must not affect the copy.
        let step = ev.step().unwrap();
        let mut live = match step {
            Step::Child(e) => e,
            _ => panic!("expected a Child(Do) node"),
        };
        live.step().unwrap();
        let frozen = live.deep_copy();
        live.step().unwrap();
        // Both can still be stepped to completion without panicking —
        // the frozen copy owns its own delegate/env, not a shared one.
        let _ = drive_to_completion(frozen);
    }
}
