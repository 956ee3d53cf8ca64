//! The tree produced by the reader.
//!
//! An [`Expr`] is deliberately small: this language has no declarations,
//! types, or operators distinct from ordinary calls. Every form beyond a
//! literal or a bare symbol is a [`Expr::List`], and the evaluator decides
//! at dispatch time whether the head names a special form or a callee.

use std::fmt;

/// A position in the source text, 1-indexed like `aicheye-crustty`'s own
/// `SourceLocation`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        SourceLocation { line, column }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A parsed S-expression, tagged with the location of its opening token.
///
/// `PartialEq` is structural (location is ignored) so the reload
/// controller can compare two parses of the same function body and tell
/// whether the text actually changed.
#[derive(Debug, Clone)]
#[allow(clippy::derive_partial_eq_without_eq)]
pub enum Expr {
    Int(i64, SourceLocation),
    Float(f64, SourceLocation),
    /// A quoted string literal, delimiter characters already stripped.
    Str(String, SourceLocation),
    Sym(String, SourceLocation),
    List(Vec<Expr>, SourceLocation),
}

impl Expr {
    pub fn location(&self) -> SourceLocation {
        match self {
            Expr::Int(_, loc)
            | Expr::Float(_, loc)
            | Expr::Str(_, loc)
            | Expr::Sym(_, loc)
            | Expr::List(_, loc) => *loc,
        }
    }

    pub fn as_sym(&self) -> Option<&str> {
        match self {
            Expr::Sym(s, _) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Expr]> {
        match self {
            Expr::List(items, _) => Some(items.as_slice()),
            _ => None,
        }
    }

    /// True when this list's head symbol is `name` (used to recognize
    /// `fun`, `do`, `if`, `set`, `lambda` forms).
    pub fn is_form(&self, name: &str) -> bool {
        matches!(self.as_list().and_then(|items| items.first()).and_then(Expr::as_sym), Some(s) if s == name)
    }
}

impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Expr::Int(a, _), Expr::Int(b, _)) => a == b,
            (Expr::Float(a, _), Expr::Float(b, _)) => a == b,
            (Expr::Str(a, _), Expr::Str(b, _)) => a == b,
            (Expr::Sym(a, _), Expr::Sym(b, _)) => a == b,
            (Expr::List(a, _), Expr::List(b, _)) => a == b,
            _ => false,
        }
    }
}

/// Extracts the top-level `fun` definitions from a parsed program, keyed
/// by function name, preserving source order.
///
/// A whole program is conventionally one `(do ...)` wrapping every
/// top-level form (as `runner::build_root` constructs, and as
/// `DEMO_SOURCE` and every reload test is actually written) — `fun`
/// forms live one level inside that wrapper, not as direct top-level
/// forms themselves. So this walks through any top-level `do`'s
/// immediate children (recursively, in case of nested wrapping) rather
/// than only inspecting `program`'s own elements directly.
///
/// Used by the reload controller to diff two parses of the same file
/// (see `runner::diff_funs`). There is no equivalent helper in the
/// original Python sources to port from; this is a direct reading of
/// "walk, collect first-level `fun` forms" from the design notes.
pub fn top_level_funs(program: &[Expr]) -> Vec<(&str, &Expr)> {
    let mut out = Vec::new();
    collect_top_level_funs(program, &mut out);
    out
}

fn collect_top_level_funs<'a>(forms: &'a [Expr], out: &mut Vec<(&'a str, &'a Expr)>) {
    for expr in forms {
        let Some(items) = expr.as_list() else { continue };
        if expr.is_form("fun") {
            if let Some(name) = items.get(1).and_then(Expr::as_sym) {
                out.push((name, expr));
            }
        } else if expr.is_form("do") {
            collect_top_level_funs(&items[1..], out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::Parser;

    fn parse(src: &str) -> Vec<Expr> {
        Parser::new(src).unwrap().parse_program().unwrap()
    }

    #[test]
    fn test_finds_funs_nested_inside_a_wrapping_do() {
        let program = parse("(do (fun f x x) (fun g y y) (g 1))");
        let names: Vec<&str> = top_level_funs(&program).iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec!["f", "g"]);
    }

    #[test]
    fn test_finds_bare_top_level_funs_with_no_wrapping_do() {
        let program = parse("(fun f x x) (f 1)");
        let names: Vec<&str> = top_level_funs(&program).iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec!["f"]);
    }
}
