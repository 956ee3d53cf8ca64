//! Recursive-descent parser over the token stream, in `aicheye-crustty`'s
//! `Parser { tokens, position }` shape. Atoms are tried as an integer,
//! then a float, and fall back to a bare symbol.

use crate::reader::ast::{Expr, SourceLocation};
use crate::reader::lexer::{LexError, Lexer, Token};
use std::fmt;

#[derive(Debug, Clone)]
pub struct ParseError {
    pub message: String,
    pub location: SourceLocation,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.message, self.location)
    }
}

impl std::error::Error for ParseError {}

impl From<LexError> for ParseError {
    fn from(e: LexError) -> Self {
        ParseError {
            message: e.message,
            location: e.location,
        }
    }
}

pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
}

impl Parser {
    pub fn new(source: &str) -> Result<Self, ParseError> {
        let tokens = Lexer::new(source).tokenize()?;
        Ok(Parser { tokens, position: 0 })
    }

    /// Parses every top-level form in the source, in order.
    pub fn parse_program(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut forms = Vec::new();
        while self.peek().is_some() {
            forms.push(self.parse_expr()?);
        }
        Ok(forms)
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn advance(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.position).cloned();
        if tok.is_some() {
            self.position += 1;
        }
        tok
    }

    fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        match self.advance() {
            Some(Token::LParen(loc)) => self.parse_list(loc),
            Some(Token::RParen(loc)) => Err(ParseError {
                message: "unexpected ')'".to_string(),
                location: loc,
            }),
            Some(Token::Str(text, loc)) => Ok(Expr::Str(text, loc)),
            Some(Token::Atom(text, loc)) => Ok(parse_atom(&text, loc)),
            None => Err(ParseError {
                message: "unexpected end of input".to_string(),
                location: SourceLocation::default(),
            }),
        }
    }

    fn parse_list(&mut self, open_loc: SourceLocation) -> Result<Expr, ParseError> {
        let mut items = Vec::new();
        loop {
            match self.peek() {
                Some(Token::RParen(_)) => {
                    self.advance();
                    return Ok(Expr::List(items, open_loc));
                }
                Some(_) => items.push(self.parse_expr()?),
                None => {
                    return Err(ParseError {
                        message: "forgot to close something?".to_string(),
                        location: open_loc,
                    })
                }
            }
        }
    }
}

fn parse_atom(text: &str, loc: SourceLocation) -> Expr {
    if let Ok(i) = text.parse::<i64>() {
        return Expr::Int(i, loc);
    }
    if let Ok(f) = text.parse::<f64>() {
        return Expr::Float(f, loc);
    }
    Expr::Sym(text.to_string(), loc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_simple_call() {
        let mut parser = Parser::new("(+ 1 2)").unwrap();
        let program = parser.parse_program().unwrap();
        assert_eq!(program.len(), 1);
        match &program[0] {
            Expr::List(items, _) => {
                assert_eq!(items[0], Expr::Sym("+".into(), SourceLocation::default()));
                assert_eq!(items[1], Expr::Int(1, SourceLocation::default()));
                assert_eq!(items[2], Expr::Int(2, SourceLocation::default()));
            }
            other => panic!("expected list, got {:?}", other),
        }
    }

    #[test]
    fn test_nested_lists() {
        let mut parser = Parser::new("(do (set x 1) (if x 2 3))").unwrap();
        let program = parser.parse_program().unwrap();
        assert_eq!(program.len(), 1);
        assert!(program[0].is_form("do"));
    }

    #[test]
    fn test_float_and_negative_numbers() {
        let mut parser = Parser::new("(-1 2.5 -3.5)").unwrap();
        let program = parser.parse_program().unwrap();
        match &program[0] {
            Expr::List(items, _) => {
                assert_eq!(items[0], Expr::Int(-1, SourceLocation::default()));
                assert_eq!(items[1], Expr::Float(2.5, SourceLocation::default()));
                assert_eq!(items[2], Expr::Float(-3.5, SourceLocation::default()));
            }
            other => panic!("expected list, got {:?}", other),
        }
    }

    #[test]
    fn test_unterminated_list_error_message() {
        let mut parser = Parser::new("(+ 1 2").unwrap();
        let err = parser.parse_program().unwrap_err();
        assert_eq!(err.message, "forgot to close something?");
    }

    #[test]
    fn test_quoted_string_literal() {
        let mut parser = Parser::new(r#"(display "hello")"#).unwrap();
        let program = parser.parse_program().unwrap();
        match &program[0] {
            Expr::List(items, _) => {
                assert_eq!(items[1], Expr::Str("hello".into(), SourceLocation::default()));
            }
            other => panic!("expected list, got {:?}", other),
        }
    }
}
