//! Hand-written character scanner, in the same style as `aicheye-crustty`'s own
//! `Lexer`: a `Vec<char>` cursor tracking line/column, one `next_token`
//! entry point, no external lexer-generator dependency.
//!
//! The token set is deliberately tiny: parens, bare atoms (numbers and
//! symbols are disambiguated later, by the parser), and quoted strings.
//! This mirrors `lisp_parser.py`'s single regex
//! `r"""[()]|[\w\-+/*=<>?!]+|["].*?["]|['].*?[']"""` rather than
//! `aicheye-crustty`'s much larger keyword/operator token set, since this language
//! has no keywords reserved at the lexical level.

use crate::reader::ast::SourceLocation;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    LParen(SourceLocation),
    RParen(SourceLocation),
    /// A bare, unquoted atom: `foo`, `1`, `-2.5`, `mouse-pressed?`.
    Atom(String, SourceLocation),
    /// A quoted string's contents, delimiters already stripped.
    Str(String, SourceLocation),
}

impl Token {
    pub fn location(&self) -> SourceLocation {
        match self {
            Token::LParen(loc) | Token::RParen(loc) | Token::Atom(_, loc) | Token::Str(_, loc) => *loc,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::LParen(_) => write!(f, "("),
            Token::RParen(_) => write!(f, ")"),
            Token::Atom(s, _) => write!(f, "{}", s),
            Token::Str(s, _) => write!(f, "{:?}", s),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LexError {
    pub message: String,
    pub location: SourceLocation,
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.message, self.location)
    }
}

impl std::error::Error for LexError {}

fn is_atom_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '+' | '-' | '*' | '/' | '=' | '<' | '>' | '?' | '!' | '.')
}

pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Lexer {
            input: source.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
        }
    }

    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        loop {
            self.skip_whitespace();
            if self.is_at_end() {
                break;
            }
            tokens.push(self.next_token()?);
        }
        Ok(tokens)
    }

    fn current_location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.position += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn next_token(&mut self) -> Result<Token, LexError> {
        let loc = self.current_location();
        match self.peek().unwrap() {
            '(' => {
                self.advance();
                Ok(Token::LParen(loc))
            }
            ')' => {
                self.advance();
                Ok(Token::RParen(loc))
            }
            '"' | '\'' => self.string_literal(loc),
            c if is_atom_char(c) => Ok(self.atom(loc)),
            c => Err(LexError {
                message: format!("unexpected character {:?}", c),
                location: loc,
            }),
        }
    }

    fn string_literal(&mut self, loc: SourceLocation) -> Result<Token, LexError> {
        let delim = self.advance().unwrap();
        let mut text = String::new();
        loop {
            match self.advance() {
                Some(c) if c == delim => return Ok(Token::Str(text, loc)),
                Some(c) => text.push(c),
                None => {
                    return Err(LexError {
                        message: "forgot to close something?".to_string(),
                        location: loc,
                    })
                }
            }
        }
    }

    fn atom(&mut self, loc: SourceLocation) -> Token {
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if is_atom_char(c) {
                text.push(c);
                self.advance();
            } else {
                break;
            }
        }
        Token::Atom(text, loc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn atoms(tokens: &[Token]) -> Vec<&str> {
        tokens
            .iter()
            .filter_map(|t| match t {
                Token::Atom(s, _) => Some(s.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_simple_tokens() {
        let tokens = Lexer::new("(+ 1 2)").tokenize().unwrap();
        assert!(matches!(tokens[0], Token::LParen(_)));
        assert_eq!(atoms(&tokens), vec!["+", "1", "2"]);
        assert!(matches!(tokens.last().unwrap(), Token::RParen(_)));
    }

    #[test]
    fn test_hyphenated_and_question_atoms() {
        let tokens = Lexer::new("mouse-pressed? up-key?").tokenize().unwrap();
        assert_eq!(atoms(&tokens), vec!["mouse-pressed?", "up-key?"]);
    }

    #[test]
    fn test_string_literal_both_delimiters() {
        let tokens = Lexer::new(r#""hi there" 'also me'"#).tokenize().unwrap();
        match &tokens[0] {
            Token::Str(s, _) => assert_eq!(s, "hi there"),
            other => panic!("expected Str, got {:?}", other),
        }
        match &tokens[1] {
            Token::Str(s, _) => assert_eq!(s, "also me"),
            other => panic!("expected Str, got {:?}", other),
        }
    }

    #[test]
    fn test_unterminated_string_reports_forgot_to_close() {
        let err = Lexer::new(r#"(display "oops)"#).tokenize().unwrap_err();
        assert_eq!(err.message, "forgot to close something?");
    }

    #[test]
    fn test_negative_number_atom() {
        let tokens = Lexer::new("-2.5").tokenize().unwrap();
        assert_eq!(atoms(&tokens), vec!["-2.5"]);
    }
}
