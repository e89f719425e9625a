//! Parser for the single-sigil surface syntax.
//!
//! ```text
//! *                  type
//! @self(x:A) B       self-dependent function type (% for an erased argument)
//! #x b               lambda
//! (f a)              application
//! !x=e; b            opaque let
//! $x=e; b            transparent def
//! {e:T}              annotation
//! 'c'  "str"  +12    literals
//! name  name^N       variable (skipping N shadowing binders) or global reference
//! ```

use crate::surface::{Decl, Program, Span};
use kernel::ast::Term;
use num_bigint::BigUint;
use std::iter::Peekable;
use std::rc::Rc;
use std::str::Chars;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unexpected eof.")]
    UnexpectedEof(Span),
    #[error("Expected \"{expected}\", found \"{found}\".")]
    Expected { expected: char, found: char, span: Span },
    #[error("Unexpected escape char: '\\{0}'.")]
    UnexpectedEscape(char, Span),
    #[error("Expected hexadecimal Unicode codepoint, found \"{0}\".")]
    InvalidCodepoint(String, Span),
    #[error("Unexpected symbol: '{0}'.")]
    UnexpectedSymbol(char, Span),
    #[error("Invalid natural literal: '+{0}'.")]
    InvalidNat(String, Span),
    #[error("Invalid binder skip count: '^{0}'.")]
    InvalidSkip(String, Span),
}

impl ParseError {
    pub fn span(&self) -> Span {
        match self {
            ParseError::UnexpectedEof(span)
            | ParseError::Expected { span, .. }
            | ParseError::UnexpectedEscape(_, span)
            | ParseError::InvalidCodepoint(_, span)
            | ParseError::UnexpectedSymbol(_, span)
            | ParseError::InvalidNat(_, span)
            | ParseError::InvalidSkip(_, span) => *span,
        }
    }
}

fn is_name(c: char) -> bool {
    matches!(c, '.' | '/' | '0'..='9' | 'A'..='Z' | '_' | 'a'..='z')
}

fn is_space(c: char) -> bool {
    matches!(c, ' ' | '\n' | '\r' | '\t' | '\x0B' | '\x0C')
}

/// Blank out lines starting with `//`, keeping byte offsets intact.
fn blank_comments(input: &str) -> String {
    input
        .split('\n')
        .map(|line| {
            if line.starts_with("//") {
                " ".repeat(line.len())
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    pos: usize,
    line: usize,
    col: usize,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Lexer {
            chars: input.chars().peekable(),
            pos: 0,
            line: 1,
            col: 0,
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn next(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.col = 0;
        } else {
            self.col += 1;
        }
        Some(c)
    }

    fn current_span(&self) -> Span {
        Span::new(self.pos, self.pos, self.line, self.col)
    }

    /// Span of the next character, for errors pointing at it.
    fn next_char_span(&mut self) -> Span {
        let mut span = self.current_span();
        span.end += self.peek().map_or(0, char::len_utf8);
        span
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(is_space) {
            self.next();
        }
    }
}

/// Binders in scope, innermost first. Each entry carries the level its
/// placeholder variable lives at.
#[derive(Clone, Copy)]
enum Names<'n> {
    Nil,
    Cons(&'n str, usize, &'n Names<'n>),
}

impl<'n> Names<'n> {
    fn depth(&self) -> usize {
        match self {
            Names::Nil => 0,
            Names::Cons(_, level, _) => level + 1,
        }
    }

    fn extend<'m>(&'m self, name: &'m str) -> Names<'m> {
        Names::Cons(name, self.depth(), self)
    }

    /// Level of the binder called `name`, skipping `skip` nearer ones.
    fn find(&self, name: &str, mut skip: usize) -> Option<usize> {
        let mut cur = self;
        while let Names::Cons(bound, level, tail) = cur {
            if *bound == name {
                if skip == 0 {
                    return Some(*level);
                }
                skip -= 1;
            }
            cur = tail;
        }
        None
    }
}

pub struct Parser<'a> {
    lexer: Lexer<'a>,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Self {
        Parser {
            lexer: Lexer::new(input),
        }
    }

    /// Parse a sequence of `name : Type = Term ;` declarations.
    pub fn parse_program(&mut self) -> Result<Program, ParseError> {
        let mut program = Program::default();
        loop {
            self.lexer.skip_whitespace();
            let start = self.lexer.current_span();
            let name = self.parse_name();
            if name.is_empty() {
                break;
            }
            self.expect(':')?;
            let ty = self.parse_term(&Names::Nil)?;
            self.expect('=')?;
            let term = self.parse_term(&Names::Nil)?;
            self.expect(';')?;
            let span = start.to(self.lexer.current_span());
            debug!(name = %name, "parsed declaration");
            program.decls.push(Decl { name, ty, term, span });
        }
        self.lexer.skip_whitespace();
        match self.lexer.peek() {
            None => Ok(program),
            Some(c) => Err(ParseError::UnexpectedSymbol(c, self.lexer.next_char_span())),
        }
    }

    /// Parse a single closed term, rejecting trailing input.
    pub fn parse_closed_term(&mut self) -> Result<Rc<Term>, ParseError> {
        let term = self.parse_term(&Names::Nil)?;
        self.lexer.skip_whitespace();
        match self.lexer.peek() {
            None => Ok(term),
            Some(c) => Err(ParseError::UnexpectedSymbol(c, self.lexer.next_char_span())),
        }
    }

    fn parse_name(&mut self) -> String {
        let mut name = String::new();
        while let Some(c) = self.lexer.peek().filter(|c| is_name(*c)) {
            name.push(c);
            self.lexer.next();
        }
        name
    }

    fn expect(&mut self, expected: char) -> Result<(), ParseError> {
        self.lexer.skip_whitespace();
        let span = self.lexer.next_char_span();
        match self.lexer.next() {
            None => Err(ParseError::UnexpectedEof(span)),
            Some(c) if c == expected => Ok(()),
            Some(found) => Err(ParseError::Expected { expected, found, span }),
        }
    }

    /// One character of a literal, resolving escapes.
    fn parse_token(&mut self) -> Result<char, ParseError> {
        let span = self.lexer.next_char_span();
        match self.lexer.next() {
            None => Err(ParseError::UnexpectedEof(span)),
            Some('\\') => {
                let span = self.lexer.next_char_span();
                match self.lexer.next() {
                    None => Err(ParseError::UnexpectedEof(span)),
                    Some('u') => self.parse_codepoint(),
                    Some(c @ ('\\' | '"' | '\'')) => Ok(c),
                    Some(c) => Err(ParseError::UnexpectedEscape(c, span)),
                }
            }
            Some(c) => Ok(c),
        }
    }

    fn parse_codepoint(&mut self) -> Result<char, ParseError> {
        self.expect('{')?;
        let start = self.lexer.current_span();
        let mut digits = String::new();
        loop {
            let span = self.lexer.next_char_span();
            match self.lexer.next() {
                None => return Err(ParseError::UnexpectedEof(span)),
                Some('}') => break,
                Some(c) if c.is_ascii_hexdigit() => digits.push(c),
                Some(c) => return Err(ParseError::InvalidCodepoint(c.to_string(), span)),
            }
        }
        let span = start.to(self.lexer.current_span());
        u32::from_str_radix(&digits, 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or(ParseError::InvalidCodepoint(digits, span))
    }

    fn parse_term(&mut self, names: &Names<'_>) -> Result<Rc<Term>, ParseError> {
        self.lexer.skip_whitespace();
        let span = self.lexer.next_char_span();
        let Some(sigil) = self.lexer.next() else {
            return Err(ParseError::UnexpectedEof(span));
        };
        match sigil {
            '*' => Ok(Term::typ()),
            '@' | '%' => {
                let self_name = self.parse_name();
                self.expect('(')?;
                let name = self.parse_name();
                self.expect(':')?;
                let bind = self.parse_term(names)?;
                self.expect(')')?;
                let at = names.depth();
                let with_self = names.extend(&self_name);
                let inner = with_self.extend(&name);
                let body = self.parse_term(&inner)?;
                Ok(Term::all(sigil == '%', self_name.as_str(), name.as_str(), bind, at, body))
            }
            '#' => {
                let name = self.parse_name();
                let at = names.depth();
                let body = self.parse_term(&names.extend(&name))?;
                Ok(Term::lam(name.as_str(), at, body))
            }
            '(' => {
                let func = self.parse_term(names)?;
                let argm = self.parse_term(names)?;
                self.expect(')')?;
                Ok(Term::app(func, argm))
            }
            '!' | '$' => {
                let name = self.parse_name();
                self.expect('=')?;
                let expr = self.parse_term(names)?;
                self.expect(';')?;
                let at = names.depth();
                let body = self.parse_term(&names.extend(&name))?;
                if sigil == '!' {
                    Ok(Term::let_in(name.as_str(), expr, at, body))
                } else {
                    Ok(Term::def_in(name.as_str(), expr, at, body))
                }
            }
            '{' => {
                let expr = self.parse_term(names)?;
                self.expect(':')?;
                let ty = self.parse_term(names)?;
                self.expect('}')?;
                Ok(Term::ann(false, expr, ty))
            }
            '\'' => {
                let c = self.parse_token()?;
                self.expect('\'')?;
                Ok(Term::chr(c))
            }
            '"' => {
                let mut text = String::new();
                while self.lexer.peek() != Some('"') {
                    text.push(self.parse_token()?);
                }
                self.expect('"')?;
                Ok(Term::str(text))
            }
            '+' => {
                let digits = self.parse_name();
                let span = span.to(self.lexer.current_span());
                if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
                    return Err(ParseError::InvalidNat(digits, span));
                }
                digits
                    .parse::<BigUint>()
                    .map(|n| Rc::new(Term::Nat(n)))
                    .map_err(|_| ParseError::InvalidNat(digits.clone(), span))
            }
            c if is_name(c) => {
                let mut name = c.to_string();
                name.push_str(&self.parse_name());
                let mut skip = 0;
                if self.lexer.peek() == Some('^') {
                    self.lexer.next();
                    let count = self.parse_name();
                    if !count.is_empty() {
                        let count_span = span.to(self.lexer.current_span());
                        skip = count
                            .parse()
                            .map_err(|_| ParseError::InvalidSkip(count.clone(), count_span))?;
                    }
                }
                Ok(match names.find(&name, skip) {
                    Some(level) => Term::var(name, level),
                    None => Term::reference(name),
                })
            }
            c => Err(ParseError::UnexpectedSymbol(c, span)),
        }
    }
}

/// Parse a whole source file. `//` comment lines are ignored.
pub fn parse_program(source: &str) -> Result<Program, ParseError> {
    let cleaned = blank_comments(source);
    Parser::new(&cleaned).parse_program()
}

/// Parse a single term.
pub fn parse_term(source: &str) -> Result<Rc<Term>, ParseError> {
    let cleaned = blank_comments(source);
    Parser::new(&cleaned).parse_closed_term()
}
