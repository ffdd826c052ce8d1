//! Lexical scanner for a single physical line.
//!
//! The scanner walks the line character by character, tracking the byte
//! offset and one-based column of every character. It does not decide which
//! kind of line it is looking at; the [`grammar`](crate::grammar) drives it,
//! asking for the next token it expects (an identifier inside a section
//! header, a quoted subsection, a value, a comment). Each scan method either
//! returns a [`Token`] or a [`ParseError`] anchored at the exact character
//! where the rule failed.

use thiserror::Error;

use crate::types::{Position, TextSpan};

/// A grammar failure inside one line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ParseError {
    pub message: String,
    pub position: Position,
}

impl ParseError {
    pub fn new(message: impl Into<String>, position: Position) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    OpenBracket,
    CloseBracket,
    Equals,
    Identifier,
    DottedIdentifier,
    Quoted,
    Value,
    Comment,
}

/// A scanned token: its kind, where it starts, its raw length in bytes and
/// its decoded text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: TextSpan,
}

impl Token {
    fn new(kind: TokenKind, start: Position, len: usize, value: impl Into<String>) -> Self {
        Self {
            kind,
            span: TextSpan::new(start, len, value),
        }
    }

    pub fn value(&self) -> &str {
        self.span.value()
    }
}

/// Which grammar rule an identifier belongs to; only changes error wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierKind {
    Section,
    Variable,
}

impl IdentifierKind {
    fn noun(self) -> &'static str {
        match self {
            IdentifierKind::Section => "Section",
            IdentifierKind::Variable => "Variable",
        }
    }

    fn terminates(self, c: Option<char>) -> bool {
        match (self, c) {
            (_, None) => true,
            (_, Some(' ' | '\t')) => true,
            (IdentifierKind::Section, Some(']')) => true,
            (IdentifierKind::Variable, Some('=' | '#' | ';')) => true,
            _ => false,
        }
    }
}

pub fn is_whitespace(c: char) -> bool {
    c == ' ' || c == '\t'
}

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-'
}

#[derive(Debug, Clone)]
pub struct Scanner<'a> {
    text: &'a str,
    line: usize,
    offset: usize,
    column: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(text: &'a str, line: usize) -> Self {
        Self {
            text,
            line,
            offset: 0,
            column: 1,
        }
    }

    pub fn position(&self) -> Position {
        Position::new(self.line, self.offset, self.column)
    }

    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    pub fn rest(&self) -> &'a str {
        &self.text[self.offset..]
    }

    pub fn is_eof(&self) -> bool {
        self.offset >= self.text.len()
    }

    pub fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.offset += c.len_utf8();
        self.column += 1;
        Some(c)
    }

    /// Consume `expected` if it is the next character.
    pub fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.bump();
            true
        } else {
            false
        }
    }

    pub fn skip_whitespace(&mut self) -> usize {
        let mut skipped = 0;
        while self.peek().is_some_and(is_whitespace) {
            self.bump();
            skipped += 1;
        }
        skipped
    }

    /// Scan a single punctuation token.
    pub fn scan_punct(&mut self, kind: TokenKind) -> Option<Token> {
        let expected = match kind {
            TokenKind::OpenBracket => '[',
            TokenKind::CloseBracket => ']',
            TokenKind::Equals => '=',
            _ => return None,
        };
        let start = self.position();
        self.eat(expected)
            .then(|| Token::new(kind, start, 1, expected.to_string()))
    }

    /// Scan `[A-Za-z][A-Za-z0-9-]*`, optionally allowing further dot-separated
    /// segments of the same shape.
    ///
    /// The identifier must be followed by a character that legitimately ends
    /// it for `kind`; anything else is reported at that character.
    pub fn scan_identifier(
        &mut self,
        kind: IdentifierKind,
        dotted: bool,
    ) -> Result<Token, ParseError> {
        let start = self.position();
        let mut segments = 0;

        loop {
            match self.peek() {
                Some(c) if c.is_ascii_alphabetic() => {
                    self.bump();
                }
                _ => {
                    return Err(ParseError::new(
                        format!("{} name must start with a letter.", kind.noun()),
                        self.position(),
                    ));
                }
            }
            while self.peek().is_some_and(is_identifier_char) {
                self.bump();
            }
            segments += 1;

            if dotted && self.peek() == Some('.') {
                self.bump();
                continue;
            }
            break;
        }

        if !kind.terminates(self.peek()) {
            return Err(ParseError::new(
                format!(
                    "{} name can only contain letters, digits or '-'.",
                    kind.noun()
                ),
                self.position(),
            ));
        }

        let raw = &self.text[start.offset..self.offset];
        let token_kind = if segments > 1 {
            TokenKind::DottedIdentifier
        } else {
            TokenKind::Identifier
        };
        Ok(Token::new(token_kind, start, raw.len(), raw))
    }

    /// Scan a double-quoted subsection name. Only `\"` and `\\` are valid
    /// escapes. The span covers the text between the quotes.
    pub fn scan_quoted(&mut self) -> Result<Token, ParseError> {
        if !self.eat('"') {
            return Err(ParseError::new("Expected opening quote.", self.position()));
        }
        let start = self.position();
        let mut decoded = String::new();

        loop {
            let here = self.position();
            match self.bump() {
                None => {
                    return Err(ParseError::new("Expected closing quote.", self.position()));
                }
                Some('"') => {
                    let len = here.offset - start.offset;
                    return Ok(Token::new(TokenKind::Quoted, start, len, decoded));
                }
                Some('\\') => match self.bump() {
                    Some(c @ ('"' | '\\')) => decoded.push(c),
                    Some(c) => {
                        return Err(ParseError::new(
                            format!("Invalid escape sequence '\\{c}'."),
                            here,
                        ));
                    }
                    None => {
                        return Err(ParseError::new("Expected closing quote.", self.position()));
                    }
                },
                Some(c) => decoded.push(c),
            }
        }
    }

    /// Scan a variable value up to an unquoted comment marker or end of line.
    ///
    /// Leading whitespace must already be skipped. Outside quotes, runs of
    /// whitespace collapse to one space and trailing whitespace is dropped;
    /// inside quotes everything is kept. `\"`, `\\`, `\n` and `\t` decode
    /// anywhere in the value. The span ends at the last significant
    /// character, so it excludes whitespace before a trailing comment.
    pub fn scan_value(&mut self) -> Result<Token, ParseError> {
        let start = self.position();
        let mut decoded = String::new();
        let mut end = start.offset;
        let mut pending_space = false;
        let mut open_quote: Option<Position> = None;

        loop {
            let here = self.position();
            let Some(c) = self.peek() else {
                break;
            };

            if open_quote.is_none() {
                if is_whitespace(c) {
                    self.bump();
                    pending_space = true;
                    continue;
                }
                if c == '#' || c == ';' {
                    break;
                }
                if pending_space {
                    decoded.push(' ');
                    pending_space = false;
                }
            }

            self.bump();
            match c {
                '"' => {
                    open_quote = match open_quote {
                        Some(_) => None,
                        None => Some(here),
                    };
                }
                '\\' => match self.bump() {
                    Some('"') => decoded.push('"'),
                    Some('\\') => decoded.push('\\'),
                    Some('n') => decoded.push('\n'),
                    Some('t') => decoded.push('\t'),
                    Some(other) => {
                        return Err(ParseError::new(
                            format!("Invalid escape sequence '\\{other}'."),
                            here,
                        ));
                    }
                    None => {
                        return Err(ParseError::new("Incomplete character escape.", here));
                    }
                },
                other => decoded.push(other),
            }
            end = self.offset;
        }

        if let Some(quote) = open_quote {
            return Err(ParseError::new(
                "Double quotes must be properly balanced or escaped with a backslash.",
                quote,
            ));
        }

        Ok(Token::new(TokenKind::Value, start, end - start.offset, decoded))
    }

    /// Scan a comment: the marker and everything after it, verbatim.
    pub fn scan_comment(&mut self) -> Option<Token> {
        if !matches!(self.peek(), Some('#' | ';')) {
            return None;
        }
        let start = self.position();
        let raw = self.rest();
        while self.bump().is_some() {}
        Some(Token::new(TokenKind::Comment, start, raw.len(), raw))
    }
}
