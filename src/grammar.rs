//! Line grammar: turns one physical line into exactly one [`LineKind`].
//!
//! ```text
//! Section  ::= '[' SectionName (' '+ '"' Subsection '"')? ' '* ']' Comment?
//! Variable ::= Identifier ('=' Value)? Comment?
//! Comment  ::= ('#' | ';') AnyChars
//! Empty    ::= whitespace-only or zero-length line
//! ```
//!
//! A variable line is only valid after a section header. Failures become
//! [`LineKind::Error`] carrying the message and the column where the rule
//! broke. The inverse direction (escaping values and subsections, rendering
//! headers and assignments) also lives here so that both directions agree
//! on the same rules.

use crate::line::LineKind;
use crate::scanner::{IdentifierKind, ParseError, Scanner, TokenKind, is_whitespace};

/// Parse one physical line (without its line terminator).
///
/// `in_section` tells whether a section header precedes this line.
pub fn parse_line(text: &str, line: usize, in_section: bool) -> LineKind {
    let mut scanner = Scanner::new(text, line);
    scanner.skip_whitespace();

    let result = match scanner.peek() {
        None => Ok(LineKind::Empty),
        Some('#' | ';') => Ok(LineKind::Comment(scanner.rest().to_string())),
        Some('[') => parse_section(&mut scanner),
        Some(_) if !in_section => Err(ParseError::new(
            "Variables must be declared within a section.",
            scanner.position(),
        )),
        Some(_) => parse_variable(&mut scanner),
    };

    result.unwrap_or_else(|e| LineKind::Error {
        message: e.message,
        position: e.position,
    })
}

fn parse_section(s: &mut Scanner<'_>) -> Result<LineKind, ParseError> {
    s.scan_punct(TokenKind::OpenBracket);
    let section = s.scan_identifier(IdentifierKind::Section, true)?;

    let mut subsection = None;
    if s.skip_whitespace() > 0 && s.peek() == Some('"') {
        subsection = Some(s.scan_quoted()?.span);
        s.skip_whitespace();
    }

    if s.scan_punct(TokenKind::CloseBracket).is_none() {
        return Err(ParseError::new("Expected end of section ']'.", s.position()));
    }

    let comment = trailing_comment(s)?;
    Ok(LineKind::Section {
        section: section.span,
        subsection,
        comment,
    })
}

fn parse_variable(s: &mut Scanner<'_>) -> Result<LineKind, ParseError> {
    let name = s.scan_identifier(IdentifierKind::Variable, false)?;
    s.skip_whitespace();

    let mut value = None;
    if s.scan_punct(TokenKind::Equals).is_some() {
        s.skip_whitespace();
        value = Some(s.scan_value()?.span);
    } else if !s.is_eof() && !matches!(s.peek(), Some('#' | ';')) {
        return Err(ParseError::new(
            "Expected '=' or end of line after variable name.",
            s.position(),
        ));
    }

    let comment = trailing_comment(s)?;
    Ok(LineKind::Variable {
        name: name.span,
        value,
        comment,
    })
}

fn trailing_comment(s: &mut Scanner<'_>) -> Result<Option<String>, ParseError> {
    s.skip_whitespace();
    if s.is_eof() {
        return Ok(None);
    }
    match s.scan_comment() {
        Some(token) => Ok(Some(token.value().to_string())),
        None => Err(ParseError::new(
            "Expected a comment or end of line.",
            s.position(),
        )),
    }
}

/// Check that `section` is a valid (optionally dotted) section name.
pub fn validate_section(section: &str) -> Result<(), ParseError> {
    let mut s = Scanner::new(section, 1);
    s.scan_identifier(IdentifierKind::Section, true)?;
    ensure_consumed(&s, "Section name can only contain letters, digits or '-'.")
}

/// Check that `name` is a valid variable name.
pub fn validate_variable(name: &str) -> Result<(), ParseError> {
    let mut s = Scanner::new(name, 1);
    s.scan_identifier(IdentifierKind::Variable, false)?;
    ensure_consumed(&s, "Variable name can only contain letters, digits or '-'.")
}

/// Subsections may hold anything except a line break.
pub fn validate_subsection(subsection: &str) -> Result<(), ParseError> {
    let mut s = Scanner::new(subsection, 1);
    while let Some(c) = s.peek() {
        if c == '\n' || c == '\r' {
            return Err(ParseError::new(
                "Subsection name cannot contain line breaks.",
                s.position(),
            ));
        }
        s.bump();
    }
    Ok(())
}

fn ensure_consumed(s: &Scanner<'_>, message: &str) -> Result<(), ParseError> {
    if s.is_eof() {
        Ok(())
    } else {
        Err(ParseError::new(message, s.position()))
    }
}

/// Escape a subsection for use between double quotes.
pub fn escape_subsection(subsection: &str) -> String {
    subsection.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Render a value so that parsing it back yields exactly `value`.
///
/// Backslashes, quotes, newlines and tabs are escaped. The whole value is
/// quoted when it is empty, has leading or trailing spaces, contains a
/// comment marker, or has runs of spaces that would otherwise collapse.
pub fn format_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\t' => escaped.push_str("\\t"),
            other => escaped.push(other),
        }
    }

    let needs_quotes = value.is_empty()
        || value.starts_with(is_whitespace)
        || value.ends_with(is_whitespace)
        || value.contains(['#', ';'])
        || value.contains("  ")
        || value.contains('\r');

    if needs_quotes {
        format!("\"{escaped}\"")
    } else {
        escaped
    }
}

/// Render a section header, e.g. `[remote "origin"]`.
pub fn format_section(section: &str, subsection: Option<&str>) -> String {
    match subsection {
        Some(sub) => format!("[{section} \"{}\"]", escape_subsection(sub)),
        None => format!("[{section}]"),
    }
}

/// Render a variable assignment without indentation; `None` renders the
/// boolean shorthand.
pub fn format_variable(name: &str, value: Option<&str>) -> String {
    match value {
        Some(value) => format!("{name} = {}", format_value(value)),
        None => name.to_string(),
    }
}
