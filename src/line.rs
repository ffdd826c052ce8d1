//! The document line model.
//!
//! A [`Line`] keeps the exact text it was parsed from next to its structured
//! [`LineKind`]. Edits go through one of two paths:
//!
//! 1. **In place**: when the raw text of the field being changed occurs
//!    exactly once in the line, only that substring is replaced. Indentation,
//!    spacing around `=`, and trailing comments stay byte-identical.
//! 2. **Regenerate**: otherwise (the old text is ambiguous, the field is
//!    appearing or disappearing, or the patched line does not parse back to
//!    the requested content) the whole line is rendered from its fields,
//!    keeping its indentation and trailing comment.
//!
//! Both paths re-parse the result, so `text` and `kind` never disagree.

use tracing::trace;

use crate::grammar::{self, escape_subsection, format_section, format_value, format_variable};
use crate::scanner::{ParseError, is_whitespace};
use crate::types::{Position, TextSpan};

/// What a physical line is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    Empty,
    /// Comment text including its `#` or `;` marker.
    Comment(String),
    Section {
        section: TextSpan,
        subsection: Option<TextSpan>,
        comment: Option<String>,
    },
    /// `value` is `None` for the boolean shorthand.
    Variable {
        name: TextSpan,
        value: Option<TextSpan>,
        comment: Option<String>,
    },
    Error {
        message: String,
        position: Position,
    },
}

/// How a line was terminated in its file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    #[default]
    None,
    Lf,
    CrLf,
}

impl LineEnding {
    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::None => "",
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    number: usize,
    text: String,
    kind: LineKind,
    ending: LineEnding,
}

impl Line {
    /// Parse `text` (without terminator) as line `number`.
    pub fn parse(text: impl Into<String>, number: usize, in_section: bool) -> Self {
        let text = text.into();
        let kind = grammar::parse_line(&text, number, in_section);
        Self {
            number,
            text,
            kind,
            ending: LineEnding::None,
        }
    }

    /// A new `[section "subsection"]` header.
    pub fn new_section(section: &str, subsection: Option<&str>) -> Result<Self, ParseError> {
        grammar::validate_section(section)?;
        if let Some(sub) = subsection {
            grammar::validate_subsection(sub)?;
        }
        Ok(Self::parse(format_section(section, subsection), 0, false))
    }

    /// A new tab-indented variable line.
    pub fn new_variable(name: &str, value: Option<&str>) -> Result<Self, ParseError> {
        grammar::validate_variable(name)?;
        Ok(Self::parse(
            format!("\t{}", format_variable(name, value)),
            0,
            true,
        ))
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn kind(&self) -> &LineKind {
        &self.kind
    }

    pub fn number(&self) -> usize {
        self.number
    }

    pub fn ending(&self) -> LineEnding {
        self.ending
    }

    pub(crate) fn set_ending(&mut self, ending: LineEnding) {
        self.ending = ending;
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.kind, LineKind::Empty)
    }

    pub fn is_section(&self) -> bool {
        matches!(self.kind, LineKind::Section { .. })
    }

    /// `(section, subsection)` for section headers.
    pub fn section(&self) -> Option<(&str, Option<&str>)> {
        match &self.kind {
            LineKind::Section {
                section,
                subsection,
                ..
            } => Some((section.value(), subsection.as_ref().map(TextSpan::value))),
            _ => None,
        }
    }

    /// `(name, value)` for variable lines.
    pub fn variable(&self) -> Option<(&str, Option<&str>)> {
        match &self.kind {
            LineKind::Variable { name, value, .. } => {
                Some((name.value(), value.as_ref().map(TextSpan::value)))
            }
            _ => None,
        }
    }

    /// Trailing comment of a section or variable line, or the text of a
    /// comment line.
    pub fn comment(&self) -> Option<&str> {
        match &self.kind {
            LineKind::Comment(text) => Some(text),
            LineKind::Section { comment, .. } | LineKind::Variable { comment, .. } => {
                comment.as_deref()
            }
            _ => None,
        }
    }

    pub fn error(&self) -> Option<(&str, Position)> {
        match &self.kind {
            LineKind::Error { message, position } => Some((message, *position)),
            _ => None,
        }
    }

    /// Change a variable's value. No-op on other line kinds.
    pub(crate) fn set_value(&mut self, value: Option<&str>) {
        let LineKind::Variable {
            name,
            value: old,
            comment,
        } = &self.kind
        else {
            return;
        };
        let name = name.value().to_string();
        let comment = comment.clone();

        if let (Some(old), Some(new)) = (old.clone(), value)
            && self.replace_span(&old, &format_value(new))
        {
            self.reparse(true);
            if self.variable() == Some((name.as_str(), Some(new))) {
                trace!(line = self.number, "value replaced in place");
                return;
            }
        }

        self.regenerate(format_variable(&name, value), comment.as_deref(), true);
        trace!(line = self.number, "variable line regenerated");
    }

    /// Rename a section header. No-op on other line kinds.
    pub(crate) fn set_section(&mut self, section: &str, subsection: Option<&str>) {
        let LineKind::Section {
            subsection: old_sub,
            comment,
            ..
        } = &self.kind
        else {
            return;
        };
        let comment = comment.clone();

        if old_sub.is_some() == subsection.is_some() && self.patch_section(section, subsection) {
            trace!(line = self.number, "section header replaced in place");
            return;
        }

        self.regenerate(format_section(section, subsection), comment.as_deref(), false);
        trace!(line = self.number, "section header regenerated");
    }

    fn patch_section(&mut self, section: &str, subsection: Option<&str>) -> bool {
        if let LineKind::Section { section: old, .. } = &self.kind
            && old.value() != section
        {
            let old = old.clone();
            if !self.replace_span(&old, section) {
                return false;
            }
            self.reparse(false);
        }

        let old_sub = match &self.kind {
            LineKind::Section {
                subsection: Some(old),
                ..
            } => Some(old.clone()),
            _ => None,
        };
        if let (Some(old), Some(new)) = (old_sub, subsection)
            && old.value() != new
        {
            if !self.replace_span(&old, &escape_subsection(new)) {
                return false;
            }
            self.reparse(false);
        }

        self.section() == Some((section, subsection))
    }

    /// Splice `raw` over `span` when the span's current text is unambiguous
    /// within the line.
    fn replace_span(&mut self, span: &TextSpan, raw: &str) -> bool {
        let old = span.raw(&self.text);
        if old.is_empty() || self.text.matches(old).count() != 1 {
            return false;
        }
        self.text.replace_range(span.range(), raw);
        true
    }

    fn regenerate(&mut self, body: String, comment: Option<&str>, in_section: bool) {
        let indent: String = self.text.chars().take_while(|c| is_whitespace(*c)).collect();
        self.text = match comment {
            Some(comment) => format!("{indent}{body} {comment}"),
            None => format!("{indent}{body}"),
        };
        self.reparse(in_section);
    }

    fn reparse(&mut self, in_section: bool) {
        self.kind = grammar::parse_line(&self.text, self.number, in_section);
    }

    /// Move the line to a new line number, keeping every span consistent.
    pub(crate) fn set_number(&mut self, number: usize) {
        if self.number == number {
            return;
        }
        self.number = number;
        match &mut self.kind {
            LineKind::Section {
                section,
                subsection,
                ..
            } => {
                section.start.line = number;
                if let Some(sub) = subsection {
                    sub.start.line = number;
                }
            }
            LineKind::Variable { name, value, .. } => {
                name.start.line = number;
                if let Some(value) = value {
                    value.start.line = number;
                }
            }
            LineKind::Error { position, .. } => position.line = number,
            LineKind::Empty | LineKind::Comment(_) => {}
        }
    }
}
