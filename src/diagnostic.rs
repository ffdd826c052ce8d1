//! Rich parse-error rendering via [miette](https://docs.rs/miette).
//!
//! Compiled with the `rich-errors` feature. Turns a [`ConfigError::Parse`]
//! into a diagnostic that shows the offending line with a caret under the
//! failing character.

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::error::ConfigError;

#[derive(Debug, Error, Diagnostic)]
#[error("invalid configuration in {name}")]
#[diagnostic(code(dotconfig::parse))]
pub struct ParseDiagnostic {
    name: String,
    #[source_code]
    src: NamedSource<String>,
    #[label("{message}")]
    span: SourceSpan,
    message: String,
}

impl ParseDiagnostic {
    /// Build a diagnostic from a parse error. Other errors yield `None`.
    pub fn from_error(error: &ConfigError) -> Option<Self> {
        let ConfigError::Parse {
            path,
            line,
            message,
            source_line,
            offset,
            ..
        } = error
        else {
            return None;
        };

        let name = format!("{}:{line}", path.display());
        let len = source_line
            .get(*offset..)
            .and_then(|rest| rest.chars().next())
            .map_or(0, char::len_utf8);
        Some(Self {
            src: NamedSource::new(&name, source_line.clone()),
            name,
            span: (*offset, len).into(),
            message: message.clone(),
        })
    }

    pub fn offset(&self) -> usize {
        self.span.offset()
    }
}
