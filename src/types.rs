//! Shared value types: source positions, spans, scopes, keys, entries and the
//! framework-agnostic [`ConfigAction`].

use std::fmt;
use std::ops::Range;
use std::path::PathBuf;

use serde::Serialize;

use crate::error::ConfigError;

/// A location inside one physical line.
///
/// `offset` is the zero-based byte offset from the start of the line and
/// `column` the one-based character column, so a caller can point a caret at
/// the exact character where the grammar failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Position {
    pub line: usize,
    pub offset: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, offset: usize, column: usize) -> Self {
        Self {
            line,
            offset,
            column,
        }
    }

    /// Start of a line.
    pub fn start(line: usize) -> Self {
        Self::new(line, 0, 1)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.line, self.column)
    }
}

/// A field inside a line's raw text, together with its decoded value.
///
/// The raw text is not copied; use [`TextSpan::raw`] with the owning line's
/// text. Invariant: `start.offset + len <= text.len()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSpan {
    pub start: Position,
    pub len: usize,
    value: String,
}

impl TextSpan {
    pub fn new(start: Position, len: usize, value: impl Into<String>) -> Self {
        Self {
            start,
            len,
            value: value.into(),
        }
    }

    /// Byte range of the raw field within its line.
    pub fn range(&self) -> Range<usize> {
        self.start.offset..self.start.offset + self.len
    }

    /// The raw (still escaped) text of the field.
    pub fn raw<'a>(&self, text: &'a str) -> &'a str {
        &text[self.range()]
    }

    /// The decoded value of the field.
    pub fn value(&self) -> &str {
        &self.value
    }
}

/// The fixed scope of a configuration file.
///
/// `Local` is the file the hierarchy was built for. Files picked up while
/// walking ancestor directories carry no level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigLevel {
    Local,
    Global,
    System,
}

impl fmt::Display for ConfigLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigLevel::Local => write!(f, "local"),
            ConfigLevel::Global => write!(f, "global"),
            ConfigLevel::System => write!(f, "system"),
        }
    }
}

/// A `section[.subsection].name` key.
///
/// Case is preserved. Sections compare case-insensitively, subsections and
/// variable names case-sensitively (see [`ConfigKey::matches`]).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ConfigKey {
    pub section: String,
    pub subsection: Option<String>,
    pub name: String,
}

impl ConfigKey {
    pub fn new(section: &str, subsection: Option<&str>, name: &str) -> Self {
        Self {
            section: section.to_string(),
            subsection: subsection.map(str::to_string),
            name: name.to_string(),
        }
    }

    /// Parse from `section.name` or `section.subsection.name`.
    ///
    /// The section is everything before the first dot and the name everything
    /// after the last one, so subsections may themselves contain dots
    /// (`url.https://example.com/.insteadOf`).
    pub fn parse(key: &str) -> Result<Self, ConfigError> {
        let key = key.trim();
        let (section, rest) = key
            .split_once('.')
            .ok_or_else(|| ConfigError::InvalidKey(format!("key must contain a dot: {key}")))?;

        let (subsection, name) = match rest.rsplit_once('.') {
            Some((sub, name)) => (Some(sub), name),
            None => (None, rest),
        };

        if section.is_empty() || name.is_empty() {
            return Err(ConfigError::InvalidKey(format!(
                "key must have a section and a variable name: {key}"
            )));
        }

        Ok(Self::new(section, subsection, name))
    }

    /// Parse a section path: `section` or `section.subsection`.
    pub fn parse_section(path: &str) -> Result<(String, Option<String>), ConfigError> {
        let path = path.trim();
        let (section, subsection) = match path.split_once('.') {
            Some((section, sub)) => (section, Some(sub.to_string())),
            None => (path, None),
        };
        if section.is_empty() {
            return Err(ConfigError::InvalidKey(format!("empty section in '{path}'")));
        }
        Ok((section.to_string(), subsection))
    }

    pub fn matches(&self, section: &str, subsection: Option<&str>, name: &str) -> bool {
        self.section.eq_ignore_ascii_case(section)
            && self.subsection.as_deref() == subsection
            && self.name == name
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.subsection {
            Some(sub) => write!(f, "{}.{}.{}", self.section, sub, self.name),
            None => write!(f, "{}.{}", self.section, self.name),
        }
    }
}

/// One variable line as seen through a document.
///
/// `value` is `None` for the boolean shorthand (`name` with no `= value`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigEntry {
    pub section: String,
    pub subsection: Option<String>,
    pub variable: String,
    pub value: Option<String>,
    pub level: Option<ConfigLevel>,
    pub path: PathBuf,
    pub line: usize,
}

impl ConfigEntry {
    pub fn key(&self) -> ConfigKey {
        ConfigKey::new(&self.section, self.subsection.as_deref(), &self.variable)
    }
}

/// A config operation, independent of any CLI framework.
/// The CLI layer converts parsed clap args into this.
///
/// Keys are dotted (`section.subsection.name`); section paths are
/// `section` or `section.subsection`. `level` selects a single file: for
/// reads it narrows the view, for writes it routes the change.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigAction {
    List {
        level: Option<ConfigLevel>,
    },
    Get {
        key: String,
        level: Option<ConfigLevel>,
    },
    GetAll {
        key: String,
        matcher: Option<String>,
        level: Option<ConfigLevel>,
    },
    Set {
        key: String,
        value: Option<String>,
        matcher: Option<String>,
        level: Option<ConfigLevel>,
    },
    SetAll {
        key: String,
        value: Option<String>,
        matcher: Option<String>,
        level: Option<ConfigLevel>,
    },
    Add {
        key: String,
        value: Option<String>,
        level: Option<ConfigLevel>,
    },
    Unset {
        key: String,
        level: Option<ConfigLevel>,
    },
    UnsetAll {
        key: String,
        matcher: Option<String>,
        level: Option<ConfigLevel>,
    },
    RemoveSection {
        section: String,
        level: Option<ConfigLevel>,
    },
    RenameSection {
        old: String,
        new: String,
        level: Option<ConfigLevel>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_key() {
        let key = ConfigKey::parse("core.editor").unwrap();
        assert_eq!(key.section, "core");
        assert_eq!(key.subsection, None);
        assert_eq!(key.name, "editor");
    }

    #[test]
    fn parse_key_with_dotted_subsection() {
        let key = ConfigKey::parse("url.https://example.com/.insteadOf").unwrap();
        assert_eq!(key.section, "url");
        assert_eq!(key.subsection.as_deref(), Some("https://example.com/"));
        assert_eq!(key.name, "insteadOf");
    }

    #[test]
    fn parse_key_rejects_missing_parts() {
        assert!(ConfigKey::parse("nodot").is_err());
        assert!(ConfigKey::parse("section.").is_err());
        assert!(ConfigKey::parse(".name").is_err());
    }

    #[test]
    fn key_section_is_case_insensitive_subsection_is_not() {
        let key = ConfigKey::parse("Remote.Origin.url").unwrap();
        assert!(key.matches("remote", Some("Origin"), "url"));
        assert!(!key.matches("remote", Some("origin"), "url"));
        assert!(!key.matches("remote", Some("Origin"), "URL"));
    }

    #[test]
    fn key_display_roundtrips() {
        for raw in ["core.editor", "remote.origin.url"] {
            assert_eq!(ConfigKey::parse(raw).unwrap().to_string(), raw);
        }
    }

    #[test]
    fn parse_section_path() {
        assert_eq!(
            ConfigKey::parse_section("remote.origin").unwrap(),
            ("remote".to_string(), Some("origin".to_string()))
        );
        assert_eq!(
            ConfigKey::parse_section("core").unwrap(),
            ("core".to_string(), None)
        );
        assert!(ConfigKey::parse_section("").is_err());
    }

    #[test]
    fn span_slices_raw_text() {
        let text = "\tname = \"a b\"";
        let span = TextSpan::new(Position::new(1, 8, 9), 5, "a b");
        assert_eq!(span.raw(text), "\"a b\"");
        assert_eq!(span.value(), "a b");
    }
}
