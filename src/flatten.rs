//! Flat key/value view for frameworks that want a plain string map.
//!
//! Keys are colon-delimited: `section:name` or `section:subsection:name`.
//! The section is lowercased since it matches case-insensitively. Each key
//! maps to its effective value (nearest document, last line within it), and
//! the boolean shorthand is rendered as `"true"`.
//!
//! ```ignore
//! let flat = config.to_flat_map();
//! assert_eq!(flat["remote:origin:url"], "https://example.com/repo.git");
//! config.set_flat(Some(ConfigLevel::Local), "core:editor", "vim")?;
//! ```

use std::collections::BTreeMap;

use crate::config::Config;
use crate::error::ConfigError;
use crate::matcher::ValueMatcher;
use crate::types::{ConfigEntry, ConfigKey, ConfigLevel};

pub const DELIMITER: char = ':';

/// The flat key for an entry.
pub fn flat_key(entry: &ConfigEntry) -> String {
    let section = entry.section.to_ascii_lowercase();
    match &entry.subsection {
        Some(sub) => format!("{section}{DELIMITER}{sub}{DELIMITER}{}", entry.variable),
        None => format!("{section}{DELIMITER}{}", entry.variable),
    }
}

/// Split a flat key back into a [`ConfigKey`].
///
/// Like dotted keys, the section ends at the first delimiter and the name
/// starts after the last, so a subsection may itself contain colons.
pub fn split_flat_key(key: &str) -> Result<ConfigKey, ConfigError> {
    let (section, rest) = key
        .split_once(DELIMITER)
        .ok_or_else(|| ConfigError::InvalidKey(format!("flat key must contain ':': {key}")))?;
    let (subsection, name) = match rest.rsplit_once(DELIMITER) {
        Some((sub, name)) => (Some(sub), name),
        None => (None, rest),
    };
    if section.is_empty() || name.is_empty() {
        return Err(ConfigError::InvalidKey(format!(
            "flat key must have a section and a variable name: {key}"
        )));
    }
    Ok(ConfigKey::new(section, subsection, name))
}

impl Config {
    /// Effective entry per flat key.
    pub fn flat_entries(&self) -> BTreeMap<String, ConfigEntry> {
        let mut flat = BTreeMap::new();
        // Farthest first, so nearer documents and later lines overwrite.
        for document in self.files().iter().rev() {
            for entry in document.entries() {
                flat.insert(flat_key(&entry), entry);
            }
        }
        flat
    }

    pub fn to_flat_map(&self) -> BTreeMap<String, String> {
        self.flat_entries()
            .into_iter()
            .map(|(key, entry)| (key, entry.value.unwrap_or_else(|| "true".to_string())))
            .collect()
    }

    /// Store a string value under a flat key, at `level`.
    pub fn set_flat(
        &mut self,
        level: Option<ConfigLevel>,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let key = split_flat_key(key)?;
        self.set_raw(level, &key, Some(value), &ValueMatcher::All)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::{SAMPLE, Tree, doc_in, read};
    use pretty_assertions::assert_eq;

    #[test]
    fn sample_flattens() {
        let (_dir, doc) = doc_in(SAMPLE);
        let flat = Config::File(doc).to_flat_map();
        assert_eq!(flat["core:editor"], "vim");
        assert_eq!(flat["core:autocrlf"], "true");
        assert_eq!(flat["remote:origin:url"], "https://example.com/repo.git");
        assert_eq!(flat.len(), 4);
    }

    #[test]
    fn nearest_and_last_win() {
        let tree = Tree::new();
        tree.write("proj", "[Core]\n\tname = first\n[core]\n\tname = second\n");
        tree.write("home", "[core]\n\tname = global\n\tonly = g\n");
        let config = tree.settings.build(Some(&tree.path("proj"))).unwrap();

        let flat = config.flat_entries();
        assert_eq!(flat["core:name"].value.as_deref(), Some("second"));
        assert_eq!(flat["core:name"].level, Some(ConfigLevel::Local));
        assert_eq!(flat["core:only"].level, Some(ConfigLevel::Global));
    }

    #[test]
    fn split_keys() {
        assert_eq!(
            split_flat_key("core:editor").unwrap(),
            ConfigKey::new("core", None, "editor")
        );
        assert_eq!(
            split_flat_key("url:https://host:8080/:insteadOf").unwrap(),
            ConfigKey::new("url", Some("https://host:8080/"), "insteadOf")
        );
        assert!(split_flat_key("core").is_err());
        assert!(split_flat_key(":name").is_err());
        assert!(split_flat_key("core:").is_err());
    }

    #[test]
    fn set_flat_writes_string() {
        let (_dir, doc) = doc_in("");
        let mut config = Config::File(doc);
        config.set_flat(None, "http:example.com:proxy", "none").unwrap();
        assert_eq!(
            read(&config.files()[0]),
            "[http \"example.com\"]\n\tproxy = none\n"
        );
    }
}
