//! Config operations: executing a [`ConfigAction`] and the result types
//! callers display.
//!
//! Provides the logic behind `list`, `get`, `get-all`, `set`, `set-all`,
//! `add`, `unset`, `unset-all`, `remove-section` and `rename-section`.

use std::fmt;

use serde::Serialize;

use crate::config::Config;
use crate::error::ConfigError;
use crate::matcher::ValueMatcher;
use crate::types::{ConfigAction, ConfigEntry, ConfigKey, ConfigLevel};

/// Result of a config operation. Returned to the caller for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ConfigResult {
    /// Every entry in view, in lookup order.
    Listing { entries: Vec<ConfigEntry> },
    /// The effective entry for a key, if any.
    Value {
        key: String,
        entry: Option<ConfigEntry>,
    },
    /// Every matching entry for a multi-valued key.
    Values {
        key: String,
        entries: Vec<ConfigEntry>,
    },
    /// Confirmation that a value was written (`set`, `set-all`, `add`).
    ValueSet {
        key: String,
        value: Option<String>,
        level: Option<ConfigLevel>,
    },
    /// Confirmation that matching lines were removed.
    ValueUnset {
        key: String,
        level: Option<ConfigLevel>,
    },
    SectionRemoved {
        section: String,
        level: Option<ConfigLevel>,
    },
    SectionRenamed {
        old: String,
        new: String,
        level: Option<ConfigLevel>,
    },
}

impl ConfigResult {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// `key=value`, or just `key` for the boolean shorthand.
fn write_entry(f: &mut fmt::Formatter<'_>, entry: &ConfigEntry) -> fmt::Result {
    match &entry.value {
        Some(value) => write!(f, "{}={value}", entry.key()),
        None => write!(f, "{}", entry.key()),
    }
}

fn write_value(f: &mut fmt::Formatter<'_>, entry: &ConfigEntry) -> fmt::Result {
    write!(f, "{}", entry.value.as_deref().unwrap_or("true"))
}

impl fmt::Display for ConfigResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigResult::Listing { entries } => {
                for (i, entry) in entries.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write_entry(f, entry)?;
                }
                Ok(())
            }
            ConfigResult::Value { entry: Some(entry), .. } => write_value(f, entry),
            ConfigResult::Value { key, entry: None } => write!(f, "{key} is not set"),
            ConfigResult::Values { entries, .. } => {
                for (i, entry) in entries.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write_value(f, entry)?;
                }
                Ok(())
            }
            ConfigResult::ValueSet { key, value, level } => {
                match value {
                    Some(value) => write!(f, "Set {key} = {value}")?,
                    None => write!(f, "Set {key}")?,
                }
                write_level(f, *level)
            }
            ConfigResult::ValueUnset { key, level } => {
                write!(f, "Unset {key}")?;
                write_level(f, *level)
            }
            ConfigResult::SectionRemoved { section, level } => {
                write!(f, "Removed section {section}")?;
                write_level(f, *level)
            }
            ConfigResult::SectionRenamed { old, new, level } => {
                write!(f, "Renamed section {old} to {new}")?;
                write_level(f, *level)
            }
        }
    }
}

fn write_level(f: &mut fmt::Formatter<'_>, level: Option<ConfigLevel>) -> fmt::Result {
    match level {
        Some(level) => write!(f, " ({level})"),
        None => Ok(()),
    }
}

/// The documents a read at `level` sees: everything, or one scope.
fn view(config: &Config, level: Option<ConfigLevel>) -> Option<Config> {
    match level {
        None => None,
        Some(level) => Some(
            config
                .file(level)
                .map(|document| Config::File(document.clone()))
                .unwrap_or(Config::Aggregate(Vec::new())),
        ),
    }
}

/// Execute `action` against `config`.
pub fn handle(config: &mut Config, action: &ConfigAction) -> Result<ConfigResult, ConfigError> {
    match action {
        ConfigAction::List { level } => {
            let scoped = view(config, *level);
            let entries = scoped.as_ref().unwrap_or(config).entries();
            Ok(ConfigResult::Listing { entries })
        }
        ConfigAction::Get { key, level } => {
            let parsed = ConfigKey::parse(key)?;
            let scoped = view(config, *level);
            let entry = scoped.as_ref().unwrap_or(config).get(
                &parsed.section,
                parsed.subsection.as_deref(),
                &parsed.name,
            );
            Ok(ConfigResult::Value {
                key: parsed.to_string(),
                entry,
            })
        }
        ConfigAction::GetAll {
            key,
            matcher,
            level,
        } => {
            let parsed = ConfigKey::parse(key)?;
            let matcher = ValueMatcher::from_expr(matcher.as_deref())?;
            let scoped = view(config, *level);
            let entries = scoped.as_ref().unwrap_or(config).get_all(
                &parsed.section,
                parsed.subsection.as_deref(),
                &parsed.name,
                &matcher,
            );
            Ok(ConfigResult::Values {
                key: parsed.to_string(),
                entries,
            })
        }
        ConfigAction::Set {
            key,
            value,
            matcher,
            level,
        } => {
            let parsed = ConfigKey::parse(key)?;
            let matcher = ValueMatcher::from_expr(matcher.as_deref())?;
            config.set_raw(*level, &parsed, value.as_deref(), &matcher)?;
            Ok(value_set(parsed, value, *level))
        }
        ConfigAction::SetAll {
            key,
            value,
            matcher,
            level,
        } => {
            let parsed = ConfigKey::parse(key)?;
            let matcher = ValueMatcher::from_expr(matcher.as_deref())?;
            config.set_all_raw(*level, &parsed, value.as_deref(), &matcher)?;
            Ok(value_set(parsed, value, *level))
        }
        ConfigAction::Add { key, value, level } => {
            let parsed = ConfigKey::parse(key)?;
            config.add_raw(*level, &parsed, value.as_deref())?;
            Ok(value_set(parsed, value, *level))
        }
        ConfigAction::Unset { key, level } => {
            let parsed = ConfigKey::parse(key)?;
            config.unset(*level, &parsed)?;
            Ok(ConfigResult::ValueUnset {
                key: parsed.to_string(),
                level: *level,
            })
        }
        ConfigAction::UnsetAll {
            key,
            matcher,
            level,
        } => {
            let parsed = ConfigKey::parse(key)?;
            let matcher = ValueMatcher::from_expr(matcher.as_deref())?;
            config.unset_all(*level, &parsed, &matcher)?;
            Ok(ConfigResult::ValueUnset {
                key: parsed.to_string(),
                level: *level,
            })
        }
        ConfigAction::RemoveSection { section, level } => {
            let (name, subsection) = ConfigKey::parse_section(section)?;
            config.remove_section(*level, &name, subsection.as_deref())?;
            Ok(ConfigResult::SectionRemoved {
                section: section.clone(),
                level: *level,
            })
        }
        ConfigAction::RenameSection { old, new, level } => {
            let (old_name, old_sub) = ConfigKey::parse_section(old)?;
            let (new_name, new_sub) = ConfigKey::parse_section(new)?;
            config.rename_section(
                *level,
                (&old_name, old_sub.as_deref()),
                (&new_name, new_sub.as_deref()),
            )?;
            Ok(ConfigResult::SectionRenamed {
                old: old.clone(),
                new: new.clone(),
                level: *level,
            })
        }
    }
}

fn value_set(key: ConfigKey, value: &Option<String>, level: Option<ConfigLevel>) -> ConfigResult {
    ConfigResult::ValueSet {
        key: key.to_string(),
        value: value.clone(),
        level,
    }
}

impl Config {
    pub fn handle(&mut self, action: &ConfigAction) -> Result<ConfigResult, ConfigError> {
        handle(self, action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::{SAMPLE, Tree, doc_in, read};
    use pretty_assertions::assert_eq;

    fn sample() -> (tempfile::TempDir, Config) {
        let (dir, doc) = doc_in(SAMPLE);
        (dir, Config::File(doc))
    }

    fn get(key: &str) -> ConfigAction {
        ConfigAction::Get {
            key: key.into(),
            level: None,
        }
    }

    #[test]
    fn list_displays_key_value_lines() {
        let (_dir, mut config) = sample();
        let result = config.handle(&ConfigAction::List { level: None }).unwrap();
        assert_eq!(
            result.to_string(),
            "core.editor=vim\n\
             core.autocrlf\n\
             remote.origin.url=https://example.com/repo.git\n\
             remote.origin.fetch=+refs/heads/*:refs/remotes/origin/*"
        );
    }

    #[test]
    fn get_present_absent_and_shorthand() {
        let (_dir, mut config) = sample();
        assert_eq!(config.handle(&get("core.editor")).unwrap().to_string(), "vim");
        assert_eq!(config.handle(&get("core.autocrlf")).unwrap().to_string(), "true");

        let missing = config.handle(&get("core.pager")).unwrap();
        assert!(matches!(missing, ConfigResult::Value { entry: None, .. }));
        assert_eq!(missing.to_string(), "core.pager is not set");
    }

    #[test]
    fn get_rejects_undotted_key() {
        let (_dir, mut config) = sample();
        assert!(matches!(
            config.handle(&get("editor")),
            Err(ConfigError::InvalidKey(_))
        ));
    }

    #[test]
    fn add_then_get_all_with_matcher() {
        let (_dir, mut config) = sample();
        for value in ["one", "two", "three"] {
            config
                .handle(&ConfigAction::Add {
                    key: "multi.value".into(),
                    value: Some(value.into()),
                    level: None,
                })
                .unwrap();
        }
        let all = config
            .handle(&ConfigAction::GetAll {
                key: "multi.value".into(),
                matcher: Some("!^two$".into()),
                level: None,
            })
            .unwrap();
        assert_eq!(all.to_string(), "one\nthree");
    }

    #[test]
    fn set_and_unset_roundtrip_to_disk() {
        let (_dir, mut config) = sample();
        let result = config
            .handle(&ConfigAction::Set {
                key: "core.pager".into(),
                value: Some("less".into()),
                matcher: None,
                level: None,
            })
            .unwrap();
        assert_eq!(result.to_string(), "Set core.pager = less");
        assert!(read(&config.files()[0]).contains("\tpager = less\n"));

        config
            .handle(&ConfigAction::Unset {
                key: "core.pager".into(),
                level: None,
            })
            .unwrap();
        assert_eq!(read(&config.files()[0]), SAMPLE);
    }

    #[test]
    fn set_multi_valued_surfaces_error() {
        let (_dir, doc) = doc_in("[foo]\n\tbar = hello\n\tbar = world\n");
        let mut config = Config::File(doc);
        let set = |matcher: Option<&str>| ConfigAction::Set {
            key: "foo.bar".into(),
            value: Some("x".into()),
            matcher: matcher.map(str::to_string),
            level: None,
        };
        let err = config.handle(&set(None)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Multi-valued property 'foo.bar' found. Use SetAll instead."
        );
        config.handle(&set(Some("world"))).unwrap();
        assert_eq!(read(&config.files()[0]), "[foo]\n\tbar = hello\n\tbar = x\n");
    }

    #[test]
    fn invalid_matcher_is_reported() {
        let (_dir, mut config) = sample();
        let err = config
            .handle(&ConfigAction::UnsetAll {
                key: "core.editor".into(),
                matcher: Some("[".into()),
                level: None,
            })
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidMatcher { .. }));
    }

    #[test]
    fn section_actions() {
        let (_dir, mut config) = sample();
        let renamed = config
            .handle(&ConfigAction::RenameSection {
                old: "remote.origin".into(),
                new: "remote.upstream".into(),
                level: None,
            })
            .unwrap();
        assert_eq!(renamed.to_string(), "Renamed section remote.origin to remote.upstream");

        config
            .handle(&ConfigAction::RemoveSection {
                section: "remote.upstream".into(),
                level: None,
            })
            .unwrap();
        assert_eq!(
            read(&config.files()[0]),
            "# Sample configuration\n[core]\n\teditor = vim   # preferred\n\tautocrlf\n\n; remotes\n"
        );
    }

    #[test]
    fn level_narrows_reads() {
        let tree = Tree::new();
        tree.write("proj", "[core]\n\tname = local\n");
        tree.write("home", "[core]\n\tname = global\n\tonly = g\n");
        let mut config = tree.settings.build(Some(&tree.path("proj"))).unwrap();

        let global_name = config
            .handle(&ConfigAction::Get {
                key: "core.name".into(),
                level: Some(ConfigLevel::Global),
            })
            .unwrap();
        assert_eq!(global_name.to_string(), "global");

        let system = config
            .handle(&ConfigAction::List {
                level: Some(ConfigLevel::System),
            })
            .unwrap();
        assert_eq!(system, ConfigResult::Listing { entries: vec![] });
    }

    #[test]
    fn json_output_is_tagged() {
        let (_dir, mut config) = sample();
        let json = config.handle(&get("core.editor")).unwrap().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["result"], "value");
        assert_eq!(value["entry"]["value"], "vim");
        assert_eq!(value["entry"]["level"], "local");
        assert_eq!(value["entry"]["line"], 3);
    }
}
