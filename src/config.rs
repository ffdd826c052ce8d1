//! One logical configuration: a single document or an ordered stack of them.
//!
//! Reads fan out over every document, nearest first. A single-value read
//! takes the first document defining the key. Writes always land in exactly
//! one document, chosen by [`ConfigLevel`].

use chrono::{DateTime, FixedOffset};

use crate::document::ConfigDocument;
use crate::error::ConfigError;
use crate::matcher::ValueMatcher;
use crate::types::{ConfigEntry, ConfigKey, ConfigLevel};
use crate::value::ConfigValue;

#[derive(Debug, Clone)]
pub enum Config {
    File(ConfigDocument),
    /// Documents in lookup order.
    Aggregate(Vec<ConfigDocument>),
}

impl Config {
    pub fn files(&self) -> &[ConfigDocument] {
        match self {
            Config::File(document) => std::slice::from_ref(document),
            Config::Aggregate(documents) => documents,
        }
    }

    /// The member document with a fixed `level`.
    pub fn file(&self, level: ConfigLevel) -> Option<&ConfigDocument> {
        self.files().iter().find(|d| d.level() == Some(level))
    }

    /// The document a write at `level` goes to.
    ///
    /// A single document accepts any write without a level, or one naming
    /// its own level. An aggregate needs a level matching one member.
    pub fn file_mut(
        &mut self,
        level: Option<ConfigLevel>,
    ) -> Result<&mut ConfigDocument, ConfigError> {
        match self {
            Config::File(document) if level.is_none() || document.level() == level => {
                Ok(document)
            }
            Config::File(_) => Err(ConfigError::CrossFileWrite { level }),
            Config::Aggregate(documents) => level
                .and_then(|level| documents.iter_mut().find(|d| d.level() == Some(level)))
                .ok_or(ConfigError::CrossFileWrite { level }),
        }
    }

    // -- reading ------------------------------------------------------------

    /// Every entry of every document, nearest document first.
    pub fn entries(&self) -> Vec<ConfigEntry> {
        self.files().iter().flat_map(ConfigDocument::entries).collect()
    }

    /// The effective entry for a key.
    pub fn get(&self, section: &str, subsection: Option<&str>, name: &str) -> Option<ConfigEntry> {
        self.files()
            .iter()
            .find_map(|document| document.get(section, subsection, name))
    }

    /// Every matching entry across all documents, in lookup order.
    pub fn get_all(
        &self,
        section: &str,
        subsection: Option<&str>,
        name: &str,
        matcher: &ValueMatcher,
    ) -> Vec<ConfigEntry> {
        self.files()
            .iter()
            .flat_map(|document| document.get_all(section, subsection, name, matcher))
            .collect()
    }

    /// Read a typed value. `Ok(None)` when the key is not defined anywhere.
    pub fn try_get<T: ConfigValue>(
        &self,
        section: &str,
        subsection: Option<&str>,
        name: &str,
    ) -> Result<Option<T>, ConfigError> {
        self.get(section, subsection, name)
            .map(|entry| T::from_config(&entry.key(), entry.value.as_deref()))
            .transpose()
    }

    /// Read every value of a multi-valued key, in lookup order.
    pub fn try_get_all<T: ConfigValue>(
        &self,
        section: &str,
        subsection: Option<&str>,
        name: &str,
    ) -> Result<Vec<T>, ConfigError> {
        self.get_all(section, subsection, name, &ValueMatcher::All)
            .iter()
            .map(|entry| T::from_config(&entry.key(), entry.value.as_deref()))
            .collect()
    }

    pub fn try_get_bool(
        &self,
        section: &str,
        subsection: Option<&str>,
        name: &str,
    ) -> Result<Option<bool>, ConfigError> {
        self.try_get(section, subsection, name)
    }

    pub fn try_get_number(
        &self,
        section: &str,
        subsection: Option<&str>,
        name: &str,
    ) -> Result<Option<i64>, ConfigError> {
        self.try_get(section, subsection, name)
    }

    pub fn try_get_datetime(
        &self,
        section: &str,
        subsection: Option<&str>,
        name: &str,
    ) -> Result<Option<DateTime<FixedOffset>>, ConfigError> {
        self.try_get(section, subsection, name)
    }

    pub fn try_get_string(
        &self,
        section: &str,
        subsection: Option<&str>,
        name: &str,
    ) -> Result<Option<String>, ConfigError> {
        self.try_get(section, subsection, name)
    }

    // -- writing ------------------------------------------------------------

    /// Set one variable from its raw text (`None` writes the shorthand).
    pub fn set_raw(
        &mut self,
        level: Option<ConfigLevel>,
        key: &ConfigKey,
        value: Option<&str>,
        matcher: &ValueMatcher,
    ) -> Result<(), ConfigError> {
        self.file_mut(level)?.set(
            &key.section,
            key.subsection.as_deref(),
            &key.name,
            value,
            matcher,
        )
    }

    pub fn set_all_raw(
        &mut self,
        level: Option<ConfigLevel>,
        key: &ConfigKey,
        value: Option<&str>,
        matcher: &ValueMatcher,
    ) -> Result<(), ConfigError> {
        self.file_mut(level)?.set_all(
            &key.section,
            key.subsection.as_deref(),
            &key.name,
            value,
            matcher,
        )
    }

    pub fn add_raw(
        &mut self,
        level: Option<ConfigLevel>,
        key: &ConfigKey,
        value: Option<&str>,
    ) -> Result<(), ConfigError> {
        self.file_mut(level)?
            .add(&key.section, key.subsection.as_deref(), &key.name, value)
    }

    pub fn set<T: ConfigValue>(
        &mut self,
        level: Option<ConfigLevel>,
        key: &ConfigKey,
        value: &T,
    ) -> Result<(), ConfigError> {
        self.set_raw(level, key, value.to_config().as_deref(), &ValueMatcher::All)
    }

    pub fn set_all<T: ConfigValue>(
        &mut self,
        level: Option<ConfigLevel>,
        key: &ConfigKey,
        value: &T,
        matcher: &ValueMatcher,
    ) -> Result<(), ConfigError> {
        self.set_all_raw(level, key, value.to_config().as_deref(), matcher)
    }

    pub fn add<T: ConfigValue>(
        &mut self,
        level: Option<ConfigLevel>,
        key: &ConfigKey,
        value: &T,
    ) -> Result<(), ConfigError> {
        self.add_raw(level, key, value.to_config().as_deref())
    }

    pub fn unset(&mut self, level: Option<ConfigLevel>, key: &ConfigKey) -> Result<(), ConfigError> {
        self.file_mut(level)?
            .unset(&key.section, key.subsection.as_deref(), &key.name)
    }

    pub fn unset_all(
        &mut self,
        level: Option<ConfigLevel>,
        key: &ConfigKey,
        matcher: &ValueMatcher,
    ) -> Result<(), ConfigError> {
        self.file_mut(level)?
            .unset_all(&key.section, key.subsection.as_deref(), &key.name, matcher)
    }

    pub fn remove_section(
        &mut self,
        level: Option<ConfigLevel>,
        section: &str,
        subsection: Option<&str>,
    ) -> Result<(), ConfigError> {
        self.file_mut(level)?.remove_section(section, subsection)
    }

    pub fn rename_section(
        &mut self,
        level: Option<ConfigLevel>,
        old: (&str, Option<&str>),
        new: (&str, Option<&str>),
    ) -> Result<(), ConfigError> {
        self.file_mut(level)?
            .rename_section(old.0, old.1, new.0, new.1)
    }
}

macro_rules! typed_setters {
    ($($ty:ty => $set:ident, $set_all:ident, $add:ident;)*) => {
        impl Config {
            $(
                pub fn $set(
                    &mut self,
                    level: Option<ConfigLevel>,
                    key: &ConfigKey,
                    value: $ty,
                ) -> Result<(), ConfigError> {
                    self.set(level, key, &value)
                }

                pub fn $set_all(
                    &mut self,
                    level: Option<ConfigLevel>,
                    key: &ConfigKey,
                    value: $ty,
                    matcher: &ValueMatcher,
                ) -> Result<(), ConfigError> {
                    self.set_all(level, key, &value, matcher)
                }

                pub fn $add(
                    &mut self,
                    level: Option<ConfigLevel>,
                    key: &ConfigKey,
                    value: $ty,
                ) -> Result<(), ConfigError> {
                    self.add(level, key, &value)
                }
            )*
        }
    };
}

typed_setters! {
    bool => set_bool, set_all_bool, add_bool;
    i64 => set_number, set_all_number, add_number;
    DateTime<FixedOffset> => set_datetime, set_all_datetime, add_datetime;
    String => set_string, set_all_string, add_string;
}
