use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::ConfigError;
use crate::file::FILE_NAME;
use crate::resolve;

/// Where the resolver looks besides the directory walk.
///
/// A plain value: build one at startup and pass it to every
/// [`build`](Self::build). `None` for a location disables that scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSettings {
    pub file_name: String,
    pub global_location: Option<PathBuf>,
    pub system_location: Option<PathBuf>,
}

impl Default for ConfigSettings {
    fn default() -> Self {
        Self {
            file_name: FILE_NAME.to_string(),
            global_location: default_global_location(),
            system_location: default_system_location(),
        }
    }
}

impl ConfigSettings {
    /// Build the configuration view for `path` (default: the current directory).
    pub fn build(&self, path: Option<&Path>) -> Result<Config, ConfigError> {
        resolve::build(self, path)
    }
}

/// `<home>/.dotconfig`, or `None` when there is no home directory.
pub fn default_global_location() -> Option<PathBuf> {
    let base = directories::BaseDirs::new()?;
    Some(base.home_dir().join(FILE_NAME))
}

/// `/etc/.dotconfig` on unix, `%ProgramData%\.dotconfig` on Windows.
pub fn default_system_location() -> Option<PathBuf> {
    #[cfg(windows)]
    {
        std::env::var_os("ProgramData").map(|dir| PathBuf::from(dir).join(FILE_NAME))
    }
    #[cfg(not(windows))]
    {
        Some(PathBuf::from("/etc").join(FILE_NAME))
    }
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Build with platform-default settings.
    pub fn build(path: Option<&Path>) -> Result<Config, ConfigError> {
        ConfigSettings::default().build(path)
    }
}

/// Builder for [`ConfigSettings`].
///
/// Anything left unset falls back to the platform default.
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    file_name: Option<String>,
    global_location: Option<Option<PathBuf>>,
    system_location: Option<Option<PathBuf>>,
}

impl ConfigBuilder {
    fn new() -> Self {
        Self::default()
    }

    /// Override the config file name looked up in each directory.
    pub fn file_name(mut self, name: &str) -> Self {
        self.file_name = Some(name.to_string());
        self
    }

    /// Use `path` as the user-global file.
    pub fn global_location(mut self, path: impl Into<PathBuf>) -> Self {
        self.global_location = Some(Some(path.into()));
        self
    }

    /// Never append a user-global file.
    pub fn no_global(mut self) -> Self {
        self.global_location = Some(None);
        self
    }

    /// Use `path` as the machine-wide file.
    pub fn system_location(mut self, path: impl Into<PathBuf>) -> Self {
        self.system_location = Some(Some(path.into()));
        self
    }

    /// Never append a machine-wide file.
    pub fn no_system(mut self) -> Self {
        self.system_location = Some(None);
        self
    }

    fn effective_file_name(&self) -> String {
        self.file_name
            .clone()
            .unwrap_or_else(|| FILE_NAME.to_string())
    }

    fn effective_global_location(&self) -> Option<PathBuf> {
        match &self.global_location {
            Some(location) => location.clone(),
            None => default_global_location(),
        }
    }

    fn effective_system_location(&self) -> Option<PathBuf> {
        match &self.system_location {
            Some(location) => location.clone(),
            None => default_system_location(),
        }
    }

    /// The settings this builder describes.
    pub fn settings(&self) -> ConfigSettings {
        ConfigSettings {
            file_name: self.effective_file_name(),
            global_location: self.effective_global_location(),
            system_location: self.effective_system_location(),
        }
    }

    pub fn build(&self, path: Option<&Path>) -> Result<Config, ConfigError> {
        self.settings().build(path)
    }
}
