//! Clap adapter for dotconfig.
//!
//! The optional integration layer between the clap-free core and the
//! [clap](https://docs.rs/clap) CLI parser, compiled only with the `clap`
//! Cargo feature (on by default).
//!
//! [`ConfigArgs`] gives a git-config-like command surface:
//!
//! ```text
//! app [--global | --system | --local] [--path <PATH>] <command>
//!     list | get | get-all | set | set-all | add | unset | unset-all
//!     | remove-section | rename-section
//! ```
//!
//! The only bridge to the core is [`ConfigArgs::into_action()`], which
//! converts parsed arguments into a [`ConfigAction`](crate::ConfigAction) for
//! [`Config::handle`](crate::Config::handle). Reads without a scope flag see
//! the whole hierarchy; writes without one go to the local file.

use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::types::{ConfigAction, ConfigLevel};

/// Clap-derived args for a `config` command group.
///
/// Embed this into your app's clap derive:
/// ```ignore
/// #[derive(Subcommand)]
/// enum Commands {
///     Config(ConfigArgs),
/// }
/// ```
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Use the user-global file only.
    #[arg(long, global = true, conflicts_with_all = ["system", "local"])]
    pub global: bool,

    /// Use the machine-wide file only.
    #[arg(long, global = true, conflicts_with = "local")]
    pub system: bool,

    /// Use the local file only (the default for writes).
    #[arg(long, global = true)]
    pub local: bool,

    /// Directory or file to resolve the configuration from (default: cwd).
    #[arg(long, global = true, value_name = "PATH")]
    pub path: Option<PathBuf>,

    #[command(subcommand)]
    pub action: Option<ConfigSubcommand>,
}

/// Available config subcommands.
///
/// Keys are dotted: `section.name` or `section.subsection.name`. A
/// `value_pattern` is a regular expression over the current value; prefix it
/// with `!` to negate.
#[derive(Debug, Subcommand)]
pub enum ConfigSubcommand {
    /// Show every variable in view.
    List,
    /// Show the effective value of a key.
    Get { key: String },
    /// Show every value of a multi-valued key.
    GetAll {
        key: String,
        value_pattern: Option<String>,
    },
    /// Set a single-valued key (omit the value for the boolean shorthand).
    Set {
        key: String,
        value: Option<String>,
        value_pattern: Option<String>,
    },
    /// Overwrite every matching value of a key.
    SetAll {
        key: String,
        value: Option<String>,
        value_pattern: Option<String>,
    },
    /// Append another value, making the key multi-valued.
    Add { key: String, value: Option<String> },
    /// Remove a single-valued key.
    Unset { key: String },
    /// Remove every matching value of a key.
    UnsetAll {
        key: String,
        value_pattern: Option<String>,
    },
    /// Remove a section (`section` or `section.subsection`).
    RemoveSection { section: String },
    /// Rename a section, keeping its variables.
    RenameSection { old: String, new: String },
}

impl ConfigArgs {
    /// The scope selected by the flags, if any.
    pub fn level(&self) -> Option<ConfigLevel> {
        if self.global {
            Some(ConfigLevel::Global)
        } else if self.system {
            Some(ConfigLevel::System)
        } else if self.local {
            Some(ConfigLevel::Local)
        } else {
            None
        }
    }

    /// Convert clap-parsed args into a framework-agnostic `ConfigAction`.
    ///
    /// Bare `config` (no subcommand) maps to `List`.
    pub fn into_action(self) -> ConfigAction {
        let read = self.level();
        let write = read.or(Some(ConfigLevel::Local));
        match self.action {
            None | Some(ConfigSubcommand::List) => ConfigAction::List { level: read },
            Some(ConfigSubcommand::Get { key }) => ConfigAction::Get { key, level: read },
            Some(ConfigSubcommand::GetAll { key, value_pattern }) => ConfigAction::GetAll {
                key,
                matcher: value_pattern,
                level: read,
            },
            Some(ConfigSubcommand::Set {
                key,
                value,
                value_pattern,
            }) => ConfigAction::Set {
                key,
                value,
                matcher: value_pattern,
                level: write,
            },
            Some(ConfigSubcommand::SetAll {
                key,
                value,
                value_pattern,
            }) => ConfigAction::SetAll {
                key,
                value,
                matcher: value_pattern,
                level: write,
            },
            Some(ConfigSubcommand::Add { key, value }) => ConfigAction::Add {
                key,
                value,
                level: write,
            },
            Some(ConfigSubcommand::Unset { key }) => ConfigAction::Unset { key, level: write },
            Some(ConfigSubcommand::UnsetAll { key, value_pattern }) => ConfigAction::UnsetAll {
                key,
                matcher: value_pattern,
                level: write,
            },
            Some(ConfigSubcommand::RemoveSection { section }) => ConfigAction::RemoveSection {
                section,
                level: write,
            },
            Some(ConfigSubcommand::RenameSection { old, new }) => ConfigAction::RenameSection {
                old,
                new,
                level: write,
            },
        }
    }
}
