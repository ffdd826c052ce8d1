//! Hierarchical, git-config style configuration files with edits that leave
//! everything you did not touch byte-for-byte intact.
//!
//! dotconfig reads `.dotconfig` files layered across a directory tree, the
//! user's home and the machine, and writes changes back into exactly one of
//! them without disturbing comments, spacing or quoting.
//!
//! ```ignore
//! let mut config = Config::build(None)?;
//! let editor = config.try_get_string("core", None, "editor")?;
//! config.set_bool(Some(ConfigLevel::Local), &ConfigKey::parse("core.bare")?, true)?;
//! ```
//!
//! # File format
//!
//! ```text
//! # comment
//! [section "subsection"] # optional trailing comment
//!     name = value        # optional trailing comment
//!     name                # shorthand for name = true
//! ; semicolon comments also allowed
//! ```
//!
//! - Section names are letters, digits and `-`, starting with a letter, and
//!   may be dotted (`[a.b]`). They match case-insensitively.
//! - Subsections are quoted, escape `"` and `\`, and match case-sensitively.
//! - Variable names follow section-name rules without dots and match
//!   case-sensitively. A variable must appear under a section header.
//! - Unquoted values are trimmed and collapse inner whitespace runs. Quoted
//!   values keep their whitespace. Both decode `\"`, `\\`, `\n` and `\t`.
//! - A name may repeat: every line is a separate value of a multi-valued
//!   variable.
//!
//! A malformed line fails the whole file, and the error carries the path,
//! line, one-based column and a specific message:
//!
//! ```text
//! /work/.dotconfig(1,5): Section name can only contain letters, digits or '-'.
//! ```
//!
//! With the `rich-errors` feature, `ParseDiagnostic` renders the same error
//! through [miette](https://docs.rs/miette) with a caret under the column.
//!
//! # Hierarchy
//!
//! [`Config::build`] starts from a directory or file (default: the current
//! directory) and collects, nearest first:
//!
//! ```text
//! <target>/.dotconfig        Local, always present even if missing
//! <parent>/.dotconfig        each existing ancestor, no level
//!        ...                 until [config] root = true
//! ~/.dotconfig               Global, unless [config] global = false
//! /etc/.dotconfig            System, unless [config] system = false
//! ```
//!
//! A single-value read returns the nearest definition (and within one file,
//! the last line). [`Config::get_all`] concatenates every match in that
//! order. When only one file is collected the result is a plain
//! [`Config::File`], otherwise a [`Config::Aggregate`].
//!
//! The global and system locations come from [`ConfigSettings`]; build one
//! with [`Config::builder`] to point them elsewhere (tests, sandboxes) or to
//! switch a scope off.
//!
//! # Writing
//!
//! Every write goes to exactly one document and is saved before the call
//! returns. On an aggregate the caller names the target [`ConfigLevel`];
//! without one the write fails with [`ConfigError::CrossFileWrite`].
//!
//! | Operation | Effect |
//! |-----------|--------|
//! | `add` | appends a new line, creating the section if needed |
//! | `set` | updates the single matching line, or adds one |
//! | `set_all` | updates every matching line, never creates |
//! | `unset` | removes the single matching line |
//! | `unset_all` | removes every matching line |
//! | `remove_section` | drops each matching section block |
//! | `rename_section` | rewrites matching headers only |
//!
//! `set` and `unset` refuse to guess on a multi-valued variable
//! ([`ConfigError::MultiValued`]); narrow them with a [`ValueMatcher`] or use
//! the `*_all` forms. A section left with nothing but blank lines after an
//! unset loses its header too.
//!
//! Edits are surgical: when the old text of the changed field occurs once in
//! its line, only that substring is replaced. Otherwise the line is rebuilt
//! from its fields, keeping indentation and trailing comment.
//!
//! # Typed values
//!
//! [`ConfigValue`] maps raw values to `bool`, `i64` (with `k`/`m`/`g`/`t`
//! binary units), `chrono::DateTime<FixedOffset>` and `String`. Absent keys
//! read as `Ok(None)`; a present but malformed value is
//! [`ConfigError::InvalidValue`].
//!
//! # Clap adapter
//!
//! With the `clap` feature (on by default), [`ConfigArgs`] provides a
//! git-config-like command surface with `--global`, `--system`, `--local`
//! and `--path`, and [`ConfigArgs::into_action`] turns it into a
//! [`ConfigAction`] for [`Config::handle`]. To use dotconfig without clap:
//!
//! ```toml
//! dotconfig = { version = "...", default-features = false }
//! ```
//!
//! # Logging
//!
//! The crate emits [`tracing`](https://docs.rs/tracing) events (file
//! collection and saves at `debug`, line edits at `trace`) and never installs
//! a subscriber itself.

pub mod error;
pub mod types;

mod builder;
#[cfg(feature = "clap")]
mod cli;
mod config;
#[cfg(feature = "rich-errors")]
mod diagnostic;
mod document;
mod file;
mod flatten;
mod grammar;
mod line;
mod matcher;
mod ops;
mod persist;
mod resolve;
mod scanner;
mod value;

#[cfg(test)]
mod fixtures;

pub use builder::{ConfigBuilder, ConfigSettings, default_global_location, default_system_location};
#[cfg(feature = "clap")]
pub use cli::{ConfigArgs, ConfigSubcommand};
pub use config::Config;
#[cfg(feature = "rich-errors")]
pub use diagnostic::ParseDiagnostic;
pub use document::ConfigDocument;
pub use error::{ConfigError, Result};
pub use file::{FILE_NAME, resolve_target};
pub use flatten::{DELIMITER, flat_key, split_flat_key};
pub use line::{Line, LineEnding, LineKind};
pub use matcher::ValueMatcher;
pub use ops::{ConfigResult, handle};
pub use scanner::ParseError;
pub use types::{ConfigAction, ConfigEntry, ConfigKey, ConfigLevel, Position, TextSpan};
pub use value::{ConfigValue, format_datetime, parse_bool, parse_datetime, parse_number};
