//! The hierarchical resolver: assemble every file that makes up one view.
//!
//! Documents are collected **nearest first**, which is also lookup priority:
//!
//! 1. The target file (level `Local`), whether or not it exists.
//! 2. Each ancestor directory's file that exists (no level), until a
//!    collected document sets `[config] root = true` or the filesystem root
//!    is reached.
//! 3. The global file (level `Global`), unless `[config] global = false` was
//!    seen in a directory-walk document.
//! 4. The system file (level `System`), unless `[config] system = false` was
//!    seen likewise.
//!
//! Targeting the global or system file directly skips the walk, and the
//! global file is then not repeated. Nothing here is shared between calls,
//! so concurrent builds over the same files are independent.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::builder::ConfigSettings;
use crate::config::Config;
use crate::document::ConfigDocument;
use crate::error::ConfigError;
use crate::file;
use crate::types::{ConfigKey, ConfigLevel};
use crate::value::ConfigValue;

const CONFIG_SECTION: &str = "config";

pub fn build(settings: &ConfigSettings, path: Option<&Path>) -> Result<Config, ConfigError> {
    let target = file::resolve_target(path, &settings.file_name)?;
    let is_global = settings.global_location.as_deref() == Some(target.as_path());
    let is_system = settings.system_location.as_deref() == Some(target.as_path());

    let level = if is_system {
        ConfigLevel::System
    } else if is_global {
        ConfigLevel::Global
    } else {
        ConfigLevel::Local
    };
    let mut documents = vec![ConfigDocument::load(&target, Some(level))?];
    debug!(path = %target.display(), %level, "target config");

    if !is_global && !is_system && !is_root(&documents[0])? {
        walk_ancestors(settings, &target, &mut documents)?;
    }

    if !is_global && !is_system {
        match &settings.global_location {
            Some(global) if !opted_out(&documents, "global")? => {
                documents.push(ConfigDocument::load(global, Some(ConfigLevel::Global))?);
            }
            Some(_) => debug!("global scope disabled by config.global"),
            None => {}
        }
    }

    if !is_system {
        match &settings.system_location {
            Some(system) if !opted_out(&documents, "system")? => {
                documents.push(ConfigDocument::load(system, Some(ConfigLevel::System))?);
            }
            Some(_) => debug!("system scope disabled by config.system"),
            None => {}
        }
    }

    debug!(files = documents.len(), "config resolved");
    Ok(match documents.len() {
        1 => Config::File(documents.remove(0)),
        _ => Config::Aggregate(documents),
    })
}

fn walk_ancestors(
    settings: &ConfigSettings,
    target: &Path,
    documents: &mut Vec<ConfigDocument>,
) -> Result<(), ConfigError> {
    let scopes: Vec<&PathBuf> = [&settings.global_location, &settings.system_location]
        .into_iter()
        .flatten()
        .collect();

    for candidate in file::ancestor_files(target, &settings.file_name) {
        if !candidate.is_file() {
            continue;
        }
        let document = ConfigDocument::load(&candidate, None)?;
        // Scope files join later with their level, but still fence the walk.
        if scopes.contains(&&candidate) {
            if is_root(&document)? {
                debug!(path = %candidate.display(), "stopping at root scope config");
                break;
            }
            continue;
        }
        debug!(path = %candidate.display(), "collected ancestor config");

        let root = is_root(&document)?;
        documents.push(document);
        if root {
            debug!(path = %candidate.display(), "stopping at root config");
            break;
        }
    }
    Ok(())
}

fn is_root(document: &ConfigDocument) -> Result<bool, ConfigError> {
    Ok(flag(document, "root")?.unwrap_or(false))
}

/// Whether a directory-walk document switched `config.<name>` off.
fn opted_out(documents: &[ConfigDocument], name: &str) -> Result<bool, ConfigError> {
    for document in documents {
        if matches!(document.level(), None | Some(ConfigLevel::Local))
            && flag(document, name)? == Some(false)
        {
            return Ok(true);
        }
    }
    Ok(false)
}

fn flag(document: &ConfigDocument, name: &str) -> Result<Option<bool>, ConfigError> {
    document
        .get(CONFIG_SECTION, None, name)
        .map(|entry| {
            bool::from_config(
                &ConfigKey::new(CONFIG_SECTION, None, name),
                entry.value.as_deref(),
            )
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::Tree;
    use std::fs;

    fn flag_file(value: &str) -> String {
        format!("[core]\n\tflag = {value}\n")
    }

    fn flag_of(config: &Config) -> Option<String> {
        config.try_get_string("core", None, "flag").unwrap()
    }

    fn levels(config: &Config) -> Vec<Option<ConfigLevel>> {
        config.files().iter().map(ConfigDocument::level).collect()
    }

    #[test]
    fn nearest_definition_wins_and_falls_through() {
        let tree = Tree::new();
        let local = tree.write("work/proj", &flag_file("local"));
        let parent = tree.write("work", &flag_file("parent"));
        let global = tree.write("home", &flag_file("global"));
        let system = tree.write("etc", &flag_file("system"));
        let start = tree.path("work/proj");

        let expected = ["local", "parent", "global", "system"];
        for (file, value) in [local, parent, global, system].iter().zip(expected) {
            let config = build(&tree.settings, Some(&start)).unwrap();
            assert_eq!(flag_of(&config).as_deref(), Some(value));
            fs::remove_file(file).unwrap();
        }

        let config = build(&tree.settings, Some(&start)).unwrap();
        assert_eq!(flag_of(&config), None);
    }

    #[test]
    fn collection_order_is_local_ancestors_global_system() {
        let tree = Tree::new();
        tree.write("work", &flag_file("parent"));
        let config = build(&tree.settings, Some(&tree.path("work/proj"))).unwrap();

        assert_eq!(
            levels(&config),
            vec![
                Some(ConfigLevel::Local),
                None,
                None,
                Some(ConfigLevel::Global),
                Some(ConfigLevel::System),
            ]
        );
        assert_eq!(config.files()[1].path(), tree.path("work").join(".dotconfig"));
    }

    #[test]
    fn root_marker_hides_outer_values() {
        let tree = Tree::new();
        tree.write("", "[config]\n\troot = true\n[core]\n\tname = outer\n");
        tree.write("work", "[config]\n\troot\n");
        let config = build(&tree.settings, Some(&tree.path("work/proj"))).unwrap();

        assert_eq!(config.try_get_string("core", None, "name").unwrap(), None);
        assert_eq!(config.files().len(), 4);
    }

    #[test]
    fn root_marker_in_target_skips_walk() {
        let tree = Tree::new();
        tree.write("work", &flag_file("parent"));
        tree.write("work/proj", "[config]\n\troot = yes\n");
        let config = build(&tree.settings, Some(&tree.path("work/proj"))).unwrap();

        assert_eq!(flag_of(&config), None);
        assert_eq!(
            levels(&config),
            vec![
                Some(ConfigLevel::Local),
                Some(ConfigLevel::Global),
                Some(ConfigLevel::System),
            ]
        );
    }

    #[test]
    fn local_can_opt_out_of_global_and_system() {
        let tree = Tree::new();
        tree.write("home", &flag_file("global"));
        tree.write("proj", "[config]\n\tglobal = false\n\tsystem = off\n");
        let config = build(&tree.settings, Some(&tree.path("proj"))).unwrap();

        assert_eq!(flag_of(&config), None);
        assert_eq!(levels(&config), vec![Some(ConfigLevel::Local), None]);
    }

    #[test]
    fn ancestor_opt_out_counts() {
        let tree = Tree::new();
        tree.write("work", "[config]\n\tsystem = false\n");
        let config = build(&tree.settings, Some(&tree.path("work/proj"))).unwrap();
        assert!(config.file(ConfigLevel::Global).is_some());
        assert!(config.file(ConfigLevel::System).is_none());
    }

    #[test]
    fn opt_out_inside_global_file_is_ignored() {
        let tree = Tree::new();
        tree.write("home", "[config]\n\tsystem = false\n");
        let config = build(&tree.settings, Some(&tree.path("proj"))).unwrap();
        assert!(config.file(ConfigLevel::System).is_some());
    }

    #[test]
    fn targeting_global_skips_walk() {
        let tree = Tree::new();
        let global = tree.settings.global_location.clone().unwrap();
        let config = build(&tree.settings, Some(&global)).unwrap();

        assert_eq!(
            levels(&config),
            vec![Some(ConfigLevel::Global), Some(ConfigLevel::System)]
        );
    }

    #[test]
    fn targeting_system_yields_single_file() {
        let tree = Tree::new();
        let system = tree.settings.system_location.clone().unwrap();
        let config = build(&tree.settings, Some(&system)).unwrap();

        assert!(matches!(config, Config::File(ref d) if d.level() == Some(ConfigLevel::System)));
    }

    #[test]
    fn single_document_is_not_wrapped() {
        let tree = Tree::new();
        let settings = ConfigSettings {
            global_location: None,
            system_location: None,
            ..tree.settings.clone()
        };
        let config = build(&settings, Some(tree.dir.path())).unwrap();
        assert!(matches!(config, Config::File(_)));
    }

    #[test]
    fn ancestor_at_a_scope_location_is_not_collected_twice() {
        let tree = Tree::new();
        let work = tree.write("work", &flag_file("shared"));
        let settings = ConfigSettings {
            global_location: Some(work.clone()),
            ..tree.settings.clone()
        };
        let config = build(&settings, Some(&tree.path("work/proj"))).unwrap();

        let hits: Vec<_> = config.files().iter().filter(|d| d.path() == work).collect();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].level(), Some(ConfigLevel::Global));
    }

    #[test]
    fn root_marker_in_scope_ancestor_stops_walk() {
        let tree = Tree::new();
        tree.write("outer", &flag_file("outer"));
        let home = tree.write("outer/home", "[config]\n\troot = true\n[core]\n\tflag = home\n");
        let settings = ConfigSettings {
            global_location: Some(home.clone()),
            ..tree.settings.clone()
        };
        let config = build(&settings, Some(&tree.path("outer/home/proj"))).unwrap();

        let paths: Vec<_> = config.files().iter().map(|d| d.path().to_path_buf()).collect();
        assert_eq!(
            paths,
            vec![
                tree.path("outer/home/proj").join(".dotconfig"),
                home,
                tree.settings.system_location.clone().unwrap(),
            ]
        );
        assert_eq!(
            config.try_get_string("core", None, "flag").unwrap().as_deref(),
            Some("home")
        );
    }

    #[test]
    fn malformed_ancestor_fails_build() {
        let tree = Tree::new();
        tree.write("work", "[core\n");
        let err = build(&tree.settings, Some(&tree.path("work/proj"))).unwrap_err();
        match err {
            ConfigError::Parse { path, line, .. } => {
                assert_eq!(path, tree.path("work").join(".dotconfig"));
                assert_eq!(line, 1);
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn invalid_root_flag_is_an_error() {
        let tree = Tree::new();
        tree.write("proj", "[config]\n\troot = sometimes\n");
        let err = build(&tree.settings, Some(&tree.path("proj"))).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn concurrent_builds_agree() {
        let tree = Tree::new();
        tree.write("work/proj", "[core]\n\tflag = local\n\tsize = 2k\n");
        tree.write("work", &flag_file("parent"));
        let start = tree.path("work/proj");

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    scope.spawn(|| {
                        let config = build(&tree.settings, Some(&start)).unwrap();
                        (
                            flag_of(&config),
                            config.try_get_number("core", None, "size").unwrap(),
                        )
                    })
                })
                .collect();
            for handle in handles {
                let (flag, size) = handle.join().unwrap();
                assert_eq!(flag.as_deref(), Some("local"));
                assert_eq!(size, Some(2048));
            }
        });
    }
}
