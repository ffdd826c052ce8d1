#[cfg(test)]
pub mod test {
    use std::fs;
    use std::path::{Path, PathBuf};

    use tempfile::TempDir;

    use crate::builder::ConfigSettings;
    use crate::document::ConfigDocument;
    use crate::file::FILE_NAME;
    use crate::types::ConfigLevel;

    /// A small file exercising comments, shorthand booleans, subsections and
    /// non-tab indentation. `url` sits on line 8.
    pub const SAMPLE: &str = "\
# Sample configuration
[core]
\teditor = vim   # preferred
\tautocrlf

; remotes
[remote \"origin\"]
\turl = https://example.com/repo.git
    fetch = +refs/heads/*:refs/remotes/origin/*
";

    /// A local document backed by a fresh temp dir. Nothing is written until
    /// the first mutation.
    pub fn doc_in(content: &str) -> (TempDir, ConfigDocument) {
        let dir = TempDir::new().unwrap();
        let doc = ConfigDocument::parse(
            dir.path().join(FILE_NAME),
            Some(ConfigLevel::Local),
            content,
        )
        .unwrap();
        (dir, doc)
    }

    /// What the document's file holds on disk right now.
    pub fn read(doc: &ConfigDocument) -> String {
        fs::read_to_string(doc.path()).unwrap()
    }

    /// Write `<dir>/.dotconfig`, creating `dir` as needed.
    pub fn write_config(dir: &Path, content: &str) -> PathBuf {
        fs::create_dir_all(dir).unwrap();
        let path = dir.join(FILE_NAME);
        fs::write(&path, content).unwrap();
        path
    }

    /// A temp tree whose top directory carries a root marker, so the upward
    /// walk never leaves it.
    ///
    /// ```text
    /// <tmp>/.dotconfig          [config] root = true
    /// <tmp>/home/.dotconfig     global location
    /// <tmp>/etc/.dotconfig      system location
    /// ```
    pub struct Tree {
        pub dir: TempDir,
        pub settings: ConfigSettings,
    }

    impl Tree {
        pub fn new() -> Self {
            let dir = TempDir::new().unwrap();
            write_config(dir.path(), "[config]\n\troot = true\n");
            let settings = ConfigSettings {
                file_name: FILE_NAME.to_string(),
                global_location: Some(dir.path().join("home").join(FILE_NAME)),
                system_location: Some(dir.path().join("etc").join(FILE_NAME)),
            };
            Self { dir, settings }
        }

        pub fn path(&self, rel: &str) -> PathBuf {
            self.dir.path().join(rel)
        }

        pub fn write(&self, rel_dir: &str, content: &str) -> PathBuf {
            write_config(&self.path(rel_dir), content)
        }
    }

    #[test]
    fn sample_parses() {
        let (_dir, doc) = doc_in(SAMPLE);
        assert_eq!(doc.entries().len(), 4);
    }

    #[test]
    fn tree_has_fence_and_scopes() {
        let tree = Tree::new();
        assert!(tree.path(FILE_NAME).is_file());
        assert!(tree.settings.global_location.as_ref().unwrap().starts_with(tree.dir.path()));
    }
}
