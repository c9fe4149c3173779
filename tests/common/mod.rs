#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use spa_assets::prelude::*;
use tempfile::TempDir;

/// A site tree on disk plus a scratch directory for generated files.
pub struct Site {
    pub root: TempDir,
    pub out: TempDir,
}

impl Site {
    /// Create a site containing `files`, each with the body `contents of <path>`.
    pub fn with_files(files: &[&str]) -> Self {
        let root = tempfile::tempdir().expect("create site dir");
        for name in files {
            let path = root.path().join(name.trim_start_matches('/'));
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).expect("create parent dirs");
            }
            fs::write(&path, format!("contents of {name}")).expect("write site file");
        }
        let out = tempfile::tempdir().expect("create output dir");
        Self { root, out }
    }

    pub fn out_path(&self, name: &str) -> PathBuf {
        self.out.path().join(name)
    }

    /// Options that write both generated files into the scratch directory.
    pub fn options(&self) -> Options {
        Options {
            filename: self.out_path("assets_vfsdata.go").display().to_string(),
            list_file_name: self.out_path("assets_list.go").display().to_string(),
            ..Options::default()
        }
    }

    /// A dev-mode file system with no terminal attached.
    pub fn filter_dir(&self) -> FilterDir {
        FilterDir::builder(Arc::new(OsDir::new(self.root.path())), self.options())
            .console(Console::Headless)
            .build()
    }
}

/// Sorted names of a directory opened through `fs`.
pub fn listing(fs: &dyn ReadOnlyFs, dir: &str) -> Vec<String> {
    let mut names: Vec<String> = fs
        .open(dir)
        .expect("open directory")
        .read_dir()
        .entries
        .into_iter()
        .map(|e| e.name)
        .collect();
    names.sort();
    names
}

pub fn read_text(path: &Path) -> String {
    fs::read_to_string(path).expect("read generated file")
}
