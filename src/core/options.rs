//! Generator options: TOML file + smart defaults.
//!
//! Every field is optional. Empty values are replaced by their defaults in
//! [`Options::fill_missing`], so a hand-built `Options::default()` and a
//! TOML file with missing keys behave the same way.

#![allow(missing_docs)]

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::errors::{Result, SpaError};

pub const DEFAULT_PACKAGE_NAME: &str = "main";
pub const DEFAULT_VARIABLE_NAME: &str = "assets";
pub const DEFAULT_VFSGEN_BUILD_TAGS: &str = "!dev";
pub const DEFAULT_LIST_FILE_NAME: &str = "assets_list.go";
pub const DEFAULT_LIST_FILE_BUILD_TAGS: &str = "dev";

/// Options for the list file and the embedded-assets file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Options {
    /// Output path of the embedded-assets file.
    /// Defaults to `<lowercase variable_name>_vfsdata.go`.
    pub filename: String,
    /// Package name of both generated files. Defaults to `main`.
    pub package_name: String,
    /// Build tags of the embedded-assets file. Defaults to `!dev`.
    pub vfsgen_build_tags: String,
    /// Name of the file-system variable in generated code. Defaults to `assets`.
    pub variable_name: String,
    /// Doc comment of that variable.
    /// Defaults to `<variable_name> statically implements the virtual filesystem provided to vfsgen.`
    pub variable_comment: String,
    /// Output path of the list file. Defaults to `assets_list.go`.
    pub list_file_name: String,
    /// Build tags of the list file. Defaults to `dev`.
    pub list_file_build_tags: String,
}

/// Options handed to an asset embedder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedOptions {
    pub filename: PathBuf,
    pub package_name: String,
    pub build_tags: String,
    pub variable_name: String,
    pub variable_comment: String,
}

impl Options {
    /// Load options from a TOML file, then fill defaults and validate.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(SpaError::MissingConfig {
                path: path.to_path_buf(),
            });
        }
        let raw = fs::read_to_string(path).map_err(|source| SpaError::io(path, source))?;
        Self::from_toml_str(&raw)
    }

    /// Parse options from TOML text, then fill defaults and validate.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let mut opts: Self = toml::from_str(raw)?;
        opts.fill_missing();
        opts.validate()?;
        Ok(opts)
    }

    /// Replace empty fields with their defaults.
    pub fn fill_missing(&mut self) {
        fill(&mut self.package_name, DEFAULT_PACKAGE_NAME);
        fill(&mut self.variable_name, DEFAULT_VARIABLE_NAME);
        fill(&mut self.vfsgen_build_tags, DEFAULT_VFSGEN_BUILD_TAGS);
        fill(&mut self.list_file_name, DEFAULT_LIST_FILE_NAME);
        fill(&mut self.list_file_build_tags, DEFAULT_LIST_FILE_BUILD_TAGS);
        if self.filename.is_empty() {
            self.filename = format!("{}_vfsdata.go", self.variable_name.to_lowercase());
        }
        if self.variable_comment.is_empty() {
            self.variable_comment = format!(
                "{} statically implements the virtual filesystem provided to vfsgen.",
                self.variable_name
            );
        }
    }

    /// Options for the embedder, derived from filled-in options.
    #[must_use]
    pub fn embed_options(&self) -> EmbedOptions {
        EmbedOptions {
            filename: PathBuf::from(&self.filename),
            package_name: self.package_name.clone(),
            build_tags: self.vfsgen_build_tags.clone(),
            variable_name: self.variable_name.clone(),
            variable_comment: self.variable_comment.clone(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("package_name", &self.package_name),
            ("variable_name", &self.variable_name),
        ] {
            if !is_identifier(value) {
                return Err(SpaError::InvalidConfig {
                    details: format!("{name} must be an identifier, got {value:?}"),
                });
            }
        }
        for (name, value) in [
            ("filename", &self.filename),
            ("list_file_name", &self.list_file_name),
        ] {
            if value.trim().is_empty() {
                return Err(SpaError::InvalidConfig {
                    details: format!("{name} must not be empty"),
                });
            }
        }
        if self.variable_comment.contains('\n') {
            return Err(SpaError::InvalidConfig {
                details: "variable_comment must be a single line".to_string(),
            });
        }
        Ok(())
    }
}

fn fill(slot: &mut String, default: &str) {
    if slot.is_empty() {
        *slot = default.to_string();
    }
}

fn is_identifier(value: &str) -> bool {
    let mut chars = value.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
