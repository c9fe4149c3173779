//! Asset embedding: the generator seam and a built-in source embedder.
//!
//! The embedder only sees the file system through [`ReadOnlyFs`], so handing
//! it a prod-mode `FilterDir` restricts the output to allow-listed files.

#![allow(missing_docs)]

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;
use std::time::SystemTime;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::core::errors::{Result, SpaError};
use crate::core::options::EmbedOptions;
use crate::core::paths::join_request_path;
use crate::fs::{EntryKind, ReadOnlyFs, read_all};

/// Code generator that bakes file bytes into a source file.
pub trait AssetEmbedder: Send + Sync {
    /// Generate the embedded-assets file and return where it was written.
    fn embed(&self, assets: &dyn ReadOnlyFs, options: &EmbedOptions) -> Result<PathBuf>;
}

/// One embedded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedFile {
    pub mime: String,
    pub modified: Option<SystemTime>,
    pub data: Vec<u8>,
}

/// Collect every regular file reachable from `/`, keyed by request path.
///
/// Only `open` and directory enumeration are used. Directories themselves
/// are not recorded.
pub fn collect_files(assets: &dyn ReadOnlyFs) -> Result<BTreeMap<String, EmbeddedFile>> {
    let mut files = BTreeMap::new();
    collect_dir(assets, "/", &mut files)?;
    Ok(files)
}

fn collect_dir(
    assets: &dyn ReadOnlyFs,
    dir: &str,
    files: &mut BTreeMap<String, EmbeddedFile>,
) -> Result<()> {
    let mut handle = assets.open(dir).map_err(|e| SpaError::from_fs(dir, e))?;
    let listing = handle.read_dir();
    if let Some(err) = listing.error {
        return Err(SpaError::Codegen {
            details: format!("listing {dir}: {err}"),
        });
    }
    for entry in listing.entries {
        let child = join_request_path(dir, &entry.name);
        match entry.kind {
            EntryKind::Dir => collect_dir(assets, &child, files)?,
            EntryKind::File => {
                let mut file = assets.open(&child).map_err(|e| SpaError::from_fs(&child, e))?;
                let data = read_all(file.as_mut()).map_err(|e| SpaError::io(&child, e))?;
                let mime = mime_guess::from_path(&child)
                    .first_or_octet_stream()
                    .essence_str()
                    .to_string();
                files.insert(
                    child,
                    EmbeddedFile {
                        mime,
                        modified: entry.modified,
                        data,
                    },
                );
            }
            EntryKind::Other => {
                tracing::debug!(path = %child, "skipping special file");
            }
        }
    }
    Ok(())
}

/// Built-in embedder writing a generated source file with every file's bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceEmbedder;

impl SourceEmbedder {
    /// Render the generated source for `files`.
    #[must_use]
    pub fn render(files: &BTreeMap<String, EmbeddedFile>, options: &EmbedOptions) -> String {
        let mut out = String::new();
        out.push_str("// Code generated by spa-assets. DO NOT EDIT.\n\n");
        if !options.build_tags.is_empty() {
            let _ = writeln!(out, "// +build {}\n", options.build_tags);
        }
        let _ = writeln!(out, "package {}\n", options.package_name);
        let _ = writeln!(out, "// {}", options.variable_comment);
        let _ = writeln!(out, "var {} = embeddedFS{{", options.variable_name);
        for (path, file) in files {
            let _ = writeln!(out, "\t\"{path}\": {{");
            let _ = writeln!(out, "\t\tmime:    \"{}\",", file.mime);
            if let Some(modified) = file.modified {
                let stamp = DateTime::<Utc>::from(modified).to_rfc3339_opts(SecondsFormat::Secs, true);
                let _ = writeln!(out, "\t\tmodTime: \"{stamp}\",");
            }
            let _ = writeln!(out, "\t\tsize:    {},", file.data.len());
            let _ = writeln!(out, "\t\tdata:    \"{}\",", escape_bytes(&file.data));
            out.push_str("\t},\n");
        }
        out.push_str("}\n");
        out
    }
}

impl AssetEmbedder for SourceEmbedder {
    fn embed(&self, assets: &dyn ReadOnlyFs, options: &EmbedOptions) -> Result<PathBuf> {
        let files = collect_files(assets)?;
        let source = Self::render(&files, options);
        fs::write(&options.filename, source)
            .map_err(|source| SpaError::io(&options.filename, source))?;
        tracing::debug!(
            files = files.len(),
            output = %options.filename.display(),
            "embedded assets written"
        );
        Ok(options.filename.clone())
    }
}

/// Escape bytes for a double-quoted string literal.
///
/// Printable ASCII is kept as-is (except `"` and `\`); everything else becomes
/// a `\xNN` escape.
#[must_use]
pub fn escape_bytes(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len());
    for &byte in data {
        match byte {
            b'"' => out.push_str("\\\""),
            b'\\' => out.push_str("\\\\"),
            0x20..=0x7e => out.push(char::from(byte)),
            _ => {
                let _ = write!(out, "\\x{byte:02x}");
            }
        }
    }
    out
}
