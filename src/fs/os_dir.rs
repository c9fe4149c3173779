//! [`ReadOnlyFs`] backed by a directory on disk.

#![allow(missing_docs)]

use std::fs::{self, File, Metadata};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use super::{DirListing, EntryKind, FileInfo, FsFile, ReadOnlyFs};
use crate::core::paths::resolve_under_root;

/// A read-only view of the directory tree under `root`.
///
/// Request paths are cleaned before they touch the disk, so `..` can never
/// reach outside the root.
#[derive(Debug, Clone)]
pub struct OsDir {
    root: PathBuf,
}

impl OsDir {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ReadOnlyFs for OsDir {
    fn open(&self, name: &str) -> io::Result<Box<dyn FsFile>> {
        let path = resolve_under_root(&self.root, name);
        let metadata = fs::metadata(&path)?;
        let info = info_from(base_name(&path), &metadata);
        if metadata.is_dir() {
            Ok(Box::new(OsFile::Dir { path, info }))
        } else {
            let file = File::open(&path)?;
            Ok(Box::new(OsFile::File { file, info }))
        }
    }
}

/// An opened file or directory under an [`OsDir`].
pub enum OsFile {
    File { file: File, info: FileInfo },
    Dir { path: PathBuf, info: FileInfo },
}

impl Read for OsFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::File { file, .. } => file.read(buf),
            Self::Dir { path, .. } => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is a directory", path.display()),
            )),
        }
    }
}

impl FsFile for OsFile {
    fn stat(&self) -> io::Result<FileInfo> {
        match self {
            Self::File { info, .. } | Self::Dir { info, .. } => Ok(info.clone()),
        }
    }

    fn read_dir(&mut self) -> DirListing {
        let Self::Dir { path, .. } = self else {
            return DirListing::failed(io::Error::new(
                io::ErrorKind::InvalidInput,
                "not a directory",
            ));
        };
        let reader = match fs::read_dir(path.as_path()) {
            Ok(reader) => reader,
            Err(e) => return DirListing::failed(e),
        };

        let mut listing = DirListing::default();
        for entry in reader {
            let entry = match entry.and_then(|e| e.metadata().map(|m| (e, m))) {
                Ok(pair) => pair,
                Err(e) => {
                    // Keep the first failure and continue with the rest.
                    listing.error.get_or_insert(e);
                    continue;
                }
            };
            let (entry, metadata) = entry;
            let name = entry.file_name().to_string_lossy().into_owned();
            listing.entries.push(info_from(name, &metadata));
        }
        listing.entries.sort_by(|a, b| a.name.cmp(&b.name));
        listing
    }
}

fn base_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| "/".to_string(), |n| n.to_string_lossy().into_owned())
}

fn info_from(name: String, metadata: &Metadata) -> FileInfo {
    let kind = if metadata.is_dir() {
        EntryKind::Dir
    } else if metadata.is_file() {
        EntryKind::File
    } else {
        EntryKind::Other
    };
    FileInfo {
        name,
        kind,
        size: metadata.len(),
        modified: metadata.modified().ok(),
    }
}
