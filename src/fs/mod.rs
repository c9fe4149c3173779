//! Read-only file-system contract, an on-disk implementation, and the
//! filtering wrapper that records or restricts what is served.
//!
//! Request paths are slash-separated strings rooted at `/`, the way an HTTP
//! asset handler sees them. Every layer speaks [`ReadOnlyFs`] so they stack:
//! `FileServer -> FilterDir -> OsDir`.

use std::io::{self, Read};
use std::time::SystemTime;

pub mod allow_set;
pub mod filter_dir;
pub mod os_dir;

pub use allow_set::AllowSet;
pub use filter_dir::{Console, FilterDir, FilteredFile, Mode};
pub use os_dir::OsDir;

/// Kind of a directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
    Other,
}

/// Metadata of a file or directory entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    /// Base name (no slashes).
    pub name: String,
    pub kind: EntryKind,
    pub size: u64,
    pub modified: Option<SystemTime>,
}

impl FileInfo {
    #[must_use]
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Dir
    }
}

/// Result of enumerating a directory.
///
/// Mirrors a listing call that can return entries *and* an error: a partial
/// listing keeps everything read before the failure.
#[derive(Debug, Default)]
pub struct DirListing {
    pub entries: Vec<FileInfo>,
    pub error: Option<io::Error>,
}

impl DirListing {
    #[must_use]
    pub fn ok(entries: Vec<FileInfo>) -> Self {
        Self {
            entries,
            error: None,
        }
    }

    #[must_use]
    pub fn failed(error: io::Error) -> Self {
        Self {
            entries: Vec::new(),
            error: Some(error),
        }
    }

    /// Entry names in listing order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }
}

/// An opened file: sequential reads plus directory enumeration.
pub trait FsFile: Read + Send {
    /// Metadata of the opened file itself.
    fn stat(&self) -> io::Result<FileInfo>;

    /// Enumerate children. Files answer with an error.
    fn read_dir(&mut self) -> DirListing;
}

/// A rooted read-only file system.
pub trait ReadOnlyFs: Send + Sync {
    /// Open the slash-separated request path `name`.
    fn open(&self, name: &str) -> io::Result<Box<dyn FsFile>>;
}

impl<T: ReadOnlyFs + ?Sized> ReadOnlyFs for std::sync::Arc<T> {
    fn open(&self, name: &str) -> io::Result<Box<dyn FsFile>> {
        (**self).open(name)
    }
}

/// The error returned for missing and blocked paths alike.
#[must_use]
pub fn not_found(name: &str) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("{name}: file does not exist"))
}

/// Read an opened file to the end.
pub fn read_all(file: &mut dyn FsFile) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    file.read_to_end(&mut buf)?;
    Ok(buf)
}
