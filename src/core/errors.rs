//! SPA-prefixed error types with structured error codes.

#![allow(missing_docs)]

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Shared `Result` alias for the project.
pub type Result<T> = std::result::Result<T, SpaError>;

/// Top-level error type for spa-assets.
#[derive(Debug, Error)]
pub enum SpaError {
    #[error("[SPA-1001] invalid configuration: {details}")]
    InvalidConfig { details: String },

    #[error("[SPA-1002] missing configuration file: {path}")]
    MissingConfig { path: PathBuf },

    #[error("[SPA-1003] configuration parse failure in {context}: {details}")]
    ConfigParse {
        context: &'static str,
        details: String,
    },

    #[error("[SPA-2001] file not found: {path}")]
    NotFound { path: String },

    #[error("[SPA-2002] IO failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("[SPA-3001] terminal setup failure: {details}")]
    TerminalInit { details: String },

    #[error("[SPA-4001] asset generation failure: {details}")]
    Codegen { details: String },

    #[error("[SPA-5001] channel closed in component {component}")]
    ChannelClosed { component: &'static str },

    #[error("[SPA-5002] runtime failure: {details}")]
    Runtime { details: String },
}

impl SpaError {
    /// Stable machine-parseable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "SPA-1001",
            Self::MissingConfig { .. } => "SPA-1002",
            Self::ConfigParse { .. } => "SPA-1003",
            Self::NotFound { .. } => "SPA-2001",
            Self::Io { .. } => "SPA-2002",
            Self::TerminalInit { .. } => "SPA-3001",
            Self::Codegen { .. } => "SPA-4001",
            Self::ChannelClosed { .. } => "SPA-5001",
            Self::Runtime { .. } => "SPA-5002",
        }
    }

    /// Whether the error means "no such file", including blocked prod paths
    /// and IO failures of kind `NotFound`.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } => true,
            Self::Io { source, .. } => source.kind() == io::ErrorKind::NotFound,
            _ => false,
        }
    }

    /// Whether the error must terminate the terminal controller.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::TerminalInit { .. })
    }

    /// Convenience constructor for IO errors with a known path.
    #[must_use]
    pub fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Map a file-system error for `name`, keeping "not found" distinguishable.
    #[must_use]
    pub fn from_fs(name: &str, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            Self::NotFound {
                path: name.to_string(),
            }
        } else {
            Self::io(name, source)
        }
    }
}

impl From<toml::de::Error> for SpaError {
    fn from(value: toml::de::Error) -> Self {
        Self::ConfigParse {
            context: "toml",
            details: value.to_string(),
        }
    }
}
