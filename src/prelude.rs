//! Convenience re-exports for library consumers.
//!
//! ```rust,no_run
//! use spa_assets::prelude::*;
//! ```

// Core
pub use crate::core::errors::{Result, SpaError};
pub use crate::core::options::{EmbedOptions, Options};

// File systems
pub use crate::fs::filter_dir::SessionActions;
pub use crate::fs::{
    AllowSet, Console, DirListing, FileInfo, FilterDir, FsFile, Mode, OsDir, ReadOnlyFs,
};

// Collector
pub use crate::collector::{CollectorHandle, Observer, spawn_collector};

// Code generation
pub use crate::codegen::{AssetEmbedder, ListTemplate, SourceEmbedder, parse_list_file};

// HTTP
pub use crate::http::{
    Body, DeepLink, FileServer, Handler, MaxAgeCacheHandler, NoStoreCacheHandler, respond,
};

// Terminal controller
#[cfg(feature = "tui")]
pub use crate::tui::{ControllerConfig, InputStyle};
