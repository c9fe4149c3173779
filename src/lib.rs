#![forbid(unsafe_code)]

//! spa-assets: development-time asset curation for single-page applications.
//!
//! Three stages around one read-only file-system middleware:
//! 1. **Observe**: in dev mode [`fs::FilterDir`] records every path the app
//!    serves into a background collector.
//! 2. **Curate**: an interactive terminal controller shows the live count and
//!    saves the sorted list as a source file.
//! 3. **Ship**: the same list drives prod mode, where only allow-listed files
//!    are visible, and asset embedding, where only they are baked in.
//!
//! # Library usage
//!
//! ```rust,no_run
//! use spa_assets::prelude::*;
//!
//! let assets = FilterDir::open_dir("./web", Options::default());
//! let handler = DeepLink::new(FileServer::new(assets), "/index.html");
//! # let _ = handler;
//! ```

pub mod prelude;

pub mod codegen;
pub mod collector;
pub mod core;
pub mod fs;
pub mod http;
#[cfg(feature = "tui")]
pub mod tui;
