//! Generated artifacts: the allow-list source file and the embedded-assets file.

pub mod embed;
pub mod list_file;

pub use embed::{AssetEmbedder, EmbeddedFile, SourceEmbedder, collect_files};
pub use list_file::{ListTemplate, parse_list_file, write_list_file};
